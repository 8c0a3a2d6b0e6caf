//! Movement resolver for locomotion commands.
//!
//! The `MovementResolver` applies [`Command`]s through a [`Locomotion`]
//! implementation and then syncs the arena's spatial index for every actor it
//! touched. The default [`Kinematic`] locomotion moves in straight lines and
//! ignores obstacles; hosts with a navmesh or character controller supply
//! their own.

use std::collections::BTreeSet;
use std::f32::consts::{PI, TAU};
use std::fmt;

use glam::Vec2;

use crate::actor::{ActorId, TransformState};
use crate::arena::Arena;
use crate::output::{Command, Event, OutputEnvelope, OutputKind};

use super::{ResolveContext, Resolver};

// =============================================================================
// Locomotion
// =============================================================================

/// The capability that actually moves and turns actors.
pub trait Locomotion: Send + Sync + fmt::Debug {
    /// Moves towards `destination`, stopping on arrival.
    fn move_toward(&self, transform: &mut TransformState, destination: Vec2, speed: f32, dt: f32);

    /// Moves along a unit `direction`.
    fn walk(&self, transform: &mut TransformState, direction: Vec2, speed: f32, dt: f32);

    /// Turns towards `direction` at `turn_rate`.
    fn face(&self, transform: &mut TransformState, direction: Vec2, turn_rate: f32, dt: f32);

    /// Cancels velocity.
    fn stop(&self, transform: &mut TransformState);

    /// Applies a scripted displacement.
    fn displace(&self, transform: &mut TransformState, delta: Vec2);
}

/// Straight-line locomotion with no obstacles.
///
/// # Example
///
/// ```
/// use ashen_core::actor::TransformState;
/// use ashen_core::resolver::{Kinematic, Locomotion};
/// use glam::Vec2;
///
/// let mut transform = TransformState::default();
/// Kinematic.move_toward(&mut transform, Vec2::new(1.0, 0.0), 10.0, 1.0);
/// assert_eq!(transform.position, Vec2::new(1.0, 0.0));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Kinematic;

impl Locomotion for Kinematic {
    fn move_toward(&self, transform: &mut TransformState, destination: Vec2, speed: f32, dt: f32) {
        let offset = destination - transform.position;
        let distance = offset.length();
        let step = speed * dt;
        if distance <= step {
            transform.position = destination;
            transform.velocity = Vec2::ZERO;
        } else {
            transform.velocity = offset / distance * speed;
            transform.position += transform.velocity * dt;
        }
    }

    fn walk(&self, transform: &mut TransformState, direction: Vec2, speed: f32, dt: f32) {
        transform.velocity = direction.normalize_or_zero() * speed;
        transform.position += transform.velocity * dt;
    }

    fn face(&self, transform: &mut TransformState, direction: Vec2, turn_rate: f32, dt: f32) {
        if direction.length_squared() <= f32::EPSILON {
            return;
        }
        let target = direction.to_angle();
        let delta = (target - transform.heading + PI).rem_euclid(TAU) - PI;
        let t = (turn_rate * dt).clamp(0.0, 1.0);
        transform.heading = (transform.heading + delta * t + PI).rem_euclid(TAU) - PI;
    }

    fn stop(&self, transform: &mut TransformState) {
        transform.velocity = Vec2::ZERO;
    }

    fn displace(&self, transform: &mut TransformState, delta: Vec2) {
        transform.position += delta;
    }
}

// =============================================================================
// MovementResolver
// =============================================================================

/// Resolver for movement commands.
///
/// Commands addressed to dead or missing actors are dropped, except `Stop`.
///
/// # Example
///
/// ```
/// use ashen_core::output::OutputKind;
/// use ashen_core::resolver::{MovementResolver, Resolver};
///
/// let resolver = MovementResolver::new();
/// assert!(resolver.handles().contains(&OutputKind::Command));
/// ```
#[derive(Debug)]
pub struct MovementResolver {
    locomotion: Box<dyn Locomotion>,
}

impl MovementResolver {
    /// Creates a resolver using [`Kinematic`] locomotion.
    #[must_use]
    pub fn new() -> Self {
        Self::with_locomotion(Box::new(Kinematic))
    }

    /// Creates a resolver using a host-provided locomotion capability.
    #[must_use]
    pub fn with_locomotion(locomotion: Box<dyn Locomotion>) -> Self {
        Self { locomotion }
    }

    fn apply(&self, command: &Command, transform: &mut TransformState, dt: f32) {
        let locomotion = self.locomotion.as_ref();
        match *command {
            Command::MoveToward {
                destination, speed, ..
            } => locomotion.move_toward(transform, destination, speed, dt),
            Command::Walk {
                direction, speed, ..
            } => locomotion.walk(transform, direction, speed, dt),
            Command::Face {
                direction,
                turn_rate,
                ..
            } => locomotion.face(transform, direction, turn_rate, dt),
            Command::Stop { .. } => locomotion.stop(transform),
            Command::Displace { delta, .. } => locomotion.displace(transform, delta),
        }
    }
}

impl Default for MovementResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver for MovementResolver {
    fn handles(&self) -> &[OutputKind] {
        &[OutputKind::Command]
    }

    fn resolve(
        &self,
        ctx: &ResolveContext,
        outputs: &[&OutputEnvelope],
        arena: &mut Arena,
        _emitted: &mut Vec<Event>,
    ) {
        let mut moved: BTreeSet<ActorId> = BTreeSet::new();

        for command in outputs.iter().filter_map(|e| e.output().as_command()) {
            let id = command.actor();
            let Some(actor) = arena.get_mut(id) else {
                continue;
            };
            if actor.is_dead() && !matches!(command, Command::Stop { .. }) {
                continue;
            }
            self.apply(command, actor.transform_mut(), ctx.dt);
            moved.insert(id);
        }

        for id in moved {
            arena.update_spatial(id);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Actor;
    use crate::config::MinionConfig;
    use crate::output::Output;
    use std::f32::consts::FRAC_PI_2;

    mod kinematic_tests {
        use super::*;

        #[test]
        fn move_toward_stops_on_arrival() {
            let mut transform = TransformState::default();
            Kinematic.move_toward(&mut transform, Vec2::new(10.0, 0.0), 4.0, 1.0);
            assert_eq!(transform.position, Vec2::new(4.0, 0.0));
            assert_eq!(transform.velocity, Vec2::new(4.0, 0.0));

            Kinematic.move_toward(&mut transform, Vec2::new(5.0, 0.0), 4.0, 1.0);
            assert_eq!(transform.position, Vec2::new(5.0, 0.0));
            assert_eq!(transform.velocity, Vec2::ZERO);
        }

        #[test]
        fn face_turns_the_short_way() {
            let mut transform = TransformState::at(Vec2::ZERO, 3.0);
            Kinematic.face(&mut transform, Vec2::from_angle(-3.0), 0.5, 1.0);
            // 3.0 → -3.0 is about 0.28 rad through ±π, not 6 rad back.
            assert!(transform.heading.abs() > 3.1);
        }

        #[test]
        fn face_interpolates_by_turn_rate() {
            let mut transform = TransformState::at(Vec2::ZERO, 0.0);
            Kinematic.face(&mut transform, Vec2::Y, 5.0, 0.1);
            assert!((transform.heading - FRAC_PI_2 * 0.5).abs() < 1e-5);

            Kinematic.face(&mut transform, Vec2::Y, 100.0, 0.1);
            assert!((transform.heading - FRAC_PI_2).abs() < 1e-5);
        }

        #[test]
        fn walk_and_stop() {
            let mut transform = TransformState::default();
            Kinematic.walk(&mut transform, Vec2::new(0.0, 2.0), 3.0, 0.5);
            assert!(transform.position.abs_diff_eq(Vec2::new(0.0, 1.5), 1e-6));
            Kinematic.stop(&mut transform);
            assert_eq!(transform.velocity, Vec2::ZERO);
        }
    }

    mod resolver_tests {
        use super::*;

        fn envelope(command: Command) -> OutputEnvelope {
            OutputEnvelope::new(Output::Command(command), command.actor(), 0, 0)
        }

        fn ctx() -> ResolveContext {
            ResolveContext { tick: 0, dt: 0.5 }
        }

        #[test]
        fn commands_move_actor_and_sync_index() {
            let mut arena = Arena::new();
            let config = MinionConfig::default();
            let id = arena.spawn(|id| Actor::minion(id, TransformState::default(), &config));

            let walk = envelope(Command::Walk {
                actor: id,
                direction: Vec2::X,
                speed: 2.0,
            });
            let shove = envelope(Command::Displace {
                actor: id,
                delta: Vec2::new(0.0, 3.0),
            });
            MovementResolver::new().resolve(&ctx(), &[&walk, &shove], &mut arena, &mut Vec::new());

            let expected = Vec2::new(1.0, 3.0);
            assert_eq!(arena.get(id).map(|a| a.transform().position), Some(expected));
            assert_eq!(arena.spatial().get(id), Some(expected));
        }

        #[test]
        fn dead_actors_do_not_move() {
            let mut arena = Arena::new();
            let config = MinionConfig::default();
            let id = arena.spawn(|id| Actor::minion(id, TransformState::default(), &config));
            if let Some(actor) = arena.get_mut(id) {
                actor.apply_damage(100.0);
            }

            let shove = envelope(Command::Displace {
                actor: id,
                delta: Vec2::X,
            });
            MovementResolver::new().resolve(&ctx(), &[&shove], &mut arena, &mut Vec::new());
            assert_eq!(arena.get(id).map(|a| a.transform().position), Some(Vec2::ZERO));
        }

        #[test]
        fn unknown_actor_is_ignored() {
            let mut arena = Arena::new();
            let stop = envelope(Command::Stop {
                actor: ActorId::new(42),
            });
            MovementResolver::new().resolve(&ctx(), &[&stop], &mut arena, &mut Vec::new());
            assert!(arena.is_empty());
        }
    }
}

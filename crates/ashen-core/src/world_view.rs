//! `WorldView` provides a frozen, read-only snapshot of the arena for controllers.
//!
//! The [`WorldView`] is captured once at the start of every tick, before any
//! actor decides. Every controller reads the same snapshot, so decisions made
//! in parallel never observe each other's effects within the tick.
//!
//! # Immutability
//!
//! `WorldView` owns plain-data [`ActorSnapshot`]s rather than borrowing the
//! arena. This ensures that:
//! - Controllers cannot mutate other actors (they emit outputs instead)
//! - Actors can be advanced in parallel while the view is shared
//! - The snapshot semantics of the tick pipeline are maintained
//!
//! # Perception
//!
//! Target acquisition goes through the [`Perception`] trait. The snapshot
//! implements it with a linear scan; hosts with a physics engine can provide
//! their own implementation for tests or tooling.
//!
//! # Example
//!
//! ```
//! use ashen_core::actor::{Actor, ActorId, Team, TransformState};
//! use ashen_core::arena::Arena;
//! use ashen_core::config::MinionConfig;
//! use ashen_core::world_view::{Perception, WorldView};
//! use glam::Vec2;
//!
//! let mut arena = Arena::new();
//! let config = MinionConfig::default();
//! let near = arena.spawn(|id| Actor::minion(id, TransformState::at(Vec2::new(2.0, 0.0), 0.0), &config));
//! let _far = arena.spawn(|id| Actor::minion(id, TransformState::at(Vec2::new(9.0, 0.0), 0.0), &config));
//!
//! let view = WorldView::capture(&arena);
//! assert_eq!(view.find_nearest_hostile(Vec2::ZERO, 100.0, Team::Player), Some(near));
//! ```

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::actor::{Actor, ActorId, ActorKind, Team};
use crate::arena::Arena;

// =============================================================================
// Snapshots
// =============================================================================

bitflags! {
    /// Coarse status bits captured for every actor.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct StatusFlags: u8 {
        /// Health reached zero.
        const DEAD = 1 << 0;
        /// Poise broken, actions blocked.
        const STAGGERED = 1 << 1;
        /// In windup, active or recovery.
        const ATTACKING = 1 << 2;
        /// Weapon hitbox armed.
        const ARMED = 1 << 3;
        /// Rolling or backstepping.
        const DODGING = 1 << 4;
        /// Inside a dodge's invincible window.
        const INVINCIBLE = 1 << 5;
    }
}

/// What other actors may observe about one actor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    /// Actor id.
    pub id: ActorId,
    /// Team.
    pub team: Team,
    /// Archetype.
    pub kind: ActorKind,
    /// Position at the start of the tick.
    pub position: Vec2,
    /// Heading at the start of the tick.
    pub heading: f32,
    /// Body circle radius.
    pub body_radius: f32,
    /// Status bits.
    pub flags: StatusFlags,
    /// Health fraction in `[0, 1]`.
    pub health_fraction: f32,
}

impl ActorSnapshot {
    /// Captures the observable state of `actor`.
    #[must_use]
    pub fn of(actor: &Actor) -> Self {
        Self {
            id: actor.id(),
            team: actor.team(),
            kind: actor.kind(),
            position: actor.transform().position,
            heading: actor.transform().heading,
            body_radius: actor.body_radius(),
            flags: actor.status_flags(),
            health_fraction: actor.vitals().health().fraction(),
        }
    }

    /// Returns true if the actor was dead at capture time.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.flags.contains(StatusFlags::DEAD)
    }
}

// =============================================================================
// Perception
// =============================================================================

/// Target acquisition queries used by controllers.
///
/// Implementations must be deterministic: equal distances are broken by the
/// lower [`ActorId`], and dead actors are never returned.
pub trait Perception {
    /// Nearest living actor of `team` within `radius` of `origin`.
    fn find_nearest_hostile(&self, origin: Vec2, radius: f32, team: Team) -> Option<ActorId>;

    /// Nearest living actor of `team` within `radius` and within `half_angle`
    /// radians of `facing`.
    fn find_nearest_in_view(
        &self,
        origin: Vec2,
        facing: Vec2,
        radius: f32,
        half_angle: f32,
        team: Team,
    ) -> Option<ActorId>;
}

// =============================================================================
// WorldView
// =============================================================================

/// Frozen snapshot of every actor at the start of a tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldView {
    tick: u64,
    /// Sorted by id.
    actors: Vec<ActorSnapshot>,
}

impl WorldView {
    /// Captures every actor in the arena.
    #[must_use]
    pub fn capture(arena: &Arena) -> Self {
        Self {
            tick: arena.current_tick(),
            actors: arena.actors_sorted().map(ActorSnapshot::of).collect(),
        }
    }

    /// Builds a view from explicit snapshots, sorting them by id.
    #[must_use]
    pub fn from_snapshots(tick: u64, mut actors: Vec<ActorSnapshot>) -> Self {
        actors.sort_by_key(|a| a.id);
        Self { tick, actors }
    }

    /// Tick at which the view was captured.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Looks up an actor's snapshot.
    #[must_use]
    pub fn get(&self, id: ActorId) -> Option<&ActorSnapshot> {
        self.actors
            .binary_search_by_key(&id, |a| a.id)
            .ok()
            .map(|index| &self.actors[index])
    }

    /// Returns true if `id` exists and is alive.
    #[must_use]
    pub fn is_alive(&self, id: ActorId) -> bool {
        self.get(id).is_some_and(|a| !a.is_dead())
    }

    /// All snapshots in id order.
    pub fn actors(&self) -> impl Iterator<Item = &ActorSnapshot> + '_ {
        self.actors.iter()
    }

    fn nearest<F>(&self, origin: Vec2, radius: f32, team: Team, accept: F) -> Option<ActorId>
    where
        F: Fn(&ActorSnapshot) -> bool,
    {
        let radius_sq = radius * radius;
        self.actors
            .iter()
            .filter(|a| a.team == team && !a.is_dead())
            .map(|a| (a, a.position.distance_squared(origin)))
            .filter(|(a, dist_sq)| *dist_sq <= radius_sq && accept(a))
            // Iteration is in id order, so keeping the first minimum breaks ties by id.
            .fold(None::<(ActorId, f32)>, |best, (a, dist_sq)| match best {
                Some((_, best_sq)) if best_sq <= dist_sq => best,
                _ => Some((a.id, dist_sq)),
            })
            .map(|(id, _)| id)
    }
}

impl Perception for WorldView {
    fn find_nearest_hostile(&self, origin: Vec2, radius: f32, team: Team) -> Option<ActorId> {
        self.nearest(origin, radius, team, |_| true)
    }

    fn find_nearest_in_view(
        &self,
        origin: Vec2,
        facing: Vec2,
        radius: f32,
        half_angle: f32,
        team: Team,
    ) -> Option<ActorId> {
        let facing = facing.normalize_or_zero();
        let min_cos = half_angle.cos();
        self.nearest(origin, radius, team, |a| {
            let to = (a.position - origin).normalize_or_zero();
            to == Vec2::ZERO || facing.dot(to) >= min_cos
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_4;

    fn snapshot(id: u64, team: Team, position: Vec2) -> ActorSnapshot {
        ActorSnapshot {
            id: ActorId::new(id),
            team,
            kind: ActorKind::Minion,
            position,
            heading: 0.0,
            body_radius: 0.5,
            flags: StatusFlags::empty(),
            health_fraction: 1.0,
        }
    }

    mod lookup_tests {
        use super::*;

        #[test]
        fn snapshots_are_sorted_and_searchable() {
            let view = WorldView::from_snapshots(
                3,
                vec![
                    snapshot(7, Team::Enemy, Vec2::ZERO),
                    snapshot(2, Team::Enemy, Vec2::ZERO),
                ],
            );
            let ids: Vec<_> = view.actors().map(|a| a.id).collect();
            assert_eq!(ids, vec![ActorId::new(2), ActorId::new(7)]);
            assert!(view.get(ActorId::new(7)).is_some());
            assert!(view.get(ActorId::new(5)).is_none());
            assert_eq!(view.tick(), 3);
        }
    }

    mod perception_tests {
        use super::*;

        #[test]
        fn nearest_hostile_ignores_other_team_and_range() {
            let view = WorldView::from_snapshots(
                0,
                vec![
                    snapshot(1, Team::Player, Vec2::new(1.0, 0.0)),
                    snapshot(2, Team::Enemy, Vec2::new(4.0, 0.0)),
                    snapshot(3, Team::Enemy, Vec2::new(20.0, 0.0)),
                ],
            );
            assert_eq!(
                view.find_nearest_hostile(Vec2::ZERO, 10.0, Team::Enemy),
                Some(ActorId::new(2))
            );
            assert_eq!(view.find_nearest_hostile(Vec2::ZERO, 3.0, Team::Enemy), None);
        }

        #[test]
        fn ties_break_by_lower_id() {
            let view = WorldView::from_snapshots(
                0,
                vec![
                    snapshot(9, Team::Enemy, Vec2::new(0.0, 5.0)),
                    snapshot(4, Team::Enemy, Vec2::new(5.0, 0.0)),
                ],
            );
            assert_eq!(
                view.find_nearest_hostile(Vec2::ZERO, 10.0, Team::Enemy),
                Some(ActorId::new(4))
            );
        }

        #[test]
        fn dead_actors_are_invisible() {
            let mut dead = snapshot(1, Team::Enemy, Vec2::new(1.0, 0.0));
            dead.flags = StatusFlags::DEAD;
            let view = WorldView::from_snapshots(
                0,
                vec![dead, snapshot(2, Team::Enemy, Vec2::new(6.0, 0.0))],
            );
            assert_eq!(
                view.find_nearest_hostile(Vec2::ZERO, 10.0, Team::Enemy),
                Some(ActorId::new(2))
            );
            assert!(!view.is_alive(ActorId::new(1)));
        }

        #[test]
        fn view_cone_filters_by_angle() {
            let view = WorldView::from_snapshots(
                0,
                vec![
                    snapshot(1, Team::Enemy, Vec2::new(0.0, 2.0)),
                    snapshot(2, Team::Enemy, Vec2::new(5.0, 1.0)),
                ],
            );
            assert_eq!(
                view.find_nearest_in_view(Vec2::ZERO, Vec2::X, 30.0, FRAC_PI_4, Team::Enemy),
                Some(ActorId::new(2))
            );
        }
    }
}

//! Outputs emitted by actors and resolvers during a tick.
//!
//! Actors never mutate the world directly. During the decide phase each actor
//! returns a list of [`Output`]s, which the simulation wraps in
//! [`OutputEnvelope`]s, sorts, and routes to resolvers:
//!
//! - [`Command`]: movement requests handled by the movement resolver
//! - [`Event`]: notifications recorded for presentation and UI sinks
//!
//! [`Modifier`]s are not actor outputs: the hit and pickup phases build them
//! and apply each one immediately through the combat resolver.
//!
//! # Example
//!
//! ```
//! use ashen_core::actor::ActorId;
//! use ashen_core::output::{Command, Output, OutputEnvelope, OutputKind};
//! use glam::Vec2;
//!
//! let command = Command::Walk {
//!     actor: ActorId::new(1),
//!     direction: Vec2::X,
//!     speed: 6.0,
//! };
//!
//! let envelope = OutputEnvelope::new(Output::Command(command), ActorId::new(1), 100, 0);
//! assert_eq!(envelope.kind(), OutputKind::Command);
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::actor::ActorId;
use crate::pickup::PickupId;
use crate::vitals::VitalFractions;

// =============================================================================
// Commands
// =============================================================================

/// Movement requests, applied through the locomotion capability.
///
/// # Variants
///
/// - `MoveToward`: navigate towards a destination
/// - `Walk`: move along a direction (input-driven or orbiting)
/// - `Face`: turn towards a direction
/// - `Stop`: cancel any velocity
/// - `Displace`: scripted displacement that ignores obstacles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Move towards a destination.
    MoveToward {
        /// Actor to move
        actor: ActorId,
        /// World destination
        destination: Vec2,
        /// Speed in units per second
        speed: f32,
    },
    /// Move along a direction.
    Walk {
        /// Actor to move
        actor: ActorId,
        /// Direction of travel (normalized by the resolver)
        direction: Vec2,
        /// Speed in units per second
        speed: f32,
    },
    /// Turn towards a direction.
    Face {
        /// Actor to turn
        actor: ActorId,
        /// Desired facing direction
        direction: Vec2,
        /// Fraction of the remaining angle closed per second
        turn_rate: f32,
    },
    /// Stop moving.
    Stop {
        /// Actor to stop
        actor: ActorId,
    },
    /// Translate by a fixed offset.
    Displace {
        /// Actor to move
        actor: ActorId,
        /// World-space offset
        delta: Vec2,
    },
}

impl Command {
    /// Returns the actor this command moves.
    #[must_use]
    pub const fn actor(&self) -> ActorId {
        match self {
            Self::MoveToward { actor, .. }
            | Self::Walk { actor, .. }
            | Self::Face { actor, .. }
            | Self::Stop { actor }
            | Self::Displace { actor, .. } => *actor,
        }
    }
}

// =============================================================================
// Modifiers
// =============================================================================

/// Vitals changes, applied by the combat resolver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Modifier {
    /// Reduce health, unless the target is invincible or dead.
    ApplyDamage {
        /// Attacker, if any
        source: Option<ActorId>,
        /// Actor to damage
        target: ActorId,
        /// Damage amount
        amount: f32,
    },
    /// Reduce poise, unless the target is staggered.
    ApplyPoiseDamage {
        /// Attacker, if any
        source: Option<ActorId>,
        /// Actor to damage
        target: ActorId,
        /// Poise damage amount
        amount: f32,
    },
    /// Restore health.
    Heal {
        /// Actor to heal
        target: ActorId,
        /// Health restored
        amount: f32,
    },
    /// Permanently raise the damage stat.
    IncreaseDamage {
        /// Actor to buff
        target: ActorId,
        /// Damage added
        amount: f32,
    },
}

impl Modifier {
    /// Returns the actor this modifier changes.
    #[must_use]
    pub const fn target(&self) -> ActorId {
        match self {
            Self::ApplyDamage { target, .. }
            | Self::ApplyPoiseDamage { target, .. }
            | Self::Heal { target, .. }
            | Self::IncreaseDamage { target, .. } => *target,
        }
    }
}

// =============================================================================
// Events
// =============================================================================

/// Fire-and-forget presentation cues played on state entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Cue {
    /// Attack variant `n` (1-based) started.
    Attack(u32),
    /// Took damage and survived.
    Hurt,
    /// Died.
    Die,
    /// Poise broke.
    Stagger,
    /// Started a roll.
    Roll,
    /// Started a backstep.
    Backstep,
    /// Locomotion speed changed.
    Locomotion {
        /// Current travel speed in units per second
        speed: f32,
    },
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attack(n) => write!(f, "Attack{n}"),
            Self::Hurt => write!(f, "Damage"),
            Self::Die => write!(f, "Death"),
            Self::Stagger => write!(f, "Stagger"),
            Self::Roll => write!(f, "Rolling"),
            Self::Backstep => write!(f, "Backstep"),
            Self::Locomotion { speed } => write!(f, "Locomotion({speed:.1})"),
        }
    }
}

/// Notifications of things that happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// A presentation cue for an actor.
    Cue {
        /// Actor playing the cue
        actor: ActorId,
        /// The cue
        cue: Cue,
    },
    /// Damage landed.
    Hit {
        /// Attacker, if any
        source: Option<ActorId>,
        /// Actor that was damaged
        target: ActorId,
        /// Health actually removed
        dealt: f32,
        /// Whether this hit killed the target
        killed: bool,
    },
    /// Vitals fractions changed since the last report.
    VitalsChanged {
        /// Actor whose vitals changed
        actor: ActorId,
        /// New fractions
        fractions: VitalFractions,
    },
    /// A pickup was consumed.
    PickupConsumed {
        /// Pickup that was consumed
        pickup: PickupId,
        /// Actor that consumed it
        actor: ActorId,
    },
    /// An enemy strayed past its leash and is heading home.
    Leashed {
        /// Enemy actor
        actor: ActorId,
    },
    /// A leashed enemy reached home and reset.
    ReturnedHome {
        /// Enemy actor
        actor: ActorId,
    },
    /// A player's lock-on target changed.
    LockOnChanged {
        /// Player actor
        actor: ActorId,
        /// New target, or `None` when released
        target: Option<ActorId>,
    },
}

impl Event {
    /// Returns the primary actor involved in this event.
    #[must_use]
    pub const fn primary_actor(&self) -> ActorId {
        match self {
            Self::Cue { actor, .. }
            | Self::VitalsChanged { actor, .. }
            | Self::PickupConsumed { actor, .. }
            | Self::Leashed { actor }
            | Self::ReturnedHome { actor }
            | Self::LockOnChanged { actor, .. } => *actor,
            Self::Hit { target, .. } => *target,
        }
    }

    /// Shorthand for a cue event.
    #[must_use]
    pub const fn cue(actor: ActorId, cue: Cue) -> Self {
        Self::Cue { actor, cue }
    }
}

// =============================================================================
// Top-Level Output Enum
// =============================================================================

/// Output kind for resolver routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputKind {
    /// Command outputs (movement requests)
    Command,
    /// Event outputs (notifications)
    Event,
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command => write!(f, "Command"),
            Self::Event => write!(f, "Event"),
        }
    }
}

/// An actor output: a proposal for state change or a notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Output {
    /// A command output
    Command(Command),
    /// An event output
    Event(Event),
}

impl Output {
    /// Returns the kind of this output for resolver routing.
    #[must_use]
    pub const fn kind(&self) -> OutputKind {
        match self {
            Self::Command(_) => OutputKind::Command,
            Self::Event(_) => OutputKind::Event,
        }
    }

    /// Returns the command if this is a command output.
    #[must_use]
    pub const fn as_command(&self) -> Option<&Command> {
        match self {
            Self::Command(cmd) => Some(cmd),
            _ => None,
        }
    }

    /// Returns the event if this is an event output.
    #[must_use]
    pub const fn as_event(&self) -> Option<&Event> {
        match self {
            Self::Event(e) => Some(e),
            _ => None,
        }
    }
}

impl From<Command> for Output {
    fn from(cmd: Command) -> Self {
        Self::Command(cmd)
    }
}

impl From<Event> for Output {
    fn from(e: Event) -> Self {
        Self::Event(e)
    }
}

// =============================================================================
// Output Envelope
// =============================================================================

/// An output tagged with where and when it was produced.
///
/// Envelopes are sorted by (`source`, `sequence`) before resolution so that
/// results never depend on the order parallel actors finished in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputEnvelope {
    output: Output,
    source: ActorId,
    tick: u64,
    sequence: u32,
}

impl OutputEnvelope {
    /// Creates a new output envelope.
    #[must_use]
    pub const fn new(output: Output, source: ActorId, tick: u64, sequence: u32) -> Self {
        Self {
            output,
            source,
            tick,
            sequence,
        }
    }

    /// Returns a reference to the wrapped output.
    #[must_use]
    pub const fn output(&self) -> &Output {
        &self.output
    }

    /// Consumes the envelope and returns the wrapped output.
    #[must_use]
    pub fn into_output(self) -> Output {
        self.output
    }

    /// Returns the actor that produced this output.
    #[must_use]
    pub const fn source(&self) -> ActorId {
        self.source
    }

    /// Returns the tick when this output was emitted.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Returns the sequence number within the source's outputs for the tick.
    #[must_use]
    pub const fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Returns the kind of the wrapped output.
    #[must_use]
    pub const fn kind(&self) -> OutputKind {
        self.output.kind()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_report_their_actor() {
        let id = ActorId::new(7);
        let commands = [
            Command::MoveToward {
                actor: id,
                destination: Vec2::ZERO,
                speed: 1.0,
            },
            Command::Walk {
                actor: id,
                direction: Vec2::X,
                speed: 1.0,
            },
            Command::Face {
                actor: id,
                direction: Vec2::X,
                turn_rate: 1.0,
            },
            Command::Stop { actor: id },
            Command::Displace {
                actor: id,
                delta: Vec2::Y,
            },
        ];
        assert!(commands.iter().all(|c| c.actor() == id));
    }

    #[test]
    fn hit_events_are_keyed_by_target() {
        let event = Event::Hit {
            source: Some(ActorId::new(1)),
            target: ActorId::new(2),
            dealt: 20.0,
            killed: false,
        };
        assert_eq!(event.primary_actor(), ActorId::new(2));
    }

    #[test]
    fn output_kinds_route_correctly() {
        let command: Output = Command::Stop {
            actor: ActorId::new(1),
        }
        .into();
        assert_eq!(command.kind(), OutputKind::Command);
        assert!(command.as_command().is_some());
        assert!(command.as_event().is_none());

        let event: Output = Event::cue(ActorId::new(1), Cue::Roll).into();
        assert_eq!(event.kind(), OutputKind::Event);
        assert!(event.as_event().is_some());
    }

    #[test]
    fn cue_names_match_animation_states() {
        assert_eq!(Cue::Attack(2).to_string(), "Attack2");
        assert_eq!(Cue::Hurt.to_string(), "Damage");
        assert_eq!(Cue::Backstep.to_string(), "Backstep");
    }

    #[test]
    fn envelope_serialization_roundtrip() {
        let envelope = OutputEnvelope::new(
            Output::Event(Event::cue(ActorId::new(3), Cue::Attack(1))),
            ActorId::new(3),
            42,
            1,
        );
        let json = serde_json::to_string(&envelope).unwrap();
        let back: OutputEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(back, envelope);
        assert_eq!(back.tick(), 42);
        assert_eq!(back.sequence(), 1);
    }
}

//! Setup-time error types.
//!
//! Nothing inside a tick returns an error: invalid requests are rejected with
//! typed outcomes and post-death mutations are no-ops. Errors only surface
//! while loading configuration or addressing actors from outside the loop.

use thiserror::Error;

use crate::actor::ActorId;

/// Convenience alias for fallible simulation setup calls.
pub type Result<T> = std::result::Result<T, SimError>;

/// Invalid tuning values.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A value that must be strictly positive was not.
    #[error("{owner}.{field} must be positive, got {value}")]
    NotPositive {
        /// Config section.
        owner: &'static str,
        /// Field name.
        field: &'static str,
        /// Offending value.
        value: f32,
    },

    /// A value that must be non-negative was not.
    #[error("{owner}.{field} must be non-negative, got {value}")]
    Negative {
        /// Config section.
        owner: &'static str,
        /// Field name.
        field: &'static str,
        /// Offending value.
        value: f32,
    },

    /// A probability fell outside `[0, 1]`.
    #[error("{owner}.{field} must lie in [0, 1], got {value}")]
    NotAProbability {
        /// Config section.
        owner: &'static str,
        /// Field name.
        field: &'static str,
        /// Offending value.
        value: f32,
    },

    /// A lower bound exceeded its upper bound.
    #[error("{owner}.{low} ({low_value}) exceeds {owner}.{high} ({high_value})")]
    InvertedRange {
        /// Config section.
        owner: &'static str,
        /// Lower-bound field name.
        low: &'static str,
        /// Upper-bound field name.
        high: &'static str,
        /// Lower-bound value.
        low_value: f32,
        /// Upper-bound value.
        high_value: f32,
    },

    /// A combo must have at least one step.
    #[error("{owner}.max_combo must be at least 1")]
    EmptyCombo {
        /// Config section.
        owner: &'static str,
    },

    /// The config document could not be parsed.
    #[error("malformed config: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Errors surfaced by [`crate::simulation::Simulation`] setup and input calls.
#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    /// The simulation or a spawn was given invalid tuning.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No actor with this id exists.
    #[error("unknown actor {0}")]
    UnknownActor(ActorId),

    /// The actor exists but does not take player input.
    #[error("actor {0} is not player-controlled")]
    NotControllable(ActorId),
}

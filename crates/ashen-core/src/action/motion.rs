//! Scripted motions that run beside the action machine: rolls, backsteps and
//! the boss's tactical retreat.
//!
//! A [`Motion`] fixes its direction when it starts and moves the actor at a
//! constant speed until its duration elapses. Rolls and backsteps grant
//! invincibility for the first `invincibility` seconds; retreats grant none.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::PHASE_EPSILON;
use crate::error::ConfigError;
use crate::vitals::{non_negative, positive};

/// What kind of scripted motion is playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MotionKind {
    /// Dodge roll along the input direction.
    Roll,
    /// Dodge opposite the facing when there was no input.
    Backstep,
    /// Boss backing away from its target after an attack.
    Retreat,
}

/// Tuning for the player's dodge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Travel speed in units per second.
    pub speed: f32,
    /// Total duration in seconds.
    pub duration: f32,
    /// Invincible window measured from the start, at most `duration`.
    pub invincibility: f32,
    /// Stamina paid up front.
    pub stamina_cost: f32,
}

impl MotionConfig {
    /// The player's dodge roll.
    #[must_use]
    pub const fn roll() -> Self {
        Self {
            speed: 10.0,
            duration: 0.6,
            invincibility: 0.4,
            stamina_cost: 20.0,
        }
    }

    /// Checks that the invincible window fits inside the motion.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first offending field.
    pub fn validate(&self, owner: &'static str) -> Result<(), ConfigError> {
        non_negative(owner, "roll.speed", self.speed)?;
        positive(owner, "roll.duration", self.duration)?;
        non_negative(owner, "roll.invincibility", self.invincibility)?;
        non_negative(owner, "roll.stamina_cost", self.stamina_cost)?;
        if self.invincibility > self.duration {
            return Err(ConfigError::InvertedRange {
                owner,
                low: "roll.invincibility",
                high: "roll.duration",
                low_value: self.invincibility,
                high_value: self.duration,
            });
        }
        Ok(())
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self::roll()
    }
}

/// A motion in progress.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    kind: MotionKind,
    direction: Vec2,
    speed: f32,
    duration: f32,
    invincible_for: f32,
    elapsed: f32,
}

impl Motion {
    /// Starts a dodge in `direction`.
    #[must_use]
    pub fn dodge(kind: MotionKind, direction: Vec2, config: &MotionConfig) -> Self {
        Self {
            kind,
            direction: direction.normalize_or_zero(),
            speed: config.speed,
            duration: config.duration,
            invincible_for: config.invincibility.min(config.duration),
            elapsed: 0.0,
        }
    }

    /// Starts a retreat with no invincibility.
    #[must_use]
    pub fn retreat(direction: Vec2, speed: f32, duration: f32) -> Self {
        Self {
            kind: MotionKind::Retreat,
            direction: direction.normalize_or_zero(),
            speed,
            duration,
            invincible_for: 0.0,
            elapsed: 0.0,
        }
    }

    /// Motion kind.
    #[must_use]
    pub const fn kind(&self) -> MotionKind {
        self.kind
    }

    /// Unit direction fixed at start.
    #[must_use]
    pub const fn direction(&self) -> Vec2 {
        self.direction
    }

    /// Seconds since the motion started.
    #[must_use]
    pub const fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Returns true inside the invincible window.
    #[must_use]
    pub fn is_invincible(&self) -> bool {
        self.elapsed + PHASE_EPSILON < self.invincible_for
    }

    /// Returns true once the full duration has elapsed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.elapsed + PHASE_EPSILON >= self.duration
    }

    /// Advances the motion and returns this tick's displacement.
    pub fn tick(&mut self, dt: f32) -> Vec2 {
        if !dt.is_finite() || dt <= 0.0 {
            return Vec2::ZERO;
        }
        let step = dt.min((self.duration - self.elapsed).max(0.0));
        self.elapsed += dt;
        self.direction * self.speed * step
    }
}

//! Simulation configuration.
//!
//! Every tuning struct is serde-deserialisable with `#[serde(default)]`, so a
//! config document only needs the values it overrides:
//!
//! ```
//! use ashen_core::config::SimConfig;
//!
//! let config = SimConfig::from_json(r#"{ "seed": 7, "boss": { "aggression": 1.0 } }"#)?;
//! assert_eq!(config.seed, 7);
//! assert_eq!(config.boss.aggression, 1.0);
//! assert_eq!(config.boss.leash_distance, 40.0);
//! # Ok::<(), ashen_core::error::ConfigError>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pickup::PickupConfig;
use crate::vitals::{positive, VitalsConfig};

pub use crate::controller::{BossConfig, LockOnConfig, PlayerConfig};

/// Tuning for inert minions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinionConfig {
    /// Health and damage.
    pub vitals: VitalsConfig,
    /// Radius of the body circle used by overlap queries.
    pub body_radius: f32,
}

impl Default for MinionConfig {
    fn default() -> Self {
        Self {
            vitals: VitalsConfig::minion(),
            body_radius: 0.5,
        }
    }
}

impl MinionConfig {
    /// Checks every field.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.vitals.validate("minion")?;
        positive("minion", "body_radius", self.body_radius)
    }
}

/// Top-level configuration for a [`crate::simulation::Simulation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Master seed; every boss derives its own RNG from it.
    pub seed: u64,
    /// Ticks per second used by [`crate::simulation::Simulation::step_fixed`].
    pub tick_rate: u32,
    /// Default player tuning.
    pub player: PlayerConfig,
    /// Default boss tuning.
    pub boss: BossConfig,
    /// Default minion tuning.
    pub minion: MinionConfig,
    /// Default pickup tuning.
    pub pickup: PickupConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            tick_rate: 60,
            player: PlayerConfig::default(),
            boss: BossConfig::default(),
            minion: MinionConfig::default(),
            pickup: PickupConfig::default(),
        }
    }
}

impl SimConfig {
    /// Creates the default configuration with a given seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Parses and validates a JSON config document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and any validation
    /// error for out-of-range values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialises the configuration as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if serialisation fails.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks every nested section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 {
            return Err(ConfigError::NotPositive {
                owner: "sim",
                field: "tick_rate",
                value: 0.0,
            });
        }
        self.player.validate()?;
        self.boss.validate()?;
        self.minion.validate()?;
        self.pickup.validate()
    }

    /// Seconds covered by one fixed tick.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fixed_dt(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }
}

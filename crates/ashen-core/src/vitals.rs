//! Vitals: health, poise and stamina counters owned by each actor.
//!
//! A [`Vitals`] record is created full at spawn and is mutated by hits,
//! pickups and regeneration. Capabilities are decided at construction:
//! an actor either carries a poise meter (it can be staggered) or not, and
//! either carries a stamina meter (its actions cost stamina) or not.
//!
//! # Invariants
//!
//! - Every meter stays within `[0, max]`.
//! - `is_dead` flips to `true` exactly once, when health reaches zero, and
//!   every later mutation is a no-op.
//! - Amounts that are not finite or not positive are ignored.
//!
//! # Example
//!
//! ```
//! use ashen_core::vitals::{DamageOutcome, Vitals, VitalsConfig};
//!
//! let mut vitals = Vitals::new(&VitalsConfig::minion());
//! assert_eq!(vitals.apply_damage(10.0), DamageOutcome::Applied { dealt: 10.0 });
//! assert_eq!(vitals.apply_damage(50.0), DamageOutcome::Killed { dealt: 20.0 });
//! assert!(vitals.is_dead());
//! assert_eq!(vitals.apply_damage(5.0), DamageOutcome::Ignored);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// =============================================================================
// Configuration
// =============================================================================

/// Poise tuning for staggerable actors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoiseConfig {
    /// Maximum poise.
    pub max: f32,
    /// Seconds after the last poise hit before regeneration starts.
    pub regen_delay: f32,
    /// Poise regenerated per second.
    pub regen_rate: f32,
}

impl Default for PoiseConfig {
    fn default() -> Self {
        Self {
            max: 100.0,
            regen_delay: 5.0,
            regen_rate: 10.0,
        }
    }
}

/// Stamina tuning for actors with an action economy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaminaConfig {
    /// Maximum stamina.
    pub max: f32,
    /// Seconds after the last expenditure before regeneration starts.
    pub regen_delay: f32,
    /// Stamina regenerated per second.
    pub regen_rate: f32,
}

impl Default for StaminaConfig {
    fn default() -> Self {
        Self {
            max: 100.0,
            regen_delay: 1.0,
            regen_rate: 15.0,
        }
    }
}

/// Construction parameters for a [`Vitals`] record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalsConfig {
    /// Maximum (and starting) health.
    pub max_health: f32,
    /// Starting damage stat.
    pub damage: f32,
    /// Poise meter, present only for staggerable actors.
    pub poise: Option<PoiseConfig>,
    /// Stamina meter, present only for actors whose actions cost stamina.
    pub stamina: Option<StaminaConfig>,
}

impl VitalsConfig {
    /// Player vitals: stamina, no poise.
    #[must_use]
    pub fn player() -> Self {
        Self {
            max_health: 100.0,
            damage: 20.0,
            poise: None,
            stamina: Some(StaminaConfig::default()),
        }
    }

    /// Boss vitals: poise, no stamina.
    #[must_use]
    pub fn boss() -> Self {
        Self {
            max_health: 100.0,
            damage: 20.0,
            poise: Some(PoiseConfig::default()),
            stamina: None,
        }
    }

    /// Minion vitals: neither poise nor stamina.
    #[must_use]
    pub fn minion() -> Self {
        Self {
            max_health: 30.0,
            damage: 5.0,
            poise: None,
            stamina: None,
        }
    }

    /// Checks that every meter has a positive maximum and non-negative rates.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first offending field.
    pub fn validate(&self, owner: &'static str) -> Result<(), ConfigError> {
        positive(owner, "max_health", self.max_health)?;
        non_negative(owner, "damage", self.damage)?;
        if let Some(poise) = &self.poise {
            positive(owner, "poise.max", poise.max)?;
            non_negative(owner, "poise.regen_delay", poise.regen_delay)?;
            non_negative(owner, "poise.regen_rate", poise.regen_rate)?;
        }
        if let Some(stamina) = &self.stamina {
            positive(owner, "stamina.max", stamina.max)?;
            non_negative(owner, "stamina.regen_delay", stamina.regen_delay)?;
            non_negative(owner, "stamina.regen_rate", stamina.regen_rate)?;
        }
        Ok(())
    }
}

pub(crate) fn positive(owner: &'static str, field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { owner, field, value })
    }
}

pub(crate) fn non_negative(
    owner: &'static str,
    field: &'static str,
    value: f32,
) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { owner, field, value })
    }
}

/// Returns the amount if it is a usable positive quantity.
fn sanitize(amount: f32) -> Option<f32> {
    (amount.is_finite() && amount > 0.0).then_some(amount)
}

// =============================================================================
// Meter
// =============================================================================

/// A bounded counter in `[0, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Meter {
    current: f32,
    max: f32,
}

impl Meter {
    /// Creates a full meter.
    #[must_use]
    pub const fn full(max: f32) -> Self {
        Self { current: max, max }
    }

    /// Current value.
    #[must_use]
    pub const fn current(&self) -> f32 {
        self.current
    }

    /// Maximum value.
    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }

    /// Current value as a fraction of the maximum, in `[0, 1]`.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        if self.max > 0.0 {
            (self.current / self.max).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Returns true when the meter sits at its maximum.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }

    /// Returns true when the meter is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.current <= 0.0
    }

    /// Removes up to `amount`, returning how much was actually removed.
    fn drain(&mut self, amount: f32) -> f32 {
        let before = self.current;
        self.current = (self.current - amount).max(0.0);
        before - self.current
    }

    /// Adds up to `amount`, returning how much was actually added.
    fn fill(&mut self, amount: f32) -> f32 {
        let before = self.current;
        self.current = (self.current + amount).min(self.max);
        self.current - before
    }

    fn refill(&mut self) {
        self.current = self.max;
    }
}

/// A meter that regenerates once a delay has passed since its last use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct Regenerating {
    meter: Meter,
    regen_delay: f32,
    regen_rate: f32,
    since_use: f32,
}

impl Regenerating {
    fn new(max: f32, regen_delay: f32, regen_rate: f32) -> Self {
        Self {
            meter: Meter::full(max),
            regen_delay,
            regen_rate,
            since_use: 0.0,
        }
    }

    fn mark_used(&mut self) {
        self.since_use = 0.0;
    }

    /// Advances the delay clock and regenerates when the delay has strictly passed.
    fn regenerate(&mut self, dt: f32, blocked: bool) -> f32 {
        self.since_use += dt;
        if blocked || self.since_use <= self.regen_delay || self.meter.is_full() {
            return 0.0;
        }
        self.meter.fill(self.regen_rate * dt)
    }
}

// =============================================================================
// Outcomes
// =============================================================================

/// Result of [`Vitals::apply_damage`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DamageOutcome {
    /// Nothing changed (dead, invincible, or an unusable amount).
    Ignored,
    /// Health was reduced and the actor is still alive.
    Applied {
        /// Health actually removed.
        dealt: f32,
    },
    /// This call brought health to zero.
    Killed {
        /// Health actually removed.
        dealt: f32,
    },
}

impl DamageOutcome {
    /// Health removed by this call.
    #[must_use]
    pub const fn dealt(&self) -> f32 {
        match self {
            Self::Ignored => 0.0,
            Self::Applied { dealt } | Self::Killed { dealt } => *dealt,
        }
    }
}

/// Result of [`Vitals::apply_poise_damage`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PoiseOutcome {
    /// Nothing changed (dead, staggered, no poise, or an unusable amount).
    Ignored,
    /// Poise was reduced but held.
    Absorbed {
        /// Poise left after the hit.
        remaining: f32,
    },
    /// Poise reached zero; the owner must be staggered.
    Broken,
}

/// Meter fractions pushed to UI sinks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VitalFractions {
    /// Health fraction in `[0, 1]`.
    pub health: f32,
    /// Poise fraction, for staggerable actors.
    pub poise: Option<f32>,
    /// Stamina fraction, for actors with stamina.
    pub stamina: Option<f32>,
}

// =============================================================================
// Vitals
// =============================================================================

/// Health, optional poise, optional stamina and a damage stat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    health: Meter,
    damage: f32,
    poise: Option<Regenerating>,
    stamina: Option<Regenerating>,
    dead: bool,
}

impl Vitals {
    /// Creates full vitals from a config.
    #[must_use]
    pub fn new(config: &VitalsConfig) -> Self {
        Self {
            health: Meter::full(config.max_health),
            damage: config.damage,
            poise: config
                .poise
                .map(|p| Regenerating::new(p.max, p.regen_delay, p.regen_rate)),
            stamina: config
                .stamina
                .map(|s| Regenerating::new(s.max, s.regen_delay, s.regen_rate)),
            dead: false,
        }
    }

    /// Health meter.
    #[must_use]
    pub const fn health(&self) -> &Meter {
        &self.health
    }

    /// Poise meter, if this actor can be staggered.
    #[must_use]
    pub fn poise(&self) -> Option<&Meter> {
        self.poise.as_ref().map(|p| &p.meter)
    }

    /// Stamina meter, if this actor has one.
    #[must_use]
    pub fn stamina(&self) -> Option<&Meter> {
        self.stamina.as_ref().map(|s| &s.meter)
    }

    /// Current damage stat.
    #[must_use]
    pub const fn damage(&self) -> f32 {
        self.damage
    }

    /// Returns true once health has reached zero.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.dead
    }

    /// Returns true if this actor carries a poise meter.
    #[must_use]
    pub const fn is_staggerable(&self) -> bool {
        self.poise.is_some()
    }

    /// Subtracts health, clamping at zero.
    ///
    /// Invincibility is decided by the owning actor before this is called.
    pub fn apply_damage(&mut self, amount: f32) -> DamageOutcome {
        let Some(amount) = sanitize(amount) else {
            return DamageOutcome::Ignored;
        };
        if self.dead {
            return DamageOutcome::Ignored;
        }
        let dealt = self.health.drain(amount);
        if self.health.is_empty() {
            self.dead = true;
            DamageOutcome::Killed { dealt }
        } else {
            DamageOutcome::Applied { dealt }
        }
    }

    /// Subtracts poise and restarts the poise regeneration delay.
    ///
    /// The owning actor skips this call while it is staggered.
    pub fn apply_poise_damage(&mut self, amount: f32) -> PoiseOutcome {
        let Some(amount) = sanitize(amount) else {
            return PoiseOutcome::Ignored;
        };
        if self.dead {
            return PoiseOutcome::Ignored;
        }
        let Some(poise) = self.poise.as_mut() else {
            return PoiseOutcome::Ignored;
        };
        poise.meter.drain(amount);
        poise.mark_used();
        if poise.meter.is_empty() {
            PoiseOutcome::Broken
        } else {
            PoiseOutcome::Absorbed {
                remaining: poise.meter.current(),
            }
        }
    }

    /// Restores health up to the maximum, returning the amount healed.
    pub fn heal(&mut self, amount: f32) -> f32 {
        match sanitize(amount) {
            Some(amount) if !self.dead => self.health.fill(amount),
            _ => 0.0,
        }
    }

    /// Permanently raises the damage stat.
    pub fn increase_damage(&mut self, amount: f32) {
        if let Some(amount) = sanitize(amount) {
            if !self.dead {
                self.damage += amount;
            }
        }
    }

    /// Returns true if at least `amount` stamina is available.
    ///
    /// Actors without a stamina meter have no action economy and always pass.
    #[must_use]
    pub fn has_stamina(&self, amount: f32) -> bool {
        self.stamina
            .as_ref()
            .map_or(true, |s| s.meter.current() >= amount)
    }

    /// Spends stamina, clamping at zero, and restarts the regeneration delay.
    pub fn spend_stamina(&mut self, cost: f32) {
        if self.dead {
            return;
        }
        if let (Some(stamina), Some(cost)) = (self.stamina.as_mut(), sanitize(cost)) {
            stamina.meter.drain(cost);
            stamina.mark_used();
        }
    }

    /// Regenerates stamina once the delay since last use has passed.
    pub fn regenerate_stamina(&mut self, dt: f32) -> f32 {
        match (self.stamina.as_mut(), sanitize(dt)) {
            (Some(stamina), Some(dt)) if !self.dead => stamina.regenerate(dt, false),
            _ => 0.0,
        }
    }

    /// Regenerates poise once the delay since the last poise hit has passed,
    /// never while staggered.
    pub fn regenerate_poise(&mut self, dt: f32, staggered: bool) -> f32 {
        match (self.poise.as_mut(), sanitize(dt)) {
            (Some(poise), Some(dt)) if !self.dead => poise.regenerate(dt, staggered),
            _ => 0.0,
        }
    }

    /// Refills poise, used when a stagger ends.
    pub fn restore_poise(&mut self) {
        if self.dead {
            return;
        }
        if let Some(poise) = self.poise.as_mut() {
            poise.meter.refill();
        }
    }

    /// Refills every meter, used when a leashed enemy arrives home.
    pub fn restore_full(&mut self) {
        if self.dead {
            return;
        }
        self.health.refill();
        for regen in [self.poise.as_mut(), self.stamina.as_mut()].into_iter().flatten() {
            regen.meter.refill();
        }
    }

    /// Meter fractions for UI sinks.
    #[must_use]
    pub fn fractions(&self) -> VitalFractions {
        VitalFractions {
            health: self.health.fraction(),
            poise: self.poise().map(Meter::fraction),
            stamina: self.stamina().map(Meter::fraction),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

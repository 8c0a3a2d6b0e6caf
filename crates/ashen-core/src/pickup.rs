//! Stat pickups lying in the arena.
//!
//! A pickup is consumed by the first living player-team actor whose body
//! touches it. Heal pickups restore health; damage pickups permanently raise
//! the damage stat.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::actor::ActorId;
use crate::error::ConfigError;
use crate::output::Modifier;
use crate::vitals::positive;

/// Unique identifier for a pickup.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PickupId(u64);

impl PickupId {
    /// Creates a new `PickupId` from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for PickupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PickupId({})", self.0)
    }
}

impl fmt::Display for PickupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which stat a pickup improves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PickupKind {
    /// Restores health.
    Heal,
    /// Raises the damage stat.
    Damage,
}

/// Default pickup tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PickupConfig {
    /// Amount granted when no explicit amount is given.
    pub amount: f32,
    /// Trigger radius.
    pub radius: f32,
}

impl Default for PickupConfig {
    fn default() -> Self {
        Self {
            amount: 25.0,
            radius: 0.5,
        }
    }
}

impl PickupConfig {
    /// Checks amount and radius.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("pickup", "amount", self.amount)?;
        positive("pickup", "radius", self.radius)
    }
}

/// A pickup waiting to be consumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    id: PickupId,
    kind: PickupKind,
    amount: f32,
    position: Vec2,
    radius: f32,
}

impl Pickup {
    /// Creates a pickup.
    #[must_use]
    pub const fn new(id: PickupId, kind: PickupKind, amount: f32, position: Vec2, radius: f32) -> Self {
        Self {
            id,
            kind,
            amount,
            position,
            radius,
        }
    }

    /// Pickup id.
    #[must_use]
    pub const fn id(&self) -> PickupId {
        self.id
    }

    /// Pickup kind.
    #[must_use]
    pub const fn kind(&self) -> PickupKind {
        self.kind
    }

    /// Amount granted.
    #[must_use]
    pub const fn amount(&self) -> f32 {
        self.amount
    }

    /// World position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Returns true if a body circle at `center` touches this pickup.
    #[must_use]
    pub fn touches(&self, center: Vec2, body_radius: f32) -> bool {
        let reach = self.radius + body_radius;
        self.position.distance_squared(center) <= reach * reach
    }

    /// The vitals change this pickup grants to `target`.
    #[must_use]
    pub const fn modifier(&self, target: ActorId) -> Modifier {
        match self.kind {
            PickupKind::Heal => Modifier::Heal {
                target,
                amount: self.amount,
            },
            PickupKind::Damage => Modifier::IncreaseDamage {
                target,
                amount: self.amount,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touches_uses_both_radii() {
        let pickup = Pickup::new(PickupId::new(0), PickupKind::Heal, 25.0, Vec2::ZERO, 0.5);
        assert!(pickup.touches(Vec2::new(1.0, 0.0), 0.5));
        assert!(!pickup.touches(Vec2::new(1.1, 0.0), 0.5));
    }

    #[test]
    fn modifier_matches_kind() {
        let target = ActorId::new(4);
        let heal = Pickup::new(PickupId::new(0), PickupKind::Heal, 25.0, Vec2::ZERO, 0.5);
        let buff = Pickup::new(PickupId::new(1), PickupKind::Damage, 25.0, Vec2::ZERO, 0.5);

        assert_eq!(heal.modifier(target), Modifier::Heal { target, amount: 25.0 });
        assert_eq!(
            buff.modifier(target),
            Modifier::IncreaseDamage { target, amount: 25.0 }
        );
    }
}

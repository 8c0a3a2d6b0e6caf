//! Time-windowed melee hit volumes with per-swing hit memory.
//!
//! A [`Hitbox`] is a sphere projected `reach` units in front of its owner.
//! It only deals damage while armed. Arming clears the hit memory and
//! schedules a sweep of everything already inside the volume; for the rest
//! of the window only candidates that newly enter the volume are processed.
//! A target is remembered once it has been processed, so a single armed
//! window can never hit the same actor twice.
//!
//! The arm sweep survives the window closing normally: a coarse tick that
//! carries the owner from windup straight into recovery still sweeps once
//! at the next hit resolution. Only [`Hitbox::interrupt`] (stagger, death,
//! cancel) drops it.
//!
//! # Example
//!
//! ```
//! use ashen_core::actor::{ActorId, Team};
//! use ashen_core::hitbox::{Candidate, Hitbox, HitboxConfig};
//!
//! let mut hitbox = Hitbox::new(HitboxConfig::player_weapon());
//! let owner = ActorId::new(0);
//! let boss = Candidate { id: ActorId::new(1), team: Team::Enemy };
//!
//! hitbox.arm();
//! let strikes = hitbox.resolve(owner, Some(20.0), &[boss]);
//! assert_eq!(strikes.len(), 1);
//!
//! // Still overlapping next tick: no second hit.
//! assert!(hitbox.resolve(owner, Some(20.0), &[boss]).is_empty());
//! ```

use std::collections::BTreeSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::actor::{ActorId, Team};
use crate::error::ConfigError;
use crate::vitals::{non_negative, positive};

/// Shape and payload of a weapon hit volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitboxConfig {
    /// Distance from the owner's position to the volume centre, along its facing.
    pub reach: f32,
    /// Radius of the volume.
    pub radius: f32,
    /// Damage dealt when the owner has no usable damage stat.
    pub fallback_damage: f32,
    /// Poise damage dealt to staggerable targets.
    pub poise_damage: f32,
    /// Only actors of this team can be hit.
    pub target_team: Team,
}

impl HitboxConfig {
    /// The player's sword: short reach, breaks enemy poise.
    #[must_use]
    pub const fn player_weapon() -> Self {
        Self {
            reach: 1.2,
            radius: 0.8,
            fallback_damage: 10.0,
            poise_damage: 30.0,
            target_team: Team::Enemy,
        }
    }

    /// The boss's weapon: wide sweep aimed at the player team.
    #[must_use]
    pub const fn boss_weapon() -> Self {
        Self {
            reach: 1.5,
            radius: 1.2,
            fallback_damage: 10.0,
            poise_damage: 0.0,
            target_team: Team::Player,
        }
    }

    /// Checks that the volume has a positive size and non-negative payloads.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first offending field.
    pub fn validate(&self, owner: &'static str) -> Result<(), ConfigError> {
        non_negative(owner, "weapon.reach", self.reach)?;
        positive(owner, "weapon.radius", self.radius)?;
        non_negative(owner, "weapon.fallback_damage", self.fallback_damage)?;
        non_negative(owner, "weapon.poise_damage", self.poise_damage)
    }
}

/// An actor found inside a hit volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Actor id.
    pub id: ActorId,
    /// Actor team.
    pub team: Team,
}

/// A hit that must be applied to `target`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Strike {
    /// Actor that was hit.
    pub target: ActorId,
    /// Health damage to apply.
    pub damage: f32,
    /// Poise damage to apply.
    pub poise_damage: f32,
}

/// A weapon hit volume owned by an actor's action machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hitbox {
    config: HitboxConfig,
    armed: bool,
    hit_memory: BTreeSet<ActorId>,
    contacts: BTreeSet<ActorId>,
    pending_sweep: bool,
}

impl Hitbox {
    /// Creates a disarmed hitbox.
    #[must_use]
    pub fn new(config: HitboxConfig) -> Self {
        Self {
            config,
            armed: false,
            hit_memory: BTreeSet::new(),
            contacts: BTreeSet::new(),
            pending_sweep: false,
        }
    }

    /// Volume tuning.
    #[must_use]
    pub const fn config(&self) -> &HitboxConfig {
        &self.config
    }

    /// Returns true while the hitbox can deal damage.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.armed
    }

    /// Targets already hit during the current (or last) armed window.
    #[must_use]
    pub fn hit_memory(&self) -> &BTreeSet<ActorId> {
        &self.hit_memory
    }

    /// Centre and radius of the volume for an owner at `origin` facing `forward`.
    #[must_use]
    pub fn volume(&self, origin: Vec2, forward: Vec2) -> (Vec2, f32) {
        (origin + forward * self.config.reach, self.config.radius)
    }

    /// Arms the hitbox, clearing hit memory and scheduling an immediate sweep.
    ///
    /// Arming an already armed hitbox does nothing.
    pub fn arm(&mut self) {
        if self.armed {
            return;
        }
        self.armed = true;
        self.hit_memory.clear();
        self.contacts.clear();
        self.pending_sweep = true;
    }

    /// Returns true if the arm sweep has not been resolved yet.
    #[must_use]
    pub const fn has_pending_sweep(&self) -> bool {
        self.pending_sweep
    }

    /// Returns true if the next resolution can produce strikes.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.armed || self.pending_sweep
    }

    /// Closes the armed window. Hit memory is kept until the next
    /// [`Hitbox::arm`], and an unresolved arm sweep still runs once.
    pub fn disarm(&mut self) {
        self.armed = false;
        self.contacts.clear();
    }

    /// Disarms and drops any unresolved arm sweep.
    pub fn interrupt(&mut self) {
        self.disarm();
        self.pending_sweep = false;
    }

    /// Filters this tick's overlaps down to the candidates that must be processed.
    ///
    /// On the arming tick every overlapping actor is admitted, even if the
    /// window has already closed. Afterwards only actors that were not
    /// overlapping on the previous tick are, and only while armed.
    pub fn admit(&mut self, overlapping: &[Candidate]) -> Vec<Candidate> {
        if !self.is_live() {
            return Vec::new();
        }
        let admitted: Vec<Candidate> = if self.pending_sweep {
            overlapping.to_vec()
        } else {
            overlapping
                .iter()
                .filter(|c| !self.contacts.contains(&c.id))
                .copied()
                .collect()
        };
        self.pending_sweep = false;
        if self.armed {
            self.contacts = overlapping.iter().map(|c| c.id).collect();
        }
        admitted
    }

    /// Decides whether `candidate` is hit.
    ///
    /// Self hits, other teams and already-hit targets are ignored. A hit
    /// target is remembered even if the damage later turns out to be a
    /// no-op on its side (for example because it is invincible).
    pub fn process_candidate(
        &mut self,
        owner: ActorId,
        owner_damage: Option<f32>,
        candidate: Candidate,
    ) -> Option<Strike> {
        if !self.armed {
            return None;
        }
        self.strike(owner, owner_damage, candidate)
    }

    fn strike(
        &mut self,
        owner: ActorId,
        owner_damage: Option<f32>,
        candidate: Candidate,
    ) -> Option<Strike> {
        if candidate.id == owner || candidate.team != self.config.target_team {
            return None;
        }
        if !self.hit_memory.insert(candidate.id) {
            return None;
        }
        let damage = owner_damage
            .filter(|d| d.is_finite())
            .unwrap_or(self.config.fallback_damage);
        Some(Strike {
            target: candidate.id,
            damage,
            poise_damage: self.config.poise_damage,
        })
    }

    /// Admits this tick's overlaps and processes every admitted candidate.
    pub fn resolve(
        &mut self,
        owner: ActorId,
        owner_damage: Option<f32>,
        overlapping: &[Candidate],
    ) -> Vec<Strike> {
        self.admit(overlapping)
            .into_iter()
            .filter_map(|candidate| self.strike(owner, owner_damage, candidate))
            .collect()
    }
}

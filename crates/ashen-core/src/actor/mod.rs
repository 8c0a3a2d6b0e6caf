//! Actors: the combat participants of the simulation.
//!
//! This module provides:
//! - [`ActorId`]: unique, ordered identifier
//! - [`Team`] and [`ActorKind`]: targeting filter and archetype
//! - [`Actor`]: transform, vitals, action machine, motion slot and controller
//! - [`Body`]: the mutable view of an actor handed to its controller
//!
//! # Architecture
//!
//! Each actor exclusively owns its [`Vitals`], its [`ActionMachine`] (which in
//! turn owns the weapon hitbox) and its controller state ([`Brain`]). During
//! the decide phase every actor is advanced independently with a read-only
//! [`WorldView`]; it returns [`Output`]s instead of touching other actors.
//! Hits land afterwards through [`Actor::apply_damage`] and
//! [`Actor::apply_poise_damage`], which preempt the action machine
//! synchronously.
//!
//! # Example
//!
//! ```
//! use ashen_core::actor::{Actor, ActorId, ActorKind, TransformState};
//! use ashen_core::config::MinionConfig;
//! use glam::Vec2;
//!
//! let mut minion = Actor::minion(
//!     ActorId::new(3),
//!     TransformState::at(Vec2::new(5.0, 0.0), 0.0),
//!     &MinionConfig::default(),
//! );
//!
//! assert_eq!(minion.kind(), ActorKind::Minion);
//! minion.apply_damage(30.0);
//! assert!(minion.is_dead());
//! ```

pub mod components;

use serde::{Deserialize, Serialize};
use std::fmt;

use glam::Vec2;

use crate::action::{
    ActionMachine, ActionPhase, ActionSignal, AttackOutcome, Motion, MotionConfig, MotionKind,
    RejectReason,
};
use crate::config::{BossConfig, MinionConfig, PlayerConfig};
use crate::controller::{BossBrain, PlayerBrain};
use crate::hitbox::Hitbox;
use crate::output::{Command, Cue, Event, Output};
use crate::vitals::{DamageOutcome, PoiseOutcome, VitalFractions, Vitals};
use crate::world_view::{StatusFlags, WorldView};

pub use components::TransformState;

// =============================================================================
// Identity
// =============================================================================

/// Unique identifier for an actor.
///
/// Actor IDs are assigned monotonically by the arena and are ordered by value,
/// which fixes the iteration and hit-resolution order of every tick.
///
/// # Example
///
/// ```
/// use ashen_core::actor::ActorId;
///
/// let id1 = ActorId::new(1);
/// let id2 = ActorId::new(2);
///
/// assert!(id1 < id2);
/// assert_eq!(id1.as_u64(), 1);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(u64);

impl ActorId {
    /// Creates a new `ActorId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorId({})", self.0)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ActorId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<ActorId> for u64 {
    fn from(id: ActorId) -> Self {
        id.0
    }
}

/// Faction used for hit and perception filtering.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    /// The player and anything fighting beside them.
    Player,
    /// The boss and its minions.
    Enemy,
}

impl Team {
    /// The team this team fights.
    #[must_use]
    pub const fn hostile(self) -> Self {
        match self {
            Self::Player => Self::Enemy,
            Self::Enemy => Self::Player,
        }
    }
}

/// Actor archetype.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorKind {
    /// Input-driven player character.
    Player,
    /// AI boss with poise, leash and combo policy.
    Boss,
    /// Passive enemy with vitals only.
    Minion,
}

impl fmt::Display for ActorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => write!(f, "Player"),
            Self::Boss => write!(f, "Boss"),
            Self::Minion => write!(f, "Minion"),
        }
    }
}

/// Controller state owned by an actor.
#[derive(Debug, Clone)]
pub enum Brain {
    /// Player input latch, sprint and lock-on state.
    Player(PlayerBrain),
    /// Boss decision policy state.
    Boss(BossBrain),
    /// No decisions (minions).
    Inert,
}

// =============================================================================
// Body
// =============================================================================

/// The parts of an actor a controller may change while deciding.
#[derive(Debug)]
pub struct Body<'a> {
    /// Actor id.
    pub id: ActorId,
    /// Actor team.
    pub team: Team,
    /// Transform at the start of the tick.
    pub transform: &'a TransformState,
    /// Vitals.
    pub vitals: &'a mut Vitals,
    /// Action machine.
    pub action: &'a mut ActionMachine,
    /// Motion slot.
    pub motion: &'a mut Option<Motion>,
}

impl Body<'_> {
    /// Current action phase.
    #[must_use]
    pub fn phase(&self) -> ActionPhase {
        self.action.phase()
    }

    /// Returns true when attacking, staggered, dead or under a motion.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.action.phase() != ActionPhase::Idle || self.motion.is_some()
    }

    /// Requests the next attack, gated on motion and stamina.
    ///
    /// Stamina is charged only when the request is started or queued.
    pub fn try_attack(&mut self, min_stamina: f32, cost: f32) -> AttackOutcome {
        if self.motion.is_some() {
            return AttackOutcome::Rejected(RejectReason::InMotion);
        }
        if !self.action.phase().is_attacking() && !self.vitals.has_stamina(min_stamina) {
            return AttackOutcome::Rejected(RejectReason::Exhausted);
        }
        let outcome = self.action.request_attack();
        if outcome.is_accepted() {
            self.vitals.spend_stamina(cost);
        }
        outcome
    }

    /// Starts a roll or backstep. Only allowed from `Idle` with no motion.
    pub fn try_dodge(&mut self, kind: MotionKind, direction: Vec2, config: &MotionConfig) -> bool {
        if self.is_busy() || !self.vitals.has_stamina(config.stamina_cost) {
            return false;
        }
        self.vitals.spend_stamina(config.stamina_cost);
        *self.motion = Some(Motion::dodge(kind, direction, config));
        true
    }

    /// Starts a backwards retreat along the current facing.
    pub fn start_retreat(&mut self, speed: f32, duration: f32) {
        *self.motion = Some(Motion::retreat(-self.transform.forward(), speed, duration));
    }
}

// =============================================================================
// Actor
// =============================================================================

/// A combat participant.
#[derive(Debug, Clone)]
pub struct Actor {
    id: ActorId,
    team: Team,
    kind: ActorKind,
    transform: TransformState,
    body_radius: f32,
    vitals: Vitals,
    action: Option<ActionMachine>,
    motion: Option<Motion>,
    brain: Brain,
    reported: Option<VitalFractions>,
}

impl Actor {
    /// Creates a player actor.
    #[must_use]
    pub fn player(id: ActorId, transform: TransformState, config: &PlayerConfig) -> Self {
        Self {
            id,
            team: Team::Player,
            kind: ActorKind::Player,
            transform,
            body_radius: config.body_radius,
            vitals: Vitals::new(&config.vitals),
            action: Some(ActionMachine::new(
                config.action,
                Some(Hitbox::new(config.weapon)),
            )),
            motion: None,
            brain: Brain::Player(PlayerBrain::new(config.clone())),
            reported: None,
        }
    }

    /// Creates a boss actor whose decisions are seeded from `seed`.
    #[must_use]
    pub fn boss(id: ActorId, transform: TransformState, config: &BossConfig, seed: u64) -> Self {
        Self {
            id,
            team: Team::Enemy,
            kind: ActorKind::Boss,
            transform,
            body_radius: config.body_radius,
            vitals: Vitals::new(&config.vitals),
            action: Some(ActionMachine::new(
                config.action_config(),
                Some(Hitbox::new(config.weapon)),
            )),
            motion: None,
            brain: Brain::Boss(BossBrain::new(config.clone(), transform.position, seed)),
            reported: None,
        }
    }

    /// Creates a minion actor.
    #[must_use]
    pub fn minion(id: ActorId, transform: TransformState, config: &MinionConfig) -> Self {
        Self {
            id,
            team: Team::Enemy,
            kind: ActorKind::Minion,
            transform,
            body_radius: config.body_radius,
            vitals: Vitals::new(&config.vitals),
            action: None,
            motion: None,
            brain: Brain::Inert,
            reported: None,
        }
    }

    /// Returns the actor's id.
    #[must_use]
    pub const fn id(&self) -> ActorId {
        self.id
    }

    /// Returns the actor's team.
    #[must_use]
    pub const fn team(&self) -> Team {
        self.team
    }

    /// Returns the actor's archetype.
    #[must_use]
    pub const fn kind(&self) -> ActorKind {
        self.kind
    }

    /// Returns the actor's transform.
    #[must_use]
    pub const fn transform(&self) -> &TransformState {
        &self.transform
    }

    /// Returns the actor's transform for movement resolution or host teleports.
    ///
    /// Call [`crate::arena::Arena::update_spatial`] after changing the position.
    pub fn transform_mut(&mut self) -> &mut TransformState {
        &mut self.transform
    }

    /// Radius of the actor's body circle.
    #[must_use]
    pub const fn body_radius(&self) -> f32 {
        self.body_radius
    }

    /// Returns the actor's vitals.
    #[must_use]
    pub const fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    /// Returns the action machine, if the actor can attack.
    #[must_use]
    pub const fn action(&self) -> Option<&ActionMachine> {
        self.action.as_ref()
    }

    /// Mutable access to the action machine.
    pub fn action_mut(&mut self) -> Option<&mut ActionMachine> {
        self.action.as_mut()
    }

    /// Returns the motion in progress.
    #[must_use]
    pub const fn motion(&self) -> Option<&Motion> {
        self.motion.as_ref()
    }

    /// Returns the controller state.
    #[must_use]
    pub const fn brain(&self) -> &Brain {
        &self.brain
    }

    /// Returns the player controller, if this is a player.
    pub fn player_brain_mut(&mut self) -> Option<&mut PlayerBrain> {
        match &mut self.brain {
            Brain::Player(brain) => Some(brain),
            _ => None,
        }
    }

    /// Returns the boss controller, if this is a boss.
    #[must_use]
    pub const fn boss_brain(&self) -> Option<&BossBrain> {
        match &self.brain {
            Brain::Boss(brain) => Some(brain),
            _ => None,
        }
    }

    /// Returns true once health has reached zero.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.vitals.is_dead()
    }

    /// Returns true inside a roll's invincible window.
    #[must_use]
    pub fn is_invincible(&self) -> bool {
        self.motion.as_ref().is_some_and(Motion::is_invincible)
    }

    /// Current action phase; actors without a machine are `Idle` or `Dead`.
    #[must_use]
    pub fn phase(&self) -> ActionPhase {
        match &self.action {
            Some(machine) => machine.phase(),
            None if self.is_dead() => ActionPhase::Dead,
            None => ActionPhase::Idle,
        }
    }

    /// Status flags for snapshots.
    #[must_use]
    pub fn status_flags(&self) -> StatusFlags {
        let mut flags = StatusFlags::empty();
        let phase = self.phase();
        flags.set(StatusFlags::DEAD, self.is_dead());
        flags.set(StatusFlags::STAGGERED, phase == ActionPhase::Staggered);
        flags.set(StatusFlags::ATTACKING, phase.is_attacking());
        flags.set(
            StatusFlags::ARMED,
            self.action.as_ref().is_some_and(ActionMachine::is_armed),
        );
        flags.set(
            StatusFlags::DODGING,
            self.motion
                .as_ref()
                .is_some_and(|m| m.kind() != MotionKind::Retreat),
        );
        flags.set(StatusFlags::INVINCIBLE, self.is_invincible());
        flags
    }

    // -------------------------------------------------------------------------
    // Decide phase
    // -------------------------------------------------------------------------

    /// Advances timers by `dt` and runs the controller.
    ///
    /// Order: vitals regeneration, action machine timers, motion timers, then
    /// the controller decision. Only this actor is mutated.
    pub fn advance(&mut self, view: &WorldView, dt: f32) -> Vec<Output> {
        let mut out = Vec::new();

        let staggered = self.phase() == ActionPhase::Staggered;
        self.vitals.regenerate_stamina(dt);
        self.vitals.regenerate_poise(dt, staggered);

        let signals = self
            .action
            .as_mut()
            .map(|machine| machine.tick(dt))
            .unwrap_or_default();
        for signal in &signals {
            match signal {
                ActionSignal::AttackStarted { variant } => {
                    out.push(Event::cue(self.id, Cue::Attack(*variant)).into());
                }
                ActionSignal::StaggerRecovered => self.vitals.restore_poise(),
                _ => {}
            }
        }

        if let Some(motion) = self.motion.as_mut() {
            let delta = motion.tick(dt);
            if delta != Vec2::ZERO {
                out.push(
                    Command::Displace {
                        actor: self.id,
                        delta,
                    }
                    .into(),
                );
            }
            if motion.is_finished() {
                self.motion = None;
            }
        }

        let Self {
            id,
            team,
            transform,
            vitals,
            action,
            motion,
            brain,
            ..
        } = self;
        if let Some(action) = action.as_mut() {
            let mut body = Body {
                id: *id,
                team: *team,
                transform,
                vitals,
                action,
                motion,
            };
            match brain {
                Brain::Player(player) => player.think(&mut body, view, dt, &mut out),
                Brain::Boss(boss) => boss.think(&mut body, &signals, view, dt, &mut out),
                Brain::Inert => {}
            }
        }

        out
    }

    // -------------------------------------------------------------------------
    // Combat resolution
    // -------------------------------------------------------------------------

    /// Applies health damage unless invincible; a lethal hit forces `Dead`.
    pub fn apply_damage(&mut self, amount: f32) -> DamageOutcome {
        if self.is_invincible() {
            return DamageOutcome::Ignored;
        }
        let outcome = self.vitals.apply_damage(amount);
        if matches!(outcome, DamageOutcome::Killed { .. }) {
            self.motion = None;
            if let Some(machine) = self.action.as_mut() {
                machine.force_dead();
            }
        }
        outcome
    }

    /// Applies poise damage unless staggered or invincible; a break forces
    /// `Staggered` and cancels any motion.
    pub fn apply_poise_damage(&mut self, amount: f32) -> PoiseOutcome {
        if self.phase() == ActionPhase::Staggered || self.is_invincible() {
            return PoiseOutcome::Ignored;
        }
        let outcome = self.vitals.apply_poise_damage(amount);
        if outcome == PoiseOutcome::Broken {
            self.motion = None;
            if let Some(machine) = self.action.as_mut() {
                machine.force_stagger();
            }
        }
        outcome
    }

    /// Restores health, returning the amount healed.
    pub fn heal(&mut self, amount: f32) -> f32 {
        self.vitals.heal(amount)
    }

    /// Permanently raises the damage stat.
    pub fn increase_damage(&mut self, amount: f32) {
        self.vitals.increase_damage(amount);
    }

    /// Returns the current fractions if they changed since the last report.
    pub fn take_vitals_report(&mut self) -> Option<VitalFractions> {
        let current = self.vitals.fractions();
        if self.reported == Some(current) {
            return None;
        }
        self.reported = Some(current);
        Some(current)
    }
}

// =============================================================================
// Tests
// =============================================================================

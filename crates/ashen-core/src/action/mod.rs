//! Timed-phase action state machine driving attacks, staggers and death.
//!
//! Every armed actor owns one [`ActionMachine`]. Controllers request attacks;
//! the machine advances through `Windup → Active → Recovery` on explicit
//! elapsed-time counters, arming its [`Hitbox`] only during `Active`.
//! Combat resolution preempts it with [`ActionMachine::force_stagger`] and
//! [`ActionMachine::force_dead`]; both disarm the hitbox and drop its
//! unresolved arm sweep before returning.
//!
//! ```text
//!            request_attack            windup            active
//!   Idle ─────────────────────▶ Windup ───────▶ Active ───────▶ Recovery
//!    ▲                            ▲                                │
//!    │          recovery (no queue)                                │
//!    ├─────────────────────────────────────────────────────────────┤
//!    │                            └────────── recovery (queued) ───┘
//!    │ stagger
//!   Staggered ◀── force_stagger (any live phase)
//!
//!   Dead ◀── force_dead (any phase, absorbing)
//! ```
//!
//! Leftover time carries across phase boundaries inside a single
//! [`ActionMachine::tick`], and boundaries are compared with
//! [`PHASE_EPSILON`] so that accumulated `f32` ticks land on them.
//!
//! # Example
//!
//! ```
//! use ashen_core::action::{ActionConfig, ActionMachine, ActionPhase, AttackOutcome};
//!
//! let mut machine = ActionMachine::new(ActionConfig::player(), None);
//! assert_eq!(machine.request_attack(), AttackOutcome::Started { variant: 1 });
//!
//! machine.tick(0.2);
//! assert_eq!(machine.phase(), ActionPhase::Active);
//! ```

pub mod motion;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::hitbox::Hitbox;
use crate::vitals::non_negative;

pub use motion::{Motion, MotionConfig, MotionKind};

/// Tolerance used when comparing accumulated time against phase durations.
pub const PHASE_EPSILON: f32 = 1e-4;

// =============================================================================
// Configuration
// =============================================================================

/// Phase durations and combo rules for one actor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionConfig {
    /// Seconds from the attack request until the hitbox arms.
    pub windup: f32,
    /// Seconds the hitbox stays armed.
    pub active: f32,
    /// Seconds after disarming before the actor is free again.
    pub recovery: f32,
    /// Seconds a poise break keeps the actor staggered.
    pub stagger: f32,
    /// Number of attack variants in a combo; the step wraps here.
    pub max_combo: u32,
    /// Seconds in `Idle` after which the combo step resets to zero.
    pub combo_reset_window: f32,
    /// Whether attack requests outside `Idle` are queued as the next combo step.
    pub chaining: bool,
}

impl ActionConfig {
    /// The player's light attack string.
    #[must_use]
    pub const fn player() -> Self {
        Self {
            windup: 0.2,
            active: 0.4,
            recovery: 0.2,
            stagger: 2.0,
            max_combo: 3,
            combo_reset_window: 2.0,
            chaining: true,
        }
    }

    /// Checks durations and combo length.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first offending field.
    pub fn validate(&self, owner: &'static str) -> Result<(), ConfigError> {
        non_negative(owner, "windup", self.windup)?;
        non_negative(owner, "active", self.active)?;
        non_negative(owner, "recovery", self.recovery)?;
        non_negative(owner, "stagger", self.stagger)?;
        non_negative(owner, "combo_reset_window", self.combo_reset_window)?;
        if self.max_combo == 0 {
            return Err(ConfigError::EmptyCombo { owner });
        }
        Ok(())
    }
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self::player()
    }
}

// =============================================================================
// Phases, outcomes and signals
// =============================================================================

/// Current phase of an [`ActionMachine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionPhase {
    /// Free to act.
    Idle,
    /// Attack committed, hitbox not yet armed.
    Windup,
    /// Hitbox armed.
    Active,
    /// Hitbox disarmed, actor still committed.
    Recovery,
    /// Poise broken; all actions blocked until the timer expires.
    Staggered,
    /// Terminal.
    Dead,
}

impl ActionPhase {
    /// Returns true during `Windup`, `Active` and `Recovery`.
    #[must_use]
    pub const fn is_attacking(self) -> bool {
        matches!(self, Self::Windup | Self::Active | Self::Recovery)
    }
}

impl fmt::Display for ActionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "Idle",
            Self::Windup => "Windup",
            Self::Active => "Active",
            Self::Recovery => "Recovery",
            Self::Staggered => "Staggered",
            Self::Dead => "Dead",
        };
        f.write_str(name)
    }
}

/// Why an attack request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// The actor is staggered.
    Staggered,
    /// The actor is dead.
    Dead,
    /// The actor is mid-attack and cannot queue (chaining off or queue full).
    Busy,
    /// The actor is rolling or otherwise moving under a scripted motion.
    InMotion,
    /// Not enough stamina.
    Exhausted,
}

/// Result of [`ActionMachine::request_attack`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackOutcome {
    /// `Idle → Windup`; `variant` is the 1-based combo attack played.
    Started {
        /// 1-based attack variant (`combo_step + 1`).
        variant: u32,
    },
    /// Recorded as the next combo step.
    Queued,
    /// Refused; nothing changed.
    Rejected(RejectReason),
}

impl AttackOutcome {
    /// Returns true if the request was started or queued.
    #[must_use]
    pub const fn is_accepted(self) -> bool {
        !matches!(self, Self::Rejected(_))
    }
}

/// Transitions reported by the machine, in the order they happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionSignal {
    /// Entered `Windup` for this attack variant.
    AttackStarted {
        /// 1-based attack variant.
        variant: u32,
    },
    /// Entered `Active`; the hitbox is armed.
    HitboxArmed,
    /// Entered `Recovery`; the hitbox is disarmed.
    RecoveryStarted,
    /// Left `Recovery`; `combo_step` is the step for the next attack.
    AttackCompleted {
        /// Combo step after advancing.
        combo_step: u32,
    },
    /// The idle reset window expired and the combo step went back to zero.
    ComboReset,
    /// Left `Staggered`; the owner's poise must be restored.
    StaggerRecovered,
}

// =============================================================================
// Action Machine
// =============================================================================

/// Per-actor attack/stagger/death state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionMachine {
    config: ActionConfig,
    phase: ActionPhase,
    elapsed: f32,
    combo_step: u32,
    queued: bool,
    idle_elapsed: f32,
    weapon: Option<Hitbox>,
}

impl ActionMachine {
    /// Creates an idle machine, optionally carrying a weapon hitbox.
    #[must_use]
    pub fn new(config: ActionConfig, weapon: Option<Hitbox>) -> Self {
        Self {
            config,
            phase: ActionPhase::Idle,
            elapsed: 0.0,
            combo_step: 0,
            queued: false,
            idle_elapsed: 0.0,
            weapon,
        }
    }

    /// Phase durations and combo rules.
    #[must_use]
    pub const fn config(&self) -> &ActionConfig {
        &self.config
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> ActionPhase {
        self.phase
    }

    /// Seconds spent in the current phase.
    #[must_use]
    pub const fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// 0-based combo step of the next attack.
    #[must_use]
    pub const fn combo_step(&self) -> u32 {
        self.combo_step
    }

    /// Returns true if a follow-up attack is queued.
    #[must_use]
    pub const fn is_queued(&self) -> bool {
        self.queued
    }

    /// The weapon hitbox, if this actor has one.
    #[must_use]
    pub const fn weapon(&self) -> Option<&Hitbox> {
        self.weapon.as_ref()
    }

    /// Mutable access to the weapon hitbox for hit resolution.
    pub fn weapon_mut(&mut self) -> Option<&mut Hitbox> {
        self.weapon.as_mut()
    }

    /// Returns true while the weapon hitbox is armed.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.weapon.as_ref().is_some_and(Hitbox::is_armed)
    }

    /// Requests the next attack of the combo.
    ///
    /// From `Idle` the attack starts immediately. While attacking, the request
    /// is queued if chaining is enabled and nothing is queued yet.
    pub fn request_attack(&mut self) -> AttackOutcome {
        match self.phase {
            ActionPhase::Dead => AttackOutcome::Rejected(RejectReason::Dead),
            ActionPhase::Staggered => AttackOutcome::Rejected(RejectReason::Staggered),
            ActionPhase::Idle => AttackOutcome::Started {
                variant: self.enter_windup(),
            },
            ActionPhase::Windup | ActionPhase::Active | ActionPhase::Recovery => {
                if self.config.chaining && !self.queued {
                    self.queued = true;
                    AttackOutcome::Queued
                } else {
                    AttackOutcome::Rejected(RejectReason::Busy)
                }
            }
        }
    }

    /// Advances phase timers by `dt` seconds and reports every transition.
    pub fn tick(&mut self, dt: f32) -> Vec<ActionSignal> {
        let mut signals = Vec::new();
        let mut remaining = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        loop {
            let duration = match self.phase {
                ActionPhase::Dead => break,
                ActionPhase::Idle => {
                    self.idle_elapsed += remaining;
                    if self.combo_step > 0
                        && self.idle_elapsed > self.config.combo_reset_window + PHASE_EPSILON
                    {
                        self.combo_step = 0;
                        signals.push(ActionSignal::ComboReset);
                    }
                    break;
                }
                ActionPhase::Windup => self.config.windup,
                ActionPhase::Active => self.config.active,
                ActionPhase::Recovery => self.config.recovery,
                ActionPhase::Staggered => self.config.stagger,
            };

            let needed = (duration - self.elapsed).max(0.0);
            if remaining + PHASE_EPSILON < needed {
                self.elapsed += remaining;
                break;
            }
            remaining = (remaining - needed).max(0.0);
            self.elapsed = 0.0;
            self.finish_phase(&mut signals);
        }

        signals
    }

    fn finish_phase(&mut self, signals: &mut Vec<ActionSignal>) {
        match self.phase {
            ActionPhase::Windup => {
                self.phase = ActionPhase::Active;
                if let Some(weapon) = self.weapon.as_mut() {
                    weapon.arm();
                }
                signals.push(ActionSignal::HitboxArmed);
            }
            ActionPhase::Active => {
                self.phase = ActionPhase::Recovery;
                self.disarm();
                signals.push(ActionSignal::RecoveryStarted);
            }
            ActionPhase::Recovery => {
                self.combo_step = (self.combo_step + 1) % self.config.max_combo.max(1);
                signals.push(ActionSignal::AttackCompleted {
                    combo_step: self.combo_step,
                });
                if self.queued {
                    self.queued = false;
                    let variant = self.enter_windup();
                    signals.push(ActionSignal::AttackStarted { variant });
                } else {
                    self.enter_idle();
                }
            }
            ActionPhase::Staggered => {
                self.enter_idle();
                signals.push(ActionSignal::StaggerRecovered);
            }
            ActionPhase::Idle | ActionPhase::Dead => {}
        }
    }

    fn enter_windup(&mut self) -> u32 {
        self.phase = ActionPhase::Windup;
        self.elapsed = 0.0;
        self.combo_step + 1
    }

    /// Leftover time of the current tick is added to the idle clock by `tick`.
    fn enter_idle(&mut self) {
        self.phase = ActionPhase::Idle;
        self.elapsed = 0.0;
        self.idle_elapsed = 0.0;
    }

    fn disarm(&mut self) {
        if let Some(weapon) = self.weapon.as_mut() {
            weapon.disarm();
        }
    }

    fn interrupt_weapon(&mut self) {
        if let Some(weapon) = self.weapon.as_mut() {
            weapon.interrupt();
        }
    }

    /// Preempts any live phase with a stagger.
    ///
    /// Disarms the hitbox, clears the queued attack and resets the combo.
    /// Returns false if the machine is dead.
    pub fn force_stagger(&mut self) -> bool {
        if self.phase == ActionPhase::Dead {
            return false;
        }
        self.interrupt_weapon();
        self.phase = ActionPhase::Staggered;
        self.elapsed = 0.0;
        self.queued = false;
        self.combo_step = 0;
        true
    }

    /// Moves to the absorbing `Dead` phase. Returns false if already dead.
    pub fn force_dead(&mut self) -> bool {
        if self.phase == ActionPhase::Dead {
            return false;
        }
        self.interrupt_weapon();
        self.phase = ActionPhase::Dead;
        self.elapsed = 0.0;
        self.queued = false;
        self.combo_step = 0;
        true
    }

    /// Abandons an attack in progress and returns to `Idle`.
    ///
    /// Staggered and dead machines are left alone.
    pub fn cancel(&mut self) -> bool {
        if !self.phase.is_attacking() {
            return false;
        }
        self.interrupt_weapon();
        self.queued = false;
        self.enter_idle();
        true
    }

    /// Resets the combo to its first step.
    pub fn reset_combo(&mut self) {
        if self.phase != ActionPhase::Dead {
            self.combo_step = 0;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

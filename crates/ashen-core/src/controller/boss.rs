//! Boss decision policy.
//!
//! Every tick the boss walks a strict priority chain and acts on the first
//! rule that applies:
//!
//! 1. dead or no target: cancel any attack and stop
//! 2. staggered: stop
//! 3. mid-attack: stop (the retreat motion and facing still run)
//! 4. returning home: walk back to the spawn point, fully restored on arrival
//! 5. too far from spawn: start returning home
//! 6. target outside detection range: idle
//! 7. strafing: circle the target, attack when the strafe timer expires
//! 8. target outside attack range: chase
//! 9. in range: attack once the cooldown has elapsed, or strafe
//!
//! Random choices come from a private [`ChaCha8Rng`], so a boss makes the same
//! decisions for the same seed regardless of thread scheduling.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::SpeedCue;
use crate::action::{ActionConfig, ActionPhase, ActionSignal, AttackOutcome};
use crate::actor::{ActorId, Body};
use crate::error::ConfigError;
use crate::hitbox::HitboxConfig;
use crate::output::{Command, Cue, Event, Output};
use crate::vitals::{non_negative, positive, VitalsConfig};
use crate::world_view::{Perception, WorldView};

// =============================================================================
// Configuration
// =============================================================================

/// Boss tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossConfig {
    /// Health, damage and poise.
    pub vitals: VitalsConfig,
    /// Weapon volume.
    pub weapon: HitboxConfig,
    /// Body circle radius.
    pub body_radius: f32,

    /// Probability of attacking rather than strafing when a fresh combo may start.
    pub aggression: f32,
    /// Shortest strafe, in seconds.
    pub min_strafe_time: f32,
    /// Longest strafe, in seconds.
    pub max_strafe_time: f32,
    /// The boss ignores targets farther than this.
    pub detection_range: f32,
    /// Distance from spawn that triggers a return home.
    pub leash_distance: f32,
    /// Radius used to acquire a target.
    pub acquire_radius: f32,
    /// Arrival tolerance at the spawn point.
    pub home_epsilon: f32,

    /// Turn rate towards the target.
    pub rotation_speed: f32,
    /// Chase speed.
    pub chase_speed: f32,
    /// Chase speed multiplier while returning home.
    pub return_speed_multiplier: f32,
    /// Chase speed multiplier while strafing.
    pub strafe_speed_multiplier: f32,
    /// The boss attacks once the target is this close.
    pub attack_range: f32,

    /// Cooldown before the first attack of a combo.
    pub combo_cooldown: f32,
    /// Cooldown between attacks of the same combo.
    pub time_between_hits: f32,
    /// Seconds spent backing away after the active window.
    pub retreat_duration: f32,
    /// Retreat speed.
    pub retreat_speed: f32,

    /// Animation time until the weapon arms.
    pub attack_delay: f32,
    /// Animation time the weapon stays armed.
    pub hitbox_duration: f32,
    /// Animation time to recover after the retreat.
    pub recovery_time: f32,
    /// Playback rate of attack animations; divides the animation times.
    pub attack_anim_speed: f32,
    /// Seconds a poise break keeps the boss staggered.
    pub stagger_duration: f32,
    /// Attacks per combo.
    pub max_combo: u32,
    /// Seconds idle after which the combo restarts.
    pub combo_reset_window: f32,
}

impl Default for BossConfig {
    fn default() -> Self {
        Self {
            vitals: VitalsConfig::boss(),
            weapon: HitboxConfig::boss_weapon(),
            body_radius: 1.0,
            aggression: 0.6,
            min_strafe_time: 1.0,
            max_strafe_time: 3.0,
            detection_range: 15.0,
            leash_distance: 40.0,
            acquire_radius: 1000.0,
            home_epsilon: 1.0,
            rotation_speed: 5.0,
            chase_speed: 3.5,
            return_speed_multiplier: 1.5,
            strafe_speed_multiplier: 0.5,
            attack_range: 3.0,
            combo_cooldown: 3.0,
            time_between_hits: 1.0,
            retreat_duration: 0.5,
            retreat_speed: 3.0,
            attack_delay: 0.5,
            hitbox_duration: 1.0,
            recovery_time: 1.0,
            attack_anim_speed: 0.5,
            stagger_duration: 2.0,
            max_combo: 3,
            combo_reset_window: 5.0,
        }
    }
}

impl BossConfig {
    /// Phase timings derived from the animation tuning.
    ///
    /// Recovery covers the retreat followed by the recovery animation.
    #[must_use]
    pub fn action_config(&self) -> ActionConfig {
        ActionConfig {
            windup: self.attack_delay / self.attack_anim_speed,
            active: self.hitbox_duration / self.attack_anim_speed,
            recovery: self.retreat_duration + self.recovery_time / self.attack_anim_speed,
            stagger: self.stagger_duration,
            max_combo: self.max_combo,
            combo_reset_window: self.combo_reset_window,
            chaining: false,
        }
    }

    /// Checks every field.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        const OWNER: &str = "boss";
        self.vitals.validate(OWNER)?;
        self.weapon.validate(OWNER)?;
        positive(OWNER, "body_radius", self.body_radius)?;
        if !(0.0..=1.0).contains(&self.aggression) {
            return Err(ConfigError::NotAProbability {
                owner: OWNER,
                field: "aggression",
                value: self.aggression,
            });
        }
        non_negative(OWNER, "min_strafe_time", self.min_strafe_time)?;
        non_negative(OWNER, "max_strafe_time", self.max_strafe_time)?;
        if self.min_strafe_time > self.max_strafe_time {
            return Err(ConfigError::InvertedRange {
                owner: OWNER,
                low: "min_strafe_time",
                high: "max_strafe_time",
                low_value: self.min_strafe_time,
                high_value: self.max_strafe_time,
            });
        }
        for (field, value) in [
            ("detection_range", self.detection_range),
            ("leash_distance", self.leash_distance),
            ("acquire_radius", self.acquire_radius),
            ("home_epsilon", self.home_epsilon),
            ("rotation_speed", self.rotation_speed),
            ("chase_speed", self.chase_speed),
            ("return_speed_multiplier", self.return_speed_multiplier),
            ("strafe_speed_multiplier", self.strafe_speed_multiplier),
            ("attack_range", self.attack_range),
            ("combo_cooldown", self.combo_cooldown),
            ("time_between_hits", self.time_between_hits),
            ("retreat_duration", self.retreat_duration),
            ("retreat_speed", self.retreat_speed),
            ("attack_delay", self.attack_delay),
            ("hitbox_duration", self.hitbox_duration),
            ("recovery_time", self.recovery_time),
        ] {
            non_negative(OWNER, field, value)?;
        }
        positive(OWNER, "attack_anim_speed", self.attack_anim_speed)?;
        self.action_config().validate(OWNER)
    }
}

// =============================================================================
// Brain
// =============================================================================

/// A strafe in progress.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Strafe {
    remaining: f32,
    side: f32,
}

impl Strafe {
    /// Seconds left before the boss attacks.
    #[must_use]
    pub const fn remaining(&self) -> f32 {
        self.remaining
    }

    /// `1.0` to circle right, `-1.0` to circle left.
    #[must_use]
    pub const fn side(&self) -> f32 {
        self.side
    }
}

/// Boss controller state.
#[derive(Debug, Clone)]
pub struct BossBrain {
    config: BossConfig,
    spawn_position: Vec2,
    since_last_attack: f32,
    strafe: Option<Strafe>,
    returning_home: bool,
    target: Option<ActorId>,
    missing_target_reported: bool,
    speed_cue: SpeedCue,
    rng: ChaCha8Rng,
}

impl BossBrain {
    /// Creates a controller anchored at `spawn_position`.
    #[must_use]
    pub fn new(config: BossConfig, spawn_position: Vec2, seed: u64) -> Self {
        Self {
            config,
            spawn_position,
            since_last_attack: 0.0,
            strafe: None,
            returning_home: false,
            target: None,
            missing_target_reported: false,
            speed_cue: SpeedCue::default(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Boss tuning.
    #[must_use]
    pub const fn config(&self) -> &BossConfig {
        &self.config
    }

    /// Leash anchor.
    #[must_use]
    pub const fn spawn_position(&self) -> Vec2 {
        self.spawn_position
    }

    /// Seconds since the last attack finished (or since spawn).
    #[must_use]
    pub const fn since_last_attack(&self) -> f32 {
        self.since_last_attack
    }

    /// Strafe in progress.
    #[must_use]
    pub const fn strafe(&self) -> Option<Strafe> {
        self.strafe
    }

    /// Returns true while walking back to the spawn point.
    #[must_use]
    pub const fn is_returning_home(&self) -> bool {
        self.returning_home
    }

    /// Current target.
    #[must_use]
    pub const fn target(&self) -> Option<ActorId> {
        self.target
    }

    pub(crate) fn think(
        &mut self,
        body: &mut Body<'_>,
        signals: &[ActionSignal],
        view: &WorldView,
        dt: f32,
        out: &mut Vec<Output>,
    ) {
        let id = body.id;
        if dt.is_finite() && dt > 0.0 {
            self.since_last_attack += dt;
        }
        for signal in signals {
            match signal {
                ActionSignal::RecoveryStarted => {
                    body.start_retreat(self.config.retreat_speed, self.config.retreat_duration);
                }
                ActionSignal::AttackCompleted { .. } => self.since_last_attack = 0.0,
                _ => {}
            }
        }

        let target = self.acquire_target(body, view);

        // 1. Dead or nothing to fight.
        let Some(target_position) = target.filter(|_| !body.vitals.is_dead()) else {
            body.action.cancel();
            *body.motion = None;
            self.strafe = None;
            self.stop(id, out);
            return;
        };

        // 2-3. Committed to a stagger or an attack.
        match body.phase() {
            ActionPhase::Staggered => {
                self.strafe = None;
                self.stop(id, out);
                return;
            }
            phase if phase.is_attacking() => {
                out.push(Command::Stop { actor: id }.into());
                if body.motion.is_some() {
                    self.face(body, target_position, out);
                }
                return;
            }
            _ => {}
        }

        let position = body.transform.position;
        let to_home = position.distance(self.spawn_position);

        // 4. Walking home.
        if self.returning_home {
            if to_home < self.config.home_epsilon {
                self.returning_home = false;
                body.vitals.restore_full();
                debug!(actor = %id, "returned home");
                out.push(Event::ReturnedHome { actor: id }.into());
                self.stop(id, out);
            } else {
                let speed = self.config.chase_speed * self.config.return_speed_multiplier;
                out.push(
                    Command::MoveToward {
                        actor: id,
                        destination: self.spawn_position,
                        speed,
                    }
                    .into(),
                );
                self.face(body, self.spawn_position, out);
                self.speed_cue.update(id, speed, out);
            }
            return;
        }

        // 5. Leash.
        if to_home > self.config.leash_distance {
            self.returning_home = true;
            self.strafe = None;
            body.action.reset_combo();
            debug!(actor = %id, distance = to_home, "leashed");
            out.push(Event::Leashed { actor: id }.into());
            return;
        }

        // 6. Detection.
        let to_target = position.distance(target_position);
        if to_target > self.config.detection_range {
            self.stop(id, out);
            return;
        }

        // 7. Strafing.
        if let Some(mut strafe) = self.strafe {
            strafe.remaining -= dt.max(0.0);
            self.face(body, target_position, out);
            if strafe.remaining <= 0.0 {
                self.strafe = None;
                self.start_attack(body, out);
            } else {
                self.strafe = Some(strafe);
                let mut direction = body.transform.right() * strafe.side;
                if to_target < self.config.attack_range - 1.0 {
                    direction -= body.transform.forward();
                }
                let speed = self.config.chase_speed * self.config.strafe_speed_multiplier;
                out.push(
                    Command::Walk {
                        actor: id,
                        direction: direction.normalize_or_zero(),
                        speed,
                    }
                    .into(),
                );
                self.speed_cue.update(id, speed, out);
            }
            return;
        }

        // 8. Chase.
        if to_target > self.config.attack_range {
            out.push(
                Command::MoveToward {
                    actor: id,
                    destination: target_position,
                    speed: self.config.chase_speed,
                }
                .into(),
            );
            self.face(body, target_position, out);
            self.speed_cue.update(id, self.config.chase_speed, out);
            return;
        }

        // 9. In range.
        self.stop(id, out);
        let combo_step = body.action.combo_step();
        let cooldown = if combo_step == 0 {
            self.config.combo_cooldown
        } else {
            self.config.time_between_hits
        };
        if self.since_last_attack > cooldown {
            let roll: f32 = self.rng.gen();
            if roll <= self.config.aggression || combo_step > 0 {
                self.start_attack(body, out);
            } else {
                self.start_strafe(id);
            }
        } else {
            self.face(body, target_position, out);
        }
    }

    /// Keeps a living target, otherwise acquires the nearest hostile.
    fn acquire_target(&mut self, body: &Body<'_>, view: &WorldView) -> Option<Vec2> {
        let current = self
            .target
            .and_then(|id| view.get(id))
            .filter(|snapshot| !snapshot.is_dead());
        if let Some(snapshot) = current {
            return Some(snapshot.position);
        }

        self.target = view.find_nearest_hostile(
            body.transform.position,
            self.config.acquire_radius,
            body.team.hostile(),
        );
        match self.target.and_then(|id| view.get(id)) {
            Some(snapshot) => {
                self.missing_target_reported = false;
                debug!(actor = %body.id, target = %snapshot.id, "target acquired");
                Some(snapshot.position)
            }
            None => {
                if !self.missing_target_reported {
                    self.missing_target_reported = true;
                    warn!(actor = %body.id, "no hostile target, boss idles");
                }
                None
            }
        }
    }

    fn start_attack(&mut self, body: &mut Body<'_>, out: &mut Vec<Output>) {
        if let AttackOutcome::Started { variant } = body.try_attack(0.0, 0.0) {
            self.strafe = None;
            debug!(actor = %body.id, variant, "boss attack");
            out.push(Command::Stop { actor: body.id }.into());
            out.push(Event::cue(body.id, Cue::Attack(variant)).into());
            self.speed_cue.update(body.id, 0.0, out);
        }
    }

    fn start_strafe(&mut self, id: ActorId) {
        let remaining = self
            .rng
            .gen_range(self.config.min_strafe_time..=self.config.max_strafe_time);
        let side = if self.rng.gen::<f32>() > 0.5 { 1.0 } else { -1.0 };
        debug!(actor = %id, remaining, side, "strafe");
        self.strafe = Some(Strafe { remaining, side });
    }

    fn face(&self, body: &Body<'_>, point: Vec2, out: &mut Vec<Output>) {
        let direction = body.transform.direction_to(point);
        if direction != Vec2::ZERO {
            out.push(
                Command::Face {
                    actor: body.id,
                    direction,
                    turn_rate: self.config.rotation_speed,
                }
                .into(),
            );
        }
    }

    fn stop(&mut self, id: ActorId, out: &mut Vec<Output>) {
        out.push(Command::Stop { actor: id }.into());
        self.speed_cue.update(id, 0.0, out);
    }
}

// =============================================================================
// Tests
// =============================================================================

//! Player controller: latched input turned into locomotion, dodges, lock-on
//! and attacks.
//!
//! The host writes a [`PlayerInput`] whenever it polls its devices. Held state
//! (movement, sprint) persists until overwritten; button presses (attack,
//! roll, lock-on) are consumed by the next tick. Each tick resolves, in order:
//! roll, lock-on, locomotion and rotation, attack.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{SpeedCue, MOVE_DEADZONE_SQ};
use crate::action::{ActionConfig, AttackOutcome, MotionConfig, MotionKind};
use crate::actor::{ActorId, Body};
use crate::error::ConfigError;
use crate::hitbox::HitboxConfig;
use crate::output::{Command, Cue, Event, Output};
use crate::vitals::{non_negative, positive, VitalsConfig};
use crate::world_view::{Perception, WorldView};

// =============================================================================
// Input
// =============================================================================

/// One poll of the player's devices, in world space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Desired movement; magnitude above 0.5 runs, at or below walks.
    pub movement: Vec2,
    /// Sprint held.
    pub sprint: bool,
    /// Attack pressed this frame.
    pub attack: bool,
    /// Roll pressed this frame.
    pub roll: bool,
    /// Lock-on toggle pressed this frame.
    pub lock_on: bool,
}

// =============================================================================
// Configuration
// =============================================================================

/// Lock-on acquisition tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LockOnConfig {
    /// Acquisition radius.
    pub radius: f32,
    /// The lock breaks beyond this distance.
    pub max_distance: f32,
    /// Half-angle of the acquisition cone around the facing, in degrees.
    pub view_angle_deg: f32,
}

impl Default for LockOnConfig {
    fn default() -> Self {
        Self {
            radius: 30.0,
            max_distance: 30.0,
            view_angle_deg: 50.0,
        }
    }
}

/// Player tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Health, damage and stamina.
    pub vitals: VitalsConfig,
    /// Attack phase timings.
    pub action: ActionConfig,
    /// Sword volume.
    pub weapon: HitboxConfig,
    /// Dodge roll and backstep.
    pub roll: MotionConfig,
    /// Body circle radius.
    pub body_radius: f32,
    /// Speed for small stick deflections.
    pub walk_speed: f32,
    /// Default movement speed.
    pub run_speed: f32,
    /// Speed while sprinting.
    pub sprint_speed: f32,
    /// Turn rate used when facing the movement direction or lock target.
    pub rotation_speed: f32,
    /// Stamina drained per second of sprinting.
    pub sprint_cost_per_second: f32,
    /// Stamina needed to start an attack.
    pub attack_min_stamina: f32,
    /// Stamina charged per accepted attack.
    pub attack_stamina_cost: f32,
    /// Lock-on tuning.
    pub lock_on: LockOnConfig,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            vitals: VitalsConfig::player(),
            action: ActionConfig::player(),
            weapon: HitboxConfig::player_weapon(),
            roll: MotionConfig::roll(),
            body_radius: 0.5,
            walk_speed: 3.0,
            run_speed: 6.0,
            sprint_speed: 9.0,
            rotation_speed: 15.0,
            sprint_cost_per_second: 1.0,
            attack_min_stamina: 10.0,
            attack_stamina_cost: 20.0,
            lock_on: LockOnConfig::default(),
        }
    }
}

impl PlayerConfig {
    /// Checks every nested section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        const OWNER: &str = "player";
        self.vitals.validate(OWNER)?;
        self.action.validate(OWNER)?;
        self.weapon.validate(OWNER)?;
        self.roll.validate(OWNER)?;
        positive(OWNER, "body_radius", self.body_radius)?;
        non_negative(OWNER, "walk_speed", self.walk_speed)?;
        non_negative(OWNER, "run_speed", self.run_speed)?;
        non_negative(OWNER, "sprint_speed", self.sprint_speed)?;
        non_negative(OWNER, "rotation_speed", self.rotation_speed)?;
        non_negative(OWNER, "sprint_cost_per_second", self.sprint_cost_per_second)?;
        non_negative(OWNER, "attack_min_stamina", self.attack_min_stamina)?;
        non_negative(OWNER, "attack_stamina_cost", self.attack_stamina_cost)?;
        non_negative(OWNER, "lock_on.radius", self.lock_on.radius)?;
        non_negative(OWNER, "lock_on.max_distance", self.lock_on.max_distance)?;
        non_negative(OWNER, "lock_on.view_angle_deg", self.lock_on.view_angle_deg)
    }
}

// =============================================================================
// Brain
// =============================================================================

/// Player controller state.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerBrain {
    config: PlayerConfig,
    input: PlayerInput,
    lock_target: Option<ActorId>,
    sprinting: bool,
    speed_cue: SpeedCue,
}

impl PlayerBrain {
    /// Creates a controller with no input latched.
    #[must_use]
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            config,
            input: PlayerInput::default(),
            lock_target: None,
            sprinting: false,
            speed_cue: SpeedCue::default(),
        }
    }

    /// Player tuning.
    #[must_use]
    pub const fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Input waiting for the next tick.
    #[must_use]
    pub const fn input(&self) -> &PlayerInput {
        &self.input
    }

    /// Current lock-on target.
    #[must_use]
    pub const fn lock_target(&self) -> Option<ActorId> {
        self.lock_target
    }

    /// Returns true if the last tick moved at sprint speed.
    #[must_use]
    pub const fn is_sprinting(&self) -> bool {
        self.sprinting
    }

    /// Latches a new input poll.
    ///
    /// Held state is replaced; presses accumulate until the next tick.
    pub fn set_input(&mut self, input: PlayerInput) {
        self.input.movement = if input.movement.is_finite() {
            input.movement
        } else {
            Vec2::ZERO
        };
        self.input.sprint = input.sprint;
        self.input.attack |= input.attack;
        self.input.roll |= input.roll;
        self.input.lock_on |= input.lock_on;
    }

    pub(crate) fn think(
        &mut self,
        body: &mut Body<'_>,
        view: &WorldView,
        dt: f32,
        out: &mut Vec<Output>,
    ) {
        let input = self.input;
        self.input.attack = false;
        self.input.roll = false;
        self.input.lock_on = false;

        if body.vitals.is_dead() {
            self.sprinting = false;
            if self.lock_target.take().is_some() {
                out.push(
                    Event::LockOnChanged {
                        actor: body.id,
                        target: None,
                    }
                    .into(),
                );
            }
            out.push(Command::Stop { actor: body.id }.into());
            self.speed_cue.update(body.id, 0.0, out);
            return;
        }

        if input.roll {
            self.roll(body, input.movement, out);
        }
        self.update_lock_on(body, view, input.lock_on, out);
        self.locomotion(body, view, &input, dt, out);
        if input.attack {
            self.attack(body, out);
        }
    }

    fn roll(&mut self, body: &mut Body<'_>, movement: Vec2, out: &mut Vec<Output>) {
        let (kind, direction, cue) = if movement.length_squared() > MOVE_DEADZONE_SQ {
            (MotionKind::Roll, movement, Cue::Roll)
        } else {
            (MotionKind::Backstep, -body.transform.forward(), Cue::Backstep)
        };
        if body.try_dodge(kind, direction, &self.config.roll) {
            debug!(actor = %body.id, ?kind, "dodge started");
            out.push(Event::cue(body.id, cue).into());
        }
    }

    fn update_lock_on(
        &mut self,
        body: &Body<'_>,
        view: &WorldView,
        toggle: bool,
        out: &mut Vec<Output>,
    ) {
        let position = body.transform.position;
        let before = self.lock_target;

        // A press while locked only releases.
        if toggle && self.lock_target.take().is_none() {
            self.lock_target = view.find_nearest_in_view(
                position,
                body.transform.forward(),
                self.config.lock_on.radius,
                self.config.lock_on.view_angle_deg.to_radians(),
                body.team.hostile(),
            );
        }

        if let Some(target) = self.lock_target {
            let keep = view.get(target).is_some_and(|snapshot| {
                !snapshot.is_dead()
                    && snapshot.position.distance(position) <= self.config.lock_on.max_distance
            });
            if !keep {
                self.lock_target = None;
            }
        }

        if self.lock_target != before {
            debug!(actor = %body.id, target = ?self.lock_target, "lock-on changed");
            out.push(
                Event::LockOnChanged {
                    actor: body.id,
                    target: self.lock_target,
                }
                .into(),
            );
        }
    }

    fn locomotion(
        &mut self,
        body: &mut Body<'_>,
        view: &WorldView,
        input: &PlayerInput,
        dt: f32,
        out: &mut Vec<Output>,
    ) {
        let id = body.id;
        self.sprinting = false;

        if body.is_busy() {
            if body.motion.is_none() {
                out.push(Command::Stop { actor: id }.into());
            }
            self.speed_cue.update(id, 0.0, out);
            return;
        }

        let moving = input.movement.length_squared() > MOVE_DEADZONE_SQ;
        if moving {
            let has_stamina = body.vitals.stamina().is_some_and(|s| !s.is_empty());
            self.sprinting = input.sprint && has_stamina;
            let speed = if self.sprinting {
                body.vitals
                    .spend_stamina(self.config.sprint_cost_per_second * dt);
                self.config.sprint_speed
            } else if input.movement.length() <= 0.5 {
                self.config.walk_speed
            } else {
                self.config.run_speed
            };
            out.push(
                Command::Walk {
                    actor: id,
                    direction: input.movement.normalize_or_zero(),
                    speed,
                }
                .into(),
            );
            self.speed_cue.update(id, speed, out);
        } else {
            out.push(Command::Stop { actor: id }.into());
            self.speed_cue.update(id, 0.0, out);
        }

        let lock_direction = self
            .lock_target
            .filter(|_| !self.sprinting)
            .and_then(|target| view.get(target))
            .map(|target| target.position - body.transform.position);
        let facing = lock_direction.or_else(|| moving.then_some(input.movement));
        if let Some(direction) = facing.filter(|d| d.length_squared() > MOVE_DEADZONE_SQ) {
            out.push(
                Command::Face {
                    actor: id,
                    direction: direction.normalize_or_zero(),
                    turn_rate: self.config.rotation_speed,
                }
                .into(),
            );
        }
    }

    fn attack(&mut self, body: &mut Body<'_>, out: &mut Vec<Output>) {
        let outcome =
            body.try_attack(self.config.attack_min_stamina, self.config.attack_stamina_cost);
        match outcome {
            AttackOutcome::Started { variant } => {
                out.push(Command::Stop { actor: body.id }.into());
                out.push(Event::cue(body.id, Cue::Attack(variant)).into());
                self.speed_cue.update(body.id, 0.0, out);
            }
            AttackOutcome::Queued => {}
            AttackOutcome::Rejected(reason) => {
                debug!(actor = %body.id, ?reason, "attack rejected");
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

//! Simulation module with the tick pipeline.
//!
//! The `Simulation` struct owns the arena and drives every actor through a
//! deterministic loop:
//!
//! 1. **SNAPSHOT**: Capture a [`WorldView`] of every actor
//! 2. **DECIDE**: Advance every actor in parallel against the snapshot,
//!    collecting outputs
//! 3. **RESOLUTION**: Apply commands through the output resolvers, then
//!    pickups, then armed hitboxes in actor-id order
//! 4. **REPORT**: Push changed vitals fractions, record every event and
//!    advance the tick
//!
//! # Determinism
//!
//! - Actors decide in parallel, but their outputs are sorted by
//!   (actor, sequence) before resolution
//! - Actors are iterated in id order (via `BTreeMap`)
//! - Every boss RNG is seeded from a hash of (master seed, actor id)
//!
//! # Example
//!
//! ```
//! use ashen_core::config::SimConfig;
//! use ashen_core::simulation::Simulation;
//! use glam::Vec2;
//!
//! let mut sim = Simulation::new(SimConfig::with_seed(42))?;
//! let _player = sim.spawn_player(Vec2::ZERO, 0.0);
//! let _boss = sim.spawn_boss(Vec2::new(10.0, 0.0), 0.0);
//!
//! for _ in 0..10 {
//!     sim.step_fixed();
//! }
//!
//! assert_eq!(sim.tick(), 10);
//! assert!(!sim.take_events().is_empty());
//! # Ok::<(), ashen_core::error::SimError>(())
//! ```

use rayon::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use glam::Vec2;
use tracing::info;

use crate::actor::{Actor, ActorId, TransformState};
use crate::arena::Arena;
use crate::config::{BossConfig, MinionConfig, PlayerConfig, SimConfig};
use crate::controller::PlayerInput;
use crate::error::{Result, SimError};
use crate::output::{Event, OutputEnvelope};
use crate::pickup::{PickupId, PickupKind};
use crate::resolver::{
    CombatResolver, EventResolver, HitResolver, Kinematic, Locomotion, MovementResolver,
    PickupResolver, ResolveContext, Resolver,
};
use crate::sink::{dispatch, CombatSink};
use crate::vitals::positive;
use crate::world_view::WorldView;

// =============================================================================
// Simulation
// =============================================================================

/// The main simulation orchestrator.
///
/// `Simulation` manages:
/// - The arena holding every actor and pickup
/// - Output resolvers (movement, plus any added by the host)
/// - The pickup and hit phases
/// - The event log drained by presentation sinks
///
/// # Determinism
///
/// Given the same config, the same spawns and the same inputs, the
/// simulation produces identical events regardless of thread scheduling.
pub struct Simulation {
    arena: Arena,
    config: SimConfig,
    /// Resolvers for decide-phase outputs, run in order.
    resolvers: Vec<Box<dyn Resolver>>,
    combat: CombatResolver,
    pickups: PickupResolver,
    hits: HitResolver,
    events: EventResolver,
    elapsed: f64,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("arena", &self.arena)
            .field("seed", &self.config.seed)
            .field("resolvers", &format!("[{} resolvers]", self.resolvers.len()))
            .field("pending_events", &self.events.event_count())
            .field("elapsed", &self.elapsed)
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Creates an empty simulation at tick 0 with [`Kinematic`] locomotion.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] if `config` fails validation.
    pub fn new(config: SimConfig) -> Result<Self> {
        Self::with_locomotion(config, Box::new(Kinematic))
    }

    /// Creates an empty simulation that moves actors through a host-provided
    /// [`Locomotion`], such as a navmesh agent or character controller.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] if `config` fails validation.
    pub fn with_locomotion(config: SimConfig, locomotion: Box<dyn Locomotion>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            arena: Arena::new(),
            config,
            resolvers: vec![Box::new(MovementResolver::with_locomotion(locomotion))],
            combat: CombatResolver::new(),
            pickups: PickupResolver::new(),
            hits: HitResolver::new(),
            events: EventResolver::new(),
            elapsed: 0.0,
        })
    }

    // -------------------------------------------------------------------------
    // Spawning
    // -------------------------------------------------------------------------

    /// Spawns a player using the configured player tuning.
    pub fn spawn_player(&mut self, position: Vec2, heading: f32) -> ActorId {
        let config = self.config.player.clone();
        self.insert_player(position, heading, &config)
    }

    /// Spawns a player with custom tuning.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] if `config` fails validation.
    pub fn spawn_player_with(
        &mut self,
        position: Vec2,
        heading: f32,
        config: &PlayerConfig,
    ) -> Result<ActorId> {
        config.validate()?;
        Ok(self.insert_player(position, heading, config))
    }

    fn insert_player(&mut self, position: Vec2, heading: f32, config: &PlayerConfig) -> ActorId {
        let id = self
            .arena
            .spawn(|id| Actor::player(id, TransformState::at(position, heading), config));
        info!(actor = %id, x = position.x, y = position.y, "player spawned");
        id
    }

    /// Spawns a boss using the configured boss tuning.
    pub fn spawn_boss(&mut self, position: Vec2, heading: f32) -> ActorId {
        let config = self.config.boss.clone();
        self.insert_boss(position, heading, &config)
    }

    /// Spawns a boss with custom tuning.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] if `config` fails validation.
    pub fn spawn_boss_with(
        &mut self,
        position: Vec2,
        heading: f32,
        config: &BossConfig,
    ) -> Result<ActorId> {
        config.validate()?;
        Ok(self.insert_boss(position, heading, config))
    }

    fn insert_boss(&mut self, position: Vec2, heading: f32, config: &BossConfig) -> ActorId {
        let master_seed = self.config.seed;
        let id = self.arena.spawn(|id| {
            Actor::boss(
                id,
                TransformState::at(position, heading),
                config,
                actor_seed(master_seed, id),
            )
        });
        info!(actor = %id, x = position.x, y = position.y, "boss spawned");
        id
    }

    /// Spawns a minion using the configured minion tuning.
    pub fn spawn_minion(&mut self, position: Vec2, heading: f32) -> ActorId {
        let config = self.config.minion.clone();
        self.insert_minion(position, heading, &config)
    }

    /// Spawns a minion with custom tuning.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] if `config` fails validation.
    pub fn spawn_minion_with(
        &mut self,
        position: Vec2,
        heading: f32,
        config: &MinionConfig,
    ) -> Result<ActorId> {
        config.validate()?;
        Ok(self.insert_minion(position, heading, config))
    }

    fn insert_minion(&mut self, position: Vec2, heading: f32, config: &MinionConfig) -> ActorId {
        let id = self
            .arena
            .spawn(|id| Actor::minion(id, TransformState::at(position, heading), config));
        info!(actor = %id, x = position.x, y = position.y, "minion spawned");
        id
    }

    /// Places a pickup with the configured amount and radius.
    pub fn spawn_pickup(&mut self, kind: PickupKind, position: Vec2) -> PickupId {
        let pickup = self.config.pickup;
        let id = self
            .arena
            .spawn_pickup(kind, pickup.amount, position, pickup.radius);
        info!(pickup = %id, ?kind, x = position.x, y = position.y, "pickup spawned");
        id
    }

    /// Places a pickup granting a custom amount.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] if `amount` is not positive.
    pub fn spawn_pickup_with(&mut self, kind: PickupKind, amount: f32, position: Vec2) -> Result<PickupId> {
        positive("pickup", "amount", amount)?;
        let radius = self.config.pickup.radius;
        let id = self.arena.spawn_pickup(kind, amount, position, radius);
        info!(pickup = %id, ?kind, amount, "pickup spawned");
        Ok(id)
    }

    /// Removes an actor from the simulation.
    pub fn despawn(&mut self, id: ActorId) -> Option<Actor> {
        self.arena.despawn(id)
    }

    // -------------------------------------------------------------------------
    // Input
    // -------------------------------------------------------------------------

    /// Latches input for a player-controlled actor. Takes effect next step.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownActor`] if `id` does not exist and
    /// [`SimError::NotControllable`] if it is not a player.
    pub fn set_input(&mut self, id: ActorId, input: PlayerInput) -> Result<()> {
        let actor = self.arena.get_mut(id).ok_or(SimError::UnknownActor(id))?;
        let brain = actor
            .player_brain_mut()
            .ok_or(SimError::NotControllable(id))?;
        brain.set_input(input);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Stepping
    // -------------------------------------------------------------------------

    /// Executes one tick covering `dt` seconds.
    ///
    /// Negative or non-finite `dt` is treated as zero.
    pub fn step(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let tick = self.arena.current_tick();
        let ctx = ResolveContext { tick, dt };

        // SNAPSHOT
        let view = WorldView::capture(&self.arena);

        // DECIDE
        let outputs = self.decide(&view, tick, dt);

        // RESOLUTION
        let mut emitted: Vec<Event> = Vec::new();
        for resolver in &self.resolvers {
            let relevant: Vec<&OutputEnvelope> = outputs
                .iter()
                .filter(|o| resolver.handles().contains(&o.kind()))
                .collect();
            resolver.resolve(&ctx, &relevant, &mut self.arena, &mut emitted);
        }
        let decided_events: Vec<&OutputEnvelope> = outputs
            .iter()
            .filter(|o| self.events.handles().contains(&o.kind()))
            .collect();
        self.events
            .resolve(&ctx, &decided_events, &mut self.arena, &mut emitted);

        self.pickups
            .resolve(&mut self.arena, &self.combat, &mut emitted);
        self.hits.resolve(&mut self.arena, &self.combat, &mut emitted);

        // REPORT
        for actor in self.arena.actors_sorted_mut() {
            if let Some(fractions) = actor.take_vitals_report() {
                emitted.push(Event::VitalsChanged {
                    actor: actor.id(),
                    fractions,
                });
            }
        }
        self.events.record(
            emitted
                .into_iter()
                .enumerate()
                .map(|(seq, event)| {
                    let source = event.primary_actor();
                    let sequence = u32::try_from(seq).unwrap_or(u32::MAX);
                    OutputEnvelope::new(event.into(), source, tick, sequence)
                }),
        );

        self.arena.advance_tick();
        self.elapsed += f64::from(dt);
    }

    /// Executes one tick of `1 / tick_rate` seconds.
    pub fn step_fixed(&mut self) {
        self.step(self.config.fixed_dt());
    }

    /// Advances every actor against `view` and returns its outputs sorted by
    /// (actor, sequence).
    fn decide(&mut self, view: &WorldView, tick: u64, dt: f32) -> Vec<OutputEnvelope> {
        let actors: Vec<&mut Actor> = self.arena.actors_sorted_mut().collect();

        let mut outputs: Vec<OutputEnvelope> = actors
            .into_par_iter()
            .flat_map_iter(|actor| {
                let id = actor.id();
                actor
                    .advance(view, dt)
                    .into_iter()
                    .enumerate()
                    .map(move |(seq, output)| {
                        let sequence = u32::try_from(seq).unwrap_or(u32::MAX);
                        OutputEnvelope::new(output, id, tick, sequence)
                    })
            })
            .collect();

        // CRITICAL: Sort for determinism
        outputs.sort_by_key(|o| (o.source(), o.sequence()));
        outputs
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Drains every event recorded since the last call, in resolution order.
    pub fn take_events(&mut self) -> Vec<OutputEnvelope> {
        self.events.take_events()
    }

    /// Drains recorded events into `sink`.
    pub fn dispatch(&mut self, sink: &mut dyn CombatSink) {
        let events = self.events.take_events();
        dispatch(sink, &events);
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Returns the arena.
    #[must_use]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Returns the arena for setup. Avoid mutating it between a step's phases.
    #[must_use]
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    /// Returns an actor by id.
    #[must_use]
    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.arena.get(id)
    }

    /// Returns a fresh snapshot of every actor.
    #[must_use]
    pub fn view(&self) -> WorldView {
        WorldView::capture(&self.arena)
    }

    /// Returns the current simulation tick.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.arena.current_tick()
    }

    /// Returns simulated seconds since creation.
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Returns the master seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.config.seed
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Adds a custom resolver after the built-in movement one.
    pub fn add_resolver(&mut self, resolver: Box<dyn Resolver>) {
        self.resolvers.push(resolver);
    }

    /// Returns the number of output resolvers.
    #[must_use]
    pub fn resolver_count(&self) -> usize {
        self.resolvers.len()
    }
}

/// Derives an actor's private RNG seed from the master seed and its id.
fn actor_seed(master_seed: u64, id: ActorId) -> u64 {
    let mut hasher = DefaultHasher::new();
    master_seed.hash(&mut hasher);
    id.as_u64().hash(&mut hasher);
    hasher.finish()
}

// =============================================================================
// Tests
// =============================================================================

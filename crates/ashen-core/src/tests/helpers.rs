//! Test helper functions for setting up fights and reading results.

use std::f32::consts::PI;

use glam::Vec2;

use crate::action::ActionPhase;
use crate::actor::{Actor, ActorId};
use crate::config::{BossConfig, SimConfig};
use crate::output::{Cue, Event, Output};
use crate::simulation::Simulation;

// =============================================================================
// Scenario Setup
// =============================================================================

/// Creates a simulation with the default config and `seed`.
pub fn new_sim(seed: u64) -> Simulation {
    Simulation::new(SimConfig::with_seed(seed)).unwrap_or_else(|e| panic!("invalid config: {e}"))
}

/// A boss that attacks as soon as it is in range and never strafes.
pub fn aggressive_boss() -> BossConfig {
    BossConfig {
        aggression: 1.0,
        combo_cooldown: 0.0,
        ..BossConfig::default()
    }
}

/// Spawns a player at the origin facing +X and a boss `distance` units
/// ahead facing the player.
pub fn spawn_duel(sim: &mut Simulation, distance: f32, boss: &BossConfig) -> (ActorId, ActorId) {
    let player = sim.spawn_player(Vec2::ZERO, 0.0);
    let boss = sim
        .spawn_boss_with(Vec2::new(distance, 0.0), PI, boss)
        .unwrap_or_else(|e| panic!("invalid boss config: {e}"));
    (player, boss)
}

// =============================================================================
// Stepping
// =============================================================================

/// Steps `ticks` fixed ticks and returns every event in order.
pub fn step_collect(sim: &mut Simulation, ticks: usize) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..ticks {
        sim.step_fixed();
        events.extend(drain(sim));
    }
    events
}

/// Steps until `done` holds (checked after each tick) or `max_ticks` pass.
///
/// Returns whether `done` was reached and every event seen.
pub fn step_until<F>(sim: &mut Simulation, max_ticks: usize, mut done: F) -> (bool, Vec<Event>)
where
    F: FnMut(&Simulation, &[Event]) -> bool,
{
    let mut events = Vec::new();
    for _ in 0..max_ticks {
        sim.step_fixed();
        events.extend(drain(sim));
        if done(sim, &events) {
            return (true, events);
        }
    }
    (false, events)
}

/// Drains the simulation's event log as bare events.
pub fn drain(sim: &mut Simulation) -> Vec<Event> {
    sim.take_events()
        .into_iter()
        .filter_map(|envelope| match envelope.into_output() {
            Output::Event(event) => Some(event),
            _ => None,
        })
        .collect()
}

// =============================================================================
// State Inspection
// =============================================================================

/// Teleports an actor and keeps the spatial index in sync.
pub fn teleport(sim: &mut Simulation, id: ActorId, position: Vec2) {
    if let Some(actor) = sim.arena_mut().get_mut(id) {
        actor.transform_mut().position = position;
    }
    sim.arena_mut().update_spatial(id);
}

/// Current health, or zero for a missing actor.
pub fn health(sim: &Simulation, id: ActorId) -> f32 {
    sim.actor(id).map_or(0.0, |a| a.vitals().health().current())
}

/// Current action phase.
pub fn phase(sim: &Simulation, id: ActorId) -> Option<ActionPhase> {
    sim.actor(id).map(Actor::phase)
}

/// Current position.
pub fn position(sim: &Simulation, id: ActorId) -> Vec2 {
    sim.actor(id).map_or(Vec2::ZERO, |a| a.transform().position)
}

/// Number of `cue` cues played by `actor`.
pub fn count_cues(events: &[Event], actor: ActorId, cue: Cue) -> usize {
    events
        .iter()
        .filter(|e| **e == Event::cue(actor, cue))
        .count()
}

/// Number of hits that landed on `target`.
pub fn count_hits_on(events: &[Event], target: ActorId) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, Event::Hit { target: t, .. } if *t == target))
        .count()
}

//! Integration tests for the full simulation pipeline.
//!
//! These tests drive complete fights through `Simulation`, testing:
//! - Boss attack cadence and the player's death
//! - Leashing and returning home
//! - Roll invincibility against a hitbox sweep
//! - Poise breaks preempting an attack in progress
//! - Lock-on, pickups and minions

use glam::Vec2;

use crate::action::{ActionMachine, ActionPhase, MotionConfig};
use crate::actor::{Actor, ActorId};
use crate::config::{BossConfig, PlayerConfig};
use crate::controller::PlayerInput;
use crate::output::{Cue, Event};
use crate::pickup::PickupKind;
use crate::simulation::Simulation;
use crate::sink::CombatSink;
use crate::vitals::{PoiseConfig, VitalFractions};

use super::helpers::{
    aggressive_boss, count_cues, count_hits_on, drain, health, new_sim, phase, position,
    spawn_duel, step_collect, step_until, teleport,
};

const TICKS_PER_SECOND: usize = 60;

fn is_armed(sim: &Simulation, id: ActorId) -> bool {
    sim.actor(id)
        .and_then(Actor::action)
        .is_some_and(ActionMachine::is_armed)
}

fn press(sim: &mut Simulation, player: ActorId, input: PlayerInput) {
    sim.set_input(player, input)
        .unwrap_or_else(|e| panic!("input rejected: {e}"));
}

// =============================================================================
// Boss vs Idle Player
// =============================================================================

#[test]
fn boss_kills_idle_player_and_death_is_final() {
    let mut sim = new_sim(3);
    let (player, boss) = spawn_duel(&mut sim, 2.5, &aggressive_boss());

    let (died, events) = step_until(&mut sim, 120 * TICKS_PER_SECOND, |sim, _| {
        sim.actor(player).is_some_and(Actor::is_dead)
    });
    assert!(died, "boss should kill a player that never moves");

    // 100 health, 20 per hit.
    assert_eq!(count_hits_on(&events, player), 5);
    assert_eq!(count_cues(&events, player, Cue::Hurt), 4);
    assert_eq!(count_cues(&events, player, Cue::Die), 1);
    assert!(events.contains(&Event::Hit {
        source: Some(boss),
        target: player,
        dealt: 20.0,
        killed: true,
    }));
    assert_eq!(phase(&sim, player), Some(ActionPhase::Dead));

    // Nothing happens to a dead player.
    let after = step_collect(&mut sim, 10 * TICKS_PER_SECOND);
    assert_eq!(count_hits_on(&after, player), 0);
    assert_eq!(count_cues(&after, player, Cue::Die), 0);
    assert_eq!(health(&sim, player), 0.0);
}

#[test]
fn boss_plays_attack_cues_in_combo_order() {
    let mut sim = new_sim(5);
    let (_player, boss) = spawn_duel(&mut sim, 2.5, &aggressive_boss());

    let events = step_collect(&mut sim, 30 * TICKS_PER_SECOND);
    let variants: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            Event::Cue {
                actor,
                cue: Cue::Attack(n),
            } if *actor == boss => Some(*n),
            _ => None,
        })
        .collect();

    assert!(variants.len() >= 3, "expected several attacks, got {variants:?}");
    assert_eq!(&variants[..3], &[1, 2, 3]);
}

// =============================================================================
// Leash
// =============================================================================

#[test]
fn leashed_boss_returns_home_with_full_health() {
    let mut sim = new_sim(9);
    let boss = sim.spawn_boss(Vec2::ZERO, 0.0);
    let player = sim.spawn_player(Vec2::new(8.0, 0.0), std::f32::consts::PI);
    if let Some(actor) = sim.arena_mut().get_mut(boss) {
        actor.apply_damage(30.0);
        actor.apply_poise_damage(60.0);
    }

    let mut leashed = false;
    let mut events = Vec::new();
    for _ in 0..60 * TICKS_PER_SECOND {
        if !leashed {
            // Stay just ahead of the boss so it keeps chasing.
            let lure = position(&sim, boss) + Vec2::new(8.0, 0.0);
            teleport(&mut sim, player, lure);
        }
        sim.step_fixed();
        let batch = drain(&mut sim);
        leashed |= batch.contains(&Event::Leashed { actor: boss });
        events.extend(batch);
        if events.contains(&Event::ReturnedHome { actor: boss }) {
            break;
        }
    }

    let leash_at = events.iter().position(|e| *e == Event::Leashed { actor: boss });
    let home_at = events
        .iter()
        .position(|e| *e == Event::ReturnedHome { actor: boss });
    assert!(leash_at.is_some(), "boss never leashed");
    assert!(home_at > leash_at, "boss never returned home");
    assert_eq!(
        events
            .iter()
            .filter(|e| **e == Event::Leashed { actor: boss })
            .count(),
        1
    );

    assert_eq!(health(&sim, boss), 100.0);
    let poise = sim
        .actor(boss)
        .and_then(|a| a.vitals().poise().map(|p| (p.current(), p.max())));
    assert_eq!(poise, Some((100.0, 100.0)));
    let home_epsilon = BossConfig::default().home_epsilon;
    assert!(position(&sim, boss).length() < home_epsilon);
    assert!(sim
        .actor(boss)
        .and_then(Actor::boss_brain)
        .is_some_and(|brain| !brain.is_returning_home()));
}

// =============================================================================
// Roll Invincibility
// =============================================================================

#[test]
fn rolling_through_the_sweep_avoids_damage() {
    let mut sim = new_sim(11);
    let player_config = PlayerConfig {
        roll: MotionConfig {
            speed: 0.0,
            duration: 0.6,
            invincibility: 0.6,
            stamina_cost: 20.0,
        },
        ..PlayerConfig::default()
    };
    let player = sim
        .spawn_player_with(Vec2::ZERO, 0.0, &player_config)
        .unwrap_or_else(|e| panic!("{e}"));
    let boss = sim
        .spawn_boss_with(Vec2::new(2.0, 0.0), std::f32::consts::PI, &aggressive_boss())
        .unwrap_or_else(|e| panic!("{e}"));

    // Wait until the boss is late in its windup.
    let (late, _) = step_until(&mut sim, 5 * TICKS_PER_SECOND, |sim, _| {
        let elapsed = sim.actor(boss).and_then(Actor::action).map(ActionMachine::elapsed);
        phase(sim, boss) == Some(ActionPhase::Windup) && elapsed.is_some_and(|t| t >= 0.65)
    });
    assert!(late);

    press(
        &mut sim,
        player,
        PlayerInput {
            roll: true,
            ..PlayerInput::default()
        },
    );
    let (recovered, events) = step_until(&mut sim, 5 * TICKS_PER_SECOND, |sim, _| {
        phase(sim, boss) == Some(ActionPhase::Recovery)
    });
    assert!(recovered);

    assert_eq!(count_cues(&events, player, Cue::Backstep), 1);
    assert_eq!(count_hits_on(&events, player), 0);
    assert_eq!(health(&sim, player), 100.0);
}

// =============================================================================
// Stagger
// =============================================================================

#[test]
fn poise_break_interrupts_boss_swing() {
    let mut sim = new_sim(13);
    let mut boss_config = aggressive_boss();
    boss_config.vitals.poise = Some(PoiseConfig {
        max: 20.0,
        ..PoiseConfig::default()
    });
    let (player, boss) = spawn_duel(&mut sim, 2.0, &boss_config);

    let (active, _) = step_until(&mut sim, 5 * TICKS_PER_SECOND, |sim, _| {
        phase(sim, boss) == Some(ActionPhase::Active)
    });
    assert!(active);
    assert!(is_armed(&sim, boss));

    press(
        &mut sim,
        player,
        PlayerInput {
            attack: true,
            ..PlayerInput::default()
        },
    );
    let (staggered, events) = step_until(&mut sim, TICKS_PER_SECOND, |sim, _| {
        phase(sim, boss) == Some(ActionPhase::Staggered)
    });
    assert!(staggered);
    assert!(!is_armed(&sim, boss));
    assert_eq!(count_cues(&events, boss, Cue::Stagger), 1);
    assert_eq!(health(&sim, boss), 80.0);

    // Stagger lasts two seconds and refills poise on exit.
    let after = step_collect(&mut sim, 2 * TICKS_PER_SECOND + 10);
    assert_ne!(phase(&sim, boss), Some(ActionPhase::Staggered));
    assert_eq!(count_cues(&after, boss, Cue::Stagger), 0);
    let poise = sim
        .actor(boss)
        .and_then(|a| a.vitals().poise().map(|p| p.current()));
    assert_eq!(poise, Some(20.0));
}

// =============================================================================
// Lock-On
// =============================================================================

#[test]
fn lock_on_acquires_and_breaks_on_distance() {
    let mut sim = new_sim(17);
    let player = sim.spawn_player(Vec2::ZERO, 0.0);
    let boss = sim.spawn_boss(Vec2::new(10.0, 0.0), std::f32::consts::PI);

    press(
        &mut sim,
        player,
        PlayerInput {
            lock_on: true,
            ..PlayerInput::default()
        },
    );
    let events = step_collect(&mut sim, 1);
    assert!(events.contains(&Event::LockOnChanged {
        actor: player,
        target: Some(boss),
    }));

    teleport(&mut sim, player, Vec2::new(-30.0, 0.0));
    let events = step_collect(&mut sim, 1);
    assert!(events.contains(&Event::LockOnChanged {
        actor: player,
        target: None,
    }));
}

// =============================================================================
// Pickups and Minions
// =============================================================================

#[test]
fn heal_pickup_restores_wounded_player() {
    let mut sim = new_sim(19);
    let player = sim.spawn_player(Vec2::ZERO, 0.0);
    if let Some(actor) = sim.arena_mut().get_mut(player) {
        actor.apply_damage(50.0);
    }
    let pickup = sim.spawn_pickup(PickupKind::Heal, Vec2::new(0.3, 0.0));

    let events = step_collect(&mut sim, 1);
    assert!(events.contains(&Event::PickupConsumed {
        pickup,
        actor: player
    }));
    assert_eq!(health(&sim, player), 75.0);
    assert!(sim.arena().pickup(pickup).is_none());
}

/// Presses attack once, then plays the swing out in steps of `dt`.
fn swing_at_minion(dt: f32, steps: usize) -> f32 {
    let mut sim = new_sim(31);
    let player = sim.spawn_player(Vec2::ZERO, 0.0);
    let minion = sim.spawn_minion(Vec2::new(1.5, 0.0), std::f32::consts::PI);
    press(
        &mut sim,
        player,
        PlayerInput {
            attack: true,
            ..PlayerInput::default()
        },
    );
    sim.step(0.01);
    for _ in 0..steps {
        sim.step(dt);
    }
    health(&sim, minion)
}

#[test]
fn coarse_steps_still_land_the_swing() {
    let fine = swing_at_minion(1.0 / 60.0, 2 * TICKS_PER_SECOND);
    let coarse = swing_at_minion(1.0, 2);

    // 30 health, one 20 damage hit either way.
    assert_eq!(fine, 10.0);
    assert_eq!(coarse, fine);
}

#[test]
fn minion_dies_exactly_once() {
    let mut sim = new_sim(23);
    let player = sim.spawn_player(Vec2::ZERO, 0.0);
    let minion = sim.spawn_minion(Vec2::new(1.5, 0.0), 0.0);

    let mut events = Vec::new();
    for _ in 0..6 {
        press(
            &mut sim,
            player,
            PlayerInput {
                attack: true,
                ..PlayerInput::default()
            },
        );
        events.extend(step_collect(&mut sim, TICKS_PER_SECOND));
    }

    // 30 health, 20 per hit.
    assert_eq!(count_hits_on(&events, minion), 2);
    assert_eq!(count_cues(&events, minion, Cue::Die), 1);
    assert!(sim.actor(minion).is_some_and(Actor::is_dead));
}

// =============================================================================
// Sinks
// =============================================================================

#[derive(Default)]
struct Presentation {
    cues: Vec<(ActorId, Cue)>,
    health: Vec<(ActorId, f32)>,
}

impl CombatSink for Presentation {
    fn play_cue(&mut self, actor: ActorId, cue: Cue) {
        self.cues.push((actor, cue));
    }

    fn vitals_changed(&mut self, actor: ActorId, fractions: VitalFractions) {
        self.health.push((actor, fractions.health));
    }
}

#[test]
fn dispatch_forwards_cues_and_vitals() {
    let mut sim = new_sim(29);
    let player = sim.spawn_player(Vec2::ZERO, 0.0);
    press(
        &mut sim,
        player,
        PlayerInput {
            attack: true,
            ..PlayerInput::default()
        },
    );
    sim.step_fixed();

    let mut presentation = Presentation::default();
    sim.dispatch(&mut presentation);

    assert!(presentation.cues.contains(&(player, Cue::Attack(1))));
    assert_eq!(presentation.health, vec![(player, 1.0)]);
    assert!(sim.take_events().is_empty());
}

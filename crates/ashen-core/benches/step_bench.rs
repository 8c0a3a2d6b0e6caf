use ashen_core::config::SimConfig;
use ashen_core::controller::PlayerInput;
use ashen_core::simulation::Simulation;
use ashen_core::world_view::WorldView;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec2;

/// One player, one boss and a ring of minions around the arena centre.
fn crowded_arena(minions: usize) -> Simulation {
    let mut sim = Simulation::new(SimConfig::with_seed(42)).expect("default config is valid");
    sim.spawn_player(Vec2::ZERO, 0.0);
    sim.spawn_boss(Vec2::new(4.0, 0.0), std::f32::consts::PI);
    for i in 0..minions {
        let angle = i as f32 / minions as f32 * std::f32::consts::TAU;
        sim.spawn_minion(Vec2::from_angle(angle) * 10.0, angle);
    }
    sim
}

fn bench_step(c: &mut Criterion) {
    let mut sim = crowded_arena(8);
    let player = ashen_core::ActorId::new(0);

    c.bench_function("step_duel", |b| {
        b.iter(|| {
            sim.set_input(
                player,
                PlayerInput {
                    attack: true,
                    movement: Vec2::X,
                    ..PlayerInput::default()
                },
            )
            .expect("player is controllable");
            sim.step(black_box(1.0 / 60.0));
            black_box(sim.take_events());
        })
    });
}

fn bench_step_crowded(c: &mut Criterion) {
    // Enough actors for the parallel decide phase to matter.
    let mut sim = crowded_arena(200);

    c.bench_function("step_crowded", |b| {
        b.iter(|| {
            sim.step(black_box(1.0 / 60.0));
            black_box(sim.take_events());
        })
    });
}

fn bench_capture_view(c: &mut Criterion) {
    let sim = crowded_arena(200);

    c.bench_function("capture_view", |b| {
        b.iter(|| black_box(WorldView::capture(sim.arena())))
    });
}

criterion_group!(benches, bench_step, bench_step_crowded, bench_capture_view);
criterion_main!(benches);

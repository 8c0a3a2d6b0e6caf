//! # Ashen Core
//!
//! Real-time melee combat simulation core for Ashen.
//!
//! This crate decides, tick by tick, what a boss and a player-controlled
//! actor are doing, how melee strikes connect, and how damage, stagger and
//! invincibility propagate. Rendering, animation, navigation and raw input
//! stay with the host, reached through narrow traits.
//!
//! ## Architecture
//!
//! - **Actors**: vitals, an action state machine with a weapon hitbox, a
//!   motion slot (roll, backstep, retreat) and a controller
//! - **Controllers**: the player's input-driven controller and the boss's
//!   priority-ordered combat policy
//! - **Resolvers**: movement, combat, pickups, hits and event recording
//!
//! Each tick snapshots the arena, lets every actor decide in parallel
//! against the snapshot, then resolves outputs sequentially in actor-id
//! order. See [`simulation`] for the pipeline.
//!
//! ## Usage
//!
//! ```
//! use ashen_core::config::SimConfig;
//! use ashen_core::controller::PlayerInput;
//! use ashen_core::simulation::Simulation;
//! use glam::Vec2;
//!
//! let mut sim = Simulation::new(SimConfig::with_seed(7))?;
//! let player = sim.spawn_player(Vec2::ZERO, 0.0);
//! sim.spawn_boss(Vec2::new(8.0, 0.0), std::f32::consts::PI);
//!
//! sim.set_input(player, PlayerInput { attack: true, ..PlayerInput::default() })?;
//! sim.step_fixed();
//!
//! for envelope in sim.take_events() {
//!     println!("{:?}", envelope.output());
//! }
//! # Ok::<(), ashen_core::error::SimError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod action;
pub mod actor;
pub mod arena;
pub mod config;
pub mod controller;
pub mod error;
pub mod hitbox;
pub mod logging;
pub mod output;
pub mod pickup;
pub mod resolver;
pub mod simulation;
pub mod sink;
pub mod vitals;
pub mod world_view;

pub use actor::{Actor, ActorId, ActorKind, Team};
pub use arena::Arena;
pub use config::SimConfig;
pub use error::{ConfigError, SimError};
pub use output::{Cue, Event, Output, OutputEnvelope};
pub use simulation::Simulation;
pub use sink::CombatSink;

#[cfg(test)]
mod tests;

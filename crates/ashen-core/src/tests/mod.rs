//! Crate-level scenario tests.
//!
//! - `integration.rs`: end-to-end fights through [`crate::simulation::Simulation`]
//! - `determinism.rs`: same seed and inputs give identical event streams
//! - `properties.rs`: proptest invariants for vitals, the action machine,
//!   hitboxes and perception
//! - `helpers.rs`: scenario setup and event filtering

mod helpers;
mod integration;

pub use helpers::*;

//! Resolvers turn actor outputs into state mutations.
//!
//! Resolvers are the write side of the tick. Actors decide against a frozen
//! snapshot and emit [`OutputEnvelope`]s; resolvers apply them to the arena in
//! a fixed order and report what happened as [`Event`]s.
//!
//! # Architecture
//!
//! Each resolver declares which output kinds it handles via [`Resolver::handles()`].
//! During resolution:
//! 1. Outputs are collected from every actor and sorted by (actor, sequence)
//! 2. Outputs are routed to resolvers based on their kind
//! 3. Each resolver mutates the arena in output order and pushes feedback events
//!
//! Two phases do not consume outputs and are driven directly by the
//! simulation: [`PickupResolver`] and [`HitResolver`]. Both apply their
//! effects through [`CombatResolver::apply`] so every vitals change goes
//! through one code path.
//!
//! # Invariants
//!
//! - Resolvers MUST be deterministic given the same arena and output order
//! - Resolvers MUST iterate actors in id order
//!
//! # Available Resolvers
//!
//! - [`MovementResolver`]: movement commands through a [`Locomotion`] capability
//! - [`CombatResolver`]: applies damage, poise damage, healing and damage
//!   buffs for the hit and pickup phases
//! - [`EventResolver`]: records events for presentation sinks (no state mutation)
//! - [`PickupResolver`]: consumes touched pickups
//! - [`HitResolver`]: armed hitbox overlap and hit application

mod combat;
mod event;
mod hit;
mod movement;
mod pickup;

pub use combat::CombatResolver;
pub use event::EventResolver;
pub use hit::HitResolver;
pub use movement::{Kinematic, Locomotion, MovementResolver};
pub use pickup::PickupResolver;

use crate::arena::Arena;
use crate::output::{Event, OutputEnvelope, OutputKind};

/// Per-tick values shared by every resolver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolveContext {
    /// Tick being resolved.
    pub tick: u64,
    /// Seconds covered by the tick.
    pub dt: f32,
}

/// Resolver processes outputs and mutates the arena.
///
/// # Example
///
/// ```
/// use ashen_core::arena::Arena;
/// use ashen_core::output::{Event, OutputEnvelope, OutputKind};
/// use ashen_core::resolver::{ResolveContext, Resolver};
///
/// struct CountingResolver;
///
/// impl Resolver for CountingResolver {
///     fn handles(&self) -> &[OutputKind] {
///         &[OutputKind::Command]
///     }
///
///     fn resolve(
///         &self,
///         _ctx: &ResolveContext,
///         outputs: &[&OutputEnvelope],
///         _arena: &mut Arena,
///         _emitted: &mut Vec<Event>,
///     ) {
///         assert!(outputs.iter().all(|o| o.kind() == OutputKind::Command));
///     }
/// }
/// ```
pub trait Resolver: Send + Sync {
    /// Returns the output kinds this resolver handles.
    fn handles(&self) -> &[OutputKind];

    /// Applies `outputs` (already filtered by [`Resolver::handles`]) to `arena`.
    ///
    /// Anything worth reporting is pushed onto `emitted`.
    fn resolve(
        &self,
        ctx: &ResolveContext,
        outputs: &[&OutputEnvelope],
        arena: &mut Arena,
        emitted: &mut Vec<Event>,
    );
}

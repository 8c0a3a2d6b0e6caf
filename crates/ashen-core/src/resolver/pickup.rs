//! Pickup consumption.

use tracing::debug;

use crate::actor::{ActorId, Team};
use crate::arena::Arena;
use crate::output::Event;
use crate::pickup::PickupId;

use super::CombatResolver;

/// Consumes pickups touched by living player-team actors.
///
/// Pickups are checked in id order; each goes to the lowest-id toucher.
#[derive(Debug, Clone, Copy, Default)]
pub struct PickupResolver;

impl PickupResolver {
    /// Creates a new pickup resolver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Applies and removes every touched pickup.
    pub fn resolve(&self, arena: &mut Arena, combat: &CombatResolver, emitted: &mut Vec<Event>) {
        let claims: Vec<(PickupId, ActorId)> = arena
            .pickups_sorted()
            .filter_map(|pickup| {
                arena
                    .actors_sorted()
                    .filter(|actor| actor.team() == Team::Player && !actor.is_dead())
                    .find(|actor| pickup.touches(actor.transform().position, actor.body_radius()))
                    .map(|actor| (pickup.id(), actor.id()))
            })
            .collect();

        for (pickup_id, actor) in claims {
            let Some(pickup) = arena.take_pickup(pickup_id) else {
                continue;
            };
            debug!(pickup = %pickup_id, actor = %actor, kind = ?pickup.kind(), "pickup consumed");
            combat.apply(&pickup.modifier(actor), arena, emitted);
            emitted.push(Event::PickupConsumed {
                pickup: pickup_id,
                actor,
            });
        }
    }
}

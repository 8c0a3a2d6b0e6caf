//! Hit resolution for armed weapon hitboxes.
//!
//! Attackers are processed one at a time in id order. For each armed hitbox,
//! and for each hitbox whose window closed this tick before its arm sweep ran,
//! the volume in front of the attacker is queried through [`OverlapQuery`],
//! filtered by the hitbox's sweep and hit memory, and every resulting strike
//! is applied to its target immediately. A target staggered or killed by an
//! earlier attacker therefore has its own hitbox disarmed before its turn.

use tracing::trace;

use crate::actor::ActorId;
use crate::arena::{Arena, OverlapQuery};
use crate::hitbox::Candidate;
use crate::output::{Event, Modifier};

use super::CombatResolver;

/// Resolves armed hitboxes against the arena.
///
/// # Example
///
/// ```
/// use ashen_core::arena::Arena;
/// use ashen_core::resolver::{CombatResolver, HitResolver};
///
/// let mut arena = Arena::new();
/// let mut emitted = Vec::new();
/// HitResolver::new().resolve(&mut arena, &CombatResolver::new(), &mut emitted);
/// assert!(emitted.is_empty());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HitResolver;

impl HitResolver {
    /// Creates a new hit resolver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Processes every armed hitbox in attacker id order.
    pub fn resolve(&self, arena: &mut Arena, combat: &CombatResolver, emitted: &mut Vec<Event>) {
        let attackers: Vec<ActorId> = arena.actor_ids_sorted().collect();
        for attacker in attackers {
            let overlapping = match Self::volume_overlaps(arena, attacker) {
                Some(overlapping) => overlapping,
                None => continue,
            };

            let Some(actor) = arena.get_mut(attacker) else {
                continue;
            };
            let owner_damage = Some(actor.vitals().damage());
            let Some(weapon) = actor.action_mut().and_then(|machine| machine.weapon_mut()) else {
                continue;
            };
            let strikes = weapon.resolve(attacker, owner_damage, &overlapping);

            for strike in strikes {
                trace!(attacker = %attacker, target = %strike.target, damage = strike.damage, "strike");
                combat.apply(
                    &Modifier::ApplyDamage {
                        source: Some(attacker),
                        target: strike.target,
                        amount: strike.damage,
                    },
                    arena,
                    emitted,
                );
                if strike.poise_damage > 0.0 {
                    combat.apply(
                        &Modifier::ApplyPoiseDamage {
                            source: Some(attacker),
                            target: strike.target,
                            amount: strike.poise_damage,
                        },
                        arena,
                        emitted,
                    );
                }
            }
        }
    }

    /// Living candidates inside `attacker`'s volume, or `None` when its hitbox
    /// can produce no strikes.
    fn volume_overlaps(arena: &Arena, attacker: ActorId) -> Option<Vec<Candidate>> {
        let actor = arena.get(attacker)?;
        if actor.is_dead() {
            return None;
        }
        let weapon = actor.action()?.weapon()?;
        if !weapon.is_live() {
            return None;
        }
        let transform = actor.transform();
        let (center, radius) = weapon.volume(transform.position, transform.forward());
        Some(arena.query_overlap(center, radius, weapon.config().target_team))
    }
}

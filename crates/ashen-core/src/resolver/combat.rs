//! Combat resolver for damage, poise damage, healing and damage buffs.
//!
//! The `CombatResolver` handles:
//! - `ApplyDamage`: reduce health unless the target is invincible or dead
//! - `ApplyPoiseDamage`: reduce poise, forcing a stagger when it breaks
//! - `Heal`: restore health, capped at max
//! - `IncreaseDamage`: permanently raise the damage stat
//!
//! # Preemption
//!
//! Lethal damage and poise breaks preempt the target's action machine on the
//! spot: the machine moves to `Dead` or `Staggered` and disarms its hitbox
//! before this call returns.

use tracing::debug;

use crate::actor::ActorKind;
use crate::arena::Arena;
use crate::output::{Cue, Event, Modifier};
use crate::vitals::{DamageOutcome, PoiseOutcome};

/// Applier for vitals modifiers.
///
/// Modifiers are applied one at a time, in the order the hit and pickup
/// phases produce them.
///
/// # Example
///
/// ```
/// use ashen_core::arena::Arena;
/// use ashen_core::actor::ActorId;
/// use ashen_core::output::Modifier;
/// use ashen_core::resolver::CombatResolver;
///
/// // Modifiers aimed at missing actors are dropped.
/// let mut arena = Arena::new();
/// let mut emitted = Vec::new();
/// let heal = Modifier::Heal { target: ActorId::new(9), amount: 10.0 };
/// CombatResolver::new().apply(&heal, &mut arena, &mut emitted);
/// assert!(emitted.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CombatResolver;

impl CombatResolver {
    /// Creates a new combat resolver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Applies one modifier, pushing hit, cue and death feedback onto `emitted`.
    pub fn apply(&self, modifier: &Modifier, arena: &mut Arena, emitted: &mut Vec<Event>) {
        let target = modifier.target();
        let Some(actor) = arena.get_mut(target) else {
            return;
        };

        match *modifier {
            Modifier::ApplyDamage { source, amount, .. } => match actor.apply_damage(amount) {
                DamageOutcome::Ignored => {}
                DamageOutcome::Applied { dealt } => {
                    emitted.push(Event::Hit {
                        source,
                        target,
                        dealt,
                        killed: false,
                    });
                    // Bosses express hits through poise instead.
                    if actor.kind() != ActorKind::Boss {
                        emitted.push(Event::cue(target, Cue::Hurt));
                    }
                }
                DamageOutcome::Killed { dealt } => {
                    debug!(actor = %target, killer = ?source, "died");
                    emitted.push(Event::Hit {
                        source,
                        target,
                        dealt,
                        killed: true,
                    });
                    emitted.push(Event::cue(target, Cue::Die));
                }
            },
            Modifier::ApplyPoiseDamage { amount, .. } => {
                if actor.apply_poise_damage(amount) == PoiseOutcome::Broken {
                    debug!(actor = %target, "poise broken");
                    emitted.push(Event::cue(target, Cue::Stagger));
                }
            }
            Modifier::Heal { amount, .. } => {
                actor.heal(amount);
            }
            Modifier::IncreaseDamage { amount, .. } => {
                actor.increase_damage(amount);
                debug!(actor = %target, damage = actor.vitals().damage(), "damage increased");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionPhase;
    use crate::actor::{Actor, ActorId, TransformState};
    use crate::config::{BossConfig, MinionConfig, PlayerConfig};

    fn arena_with(make: impl FnOnce(ActorId) -> Actor) -> (Arena, ActorId) {
        let mut arena = Arena::new();
        let id = arena.spawn(make);
        (arena, id)
    }

    fn minion() -> (Arena, ActorId) {
        let config = MinionConfig::default();
        arena_with(|id| Actor::minion(id, TransformState::default(), &config))
    }

    fn damage(target: ActorId, amount: f32) -> Modifier {
        Modifier::ApplyDamage {
            source: None,
            target,
            amount,
        }
    }

    mod damage_tests {
        use super::*;

        #[test]
        fn surviving_hit_reports_hit_and_hurt() {
            let (mut arena, id) = minion();
            let mut emitted = Vec::new();
            CombatResolver::new().apply(&damage(id, 10.0), &mut arena, &mut emitted);

            assert_eq!(
                emitted,
                vec![
                    Event::Hit {
                        source: None,
                        target: id,
                        dealt: 10.0,
                        killed: false
                    },
                    Event::cue(id, Cue::Hurt),
                ]
            );
        }

        #[test]
        fn death_is_reported_exactly_once() {
            let (mut arena, id) = minion();
            let resolver = CombatResolver::new();
            let mut emitted = Vec::new();
            for _ in 0..3 {
                resolver.apply(&damage(id, 20.0), &mut arena, &mut emitted);
            }
            let deaths = emitted
                .iter()
                .filter(|e| matches!(e, Event::Cue { cue: Cue::Die, .. }))
                .count();
            assert_eq!(deaths, 1);
            assert!(arena.get(id).is_some_and(Actor::is_dead));
        }

        #[test]
        fn boss_hit_has_no_hurt_cue() {
            let config = BossConfig::default();
            let (mut arena, id) =
                arena_with(|id| Actor::boss(id, TransformState::default(), &config, 0));
            let mut emitted = Vec::new();
            CombatResolver::new().apply(&damage(id, 10.0), &mut arena, &mut emitted);
            assert_eq!(emitted.len(), 1);
        }
    }

    mod poise_tests {
        use super::*;

        #[test]
        fn poise_break_staggers_and_cues() {
            let config = BossConfig::default();
            let (mut arena, id) =
                arena_with(|id| Actor::boss(id, TransformState::default(), &config, 0));
            let resolver = CombatResolver::new();
            let mut emitted = Vec::new();
            for _ in 0..4 {
                resolver.apply(
                    &Modifier::ApplyPoiseDamage {
                        source: None,
                        target: id,
                        amount: 30.0,
                    },
                    &mut arena,
                    &mut emitted,
                );
            }
            assert_eq!(emitted, vec![Event::cue(id, Cue::Stagger)]);
            assert_eq!(arena.get(id).map(Actor::phase), Some(ActionPhase::Staggered));
        }
    }

    mod stat_tests {
        use super::*;

        #[test]
        fn heal_and_buff_apply_in_order() {
            let config = PlayerConfig::default();
            let (mut arena, id) =
                arena_with(|id| Actor::player(id, TransformState::default(), &config));
            if let Some(actor) = arena.get_mut(id) {
                actor.apply_damage(50.0);
            }

            let resolver = CombatResolver::new();
            let mut emitted = Vec::new();
            for modifier in [
                Modifier::Heal {
                    target: id,
                    amount: 25.0,
                },
                Modifier::IncreaseDamage {
                    target: id,
                    amount: 5.0,
                },
            ] {
                resolver.apply(&modifier, &mut arena, &mut emitted);
            }
            assert!(emitted.is_empty());

            let vitals = arena.get(id).map(|a| a.vitals().clone());
            assert_eq!(vitals.as_ref().map(|v| v.health().current()), Some(75.0));
            assert_eq!(vitals.map(|v| v.damage()), Some(25.0));
        }
    }
}

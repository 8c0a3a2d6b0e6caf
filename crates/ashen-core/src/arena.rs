//! Arena module for the combat simulation.
//!
//! The Arena is the container for everything in a fight. It provides:
//! - Actor storage with deterministic iteration order (`BTreeMap`)
//! - Spatial indexing for hit-volume overlap queries
//! - Pickup storage
//! - Actor lifecycle management (spawn/despawn)
//!
//! # Spatial Index Synchronization
//!
//! **Important**: The spatial index is NOT automatically synchronized when actor
//! positions change. When modifying a position through [`Arena::get_mut`] you
//! **must** call [`Arena::update_spatial`] afterward. Spawning, despawning and
//! the movement resolver keep the index in sync on their own.
//!
//! ```
//! # use ashen_core::actor::{Actor, TransformState};
//! # use ashen_core::arena::Arena;
//! # use ashen_core::config::MinionConfig;
//! # use glam::Vec2;
//! # let mut arena = Arena::new();
//! # let id = arena.spawn(|id| Actor::minion(id, TransformState::default(), &MinionConfig::default()));
//! if let Some(actor) = arena.get_mut(id) {
//!     actor.transform_mut().position = Vec2::new(5.0, 5.0);
//! }
//! // REQUIRED: sync spatial index after position change
//! arena.update_spatial(id);
//! ```
//!
//! # Example
//!
//! ```
//! use ashen_core::actor::{Actor, Team, TransformState};
//! use ashen_core::arena::{Arena, OverlapQuery};
//! use ashen_core::config::MinionConfig;
//! use glam::Vec2;
//!
//! let mut arena = Arena::new();
//! let config = MinionConfig::default();
//! let id = arena.spawn(|id| Actor::minion(id, TransformState::at(Vec2::new(1.0, 0.0), 0.0), &config));
//!
//! let hits = arena.query_overlap(Vec2::ZERO, 0.6, Team::Enemy);
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].id, id);
//! ```

use std::collections::{BTreeMap, HashMap};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::actor::{Actor, ActorId, Team};
use crate::hitbox::Candidate;
use crate::pickup::{Pickup, PickupId, PickupKind};

// =============================================================================
// Spatial Index
// =============================================================================

/// Simple spatial index for proximity queries.
///
/// Positions live in a `HashMap`; query results are sorted by id, so the
/// map's iteration order never reaches simulation state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpatialIndex {
    positions: HashMap<ActorId, Vec2>,
}

impl SpatialIndex {
    /// Creates a new empty spatial index.
    #[must_use]
    pub fn new() -> Self {
        Self {
            positions: HashMap::new(),
        }
    }

    /// Inserts or updates an actor's position.
    pub fn insert(&mut self, id: ActorId, pos: Vec2) {
        self.positions.insert(id, pos);
    }

    /// Removes an actor from the index.
    pub fn remove(&mut self, id: ActorId) {
        self.positions.remove(&id);
    }

    /// Returns the indexed position of an actor.
    #[must_use]
    pub fn get(&self, id: ActorId) -> Option<Vec2> {
        self.positions.get(&id).copied()
    }

    /// Actors whose indexed position lies within `radius` of `center`, sorted by id.
    #[must_use]
    pub fn query_radius(&self, center: Vec2, radius: f32) -> Vec<ActorId> {
        let radius_sq = radius * radius;
        let mut results: Vec<ActorId> = self
            .positions
            .iter()
            .filter(|(_, pos)| center.distance_squared(**pos) <= radius_sq)
            .map(|(id, _)| *id)
            .collect();

        results.sort();
        results
    }

    /// Returns the number of indexed actors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

// =============================================================================
// Overlap queries
// =============================================================================

/// Sphere overlap queries used to resolve hit volumes.
///
/// Results must be sorted by id and must exclude dead actors.
pub trait OverlapQuery {
    /// Living actors of `team` whose body circle overlaps the given circle.
    fn query_overlap(&self, center: Vec2, radius: f32, team: Team) -> Vec<Candidate>;
}

// =============================================================================
// Arena
// =============================================================================

/// Combat arena containing every actor and pickup.
///
/// # Determinism
///
/// Actors live in a `BTreeMap` keyed by monotonically assigned ids, so
/// iterating always yields the same order.
///
/// # Example
///
/// ```
/// use ashen_core::actor::{Actor, TransformState};
/// use ashen_core::arena::Arena;
/// use ashen_core::config::MinionConfig;
///
/// let mut arena = Arena::new();
/// let config = MinionConfig::default();
/// let a = arena.spawn(|id| Actor::minion(id, TransformState::default(), &config));
/// let b = arena.spawn(|id| Actor::minion(id, TransformState::default(), &config));
///
/// let ids: Vec<_> = arena.actor_ids_sorted().collect();
/// assert_eq!(ids, vec![a, b]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Arena {
    next_id: u64,
    actors: BTreeMap<ActorId, Actor>,
    spatial: SpatialIndex,
    next_pickup_id: u64,
    pickups: BTreeMap<PickupId, Pickup>,
    /// Largest body radius ever spawned; widens spatial pre-filtering.
    max_body_radius: f32,
    tick: u64,
}

impl Arena {
    /// Creates a new empty arena at tick 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns an actor built by `make` from its freshly assigned id.
    pub fn spawn<F>(&mut self, make: F) -> ActorId
    where
        F: FnOnce(ActorId) -> Actor,
    {
        let id = ActorId::new(self.next_id);
        self.next_id += 1;

        let actor = make(id);
        self.spatial.insert(id, actor.transform().position);
        self.max_body_radius = self.max_body_radius.max(actor.body_radius());
        self.actors.insert(id, actor);
        id
    }

    /// Removes an actor from the arena and the spatial index.
    pub fn despawn(&mut self, id: ActorId) -> Option<Actor> {
        self.spatial.remove(id);
        self.actors.remove(&id)
    }

    /// Returns an actor by id.
    #[must_use]
    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    /// Returns an actor by id for mutation.
    #[must_use]
    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }

    /// Actor ids in sorted order.
    pub fn actor_ids_sorted(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.actors.keys().copied()
    }

    /// Actors in id order.
    pub fn actors_sorted(&self) -> impl Iterator<Item = &Actor> + '_ {
        self.actors.values()
    }

    /// Actors in id order, mutably.
    pub fn actors_sorted_mut(&mut self) -> impl Iterator<Item = &mut Actor> + '_ {
        self.actors.values_mut()
    }

    /// Number of actors.
    #[must_use]
    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// Returns true if the arena has no actors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Returns the spatial index.
    #[must_use]
    pub fn spatial(&self) -> &SpatialIndex {
        &self.spatial
    }

    /// Returns the current tick.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Advances the tick counter.
    pub fn advance_tick(&mut self) {
        self.tick += 1;
    }

    /// Re-reads an actor's position into the spatial index.
    pub fn update_spatial(&mut self, id: ActorId) {
        if let Some(actor) = self.actors.get(&id) {
            self.spatial.insert(id, actor.transform().position);
        }
    }

    // -------------------------------------------------------------------------
    // Pickups
    // -------------------------------------------------------------------------

    /// Places a pickup in the arena.
    pub fn spawn_pickup(&mut self, kind: PickupKind, amount: f32, position: Vec2, radius: f32) -> PickupId {
        let id = PickupId::new(self.next_pickup_id);
        self.next_pickup_id += 1;
        self.pickups
            .insert(id, Pickup::new(id, kind, amount, position, radius));
        id
    }

    /// Returns a pickup by id.
    #[must_use]
    pub fn pickup(&self, id: PickupId) -> Option<&Pickup> {
        self.pickups.get(&id)
    }

    /// Pickups in id order.
    pub fn pickups_sorted(&self) -> impl Iterator<Item = &Pickup> + '_ {
        self.pickups.values()
    }

    /// Removes and returns a pickup.
    pub fn take_pickup(&mut self, id: PickupId) -> Option<Pickup> {
        self.pickups.remove(&id)
    }
}

impl OverlapQuery for Arena {
    fn query_overlap(&self, center: Vec2, radius: f32, team: Team) -> Vec<Candidate> {
        self.spatial
            .query_radius(center, radius + self.max_body_radius)
            .into_iter()
            .filter_map(|id| self.actors.get(&id))
            .filter(|actor| actor.team() == team && !actor.is_dead())
            .filter(|actor| {
                let reach = radius + actor.body_radius();
                actor.transform().position.distance_squared(center) <= reach * reach
            })
            .map(|actor| Candidate {
                id: actor.id(),
                team: actor.team(),
            })
            .collect()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::TransformState;
    use crate::config::{MinionConfig, PlayerConfig};

    fn minion_at(arena: &mut Arena, x: f32) -> ActorId {
        let config = MinionConfig::default();
        arena.spawn(|id| Actor::minion(id, TransformState::at(Vec2::new(x, 0.0), 0.0), &config))
    }

    mod spatial_index_tests {
        use super::*;

        #[test]
        fn insert_updates_existing() {
            let mut index = SpatialIndex::new();
            let id = ActorId::new(1);

            index.insert(id, Vec2::new(1.0, 2.0));
            index.insert(id, Vec2::new(3.0, 4.0));

            assert_eq!(index.get(id), Some(Vec2::new(3.0, 4.0)));
            assert_eq!(index.len(), 1);
        }

        #[test]
        fn query_radius_returns_sorted_results() {
            let mut index = SpatialIndex::new();
            index.insert(ActorId::new(5), Vec2::new(1.0, 0.0));
            index.insert(ActorId::new(2), Vec2::new(2.0, 0.0));
            index.insert(ActorId::new(8), Vec2::new(3.0, 0.0));
            index.insert(ActorId::new(1), Vec2::new(30.0, 0.0));

            assert_eq!(
                index.query_radius(Vec2::ZERO, 10.0),
                vec![ActorId::new(2), ActorId::new(5), ActorId::new(8)]
            );
        }

        #[test]
        fn remove_nonexistent_is_noop() {
            let mut index = SpatialIndex::new();
            index.remove(ActorId::new(9));
            assert!(index.is_empty());
        }
    }

    mod arena_tests {
        use super::*;

        #[test]
        fn ids_are_monotonic_and_never_reused() {
            let mut arena = Arena::new();
            let a = minion_at(&mut arena, 0.0);
            arena.despawn(a);
            let b = minion_at(&mut arena, 0.0);
            assert!(b > a);
            assert_eq!(arena.actor_count(), 1);
            assert!(arena.spatial().get(a).is_none());
        }

        #[test]
        fn update_spatial_tracks_moves() {
            let mut arena = Arena::new();
            let id = minion_at(&mut arena, 0.0);
            if let Some(actor) = arena.get_mut(id) {
                actor.transform_mut().position = Vec2::new(7.0, 0.0);
            }
            arena.update_spatial(id);
            assert_eq!(arena.spatial().get(id), Some(Vec2::new(7.0, 0.0)));
        }

        #[test]
        fn pickups_are_stored_in_id_order() {
            let mut arena = Arena::new();
            let first = arena.spawn_pickup(PickupKind::Heal, 25.0, Vec2::ZERO, 0.5);
            let second = arena.spawn_pickup(PickupKind::Damage, 5.0, Vec2::ONE, 0.5);
            let ids: Vec<_> = arena.pickups_sorted().map(Pickup::id).collect();
            assert_eq!(ids, vec![first, second]);
            assert!(arena.take_pickup(first).is_some());
            assert!(arena.pickup(first).is_none());
        }
    }

    mod overlap_tests {
        use super::*;

        #[test]
        fn overlap_accounts_for_body_radius() {
            let mut arena = Arena::new();
            let touching = minion_at(&mut arena, 1.4);
            let _outside = minion_at(&mut arena, 1.6);

            let hits = arena.query_overlap(Vec2::ZERO, 1.0, Team::Enemy);
            assert_eq!(hits.iter().map(|c| c.id).collect::<Vec<_>>(), vec![touching]);
        }

        #[test]
        fn overlap_filters_team_and_dead() {
            let mut arena = Arena::new();
            let dead = minion_at(&mut arena, 0.5);
            let alive = minion_at(&mut arena, 0.5);
            let player_config = PlayerConfig::default();
            arena.spawn(|id| Actor::player(id, TransformState::default(), &player_config));
            if let Some(actor) = arena.get_mut(dead) {
                actor.apply_damage(1000.0);
            }

            let hits = arena.query_overlap(Vec2::ZERO, 1.0, Team::Enemy);
            assert_eq!(hits.iter().map(|c| c.id).collect::<Vec<_>>(), vec![alive]);
        }
    }
}

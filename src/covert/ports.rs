//! Narrow read/write ports onto the polity records the engine operates on.
//!
//! The engine owns none of this state. Adapters (the in-memory
//! [`World`](crate::model::World), or a persistence-backed store) implement both
//! traits; everything in `covert` is generic over [`PolityStore`].

use crate::id::{CapabilityId, CharacterId, EventId, FactionId, PolityId};
use crate::model::{
    ActorSnapshot, CapabilityInstance, Character, Creed, FactionSeed, MemoryEvent, Relationship,
    RelationshipUpdate, Rivalry, StatDeltas, WorldEvent,
};

pub trait PolityRead {
    fn actor(&self, id: PolityId) -> Option<ActorSnapshot>;

    /// Every non-eliminated polity, ascending by ID.
    fn roster(&self) -> Vec<PolityId>;

    /// Bilateral standing; pairs with no record read as neutral with zero trust.
    fn relationship(&self, a: PolityId, b: PolityId) -> Relationship;

    /// Memories held by `actor`, oldest first.
    fn memories(&self, actor: PolityId) -> Vec<MemoryEvent>;

    /// Every instance `owner` has ever placed at `target`, lost ones included.
    fn capability_instances(&self, owner: PolityId, target: PolityId) -> Vec<CapabilityInstance>;

    fn rivalries(&self, actor: PolityId) -> Vec<Rivalry>;

    fn creed(&self, actor: PolityId) -> Option<Creed>;

    /// Living characters on `polity`'s roster, ascending by ID.
    fn characters(&self, polity: PolityId) -> Vec<Character>;

    fn current_tick(&self) -> u64;
}

pub trait PolityWrite {
    fn apply_stat_delta(&mut self, target: PolityId, deltas: &StatDeltas);
    fn set_relationship(&mut self, a: PolityId, b: PolityId, update: RelationshipUpdate);
    fn invalidate_capability_instance(&mut self, id: CapabilityId);
    fn establish_capability(&mut self, owner: PolityId, target: PolityId, skill: f64)
    -> CapabilityId;
    fn emit_world_event(&mut self, event: WorldEvent) -> EventId;
    fn emit_memory_event(&mut self, memory: MemoryEvent);

    // Roster mutations used by special-effect handlers.
    fn move_character(&mut self, character: CharacterId, to: PolityId);
    fn kill_character(&mut self, character: CharacterId);
    fn spawn_faction(&mut self, seed: FactionSeed) -> FactionId;
    fn mark_sick(&mut self, target: PolityId, fraction: f64);
}

pub trait PolityStore: PolityRead + PolityWrite {}

impl<T: PolityRead + PolityWrite> PolityStore for T {}

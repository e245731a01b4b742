use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::capability::{CapabilityInstance, CapabilityStatus};
use super::character::{Character, Faction, FactionSeed, Role};
use super::event::{RecordedEvent, WorldEvent};
use super::memory::MemoryEvent;
use super::polity::{ActorSnapshot, Creed, Personality, Rivalry, StatDeltas};
use super::relationship::{RelationKey, Relationship, RelationshipUpdate};
use crate::covert::ports::{PolityRead, PolityWrite};
use crate::id::{CapabilityId, CharacterId, EventId, FactionId, IdGenerator, PolityId};

/// A polity record as the in-memory world stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polity {
    pub stats: ActorSnapshot,
    pub creed: Option<Creed>,
    pub rivalries: Vec<Rivalry>,
    /// Fraction of the population currently sick, 0.0–1.0.
    pub sick_fraction: f64,
}

/// In-memory adapter backing every engine port.
///
/// All collections are ordered maps so iteration, and therefore every seeded
/// run, is reproducible.
#[derive(Debug)]
pub struct World {
    pub polities: BTreeMap<PolityId, Polity>,
    pub relationships: BTreeMap<RelationKey, Relationship>,
    pub memories: BTreeMap<PolityId, Vec<MemoryEvent>>,
    pub capabilities: BTreeMap<CapabilityId, CapabilityInstance>,
    pub characters: BTreeMap<CharacterId, Character>,
    pub factions: BTreeMap<FactionId, Faction>,
    pub events: Vec<RecordedEvent>,
    pub id_gen: IdGenerator,
    pub current_tick: u64,
}

impl World {
    pub fn new() -> Self {
        Self {
            polities: BTreeMap::new(),
            relationships: BTreeMap::new(),
            memories: BTreeMap::new(),
            capabilities: BTreeMap::new(),
            characters: BTreeMap::new(),
            factions: BTreeMap::new(),
            events: Vec::new(),
            id_gen: IdGenerator::new(),
            current_tick: 0,
        }
    }

    /// Add a polity with neutral baseline stats. Returns the assigned ID.
    pub fn add_polity(&mut self, name: &str) -> PolityId {
        let id: PolityId = self.id_gen.next();
        let stats = ActorSnapshot {
            id,
            name: name.to_string(),
            population: 100.0,
            food: 50.0,
            wealth: 50.0,
            military: 50.0,
            happiness: 50.0,
            influence: 50.0,
            technology: 20.0,
            knowledge: 20.0,
            counter_intel: 20.0,
            personality: Personality::default(),
            eliminated: false,
        };
        self.polities.insert(
            id,
            Polity {
                stats,
                creed: None,
                rivalries: Vec::new(),
                sick_fraction: 0.0,
            },
        );
        id
    }

    /// Look up a polity.
    ///
    /// # Panics
    /// Panics if `id` does not exist in the world.
    pub fn polity(&self, id: PolityId) -> &Polity {
        self.polities
            .get(&id)
            .unwrap_or_else(|| panic!("polity {id} not found"))
    }

    /// # Panics
    /// Panics if `id` does not exist in the world.
    pub fn polity_mut(&mut self, id: PolityId) -> &mut Polity {
        self.polities
            .get_mut(&id)
            .unwrap_or_else(|| panic!("polity {id} not found"))
    }

    pub fn add_character(&mut self, polity: PolityId, name: &str, role: Role) -> CharacterId {
        let id: CharacterId = self.id_gen.next();
        self.characters.insert(
            id,
            Character {
                id,
                name: name.to_string(),
                polity,
                role,
                alive: true,
            },
        );
        id
    }

    pub fn add_capability(&mut self, owner: PolityId, target: PolityId, skill: f64) -> CapabilityId {
        let id: CapabilityId = self.id_gen.next();
        self.capabilities.insert(
            id,
            CapabilityInstance {
                id,
                owner,
                target,
                skill: skill.clamp(0.0, 100.0),
                status: CapabilityStatus::Active,
            },
        );
        id
    }

    pub fn add_memory(&mut self, memory: MemoryEvent) {
        self.memories.entry(memory.actor).or_default().push(memory);
    }

    pub fn relationship_mut(&mut self, a: PolityId, b: PolityId) -> &mut Relationship {
        self.relationships.entry(RelationKey::new(a, b)).or_default()
    }

    /// Events of the given kind, in emission order.
    pub fn events_of(
        &self,
        kind: super::event::WorldEventKind,
    ) -> impl Iterator<Item = &RecordedEvent> {
        self.events.iter().filter(move |e| e.event.kind == kind)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl PolityRead for World {
    fn actor(&self, id: PolityId) -> Option<ActorSnapshot> {
        self.polities.get(&id).map(|p| p.stats.clone())
    }

    fn roster(&self) -> Vec<PolityId> {
        self.polities
            .values()
            .filter(|p| !p.stats.eliminated)
            .map(|p| p.stats.id)
            .collect()
    }

    fn relationship(&self, a: PolityId, b: PolityId) -> Relationship {
        self.relationships
            .get(&RelationKey::new(a, b))
            .cloned()
            .unwrap_or_default()
    }

    fn memories(&self, actor: PolityId) -> Vec<MemoryEvent> {
        self.memories.get(&actor).cloned().unwrap_or_default()
    }

    fn capability_instances(&self, owner: PolityId, target: PolityId) -> Vec<CapabilityInstance> {
        self.capabilities
            .values()
            .filter(|c| c.owner == owner && c.target == target)
            .cloned()
            .collect()
    }

    fn rivalries(&self, actor: PolityId) -> Vec<Rivalry> {
        self.polities
            .get(&actor)
            .map(|p| p.rivalries.clone())
            .unwrap_or_default()
    }

    fn creed(&self, actor: PolityId) -> Option<Creed> {
        self.polities.get(&actor).and_then(|p| p.creed.clone())
    }

    fn characters(&self, polity: PolityId) -> Vec<Character> {
        self.characters
            .values()
            .filter(|c| c.alive && c.polity == polity)
            .cloned()
            .collect()
    }

    fn current_tick(&self) -> u64 {
        self.current_tick
    }
}

impl PolityWrite for World {
    fn apply_stat_delta(&mut self, target: PolityId, deltas: &StatDeltas) {
        if let Some(p) = self.polities.get_mut(&target) {
            p.stats.apply_clamped(deltas);
        }
    }

    fn set_relationship(&mut self, a: PolityId, b: PolityId, update: RelationshipUpdate) {
        self.relationship_mut(a, b).apply(&update);
    }

    fn invalidate_capability_instance(&mut self, id: CapabilityId) {
        if let Some(c) = self.capabilities.get_mut(&id) {
            c.status = CapabilityStatus::Captured;
        }
    }

    fn establish_capability(&mut self, owner: PolityId, target: PolityId, skill: f64) -> CapabilityId {
        self.add_capability(owner, target, skill)
    }

    fn emit_world_event(&mut self, event: WorldEvent) -> EventId {
        let id: EventId = self.id_gen.next();
        self.events.push(RecordedEvent { id, event });
        id
    }

    fn emit_memory_event(&mut self, memory: MemoryEvent) {
        self.add_memory(memory);
    }

    fn move_character(&mut self, character: CharacterId, to: PolityId) {
        if let Some(c) = self.characters.get_mut(&character) {
            c.polity = to;
        }
    }

    fn kill_character(&mut self, character: CharacterId) {
        if let Some(c) = self.characters.get_mut(&character) {
            c.alive = false;
        }
    }

    fn spawn_faction(&mut self, seed: FactionSeed) -> FactionId {
        let id: FactionId = self.id_gen.next();
        self.factions.insert(id, Faction { id, seed });
        id
    }

    fn mark_sick(&mut self, target: PolityId, fraction: f64) {
        if let Some(p) = self.polities.get_mut(&target) {
            p.sick_fraction = (p.sick_fraction + fraction).clamp(0.0, 1.0);
        }
    }
}

#[macro_use]
mod macros;

pub mod capability;
pub mod character;
pub mod event;
pub mod memory;
pub mod polity;
pub mod relationship;
pub mod world;

pub use capability::{CapabilityInstance, CapabilityStatus};
pub use character::{Character, Faction, FactionKind, FactionSeed, Role};
pub use event::{RecordedEvent, Severity, WorldEvent, WorldEventKind};
pub use memory::{MemoryEvent, MemoryKind};
pub use polity::{
    ActorSnapshot, Creed, Personality, Rivalry, RivalryStatus, StatBound, StatDeltas, StatKey,
};
pub use relationship::{DiplomaticStatus, RelationKey, Relationship, RelationshipUpdate};
pub use world::{Polity, World};

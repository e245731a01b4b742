//! Covert operations for a turn-based grand strategy simulation: why polities
//! scheme against each other, how their schemes resolve, and how victims answer.

#[macro_use]
pub mod model;

pub mod covert;
pub mod flush;
pub mod id;
pub mod scenario;
pub mod sim;
pub mod testutil;

pub use covert::{
    ActionKind, Catalog, CovertConfig, CovertError, PolityRead, PolityStore, PolityWrite,
    PressureReport, Resolution, ResolutionResult, RetaliationOutcome, assess_pressure,
    maybe_retaliate, resolve,
};
pub use id::{CapabilityId, CharacterId, EventId, FactionId, IdGenerator, PolityId};
pub use model::World;
pub use scenario::Scenario;

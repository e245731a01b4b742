//! Covert operations engine.
//!
//! Pipeline per actor: [`motive::assess_pressure`] (which ranks targets via
//! [`targeting`]) feeds an external decision to attempt, [`resolver::resolve`]
//! carries the attempt out, and [`retaliation::maybe_retaliate`] answers a
//! detected one. All state access goes through the [`ports`] traits.

pub mod catalog;
pub mod config;
pub mod effects;
pub mod error;
pub mod motive;
pub mod ports;
pub mod resolver;
pub mod retaliation;
pub mod targeting;

pub use catalog::{ActionDefinition, ActionKind, Catalog, Category, SpecialEffect};
pub use config::{CovertConfig, EffectTuning};
pub use effects::RosterChange;
pub use error::{CatalogError, CovertError};
pub use motive::{Motive, MotiveKind, PressureReport, assess_pressure};
pub use ports::{PolityRead, PolityStore, PolityWrite};
pub use resolver::{Resolution, ResolutionResult, resolve};
pub use retaliation::{RetaliationOutcome, maybe_retaliate};
pub use targeting::TargetCandidate;

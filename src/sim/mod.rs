mod context;
mod covert_ops;
mod runner;
mod signal;
mod system;

pub use context::TickContext;
pub use covert_ops::CovertOpsSystem;
pub use runner::{SimConfig, dispatch_systems, run, should_fire};
pub use signal::{Signal, SignalKind};
pub use system::{SimSystem, TickFrequency};

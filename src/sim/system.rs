use super::context::TickContext;

/// How often a simulation system should tick, in world ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickFrequency {
    EveryTick,
    /// Fires on ticks divisible by the interval. An interval of 0 is treated as 1.
    Every(u64),
}

impl TickFrequency {
    pub fn interval(self) -> u64 {
        match self {
            TickFrequency::EveryTick => 1,
            TickFrequency::Every(n) => n.max(1),
        }
    }
}

/// A pluggable simulation system that runs each tick.
///
/// Object-safe so systems can be stored as `Box<dyn SimSystem>`.
pub trait SimSystem {
    fn name(&self) -> &str;
    fn frequency(&self) -> TickFrequency;
    fn tick(&mut self, ctx: &mut TickContext);

    /// React to signals emitted by other systems during the tick phase.
    ///
    /// Called once per dispatch cycle with the full signal buffer in `ctx.inbox`.
    /// Signals pushed to `ctx.signals` here are **not** re-delivered (single-pass).
    /// Default: no-op.
    fn handle_signals(&mut self, ctx: &mut TickContext) {
        let _ = ctx;
    }
}

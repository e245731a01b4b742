use std::path::PathBuf;

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

use super::context::TickContext;
use super::system::{SimSystem, TickFrequency};
use crate::covert::CovertError;
use crate::flush::flush_to_jsonl;
use crate::model::World;

/// Configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub start_tick: u64,
    pub num_ticks: u64,
    pub seed: u64,
    /// If set, flush world state every N ticks.
    pub flush_interval: Option<u64>,
    /// Directory to write flush checkpoints into.
    pub output_dir: Option<PathBuf>,
}

impl SimConfig {
    pub fn new(start_tick: u64, num_ticks: u64, seed: u64) -> Self {
        Self {
            start_tick,
            num_ticks,
            seed,
            flush_interval: None,
            output_dir: None,
        }
    }

    /// Write JSONL checkpoints into `dir` every `interval` ticks and after the last one.
    pub fn with_checkpoints(mut self, interval: u64, dir: impl Into<PathBuf>) -> Self {
        self.flush_interval = Some(interval);
        self.output_dir = Some(dir.into());
        self
    }
}

/// Returns true if a system with the given frequency should fire at this tick.
pub fn should_fire(freq: TickFrequency, tick: u64) -> bool {
    tick % freq.interval() == 0
}

/// Set `world.current_tick` and call each system whose frequency matches.
///
/// Signal delivery is **single-pass, non-cascading**:
///
/// 1. **Phase 1 (tick):** Each system's `tick()` runs in registration order.
///    All signals emitted during this phase are collected into a shared buffer.
/// 2. **Phase 2 (react):** If any signals were emitted, each system's
///    `handle_signals()` is called with the full signal buffer as `ctx.inbox`.
///    Systems may mutate the world and push new signals during this phase,
///    but those new signals are **not** delivered. They are discarded at the
///    end of the dispatch cycle.
///
/// A retaliation resolved in Phase 2 can itself be detected, but that
/// detection never triggers a counter-retaliation within the same tick.
/// Anything that should propagate must live in world state that a later
/// tick's Phase 1 observes.
pub fn dispatch_systems(
    world: &mut World,
    systems: &mut [Box<dyn SimSystem>],
    rng: &mut dyn RngCore,
    tick: u64,
) {
    world.current_tick = tick;

    // Phase 1: tick systems, collecting signals
    let mut signals = Vec::new();
    for system in systems.iter_mut() {
        if should_fire(system.frequency(), tick) {
            let mut ctx = TickContext {
                world,
                rng,
                signals: &mut signals,
                inbox: &[],
            };
            system.tick(&mut ctx);
        }
    }

    // Phase 2: deliver signals for reaction (only if any were emitted)
    if !signals.is_empty() {
        for system in systems.iter_mut() {
            if should_fire(system.frequency(), tick) {
                let mut new_signals = Vec::new();
                let mut ctx = TickContext {
                    world,
                    rng,
                    signals: &mut new_signals,
                    inbox: &signals,
                };
                system.handle_signals(&mut ctx);
                if !new_signals.is_empty() {
                    tracing::debug!(
                        system = system.name(),
                        dropped = new_signals.len(),
                        "reaction signals are not re-delivered"
                    );
                }
            }
        }
    }
}

/// Run the simulation for the configured number of ticks.
///
/// Creates a deterministic RNG from `config.seed`, so the same seed and the
/// same starting world always produce the same simulation.
pub fn run(
    world: &mut World,
    systems: &mut [Box<dyn SimSystem>],
    config: SimConfig,
) -> Result<(), CovertError> {
    if systems.is_empty() || config.num_ticks == 0 {
        return Ok(());
    }

    let mut rng = SmallRng::seed_from_u64(config.seed);
    tracing::info!(
        start_tick = config.start_tick,
        num_ticks = config.num_ticks,
        seed = config.seed,
        systems = systems.len(),
        "simulation started"
    );

    for offset in 0..config.num_ticks {
        let tick = config.start_tick + offset;
        dispatch_systems(world, systems, &mut rng, tick);

        // Flush checkpoint at configured interval
        if let (Some(interval), Some(dir)) = (config.flush_interval, &config.output_dir) {
            let is_last_tick = offset == config.num_ticks - 1;
            if is_last_tick || (offset + 1) % interval.max(1) == 0 {
                let checkpoint_dir = dir.join(format!("tick_{tick:06}"));
                flush_to_jsonl(world, &checkpoint_dir)?;
                tracing::debug!(tick, dir = %checkpoint_dir.display(), "checkpoint written");
            }
        }
    }

    tracing::info!(
        final_tick = world.current_tick,
        events = world.events.len(),
        "simulation finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::model::{Severity, WorldEvent, WorldEventKind};
    use crate::covert::PolityWrite;
    use crate::sim::signal::{Signal, SignalKind};

    // -- Test helpers --

    struct CountingSystem {
        sys_name: String,
        freq: TickFrequency,
        count: Rc<Cell<u32>>,
    }

    impl CountingSystem {
        fn new(name: &str, freq: TickFrequency, count: Rc<Cell<u32>>) -> Self {
            Self {
                sys_name: name.to_string(),
                freq,
                count,
            }
        }
    }

    impl SimSystem for CountingSystem {
        fn name(&self) -> &str {
            &self.sys_name
        }
        fn frequency(&self) -> TickFrequency {
            self.freq
        }
        fn tick(&mut self, _ctx: &mut TickContext) {
            self.count.set(self.count.get() + 1);
        }
    }

    fn ping() -> Signal {
        Signal {
            event_id: None,
            kind: SignalKind::Custom {
                name: "ping".to_string(),
                data: serde_json::Value::Null,
            },
        }
    }

    // -- should_fire tests --

    #[test]
    fn should_fire_every_tick_always() {
        for tick in [0, 1, 7, 1000] {
            assert!(should_fire(TickFrequency::EveryTick, tick));
        }
    }

    #[test]
    fn should_fire_on_interval_multiples() {
        assert!(should_fire(TickFrequency::Every(5), 0));
        assert!(should_fire(TickFrequency::Every(5), 10));
        assert!(!should_fire(TickFrequency::Every(5), 3));
        assert!(!should_fire(TickFrequency::Every(5), 11));
    }

    // -- run() tests --

    #[test]
    fn empty_systems_noop() {
        let mut world = World::new();
        let mut systems: Vec<Box<dyn SimSystem>> = vec![];
        run(&mut world, &mut systems, SimConfig::new(3, 10, 0)).unwrap();
        assert_eq!(world.current_tick, 0);
        assert!(world.events.is_empty());
    }

    #[test]
    fn zero_ticks_noop() {
        let count = Rc::new(Cell::new(0));
        let mut systems: Vec<Box<dyn SimSystem>> = vec![Box::new(CountingSystem::new(
            "test",
            TickFrequency::EveryTick,
            count.clone(),
        ))];
        let mut world = World::new();
        run(&mut world, &mut systems, SimConfig::new(0, 0, 0)).unwrap();
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn every_tick_system_ticked_per_tick() {
        let count = Rc::new(Cell::new(0));
        let mut systems: Vec<Box<dyn SimSystem>> = vec![Box::new(CountingSystem::new(
            "each",
            TickFrequency::EveryTick,
            count.clone(),
        ))];
        let mut world = World::new();
        run(&mut world, &mut systems, SimConfig::new(0, 10, 0)).unwrap();
        assert_eq!(count.get(), 10);
    }

    #[test]
    fn mixed_frequencies() {
        let each = Rc::new(Cell::new(0));
        let fifth = Rc::new(Cell::new(0));
        let mut systems: Vec<Box<dyn SimSystem>> = vec![
            Box::new(CountingSystem::new("each", TickFrequency::EveryTick, each.clone())),
            Box::new(CountingSystem::new("fifth", TickFrequency::Every(5), fifth.clone())),
        ];
        let mut world = World::new();
        // ticks 1..=20: multiples of 5 are 5, 10, 15, 20
        run(&mut world, &mut systems, SimConfig::new(1, 20, 0)).unwrap();
        assert_eq!(each.get(), 20);
        assert_eq!(fifth.get(), 4);
    }

    #[test]
    fn world_tick_set_to_final_tick() {
        let count = Rc::new(Cell::new(0));
        let mut systems: Vec<Box<dyn SimSystem>> = vec![Box::new(CountingSystem::new(
            "each",
            TickFrequency::EveryTick,
            count.clone(),
        ))];
        let mut world = World::new();
        run(&mut world, &mut systems, SimConfig::new(5, 3, 0)).unwrap();
        assert_eq!(world.current_tick, 7);
    }

    #[test]
    fn system_can_mutate_world() {
        struct Chronicler;

        impl SimSystem for Chronicler {
            fn name(&self) -> &str {
                "chronicler"
            }
            fn frequency(&self) -> TickFrequency {
                TickFrequency::EveryTick
            }
            fn tick(&mut self, ctx: &mut TickContext) {
                let actor = ctx.world.add_polity("Upstart");
                let tick = ctx.world.current_tick;
                ctx.world.emit_world_event(WorldEvent {
                    tick,
                    kind: WorldEventKind::FactionFormed,
                    actor,
                    target: None,
                    title: "A new power".to_string(),
                    description: String::new(),
                    severity: Severity::Minor,
                });
            }
        }

        let mut systems: Vec<Box<dyn SimSystem>> = vec![Box::new(Chronicler)];
        let mut world = World::new();
        run(&mut world, &mut systems, SimConfig::new(0, 5, 0)).unwrap();
        assert_eq!(world.polities.len(), 5);
        assert_eq!(world.events.len(), 5);
        assert_eq!(world.events[4].event.tick, 4);
    }

    #[test]
    fn systems_called_in_registration_order() {
        struct LoggingSystem {
            sys_name: String,
            log: Rc<RefCell<Vec<String>>>,
        }

        impl SimSystem for LoggingSystem {
            fn name(&self) -> &str {
                &self.sys_name
            }
            fn frequency(&self) -> TickFrequency {
                TickFrequency::EveryTick
            }
            fn tick(&mut self, _ctx: &mut TickContext) {
                self.log.borrow_mut().push(self.sys_name.clone());
            }
        }

        let log = Rc::new(RefCell::new(Vec::new()));
        let mut systems: Vec<Box<dyn SimSystem>> = vec![
            Box::new(LoggingSystem {
                sys_name: "A".to_string(),
                log: log.clone(),
            }),
            Box::new(LoggingSystem {
                sys_name: "B".to_string(),
                log: log.clone(),
            }),
        ];
        let mut world = World::new();
        run(&mut world, &mut systems, SimConfig::new(0, 2, 0)).unwrap();
        assert_eq!(*log.borrow(), vec!["A", "B", "A", "B"]);
    }

    // -- Signal bus tests --

    struct EmitterSystem;

    impl SimSystem for EmitterSystem {
        fn name(&self) -> &str {
            "emitter"
        }
        fn frequency(&self) -> TickFrequency {
            TickFrequency::EveryTick
        }
        fn tick(&mut self, ctx: &mut TickContext) {
            ctx.signals.push(ping());
        }
    }

    #[test]
    fn signal_emitted_and_received() {
        struct ReceiverSystem {
            received: Rc<Cell<u32>>,
        }

        impl SimSystem for ReceiverSystem {
            fn name(&self) -> &str {
                "receiver"
            }
            fn frequency(&self) -> TickFrequency {
                TickFrequency::EveryTick
            }
            fn tick(&mut self, _ctx: &mut TickContext) {}
            fn handle_signals(&mut self, ctx: &mut TickContext) {
                for signal in ctx.inbox {
                    if matches!(&signal.kind, SignalKind::Custom { name, .. } if name == "ping") {
                        self.received.set(self.received.get() + 1);
                    }
                }
            }
        }

        let received = Rc::new(Cell::new(0));
        let mut systems: Vec<Box<dyn SimSystem>> = vec![
            Box::new(EmitterSystem),
            Box::new(ReceiverSystem {
                received: received.clone(),
            }),
        ];
        let mut world = World::new();
        run(&mut world, &mut systems, SimConfig::new(0, 3, 0)).unwrap();
        assert_eq!(received.get(), 3);
    }

    #[test]
    fn reaction_signals_are_not_redelivered() {
        struct Echo {
            seen: Rc<Cell<usize>>,
        }

        impl SimSystem for Echo {
            fn name(&self) -> &str {
                "echo"
            }
            fn frequency(&self) -> TickFrequency {
                TickFrequency::EveryTick
            }
            fn tick(&mut self, _ctx: &mut TickContext) {}
            fn handle_signals(&mut self, ctx: &mut TickContext) {
                self.seen.set(self.seen.get() + ctx.inbox.len());
                // would loop forever if reactions were delivered
                ctx.signals.push(ping());
            }
        }

        let seen = Rc::new(Cell::new(0));
        let mut systems: Vec<Box<dyn SimSystem>> = vec![
            Box::new(EmitterSystem),
            Box::new(Echo { seen: seen.clone() }),
        ];
        let mut world = World::new();
        run(&mut world, &mut systems, SimConfig::new(0, 4, 0)).unwrap();
        // one inbox of one signal per tick
        assert_eq!(seen.get(), 4);
    }

    #[test]
    fn checkpoints_written_on_interval_and_last_tick() {
        let dir = tempfile::tempdir().unwrap();
        let count = Rc::new(Cell::new(0));
        let mut systems: Vec<Box<dyn SimSystem>> = vec![Box::new(CountingSystem::new(
            "each",
            TickFrequency::EveryTick,
            count,
        ))];
        let mut world = World::new();
        world.add_polity("Aster");
        let config = SimConfig::new(10, 5, 0).with_checkpoints(2, dir.path());
        run(&mut world, &mut systems, config).unwrap();

        // offsets 1 and 3 hit the interval, offset 4 is the last tick
        for tick in [11, 13, 14] {
            let checkpoint = dir.path().join(format!("tick_{tick:06}"));
            assert!(checkpoint.join("polities.jsonl").exists(), "missing {tick}");
        }
        assert!(!dir.path().join("tick_000010").exists());
        assert!(!dir.path().join("tick_000012").exists());
    }
}

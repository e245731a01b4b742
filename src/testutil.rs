use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::covert::{CovertConfig, PolityRead};
use crate::id::PolityId;
use crate::model::*;
use crate::sim::{CovertOpsSystem, Signal, SignalKind, SimConfig, SimSystem, TickContext, run};

// ---------------------------------------------------------------------------
// Tick execution helpers
// ---------------------------------------------------------------------------

/// Run a single system tick at the given world tick. Returns emitted signals.
pub fn tick_system(world: &mut World, system: &mut dyn SimSystem, tick: u64, seed: u64) -> Vec<Signal> {
    world.current_tick = tick;
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut signals = Vec::new();
    let mut ctx = TickContext {
        world,
        rng: &mut rng,
        signals: &mut signals,
        inbox: &[],
    };
    system.tick(&mut ctx);
    signals
}

/// Run a system's handle_signals with the given inbox. Returns newly emitted signals.
pub fn deliver_signals(
    world: &mut World,
    system: &mut dyn SimSystem,
    inbox: &[Signal],
    seed: u64,
) -> Vec<Signal> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut signals = Vec::new();
    let mut ctx = TickContext {
        world,
        rng: &mut rng,
        signals: &mut signals,
        inbox,
    };
    system.handle_signals(&mut ctx);
    signals
}

/// Run a full tick + handle_signals cycle for a single system. Returns all signals.
pub fn full_tick(world: &mut World, system: &mut dyn SimSystem, tick: u64, seed: u64) -> Vec<Signal> {
    let tick_signals = tick_system(world, system, tick, seed);
    if tick_signals.is_empty() {
        return tick_signals;
    }
    let reaction_signals = deliver_signals(world, system, &tick_signals, seed);
    let mut all = tick_signals;
    all.extend(reaction_signals);
    all
}

/// Run `world` forward with the standard runner.
pub fn run_ticks(
    world: &mut World,
    systems: &mut [Box<dyn SimSystem>],
    start_tick: u64,
    num_ticks: u64,
    seed: u64,
) {
    run(world, systems, SimConfig::new(start_tick, num_ticks, seed)).expect("simulation failed");
}

/// The covert system on the built-in catalog and default tuning.
pub fn covert_system() -> Box<dyn SimSystem> {
    Box::new(
        CovertOpsSystem::with_builtin_catalog(CovertConfig::default())
            .expect("built-in catalog must load"),
    )
}

// ---------------------------------------------------------------------------
// Query helpers
// ---------------------------------------------------------------------------

pub fn count_events(world: &World, kind: WorldEventKind) -> usize {
    world.events_of(kind).count()
}

/// Events naming `polity` as actor or target.
pub fn events_involving(world: &World, polity: PolityId) -> Vec<&RecordedEvent> {
    world
        .events
        .iter()
        .filter(|e| e.event.actor == polity || e.event.target == Some(polity))
        .collect()
}

pub fn has_signal(signals: &[Signal], predicate: impl Fn(&SignalKind) -> bool) -> bool {
    signals.iter().any(|s| predicate(&s.kind))
}

pub fn count_signals(signals: &[Signal], predicate: impl Fn(&SignalKind) -> bool) -> usize {
    signals.iter().filter(|s| predicate(&s.kind)).count()
}

// ---------------------------------------------------------------------------
// Assertions
// ---------------------------------------------------------------------------

pub fn assert_approx(actual: f64, expected: f64, tolerance: f64, msg: &str) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "{msg}: expected ~{expected} (+-{tolerance}), got {actual}"
    );
}

/// Assert two worlds produced from the same seed hold identical state.
pub fn assert_deterministic(world1: &World, world2: &World) {
    assert_eq!(world1.current_tick, world2.current_tick, "tick mismatch");
    assert_eq!(
        world1.events.len(),
        world2.events.len(),
        "event count mismatch: {} vs {}",
        world1.events.len(),
        world2.events.len()
    );
    assert_eq!(world1.events, world2.events, "event log mismatch");
    assert_eq!(world1.polities, world2.polities, "polity state mismatch");
    assert_eq!(
        world1.relationships, world2.relationships,
        "relationship mismatch"
    );
    assert_eq!(world1.memories, world2.memories, "memory mismatch");
    assert_eq!(world1.capabilities, world2.capabilities, "capability mismatch");
    assert_eq!(world1.characters, world2.characters, "roster mismatch");
    assert_eq!(world1.factions, world2.factions, "faction mismatch");
}

/// Assert every stat of every polity sits inside its declared bounds.
pub fn assert_stats_in_bounds(world: &World) {
    for id in world.polities.keys() {
        let Some(snap) = world.actor(*id) else {
            continue;
        };
        for key in StatKey::ALL {
            let value = snap.stat(*key);
            let in_bounds = match key.bound() {
                StatBound::Rate => (0.0..=100.0).contains(&value),
                StatBound::Magnitude => value >= 0.0,
            };
            assert!(in_bounds, "{id} {key} = {value} out of bounds");
        }
    }
    for rel in world.relationships.values() {
        assert!((-100.0..=100.0).contains(&rel.trust), "trust {} out of bounds", rel.trust);
    }
}

/// Assert `world` recorded at least one event of `kind`.
pub fn assert_event_exists(world: &World, kind: WorldEventKind) {
    assert!(
        world.events_of(kind).next().is_some(),
        "expected at least one {kind} event, found none among {} events",
        world.events.len()
    );
}

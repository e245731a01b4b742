mod common;

use common::contested_world;
use covert_ops::model::*;
use covert_ops::sim::{CovertOpsSystem, SignalKind, SimConfig, SimSystem, TickFrequency, run};
use covert_ops::testutil::{self, assert_deterministic, assert_stats_in_bounds, covert_system};
use covert_ops::{CovertConfig, Scenario};

fn run_contested(seed: u64, ticks: u64) -> World {
    let mut world = contested_world().world;
    let mut systems: Vec<Box<dyn SimSystem>> = vec![covert_system()];
    testutil::run_ticks(&mut world, &mut systems, 1, ticks, seed);
    world
}

#[test]
fn same_seed_same_history() {
    let world_a = run_contested(42, 60);
    let world_b = run_contested(42, 60);
    assert_deterministic(&world_a, &world_b);
}

#[test]
fn contested_world_erupts_into_intrigue() {
    let world = run_contested(7, 60);
    assert_eq!(world.current_tick, 60);
    testutil::assert_event_exists(&world, WorldEventKind::CovertActionExposed);
    assert_stats_in_bounds(&world);
}

#[test]
fn retaliation_follows_an_exposure_in_the_same_tick() {
    for seed in [3, 11, 19] {
        let world = run_contested(seed, 80);
        for retaliation in world.events_of(WorldEventKind::Retaliation) {
            let r = &retaliation.event;
            let provoked = world.events_of(WorldEventKind::CovertActionExposed).any(|e| {
                e.event.tick == r.tick
                    && e.event.actor == r.target.unwrap()
                    && e.event.target == Some(r.actor)
                    && e.id < retaliation.id
            });
            assert!(provoked, "seed {seed}: unprovoked retaliation at tick {}", r.tick);
        }
    }
}

#[test]
fn captured_agents_stay_captured() {
    let world = run_contested(23, 80);
    let captures = testutil::count_events(&world, WorldEventKind::AgentCaptured);
    let captured = world
        .capabilities
        .values()
        .filter(|c| c.status == CapabilityStatus::Captured)
        .count();
    assert_eq!(captures, captured);
}

#[test]
fn wars_are_stamped_with_their_covert_cause() {
    for seed in [1, 2, 4] {
        let world = run_contested(seed, 80);
        for event in world.events_of(WorldEventKind::WarDeclared) {
            let target = event.event.target.unwrap();
            let rel = &world.relationships[&RelationKey::new(event.event.actor, target)];
            assert_eq!(rel.status, DiplomaticStatus::AtWar);
            assert!(rel.war_cause.as_deref().is_some_and(|c| c.starts_with("covert:")));
        }
    }
}

#[test]
fn tick_signals_mirror_the_event_log() {
    let mut world = contested_world().world;
    let mut system = CovertOpsSystem::with_builtin_catalog(CovertConfig::default()).unwrap();
    let mut total_detected = 0;

    for tick in 1..=40 {
        let exposed_before = testutil::count_events(&world, WorldEventKind::CovertActionExposed);
        let wars_before = testutil::count_events(&world, WorldEventKind::WarDeclared);
        let captures_before = testutil::count_events(&world, WorldEventKind::AgentCaptured);

        let signals = testutil::tick_system(&mut world, &mut system, tick, tick);

        let detected = testutil::count_signals(&signals, |k| {
            matches!(k, SignalKind::CovertActionDetected { .. })
        });
        let captured =
            testutil::count_signals(&signals, |k| matches!(k, SignalKind::AgentCaptured { .. }));
        assert_eq!(
            testutil::count_events(&world, WorldEventKind::CovertActionExposed) - exposed_before,
            detected
        );
        assert_eq!(
            testutil::count_events(&world, WorldEventKind::AgentCaptured) - captures_before,
            captured
        );
        assert_eq!(
            testutil::has_signal(&signals, |k| matches!(k, SignalKind::WarDeclared { .. })),
            testutil::count_events(&world, WorldEventKind::WarDeclared) > wars_before
        );

        for signal in &signals {
            let SignalKind::CovertActionDetected {
                attacker, victim, ..
            } = signal.kind
            else {
                continue;
            };
            assert!(
                testutil::events_involving(&world, victim).iter().any(|e| {
                    e.event.kind == WorldEventKind::CovertActionExposed
                        && e.event.actor == attacker
                        && e.event.tick == tick
                }),
                "tick {tick}: no exposure of {attacker} against {victim}"
            );
        }
        total_detected += detected;
    }
    assert!(total_detected > 0);
}

#[test]
fn quiet_world_stays_quiet() {
    let mut s = Scenario::new();
    for name in ["Aster", "Brannoc", "Corvel"] {
        s.polity(name);
    }
    let world = s
        .run(&mut vec![covert_system()], 50, 9)
        .unwrap();
    assert!(world.events.is_empty());
    assert!(world.memories.is_empty());
}

#[test]
fn disabled_system_leaves_world_untouched() {
    let before = contested_world().world;
    let mut world = contested_world().world;
    let config = CovertConfig {
        attempts_enabled: false,
        ..CovertConfig::default()
    };
    let mut systems: Vec<Box<dyn SimSystem>> =
        vec![Box::new(CovertOpsSystem::with_builtin_catalog(config).unwrap())];
    run(&mut world, &mut systems, SimConfig::new(0, 30, 5)).unwrap();
    assert!(world.events.is_empty());
    assert_eq!(world.polities, before.polities);
    assert_eq!(world.relationships, before.relationships);
}

#[test]
fn sparse_schedule_acts_less_often() {
    let mut world = contested_world().world;
    let system = CovertOpsSystem::with_builtin_catalog(CovertConfig::default())
        .unwrap()
        .every(TickFrequency::Every(1000));
    let mut systems: Vec<Box<dyn SimSystem>> = vec![Box::new(system)];
    // ticks 1..=60 never hit a multiple of 1000
    run(&mut world, &mut systems, SimConfig::new(1, 60, 5)).unwrap();
    assert!(world.events.is_empty());
}

#[test]
fn checkpoints_capture_the_journal() {
    let dir = tempfile::tempdir().unwrap();
    let mut world = contested_world().world;
    let mut systems: Vec<Box<dyn SimSystem>> = vec![covert_system()];
    let config = SimConfig::new(0, 30, 42).with_checkpoints(10, dir.path());
    run(&mut world, &mut systems, config).unwrap();

    for tick in [9, 19, 29] {
        let checkpoint = dir.path().join(format!("tick_{tick:06}"));
        for file in [
            "polities.jsonl",
            "relationships.jsonl",
            "world_events.jsonl",
            "memories.jsonl",
            "capabilities.jsonl",
        ] {
            assert!(checkpoint.join(file).exists(), "{file} missing at tick {tick}");
        }
    }

    let last = dir.path().join("tick_000029");
    let polities = std::fs::read_to_string(last.join("polities.jsonl")).unwrap();
    assert_eq!(polities.lines().count(), 4);
    let events = std::fs::read_to_string(last.join("world_events.jsonl")).unwrap();
    assert_eq!(events.lines().count(), world.events.len());
    for line in events.lines() {
        let row: serde_json::Value = serde_json::from_str(line).unwrap();
        assert!(row["id"].is_u64());
        assert!(row["kind"].is_string());
    }
}

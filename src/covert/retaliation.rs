//! Retaliation: whether a victim who caught an attacker strikes back, and how.

use rand::{Rng, RngCore};
use serde::Serialize;

use super::catalog::{ActionDefinition, ActionKind, Catalog};
use super::config::CovertConfig;
use super::error::CovertError;
use super::motive::clamp_score;
use super::ports::{PolityRead, PolityStore};
use super::resolver::{self, Resolution, ResolutionResult};
use super::targeting::is_permitted;
use crate::id::PolityId;
use crate::model::{ActorSnapshot, Severity, WorldEvent, WorldEventKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetaliationOutcome {
    pub retaliated: bool,
    pub action_kind: Option<ActionKind>,
    /// The counter-strike's own detection declared war.
    pub escalated_to_war: bool,
    pub resolution: Option<ResolutionResult>,
}

impl RetaliationOutcome {
    fn declined() -> Self {
        Self {
            retaliated: false,
            action_kind: None,
            escalated_to_war: false,
            resolution: None,
        }
    }
}

/// `(aggression + wrath + war_risk) / 3`, clamped to `[0, 100]`.
pub fn retaliation_chance(victim: &ActorSnapshot, original: &ActionDefinition) -> f64 {
    clamp_score(
        (victim.personality.aggression + victim.personality.wrath + original.war_risk) / 3.0,
    )
}

/// Actions `victim` could answer `original` with, in catalog order: the same
/// action plus everything in its category, minus anything needing an agent the
/// victim lacks inside `attacker`.
pub fn retaliation_candidates<S: PolityRead + ?Sized>(
    store: &S,
    catalog: &Catalog,
    victim: PolityId,
    attacker: PolityId,
    original: &ActionDefinition,
) -> Vec<ActionKind> {
    catalog
        .iter()
        .filter(|d| d.kind == original.kind || d.category == original.category)
        .filter(|d| is_permitted(store, d, victim, attacker))
        .map(|d| d.kind)
        .collect()
}

/// Decide and carry out `victim`'s answer to a detected `original_action` by
/// `attacker`.
///
/// The counter-strike is resolved with roles reversed. Its own detection does
/// not trigger a further retaliation.
pub fn maybe_retaliate<S: PolityStore + ?Sized>(
    store: &mut S,
    catalog: &Catalog,
    config: &CovertConfig,
    victim: PolityId,
    attacker: PolityId,
    original_action: ActionKind,
    rng: &mut dyn RngCore,
) -> Result<RetaliationOutcome, CovertError> {
    let original = catalog.get(original_action)?;
    let victim_snap = store.actor(victim).ok_or(CovertError::NotFound(victim))?;
    let attacker_snap = store.actor(attacker).ok_or(CovertError::NotFound(attacker))?;

    let chance = retaliation_chance(&victim_snap, original);
    let roll = rng.random_range(0.0..100.0);
    if roll >= chance {
        tracing::debug!(
            victim = %victim,
            attacker = %attacker,
            chance,
            roll,
            "victim holds back"
        );
        return Ok(RetaliationOutcome::declined());
    }

    let candidates = retaliation_candidates(&*store, catalog, victim, attacker, original);
    if candidates.is_empty() {
        tracing::debug!(
            victim = %victim,
            attacker = %attacker,
            category = %original.category,
            "no usable retaliation"
        );
        return Ok(RetaliationOutcome::declined());
    }
    let choice = candidates[rng.random_range(0..candidates.len())];

    let result = match resolver::resolve(store, catalog, config, victim, attacker, choice, rng)? {
        Resolution::Resolved(result) => result,
        Resolution::CapabilityMissing { .. } => return Ok(RetaliationOutcome::declined()),
    };

    tracing::info!(
        victim = %victim,
        attacker = %attacker,
        action = %choice,
        succeeded = result.succeeded,
        war = result.war_declared,
        "retaliation"
    );
    let tick = store.current_tick();
    store.emit_world_event(WorldEvent {
        tick,
        kind: WorldEventKind::Retaliation,
        actor: victim,
        target: Some(attacker),
        title: format!("{} strikes back at {}", victim_snap.name, attacker_snap.name),
        description: format!(
            "In answer to the plot to {}, {} moved to {}.",
            original_action.as_str().replace('_', " "),
            victim_snap.name,
            choice.as_str().replace('_', " ")
        ),
        severity: Severity::from_risk(original.war_risk),
    });

    Ok(RetaliationOutcome {
        retaliated: true,
        action_kind: Some(choice),
        escalated_to_war: result.war_declared,
        resolution: Some(result),
    })
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::covert::catalog::Category;
    use crate::model::World;
    use crate::scenario::Scenario;

    /// Social category where every action needs an agent.
    const AGENT_ONLY_CATALOG: &str = r#"{"version": 1, "actions": [
        {"kind": "seduce_noble", "category": "social", "base_difficulty": 45,
         "base_detect_chance": 40, "war_risk": 25, "requires_capability": true,
         "effects": {"influence": -8}},
        {"kind": "sponsor_separatists", "category": "social", "base_difficulty": 60,
         "base_detect_chance": 50, "war_risk": 65, "requires_capability": true},
        {"kind": "spread_rumors", "category": "psychological", "base_difficulty": 20,
         "base_detect_chance": 20, "war_risk": 10}
    ]}"#;

    fn furious(s: &mut Scenario, name: &str) -> PolityId {
        s.polity(name).aggression(100.0).wrath(100.0).id()
    }

    #[test]
    fn chance_averages_temper_and_risk() {
        let mut world = World::new();
        let id = world.add_polity("Calm");
        let mut victim = world.actor(id).unwrap();
        victim.personality.aggression = 30.0;
        victim.personality.wrath = 60.0;
        let catalog = Catalog::load_builtin().unwrap();
        let def = catalog.get(ActionKind::SpreadRumors).unwrap();
        assert!((retaliation_chance(&victim, def) - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn candidates_share_category_in_catalog_order() {
        let mut s = Scenario::new();
        let victim = s.polity("Victim").id();
        let attacker = s.polity("Attacker").id();
        let world = s.build();
        let catalog = Catalog::load_builtin().unwrap();
        let original = catalog.get(ActionKind::BurnGranaries).unwrap();

        let candidates = retaliation_candidates(&world, &catalog, victim, attacker, original);
        assert_eq!(candidates[0], ActionKind::BurnGranaries);
        assert!(
            candidates
                .iter()
                .all(|k| catalog.get(*k).unwrap().category == Category::Economic)
        );
        // no agent inside the attacker: agent-only economic actions are out
        assert!(!candidates.contains(&ActionKind::StealTreasury));
        assert!(!candidates.contains(&ActionKind::StealTechnology));
        assert!(candidates.contains(&ActionKind::CounterfeitCurrency));
    }

    #[test]
    fn agent_inside_attacker_widens_candidates() {
        let mut s = Scenario::new();
        let victim = s.polity("Victim").id();
        let attacker = s.polity("Attacker").id();
        s.capability(victim, attacker, 50.0);
        let world = s.build();
        let catalog = Catalog::load_builtin().unwrap();
        let original = catalog.get(ActionKind::BurnGranaries).unwrap();

        let candidates = retaliation_candidates(&world, &catalog, victim, attacker, original);
        assert_eq!(candidates.len(), catalog.in_category(Category::Economic).count());
    }

    #[test]
    fn no_usable_action_means_no_retaliation() {
        let mut s = Scenario::new();
        let victim = furious(&mut s, "Victim");
        let attacker = s.polity("Attacker").id();
        let mut world = s.build();
        let catalog = Catalog::load_from_str(AGENT_ONLY_CATALOG).unwrap();

        for seed in 0..20 {
            let outcome = maybe_retaliate(
                &mut world,
                &catalog,
                &CovertConfig::default(),
                victim,
                attacker,
                ActionKind::SeduceNoble,
                &mut SmallRng::seed_from_u64(seed),
            )
            .unwrap();
            assert!(!outcome.retaliated);
            assert!(outcome.action_kind.is_none());
            assert!(!outcome.escalated_to_war);
        }
        assert!(world.events.is_empty());
    }

    #[test]
    fn meek_victim_never_retaliates() {
        let mut s = Scenario::new();
        let victim = s.polity("Meek").aggression(0.0).wrath(0.0).id();
        let attacker = s.polity("Bully").id();
        let mut world = s.build();
        let catalog = Catalog::load_from_str(
            r#"{"version": 1, "actions": [
                {"kind": "spread_rumors", "category": "psychological",
                 "base_difficulty": 20, "base_detect_chance": 20, "war_risk": 0}
            ]}"#,
        )
        .unwrap();
        let outcome = maybe_retaliate(
            &mut world,
            &catalog,
            &CovertConfig::default(),
            victim,
            attacker,
            ActionKind::SpreadRumors,
            &mut SmallRng::seed_from_u64(9),
        )
        .unwrap();
        assert!(!outcome.retaliated);
    }

    #[test]
    fn furious_victim_answers_in_kind() {
        let mut s = Scenario::new();
        let victim = furious(&mut s, "Victim");
        let attacker = s.polity("Attacker").id();
        let mut world = s.build();
        let catalog = Catalog::load_builtin().unwrap();

        // aggression 100, wrath 100, war_risk 60: chance 86.7%; most seeds strike back.
        let mut struck = 0;
        for seed in 0..10 {
            let outcome = maybe_retaliate(
                &mut world,
                &catalog,
                &CovertConfig::default(),
                victim,
                attacker,
                ActionKind::BurnBarracks,
                &mut SmallRng::seed_from_u64(seed),
            )
            .unwrap();
            if outcome.retaliated {
                struck += 1;
                let kind = outcome.action_kind.unwrap();
                assert_eq!(catalog.get(kind).unwrap().category, Category::Military);
                let res = outcome.resolution.unwrap();
                assert_eq!(res.attacker, victim);
                assert_eq!(res.target, attacker);
                assert_eq!(outcome.escalated_to_war, res.war_declared);
            }
        }
        assert!(struck > 0);
        assert_eq!(world.events_of(WorldEventKind::Retaliation).count(), struck);
    }

    #[test]
    fn unknown_victim_is_not_found() {
        let mut world = World::new();
        let attacker = world.add_polity("Attacker");
        let catalog = Catalog::load_builtin().unwrap();
        let err = maybe_retaliate(
            &mut world,
            &catalog,
            &CovertConfig::default(),
            PolityId(55),
            attacker,
            ActionKind::SpreadRumors,
            &mut SmallRng::seed_from_u64(0),
        )
        .unwrap_err();
        assert!(matches!(err, CovertError::NotFound(PolityId(55))));
    }

    #[test]
    fn same_seed_same_retaliation() {
        let run = |seed| {
            let mut s = Scenario::new();
            let victim = furious(&mut s, "Victim");
            let attacker = s.polity("Attacker").id();
            let mut world = s.build();
            let catalog = Catalog::load_builtin().unwrap();
            let outcome = maybe_retaliate(
                &mut world,
                &catalog,
                &CovertConfig::default(),
                victim,
                attacker,
                ActionKind::InciteRiots,
                &mut SmallRng::seed_from_u64(seed),
            )
            .unwrap();
            (outcome, world.actor(attacker), world.relationship(victim, attacker))
        };
        for seed in [1, 2, 3] {
            assert_eq!(run(seed), run(seed));
        }
    }
}

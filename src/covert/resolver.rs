//! Action resolution: one (attacker, target, action) attempt, two independent
//! rolls, and every state change that follows from them.

use rand::{Rng, RngCore};
use serde::Serialize;

use super::catalog::{ActionDefinition, ActionKind, Catalog, SpecialEffect};
use super::config::CovertConfig;
use super::effects::{self, EffectScene, RosterChange};
use super::error::CovertError;
use super::ports::PolityStore;
use crate::id::PolityId;
use crate::model::capability;
use crate::model::relationship::{TRUST_MAX, TRUST_MIN};
use crate::model::{
    ActorSnapshot, DiplomaticStatus, MemoryEvent, MemoryKind, RelationshipUpdate, Severity,
    StatDeltas, WorldEvent, WorldEventKind,
};

const SUCCESS_FLOOR: f64 = 10.0;
const SUCCESS_CEILING: f64 = 90.0;
const DETECT_FLOOR: f64 = 5.0;
const DETECT_CEILING: f64 = 95.0;
const SKILL_PIVOT: f64 = 50.0;

const DETECTION_TRUST_PENALTY: f64 = 20.0;
const VICTIM_MEMORY_BASE: f64 = 30.0;
const VICTIM_MEMORY_SUCCESS_EXTRA: f64 = 20.0;
const ATTACKER_TRIUMPH_WEIGHT: f64 = 20.0;

/// Report of one resolved attempt. A record of what happened; the mutations it
/// describes have already been written through the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionResult {
    pub attacker: PolityId,
    pub target: PolityId,
    pub action: ActionKind,
    pub succeeded: bool,
    pub detected: bool,
    pub success_chance: f64,
    pub detect_chance: f64,
    /// Effective changes to the target, clamping applied.
    pub effects_applied: StatDeltas,
    pub special_effect_fired: Option<SpecialEffect>,
    pub war_declared: bool,
    pub agent_captured: bool,
    pub attacker_gains: StatDeltas,
    pub roster_changes: Vec<RosterChange>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Resolution {
    Resolved(ResolutionResult),
    /// The action needs an embedded agent the attacker does not have. Nothing
    /// was rolled or mutated.
    CapabilityMissing { action: ActionKind },
}

impl Resolution {
    pub fn result(&self) -> Option<&ResolutionResult> {
        match self {
            Resolution::Resolved(r) => Some(r),
            Resolution::CapabilityMissing { .. } => None,
        }
    }

    pub fn into_result(self) -> Option<ResolutionResult> {
        match self {
            Resolution::Resolved(r) => Some(r),
            Resolution::CapabilityMissing { .. } => None,
        }
    }
}

/// `(100 - difficulty) + (skill - 50)/2 - counter_intel/4`, held to `[10, 90]`.
pub fn success_chance(base_difficulty: f64, agent_skill: f64, counter_intel: f64) -> f64 {
    let raw = (100.0 - base_difficulty) + (agent_skill - SKILL_PIVOT) / 2.0 - counter_intel / 4.0;
    clamp_chance(raw, SUCCESS_FLOOR, SUCCESS_CEILING)
}

/// `base_detect + counter_intel/2 - skill/4`, held to `[5, 95]`.
pub fn detect_chance(base_detect_chance: f64, counter_intel: f64, agent_skill: f64) -> f64 {
    let raw = base_detect_chance + counter_intel / 2.0 - agent_skill / 4.0;
    clamp_chance(raw, DETECT_FLOOR, DETECT_CEILING)
}

fn clamp_chance(raw: f64, floor: f64, ceiling: f64) -> f64 {
    if raw.is_nan() {
        return floor;
    }
    raw.clamp(floor, ceiling)
}

/// Trust lost on detection: `20 + floor(war_risk / 2)`.
pub fn detection_trust_penalty(war_risk: f64) -> f64 {
    DETECTION_TRUST_PENALTY + (war_risk.clamp(0.0, 100.0) / 2.0).floor()
}

/// One percentile roll: true with probability `chance`% (0–100).
pub fn roll_percent(chance: f64, rng: &mut dyn RngCore) -> bool {
    rng.random_range(0.0..100.0) < chance.clamp(0.0, 100.0)
}

/// Whether a detection escalates straight to war. Fires with probability `war_risk`%.
pub fn roll_war_declaration(war_risk: f64, rng: &mut dyn RngCore) -> bool {
    roll_percent(war_risk, rng)
}

/// Resolve `action` by `attacker` against `target`.
///
/// Fails with no mutation if either polity or the action is unknown. Returns
/// [`Resolution::CapabilityMissing`] without rolling when a required agent is
/// absent. Otherwise rolls success and detection independently and writes every
/// consequence through `store`.
pub fn resolve<S: PolityStore + ?Sized>(
    store: &mut S,
    catalog: &Catalog,
    config: &CovertConfig,
    attacker: PolityId,
    target: PolityId,
    action: ActionKind,
    rng: &mut dyn RngCore,
) -> Result<Resolution, CovertError> {
    let def = catalog.get(action)?;
    let mut attacker_snap = store.actor(attacker).ok_or(CovertError::NotFound(attacker))?;
    let mut target_snap = store.actor(target).ok_or(CovertError::NotFound(target))?;

    let agent = if def.requires_capability {
        let instances = store.capability_instances(attacker, target);
        match capability::best_active(&instances) {
            Some(agent) => Some(agent.clone()),
            None => {
                tracing::debug!(
                    attacker = %attacker,
                    target = %target,
                    action = %action,
                    "no active agent in place"
                );
                return Ok(Resolution::CapabilityMissing { action });
            }
        }
    } else {
        None
    };
    let skill = agent
        .as_ref()
        .map_or(config.default_agent_skill, |a| a.skill);

    // Everything below works from these reads; nothing is re-read after writing.
    let relationship = store.relationship(attacker, target);
    let tick = store.current_tick();

    let success_chance = success_chance(def.base_difficulty, skill, target_snap.counter_intel);
    let detect_chance = detect_chance(def.base_detect_chance, target_snap.counter_intel, skill);
    let succeeded = roll_percent(success_chance, rng);
    let detected = roll_percent(detect_chance, rng);
    let agent_captured = !succeeded && agent.is_some() && roll_percent(config.capture_chance, rng);
    let war_declared = detected
        && relationship.status != DiplomaticStatus::AtWar
        && roll_war_declaration(def.war_risk, rng);

    tracing::debug!(
        attacker = %attacker,
        target = %target,
        action = %action,
        skill,
        success_chance,
        detect_chance,
        succeeded,
        detected,
        "covert action rolled"
    );

    let mut effects_applied = StatDeltas::new();
    let mut attacker_gains = StatDeltas::new();
    let mut roster_changes = Vec::new();
    let mut special_effect_fired = None;

    if succeeded {
        effects_applied = target_snap.apply_clamped(&def.effects);
        if !effects_applied.is_empty() {
            store.apply_stat_delta(target, &effects_applied);
        }
        if let Some(effect) = def.special_effect {
            let mut scene = EffectScene {
                action,
                tick,
                attacker: &mut attacker_snap,
                target: &mut target_snap,
                tuning: &config.effects,
            };
            let outcome = effects::apply_special_effect(store, effect, &mut scene);
            for (key, delta) in outcome.target_deltas {
                *effects_applied.entry(key).or_insert(0.0) += delta;
            }
            attacker_gains = outcome.attacker_gains;
            roster_changes = outcome.roster_changes;
            special_effect_fired = Some(effect);
        }
    }

    if agent_captured && let Some(agent) = &agent {
        store.invalidate_capability_instance(agent.id);
        tracing::info!(
            attacker = %attacker,
            target = %target,
            capability = %agent.id,
            action = %action,
            "agent captured"
        );
        store.emit_world_event(WorldEvent {
            tick,
            kind: WorldEventKind::AgentCaptured,
            actor: attacker,
            target: Some(target),
            title: format!("Agent of {} captured in {}", attacker_snap.name, target_snap.name),
            description: format!(
                "An agent of {} was seized attempting to {}.",
                attacker_snap.name,
                describe(action)
            ),
            severity: Severity::Moderate,
        });
    }

    if detected {
        apply_detection(
            store,
            def,
            &attacker_snap,
            &target_snap,
            relationship.trust,
            relationship.status,
            succeeded,
            war_declared,
            tick,
        );
    }

    Ok(Resolution::Resolved(ResolutionResult {
        attacker,
        target,
        action,
        succeeded,
        detected,
        success_chance,
        detect_chance,
        effects_applied,
        special_effect_fired,
        war_declared,
        agent_captured,
        attacker_gains,
        roster_changes,
    }))
}

#[allow(clippy::too_many_arguments)]
fn apply_detection<S: PolityStore + ?Sized>(
    store: &mut S,
    def: &ActionDefinition,
    attacker: &ActorSnapshot,
    target: &ActorSnapshot,
    trust: f64,
    status: DiplomaticStatus,
    succeeded: bool,
    war_declared: bool,
    tick: u64,
) {
    let action = def.kind;
    let new_trust = (trust - detection_trust_penalty(def.war_risk)).clamp(TRUST_MIN, TRUST_MAX);
    let update = if war_declared {
        RelationshipUpdate {
            trust: Some(new_trust),
            status: Some(DiplomaticStatus::AtWar),
            war_cause: Some(format!("covert:{action}")),
        }
    } else {
        RelationshipUpdate {
            trust: Some(new_trust),
            status: Some(status.escalated()),
            war_cause: None,
        }
    };
    store.set_relationship(attacker.id, target.id, update);

    store.emit_world_event(WorldEvent {
        tick,
        kind: WorldEventKind::CovertActionExposed,
        actor: attacker.id,
        target: Some(target.id),
        title: format!("{} exposed plotting against {}", attacker.name, target.name),
        description: format!(
            "{} caught agents of {} trying to {}{}.",
            target.name,
            attacker.name,
            describe(action),
            if succeeded { ", too late to stop them" } else { "" }
        ),
        severity: Severity::from_risk(def.war_risk),
    });

    if war_declared {
        tracing::info!(
            attacker = %attacker.id,
            target = %target.id,
            action = %action,
            "covert exposure escalated to war"
        );
        store.emit_world_event(WorldEvent {
            tick,
            kind: WorldEventKind::WarDeclared,
            actor: target.id,
            target: Some(attacker.id),
            title: format!("{} declares war on {}", target.name, attacker.name),
            description: format!(
                "Outraged by the attempt to {}, {} takes up arms against {}.",
                describe(action),
                target.name,
                attacker.name
            ),
            severity: Severity::Critical,
        });
    }

    let mut grievance = VICTIM_MEMORY_BASE + def.war_risk / 2.0;
    if succeeded {
        grievance += VICTIM_MEMORY_SUCCESS_EXTRA;
    }
    store.emit_memory_event(MemoryEvent {
        actor: target.id,
        kind: MemoryKind::Betrayal,
        target: Some(attacker.id),
        description: format!("{} tried to {}", attacker.name, describe(action)),
        emotional_weight: (-grievance).clamp(-100.0, 0.0),
        tick,
    });

    if succeeded {
        store.emit_memory_event(MemoryEvent {
            actor: attacker.id,
            kind: MemoryKind::Triumph,
            target: Some(target.id),
            description: format!("We managed to {} in {}", describe(action), target.name),
            emotional_weight: ATTACKER_TRIUMPH_WEIGHT,
            tick,
        });
    }
}

/// `burn_granaries` -> `burn granaries`.
fn describe(action: ActionKind) -> String {
    action.as_str().replace('_', " ")
}

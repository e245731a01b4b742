//! Motive aggregation: turns one polity's situation into weighted reasons to
//! sabotage each of its neighbours, and an overall pressure score.

use std::collections::BTreeMap;

use serde::Serialize;

use super::catalog::{ActionKind, Catalog};
use super::config::CovertConfig;
use super::error::CovertError;
use super::ports::PolityRead;
use super::targeting::{self, TargetCandidate};
use crate::id::PolityId;
use crate::model::{ActorSnapshot, DiplomaticStatus, RivalryStatus};

// ---------------------------------------------------------------------------
// Desperation
// ---------------------------------------------------------------------------
const FAMINE_FOOD_THRESHOLD: f64 = 20.0;
const FAMINE_INTENSITY_PER_FOOD: f64 = 5.0;
const FOOD_ENVY_THRESHOLD: f64 = 50.0;
const FOOD_ENVY_FACTOR: f64 = 0.5;
const POVERTY_WEALTH_THRESHOLD: f64 = 15.0;
const POVERTY_INTENSITY_PER_WEALTH: f64 = 4.0;
const WEALTH_ENVY_THRESHOLD: f64 = 40.0;
const WEALTH_ENVY_FACTOR: f64 = 0.4;

// ---------------------------------------------------------------------------
// Grudges, hostility, rivalry
// ---------------------------------------------------------------------------
const GRUDGE_CAP: f64 = 80.0;
const GRUDGE_FACTOR: f64 = 0.8;
const HOSTILITY_TRUST_THRESHOLD: f64 = -30.0;
const HOSTILITY_CAP: f64 = 70.0;
const HOSTILITY_FACTOR: f64 = 0.7;
const WAR_INTENSITY: f64 = 80.0;
const RIVALRY_CAP: f64 = 60.0;
const RIVALRY_FACTOR: f64 = 0.6;

// ---------------------------------------------------------------------------
// Strategy, ideology, opportunism
// ---------------------------------------------------------------------------
const STRATEGIC_MILITARY_THRESHOLD: f64 = 30.0;
const STRATEGIC_CAP: f64 = 50.0;
const STRATEGIC_FACTOR: f64 = 0.5;
const IDEOLOGY_TOLERANCE_THRESHOLD: f64 = 40.0;
const IDEOLOGY_CAP: f64 = 50.0;
const OPPORTUNISM_TRUST_THRESHOLD: f64 = 20.0;
const OPPORTUNISM_CAP: f64 = 40.0;
const OPPORTUNISM_FACTOR: f64 = 0.4;

/// Cunning at which total pressure is neither amplified nor damped.
const CUNNING_PIVOT: f64 = 50.0;

// ---------------------------------------------------------------------------
// Preferred actions per motive
// ---------------------------------------------------------------------------
const FAMINE_ACTIONS: &[ActionKind] = &[
    ActionKind::RaidGrainStores,
    ActionKind::RustleLivestock,
    ActionKind::BurnGranaries,
];
const FOOD_ENVY_ACTIONS: &[ActionKind] = &[
    ActionKind::BurnGranaries,
    ActionKind::PoisonCrops,
    ActionKind::RaidGrainStores,
    ActionKind::RustleLivestock,
];
const POVERTY_ACTIONS: &[ActionKind] = &[ActionKind::StealTreasury, ActionKind::CounterfeitCurrency];
const WEALTH_ENVY_ACTIONS: &[ActionKind] = &[
    ActionKind::StealTreasury,
    ActionKind::SabotageTrade,
    ActionKind::CounterfeitCurrency,
    ActionKind::StealTradeSecrets,
    ActionKind::WreckHarbor,
];
const GRUDGE_ACTIONS: &[ActionKind] = &[
    ActionKind::AssassinateGeneral,
    ActionKind::InciteRiots,
    ActionKind::BurnWarehouses,
    ActionKind::DiscreditLeader,
    ActionKind::TerrorizeVillages,
];
const HOSTILITY_ACTIONS: &[ActionKind] = &[
    ActionKind::SpreadPropaganda,
    ActionKind::InciteRiots,
    ActionKind::SabotageFortifications,
    ActionKind::SpreadRumors,
    ActionKind::DestroyBridges,
];
const WAR_ACTIONS: &[ActionKind] = &[
    ActionKind::SabotageArmory,
    ActionKind::DestroySupplyLines,
    ActionKind::AssassinateGeneral,
    ActionKind::BurnBarracks,
    ActionKind::PoisonWaterSupply,
];
const RIVALRY_ACTIONS: &[ActionKind] = &[
    ActionKind::StealTechnology,
    ActionKind::DiscreditLeader,
    ActionKind::SabotageTrade,
    ActionKind::RuinReputation,
    ActionKind::EstablishSpyNetwork,
];
const STRATEGIC_ACTIONS: &[ActionKind] = &[
    ActionKind::SabotageArmory,
    ActionKind::BribeCommanders,
    ActionKind::StealWarPlans,
    ActionKind::DemoralizeTroops,
    ActionKind::PoisonHorses,
];
const IDEOLOGY_ACTIONS: &[ActionKind] = &[
    ActionKind::DesecrateTemple,
    ActionKind::SpreadHeresy,
    ActionKind::AssassinateHighPriest,
    ActionKind::InciteReligiousSchism,
    ActionKind::ForgeProphecy,
];
const OPPORTUNISM_ACTIONS: &[ActionKind] = &[
    ActionKind::KidnapCraftsmen,
    ActionKind::LureSettlers,
    ActionKind::StealTreasury,
    ActionKind::FundRebels,
    ActionKind::EstablishSpyNetwork,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MotiveKind {
    Desperation,
    Envy,
    Grudge,
    Hostility,
    Rivalry,
    StrategicNecessity,
    IdeologicalConflict,
    Opportunism,
}

/// One weighted reason to act. Built fresh each evaluation, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Motive {
    pub kind: MotiveKind,
    /// 0–100.
    pub intensity: f64,
    pub target: Option<PolityId>,
    pub suggested_actions: Vec<ActionKind>,
    pub reason: String,
}

impl Motive {
    fn new(
        kind: MotiveKind,
        intensity: f64,
        target: Option<PolityId>,
        actions: &[ActionKind],
        reason: String,
    ) -> Self {
        Self {
            kind,
            intensity: clamp_score(intensity),
            target,
            suggested_actions: actions.to_vec(),
            reason,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PressureReport {
    pub actor: PolityId,
    /// 0–100.
    pub total_pressure: f64,
    pub motives: Vec<Motive>,
    pub ranked_targets: Vec<TargetCandidate>,
}

/// Clamp a probability or score into `[0, 100]`.
pub fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}

/// Evaluate `actor` against every other living polity and rank its targets.
pub fn assess_pressure<S: PolityRead + ?Sized>(
    store: &S,
    catalog: &Catalog,
    config: &CovertConfig,
    actor: PolityId,
) -> Result<PressureReport, CovertError> {
    let me = store.actor(actor).ok_or(CovertError::NotFound(actor))?;
    let motives = gather_motives(store, config, &me);
    let total_pressure = total_pressure(&motives, me.personality.cunning);
    let ranked_targets = targeting::rank_targets(store, catalog, config, actor, &motives);

    tracing::debug!(
        actor = %actor,
        total_pressure,
        motives = motives.len(),
        candidates = ranked_targets.len(),
        "assessed covert pressure"
    );

    Ok(PressureReport {
        actor,
        total_pressure,
        motives,
        ranked_targets,
    })
}

/// `mean(intensities) * cunning / 50`, clamped. No motives means no pressure.
pub fn total_pressure(motives: &[Motive], cunning: f64) -> f64 {
    if motives.is_empty() {
        return 0.0;
    }
    let mean = motives.iter().map(|m| m.intensity).sum::<f64>() / motives.len() as f64;
    clamp_score(mean * clamp_score(cunning) / CUNNING_PIVOT)
}

/// Sum of the intensities of every motive naming each target, clamped per target.
pub fn target_pressures(motives: &[Motive]) -> BTreeMap<PolityId, f64> {
    let mut sums: BTreeMap<PolityId, f64> = BTreeMap::new();
    for m in motives {
        if let Some(target) = m.target {
            *sums.entry(target).or_insert(0.0) += m.intensity;
        }
    }
    for p in sums.values_mut() {
        *p = clamp_score(*p);
    }
    sums
}

/// Run every motive family for `me`.
///
/// Zero-intensity motives are kept: they still count toward the mean in
/// [`total_pressure`]. Target ranking ignores them.
pub fn gather_motives<S: PolityRead + ?Sized>(
    store: &S,
    config: &CovertConfig,
    me: &ActorSnapshot,
) -> Vec<Motive> {
    let others: Vec<ActorSnapshot> = store
        .roster()
        .into_iter()
        .filter(|&id| id != me.id)
        .filter_map(|id| store.actor(id))
        .filter(|a| !a.eliminated)
        .collect();

    let mut motives = Vec::new();
    desperation_motives(me, &others, &mut motives);
    grudge_motives(store, config, me, &others, &mut motives);
    hostility_motives(store, me, &others, &mut motives);
    rivalry_motives(store, me, &others, &mut motives);
    strategic_motives(store, me, &others, &mut motives);
    ideological_motives(store, me, &others, &mut motives);
    opportunism_motives(store, me, &others, &mut motives);
    motives
}

fn desperation_motives(me: &ActorSnapshot, others: &[ActorSnapshot], out: &mut Vec<Motive>) {
    if me.food < FAMINE_FOOD_THRESHOLD {
        let intensity = ((FAMINE_FOOD_THRESHOLD - me.food) * FAMINE_INTENSITY_PER_FOOD).min(100.0);
        out.push(Motive::new(
            MotiveKind::Desperation,
            intensity,
            None,
            FAMINE_ACTIONS,
            format!("Famine: food stores down to {:.0}", me.food),
        ));
        for other in others.iter().filter(|o| o.food > FOOD_ENVY_THRESHOLD) {
            out.push(Motive::new(
                MotiveKind::Envy,
                intensity * FOOD_ENVY_FACTOR,
                Some(other.id),
                FOOD_ENVY_ACTIONS,
                format!("{} hoards grain while we starve", other.name),
            ));
        }
    }

    if me.wealth < POVERTY_WEALTH_THRESHOLD {
        let intensity =
            ((POVERTY_WEALTH_THRESHOLD - me.wealth) * POVERTY_INTENSITY_PER_WEALTH).min(100.0);
        out.push(Motive::new(
            MotiveKind::Desperation,
            intensity,
            None,
            POVERTY_ACTIONS,
            format!("Poverty: treasury down to {:.0}", me.wealth),
        ));
        for other in others.iter().filter(|o| o.wealth > WEALTH_ENVY_THRESHOLD) {
            out.push(Motive::new(
                MotiveKind::Envy,
                intensity * WEALTH_ENVY_FACTOR,
                Some(other.id),
                WEALTH_ENVY_ACTIONS,
                format!("{} grows rich while our coffers empty", other.name),
            ));
        }
    }
}

fn grudge_motives<S: PolityRead + ?Sized>(
    store: &S,
    config: &CovertConfig,
    me: &ActorSnapshot,
    others: &[ActorSnapshot],
    out: &mut Vec<Motive>,
) {
    let memories = store.memories(me.id);
    for memory in memories.iter().rev().take(config.recent_memory_window) {
        if !memory.kind.breeds_grudge() {
            continue;
        }
        let Some(target) = memory.target else {
            continue;
        };
        let Some(other) = others.iter().find(|o| o.id == target) else {
            continue;
        };
        out.push(Motive::new(
            MotiveKind::Grudge,
            (memory.emotional_weight.abs() * GRUDGE_FACTOR).min(GRUDGE_CAP),
            Some(target),
            GRUDGE_ACTIONS,
            format!("We remember {}: {}", other.name, memory.description),
        ));
    }
}

fn hostility_motives<S: PolityRead + ?Sized>(
    store: &S,
    me: &ActorSnapshot,
    others: &[ActorSnapshot],
    out: &mut Vec<Motive>,
) {
    for other in others {
        let rel = store.relationship(me.id, other.id);
        if rel.status == DiplomaticStatus::AtWar {
            out.push(Motive::new(
                MotiveKind::Hostility,
                WAR_INTENSITY,
                Some(other.id),
                WAR_ACTIONS,
                format!("At war with {}", other.name),
            ));
        } else if rel.trust < HOSTILITY_TRUST_THRESHOLD {
            out.push(Motive::new(
                MotiveKind::Hostility,
                (rel.trust.abs() * HOSTILITY_FACTOR).min(HOSTILITY_CAP),
                Some(other.id),
                HOSTILITY_ACTIONS,
                format!("Deep distrust of {} (trust {:.0})", other.name, rel.trust),
            ));
        }
    }
}

fn rivalry_motives<S: PolityRead + ?Sized>(
    store: &S,
    me: &ActorSnapshot,
    others: &[ActorSnapshot],
    out: &mut Vec<Motive>,
) {
    for rivalry in store.rivalries(me.id) {
        if rivalry.status != RivalryStatus::Active {
            continue;
        }
        let Some(other) = others.iter().find(|o| o.id == rivalry.other) else {
            continue;
        };
        out.push(Motive::new(
            MotiveKind::Rivalry,
            (rivalry.intensity * RIVALRY_FACTOR).min(RIVALRY_CAP),
            Some(other.id),
            RIVALRY_ACTIONS,
            format!("Rivalry with {}", other.name),
        ));
    }
}

fn strategic_motives<S: PolityRead + ?Sized>(
    store: &S,
    me: &ActorSnapshot,
    others: &[ActorSnapshot],
    out: &mut Vec<Motive>,
) {
    if me.military >= STRATEGIC_MILITARY_THRESHOLD {
        return;
    }
    for other in others {
        if other.military <= me.military {
            continue;
        }
        if store.relationship(me.id, other.id).trust >= 0.0 {
            continue;
        }
        out.push(Motive::new(
            MotiveKind::StrategicNecessity,
            ((other.military - me.military) * STRATEGIC_FACTOR).min(STRATEGIC_CAP),
            Some(other.id),
            STRATEGIC_ACTIONS,
            format!("{} outguns us and cannot be trusted", other.name),
        ));
    }
}

fn ideological_motives<S: PolityRead + ?Sized>(
    store: &S,
    me: &ActorSnapshot,
    others: &[ActorSnapshot],
    out: &mut Vec<Motive>,
) {
    let Some(creed) = store.creed(me.id) else {
        return;
    };
    if creed.tolerance >= IDEOLOGY_TOLERANCE_THRESHOLD {
        return;
    }
    let intensity = (IDEOLOGY_TOLERANCE_THRESHOLD - creed.tolerance).min(IDEOLOGY_CAP);
    for other in others {
        let Some(theirs) = store.creed(other.id) else {
            continue;
        };
        if theirs.name == creed.name {
            continue;
        }
        out.push(Motive::new(
            MotiveKind::IdeologicalConflict,
            intensity,
            Some(other.id),
            IDEOLOGY_ACTIONS,
            format!("{} worships {} instead of {}", other.name, theirs.name, creed.name),
        ));
    }
}

fn opportunism_motives<S: PolityRead + ?Sized>(
    store: &S,
    me: &ActorSnapshot,
    others: &[ActorSnapshot],
    out: &mut Vec<Motive>,
) {
    let intensity = (me.personality.aggression * OPPORTUNISM_FACTOR).min(OPPORTUNISM_CAP);
    for other in others {
        if !other.is_vulnerable() {
            continue;
        }
        if store.relationship(me.id, other.id).trust >= OPPORTUNISM_TRUST_THRESHOLD {
            continue;
        }
        out.push(Motive::new(
            MotiveKind::Opportunism,
            intensity,
            Some(other.id),
            OPPORTUNISM_ACTIONS,
            format!("{} is weak and ripe for the taking", other.name),
        ));
    }
}

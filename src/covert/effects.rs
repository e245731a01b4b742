//! Special-effect handlers.
//!
//! One handler per [`SpecialEffect`] variant, dispatched through an exhaustive
//! match. Each performs one focused mutation through the write port and reports
//! what it changed. Handlers work from the resolver's projected snapshots and
//! never read back stats they have just written.

use serde::Serialize;

use super::catalog::{ActionKind, SpecialEffect};
use super::config::EffectTuning;
use super::ports::PolityStore;
use crate::id::{CapabilityId, CharacterId, FactionId, PolityId};
use crate::model::relationship::{TRUST_MAX, TRUST_MIN};
use crate::model::{
    ActorSnapshot, DiplomaticStatus, FactionKind, FactionSeed, RelationshipUpdate, Role,
    Severity, StatDeltas, StatKey, WorldEvent, WorldEventKind,
};

/// A non-stat side effect of a special-effect handler.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RosterChange {
    CharacterMoved {
        character: CharacterId,
        from: PolityId,
        to: PolityId,
    },
    CharacterKilled {
        character: CharacterId,
        polity: PolityId,
        role: Role,
    },
    FactionSpawned {
        faction: FactionId,
        kind: FactionKind,
        host: PolityId,
    },
    CapabilityEstablished {
        capability: CapabilityId,
        owner: PolityId,
        target: PolityId,
    },
    PopulationSickened {
        polity: PolityId,
        fraction: f64,
    },
    TrustEroded {
        a: PolityId,
        b: PolityId,
        delta: f64,
    },
}

/// Everything a handler may read: both parties' projected snapshots (after the
/// base effect vector) and the tuning table.
pub struct EffectScene<'a> {
    pub action: ActionKind,
    pub tick: u64,
    pub attacker: &'a mut ActorSnapshot,
    pub target: &'a mut ActorSnapshot,
    pub tuning: &'a EffectTuning,
}

/// What a handler changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectOutcome {
    /// Effective stat changes credited to the attacker.
    pub attacker_gains: StatDeltas,
    /// Effective stat changes the handler inflicted on the target, on top of the
    /// base effect vector.
    pub target_deltas: StatDeltas,
    pub roster_changes: Vec<RosterChange>,
}

/// Run the handler for `effect`.
pub fn apply_special_effect<S: PolityStore + ?Sized>(
    store: &mut S,
    effect: SpecialEffect,
    scene: &mut EffectScene,
) -> EffectOutcome {
    let mut out = EffectOutcome::default();
    let t = scene.tuning;
    let target_name = scene.target.name.clone();
    match effect {
        SpecialEffect::TechStolen => gain(
            store,
            scene,
            &mut out,
            &[
                (StatKey::Technology, t.tech_stolen_technology),
                (StatKey::Knowledge, t.tech_stolen_knowledge),
            ],
        ),
        SpecialEffect::TradeSecretsStolen => gain(
            store,
            scene,
            &mut out,
            &[
                (StatKey::Wealth, t.trade_secrets_wealth),
                (StatKey::Technology, t.trade_secrets_technology),
            ],
        ),
        SpecialEffect::GrainSeized => {
            let amount = scene.target.food * t.grain_seized_fraction;
            transfer(store, scene, &mut out, StatKey::Food, amount);
        }
        SpecialEffect::LivestockRustled => {
            gain(store, scene, &mut out, &[(StatKey::Food, t.livestock_food)]);
        }
        SpecialEffect::TreasuryLooted => {
            let amount = scene.target.wealth * t.treasury_looted_fraction;
            transfer(store, scene, &mut out, StatKey::Wealth, amount);
        }
        SpecialEffect::BlueprintsStolen => gain(
            store,
            scene,
            &mut out,
            &[
                (StatKey::Technology, t.blueprints_technology),
                (StatKey::Military, t.blueprints_military),
            ],
        ),
        SpecialEffect::SoldiersDefect => {
            gain(store, scene, &mut out, &[(StatKey::Military, t.defector_military)]);
            relocate(store, scene, &mut out, Role::Soldier);
        }
        SpecialEffect::GeneralKilled => kill_first(store, scene, &mut out, Role::General),
        SpecialEffect::HeirKilled => kill_first(store, scene, &mut out, Role::Heir),
        SpecialEffect::AdvisorKilled => kill_first(store, scene, &mut out, Role::Advisor),
        SpecialEffect::RulerKilled => kill_first(store, scene, &mut out, Role::Ruler),
        SpecialEffect::PriestsKilled => kill_first(store, scene, &mut out, Role::Priest),
        SpecialEffect::RebelsArmed => seed_faction(
            store,
            scene,
            &mut out,
            FactionKind::Rebels,
            format!("{target_name} Rebels"),
            t.rebel_strength,
        ),
        SpecialEffect::HereticSectFounded => seed_faction(
            store,
            scene,
            &mut out,
            FactionKind::HereticSect,
            format!("Heretics of {target_name}"),
            t.heretic_strength,
        ),
        SpecialEffect::SeparatistsSponsored => seed_faction(
            store,
            scene,
            &mut out,
            FactionKind::Separatists,
            format!("Free {target_name}"),
            t.separatist_strength,
        ),
        SpecialEffect::AllianceSoured => erode_trust(
            store,
            scene,
            &mut out,
            t.alliance_soured_trust,
            |status| status <= DiplomaticStatus::Friendly,
        ),
        SpecialEffect::ReputationSmeared => {
            erode_trust(store, scene, &mut out, t.reputation_smear_trust, |_| true)
        }
        SpecialEffect::RelicStolen => {
            gain(store, scene, &mut out, &[(StatKey::Influence, t.relic_influence)]);
        }
        SpecialEffect::WaterPoisoned => {
            sicken(store, scene, &mut out, t.water_poisoned_fraction, "Poisoned wells");
        }
        SpecialEffect::PlagueSpread => {
            sicken(store, scene, &mut out, t.plague_fraction, "Plague");
        }
        SpecialEffect::FeverOutbreak => {
            sicken(store, scene, &mut out, t.fever_fraction, "Fever");
        }
        SpecialEffect::SettlersLured => {
            let amount = (scene.target.population * t.settlers_lured_fraction)
                .min(t.settlers_lured_max);
            transfer(store, scene, &mut out, StatKey::Population, amount);
        }
        SpecialEffect::WorkersPoached => {
            transfer(
                store,
                scene,
                &mut out,
                StatKey::Population,
                t.workers_poached_population,
            );
            gain(store, scene, &mut out, &[(StatKey::Wealth, t.workers_poached_wealth)]);
        }
        SpecialEffect::CraftsmenKidnapped => relocate(store, scene, &mut out, Role::Craftsman),
        SpecialEffect::ScholarsAbducted => relocate(store, scene, &mut out, Role::Scholar),
        SpecialEffect::NoblesBlackmailed => gain(
            store,
            scene,
            &mut out,
            &[
                (StatKey::Influence, t.blackmail_influence),
                (StatKey::Wealth, t.blackmail_wealth),
            ],
        ),
        SpecialEffect::SecretsExtracted => {
            gain(store, scene, &mut out, &[(StatKey::Knowledge, t.secrets_knowledge)]);
        }
        SpecialEffect::SpyNetworkEstablished => {
            plant_agent(store, scene, &mut out, t.spy_network_skill);
        }
        SpecialEffect::InformantRecruited => plant_agent(store, scene, &mut out, t.informant_skill),
        SpecialEffect::CourtInfiltrated => plant_agent(store, scene, &mut out, t.court_skill),
    }

    tracing::debug!(
        action = %scene.action,
        effect = %effect,
        attacker = %scene.attacker.id,
        target = %scene.target.id,
        gains = ?out.attacker_gains,
        roster_changes = out.roster_changes.len(),
        "special effect applied"
    );
    out
}

fn merge(into: &mut StatDeltas, from: StatDeltas) {
    for (key, delta) in from {
        *into.entry(key).or_insert(0.0) += delta;
    }
}

/// Credit the attacker with fixed amounts.
fn gain<S: PolityStore + ?Sized>(
    store: &mut S,
    scene: &mut EffectScene,
    out: &mut EffectOutcome,
    amounts: &[(StatKey, f64)],
) {
    let deltas: StatDeltas = amounts.iter().copied().collect();
    let applied = scene.attacker.apply_clamped(&deltas);
    if !applied.is_empty() {
        store.apply_stat_delta(scene.attacker.id, &applied);
    }
    merge(&mut out.attacker_gains, applied);
}

/// Move up to `amount` of `key` from target to attacker. Only what the target
/// actually had is transferred.
fn transfer<S: PolityStore + ?Sized>(
    store: &mut S,
    scene: &mut EffectScene,
    out: &mut EffectOutcome,
    key: StatKey,
    amount: f64,
) {
    let loss = scene
        .target
        .apply_clamped(&StatDeltas::from([(key, -amount.max(0.0))]));
    let taken = -loss.get(&key).copied().unwrap_or(0.0);
    if taken <= 0.0 {
        return;
    }
    store.apply_stat_delta(scene.target.id, &loss);
    merge(&mut out.target_deltas, loss);
    gain(store, scene, out, &[(key, taken)]);
}

/// Move up to `max_relocated` living characters with `role` onto the attacker's roster.
fn relocate<S: PolityStore + ?Sized>(
    store: &mut S,
    scene: &mut EffectScene,
    out: &mut EffectOutcome,
    role: Role,
) {
    let taken: Vec<CharacterId> = store
        .characters(scene.target.id)
        .into_iter()
        .filter(|c| c.role == role)
        .take(scene.tuning.max_relocated)
        .map(|c| c.id)
        .collect();
    if taken.is_empty() {
        return;
    }
    for &character in &taken {
        store.move_character(character, scene.attacker.id);
        out.roster_changes.push(RosterChange::CharacterMoved {
            character,
            from: scene.target.id,
            to: scene.attacker.id,
        });
    }
    store.emit_world_event(WorldEvent {
        tick: scene.tick,
        kind: WorldEventKind::Abduction,
        actor: scene.target.id,
        target: None,
        title: format!("Abductions in {}", scene.target.name),
        description: format!(
            "{} {} characters of {} vanished without a trace.",
            taken.len(),
            role,
            scene.target.name
        ),
        severity: Severity::Moderate,
    });
}

/// Kill the first living character with `role`. Nothing happens if there is none.
fn kill_first<S: PolityStore + ?Sized>(
    store: &mut S,
    scene: &mut EffectScene,
    out: &mut EffectOutcome,
    role: Role,
) {
    let Some(victim) = store
        .characters(scene.target.id)
        .into_iter()
        .find(|c| c.role == role)
    else {
        return;
    };
    store.kill_character(victim.id);
    out.roster_changes.push(RosterChange::CharacterKilled {
        character: victim.id,
        polity: scene.target.id,
        role,
    });
    let severity = match role {
        Role::Ruler | Role::Heir => Severity::Critical,
        _ => Severity::Major,
    };
    // The event names only the victim's polity; exposure is a separate event.
    store.emit_world_event(WorldEvent {
        tick: scene.tick,
        kind: WorldEventKind::Assassination,
        actor: scene.target.id,
        target: None,
        title: format!("{} the {} assassinated", victim.name, role),
        description: format!("{} of {} was found dead.", victim.name, scene.target.name),
        severity,
    });
}

fn seed_faction<S: PolityStore + ?Sized>(
    store: &mut S,
    scene: &mut EffectScene,
    out: &mut EffectOutcome,
    kind: FactionKind,
    name: String,
    strength: f64,
) {
    let faction = store.spawn_faction(FactionSeed {
        kind,
        host: scene.target.id,
        sponsor: Some(scene.attacker.id),
        name: name.clone(),
        strength: strength.clamp(0.0, 100.0),
        tick: scene.tick,
    });
    out.roster_changes.push(RosterChange::FactionSpawned {
        faction,
        kind,
        host: scene.target.id,
    });
    store.emit_world_event(WorldEvent {
        tick: scene.tick,
        kind: WorldEventKind::FactionFormed,
        actor: scene.target.id,
        target: None,
        title: format!("{name} rise in {}", scene.target.name),
        description: format!("{name} has formed inside {}.", scene.target.name),
        severity: Severity::Moderate,
    });
}

/// Lower trust between the target and every third polity whose standing with
/// it passes `filter`.
fn erode_trust<S: PolityStore + ?Sized>(
    store: &mut S,
    scene: &mut EffectScene,
    out: &mut EffectOutcome,
    amount: f64,
    filter: impl Fn(DiplomaticStatus) -> bool,
) {
    let target = scene.target.id;
    let attacker = scene.attacker.id;
    for other in store.roster() {
        if other == target || other == attacker {
            continue;
        }
        let rel = store.relationship(target, other);
        if !filter(rel.status) {
            continue;
        }
        let next = (rel.trust - amount).clamp(TRUST_MIN, TRUST_MAX);
        let delta = next - rel.trust;
        if delta == 0.0 {
            continue;
        }
        store.set_relationship(
            target,
            other,
            RelationshipUpdate {
                trust: Some(next),
                ..Default::default()
            },
        );
        out.roster_changes.push(RosterChange::TrustEroded {
            a: target,
            b: other,
            delta,
        });
    }
}

fn sicken<S: PolityStore + ?Sized>(
    store: &mut S,
    scene: &mut EffectScene,
    out: &mut EffectOutcome,
    fraction: f64,
    label: &str,
) {
    let fraction = fraction.clamp(0.0, 1.0);
    if fraction == 0.0 {
        return;
    }
    store.mark_sick(scene.target.id, fraction);
    out.roster_changes.push(RosterChange::PopulationSickened {
        polity: scene.target.id,
        fraction,
    });
    store.emit_world_event(WorldEvent {
        tick: scene.tick,
        kind: WorldEventKind::Outbreak,
        actor: scene.target.id,
        target: None,
        title: format!("{label} in {}", scene.target.name),
        description: format!(
            "Sickness takes hold of {:.0}% of {}.",
            fraction * 100.0,
            scene.target.name
        ),
        severity: Severity::Major,
    });
}

fn plant_agent<S: PolityStore + ?Sized>(
    store: &mut S,
    scene: &mut EffectScene,
    out: &mut EffectOutcome,
    skill: f64,
) {
    let capability =
        store.establish_capability(scene.attacker.id, scene.target.id, skill.clamp(0.0, 100.0));
    out.roster_changes.push(RosterChange::CapabilityEstablished {
        capability,
        owner: scene.attacker.id,
        target: scene.target.id,
    });
}

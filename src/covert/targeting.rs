//! Target selection: ranks the targets named by motives and narrows each one's
//! suggested actions to what the actor can actually attempt.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use super::catalog::{ActionDefinition, ActionKind, Catalog};
use super::config::CovertConfig;
use super::motive::{Motive, clamp_score};
use super::ports::PolityRead;
use crate::id::PolityId;
use crate::model::capability;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetCandidate {
    pub target: PolityId,
    /// 0–100.
    pub pressure: f64,
    pub top_reason: String,
    /// At most `max_suggested_actions`, deduplicated, strongest motive first.
    pub suggested_actions: Vec<ActionKind>,
}

/// Per-target accumulator.
#[derive(Debug, Default)]
struct TargetTally {
    pressure: f64,
    top_intensity: f64,
    top_reason: String,
    /// Strongest motive intensity recommending each action.
    action_scores: BTreeMap<ActionKind, f64>,
}

impl TargetTally {
    fn absorb(&mut self, motive: &Motive) {
        self.pressure += motive.intensity;
        if self.top_reason.is_empty() || motive.intensity > self.top_intensity {
            self.top_intensity = motive.intensity;
            self.top_reason = motive.reason.clone();
        }
        for &action in &motive.suggested_actions {
            let score = self.action_scores.entry(action).or_insert(0.0);
            if motive.intensity > *score {
                *score = motive.intensity;
            }
        }
    }
}

/// Whether `owner` holds at least one active capability instance inside `target`.
pub fn has_active_capability<S: PolityRead + ?Sized>(
    store: &S,
    owner: PolityId,
    target: PolityId,
) -> bool {
    capability::best_active(&store.capability_instances(owner, target)).is_some()
}

/// Whether `actor` may attempt `def` against `target` right now.
pub fn is_permitted<S: PolityRead + ?Sized>(
    store: &S,
    def: &ActionDefinition,
    actor: PolityId,
    target: PolityId,
) -> bool {
    !def.requires_capability || has_active_capability(store, actor, target)
}

/// Build the ranked target list for `actor` from its motives.
///
/// Targets below the pressure threshold, and targets with no permitted action,
/// are dropped before the top-N cut.
pub fn rank_targets<S: PolityRead + ?Sized>(
    store: &S,
    catalog: &Catalog,
    config: &CovertConfig,
    actor: PolityId,
    motives: &[Motive],
) -> Vec<TargetCandidate> {
    let mut tallies: BTreeMap<PolityId, TargetTally> = BTreeMap::new();
    for motive in motives.iter().filter(|m| m.intensity > 0.0) {
        if let Some(target) = motive.target {
            tallies.entry(target).or_default().absorb(motive);
        }
    }

    let mut candidates: Vec<TargetCandidate> = tallies
        .into_iter()
        .filter_map(|(target, tally)| {
            let pressure = clamp_score(tally.pressure);
            if pressure < config.pressure_threshold {
                return None;
            }
            let suggested_actions = rank_actions(store, catalog, config, actor, target, &tally);
            if suggested_actions.is_empty() {
                tracing::debug!(actor = %actor, target = %target, "no permitted action for target");
                return None;
            }
            Some(TargetCandidate {
                target,
                pressure,
                top_reason: tally.top_reason,
                suggested_actions,
            })
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.pressure
            .partial_cmp(&a.pressure)
            .unwrap_or(Ordering::Equal)
            .then(a.target.cmp(&b.target))
    });
    candidates.truncate(config.max_candidates);
    candidates
}

fn rank_actions<S: PolityRead + ?Sized>(
    store: &S,
    catalog: &Catalog,
    config: &CovertConfig,
    actor: PolityId,
    target: PolityId,
    tally: &TargetTally,
) -> Vec<ActionKind> {
    let mut scored: Vec<(ActionKind, f64)> = tally
        .action_scores
        .iter()
        .filter_map(|(&kind, &score)| {
            let def = catalog.get(kind).ok()?;
            is_permitted(store, def, actor, target).then_some((kind, score))
        })
        .collect();

    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then(catalog.order_of(a.0).cmp(&catalog.order_of(b.0)))
    });
    scored
        .into_iter()
        .take(config.max_suggested_actions)
        .map(|(kind, _)| kind)
        .collect()
}

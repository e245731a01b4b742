use rand::{Rng, RngCore};

use super::context::TickContext;
use super::signal::{Signal, SignalKind};
use super::system::{SimSystem, TickFrequency};
use crate::covert::{
    ActionKind, Catalog, CovertConfig, CovertError, PolityRead, Resolution, ResolutionResult,
    TargetCandidate, assess_pressure, maybe_retaliate, resolve,
};
use crate::id::{EventId, PolityId};
use crate::model::WorldEventKind;

/// Drives the covert engine: every living polity weighs its grievances each
/// tick and may act on them, and victims who catch an attacker may strike back
/// in the reaction phase.
pub struct CovertOpsSystem {
    catalog: Catalog,
    config: CovertConfig,
    frequency: TickFrequency,
}

impl CovertOpsSystem {
    pub fn new(catalog: Catalog, config: CovertConfig) -> Self {
        Self {
            catalog,
            config,
            frequency: TickFrequency::EveryTick,
        }
    }

    /// System backed by the embedded action table.
    pub fn with_builtin_catalog(config: CovertConfig) -> Result<Self, CovertError> {
        Ok(Self::new(Catalog::load_builtin()?, config))
    }

    pub fn every(mut self, frequency: TickFrequency) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &CovertConfig {
        &self.config
    }

    /// One actor's turn. Returns the resolved attempt, if any.
    fn act(&self, ctx: &mut TickContext, actor: PolityId) -> Option<ResolutionResult> {
        let report = match assess_pressure(&*ctx.world, &self.catalog, &self.config, actor) {
            Ok(report) => report,
            Err(err) => {
                tracing::warn!(actor = %actor, error = %err, "skipping pressure assessment");
                return None;
            }
        };
        if report.ranked_targets.is_empty() {
            return None;
        }

        let attempt_chance = (report.total_pressure / 100.0).clamp(0.0, 1.0);
        if !ctx.rng.random_bool(attempt_chance) {
            return None;
        }

        let candidate = pick_target(&report.ranked_targets, ctx.rng);
        let action = pick_action(&candidate.suggested_actions, ctx.rng)?;
        let target = candidate.target;

        match resolve(
            &mut *ctx.world,
            &self.catalog,
            &self.config,
            actor,
            target,
            action,
            ctx.rng,
        ) {
            Ok(Resolution::Resolved(result)) => Some(result),
            Ok(Resolution::CapabilityMissing { action }) => {
                tracing::warn!(
                    actor = %actor,
                    target = %target,
                    action = %action,
                    "suggested action lacks an agent"
                );
                None
            }
            Err(err) => {
                tracing::warn!(actor = %actor, target = %target, error = %err, "attempt skipped");
                None
            }
        }
    }
}

impl SimSystem for CovertOpsSystem {
    fn name(&self) -> &str {
        "covert_ops"
    }

    fn frequency(&self) -> TickFrequency {
        self.frequency
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        if !self.config.attempts_enabled {
            return;
        }

        for actor in ctx.world.roster() {
            let Some(result) = self.act(ctx, actor) else {
                continue;
            };

            if result.agent_captured {
                let event_id = latest_event(ctx, WorldEventKind::AgentCaptured);
                ctx.signals.push(Signal {
                    event_id,
                    kind: SignalKind::AgentCaptured {
                        owner: result.attacker,
                        host: result.target,
                    },
                });
            }
            if !result.detected {
                continue;
            }

            let event_id = latest_event(ctx, WorldEventKind::CovertActionExposed);
            ctx.signals.push(Signal {
                event_id,
                kind: SignalKind::CovertActionDetected {
                    attacker: result.attacker,
                    victim: result.target,
                    action: result.action,
                },
            });
            if result.war_declared {
                ctx.signals.push(Signal {
                    event_id: latest_event(ctx, WorldEventKind::WarDeclared),
                    kind: SignalKind::WarDeclared {
                        aggressor: result.target,
                        defender: result.attacker,
                    },
                });
            }
        }
    }

    fn handle_signals(&mut self, ctx: &mut TickContext) {
        for signal in ctx.inbox {
            let SignalKind::CovertActionDetected {
                attacker,
                victim,
                action,
            } = signal.kind
            else {
                continue;
            };
            if let Err(err) = maybe_retaliate(
                &mut *ctx.world,
                &self.catalog,
                &self.config,
                victim,
                attacker,
                action,
                ctx.rng,
            ) {
                tracing::warn!(
                    victim = %victim,
                    attacker = %attacker,
                    error = %err,
                    "retaliation skipped"
                );
            }
        }
    }
}

fn latest_event(ctx: &TickContext, kind: WorldEventKind) -> Option<EventId> {
    ctx.world.events_of(kind).last().map(|e| e.id)
}

/// Weighted by pressure; falls back to the top candidate when no weight is positive.
fn pick_target<'a>(candidates: &'a [TargetCandidate], rng: &mut dyn RngCore) -> &'a TargetCandidate {
    let total: f64 = candidates.iter().map(|c| c.pressure.max(0.0)).sum();
    if total <= 0.0 {
        return &candidates[0];
    }
    let mut roll = rng.random_range(0.0..total);
    let mut chosen = &candidates[candidates.len() - 1];
    for c in candidates {
        let weight = c.pressure.max(0.0);
        if roll < weight {
            chosen = c;
            break;
        }
        roll -= weight;
    }
    chosen
}

/// Weighted by rank: with `n` suggestions the first weighs `n`, the last `1`.
fn pick_action(actions: &[ActionKind], rng: &mut dyn RngCore) -> Option<ActionKind> {
    let n = actions.len();
    if n == 0 {
        return None;
    }
    let total = n * (n + 1) / 2;
    let mut roll = rng.random_range(0..total);
    for (i, action) in actions.iter().enumerate() {
        let weight = n - i;
        if roll < weight {
            return Some(*action);
        }
        roll -= weight;
    }
    actions.last().copied()
}

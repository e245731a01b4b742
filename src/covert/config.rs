use serde::Deserialize;

use super::error::CovertError;

/// Balance knobs for the engine. Every field has a default, so a JSON override
/// only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CovertConfig {
    /// Targets whose pressure falls below this are never selected.
    pub pressure_threshold: f64,
    pub max_candidates: usize,
    pub max_suggested_actions: usize,
    /// How many of the newest memories the grudge scan reads.
    pub recent_memory_window: usize,
    /// Skill assumed when no capability instance is involved.
    pub default_agent_skill: f64,
    /// Percent chance a failed capability-backed attempt loses the agent.
    pub capture_chance: f64,
    /// When false the scheduler only evaluates pressure and never attempts.
    pub attempts_enabled: bool,
    pub effects: EffectTuning,
}

impl Default for CovertConfig {
    fn default() -> Self {
        Self {
            pressure_threshold: 20.0,
            max_candidates: 5,
            max_suggested_actions: 5,
            recent_memory_window: 20,
            default_agent_skill: 50.0,
            capture_chance: 35.0,
            attempts_enabled: true,
            effects: EffectTuning::default(),
        }
    }
}

impl CovertConfig {
    pub fn from_json(json: &str) -> Result<Self, CovertError> {
        serde_json::from_str(json).map_err(CovertError::Config)
    }
}

/// Fixed amounts used by special-effect handlers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EffectTuning {
    pub tech_stolen_technology: f64,
    pub tech_stolen_knowledge: f64,
    pub trade_secrets_wealth: f64,
    pub trade_secrets_technology: f64,
    pub grain_seized_fraction: f64,
    pub livestock_food: f64,
    pub treasury_looted_fraction: f64,
    pub blueprints_technology: f64,
    pub blueprints_military: f64,
    pub defector_military: f64,
    /// Upper bound on characters moved by one abduction or defection.
    pub max_relocated: usize,
    pub rebel_strength: f64,
    pub heretic_strength: f64,
    pub separatist_strength: f64,
    pub alliance_soured_trust: f64,
    pub reputation_smear_trust: f64,
    pub relic_influence: f64,
    pub water_poisoned_fraction: f64,
    pub plague_fraction: f64,
    pub fever_fraction: f64,
    pub settlers_lured_fraction: f64,
    pub settlers_lured_max: f64,
    pub workers_poached_population: f64,
    pub workers_poached_wealth: f64,
    pub blackmail_influence: f64,
    pub blackmail_wealth: f64,
    pub secrets_knowledge: f64,
    pub spy_network_skill: f64,
    pub informant_skill: f64,
    pub court_skill: f64,
}

impl Default for EffectTuning {
    fn default() -> Self {
        Self {
            tech_stolen_technology: 5.0,
            tech_stolen_knowledge: 10.0,
            trade_secrets_wealth: 8.0,
            trade_secrets_technology: 2.0,
            grain_seized_fraction: 0.15,
            livestock_food: 8.0,
            treasury_looted_fraction: 0.15,
            blueprints_technology: 3.0,
            blueprints_military: 5.0,
            defector_military: 5.0,
            max_relocated: 3,
            rebel_strength: 30.0,
            heretic_strength: 20.0,
            separatist_strength: 35.0,
            alliance_soured_trust: 20.0,
            reputation_smear_trust: 5.0,
            relic_influence: 8.0,
            water_poisoned_fraction: 0.10,
            plague_fraction: 0.15,
            fever_fraction: 0.08,
            settlers_lured_fraction: 0.05,
            settlers_lured_max: 5.0,
            workers_poached_population: 3.0,
            workers_poached_wealth: 3.0,
            blackmail_influence: 5.0,
            blackmail_wealth: 5.0,
            secrets_knowledge: 5.0,
            spy_network_skill: 55.0,
            informant_skill: 40.0,
            court_skill: 65.0,
        }
    }
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::id::PolityId;

/// A numeric field on a polity that covert actions can read or move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum StatKey {
    Population,
    Food,
    Wealth,
    Military,
    Happiness,
    Influence,
    Technology,
    Knowledge,
    CounterIntel,
}

string_enum!(StatKey {
    Population => "population",
    Food => "food",
    Wealth => "wealth",
    Military => "military",
    Happiness => "happiness",
    Influence => "influence",
    Technology => "technology",
    Knowledge => "knowledge",
    CounterIntel => "counter_intel",
});

/// How a stat behaves at its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatBound {
    /// Readiness/quality style fields: held inside `[0, 100]`.
    Rate,
    /// Stockpile style fields: floored at 0, no upper cap (plunder can pile up).
    Magnitude,
}

impl StatKey {
    pub fn bound(self) -> StatBound {
        match self {
            StatKey::Military
            | StatKey::Happiness
            | StatKey::Influence
            | StatKey::CounterIntel => StatBound::Rate,
            StatKey::Population
            | StatKey::Food
            | StatKey::Wealth
            | StatKey::Technology
            | StatKey::Knowledge => StatBound::Magnitude,
        }
    }

    /// Apply `delta` to `current` and clamp the result per [`StatKey::bound`].
    pub fn apply(self, current: f64, delta: f64) -> f64 {
        let next = current + delta;
        match self.bound() {
            StatBound::Rate => next.clamp(0.0, 100.0),
            StatBound::Magnitude => next.max(0.0),
        }
    }
}

/// Ordered map of stat changes. Ordered so reports and mutations are replayable.
pub type StatDeltas = BTreeMap<StatKey, f64>;

/// Personality levers that scale motive and retaliation math, each 0–100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Personality {
    pub cunning: f64,
    pub aggression: f64,
    pub wrath: f64,
}

impl Default for Personality {
    fn default() -> Self {
        Self {
            cunning: 50.0,
            aggression: 50.0,
            wrath: 50.0,
        }
    }
}

/// Read-only view of a polity as the engine sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    pub id: PolityId,
    pub name: String,
    pub population: f64,
    pub food: f64,
    pub wealth: f64,
    pub military: f64,
    pub happiness: f64,
    pub influence: f64,
    pub technology: f64,
    pub knowledge: f64,
    pub counter_intel: f64,
    pub personality: Personality,
    pub eliminated: bool,
}

impl ActorSnapshot {
    pub fn stat(&self, key: StatKey) -> f64 {
        match key {
            StatKey::Population => self.population,
            StatKey::Food => self.food,
            StatKey::Wealth => self.wealth,
            StatKey::Military => self.military,
            StatKey::Happiness => self.happiness,
            StatKey::Influence => self.influence,
            StatKey::Technology => self.technology,
            StatKey::Knowledge => self.knowledge,
            StatKey::CounterIntel => self.counter_intel,
        }
    }

    pub fn stat_mut(&mut self, key: StatKey) -> &mut f64 {
        match key {
            StatKey::Population => &mut self.population,
            StatKey::Food => &mut self.food,
            StatKey::Wealth => &mut self.wealth,
            StatKey::Military => &mut self.military,
            StatKey::Happiness => &mut self.happiness,
            StatKey::Influence => &mut self.influence,
            StatKey::Technology => &mut self.technology,
            StatKey::Knowledge => &mut self.knowledge,
            StatKey::CounterIntel => &mut self.counter_intel,
        }
    }

    /// Apply deltas to this snapshot with bound clamping and return the deltas
    /// that actually took effect (after clamping). Zero effective deltas are dropped.
    pub fn apply_clamped(&mut self, deltas: &StatDeltas) -> StatDeltas {
        let mut applied = StatDeltas::new();
        for (&key, &delta) in deltas {
            let before = self.stat(key);
            let after = key.apply(before, delta);
            *self.stat_mut(key) = after;
            let effective = after - before;
            if effective != 0.0 {
                *applied.entry(key).or_insert(0.0) += effective;
            }
        }
        applied
    }

    /// Weak enough to invite opportunists.
    pub fn is_vulnerable(&self) -> bool {
        self.military < 20.0 || self.happiness < 30.0 || self.population < 50.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creed {
    pub name: String,
    /// Tolerance of other faiths, 0–100.
    pub tolerance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum RivalryStatus {
    Active,
    Dormant,
    Resolved,
}

string_enum!(RivalryStatus {
    Active => "active",
    Dormant => "dormant",
    Resolved => "resolved",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rivalry {
    pub other: PolityId,
    /// 0–100.
    pub intensity: f64,
    pub status: RivalryStatus,
}

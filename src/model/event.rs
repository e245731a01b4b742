use serde::{Deserialize, Serialize};

use crate::id::{EventId, PolityId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum WorldEventKind {
    CovertActionExposed,
    AgentCaptured,
    WarDeclared,
    Retaliation,
    FactionFormed,
    Assassination,
    Abduction,
    Outbreak,
}

string_enum!(WorldEventKind {
    CovertActionExposed => "covert_action_exposed",
    AgentCaptured => "agent_captured",
    WarDeclared => "war_declared",
    Retaliation => "retaliation",
    FactionFormed => "faction_formed",
    Assassination => "assassination",
    Abduction => "abduction",
    Outbreak => "outbreak",
});

/// Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Severity {
    Minor,
    Moderate,
    Major,
    Critical,
}

string_enum!(Severity {
    Minor => "minor",
    Moderate => "moderate",
    Major => "major",
    Critical => "critical",
});

impl Severity {
    /// Map a 0–100 risk score onto a severity band.
    pub fn from_risk(risk: f64) -> Self {
        match risk {
            r if r >= 75.0 => Severity::Critical,
            r if r >= 50.0 => Severity::Major,
            r if r >= 25.0 => Severity::Moderate,
            _ => Severity::Minor,
        }
    }
}

/// An event the engine asks the world to record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldEvent {
    pub tick: u64,
    pub kind: WorldEventKind,
    pub actor: PolityId,
    pub target: Option<PolityId>,
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

/// A [`WorldEvent`] after the world has assigned it an ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedEvent {
    pub id: EventId,
    #[serde(flatten)]
    pub event: WorldEvent,
}

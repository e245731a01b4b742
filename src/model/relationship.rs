use serde::{Deserialize, Serialize};

use crate::id::PolityId;

pub const TRUST_MIN: f64 = -100.0;
pub const TRUST_MAX: f64 = 100.0;

/// Diplomatic standing between two polities.
///
/// Variants are declared from warmest to most hostile, so `Ord` compares hostility:
/// `a < b` means `b` is the more hostile standing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum DiplomaticStatus {
    Allied,
    Friendly,
    Neutral,
    Tense,
    Hostile,
    AtWar,
}

string_enum!(DiplomaticStatus {
    Allied => "allied",
    Friendly => "friendly",
    Neutral => "neutral",
    Tense => "tense",
    Hostile => "hostile",
    AtWar => "at_war",
});

impl DiplomaticStatus {
    /// One step toward open hostility, stopping short of war.
    ///
    /// War is only ever entered through an explicit declaration.
    pub fn escalated(self) -> Self {
        match self {
            DiplomaticStatus::Allied | DiplomaticStatus::Friendly | DiplomaticStatus::Neutral => {
                DiplomaticStatus::Tense
            }
            DiplomaticStatus::Tense | DiplomaticStatus::Hostile => DiplomaticStatus::Hostile,
            DiplomaticStatus::AtWar => DiplomaticStatus::AtWar,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// -100 (blood feud) to 100 (unshakeable).
    pub trust: f64,
    pub status: DiplomaticStatus,
    pub war_cause: Option<String>,
}

impl Default for Relationship {
    fn default() -> Self {
        Self {
            trust: 0.0,
            status: DiplomaticStatus::Neutral,
            war_cause: None,
        }
    }
}

/// Partial update for a relationship; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationshipUpdate {
    pub trust: Option<f64>,
    pub status: Option<DiplomaticStatus>,
    pub war_cause: Option<String>,
}

impl Relationship {
    pub fn apply(&mut self, update: &RelationshipUpdate) {
        if let Some(trust) = update.trust {
            self.trust = trust.clamp(TRUST_MIN, TRUST_MAX);
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(cause) = &update.war_cause {
            self.war_cause = Some(cause.clone());
        }
    }
}

/// Unordered pair key: relationships are bilateral, so `(a, b)` and `(b, a)`
/// address the same record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RelationKey {
    pub low: PolityId,
    pub high: PolityId,
}

impl RelationKey {
    pub fn new(a: PolityId, b: PolityId) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hostility_ordering() {
        assert!(DiplomaticStatus::Allied < DiplomaticStatus::Neutral);
        assert!(DiplomaticStatus::Tense < DiplomaticStatus::Hostile);
        assert!(DiplomaticStatus::Hostile < DiplomaticStatus::AtWar);
    }

    #[test]
    fn escalation_never_reaches_war_or_softens() {
        for status in DiplomaticStatus::ALL {
            let next = status.escalated();
            assert!(next >= *status);
            if *status != DiplomaticStatus::AtWar {
                assert_ne!(next, DiplomaticStatus::AtWar);
            }
        }
        assert_eq!(DiplomaticStatus::Allied.escalated(), DiplomaticStatus::Tense);
        assert_eq!(DiplomaticStatus::Tense.escalated(), DiplomaticStatus::Hostile);
    }

    #[test]
    fn update_clamps_trust() {
        let mut rel = Relationship::default();
        rel.apply(&RelationshipUpdate {
            trust: Some(-140.0),
            ..Default::default()
        });
        assert!((rel.trust - TRUST_MIN).abs() < f64::EPSILON);
        assert_eq!(rel.status, DiplomaticStatus::Neutral);
    }

    #[test]
    fn relation_key_is_unordered() {
        assert_eq!(
            RelationKey::new(PolityId(4), PolityId(2)),
            RelationKey::new(PolityId(2), PolityId(4))
        );
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&DiplomaticStatus::AtWar).unwrap(),
            "\"at_war\""
        );
    }
}

use serde::{Deserialize, Serialize};

use crate::id::{CapabilityId, PolityId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum CapabilityStatus {
    Active,
    Captured,
    Retired,
}

string_enum!(CapabilityStatus {
    Active => "active",
    Captured => "captured",
    Retired => "retired",
});

/// An asset `owner` holds inside `target` (an embedded agent, a bought courtier).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityInstance {
    pub id: CapabilityId,
    pub owner: PolityId,
    pub target: PolityId,
    /// 0–100.
    pub skill: f64,
    pub status: CapabilityStatus,
}

impl CapabilityInstance {
    pub fn is_active(&self) -> bool {
        self.status == CapabilityStatus::Active
    }
}

/// The most skilled active instance in `instances`, if any.
///
/// Ties resolve to the lowest ID so selection stays deterministic.
pub fn best_active(instances: &[CapabilityInstance]) -> Option<&CapabilityInstance> {
    instances
        .iter()
        .filter(|c| c.is_active())
        .min_by(|a, b| b.skill.total_cmp(&a.skill).then(a.id.cmp(&b.id)))
}

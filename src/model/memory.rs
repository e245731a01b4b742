use serde::{Deserialize, Serialize};

use crate::id::PolityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum MemoryKind {
    Betrayal,
    Defeat,
    Loss,
    Triumph,
    Alliance,
    Gift,
    Insult,
}

string_enum!(MemoryKind {
    Betrayal => "betrayal",
    Defeat => "defeat",
    Loss => "loss",
    Triumph => "triumph",
    Alliance => "alliance",
    Gift => "gift",
    Insult => "insult",
});

impl MemoryKind {
    /// Kinds that can ripen into a grudge against the memory's target.
    pub fn breeds_grudge(self) -> bool {
        matches!(self, MemoryKind::Betrayal | MemoryKind::Defeat | MemoryKind::Loss)
    }
}

/// An emotionally weighted memory held by one polity.
///
/// The engine only emits these; consolidation and decay belong to the memory store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEvent {
    pub actor: PolityId,
    pub kind: MemoryKind,
    pub target: Option<PolityId>,
    pub description: String,
    /// -100 (searing) to 100 (cherished).
    pub emotional_weight: f64,
    pub tick: u64,
}

use serde::{Deserialize, Serialize};

use crate::covert::ActionKind;
use crate::id::{EventId, PolityId};

/// A signal emitted by one system and consumed by others.
/// Carries the world event that caused it, when there is one, so reacting
/// systems can link their follow-up events back to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub event_id: Option<EventId>,
    pub kind: SignalKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SignalKind {
    /// `victim` caught `attacker` attempting `action`.
    CovertActionDetected {
        attacker: PolityId,
        victim: PolityId,
        action: ActionKind,
    },

    /// Detection of a covert action pushed two polities into war.
    WarDeclared {
        aggressor: PolityId,
        defender: PolityId,
    },

    /// An agent was taken by the polity it was planted in.
    AgentCaptured {
        owner: PolityId,
        host: PolityId,
    },

    /// Extensible: any system can emit a custom signal.
    Custom {
        name: String,
        data: serde_json::Value,
    },
}

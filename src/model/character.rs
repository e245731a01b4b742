use serde::{Deserialize, Serialize};

use crate::id::{CharacterId, FactionId, PolityId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Role {
    Ruler,
    Heir,
    General,
    Priest,
    Advisor,
    Craftsman,
    Scholar,
    Soldier,
    Merchant,
    Commoner,
}

string_enum!(Role {
    Ruler => "ruler",
    Heir => "heir",
    General => "general",
    Priest => "priest",
    Advisor => "advisor",
    Craftsman => "craftsman",
    Scholar => "scholar",
    Soldier => "soldier",
    Merchant => "merchant",
    Commoner => "commoner",
});

/// A named person on a polity's roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub polity: PolityId,
    pub role: Role,
    pub alive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum FactionKind {
    Rebels,
    HereticSect,
    Separatists,
}

string_enum!(FactionKind {
    Rebels => "rebels",
    HereticSect => "heretic_sect",
    Separatists => "separatists",
});

/// Request to seed a dissident faction inside `host`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactionSeed {
    pub kind: FactionKind,
    pub host: PolityId,
    /// The polity that covertly backs the faction.
    pub sponsor: Option<PolityId>,
    pub name: String,
    /// 0–100.
    pub strength: f64,
    pub tick: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faction {
    pub id: FactionId,
    #[serde(flatten)]
    pub seed: FactionSeed,
}

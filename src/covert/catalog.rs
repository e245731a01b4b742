//! Static table of covert action definitions.
//!
//! The built-in table ships as `data/covert_actions.json`. Definition order in the
//! file is the catalog order, which breaks every tie in target/action ranking.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::error::{CatalogError, CovertError};
use crate::model::StatDeltas;

pub const BUILTIN_COVERT_ACTION_CATALOG: &str = include_str!("../../data/covert_actions.json");

/// Every covert action the engine knows how to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ActionKind {
    // economic
    BurnGranaries,
    PoisonCrops,
    RaidGrainStores,
    StealTreasury,
    CounterfeitCurrency,
    SabotageTrade,
    BribeOfficials,
    RustleLivestock,
    StealTradeSecrets,
    StealTechnology,
    // military
    SabotageArmory,
    BurnBarracks,
    AssassinateGeneral,
    BribeCommanders,
    StealWarPlans,
    SabotageFortifications,
    DestroySupplyLines,
    PoisonHorses,
    // political
    SpreadPropaganda,
    DiscreditLeader,
    InciteRiots,
    AssassinateHeir,
    AssassinateAdvisor,
    FundRebels,
    SowDiscord,
    ForgeDocuments,
    AssassinateRuler,
    // religious
    DesecrateTemple,
    SpreadHeresy,
    AssassinateHighPriest,
    StealRelic,
    InciteReligiousSchism,
    ForgeProphecy,
    PoisonPilgrims,
    // infrastructure
    PoisonWaterSupply,
    DestroyBridges,
    BurnWarehouses,
    FloodMines,
    SabotageAqueduct,
    BurnLibrary,
    WreckHarbor,
    CollapseRoads,
    // demographic
    SpreadPlague,
    LureSettlers,
    KidnapCraftsmen,
    AbductScholars,
    EncourageEmigration,
    PoachWorkers,
    TaintWells,
    // psychological
    SpreadRumors,
    PlantOmens,
    FakeInvasionAlarm,
    TerrorizeVillages,
    NightRaids,
    DemoralizeTroops,
    BlackmailNobles,
    // social
    EstablishSpyNetwork,
    RecruitInformant,
    InfiltrateCourt,
    InciteClassHatred,
    SeduceNoble,
    SponsorSeparatists,
    RuinReputation,
}

string_enum!(ActionKind {
    BurnGranaries => "burn_granaries",
    PoisonCrops => "poison_crops",
    RaidGrainStores => "raid_grain_stores",
    StealTreasury => "steal_treasury",
    CounterfeitCurrency => "counterfeit_currency",
    SabotageTrade => "sabotage_trade",
    BribeOfficials => "bribe_officials",
    RustleLivestock => "rustle_livestock",
    StealTradeSecrets => "steal_trade_secrets",
    StealTechnology => "steal_technology",
    SabotageArmory => "sabotage_armory",
    BurnBarracks => "burn_barracks",
    AssassinateGeneral => "assassinate_general",
    BribeCommanders => "bribe_commanders",
    StealWarPlans => "steal_war_plans",
    SabotageFortifications => "sabotage_fortifications",
    DestroySupplyLines => "destroy_supply_lines",
    PoisonHorses => "poison_horses",
    SpreadPropaganda => "spread_propaganda",
    DiscreditLeader => "discredit_leader",
    InciteRiots => "incite_riots",
    AssassinateHeir => "assassinate_heir",
    AssassinateAdvisor => "assassinate_advisor",
    FundRebels => "fund_rebels",
    SowDiscord => "sow_discord",
    ForgeDocuments => "forge_documents",
    AssassinateRuler => "assassinate_ruler",
    DesecrateTemple => "desecrate_temple",
    SpreadHeresy => "spread_heresy",
    AssassinateHighPriest => "assassinate_high_priest",
    StealRelic => "steal_relic",
    InciteReligiousSchism => "incite_religious_schism",
    ForgeProphecy => "forge_prophecy",
    PoisonPilgrims => "poison_pilgrims",
    PoisonWaterSupply => "poison_water_supply",
    DestroyBridges => "destroy_bridges",
    BurnWarehouses => "burn_warehouses",
    FloodMines => "flood_mines",
    SabotageAqueduct => "sabotage_aqueduct",
    BurnLibrary => "burn_library",
    WreckHarbor => "wreck_harbor",
    CollapseRoads => "collapse_roads",
    SpreadPlague => "spread_plague",
    LureSettlers => "lure_settlers",
    KidnapCraftsmen => "kidnap_craftsmen",
    AbductScholars => "abduct_scholars",
    EncourageEmigration => "encourage_emigration",
    PoachWorkers => "poach_workers",
    TaintWells => "taint_wells",
    SpreadRumors => "spread_rumors",
    PlantOmens => "plant_omens",
    FakeInvasionAlarm => "fake_invasion_alarm",
    TerrorizeVillages => "terrorize_villages",
    NightRaids => "night_raids",
    DemoralizeTroops => "demoralize_troops",
    BlackmailNobles => "blackmail_nobles",
    EstablishSpyNetwork => "establish_spy_network",
    RecruitInformant => "recruit_informant",
    InfiltrateCourt => "infiltrate_court",
    InciteClassHatred => "incite_class_hatred",
    SeduceNoble => "seduce_noble",
    SponsorSeparatists => "sponsor_separatists",
    RuinReputation => "ruin_reputation",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Category {
    Economic,
    Military,
    Political,
    Religious,
    Infrastructure,
    Demographic,
    Psychological,
    Social,
}

string_enum!(Category {
    Economic => "economic",
    Military => "military",
    Political => "political",
    Religious => "religious",
    Infrastructure => "infrastructure",
    Demographic => "demographic",
    Psychological => "psychological",
    Social => "social",
});

/// Closed set of special effects. Each has exactly one handler in
/// [`effects`](super::effects); adding a variant without a handler fails to compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum SpecialEffect {
    TechStolen,
    TradeSecretsStolen,
    GrainSeized,
    LivestockRustled,
    TreasuryLooted,
    BlueprintsStolen,
    SoldiersDefect,
    GeneralKilled,
    HeirKilled,
    AdvisorKilled,
    RulerKilled,
    PriestsKilled,
    RebelsArmed,
    HereticSectFounded,
    SeparatistsSponsored,
    AllianceSoured,
    ReputationSmeared,
    RelicStolen,
    WaterPoisoned,
    PlagueSpread,
    FeverOutbreak,
    SettlersLured,
    WorkersPoached,
    CraftsmenKidnapped,
    ScholarsAbducted,
    NoblesBlackmailed,
    SecretsExtracted,
    SpyNetworkEstablished,
    InformantRecruited,
    CourtInfiltrated,
}

string_enum!(SpecialEffect {
    TechStolen => "tech_stolen",
    TradeSecretsStolen => "trade_secrets_stolen",
    GrainSeized => "grain_seized",
    LivestockRustled => "livestock_rustled",
    TreasuryLooted => "treasury_looted",
    BlueprintsStolen => "blueprints_stolen",
    SoldiersDefect => "soldiers_defect",
    GeneralKilled => "general_killed",
    HeirKilled => "heir_killed",
    AdvisorKilled => "advisor_killed",
    RulerKilled => "ruler_killed",
    PriestsKilled => "priests_killed",
    RebelsArmed => "rebels_armed",
    HereticSectFounded => "heretic_sect_founded",
    SeparatistsSponsored => "separatists_sponsored",
    AllianceSoured => "alliance_soured",
    ReputationSmeared => "reputation_smeared",
    RelicStolen => "relic_stolen",
    WaterPoisoned => "water_poisoned",
    PlagueSpread => "plague_spread",
    FeverOutbreak => "fever_outbreak",
    SettlersLured => "settlers_lured",
    WorkersPoached => "workers_poached",
    CraftsmenKidnapped => "craftsmen_kidnapped",
    ScholarsAbducted => "scholars_abducted",
    NoblesBlackmailed => "nobles_blackmailed",
    SecretsExtracted => "secrets_extracted",
    SpyNetworkEstablished => "spy_network_established",
    InformantRecruited => "informant_recruited",
    CourtInfiltrated => "court_infiltrated",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDefinition {
    pub kind: ActionKind,
    pub category: Category,
    pub base_difficulty: f64,
    pub base_detect_chance: f64,
    pub war_risk: f64,
    #[serde(default)]
    pub requires_capability: bool,
    #[serde(default)]
    pub effects: StatDeltas,
    #[serde(default)]
    pub special_effect: Option<SpecialEffect>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    version: u32,
    actions: Vec<ActionDefinition>,
}

/// Immutable, ordered table of [`ActionDefinition`]s.
#[derive(Debug, Clone)]
pub struct Catalog {
    version: u32,
    definitions: Vec<ActionDefinition>,
    index: HashMap<ActionKind, usize>,
}

impl Catalog {
    pub fn load_builtin() -> Result<Self, CatalogError> {
        Self::load_from_str(BUILTIN_COVERT_ACTION_CATALOG)
    }

    pub fn load_from_str(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::from_definitions(file.version, file.actions)
    }

    pub fn from_definitions(
        version: u32,
        definitions: Vec<ActionDefinition>,
    ) -> Result<Self, CatalogError> {
        if definitions.is_empty() {
            return Err(CatalogError::EmptyCatalog);
        }

        let mut index = HashMap::with_capacity(definitions.len());
        for (i, def) in definitions.iter().enumerate() {
            if index.insert(def.kind, i).is_some() {
                return Err(CatalogError::DuplicateAction(def.kind));
            }
            check_range(def.kind, "base_difficulty", def.base_difficulty)?;
            check_range(def.kind, "base_detect_chance", def.base_detect_chance)?;
            check_range(def.kind, "war_risk", def.war_risk)?;
            for delta in def.effects.values() {
                check_range(def.kind, "effects", delta.abs())?;
            }
        }

        Ok(Self {
            version,
            definitions,
            index,
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Definitions in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &ActionDefinition> {
        self.definitions.iter()
    }

    pub fn get(&self, kind: ActionKind) -> Result<&ActionDefinition, CovertError> {
        self.index
            .get(&kind)
            .map(|&i| &self.definitions[i])
            .ok_or_else(|| CovertError::UnknownActionKind(kind.to_string()))
    }

    pub fn contains(&self, kind: ActionKind) -> bool {
        self.index.contains_key(&kind)
    }

    /// Catalog position of `kind`; unknown kinds sort after every known one.
    pub fn order_of(&self, kind: ActionKind) -> usize {
        self.index.get(&kind).copied().unwrap_or(usize::MAX)
    }

    /// Resolve an action by its wire name.
    pub fn lookup(&self, name: &str) -> Result<&ActionDefinition, CovertError> {
        let kind = ActionKind::from_name(name)
            .ok_or_else(|| CovertError::UnknownActionKind(name.to_string()))?;
        self.get(kind)
    }

    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &ActionDefinition> {
        self.definitions
            .iter()
            .filter(move |d| d.category == category)
    }
}

fn check_range(action: ActionKind, field: &'static str, value: f64) -> Result<(), CatalogError> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(CatalogError::OutOfRange {
            action,
            field,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StatKey;

    #[test]
    fn builtin_catalog_loads() {
        let catalog = Catalog::load_builtin().unwrap();
        assert!(catalog.len() >= 60, "expected ~60 actions, got {}", catalog.len());
        assert_eq!(catalog.version(), 1);
    }

    #[test]
    fn builtin_catalog_covers_every_kind_and_category() {
        let catalog = Catalog::load_builtin().unwrap();
        for kind in ActionKind::ALL {
            assert!(catalog.contains(*kind), "{kind} missing from builtin catalog");
        }
        for category in Category::ALL {
            assert!(
                catalog.in_category(*category).next().is_some(),
                "{category} has no actions"
            );
        }
    }

    #[test]
    fn builtin_catalog_fires_every_special_effect() {
        let catalog = Catalog::load_builtin().unwrap();
        for effect in SpecialEffect::ALL {
            assert!(
                catalog.iter().any(|d| d.special_effect == Some(*effect)),
                "{effect} is never used by the builtin catalog"
            );
        }
    }

    #[test]
    fn builtin_catalog_order_follows_file() {
        let catalog = Catalog::load_builtin().unwrap();
        assert_eq!(catalog.order_of(ActionKind::BurnGranaries), 0);
        assert!(
            catalog.order_of(ActionKind::BurnGranaries) < catalog.order_of(ActionKind::PoisonCrops)
        );
    }

    #[test]
    fn steal_technology_definition() {
        let catalog = Catalog::load_builtin().unwrap();
        let def = catalog.get(ActionKind::StealTechnology).unwrap();
        assert_eq!(def.category, Category::Economic);
        assert!(def.requires_capability);
        assert_eq!(def.special_effect, Some(SpecialEffect::TechStolen));
    }

    #[test]
    fn lookup_unknown_name_is_unknown_action_kind() {
        let catalog = Catalog::load_builtin().unwrap();
        let err = catalog.lookup("summon_dragon").unwrap_err();
        assert!(matches!(err, CovertError::UnknownActionKind(name) if name == "summon_dragon"));
    }

    #[test]
    fn get_missing_kind_from_partial_catalog() {
        let catalog = Catalog::load_from_str(
            r#"{"version": 2, "actions": [
                {"kind": "spread_rumors", "category": "psychological",
                 "base_difficulty": 20, "base_detect_chance": 20, "war_risk": 10}
            ]}"#,
        )
        .unwrap();
        assert!(catalog.get(ActionKind::SpreadRumors).is_ok());
        assert!(matches!(
            catalog.get(ActionKind::BurnGranaries),
            Err(CovertError::UnknownActionKind(_))
        ));
    }

    #[test]
    fn duplicate_action_rejected() {
        let json = r#"{"version": 1, "actions": [
            {"kind": "spread_rumors", "category": "psychological",
             "base_difficulty": 20, "base_detect_chance": 20, "war_risk": 10},
            {"kind": "spread_rumors", "category": "psychological",
             "base_difficulty": 25, "base_detect_chance": 20, "war_risk": 10}
        ]}"#;
        assert!(matches!(
            Catalog::load_from_str(json),
            Err(CatalogError::DuplicateAction(ActionKind::SpreadRumors))
        ));
    }

    #[test]
    fn out_of_range_rejected() {
        let json = r#"{"version": 1, "actions": [
            {"kind": "spread_rumors", "category": "psychological",
             "base_difficulty": 120, "base_detect_chance": 20, "war_risk": 10}
        ]}"#;
        assert!(matches!(
            Catalog::load_from_str(json),
            Err(CatalogError::OutOfRange {
                field: "base_difficulty",
                ..
            })
        ));
    }

    #[test]
    fn unknown_kind_in_file_is_parse_error() {
        let json = r#"{"version": 1, "actions": [
            {"kind": "summon_dragon", "category": "military",
             "base_difficulty": 20, "base_detect_chance": 20, "war_risk": 10}
        ]}"#;
        assert!(matches!(
            Catalog::load_from_str(json),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn empty_catalog_rejected() {
        assert!(matches!(
            Catalog::load_from_str(r#"{"version": 1, "actions": []}"#),
            Err(CatalogError::EmptyCatalog)
        ));
    }

    #[test]
    fn effect_vector_parses_stat_keys() {
        let catalog = Catalog::load_builtin().unwrap();
        let def = catalog.get(ActionKind::BurnGranaries).unwrap();
        assert!(def.effects[&StatKey::Food] < 0.0);
    }
}

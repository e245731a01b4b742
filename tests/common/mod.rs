#![allow(dead_code)]

use covert_ops::model::*;
use covert_ops::{PolityId, Scenario};
use rand::RngCore;

/// RNG whose every float draw lands on the same unit value.
pub struct FixedRoll(pub f64);

impl RngCore for FixedRoll {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        let unit = self.0.clamp(0.0, 0.999_999);
        ((unit * (1u64 << 52) as f64) as u64) << 12
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        rand::rand_core::impls::fill_bytes_via_next(self, dst);
    }
}

pub struct Contested {
    pub world: World,
    pub aster: PolityId,
    pub brannoc: PolityId,
    pub corvel: PolityId,
    pub dunmar: PolityId,
}

/// Four polities with every kind of friction: a famine, a blood grudge, an
/// open war, a rivalry, clashing creeds, and agents planted on both sides.
pub fn contested_world() -> Contested {
    let mut s = Scenario::new();
    let aster = s.polity("Aster").food(8.0).cunning(80.0).aggression(70.0).id();
    let brannoc = s
        .polity("Brannoc")
        .food(90.0)
        .wealth(120.0)
        .cunning(65.0)
        .wrath(80.0)
        .id();
    let corvel = s
        .polity("Corvel")
        .military(15.0)
        .counter_intel(35.0)
        .cunning(60.0)
        .id();
    let dunmar = s.polity("Dunmar").wealth(8.0).cunning(75.0).aggression(90.0).id();

    s.memory(aster, MemoryKind::Betrayal, Some(brannoc), -70.0, "The poisoned wells")
        .status(brannoc, corvel, DiplomaticStatus::AtWar)
        .trust(brannoc, corvel, -60.0)
        .trust(dunmar, brannoc, -45.0)
        .creed(corvel, "the Ember", 10.0)
        .creed(dunmar, "the Tide", 60.0)
        .rivalry(
            dunmar,
            Rivalry {
                other: aster,
                intensity: 70.0,
                status: RivalryStatus::Active,
            },
        );

    s.capability(aster, brannoc, 65.0);
    s.capability(brannoc, corvel, 55.0);
    s.capability(dunmar, aster, 40.0);

    for (polity, name) in [(aster, "Ilse"), (brannoc, "Oren"), (corvel, "Sabe"), (dunmar, "Vey")] {
        s.character(polity, name, Role::Ruler);
        s.character(polity, &format!("{name}'s heir"), Role::Heir);
        s.character(polity, &format!("General of {name}"), Role::General);
        s.character(polity, &format!("Smith of {name}"), Role::Craftsman);
    }

    Contested {
        world: s.build(),
        aster,
        brannoc,
        corvel,
        dunmar,
    }
}

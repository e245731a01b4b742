use std::fmt;

use serde::{Deserialize, Serialize};

/// Monotonic ID generator shared across every record the world allocates.
/// Guarantees globally unique raw IDs: no character, faction, capability
/// instance, or event shares a number with another.
#[derive(Debug)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn starting_from(start: u64) -> Self {
        Self { next: start }
    }

    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Allocate the next ID wrapped in a typed identifier.
    pub fn next<T: From<u64>>(&mut self) -> T {
        T::from(self.next_id())
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! typed_id {
    ($(#[$meta:meta])* $name:ident, $prefix:expr) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            pub fn raw(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", $prefix, self.0)
            }
        }
    };
}

typed_id!(
    /// A competing polity (actor or target of covert operations).
    PolityId,
    "polity"
);
typed_id!(CharacterId, "character");
typed_id!(
    /// A prerequisite asset, usually an embedded agent, owned by one polity
    /// and placed inside another.
    CapabilityId,
    "capability"
);
typed_id!(FactionId, "faction");
typed_id!(EventId, "event");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_ids() {
        let mut id_gen = IdGenerator::new();
        assert_eq!(id_gen.next_id(), 1);
        assert_eq!(id_gen.next_id(), 2);
        assert_eq!(id_gen.next_id(), 3);
    }

    #[test]
    fn starting_from() {
        let mut id_gen = IdGenerator::starting_from(100);
        assert_eq!(id_gen.next_id(), 100);
        assert_eq!(id_gen.next_id(), 101);
    }

    #[test]
    fn typed_ids_share_one_sequence() {
        let mut id_gen = IdGenerator::new();
        let c: CharacterId = id_gen.next();
        let f: FactionId = id_gen.next();
        assert_eq!(c, CharacterId(1));
        assert_eq!(f, FactionId(2));
    }

    #[test]
    fn ids_serialize_as_bare_numbers() {
        assert_eq!(serde_json::to_string(&PolityId(7)).unwrap(), "7");
        let back: PolityId = serde_json::from_str("7").unwrap();
        assert_eq!(back, PolityId(7));
        assert_eq!(PolityId(7).to_string(), "polity#7");
    }
}

//! The static credit-pack catalog.
//!
//! Packs are the only purchasable unit. Checkout derives both price and
//! credit amount from this table by pack name; client-supplied prices or
//! credit counts are never trusted.

use serde::Serialize;

/// A purchasable bundle of credits at a fixed price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CreditPack {
    /// Catalog key. Unique, referenced by checkout requests and webhook
    /// metadata.
    pub name: &'static str,

    /// Credits granted on settlement. Always positive.
    pub credits: i64,

    /// Price in currency minor units (cents). Always positive.
    pub price_minor_units: i64,
}

/// The fixed catalog. Defined once; every pack name used downstream must
/// resolve here before any side effect.
pub const CATALOG: &[CreditPack] = &[
    CreditPack {
        name: "starter",
        credits: 10,
        price_minor_units: 499,
    },
    CreditPack {
        name: "basic",
        credits: 30,
        price_minor_units: 999,
    },
    CreditPack {
        name: "studio",
        credits: 100,
        price_minor_units: 2499,
    },
];

/// Look up a pack by exact name.
#[must_use]
pub fn find_pack(name: &str) -> Option<&'static CreditPack> {
    CATALOG.iter().find(|pack| pack.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_packs_resolve() {
        let basic = find_pack("basic").unwrap();
        assert_eq!(basic.credits, 30);
        assert_eq!(basic.price_minor_units, 999);
    }

    #[test]
    fn unknown_pack_is_rejected() {
        assert!(find_pack("mega").is_none());
        assert!(find_pack("").is_none());
        // Lookup is exact, not case-folded.
        assert!(find_pack("Basic").is_none());
    }

    #[test]
    fn catalog_entries_are_positive_and_unique() {
        for pack in CATALOG {
            assert!(pack.credits > 0);
            assert!(pack.price_minor_units > 0);
        }
        let mut names: Vec<_> = CATALOG.iter().map(|p| p.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), CATALOG.len());
    }
}

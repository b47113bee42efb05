//! Asset catalog: static asset definitions consulted by the rules engine
//!
//! The engine never owns catalog content. It reads definitions through the
//! [`AssetCatalog`] trait, so a host can plug in whatever data source it
//! ships with. [`StaticCatalog`] is the in-memory implementation used by the
//! binary and the tests.

mod loader;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{Attribute, Credits};

pub use loader::{load_catalog, parse_catalog_toml};

/// Reserved definition id for a Base of Influence
pub const BASE_OF_INFLUENCE: &str = "base_of_influence";

/// Static description of an asset type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDefinition {
    pub id: String,
    pub name: String,
    pub cost: Credits,
    pub hp: i32,
    pub maintenance: Credits,
    pub category: Attribute,
    pub required_rating: u8,
    pub tech_level: u8,
    #[serde(default)]
    pub special_flags: Vec<String>,
}

/// Side effects applied when an asset is bought
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseEffects {
    pub auto_stealth: bool,
}

/// Read-only lookups the engine needs from the asset catalog
pub trait AssetCatalog {
    fn definition(&self, id: &str) -> Option<&AssetDefinition>;

    /// Feature-specific maintenance adjustment, may be negative
    fn maintenance_modifier(&self, id: &str) -> i32;

    fn purchase_effects(&self, id: &str) -> PurchaseEffects;
}

/// In-memory catalog keyed by definition id
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    definitions: AHashMap<String, AssetDefinition>,
    maintenance_modifiers: AHashMap<String, i32>,
    purchase_effects: AHashMap<String, PurchaseEffects>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, definition: AssetDefinition) {
        self.definitions.insert(definition.id.clone(), definition);
    }

    pub fn set_maintenance_modifier(&mut self, id: impl Into<String>, modifier: i32) {
        self.maintenance_modifiers.insert(id.into(), modifier);
    }

    pub fn set_purchase_effects(&mut self, id: impl Into<String>, effects: PurchaseEffects) {
        self.purchase_effects.insert(id.into(), effects);
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl AssetCatalog for StaticCatalog {
    fn definition(&self, id: &str) -> Option<&AssetDefinition> {
        self.definitions.get(id)
    }

    fn maintenance_modifier(&self, id: &str) -> i32 {
        self.maintenance_modifiers.get(id).copied().unwrap_or(0)
    }

    fn purchase_effects(&self, id: &str) -> PurchaseEffects {
        self.purchase_effects.get(id).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn militia() -> AssetDefinition {
        AssetDefinition {
            id: "militia_unit".into(),
            name: "Militia Unit".into(),
            cost: 4,
            hp: 4,
            maintenance: 1,
            category: Attribute::Force,
            required_rating: 1,
            tech_level: 3,
            special_flags: Vec::new(),
        }
    }

    #[test]
    fn test_lookup_and_defaults() {
        let mut catalog = StaticCatalog::new();
        catalog.insert(militia());

        assert_eq!(catalog.definition("militia_unit").map(|d| d.cost), Some(4));
        assert!(catalog.definition("unknown").is_none());
        assert_eq!(catalog.maintenance_modifier("militia_unit"), 0);
        assert!(!catalog.purchase_effects("militia_unit").auto_stealth);
    }

    #[test]
    fn test_feature_overrides() {
        let mut catalog = StaticCatalog::new();
        catalog.insert(militia());
        catalog.set_maintenance_modifier("militia_unit", 2);
        catalog.set_purchase_effects("militia_unit", PurchaseEffects { auto_stealth: true });

        assert_eq!(catalog.maintenance_modifier("militia_unit"), 2);
        assert!(catalog.purchase_effects("militia_unit").auto_stealth);
    }
}

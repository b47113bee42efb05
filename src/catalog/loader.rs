//! Load asset catalogs from TOML files

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::catalog::{AssetCatalog, AssetDefinition, PurchaseEffects, StaticCatalog, BASE_OF_INFLUENCE};

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    asset: Vec<AssetEntry>,
}

/// One `[[asset]]` table: the definition plus its feature hooks
#[derive(Debug, Deserialize)]
struct AssetEntry {
    #[serde(flatten)]
    definition: AssetDefinition,
    #[serde(default)]
    maintenance_modifier: i32,
    #[serde(default)]
    auto_stealth: bool,
}

/// Load a catalog file from disk
pub fn load_catalog(path: &Path) -> Result<StaticCatalog, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    parse_catalog_toml(&content)
}

/// Parse a catalog document made of `[[asset]]` tables
pub fn parse_catalog_toml(content: &str) -> Result<StaticCatalog, String> {
    let file: CatalogFile =
        toml::from_str(content).map_err(|e| format!("Invalid catalog TOML: {}", e))?;

    let mut catalog = StaticCatalog::new();
    for entry in file.asset {
        let id = entry.definition.id.clone();
        if id == BASE_OF_INFLUENCE {
            return Err(format!("'{}' is reserved and cannot be defined in a catalog", id));
        }
        if catalog.definition(&id).is_some() {
            return Err(format!("Duplicate asset definition '{}'", id));
        }
        if !(1..=8).contains(&entry.definition.required_rating) {
            return Err(format!(
                "{}: required_rating {} is outside 1..=8",
                id, entry.definition.required_rating
            ));
        }
        if entry.definition.hp <= 0 {
            return Err(format!("{}: hp must be positive", id));
        }

        if entry.maintenance_modifier != 0 {
            catalog.set_maintenance_modifier(id.clone(), entry.maintenance_modifier);
        }
        if entry.auto_stealth {
            catalog.set_purchase_effects(id.clone(), PurchaseEffects { auto_stealth: true });
        }
        catalog.insert(entry.definition);
    }

    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Attribute;

    const SAMPLE: &str = r#"
[[asset]]
id = "smugglers"
name = "Smugglers"
cost = 2
hp = 4
maintenance = 0
category = "Cunning"
required_rating = 1
tech_level = 4
auto_stealth = true

[[asset]]
id = "heavy_drop_assets"
name = "Heavy Drop Assets"
cost = 25
hp = 15
maintenance = 2
category = "Force"
required_rating = 6
tech_level = 4
maintenance_modifier = 1
special_flags = ["transport"]
"#;

    #[test]
    fn test_parse_sample() {
        let catalog = parse_catalog_toml(SAMPLE).unwrap();
        assert_eq!(catalog.len(), 2);

        let drop = catalog.definition("heavy_drop_assets").unwrap();
        assert_eq!(drop.category, Attribute::Force);
        assert_eq!(drop.special_flags, vec!["transport".to_string()]);
        assert_eq!(catalog.maintenance_modifier("heavy_drop_assets"), 1);

        assert!(catalog.purchase_effects("smugglers").auto_stealth);
        assert!(!catalog.purchase_effects("heavy_drop_assets").auto_stealth);
    }

    #[test]
    fn test_rejects_reserved_id() {
        let doc = r#"
[[asset]]
id = "base_of_influence"
name = "Base"
cost = 1
hp = 1
maintenance = 0
category = "Force"
required_rating = 1
tech_level = 0
"#;
        assert!(parse_catalog_toml(doc).unwrap_err().contains("reserved"));
    }

    #[test]
    fn test_rejects_duplicates() {
        let doc = format!("{}\n{}", SAMPLE, &SAMPLE[SAMPLE.find("[[asset]]\nid = \"heavy").unwrap()..]);
        assert!(parse_catalog_toml(&doc).unwrap_err().contains("Duplicate"));
    }
}

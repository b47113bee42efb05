//! Scenario files
//!
//! A scenario is one TOML document holding everything needed to start a
//! game: engine config, the systems of the sector, the founding factions,
//! and the asset catalog as `[[asset]]` tables.
//!
//! ```toml
//! name = "Hydra Reach"
//!
//! [config]
//! seed = 7
//!
//! [[system]]
//! id = 0
//! name = "Gallis"
//! tech_level = 4
//!
//! [[faction]]
//! name = "Perimeter Agency"
//! homeworld = 0
//! force = 3
//! cunning = 2
//! wealth = 1
//! tags = ["Secretive"]
//!
//! [[asset]]
//! id = "militia_unit"
//! name = "Militia Unit"
//! cost = 4
//! hp = 4
//! maintenance = 1
//! category = "Force"
//! required_rating = 1
//! tech_level = 0
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::catalog::{parse_catalog_toml, StaticCatalog};
use crate::core::config::EngineConfig;
use crate::core::error::Result;
use crate::sector::engine::{Engine, NewFaction};
use crate::sector::system::{Sector, StarSystem};

#[derive(Debug, Deserialize)]
struct ScenarioFile {
    #[serde(default)]
    name: String,
    #[serde(default)]
    config: EngineConfig,
    #[serde(default)]
    system: Vec<StarSystem>,
    #[serde(default)]
    faction: Vec<NewFaction>,
}

/// A parsed scenario, ready to start an engine from
#[derive(Debug, Clone)]
pub struct Scenario {
    pub sector: Sector,
    pub factions: Vec<NewFaction>,
    pub catalog: StaticCatalog,
    pub config: EngineConfig,
}

impl Scenario {
    pub fn load(path: &Path) -> std::result::Result<Self, String> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        let file: ScenarioFile =
            toml::from_str(content).map_err(|e| format!("Invalid scenario TOML: {}", e))?;
        file.config.validate()?;
        let catalog = parse_catalog_toml(content)?;

        let mut seen = Vec::with_capacity(file.system.len());
        for system in &file.system {
            if seen.contains(&system.id) {
                return Err(format!("Duplicate system id {}", system.id));
            }
            seen.push(system.id);
        }

        Ok(Self {
            sector: Sector::new(file.name, file.system),
            factions: file.faction,
            catalog,
            config: file.config,
        })
    }

    /// Build an engine and add the founding factions in file order
    pub fn into_engine(self) -> Result<Engine<StaticCatalog>> {
        let mut engine = Engine::new(self.sector, self.catalog, self.config)?;
        for faction in self.factions {
            engine.add_faction(faction)?;
        }
        Ok(engine)
    }
}

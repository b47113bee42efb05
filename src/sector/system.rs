//! Star systems - the locations assets and bases occupy

use serde::{Deserialize, Serialize};

use crate::core::types::{FactionId, SystemId};

/// A star system
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StarSystem {
    pub id: SystemId,
    pub name: String,
    /// Highest asset tech level that can be bought here
    pub tech_level: u8,
    /// Faction that currently governs the system's main world
    pub planetary_government: Option<FactionId>,
}

impl StarSystem {
    pub fn new(id: SystemId, name: impl Into<String>, tech_level: u8) -> Self {
        Self {
            id,
            name: name.into(),
            tech_level,
            planetary_government: None,
        }
    }
}

/// All systems in play
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub name: String,
    pub systems: Vec<StarSystem>,
}

impl Sector {
    pub fn new(name: impl Into<String>, systems: Vec<StarSystem>) -> Self {
        Self { name: name.into(), systems }
    }

    pub fn get(&self, id: SystemId) -> Option<&StarSystem> {
        self.systems.iter().find(|s| s.id == id)
    }

    pub fn get_mut(&mut self, id: SystemId) -> Option<&mut StarSystem> {
        self.systems.iter_mut().find(|s| s.id == id)
    }

    pub fn contains(&self, id: SystemId) -> bool {
        self.get(id).is_some()
    }

    /// Systems governed by a faction
    pub fn governed_by(&self, faction: FactionId) -> impl Iterator<Item = &StarSystem> {
        self.systems
            .iter()
            .filter(move |s| s.planetary_government == Some(faction))
    }
}

//! Engine configuration with documented constants
//!
//! The rules numbers that a table might reasonably house-rule live here.
//! The XP cost table and the income formula are fixed rules and are not
//! configurable.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::types::Credits;

/// Configuration for the rules engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seed for the engine RNG (bonus XP rolls). Same seed, same game.
    pub seed: u64,

    /// How many previous states `undo` can restore
    pub undo_depth: usize,

    /// Credits charged per hit point restored by a repair
    pub repair_cost_per_hp: Credits,

    /// Income bonus for the wealth-dominant tag, in percent
    ///
    /// At 25, an income of 4 becomes 5.
    pub wealth_tag_income_bonus_pct: u32,

    /// Extra maintenance for each asset beyond the rating cap of its category
    pub excess_asset_penalty: Credits,

    /// Consecutive unpaid maintenance turns before an asset is lost
    pub maintenance_strikes_to_evict: u8,

    /// Credits the scavenging tag earns per destroyed asset
    pub scavenger_reward: Credits,

    /// Chance the diplomacy tag earns bonus XP on a restraint goal
    pub restraint_bonus_chance: f64,

    /// Bonus XP awarded when the restraint roll succeeds
    pub restraint_bonus_xp: u32,

    /// Version stamped into save files
    pub save_version: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            undo_depth: 10,
            repair_cost_per_hp: 1,
            wealth_tag_income_bonus_pct: 25,
            excess_asset_penalty: 1,
            maintenance_strikes_to_evict: 2,
            scavenger_reward: 1,
            restraint_bonus_chance: 0.5,
            restraint_bonus_xp: 1,
            save_version: 1,
        }
    }
}

impl EngineConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML. Missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, String> {
        let config: EngineConfig =
            toml::from_str(content).map_err(|e| format!("Invalid engine config TOML: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.maintenance_strikes_to_evict == 0 {
            return Err("maintenance_strikes_to_evict must be at least 1".into());
        }

        if !(0.0..=1.0).contains(&self.restraint_bonus_chance) {
            return Err(format!(
                "restraint_bonus_chance ({}) must be within 0.0..=1.0",
                self.restraint_bonus_chance
            ));
        }

        if self.save_version == 0 {
            return Err("save_version must be positive".into());
        }

        Ok(())
    }
}

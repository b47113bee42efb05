//! Faction goals and their per-kind tracking data

use std::collections::BTreeSet;
use std::mem;

use serde::{Deserialize, Serialize};

use crate::core::types::{AssetId, Attribute, FactionId, GoalId, SystemId, Turn};

/// A tracked objective; completing it awards `difficulty` experience
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FactionGoal {
    pub id: GoalId,
    pub kind: GoalKind,
    pub description: String,
    pub progress: GoalProgress,
    /// XP awarded on completion
    pub difficulty: u32,
    pub is_completed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub current: u32,
    pub target: u32,
}

/// Goal type together with the auxiliary state that type needs
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalKind {
    /// Destroy Force assets
    MilitaryConquest,
    /// Destroy Cunning assets
    IntelligenceCoup,
    /// Destroy Wealth assets
    CommercialSabotage,
    /// Destroy an asset whose required rating exceeds ours
    DefeatStrongerAsset,
    /// Deal cumulative damage
    BloodTheEnemy,
    /// Plant a Base of Influence on a new world
    ExpandInfluence { known_bases: BTreeSet<SystemId> },
    /// Keep stealthed assets outside the homeworld
    InsideEnemyTerritory { tracked: BTreeSet<AssetId> },
    /// See a specific rival removed from the game
    DestroyTheFoe { target: FactionId },
    /// Go turns without attacking; `since_turn` is the last attack or assignment
    PeaceableKingdom { since_turn: Turn },
    /// Spend credits; progress is lifetime spending above the baseline
    WealthOfWorlds { baseline_spent: u64 },
    /// Become the planetary government of a system
    PlanetarySeizure { target: SystemId },
}

impl GoalKind {
    /// Asset category counted by the destruction goals
    pub fn conquest_category(&self) -> Option<Attribute> {
        match self {
            GoalKind::MilitaryConquest => Some(Attribute::Force),
            GoalKind::IntelligenceCoup => Some(Attribute::Cunning),
            GoalKind::CommercialSabotage => Some(Attribute::Wealth),
            _ => None,
        }
    }

    /// True when both values are the same goal type, whatever their data
    pub fn same_kind(&self, other: &GoalKind) -> bool {
        mem::discriminant(self) == mem::discriminant(other)
    }

    /// Progress for these kinds is recomputed from game state, not events
    pub fn is_polled(&self) -> bool {
        matches!(
            self,
            GoalKind::PeaceableKingdom { .. }
                | GoalKind::WealthOfWorlds { .. }
                | GoalKind::PlanetarySeizure { .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            GoalKind::MilitaryConquest => "Military Conquest",
            GoalKind::IntelligenceCoup => "Intelligence Coup",
            GoalKind::CommercialSabotage => "Commercial Sabotage",
            GoalKind::DefeatStrongerAsset => "Defeat a Stronger Asset",
            GoalKind::BloodTheEnemy => "Blood the Enemy",
            GoalKind::ExpandInfluence { .. } => "Expand Influence",
            GoalKind::InsideEnemyTerritory { .. } => "Inside Enemy Territory",
            GoalKind::DestroyTheFoe { .. } => "Destroy the Foe",
            GoalKind::PeaceableKingdom { .. } => "Peaceable Kingdom",
            GoalKind::WealthOfWorlds { .. } => "Wealth of Worlds",
            GoalKind::PlanetarySeizure { .. } => "Planetary Seizure",
        }
    }
}

/// What a caller supplies to assign a goal
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalSpec {
    pub kind: GoalKind,
    pub description: String,
    pub target: u32,
    pub difficulty: u32,
}

impl FactionGoal {
    pub fn is_active(&self) -> bool {
        !self.is_completed
    }

    pub fn remaining(&self) -> u32 {
        self.progress.target.saturating_sub(self.progress.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_kind_ignores_data() {
        let a = GoalKind::DestroyTheFoe { target: FactionId(1) };
        let b = GoalKind::DestroyTheFoe { target: FactionId(2) };
        assert!(a.same_kind(&b));
        assert!(!a.same_kind(&GoalKind::BloodTheEnemy));
    }

    #[test]
    fn test_conquest_categories() {
        assert_eq!(GoalKind::MilitaryConquest.conquest_category(), Some(Attribute::Force));
        assert_eq!(GoalKind::IntelligenceCoup.conquest_category(), Some(Attribute::Cunning));
        assert_eq!(GoalKind::CommercialSabotage.conquest_category(), Some(Attribute::Wealth));
        assert_eq!(GoalKind::BloodTheEnemy.conquest_category(), None);
    }

    #[test]
    fn test_polled_kinds() {
        assert!(GoalKind::WealthOfWorlds { baseline_spent: 0 }.is_polled());
        assert!(GoalKind::PlanetarySeizure { target: SystemId(2) }.is_polled());
        assert!(!GoalKind::MilitaryConquest.is_polled());
    }
}

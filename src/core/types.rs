//! Core type definitions used throughout the codebase

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for factions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FactionId(pub u32);

/// Unique identifier for assets owned by factions
///
/// Asset ids are allocated from a single counter per game, so they are
/// unique across all factions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetId(pub u32);

/// Star system identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SystemId(pub u32);

/// Unique identifier for faction goals
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GoalId(pub u32);

impl fmt::Display for FactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "faction#{}", self.0)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "asset#{}", self.0)
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "system#{}", self.0)
    }
}

/// Turn counter (simulation time unit)
pub type Turn = u32;

/// Credits are the faction currency
pub type Credits = u32;

/// Lowest attribute rating
pub const MIN_RATING: u8 = 1;

/// Highest attribute rating
pub const MAX_RATING: u8 = 8;

/// The three faction attributes. Asset categories use the same enumeration:
/// a Force asset is gated by the Force rating, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Attribute {
    Force,
    Cunning,
    Wealth,
}

impl Attribute {
    pub const ALL: [Attribute; 3] = [Attribute::Force, Attribute::Cunning, Attribute::Wealth];
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Attribute::Force => "Force",
            Attribute::Cunning => "Cunning",
            Attribute::Wealth => "Wealth",
        };
        f.write_str(name)
    }
}

/// The fixed phases of a faction turn, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Income,
    Maintenance,
    News,
    Action,
}

impl Phase {
    /// The phase that follows this one. `Action` wraps back to `Income`.
    pub fn next(self) -> Phase {
        match self {
            Phase::Income => Phase::Maintenance,
            Phase::Maintenance => Phase::News,
            Phase::News => Phase::Action,
            Phase::Action => Phase::Income,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Income => "Income",
            Phase::Maintenance => "Maintenance",
            Phase::News => "News",
            Phase::Action => "Action",
        };
        f.write_str(name)
    }
}

/// Kind of action a faction stages during the Action phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Attack,
    BuyAsset,
    SellAsset,
    RepairAsset,
    ExpandInfluence,
    ChangeHomeworld,
    UseAbility,
    SeizePlanet,
}

impl ActionKind {
    pub fn is_attack(self) -> bool {
        matches!(self, ActionKind::Attack)
    }
}

//! Faction - the playable organisations of the sector and the assets they own

use serde::{Deserialize, Serialize};

use crate::catalog::BASE_OF_INFLUENCE;
use crate::core::error::{InvariantViolation, ValidationError};
use crate::core::types::{AssetId, Attribute, Credits, FactionId, SystemId, Turn};
use crate::sector::goal::FactionGoal;
use crate::sector::systems::advancement::max_hp_for;

/// A faction (government, corporation, cult, syndicate, ...)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Faction {
    pub id: FactionId,
    pub name: String,
    pub archetype: String,
    pub homeworld: SystemId,
    pub attributes: Attributes,
    pub credits: Credits,
    pub xp: u32,
    /// Unique, in insertion order
    pub tags: Vec<FactionTag>,
    pub goal: Option<FactionGoal>,
    /// Owned assets, in purchase order
    pub assets: Vec<FactionAsset>,
    /// Lifetime credits spent on purchases, repairs and bases
    pub credits_spent: u64,
}

/// Ratings and hit points of a faction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    pub hp: i32,
    pub max_hp: i32,
    pub force: u8,
    pub cunning: u8,
    pub wealth: u8,
}

impl Attributes {
    /// Fresh attributes at full health
    pub fn new(force: u8, cunning: u8, wealth: u8) -> Self {
        let max_hp = max_hp_for(force, cunning, wealth);
        Self { hp: max_hp, max_hp, force, cunning, wealth }
    }

    pub fn rating(&self, attribute: Attribute) -> u8 {
        match attribute {
            Attribute::Force => self.force,
            Attribute::Cunning => self.cunning,
            Attribute::Wealth => self.wealth,
        }
    }

    pub fn set_rating(&mut self, attribute: Attribute, rating: u8) {
        match attribute {
            Attribute::Force => self.force = rating,
            Attribute::Cunning => self.cunning = rating,
            Attribute::Wealth => self.wealth = rating,
        }
    }
}

/// Passive faction traits with rules effects
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FactionTag {
    /// -1 maintenance per asset; earns credits whenever an asset is destroyed
    Scavengers,
    /// Wealth-dominant: bonus income
    Plutocratic,
    /// Diplomacy-affine: bonus XP roll on completing a restraint goal
    ExchangeConsulate,
    /// Lost when the faction relocates its homeworld
    DeepRooted,
    /// Held while the faction governs at least one system
    PlanetaryGovernment,
    /// Purchased assets start stealthed
    Secretive,
}

/// An asset owned by a faction
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FactionAsset {
    pub id: AssetId,
    pub definition_id: String,
    pub location: SystemId,
    pub hp: i32,
    pub max_hp: i32,
    pub stealthed: bool,
    pub purchased_turn: Option<Turn>,
    pub purchase_cost: Credits,
}

impl FactionAsset {
    pub fn is_base_of_influence(&self) -> bool {
        self.definition_id == BASE_OF_INFLUENCE
    }

    /// Assets cannot use their abilities on the turn they were bought
    pub fn is_ready(&self, turn: Turn) -> bool {
        self.purchased_turn.map_or(true, |bought| bought < turn)
    }
}

impl Faction {
    pub fn has_tag(&self, tag: FactionTag) -> bool {
        self.tags.contains(&tag)
    }

    /// Returns false if the tag was already present
    pub fn add_tag(&mut self, tag: FactionTag) -> bool {
        if self.has_tag(tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    /// Returns false if the tag was not present
    pub fn remove_tag(&mut self, tag: FactionTag) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| *t != tag);
        self.tags.len() != before
    }

    pub fn asset(&self, id: AssetId) -> Option<&FactionAsset> {
        self.assets.iter().find(|a| a.id == id)
    }

    pub fn asset_mut(&mut self, id: AssetId) -> Option<&mut FactionAsset> {
        self.assets.iter_mut().find(|a| a.id == id)
    }

    pub fn take_asset(&mut self, id: AssetId) -> Option<FactionAsset> {
        let index = self.assets.iter().position(|a| a.id == id)?;
        Some(self.assets.remove(index))
    }

    pub fn base_at(&self, system: SystemId) -> Option<&FactionAsset> {
        self.assets
            .iter()
            .find(|a| a.is_base_of_influence() && a.location == system)
    }

    pub fn base_at_mut(&mut self, system: SystemId) -> Option<&mut FactionAsset> {
        self.assets
            .iter_mut()
            .find(|a| a.is_base_of_influence() && a.location == system)
    }

    /// Systems where the faction holds a Base of Influence
    pub fn base_systems(&self) -> impl Iterator<Item = SystemId> + '_ {
        self.assets
            .iter()
            .filter(|a| a.is_base_of_influence())
            .map(|a| a.location)
    }

    pub fn has_homeworld_base(&self) -> bool {
        self.base_at(self.homeworld).is_some()
    }

    /// Check the faction can pay `amount` without mutating anything
    pub fn ensure_affordable(&self, amount: Credits) -> Result<(), ValidationError> {
        if self.credits < amount {
            return Err(ValidationError::InsufficientCredits {
                required: amount,
                available: self.credits,
            });
        }
        Ok(())
    }

    /// Deduct a purchase and record it as spending
    pub fn spend(&mut self, amount: Credits) -> Result<(), InvariantViolation> {
        self.credits = self.credits.checked_sub(amount).ok_or_else(|| {
            InvariantViolation::new(format!(
                "{} would go into debt paying {} with {} credits",
                self.id, amount, self.credits
            ))
        })?;
        self.credits_spent += u64::from(amount);
        Ok(())
    }

    pub fn earn(&mut self, amount: Credits) -> Result<(), InvariantViolation> {
        self.credits = self.credits.checked_add(amount).ok_or_else(|| {
            InvariantViolation::new(format!("{} credit balance overflowed", self.id))
        })?;
        Ok(())
    }

    /// Reduce faction hp, clamped at zero. Returns the damage actually taken.
    pub fn take_damage(&mut self, damage: i32) -> i32 {
        let taken = damage.clamp(0, self.attributes.hp);
        self.attributes.hp -= taken;
        taken
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_faction() -> Faction {
        Faction {
            id: FactionId(1),
            name: "Perimeter Agency".into(),
            archetype: "Government".into(),
            homeworld: SystemId(0),
            attributes: Attributes::new(3, 2, 1),
            credits: 10,
            xp: 0,
            tags: Vec::new(),
            goal: None,
            assets: vec![FactionAsset {
                id: AssetId(1),
                definition_id: BASE_OF_INFLUENCE.into(),
                location: SystemId(0),
                hp: 5,
                max_hp: 5,
                stealthed: false,
                purchased_turn: None,
                purchase_cost: 0,
            }],
            credits_spent: 0,
        }
    }

    #[test]
    fn test_tags_are_unique() {
        let mut faction = test_faction();
        assert!(faction.add_tag(FactionTag::Scavengers));
        assert!(!faction.add_tag(FactionTag::Scavengers));
        assert_eq!(faction.tags, vec![FactionTag::Scavengers]);

        assert!(faction.remove_tag(FactionTag::Scavengers));
        assert!(!faction.remove_tag(FactionTag::Scavengers));
        assert!(faction.tags.is_empty());
    }

    #[test]
    fn test_spend_tracks_total_and_refuses_debt() {
        let mut faction = test_faction();
        faction.spend(4).unwrap();
        assert_eq!(faction.credits, 6);
        assert_eq!(faction.credits_spent, 4);

        assert!(faction.spend(7).is_err());
        assert_eq!(faction.credits, 6);
        assert!(matches!(
            faction.ensure_affordable(7),
            Err(ValidationError::InsufficientCredits { required: 7, available: 6 })
        ));
    }

    #[test]
    fn test_take_damage_clamps_at_zero() {
        let mut faction = test_faction();
        let max = faction.attributes.max_hp;
        assert_eq!(faction.take_damage(3), 3);
        assert_eq!(faction.take_damage(100), max - 3);
        assert_eq!(faction.attributes.hp, 0);
    }

    #[test]
    fn test_homeworld_base_lookup() {
        let mut faction = test_faction();
        assert!(faction.has_homeworld_base());
        assert_eq!(faction.base_systems().collect::<Vec<_>>(), vec![SystemId(0)]);

        faction.take_asset(AssetId(1));
        assert!(!faction.has_homeworld_base());
    }

    #[test]
    fn test_asset_ready_after_purchase_turn() {
        let mut asset = test_faction().assets.remove(0);
        assert!(asset.is_ready(0));
        asset.purchased_turn = Some(3);
        assert!(!asset.is_ready(3));
        assert!(asset.is_ready(4));
    }
}

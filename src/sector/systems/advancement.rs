//! Attribute advancement through experience

use tracing::debug;

use crate::core::error::{NotFound, Result, ValidationError};
use crate::core::types::{Attribute, FactionId, MAX_RATING, MIN_RATING};
use crate::sector::events::DomainEvent;
use crate::sector::state::GameState;

/// XP needed to reach each rating, indexed by rating. Index 0 is unused.
///
/// The same table sums to the hit-point contribution of a rating.
pub const XP_COSTS: [u32; 9] = [0, 1, 2, 4, 6, 9, 12, 16, 20];

/// Cost in XP to reach `rating`
pub fn xp_cost(rating: u8) -> u32 {
    XP_COSTS[usize::from(rating.min(MAX_RATING))]
}

/// Maximum faction hp for a set of ratings
pub fn max_hp_for(force: u8, cunning: u8, wealth: u8) -> i32 {
    let total = xp_cost(force) + xp_cost(cunning) + xp_cost(wealth);
    4 + total as i32
}

pub fn validate_rating(rating: u8) -> std::result::Result<(), ValidationError> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(ValidationError::RatingOutOfRange(rating))
    }
}

/// Raise one attribute by a single rating, paying XP.
///
/// Max hp is recomputed and current hp rises by the same amount, so existing
/// damage stays on the faction.
pub fn upgrade_attribute(state: &mut GameState, faction_id: FactionId, attribute: Attribute) -> Result<DomainEvent> {
    let faction = state
        .faction_mut(faction_id)
        .ok_or(NotFound::Faction(faction_id))?;

    let current = faction.attributes.rating(attribute);
    if current >= MAX_RATING {
        return Err(ValidationError::AttributeAtCap { attribute }.into());
    }

    let next = current + 1;
    let cost = xp_cost(next);
    if faction.xp < cost {
        return Err(ValidationError::InsufficientXp { required: cost, available: faction.xp }.into());
    }

    faction.xp -= cost;
    faction.attributes.set_rating(attribute, next);

    let attrs = &mut faction.attributes;
    let new_max = max_hp_for(attrs.force, attrs.cunning, attrs.wealth);
    let delta = new_max - attrs.max_hp;
    attrs.max_hp = new_max;
    attrs.hp += delta;

    debug!(%faction_id, %attribute, rating = next, xp_spent = cost, max_hp = new_max, "attribute upgraded");

    Ok(DomainEvent::AttributeUpgraded {
        faction: faction_id,
        attribute,
        rating: next,
        xp_spent: cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::EngineError;
    use crate::core::types::SystemId;
    use crate::sector::faction::{Attributes, Faction};
    use crate::sector::system::{Sector, StarSystem};

    fn state_with(force: u8, xp: u32) -> GameState {
        let mut state = GameState::new(Sector::new("t", vec![StarSystem::new(SystemId(0), "Home", 4)]), 0);
        let id = state.next_faction_id();
        state.factions.push(Faction {
            id,
            name: "Test".into(),
            archetype: "Corporation".into(),
            homeworld: SystemId(0),
            attributes: Attributes::new(force, 1, 1),
            credits: 0,
            xp,
            tags: Vec::new(),
            goal: None,
            assets: Vec::new(),
            credits_spent: 0,
        });
        state
    }

    #[test]
    fn test_cost_table_for_upgrades() {
        let costs: Vec<u32> = (2..=8).map(xp_cost).collect();
        assert_eq!(costs, vec![2, 4, 6, 9, 12, 16, 20]);
    }

    #[test]
    fn test_max_hp_formula() {
        assert_eq!(max_hp_for(1, 1, 1), 7);
        assert_eq!(max_hp_for(6, 4, 3), 4 + 12 + 6 + 4);
    }

    #[test]
    fn test_upgrade_spends_xp_and_preserves_damage() {
        let mut state = state_with(3, 10);
        let id = FactionId(1);
        state.faction_mut(id).unwrap().attributes.hp -= 2;
        let before = state.faction(id).unwrap().attributes;

        let event = upgrade_attribute(&mut state, id, Attribute::Force).unwrap();
        assert!(matches!(event, DomainEvent::AttributeUpgraded { rating: 4, xp_spent: 6, .. }));

        let after = state.faction(id).unwrap();
        assert_eq!(after.xp, 4);
        assert_eq!(after.attributes.force, 4);
        assert_eq!(after.attributes.max_hp, before.max_hp + 2);
        assert_eq!(after.attributes.hp, before.hp + 2);
        assert_eq!(after.attributes.max_hp - after.attributes.hp, 2);
    }

    #[test]
    fn test_upgrade_rejected_without_xp() {
        let mut state = state_with(3, 5);
        let err = upgrade_attribute(&mut state, FactionId(1), Attribute::Force).unwrap_err();
        assert_eq!(
            err,
            EngineError::Validation(ValidationError::InsufficientXp { required: 6, available: 5 })
        );
        assert_eq!(state.faction(FactionId(1)).unwrap().attributes.force, 3);
    }

    #[test]
    fn test_upgrade_rejected_at_cap() {
        let mut state = state_with(8, 1000);
        let err = upgrade_attribute(&mut state, FactionId(1), Attribute::Force).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::AttributeAtCap { attribute: Attribute::Force })
        ));
        assert_eq!(state.faction(FactionId(1)).unwrap().xp, 1000);
    }

    #[test]
    fn test_unknown_faction() {
        let mut state = state_with(1, 0);
        assert!(matches!(
            upgrade_attribute(&mut state, FactionId(42), Attribute::Wealth),
            Err(EngineError::NotFound(NotFound::Faction(FactionId(42))))
        ));
    }
}

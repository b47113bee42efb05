//! State invariants - sanity checks that detect bugs.
//!
//! These never trigger for a correct engine. The engine runs them after every
//! command and rolls the command back if any fail.

use std::collections::{BTreeSet, HashSet};

use crate::core::error::InvariantViolation;
use crate::core::types::{MAX_RATING, MIN_RATING};
use crate::sector::state::GameState;
use crate::sector::systems::advancement::max_hp_for;

/// Check all state invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(state: &GameState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let mut asset_ids = BTreeSet::new();
    let mut faction_ids = BTreeSet::new();

    for faction in &state.factions {
        let id = faction.id;
        if !faction_ids.insert(id) {
            violations.push(InvariantViolation::new(format!("{} appears twice", id)));
        }

        let attrs = &faction.attributes;
        if attrs.hp < 0 || attrs.hp > attrs.max_hp {
            violations.push(InvariantViolation::new(format!(
                "{} hp {} outside 0..={}",
                id, attrs.hp, attrs.max_hp
            )));
        }
        for rating in [attrs.force, attrs.cunning, attrs.wealth] {
            if !(MIN_RATING..=MAX_RATING).contains(&rating) {
                violations.push(InvariantViolation::new(format!("{} has rating {}", id, rating)));
            }
        }
        let expected_max = max_hp_for(attrs.force, attrs.cunning, attrs.wealth);
        if attrs.max_hp != expected_max {
            violations.push(InvariantViolation::new(format!(
                "{} max hp {} does not match ratings ({})",
                id, attrs.max_hp, expected_max
            )));
        }

        let unique_tags: HashSet<_> = faction.tags.iter().collect();
        if unique_tags.len() != faction.tags.len() {
            violations.push(InvariantViolation::new(format!("{} has duplicate tags", id)));
        }

        if !state.sector.contains(faction.homeworld) {
            violations.push(InvariantViolation::new(format!(
                "{} homeworld {} is not in the sector",
                id, faction.homeworld
            )));
        }

        for asset in &faction.assets {
            if !asset_ids.insert(asset.id) {
                violations.push(InvariantViolation::new(format!("{} is owned twice", asset.id)));
            }
            if asset.hp <= 0 || asset.hp > asset.max_hp {
                violations.push(InvariantViolation::new(format!(
                    "{} of {} has hp {} outside 1..={}",
                    asset.id, id, asset.hp, asset.max_hp
                )));
            }
        }

        if let Some(goal) = &faction.goal {
            if goal.progress.target == 0 {
                violations.push(InvariantViolation::new(format!("{} goal has a zero target", id)));
            }
        }
    }

    for asset in state.maintenance_strikes.keys() {
        if !asset_ids.contains(asset) {
            violations.push(InvariantViolation::new(format!(
                "maintenance strikes recorded for missing {}",
                asset
            )));
        }
    }

    for faction in &state.eliminated {
        if !faction_ids.contains(faction) {
            violations.push(InvariantViolation::new(format!(
                "eliminated set holds removed {}",
                faction
            )));
        }
    }

    for system in &state.sector.systems {
        if let Some(governor) = system.planetary_government {
            if !faction_ids.contains(&governor) {
                violations.push(InvariantViolation::new(format!(
                    "{} is governed by missing {}",
                    system.id, governor
                )));
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BASE_OF_INFLUENCE;
    use crate::core::types::{AssetId, FactionId, SystemId};
    use crate::sector::faction::{Attributes, Faction, FactionAsset};
    use crate::sector::system::{Sector, StarSystem};

    fn valid_state() -> GameState {
        let mut state = GameState::new(Sector::new("t", vec![StarSystem::new(SystemId(0), "Home", 4)]), 0);
        state.factions.push(Faction {
            id: FactionId(1),
            name: "Valid".into(),
            archetype: "Religion".into(),
            homeworld: SystemId(0),
            attributes: Attributes::new(2, 2, 2),
            credits: 0,
            xp: 0,
            tags: Vec::new(),
            goal: None,
            assets: vec![FactionAsset {
                id: AssetId(1),
                definition_id: BASE_OF_INFLUENCE.into(),
                location: SystemId(0),
                hp: 4,
                max_hp: 4,
                stealthed: false,
                purchased_turn: None,
                purchase_cost: 0,
            }],
            credits_spent: 0,
        });
        state
    }

    #[test]
    fn test_valid_state_passes() {
        assert!(check_invariants(&valid_state()).is_empty());
    }

    #[test]
    fn test_detects_overheal() {
        let mut state = valid_state();
        state.factions[0].attributes.hp += 1;
        assert_eq!(check_invariants(&state).len(), 1);
    }

    #[test]
    fn test_detects_dead_asset_still_owned() {
        let mut state = valid_state();
        state.factions[0].assets[0].hp = 0;
        assert!(!check_invariants(&state).is_empty());
    }

    #[test]
    fn test_detects_stale_strikes() {
        let mut state = valid_state();
        state.maintenance_strikes.insert(AssetId(77), 1);
        let violations = check_invariants(&state);
        assert!(violations[0].message.contains("asset#77"));
    }
}

//! Combat resolution: damage to assets and factions
//!
//! Damage to an ordinary asset that destroys it spills the overflow onto the
//! owning faction. A Base of Influence instead passes its damage straight to
//! the faction, but never more than the hit points it had, and never spills.

use tracing::debug;

use crate::catalog::AssetCatalog;
use crate::core::config::EngineConfig;
use crate::core::error::{NotFound, Result, ValidationError};
use crate::core::types::{AssetId, FactionId};
use crate::sector::events::{DestroyedAsset, DomainEvent};
use crate::sector::faction::FactionTag;
use crate::sector::state::GameState;

/// A single hit against an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strike {
    /// Faction dealing the damage, if any
    pub attacker: Option<FactionId>,
    pub defender: FactionId,
    pub asset: AssetId,
    pub damage: i32,
    /// Transfer the hit to the defending faction, as for a Base of Influence
    pub base_damage: bool,
}

/// Apply a strike to an asset.
pub fn inflict_damage<C: AssetCatalog>(
    state: &mut GameState,
    catalog: &C,
    config: &EngineConfig,
    strike: Strike,
) -> Result<DomainEvent> {
    if strike.damage <= 0 {
        return Err(ValidationError::NonPositiveDamage(strike.damage).into());
    }
    if let Some(attacker) = strike.attacker {
        if state.faction(attacker).is_none() {
            return Err(NotFound::Faction(attacker).into());
        }
    }

    let defender = state
        .faction(strike.defender)
        .ok_or(NotFound::Faction(strike.defender))?;
    let target = defender.asset(strike.asset).ok_or(NotFound::Asset {
        faction: strike.defender,
        asset: strike.asset,
    })?;
    let is_base = target.is_base_of_influence();
    if strike.base_damage && !is_base {
        return Err(ValidationError::NotBaseOfInfluence { asset: strike.asset }.into());
    }

    // Validation done; everything below mutates.
    let defender = state
        .faction_mut(strike.defender)
        .ok_or(NotFound::Faction(strike.defender))?;
    let asset = defender.asset_mut(strike.asset).ok_or(NotFound::Asset {
        faction: strike.defender,
        asset: strike.asset,
    })?;

    let hp_before = asset.hp;
    asset.hp -= strike.damage;
    let hp_after = asset.hp;

    let mut owed = 0;
    if strike.base_damage {
        owed += strike.damage.min(hp_before.max(0));
    }

    let mut destroyed = None;
    if hp_after <= 0 {
        if !is_base {
            owed += hp_after.abs();
        }
        if let Some(lost) = defender.take_asset(strike.asset) {
            let definition = catalog.definition(&lost.definition_id);
            destroyed = Some(DestroyedAsset {
                id: lost.id,
                owner: strike.defender,
                category: definition.map(|d| d.category),
                required_rating: definition.map(|d| d.required_rating),
                definition: lost.definition_id,
            });
        }
    }

    let faction_damage = defender.take_damage(owed);

    if destroyed.is_some() {
        state.maintenance_strikes.remove(&strike.asset);
        reward_scavengers(state, config, strike)?;
    }

    debug!(
        defender = %strike.defender,
        asset = %strike.asset,
        damage = strike.damage,
        hp_before,
        hp_after,
        faction_damage,
        destroyed = destroyed.is_some(),
        "damage inflicted"
    );

    Ok(DomainEvent::CombatResolved {
        attacker: strike.attacker,
        defender: strike.defender,
        asset: Some(strike.asset),
        damage: strike.damage,
        faction_damage,
        destroyed,
    })
}

/// Scavengers profit from wreckage on both sides of a kill
fn reward_scavengers(state: &mut GameState, config: &EngineConfig, strike: Strike) -> Result<()> {
    let reward = config.scavenger_reward;

    if let Some(defender) = state.faction_mut(strike.defender) {
        if defender.has_tag(FactionTag::Scavengers) {
            defender.earn(reward)?;
        }
    }

    if let Some(attacker_id) = strike.attacker.filter(|a| *a != strike.defender) {
        if let Some(attacker) = state.faction_mut(attacker_id) {
            if attacker.has_tag(FactionTag::Scavengers) {
                attacker.earn(reward)?;
            }
        }
    }

    Ok(())
}

/// Damage a faction directly, bypassing its assets
pub fn inflict_faction_damage(
    state: &mut GameState,
    attacker: Option<FactionId>,
    defender: FactionId,
    damage: i32,
) -> Result<DomainEvent> {
    if damage <= 0 {
        return Err(ValidationError::NonPositiveDamage(damage).into());
    }
    if let Some(attacker) = attacker {
        if state.faction(attacker).is_none() {
            return Err(NotFound::Faction(attacker).into());
        }
    }

    let faction = state.faction_mut(defender).ok_or(NotFound::Faction(defender))?;
    let faction_damage = faction.take_damage(damage);

    debug!(%defender, damage, faction_damage, hp = faction.attributes.hp, "faction damaged");

    Ok(DomainEvent::CombatResolved {
        attacker,
        defender,
        asset: None,
        damage,
        faction_damage,
        destroyed: None,
    })
}

//! Economy system: income and asset maintenance
//!
//! # Income
//!
//! income = ceil(wealth / 2) + floor((force + cunning) / 4)
//!
//! The wealth-dominant tag then adds a percentage bonus, rounded half up.
//!
//! # Maintenance
//!
//! Each asset costs its catalog maintenance plus any feature modifier. Within
//! a category, assets beyond the faction's rating in that category (counted
//! in purchase order) cost an extra penalty each. The scavenging tag takes 1
//! off each asset's cost, never below zero.
//!
//! An asset whose cost cannot be paid is not paid for at all: it takes a
//! strike instead. Enough consecutive strikes and the asset is lost. Credits
//! never go negative.

use std::collections::BTreeMap;

use tracing::debug;

use crate::catalog::AssetCatalog;
use crate::core::config::EngineConfig;
use crate::core::error::{NotFound, Result};
use crate::core::types::{AssetId, Attribute, Credits, FactionId};
use crate::sector::events::{DomainEvent, RemovalReason};
use crate::sector::faction::{Attributes, Faction, FactionTag};
use crate::sector::state::GameState;

/// Base income before tag modifiers
pub fn base_income(attributes: &Attributes) -> Credits {
    let wealth = u32::from(attributes.wealth);
    let force = u32::from(attributes.force);
    let cunning = u32::from(attributes.cunning);
    wealth.div_ceil(2) + (force + cunning) / 4
}

/// Apply a percentage bonus, rounding half up
fn apply_bonus(amount: Credits, bonus_pct: u32) -> Credits {
    (amount * (100 + bonus_pct) + 50) / 100
}

/// Income for one faction including tag modifiers
pub fn income_for(faction: &Faction, config: &EngineConfig) -> Credits {
    let income = base_income(&faction.attributes);
    if faction.has_tag(FactionTag::Plutocratic) {
        apply_bonus(income, config.wealth_tag_income_bonus_pct)
    } else {
        income
    }
}

/// Pay every faction its income
pub fn process_income(state: &mut GameState, config: &EngineConfig) -> Result<Vec<DomainEvent>> {
    let mut events = Vec::with_capacity(state.factions.len());

    for faction in &mut state.factions {
        let amount = income_for(faction, config);
        faction.earn(amount)?;
        debug!(faction = %faction.id, amount, credits = faction.credits, "income collected");
        events.push(DomainEvent::IncomeCollected { faction: faction.id, amount });
    }

    Ok(events)
}

/// Per-asset maintenance for a faction, in purchase order. Bases of
/// Influence carry no upkeep and are not listed.
pub fn maintenance_costs<C: AssetCatalog>(
    faction: &Faction,
    catalog: &C,
    config: &EngineConfig,
) -> Result<Vec<(AssetId, Credits)>> {
    let mut per_category: BTreeMap<Attribute, u32> = BTreeMap::new();
    let mut costs = Vec::with_capacity(faction.assets.len());
    let scavenging = faction.has_tag(FactionTag::Scavengers);

    for asset in faction.assets.iter().filter(|a| !a.is_base_of_influence()) {
        let definition = catalog
            .definition(&asset.definition_id)
            .ok_or_else(|| NotFound::Definition(asset.definition_id.clone()))?;

        let count = per_category.entry(definition.category).or_insert(0);
        *count += 1;
        let over_cap = *count > u32::from(faction.attributes.rating(definition.category));

        let mut cost = i64::from(definition.maintenance) + i64::from(catalog.maintenance_modifier(&asset.definition_id));
        if over_cap {
            cost += i64::from(config.excess_asset_penalty);
        }
        if scavenging {
            cost -= 1;
        }

        costs.push((asset.id, Credits::try_from(cost.max(0)).unwrap_or(Credits::MAX)));
    }

    Ok(costs)
}

/// Charge maintenance for every faction
pub fn process_maintenance<C: AssetCatalog>(
    state: &mut GameState,
    catalog: &C,
    config: &EngineConfig,
) -> Result<Vec<DomainEvent>> {
    // Price everything first so a missing definition rejects the whole phase.
    let mut bills: Vec<(FactionId, Vec<(AssetId, Credits)>)> = Vec::with_capacity(state.factions.len());
    for faction in &state.factions {
        bills.push((faction.id, maintenance_costs(faction, catalog, config)?));
    }

    let mut events = Vec::new();

    for (faction_id, bill) in bills {
        let Some(faction) = state.factions.iter_mut().find(|f| f.id == faction_id) else {
            continue;
        };
        let mut total_paid: Credits = 0;

        for (asset_id, cost) in bill {
            if faction.credits >= cost {
                faction.credits -= cost;
                total_paid += cost;
                state.maintenance_strikes.remove(&asset_id);
                continue;
            }

            let strikes = state.maintenance_strikes.entry(asset_id).or_insert(0);
            *strikes += 1;
            let strikes = *strikes;

            if strikes >= config.maintenance_strikes_to_evict {
                state.maintenance_strikes.remove(&asset_id);
                faction.take_asset(asset_id);
                debug!(faction = %faction_id, asset = %asset_id, cost, "asset lost to unpaid maintenance");
                events.push(DomainEvent::AssetRemoved {
                    faction: faction_id,
                    asset: asset_id,
                    reason: RemovalReason::UnpaidMaintenance,
                });
            } else {
                debug!(faction = %faction_id, asset = %asset_id, cost, strikes, "maintenance missed");
                events.push(DomainEvent::MaintenanceMissed {
                    faction: faction_id,
                    asset: asset_id,
                    cost,
                    strikes,
                });
            }
        }

        events.push(DomainEvent::MaintenancePaid { faction: faction_id, total: total_paid });
    }

    Ok(events)
}

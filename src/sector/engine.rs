//! Engine - the single owner of the game state
//!
//! Every command runs as a transaction. The command validates, mutates, and
//! returns the events it caused; the engine then delivers those events in
//! FIFO order to the goal tracker and the victory detector, checks the state
//! invariants, and records the prior state for undo. A rejected command, or
//! one that breaks an invariant, leaves the state exactly as it was.
//!
//! Commands that are a faction's action for the turn (attacks, purchases,
//! sales, repairs, expansion, relocation, seizure, abilities) run only in
//! the Action phase, against that faction's staged action, and only once.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::{AssetCatalog, BASE_OF_INFLUENCE};
use crate::core::config::EngineConfig;
use crate::core::error::{InvariantViolation, NotFound, Result, ValidationError};
use crate::core::types::{ActionKind, AssetId, Attribute, Credits, FactionId, Phase, SystemId};
use crate::sector::events::{DomainEvent, RemovalReason};
use crate::sector::faction::{Attributes, Faction, FactionAsset, FactionTag};
use crate::sector::goal::{GoalKind, GoalSpec};
use crate::sector::invariants::check_invariants;
use crate::sector::state::{GameState, SaveState};
use crate::sector::system::Sector;
use crate::sector::systems::advancement::validate_rating;
use crate::sector::systems::{advancement, combat, economy, goals, turn, victory, Strike};

/// Result of a successful command: its value and every event it caused,
/// including the events derived from them, in delivery order.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutcome<T = ()> {
    pub value: T,
    pub events: Vec<DomainEvent>,
}

/// Parameters for a new faction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFaction {
    pub name: String,
    #[serde(default)]
    pub archetype: String,
    pub homeworld: SystemId,
    pub force: u8,
    pub cunning: u8,
    pub wealth: u8,
    #[serde(default)]
    pub credits: Credits,
    #[serde(default)]
    pub tags: Vec<FactionTag>,
}

/// The rules engine
pub struct Engine<C: AssetCatalog> {
    state: GameState,
    catalog: C,
    config: EngineConfig,
    history: VecDeque<GameState>,
}

impl<C: AssetCatalog> Engine<C> {
    pub fn new(sector: Sector, catalog: C, config: EngineConfig) -> Result<Self> {
        config.validate().map_err(ValidationError::Config)?;
        let state = GameState::new(sector, config.seed);
        Ok(Self::with_state(state, catalog, config))
    }

    /// Wrap an existing state. The caller vouches for the config.
    pub fn with_state(state: GameState, catalog: C, config: EngineConfig) -> Self {
        Self {
            state,
            catalog,
            config,
            history: VecDeque::new(),
        }
    }

    /// Restore an engine from a persisted save
    pub fn from_save(save: SaveState, catalog: C, config: EngineConfig) -> Result<Self> {
        config.validate().map_err(ValidationError::Config)?;
        let state = GameState::from_save(save, config.save_version, config.seed)?;
        if let Some(violation) = check_invariants(&state).into_iter().next() {
            return Err(violation.into());
        }
        Ok(Self::with_state(state, catalog, config))
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of commands `undo` can currently revert
    pub fn undo_depth(&self) -> usize {
        self.history.len()
    }

    /// Persisted shape of the current state
    pub fn save_state(&self) -> SaveState {
        self.state.to_save(self.config.save_version)
    }

    /// Revert the most recent successful command
    pub fn undo(&mut self) -> Result<()> {
        let previous = self.history.pop_back().ok_or(ValidationError::NothingToUndo)?;
        self.state = previous;
        debug!(turn = self.state.turn.turn, phase = %self.state.turn.phase, "undo");
        Ok(())
    }

    /// Run one command transactionally.
    fn execute<T>(
        &mut self,
        command: &'static str,
        apply: impl FnOnce(&mut GameState, &C, &EngineConfig) -> Result<(T, Vec<DomainEvent>)>,
    ) -> Result<CommandOutcome<T>> {
        let snapshot = self.state.clone();

        let (value, events) = match apply(&mut self.state, &self.catalog, &self.config) {
            Ok(result) => result,
            Err(err) => {
                self.state = snapshot;
                debug!(command, %err, "command rejected");
                return Err(err);
            }
        };
        let events = dispatch(&mut self.state, &self.config, events);

        if let Some(violation) = check_invariants(&self.state).into_iter().next() {
            warn!(command, %violation, "invariant violated, rolling back");
            self.state = snapshot;
            return Err(violation.into());
        }

        self.history.push_back(snapshot);
        while self.history.len() > self.config.undo_depth {
            self.history.pop_front();
        }

        debug!(command, events = events.len(), "command applied");
        Ok(CommandOutcome { value, events })
    }

    // ------------------------------------------------------------------
    // Roster
    // ------------------------------------------------------------------

    /// Add a faction with a Base of Influence on its homeworld at full hp
    pub fn add_faction(&mut self, new: NewFaction) -> Result<CommandOutcome<FactionId>> {
        self.execute("add_faction", |state, _, _| {
            for rating in [new.force, new.cunning, new.wealth] {
                validate_rating(rating)?;
            }
            if !state.sector.contains(new.homeworld) {
                return Err(NotFound::System(new.homeworld).into());
            }

            let id = state.next_faction_id();
            let base_id = state.next_asset_id();
            let attributes = Attributes::new(new.force, new.cunning, new.wealth);
            let mut tags = Vec::with_capacity(new.tags.len());
            for tag in new.tags {
                if !tags.contains(&tag) {
                    tags.push(tag);
                }
            }

            state.factions.push(Faction {
                id,
                name: new.name,
                archetype: new.archetype,
                homeworld: new.homeworld,
                attributes,
                credits: new.credits,
                xp: 0,
                tags,
                goal: None,
                assets: vec![FactionAsset {
                    id: base_id,
                    definition_id: BASE_OF_INFLUENCE.into(),
                    location: new.homeworld,
                    hp: attributes.max_hp,
                    max_hp: attributes.max_hp,
                    stealthed: false,
                    purchased_turn: None,
                    purchase_cost: 0,
                }],
                credits_spent: 0,
            });
            state.founding_factions += 1;

            let events = vec![
                DomainEvent::FactionAdded { faction: id },
                DomainEvent::BasePlaced {
                    faction: id,
                    asset: base_id,
                    system: new.homeworld,
                    created: true,
                },
            ];
            Ok((id, events))
        })
    }

    pub fn remove_faction(&mut self, faction_id: FactionId) -> Result<CommandOutcome> {
        self.execute("remove_faction", |state, _, _| {
            let index = state
                .factions
                .iter()
                .position(|f| f.id == faction_id)
                .ok_or(NotFound::Faction(faction_id))?;

            let faction = state.factions.remove(index);
            for asset in &faction.assets {
                state.maintenance_strikes.remove(&asset.id);
            }
            for system in &mut state.sector.systems {
                if system.planetary_government == Some(faction_id) {
                    system.planetary_government = None;
                }
            }
            state.eliminated.remove(&faction_id);

            Ok(((), vec![DomainEvent::FactionRemoved { faction: faction_id }]))
        })
    }

    /// Idempotent: adding a tag the faction already has changes nothing
    pub fn add_faction_tag(&mut self, faction_id: FactionId, tag: FactionTag) -> Result<CommandOutcome<bool>> {
        self.execute("add_faction_tag", |state, _, _| {
            let faction = state.faction_mut(faction_id).ok_or(NotFound::Faction(faction_id))?;
            if !faction.add_tag(tag) {
                return Ok((false, Vec::new()));
            }
            Ok((true, vec![DomainEvent::TagAdded { faction: faction_id, tag }]))
        })
    }

    pub fn remove_faction_tag(&mut self, faction_id: FactionId, tag: FactionTag) -> Result<CommandOutcome<bool>> {
        self.execute("remove_faction_tag", |state, _, _| {
            let faction = state.faction_mut(faction_id).ok_or(NotFound::Faction(faction_id))?;
            if !faction.remove_tag(tag) {
                return Ok((false, Vec::new()));
            }
            Ok((true, vec![DomainEvent::TagRemoved { faction: faction_id, tag }]))
        })
    }

    /// Move the homeworld to a system where the faction already has a base.
    /// A deep-rooted faction loses that tag when it actually moves.
    pub fn change_homeworld(&mut self, faction_id: FactionId, system: SystemId) -> Result<CommandOutcome> {
        self.execute("change_homeworld", |state, _, _| {
            turn::perform_action(&mut state.turn, faction_id, ActionKind::ChangeHomeworld)?;
            if !state.sector.contains(system) {
                return Err(NotFound::System(system).into());
            }
            let faction = state.faction_mut(faction_id).ok_or(NotFound::Faction(faction_id))?;
            if faction.base_at(system).is_none() {
                return Err(ValidationError::NoBaseAtSystem { faction: faction_id, system }.into());
            }
            if faction.homeworld == system {
                return Ok(((), Vec::new()));
            }

            let from = faction.homeworld;
            faction.homeworld = system;
            let mut events = vec![DomainEvent::HomeworldChanged { faction: faction_id, from, to: system }];
            if faction.remove_tag(FactionTag::DeepRooted) {
                events.push(DomainEvent::TagRemoved {
                    faction: faction_id,
                    tag: FactionTag::DeepRooted,
                });
            }
            Ok(((), events))
        })
    }

    /// Grant or revoke planetary government of a system.
    ///
    /// Granting is the faction's Seize Planet action and replaces any other
    /// governor. The `PlanetaryGovernment` tag of every faction involved
    /// follows whether it still governs anything.
    pub fn set_planetary_government(
        &mut self,
        faction_id: FactionId,
        system_id: SystemId,
        governing: bool,
    ) -> Result<CommandOutcome> {
        self.execute("set_planetary_government", |state, _, _| {
            if governing {
                turn::perform_action(&mut state.turn, faction_id, ActionKind::SeizePlanet)?;
            }
            if state.faction(faction_id).is_none() {
                return Err(NotFound::Faction(faction_id).into());
            }
            let system = state.sector.get_mut(system_id).ok_or(NotFound::System(system_id))?;

            let previous = system.planetary_government;
            let mut events = Vec::new();
            if governing {
                if previous == Some(faction_id) {
                    return Ok(((), events));
                }
                system.planetary_government = Some(faction_id);
                if let Some(ousted) = previous {
                    events.push(DomainEvent::PlanetaryGovernmentChanged {
                        faction: ousted,
                        system: system_id,
                        governing: false,
                    });
                }
            } else {
                if previous != Some(faction_id) {
                    return Ok(((), events));
                }
                system.planetary_government = None;
            }
            events.push(DomainEvent::PlanetaryGovernmentChanged {
                faction: faction_id,
                system: system_id,
                governing,
            });

            for affected in previous.into_iter().chain([faction_id]) {
                let governs = state.sector.governed_by(affected).next().is_some();
                let Some(faction) = state.faction_mut(affected) else {
                    continue;
                };
                let tag = FactionTag::PlanetaryGovernment;
                if governs && faction.add_tag(tag) {
                    events.push(DomainEvent::TagAdded { faction: affected, tag });
                } else if !governs && faction.remove_tag(tag) {
                    events.push(DomainEvent::TagRemoved { faction: affected, tag });
                }
            }
            Ok(((), events))
        })
    }

    // ------------------------------------------------------------------
    // Assets
    // ------------------------------------------------------------------

    /// Buy an asset from the catalog and place it on a system where the
    /// faction has a Base of Influence.
    pub fn add_asset(
        &mut self,
        faction_id: FactionId,
        definition_id: &str,
        location: SystemId,
    ) -> Result<CommandOutcome<AssetId>> {
        self.execute("add_asset", |state, catalog, _| {
            turn::perform_action(&mut state.turn, faction_id, ActionKind::BuyAsset)?;
            let definition = catalog
                .definition(definition_id)
                .ok_or_else(|| NotFound::Definition(definition_id.to_string()))?;
            let system = state.sector.get(location).ok_or(NotFound::System(location))?;
            let faction = state.faction(faction_id).ok_or(NotFound::Faction(faction_id))?;

            if system.tech_level < definition.tech_level {
                return Err(ValidationError::TechLevelTooLow {
                    system: location,
                    required: definition.tech_level,
                    actual: system.tech_level,
                }
                .into());
            }
            let rating = faction.attributes.rating(definition.category);
            if rating < definition.required_rating {
                return Err(ValidationError::RatingTooLow {
                    attribute: definition.category,
                    required: definition.required_rating,
                    actual: rating,
                }
                .into());
            }
            if faction.base_at(location).is_none() {
                return Err(ValidationError::NoBaseAtSystem { faction: faction_id, system: location }.into());
            }
            faction.ensure_affordable(definition.cost)?;

            let stealthed =
                catalog.purchase_effects(definition_id).auto_stealth || faction.has_tag(FactionTag::Secretive);
            let (cost, hp) = (definition.cost, definition.hp);
            let turn = state.turn.turn;
            let id = state.next_asset_id();

            let faction = state.faction_mut(faction_id).ok_or(NotFound::Faction(faction_id))?;
            faction.spend(cost)?;
            faction.assets.push(FactionAsset {
                id,
                definition_id: definition_id.to_string(),
                location,
                hp,
                max_hp: hp,
                stealthed,
                purchased_turn: Some(turn),
                purchase_cost: cost,
            });
            debug!(faction = %faction_id, asset = %id, definition = definition_id, cost, stealthed, "asset purchased");

            let mut events = vec![DomainEvent::AssetAdded {
                faction: faction_id,
                asset: id,
                definition: definition_id.to_string(),
                location,
                cost,
            }];
            if stealthed {
                events.push(DomainEvent::AssetStealthed { faction: faction_id, asset: id, location });
            }
            Ok((id, events))
        })
    }

    /// Remove an asset outside of combat. With `refund` this is the faction's
    /// Sell Asset action and half the purchase cost (rounded down) is
    /// returned.
    pub fn remove_asset(&mut self, faction_id: FactionId, asset_id: AssetId, refund: bool) -> Result<CommandOutcome<Credits>> {
        self.execute("remove_asset", |state, _, _| {
            if refund {
                turn::perform_action(&mut state.turn, faction_id, ActionKind::SellAsset)?;
            }
            let faction = state.faction_mut(faction_id).ok_or(NotFound::Faction(faction_id))?;
            let asset = faction.take_asset(asset_id).ok_or(NotFound::Asset {
                faction: faction_id,
                asset: asset_id,
            })?;

            let (refunded, reason) = if refund {
                let amount = asset.purchase_cost / 2;
                faction.earn(amount)?;
                (amount, RemovalReason::Sold { refund: amount })
            } else {
                (0, RemovalReason::Discarded)
            };
            state.maintenance_strikes.remove(&asset_id);

            let event = DomainEvent::AssetRemoved {
                faction: faction_id,
                asset: asset_id,
                reason,
            };
            Ok((refunded, vec![event]))
        })
    }

    /// Mark an asset stealthed
    pub fn stealth_asset(&mut self, faction_id: FactionId, asset_id: AssetId) -> Result<CommandOutcome> {
        self.execute("stealth_asset", |state, _, _| {
            turn::perform_action(&mut state.turn, faction_id, ActionKind::UseAbility)?;
            let faction = state.faction_mut(faction_id).ok_or(NotFound::Faction(faction_id))?;
            let asset = faction.asset_mut(asset_id).ok_or(NotFound::Asset {
                faction: faction_id,
                asset: asset_id,
            })?;
            if asset.stealthed {
                return Err(ValidationError::AlreadyStealthed { asset: asset_id }.into());
            }
            asset.stealthed = true;

            let event = DomainEvent::AssetStealthed {
                faction: faction_id,
                asset: asset_id,
                location: asset.location,
            };
            Ok(((), vec![event]))
        })
    }

    /// Place a Base of Influence, or upgrade the one already on the system.
    ///
    /// A base's hp may not exceed the faction's max hp. Upgrading raises the
    /// base's max hp to `hp` and heals it by the same amount.
    pub fn add_base_of_influence(
        &mut self,
        faction_id: FactionId,
        system: SystemId,
        hp: i32,
        cost: Credits,
    ) -> Result<CommandOutcome<AssetId>> {
        self.execute("add_base_of_influence", |state, _, _| {
            turn::perform_action(&mut state.turn, faction_id, ActionKind::ExpandInfluence)?;
            if !state.sector.contains(system) {
                return Err(NotFound::System(system).into());
            }
            let faction = state.faction(faction_id).ok_or(NotFound::Faction(faction_id))?;
            let max = faction.attributes.max_hp;
            if hp < 1 || hp > max {
                return Err(ValidationError::InvalidBaseHp { requested: hp, max }.into());
            }
            if let Some(existing) = faction.base_at(system) {
                if hp <= existing.max_hp {
                    return Err(ValidationError::BaseNotUpgraded {
                        current: existing.max_hp,
                        requested: hp,
                    }
                    .into());
                }
            }
            faction.ensure_affordable(cost)?;

            let created = faction.base_at(system).is_none();
            let new_id = created.then(|| state.next_asset_id());
            let turn = state.turn.turn;
            let faction = state.faction_mut(faction_id).ok_or(NotFound::Faction(faction_id))?;
            faction.spend(cost)?;

            let asset = match new_id {
                Some(id) => {
                    faction.assets.push(FactionAsset {
                        id,
                        definition_id: BASE_OF_INFLUENCE.into(),
                        location: system,
                        hp,
                        max_hp: hp,
                        stealthed: false,
                        purchased_turn: Some(turn),
                        purchase_cost: cost,
                    });
                    id
                }
                None => {
                    let base = faction.base_at_mut(system).ok_or_else(|| {
                        InvariantViolation::new(format!("{} lost its base in {} mid-upgrade", faction_id, system))
                    })?;
                    let delta = hp - base.max_hp;
                    base.max_hp = hp;
                    base.hp += delta;
                    base.purchase_cost += cost;
                    base.id
                }
            };
            debug!(faction = %faction_id, %system, hp, cost, created, "base of influence placed");

            let event = DomainEvent::BasePlaced { faction: faction_id, asset, system, created };
            Ok((asset, vec![event]))
        })
    }

    // ------------------------------------------------------------------
    // Combat and repair
    // ------------------------------------------------------------------

    /// Resolve a hit on an asset. A hit with an attacker is that faction's
    /// Attack action.
    pub fn inflict_damage(&mut self, strike: Strike) -> Result<CommandOutcome> {
        self.execute("inflict_damage", |state, catalog, config| {
            turn::authorize_strike(&mut state.turn, strike.attacker)?;
            let event = combat::inflict_damage(state, catalog, config, strike)?;
            Ok(((), vec![event]))
        })
    }

    pub fn inflict_faction_damage(
        &mut self,
        attacker: Option<FactionId>,
        defender: FactionId,
        damage: i32,
    ) -> Result<CommandOutcome> {
        self.execute("inflict_faction_damage", |state, _, _| {
            turn::authorize_strike(&mut state.turn, attacker)?;
            let event = combat::inflict_faction_damage(state, attacker, defender, damage)?;
            Ok(((), vec![event]))
        })
    }

    /// Restore up to `amount` hp to an asset. Returns the hp restored.
    pub fn repair_asset(&mut self, faction_id: FactionId, asset_id: AssetId, amount: i32) -> Result<CommandOutcome<i32>> {
        self.execute("repair_asset", |state, _, config| {
            turn::perform_action(&mut state.turn, faction_id, ActionKind::RepairAsset)?;
            if amount <= 0 {
                return Err(ValidationError::NothingToRepair.into());
            }
            let faction = state.faction_mut(faction_id).ok_or(NotFound::Faction(faction_id))?;
            let asset = faction.asset(asset_id).ok_or(NotFound::Asset {
                faction: faction_id,
                asset: asset_id,
            })?;
            if asset.hp >= asset.max_hp {
                return Err(ValidationError::AlreadyAtFullHealth(asset_id.to_string()).into());
            }

            let healed = amount.min(asset.max_hp - asset.hp);
            let cost = repair_cost(healed, config);
            faction.ensure_affordable(cost)?;
            faction.spend(cost)?;
            if let Some(asset) = faction.asset_mut(asset_id) {
                asset.hp += healed;
            }

            let event = DomainEvent::Repaired {
                faction: faction_id,
                asset: Some(asset_id),
                healed,
                cost,
            };
            Ok((healed, vec![event]))
        })
    }

    /// Restore up to `amount` faction hp. Returns the hp restored.
    pub fn repair_faction_hp(&mut self, faction_id: FactionId, amount: i32) -> Result<CommandOutcome<i32>> {
        self.execute("repair_faction_hp", |state, _, config| {
            turn::perform_action(&mut state.turn, faction_id, ActionKind::RepairAsset)?;
            if amount <= 0 {
                return Err(ValidationError::NothingToRepair.into());
            }
            let faction = state.faction_mut(faction_id).ok_or(NotFound::Faction(faction_id))?;
            let attrs = faction.attributes;
            if attrs.hp >= attrs.max_hp {
                return Err(ValidationError::AlreadyAtFullHealth(faction_id.to_string()).into());
            }

            let healed = amount.min(attrs.max_hp - attrs.hp);
            let cost = repair_cost(healed, config);
            faction.ensure_affordable(cost)?;
            faction.spend(cost)?;
            faction.attributes.hp += healed;

            let event = DomainEvent::Repaired {
                faction: faction_id,
                asset: None,
                healed,
                cost,
            };
            Ok((healed, vec![event]))
        })
    }

    // ------------------------------------------------------------------
    // Economy and advancement
    // ------------------------------------------------------------------

    pub fn process_income_phase(&mut self) -> Result<CommandOutcome> {
        self.execute("process_income_phase", |state, _, config| {
            turn::begin_phase_work(&state.turn, Phase::Income)?;
            let events = economy::process_income(state, config)?;
            state.turn.phase_work_done = true;
            Ok(((), events))
        })
    }

    pub fn process_maintenance_phase(&mut self) -> Result<CommandOutcome> {
        self.execute("process_maintenance_phase", |state, catalog, config| {
            turn::begin_phase_work(&state.turn, Phase::Maintenance)?;
            let events = economy::process_maintenance(state, catalog, config)?;
            state.turn.phase_work_done = true;
            Ok(((), events))
        })
    }

    /// Spend experience on an attribute. Allowed in the Action phase without
    /// using up the turn's action.
    pub fn upgrade_attribute(&mut self, faction_id: FactionId, attribute: Attribute) -> Result<CommandOutcome> {
        self.execute("upgrade_attribute", |state, _, _| {
            turn::require_phase(&state.turn, Phase::Action)?;
            let event = advancement::upgrade_attribute(state, faction_id, attribute)?;
            Ok(((), vec![event]))
        })
    }

    // ------------------------------------------------------------------
    // Goals
    // ------------------------------------------------------------------

    pub fn set_goal(&mut self, faction_id: FactionId, spec: GoalSpec) -> Result<CommandOutcome> {
        self.execute("set_goal", |state, _, _| Ok(((), goals::set_goal(state, faction_id, spec)?)))
    }

    pub fn clear_goal(&mut self, faction_id: FactionId) -> Result<CommandOutcome> {
        self.execute("clear_goal", |state, _, _| Ok(((), goals::clear_goal(state, faction_id)?)))
    }

    /// Set a goal's progress directly, optionally replacing its tracking data
    pub fn update_goal_progress(
        &mut self,
        faction_id: FactionId,
        current: u32,
        kind: Option<GoalKind>,
    ) -> Result<CommandOutcome> {
        self.execute("update_goal_progress", |state, _, config| {
            Ok(((), goals::update_goal_progress(state, config, faction_id, current, kind)?))
        })
    }

    pub fn complete_goal(&mut self, faction_id: FactionId) -> Result<CommandOutcome> {
        self.execute("complete_goal", |state, _, config| {
            Ok(((), goals::complete_goal(state, config, faction_id)?))
        })
    }

    // ------------------------------------------------------------------
    // Turn structure
    // ------------------------------------------------------------------

    pub fn stage_action(&mut self, faction_id: FactionId, kind: ActionKind) -> Result<CommandOutcome> {
        self.execute("stage_action", |state, _, _| {
            Ok(((), vec![turn::stage_action(state, faction_id, kind)?]))
        })
    }

    pub fn commit_action(&mut self) -> Result<CommandOutcome> {
        self.execute("commit_action", |state, _, _| Ok(((), vec![turn::commit_action(state)?])))
    }

    /// Move to the next phase.
    ///
    /// Income and Maintenance processing that has not run yet runs first.
    /// State-polled goals are re-evaluated after every transition. Returns
    /// the phase entered.
    pub fn advance_phase(&mut self) -> Result<CommandOutcome<Phase>> {
        self.execute("advance_phase", |state, catalog, config| {
            let mut events = Vec::new();
            if !state.turn.phase_work_done {
                match state.turn.phase {
                    Phase::Income => events.extend(economy::process_income(state, config)?),
                    Phase::Maintenance => events.extend(economy::process_maintenance(state, catalog, config)?),
                    Phase::News | Phase::Action => {}
                }
            }

            events.push(turn::advance(&mut state.turn));
            events.extend(goals::poll(state, config));
            Ok((state.turn.phase, events))
        })
    }
}

fn repair_cost(healed: i32, config: &EngineConfig) -> Credits {
    Credits::try_from(healed.max(0))
        .unwrap_or(0)
        .saturating_mul(config.repair_cost_per_hp)
}

/// Deliver events in FIFO order. Each event is logged, then shown to the goal
/// tracker, then to the victory detector; whatever they emit is queued
/// behind it.
fn dispatch(state: &mut GameState, config: &EngineConfig, events: Vec<DomainEvent>) -> Vec<DomainEvent> {
    let mut queue: VecDeque<DomainEvent> = events.into();
    let mut delivered = Vec::with_capacity(queue.len());

    while let Some(event) = queue.pop_front() {
        state.log.record(event.clone(), state.turn.turn, state.turn.phase);
        queue.extend(goals::on_event(state, config, &event));
        queue.extend(victory::on_event(state, &event));
        delivered.push(event);
    }

    delivered
}

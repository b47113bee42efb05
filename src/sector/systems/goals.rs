//! Goal tracking
//!
//! Goal progress moves through a single primitive, [`apply_progress`], fed by
//! two sources:
//!
//! - domain events, for goals that can be counted incrementally (kills,
//!   damage, new bases, stealthed assets, rival removal, attacks);
//! - polling at phase transitions, for goals that are a function of the
//!   whole game state (spending, planetary government, turns of peace).
//!
//! Completion awards the goal's difficulty as XP exactly once.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::core::config::EngineConfig;
use crate::core::error::{NotFound, Result, ValidationError};
use crate::core::types::{ActionKind, FactionId, SystemId, Turn};
use crate::sector::events::{DestroyedAsset, DomainEvent};
use crate::sector::faction::{Faction, FactionTag};
use crate::sector::goal::{FactionGoal, GoalKind, GoalProgress, GoalSpec};
use crate::sector::state::GameState;
use crate::sector::system::Sector;

/// Set `current` (and optionally replace the goal's tracking data) and
/// complete the goal if it reached its target.
///
/// Callers guarantee the faction has a goal and `kind` matches it.
fn apply_progress(
    faction: &mut Faction,
    rng: &mut ChaCha8Rng,
    config: &EngineConfig,
    current: u32,
    kind: Option<GoalKind>,
) -> Vec<DomainEvent> {
    let faction_id = faction.id;
    let diplomatic = faction.has_tag(FactionTag::ExchangeConsulate);
    let Some(goal) = faction.goal.as_mut() else {
        return Vec::new();
    };

    goal.progress.current = current;
    if let Some(kind) = kind {
        goal.kind = kind;
    }

    let mut events = vec![DomainEvent::GoalProgressed {
        faction: faction_id,
        goal: goal.id,
        current,
        target: goal.progress.target,
    }];

    if goal.is_completed || current < goal.progress.target {
        return events;
    }

    goal.is_completed = true;
    let mut xp_awarded = goal.difficulty;
    if diplomatic
        && matches!(goal.kind, GoalKind::PeaceableKingdom { .. })
        && rng.gen_bool(config.restraint_bonus_chance)
    {
        xp_awarded += config.restraint_bonus_xp;
    }
    let goal_id = goal.id;
    let name = goal.kind.name();

    faction.xp += xp_awarded;
    info!(faction = %faction_id, goal = name, xp_awarded, "goal completed");

    events.push(DomainEvent::GoalCompleted {
        faction: faction_id,
        goal: goal_id,
        xp_awarded,
    });
    events
}

/// Public progress primitive: validates, then applies.
pub fn update_goal_progress(
    state: &mut GameState,
    config: &EngineConfig,
    faction_id: FactionId,
    current: u32,
    kind: Option<GoalKind>,
) -> Result<Vec<DomainEvent>> {
    let faction = state
        .factions
        .iter_mut()
        .find(|f| f.id == faction_id)
        .ok_or(NotFound::Faction(faction_id))?;
    let goal = faction
        .goal
        .as_ref()
        .ok_or(ValidationError::NoActiveGoal { faction: faction_id })?;
    if let Some(kind) = &kind {
        if !kind.same_kind(&goal.kind) {
            return Err(ValidationError::GoalKindMismatch { goal: goal.id }.into());
        }
    }

    Ok(apply_progress(faction, &mut state.rng, config, current, kind))
}

/// Force a goal to completion
pub fn complete_goal(state: &mut GameState, config: &EngineConfig, faction_id: FactionId) -> Result<Vec<DomainEvent>> {
    let target = state
        .faction(faction_id)
        .ok_or(NotFound::Faction(faction_id))?
        .goal
        .as_ref()
        .map(|g| g.progress.target)
        .ok_or(ValidationError::NoActiveGoal { faction: faction_id })?;
    update_goal_progress(state, config, faction_id, target, None)
}

/// Assign a goal, replacing any current one.
///
/// Tracking data that depends on the present state is primed here: known
/// bases, the turn the restraint clock starts, and the spending baseline.
pub fn set_goal(state: &mut GameState, faction_id: FactionId, spec: GoalSpec) -> Result<Vec<DomainEvent>> {
    if spec.target == 0 {
        return Err(ValidationError::InvalidGoalTarget.into());
    }
    let turn = state.turn.turn;
    let faction = state.faction(faction_id).ok_or(NotFound::Faction(faction_id))?;
    if let GoalKind::DestroyTheFoe { target } = &spec.kind {
        if state.faction(*target).is_none() {
            return Err(NotFound::Faction(*target).into());
        }
    }
    if let GoalKind::PlanetarySeizure { target } = &spec.kind {
        if !state.sector.contains(*target) {
            return Err(NotFound::System(*target).into());
        }
    }

    let kind = prime(spec.kind, faction, turn);
    let id = state.next_goal_id();
    let faction = state.faction_mut(faction_id).ok_or(NotFound::Faction(faction_id))?;

    let mut events = Vec::with_capacity(2);
    if let Some(old) = faction.goal.take() {
        events.push(DomainEvent::GoalCleared { faction: faction_id, goal: old.id });
    }
    debug!(faction = %faction_id, goal = kind.name(), target = spec.target, "goal set");
    faction.goal = Some(FactionGoal {
        id,
        kind,
        description: spec.description,
        progress: GoalProgress { current: 0, target: spec.target },
        difficulty: spec.difficulty,
        is_completed: false,
    });
    events.push(DomainEvent::GoalSet { faction: faction_id, goal: id });
    Ok(events)
}

fn prime(kind: GoalKind, faction: &Faction, turn: Turn) -> GoalKind {
    match kind {
        GoalKind::ExpandInfluence { mut known_bases } => {
            known_bases.extend(faction.base_systems());
            GoalKind::ExpandInfluence { known_bases }
        }
        GoalKind::PeaceableKingdom { .. } => GoalKind::PeaceableKingdom { since_turn: turn },
        GoalKind::WealthOfWorlds { .. } => GoalKind::WealthOfWorlds {
            baseline_spent: faction.credits_spent,
        },
        other => other,
    }
}

pub fn clear_goal(state: &mut GameState, faction_id: FactionId) -> Result<Vec<DomainEvent>> {
    let faction = state.faction_mut(faction_id).ok_or(NotFound::Faction(faction_id))?;
    let goal = faction
        .goal
        .take()
        .ok_or(ValidationError::NoActiveGoal { faction: faction_id })?;
    Ok(vec![DomainEvent::GoalCleared { faction: faction_id, goal: goal.id }])
}

/// What an event-driven rule wants done to one faction's goal
struct Update {
    faction: FactionId,
    current: u32,
    kind: Option<GoalKind>,
}

/// Active goal of a faction, if it has one that is not yet completed
fn active_goal(state: &GameState, faction_id: FactionId) -> Option<(&Faction, &FactionGoal)> {
    let faction = state.faction(faction_id)?;
    let goal = faction.goal.as_ref().filter(|g| g.is_active())?;
    Some((faction, goal))
}

/// Run the event-driven goal rules for one delivered event
pub fn on_event(state: &mut GameState, config: &EngineConfig, event: &DomainEvent) -> Vec<DomainEvent> {
    let updates = match event {
        DomainEvent::CombatResolved { attacker: Some(attacker), defender, damage, destroyed, .. } => {
            combat_updates(state, *attacker, *defender, *damage, destroyed.as_ref())
        }
        DomainEvent::ActionCommitted { faction, kind: ActionKind::Attack } => {
            restraint_reset(state, *faction).into_iter().collect()
        }
        DomainEvent::BasePlaced { faction, system, created: true, .. } => {
            expansion_update(state, *faction, *system).into_iter().collect()
        }
        DomainEvent::AssetStealthed { faction, asset, location } => active_goal(state, *faction)
            .and_then(|(owner, goal)| match &goal.kind {
                GoalKind::InsideEnemyTerritory { tracked } if *location != owner.homeworld => {
                    let mut tracked = tracked.clone();
                    tracked.insert(*asset);
                    Some(Update {
                        faction: *faction,
                        current: tracked.len() as u32,
                        kind: Some(GoalKind::InsideEnemyTerritory { tracked }),
                    })
                }
                _ => None,
            })
            .into_iter()
            .collect(),
        DomainEvent::FactionRemoved { faction: removed } => state
            .factions
            .iter()
            .filter_map(|f| {
                let goal = f.goal.as_ref().filter(|g| g.is_active())?;
                match goal.kind {
                    GoalKind::DestroyTheFoe { target } if target == *removed => Some(Update {
                        faction: f.id,
                        current: goal.progress.target,
                        kind: None,
                    }),
                    _ => None,
                }
            })
            .collect(),
        _ => Vec::new(),
    };

    apply_updates(state, config, updates)
}

fn combat_updates(
    state: &GameState,
    attacker: FactionId,
    defender: FactionId,
    damage: i32,
    destroyed: Option<&DestroyedAsset>,
) -> Vec<Update> {
    let mut updates = Vec::new();

    // Any attack breaks the peace, whatever else the attacker is doing.
    updates.extend(restraint_reset(state, attacker));

    let Some((faction, goal)) = active_goal(state, attacker) else {
        return updates;
    };
    let current = goal.progress.current;

    match (&goal.kind, destroyed) {
        (GoalKind::BloodTheEnemy, _) if defender != attacker => updates.push(Update {
            faction: attacker,
            current: current.saturating_add(damage.max(0) as u32),
            kind: None,
        }),
        (kind, Some(lost)) if kind.conquest_category().is_some() && lost.owner != attacker => {
            if kind.conquest_category() == lost.category {
                updates.push(Update { faction: attacker, current: current + 1, kind: None });
            }
        }
        (GoalKind::DefeatStrongerAsset, Some(lost)) if lost.owner != attacker => {
            if let (Some(category), Some(required)) = (lost.category, lost.required_rating) {
                if required > faction.attributes.rating(category) {
                    updates.push(Update {
                        faction: attacker,
                        current: goal.progress.target,
                        kind: None,
                    });
                }
            }
        }
        _ => {}
    }

    updates
}

fn restraint_reset(state: &GameState, faction_id: FactionId) -> Option<Update> {
    let (_, goal) = active_goal(state, faction_id)?;
    match goal.kind {
        GoalKind::PeaceableKingdom { since_turn } if since_turn != state.turn.turn || goal.progress.current != 0 => {
            Some(Update {
                faction: faction_id,
                current: 0,
                kind: Some(GoalKind::PeaceableKingdom { since_turn: state.turn.turn }),
            })
        }
        _ => None,
    }
}

fn expansion_update(state: &GameState, faction_id: FactionId, system: SystemId) -> Option<Update> {
    let (faction, goal) = active_goal(state, faction_id)?;
    let GoalKind::ExpandInfluence { known_bases } = &goal.kind else {
        return None;
    };
    if system == faction.homeworld || known_bases.contains(&system) {
        return None;
    }

    let mut known_bases = known_bases.clone();
    known_bases.insert(system);
    Some(Update {
        faction: faction_id,
        current: goal.progress.target,
        kind: Some(GoalKind::ExpandInfluence { known_bases }),
    })
}

fn apply_updates(state: &mut GameState, config: &EngineConfig, updates: Vec<Update>) -> Vec<DomainEvent> {
    let mut events = Vec::new();
    for update in updates {
        if let Some(faction) = state.factions.iter_mut().find(|f| f.id == update.faction) {
            events.extend(apply_progress(faction, &mut state.rng, config, update.current, update.kind));
        }
    }
    events
}

/// Recompute state-derived goals. Called on every phase transition.
pub fn poll(state: &mut GameState, config: &EngineConfig) -> Vec<DomainEvent> {
    let turn = state.turn.turn;
    let updates: Vec<Update> = state
        .factions
        .iter()
        .filter_map(|faction| {
            let goal = faction.goal.as_ref().filter(|g| g.is_active() && g.kind.is_polled())?;
            let current = polled_progress(faction, goal, &state.sector, turn)?;
            (current != goal.progress.current).then_some(Update {
                faction: faction.id,
                current,
                kind: None,
            })
        })
        .collect();

    apply_updates(state, config, updates)
}

fn polled_progress(faction: &Faction, goal: &FactionGoal, sector: &Sector, turn: Turn) -> Option<u32> {
    match &goal.kind {
        GoalKind::PeaceableKingdom { since_turn } => Some(turn.saturating_sub(*since_turn)),
        GoalKind::WealthOfWorlds { baseline_spent } => {
            let spent = faction.credits_spent.saturating_sub(*baseline_spent);
            Some(u32::try_from(spent).unwrap_or(u32::MAX))
        }
        GoalKind::PlanetarySeizure { target } => {
            let governs = sector
                .get(*target)
                .is_some_and(|s| s.planetary_government == Some(faction.id));
            Some(u32::from(governs))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use crate::catalog::BASE_OF_INFLUENCE;
    use crate::core::error::EngineError;
    use crate::core::types::{AssetId, Attribute};
    use crate::sector::faction::{Attributes, FactionAsset};
    use crate::sector::system::StarSystem;

    fn state() -> GameState {
        let sector = Sector::new(
            "t",
            vec![StarSystem::new(SystemId(0), "Home", 4), StarSystem::new(SystemId(1), "Away", 4)],
        );
        let mut state = GameState::new(sector, 99);
        for name in ["Hunters", "Prey"] {
            let id = state.next_faction_id();
            state.factions.push(Faction {
                id,
                name: name.into(),
                archetype: "Military".into(),
                homeworld: SystemId(0),
                attributes: Attributes::new(3, 3, 3),
                credits: 0,
                xp: 0,
                tags: Vec::new(),
                goal: None,
                assets: vec![FactionAsset {
                    id: AssetId(id.0 * 100),
                    definition_id: BASE_OF_INFLUENCE.into(),
                    location: SystemId(0),
                    hp: 5,
                    max_hp: 5,
                    stealthed: false,
                    purchased_turn: None,
                    purchase_cost: 0,
                }],
                credits_spent: 0,
            });
        }
        state
    }

    fn spec(kind: GoalKind, target: u32, difficulty: u32) -> GoalSpec {
        GoalSpec { kind, description: String::new(), target, difficulty }
    }

    fn hunter_goal(state: &GameState) -> &FactionGoal {
        state.faction(FactionId(1)).unwrap().goal.as_ref().unwrap()
    }

    fn kill(category: Option<Attribute>, required_rating: Option<u8>) -> DomainEvent {
        DomainEvent::CombatResolved {
            attacker: Some(FactionId(1)),
            defender: FactionId(2),
            asset: Some(AssetId(7)),
            damage: 4,
            faction_damage: 0,
            destroyed: Some(DestroyedAsset {
                id: AssetId(7),
                owner: FactionId(2),
                definition: "x".into(),
                category,
                required_rating,
            }),
        }
    }

    #[test]
    fn test_completion_awards_xp_once() {
        let mut state = state();
        let config = EngineConfig::default();
        set_goal(&mut state, FactionId(1), spec(GoalKind::BloodTheEnemy, 3, 2)).unwrap();

        let events = update_goal_progress(&mut state, &config, FactionId(1), 3, None).unwrap();
        assert!(events.iter().any(|e| matches!(e, DomainEvent::GoalCompleted { xp_awarded: 2, .. })));
        assert!(hunter_goal(&state).is_completed);
        assert_eq!(state.faction(FactionId(1)).unwrap().xp, 2);

        let events = update_goal_progress(&mut state, &config, FactionId(1), 5, None).unwrap();
        assert!(!events.iter().any(|e| matches!(e, DomainEvent::GoalCompleted { .. })));
        assert_eq!(state.faction(FactionId(1)).unwrap().xp, 2);
        assert_eq!(hunter_goal(&state).progress.current, 5);
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        let mut state = state();
        set_goal(&mut state, FactionId(1), spec(GoalKind::BloodTheEnemy, 3, 2)).unwrap();
        let err = update_goal_progress(
            &mut state,
            &EngineConfig::default(),
            FactionId(1),
            1,
            Some(GoalKind::MilitaryConquest),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Validation(ValidationError::GoalKindMismatch { .. })));
    }

    #[test]
    fn test_no_goal_rejected() {
        let mut state = state();
        let err = complete_goal(&mut state, &EngineConfig::default(), FactionId(1)).unwrap_err();
        assert!(matches!(err, EngineError::Validation(ValidationError::NoActiveGoal { .. })));
    }

    #[test]
    fn test_conquest_counts_matching_category_only() {
        let mut state = state();
        let config = EngineConfig::default();
        set_goal(&mut state, FactionId(1), spec(GoalKind::MilitaryConquest, 2, 3)).unwrap();

        on_event(&mut state, &config, &kill(Some(Attribute::Cunning), Some(1)));
        assert_eq!(hunter_goal(&state).progress.current, 0);

        on_event(&mut state, &config, &kill(Some(Attribute::Force), Some(1)));
        on_event(&mut state, &config, &kill(Some(Attribute::Force), Some(1)));
        assert!(hunter_goal(&state).is_completed);
        assert_eq!(state.faction(FactionId(1)).unwrap().xp, 3);
    }

    #[test]
    fn test_defeat_stronger_asset() {
        let mut state = state();
        let config = EngineConfig::default();
        set_goal(&mut state, FactionId(1), spec(GoalKind::DefeatStrongerAsset, 1, 2)).unwrap();

        // Force 3 vs required 3: not stronger
        on_event(&mut state, &config, &kill(Some(Attribute::Force), Some(3)));
        assert!(!hunter_goal(&state).is_completed);

        on_event(&mut state, &config, &kill(Some(Attribute::Force), Some(4)));
        assert!(hunter_goal(&state).is_completed);
    }

    #[test]
    fn test_damage_accumulates() {
        let mut state = state();
        let config = EngineConfig::default();
        set_goal(&mut state, FactionId(1), spec(GoalKind::BloodTheEnemy, 10, 1)).unwrap();
        on_event(&mut state, &config, &kill(None, None));
        on_event(&mut state, &config, &kill(None, None));
        assert_eq!(hunter_goal(&state).progress.current, 8);
    }

    #[test]
    fn test_self_inflicted_damage_not_counted() {
        let mut state = state();
        let config = EngineConfig::default();
        set_goal(&mut state, FactionId(1), spec(GoalKind::BloodTheEnemy, 10, 1)).unwrap();
        let own_goal = DomainEvent::CombatResolved {
            attacker: Some(FactionId(1)),
            defender: FactionId(1),
            asset: Some(AssetId(100)),
            damage: 4,
            faction_damage: 0,
            destroyed: None,
        };
        assert!(on_event(&mut state, &config, &own_goal).is_empty());
        assert_eq!(hunter_goal(&state).progress.current, 0);

        on_event(&mut state, &config, &kill(None, None));
        assert_eq!(hunter_goal(&state).progress.current, 4);
    }

    #[test]
    fn test_expansion_needs_new_world() {
        let mut state = state();
        let config = EngineConfig::default();
        set_goal(
            &mut state,
            FactionId(1),
            spec(GoalKind::ExpandInfluence { known_bases: BTreeSet::new() }, 1, 1),
        )
        .unwrap();

        let at = |system| DomainEvent::BasePlaced {
            faction: FactionId(1),
            asset: AssetId(50),
            system,
            created: true,
        };

        on_event(&mut state, &config, &at(SystemId(0)));
        assert!(!hunter_goal(&state).is_completed);

        on_event(&mut state, &config, &at(SystemId(1)));
        assert!(hunter_goal(&state).is_completed);
        match &hunter_goal(&state).kind {
            GoalKind::ExpandInfluence { known_bases } => assert!(known_bases.contains(&SystemId(1))),
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_infiltration_tracks_unique_assets_off_homeworld() {
        let mut state = state();
        let config = EngineConfig::default();
        set_goal(
            &mut state,
            FactionId(1),
            spec(GoalKind::InsideEnemyTerritory { tracked: BTreeSet::new() }, 2, 1),
        )
        .unwrap();

        let stealth = |asset, location| DomainEvent::AssetStealthed {
            faction: FactionId(1),
            asset: AssetId(asset),
            location,
        };

        on_event(&mut state, &config, &stealth(1, SystemId(0)));
        assert_eq!(hunter_goal(&state).progress.current, 0);

        on_event(&mut state, &config, &stealth(2, SystemId(1)));
        on_event(&mut state, &config, &stealth(2, SystemId(1)));
        assert_eq!(hunter_goal(&state).progress.current, 1);

        on_event(&mut state, &config, &stealth(3, SystemId(1)));
        assert!(hunter_goal(&state).is_completed);
    }

    #[test]
    fn test_destroy_the_foe_on_removal() {
        let mut state = state();
        let config = EngineConfig::default();
        set_goal(
            &mut state,
            FactionId(1),
            spec(GoalKind::DestroyTheFoe { target: FactionId(2) }, 1, 4),
        )
        .unwrap();

        on_event(&mut state, &config, &DomainEvent::FactionRemoved { faction: FactionId(3) });
        assert!(!hunter_goal(&state).is_completed);

        on_event(&mut state, &config, &DomainEvent::FactionRemoved { faction: FactionId(2) });
        assert!(hunter_goal(&state).is_completed);
        assert_eq!(state.faction(FactionId(1)).unwrap().xp, 4);
    }

    #[test]
    fn test_restraint_resets_on_attack_and_polls_turns() {
        let mut state = state();
        let config = EngineConfig::default();
        set_goal(
            &mut state,
            FactionId(1),
            spec(GoalKind::PeaceableKingdom { since_turn: 0 }, 3, 1),
        )
        .unwrap();

        state.turn.turn += 2;
        poll(&mut state, &config);
        assert_eq!(hunter_goal(&state).progress.current, 2);

        on_event(
            &mut state,
            &config,
            &DomainEvent::ActionCommitted { faction: FactionId(1), kind: ActionKind::Attack },
        );
        assert_eq!(hunter_goal(&state).progress.current, 0);
        assert_eq!(hunter_goal(&state).kind, GoalKind::PeaceableKingdom { since_turn: 3 });

        state.turn.turn += 3;
        poll(&mut state, &config);
        assert!(hunter_goal(&state).is_completed);
    }

    #[test]
    fn test_diplomatic_bonus_is_zero_or_one() {
        let mut config = EngineConfig::default();
        config.restraint_bonus_chance = 1.0;
        let mut state = state();
        state.faction_mut(FactionId(1)).unwrap().add_tag(FactionTag::ExchangeConsulate);
        set_goal(
            &mut state,
            FactionId(1),
            spec(GoalKind::PeaceableKingdom { since_turn: 0 }, 1, 2),
        )
        .unwrap();

        complete_goal(&mut state, &config, FactionId(1)).unwrap();
        assert_eq!(state.faction(FactionId(1)).unwrap().xp, 3);
    }

    #[test]
    fn test_spending_and_seizure_are_polled() {
        let mut state = state();
        let config = EngineConfig::default();
        state.faction_mut(FactionId(1)).unwrap().credits_spent = 10;
        set_goal(
            &mut state,
            FactionId(1),
            spec(GoalKind::WealthOfWorlds { baseline_spent: 0 }, 5, 1),
        )
        .unwrap();
        state.faction_mut(FactionId(1)).unwrap().credits_spent = 13;
        poll(&mut state, &config);
        assert_eq!(hunter_goal(&state).progress.current, 3);

        set_goal(
            &mut state,
            FactionId(2),
            spec(GoalKind::PlanetarySeizure { target: SystemId(1) }, 1, 2),
        )
        .unwrap();
        state.sector.get_mut(SystemId(1)).unwrap().planetary_government = Some(FactionId(2));
        poll(&mut state, &config);
        assert!(state.faction(FactionId(2)).unwrap().goal.as_ref().unwrap().is_completed);
    }

    #[test]
    fn test_set_goal_replaces_and_clears() {
        let mut state = state();
        set_goal(&mut state, FactionId(1), spec(GoalKind::BloodTheEnemy, 3, 1)).unwrap();
        let events = set_goal(&mut state, FactionId(1), spec(GoalKind::MilitaryConquest, 1, 1)).unwrap();
        assert!(matches!(events[0], DomainEvent::GoalCleared { .. }));
        assert_eq!(hunter_goal(&state).kind, GoalKind::MilitaryConquest);

        clear_goal(&mut state, FactionId(1)).unwrap();
        assert!(state.faction(FactionId(1)).unwrap().goal.is_none());
        assert!(clear_goal(&mut state, FactionId(1)).is_err());
    }
}

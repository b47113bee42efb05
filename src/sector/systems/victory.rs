//! Elimination and victory detection

use std::collections::BTreeSet;

use tracing::info;

use crate::core::types::FactionId;
use crate::sector::events::DomainEvent;
use crate::sector::state::GameState;

/// Re-evaluate elimination after an event that could cost a faction its
/// homeworld base. Once a victor is declared nothing further is evaluated.
pub fn on_event(state: &mut GameState, event: &DomainEvent) -> Vec<DomainEvent> {
    if state.victor.is_some() || !event.may_eliminate() {
        return Vec::new();
    }

    let now: BTreeSet<FactionId> = state
        .factions
        .iter()
        .filter(|f| !f.has_homeworld_base())
        .map(|f| f.id)
        .collect();

    let mut events: Vec<DomainEvent> = now
        .difference(&state.eliminated)
        .map(|&faction| {
            info!(%faction, "faction eliminated");
            DomainEvent::FactionEliminated { faction }
        })
        .collect();
    state.eliminated = now;

    if let Some(winner) = state.sole_survivor() {
        info!(faction = %winner, "victory");
        state.victor = Some(winner);
        events.push(DomainEvent::Victory { faction: winner });
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BASE_OF_INFLUENCE;
    use crate::core::types::{AssetId, SystemId};
    use crate::sector::events::RemovalReason;
    use crate::sector::faction::{Attributes, Faction, FactionAsset};
    use crate::sector::system::{Sector, StarSystem};

    fn state(count: u32) -> GameState {
        let mut state = GameState::new(Sector::new("t", vec![StarSystem::new(SystemId(0), "Home", 4)]), 0);
        for _ in 0..count {
            let id = state.next_faction_id();
            state.factions.push(Faction {
                id,
                name: format!("Faction {}", id.0),
                archetype: "Cult".into(),
                homeworld: SystemId(0),
                attributes: Attributes::new(1, 1, 1),
                credits: 0,
                xp: 0,
                tags: Vec::new(),
                goal: None,
                assets: vec![FactionAsset {
                    id: AssetId(id.0),
                    definition_id: BASE_OF_INFLUENCE.into(),
                    location: SystemId(0),
                    hp: 3,
                    max_hp: 3,
                    stealthed: false,
                    purchased_turn: None,
                    purchase_cost: 0,
                }],
                credits_spent: 0,
            });
            state.founding_factions += 1;
        }
        state
    }

    fn lose_base(state: &mut GameState, faction: u32) -> DomainEvent {
        state.faction_mut(FactionId(faction)).unwrap().take_asset(AssetId(faction));
        DomainEvent::AssetRemoved {
            faction: FactionId(faction),
            asset: AssetId(faction),
            reason: RemovalReason::Discarded,
        }
    }

    #[test]
    fn test_no_victory_with_two_survivors() {
        let mut state = state(3);
        let event = lose_base(&mut state, 1);
        let events = on_event(&mut state, &event);
        assert_eq!(events, vec![DomainEvent::FactionEliminated { faction: FactionId(1) }]);
        assert!(state.victor.is_none());
    }

    #[test]
    fn test_victory_exactly_once() {
        let mut state = state(3);
        let event = lose_base(&mut state, 1);
        on_event(&mut state, &event);
        let event = lose_base(&mut state, 2);
        let events = on_event(&mut state, &event);
        assert_eq!(
            events,
            vec![
                DomainEvent::FactionEliminated { faction: FactionId(2) },
                DomainEvent::Victory { faction: FactionId(3) },
            ]
        );

        let event = lose_base(&mut state, 3);
        assert!(on_event(&mut state, &event).is_empty());
        assert_eq!(state.victor, Some(FactionId(3)));
    }

    #[test]
    fn test_solo_game_never_wins() {
        let mut state = state(1);
        let event = DomainEvent::FactionAdded { faction: FactionId(1) };
        assert!(on_event(&mut state, &event).is_empty());
        let event = DomainEvent::FactionRemoved { faction: FactionId(9) };
        assert!(on_event(&mut state, &event).is_empty());
    }

    #[test]
    fn test_removed_faction_counts_as_gone() {
        let mut state = state(2);
        state.factions.retain(|f| f.id != FactionId(2));
        let events = on_event(&mut state, &DomainEvent::FactionRemoved { faction: FactionId(2) });
        assert_eq!(events, vec![DomainEvent::Victory { faction: FactionId(1) }]);
    }

    #[test]
    fn test_eliminated_set_diffs() {
        let mut state = state(3);
        let event = lose_base(&mut state, 1);
        on_event(&mut state, &event);
        // Same elimination is not reported twice
        let events = on_event(&mut state, &DomainEvent::FactionRemoved { faction: FactionId(9) });
        assert!(events.is_empty());
    }
}

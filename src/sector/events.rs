//! Domain events and the event log

use serde::{Deserialize, Serialize};

use crate::core::types::{ActionKind, AssetId, Attribute, Credits, FactionId, GoalId, Phase, SystemId, Turn};
use crate::sector::faction::FactionTag;

/// A logged event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: u32,
    pub turn: Turn,
    pub phase: Phase,
    pub event: DomainEvent,
}

/// Something that happened to the game state
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DomainEvent {
    // Roster
    FactionAdded { faction: FactionId },
    FactionRemoved { faction: FactionId },
    TagAdded { faction: FactionId, tag: FactionTag },
    TagRemoved { faction: FactionId, tag: FactionTag },
    HomeworldChanged { faction: FactionId, from: SystemId, to: SystemId },
    PlanetaryGovernmentChanged { faction: FactionId, system: SystemId, governing: bool },

    // Assets
    AssetAdded { faction: FactionId, asset: AssetId, definition: String, location: SystemId, cost: Credits },
    AssetRemoved { faction: FactionId, asset: AssetId, reason: RemovalReason },
    BasePlaced { faction: FactionId, asset: AssetId, system: SystemId, created: bool },
    AssetStealthed { faction: FactionId, asset: AssetId, location: SystemId },
    Repaired { faction: FactionId, asset: Option<AssetId>, healed: i32, cost: Credits },

    // Combat
    CombatResolved {
        attacker: Option<FactionId>,
        defender: FactionId,
        asset: Option<AssetId>,
        damage: i32,
        faction_damage: i32,
        destroyed: Option<DestroyedAsset>,
    },

    // Economy
    IncomeCollected { faction: FactionId, amount: Credits },
    MaintenancePaid { faction: FactionId, total: Credits },
    MaintenanceMissed { faction: FactionId, asset: AssetId, cost: Credits, strikes: u8 },

    // Advancement and goals
    AttributeUpgraded { faction: FactionId, attribute: Attribute, rating: u8, xp_spent: u32 },
    GoalSet { faction: FactionId, goal: GoalId },
    GoalCleared { faction: FactionId, goal: GoalId },
    GoalProgressed { faction: FactionId, goal: GoalId, current: u32, target: u32 },
    GoalCompleted { faction: FactionId, goal: GoalId, xp_awarded: u32 },

    // Turn structure
    ActionStaged { faction: FactionId, kind: ActionKind },
    ActionCommitted { faction: FactionId, kind: ActionKind },
    PhaseAdvanced { turn: Turn, phase: Phase },

    // Outcome
    FactionEliminated { faction: FactionId },
    Victory { faction: FactionId },
}

/// Why an asset left play outside of combat
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalReason {
    Sold { refund: Credits },
    Discarded,
    UnpaidMaintenance,
}

/// What combat destroyed, captured before the asset was dropped
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestroyedAsset {
    pub id: AssetId,
    pub owner: FactionId,
    pub definition: String,
    /// None for a Base of Influence
    pub category: Option<Attribute>,
    pub required_rating: Option<u8>,
}

impl DomainEvent {
    /// Events after which elimination has to be re-evaluated
    pub fn may_eliminate(&self) -> bool {
        matches!(
            self,
            DomainEvent::CombatResolved { .. }
                | DomainEvent::AssetRemoved { .. }
                | DomainEvent::FactionRemoved { .. }
                | DomainEvent::HomeworldChanged { .. }
        )
    }
}

/// The complete event log
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    pub events: Vec<Event>,
    next_event_id: u32,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: DomainEvent, turn: Turn, phase: Phase) -> u32 {
        let id = self.next_event_id;
        self.next_event_id += 1;

        self.events.push(Event { id, turn, phase, event });

        id
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events_for_turn(&self, turn: Turn) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| e.turn == turn)
    }

    pub fn last(&self) -> Option<&Event> {
        self.events.last()
    }
}

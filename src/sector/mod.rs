//! Sector-level faction play: data model, rules systems and the engine

pub mod engine;
pub mod events;
pub mod faction;
pub mod goal;
pub mod invariants;
pub mod state;
pub mod system;
pub mod systems;

pub use engine::{CommandOutcome, Engine, NewFaction};
pub use events::{DestroyedAsset, DomainEvent, Event, EventLog, RemovalReason};
pub use faction::{Attributes, Faction, FactionAsset, FactionTag};
pub use goal::{FactionGoal, GoalKind, GoalProgress, GoalSpec};
pub use state::{GameState, SaveState, StagedAction, TurnState};
pub use system::{Sector, StarSystem};
pub use systems::Strike;

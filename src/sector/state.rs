//! GameState - the single authoritative game snapshot

use std::collections::{BTreeMap, BTreeSet};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::error::ValidationError;
use crate::core::types::{ActionKind, AssetId, FactionId, GoalId, Phase, Turn};
use crate::sector::events::EventLog;
use crate::sector::faction::Faction;
use crate::sector::system::Sector;

/// The full rules state of a game
#[derive(Clone, Debug)]
pub struct GameState {
    /// All factions still in the game, in creation order
    pub factions: Vec<Faction>,
    pub sector: Sector,
    pub turn: TurnState,
    /// Consecutive unpaid maintenance turns per asset
    pub maintenance_strikes: BTreeMap<AssetId, u8>,
    /// Factions known to have lost their homeworld base
    pub eliminated: BTreeSet<FactionId>,
    /// Number of factions ever added
    pub founding_factions: usize,
    pub victor: Option<FactionId>,
    pub log: EventLog,
    /// Random number generator (deterministic)
    pub rng: ChaCha8Rng,
    next_faction_id: u32,
    next_asset_id: u32,
    next_goal_id: u32,
}

/// Where the game is in the phase cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    pub turn: Turn,
    pub phase: Phase,
    pub staged: Option<StagedAction>,
    pub committed: bool,
    /// The staged action has been carried out
    pub action_performed: bool,
    /// The current phase's automatic processing has run
    pub phase_work_done: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedAction {
    pub faction: FactionId,
    pub kind: ActionKind,
}

impl Default for TurnState {
    fn default() -> Self {
        Self {
            turn: 1,
            phase: Phase::Income,
            staged: None,
            committed: false,
            action_performed: false,
            phase_work_done: false,
        }
    }
}

/// Persisted shape handed to the save/load collaborator
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaveState {
    pub version: u32,
    /// Seconds since the Unix epoch
    pub timestamp: u64,
    pub factions: Vec<Faction>,
    pub sector: Sector,
    pub turn: Turn,
    pub phase: Phase,
}

impl GameState {
    pub fn new(sector: Sector, seed: u64) -> Self {
        Self {
            factions: Vec::new(),
            sector,
            turn: TurnState::default(),
            maintenance_strikes: BTreeMap::new(),
            eliminated: BTreeSet::new(),
            founding_factions: 0,
            victor: None,
            log: EventLog::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            next_faction_id: 1,
            next_asset_id: 1,
            next_goal_id: 1,
        }
    }

    /// Generate a new unique FactionId
    pub fn next_faction_id(&mut self) -> FactionId {
        let id = FactionId(self.next_faction_id);
        self.next_faction_id += 1;
        id
    }

    /// Generate a new unique AssetId
    pub fn next_asset_id(&mut self) -> AssetId {
        let id = AssetId(self.next_asset_id);
        self.next_asset_id += 1;
        id
    }

    /// Generate a new unique GoalId
    pub fn next_goal_id(&mut self) -> GoalId {
        let id = GoalId(self.next_goal_id);
        self.next_goal_id += 1;
        id
    }

    pub fn faction(&self, id: FactionId) -> Option<&Faction> {
        self.factions.iter().find(|f| f.id == id)
    }

    pub fn faction_mut(&mut self, id: FactionId) -> Option<&mut Faction> {
        self.factions.iter_mut().find(|f| f.id == id)
    }

    /// Factions that still hold their homeworld base
    pub fn surviving_factions(&self) -> impl Iterator<Item = &Faction> {
        self.factions.iter().filter(|f| !self.eliminated.contains(&f.id))
    }

    /// The last faction standing, if at least two ever played
    pub fn sole_survivor(&self) -> Option<FactionId> {
        if self.founding_factions < 2 {
            return None;
        }
        let survivors: Vec<FactionId> = self.surviving_factions().map(|f| f.id).collect();
        match survivors[..] {
            [winner] => Some(winner),
            _ => None,
        }
    }

    pub fn to_save(&self, version: u32) -> SaveState {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        SaveState {
            version,
            timestamp,
            factions: self.factions.clone(),
            sector: self.sector.clone(),
            turn: self.turn.turn,
            phase: self.turn.phase,
        }
    }

    /// Rebuild a state from a save. Staging, strikes and the event log are
    /// not persisted and start empty; elimination and the victor are
    /// recomputed.
    pub fn from_save(save: SaveState, expected_version: u32, seed: u64) -> Result<Self, ValidationError> {
        if save.version != expected_version {
            return Err(ValidationError::UnsupportedSaveVersion {
                found: save.version,
                expected: expected_version,
            });
        }

        let mut state = GameState::new(save.sector, seed);
        state.turn.turn = save.turn;
        state.turn.phase = save.phase;
        state.founding_factions = save.factions.len();
        state.next_faction_id = save.factions.iter().map(|f| f.id.0).max().unwrap_or(0) + 1;
        state.next_asset_id = save
            .factions
            .iter()
            .flat_map(|f| f.assets.iter().map(|a| a.id.0))
            .max()
            .unwrap_or(0)
            + 1;
        state.next_goal_id = save
            .factions
            .iter()
            .filter_map(|f| f.goal.as_ref().map(|g| g.id.0))
            .max()
            .unwrap_or(0)
            + 1;
        state.eliminated = save
            .factions
            .iter()
            .filter(|f| !f.has_homeworld_base())
            .map(|f| f.id)
            .collect();
        state.factions = save.factions;
        state.victor = state.sole_survivor();

        Ok(state)
    }
}

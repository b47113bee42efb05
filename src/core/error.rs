//! Command rejection taxonomy
//!
//! Every engine command either commits fully or returns one of these errors
//! without touching state. Validation and lookup failures are ordinary
//! gameplay outcomes; invariant violations are bugs surfaced instead of
//! being clamped away.

use thiserror::Error;

use crate::core::types::{ActionKind, AssetId, Attribute, Credits, FactionId, GoalId, Phase, SystemId};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Not found: {0}")]
    NotFound(#[from] NotFound),

    #[error("{0}")]
    Invariant(#[from] InvariantViolation),
}

impl EngineError {
    /// True for failures a caller can present to the player as-is.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, EngineError::Invariant(_))
    }
}

/// A precondition of the command did not hold
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("insufficient credits: required {required}, available {available}")]
    InsufficientCredits { required: Credits, available: Credits },

    #[error("{attribute} rating {actual} is below the required {required}")]
    RatingTooLow { attribute: Attribute, required: u8, actual: u8 },

    #[error("{attribute} is already at the maximum rating")]
    AttributeAtCap { attribute: Attribute },

    #[error("insufficient experience: required {required}, available {available}")]
    InsufficientXp { required: u32, available: u32 },

    #[error("attribute rating {0} is outside 1..=8")]
    RatingOutOfRange(u8),

    #[error("command requires the {expected} phase, current phase is {actual}")]
    WrongPhase { expected: Phase, actual: Phase },

    #[error("{phase} processing already ran this turn")]
    PhaseWorkAlreadyDone { phase: Phase },

    #[error("an action of kind {staged:?} is already staged this turn")]
    ActionAlreadyStaged { staged: ActionKind },

    #[error("this turn's action has already been committed")]
    ActionAlreadyCommitted,

    #[error("no action is staged")]
    NoStagedAction,

    #[error("{faction} has no {kind:?} action staged")]
    ActionNotStaged { faction: FactionId, kind: ActionKind },

    #[error("this turn's {kind:?} action has already been carried out")]
    ActionAlreadyPerformed { kind: ActionKind },

    #[error("{asset} is not a Base of Influence")]
    NotBaseOfInfluence { asset: AssetId },

    #[error("{0} is already at full health")]
    AlreadyAtFullHealth(String),

    #[error("{faction} has no Base of Influence in {system}")]
    NoBaseAtSystem { faction: FactionId, system: SystemId },

    #[error("{system} tech level {actual} is below the required {required}")]
    TechLevelTooLow { system: SystemId, required: u8, actual: u8 },

    #[error("Base of Influence hp {requested} must be between 1 and the faction's max hp {max}")]
    InvalidBaseHp { requested: i32, max: i32 },

    #[error("damage must be positive, got {0}")]
    NonPositiveDamage(i32),

    #[error("repair amount must be positive")]
    NothingToRepair,

    #[error("Base of Influence already has {current} max hp, cannot upgrade to {requested}")]
    BaseNotUpgraded { current: i32, requested: i32 },

    #[error("{faction} has no active goal")]
    NoActiveGoal { faction: FactionId },

    #[error("goal {goal:?} metadata does not match its kind")]
    GoalKindMismatch { goal: GoalId },

    #[error("goal target must be positive")]
    InvalidGoalTarget,

    #[error("{asset} is already stealthed")]
    AlreadyStealthed { asset: AssetId },

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("unsupported save version {found} (expected {expected})")]
    UnsupportedSaveVersion { found: u32, expected: u32 },

    #[error("{0}")]
    Config(String),
}

/// A command referenced an id that does not exist
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NotFound {
    #[error("faction {0}")]
    Faction(FactionId),

    #[error("{asset} owned by {faction}")]
    Asset { faction: FactionId, asset: AssetId },

    #[error("system {0}")]
    System(SystemId),

    #[error("asset definition '{0}'")]
    Definition(String),
}

/// A state invariant was broken
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Invariant violation: {message}")]
pub struct InvariantViolation {
    pub message: String,
}

impl InvariantViolation {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

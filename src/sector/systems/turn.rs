//! Turn phase controller
//!
//! Income -> Maintenance -> News -> Action -> Income, with the turn counter
//! advancing on the wrap. One action may be staged and committed per Action
//! phase, and the command that carries it out may run once.

use tracing::{debug, info};

use crate::core::error::{NotFound, Result, ValidationError};
use crate::core::types::{ActionKind, FactionId, Phase};
use crate::sector::events::DomainEvent;
use crate::sector::state::{GameState, StagedAction, TurnState};

pub fn require_phase(turn: &TurnState, expected: Phase) -> std::result::Result<(), ValidationError> {
    if turn.phase != expected {
        return Err(ValidationError::WrongPhase { expected, actual: turn.phase });
    }
    Ok(())
}

/// Use up the turn's action for a command of `kind` by `faction`.
///
/// The action must have been staged by that faction in this Action phase
/// and not carried out yet. Staging and committing may happen in either
/// order relative to the command.
pub fn perform_action(
    turn: &mut TurnState,
    faction: FactionId,
    kind: ActionKind,
) -> std::result::Result<(), ValidationError> {
    require_phase(turn, Phase::Action)?;
    let staged = turn.staged.ok_or(ValidationError::NoStagedAction)?;
    if staged.faction != faction || staged.kind != kind {
        return Err(ValidationError::ActionNotStaged { faction, kind });
    }
    if turn.action_performed {
        return Err(ValidationError::ActionAlreadyPerformed { kind });
    }
    turn.action_performed = true;
    Ok(())
}

/// Damage with an attacker is that faction's Attack action. Damage from no
/// faction only needs the Action phase.
pub fn authorize_strike(
    turn: &mut TurnState,
    attacker: Option<FactionId>,
) -> std::result::Result<(), ValidationError> {
    match attacker {
        Some(attacker) => perform_action(turn, attacker, ActionKind::Attack),
        None => require_phase(turn, Phase::Action),
    }
}

/// Guard for the automatic Income/Maintenance work
pub fn begin_phase_work(turn: &TurnState, phase: Phase) -> std::result::Result<(), ValidationError> {
    require_phase(turn, phase)?;
    if turn.phase_work_done {
        return Err(ValidationError::PhaseWorkAlreadyDone { phase });
    }
    Ok(())
}

pub fn stage_action(state: &mut GameState, faction: FactionId, kind: ActionKind) -> Result<DomainEvent> {
    if state.faction(faction).is_none() {
        return Err(NotFound::Faction(faction).into());
    }
    let turn = &mut state.turn;
    require_phase(turn, Phase::Action)?;
    if turn.committed {
        return Err(ValidationError::ActionAlreadyCommitted.into());
    }
    if let Some(staged) = turn.staged {
        return Err(ValidationError::ActionAlreadyStaged { staged: staged.kind }.into());
    }

    turn.staged = Some(StagedAction { faction, kind });
    debug!(%faction, ?kind, "action staged");
    Ok(DomainEvent::ActionStaged { faction, kind })
}

pub fn commit_action(state: &mut GameState) -> Result<DomainEvent> {
    let turn = &mut state.turn;
    require_phase(turn, Phase::Action)?;
    if turn.committed {
        return Err(ValidationError::ActionAlreadyCommitted.into());
    }
    let staged = turn.staged.ok_or(ValidationError::NoStagedAction)?;

    turn.committed = true;
    debug!(faction = %staged.faction, kind = ?staged.kind, "action committed");
    Ok(DomainEvent::ActionCommitted {
        faction: staged.faction,
        kind: staged.kind,
    })
}

/// Move to the next phase, resetting per-phase flags
pub fn advance(turn: &mut TurnState) -> DomainEvent {
    turn.phase = turn.phase.next();
    if turn.phase == Phase::Income {
        turn.turn += 1;
    }
    turn.staged = None;
    turn.committed = false;
    turn.action_performed = false;
    turn.phase_work_done = false;

    info!(turn = turn.turn, phase = %turn.phase, "phase advanced");
    DomainEvent::PhaseAdvanced {
        turn: turn.turn,
        phase: turn.phase,
    }
}

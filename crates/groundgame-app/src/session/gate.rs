// Turn gate: which phase the draft is in and which controls that allows.

use std::fmt;

use groundgame_core::draft::{DraftState, OnClockTeam};
use thiserror::Error;

use super::cache::DraftStateCache;

// ---------------------------------------------------------------------------
// MutationKind
// ---------------------------------------------------------------------------

/// A request that changes draft state on the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    SubmitPick,
    SimulateCpu,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MutationKind::SubmitPick => "pick submission",
            MutationKind::SimulateCpu => "CPU pick simulation",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// TurnPhase
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    /// No snapshot has landed yet.
    Loading,
    AwaitingUserPick,
    AwaitingCpuSimulation,
    /// Another human manager is on the clock; nothing to do but wait.
    WaitingOnOtherTeam,
    Mutating(MutationKind),
    /// Terminal.
    Completed,
}

impl TurnPhase {
    pub fn of(cache: &DraftStateCache) -> Self {
        Self::from_parts(cache.current(), cache.mutation_in_flight())
    }

    /// Completion outranks an in-flight mutation, which outranks whose turn
    /// the snapshot says it is.
    pub fn from_parts(state: Option<&DraftState>, mutating: Option<MutationKind>) -> Self {
        let Some(state) = state else {
            return TurnPhase::Loading;
        };
        if state.is_complete() {
            return TurnPhase::Completed;
        }
        if let Some(kind) = mutating {
            return TurnPhase::Mutating(kind);
        }
        if state.is_user_turn {
            return TurnPhase::AwaitingUserPick;
        }
        match &state.on_clock_team {
            Some(OnClockTeam::Cpu { .. }) => TurnPhase::AwaitingCpuSimulation,
            Some(OnClockTeam::Human { .. }) | None => TurnPhase::WaitingOnOtherTeam,
        }
    }
}

// ---------------------------------------------------------------------------
// LegalActions
// ---------------------------------------------------------------------------

/// Which controls the presentation layer should enable.
///
/// A live sync is not a mutation: it never changes the phase and never
/// blocks a pick. `poll_live` only says whether one may start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LegalActions {
    pub submit_pick: bool,
    pub simulate_cpu_pick: bool,
    pub change_query: bool,
    pub poll_live: bool,
}

impl LegalActions {
    pub fn for_phase(phase: TurnPhase, live: bool, sync_in_flight: bool) -> Self {
        let open_turn = matches!(
            phase,
            TurnPhase::AwaitingUserPick
                | TurnPhase::AwaitingCpuSimulation
                | TurnPhase::WaitingOnOtherTeam
        );
        LegalActions {
            submit_pick: phase == TurnPhase::AwaitingUserPick,
            simulate_cpu_pick: phase == TurnPhase::AwaitingCpuSimulation,
            change_query: !matches!(phase, TurnPhase::Mutating(_)),
            poll_live: live && open_turn && !sync_in_flight,
        }
    }
}

// ---------------------------------------------------------------------------
// DispatchRejection
// ---------------------------------------------------------------------------

/// Why the dispatcher refused an action locally, without any request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DispatchRejection {
    #[error("a {0} is already in progress")]
    MutationInFlight(MutationKind),
    #[error("the draft is complete")]
    DraftCompleted,
    #[error("it is not your turn")]
    NotUserTurn,
    #[error("no CPU team is on the clock")]
    NotCpuTurn,
    #[error("draft state has not loaded yet")]
    NoSnapshot,
    #[error("enter a player name first")]
    EmptyPlayerName,
    #[error("this is not a live draft")]
    NotLiveSession,
    #[error("a live draft sync is already in progress")]
    SyncInFlight,
    #[error("the session has been closed")]
    TornDown,
}

/// Check whether `kind` may be dispatched in `phase`.
pub fn check_mutation(phase: TurnPhase, kind: MutationKind) -> Result<(), DispatchRejection> {
    check_open(phase)?;
    match kind {
        MutationKind::SubmitPick if phase != TurnPhase::AwaitingUserPick => {
            Err(DispatchRejection::NotUserTurn)
        }
        MutationKind::SimulateCpu if phase != TurnPhase::AwaitingCpuSimulation => {
            Err(DispatchRejection::NotCpuTurn)
        }
        _ => Ok(()),
    }
}

/// Check whether a live sync may start. It waits out a mutation in flight
/// but is never waited on by one.
pub fn check_live_sync(
    phase: TurnPhase,
    live: bool,
    sync_in_flight: bool,
) -> Result<(), DispatchRejection> {
    if !live {
        return Err(DispatchRejection::NotLiveSession);
    }
    check_open(phase)?;
    if sync_in_flight {
        return Err(DispatchRejection::SyncInFlight);
    }
    Ok(())
}

fn check_open(phase: TurnPhase) -> Result<(), DispatchRejection> {
    match phase {
        TurnPhase::Loading => return Err(DispatchRejection::NoSnapshot),
        TurnPhase::Completed => return Err(DispatchRejection::DraftCompleted),
        TurnPhase::Mutating(in_flight) => {
            return Err(DispatchRejection::MutationInFlight(in_flight))
        }
        _ => Ok(()),
    }
}

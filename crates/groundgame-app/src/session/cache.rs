// Draft state cache: the single current snapshot of a session.
//
// Fetches are tagged with a generation when issued. Only the response to the
// newest issued fetch may touch the cache; anything older is discarded, and
// nothing is applied once the cache has been torn down.

use chrono::{DateTime, Local};
use groundgame_core::draft::{DraftState, RequestParams};
use groundgame_core::error::ServiceError;
use tracing::debug;

use super::gate::{DispatchRejection, MutationKind};

// ---------------------------------------------------------------------------
// SessionError
// ---------------------------------------------------------------------------

/// Which action produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorOrigin {
    Fetch,
    Mutation(MutationKind),
    LiveSync,
}

/// A failed service call, as surfaced to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionError {
    pub origin: ErrorOrigin,
    pub error: ServiceError,
}

impl SessionError {
    pub fn fetch(error: ServiceError) -> Self {
        SessionError {
            origin: ErrorOrigin::Fetch,
            error,
        }
    }

    pub fn mutation(kind: MutationKind, error: ServiceError) -> Self {
        SessionError {
            origin: ErrorOrigin::Mutation(kind),
            error,
        }
    }

    pub fn live_sync(error: ServiceError) -> Self {
        SessionError {
            origin: ErrorOrigin::LiveSync,
            error,
        }
    }

    /// The line shown to the user.
    ///
    /// Rejected picks get the specific, correctable message; transport and
    /// service failures get a generic one naming what failed.
    pub fn message(&self) -> String {
        if self.error.is_user_correctable() {
            return self.error.user_message();
        }
        let what = match self.origin {
            ErrorOrigin::Fetch => "Failed to load draft state",
            ErrorOrigin::Mutation(MutationKind::SubmitPick) => "Failed to submit pick",
            ErrorOrigin::Mutation(MutationKind::SimulateCpu) => "Failed to simulate CPU pick",
            ErrorOrigin::LiveSync => "Failed to sync live draft",
        };
        format!("{what}. Press r to retry.")
    }

    pub fn is_user_correctable(&self) -> bool {
        self.error.is_user_correctable()
    }
}

// ---------------------------------------------------------------------------
// Fetch bookkeeping
// ---------------------------------------------------------------------------

/// Handle for one issued state fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub params: RequestParams,
}

/// What `apply_fetch` did with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The snapshot was replaced; `changed` is false for an identical one.
    Applied { changed: bool },
    /// The newest fetch failed; its error was recorded.
    Failed,
    /// A newer fetch has been issued since; the result was dropped.
    Stale,
    /// The session is gone; the result was dropped.
    TornDown,
}

// ---------------------------------------------------------------------------
// DraftStateCache
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct DraftStateCache {
    current: Option<DraftState>,
    applied_params: Option<RequestParams>,
    /// When the snapshot last changed.
    fetched_at: Option<DateTime<Local>>,
    last_error: Option<SessionError>,
    mutating: Option<MutationKind>,
    /// Newest generation issued.
    issued: u64,
    /// Newest generation whose result (success or failure) has landed.
    landed: u64,
    requested_params: Option<RequestParams>,
    torn_down: bool,
}

impl DraftStateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&DraftState> {
        self.current.as_ref()
    }

    /// Parameters of the request that produced the current snapshot.
    pub fn applied_params(&self) -> Option<RequestParams> {
        self.applied_params
    }

    /// Parameters of the newest issued fetch.
    pub fn requested_params(&self) -> Option<RequestParams> {
        self.requested_params
    }

    pub fn fetched_at(&self) -> Option<DateTime<Local>> {
        self.fetched_at
    }

    pub fn last_error(&self) -> Option<&SessionError> {
        self.last_error.as_ref()
    }

    pub fn is_mutating(&self) -> bool {
        self.mutating.is_some()
    }

    pub fn mutation_in_flight(&self) -> Option<MutationKind> {
        self.mutating
    }

    pub fn generation(&self) -> u64 {
        self.issued
    }

    /// True while the newest issued fetch has not come back.
    pub fn fetch_pending(&self) -> bool {
        self.landed < self.issued
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Swap in a new snapshot and clear the last error.
    ///
    /// Returns whether anything visible changed; `fetched_at` only moves
    /// when it did.
    pub fn replace(&mut self, state: DraftState, params: RequestParams) -> bool {
        if self.torn_down {
            return false;
        }
        let changed =
            self.current.as_ref() != Some(&state) || self.applied_params != Some(params);
        if changed {
            self.current = Some(state);
            self.applied_params = Some(params);
            self.fetched_at = Some(Local::now());
        }
        self.last_error = None;
        changed
    }

    /// Record a failure; the current snapshot stays as it is.
    pub fn record_error(&mut self, error: SessionError) {
        if self.torn_down {
            return;
        }
        self.last_error = Some(error);
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Mark a mutation as in flight. Fails without side effects if one
    /// already is.
    pub fn begin_mutation(&mut self, kind: MutationKind) -> Result<(), DispatchRejection> {
        if self.torn_down {
            return Err(DispatchRejection::TornDown);
        }
        if let Some(in_flight) = self.mutating {
            return Err(DispatchRejection::MutationInFlight(in_flight));
        }
        self.mutating = Some(kind);
        Ok(())
    }

    pub fn end_mutation(&mut self) -> Option<MutationKind> {
        self.mutating.take()
    }

    /// Start a new fetch generation for `params`.
    pub fn issue_fetch(&mut self, params: RequestParams) -> FetchTicket {
        self.issued += 1;
        self.requested_params = Some(params);
        FetchTicket {
            generation: self.issued,
            params,
        }
    }

    /// Apply the result of a fetch, last response wins.
    pub fn apply_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<DraftState, ServiceError>,
    ) -> FetchOutcome {
        if self.torn_down {
            debug!(generation = ticket.generation, "dropping fetch result after teardown");
            return FetchOutcome::TornDown;
        }
        if ticket.generation != self.issued {
            debug!(
                generation = ticket.generation,
                newest = self.issued,
                "dropping stale fetch result"
            );
            return FetchOutcome::Stale;
        }
        self.landed = ticket.generation;
        match result {
            Ok(state) => FetchOutcome::Applied {
                changed: self.replace(state, ticket.params),
            },
            Err(error) => {
                self.record_error(SessionError::fetch(error));
                FetchOutcome::Failed
            }
        }
    }

    /// Discard the snapshot; the cache ignores every later update.
    pub fn tear_down(&mut self) {
        self.torn_down = true;
        self.current = None;
        self.mutating = None;
        self.last_error = None;
    }
}

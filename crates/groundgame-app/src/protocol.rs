// Messages exchanged between the app loop and the presentation layer.

use chrono::{DateTime, Local};
use groundgame_core::draft::{
    DraftState, PositionFilter, RequestParams, SessionId, SortKey, StartConfig,
};
use groundgame_core::error::ServiceError;

use crate::session::{LegalActions, SessionError, TurnPhase};

/// Commands sent from the UI to the app loop.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    /// Create a new session on the service and enter it.
    StartSession(StartConfig),
    /// Enter an existing session by id.
    OpenSession { session_id: SessionId, live: bool },
    /// Tear down the current session and return to the start screen.
    LeaveSession,
    SetPositionFilter(PositionFilter),
    SetSortBy(SortKey),
    SubmitPick(String),
    SimulateCpuPick,
    /// Refetch the current state.
    Refresh,
    PollLive,
    Quit,
}

/// Updates pushed from the app loop to the UI.
#[derive(Debug, Clone)]
pub enum UiUpdate {
    /// The current session, rendered in full.
    Session(Box<SessionView>),
    /// A start request is in flight.
    Starting,
    /// The start request failed; the form stays open with this error.
    StartFailed(ServiceError),
    /// The session was left; show the start screen.
    SessionClosed,
}

/// Render-ready projection of a `DraftSession`.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub session_id: SessionId,
    pub live: bool,
    pub snapshot: Option<DraftState>,
    pub phase: TurnPhase,
    pub legal: LegalActions,
    /// Parameters the selectors show.
    pub requested: RequestParams,
    /// Parameters the displayed players were fetched with.
    pub applied: Option<RequestParams>,
    pub fetch_pending: bool,
    /// A live sync is out; it does not block anything.
    pub live_sync_pending: bool,
    pub fetched_at: Option<DateTime<Local>>,
    pub error: Option<SessionError>,
    /// Transient status line (pick receipts, local rejections).
    pub notice: Option<String>,
    pub pick_input: String,
}

impl SessionView {
    /// True when the table is known to reflect the selected parameters.
    pub fn params_applied(&self) -> bool {
        self.applied == Some(self.requested)
    }
}

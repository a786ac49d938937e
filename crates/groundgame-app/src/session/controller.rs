// Draft session controller: the turn-gated action dispatcher.
//
// Every mutation passes the turn gate and the cache's in-flight guard before
// an `Effect` is handed out. Its completion always ends the mutation and
// issues a reconciliation fetch, whether it succeeded or not. A live sync is
// tracked on its own flag and never holds up a pick.

use groundgame_core::draft::{
    DraftState, LivePollResult, PickReceipt, PositionFilter, RequestParams, SessionId, SortKey,
};
use groundgame_core::error::ServiceError;
use tracing::{debug, info, warn};

use super::cache::{DraftStateCache, FetchOutcome, FetchTicket, SessionError};
use super::gate::{
    check_live_sync, check_mutation, DispatchRejection, LegalActions, MutationKind, TurnPhase,
};
use super::params::QueryReconciler;
use crate::protocol::SessionView;

/// Work the caller must perform against the draft service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Fetch(FetchTicket),
    SubmitPick { player_name: String },
    SimulateCpuPick,
    PollLive,
}

/// Result of an executed `Effect`, fed back into the session.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Fetched {
        ticket: FetchTicket,
        result: Result<DraftState, ServiceError>,
    },
    PickSubmitted {
        player_name: String,
        result: Result<PickReceipt, ServiceError>,
    },
    CpuPickSimulated {
        result: Result<PickReceipt, ServiceError>,
    },
    LivePolled {
        result: Result<LivePollResult, ServiceError>,
    },
}

/// State of one draft session, from entry until teardown.
#[derive(Debug)]
pub struct DraftSession {
    id: SessionId,
    live: bool,
    cache: DraftStateCache,
    query: QueryReconciler,
    /// Player name of the last submitted pick; kept until a pick succeeds.
    pick_input: String,
    /// Mutation error to restore once the reconciliation fetch has replaced
    /// the snapshot (which clears `last_error`).
    pending_action_error: Option<SessionError>,
    notice: Option<String>,
    live_sync_in_flight: bool,
}

impl DraftSession {
    pub fn new(id: SessionId, live: bool) -> Self {
        DraftSession {
            id,
            live,
            cache: DraftStateCache::new(),
            query: QueryReconciler::default(),
            pick_input: String::new(),
            pending_action_error: None,
            notice: None,
            live_sync_in_flight: false,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    pub fn cache(&self) -> &DraftStateCache {
        &self.cache
    }

    pub fn phase(&self) -> TurnPhase {
        TurnPhase::of(&self.cache)
    }

    pub fn legal_actions(&self) -> LegalActions {
        if self.cache.is_torn_down() {
            return LegalActions::default();
        }
        LegalActions::for_phase(self.phase(), self.live, self.live_sync_in_flight)
    }

    pub fn is_live_sync_in_flight(&self) -> bool {
        self.live_sync_in_flight
    }

    pub fn requested_params(&self) -> RequestParams {
        self.query.params()
    }

    pub fn pick_input(&self) -> &str {
        &self.pick_input
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    // -----------------------------------------------------------------------
    // Fetches
    // -----------------------------------------------------------------------

    /// Issue a fetch for the current parameters (entry and manual refresh).
    pub fn refresh(&mut self) -> Result<Effect, DispatchRejection> {
        if self.cache.is_torn_down() {
            return Err(DispatchRejection::TornDown);
        }
        Ok(Effect::Fetch(self.cache.issue_fetch(self.query.params())))
    }

    pub fn set_position_filter(
        &mut self,
        filter: PositionFilter,
    ) -> Result<Option<Effect>, DispatchRejection> {
        self.check_query_change()?;
        Ok(self
            .query
            .set_filter(filter)
            .map(|params| Effect::Fetch(self.cache.issue_fetch(params))))
    }

    pub fn set_sort_by(&mut self, sort: SortKey) -> Result<Option<Effect>, DispatchRejection> {
        self.check_query_change()?;
        Ok(self
            .query
            .set_sort(sort)
            .map(|params| Effect::Fetch(self.cache.issue_fetch(params))))
    }

    fn check_query_change(&self) -> Result<(), DispatchRejection> {
        if self.cache.is_torn_down() {
            return Err(DispatchRejection::TornDown);
        }
        match self.cache.mutation_in_flight() {
            Some(kind) => Err(DispatchRejection::MutationInFlight(kind)),
            None => Ok(()),
        }
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    pub fn submit_pick(&mut self, player_name: &str) -> Result<Effect, DispatchRejection> {
        self.begin(MutationKind::SubmitPick, || {
            if player_name.trim().is_empty() {
                Err(DispatchRejection::EmptyPlayerName)
            } else {
                Ok(())
            }
        })?;
        self.pick_input = player_name.to_string();
        info!(session = %self.id, player = player_name.trim(), "submitting pick");
        Ok(Effect::SubmitPick {
            player_name: player_name.trim().to_string(),
        })
    }

    pub fn simulate_cpu_pick(&mut self) -> Result<Effect, DispatchRejection> {
        self.begin(MutationKind::SimulateCpu, || Ok(()))?;
        info!(session = %self.id, "simulating CPU pick");
        Ok(Effect::SimulateCpuPick)
    }

    /// Ask the service to pull new picks from the live platform.
    ///
    /// Leaves the phase alone, so picks and query changes stay available
    /// while the sync is out.
    pub fn poll_live(&mut self) -> Result<Effect, DispatchRejection> {
        if self.cache.is_torn_down() {
            return Err(DispatchRejection::TornDown);
        }
        check_live_sync(self.phase(), self.live, self.live_sync_in_flight)?;
        self.live_sync_in_flight = true;
        debug!(session = %self.id, "polling live draft");
        Ok(Effect::PollLive)
    }

    fn begin<F>(&mut self, kind: MutationKind, precheck: F) -> Result<(), DispatchRejection>
    where
        F: FnOnce() -> Result<(), DispatchRejection>,
    {
        if self.cache.is_torn_down() {
            return Err(DispatchRejection::TornDown);
        }
        check_mutation(self.phase(), kind)?;
        precheck()?;
        self.cache.begin_mutation(kind)?;
        self.notice = None;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Results
    // -----------------------------------------------------------------------

    /// Feed back the result of an executed effect; returns follow-up effects.
    pub fn handle(&mut self, event: SessionEvent) -> Vec<Effect> {
        if self.cache.is_torn_down() {
            debug!(session = %self.id, "ignoring result for closed session");
            return Vec::new();
        }

        match event {
            SessionEvent::Fetched { ticket, result } => {
                match self.cache.apply_fetch(ticket, result) {
                    FetchOutcome::Applied { changed } => {
                        debug!(generation = ticket.generation, changed, "snapshot applied");
                        if let Some(error) = self.pending_action_error.take() {
                            self.cache.record_error(error);
                        }
                    }
                    FetchOutcome::Failed => {
                        warn!(session = %self.id, "state fetch failed");
                        self.pending_action_error = None;
                    }
                    FetchOutcome::Stale | FetchOutcome::TornDown => {}
                }
                Vec::new()
            }
            SessionEvent::PickSubmitted {
                player_name,
                result,
            } => {
                self.cache.end_mutation();
                match result {
                    Ok(receipt) => {
                        self.pick_input.clear();
                        self.pending_action_error = None;
                        self.cache.clear_error();
                        self.notice = Some(
                            receipt
                                .summary()
                                .unwrap_or_else(|| format!("Drafted {player_name}")),
                        );
                    }
                    Err(error) => {
                        warn!(player = %player_name, %error, "pick failed");
                        self.fail(MutationKind::SubmitPick, error);
                    }
                }
                vec![self.reconcile()]
            }
            SessionEvent::CpuPickSimulated { result } => {
                self.cache.end_mutation();
                match result {
                    Ok(receipt) => {
                        self.pending_action_error = None;
                        self.cache.clear_error();
                        self.notice = receipt.summary();
                    }
                    Err(error) => {
                        warn!(%error, "CPU pick simulation failed");
                        self.fail(MutationKind::SimulateCpu, error);
                    }
                }
                vec![self.reconcile()]
            }
            SessionEvent::LivePolled { result } => {
                self.live_sync_in_flight = false;
                match result {
                    Ok(poll) => {
                        if !poll.new_picks.is_empty() {
                            info!(count = poll.new_picks.len(), "live picks ingested");
                            self.notice = poll
                                .message
                                .or_else(|| Some(format!("{} new picks", poll.new_picks.len())));
                        }
                    }
                    Err(error) => {
                        warn!(%error, "live poll failed");
                        let error = SessionError::live_sync(error);
                        self.cache.record_error(error.clone());
                        if self.pending_action_error.is_none() {
                            self.pending_action_error = Some(error);
                        }
                    }
                }
                vec![self.reconcile()]
            }
        }
    }

    fn fail(&mut self, kind: MutationKind, error: ServiceError) {
        let error = SessionError::mutation(kind, error);
        self.cache.record_error(error.clone());
        self.pending_action_error = Some(error);
    }

    fn reconcile(&mut self) -> Effect {
        Effect::Fetch(self.cache.issue_fetch(self.query.params()))
    }

    // -----------------------------------------------------------------------
    // Teardown / view
    // -----------------------------------------------------------------------

    pub fn tear_down(&mut self) {
        info!(session = %self.id, "session torn down");
        self.cache.tear_down();
        self.pending_action_error = None;
        self.notice = None;
        self.live_sync_in_flight = false;
    }

    pub fn is_torn_down(&self) -> bool {
        self.cache.is_torn_down()
    }

    /// Everything the presentation layer needs to render this session.
    pub fn view(&self) -> SessionView {
        SessionView {
            session_id: self.id.clone(),
            live: self.live,
            snapshot: self.cache.current().cloned(),
            phase: self.phase(),
            legal: self.legal_actions(),
            requested: self.query.params(),
            applied: self.cache.applied_params(),
            fetch_pending: self.cache.fetch_pending(),
            live_sync_pending: self.is_live_sync_in_flight(),
            fetched_at: self.cache.fetched_at(),
            error: self.cache.last_error().cloned(),
            notice: self.notice.clone(),
            pick_input: self.pick_input.clone(),
        }
    }
}

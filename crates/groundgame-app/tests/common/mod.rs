// Shared test support: a scriptable in-memory draft service and snapshot
// builders.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use groundgame_core::draft::{
    DraftState, LivePollResult, OnClockTeam, PickReceipt, PlayerWithMetrics, RequestParams,
    SessionId, SessionStatus, StartConfig,
};
use groundgame_core::error::ServiceError;
use groundgame_core::service::DraftService;
use tokio::sync::oneshot;

// ---------------------------------------------------------------------------
// MockDraftService
// ---------------------------------------------------------------------------

/// One recorded call to the service.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    FetchState(SessionId, RequestParams),
    SubmitPick(SessionId, String),
    SimulateCpuPick(SessionId),
    StartSession(StartConfig),
    PollLive(SessionId),
}

struct Reply<T> {
    result: Result<T, ServiceError>,
    gate: Option<oneshot::Receiver<()>>,
}

/// Draft service double.
///
/// Fetches answer from a per-parameter queue, falling back to the state set
/// with `set_state`. Mutations answer from their own queues and succeed with
/// an empty receipt when nothing is queued. Any reply can be gated: the call
/// does not return until the paired sender fires (or is dropped).
#[derive(Clone, Default)]
pub struct MockDraftService {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    calls: Vec<Call>,
    state: Option<DraftState>,
    fetches: HashMap<RequestParams, VecDeque<Reply<DraftState>>>,
    picks: VecDeque<Reply<PickReceipt>>,
    simulations: VecDeque<Reply<PickReceipt>>,
    polls: VecDeque<Reply<LivePollResult>>,
    starts: VecDeque<Reply<SessionId>>,
}

fn gated<T>(result: Result<T, ServiceError>) -> (Reply<T>, oneshot::Sender<()>) {
    let (tx, rx) = oneshot::channel();
    (
        Reply {
            result,
            gate: Some(rx),
        },
        tx,
    )
}

fn immediate<T>(result: Result<T, ServiceError>) -> Reply<T> {
    Reply { result, gate: None }
}

async fn deliver<T>(reply: Reply<T>) -> Result<T, ServiceError> {
    if let Some(gate) = reply.gate {
        let _ = gate.await;
    }
    reply.result
}

impl MockDraftService {
    pub fn new() -> Self {
        Self::default()
    }

    /// State returned by fetches with nothing queued for their parameters.
    pub fn set_state(&self, state: DraftState) {
        self.inner.lock().unwrap().state = Some(state);
    }

    pub fn queue_fetch(&self, params: RequestParams, result: Result<DraftState, ServiceError>) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .fetches
            .entry(params)
            .or_default()
            .push_back(immediate(result));
    }

    /// Queue a fetch reply for `params` that is held until the sender fires.
    pub fn queue_gated_fetch(
        &self,
        params: RequestParams,
        result: Result<DraftState, ServiceError>,
    ) -> oneshot::Sender<()> {
        let (reply, tx) = gated(result);
        let mut inner = self.inner.lock().unwrap();
        inner.fetches.entry(params).or_default().push_back(reply);
        tx
    }

    pub fn queue_pick(&self, result: Result<PickReceipt, ServiceError>) {
        self.inner.lock().unwrap().picks.push_back(immediate(result));
    }

    pub fn queue_gated_pick(&self, result: Result<PickReceipt, ServiceError>) -> oneshot::Sender<()> {
        let (reply, tx) = gated(result);
        self.inner.lock().unwrap().picks.push_back(reply);
        tx
    }

    pub fn queue_simulation(&self, result: Result<PickReceipt, ServiceError>) {
        self.inner
            .lock()
            .unwrap()
            .simulations
            .push_back(immediate(result));
    }

    pub fn queue_poll(&self, result: Result<LivePollResult, ServiceError>) {
        self.inner.lock().unwrap().polls.push_back(immediate(result));
    }

    pub fn queue_gated_poll(
        &self,
        result: Result<LivePollResult, ServiceError>,
    ) -> oneshot::Sender<()> {
        let (reply, tx) = gated(result);
        self.inner.lock().unwrap().polls.push_back(reply);
        tx
    }

    pub fn queue_start(&self, result: Result<SessionId, ServiceError>) {
        self.inner.lock().unwrap().starts.push_back(immediate(result));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn count_calls(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.inner.lock().unwrap().calls.iter().filter(|c| pred(c)).count()
    }
}

#[async_trait]
impl DraftService for MockDraftService {
    async fn fetch_state(
        &self,
        session_id: &SessionId,
        params: &RequestParams,
    ) -> Result<DraftState, ServiceError> {
        let reply = {
            let mut inner = self.inner.lock().unwrap();
            inner
                .calls
                .push(Call::FetchState(session_id.clone(), *params));
            let queued = inner.fetches.get_mut(params).and_then(VecDeque::pop_front);
            match queued {
                Some(reply) => reply,
                None => immediate(inner.state.clone().ok_or_else(|| ServiceError::Service {
                    status: 404,
                    message: "Draft session not found.".into(),
                })),
            }
        };
        deliver(reply).await.map(|mut state| {
            state.session_id = session_id.clone();
            state
        })
    }

    async fn submit_pick(
        &self,
        session_id: &SessionId,
        player_name: &str,
    ) -> Result<PickReceipt, ServiceError> {
        let reply = {
            let mut inner = self.inner.lock().unwrap();
            inner
                .calls
                .push(Call::SubmitPick(session_id.clone(), player_name.to_string()));
            inner
                .picks
                .pop_front()
                .unwrap_or_else(|| immediate(Ok(PickReceipt::default())))
        };
        deliver(reply).await
    }

    async fn simulate_cpu_pick(&self, session_id: &SessionId) -> Result<PickReceipt, ServiceError> {
        let reply = {
            let mut inner = self.inner.lock().unwrap();
            inner.calls.push(Call::SimulateCpuPick(session_id.clone()));
            inner
                .simulations
                .pop_front()
                .unwrap_or_else(|| immediate(Ok(PickReceipt::default())))
        };
        deliver(reply).await
    }

    async fn start_session(&self, config: &StartConfig) -> Result<SessionId, ServiceError> {
        let reply = {
            let mut inner = self.inner.lock().unwrap();
            inner.calls.push(Call::StartSession(config.clone()));
            inner.starts.pop_front().unwrap_or_else(|| {
                immediate(Err(ServiceError::Service {
                    status: 500,
                    message: "no start reply queued".into(),
                }))
            })
        };
        deliver(reply).await
    }

    async fn poll_live(&self, session_id: &SessionId) -> Result<LivePollResult, ServiceError> {
        let reply = {
            let mut inner = self.inner.lock().unwrap();
            inner.calls.push(Call::PollLive(session_id.clone()));
            inner
                .polls
                .pop_front()
                .unwrap_or_else(|| immediate(Ok(LivePollResult::default())))
        };
        deliver(reply).await
    }
}

// ---------------------------------------------------------------------------
// Snapshot builders
// ---------------------------------------------------------------------------

pub fn player(name: &str, pos: &str, adp: Option<f64>) -> PlayerWithMetrics {
    PlayerWithMetrics {
        normalized_name: name.to_lowercase(),
        display_name: name.to_string(),
        pos: pos.to_string(),
        team: None,
        adp,
        vorp: None,
        vona: None,
    }
}

pub fn default_players() -> Vec<PlayerWithMetrics> {
    vec![
        player("Christian McCaffrey", "RB", Some(1.2)),
        player("Tyreek Hill", "WR", Some(3.9)),
        player("Bijan Robinson", "RB", Some(4.8)),
    ]
}

/// In-progress snapshot with the user on the clock.
pub fn user_turn(pick: u32) -> DraftState {
    DraftState {
        session_id: SessionId::new("pending"),
        current_pick_num: pick,
        total_picks: 24,
        status: SessionStatus::InProgress,
        is_user_turn: true,
        on_clock_team: Some(OnClockTeam::Human { roster_id: None }),
        available_players: default_players(),
        drafted_players_count: pick - 1,
    }
}

/// In-progress snapshot with CPU team `team_index` on the clock.
pub fn cpu_turn(pick: u32, team_index: u32) -> DraftState {
    DraftState {
        is_user_turn: false,
        on_clock_team: Some(OnClockTeam::Cpu { team_index }),
        ..user_turn(pick)
    }
}

/// Live-draft snapshot with another manager on the clock.
pub fn other_team_turn(pick: u32, roster_id: &str) -> DraftState {
    DraftState {
        is_user_turn: false,
        on_clock_team: Some(OnClockTeam::Human {
            roster_id: Some(roster_id.to_string()),
        }),
        ..user_turn(pick)
    }
}

pub fn completed(total: u32) -> DraftState {
    DraftState {
        status: SessionStatus::Completed,
        is_user_turn: true,
        on_clock_team: None,
        available_players: Vec::new(),
        ..user_turn(total + 1)
    }
}

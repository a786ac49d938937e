// Application orchestration: the event loop that owns the draft session.
//
// Listens for user commands from the TUI, results of network calls made on
// spawned tasks, and the live-poll timer. Every network call is an `Effect`
// handed out by the session; its result comes back as an `AppEvent` tagged
// with the session epoch so results for a replaced session are dropped.

use std::sync::Arc;
use std::time::Duration;

use groundgame_core::config::SessionConfig;
use groundgame_core::draft::{SessionId, StartConfig};
use groundgame_core::error::ServiceError;
use groundgame_core::service::DraftService;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::protocol::{UiUpdate, UserCommand};
use crate::session::{DispatchRejection, DraftSession, Effect, SessionEvent, TurnPhase};

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Results reported back to the loop by spawned network tasks.
#[derive(Debug)]
pub enum AppEvent {
    Session {
        epoch: u64,
        event: SessionEvent,
    },
    Started {
        attempt: u64,
        live: bool,
        result: Result<SessionId, ServiceError>,
    },
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState {
    pub service: Arc<dyn DraftService>,
    pub session: Option<DraftSession>,
    /// Incremented every time a session is entered. Events carrying an older
    /// epoch belong to a session that has been torn down.
    pub epoch: u64,
    /// Incremented for every start request; only the newest may navigate.
    pub start_attempt: u64,
    pub live_poll_interval: Duration,
    /// Sender cloned into spawned tasks to report results back to the loop.
    pub event_tx: mpsc::Sender<AppEvent>,
}

impl AppState {
    pub fn new(
        service: Arc<dyn DraftService>,
        config: &SessionConfig,
        event_tx: mpsc::Sender<AppEvent>,
    ) -> Self {
        AppState {
            service,
            session: None,
            epoch: 0,
            start_attempt: 0,
            live_poll_interval: Duration::from_secs(config.live_poll_interval_secs.max(1)),
            event_tx,
        }
    }

    /// Tear down the current session (if any) and enter `session_id`.
    pub fn enter_session(&mut self, session_id: SessionId, live: bool) {
        self.close_session();
        self.epoch += 1;
        info!(session = %session_id, live, epoch = self.epoch, "entering session");

        let mut session = DraftSession::new(session_id, live);
        let initial = session.refresh();
        self.session = Some(session);
        if let Ok(effect) = initial {
            self.spawn_effects(vec![effect]);
        }
    }

    pub fn close_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.tear_down();
        }
    }

    /// Run each effect on its own task; results come back over `event_tx`.
    pub fn spawn_effects(&self, effects: Vec<Effect>) {
        let Some(session) = &self.session else {
            return;
        };
        for effect in effects {
            let service = Arc::clone(&self.service);
            let tx = self.event_tx.clone();
            let session_id = session.id().clone();
            let epoch = self.epoch;
            tokio::spawn(async move {
                let event = execute(service.as_ref(), &session_id, effect).await;
                // The loop may have exited; nothing left to inform.
                let _ = tx.send(AppEvent::Session { epoch, event }).await;
            });
        }
    }

    fn spawn_start(&mut self, config: StartConfig) {
        self.start_attempt += 1;
        let attempt = self.start_attempt;
        let service = Arc::clone(&self.service);
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let live = config.is_live();
            let result = service.start_session(&config).await;
            let _ = tx.send(AppEvent::Started { attempt, live, result }).await;
        });
    }
}

/// Perform one effect against the service.
pub async fn execute(
    service: &dyn DraftService,
    session_id: &SessionId,
    effect: Effect,
) -> SessionEvent {
    match effect {
        Effect::Fetch(ticket) => SessionEvent::Fetched {
            ticket,
            result: service.fetch_state(session_id, &ticket.params).await,
        },
        Effect::SubmitPick { player_name } => {
            let result = service.submit_pick(session_id, &player_name).await;
            SessionEvent::PickSubmitted {
                player_name,
                result,
            }
        }
        Effect::SimulateCpuPick => SessionEvent::CpuPickSimulated {
            result: service.simulate_cpu_pick(session_id).await,
        },
        Effect::PollLive => SessionEvent::LivePolled {
            result: service.poll_live(session_id).await,
        },
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the application event loop until `Quit` or the command channel closes.
///
/// Listens on three sources using `tokio::select!`:
/// 1. User commands from the TUI
/// 2. Results from spawned network tasks
/// 3. The live-poll timer
pub async fn run(
    mut event_rx: mpsc::Receiver<AppEvent>,
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    let mut poll_interval = tokio::time::interval(state.live_poll_interval);
    poll_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately; consume it so the first poll
    // happens one full interval after startup.
    poll_interval.tick().await;

    loop {
        tokio::select! {
            // --- User commands ---
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => {
                        handle_user_command(&mut state, cmd, &ui_tx).await;
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }

            // --- Network results ---
            event = event_rx.recv() => {
                match event {
                    Some(event) => handle_app_event(&mut state, event, &ui_tx).await,
                    None => {
                        warn!("Event channel closed, shutting down");
                        break;
                    }
                }
            }

            // --- Live draft polling ---
            _ = poll_interval.tick() => {
                handle_poll_tick(&mut state, &ui_tx).await;
            }
        }
    }

    state.close_session();
    info!("Application event loop exiting");
    Ok(())
}

async fn push_view(state: &AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    if let Some(session) = &state.session {
        let _ = ui_tx
            .send(UiUpdate::Session(Box::new(session.view())))
            .await;
    }
}

/// Run a session action; a rejection becomes a transient notice.
async fn dispatch<F>(state: &mut AppState, ui_tx: &mpsc::Sender<UiUpdate>, action: F)
where
    F: FnOnce(&mut DraftSession) -> Result<Option<Effect>, DispatchRejection>,
{
    let Some(session) = state.session.as_mut() else {
        debug!("No active session, command ignored");
        return;
    };
    match action(session) {
        Ok(Some(effect)) => state.spawn_effects(vec![effect]),
        Ok(None) => {}
        Err(rejection) => {
            debug!(%rejection, "Action rejected");
            session.set_notice(rejection.to_string());
        }
    }
    push_view(state, ui_tx).await;
}

/// Handle a user command from the TUI.
async fn handle_user_command(
    state: &mut AppState,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    match cmd {
        UserCommand::StartSession(config) => {
            info!("Starting session ({})", config);
            state.spawn_start(config);
            let _ = ui_tx.send(UiUpdate::Starting).await;
        }
        UserCommand::OpenSession { session_id, live } => {
            state.enter_session(session_id, live);
            push_view(state, ui_tx).await;
        }
        UserCommand::LeaveSession => {
            state.close_session();
            let _ = ui_tx.send(UiUpdate::SessionClosed).await;
        }
        UserCommand::SetPositionFilter(filter) => {
            dispatch(state, ui_tx, |s| s.set_position_filter(filter)).await;
        }
        UserCommand::SetSortBy(sort) => {
            dispatch(state, ui_tx, |s| s.set_sort_by(sort)).await;
        }
        UserCommand::SubmitPick(player_name) => {
            dispatch(state, ui_tx, |s| s.submit_pick(&player_name).map(Some)).await;
        }
        UserCommand::SimulateCpuPick => {
            dispatch(state, ui_tx, |s| s.simulate_cpu_pick().map(Some)).await;
        }
        UserCommand::Refresh => {
            dispatch(state, ui_tx, |s| s.refresh().map(Some)).await;
        }
        UserCommand::PollLive => {
            dispatch(state, ui_tx, |s| s.poll_live().map(Some)).await;
        }
        UserCommand::Quit => {
            // Handled in the main loop
        }
    }
}

/// Handle a result reported by a spawned task.
async fn handle_app_event(state: &mut AppState, event: AppEvent, ui_tx: &mpsc::Sender<UiUpdate>) {
    match event {
        AppEvent::Session { epoch, event } => {
            if epoch != state.epoch {
                debug!(
                    "Discarding result for closed session (event epoch: {}, current: {})",
                    epoch, state.epoch
                );
                return;
            }
            let Some(session) = state.session.as_mut() else {
                return;
            };
            let follow_up = session.handle(event);
            state.spawn_effects(follow_up);
            push_view(state, ui_tx).await;
        }
        AppEvent::Started {
            attempt,
            live,
            result,
        } => {
            if attempt != state.start_attempt {
                debug!(attempt, newest = state.start_attempt, "Discarding superseded start result");
                return;
            }
            match result {
                Ok(session_id) => {
                    state.enter_session(session_id, live);
                    push_view(state, ui_tx).await;
                }
                Err(error) => {
                    warn!(%error, "Session start failed");
                    let _ = ui_tx.send(UiUpdate::StartFailed(error)).await;
                }
            }
        }
    }
}

/// Dispatch a live poll when the session allows one. Silent when it does not.
///
/// Nothing is scheduled while the user is on the clock; `l` still syncs by hand.
async fn handle_poll_tick(state: &mut AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let Some(session) = state.session.as_mut() else {
        return;
    };
    if !session.is_live()
        || session.phase() == TurnPhase::AwaitingUserPick
        || !session.legal_actions().poll_live
    {
        return;
    }
    match session.poll_live() {
        Ok(effect) => {
            state.spawn_effects(vec![effect]);
            push_view(state, ui_tx).await;
        }
        Err(rejection) => debug!(%rejection, "Live poll skipped"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

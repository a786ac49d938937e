// End-to-end keyboard flow: key presses go through the input handler to the
// real app loop, and its updates are folded back into the view state, with
// an in-memory draft service standing in for the network.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use groundgame_app::app::{self, AppState};
use groundgame_app::protocol::{UiUpdate, UserCommand};
use groundgame_app::session::TurnPhase;
use groundgame_core::config::SessionConfig;
use groundgame_core::draft::{
    DraftState, LivePollResult, OnClockTeam, PickReceipt, PlayerWithMetrics, RequestParams,
    SessionId, SessionStatus, StartConfig,
};
use groundgame_core::error::{InvalidPickReason, ServiceError};
use groundgame_core::service::DraftService;
use groundgame_tui::tui::input::handle_key;
use groundgame_tui::tui::widgets::turn_panel::turn_message;
use groundgame_tui::tui::{Screen, ViewState};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

// ---------------------------------------------------------------------------
// In-memory service
// ---------------------------------------------------------------------------

/// A 12-team draft where the user alternates with CPU team 2.
struct AlternatingDraft {
    state: Mutex<DraftState>,
}

fn player(name: &str, pos: &str) -> PlayerWithMetrics {
    PlayerWithMetrics {
        normalized_name: name.to_lowercase(),
        display_name: name.to_string(),
        pos: pos.to_string(),
        team: None,
        adp: Some(1.0),
        vorp: None,
        vona: None,
    }
}

impl AlternatingDraft {
    fn new() -> Self {
        AlternatingDraft {
            state: Mutex::new(DraftState {
                session_id: SessionId::new("sim-1"),
                current_pick_num: 1,
                total_picks: 24,
                status: SessionStatus::InProgress,
                is_user_turn: true,
                on_clock_team: Some(OnClockTeam::Human { roster_id: None }),
                available_players: vec![
                    player("Christian McCaffrey", "RB"),
                    player("Tyreek Hill", "WR"),
                    player("Bijan Robinson", "RB"),
                ],
                drafted_players_count: 0,
            }),
        }
    }

    fn advance(&self, name: Option<&str>) {
        let mut state = self.state.lock().unwrap();
        state.current_pick_num += 1;
        state.drafted_players_count += 1;
        match name {
            Some(name) => state.available_players.retain(|p| p.display_name != name),
            None => {
                state.available_players.remove(0);
            }
        }
        if state.is_user_turn {
            state.is_user_turn = false;
            state.on_clock_team = Some(OnClockTeam::Cpu { team_index: 1 });
        } else {
            state.is_user_turn = true;
            state.on_clock_team = Some(OnClockTeam::Human { roster_id: None });
        }
    }
}

#[async_trait]
impl DraftService for AlternatingDraft {
    async fn fetch_state(
        &self,
        session_id: &SessionId,
        _params: &RequestParams,
    ) -> Result<DraftState, ServiceError> {
        let mut state = self.state.lock().unwrap().clone();
        state.session_id = session_id.clone();
        Ok(state)
    }

    async fn submit_pick(
        &self,
        _session_id: &SessionId,
        player_name: &str,
    ) -> Result<PickReceipt, ServiceError> {
        let known = self
            .state
            .lock()
            .unwrap()
            .available_players
            .iter()
            .any(|p| p.display_name == player_name);
        if !known {
            return Err(ServiceError::InvalidPick {
                player_name: player_name.to_string(),
                reason: InvalidPickReason::Unrecognized,
                message: "Player not found".into(),
            });
        }
        self.advance(Some(player_name));
        Ok(PickReceipt {
            player_name: Some(player_name.to_string()),
            ..PickReceipt::default()
        })
    }

    async fn simulate_cpu_pick(&self, _session_id: &SessionId) -> Result<PickReceipt, ServiceError> {
        self.advance(None);
        Ok(PickReceipt::default())
    }

    async fn start_session(&self, config: &StartConfig) -> Result<SessionId, ServiceError> {
        config.validate()?;
        Ok(SessionId::new("sim-1"))
    }

    async fn poll_live(&self, _session_id: &SessionId) -> Result<LivePollResult, ServiceError> {
        Ok(LivePollResult::default())
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

struct Harness {
    view: ViewState,
    cmd_tx: mpsc::Sender<UserCommand>,
    ui_rx: mpsc::Receiver<UiUpdate>,
    handle: JoinHandle<anyhow::Result<()>>,
}

impl Harness {
    fn start() -> Self {
        let (event_tx, event_rx) = mpsc::channel(64);
        let (cmd_tx, cmd_rx) = mpsc::channel(64);
        let (ui_tx, ui_rx) = mpsc::channel(256);
        let config = SessionConfig {
            live_poll_interval_secs: 5,
        };
        let state = AppState::new(Arc::new(AlternatingDraft::new()), &config, event_tx);
        let handle = tokio::spawn(app::run(event_rx, cmd_rx, ui_tx, state));
        Harness {
            view: ViewState::default(),
            cmd_tx,
            ui_rx,
            handle,
        }
    }

    async fn press(&mut self, code: KeyCode) {
        let key = KeyEvent::new(code, KeyModifiers::NONE);
        if let Some(cmd) = handle_key(key, &mut self.view) {
            self.cmd_tx.send(cmd).await.unwrap();
        }
    }

    async fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            self.press(KeyCode::Char(c)).await;
        }
    }

    /// Apply updates until `pred` holds for the view state.
    async fn settle(&mut self, pred: impl Fn(&ViewState) -> bool) {
        tokio::time::timeout(Duration::from_secs(10), async {
            while !pred(&self.view) {
                let update = self.ui_rx.recv().await.expect("app loop exited");
                self.view.apply_ui_update(update);
            }
        })
        .await
        .expect("view never settled");
    }
}

/// Settled on a snapshot at `pick` with nothing in flight.
fn at_pick(pick: u32) -> impl Fn(&ViewState) -> bool {
    move |state| {
        state.session.as_ref().is_some_and(|v| {
            !v.fetch_pending
                && !matches!(v.phase, TurnPhase::Mutating(_))
                && v.snapshot.as_ref().is_some_and(|s| s.current_pick_num == pick)
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn start_pick_simulate_and_leave_with_the_keyboard() {
    let mut h = Harness::start();

    // Default form values start a simulation.
    h.press(KeyCode::Enter).await;
    h.settle(at_pick(1)).await;
    assert_eq!(h.view.screen, Screen::Session);
    let view = h.view.session.clone().unwrap();
    assert_eq!(view.session_id, SessionId::new("sim-1"));
    assert_eq!(turn_message(&view), "It's YOUR turn!");

    // Draft a player.
    h.press(KeyCode::Char('p')).await;
    h.type_text("Christian McCaffrey").await;
    h.press(KeyCode::Enter).await;
    h.settle(at_pick(2)).await;
    let view = h.view.session.clone().unwrap();
    assert_eq!(turn_message(&view), "CPU (Team 2) is on the clock.");
    assert_eq!(view.snapshot.as_ref().unwrap().drafted_players_count, 1);
    assert!(h.view.pick.text.is_empty());
    assert_eq!(view.notice.as_deref(), Some("Drafted Christian McCaffrey"));

    // Let the CPU pick.
    h.press(KeyCode::Char('s')).await;
    h.settle(at_pick(3)).await;
    assert_eq!(h.view.session.as_ref().unwrap().phase, TurnPhase::AwaitingUserPick);

    // Leave and quit.
    h.press(KeyCode::Esc).await;
    h.settle(|state| state.screen == Screen::Start).await;
    assert!(h.view.session.is_none());

    h.cmd_tx.send(UserCommand::Quit).await.unwrap();
    h.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn invalid_pick_keeps_the_typed_name() {
    let mut h = Harness::start();
    h.press(KeyCode::Enter).await;
    h.settle(at_pick(1)).await;

    h.press(KeyCode::Char('p')).await;
    h.type_text("Nonexistent Player").await;
    h.press(KeyCode::Enter).await;
    h.settle(|state| {
        at_pick(1)(state) && state.session.as_ref().is_some_and(|v| v.error.is_some())
    })
    .await;

    let view = h.view.session.clone().unwrap();
    assert_eq!(view.phase, TurnPhase::AwaitingUserPick);
    assert_eq!(h.view.pick.text, "Nonexistent Player");
    assert_eq!(
        view.error.unwrap().message(),
        "No player named \"Nonexistent Player\". Check the spelling."
    );
}

#[tokio::test]
async fn invalid_start_form_never_leaves_the_start_screen() {
    let mut h = Harness::start();

    // Switch to Live Helper and submit without a draft id.
    h.press(KeyCode::Right).await;
    h.press(KeyCode::Enter).await;
    assert_eq!(h.view.screen, Screen::Start);
    assert_eq!(
        h.view.start_form.error.as_deref(),
        Some("draft_id must not be empty")
    );

    h.cmd_tx.send(UserCommand::Quit).await.unwrap();
    h.handle.await.unwrap().unwrap();
}

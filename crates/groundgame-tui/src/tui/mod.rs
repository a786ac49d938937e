// Terminal UI: view state, frame rendering and the main render loop.
//
// The TUI owns the terminal. It receives `UiUpdate`s from the app loop,
// folds them into `ViewState`, redraws on a fixed tick and forwards key
// presses as `UserCommand`s.

pub mod input;
pub mod layout;
pub mod start_form;
pub mod widgets;

use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use tokio::sync::mpsc;
use tracing::debug;

use groundgame_app::protocol::{SessionView, UiUpdate, UserCommand};
use groundgame_app::session::{MutationKind, TurnPhase};

use layout::{build_layout, build_start_layout};
use start_form::StartForm;

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Screen {
    /// Entry forms.
    #[default]
    Start,
    /// A draft session, or the loading placeholder before its first view.
    Session,
}

/// Local edit buffer for the pick input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PickEditor {
    pub text: String,
    /// Key presses go into `text` instead of the session shortcuts.
    pub editing: bool,
}

/// Everything the renderer needs, owned by the TUI task.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub screen: Screen,
    pub start_form: StartForm,
    pub session: Option<SessionView>,
    pub pick: PickEditor,
    /// First visible row of the players table.
    pub scroll_offset: usize,
    pub confirm_quit: bool,
}

impl ViewState {
    pub fn new(start_form: StartForm) -> Self {
        ViewState {
            start_form,
            ..ViewState::default()
        }
    }

    /// Fold one update from the app loop into the view.
    pub fn apply_ui_update(&mut self, update: UiUpdate) {
        match update {
            UiUpdate::Session(view) => self.apply_session_view(*view),
            UiUpdate::Starting => {
                self.start_form.pending = true;
                self.start_form.error = None;
            }
            UiUpdate::StartFailed(error) => {
                self.start_form.pending = false;
                self.start_form.error = Some(error.user_message());
            }
            UiUpdate::SessionClosed => {
                self.screen = Screen::Start;
                self.session = None;
                self.pick = PickEditor::default();
                self.scroll_offset = 0;
            }
        }
    }

    fn apply_session_view(&mut self, view: SessionView) {
        let submitting = TurnPhase::Mutating(MutationKind::SubmitPick);
        match self.session.take() {
            Some(prev) if prev.session_id == view.session_id => {
                // The session decides what survives a submission: cleared on
                // success, kept for correction on failure.
                if prev.phase == submitting && view.phase != submitting {
                    self.pick.text = view.pick_input.clone();
                }
                if prev.applied != view.applied {
                    self.scroll_offset = 0;
                }
            }
            _ => {
                self.pick = PickEditor {
                    text: view.pick_input.clone(),
                    editing: false,
                };
                self.scroll_offset = 0;
            }
        }

        // A live sync leaves the editor alone; only a request that uses the
        // turn, or a snapshot showing the turn has moved on, closes it.
        if matches!(
            view.phase,
            TurnPhase::Mutating(_)
                | TurnPhase::AwaitingCpuSimulation
                | TurnPhase::WaitingOnOtherTeam
                | TurnPhase::Completed
        ) {
            self.pick.editing = false;
        }
        self.scroll_offset = self.scroll_offset.min(widgets::available::max_scroll(&view));
        self.start_form.pending = false;
        self.screen = Screen::Session;
        self.session = Some(view);
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render_frame(frame: &mut Frame, state: &ViewState) {
    match state.screen {
        Screen::Start => {
            let layout = build_start_layout(frame.area());
            start_form::render(frame, layout.form, &state.start_form);
            render_help_bar(frame, layout.help_bar, &help_text(state));
        }
        Screen::Session => {
            let layout = build_layout(frame.area());
            match state.session {
                Some(ref view) => {
                    widgets::status_bar::render(frame, layout.status_bar, view);
                    widgets::turn_panel::render(frame, layout.turn_panel, view, &state.pick);
                    widgets::available::render(frame, layout.players, view, state.scroll_offset);
                }
                None => {
                    let placeholder = Paragraph::new("Opening draft session...")
                        .block(Block::default().borders(Borders::ALL).title("Turn"));
                    frame.render_widget(placeholder, layout.turn_panel);
                }
            }
            render_help_bar(frame, layout.help_bar, &help_text(state));
        }
    }

    if state.confirm_quit {
        widgets::quit_confirm::render(frame, frame.area());
    }
}

fn render_help_bar(frame: &mut Frame, area: ratatui::layout::Rect, text: &str) {
    let paragraph = Paragraph::new(Line::from(vec![Span::styled(
        text.to_string(),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::DIM),
    )]))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

/// Key hints for the current screen and mode.
pub fn help_text(state: &ViewState) -> String {
    match state.screen {
        Screen::Start => {
            " Tab/↑↓:Field | ←→/Space:Change | Enter:Start | Esc:Quit".to_string()
        }
        Screen::Session if state.pick.editing => {
            " Enter:Submit pick | Esc:Stop editing | Backspace:Delete".to_string()
        }
        Screen::Session => {
            let live = state.session.as_ref().is_some_and(|v| v.live);
            let mut text = String::from(" p:Pick | s:Simulate CPU | f/F:Filter | o:Sort | r:Refresh");
            if live {
                text.push_str(" | l:Sync");
            }
            text.push_str(" | ↑↓:Scroll | Esc:Leave | q:Quit");
            text
        }
    }
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the terminal UI until the user quits or the app loop goes away.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
    mut view_state: ViewState,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    // Restore the terminal before the default hook prints a panic.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();
        original_hook(panic_info);
    }));

    let mut event_stream = EventStream::new();

    // ~30fps
    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result = loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => view_state.apply_ui_update(ui_update),
                    None => {
                        debug!("UI channel closed, leaving render loop");
                        break Ok(());
                    }
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let quit = cmd == UserCommand::Quit;
                            let _ = cmd_tx.send(cmd).await;
                            if quit {
                                break Ok(());
                            }
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break Err(anyhow::Error::new(e).context("terminal input error")),
                    None => break Ok(()),
                }
            }

            _ = render_tick.tick() => {
                if let Err(e) = terminal.draw(|frame| render_frame(frame, &view_state)) {
                    break Err(anyhow::Error::new(e).context("failed to draw frame"));
                }
            }
        }
    };

    ratatui::restore();
    result
}

// ---------------------------------------------------------------------------
// Test support
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod test_support {
    use groundgame_app::protocol::SessionView;
    use groundgame_app::session::{LegalActions, TurnPhase};
    use groundgame_core::draft::{
        DraftState, OnClockTeam, PlayerWithMetrics, RequestParams, SessionId, SessionStatus,
    };

    fn player(name: &str, pos: &str, team: &str, adp: f64, vorp: f64) -> PlayerWithMetrics {
        PlayerWithMetrics {
            normalized_name: name.to_lowercase(),
            display_name: name.to_string(),
            pos: pos.to_string(),
            team: Some(team.to_string()),
            adp: Some(adp),
            vorp: Some(vorp),
            vona: Some(vorp / 2.0),
        }
    }

    pub fn snapshot(pick: u32, total: u32, user_turn: bool) -> DraftState {
        DraftState {
            session_id: SessionId::new("test-session"),
            current_pick_num: pick,
            total_picks: total,
            status: SessionStatus::InProgress,
            is_user_turn: user_turn,
            on_clock_team: Some(OnClockTeam::Human { roster_id: None }),
            available_players: vec![
                player("Christian McCaffrey", "RB", "SF", 1.2, 98.4),
                player("Tyreek Hill", "WR", "MIA", 3.9, 80.1),
                player("Bijan Robinson", "RB", "ATL", 4.8, 75.0),
            ],
            drafted_players_count: pick - 1,
        }
    }

    pub fn cpu_snapshot(pick: u32, team_index: u32) -> DraftState {
        DraftState {
            on_clock_team: Some(OnClockTeam::Cpu { team_index }),
            ..snapshot(pick, 24, false)
        }
    }

    pub fn completed_snapshot(total: u32) -> DraftState {
        DraftState {
            status: SessionStatus::Completed,
            on_clock_team: None,
            available_players: Vec::new(),
            ..snapshot(total + 1, total, true)
        }
    }

    /// A settled view of `snapshot` with default query parameters applied.
    pub fn session_view(snapshot: Option<DraftState>) -> SessionView {
        let phase = TurnPhase::from_parts(snapshot.as_ref(), None);
        let applied = snapshot.as_ref().map(|_| RequestParams::default());
        SessionView {
            session_id: SessionId::new("test-session"),
            live: false,
            snapshot,
            phase,
            legal: LegalActions::for_phase(phase, false, false),
            requested: RequestParams::default(),
            applied,
            fetch_pending: false,
            live_sync_pending: false,
            fetched_at: None,
            error: None,
            notice: None,
            pick_input: String::new(),
        }
    }

    pub fn with_phase(mut view: SessionView, phase: TurnPhase) -> SessionView {
        view.phase = phase;
        view.legal = LegalActions::for_phase(phase, view.live, view.live_sync_pending);
        view
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::test_support::{completed_snapshot, session_view, snapshot, with_phase};
    use super::*;
    use groundgame_core::draft::SessionId;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use groundgame_core::error::{InvalidPickReason, ServiceError};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn session_update(view: SessionView) -> UiUpdate {
        UiUpdate::Session(Box::new(view))
    }

    fn screen_text(state: &ViewState) -> String {
        let backend = TestBackend::new(100, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render_frame(frame, state))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn view_state_default_is_sensible() {
        let state = ViewState::default();
        assert_eq!(state.screen, Screen::Start);
        assert!(state.session.is_none());
        assert_eq!(state.pick, PickEditor::default());
        assert_eq!(state.scroll_offset, 0);
        assert!(!state.confirm_quit);
        assert!(!state.start_form.pending);
    }

    #[test]
    fn session_update_navigates_and_clears_pending() {
        let mut state = ViewState::default();
        state.apply_ui_update(UiUpdate::Starting);
        assert!(state.start_form.pending);

        state.apply_ui_update(session_update(session_view(Some(snapshot(1, 24, true)))));
        assert_eq!(state.screen, Screen::Session);
        assert!(!state.start_form.pending);
    }

    #[test]
    fn start_failure_stays_on_the_form() {
        let mut state = ViewState::default();
        state.apply_ui_update(UiUpdate::Starting);
        state.apply_ui_update(UiUpdate::StartFailed(ServiceError::validation(
            "pick_slot",
            "must be between 1 and 12",
        )));
        assert_eq!(state.screen, Screen::Start);
        assert!(!state.start_form.pending);
        assert_eq!(
            state.start_form.error.as_deref(),
            Some("pick_slot must be between 1 and 12")
        );
    }

    #[test]
    fn successful_submission_clears_the_pick_text() {
        let mut state = ViewState::default();
        state.apply_ui_update(session_update(session_view(Some(snapshot(1, 24, true)))));
        state.pick.text = "Christian McCaffrey".into();

        let mut mutating = with_phase(
            session_view(Some(snapshot(1, 24, true))),
            TurnPhase::Mutating(MutationKind::SubmitPick),
        );
        mutating.pick_input = "Christian McCaffrey".into();
        state.apply_ui_update(session_update(mutating));
        assert_eq!(state.pick.text, "Christian McCaffrey");

        state.apply_ui_update(session_update(session_view(Some(snapshot(2, 24, false)))));
        assert!(state.pick.text.is_empty());
    }

    #[test]
    fn failed_submission_keeps_the_pick_text() {
        let mut state = ViewState::default();
        let mut mutating = with_phase(
            session_view(Some(snapshot(1, 24, true))),
            TurnPhase::Mutating(MutationKind::SubmitPick),
        );
        mutating.pick_input = "Nonexistent Player".into();
        state.apply_ui_update(session_update(mutating));

        let mut failed = session_view(Some(snapshot(1, 24, true)));
        failed.pick_input = "Nonexistent Player".into();
        failed.error = Some(groundgame_app::session::SessionError::mutation(
            MutationKind::SubmitPick,
            ServiceError::InvalidPick {
                player_name: "Nonexistent Player".into(),
                reason: InvalidPickReason::Unrecognized,
                message: "Player not found".into(),
            },
        ));
        state.apply_ui_update(session_update(failed));
        assert_eq!(state.pick.text, "Nonexistent Player");
        assert!(screen_text(&state).contains("No player named \"Nonexistent Player\""));
    }

    #[test]
    fn editing_stops_when_the_turn_passes() {
        let mut state = ViewState::default();
        state.apply_ui_update(session_update(session_view(Some(snapshot(1, 24, true)))));
        state.pick.editing = true;
        state.apply_ui_update(session_update(session_view(Some(snapshot(2, 24, false)))));
        assert!(!state.pick.editing);
    }

    #[test]
    fn live_sync_keeps_the_pick_editor_open() {
        let mut live = session_view(Some(snapshot(5, 24, true)));
        live.live = true;
        live.legal = groundgame_app::session::LegalActions::for_phase(live.phase, true, false);
        let mut state = ViewState::default();
        state.apply_ui_update(session_update(live.clone()));

        input::handle_key(key(KeyCode::Char('p')), &mut state);
        for c in "Bija".chars() {
            input::handle_key(key(KeyCode::Char(c)), &mut state);
        }
        assert!(state.pick.editing);

        let mut syncing = live;
        syncing.live_sync_pending = true;
        syncing.legal.poll_live = false;
        state.apply_ui_update(session_update(syncing));
        assert!(state.pick.editing);

        assert_eq!(input::handle_key(key(KeyCode::Char('b')), &mut state), None);
        assert_eq!(state.pick.text, "Bijab");
        assert_eq!(state.screen, Screen::Session);
        assert!(screen_text(&state).contains("syncing"));
    }

    #[test]
    fn submission_closes_the_pick_editor() {
        let mut state = ViewState::default();
        state.apply_ui_update(session_update(session_view(Some(snapshot(1, 24, true)))));
        state.pick.editing = true;
        state.apply_ui_update(session_update(with_phase(
            session_view(Some(snapshot(1, 24, true))),
            TurnPhase::Mutating(MutationKind::SubmitPick),
        )));
        assert!(!state.pick.editing);
    }

    #[test]
    fn switching_sessions_resets_local_state() {
        let mut state = ViewState::default();
        state.apply_ui_update(session_update(session_view(Some(snapshot(1, 24, true)))));
        state.pick.text = "Tyreek".into();
        state.scroll_offset = 2;

        let mut other = session_view(Some(snapshot(1, 24, true)));
        other.session_id = SessionId::new("other");
        state.apply_ui_update(session_update(other));
        assert!(state.pick.text.is_empty());
        assert_eq!(state.scroll_offset, 0);
    }

    #[test]
    fn session_closed_returns_to_start() {
        let mut state = ViewState::default();
        state.apply_ui_update(session_update(session_view(Some(snapshot(1, 24, true)))));
        state.apply_ui_update(UiUpdate::SessionClosed);
        assert_eq!(state.screen, Screen::Start);
        assert!(state.session.is_none());
    }

    #[test]
    fn session_screen_renders_header_turn_and_table() {
        let mut state = ViewState::default();
        state.apply_ui_update(session_update(session_view(Some(snapshot(5, 24, true)))));
        let text = screen_text(&state);
        assert!(text.contains("Pick 5 of 24 | Drafted: 4"));
        assert!(text.contains("It's YOUR turn!"));
        assert!(text.contains("Christian McCaffrey"));
        assert!(text.contains("p:Pick"));
    }

    #[test]
    fn completed_session_renders_banner() {
        let mut state = ViewState::default();
        state.apply_ui_update(session_update(session_view(Some(completed_snapshot(24)))));
        assert!(screen_text(&state).contains("Draft complete!"));
    }

    #[test]
    fn session_placeholder_before_first_view() {
        let state = ViewState {
            screen: Screen::Session,
            ..ViewState::default()
        };
        assert!(screen_text(&state).contains("Opening draft session..."));
    }

    #[test]
    fn start_screen_and_quit_overlay_render() {
        let mut state = ViewState::default();
        assert!(screen_text(&state).contains("New Draft: Simulation"));
        state.confirm_quit = true;
        assert!(screen_text(&state).contains("Really quit?"));
    }

    #[test]
    fn help_mentions_sync_only_for_live_sessions() {
        let mut state = ViewState::default();
        state.apply_ui_update(session_update(session_view(Some(snapshot(1, 24, true)))));
        assert!(!help_text(&state).contains("l:Sync"));

        let mut live = session_view(Some(snapshot(1, 24, true)));
        live.live = true;
        state.apply_ui_update(session_update(live));
        assert!(help_text(&state).contains("l:Sync"));
    }
}

// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages for the app
// loop, or into local ViewState mutations (pick editing, scrolling, the
// start form). Controls the turn gate disables are ignored here.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use groundgame_app::protocol::UserCommand;

use super::widgets::available;
use super::{Screen, ViewState};

const PAGE: usize = 10;

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should be forwarded to the
/// app loop. Returns `None` when it was handled locally.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // Ignore Release/Repeat so each physical key press is handled once.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    // Ctrl+C always quits, whatever mode is active.
    if key_event.modifiers.contains(KeyModifiers::CONTROL)
        && key_event.code == KeyCode::Char('c')
    {
        return Some(UserCommand::Quit);
    }

    if view_state.confirm_quit {
        return handle_confirm_quit(key_event, view_state);
    }

    match view_state.screen {
        Screen::Start => handle_start_key(key_event, view_state),
        Screen::Session if view_state.pick.editing => handle_pick_editing(key_event, view_state),
        Screen::Session => handle_session_key(key_event, view_state),
    }
}

/// Quit confirmation: `y`/`q` confirm, `n`/Esc cancel, everything else is
/// swallowed.
fn handle_confirm_quit(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('q') => Some(UserCommand::Quit),
        KeyCode::Char('n') | KeyCode::Esc => {
            view_state.confirm_quit = false;
            None
        }
        _ => None,
    }
}

fn handle_start_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Esc => {
            view_state.confirm_quit = true;
            None
        }
        KeyCode::Char('q') if !view_state.start_form.is_typing() => {
            view_state.confirm_quit = true;
            None
        }
        _ => view_state.start_form.handle_key(key_event),
    }
}

/// Pick input mode: printable characters edit the name, Enter submits,
/// Esc stops editing and keeps the text.
fn handle_pick_editing(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    let pick = &mut view_state.pick;
    match key_event.code {
        KeyCode::Enter => {
            pick.editing = false;
            if pick.text.trim().is_empty() {
                None
            } else {
                Some(UserCommand::SubmitPick(pick.text.clone()))
            }
        }
        KeyCode::Esc => {
            pick.editing = false;
            None
        }
        KeyCode::Backspace => {
            pick.text.pop();
            None
        }
        KeyCode::Char(c) => {
            pick.text.push(c);
            None
        }
        _ => None,
    }
}

fn handle_session_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    let (legal, requested) = match view_state.session {
        Some(ref view) => (view.legal, view.requested),
        None => Default::default(),
    };

    match key_event.code {
        KeyCode::Char('q') => {
            view_state.confirm_quit = true;
            None
        }
        KeyCode::Esc | KeyCode::Char('b') => Some(UserCommand::LeaveSession),
        KeyCode::Char('p') | KeyCode::Enter => {
            if legal.submit_pick {
                view_state.pick.editing = true;
            }
            None
        }
        KeyCode::Char('s') if legal.simulate_cpu_pick => Some(UserCommand::SimulateCpuPick),
        KeyCode::Char('f') if legal.change_query => Some(UserCommand::SetPositionFilter(
            requested.effective_filter().next(),
        )),
        KeyCode::Char('F') if legal.change_query => Some(UserCommand::SetPositionFilter(
            requested.effective_filter().prev(),
        )),
        KeyCode::Char('o') if legal.change_query => {
            Some(UserCommand::SetSortBy(requested.sort_by.next()))
        }
        KeyCode::Char('r') => Some(UserCommand::Refresh),
        KeyCode::Char('l') if legal.poll_live => Some(UserCommand::PollLive),
        KeyCode::Up | KeyCode::Char('k') => {
            scroll_up(view_state, 1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            scroll_down(view_state, 1);
            None
        }
        KeyCode::PageUp => {
            scroll_up(view_state, PAGE);
            None
        }
        KeyCode::PageDown => {
            scroll_down(view_state, PAGE);
            None
        }
        _ => None,
    }
}

fn scroll_up(view_state: &mut ViewState, lines: usize) {
    view_state.scroll_offset = view_state.scroll_offset.saturating_sub(lines);
}

fn scroll_down(view_state: &mut ViewState, lines: usize) {
    let max = view_state
        .session
        .as_ref()
        .map(available::max_scroll)
        .unwrap_or(0);
    view_state.scroll_offset = (view_state.scroll_offset + lines).min(max);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

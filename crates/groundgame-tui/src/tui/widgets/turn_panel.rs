// Turn panel widget: whose turn it is, the pick input, and the error line.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use groundgame_app::protocol::SessionView;
use groundgame_app::session::TurnPhase;

use crate::tui::PickEditor;

/// Render the turn panel into the given area.
pub fn render(frame: &mut Frame, area: Rect, view: &SessionView, pick: &PickEditor) {
    let mut lines = vec![Line::from(Span::styled(
        turn_message(view),
        turn_style(view.phase),
    ))];

    lines.push(Line::from(Span::styled(
        action_hint(view, pick),
        Style::default().fg(Color::White),
    )));

    if let Some(ref error) = view.error {
        lines.push(Line::from(Span::styled(
            error.message(),
            Style::default().fg(Color::Red),
        )));
    } else if let Some(ref notice) = view.notice {
        lines.push(Line::from(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Yellow),
        )));
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Turn"),
    );
    frame.render_widget(paragraph, area);
}

/// Banner text for the current phase.
pub fn turn_message(view: &SessionView) -> String {
    match view.phase {
        TurnPhase::Loading => "Loading draft state...".to_string(),
        TurnPhase::Completed => "Draft complete!".to_string(),
        TurnPhase::Mutating(_) => "Processing pick, please wait...".to_string(),
        TurnPhase::AwaitingUserPick => "It's YOUR turn!".to_string(),
        TurnPhase::AwaitingCpuSimulation | TurnPhase::WaitingOnOtherTeam => {
            let label = view
                .snapshot
                .as_ref()
                .and_then(|s| s.on_clock_team.as_ref())
                .map(|team| team.label())
                .unwrap_or_else(|| "Another team".to_string());
            format!("{label} is on the clock.")
        }
    }
}

/// Second line: the pick input or the hint for whatever the phase allows.
pub fn action_hint(view: &SessionView, pick: &PickEditor) -> String {
    match view.phase {
        TurnPhase::AwaitingUserPick if view.legal.submit_pick => {
            if pick.editing {
                format!("Pick: {}_   (Enter submit, Esc cancel)", pick.text)
            } else if pick.text.is_empty() {
                "Press p to enter a player name.".to_string()
            } else {
                format!("Pick: {}   (p to edit)", pick.text)
            }
        }
        TurnPhase::AwaitingCpuSimulation if view.legal.simulate_cpu_pick => {
            "Press s to simulate the CPU pick.".to_string()
        }
        TurnPhase::WaitingOnOtherTeam if view.legal.poll_live => {
            "Waiting on the live draft. Press l to sync now.".to_string()
        }
        TurnPhase::WaitingOnOtherTeam => "Waiting for the other team.".to_string(),
        TurnPhase::Completed => "Press Esc to return to the start screen.".to_string(),
        _ => String::new(),
    }
}

fn turn_style(phase: TurnPhase) -> Style {
    match phase {
        TurnPhase::AwaitingUserPick => Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
        TurnPhase::Mutating(_) => Style::default().fg(Color::Cyan),
        TurnPhase::Completed => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        _ => Style::default().fg(Color::White),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

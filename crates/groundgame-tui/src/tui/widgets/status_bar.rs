// Status bar widget: draft progress, session id, freshness.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use groundgame_app::protocol::SessionView;

/// Render the status bar into the given area.
///
/// Layout: [progress] | [session id] [LIVE] [syncing…] | [updated HH:MM:SS]
pub fn render(frame: &mut Frame, area: Rect, view: &SessionView) {
    let mut spans = vec![Span::styled(
        format!(" {}", progress_text(view)),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )];

    spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
    spans.push(Span::styled(
        format!("Session {}", view.session_id),
        Style::default().fg(Color::White),
    ));
    if view.live {
        spans.push(Span::styled(
            " [LIVE]",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ));
    }

    if view.live_sync_pending {
        spans.push(Span::styled(" syncing…", Style::default().fg(Color::Cyan)));
    }

    if let Some(fetched_at) = view.fetched_at {
        spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
        spans.push(Span::styled(
            format!("updated {}", fetched_at.format("%H:%M:%S")),
            Style::default().fg(Color::Gray),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

/// Pick counter text, or a loading label before the first snapshot.
pub fn progress_text(view: &SessionView) -> String {
    match view.snapshot {
        Some(ref state) => format!(
            "Pick {} of {} | Drafted: {}",
            state.current_pick_num, state.total_picks, state.drafted_players_count
        ),
        None => "Loading draft...".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

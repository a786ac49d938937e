// Available players widget: the service-sorted pool for the current query.
//
// Columns: #, Name, Pos, Team, ADP, VORP, VONA. Rows arrive already filtered
// and sorted by the service; the widget only scrolls them. The title shows
// the selected filter/sort and, while a refetch is pending, what the rows
// were actually fetched with.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Cell, Row, Table};
use ratatui::Frame;

use groundgame_app::protocol::SessionView;
use groundgame_core::draft::state::format_metric;
use groundgame_core::draft::PlayerWithMetrics;

/// Render the available players table into the given area.
pub fn render(frame: &mut Frame, area: Rect, view: &SessionView, scroll_offset: usize) {
    let players: &[PlayerWithMetrics] = view
        .snapshot
        .as_ref()
        .map(|s| s.available_players.as_slice())
        .unwrap_or(&[]);

    let header = Row::new(vec![
        Cell::from("#"),
        Cell::from("Name"),
        Cell::from("Pos"),
        Cell::from("Team"),
        Cell::from("ADP"),
        Cell::from("VORP"),
        Cell::from("VONA"),
    ])
    .style(
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    let row_style = if view.params_applied() {
        Style::default()
    } else {
        Style::default().fg(Color::Gray)
    };

    let rows: Vec<Row> = players
        .iter()
        .enumerate()
        .skip(scroll_offset)
        .map(|(i, p)| player_row(i, p).style(row_style))
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Min(18),
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(6),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .title(Line::from(query_title(view, players.len()))),
    );

    frame.render_widget(table, area);
}

fn player_row(index: usize, p: &PlayerWithMetrics) -> Row<'static> {
    Row::new(vec![
        Cell::from(format!("{}", index + 1)),
        Cell::from(p.display_name.clone()),
        Cell::from(p.pos.clone()),
        Cell::from(p.team.clone().unwrap_or_else(|| "--".to_string())),
        Cell::from(format_metric(p.adp)),
        Cell::from(format_metric(p.vorp)),
        Cell::from(format_metric(p.vona)),
    ])
}

/// Table title: the requested query, then what the rows reflect if that
/// differs.
pub fn query_title(view: &SessionView, count: usize) -> String {
    let requested = view.requested;
    let mut title = format!(
        "Players [Filter: {} | Sort: {}]",
        requested.effective_filter(),
        requested.sort_by
    );
    match view.applied {
        Some(applied) if applied == requested => {
            title.push_str(&format!(" ({count})"));
        }
        Some(applied) => {
            title.push_str(&format!(" loading… (showing {applied})"));
        }
        None => title.push_str(" loading…"),
    }
    title
}

/// Largest useful scroll offset: the last row stays visible.
pub fn max_scroll(view: &SessionView) -> usize {
    view.snapshot
        .as_ref()
        .map(|s| s.available_players.len().saturating_sub(1))
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

// Screen layout: panel arrangement and sizing.
//
// Session screen:
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +--------------------------------------------------+
// | Turn Panel (5 rows)                               |
// +--------------------------------------------------+
// | Available Players (fill)                          |
// +--------------------------------------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+
//
// Start screen: the entry form above the help bar.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Resolved screen areas for the session view.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Top row: pick counter, session id, freshness.
    pub status_bar: Rect,
    /// Turn banner, pick input, error line.
    pub turn_panel: Rect,
    /// Available players table.
    pub players: Rect,
    /// Bottom row: keyboard shortcut hints.
    pub help_bar: Rect,
}

/// Resolved screen areas for the start screen.
#[derive(Debug, Clone)]
pub struct StartLayout {
    pub form: Rect,
    pub help_bar: Rect,
}

/// Build the session layout from the available terminal area.
pub fn build_layout(area: Rect) -> AppLayout {
    // Vertical: status(1) | turn(5) | players(fill) | help(1)
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Length(5), // turn panel
            Constraint::Min(5),    // players
            Constraint::Length(1), // help bar
        ])
        .split(area);

    AppLayout {
        status_bar: vertical[0],
        turn_panel: vertical[1],
        players: vertical[2],
        help_bar: vertical[3],
    }
}

/// Build the start-screen layout. The form is capped in height so it does
/// not stretch across tall terminals.
pub fn build_start_layout(area: Rect) -> StartLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Max(12),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    StartLayout {
        form: vertical[0],
        help_bar: vertical[2],
    }
}

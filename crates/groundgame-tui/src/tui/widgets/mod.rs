// TUI widget modules for each session panel.

pub mod available;
pub mod quit_confirm;
pub mod status_bar;
pub mod turn_panel;

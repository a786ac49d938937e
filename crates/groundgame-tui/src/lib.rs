// Library root: the terminal UI and command-line parsing, exposed so the
// binary stays a thin wiring layer.

pub mod cli;
pub mod tui;

//! Command-line interface for the groundgame draft client.

use clap::Parser;
use groundgame_core::draft::SessionId;

/// Ground Game - fantasy football draft assistant
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "groundgame")]
#[command(about = "Terminal client for the Ground Game draft service", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Treat the opened session as a live-helper draft (enables polling)
    #[arg(long, requires = "session_id")]
    pub live: bool,

    /// Session to open directly instead of showing the start screen
    #[arg(value_parser = non_blank)]
    pub session_id: Option<String>,
}

impl Cli {
    pub fn session_id(&self) -> Option<SessionId> {
        self.session_id.as_deref().map(SessionId::new)
    }
}

fn non_blank(value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("session id must not be empty".to_string());
    }
    Ok(trimmed.to_string())
}

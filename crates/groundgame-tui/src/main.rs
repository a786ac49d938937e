// Ground Game draft client entry point.
//
// Startup sequence:
// 1. Parse arguments
// 2. Initialize tracing (log to file, not terminal)
// 3. Load config
// 4. Build the HTTP draft service client
// 5. Create mpsc channels and spawn the app loop
// 6. Open the session given on the command line, if any
// 7. Run the TUI until the user quits
// 8. Cleanup on exit

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use groundgame_app::app::{self, AppState};
use groundgame_app::protocol::UserCommand;
use groundgame_core::config;
use groundgame_core::service::HttpDraftService;
use groundgame_tui::cli::Cli;
use groundgame_tui::tui::{self, start_form::StartForm, Screen, ViewState};
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing()?;
    info!("Ground Game draft client starting up");

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: service={}, live poll every {}s",
        config.service.base_url, config.session.live_poll_interval_secs
    );

    let service = HttpDraftService::from_config(&config.service)
        .context("failed to create draft service client")?;

    let (event_tx, event_rx) = mpsc::channel(256);
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    let app_state = AppState::new(Arc::new(service), &config.session, event_tx);

    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(event_rx, cmd_rx, ui_tx, app_state).await {
            error!("Application loop error: {}", e);
        }
    });

    let mut view_state = ViewState::new(StartForm::from_defaults(&config.simulation));
    if let Some(session_id) = cli.session_id() {
        info!("Opening session {} from the command line", session_id);
        view_state.screen = Screen::Session;
        cmd_tx
            .send(UserCommand::OpenSession {
                session_id,
                live: cli.live,
            })
            .await
            .context("app loop exited before the session could be opened")?;
    }

    // Blocks until the user quits. Dropping cmd_tx afterwards lets the app
    // loop finish.
    if let Err(e) = tui::run(ui_rx, cmd_tx, view_state).await {
        error!("TUI error: {:#}", e);
    }

    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        let _ = app_handle.await;
    })
    .await;

    info!("Ground Game draft client shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (not the terminal, which is used by the TUI).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("groundgame.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("groundgame=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}

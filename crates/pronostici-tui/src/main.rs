// Pronostici entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Open the pick store
// 4. Build the backend fetcher
// 5. Create mpsc channels
// 6. Spawn the board task
// 7. Run the TUI until the user quits
// 8. Cleanup on exit

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use pronostici_app::app::{self, MatchBoard};
use pronostici_app::fetcher::Fetcher;
use pronostici_core::choices::ChoiceStore;
use pronostici_core::config::{self, Config};
use pronostici_core::format::today_in;
use pronostici_core::store::{KeyValueStore, MemoryStore, SqliteStore};
use pronostici_tui::tui::{self, UiState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("Pronostici starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: backend={}, timezone={}",
        config.api.base_url, config.display.timezone
    );

    // 3. Open the pick store
    let store = open_store(&config);
    let choice_store = ChoiceStore::new(store);

    // 4. Build the backend fetcher
    let fetcher = Fetcher::from_config(&config.api).context("failed to build HTTP client")?;

    // 5. Create mpsc channels
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(64);
    let (fetch_tx, fetch_rx) = mpsc::channel(64);

    let today = today_in(&config.display.timezone);
    let board = MatchBoard::new(fetcher, choice_store, today, fetch_tx);

    // 6. Spawn the board task
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(cmd_rx, fetch_rx, ui_tx, board).await {
            error!("Board loop error: {}", e);
        }
    });

    // 7. Run the TUI (blocks until 'q' or Ctrl+C)
    let ui_state = UiState::new(&config.display, today);
    if let Err(e) = tui::run(ui_rx, cmd_tx, ui_state).await {
        error!("TUI error: {:#}", e);
    }

    // 8. Cleanup: wait for the board task to finish (with timeout)
    let _ = tokio::time::timeout(Duration::from_secs(5), async {
        let _ = app_handle.await;
    })
    .await;

    info!("Pronostici shut down cleanly");
    Ok(())
}

/// Open the SQLite pick store, or an in-memory one when it cannot be opened.
fn open_store(config: &Config) -> Arc<dyn KeyValueStore> {
    if let Some(parent) = config.db_path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            warn!("Cannot create {}: {}", parent.display(), e);
        }
    }

    match SqliteStore::open(&config.db_path) {
        Ok(store) => {
            info!("Pick store opened at {}", config.db_path.display());
            Arc::new(store)
        }
        Err(e) => {
            warn!(
                "Failed to open pick store at {}: {}. Picks will not be saved.",
                config.db_path.display(),
                e
            );
            Arc::new(MemoryStore::new())
        }
    }
}

/// Initialize tracing to log to a file (not the terminal, which is used by the TUI).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("pronostici.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pronostici=info,warn")),
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

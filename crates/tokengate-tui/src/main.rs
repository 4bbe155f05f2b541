//! Tokengate - a terminal front end for a token-authenticated account API.
//!
//! Runs the interactive UI by default. `--whoami` and `--logout` operate on
//! the stored session without opening the UI.

mod app;
mod ui;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tokengate_core::auth::{open_store, SessionState, TokenStore};
use tokengate_core::forms::Route;
use tokengate_core::{AuthClient, Config};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

const LOG_FILE_PREFIX: &str = "tokengate.log";

fn env_filter() -> EnvFilter {
    // RUST_LOG controls the level (e.g., RUST_LOG=tokengate_core=debug)
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Log to stderr, for the one-shot command line switches
fn init_stderr_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter())
        .init();
}

/// Log to a daily rolling file while the UI owns the terminal.
/// The returned guard flushes pending lines when dropped.
fn init_file_tracing(config: &Config) -> WorkerGuard {
    let log_dir = config
        .cache_dir()
        .unwrap_or_else(|_| PathBuf::from("./cache"));
    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(env_filter())
        .init();
    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str);

    if matches!(command, Some("--whoami") | Some("--logout")) {
        init_stderr_tracing();
        let config = load_config();
        return match command {
            Some("--whoami") => whoami(&config).await,
            _ => logout(&config),
        };
    }

    let config = load_config();
    let _log_guard = init_file_tracing(&config);
    info!("Tokengate starting");

    // Create app before touching the terminal so setup errors print normally
    let mut app = App::new(config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let start = if app.auth.is_logged_in() {
        Route::Home
    } else {
        Route::Login
    };
    app.navigate(start).await;

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("Tokengate shutting down");
    Ok(())
}

fn load_config() -> Config {
    Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        Config::default()
    })
}

fn auth_client(config: &Config) -> Result<AuthClient> {
    let store = TokenStore::new(open_store(config));
    let session = SessionState::from_store(&store);
    Ok(AuthClient::new(config.api_url(), store, session)?)
}

/// Print the signed-in user as JSON
async fn whoami(config: &Config) -> Result<()> {
    let auth = auth_client(config)?;
    match auth.current_user().await {
        Some(user) => println!("{}", serde_json::to_string_pretty(&user)?),
        None => println!("Not signed in"),
    }
    Ok(())
}

fn logout(config: &Config) -> Result<()> {
    let auth = auth_client(config)?;
    auth.log_out();
    eprintln!("Logged out.");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Header follows the published session state
        app.sync_session();

        terminal.draw(|f| render(f, app))?;

        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key).await? {
                    return Ok(());
                }
            }
        }

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}

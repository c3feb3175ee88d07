//! Jabber TUI entry point.
//!
//! # Usage
//!
//! ```bash
//! # Connect to a local server and pick a name interactively
//! jabber-tui
//!
//! # Connect straight away as alice, with debug logs
//! jabber-tui --server ws://chat.example:8080 --username alice --log-level debug
//! ```

use std::{fs::OpenOptions, path::Path, sync::Mutex, time::Duration};

use clap::Parser;
use jabber_client::{ClientConfig, DEFAULT_TYPING_DEBOUNCE};
use jabber_core::SystemEnv;
use jabber_tui::{App, DEFAULT_LOG_FILE, DEFAULT_SERVER_URL, Runtime, TerminalDriver};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Jabber terminal chat client
#[derive(Parser, Debug)]
#[command(name = "jabber-tui")]
#[command(about = "Terminal chat client for the Jabber protocol")]
#[command(version)]
struct Args {
    /// WebSocket URL of the chat server
    #[arg(short, long, default_value = DEFAULT_SERVER_URL)]
    server: String,

    /// Connect as this user on start instead of asking
    #[arg(short, long)]
    username: Option<String>,

    /// File to write logs to
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    log_file: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Quiet period before the typing indicator is withdrawn, in milliseconds
    #[arg(long, default_value_t = duration_millis(DEFAULT_TYPING_DEBOUNCE))]
    typing_debounce_ms: u64,
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn init_logging(path: &Path, level: &str) -> std::io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(filter)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(Path::new(&args.log_file), &args.log_level)?;

    tracing::info!(server = %args.server, "jabber-tui starting");

    let config =
        ClientConfig { typing_debounce: Duration::from_millis(args.typing_debounce_ms) };
    let driver = TerminalDriver::new(args.server.clone())?;
    let app = App::new(args.server, args.username);

    let runtime: Runtime<TerminalDriver, SystemEnv> = Runtime::new(driver, app, config);
    runtime.run().await?;

    tracing::info!("jabber-tui exiting");
    Ok(())
}

//! # Regi Terminal
//!
//! Line-oriented operator console for one register.
//!
//! ## Application Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Regi Terminal                                    │
//! │                                                                         │
//! │  stdin ──► command.rs ──► console.rs ──► Register (regi-client)        │
//! │            "qty A1"        execute()        │                           │
//! │                                             ▼                           │
//! │  stdout ◄── render.rs ◄──────────── SessionSnapshot                    │
//! │                                                                         │
//! │  stderr ◄── tracing (RUST_LOG, default "info,regi=debug")              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - [`command`] - Parsing typed operator commands
//! - [`console`] - The read/execute/render loop
//! - [`render`] - Plain-text rendering of the session
//! - [`error`] - Terminal error type

use std::path::PathBuf;

use clap::Parser;
use regi_client::{http, Register, TerminalConfig};
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub mod command;
pub mod console;
pub mod error;
pub mod render;

pub use error::{TerminalError, TerminalResult};

/// Command-line flags.
#[derive(Debug, Parser)]
#[command(name = "regi-terminal")]
#[command(author, version, about = "Regi POS operator console")]
pub struct Cli {
    /// Path to terminal.toml (defaults to the platform config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Catalog/ledger base URL, overriding config and environment
    #[arg(long)]
    pub service_url: Option<String>,
}

/// Runs the terminal until the operator quits or input ends.
pub async fn run(cli: Cli) -> TerminalResult<()> {
    init_tracing();

    let mut config = TerminalConfig::load(cli.config)?;
    if let Some(url) = cli.service_url {
        config.service.base_url = url;
        config.validate()?;
    }

    let (catalog, ledger) = http::connect(&config.service)?;
    let register = Register::new(config.identity(), catalog, ledger);

    info!(
        session_id = %register.session_id(),
        service_url = %config.service_url(),
        "Starting Regi terminal"
    );

    console::run_console(
        &register,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=regi_client=trace` - Trace the HTTP adapters only
/// - Default: INFO, DEBUG for regi crates
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,regi=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

//! # Regi Terminal Entry Point
//!
//! ## Startup Sequence
//! 1. Parse flags
//! 2. Initialize tracing (stderr)
//! 3. Load configuration and connect the catalog/ledger clients
//! 4. Run the operator console until `quit` or end of input

use clap::Parser;
use regi_terminal_lib::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = regi_terminal_lib::run(cli).await {
        tracing::error!("Terminal stopped: {e}");
        eprintln!("regi-terminal: {e}");
        std::process::exit(1);
    }
}

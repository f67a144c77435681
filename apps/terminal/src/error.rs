//! # Terminal Error Type
//!
//! Errors that stop the terminal. Operator mistakes and service failures
//! are not among them: the console prints those and keeps going.

use regi_client::ClientError;
use thiserror::Error;

/// Result type alias for the terminal.
pub type TerminalResult<T> = Result<T, TerminalError>;

/// Fatal terminal errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// Configuration or client setup failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Reading commands or writing the screen failed.
    #[error("Console I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

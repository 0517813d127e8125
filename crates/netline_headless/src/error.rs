//! Error type for the headless runner.

use thiserror::Error;

use netline_core::error::GameError;

/// Result type alias using [`HeadlessError`].
pub type Result<T> = std::result::Result<T, HeadlessError>;

/// Everything that can stop a headless run.
#[derive(Error, Debug)]
pub enum HeadlessError {
    /// Scenario file not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read a file or write output.
    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// The engine rejected the scenario or failed mid-match.
    #[error(transparent)]
    Game(#[from] GameError),
    /// Failed to encode a report.
    #[error("Failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
    /// The scenario has no team that could field a bot.
    #[error("Scenario '{0}' has no hub to seat a bot at")]
    NoSeats(String),
}

//! Error types for the match engine.

use thiserror::Error;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all match engine errors.
///
/// Rule preconditions (capturing off a firewall, attacking an empty tile)
/// are not errors: those calls are silent no-ops. Errors are reserved for
/// states the rules assume can never happen.
#[derive(Debug, Error)]
pub enum GameError {
    /// An entity the rules expect to exist is missing.
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    /// No player with this id is part of the session.
    #[error("Player not found: {0}")]
    PlayerNotFound(String),

    /// Coordinates fall outside the grid.
    #[error("Tile out of bounds: ({x}, {y})")]
    TileOutOfBounds {
        /// Column.
        x: i32,
        /// Row.
        y: i32,
    },

    /// Failed to read a scenario file.
    #[error("Failed to load scenario '{path}': {message}")]
    ScenarioLoad {
        /// Path to the scenario file.
        path: String,
        /// Error message.
        message: String,
    },

    /// Scenario contents are malformed.
    #[error("Failed to parse scenario: {0}")]
    ScenarioParse(String),

    /// Snapshot or wire (de)serialization failed.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// A broadcast sink failed to deliver a message.
    #[error("Broadcast transport failed: {0}")]
    Transport(String),

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}

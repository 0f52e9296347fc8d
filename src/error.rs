//! Engine error types

use thiserror::Error;

/// Errors raised by the engine and its configuration layer.
///
/// A rejected move is not an error; see [`crate::game::Rejection`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A coordinate outside the board was used for a mutation
    #[error("coordinate ({row}, {col}) is outside the {size}x{size} board")]
    InvalidCoordinate { row: usize, col: usize, size: usize },

    /// Settings or the special-piece rule set could not be loaded
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Settings could not be written back to disk
    #[error("could not save settings: {0}")]
    Storage(String),

    /// A textual board description could not be parsed
    #[error("malformed board: {0}")]
    MalformedBoard(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

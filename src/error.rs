//! Error types for maze construction and configuration.

use thiserror::Error;

/// Errors raised while building a maze grid.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MazeError {
    /// A grid needs at least one row and one column.
    #[error("invalid maze dimensions {rows}x{columns}: rows and columns must be at least 1")]
    InvalidDimensions {
        /// Requested row count
        rows: usize,
        /// Requested column count
        columns: usize,
    },

    /// A generation or runner parameter is outside its accepted range.
    #[error("invalid {name}: {reason}")]
    InvalidParams {
        /// Parameter name
        name: &'static str,
        /// Accepted range
        reason: &'static str,
    },
}

/// Errors raised while loading, saving or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing the config file failed
    #[error("config IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for [`crate::config::Config`]
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value is out of its accepted range
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl From<MazeError> for ConfigError {
    fn from(err: MazeError) -> Self {
        ConfigError::Invalid(err.to_string())
    }
}

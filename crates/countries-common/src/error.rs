//! Error types shared across the countries workspace

use thiserror::Error;

/// Result type alias for shared operations
pub type Result<T> = std::result::Result<T, CountriesError>;

/// Errors raised outside the pipeline itself: settings and log files
#[derive(Error, Debug)]
pub enum CountriesError {
    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl CountriesError {
    /// Shorthand for a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        CountriesError::Config(msg.into())
    }

    /// Shorthand for a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        CountriesError::Parse(msg.into())
    }
}

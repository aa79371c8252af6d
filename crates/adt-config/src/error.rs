//! Configuration error types

use thiserror::Error;

/// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required setting was not supplied via env var or flag
    #[error("Missing required configuration: {0}")]
    Missing(String),

    /// Two mutually-exclusive settings were both supplied
    #[error("Conflicting configuration: {0}")]
    Conflict(String),

    /// A supplied value failed validation
    #[error("Invalid configuration for {field}: {message}")]
    Invalid { field: String, message: String },

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// IO error reading the cookie file
    #[error("Failed to read cookie file: {0}")]
    CookieFileRead(#[from] std::io::Error),

    /// Malformed line in a Netscape cookie file
    #[error("Malformed cookie file line {line}: {reason}")]
    CookieFileParse { line: usize, reason: String },
}

//! Transport error types

use crate::types::HttpMethodError;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid HTTP method: {0}")]
    InvalidMethod(#[from] HttpMethodError),

    #[error("invalid base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("cookie error: {0}")]
    Cookie(#[from] crate::cookie::CookieError),

    #[error("CSRF token negotiation failed: {0}")]
    Csrf(String),

    #[error("ADT backend responded {status}: {body}")]
    Status { status: u16, body: String },
}

impl TransportError {
    /// The object does not exist at the expected URL (404).
    pub fn is_not_found(&self) -> bool {
        matches!(self, TransportError::Status { status: 404, .. })
    }

    /// The object or its editor lock belongs to someone else (403).
    pub fn is_forbidden(&self) -> bool {
        matches!(self, TransportError::Status { status: 403, .. })
    }

    /// The object is locked by another session (typically 423 or 403 with a lock fault).
    pub fn is_locked(&self) -> bool {
        matches!(self, TransportError::Status { status: 423, .. })
    }
}

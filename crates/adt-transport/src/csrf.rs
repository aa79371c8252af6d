//! CSRF token cache
//!
//! ADT requires an `X-CSRF-Token` on every mutating request. The token is
//! obtained with a `GET` carrying `X-CSRF-Token: Fetch` and is then reused
//! until the backend rejects it with 403 + `x-csrf-token: Required`, at
//! which point it is fetched exactly once more before giving up.

use tokio::sync::Mutex;

pub const FETCH_HEADER_VALUE: &str = "Fetch";
pub const TOKEN_HEADER: &str = "x-csrf-token";

#[derive(Debug, Default)]
pub struct CsrfCache {
    token: Mutex<Option<String>>,
}

impl CsrfCache {
    pub fn new() -> Self {
        Self { token: Mutex::new(None) }
    }

    /// Current cached token, if a fetch has already succeeded.
    pub async fn current(&self) -> Option<String> {
        self.token.lock().await.clone()
    }

    /// Store a freshly fetched token, replacing whatever was cached.
    ///
    /// Holding the lock across the whole fetch-and-store in
    /// `AdtTransport::ensure_csrf_token` is what gives concurrent callers
    /// the double-checked-locking property: the second caller to reach the
    /// lock sees the token the first caller already stored and never
    /// issues a redundant Fetch request.
    pub async fn store(&self, token: String) {
        *self.token.lock().await = Some(token);
    }

    pub async fn clear(&self) {
        *self.token.lock().await = None;
    }

    pub fn lock(&self) -> &Mutex<Option<String>> {
        &self.token
    }
}

/// Whether a 403 response indicates the CSRF token must be refreshed,
/// rather than an unrelated authorization failure.
pub fn response_requires_csrf_refresh(headers: &reqwest::header::HeaderMap) -> bool {
    headers
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("Required"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue};

    #[tokio::test]
    async fn caches_and_clears_token() {
        let cache = CsrfCache::new();
        assert!(cache.current().await.is_none());
        cache.store("abc".to_string()).await;
        assert_eq!(cache.current().await.as_deref(), Some("abc"));
        cache.clear().await;
        assert!(cache.current().await.is_none());
    }

    #[test]
    fn detects_required_refresh_header() {
        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, HeaderValue::from_static("Required"));
        assert!(response_requires_csrf_refresh(&headers));

        let headers = HeaderMap::new();
        assert!(!response_requires_csrf_refresh(&headers));
    }
}

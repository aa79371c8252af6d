//! ADT HTTP transport: shared client, cookie jar, and CSRF token lifecycle

use std::collections::HashMap;

use adt_config::{AdtConfig, AuthMethod};
use async_trait::async_trait;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE};
use reqwest::Client;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{AuthMode, TransportConfig};
use crate::cookie::{self, CookieJar};
use crate::csrf::{self, CsrfCache};
use crate::errors::TransportError;
use crate::types::HttpMethod;

const SESSIONTYPE_HEADER: &str = "X-sap-adt-sessiontype";

/// A decoded ADT response. Bodies are kept as bytes; callers in `adt-xml`
/// decode them per the dialect of the endpoint they called.
#[derive(Debug, Clone)]
pub struct AdtResponse {
    pub status: u16,
    pub body: Vec<u8>,
    pub headers: HashMap<String, String>,
}

impl AdtResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Seam between the transport and `adt-core`'s atomic operations, so
/// workflow and catalogue logic can be exercised against a stub instead of
/// a live backend.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Vec<u8>>,
        content_type: Option<&str>,
        accept: Option<&str>,
    ) -> Result<AdtResponse, TransportError>;

    fn base_url(&self) -> &Url;
}

/// Live transport backed by `reqwest`, with CSRF token caching and a
/// per-session cookie jar.
pub struct AdtTransport {
    http: Client,
    base_url: Url,
    jar: Mutex<CookieJar>,
    csrf: CsrfCache,
    auth: AuthMode,
    sap_client: String,
    sap_language: String,
    stateful: bool,
}

impl AdtTransport {
    pub fn new(config: &AdtConfig) -> Result<Self, TransportError> {
        let transport_config = TransportConfig::from(config);
        Self::with_config(&transport_config, config)
    }

    fn with_config(transport_config: &TransportConfig, config: &AdtConfig) -> Result<Self, TransportError> {
        debug!(timeout_s = transport_config.timeout.as_secs(), "building ADT transport client");

        let http = Client::builder()
            .timeout(transport_config.timeout)
            .user_agent(&transport_config.user_agent)
            .danger_accept_invalid_certs(!transport_config.verify_ssl)
            .cookie_store(false) // the jar below is what actually rides the requests
            .build()?;

        let base_url = Url::parse(&transport_config.base_url)?;

        let jar = match &config.auth {
            AuthMethod::CookieFile(path) => {
                let contents = std::fs::read_to_string(path).map_err(|e| {
                    TransportError::Csrf(format!("failed to read cookie file {path}: {e}"))
                })?;
                let records = adt_config::cookiefile::parse(&contents)
                    .map_err(|e| TransportError::Csrf(format!("malformed cookie file {path}: {e}")))?;
                CookieJar::from(records)
            }
            AuthMethod::CookieString(s) => CookieJar::from(adt_config::cookiefile::parse_cookie_string(s)),
            AuthMethod::Basic { .. } => CookieJar::new(),
        };

        Ok(Self {
            http,
            base_url,
            jar: Mutex::new(jar),
            csrf: CsrfCache::new(),
            auth: AuthMode::from(&config.auth),
            sap_client: transport_config.sap_client.clone(),
            sap_language: transport_config.sap_language.clone(),
            stateful: transport_config.stateful,
        })
    }

    fn build_url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, TransportError> {
        let mut url = self.base_url.join(path)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("sap-client", &self.sap_client);
            pairs.append_pair("sap-language", &self.sap_language);
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    async fn base_headers(&self, path: &str) -> Result<HeaderMap, TransportError> {
        let mut headers = HeaderMap::new();

        if let AuthMode::Basic { user, password } = &self.auth {
            let token = base64::engine::general_purpose::STANDARD.encode(format!("{user}:{password}"));
            headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Basic {token}"))?);
        }

        let jar = self.jar.lock().await;
        if !jar.is_empty() {
            headers.insert(COOKIE, jar.to_header_value(path)?);
        }
        drop(jar);

        if self.stateful {
            headers.insert(
                HeaderName::from_static("x-sap-adt-sessiontype"),
                HeaderValue::from_static("stateful"),
            );
        }

        Ok(headers)
    }

    /// Fetch (or return the cached) CSRF token. Holding the cache's internal
    /// lock across the fetch means a second caller arriving while a fetch is
    /// in flight waits for it instead of issuing its own `Fetch` request.
    async fn ensure_csrf_token(&self, path: &str) -> Result<String, TransportError> {
        let mut guard = self.csrf.lock().lock().await;
        if let Some(token) = guard.as_ref() {
            return Ok(token.clone());
        }

        debug!("fetching CSRF token");
        let url = self.build_url(path, &[])?;
        let mut headers = self.base_headers(path).await?;
        headers.insert(
            HeaderName::from_static("x-csrf-token"),
            HeaderValue::from_static(csrf::FETCH_HEADER_VALUE),
        );

        let response = self.http.get(url).headers(headers).send().await?;
        let status = response.status();
        self.absorb_cookies(response.headers()).await?;

        let token = response
            .headers()
            .get(csrf::TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                TransportError::Csrf(format!("backend did not return an X-CSRF-Token (status {status})"))
            })?;

        *guard = Some(token.clone());
        Ok(token)
    }

    async fn absorb_cookies(&self, headers: &HeaderMap) -> Result<(), TransportError> {
        if headers.get(SET_COOKIE).is_none() {
            return Ok(());
        }
        let mut jar = self.jar.lock().await;
        for value in headers.get_all(SET_COOKIE).iter() {
            jar.set_from_header(value)?;
        }
        Ok(())
    }
}

#[async_trait]
impl Transport for AdtTransport {
    async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Vec<u8>>,
        content_type: Option<&str>,
        accept: Option<&str>,
    ) -> Result<AdtResponse, TransportError> {
        let url = self.build_url(path, query)?;
        info!(method = %method, %url, "ADT request");

        for attempt in 0..2 {
            let mut headers = self.base_headers(path).await?;
            if method.is_mutating() {
                let token = self.ensure_csrf_token(path).await?;
                headers.insert(HeaderName::from_static("x-csrf-token"), HeaderValue::from_str(&token)?);
            }
            if let Some(ct) = content_type {
                headers.insert(CONTENT_TYPE, HeaderValue::from_str(ct)?);
            }
            if let Some(accept) = accept {
                headers.insert(ACCEPT, HeaderValue::from_str(accept)?);
            }

            let mut builder = self.http.request(method.into(), url.clone()).headers(headers);
            if let Some(body) = body.clone() {
                builder = builder.body(body);
            }

            let response = builder.send().await?;
            let status = response.status();
            self.absorb_cookies(response.headers()).await?;

            if status.as_u16() == 403 && method.is_mutating() && csrf::response_requires_csrf_refresh(response.headers()) && attempt == 0 {
                warn!("CSRF token rejected, refreshing and retrying once");
                self.csrf.clear().await;
                continue;
            }

            let response_headers: HashMap<String, String> = response
                .headers()
                .iter()
                .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
                .collect();
            let bytes = response.bytes().await?.to_vec();

            if !status.is_success() {
                return Err(TransportError::Status {
                    status: status.as_u16(),
                    body: String::from_utf8_lossy(&bytes).to_string(),
                });
            }

            debug!(status = status.as_u16(), bytes = bytes.len(), "ADT response");
            return Ok(AdtResponse {
                status: status.as_u16(),
                body: bytes,
                headers: response_headers,
            });
        }

        unreachable!("retry loop always returns within two attempts")
    }

    fn base_url(&self) -> &Url {
        &self.base_url
    }
}

/// Convenience constructor for tests and the mock transport: pre-seed a jar
/// from a plain `name -> value` map instead of a cookie file.
pub fn jar_from_map(pairs: HashMap<String, String>) -> CookieJar {
    cookie::jar_from_pairs(pairs)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use adt_config::ToolMode;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn test_config(base_url: String) -> AdtConfig {
        AdtConfig {
            base_url,
            auth: AuthMethod::Basic { user: "DEVELOPER".to_string(), password: "secret".to_string() },
            sap_client: "001".to_string(),
            sap_language: "EN".to_string(),
            insecure_tls: false,
            stateful: false,
            mode: ToolMode::Focused,
            request_timeout: Duration::from_secs(5),
        }
    }

    /// Drives a real `AdtTransport` through the CSRF-refresh-on-403 path:
    /// the first mutating attempt carries a now-stale token, gets rejected
    /// with `x-csrf-token: Required`, and the retry fetches a fresh token
    /// before succeeding. Exactly two POSTs reach the backend for the one
    /// logical mutation the caller issued.
    #[tokio::test]
    async fn refreshes_csrf_token_once_after_a_403_and_retries_exactly_once() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/sap/bc/adt/example"))
            .respond_with(ResponseTemplate::new(200).insert_header("x-csrf-token", "token-a"))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/sap/bc/adt/example"))
            .and(header("x-csrf-token", "token-a"))
            .respond_with(ResponseTemplate::new(403).insert_header("x-csrf-token", "Required"))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/sap/bc/adt/example"))
            .respond_with(ResponseTemplate::new(200).insert_header("x-csrf-token", "token-b"))
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/sap/bc/adt/example"))
            .and(header("x-csrf-token", "token-b"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&mock_server)
            .await;

        let transport = AdtTransport::new(&test_config(mock_server.uri())).unwrap();
        let response = transport.request(HttpMethod::Post, "/sap/bc/adt/example", &[], None, None, None).await.unwrap();
        assert_eq!(response.status, 200);

        let requests = mock_server.received_requests().await.unwrap();
        let mutations = requests.iter().filter(|r| r.method.as_str() == "POST").count();
        assert_eq!(mutations, 2, "exactly two round trips should be made for the mutation");
    }

    #[tokio::test]
    async fn a_403_unrelated_to_csrf_is_not_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/sap/bc/adt/example"))
            .respond_with(ResponseTemplate::new(200).insert_header("x-csrf-token", "token-a"))
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/sap/bc/adt/example"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
            .mount(&mock_server)
            .await;

        let transport = AdtTransport::new(&test_config(mock_server.uri())).unwrap();
        let err = transport.request(HttpMethod::Post, "/sap/bc/adt/example", &[], None, None, None).await.unwrap_err();
        assert!(matches!(err, TransportError::Status { status: 403, .. }));

        let requests = mock_server.received_requests().await.unwrap();
        assert_eq!(requests.iter().filter(|r| r.method.as_str() == "POST").count(), 1);
    }
}

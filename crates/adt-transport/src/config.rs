//! Transport-level configuration, derived from `adt_config::AdtConfig`

use std::time::Duration;

use adt_config::{AdtConfig, AuthMethod};

/// Settings the transport needs once it has been resolved from `AdtConfig`.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
    pub verify_ssl: bool,
    pub sap_client: String,
    pub sap_language: String,
    pub stateful: bool,
}

impl From<&AdtConfig> for TransportConfig {
    fn from(config: &AdtConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout: config.request_timeout,
            user_agent: concat!("adt-mcp-server/", env!("CARGO_PKG_VERSION")).to_string(),
            verify_ssl: !config.insecure_tls,
            sap_client: config.sap_client.clone(),
            sap_language: config.sap_language.clone(),
            stateful: config.stateful,
        }
    }
}

/// Auth mode resolved down to what the transport actually needs to send.
#[derive(Debug, Clone)]
pub enum AuthMode {
    Basic { user: String, password: String },
    /// Cookies are preloaded into the jar; no Authorization header is sent.
    PreloadedCookies,
}

impl From<&AuthMethod> for AuthMode {
    fn from(auth: &AuthMethod) -> Self {
        match auth {
            AuthMethod::Basic { user, password } => AuthMode::Basic {
                user: user.clone(),
                password: password.clone(),
            },
            AuthMethod::CookieFile(_) | AuthMethod::CookieString(_) => AuthMode::PreloadedCookies,
        }
    }
}

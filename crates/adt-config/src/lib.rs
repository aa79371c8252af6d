//! Environment/flag configuration surface for the ADT MCP server.
//!
//! Deliberately flat: the spec scopes config-file discovery out, so unlike
//! the domain-split, file-layered configuration the teacher crate this was
//! grounded on supports, there is exactly one settings struct here, loaded
//! from environment variables with CLI flags taking precedence.

pub mod cookiefile;
pub mod error;
pub mod validation;

use std::time::Duration;

use clap::{Parser, ValueEnum};

pub use error::{ConfigError, ConfigResult};
pub use validation::Validatable;

/// How the caller authenticates against the ADT backend.
#[derive(Debug, Clone)]
pub enum AuthMethod {
    Basic { user: String, password: String },
    CookieFile(String),
    CookieString(String),
}

/// Tool-surface size: curated 14 tools or the full 42-tool expert set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum ToolMode {
    #[default]
    Focused,
    Expert,
}

/// Fully resolved server configuration.
#[derive(Debug, Clone)]
pub struct AdtConfig {
    pub base_url: String,
    pub auth: AuthMethod,
    pub sap_client: String,
    pub sap_language: String,
    pub insecure_tls: bool,
    pub stateful: bool,
    pub mode: ToolMode,
    pub request_timeout: Duration,
}

impl Validatable for AdtConfig {
    fn validate(&self) -> ConfigResult<()> {
        validation::validate_required_string(&self.base_url, "base_url", self.domain_name())?;
        validation::validate_url(&self.base_url, "base_url", self.domain_name())?;
        validation::validate_positive(self.request_timeout.as_secs(), "request_timeout", self.domain_name())?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "adt"
    }
}

/// Command-line overlay. Every field is optional; `None` means "use the
/// environment variable or its default". Mirrors the teacher's convention
/// of flags overriding environment, environment overriding built-in
/// defaults.
#[derive(Parser, Debug, Default)]
#[command(name = "adt-mcp-server", about = "MCP tool server for SAP ADT")]
pub struct CliOverlay {
    /// Root of the ADT service
    #[arg(long)]
    pub base_url: Option<String>,

    /// Basic-auth user
    #[arg(long)]
    pub user: Option<String>,

    /// Basic-auth password
    #[arg(long)]
    pub password: Option<String>,

    /// Netscape-format cookie file path
    #[arg(long)]
    pub cookie_file: Option<String>,

    /// Literal `name=value; name=value` cookie string
    #[arg(long)]
    pub cookie_string: Option<String>,

    /// SAP client code
    #[arg(long)]
    pub sap_client: Option<String>,

    /// SAP language
    #[arg(long)]
    pub sap_language: Option<String>,

    /// Disable TLS certificate verification
    #[arg(long)]
    pub insecure_tls: bool,

    /// Use a stateful ADT session
    #[arg(long)]
    pub stateful: bool,

    /// Tool surface size
    #[arg(long, value_enum)]
    pub mode: Option<ToolMode>,

    /// Request timeout in seconds
    #[arg(long)]
    pub request_timeout: Option<u64>,

    /// Verbose (debug) logging
    #[arg(short, long)]
    pub verbose: bool,
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

impl AdtConfig {
    /// Resolve configuration from environment variables, then apply CLI
    /// overrides. Returns `ConfigError::Conflict` if more than one auth
    /// method is supplied, and `ConfigError::Missing` if no base URL or no
    /// auth method is supplied at all.
    pub fn resolve(overlay: &CliOverlay) -> ConfigResult<Self> {
        let base_url = overlay
            .base_url
            .clone()
            .or_else(|| env_nonempty("ADT_BASE_URL"))
            .ok_or_else(|| ConfigError::Missing("base URL (ADT_BASE_URL or --base-url)".to_string()))?;

        let user = overlay.user.clone().or_else(|| env_nonempty("ADT_USER"));
        let password = overlay.password.clone().or_else(|| env_nonempty("ADT_PASSWORD"));
        let cookie_file = overlay.cookie_file.clone().or_else(|| env_nonempty("ADT_COOKIE_FILE"));
        let cookie_string = overlay.cookie_string.clone().or_else(|| env_nonempty("ADT_COOKIE_STRING"));

        let methods_supplied = [
            user.is_some() && password.is_some(),
            cookie_file.is_some(),
            cookie_string.is_some(),
        ]
        .iter()
        .filter(|&&present| present)
        .count();

        if methods_supplied > 1 {
            return Err(ConfigError::Conflict(
                "at most one of basic auth, cookie file, or cookie string may be set".to_string(),
            ));
        }

        let auth = if let (Some(user), Some(password)) = (user, password) {
            AuthMethod::Basic { user, password }
        } else if let Some(path) = cookie_file {
            AuthMethod::CookieFile(path)
        } else if let Some(s) = cookie_string {
            AuthMethod::CookieString(s)
        } else {
            return Err(ConfigError::Missing(
                "authentication: set ADT_USER+ADT_PASSWORD, ADT_COOKIE_FILE, or ADT_COOKIE_STRING".to_string(),
            ));
        };

        let sap_client = overlay
            .sap_client
            .clone()
            .or_else(|| env_nonempty("ADT_SAP_CLIENT"))
            .unwrap_or_else(|| "001".to_string());

        let sap_language = overlay
            .sap_language
            .clone()
            .or_else(|| env_nonempty("ADT_SAP_LANGUAGE"))
            .unwrap_or_else(|| "EN".to_string());

        let insecure_tls = overlay.insecure_tls || env_nonempty("ADT_INSECURE_TLS").is_some();
        let stateful = overlay.stateful || env_nonempty("ADT_STATEFUL").is_some();

        let mode = overlay.mode.unwrap_or_else(|| match env_nonempty("ADT_MODE").as_deref() {
            Some("expert") => ToolMode::Expert,
            _ => ToolMode::Focused,
        });

        let request_timeout = overlay
            .request_timeout
            .or_else(|| env_nonempty("ADT_REQUEST_TIMEOUT").and_then(|v| v.parse().ok()))
            .unwrap_or(30);

        let config = Self {
            base_url,
            auth,
            sap_client,
            sap_language,
            insecure_tls,
            stateful,
            mode,
            request_timeout: Duration::from_secs(request_timeout),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlay() -> CliOverlay {
        CliOverlay {
            base_url: Some("https://sap.example.com:8000".to_string()),
            user: Some("DEVELOPER".to_string()),
            password: Some("secret".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn resolves_basic_auth_with_defaults() {
        let config = AdtConfig::resolve(&overlay()).unwrap();
        assert_eq!(config.sap_client, "001");
        assert_eq!(config.sap_language, "EN");
        assert!(!config.insecure_tls);
        assert!(!config.stateful);
        assert_eq!(config.mode, ToolMode::Focused);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn rejects_conflicting_auth_methods() {
        let mut overlay = overlay();
        overlay.cookie_string = Some("a=b".to_string());
        let err = AdtConfig::resolve(&overlay).unwrap_err();
        assert!(matches!(err, ConfigError::Conflict(_)));
    }

    #[test]
    fn rejects_missing_base_url() {
        let mut overlay = overlay();
        overlay.base_url = None;
        let err = AdtConfig::resolve(&overlay).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
    }

    #[test]
    fn rejects_missing_auth() {
        let mut overlay = overlay();
        overlay.user = None;
        overlay.password = None;
        let err = AdtConfig::resolve(&overlay).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
    }
}

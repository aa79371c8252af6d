//! Session cookies (`Set-Cookie` parsing and a per-session jar)
//!
//! SAP ADT keeps stateful work (locks, CDS preview sessions) pinned to a
//! server instance via `sap-contextid`/`SAP_SESSIONID_*` cookies. The jar
//! here mirrors what the backend hands back so the same session keeps
//! landing on the same application server.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::header::{HeaderValue, InvalidHeaderValue};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CookieError {
    #[error("could not parse cookie: '{0}'")]
    Parse(String),

    #[error("could not parse cookie expiry date: {0}")]
    DateParse(#[from] chrono::ParseError),
}

/// A single `Set-Cookie` value, reduced to the parts the transport cares about.
#[derive(Debug, Clone)]
pub struct Cookie {
    name: String,
    value: String,
    path: Option<String>,
    domain: Option<String>,
    /// SAP marks a cookie for removal by expiring it at the Unix epoch.
    expires: Option<DateTime<Utc>>,
}

impl Cookie {
    pub const SSO2: &'static str = "MYSAPSSO2";
    pub const SAP_SESSIONID: &'static str = "SAP_SESSIONID_";
    pub const CONTEXT_ID: &'static str = "sap-contextid";

    pub fn parse(raw: &str) -> Result<Self, CookieError> {
        let (name, rest) = raw
            .split_once('=')
            .ok_or_else(|| CookieError::Parse(raw.to_string()))?;

        let mut parts = rest.split("; ");
        let value = parts.next().ok_or_else(|| CookieError::Parse(raw.to_string()))?;

        let mut cookie = Self {
            name: name.to_string(),
            value: value.to_string(),
            path: None,
            domain: None,
            expires: None,
        };

        for attr in parts {
            let Some((key, val)) = attr.split_once('=') else {
                continue;
            };
            match key.to_ascii_lowercase().as_str() {
                "expires" => {
                    cookie.expires =
                        Some(NaiveDateTime::parse_from_str(val, "%a, %d-%b-%Y %H:%M:%S %Z")?.and_utc());
                }
                "path" => cookie.path = Some(val.trim_end_matches(';').to_string()),
                "domain" => cookie.domain = Some(val.trim_end_matches(';').to_string()),
                _ => {}
            }
        }

        Ok(cookie)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn as_pair(&self) -> String {
        format!("{}={}", self.name, self.value)
    }

    pub fn is_allowed_for_path(&self, destination_path: &str) -> bool {
        self.path.as_ref().map_or(true, |p| destination_path.contains(p.as_str()))
    }

    pub fn expired(&self) -> bool {
        self.expires.map(|exp| exp < Utc::now()).unwrap_or(false)
    }
}

/// A per-session cookie jar. One jar per `AdtSession`; stateful sessions
/// must not share a jar across concurrent callers.
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    cookies: Vec<Cookie>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn find(&self, name_contains: &str) -> Option<&Cookie> {
        self.cookies.iter().find(|c| c.name.contains(name_contains))
    }

    pub fn set_from_header(&mut self, header: &HeaderValue) -> Result<(), CookieError> {
        let raw = header.to_str().map_err(|_| CookieError::Parse("non-UTF8 Set-Cookie header".to_string()))?;
        self.set_cookie(raw)
    }

    pub fn set_cookie(&mut self, raw: &str) -> Result<(), CookieError> {
        let cookie = Cookie::parse(raw)?;

        if cookie.expired() {
            self.drop_cookie(&cookie.name);
            return Ok(());
        }

        if let Some(existing) = self.cookies.iter_mut().find(|c| c.name == cookie.name) {
            *existing = cookie;
        } else {
            self.cookies.push(cookie);
        }
        Ok(())
    }

    pub fn drop_cookie(&mut self, name: &str) -> Option<Cookie> {
        let pos = self.cookies.iter().position(|c| c.name == name)?;
        Some(self.cookies.remove(pos))
    }

    pub fn to_header_value(&self, destination_path: &str) -> Result<HeaderValue, InvalidHeaderValue> {
        HeaderValue::from_str(
            &self
                .cookies
                .iter()
                .filter(|c| c.is_allowed_for_path(destination_path))
                .map(Cookie::as_pair)
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

impl From<Vec<adt_config::cookiefile::CookieRecord>> for CookieJar {
    fn from(records: Vec<adt_config::cookiefile::CookieRecord>) -> Self {
        let cookies = records
            .into_iter()
            .map(|r| Cookie {
                name: r.name,
                value: r.value,
                path: if r.path.is_empty() { None } else { Some(r.path) },
                domain: if r.domain.is_empty() { None } else { Some(r.domain) },
                expires: if r.expires > 0 {
                    DateTime::from_timestamp(r.expires, 0)
                } else {
                    None
                },
            })
            .collect();
        Self { cookies }
    }
}

/// Build a jar from a literal preloaded cookie map, e.g. parsed from
/// `ADT_COOKIE_STRING`. Exposed for callers that already hold
/// `HashMap<String, String>` pairs instead of `CookieRecord`s.
pub fn jar_from_pairs(pairs: HashMap<String, String>) -> CookieJar {
    let cookies = pairs
        .into_iter()
        .map(|(name, value)| Cookie {
            name,
            value,
            path: None,
            domain: None,
            expires: None,
        })
        .collect();
    CookieJar { cookies }
}

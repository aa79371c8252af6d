//! HTTP transport for the SAP ADT backend: a shared client, CSRF token
//! lifecycle, and cookie-jar session handling.

pub mod client;
pub mod config;
pub mod cookie;
pub mod csrf;
pub mod errors;
pub mod types;

pub use client::{AdtResponse, AdtTransport, Transport};
pub use config::{AuthMode, TransportConfig};
pub use cookie::{Cookie, CookieJar};
pub use errors::TransportError;
pub use types::{HttpMethod, HttpMethodError};

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn jar_from_map_round_trips_a_pair() {
        let mut pairs = HashMap::new();
        pairs.insert("sap-contextid".to_string(), "ABC".to_string());
        let jar = client::jar_from_map(pairs);
        assert_eq!(jar.find("contextid").map(Cookie::value), Some("ABC"));
    }
}

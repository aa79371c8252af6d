//! Mock transport for workflow/ops tests.
//!
//! Grounded on the `RequestDispatch`/mock-HTTP-manager seam the corpus
//! uses for offline testing: canned responses keyed by method + path
//! prefix, with every call recorded so tests can assert call counts (e.g.
//! that `EditSource` makes zero HTTP calls when its pattern doesn't match).

#![cfg(test)]

use std::sync::Mutex;

use adt_transport::{AdtResponse, HttpMethod, Transport, TransportError};
use async_trait::async_trait;
use url::Url;

pub struct Call {
    pub method: HttpMethod,
    pub path: String,
}

#[derive(Default)]
pub struct MockTransport {
    calls: Mutex<Vec<Call>>,
    responses: Mutex<Vec<(HttpMethod, &'static str, Result<(u16, Vec<u8>), u16>)>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, method: HttpMethod, path_prefix: &'static str, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.responses.lock().unwrap().push((method, path_prefix, Ok((status, body.into()))));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        _query: &[(&str, &str)],
        _body: Option<Vec<u8>>,
        _content_type: Option<&str>,
        _accept: Option<&str>,
    ) -> Result<AdtResponse, TransportError> {
        self.calls.lock().unwrap().push(Call { method, path: path.to_string() });

        let responses = self.responses.lock().unwrap();
        let found = responses.iter().find(|(m, prefix, _)| *m == method && path.starts_with(prefix));

        match found {
            Some((_, _, Ok((status, body)))) => Ok(AdtResponse { status: *status, body: body.clone(), headers: Default::default() }),
            Some((_, _, Err(status))) => Err(TransportError::Status { status: *status, body: String::new() }),
            None => Err(TransportError::Status { status: 404, body: format!("no mock for {method} {path}") }),
        }
    }

    fn base_url(&self) -> &Url {
        static URL: std::sync::OnceLock<Url> = std::sync::OnceLock::new();
        URL.get_or_init(|| Url::parse("https://mock.example.com").unwrap())
    }
}

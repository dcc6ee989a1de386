//! Blocking HTTPS fetcher backed by [`reqwest`].

use std::time::Duration;

use tracing::debug;

use super::{FetchError, Fetcher};

/// Upper bound on a single request, connect time included.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Plain GET over a shared blocking client.  No extra headers are sent.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// Build a fetcher with the default request timeout.
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    /// Map a finished response to its body, rejecting non-2xx and empty
    /// bodies.  Split out so the checks can be tested without a server.
    fn body_of(status: reqwest::StatusCode, body: String) -> Result<String, FetchError> {
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        if body.trim().is_empty() {
            return Err(FetchError::EmptyBody);
        }
        Ok(body)
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        debug!(url, "fetching");
        let response = self.client.get(url).send()?;
        let status = response.status();
        let body = response.text()?;
        Self::body_of(status, body)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

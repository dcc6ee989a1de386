//! The HTTP capability the count cache fetches through.
//!
//! This module defines the [`Fetcher`] trait and its error type.  The real
//! implementation lives in [`http`]; tests provide their own canned fetchers.
//!
//! ## For contributors
//!
//! The cache never inspects *why* a fetch failed: every [`FetchError`] is
//! logged and treated as "no data".  Add a variant only if the log line needs
//! to tell the cases apart.

mod http;

pub use http::HttpFetcher;

use thiserror::Error;

/// Why a fetch produced no body.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, TLS, timeout or body-decoding failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with something other than 2xx.
    #[error("unexpected HTTP status {0}")]
    Status(u16),

    /// The server answered 2xx with nothing in the body.
    #[error("empty response body")]
    EmptyBody,
}

/// Trait that every HTTP transport must implement.
///
/// The fetcher is moved onto the status view's worker thread, so
/// implementations must be [`Send`].
pub trait Fetcher: Send {
    /// GET `url` and return the body text.
    fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

impl<F: Fetcher + ?Sized> Fetcher for Box<F> {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        (**self).fetch(url)
    }
}

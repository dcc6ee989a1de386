//! Install/uninstall hooks.
//!
//! [`activate`] seeds every key the cache owns without overwriting anything
//! already present, so running it twice is harmless.  [`deactivate`] removes
//! them all.

use tracing::info;

use crate::cache::DEFAULT_REFRESH_INTERVAL;
use crate::store::{keys, KeyValueStore, StoreError};

/// Host prefix that legacy feed URLs carry in front of the identifier.
const LEGACY_FEED_HOST: &str = "http://feeds.feedburner.com/";

/// The feed identifier inside a legacy feed URL.
///
/// `http://feeds.feedburner.com/example` becomes `example`.  Anything else is
/// returned unchanged.
pub fn feed_identifier_from_url(url: &str) -> &str {
    url.trim()
        .strip_prefix(LEGACY_FEED_HOST)
        .unwrap_or(url.trim())
}

/// Seed defaults for every key that is not yet present.
///
/// `legacy_feed_url`, when given, pre-fills the feed identifier.
pub fn activate<S: KeyValueStore + ?Sized>(
    store: &mut S,
    legacy_feed_url: Option<&str>,
) -> Result<(), StoreError> {
    let feed_uri = legacy_feed_url.map(feed_identifier_from_url).unwrap_or_default();

    let defaults = [
        (keys::FEED_URI, feed_uri),
        (keys::CACHED_COUNT, ""),
        (keys::FALLBACK_TEXT, ""),
        (keys::REFRESH_INTERVAL, DEFAULT_REFRESH_INTERVAL),
        (keys::LAST_CHECKED_AT, ""),
        (keys::AVERAGE_WINDOW, ""),
    ];

    let mut seeded = 0;
    for (key, value) in defaults {
        if !store.exists(key) {
            store.set(key, value)?;
            seeded += 1;
        }
    }
    info!(seeded, "activated");
    Ok(())
}

/// Delete every settings and state key.
pub fn deactivate<S: KeyValueStore + ?Sized>(store: &mut S) -> Result<(), StoreError> {
    for key in keys::ALL {
        store.delete(key)?;
    }
    info!("deactivated");
    Ok(())
}

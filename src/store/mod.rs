//! Durable key/value storage for settings and cached state.
//!
//! Everything the cache remembers between runs (its settings, the last
//! count and when it was checked) is a named string in a [`KeyValueStore`].
//! Key names live in [`keys`] so the cache, the lifecycle hooks and the admin
//! layer agree on them.
//!
//! Two implementations ship with the crate:
//!
//! * [`FileStore`]: a JSON file, used by the binary.
//! * [`MemoryStore`]: a map in memory, for tests and embedding.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

/// Storage failures.  Reads never fail; a missing or unreadable value is
/// simply absent.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Get/set/delete of named string values.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    fn delete(&mut self, key: &str) -> Result<(), StoreError>;

    /// Pick up values written by someone else since the last read.  Stores
    /// nobody else can write need not do anything.
    fn reload(&mut self) {}

    fn exists(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Read a value, treating an empty string the same as an absent key.
    fn get_non_empty(&self, key: &str) -> Option<String> {
        self.get(key).filter(|value| !value.is_empty())
    }
}

/// Names of every persisted value, all under the `feedcount.` prefix.
pub mod keys {
    pub const FEED_URI: &str = "feedcount.feed_uri";
    pub const REFRESH_INTERVAL: &str = "feedcount.refresh_interval";
    pub const FALLBACK_TEXT: &str = "feedcount.fallback_text";
    pub const AVERAGE_WINDOW: &str = "feedcount.average_window";
    pub const LAST_CHECKED_AT: &str = "feedcount.last_checked_at";
    pub const CACHED_COUNT: &str = "feedcount.cached_count";

    /// Every key the crate owns, in the order they are seeded.
    pub const ALL: [&str; 6] = [
        FEED_URI,
        CACHED_COUNT,
        FALLBACK_TEXT,
        REFRESH_INTERVAL,
        LAST_CHECKED_AT,
        AVERAGE_WINDOW,
    ];
}

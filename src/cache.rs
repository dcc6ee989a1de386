//! The count cache: when to re-fetch, what to keep.
//!
//! [`CountCache`] owns the typed settings ([`Config`]) and the cached state
//! ([`State`]) loaded from a [`KeyValueStore`], plus the [`Fetcher`] and
//! [`Clock`] it works through.  Hosts build one, call
//! [`refresh_if_due`](CountCache::refresh_if_due) whenever convenient (on
//! every page view, every tick, every command) and render
//! [`current_display_value`](CountCache::current_display_value).
//!
//! ## Update policy
//!
//! | fetch result              | fallback text set | cached count becomes |
//! |---------------------------|-------------------|----------------------|
//! | positive mean             | either            | the mean             |
//! | failure, no match, or `0` | yes               | the fallback text    |
//! | failure, no match, or `0` | no                | unchanged            |
//!
//! A failed fetch therefore never blanks a known count unless a fallback text
//! is configured, and when one is, it replaces the count on every failure.

use std::fmt;

use chrono::{DateTime, Duration, TimeZone, Utc};
use tracing::{debug, error, info, warn};

use crate::circulation;
use crate::duration::duration_to_seconds;
use crate::fetch::Fetcher;
use crate::store::{keys, KeyValueStore, StoreError};

/// The awareness-API query endpoint.
pub const API_ENDPOINT: &str = "https://feedburner.google.com/api/awareness/1.0/GetFeedData";

/// Check frequency seeded on activation.
pub const DEFAULT_REFRESH_INTERVAL: &str = "3 hours";

/// Display value while no feed identifier is configured.  Rendered verbatim
/// by callers, including where a bare number is expected.
pub const NOT_CONFIGURED: &str = "<!-- Feed count not set up -->";

/// Cached count stored by first-time setup, before any fetch has landed.
pub const AWAITING_FIRST_FETCH: &str = "<!-- Awaiting first fetch -->";

// ---------------------------------------------------------------------------
// Config / State
// ---------------------------------------------------------------------------

/// Persisted settings.  Empty persisted strings load as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Feed identifier in the awareness API.
    pub feed_uri: Option<String>,
    /// How often to re-fetch, as seconds or a phrase (`"3 hours"`).
    pub refresh_interval: Option<String>,
    /// Shown instead of the count whenever no valid count is obtained.
    pub fallback_text: Option<String>,
    /// Average the daily counts over this much history.
    pub average_window: Option<String>,
}

impl Config {
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        Self {
            feed_uri: store.get_non_empty(keys::FEED_URI),
            refresh_interval: store.get_non_empty(keys::REFRESH_INTERVAL),
            fallback_text: store.get_non_empty(keys::FALLBACK_TEXT),
            average_window: store.get_non_empty(keys::AVERAGE_WINDOW),
        }
    }

    /// Write every field, storing `None` as an empty string.
    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<(), StoreError> {
        let fields = [
            (keys::FEED_URI, &self.feed_uri),
            (keys::REFRESH_INTERVAL, &self.refresh_interval),
            (keys::FALLBACK_TEXT, &self.fallback_text),
            (keys::AVERAGE_WINDOW, &self.average_window),
        ];
        for (key, value) in fields {
            store.set(key, value.as_deref().unwrap_or_default())?;
        }
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.feed_uri.as_deref().is_some_and(|uri| !uri.is_empty())
    }

    fn fallback(&self) -> Option<&str> {
        self.fallback_text.as_deref().filter(|text| !text.is_empty())
    }
}

/// Persisted results of the last refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct State {
    pub last_checked_at: Option<DateTime<Utc>>,
    pub cached_count: Option<String>,
}

impl State {
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let last_checked_at = store.get_non_empty(keys::LAST_CHECKED_AT).and_then(|raw| {
            let parsed = raw
                .parse::<i64>()
                .ok()
                .and_then(|secs| Utc.timestamp_opt(secs, 0).single());
            if parsed.is_none() {
                warn!(value = %raw, "ignoring unreadable last-checked timestamp");
            }
            parsed
        });

        Self {
            last_checked_at,
            cached_count: store.get_non_empty(keys::CACHED_COUNT),
        }
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of "now", injectable so refresh timing can be tested.
pub trait Clock: Send {
    fn now(&self) -> DateTime<Utc>;
}

/// The wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// ---------------------------------------------------------------------------
// Refresh outcome
// ---------------------------------------------------------------------------

/// What a call to [`CountCache::refresh`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// No feed identifier; nothing was touched.
    NotConfigured,
    /// The interval has not elapsed; nothing was touched.
    NotDue,
    /// A valid count was fetched and cached.
    Updated(u64),
    /// No valid count; the fallback text was cached.
    FellBack(String),
    /// No valid count and no fallback; the previous value was kept.
    Retained,
}

impl fmt::Display for RefreshOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "not configured"),
            Self::NotDue => write!(f, "not due yet"),
            Self::Updated(count) => write!(f, "updated to {count}"),
            Self::FellBack(text) => write!(f, "no data, showing fallback {text:?}"),
            Self::Retained => write!(f, "no data, kept last count"),
        }
    }
}

// ---------------------------------------------------------------------------
// CountCache
// ---------------------------------------------------------------------------

/// The refresh-and-cache core.  See the [module docs](self).
pub struct CountCache<S, F, K = SystemClock> {
    store: S,
    fetcher: F,
    clock: K,
    config: Config,
    state: State,
}

impl<S: KeyValueStore, F: Fetcher> CountCache<S, F, SystemClock> {
    /// Load settings and state from `store`, using the wall clock.
    pub fn new(store: S, fetcher: F) -> Self {
        Self::with_clock(store, fetcher, SystemClock)
    }
}

impl<S: KeyValueStore, F: Fetcher, K: Clock> CountCache<S, F, K> {
    pub fn with_clock(store: S, fetcher: F, clock: K) -> Self {
        let config = Config::load(&store);
        let state = State::load(&store);
        Self {
            store,
            fetcher,
            clock,
            config,
            state,
        }
    }

    /// Re-read settings and state after something else wrote the store.
    pub fn reload(&mut self) {
        self.store.reload();
        self.config = Config::load(&self.store);
        self.state = State::load(&self.store);
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Direct store access for the admin and lifecycle layers.  Call
    /// [`reload`](Self::reload) after writing.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    /// Whether the refresh interval has elapsed since the last check.
    ///
    /// Anything missing or unparseable counts as due, so a broken interval
    /// setting degrades to refreshing every time rather than never.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        let Some(interval) = self.config.refresh_interval.as_deref() else {
            return true;
        };
        let Some(last_checked_at) = self.state.last_checked_at else {
            return true;
        };
        let Some(interval_secs) = duration_to_seconds(interval) else {
            warn!(interval, "unparseable refresh interval, treating as due");
            return true;
        };
        now.timestamp() - interval_secs > last_checked_at.timestamp()
    }

    /// The awareness-API query for the configured feed.
    ///
    /// With an averaging window, a `dates=<start>,<end>` range ending at
    /// `now` is appended.  A window that does not parse is left out.
    pub fn build_request_uri(&self, now: DateTime<Utc>) -> String {
        let feed_uri = self.config.feed_uri.as_deref().unwrap_or_default();
        let mut uri = format!("{API_ENDPOINT}?uri={}", encode(feed_uri));

        if let Some(window) = self.config.average_window.as_deref() {
            match date_range(window, now) {
                Some(range) => {
                    uri.push_str("&dates=");
                    uri.push_str(&encode(&range));
                }
                None => warn!(window, "unparseable average window, not averaging"),
            }
        }

        uri
    }

    /// Refresh now if the interval has elapsed.
    pub fn refresh_if_due(&mut self) -> RefreshOutcome {
        self.refresh(false)
    }

    /// Fetch, parse and apply the update policy.
    ///
    /// Does nothing unless the cache is configured and either `force` is set
    /// or the refresh is due.  Otherwise the check time is stamped first, so
    /// a failing fetch is not retried until the next interval.
    pub fn refresh(&mut self, force: bool) -> RefreshOutcome {
        if !self.is_configured() {
            debug!("refresh skipped, no feed identifier");
            return RefreshOutcome::NotConfigured;
        }

        let now = self.clock.now();
        if !force && !self.is_due(now) {
            debug!("refresh skipped, not due");
            return RefreshOutcome::NotDue;
        }

        self.state.last_checked_at = Some(now);
        self.persist(keys::LAST_CHECKED_AT, &now.timestamp().to_string());

        let uri = self.build_request_uri(now);
        let candidate = match self.fetcher.fetch(&uri) {
            Ok(body) => {
                let candidate = circulation::candidate_count(&body);
                if candidate.is_none() {
                    warn!("response carried no circulation values");
                }
                candidate
            }
            Err(e) => {
                warn!("fetch failed: {e}");
                None
            }
        };

        self.apply_candidate(candidate)
    }

    /// The value to show: the cached count, or the not-configured sentinel.
    pub fn current_display_value(&self) -> &str {
        if !self.is_configured() {
            return NOT_CONFIGURED;
        }
        self.state.cached_count.as_deref().unwrap_or_default()
    }

    fn apply_candidate(&mut self, candidate: Option<u64>) -> RefreshOutcome {
        if let Some(count) = candidate.filter(|&count| count > 0) {
            info!(count, "count updated");
            self.set_cached_count(count.to_string());
            return RefreshOutcome::Updated(count);
        }

        match self.config.fallback().map(str::to_string) {
            Some(text) => {
                info!(fallback = %text, "no valid count, using fallback text");
                self.set_cached_count(text.clone());
                RefreshOutcome::FellBack(text)
            }
            None => {
                info!("no valid count, keeping last value");
                RefreshOutcome::Retained
            }
        }
    }

    fn set_cached_count(&mut self, value: String) {
        self.persist(keys::CACHED_COUNT, &value);
        self.state.cached_count = Some(value);
    }

    /// Store writes during a refresh are logged, never surfaced.
    fn persist(&mut self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            error!(key, "failed to persist: {e}");
        }
    }
}

/// `"<start>,<end>"` calendar dates for an averaging window ending at `now`.
fn date_range(window: &str, now: DateTime<Utc>) -> Option<String> {
    let secs = duration_to_seconds(window)?;
    let start = now.checked_sub_signed(Duration::try_seconds(secs)?)?;
    Some(format!("{},{}", start.format("%Y-%m-%d"), now.format("%Y-%m-%d")))
}

/// Query-string encoding: spaces become `+`, reserved characters are
/// percent-escaped.
fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::testing::{test_now as now, StubFetcher, TestClock};

    /// A store whose writes can be made to fail.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_writes: bool,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Option<String> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
            if self.fail_writes {
                return Err(StoreError::Io(std::io::Error::other("disk full")));
            }
            self.inner.set(key, value)
        }

        fn delete(&mut self, key: &str) -> Result<(), StoreError> {
            self.inner.delete(key)
        }
    }

    fn configured_store(extra: &[(&'static str, &'static str)]) -> MemoryStore {
        let mut store = MemoryStore::with_values([
            (keys::FEED_URI, "example"),
            (keys::REFRESH_INTERVAL, "3 hours"),
        ]);
        for (k, v) in extra {
            store.set(k, v).unwrap();
        }
        store
    }

    fn cache_with(
        store: MemoryStore,
        fetcher: StubFetcher,
    ) -> CountCache<MemoryStore, StubFetcher, TestClock> {
        CountCache::with_clock(store, fetcher, TestClock::at(now()))
    }

    // -- configuration -------------------------------------------------------

    #[test]
    fn empty_store_is_not_configured() {
        let fetcher = StubFetcher::serving(r#"circulation="42""#);
        let mut cache = cache_with(MemoryStore::new(), fetcher.clone());

        assert!(!cache.is_configured());
        assert_eq!(cache.current_display_value(), NOT_CONFIGURED);
        assert_eq!(cache.refresh(true), RefreshOutcome::NotConfigured);
        assert_eq!(fetcher.call_count(), 0);
        assert!(!cache.store().exists(keys::LAST_CHECKED_AT));
    }

    #[test]
    fn empty_feed_uri_is_not_configured() {
        let store = MemoryStore::with_values([(keys::FEED_URI, ""), (keys::CACHED_COUNT, "9")]);
        let cache = cache_with(store, StubFetcher::failing());
        assert!(!cache.is_configured());
        assert_eq!(cache.current_display_value(), NOT_CONFIGURED);
    }

    #[test]
    fn empty_persisted_strings_load_as_none() {
        let store = MemoryStore::with_values([
            (keys::FEED_URI, "example"),
            (keys::REFRESH_INTERVAL, ""),
            (keys::FALLBACK_TEXT, ""),
            (keys::AVERAGE_WINDOW, ""),
            (keys::LAST_CHECKED_AT, ""),
            (keys::CACHED_COUNT, ""),
        ]);
        let config = Config::load(&store);
        let state = State::load(&store);

        assert_eq!(config.feed_uri.as_deref(), Some("example"));
        assert_eq!(config.refresh_interval, None);
        assert_eq!(config.fallback_text, None);
        assert_eq!(config.average_window, None);
        assert_eq!(state, State::default());
    }

    #[test]
    fn unreadable_timestamp_loads_as_never_checked() {
        let store = MemoryStore::with_values([(keys::LAST_CHECKED_AT, "yesterday")]);
        assert_eq!(State::load(&store).last_checked_at, None);
    }

    #[test]
    fn config_save_writes_none_as_empty() {
        let mut store = MemoryStore::new();
        let config = Config {
            feed_uri: Some("example".into()),
            refresh_interval: Some("1 day".into()),
            fallback_text: None,
            average_window: None,
        };
        config.save(&mut store).unwrap();

        assert_eq!(store.get(keys::FALLBACK_TEXT).as_deref(), Some(""));
        assert_eq!(Config::load(&store), config);
    }

    #[test]
    fn reload_picks_up_store_writes() {
        let mut cache = cache_with(MemoryStore::new(), StubFetcher::failing());
        cache.store_mut().set(keys::FEED_URI, "example").unwrap();
        assert!(!cache.is_configured());

        cache.reload();
        assert!(cache.is_configured());
    }

    // -- staleness -----------------------------------------------------------

    #[test]
    fn due_when_never_checked_whatever_the_interval() {
        for interval in ["1 hour", "100 years", "bogus"] {
            let store = MemoryStore::with_values([
                (keys::FEED_URI, "example"),
                (keys::REFRESH_INTERVAL, interval),
            ]);
            let cache = cache_with(store, StubFetcher::failing());
            assert!(cache.is_due(now()), "interval {interval:?}");
        }
    }

    #[test]
    fn due_when_interval_unset_or_unparseable() {
        let checked = (now().timestamp() - 10).to_string();

        let store = MemoryStore::with_values([
            (keys::FEED_URI, "example"),
            (keys::LAST_CHECKED_AT, checked.as_str()),
        ]);
        assert!(cache_with(store, StubFetcher::failing()).is_due(now()));

        let store = MemoryStore::with_values([
            (keys::FEED_URI, "example"),
            (keys::REFRESH_INTERVAL, "bogus"),
            (keys::LAST_CHECKED_AT, checked.as_str()),
        ]);
        assert!(cache_with(store, StubFetcher::failing()).is_due(now()));
    }

    #[test]
    fn due_only_after_interval_elapses() {
        let at = |ago: i64| {
            let checked = (now().timestamp() - ago).to_string();
            let store = MemoryStore::with_values([
                (keys::FEED_URI, "example"),
                (keys::REFRESH_INTERVAL, "1 hour"),
                (keys::LAST_CHECKED_AT, checked.as_str()),
            ]);
            cache_with(store, StubFetcher::failing()).is_due(now())
        };

        assert!(at(3_700));
        assert!(!at(100));
        assert!(!at(3_600), "exactly one interval is not yet due");
        assert!(at(3_601));
    }

    // -- request URI ---------------------------------------------------------

    #[test]
    fn request_uri_without_window() {
        let cache = cache_with(configured_store(&[]), StubFetcher::failing());
        assert_eq!(
            cache.build_request_uri(now()),
            "https://feedburner.google.com/api/awareness/1.0/GetFeedData?uri=example"
        );
    }

    #[test]
    fn request_uri_encodes_identifier() {
        let store = MemoryStore::with_values([(keys::FEED_URI, "my feed/x&y")]);
        let cache = cache_with(store, StubFetcher::failing());
        assert!(cache
            .build_request_uri(now())
            .ends_with("?uri=my+feed%2Fx%26y"));
    }

    #[test]
    fn request_uri_with_window_appends_date_range() {
        let cache = cache_with(
            configured_store(&[(keys::AVERAGE_WINDOW, "2 days")]),
            StubFetcher::failing(),
        );
        assert_eq!(
            cache.build_request_uri(now()),
            "https://feedburner.google.com/api/awareness/1.0/GetFeedData?uri=example\
             &dates=2026-10-15%2C2026-10-17"
        );
    }

    #[test]
    fn request_uri_window_crosses_month_boundary() {
        let cache = cache_with(
            configured_store(&[(keys::AVERAGE_WINDOW, "3 weeks")]),
            StubFetcher::failing(),
        );
        assert!(cache
            .build_request_uri(now())
            .ends_with("&dates=2026-09-26%2C2026-10-17"));
    }

    #[test]
    fn request_uri_ignores_unparseable_window() {
        let cache = cache_with(
            configured_store(&[(keys::AVERAGE_WINDOW, "fortnightly")]),
            StubFetcher::failing(),
        );
        assert!(!cache.build_request_uri(now()).contains("dates="));
    }

    // -- update policy -------------------------------------------------------

    #[test]
    fn failure_without_fallback_keeps_previous_count() {
        let fetcher = StubFetcher::failing();
        let mut cache = cache_with(configured_store(&[(keys::CACHED_COUNT, "17")]), fetcher.clone());

        assert_eq!(cache.refresh(true), RefreshOutcome::Retained);
        assert_eq!(cache.current_display_value(), "17");
        assert_eq!(cache.store().get(keys::CACHED_COUNT).as_deref(), Some("17"));
        assert_eq!(fetcher.call_count(), 1);
    }

    #[test]
    fn failure_with_fallback_overwrites_previous_count() {
        let mut cache = cache_with(
            configured_store(&[(keys::CACHED_COUNT, "17"), (keys::FALLBACK_TEXT, "N/A")]),
            StubFetcher::failing(),
        );

        assert_eq!(cache.refresh(true), RefreshOutcome::FellBack("N/A".into()));
        assert_eq!(cache.current_display_value(), "N/A");
        assert_eq!(cache.store().get(keys::CACHED_COUNT).as_deref(), Some("N/A"));
    }

    #[test]
    fn body_without_circulation_is_treated_like_failure() {
        let body = r#"<rsp stat="fail"><err code="1" msg="Feed Not Found" /></rsp>"#;

        let mut cache = cache_with(
            configured_store(&[(keys::CACHED_COUNT, "17")]),
            StubFetcher::serving(body),
        );
        assert_eq!(cache.refresh(true), RefreshOutcome::Retained);
        assert_eq!(cache.current_display_value(), "17");

        let mut cache = cache_with(
            configured_store(&[(keys::CACHED_COUNT, "17"), (keys::FALLBACK_TEXT, "N/A")]),
            StubFetcher::serving(body),
        );
        assert_eq!(cache.refresh(true), RefreshOutcome::FellBack("N/A".into()));
    }

    #[test]
    fn zero_count_is_invalid() {
        let body = r#"<entry circulation="0" />"#;

        let mut cache = cache_with(
            configured_store(&[(keys::CACHED_COUNT, "17")]),
            StubFetcher::serving(body),
        );
        assert_eq!(cache.refresh(true), RefreshOutcome::Retained);
        assert_eq!(cache.current_display_value(), "17");

        let mut cache = cache_with(
            configured_store(&[(keys::CACHED_COUNT, "17"), (keys::FALLBACK_TEXT, "soon")]),
            StubFetcher::serving(body),
        );
        assert_eq!(cache.refresh(true), RefreshOutcome::FellBack("soon".into()));
        assert_eq!(cache.current_display_value(), "soon");
    }

    #[test]
    fn valid_count_replaces_fallback_text() {
        let mut cache = cache_with(
            configured_store(&[(keys::CACHED_COUNT, "N/A"), (keys::FALLBACK_TEXT, "N/A")]),
            StubFetcher::serving(r#"<entry circulation="5" />"#),
        );
        assert_eq!(cache.refresh(true), RefreshOutcome::Updated(5));
        assert_eq!(cache.current_display_value(), "5");
    }

    #[test]
    fn averages_daily_counts() {
        let body = r#"<entry circulation="10" /><entry circulation="20" /><entry circulation="15" />"#;
        let fetcher = StubFetcher::serving(body);
        let mut cache = cache_with(
            configured_store(&[(keys::AVERAGE_WINDOW, "3 days")]),
            fetcher.clone(),
        );

        assert_eq!(cache.refresh(true), RefreshOutcome::Updated(15));
        let calls = fetcher.calls();
        assert!(calls[0].contains("&dates=2026-10-14%2C2026-10-17"));
    }

    #[test]
    fn store_failure_does_not_abort_refresh() {
        let mut store = FlakyStore::default();
        store.set(keys::FEED_URI, "example").unwrap();
        store.fail_writes = true;

        let mut cache = CountCache::with_clock(
            store,
            StubFetcher::serving(r#"circulation="42""#),
            TestClock::at(now()),
        );
        assert_eq!(cache.refresh(true), RefreshOutcome::Updated(42));
        assert_eq!(cache.current_display_value(), "42");
        assert_eq!(cache.state().last_checked_at, Some(now()));
    }

    // -- end to end ----------------------------------------------------------

    #[test]
    fn forced_refresh_then_not_due_then_due_again() {
        let fetcher = StubFetcher::serving(r#"<entry date="2026-10-16" circulation="42" />"#);
        let clock = TestClock::at(now());
        let mut cache = CountCache::with_clock(configured_store(&[]), fetcher.clone(), clock.clone());

        assert_eq!(cache.refresh(true), RefreshOutcome::Updated(42));
        assert_eq!(cache.current_display_value(), "42");
        assert_eq!(cache.state().last_checked_at, Some(now()));
        assert_eq!(
            cache.store().get(keys::LAST_CHECKED_AT),
            Some(now().timestamp().to_string())
        );

        assert_eq!(cache.refresh_if_due(), RefreshOutcome::NotDue);
        assert_eq!(cache.current_display_value(), "42");
        assert_eq!(fetcher.call_count(), 1);

        clock.advance(3 * 3_600 + 1);
        assert_eq!(cache.refresh_if_due(), RefreshOutcome::Updated(42));
        assert_eq!(fetcher.call_count(), 2);
    }

    #[test]
    fn force_bypasses_interval() {
        let fetcher = StubFetcher::serving(r#"circulation="7""#);
        let mut cache = cache_with(configured_store(&[]), fetcher.clone());

        cache.refresh(true);
        cache.refresh(true);
        assert_eq!(fetcher.call_count(), 2);
    }

    #[test]
    fn failed_fetch_still_stamps_check_time() {
        let clock = TestClock::at(now());
        let fetcher = StubFetcher::failing();
        let mut cache = CountCache::with_clock(configured_store(&[]), fetcher.clone(), clock);

        cache.refresh_if_due();
        assert_eq!(cache.state().last_checked_at, Some(now()));
        assert_eq!(cache.refresh_if_due(), RefreshOutcome::NotDue);
        assert_eq!(fetcher.call_count(), 1);
    }

    #[test]
    fn state_survives_a_new_cache_over_the_same_store() {
        let mut cache = cache_with(configured_store(&[]), StubFetcher::serving(r#"circulation="42""#));
        cache.refresh(true);

        let store = cache.store().clone();
        let reopened = cache_with(store, StubFetcher::failing());
        assert_eq!(reopened.current_display_value(), "42");
        assert!(!reopened.is_due(now()));
    }

    #[test]
    fn outcome_display() {
        assert_eq!(RefreshOutcome::Updated(42).to_string(), "updated to 42");
        assert_eq!(
            RefreshOutcome::FellBack("N/A".into()).to_string(),
            "no data, showing fallback \"N/A\""
        );
        assert_eq!(RefreshOutcome::Retained.to_string(), "no data, kept last count");
    }
}

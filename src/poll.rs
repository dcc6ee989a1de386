//! Background refresh worker for the status view.
//!
//! A dedicated thread owns the [`CountCache`].  It asks the cache to refresh
//! on a fixed tick (the cache itself decides whether that is due) and
//! whenever the UI requests an "update now".  After every attempt it sends a
//! [`Snapshot`] to the UI thread over an [`mpsc`] channel.
//!
//! ## For contributors
//!
//! Other processes may change the store while the view runs (`feedcount
//! configure` from another shell).  The worker reloads the cache before every
//! attempt, so new settings take effect on the next tick.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::cache::{Clock, Config, CountCache, RefreshOutcome};
use crate::fetch::Fetcher;
use crate::store::KeyValueStore;

/// How often the worker asks the cache whether a refresh is due.
pub const CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// Requests from the UI thread to the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Refresh now, ignoring the interval.
    ForceRefresh,
}

/// Everything the status view shows, captured after one refresh attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub display_value: String,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub config: Config,
    pub request_uri: String,
    pub outcome: RefreshOutcome,
    pub taken_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn capture<S, F, K>(cache: &CountCache<S, F, K>, outcome: RefreshOutcome) -> Self
    where
        S: KeyValueStore,
        F: Fetcher,
        K: Clock,
    {
        let now = cache.now();
        Self {
            display_value: cache.current_display_value().to_string(),
            last_checked_at: cache.state().last_checked_at,
            config: cache.config().clone(),
            request_uri: cache.build_request_uri(now),
            outcome,
            taken_at: now,
        }
    }
}

/// Handle to a running worker.
pub struct Poller {
    /// Drained by the main loop on every tick.
    pub snapshots: mpsc::Receiver<Snapshot>,
    commands: mpsc::Sender<Command>,
}

impl Poller {
    /// Ask the worker to refresh now.  Ignored if the worker has stopped.
    pub fn force_refresh(&self) {
        let _ = self.commands.send(Command::ForceRefresh);
    }
}

/// Spawn the worker with the default [`CHECK_INTERVAL`].
pub fn spawn<S, F, K>(cache: CountCache<S, F, K>) -> Poller
where
    S: KeyValueStore + 'static,
    F: Fetcher + 'static,
    K: Clock + 'static,
{
    spawn_with_interval(cache, CHECK_INTERVAL)
}

/// Spawn the worker, checking for a due refresh every `interval`.
///
/// The thread stops once the [`Poller`] is dropped (either channel end
/// closing is enough).
pub fn spawn_with_interval<S, F, K>(mut cache: CountCache<S, F, K>, interval: Duration) -> Poller
where
    S: KeyValueStore + 'static,
    F: Fetcher + 'static,
    K: Clock + 'static,
{
    let (snapshot_tx, snapshot_rx) = mpsc::channel();
    let (command_tx, command_rx) = mpsc::channel();

    thread::spawn(move || {
        let mut force = false;
        loop {
            cache.reload();
            let outcome = cache.refresh(force);
            debug!(%outcome, force, "refresh attempted");

            // If the receiver is gone the UI has exited; stop polling.
            if snapshot_tx.send(Snapshot::capture(&cache, outcome)).is_err() {
                return;
            }

            force = match command_rx.recv_timeout(interval) {
                Ok(Command::ForceRefresh) => true,
                Err(RecvTimeoutError::Timeout) => false,
                Err(RecvTimeoutError::Disconnected) => return,
            };
        }
    });

    Poller {
        snapshots: snapshot_rx,
        commands: command_tx,
    }
}

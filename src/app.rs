//! State of the interactive status view.

use crate::cache::RefreshOutcome;
use crate::poll::Snapshot;

pub struct App {
    /// Latest state reported by the worker; `None` until the first report.
    pub snapshot: Option<Snapshot>,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Last refresh status message.
    pub status: String,
    /// Set by the "update now" key, cleared once the request is sent.
    refresh_requested: bool,
}

impl App {
    pub fn new() -> Self {
        Self {
            snapshot: None,
            quit: false,
            status: "Starting…".into(),
            refresh_requested: false,
        }
    }

    /// Take in a worker report and describe it in the status line.
    pub fn apply(&mut self, snapshot: Snapshot) {
        let at = snapshot.taken_at.format("%H:%M:%S");
        self.status = match &snapshot.outcome {
            RefreshOutcome::NotDue => format!("{at} up to date"),
            RefreshOutcome::NotConfigured => "Not configured, run `feedcount configure`".into(),
            outcome => format!("{at} {outcome}"),
        };
        self.snapshot = Some(snapshot);
    }

    // -- actions -------------------------------------------------------------

    pub fn request_refresh(&mut self) {
        self.refresh_requested = true;
        self.status = "Refreshing…".into();
    }

    /// Whether an "update now" is pending; clears the request.
    pub fn take_refresh_request(&mut self) -> bool {
        std::mem::take(&mut self.refresh_requested)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

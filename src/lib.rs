//! feedcount: a feed's subscriber count, fetched on a schedule and cached for
//! display.
//!
//! ## Architecture overview
//!
//! ```text
//!                 ┌────────────┐  GET   ┌──────────────┐
//!   host ───────► │  cache.rs  │ ─────► │   fetch/     │ ──► awareness API
//!  (refresh,      │ CountCache │        │ (Fetcher)    │
//!   display)      └────────────┘        └──────────────┘
//!                   │    ▲
//!        get / set  ▼    │ parse + mean
//!                 ┌────────────┐        ┌──────────────┐
//!                 │  store/    │        │circulation.rs│
//!                 └────────────┘        └──────────────┘
//! ```
//!
//! * **`cache`**: the staleness check, request URI and update policy.
//! * **`duration`**: `"3 hours"`-style phrases to seconds.
//! * **`circulation`**: pulls daily counts out of a response and averages them.
//! * **`fetch/`**: the [`Fetcher`](fetch::Fetcher) trait and the HTTPS client.
//! * **`store/`**: the [`KeyValueStore`](store::KeyValueStore) trait, a JSON
//!   file store and an in-memory one.
//! * **`lifecycle`**: seeding and removing every key.
//! * **`admin`**: validated settings changes and first-time setup.
//! * **`poll`**, **`app`**, **`ui`**, **`input`**: the interactive status view.

pub mod admin;
pub mod app;
pub mod cache;
pub mod circulation;
pub mod duration;
pub mod fetch;
pub mod input;
pub mod lifecycle;
pub mod poll;
pub mod store;
pub mod ui;

#[cfg(test)]
mod testing;

pub use cache::{CountCache, RefreshOutcome};

//! Validated settings changes.
//!
//! Nothing reaches the store as settings without passing through an
//! [`OptionsForm`].  [`submit`] validates the form, persists it, and on
//! first-time setup runs the first forced refresh so the count is
//! available straight away.

use thiserror::Error;
use tracing::info;

use crate::cache::{Clock, Config, CountCache, RefreshOutcome, AWAITING_FIRST_FETCH};
use crate::duration::duration_to_seconds;
use crate::fetch::Fetcher;
use crate::store::{keys, KeyValueStore, StoreError};

/// What to show when no valid count can be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    /// Keep showing the last cached value.
    KeepLast,
    /// Replace the cached value with this text.
    Text(String),
}

/// The settings a user can change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionsForm {
    pub feed_uri: String,
    pub refresh_interval: String,
    /// `Some` when averaging is enabled, holding the window phrase.
    pub average_window: Option<String>,
    pub when_unavailable: Unavailable,
}

/// A rejected form field.  Messages are shown to the user as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("The feed identifier is required")]
    MissingFeedUri,
    #[error("Revise the checking frequency")]
    InvalidRefreshInterval,
    #[error("Revise the average calculation date setting")]
    InvalidAverageWindow,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("{}", join_messages(.0))]
    Invalid(Vec<FormError>),
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn join_messages(errors: &[FormError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl OptionsForm {
    /// Pre-fill a form from the current settings.
    pub fn from_config(config: &Config) -> Self {
        Self {
            feed_uri: config.feed_uri.clone().unwrap_or_default(),
            refresh_interval: config.refresh_interval.clone().unwrap_or_default(),
            average_window: config.average_window.clone(),
            when_unavailable: match &config.fallback_text {
                Some(text) => Unavailable::Text(text.clone()),
                None => Unavailable::KeepLast,
            },
        }
    }

    /// Every rule the form breaks, in field order.  Empty means valid.
    pub fn validate(&self) -> Vec<FormError> {
        let mut errors = Vec::new();
        if self.feed_uri.trim().is_empty() {
            errors.push(FormError::MissingFeedUri);
        }
        if duration_to_seconds(&self.refresh_interval).is_none() {
            errors.push(FormError::InvalidRefreshInterval);
        }
        if let Some(window) = &self.average_window {
            if duration_to_seconds(window).is_none() {
                errors.push(FormError::InvalidAverageWindow);
            }
        }
        errors
    }

    /// The settings record this form describes.  An empty fallback text
    /// means "keep the last value".
    pub fn to_config(&self) -> Config {
        let non_empty = |text: &str| Some(text.trim().to_string()).filter(|t| !t.is_empty());
        Config {
            feed_uri: non_empty(&self.feed_uri),
            refresh_interval: non_empty(&self.refresh_interval),
            fallback_text: match &self.when_unavailable {
                Unavailable::KeepLast => None,
                Unavailable::Text(text) => Some(text.clone()).filter(|t| !t.is_empty()),
            },
            average_window: self.average_window.as_deref().and_then(non_empty),
        }
    }
}

/// Validate and persist `form`.
///
/// When the cache had no feed identifier before, the cached count is set to
/// [`AWAITING_FIRST_FETCH`] and a forced refresh runs once the new settings
/// are stored; its outcome is returned.  Later submissions only persist.
pub fn submit<S, F, K>(
    cache: &mut CountCache<S, F, K>,
    form: &OptionsForm,
) -> Result<Option<RefreshOutcome>, SubmitError>
where
    S: KeyValueStore,
    F: Fetcher,
    K: Clock,
{
    let errors = form.validate();
    if !errors.is_empty() {
        return Err(SubmitError::Invalid(errors));
    }

    let first_setup = !cache.is_configured();
    if first_setup {
        cache.store_mut().set(keys::CACHED_COUNT, AWAITING_FIRST_FETCH)?;
    }
    form.to_config().save(cache.store_mut())?;
    cache.reload();
    info!(first_setup, "settings saved");

    Ok(first_setup.then(|| cache.refresh(true)))
}

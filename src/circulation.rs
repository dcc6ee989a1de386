//! Extracting the subscriber count from an awareness-API response.
//!
//! The API answers with XML where every day of data is an `<entry>` element
//! carrying a `circulation="<n>"` attribute.  Only that attribute matters, so
//! the body is scanned with a literal pattern instead of being parsed as XML:
//! a response that is not well-formed still yields whatever counts it holds.
//!
//! When an averaging window is configured the response carries one entry per
//! day, and the candidate count is their mean.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

fn circulation_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"circulation="(\d+)""#).expect("circulation pattern is a valid regex")
    })
}

/// Every `circulation="<digits>"` value in the body, in document order.
///
/// The match is case-sensitive.  The pattern only admits digits, so the one
/// way a value can fail to parse is overflow; such values saturate at
/// `u64::MAX` and still count towards the mean.
pub fn circulation_values(body: &str) -> Vec<u64> {
    circulation_pattern()
        .captures_iter(body)
        .map(|caps| {
            caps[1].parse::<u64>().unwrap_or_else(|e| {
                debug!(value = &caps[1], "saturating oversized circulation: {e}");
                u64::MAX
            })
        })
        .collect()
}

/// Arithmetic mean of `values`, rounded half away from zero.
///
/// Returns `None` for an empty slice.  The computation is done in integers so
/// that ties are exact: `[10, 11]` gives `11`, never `10`.
pub fn rounded_mean(values: &[u64]) -> Option<u64> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as u128;
    let sum: u128 = values.iter().map(|&v| u128::from(v)).sum();
    // floor((sum / n) + 1/2) without leaving integer arithmetic.
    let mean = (2 * sum + n) / (2 * n);
    u64::try_from(mean).ok()
}

/// The candidate count carried by an API response body, if any.
pub fn candidate_count(body: &str) -> Option<u64> {
    rounded_mean(&circulation_values(body))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Relative-time phrases resolved to a number of seconds.
//!
//! Intervals are typed by a person (`"3 hours"`, `"2 days"`, `"4 weeks"`) or
//! given as a plain number of seconds (`"3600"`).  Phrases are resolved as a
//! forward offset from the Unix epoch, so calendar units are deterministic:
//! `"1 month"` is always the 31 days of January 1970 and `"1 year"` is 365
//! days.
//!
//! ## Accepted grammar
//!
//! ```text
//! phrase := sign* term+ ["ago"]
//! term   := [+-]?digits unit
//! unit   := sec | min | hour | day | week | fortnight | month | year  (and plurals)
//! ```
//!
//! Numbers must be written with digits (`"two days"` is rejected).

use std::sync::OnceLock;

use chrono::{DateTime, Duration, Months, TimeZone, Utc};
use regex::Regex;

/// One `<amount> <unit>` term, anchored at the start of the remaining input.
fn term_pattern() -> &'static Regex {
    static TERM: OnceLock<Regex> = OnceLock::new();
    TERM.get_or_init(|| {
        Regex::new(r"^([+-]?\d+)\s*([A-Za-z]+)\s*").expect("term pattern is a valid regex")
    })
}

/// What a unit contributes to the offset.
enum Unit {
    Seconds(i64),
    Months(i64),
}

fn unit_for(word: &str) -> Option<Unit> {
    let unit = match word.to_ascii_lowercase().as_str() {
        "sec" | "secs" | "second" | "seconds" => Unit::Seconds(1),
        "min" | "mins" | "minute" | "minutes" => Unit::Seconds(60),
        "hour" | "hours" => Unit::Seconds(3_600),
        "day" | "days" => Unit::Seconds(86_400),
        "week" | "weeks" => Unit::Seconds(604_800),
        "fortnight" | "fortnights" => Unit::Seconds(1_209_600),
        "month" | "months" => Unit::Months(1),
        "year" | "years" => Unit::Months(12),
        _ => return None,
    };
    Some(unit)
}

/// Convert a duration setting into seconds.
///
/// Returns `None` when the text is neither a positive integer nor a phrase
/// that resolves to a positive offset.  Leading sign characters are ignored,
/// so `"-2 days"` means the same as `"2 days"`, while `"2 days ago"` resolves
/// backwards and is rejected.
pub fn duration_to_seconds(text: &str) -> Option<i64> {
    let text = text.trim();

    if let Ok(seconds) = text.parse::<i64>() {
        return (seconds > 0).then_some(seconds);
    }

    let mut rest = text.trim_start_matches(['+', '-']).trim_start();
    if rest.is_empty() {
        return None;
    }

    let mut seconds: i64 = 0;
    let mut months: i64 = 0;
    let mut backwards = false;

    while !rest.is_empty() {
        if rest.eq_ignore_ascii_case("ago") {
            backwards = true;
            break;
        }

        let caps = term_pattern().captures(rest)?;
        let amount: i64 = caps[1].parse().ok()?;
        match unit_for(&caps[2])? {
            Unit::Seconds(factor) => {
                seconds = seconds.checked_add(amount.checked_mul(factor)?)?;
            }
            Unit::Months(factor) => {
                months = months.checked_add(amount.checked_mul(factor)?)?;
            }
        }
        rest = &rest[caps[0].len()..];
    }

    if backwards {
        seconds = -seconds;
        months = -months;
    }

    let resolved = resolve_from_epoch(seconds, months)?;
    (resolved > 0).then_some(resolved)
}

/// Apply the accumulated offset to the epoch and return the resulting
/// timestamp.  Calendar months are applied first, then fixed seconds.
fn resolve_from_epoch(seconds: i64, months: i64) -> Option<i64> {
    let mut at: DateTime<Utc> = Utc.timestamp_opt(0, 0).single()?;

    let month_count = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    at = if months >= 0 {
        at.checked_add_months(month_count)?
    } else {
        at.checked_sub_months(month_count)?
    };

    at = at.checked_add_signed(Duration::try_seconds(seconds)?)?;
    Some(at.timestamp())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_seconds() {
        assert_eq!(duration_to_seconds("3600"), Some(3600));
        assert_eq!(duration_to_seconds(" 90 "), Some(90));
    }

    #[test]
    fn zero_and_negative_numbers_are_rejected() {
        assert_eq!(duration_to_seconds("0"), None);
        assert_eq!(duration_to_seconds("-30"), None);
    }

    #[test]
    fn single_unit_phrases() {
        assert_eq!(duration_to_seconds("1 hour"), Some(3_600));
        assert_eq!(duration_to_seconds("3 hours"), Some(10_800));
        assert_eq!(duration_to_seconds("10 minutes"), Some(600));
        assert_eq!(duration_to_seconds("2 days"), Some(172_800));
        assert_eq!(duration_to_seconds("4 weeks"), Some(2_419_200));
        assert_eq!(duration_to_seconds("1 fortnight"), Some(1_209_600));
    }

    #[test]
    fn unit_words_are_case_insensitive_and_spacing_is_optional() {
        assert_eq!(duration_to_seconds("3 HOURS"), Some(10_800));
        assert_eq!(duration_to_seconds("3hours"), Some(10_800));
    }

    #[test]
    fn compound_phrases_add_up() {
        assert_eq!(duration_to_seconds("1 week 2 days"), Some(777_600));
        assert_eq!(duration_to_seconds("1 hour 30 minutes"), Some(5_400));
    }

    #[test]
    fn leading_sign_is_stripped() {
        assert_eq!(duration_to_seconds("+2 days"), Some(172_800));
        assert_eq!(duration_to_seconds("-2 days"), Some(172_800));
    }

    #[test]
    fn calendar_units_resolve_from_the_epoch() {
        assert_eq!(duration_to_seconds("1 month"), Some(31 * 86_400));
        assert_eq!(duration_to_seconds("2 months"), Some(59 * 86_400));
        assert_eq!(duration_to_seconds("1 year"), Some(365 * 86_400));
    }

    #[test]
    fn phrases_resolving_to_zero_or_backwards_are_rejected() {
        assert_eq!(duration_to_seconds("0 hours"), None);
        assert_eq!(duration_to_seconds("3 hours ago"), None);
        assert_eq!(duration_to_seconds("1 hour -1 hour"), None);
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(duration_to_seconds("bogus"), None);
        assert_eq!(duration_to_seconds(""), None);
        assert_eq!(duration_to_seconds("   "), None);
        assert_eq!(duration_to_seconds("hours"), None);
        assert_eq!(duration_to_seconds("two days"), None);
        assert_eq!(duration_to_seconds("3 bananas"), None);
        assert_eq!(duration_to_seconds("3 hours later"), None);
    }

    #[test]
    fn overflow_is_rejected() {
        assert_eq!(duration_to_seconds("9223372036854775807 weeks"), None);
    }
}

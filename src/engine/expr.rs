//! Boundary expression parsing and evaluation.
//!
//! A rule boundary is one of three forms: a literal `HH:MM:SS` clock time,
//! a bare event key such as `sunset`, or an event key with a signed offset
//! such as `dawn-30m`. Evaluation resolves the expression against a day's
//! event table to seconds since local midnight.

use chrono::Timelike;
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::phases::PhaseTimes;

static CLOCK_TIME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d\d):(\d\d):(\d\d)$").unwrap());
static BARE_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\w+)$").unwrap());
static KEY_WITH_OFFSET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\w+)([+-])(\d+)([hms])$").unwrap());

/// Failure to resolve a boundary expression.
///
/// Recoverable: the offending rule is skipped for the cycle, siblings are
/// unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    #[error("hh:mm:ss value is invalid")]
    InvalidClockTime,
    #[error("invalid sun phase key '{0}'")]
    UnknownKey(String),
    #[error("error parsing '{0}'")]
    Unparseable(String),
}

/// Evaluate a boundary expression to seconds since local midnight.
///
/// The three grammar forms are tried in order and the first *syntactic*
/// match wins; a semantic failure inside a matched form (field out of range,
/// key not in the table) is reported as-is rather than falling through to
/// the next form. Event instants are read in `zone`, the same wall-clock
/// frame the engine uses for "now".
///
/// Pure: no side effects on success or failure.
pub fn evaluate(expr: &str, times: &PhaseTimes, zone: &Tz) -> Result<i64, ExpressionError> {
    let s = expr.trim();

    if let Some(caps) = CLOCK_TIME.captures(s) {
        // Two-digit fields; parse cannot fail or overflow.
        let hours: i64 = caps[1].parse().unwrap();
        let minutes: i64 = caps[2].parse().unwrap();
        let seconds: i64 = caps[3].parse().unwrap();
        if hours >= 24 || minutes >= 60 || seconds >= 60 {
            return Err(ExpressionError::InvalidClockTime);
        }
        return Ok(hours * 3600 + minutes * 60 + seconds);
    }

    if let Some(caps) = BARE_KEY.captures(s) {
        return event_seconds(&caps[1], times, zone);
    }

    if let Some(caps) = KEY_WITH_OFFSET.captures(s) {
        let base = event_seconds(&caps[1], times, zone)?;
        let amount: i64 = caps[3]
            .parse()
            .map_err(|_| ExpressionError::Unparseable(s.to_string()))?;
        let unit = match &caps[4] {
            "h" => 3600,
            "m" => 60,
            _ => 1,
        };
        let offset = if &caps[2] == "+" { amount } else { -amount };
        return Ok(base + offset * unit);
    }

    Err(ExpressionError::Unparseable(s.to_string()))
}

/// Seconds-of-day of a named event, read in the observer's zone.
fn event_seconds(key: &str, times: &PhaseTimes, zone: &Tz) -> Result<i64, ExpressionError> {
    let at = times
        .get(key)
        .ok_or_else(|| ExpressionError::UnknownKey(key.to_string()))?;
    Ok(i64::from(at.with_timezone(zone).num_seconds_from_midnight()))
}

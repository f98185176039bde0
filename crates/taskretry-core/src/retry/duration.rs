//! ISO-8601 duration tokens (`PnDTnHnMn.nS`) to milliseconds.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use super::vault::FALLBACK_INTERVAL_MS;

/// Day/time duration literal: optional sign, days, then an optional time part
/// with hours, minutes and (fractional) seconds. Each component may carry its
/// own sign.
static DURATION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^([-+]?)P(?:([-+]?[0-9]+)D)?(T(?:([-+]?[0-9]+)H)?(?:([-+]?[0-9]+)M)?(?:([-+]?[0-9]+)(?:[.,]([0-9]{0,9}))?S)?)?$",
    )
    .expect("Failed to compile duration regex")
});

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;
const NANOS_PER_SECOND: i128 = 1_000_000_000;

/// Why a duration token was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationParseError {
    #[error("not a duration literal: {0:?}")]
    Syntax(String),
    #[error("duration has no day or time component: {0:?}")]
    Empty(String),
    #[error("duration out of range: {0:?}")]
    Overflow(String),
}

/// Convert a duration token to milliseconds.
///
/// Never fails: a token the codec cannot parse yields the fallback interval
/// (5 minutes) so the retry pipeline always has a usable wait. Sub-second
/// precision is truncated.
pub fn to_millis(token: &str) -> i64 {
    match parse_seconds(token).and_then(|secs| {
        secs.checked_mul(1000)
            .ok_or_else(|| DurationParseError::Overflow(token.to_string()))
    }) {
        Ok(millis) => millis,
        Err(e) => {
            tracing::debug!(token, error = %e, "falling back to default retry interval");
            FALLBACK_INTERVAL_MS
        }
    }
}

/// Parse a duration token into whole seconds, floored toward negative
/// infinity.
pub fn parse_seconds(token: &str) -> Result<i64, DurationParseError> {
    let caps = DURATION_PATTERN
        .captures(token)
        .ok_or_else(|| DurationParseError::Syntax(token.to_string()))?;

    // A bare `T` with nothing after it is not a valid time part.
    if caps.get(3).is_some_and(|t| t.as_str().eq_ignore_ascii_case("T")) {
        return Err(DurationParseError::Syntax(token.to_string()));
    }

    let days = caps.get(2).map(|m| m.as_str());
    let hours = caps.get(4).map(|m| m.as_str());
    let minutes = caps.get(5).map(|m| m.as_str());
    let seconds = caps.get(6).map(|m| m.as_str());
    if days.is_none() && hours.is_none() && minutes.is_none() && seconds.is_none() {
        return Err(DurationParseError::Empty(token.to_string()));
    }

    let overflow = || DurationParseError::Overflow(token.to_string());

    let mut total: i64 = 0;
    for (value, unit) in [
        (days, SECONDS_PER_DAY),
        (hours, SECONDS_PER_HOUR),
        (minutes, SECONDS_PER_MINUTE),
        (seconds, 1),
    ] {
        if let Some(value) = value {
            let n: i64 = value.parse().map_err(|_| overflow())?;
            let secs = n.checked_mul(unit).ok_or_else(overflow)?;
            total = total.checked_add(secs).ok_or_else(overflow)?;
        }
    }

    let mut nanos = i128::from(total) * NANOS_PER_SECOND;
    if let Some(fraction) = caps.get(7).map(|m| m.as_str()) {
        let frac = parse_fraction(fraction);
        if seconds.is_some_and(|s| s.starts_with('-')) {
            nanos -= frac;
        } else {
            nanos += frac;
        }
    }
    if caps.get(1).is_some_and(|m| m.as_str() == "-") {
        nanos = -nanos;
    }

    i64::try_from(nanos.div_euclid(NANOS_PER_SECOND)).map_err(|_| overflow())
}

/// Right-pad a fraction of up to nine digits to nanoseconds.
fn parse_fraction(digits: &str) -> i128 {
    digits
        .bytes()
        .chain(std::iter::repeat(b'0'))
        .take(9)
        .fold(0i128, |acc, b| acc * 10 + i128::from(b - b'0'))
}

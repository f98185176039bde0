//! Retry specification shapes: duration list or `R<n>/<duration>` cycle.
//!
//! Specifications are normalized (whitespace removed, uppercased) before
//! matching. Both patterns are anchored; a string matching neither is
//! malformed and the resolver moves on to its next tier.

use once_cell::sync::Lazy;
use regex::Regex;

/// `PT10S,PT2M,P1DT4H`: one or more day/time duration tokens.
static RETRY_LIST_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(P(?:[0-9]+D)?(?:T(?:[0-9]+H)?(?:[0-9]+M)?(?:[0-9]+S)?)?)(,(P(?:[0-9]+D)?(?:T(?:[0-9]+H)?(?:[0-9]+M)?(?:[0-9]+S)?)?))*$",
    )
    .expect("Failed to compile retry list regex")
});

/// `R5/PT10M`: repeat count and a single interval token.
static RETRY_CYCLE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^R(?P<times>[0-9]+)/(?P<interval>P(?:[0-9]+Y)?(?:[0-9]+M)?(?:[0-9]+D)?(?:T(?:[0-9]+H)?(?:[0-9]+M)?(?:[0-9]+S)?)?)$",
    )
    .expect("Failed to compile retry cycle regex")
});

/// Strip all whitespace and uppercase.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// Result of matching a normalized specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecMatch<'a> {
    /// Explicit waits, one per retry, consumed back to front.
    List(Vec<&'a str>),
    /// `times` retries separated by the same interval.
    Cycle { times: i32, interval: &'a str },
    NoMatch,
}

/// Classify a normalized specification. The list form is tried first.
pub fn match_spec(normalized: &str) -> SpecMatch<'_> {
    // Time designator must be followed by something.
    if normalized.ends_with('T') {
        return SpecMatch::NoMatch;
    }

    if RETRY_LIST_PATTERN.is_match(normalized) {
        return SpecMatch::List(normalized.split(',').collect());
    }

    if let Some(caps) = RETRY_CYCLE_PATTERN.captures(normalized) {
        let (Some(times), Some(interval)) = (caps.name("times"), caps.name("interval")) else {
            return SpecMatch::NoMatch;
        };
        // A count beyond the engine's retry counter range is unusable.
        return match times.as_str().parse::<i32>() {
            Ok(times) => SpecMatch::Cycle {
                times,
                interval: interval.as_str(),
            },
            Err(_) => SpecMatch::NoMatch,
        };
    }

    SpecMatch::NoMatch
}

impl<'a> SpecMatch<'a> {
    /// Total retries implied by the specification.
    pub fn retries(&self) -> Option<i32> {
        match self {
            SpecMatch::List(tokens) => i32::try_from(tokens.len()).ok(),
            SpecMatch::Cycle { times, .. } => Some(*times),
            SpecMatch::NoMatch => None,
        }
    }

    /// Duration token governing the wait before the next attempt, given the
    /// retries still left. `remaining` must be positive.
    ///
    /// For a list of length `L` the entry at `L - remaining` is used; a counter
    /// at or above `L` selects the first entry.
    pub fn interval_token(&self, remaining: i32) -> Option<&'a str> {
        match self {
            SpecMatch::List(tokens) => {
                let len = tokens.len();
                let remaining = usize::try_from(remaining).ok()?;
                if remaining >= len {
                    tokens.first().copied()
                } else {
                    tokens.get(len - remaining).copied()
                }
            }
            SpecMatch::Cycle { interval, .. } => Some(*interval),
            SpecMatch::NoMatch => None,
        }
    }

    pub fn is_match(&self) -> bool {
        !matches!(self, SpecMatch::NoMatch)
    }
}

//! Human-readable message and diagnostic trace reported with a failure.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error as StdError;
use std::fmt::Write as _;

use super::error::{InstantIncident, RaisedFailure};

/// Name incidents are reported under.
pub const INSTANT_INCIDENT: &str = "InstantIncident";

/// Cause chains are printed at most this deep.
const MAX_CAUSE_DEPTH: usize = 32;

/// `<Type>: <message>` for an ordinary failure.
pub fn failure_message(failure: &RaisedFailure) -> String {
    format!("{}: {}", failure.type_name(), failure.error())
}

/// Message for an incident. The cause, when present, leads; the incident's
/// own message is appended in parentheses.
pub fn incident_message(incident: &InstantIncident) -> String {
    match (incident.cause(), incident.message()) {
        (None, None) => INSTANT_INCIDENT.to_string(),
        (None, Some(message)) => format!("{}: {}", INSTANT_INCIDENT, message),
        (Some(cause), None) => format!("{} ({})", failure_message(cause), INSTANT_INCIDENT),
        (Some(cause), Some(message)) => format!(
            "{} ({}: {})",
            failure_message(cause),
            INSTANT_INCIDENT,
            message
        ),
    }
}

/// Trace for an ordinary failure: its message, the source chain, and the
/// backtrace if one was captured.
pub fn diagnostic_trace(failure: &RaisedFailure) -> String {
    render_trace(failure.type_name(), failure.error(), failure.backtrace())
}

/// Trace for an incident: the cause's trace if there is one (one level only),
/// else the incident's own.
pub fn incident_trace(incident: &InstantIncident, backtrace: &Backtrace) -> String {
    match incident.cause() {
        Some(cause) => diagnostic_trace(cause),
        None => render_trace(INSTANT_INCIDENT, incident, backtrace),
    }
}

fn render_trace(type_name: &str, error: &(dyn StdError + 'static), backtrace: &Backtrace) -> String {
    let mut out = format!("{}: {}", type_name, error);

    let mut source = error.source();
    let mut depth = 0;
    while let Some(cause) = source {
        if depth == MAX_CAUSE_DEPTH {
            out.push_str("\n...");
            break;
        }
        let _ = write!(out, "\nCaused by: {}", cause);
        source = cause.source();
        depth += 1;
    }

    if backtrace.status() == BacktraceStatus::Captured {
        let _ = write!(out, "\n{}", backtrace);
    }
    out
}

/// Log line for a technical failure; the wait is only mentioned while
/// retries remain.
pub fn failure_log_line(type_name: &str, message: &str, retries: i32, retry_interval_ms: i64) -> String {
    let next = if retries == 0 {
        String::new()
    } else {
        format!(", next retry in {}ms", retry_interval_ms)
    };
    format!(
        "{}: {}. There are {} retry(s) left{}",
        type_name, message, retries, next
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;
    use std::io;

    #[derive(Debug)]
    struct RootCause;

    impl fmt::Display for RootCause {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "root-cause")
        }
    }

    impl StdError for RootCause {}

    #[derive(Debug)]
    struct Outer(RootCause);

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "outer failed")
        }
    }

    impl StdError for Outer {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn ordinary_message_uses_simple_type_name() {
        let failure = RaisedFailure::from(RootCause);
        assert_eq!(failure_message(&failure), "RootCause: root-cause");
    }

    #[test]
    fn incident_messages() {
        assert_eq!(incident_message(&InstantIncident::new()), "InstantIncident");
        assert_eq!(
            incident_message(&InstantIncident::with_message("instant-incident-no-retries-plz")),
            "InstantIncident: instant-incident-no-retries-plz"
        );
        assert_eq!(
            incident_message(&InstantIncident::caused_by(RootCause)),
            "RootCause: root-cause (InstantIncident)"
        );
        assert_eq!(
            incident_message(&InstantIncident::with_message_and_cause("no-retries", RootCause)),
            "RootCause: root-cause (InstantIncident: no-retries)"
        );
    }

    #[test]
    fn incident_descends_only_one_level() {
        let nested = InstantIncident::caused_by(InstantIncident::caused_by(RootCause));
        assert_eq!(
            incident_message(&nested),
            "InstantIncident: root-cause (InstantIncident)"
        );
    }

    #[test]
    fn trace_lists_source_chain() {
        let failure = RaisedFailure::from(Outer(RootCause));
        let trace = diagnostic_trace(&failure);
        assert!(trace.starts_with("Outer: outer failed\nCaused by: root-cause"));
    }

    #[test]
    fn incident_trace_prefers_cause() {
        let incident = InstantIncident::with_message_and_cause("no-retries", io::Error::other("disk"));
        let trace = incident_trace(&incident, &Backtrace::disabled());
        assert!(trace.starts_with("Error: disk"));

        let bare = InstantIncident::with_message("stop");
        let trace = incident_trace(&bare, &Backtrace::disabled());
        assert_eq!(trace, "InstantIncident: stop");
    }

    #[test]
    fn log_line_mentions_wait_only_with_retries_left() {
        assert_eq!(
            failure_log_line("Error", "boom", 2, 300000),
            "Error: boom. There are 2 retry(s) left, next retry in 300000ms"
        );
        assert_eq!(
            failure_log_line("Error", "boom", 0, 0),
            "Error: boom. There are 0 retry(s) left"
        );
    }
}

//! Retry and backoff policy.
//!
//! This module turns a retry specification (`R3/PT5M`, `PT10S,PT2M,PT1H`)
//! into a retry budget and the wait before the next attempt, so that the
//! failure dispatcher and the CLI share one resolution path.

mod duration;
mod policy;
mod spec;
mod tracker;
mod vault;

pub use duration::{parse_seconds, to_millis, DurationParseError};
pub use policy::RetryPolicy;
pub use spec::{match_spec, normalize, SpecMatch};
pub use tracker::NextRetries;
pub use vault::{RetryVault, DEFAULT_IDENTIFIER, FALLBACK_INTERVAL_MS, FALLBACK_RETRY_SPEC};

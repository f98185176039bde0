//! Immutable retry configuration shared by every resolver.

use crate::config::RetryConfig;

use super::spec;

/// Last-resort specification: three retries, five minutes apart.
pub const FALLBACK_RETRY_SPEC: &str = "R3/PT5M";

/// Wait used when a duration token cannot be parsed (5 minutes).
pub const FALLBACK_INTERVAL_MS: i64 = 5 * 60 * 1000;

/// Extension-attribute name used when none is configured.
pub const DEFAULT_IDENTIFIER: &str = "RETRY_CONFIG";

/// Default specification and override attribute name, fixed at startup.
///
/// Built once and passed by reference to every resolver and dispatcher; it is
/// never mutated afterwards, so concurrent readers need no locking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryVault {
    default_spec: String,
    identifier: String,
}

impl RetryVault {
    /// `default_spec` is normalized; absent or blank falls back to
    /// [`FALLBACK_RETRY_SPEC`]. A blank `identifier` becomes
    /// [`DEFAULT_IDENTIFIER`].
    pub fn new(default_spec: Option<&str>, identifier: Option<&str>) -> Self {
        let default_spec = match default_spec.map(spec::normalize) {
            Some(s) if !s.is_empty() => s,
            _ => FALLBACK_RETRY_SPEC.to_string(),
        };
        if !spec::match_spec(&default_spec).is_match() {
            tracing::warn!(
                default_spec = %default_spec,
                "default retry specification is malformed; {} will be used instead",
                FALLBACK_RETRY_SPEC
            );
        }

        let identifier = match identifier.map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => DEFAULT_IDENTIFIER.to_string(),
        };

        Self {
            default_spec,
            identifier,
        }
    }

    pub fn from_config(cfg: &RetryConfig) -> Self {
        Self::new(Some(cfg.default_behavior()), Some(cfg.identifier()))
    }

    /// Normalized default specification.
    pub fn default_spec(&self) -> &str {
        &self.default_spec
    }

    /// Extension-attribute name carrying a per-task override.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn fallback_spec(&self) -> &'static str {
        FALLBACK_RETRY_SPEC
    }

    pub fn fallback_interval_ms(&self) -> i64 {
        FALLBACK_INTERVAL_MS
    }
}

impl Default for RetryVault {
    fn default() -> Self {
        Self::new(None, None)
    }
}

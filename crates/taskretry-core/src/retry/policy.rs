//! Retry budget and next-interval resolution.
//!
//! Every lookup walks the same chain: the per-task override, then the vault's
//! default, then [`FALLBACK_RETRY_SPEC`]. Absent or blank entries are skipped;
//! malformed ones advance to the next entry.

use super::duration;
use super::spec::{self, SpecMatch};
use super::vault::{RetryVault, FALLBACK_INTERVAL_MS, FALLBACK_RETRY_SPEC};

/// Retries implied by [`FALLBACK_RETRY_SPEC`].
const FALLBACK_RETRIES: i32 = 3;

/// Resolves retry budgets and wait intervals against a [`RetryVault`].
///
/// Holds no state of its own; the same inputs always produce the same output.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy<'v> {
    vault: &'v RetryVault,
}

impl<'v> RetryPolicy<'v> {
    pub fn new(vault: &'v RetryVault) -> Self {
        Self { vault }
    }

    pub fn vault(&self) -> &'v RetryVault {
        self.vault
    }

    /// Normalized, non-blank specifications in resolution order.
    fn tiers<'a>(&'a self, override_spec: Option<&'a str>) -> impl Iterator<Item = String> + 'a {
        [
            override_spec,
            Some(self.vault.default_spec()),
            Some(FALLBACK_RETRY_SPEC),
        ]
        .into_iter()
        .flatten()
        .map(spec::normalize)
        .filter(|s| !s.is_empty())
    }

    /// Total number of retries configured for a task: the list length or the
    /// cycle's repeat count of the first well-formed specification.
    pub fn total_retry_budget(&self, override_spec: Option<&str>) -> i32 {
        for tier in self.tiers(override_spec) {
            match spec::match_spec(&tier).retries() {
                Some(retries) => return retries,
                None => tracing::debug!(spec = %tier, "skipping malformed retry specification"),
            }
        }
        FALLBACK_RETRIES
    }

    /// Milliseconds to wait before the next attempt when `remaining` retries
    /// are left. Absent or non-positive `remaining` means no further attempt
    /// and yields `0`.
    pub fn next_interval(&self, remaining: Option<i32>, override_spec: Option<&str>) -> i64 {
        let remaining = match remaining {
            Some(n) if n > 0 => n,
            _ => return 0,
        };

        for tier in self.tiers(override_spec) {
            let matched = spec::match_spec(&tier);
            if let Some(token) = matched.interval_token(remaining) {
                return duration::to_millis(token);
            }
            if let SpecMatch::NoMatch = matched {
                tracing::debug!(spec = %tier, "skipping malformed retry specification");
            }
        }
        FALLBACK_INTERVAL_MS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: i64 = 1000;
    const MINUTE: i64 = 60 * SECOND;

    fn vault(default_spec: &str) -> RetryVault {
        RetryVault::new(Some(default_spec), None)
    }

    #[test]
    fn default_cycle_budget_and_interval() {
        let vault = RetryVault::default();
        let policy = RetryPolicy::new(&vault);
        assert_eq!(policy.total_retry_budget(None), 3);
        assert_eq!(policy.next_interval(Some(3), None), 5 * MINUTE);
    }

    #[test]
    fn list_override() {
        let vault = RetryVault::default();
        let policy = RetryPolicy::new(&vault);
        let spec = Some("PT10S,PT2M");
        assert_eq!(policy.total_retry_budget(spec), 2);
        assert_eq!(policy.next_interval(Some(2), spec), 10 * SECOND);
        assert_eq!(policy.next_interval(Some(1), spec), 2 * MINUTE);
    }

    #[test]
    fn list_counter_above_length_uses_first_entry() {
        let vault = RetryVault::default();
        let policy = RetryPolicy::new(&vault);
        assert_eq!(policy.next_interval(Some(7), Some("PT10S,PT2M")), 10 * SECOND);
    }

    #[test]
    fn cycle_override() {
        let vault = RetryVault::default();
        let policy = RetryPolicy::new(&vault);
        let spec = Some("R5/PT10M");
        assert_eq!(policy.total_retry_budget(spec), 5);
        assert_eq!(policy.next_interval(Some(1), spec), 10 * MINUTE);
        assert_eq!(policy.next_interval(Some(4), spec), 10 * MINUTE);
    }

    #[test]
    fn override_is_normalized() {
        let vault = RetryVault::default();
        let policy = RetryPolicy::new(&vault);
        assert_eq!(policy.total_retry_budget(Some(" r5 / pt10m ")), 5);
        assert_eq!(policy.next_interval(Some(2), Some("pt1m, pt2m")), MINUTE);
    }

    #[test]
    fn no_retries_left_means_zero_interval() {
        let vault = RetryVault::default();
        let policy = RetryPolicy::new(&vault);
        for spec in [None, Some("R5/PT10M"), Some("PT10S,PT2M"), Some("garbage")] {
            assert_eq!(policy.next_interval(None, spec), 0);
            assert_eq!(policy.next_interval(Some(0), spec), 0);
            assert_eq!(policy.next_interval(Some(-1), spec), 0);
        }
    }

    #[test]
    fn malformed_override_uses_default() {
        let vault = vault("R3/PT37M");
        let policy = RetryPolicy::new(&vault);
        for spec in ["R3/PT3D", "PT10M,PT3D,PT10M"] {
            assert_eq!(policy.total_retry_budget(Some(spec)), 3);
            assert_eq!(policy.next_interval(Some(2), Some(spec)), 37 * MINUTE);
        }
    }

    #[test]
    fn blank_override_uses_default() {
        let vault = vault("R4/PT1M");
        let policy = RetryPolicy::new(&vault);
        assert_eq!(policy.total_retry_budget(Some("   ")), 4);
        assert_eq!(policy.next_interval(Some(1), Some("")), MINUTE);
    }

    #[test]
    fn malformed_default_uses_hard_fallback() {
        let vault = vault("R3/PT1D");
        let policy = RetryPolicy::new(&vault);
        assert_eq!(policy.total_retry_budget(None), 3);
        assert_eq!(policy.next_interval(Some(3), None), 5 * MINUTE);
        assert_eq!(policy.total_retry_budget(Some("also bad")), 3);
        assert_eq!(policy.next_interval(Some(1), Some("also bad")), 5 * MINUTE);
    }

    #[test]
    fn unparsable_list_tokens_degrade_to_fallback_interval() {
        let vault = RetryVault::default();
        let policy = RetryPolicy::new(&vault);
        assert_eq!(policy.total_retry_budget(Some("P,P,P")), 3);
        assert_eq!(policy.next_interval(Some(3), Some("P,P,P")), FALLBACK_INTERVAL_MS);
    }

    #[test]
    fn resolution_is_idempotent() {
        let vault = vault("PT1M,PT5M,PT1H");
        let policy = RetryPolicy::new(&vault);
        let first = (policy.total_retry_budget(None), policy.next_interval(Some(2), None));
        let second = (policy.total_retry_budget(None), policy.next_interval(Some(2), None));
        assert_eq!(first, second);
        assert_eq!(first, (3, 5 * MINUTE));
    }
}

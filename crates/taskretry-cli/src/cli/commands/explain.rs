//! `taskretry explain <spec>` – show shape, budget and countdown.

use anyhow::Result;
use taskretry_core::retry::{self, RetryPolicy, RetryVault, SpecMatch};

/// Countdown rows printed before the table is cut short.
const MAX_ROWS: i32 = 50;

pub fn run_explain(vault: &RetryVault, spec: &str) -> Result<()> {
    print!("{}", render_explain(vault, spec));
    Ok(())
}

pub(crate) fn render_explain(vault: &RetryVault, spec: &str) -> String {
    let normalized = retry::normalize(spec);
    let shape = match retry::match_spec(&normalized) {
        SpecMatch::List(tokens) => format!("list ({} entries)", tokens.len()),
        SpecMatch::Cycle { times, interval } => format!("cycle ({} x {})", times, interval),
        SpecMatch::NoMatch if normalized.is_empty() => {
            format!("empty; default {} applies", vault.default_spec())
        }
        SpecMatch::NoMatch => format!("malformed; default {} applies", vault.default_spec()),
    };

    let policy = RetryPolicy::new(vault);
    let budget = policy.total_retry_budget(Some(spec));

    let mut out = String::new();
    out.push_str(&format!("spec:     {}\n", normalized));
    out.push_str(&format!("form:     {}\n", shape));
    out.push_str(&format!("retries:  {}\n", budget));
    out.push_str(&format!("  {:>9}  {:>14}\n", "REMAINING", "INTERVAL(ms)"));
    for remaining in (1..=budget).rev().take(MAX_ROWS as usize) {
        let interval = policy.next_interval(Some(remaining), Some(spec));
        out.push_str(&format!("  {:>9}  {:>14}\n", remaining, interval));
    }
    if budget > MAX_ROWS {
        out.push_str(&format!("  ... {} more\n", budget - MAX_ROWS));
    }
    out
}

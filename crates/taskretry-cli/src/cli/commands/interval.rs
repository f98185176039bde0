//! `taskretry interval <spec> --remaining N` – wait before the next attempt.

use anyhow::Result;
use taskretry_core::retry::{RetryPolicy, RetryVault};

pub fn run_interval(vault: &RetryVault, spec: &str, remaining: Option<i32>) -> Result<()> {
    let interval = RetryPolicy::new(vault).next_interval(remaining, Some(spec));
    println!("{}", interval);
    Ok(())
}

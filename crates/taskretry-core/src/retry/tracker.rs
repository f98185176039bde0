//! Next value of the engine's remaining-retries counter.

/// What the counter should become after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextRetries {
    /// The engine has no counter yet (first failure): use the configured budget.
    FromBudget,
    /// Counter is known; this is the value to report.
    Known(i32),
}

impl NextRetries {
    /// Derive from the counter the engine currently holds for the task.
    ///
    /// Non-positive counters clamp to zero instead of being decremented further.
    pub fn derive(current: Option<i32>) -> Self {
        match current {
            None => NextRetries::FromBudget,
            Some(n) if n <= 0 => NextRetries::Known(0),
            Some(n) => NextRetries::Known(n - 1),
        }
    }

    /// Resolve to a concrete count, consulting `budget` only when needed.
    pub fn resolve<F>(self, budget: F) -> i32
    where
        F: FnOnce() -> i32,
    {
        match self {
            NextRetries::FromBudget => budget(),
            NextRetries::Known(n) => n,
        }
    }
}

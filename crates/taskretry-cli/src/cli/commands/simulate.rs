//! `taskretry simulate` – dispatch a made-up failure against an in-memory task.

use anyhow::Result;
use std::fmt;
use taskretry_core::failure::{
    BusinessError, CompletionActions, FailureDispatcher, InstantIncident, RaisedFailure,
    UnitOfWork, Variables,
};
use taskretry_core::retry::RetryVault;

use crate::cli::FailureKind;

struct SimulatedTask<'a> {
    retries: Option<i32>,
    identifier: &'a str,
    spec: Option<&'a str>,
}

impl UnitOfWork for SimulatedTask<'_> {
    fn retries(&self) -> Option<i32> {
        self.retries
    }

    fn extension_property(&self, name: &str) -> Option<&str> {
        if name == self.identifier {
            self.spec
        } else {
            None
        }
    }
}

/// Prints each completion call instead of sending it to an engine.
struct PrintingHost;

impl<T: ?Sized> CompletionActions<T> for PrintingHost {
    fn signal_business_error(&self, _task: &T, code: &str, message: Option<&str>) -> Result<()> {
        println!("business error");
        println!("  code:      {}", code);
        println!("  message:   {}", message.unwrap_or("-"));
        Ok(())
    }

    fn signal_business_error_with_variables(
        &self,
        task: &T,
        code: &str,
        message: Option<&str>,
        variables: &Variables,
    ) -> Result<()> {
        <Self as CompletionActions<T>>::signal_business_error(self, task, code, message)?;
        println!("  variables: {}", serde_json::to_string(variables)?);
        Ok(())
    }

    fn signal_failure(
        &self,
        _task: &T,
        message: &str,
        diagnostic_trace: &str,
        retries: i32,
        retry_interval_ms: i64,
    ) -> Result<()> {
        println!("failure");
        println!("  message:   {}", message);
        println!("  retries:   {}", retries);
        println!("  interval:  {}ms", retry_interval_ms);
        println!("  trace:");
        for line in diagnostic_trace.lines() {
            println!("    {}", line);
        }
        Ok(())
    }
}

#[derive(Debug)]
struct SimulatedFailure(String);

impl fmt::Display for SimulatedFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for SimulatedFailure {}

fn raise(kind: FailureKind, message: &str) -> RaisedFailure {
    match kind {
        FailureKind::Retryable => SimulatedFailure(message.to_string()).into(),
        FailureKind::Incident => {
            InstantIncident::with_message_and_cause("simulated", SimulatedFailure(message.to_string()))
                .into()
        }
        FailureKind::Business => BusinessError::new(message).into(),
    }
}

pub fn run_simulate(
    vault: &RetryVault,
    spec: Option<&str>,
    retries: Option<i32>,
    kind: FailureKind,
    message: &str,
) -> Result<()> {
    let task = SimulatedTask {
        retries,
        identifier: vault.identifier(),
        spec,
    };
    FailureDispatcher::new(vault).dispatch("simulate", &task, &PrintingHost, raise(kind, message))?;
    Ok(())
}

//! Entry point invoked by the host after a unit of work failed.

use anyhow::Result;
use std::backtrace::Backtrace;

use crate::retry::{NextRetries, RetryPolicy, RetryVault};

use super::disposition::FailureDisposition;
use super::error::{BusinessError, InstantIncident, RaisedFailure, Variables};
use super::message;

/// Host view of the unit of work that failed.
pub trait UnitOfWork {
    /// Engine-maintained retry counter; `None` before the first failure.
    fn retries(&self) -> Option<i32>;

    /// Value of a named extension attribute, if the task carries one.
    fn extension_property(&self, name: &str) -> Option<&str>;
}

/// Host completion calls. Exactly one is made per dispatch.
pub trait CompletionActions<T: ?Sized> {
    /// Business error without variables.
    fn signal_business_error(&self, task: &T, code: &str, message: Option<&str>) -> Result<()>;

    /// Business error carrying process variables.
    fn signal_business_error_with_variables(
        &self,
        task: &T,
        code: &str,
        message: Option<&str>,
        variables: &Variables,
    ) -> Result<()>;

    /// Technical failure with the retries left and the wait before the next one.
    fn signal_failure(
        &self,
        task: &T,
        message: &str,
        diagnostic_trace: &str,
        retries: i32,
        retry_interval_ms: i64,
    ) -> Result<()>;
}

/// Everything reported for a technical failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReport {
    pub message: String,
    pub diagnostic_trace: String,
    pub retries: i32,
    pub retry_interval_ms: i64,
}

/// Which completion call a dispatch made.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatched {
    BusinessError(BusinessError),
    Failure(FailureReport),
}

/// Classifies failures and reports them through [`CompletionActions`].
#[derive(Debug, Clone, Copy)]
pub struct FailureDispatcher<'v> {
    policy: RetryPolicy<'v>,
}

impl<'v> FailureDispatcher<'v> {
    pub fn new(vault: &'v RetryVault) -> Self {
        Self {
            policy: RetryPolicy::new(vault),
        }
    }

    pub fn policy(&self) -> &RetryPolicy<'v> {
        &self.policy
    }

    /// Retries left after this failure and the wait before the next attempt.
    pub fn next_retry<T>(&self, task: &T) -> (i32, i64)
    where
        T: UnitOfWork + ?Sized,
    {
        let override_spec = task.extension_property(self.policy.vault().identifier());
        let retries = NextRetries::derive(task.retries())
            .resolve(|| self.policy.total_retry_budget(override_spec));
        let interval = self.policy.next_interval(Some(retries), override_spec);
        (retries, interval)
    }

    /// Build the report for a technical failure. `None` for business errors.
    pub fn report<T>(&self, task: &T, disposition: &FailureDisposition) -> Option<FailureReport>
    where
        T: UnitOfWork + ?Sized,
    {
        match disposition {
            FailureDisposition::BusinessError(_) => None,
            FailureDisposition::ImmediateIncident { incident, backtrace } => {
                Some(incident_report(incident, backtrace))
            }
            FailureDisposition::RetryableFailure(failure) => {
                Some(self.retryable_report(task, failure))
            }
        }
    }

    fn retryable_report<T>(&self, task: &T, failure: &RaisedFailure) -> FailureReport
    where
        T: UnitOfWork + ?Sized,
    {
        let (retries, retry_interval_ms) = self.next_retry(task);
        FailureReport {
            message: message::failure_message(failure),
            diagnostic_trace: message::diagnostic_trace(failure),
            retries,
            retry_interval_ms,
        }
    }

    /// Classify `failure` and make the matching completion call.
    ///
    /// `origin` names the handler that raised it and is only used for logging.
    /// Errors returned come from the completion call itself.
    pub fn dispatch<T, C>(
        &self,
        origin: &str,
        task: &T,
        actions: &C,
        failure: RaisedFailure,
    ) -> Result<Dispatched>
    where
        T: UnitOfWork + ?Sized,
        C: CompletionActions<T> + ?Sized,
    {
        let type_name = failure.type_name();
        let raised_message = failure.to_string();

        let report = match FailureDisposition::classify(failure) {
            FailureDisposition::BusinessError(business) => {
                signal_business_error(origin, task, actions, &business)?;
                return Ok(Dispatched::BusinessError(business));
            }
            FailureDisposition::ImmediateIncident { incident, backtrace } => {
                incident_report(&incident, &backtrace)
            }
            FailureDisposition::RetryableFailure(failure) => self.retryable_report(task, &failure),
        };

        tracing::error!(
            origin,
            "{}",
            message::failure_log_line(
                type_name,
                &raised_message,
                report.retries,
                report.retry_interval_ms
            )
        );
        tracing::debug!(origin, trace = %report.diagnostic_trace, "failure details");

        actions.signal_failure(
            task,
            &report.message,
            &report.diagnostic_trace,
            report.retries,
            report.retry_interval_ms,
        )?;
        Ok(Dispatched::Failure(report))
    }
}

fn incident_report(incident: &InstantIncident, backtrace: &Backtrace) -> FailureReport {
    FailureReport {
        message: message::incident_message(incident),
        diagnostic_trace: message::incident_trace(incident, backtrace),
        retries: 0,
        retry_interval_ms: 0,
    }
}

/// Variables are passed only when the error carries them; an absent map and
/// an empty one are different calls.
fn signal_business_error<T, C>(
    origin: &str,
    task: &T,
    actions: &C,
    business: &BusinessError,
) -> Result<()>
where
    T: UnitOfWork + ?Sized,
    C: CompletionActions<T> + ?Sized,
{
    let message = business.message.as_deref();
    tracing::error!(
        origin,
        "BusinessError, Code: {}, Message: {}",
        business.code,
        message.unwrap_or("null")
    );
    match &business.variables {
        Some(variables) => {
            actions.signal_business_error_with_variables(task, &business.code, message, variables)
        }
        None => actions.signal_business_error(task, &business.code, message),
    }
}

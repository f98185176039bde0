//! Classify a raised failure into one of three dispositions.

use std::backtrace::Backtrace;

use super::error::{BusinessError, InstantIncident, RaisedFailure};

/// How the dispatcher must handle a failure. Decided by the raised error's
/// concrete type, never by its content.
#[derive(Debug)]
pub enum FailureDisposition {
    /// Report as a named workflow error; no retry accounting.
    BusinessError(BusinessError),
    /// Report with zero retries and zero wait.
    ImmediateIncident {
        incident: InstantIncident,
        backtrace: Backtrace,
    },
    /// Report with the next retry count and interval from the policy.
    RetryableFailure(RaisedFailure),
}

impl FailureDisposition {
    pub fn classify(failure: RaisedFailure) -> Self {
        let (type_name, error, backtrace) = failure.into_parts();

        let error = match error.downcast::<BusinessError>() {
            Ok(business) => return FailureDisposition::BusinessError(*business),
            Err(error) => error,
        };
        let error = match error.downcast::<InstantIncident>() {
            Ok(incident) => {
                return FailureDisposition::ImmediateIncident {
                    incident: *incident,
                    backtrace,
                }
            }
            Err(error) => error,
        };

        FailureDisposition::RetryableFailure(RaisedFailure::from_parts(type_name, error, backtrace))
    }

    pub fn label(&self) -> &'static str {
        match self {
            FailureDisposition::BusinessError(_) => "business-error",
            FailureDisposition::ImmediateIncident { .. } => "immediate-incident",
            FailureDisposition::RetryableFailure(_) => "retryable",
        }
    }
}

//! Failure classification and reporting.
//!
//! A task handler raises a [`RaisedFailure`]; the [`FailureDispatcher`]
//! classifies it (business error, instant incident, or retryable), computes
//! the retry countdown where one applies, and makes exactly one completion
//! call on the host.

mod dispatcher;
mod disposition;
mod error;
mod message;

pub use dispatcher::{CompletionActions, Dispatched, FailureDispatcher, FailureReport, UnitOfWork};
pub use disposition::FailureDisposition;
pub use error::{BusinessError, InstantIncident, RaisedFailure, Variables};
pub use message::{diagnostic_trace, failure_message, incident_message, INSTANT_INCIDENT};

//! Failure types a task handler can raise.

use std::backtrace::Backtrace;
use std::error::Error as StdError;
use std::fmt;

/// Process variables attached to a business error.
pub type Variables = serde_json::Map<String, serde_json::Value>;

/// Expected, domain-level failure routed back into the workflow as a named
/// error. Never retried.
#[derive(Debug, Clone, PartialEq)]
pub struct BusinessError {
    pub code: String,
    pub message: Option<String>,
    /// `None` and an empty map are different signals to the engine.
    pub variables: Option<Variables>,
}

impl BusinessError {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: None,
            variables: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_variables(mut self, variables: Variables) -> Self {
        self.variables = Some(variables);
        self
    }
}

impl fmt::Display for BusinessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}", message),
            None => write!(f, "{}", self.code),
        }
    }
}

impl StdError for BusinessError {}

/// Technical failure that must skip all retries and raise an incident at once.
///
/// When a cause is attached, reporting uses the cause's type, message and
/// trace; the incident itself only marks the control flow.
#[derive(Debug, Default)]
pub struct InstantIncident {
    message: Option<String>,
    cause: Option<Box<RaisedFailure>>,
}

impl InstantIncident {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            cause: None,
        }
    }

    pub fn caused_by(cause: impl Into<RaisedFailure>) -> Self {
        Self {
            message: None,
            cause: Some(Box::new(cause.into())),
        }
    }

    pub fn with_message_and_cause(
        message: impl Into<String>,
        cause: impl Into<RaisedFailure>,
    ) -> Self {
        Self {
            message: Some(message.into()),
            cause: Some(Box::new(cause.into())),
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn cause(&self) -> Option<&RaisedFailure> {
        self.cause.as_deref()
    }
}

impl fmt::Display for InstantIncident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.message, &self.cause) {
            (Some(message), _) => write!(f, "{}", message),
            (None, Some(cause)) => write!(f, "{}", cause),
            (None, None) => write!(f, "instant incident"),
        }
    }
}

impl StdError for InstantIncident {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_deref()
            .map(|c| c.error() as &(dyn StdError + 'static))
    }
}

/// A failure raised by a unit of work, with the concrete error's type name
/// and the backtrace at the point of conversion.
///
/// Any `std::error::Error + Send + Sync + 'static` converts into it, so task
/// handlers can use `?` directly. Like `anyhow::Error`, it does not itself
/// implement `std::error::Error`.
pub struct RaisedFailure {
    type_name: &'static str,
    error: Box<dyn StdError + Send + Sync + 'static>,
    backtrace: Backtrace,
}

impl RaisedFailure {
    pub fn new<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            type_name: simple_type_name::<E>(),
            error: Box::new(error),
            backtrace: Backtrace::capture(),
        }
    }

    /// Wrap an `anyhow::Error`, keeping business errors and incidents
    /// recognizable. Other errors are reported under the name `Error`.
    pub fn from_anyhow(error: anyhow::Error) -> Self {
        let error = match error.downcast::<BusinessError>() {
            Ok(business) => return Self::new(business),
            Err(error) => error,
        };
        let error = match error.downcast::<InstantIncident>() {
            Ok(incident) => return Self::new(incident),
            Err(error) => error,
        };
        Self {
            type_name: "Error",
            error: error.into(),
            backtrace: Backtrace::capture(),
        }
    }

    /// Unqualified type name of the raised error, e.g. `ParseIntError`.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.error
    }

    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: StdError + 'static,
    {
        self.error.downcast_ref::<E>()
    }

    pub(crate) fn into_parts(
        self,
    ) -> (
        &'static str,
        Box<dyn StdError + Send + Sync + 'static>,
        Backtrace,
    ) {
        (self.type_name, self.error, self.backtrace)
    }

    pub(crate) fn from_parts(
        type_name: &'static str,
        error: Box<dyn StdError + Send + Sync + 'static>,
        backtrace: Backtrace,
    ) -> Self {
        Self {
            type_name,
            error,
            backtrace,
        }
    }
}

impl<E> From<E> for RaisedFailure
where
    E: StdError + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Self::new(error)
    }
}

impl fmt::Display for RaisedFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl fmt::Debug for RaisedFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RaisedFailure")
            .field("type_name", &self.type_name)
            .field("error", &self.error)
            .finish()
    }
}

/// Last path segment of a type name, without generic arguments.
fn simple_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_name_is_unqualified() {
        let failure = RaisedFailure::from("x".parse::<i32>().unwrap_err());
        assert_eq!(failure.type_name(), "ParseIntError");
        let failure = RaisedFailure::from(std::io::Error::other("disk"));
        assert_eq!(failure.type_name(), "Error");
        assert_eq!(failure.to_string(), "disk");
    }

    #[test]
    fn question_mark_converts_any_error() {
        fn handler() -> Result<i32, RaisedFailure> {
            Ok("12a".parse::<i32>()?)
        }
        let failure = handler().unwrap_err();
        assert_eq!(failure.type_name(), "ParseIntError");
        assert!(failure.downcast_ref::<std::num::ParseIntError>().is_some());
    }

    #[test]
    fn business_error_display_prefers_message() {
        assert_eq!(BusinessError::new("code").to_string(), "code");
        assert_eq!(
            BusinessError::new("code").with_message("bpmn-error-message").to_string(),
            "bpmn-error-message"
        );
    }

    #[test]
    fn incident_source_is_the_cause() {
        let incident = InstantIncident::with_message_and_cause(
            "no-retries",
            std::io::Error::other("root-cause"),
        );
        assert_eq!(incident.to_string(), "no-retries");
        assert_eq!(incident.source().map(|s| s.to_string()).as_deref(), Some("root-cause"));
        assert_eq!(incident.cause().map(|c| c.type_name()), Some("Error"));
    }

    #[test]
    fn from_anyhow_keeps_known_kinds() {
        let failure = RaisedFailure::from_anyhow(anyhow::Error::new(BusinessError::new("c")));
        assert!(failure.downcast_ref::<BusinessError>().is_some());
        assert_eq!(failure.type_name(), "BusinessError");

        let failure = RaisedFailure::from_anyhow(anyhow::anyhow!("plain"));
        assert_eq!(failure.type_name(), "Error");
        assert_eq!(failure.to_string(), "plain");
    }
}

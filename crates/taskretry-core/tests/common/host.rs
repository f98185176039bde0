//! In-memory host: a task with a retry counter and extension attributes, and
//! a completion recorder.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use taskretry_core::failure::{CompletionActions, UnitOfWork, Variables};

#[derive(Debug, Default, Clone)]
pub struct TestTask {
    pub retries: Option<i32>,
    pub properties: HashMap<String, String>,
}

impl TestTask {
    pub fn new(retries: Option<i32>) -> Self {
        Self {
            retries,
            properties: HashMap::new(),
        }
    }

    pub fn with_property(mut self, name: &str, value: &str) -> Self {
        self.properties.insert(name.to_string(), value.to_string());
        self
    }
}

impl UnitOfWork for TestTask {
    fn retries(&self) -> Option<i32> {
        self.retries
    }

    fn extension_property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    BusinessError {
        code: String,
        message: Option<String>,
    },
    BusinessErrorWithVariables {
        code: String,
        message: Option<String>,
        variables: Variables,
    },
    Failure {
        message: String,
        diagnostic_trace: String,
        retries: i32,
        retry_interval_ms: i64,
    },
}

#[derive(Debug, Default)]
pub struct Recorder {
    calls: Mutex<Vec<Call>>,
}

impl Recorder {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// The single call made; panics if there was not exactly one.
    pub fn only_call(&self) -> Call {
        let calls = self.calls();
        assert_eq!(calls.len(), 1, "expected exactly one completion call: {:?}", calls);
        calls.into_iter().next().unwrap()
    }

    /// `(retries, interval)` of the single failure call.
    pub fn failure_countdown(&self) -> (i32, i64) {
        match self.only_call() {
            Call::Failure {
                retries,
                retry_interval_ms,
                ..
            } => (retries, retry_interval_ms),
            other => panic!("expected failure call, got {:?}", other),
        }
    }

    fn push(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl CompletionActions<TestTask> for Recorder {
    fn signal_business_error(&self, _task: &TestTask, code: &str, message: Option<&str>) -> Result<()> {
        self.push(Call::BusinessError {
            code: code.to_string(),
            message: message.map(str::to_string),
        });
        Ok(())
    }

    fn signal_business_error_with_variables(
        &self,
        _task: &TestTask,
        code: &str,
        message: Option<&str>,
        variables: &Variables,
    ) -> Result<()> {
        self.push(Call::BusinessErrorWithVariables {
            code: code.to_string(),
            message: message.map(str::to_string),
            variables: variables.clone(),
        });
        Ok(())
    }

    fn signal_failure(
        &self,
        _task: &TestTask,
        message: &str,
        diagnostic_trace: &str,
        retries: i32,
        retry_interval_ms: i64,
    ) -> Result<()> {
        self.push(Call::Failure {
            message: message.to_string(),
            diagnostic_trace: diagnostic_trace.to_string(),
            retries,
            retry_interval_ms,
        });
        Ok(())
    }
}

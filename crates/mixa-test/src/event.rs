//! Test run events
//!
//! Events travel as JSON, one object per line:
//!
//! ```json
//! {"event":"startSuite","data":{"fullName":"Sample","size":3}}
//! {"event":"addFault","data":{"test":{"fullName":"Sample b"},"error":{"type":"failure","message":"nope"}}}
//! ```
//!
//! Reporters receive the `data` part as a [`Value`] map with the same
//! camelCase keys, passed as the only argument of the matching method.

use mixa_core::{MixinError, MixinResult, Value};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ReportResult;

/// Suite being started
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteInfo {
    /// Suite name
    pub full_name: String,
    /// Number of tests the suite will run
    #[serde(default)]
    pub size: u64,
    /// Milliseconds since the epoch
    #[serde(default)]
    pub timestamp: f64,
}

/// Context or test being started or finished
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope {
    /// Name including every enclosing context
    pub full_name: String,
    /// Own name only
    #[serde(default)]
    pub short_name: String,
    /// Enclosing context names, outermost first
    #[serde(default)]
    pub context: Vec<String>,
    /// Milliseconds since the epoch
    #[serde(default)]
    pub timestamp: f64,
}

/// Kind of a fault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultKind {
    /// Assertion did not hold
    Failure,
    /// Test raised an unexpected error
    Error,
}

impl FaultKind {
    /// Lowercase name as used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            FaultKind::Failure => "failure",
            FaultKind::Error => "error",
        }
    }
}

/// Test a fault belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaultTest {
    /// Full test name
    pub full_name: String,
}

/// Fault details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultError {
    /// Failure or error
    #[serde(rename = "type")]
    pub kind: FaultKind,
    /// Message
    pub message: String,
    /// Backtrace, when the runner captured one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backtrace: Option<String>,
}

/// Fault raised by a test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fault {
    /// Test that raised it
    pub test: FaultTest,
    /// What went wrong
    pub error: FaultError,
}

/// Running totals
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    /// Whether no failure or error has occurred
    pub passed: bool,
    /// Tests run
    pub tests: u64,
    /// Assertions checked
    pub assertions: u64,
    /// Failed assertions
    pub failures: u64,
    /// Unexpected errors
    pub errors: u64,
    /// Seconds taken so far
    #[serde(default)]
    pub runtime: f64,
}

/// Test run event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum Event {
    /// Suite started
    StartSuite(SuiteInfo),
    /// Context started
    StartContext(Scope),
    /// Test started
    StartTest(Scope),
    /// Test raised a fault
    AddFault(Fault),
    /// Test finished
    EndTest(Scope),
    /// Context finished
    EndContext(Scope),
    /// Progress update
    Update(Totals),
    /// Suite finished
    EndSuite(Totals),
}

impl Event {
    /// Reporter method handling this event
    pub fn method_name(&self) -> &'static str {
        match self {
            Event::StartSuite(_) => "start_suite",
            Event::StartContext(_) => "start_context",
            Event::StartTest(_) => "start_test",
            Event::AddFault(_) => "add_fault",
            Event::EndTest(_) => "end_test",
            Event::EndContext(_) => "end_context",
            Event::Update(_) => "update",
            Event::EndSuite(_) => "end_suite",
        }
    }

    /// Event data as a dynamic value
    pub fn payload(&self) -> ReportResult<Value> {
        let json = match self {
            Event::StartSuite(info) => serde_json::to_value(info)?,
            Event::StartContext(scope)
            | Event::StartTest(scope)
            | Event::EndTest(scope)
            | Event::EndContext(scope) => serde_json::to_value(scope)?,
            Event::AddFault(fault) => serde_json::to_value(fault)?,
            Event::Update(totals) | Event::EndSuite(totals) => serde_json::to_value(totals)?,
        };
        Ok(serde_json::from_value(json)?)
    }

    /// Parse one JSON line
    pub fn from_line(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }

    /// Serialize to one JSON line, without the trailing newline
    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Read a payload back into one of the event types
pub fn typed<T: DeserializeOwned>(payload: &Value) -> MixinResult<T> {
    serde_json::to_value(payload)
        .and_then(serde_json::from_value)
        .map_err(|e| MixinError::ArgumentError(format!("malformed event payload: {}", e)))
}

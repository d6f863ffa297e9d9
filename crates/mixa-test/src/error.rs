//! Reporting errors

use mixa_core::MixinError;
use thiserror::Error;

/// Errors raised while reading events or driving a reporter
#[derive(Debug, Error)]
pub enum ReportError {
    /// An input line is not a valid event
    #[error("malformed event on line {line}: {source}")]
    Event {
        /// 1-based line number
        line: usize,
        /// Parse failure
        source: serde_json::Error,
    },

    /// A payload could not be converted
    #[error("payload conversion failed: {0}")]
    Payload(#[from] serde_json::Error),

    /// Reading the event stream failed
    #[error("failed to read events: {0}")]
    Io(#[from] std::io::Error),

    /// A reporter method failed
    #[error(transparent)]
    Mixin(#[from] MixinError),

    /// No reporter registered under this name
    #[error("unknown reporter `{0}`")]
    UnknownReporter(String),
}

/// Result type for reporting
pub type ReportResult<T> = Result<T, ReportError>;

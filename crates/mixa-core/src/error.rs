//! Module system errors

use thiserror::Error;

/// Result type for module operations and method bodies
pub type MixinResult<T> = Result<T, MixinError>;

/// Errors raised by inclusion, dispatch and method bodies
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MixinError {
    /// `call_super` with no more distant implementation to run
    #[error("No super method for `{method}`: already at the most distant ancestor")]
    InvalidSuperCall {
        /// Method name the super call was made from
        method: String,
    },

    /// No implementation of the name anywhere in the chain
    #[error("Undefined method `{method}` for {receiver}")]
    NoMethod {
        /// Requested method name
        method: String,
        /// Module or object the lookup ran against
        receiver: String,
    },

    /// The name resolves to a plain value, not a method
    #[error("`{name}` on {receiver} is not callable")]
    NotCallable {
        /// Member name
        name: String,
        /// Module or object holding the member
        receiver: String,
    },

    /// Inclusion would make a module its own ancestor
    #[error("Cyclic inclusion: {module} cannot include {included}")]
    CyclicInclusion {
        /// Module that requested the inclusion
        module: String,
        /// Module that already depends on it
        included: String,
    },

    /// Method bag with an unusable shape
    #[error("Malformed mixin: {reason}")]
    MalformedMixin {
        /// What is wrong with the bag
        reason: String,
    },

    /// Chained method table entry whose module no longer exists
    #[error("Method `{method}` outlived the module that defined it")]
    DetachedMethod {
        /// Method name
        method: String,
    },

    /// Bad argument passed to a method
    #[error("Argument error: {0}")]
    ArgumentError(String),

    /// Failure raised by a method body
    #[error("{0}")]
    Raised(String),
}

impl From<String> for MixinError {
    fn from(s: String) -> Self {
        MixinError::Raised(s)
    }
}

impl From<&str> for MixinError {
    fn from(s: &str) -> Self {
        MixinError::Raised(s.to_string())
    }
}

//! Error types for rule construction
//!
//! All errors in this crate are synchronous, construction-time failures:
//! once a rule has been built, `implies`, equality, `actions`, and hashing
//! are total functions and cannot fail. Callers should treat these errors
//! as fatal to the rule being constructed and surface them as a
//! configuration problem in the authorization setup.

use thiserror::Error;

/// Errors produced while parsing or validating a web resource rule.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuleError {
    /// The URL pattern spec is malformed: an exclusion is not matched by
    /// the primary pattern, duplicates or repeats the primary, or exclusions
    /// were supplied for an exact primary pattern.
    #[error("Malformed URL pattern spec: {0}")]
    MalformedPatternSpec(String),

    /// The transport suffix of an actions string is not one of
    /// `NONE`, `INTEGRAL`, or `CONFIDENTIAL`.
    #[error("Unknown transport level: {0:?}")]
    UnknownTransport(String),

    /// An inclusion or exception list named zero methods after
    /// deduplication. The empty actions string is the valid shorthand for
    /// "all methods" and does not raise this error.
    #[error("Method list names zero methods")]
    EmptyMethodSet,

    /// A method token is not a valid RFC 2616 token (empty, or containing
    /// a control or separator character).
    #[error("Invalid HTTP method token: {0:?}")]
    InvalidMethodToken(String),
}

/// Result type for rule construction.
pub type RuleResult<T> = Result<T, RuleError>;

impl RuleError {
    /// Get error code for API responses and audit entries.
    pub fn error_code(&self) -> &'static str {
        match self {
            RuleError::MalformedPatternSpec(_) => "MALFORMED_PATTERN_SPEC",
            RuleError::UnknownTransport(_) => "UNKNOWN_TRANSPORT",
            RuleError::EmptyMethodSet => "EMPTY_METHOD_SET",
            RuleError::InvalidMethodToken(_) => "INVALID_METHOD_TOKEN",
        }
    }
}

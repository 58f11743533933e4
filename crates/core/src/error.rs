//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic failures that are decided locally
/// (presence checks, workflow transitions). Store and transport failures
/// belong to `procure-infra`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// One or more required fields are blank or absent.
    #[error("missing required field(s): {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// Whether this error was raised before any remote call (presence checks).
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::MissingFields(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_lists_every_field() {
        let err = DomainError::MissingFields(vec!["qcchecklist", "qcstatus"]);
        assert_eq!(
            err.to_string(),
            "missing required field(s): qcchecklist, qcstatus"
        );
        assert!(err.is_validation());
    }

    #[test]
    fn invariant_is_not_a_validation_error() {
        assert!(!DomainError::invariant("back from top").is_validation());
        assert!(!DomainError::invalid_id("VendorId: abc").is_validation());
    }
}

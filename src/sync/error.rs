//! Reconciliation error taxonomy.

use thiserror::Error;

use crate::remote::GatewayError;

/// Remote mutation kinds, used for error context and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// Errors that end a reconciliation.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The resource exists but declares no usable routing target.
    #[error("invalid spec for {key}: {reason}")]
    InvalidSpec { key: String, reason: String },

    /// The remote service could not tell whether the check exists.
    #[error("lookup of {key} failed: {source}")]
    LookupFailed {
        key: String,
        #[source]
        source: GatewayError,
    },

    /// A create, update or delete was rejected.
    #[error("{operation} of {key} failed: {source}")]
    MutationFailed {
        operation: Operation,
        key: String,
        #[source]
        source: GatewayError,
    },

    /// A numeric field could not be converted.
    #[error("field {field} has invalid value {value:?}")]
    ConversionFailed { field: &'static str, value: String },

    /// The reconciliation was cancelled by the caller.
    #[error("reconciliation cancelled")]
    Cancelled,
}

impl SyncError {
    /// Whether re-running the same reconciliation later can succeed.
    ///
    /// Spec errors only go away when the resource itself changes.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SyncError::LookupFailed { .. } | SyncError::MutationFailed { .. }
        )
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::InvalidSpec { .. } => "invalid_spec",
            SyncError::LookupFailed { .. } => "lookup_failed",
            SyncError::MutationFailed { .. } => "mutation_failed",
            SyncError::ConversionFailed { .. } => "conversion_failed",
            SyncError::Cancelled => "cancelled",
        }
    }
}

/// Result type for reconciliation steps.
pub type SyncResult<T> = Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SyncError::ConversionFailed {
            field: "timeout",
            value: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "field timeout has invalid value \"abc\"");

        let err = SyncError::MutationFailed {
            operation: Operation::Update,
            key: "ns_foo".to_string(),
            source: GatewayError::NotFound,
        };
        assert!(err.to_string().starts_with("update of ns_foo failed"));
    }

    #[test]
    fn test_retryable() {
        let lookup = SyncError::LookupFailed {
            key: "k".to_string(),
            source: GatewayError::Decode("bad".to_string()),
        };
        assert!(lookup.is_retryable());
        assert!(!SyncError::Cancelled.is_retryable());
        assert!(!SyncError::InvalidSpec {
            key: "k".to_string(),
            reason: "no rules".to_string()
        }
        .is_retryable());
    }
}

//! # Store Errors
//!
//! Every partition and stash operation returns its expected failures as the
//! error side of a `StoreResult`. Nothing in the store panics on a missing
//! row, a collision, a denied credential or a bad query key.
//!
//! Error codes:
//! - STASH_NOT_FOUND
//! - STASH_DUPLICATE_KEY
//! - STASH_PERMISSION_DENIED
//! - STASH_QUERY_ERROR

use std::fmt;

use thiserror::Error;

/// Kind tag carried by every store error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreErrorKind {
    /// Primary id absent on delete or update
    NotFound,
    /// Unique attribute collision on insert
    DuplicateKey,
    /// Credential lacks the required access
    PermissionDenied,
    /// Query key not declared on the schema, or the lookup itself failed
    Query,
}

impl StoreErrorKind {
    /// Stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            StoreErrorKind::NotFound => "STASH_NOT_FOUND",
            StoreErrorKind::DuplicateKey => "STASH_DUPLICATE_KEY",
            StoreErrorKind::PermissionDenied => "STASH_PERMISSION_DENIED",
            StoreErrorKind::Query => "STASH_QUERY_ERROR",
        }
    }
}

impl fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Store error: a kind tag plus a human-readable message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct StoreError {
    kind: StoreErrorKind,
    message: String,
}

impl StoreError {
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::NotFound, message)
    }

    pub fn duplicate_key(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::DuplicateKey, message)
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::PermissionDenied, message)
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Query, message)
    }

    /// Returns the error kind
    pub fn kind(&self) -> StoreErrorKind {
        self.kind
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the error code string
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(StoreErrorKind::NotFound.code(), "STASH_NOT_FOUND");
        assert_eq!(StoreErrorKind::DuplicateKey.code(), "STASH_DUPLICATE_KEY");
        assert_eq!(StoreErrorKind::PermissionDenied.code(), "STASH_PERMISSION_DENIED");
        assert_eq!(StoreErrorKind::Query.code(), "STASH_QUERY_ERROR");
    }

    #[test]
    fn test_display_includes_code_and_message() {
        let err = StoreError::query("Failed to query index or search with QueryKey(key=status)");
        let display = err.to_string();
        assert!(display.starts_with("STASH_QUERY_ERROR: "));
        assert!(display.contains("QueryKey(key=status)"));
    }

    #[test]
    fn test_errors_compare_verbatim() {
        let a = StoreError::not_found("missing");
        assert_eq!(a.clone(), a);
        assert_ne!(a, StoreError::query("missing"));
    }
}

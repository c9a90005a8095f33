//! Error types for `bitsieve`.
//!
//! The predicate kernels never fail: a strategy that lacks a specialization
//! answers `false` and the caller reroutes. Errors only surface from the
//! orchestration layers (configuration, dispatcher binding, the column filter
//! and the index boundary record).

use thiserror::Error;

/// Result type alias for `bitsieve` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in `bitsieve` operations.
///
/// Error codes follow the pattern `SIEVE-XXX`.
#[derive(Error, Debug)]
pub enum Error {
    /// Requested backend cannot run on this host (SIEVE-001).
    #[error("[SIEVE-001] Backend '{0}' is not available on this host")]
    BackendUnavailable(String),

    /// Process-wide dispatcher was already bound to another backend (SIEVE-002).
    #[error("[SIEVE-002] Dispatcher already initialized with backend '{bound}', requested '{requested}'")]
    AlreadyInitialized {
        /// Backend currently bound.
        bound: String,
        /// Backend that was requested.
        requested: String,
    },

    /// Configuration error (SIEVE-003).
    #[error("[SIEVE-003] Configuration error: {0}")]
    Config(String),

    /// Field type has no numeric specialization (SIEVE-004).
    #[error("[SIEVE-004] Unsupported field type: {0}")]
    UnsupportedFieldType(String),

    /// Operand lengths differ (SIEVE-005).
    #[error("[SIEVE-005] Length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// Operand element types differ (SIEVE-006).
    #[error("[SIEVE-006] Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Expected type name.
        expected: String,
        /// Actual type name.
        actual: String,
    },

    /// No registered strategy handled the operation (SIEVE-007).
    ///
    /// The scalar strategy is total, so reaching this with fallback enabled
    /// is an internal contract violation.
    #[error("[SIEVE-007] Operation '{operation}' unimplemented by backend '{backend}'")]
    Unimplemented {
        /// Backend that reported no coverage.
        backend: String,
        /// Operation description.
        operation: String,
    },

    /// Serialization error (SIEVE-008).
    #[error("[SIEVE-008] Serialization error: {0}")]
    Serialization(String),

    /// IO error (SIEVE-009).
    #[error("[SIEVE-009] IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns the error code (e.g., "SIEVE-001").
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::BackendUnavailable(_) => "SIEVE-001",
            Self::AlreadyInitialized { .. } => "SIEVE-002",
            Self::Config(_) => "SIEVE-003",
            Self::UnsupportedFieldType(_) => "SIEVE-004",
            Self::LengthMismatch { .. } => "SIEVE-005",
            Self::TypeMismatch { .. } => "SIEVE-006",
            Self::Unimplemented { .. } => "SIEVE-007",
            Self::Serialization(_) => "SIEVE-008",
            Self::Io(_) => "SIEVE-009",
        }
    }

    /// Returns true if this error is recoverable.
    ///
    /// `Unimplemented` means the total scalar strategy was bypassed or broken.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Unimplemented { .. })
    }
}

impl From<crate::config::ConfigError> for Error {
    fn from(err: crate::config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

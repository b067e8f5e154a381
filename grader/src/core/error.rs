//! Error taxonomy for the pure grading core.

use thiserror::Error;

/// Failures surfaced by core operations.
///
/// `NotFound` and `InvariantViolation` indicate a caller bug or corrupted
/// data; they never leave a partially mutated session behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A path or id did not resolve in the current tree or index.
    #[error("{what} not found")]
    NotFound { what: String },

    /// Externally supplied data failed shape validation.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The requested change would break exclusivity or id uniqueness.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl CoreError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

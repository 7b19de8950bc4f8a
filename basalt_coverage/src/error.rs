//! Error types for coverage emission.
//!
//! Everything here is a precondition violation: the subsystem is a pure
//! transform over already-validated IR, so an error means an earlier
//! pipeline step ran out of order or handed over malformed data. Callers
//! abort the compilation step; nothing is retried.

use thiserror::Error;

/// The result type used throughout the coverage subsystem.
pub type CoverageResult<T> = Result<T, CoverageError>;

/// Fatal coverage emission errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoverageError {
    /// The writer ran before code generation produced a module.
    #[error("code generation module is not initialized")]
    ModuleNotInitialized,

    /// The mapping encoder rejected a function's region list.
    #[error("malformed region mapping for `{function}`: {detail}")]
    MalformedRegions {
        /// Qualified name of the offending function.
        function: String,
        /// What the encoder rejected.
        detail: String,
    },
}

impl CoverageError {
    /// Create a malformed-regions error.
    #[must_use]
    pub fn malformed(function: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::MalformedRegions {
            function: function.into(),
            detail: detail.into(),
        }
    }
}

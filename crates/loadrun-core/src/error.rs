//! Error types for loadrun orchestration

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for loadrun operations
#[derive(Error, Debug)]
pub enum LoadError {
    /// Scenario name did not match any known profile
    #[error("Unknown scenario '{0}' (expected one of: smoke, baseline, load, stress, full)")]
    UnknownScenario(String),

    /// Environment name has no built-in target URL and no override was given
    #[error("Unknown environment '{0}' and no --target-url override given")]
    UnknownEnvironment(String),

    /// The configured scripts directory does not exist
    #[error("Scripts directory not found: {0}")]
    ScriptsDirMissing(PathBuf),

    /// A test script referenced by the selected scenario is missing
    #[error("Test script not found: {0}")]
    ScriptMissing(PathBuf),

    /// The container runtime could not be invoked
    #[error("Container runtime unavailable: {0}")]
    DockerUnavailable(String),

    /// A test phase exited non-zero
    #[error("Phase '{phase}' failed with exit code {code}")]
    PhaseFailed {
        /// Name of the failing phase
        phase: String,
        /// Exit code of the runner process (-1 if killed by a signal)
        code: i32,
    },

    /// Run timestamp would escape the results directory
    #[error("Invalid run timestamp: {0}")]
    InvalidTimestamp(String),

    /// Concurrency ceiling below the minimum of one virtual user
    #[error("Concurrency ceiling must be at least 1 (got {0})")]
    InvalidCeiling(u32),

    /// General I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error serializing the run summary
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using LoadError
pub type LoadResult<T> = Result<T, LoadError>;

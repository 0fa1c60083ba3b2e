//! Structured error handling and exit codes.

use serde::Serialize;

/// Exit codes for the MediaSift application.
///
/// - 0: Success (batch completed, every candidate classified)
/// - 1: General error (unexpected failure, unusable index)
/// - 2: No candidates (nothing to classify or upload)
/// - 3: Partial success (batch completed but some files were skipped)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: every candidate was classified.
    Success = 0,
    /// General error: an unexpected error occurred.
    GeneralError = 1,
    /// No candidates: the batch was empty.
    NoCandidates = 2,
    /// Partial success: completed but some candidates were skipped.
    PartialSuccess = 3,
    /// Interrupted: the run was interrupted by the user (Ctrl+C).
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "MS000",
            Self::GeneralError => "MS001",
            Self::NoCandidates => "MS002",
            Self::PartialSuccess => "MS003",
            Self::Interrupted => "MS130",
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "MS001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: err.to_string(),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}

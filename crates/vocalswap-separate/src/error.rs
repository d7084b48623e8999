//! Error types for the separation backend.

use std::path::PathBuf;
use thiserror::Error;
use vocalswap_core::VocalSwapError;

/// Result type for separation operations.
pub type SeparationResult<T> = Result<T, SeparationError>;

/// Errors that can occur while running Demucs.
#[derive(Debug, Error)]
pub enum SeparationError {
    /// Demucs executable not found.
    #[error("Demucs executable not found. Install it (pip install demucs) and ensure it is in PATH, or set DEMUCS_PATH")]
    ExecutableNotFound,

    /// Failed to spawn the Demucs process.
    #[error("Failed to spawn Demucs process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    /// Demucs timed out.
    #[error("Demucs timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// Demucs exited with non-zero status.
    #[error("Demucs exited with status {exit_code}: {stderr}")]
    ProcessFailed { exit_code: i32, stderr: String },

    /// Demucs exited cleanly but a stem is absent.
    #[error("Expected stem not found after separation: {path}. Check if Demucs completed")]
    OutputMissing { path: PathBuf },

    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SeparationError {
    /// Creates a new process failed error.
    pub fn process_failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self::ProcessFailed {
            exit_code,
            stderr: stderr.into(),
        }
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            SeparationError::ExecutableNotFound => "SEP_001",
            SeparationError::SpawnFailed(_) => "SEP_002",
            SeparationError::Timeout { .. } => "SEP_003",
            SeparationError::ProcessFailed { .. } => "SEP_004",
            SeparationError::OutputMissing { .. } => "SEP_005",
            SeparationError::Io(_) => "SEP_006",
        }
    }

    /// Error category for grouping related errors.
    pub fn category(&self) -> &'static str {
        "separation"
    }
}

impl From<SeparationError> for VocalSwapError {
    fn from(err: SeparationError) -> Self {
        VocalSwapError::separation_failed(format!("[{}] {}", err.code(), err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SeparationError::ExecutableNotFound;
        assert!(err.to_string().contains("DEMUCS_PATH"));

        let err = SeparationError::Timeout { timeout_secs: 1800 };
        assert!(err.to_string().contains("1800 seconds"));

        let err = SeparationError::process_failed(2, "CUDA out of memory");
        assert!(err.to_string().contains("CUDA out of memory"));
    }

    #[test]
    fn test_converts_to_separation_failed() {
        let err: VocalSwapError = SeparationError::OutputMissing {
            path: PathBuf::from("separated/mdx_extra/song/vocals.wav"),
        }
        .into();
        assert!(matches!(err, VocalSwapError::SeparationFailed { .. }));
        assert!(err.to_string().contains("SEP_005"));
        assert!(err.to_string().contains("vocals.wav"));
    }
}

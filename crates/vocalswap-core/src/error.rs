//! Error types for the vocalswap core.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for vocalswap operations.
pub type VocalSwapResult<T> = Result<T, VocalSwapError>;

/// Errors that can occur while tagging or reconstructing audio.
///
/// Only structural failures live here. Per-segment anomalies (empty slices,
/// intervals past the end of the instrumental, unknown tags) are recovered
/// locally and logged instead.
#[derive(Debug, Error)]
pub enum VocalSwapError {
    /// Malformed parameters or an empty signal.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Error message.
        message: String,
    },

    /// A required voice sample or stem file is absent.
    #[error("missing asset: {}", path.display())]
    MissingAsset {
        /// Path that was expected to exist.
        path: PathBuf,
    },

    /// The external separation step failed or produced no usable output.
    #[error("separation failed: {message}")]
    SeparationFailed {
        /// Error message.
        message: String,
    },

    /// The file extension is not one of the supported codecs.
    #[error("unsupported audio format '{extension}' for {}", path.display())]
    UnsupportedFormat {
        /// Path that was given.
        path: PathBuf,
        /// Extension found (lowercased, may be empty).
        extension: String,
    },

    /// A supported format that could not be decoded.
    #[error("failed to decode {}: {message}", path.display())]
    Decode {
        /// Path being decoded.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl VocalSwapError {
    /// Creates an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a missing asset error.
    pub fn missing_asset(path: impl Into<PathBuf>) -> Self {
        Self::MissingAsset { path: path.into() }
    }

    /// Creates a separation failed error.
    pub fn separation_failed(message: impl Into<String>) -> Self {
        Self::SeparationFailed {
            message: message.into(),
        }
    }

    /// Creates a decode error.
    pub fn decode(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Stable error code for reporting.
    pub fn code(&self) -> &'static str {
        match self {
            VocalSwapError::InvalidInput { .. } => "VOX_001",
            VocalSwapError::MissingAsset { .. } => "VOX_002",
            VocalSwapError::SeparationFailed { .. } => "VOX_003",
            VocalSwapError::UnsupportedFormat { .. } => "VOX_004",
            VocalSwapError::Decode { .. } => "VOX_005",
            VocalSwapError::Io(_) => "VOX_006",
        }
    }

    /// Error category for grouping related errors.
    pub fn category(&self) -> &'static str {
        match self {
            VocalSwapError::InvalidInput { .. } => "input",
            VocalSwapError::MissingAsset { .. } => "asset",
            VocalSwapError::SeparationFailed { .. } => "separation",
            VocalSwapError::UnsupportedFormat { .. } | VocalSwapError::Decode { .. } => "codec",
            VocalSwapError::Io(_) => "io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_helper() {
        let err = VocalSwapError::invalid_input("chunk_ms must be positive");
        assert!(err.to_string().contains("chunk_ms must be positive"));
        assert_eq!(err.code(), "VOX_001");
    }

    #[test]
    fn test_missing_asset_display() {
        let err = VocalSwapError::missing_asset("voices/low.wav");
        assert!(err.to_string().contains("voices/low.wav"));
        assert_eq!(err.category(), "asset");
    }

    #[test]
    fn test_unsupported_format_display() {
        let err = VocalSwapError::UnsupportedFormat {
            path: PathBuf::from("song.flac"),
            extension: "flac".to_string(),
        };
        assert!(err.to_string().contains("'flac'"));
        assert_eq!(err.code(), "VOX_004");
    }
}

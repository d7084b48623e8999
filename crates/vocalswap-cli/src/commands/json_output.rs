//! JSON output types for machine-readable CLI output.
//!
//! Commands run with `--json` print exactly one [`CommandOutput`] document on
//! stdout; logs stay on stderr.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use vocalswap_core::VocalSwapError;
use vocalswap_separate::SeparationError;

/// Error codes for CLI-level failures that carry no library code.
pub mod error_codes {
    /// Input file could not be found
    pub const INPUT_NOT_FOUND: &str = "CLI_001";
    /// Any other failure
    pub const INTERNAL: &str = "CLI_099";
}

/// A structured error in JSON output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonError {
    /// Stable error code (e.g., "VOX_002", "SEP_004", "CLI_001")
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl JsonError {
    /// Creates an error with an explicit code.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Maps an `anyhow` error chain to a coded error, preferring library
    /// codes found anywhere in the chain.
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let code = err
            .chain()
            .find_map(|cause| {
                cause
                    .downcast_ref::<VocalSwapError>()
                    .map(VocalSwapError::code)
                    .or_else(|| cause.downcast_ref::<SeparationError>().map(SeparationError::code))
            })
            .unwrap_or(error_codes::INTERNAL);
        Self::new(code, format!("{:#}", err))
    }
}

/// Envelope for `--json` output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandOutput<T> {
    /// Whether the command succeeded
    pub success: bool,
    /// Errors, empty on success
    #[serde(default)]
    pub errors: Vec<JsonError>,
    /// Command result on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
}

impl<T: Serialize> CommandOutput<T> {
    /// Successful output.
    pub fn ok(result: T) -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            result: Some(result),
        }
    }

    /// Failed output.
    pub fn failed(error: JsonError) -> Self {
        Self {
            success: false,
            errors: vec![error],
            result: None,
        }
    }

    /// Pretty-prints to stdout.
    pub fn print(&self) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(self)?);
        Ok(())
    }
}

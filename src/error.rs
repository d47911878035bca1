//! Error types for intersector.
//!
//! Every failure of the `intersect` command is one of the [`IntersectError`]
//! kinds. None of them are retried: each is converted into a message and a
//! non-zero exit code at the command boundary.

use std::path::PathBuf;
use std::process::ExitCode;

use thiserror::Error;

/// Expected textual form of a plane definition.
pub const PLANE_FORMAT_HINT: &str = "'x,y,z:nx,ny,nz' (e.g., 0,0,100:0,0,1)";

/// Errors that can occur during configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration file: {path}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    NotFound {
        /// Path where the configuration file was expected.
        path: PathBuf,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation failure.
        message: String,
    },
}

/// Errors surfaced by the plane intersection workflow.
#[derive(Error, Debug)]
pub enum IntersectError {
    /// The input shape file is missing, unreadable, or holds no shape.
    #[error("Failed to read STEP file: '{}'", .path.display())]
    FileRead {
        /// Path given on the command line.
        path: PathBuf,
    },

    /// The plane text does not match `x,y,z:nx,ny,nz`.
    #[error("Invalid plane definition: '{input}'. Plane format must be {}", PLANE_FORMAT_HINT)]
    InvalidFormat {
        /// The offending plane text, unmodified.
        input: String,
    },

    /// The intersection step was handed unusable input.
    #[error("Invalid input to intersection: {reason}")]
    InvalidInput {
        /// What was wrong with the input.
        reason: String,
    },

    /// The backend did not complete the section operation.
    #[error("Intersection computation failed: {reason}")]
    ComputationFailed {
        /// Backend diagnostic.
        reason: String,
    },

    /// Writing the intersection result failed.
    #[error("Failed to export intersection result.")]
    Export {
        /// Destination that could not be written.
        path: PathBuf,
    },

    /// Showing the shapes failed after the result was exported.
    #[error("Error displaying shapes: {reason}")]
    Display {
        /// Backend diagnostic.
        reason: String,
    },
}

impl IntersectError {
    /// Creates an invalid format error for the given plane text.
    pub fn invalid_format(input: impl Into<String>) -> Self {
        Self::InvalidFormat {
            input: input.into(),
        }
    }

    /// Creates an invalid input error.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Creates a computation failure.
    pub fn computation_failed(reason: impl Into<String>) -> Self {
        Self::ComputationFailed {
            reason: reason.into(),
        }
    }

    /// Process exit code reported for this error.
    ///
    /// Codes start at 3: 1 is the generic failure used for configuration
    /// errors and 2 is what clap exits with on a malformed command line.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::FileRead { .. } => 3,
            Self::InvalidFormat { .. } => 4,
            Self::InvalidInput { .. } => 5,
            Self::ComputationFailed { .. } => 6,
            Self::Export { .. } => 7,
            Self::Display { .. } => 8,
        }
    }
}

impl From<&IntersectError> for ExitCode {
    fn from(err: &IntersectError) -> Self {
        Self::from(err.exit_code())
    }
}

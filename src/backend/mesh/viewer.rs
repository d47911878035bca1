//! External viewer launch.
//!
//! Rendering is left to a separate program (for example `f3d` or a CAD
//! viewer). The viewer is started with the configured arguments followed by
//! the shape files, and the call blocks until it exits.

use std::path::PathBuf;
use std::process::Command;

use tracing::{debug, info};

use crate::backend::{BackendError, BackendResult};

/// Program used to show shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    command: String,
    args: Vec<String>,
}

impl Viewer {
    /// Creates a viewer invoking `command` with `args` before the file list.
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    /// Program name or path.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Shows `files`, blocking until the viewer exits.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be started or exits with a
    /// non-zero status.
    pub fn show(&self, files: &[PathBuf]) -> BackendResult<()> {
        info!(viewer = %self.command, files = files.len(), "Opening viewer");
        let status = Command::new(&self.command)
            .args(&self.args)
            .args(files)
            .status()
            .map_err(|e| {
                BackendError::viewer(format!("could not start '{}'", self.command), Some(e))
            })?;

        if status.success() {
            debug!(viewer = %self.command, "Viewer closed");
            Ok(())
        } else {
            Err(BackendError::viewer(
                format!("'{}' exited with {status}", self.command),
                None,
            ))
        }
    }
}

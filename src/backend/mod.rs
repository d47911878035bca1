//! Geometry backend seam.
//!
//! The workflow never touches geometry directly. Shape I/O, plane and face
//! construction, the section primitive, edge enumeration and display all go
//! through [`GeometryBackend`], so any boundary-representation or mesh engine
//! can be plugged in at the command boundary and tests can substitute a fake.
//!
//! # Backends
//!
//! - [`mesh::MeshBackend`] — triangle meshes read from STL, sections written
//!   as ISO 10303-21 wireframes

pub mod mesh;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::plane::{Normal, Point};

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Outcome of a backend section operation.
#[derive(Debug, Clone)]
pub struct Section<S> {
    /// Resulting shape, usually a set of edges.
    pub shape: S,
    /// Whether the backend reports the operation as completed.
    pub done: bool,
}

impl<S> Section<S> {
    /// A completed section.
    pub const fn done(shape: S) -> Self {
        Self { shape, done: true }
    }

    /// A section the backend could not complete.
    pub const fn not_done(shape: S) -> Self {
        Self { shape, done: false }
    }
}

/// Capabilities the intersection workflow needs from a geometry engine.
///
/// Shapes are opaque: the workflow only passes them between calls.
pub trait GeometryBackend {
    /// Handle to a solid, surface or edge set.
    type Shape;
    /// Infinite plane.
    type Plane;
    /// Face spanning a plane, used as the section tool.
    type Face;
    /// Edge of a shape, as yielded by [`GeometryBackend::edges`].
    type Edge;

    /// Reads a shape from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or holds no shape.
    fn read_shape(&self, path: &Path) -> BackendResult<Self::Shape>;

    /// Writes `shape` to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the shape cannot be encoded or written.
    fn write_shape(&self, shape: &Self::Shape, path: &Path) -> BackendResult<()>;

    /// Builds an infinite plane through `point` with the given `normal`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot build a plane from the values
    /// (for example a zero-length normal).
    fn make_plane(&self, point: &Point, normal: &Normal) -> BackendResult<Self::Plane>;

    /// Builds a face spanning `plane`.
    fn make_face(&self, plane: &Self::Plane) -> Self::Face;

    /// Sections `shape` with `tool`.
    fn section(&self, shape: &Self::Shape, tool: &Self::Face) -> Section<Self::Shape>;

    /// Enumerates the edges of `shape`.
    fn edges<'a>(&'a self, shape: &'a Self::Shape) -> Box<dyn Iterator<Item = Self::Edge> + 'a>;

    /// Shows `shapes` together. May block until the viewer is closed.
    ///
    /// # Errors
    ///
    /// Returns an error if the viewer cannot be started or reports failure.
    fn display(&self, shapes: &[&Self::Shape]) -> BackendResult<()>;
}

/// Errors reported by geometry backends.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Failed to read a file.
    #[error("Failed to read file: {path}")]
    FileRead {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to write a file.
    #[error("Failed to write file: {path}")]
    FileWrite {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The file format is not handled by this backend.
    #[error("Unsupported shape format for {path}: {message}")]
    UnsupportedFormat {
        /// Path to the file.
        path: PathBuf,
        /// Description of what's unsupported.
        message: String,
    },

    /// The file was read but holds no usable shape.
    #[error("No shape data found in {path}")]
    EmptyShape {
        /// Path to the file.
        path: PathBuf,
    },

    /// Geometry values the backend cannot build from.
    #[error("Degenerate geometry: {message}")]
    Degenerate {
        /// Description of what's wrong.
        message: String,
    },

    /// The viewer could not be started or exited with failure.
    #[error("Viewer failed: {message}")]
    Viewer {
        /// Description of what went wrong.
        message: String,
        /// Underlying I/O error if available.
        #[source]
        source: Option<io::Error>,
    },
}

impl BackendError {
    /// Creates a file read error.
    pub fn file_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a file write error.
    pub fn file_write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    /// Creates an unsupported format error.
    pub fn unsupported_format(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a degenerate geometry error.
    pub fn degenerate(message: impl Into<String>) -> Self {
        Self::Degenerate {
            message: message.into(),
        }
    }

    /// Creates a viewer error.
    pub fn viewer(message: impl Into<String>, source: Option<io::Error>) -> Self {
        Self::Viewer {
            message: message.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = BackendError::degenerate("plane normal has zero length");
        assert_eq!(
            err.to_string(),
            "Degenerate geometry: plane normal has zero length"
        );
    }

    #[test]
    fn unsupported_format_display() {
        let err = BackendError::unsupported_format("part.step", "no STEP reader");
        assert_eq!(
            err.to_string(),
            "Unsupported shape format for part.step: no STEP reader"
        );
    }

    #[test]
    fn section_constructors() {
        assert!(Section::done(()).done);
        assert!(!Section::not_done(()).done);
    }
}

//! Plane intersection workflow.
//!
//! A single linear pass with no retries:
//!
//! 1. load the input shape
//! 2. parse the plane definition
//! 3. section the shape with the plane
//! 4. check the result has at least one edge (none is a normal outcome)
//! 5. export the result
//! 6. display the input and the result
//!
//! The first failing step ends the run with its [`IntersectError`].

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::backend::GeometryBackend;
use crate::error::IntersectError;
use crate::plane::{parse_plane, Normal, Point};

/// Name of the file the intersection result is written to.
pub const OUTPUT_FILE_NAME: &str = "intersection.stp";

/// Successful end states of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The plane cuts the shape; the result was exported and displayed.
    Exported {
        /// Where the result was written.
        path: PathBuf,
    },
    /// The plane misses the shape. Nothing was exported.
    NoIntersection,
}

/// Inputs of one `intersect` run.
#[derive(Debug, Clone)]
pub struct IntersectRequest {
    /// Shape file to read.
    pub input: PathBuf,
    /// Plane definition text, `x,y,z:nx,ny,nz`.
    pub plane: String,
    /// Destination of the intersection result.
    pub output: PathBuf,
}

impl IntersectRequest {
    /// Creates a request writing to [`OUTPUT_FILE_NAME`] in the working
    /// directory.
    pub fn new(input: impl Into<PathBuf>, plane: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            plane: plane.into(),
            output: PathBuf::from(OUTPUT_FILE_NAME),
        }
    }
}

/// Sections `shape` with the plane through `point` with normal `normal`.
///
/// Point and normal are handed to the backend unmodified.
///
/// # Errors
///
/// - [`IntersectError::InvalidInput`] if `shape` is absent
/// - [`IntersectError::ComputationFailed`] if the backend cannot build a
///   plane from the values or does not complete the section
pub fn intersect<B: GeometryBackend>(
    backend: &B,
    shape: Option<&B::Shape>,
    point: &Point,
    normal: &Normal,
) -> Result<B::Shape, IntersectError> {
    let Some(shape) = shape else {
        return Err(IntersectError::invalid_input("shape cannot be empty"));
    };

    let plane = backend.make_plane(point, normal).map_err(|e| {
        error!(error = %e, "Could not build section plane");
        IntersectError::computation_failed(e.to_string())
    })?;
    let face = backend.make_face(&plane);

    info!(
        point = ?(point.x, point.y, point.z),
        normal = ?(normal.x, normal.y, normal.z),
        "Intersecting shape with plane"
    );

    let section = backend.section(shape, &face);
    if !section.done {
        return Err(IntersectError::computation_failed("section not completed"));
    }
    Ok(section.shape)
}

/// Whether `result` holds at least one edge. An absent result is invalid.
pub fn is_valid<B: GeometryBackend>(backend: &B, result: Option<&B::Shape>) -> bool {
    result.is_some_and(|shape| backend.edges(shape).next().is_some())
}

/// Loads the input shape.
///
/// # Errors
///
/// Returns [`IntersectError::FileRead`] if `path` does not exist or the
/// backend cannot read a shape from it.
pub fn load_shape<B: GeometryBackend>(backend: &B, path: &Path) -> Result<B::Shape, IntersectError> {
    if !path.exists() {
        error!(path = %path.display(), "File not found");
        return Err(IntersectError::FileRead {
            path: path.to_path_buf(),
        });
    }

    info!(path = %path.display(), "Reading shape file");
    backend.read_shape(path).map_err(|e| {
        error!(path = %path.display(), error = %e, "Failed to read shape file");
        IntersectError::FileRead {
            path: path.to_path_buf(),
        }
    })
}

/// Writes the intersection result to `path`.
///
/// # Errors
///
/// Returns [`IntersectError::Export`] if the backend reports failure.
pub fn export<B: GeometryBackend>(
    backend: &B,
    result: &B::Shape,
    path: &Path,
) -> Result<(), IntersectError> {
    backend.write_shape(result, path).map_err(|e| {
        error!(path = %path.display(), error = %e, "Export failed");
        IntersectError::Export {
            path: path.to_path_buf(),
        }
    })?;
    info!(path = %path.display(), "Shape exported");
    Ok(())
}

/// Shows `shapes` in the backend's viewer.
///
/// # Errors
///
/// Returns [`IntersectError::Display`] if the backend reports failure.
pub fn visualize<B: GeometryBackend>(
    backend: &B,
    shapes: &[&B::Shape],
) -> Result<(), IntersectError> {
    backend.display(shapes).map_err(|e| {
        error!(error = %e, "Error visualizing the shapes");
        IntersectError::Display {
            reason: e.to_string(),
        }
    })
}

/// Runs the full workflow, reporting progress lines to `console`.
///
/// # Errors
///
/// Returns the error of the first step that fails. A plane that misses the
/// shape is not an error: it yields [`Outcome::NoIntersection`].
pub fn run<B: GeometryBackend, W: Write>(
    backend: &B,
    request: &IntersectRequest,
    console: &mut W,
) -> Result<Outcome, IntersectError> {
    let shape = load_shape(backend, &request.input)?;
    say(console, "Input file successfully loaded!");

    let plane = parse_plane(&request.plane)?;
    let result = intersect(backend, Some(&shape), &plane.point, &plane.normal)?;

    if !is_valid(backend, Some(&result)) {
        info!("Section produced no edges");
        say(
            console,
            "No intersection between the input shape and the given plane.",
        );
        return Ok(Outcome::NoIntersection);
    }
    debug!(edges = backend.edges(&result).count(), "Section has edges");

    export(backend, &result, &request.output)?;
    say(
        console,
        &format!(
            "Intersection computed successfully. Result saved to '{}'.",
            request.output.display()
        ),
    );

    // The exported file stays in place even if display fails.
    visualize(backend, &[&shape, &result])?;

    Ok(Outcome::Exported {
        path: request.output.clone(),
    })
}

fn say<W: Write>(console: &mut W, line: &str) {
    if let Err(e) = writeln!(console, "{line}") {
        warn!(error = %e, "Could not write to console");
    }
}

//! Triangle-mesh geometry backend.
//!
//! A lightweight [`GeometryBackend`] for faceted models:
//!
//! - **Input**: STL files (ASCII or binary). STEP input needs a B-rep kernel
//!   and is reported as unsupported.
//! - **Section**: exact plane/triangle intersection, see [`section`].
//! - **Output**: edge sets as ISO 10303-21 wireframes, meshes as binary STL.
//! - **Display**: hands the shapes to an external [`Viewer`] program.

pub mod section;
pub mod step;
pub mod stl;
pub mod viewer;

use std::path::{Path, PathBuf};

use nalgebra::{Point3, Vector3};
use tracing::{debug, info, warn};

pub use section::MeshPlane;
pub use viewer::Viewer;

use super::{BackendError, BackendResult, GeometryBackend, Section};
use crate::plane::{Normal, Point};

/// A triangle of a faceted surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// Corner points, counter-clockwise seen from outside.
    pub vertices: [Point3<f64>; 3],
}

impl Triangle {
    /// Creates a triangle from its corners.
    #[must_use]
    pub const fn new(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> Self {
        Self {
            vertices: [a, b, c],
        }
    }

    /// The three boundary edges.
    #[must_use]
    pub fn edges(&self) -> [Segment; 3] {
        let [a, b, c] = self.vertices;
        [Segment::new(a, b), Segment::new(b, c), Segment::new(c, a)]
    }

    /// Unit facet normal, or zero for a degenerate triangle.
    #[must_use]
    pub fn normal(&self) -> Vector3<f64> {
        let [a, b, c] = self.vertices;
        (b - a)
            .cross(&(c - a))
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }

    /// Whether every coordinate is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.vertices
            .iter()
            .all(|v| v.coords.iter().all(|c| c.is_finite()))
    }
}

/// A straight edge between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// First endpoint.
    pub start: Point3<f64>,
    /// Second endpoint.
    pub end: Point3<f64>,
}

impl Segment {
    /// Creates a segment.
    #[must_use]
    pub const fn new(start: Point3<f64>, end: Point3<f64>) -> Self {
        Self { start, end }
    }

    /// Euclidean length.
    #[must_use]
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// Whether both endpoints are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.start.coords.iter().all(|c| c.is_finite())
            && self.end.coords.iter().all(|c| c.is_finite())
    }
}

/// Shape handled by [`MeshBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum MeshShape {
    /// Faceted surface or solid.
    Faces(Vec<Triangle>),
    /// Set of edges, as produced by a section.
    Edges(Vec<Segment>),
}

impl MeshShape {
    /// Axis-aligned box between `min` and `max`.
    #[must_use]
    pub fn cuboid(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self::Faces(cuboid_triangles(min, max))
    }

    /// Short name of the shape kind, for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Faces(_) => "faces",
            Self::Edges(_) => "edges",
        }
    }

    /// File extension the shape is written with when the caller picks.
    #[must_use]
    pub const fn preferred_extension(&self) -> &'static str {
        match self {
            Self::Faces(_) => "stl",
            Self::Edges(_) => "stp",
        }
    }
}

/// Triangulated axis-aligned box with outward-facing triangles.
#[must_use]
pub fn cuboid_triangles(min: Point3<f64>, max: Point3<f64>) -> Vec<Triangle> {
    let corner = |x: bool, y: bool, z: bool| {
        Point3::new(
            if x { max.x } else { min.x },
            if y { max.y } else { min.y },
            if z { max.z } else { min.z },
        )
    };
    // Quads wound counter-clockwise seen from outside.
    let quads = [
        [(false, false, false), (false, true, false), (true, true, false), (true, false, false)],
        [(false, false, true), (true, false, true), (true, true, true), (false, true, true)],
        [(false, false, false), (true, false, false), (true, false, true), (false, false, true)],
        [(false, true, false), (false, true, true), (true, true, true), (true, true, false)],
        [(false, false, false), (false, false, true), (false, true, true), (false, true, false)],
        [(true, false, false), (true, true, false), (true, true, true), (true, false, true)],
    ];
    quads
        .iter()
        .flat_map(|quad| {
            let [a, b, c, d] = quad.map(|(x, y, z)| corner(x, y, z));
            [Triangle::new(a, b, c), Triangle::new(a, c, d)]
        })
        .collect()
}

/// Face spanning a [`MeshPlane`]. Unbounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshFace {
    /// Supporting plane.
    pub plane: MeshPlane,
}

/// Geometry backend over triangle meshes.
#[derive(Debug, Clone, Default)]
pub struct MeshBackend {
    viewer: Option<Viewer>,
}

impl MeshBackend {
    /// Creates a backend without a viewer.
    #[must_use]
    pub const fn new() -> Self {
        Self { viewer: None }
    }

    /// Sets the program used by [`GeometryBackend::display`].
    #[must_use]
    pub fn with_viewer(mut self, viewer: Viewer) -> Self {
        self.viewer = Some(viewer);
        self
    }

    /// The configured viewer, if any.
    #[must_use]
    pub const fn viewer(&self) -> Option<&Viewer> {
        self.viewer.as_ref()
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

impl GeometryBackend for MeshBackend {
    type Shape = MeshShape;
    type Plane = MeshPlane;
    type Face = MeshFace;
    type Edge = Segment;

    fn read_shape(&self, path: &Path) -> BackendResult<MeshShape> {
        match extension_of(path).as_str() {
            "stl" => {
                let triangles = stl::read_stl(path)?;
                info!(
                    path = %path.display(),
                    triangles = triangles.len(),
                    "Loaded mesh"
                );
                Ok(MeshShape::Faces(triangles))
            }
            "stp" | "step" => Err(BackendError::unsupported_format(
                path,
                "STEP import needs a B-rep backend; convert the model to STL",
            )),
            other => Err(BackendError::unsupported_format(
                path,
                format!("unknown extension '{other}'"),
            )),
        }
    }

    fn write_shape(&self, shape: &MeshShape, path: &Path) -> BackendResult<()> {
        match shape {
            MeshShape::Edges(segments) => {
                let ext = extension_of(path);
                if ext != "stp" && ext != "step" {
                    warn!(path = %path.display(), "Writing STEP wireframe to a non-STEP file name");
                }
                step::write_wireframe(path, segments)
            }
            MeshShape::Faces(triangles) => match extension_of(path).as_str() {
                "stl" => stl::write_stl(path, triangles),
                _ => Err(BackendError::unsupported_format(
                    path,
                    "meshes can only be written as STL",
                )),
            },
        }
    }

    fn make_plane(&self, point: &Point, normal: &Normal) -> BackendResult<MeshPlane> {
        if !point.coords.iter().all(|c| c.is_finite()) {
            return Err(BackendError::degenerate(format!(
                "plane point ({}, {}, {}) is not finite",
                point.x, point.y, point.z
            )));
        }
        MeshPlane::new(*point, *normal).ok_or_else(|| {
            BackendError::degenerate(format!(
                "plane normal ({}, {}, {}) has zero length or is not finite",
                normal.x, normal.y, normal.z
            ))
        })
    }

    fn make_face(&self, plane: &MeshPlane) -> MeshFace {
        MeshFace { plane: *plane }
    }

    fn section(&self, shape: &MeshShape, tool: &MeshFace) -> Section<MeshShape> {
        let segments = match shape {
            MeshShape::Faces(triangles) => section::section_triangles(triangles, &tool.plane),
            MeshShape::Edges(segments) => section::section_segments(segments, &tool.plane),
        };
        match segments {
            Some(segments) => {
                debug!(segments = segments.len(), "Section completed");
                Section::done(MeshShape::Edges(segments))
            }
            None => Section::not_done(MeshShape::Edges(Vec::new())),
        }
    }

    fn edges<'a>(&'a self, shape: &'a MeshShape) -> Box<dyn Iterator<Item = Segment> + 'a> {
        match shape {
            MeshShape::Faces(triangles) => Box::new(triangles.iter().flat_map(Triangle::edges)),
            MeshShape::Edges(segments) => Box::new(segments.iter().copied()),
        }
    }

    fn display(&self, shapes: &[&MeshShape]) -> BackendResult<()> {
        let Some(viewer) = &self.viewer else {
            info!("No viewer configured, skipping display");
            return Ok(());
        };

        let dir = tempfile::Builder::new()
            .prefix("intersector-")
            .tempdir()
            .map_err(|e| BackendError::viewer("failed to create scratch directory", Some(e)))?;

        let mut files: Vec<PathBuf> = Vec::with_capacity(shapes.len());
        for (index, shape) in shapes.iter().enumerate() {
            let path = dir
                .path()
                .join(format!("shape_{index}.{}", shape.preferred_extension()));
            debug!(path = %path.display(), kind = shape.kind(), "Staging shape for viewer");
            self.write_shape(shape, &path)?;
            files.push(path);
        }

        // Blocks until the viewer exits; `dir` is removed afterwards.
        viewer.show(&files)
    }
}

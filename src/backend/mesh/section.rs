//! Plane section of triangle meshes.
//!
//! Each triangle is classified against the plane by the signed distance of
//! its vertices. Spanning triangles contribute the segment between their two
//! crossing points, triangles with an edge in the plane contribute that edge,
//! and fully coplanar triangles contribute the outer boundary of the coplanar
//! region. Segments are deduplicated on quantised endpoints.

use indexmap::IndexMap;
use nalgebra::{Point3, Unit, Vector3};
use tracing::{debug, trace};

use super::{Segment, Triangle};

/// Distance under which a vertex counts as lying on the plane.
pub const EPSILON: f64 = 1e-9;

/// Scale used to quantise coordinates into hashable keys.
const QUANTIZATION_SCALE: f64 = 1e9;

// Vertex classification, combined with bitwise OR per triangle.
const COPLANAR: u8 = 0;
const FRONT: u8 = 1;
const BACK: u8 = 2;
const SPANNING: u8 = 3;

/// Infinite plane in Hessian normal form: `normal · p = offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshPlane {
    /// Point the plane was built from.
    pub origin: Point3<f64>,
    /// Unit normal.
    pub normal: Unit<Vector3<f64>>,
    /// Distance from the world origin along `normal`.
    pub offset: f64,
}

impl MeshPlane {
    /// Builds a plane through `origin`. Returns `None` for a zero-length or
    /// non-finite normal.
    #[must_use]
    pub fn new(origin: Point3<f64>, normal: Vector3<f64>) -> Option<Self> {
        if !normal.iter().all(|c| c.is_finite()) {
            return None;
        }
        let normal = Unit::try_new(normal, EPSILON)?;
        let offset = normal.dot(&origin.coords);
        Some(Self {
            origin,
            normal,
            offset,
        })
    }

    /// Signed distance of `point` from the plane.
    #[must_use]
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) - self.offset
    }

    fn classify(&self, distance: f64) -> u8 {
        if distance > EPSILON {
            FRONT
        } else if distance < -EPSILON {
            BACK
        } else {
            COPLANAR
        }
    }
}

type PointKey = (i64, i64, i64);
type SegmentKey = (PointKey, PointKey);

#[allow(clippy::cast_possible_truncation)]
pub(super) fn point_key(p: &Point3<f64>) -> PointKey {
    (
        (p.x * QUANTIZATION_SCALE).round() as i64,
        (p.y * QUANTIZATION_SCALE).round() as i64,
        (p.z * QUANTIZATION_SCALE).round() as i64,
    )
}

fn segment_key(segment: &Segment) -> SegmentKey {
    let a = point_key(&segment.start);
    let b = point_key(&segment.end);
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Sections `triangles` with `plane`.
///
/// Returns `None` if the mesh holds non-finite coordinates, in which case
/// the section cannot be completed.
#[must_use]
pub fn section_triangles(triangles: &[Triangle], plane: &MeshPlane) -> Option<Vec<Segment>> {
    let mut segments: IndexMap<SegmentKey, Segment> = IndexMap::new();
    let mut coplanar_edges: IndexMap<SegmentKey, (usize, Segment)> = IndexMap::new();

    for triangle in triangles {
        if !triangle.is_finite() {
            debug!("Triangle with non-finite coordinates, aborting section");
            return None;
        }

        let distances = triangle.vertices.map(|v| plane.signed_distance(&v));
        let types = distances.map(|d| plane.classify(d));
        let triangle_type = types.iter().fold(COPLANAR, |acc, &t| acc | t);

        match triangle_type {
            COPLANAR => {
                for edge in triangle.edges() {
                    coplanar_edges
                        .entry(segment_key(&edge))
                        .and_modify(|(count, _)| *count += 1)
                        .or_insert((1, edge));
                }
            }
            FRONT | BACK => {
                // Touching the plane: only an edge lying in it counts.
                let on_plane: Vec<Point3<f64>> = (0..3)
                    .filter(|&i| types[i] == COPLANAR)
                    .map(|i| triangle.vertices[i])
                    .collect();
                if let [start, end] = on_plane[..] {
                    insert_segment(&mut segments, Segment::new(start, end));
                }
            }
            // Only SPANNING is left in a two-bit mask.
            _ => {
                let crossings = spanning_crossings(triangle, &distances, &types);
                if let [start, end] = crossings[..] {
                    insert_segment(&mut segments, Segment::new(start, end));
                } else {
                    trace!(
                        crossings = crossings.len(),
                        "Skipping spanning triangle without a single crossing segment"
                    );
                }
            }
        }
    }

    // Edges shared by two coplanar triangles are interior to the region.
    for (_, (count, edge)) in coplanar_edges {
        if count == 1 {
            insert_segment(&mut segments, edge);
        }
    }

    Some(segments.into_values().collect())
}

fn spanning_crossings(
    triangle: &Triangle,
    distances: &[f64; 3],
    types: &[u8; 3],
) -> Vec<Point3<f64>> {
    let mut crossings = Vec::with_capacity(2);
    for i in 0..3 {
        let j = (i + 1) % 3;
        let vi = triangle.vertices[i];
        let vj = triangle.vertices[j];
        if types[i] == COPLANAR {
            crossings.push(vi);
        }
        if (types[i] | types[j]) == SPANNING {
            let t = distances[i] / (distances[i] - distances[j]);
            crossings.push(vi + (vj - vi) * t);
        }
    }
    crossings
}

fn insert_segment(segments: &mut IndexMap<SegmentKey, Segment>, segment: Segment) {
    let key = segment_key(&segment);
    // Zero-length segments carry no edge.
    if key.0 == key.1 {
        return;
    }
    segments.entry(key).or_insert(segment);
}

/// Keeps the segments of an edge set that lie in `plane`.
#[must_use]
pub fn section_segments(segments: &[Segment], plane: &MeshPlane) -> Option<Vec<Segment>> {
    let mut kept: IndexMap<SegmentKey, Segment> = IndexMap::new();
    for segment in segments {
        if !segment.is_finite() {
            return None;
        }
        let on_plane = [segment.start, segment.end]
            .iter()
            .all(|p| plane.classify(plane.signed_distance(p)) == COPLANAR);
        if on_plane {
            insert_segment(&mut kept, *segment);
        }
    }
    Some(kept.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mesh::cuboid_triangles;

    fn unit_cube() -> Vec<Triangle> {
        cuboid_triangles(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
    }

    fn horizontal(z: f64) -> MeshPlane {
        MeshPlane::new(Point3::new(0.0, 0.0, z), Vector3::z()).unwrap()
    }

    #[test]
    fn plane_rejects_zero_normal() {
        assert!(MeshPlane::new(Point3::origin(), Vector3::zeros()).is_none());
    }

    #[test]
    fn plane_rejects_non_finite_normal() {
        assert!(MeshPlane::new(Point3::origin(), Vector3::new(f64::NAN, 0.0, 1.0)).is_none());
    }

    #[test]
    fn plane_normalises_normal() {
        let plane = MeshPlane::new(Point3::new(0.0, 0.0, 2.0), Vector3::new(0.0, 0.0, 5.0))
            .unwrap();
        assert!((plane.normal.norm() - 1.0).abs() < EPSILON);
        assert!((plane.offset - 2.0).abs() < EPSILON);
        assert!(plane.signed_distance(&Point3::new(3.0, 4.0, 3.0)) > 0.0);
    }

    #[test]
    fn section_through_middle_of_cube() {
        let segments = section_triangles(&unit_cube(), &horizontal(0.5)).unwrap();
        // Each side face is two triangles, each crossed once.
        assert_eq!(segments.len(), 8);
        for s in &segments {
            assert!((s.start.z - 0.5).abs() < EPSILON);
            assert!((s.end.z - 0.5).abs() < EPSILON);
        }
        let length: f64 = segments.iter().map(Segment::length).sum();
        assert!((length - 4.0).abs() < 1e-6);
    }

    #[test]
    fn section_missing_cube_is_empty() {
        let segments = section_triangles(&unit_cube(), &horizontal(2.0)).unwrap();
        assert!(segments.is_empty());
    }

    #[test]
    fn section_on_coplanar_face_keeps_outline() {
        let segments = section_triangles(&unit_cube(), &horizontal(1.0)).unwrap();
        assert_eq!(segments.len(), 4);
        let length: f64 = segments.iter().map(Segment::length).sum();
        assert!((length - 4.0).abs() < 1e-6);
    }

    #[test]
    fn section_through_vertex_and_edge() {
        // Diagonal plane x = y passes through two vertical cube edges.
        let plane = MeshPlane::new(Point3::origin(), Vector3::new(1.0, -1.0, 0.0)).unwrap();
        let segments = section_triangles(&unit_cube(), &plane).unwrap();
        assert!(!segments.is_empty());
        for s in &segments {
            assert!(plane.signed_distance(&s.start).abs() < 1e-6);
            assert!(plane.signed_distance(&s.end).abs() < 1e-6);
        }
    }

    #[test]
    fn non_finite_mesh_is_not_completed() {
        let mut triangles = unit_cube();
        triangles[0].vertices[1].x = f64::INFINITY;
        assert!(section_triangles(&triangles, &horizontal(0.5)).is_none());
    }

    #[test]
    fn segments_in_plane_are_kept() {
        let segments = [
            Segment::new(Point3::new(0.0, 0.0, 1.0), Point3::new(1.0, 0.0, 1.0)),
            Segment::new(Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, 1.0)),
        ];
        let kept = section_segments(&segments, &horizontal(1.0)).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0], segments[0]);
    }
}

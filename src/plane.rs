//! Plane definitions in point-normal form.
//!
//! A plane is given on the command line as `"x,y,z:nx,ny,nz"`: a point on
//! the plane and a vector perpendicular to it. Parsing is strict. Any
//! deviation from the grammar is rejected as a whole with
//! [`IntersectError::InvalidFormat`] carrying the original text.

use std::fmt;
use std::str::FromStr;

use nalgebra::{Point3, Vector3};
use tracing::{debug, error};

use crate::error::IntersectError;

/// Separator between the point and the normal.
const SEGMENT_SEPARATOR: char = ':';

/// Separator between the components of a triple.
const COMPONENT_SEPARATOR: char = ',';

/// Number of components in a point or a normal.
const EXPECTED_VECTOR_LEN: usize = 3;

/// A point on the plane.
pub type Point = Point3<f64>;

/// The plane normal. Not required to be unit length.
pub type Normal = Vector3<f64>;

/// An infinite plane given by a point on it and its normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneSpec {
    /// Point on the plane.
    pub point: Point,
    /// Normal of the plane, exactly as supplied.
    pub normal: Normal,
}

impl PlaneSpec {
    /// Creates a plane definition from its parts.
    #[must_use]
    pub const fn new(point: Point, normal: Normal) -> Self {
        Self { point, normal }
    }
}

impl fmt::Display for PlaneSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.point;
        let n = &self.normal;
        write!(f, "{},{},{}:{},{},{}", p.x, p.y, p.z, n.x, n.y, n.z)
    }
}

impl FromStr for PlaneSpec {
    type Err = IntersectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_plane(s)
    }
}

/// Parses a plane definition of the form `"x,y,z:nx,ny,nz"`.
///
/// Each component is parsed as an `f64` after trimming surrounding
/// whitespace, so `"0, 0, 1:0,0,1"` is accepted but `"0, ,1:0,0,1"` is not.
///
/// # Errors
///
/// Returns [`IntersectError::InvalidFormat`] if the colon is missing or
/// repeated, if either side does not hold exactly three components, or if
/// any component is not a number.
///
/// # Examples
///
/// ```
/// use intersector::plane::parse_plane;
///
/// let plane = parse_plane("0,0,100:0,0,1").unwrap();
/// assert_eq!(plane.point.z, 100.0);
/// assert_eq!(plane.normal.z, 1.0);
/// ```
pub fn parse_plane(text: &str) -> Result<PlaneSpec, IntersectError> {
    let Some((point_text, normal_text)) = split_segments(text) else {
        error!(input = text, "Invalid plane input: expected exactly one ':'");
        return Err(IntersectError::invalid_format(text));
    };

    let (Some(point), Some(normal)) = (parse_triple(point_text), parse_triple(normal_text)) else {
        error!(
            input = text,
            "Invalid plane input: each side needs three numeric components"
        );
        return Err(IntersectError::invalid_format(text));
    };

    let plane = PlaneSpec::new(Point::from(point), Normal::from(normal));
    debug!(%plane, "Parsed plane definition");
    Ok(plane)
}

fn split_segments(text: &str) -> Option<(&str, &str)> {
    let mut segments = text.split(SEGMENT_SEPARATOR);
    match (segments.next(), segments.next(), segments.next()) {
        (Some(point), Some(normal), None) => Some((point, normal)),
        _ => None,
    }
}

fn parse_triple(segment: &str) -> Option<[f64; EXPECTED_VECTOR_LEN]> {
    let mut values = [0.0; EXPECTED_VECTOR_LEN];
    let mut tokens = segment.split(COMPONENT_SEPARATOR);
    for slot in &mut values {
        // Surrounding whitespace is tolerated; an empty token is not.
        *slot = tokens.next()?.trim().parse().ok()?;
    }
    // Trailing components make the triple invalid.
    if tokens.next().is_some() {
        return None;
    }
    Some(values)
}

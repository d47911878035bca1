//! ISO 10303-21 (STEP) wireframe export.
//!
//! Section results are edge sets. They are chained into polylines and
//! written as a `GEOMETRICALLY_BOUNDED_WIREFRAME_SHAPE_REPRESENTATION`
//! holding one `GEOMETRIC_CURVE_SET` of `POLYLINE`s, in millimetres.

use std::path::Path;

use chrono::Utc;
use indexmap::IndexMap;
use nalgebra::Point3;
use tracing::debug;

use super::section::point_key;
use super::Segment;
use crate::backend::{BackendError, BackendResult};

/// Application schema declared in the file header.
const SCHEMA: &str = "AUTOMOTIVE_DESIGN { 1 0 10303 214 1 1 1 1 }";

/// Length uncertainty declared for the representation context.
const DISTANCE_ACCURACY: f64 = 1e-7;

/// Writes `segments` to `path` as a STEP wireframe.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_wireframe(path: &Path, segments: &[Segment]) -> BackendResult<()> {
    let polylines = chain_polylines(segments);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let content = StepBuilder::new().wireframe(&polylines).finish(&name);

    std::fs::write(path, content).map_err(|e| BackendError::file_write(path, e))?;
    debug!(
        path = %path.display(),
        segments = segments.len(),
        polylines = polylines.len(),
        "Wrote STEP wireframe"
    );
    Ok(())
}

/// Joins segments that share endpoints into polylines.
///
/// A closed loop ends with an exact copy of its first point, even when the
/// segments only meet within the dedup tolerance.
#[must_use]
pub fn chain_polylines(segments: &[Segment]) -> Vec<Vec<Point3<f64>>> {
    let mut incident: IndexMap<(i64, i64, i64), Vec<usize>> = IndexMap::new();
    for (index, segment) in segments.iter().enumerate() {
        incident.entry(point_key(&segment.start)).or_default().push(index);
        incident.entry(point_key(&segment.end)).or_default().push(index);
    }

    let mut used = vec![false; segments.len()];
    let mut polylines = Vec::new();

    for first in 0..segments.len() {
        if used[first] {
            continue;
        }
        used[first] = true;
        let mut line = vec![segments[first].start, segments[first].end];

        extend(&mut line, segments, &incident, &mut used);
        line.reverse();
        extend(&mut line, segments, &incident, &mut used);

        if line.len() > 2 && point_key(&line[0]) == point_key(&line[line.len() - 1]) {
            let start = line[0];
            if let Some(last) = line.last_mut() {
                *last = start;
            }
        }
        polylines.push(line);
    }
    polylines
}

fn extend(
    line: &mut Vec<Point3<f64>>,
    segments: &[Segment],
    incident: &IndexMap<(i64, i64, i64), Vec<usize>>,
    used: &mut [bool],
) {
    while let Some(tail) = line.last().copied() {
        let key = point_key(&tail);
        let next = incident
            .get(&key)
            .and_then(|candidates| candidates.iter().copied().find(|&i| !used[i]));
        let Some(next) = next else {
            break;
        };
        used[next] = true;
        let segment = &segments[next];
        let far = if point_key(&segment.start) == key {
            segment.end
        } else {
            segment.start
        };
        line.push(far);
    }
}

/// Accumulates numbered entity instances.
struct StepBuilder {
    entities: Vec<String>,
    next_id: usize,
}

impl StepBuilder {
    const fn new() -> Self {
        Self {
            entities: Vec::new(),
            next_id: 1,
        }
    }

    fn add_entity(&mut self, entity: String) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        self.entities.push(format!("#{id} = {entity};"));
        id
    }

    fn wireframe(mut self, polylines: &[Vec<Point3<f64>>]) -> Self {
        let length_unit =
            self.add_entity("( LENGTH_UNIT() NAMED_UNIT(*) SI_UNIT(.MILLI.,.METRE.) )".to_string());
        let angle_unit =
            self.add_entity("( NAMED_UNIT(*) PLANE_ANGLE_UNIT() SI_UNIT($,.RADIAN.) )".to_string());
        let solid_angle_unit = self
            .add_entity("( NAMED_UNIT(*) SI_UNIT($,.STERADIAN.) SOLID_ANGLE_UNIT() )".to_string());
        let uncertainty = self.add_entity(format!(
            "UNCERTAINTY_MEASURE_WITH_UNIT(LENGTH_MEASURE({}),#{length_unit},\
             'distance_accuracy_value','confusion accuracy')",
            real(DISTANCE_ACCURACY)
        ));
        let context = self.add_entity(format!(
            "( GEOMETRIC_REPRESENTATION_CONTEXT(3) \
             GLOBAL_UNCERTAINTY_ASSIGNED_CONTEXT((#{uncertainty})) \
             GLOBAL_UNIT_ASSIGNED_CONTEXT((#{length_unit},#{angle_unit},#{solid_angle_unit})) \
             REPRESENTATION_CONTEXT('Context #1','3D Context with UNIT and UNCERTAINTY') )"
        ));

        let mut curves = Vec::with_capacity(polylines.len());
        for polyline in polylines {
            let closed = polyline.len() > 2 && polyline.first() == polyline.last();
            let open_len = if closed {
                polyline.len() - 1
            } else {
                polyline.len()
            };
            let mut points: Vec<String> = polyline[..open_len]
                .iter()
                .map(|p| {
                    let id = self.add_entity(format!(
                        "CARTESIAN_POINT('',({},{},{}))",
                        real(p.x),
                        real(p.y),
                        real(p.z)
                    ));
                    format!("#{id}")
                })
                .collect();
            // A closed loop refers back to its first point instance.
            if closed {
                if let Some(first) = points.first().cloned() {
                    points.push(first);
                }
            }
            curves.push(format!(
                "#{}",
                self.add_entity(format!("POLYLINE('',({}))", points.join(",")))
            ));
        }

        let curve_set =
            self.add_entity(format!("GEOMETRIC_CURVE_SET('',({}))", curves.join(",")));
        self.add_entity(format!(
            "GEOMETRICALLY_BOUNDED_WIREFRAME_SHAPE_REPRESENTATION('section',(#{curve_set}),#{context})"
        ));
        self
    }

    fn finish(self, file_name: &str) -> String {
        let timestamp = Utc::now().format("%Y-%m-%dT%H:%M:%S");
        let version = env!("CARGO_PKG_VERSION");
        let mut out = String::new();
        out.push_str("ISO-10303-21;\n");
        out.push_str("HEADER;\n");
        out.push_str("FILE_DESCRIPTION(('plane section wireframe'),'2;1');\n");
        out.push_str(&format!(
            "FILE_NAME('{}','{timestamp}',(''),(''),'intersector {version}','intersector','');\n",
            escape(file_name)
        ));
        out.push_str(&format!("FILE_SCHEMA(('{SCHEMA}'));\n"));
        out.push_str("ENDSEC;\n");
        out.push_str("DATA;\n");
        for entity in &self.entities {
            out.push_str(entity);
            out.push('\n');
        }
        out.push_str("ENDSEC;\n");
        out.push_str("END-ISO-10303-21;\n");
        out
    }
}

/// Formats a REAL. Part 21 requires a decimal point in the mantissa.
fn real(value: f64) -> String {
    let text = format!("{value:?}");
    let (mantissa, exponent) = match text.split_once('e') {
        Some((m, e)) => (m.to_string(), Some(e.to_string())),
        None => (text, None),
    };
    let mantissa = if mantissa.contains('.') {
        mantissa
    } else {
        format!("{mantissa}.")
    };
    match exponent {
        Some(e) => format!("{mantissa}E{e}"),
        None => mantissa,
    }
}

/// Escapes a string literal: apostrophes are doubled.
fn escape(text: &str) -> String {
    text.replace('\'', "''")
}

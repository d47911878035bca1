//! STL import and export via `stl_io`.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;
use stl_io::{Normal, Vertex};
use tracing::debug;

use super::Triangle;
use crate::backend::{BackendError, BackendResult};

/// Reads all triangles of an ASCII or binary STL file.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or parsed, or if it holds
/// no triangles.
pub fn read_stl(path: &Path) -> BackendResult<Vec<Triangle>> {
    let file = File::open(path).map_err(|e| BackendError::file_read(path, e))?;
    let mut reader = BufReader::new(file);
    let stl_reader =
        stl_io::create_stl_reader(&mut reader).map_err(|e| BackendError::file_read(path, e))?;

    let mut triangles = Vec::new();
    for tri in stl_reader {
        let tri = tri.map_err(|e| BackendError::file_read(path, e))?;
        triangles.push(Triangle::new(
            to_point(&tri.vertices[0]),
            to_point(&tri.vertices[1]),
            to_point(&tri.vertices[2]),
        ));
    }

    if triangles.is_empty() {
        return Err(BackendError::EmptyShape {
            path: path.to_path_buf(),
        });
    }

    debug!(path = %path.display(), triangles = triangles.len(), "Parsed STL");
    Ok(triangles)
}

/// Writes `triangles` as a binary STL file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_stl(path: &Path, triangles: &[Triangle]) -> BackendResult<()> {
    let stl_triangles: Vec<stl_io::Triangle> = triangles.iter().map(to_stl_triangle).collect();

    let file = File::create(path).map_err(|e| BackendError::file_write(path, e))?;
    let mut writer = BufWriter::new(file);
    stl_io::write_stl(&mut writer, stl_triangles.iter())
        .and_then(|()| writer.flush())
        .map_err(|e| BackendError::file_write(path, e))?;

    debug!(path = %path.display(), triangles = triangles.len(), "Wrote STL");
    Ok(())
}

fn to_point(v: &Vertex) -> Point3<f64> {
    Point3::new(f64::from(v[0]), f64::from(v[1]), f64::from(v[2]))
}

#[allow(clippy::cast_possible_truncation)]
fn to_stl_triangle(triangle: &Triangle) -> stl_io::Triangle {
    let n = triangle.normal();
    stl_io::Triangle {
        normal: Normal::new([n.x as f32, n.y as f32, n.z as f32]),
        vertices: triangle
            .vertices
            .map(|p| Vertex::new([p.x as f32, p.y as f32, p.z as f32])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mesh::cuboid_triangles;
    use tempfile::TempDir;

    #[test]
    fn write_then_read_preserves_triangles() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cube.stl");
        let cube = cuboid_triangles(Point3::origin(), Point3::new(2.0, 3.0, 4.0));

        write_stl(&path, &cube).unwrap();
        let read = read_stl(&path).unwrap();

        assert_eq!(read, cube);
    }

    #[test]
    fn reads_ascii_stl() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tri.stl");
        std::fs::write(
            &path,
            "solid tri\n\
             facet normal 0 0 1\n\
             outer loop\n\
             vertex 0 0 0\n\
             vertex 1 0 0\n\
             vertex 0 1 0\n\
             endloop\n\
             endfacet\n\
             endsolid tri\n",
        )
        .unwrap();

        let read = read_stl(&path).unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].vertices[1], Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = read_stl(Path::new("does/not/exist.stl")).unwrap_err();
        assert!(matches!(err, BackendError::FileRead { .. }));
    }

    #[test]
    fn garbage_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("garbage.stl");
        std::fs::write(&path, "not an stl file at all").unwrap();
        assert!(read_stl(&path).is_err());
    }
}

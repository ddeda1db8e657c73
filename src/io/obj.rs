//! Wavefront OBJ format support.
//!
//! Faces are read and written as polygons; nothing is triangulated on load.
//! Only positions and face connectivity are kept.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;

use crate::error::{MeshError, Result};
use crate::mesh::{build_from_polygons, to_face_vertex, HalfEdgeMesh, MeshIndex};

/// Load a mesh from an OBJ file.
///
/// Reads `v` and `f` records; texture coordinates, normals, groups and
/// materials are ignored. Face corners may be written as `v`, `v/vt`,
/// `v//vn` or `v/vt/vn`, and negative indices count back from the last
/// vertex read so far.
///
/// # Example
///
/// ```no_run
/// use polytri::io::obj;
/// use polytri::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = obj::load("model.obj").unwrap();
/// ```
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<HalfEdgeMesh<I>> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let fail = |line: usize, message: String| MeshError::LoadError {
        path: path.to_path_buf(),
        message: format!("line {}: {}", line, message),
    };

    let mut vertices: Vec<Point3<f64>> = Vec::new();
    let mut faces: Vec<Vec<usize>> = Vec::new();

    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        let lineno = n + 1;
        let mut parts = line.split_whitespace();

        match parts.next() {
            Some("v") => {
                let mut coord = || -> Result<f64> {
                    let token = parts
                        .next()
                        .ok_or_else(|| fail(lineno, "vertex needs three coordinates".to_string()))?;
                    token
                        .parse()
                        .map_err(|_| fail(lineno, format!("invalid coordinate '{}'", token)))
                };
                let (x, y, z) = (coord()?, coord()?, coord()?);
                vertices.push(Point3::new(x, y, z));
            }
            Some("f") => {
                let face = parts
                    .map(|corner| parse_corner(corner, vertices.len()))
                    .collect::<Option<Vec<usize>>>()
                    .ok_or_else(|| fail(lineno, format!("invalid face '{}'", line.trim())))?;
                faces.push(face);
            }
            _ => {}
        }
    }

    if faces.is_empty() {
        return Err(MeshError::LoadError {
            path: path.to_path_buf(),
            message: "OBJ file contains no faces".to_string(),
        });
    }

    build_from_polygons(&vertices, &faces)
}

/// Resolve one `v[/vt][/vn]` face corner to a 0-based vertex index.
fn parse_corner(corner: &str, num_vertices: usize) -> Option<usize> {
    let index: i64 = corner.split('/').next()?.parse().ok()?;
    match index {
        0 => None,
        i if i > 0 => Some(i as usize - 1),
        i => num_vertices.checked_sub(i.unsigned_abs() as usize),
    }
}

/// Save a mesh to an OBJ file.
///
/// # Example
///
/// ```no_run
/// use polytri::io::obj;
/// use polytri::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = HalfEdgeMesh::new();
/// obj::save(&mesh, "output.obj").unwrap();
/// ```
pub fn save<P: AsRef<Path>, I: MeshIndex>(mesh: &HalfEdgeMesh<I>, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);

    let (vertices, faces) = to_face_vertex(mesh);

    writeln!(writer, "# Generated by polytri")?;
    for v in &vertices {
        writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
    }
    for f in &faces {
        write!(writer, "f")?;
        // OBJ indices are 1-based.
        for &vi in f {
            write!(writer, " {}", vi + 1)?;
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

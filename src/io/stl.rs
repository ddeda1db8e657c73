//! STL (stereolithography) format support.
//!
//! STL only stores triangles. Loading welds the per-triangle corners back
//! into shared vertices; saving requires a pure triangle mesh, so polygon
//! meshes have to be triangulated first.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use nalgebra::{Point3, Vector3};

use crate::error::{MeshError, Result};
use crate::mesh::{build_from_triangles, to_face_vertex, HalfEdgeMesh, MeshIndex};

/// Load a mesh from an STL file.
///
/// Automatically detects binary vs ASCII format. Corners with bit-identical
/// coordinates are merged; triangles that collapse after merging are
/// dropped.
///
/// # Example
///
/// ```no_run
/// use polytri::io::stl;
/// use polytri::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = stl::load("model.stl").unwrap();
/// ```
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<HalfEdgeMesh<I>> {
    let path = path.as_ref();
    let mut file = File::open(path)?;

    let stl = stl_io::read_stl(&mut file).map_err(|e| MeshError::LoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut vertices: Vec<Point3<f64>> = Vec::with_capacity(stl.vertices.len());
    let mut welded: HashMap<[u32; 3], usize> = HashMap::with_capacity(stl.vertices.len());
    let mut remap = Vec::with_capacity(stl.vertices.len());
    for v in &stl.vertices {
        let key = [v[0].to_bits(), v[1].to_bits(), v[2].to_bits()];
        let index = *welded.entry(key).or_insert_with(|| {
            vertices.push(Point3::new(v[0] as f64, v[1] as f64, v[2] as f64));
            vertices.len() - 1
        });
        remap.push(index);
    }

    let faces: Vec<[usize; 3]> = stl
        .faces
        .iter()
        .map(|tri| tri.vertices.map(|i| remap[i]))
        .filter(|[a, b, c]| a != b && b != c && a != c)
        .collect();

    if faces.is_empty() {
        return Err(MeshError::LoadError {
            path: path.to_path_buf(),
            message: "STL file contains no valid triangles".to_string(),
        });
    }

    build_from_triangles(&vertices, &faces)
}

/// Save a triangle mesh to a binary STL file.
///
/// # Errors
///
/// Returns [`MeshError::SaveError`] if any face is not a triangle.
///
/// # Example
///
/// ```no_run
/// use polytri::io::stl;
/// use polytri::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = HalfEdgeMesh::new();
/// stl::save(&mesh, "output.stl").unwrap();
/// ```
pub fn save<P: AsRef<Path>, I: MeshIndex>(mesh: &HalfEdgeMesh<I>, path: P) -> Result<()> {
    let path = path.as_ref();
    if !mesh.is_triangle_mesh() {
        return Err(MeshError::SaveError {
            path: path.to_path_buf(),
            message: "STL can only store triangles; triangulate the mesh first".to_string(),
        });
    }

    let (vertices, faces) = to_face_vertex(mesh);
    let corner = |p: &Point3<f64>| stl_io::Vertex::new([p.x as f32, p.y as f32, p.z as f32]);

    let triangles: Vec<stl_io::Triangle> = faces
        .iter()
        .map(|f| {
            let (p0, p1, p2) = (&vertices[f[0]], &vertices[f[1]], &vertices[f[2]]);
            let n = (p1 - p0).cross(&(p2 - p0)).try_normalize(0.0).unwrap_or_else(Vector3::zeros);

            stl_io::Triangle {
                normal: stl_io::Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: [corner(p0), corner(p1), corner(p2)],
            }
        })
        .collect();

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    stl_io::write_stl(&mut writer, triangles.iter()).map_err(|e| MeshError::SaveError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    Ok(())
}

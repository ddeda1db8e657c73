//! Mesh construction utilities.
//!
//! Meshes are built from face-vertex lists as found in mesh file formats.
//! Faces may have any number of vertices (at least three), listed in
//! counter-clockwise order.

use std::collections::HashMap;

use nalgebra::Point3;

use super::halfedge::{Face, HalfEdgeMesh};
use super::index::{FaceId, HalfEdgeId, MeshIndex, VertexId};
use crate::error::{MeshError, Result};

/// Build a half-edge mesh from vertices and polygonal faces.
///
/// # Arguments
/// * `vertices` - List of vertex positions
/// * `faces` - List of faces, each a list of at least three vertex indices
///
/// # Errors
/// Fails on an empty face list, out-of-range indices, faces with fewer than
/// three or repeated vertices, and directed edges shared by two faces
/// (inconsistent orientation or more than two faces on an edge).
///
/// Vertices where several fans meet are accepted; see
/// [`HalfEdgeMesh::is_manifold`].
///
/// # Example
/// ```
/// use polytri::mesh::{build_from_polygons, HalfEdgeMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let faces = vec![vec![0, 1, 2, 3]];
///
/// let mesh: HalfEdgeMesh = build_from_polygons(&vertices, &faces).unwrap();
/// assert_eq!(mesh.num_faces(), 1);
/// assert_eq!(mesh.num_edges(), 4);
/// ```
pub fn build_from_polygons<I: MeshIndex, F: AsRef<[usize]>>(
    vertices: &[Point3<f64>],
    faces: &[F],
) -> Result<HalfEdgeMesh<I>> {
    if faces.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    let mut num_corners = 0;
    for (fi, face) in faces.iter().enumerate() {
        let face = face.as_ref();
        if face.len() < 3 {
            return Err(MeshError::DegenerateFace {
                face: fi,
                reason: "fewer than three vertices",
            });
        }
        for (k, &vi) in face.iter().enumerate() {
            if vi >= vertices.len() {
                return Err(MeshError::InvalidVertexIndex { face: fi, vertex: vi });
            }
            if face[..k].contains(&vi) {
                return Err(MeshError::DegenerateFace {
                    face: fi,
                    reason: "repeated vertex",
                });
            }
        }
        num_corners += face.len();
    }

    // Every corner starts at most one interior and one boundary half-edge.
    let needed = vertices.len().max(2 * num_corners).max(faces.len());
    if needed > I::MAX_ELEMENTS {
        return Err(MeshError::IndexOverflow {
            count: needed,
            index_type: std::any::type_name::<I>(),
        });
    }

    let mut mesh = HalfEdgeMesh::with_capacity(vertices.len(), 2 * num_corners, faces.len());

    let vertex_ids: Vec<VertexId<I>> = vertices.iter().map(|&pos| mesh.add_vertex(pos)).collect();

    // Directed edges already claimed by a face.
    let mut claimed: HashMap<(usize, usize), HalfEdgeId<I>> = HashMap::with_capacity(num_corners);

    for face in faces {
        let face = face.as_ref();
        let face_id = FaceId::<I>::new(mesh.num_faces());
        let mut loop_hes = Vec::with_capacity(face.len());

        for (k, &a) in face.iter().enumerate() {
            let b = face[(k + 1) % face.len()];
            if claimed.contains_key(&(a, b)) {
                return Err(MeshError::NonManifoldEdge { v0: a, v1: b });
            }
            let he = match claimed.get(&(b, a)) {
                Some(&opposite) => mesh.twin(opposite),
                None => mesh.new_edge(vertex_ids[a], vertex_ids[b]),
            };
            claimed.insert((a, b), he);
            mesh.halfedge_mut(he).face = face_id;
            mesh.vertex_mut(vertex_ids[a]).halfedge = he;
            loop_hes.push(he);
        }

        let n = loop_hes.len();
        for k in 0..n {
            let he = mesh.halfedge_mut(loop_hes[k]);
            he.next = loop_hes[(k + 1) % n];
            he.prev = loop_hes[(k + n - 1) % n];
        }
        mesh.faces.push(Face::new(loop_hes[0]));
    }

    link_boundary_loops(&mut mesh)?;

    Ok(mesh)
}

/// Build a half-edge mesh from vertices and triangle faces.
///
/// # Example
/// ```
/// use polytri::mesh::{build_from_triangles, HalfEdgeMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let faces = vec![[0, 1, 2]];
///
/// let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
/// assert_eq!(mesh.num_vertices(), 3);
/// assert_eq!(mesh.num_faces(), 1);
/// ```
pub fn build_from_triangles<I: MeshIndex>(
    vertices: &[Point3<f64>],
    faces: &[[usize; 3]],
) -> Result<HalfEdgeMesh<I>> {
    build_from_polygons(vertices, faces)
}

/// Link boundary half-edges into loops and point boundary vertices at them.
///
/// A vertex where `m` fans meet owns `m` outgoing and `m` incoming boundary
/// half-edges. The incoming boundary half-edge of fan `k` is linked to the
/// outgoing one of fan `k + 1`, so rotating around the vertex walks through
/// every fan.
fn link_boundary_loops<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) -> Result<()> {
    let mut outgoing: Vec<Vec<HalfEdgeId<I>>> = vec![Vec::new(); mesh.num_vertices()];
    for he in mesh.halfedge_ids() {
        if mesh.is_boundary_halfedge(he) {
            outgoing[mesh.origin(he).index()].push(he);
        }
    }

    for (vi, out) in outgoing.iter().enumerate() {
        if out.is_empty() {
            continue;
        }

        let mut incoming = Vec::with_capacity(out.len());
        for &o in out {
            incoming.push(fan_incoming_boundary(mesh, o)?);
        }

        for (k, &inc) in incoming.iter().enumerate() {
            let next = out[(k + 1) % out.len()];
            mesh.halfedge_mut(inc).next = next;
            mesh.halfedge_mut(next).prev = inc;
        }

        mesh.vertex_mut(VertexId::new(vi)).halfedge = out[0];
    }

    Ok(())
}

/// Sweep the fan that starts at boundary half-edge `out` and return the
/// boundary half-edge entering the same vertex at the other end of the fan.
fn fan_incoming_boundary<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    out: HalfEdgeId<I>,
) -> Result<HalfEdgeId<I>> {
    let mut he = mesh.next(mesh.twin(out));
    for _ in 0..mesh.num_halfedges() {
        let twin = mesh.twin(he);
        if mesh.is_boundary_halfedge(twin) {
            return Ok(twin);
        }
        he = mesh.next(twin);
    }
    Err(MeshError::invalid_input(format!(
        "open fan at vertex {} does not terminate",
        mesh.origin(out).index()
    )))
}

/// Convert a half-edge mesh back to a face-vertex representation.
///
/// Returns (vertices, faces); each face lists its vertices in boundary order.
pub fn to_face_vertex<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> (Vec<Point3<f64>>, Vec<Vec<usize>>) {
    let vertices: Vec<Point3<f64>> = mesh.vertex_ids().map(|v| *mesh.position(v)).collect();

    let faces: Vec<Vec<usize>> = mesh
        .face_ids()
        .map(|f| mesh.face_vertices(f).map(|v| v.index()).collect())
        .collect();

    (vertices, faces)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_triangles() -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, -1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2], [1, 0, 3]];
        (vertices, faces)
    }

    /// A quad and a triangle touching only at vertex 2.
    fn bowtie() -> (Vec<Point3<f64>>, Vec<Vec<usize>>) {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(2.0, 2.0, 0.0),
        ];
        let faces = vec![vec![0, 1, 2, 3], vec![2, 4, 5]];
        (vertices, faces)
    }

    #[test]
    fn test_two_triangles() {
        let (vertices, faces) = two_triangles();
        let mesh: HalfEdgeMesh<u32> = build_from_triangles(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_faces(), 2);
        // 5 edges, 10 half-edges
        assert_eq!(mesh.num_halfedges(), 10);
        assert!(mesh.is_valid());
        for v in mesh.vertex_ids() {
            assert!(mesh.is_boundary_vertex(v));
            assert!(mesh.is_manifold(v));
        }
    }

    #[test]
    fn test_mixed_polygons() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let faces = vec![vec![0, 1, 4, 5], vec![1, 2, 3, 4]];
        let mesh: HalfEdgeMesh = build_from_polygons(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.num_edges(), 7);
        assert!(mesh.is_valid());
        assert!((mesh.surface_area() - 2.0).abs() < 1e-12);
        // The shared edge 1-4 is interior.
        let he = mesh.find_halfedge(VertexId::new(1), VertexId::new(4)).unwrap();
        assert!(!mesh.is_boundary_halfedge(he));
        assert!(!mesh.is_boundary_halfedge(mesh.twin(he)));
    }

    #[test]
    fn test_bowtie_vertex_is_non_manifold() {
        let (vertices, faces) = bowtie();
        let mesh: HalfEdgeMesh = build_from_polygons(&vertices, &faces).unwrap();

        assert!(mesh.is_valid());
        assert!(!mesh.is_manifold(VertexId::new(2)));
        // Rotation still reaches both fans.
        assert_eq!(mesh.valence(VertexId::new(2)), 4);
        for v in [0, 1, 3, 4, 5] {
            assert!(mesh.is_manifold(VertexId::new(v)));
        }
    }

    #[test]
    fn test_roundtrip() {
        let (vertices, faces) = bowtie();
        let mesh: HalfEdgeMesh = build_from_polygons(&vertices, &faces).unwrap();

        let (out_verts, out_faces) = to_face_vertex(&mesh);
        assert_eq!(out_verts, vertices);
        assert_eq!(out_faces, faces);
    }

    #[test]
    fn test_invalid_vertex_index() {
        let vertices = vec![Point3::new(0.0, 0.0, 0.0)];
        let result: Result<HalfEdgeMesh> = build_from_triangles(&vertices, &[[0, 1, 2]]);
        assert!(matches!(result, Err(MeshError::InvalidVertexIndex { face: 0, vertex: 1 })));
    }

    #[test]
    fn test_degenerate_faces() {
        let (vertices, _) = two_triangles();

        let repeated: Result<HalfEdgeMesh> = build_from_polygons(&vertices, &[vec![0, 1, 2, 1]]);
        assert!(matches!(repeated, Err(MeshError::DegenerateFace { face: 0, .. })));

        let too_small: Result<HalfEdgeMesh> = build_from_polygons(&vertices, &[vec![0, 1]]);
        assert!(matches!(too_small, Err(MeshError::DegenerateFace { face: 0, .. })));
    }

    #[test]
    fn test_inconsistent_orientation() {
        let (vertices, _) = two_triangles();
        // Both faces traverse 0 -> 1.
        let result: Result<HalfEdgeMesh> = build_from_triangles(&vertices, &[[0, 1, 2], [0, 1, 3]]);
        assert!(matches!(result, Err(MeshError::NonManifoldEdge { v0: 0, v1: 1 })));
    }

    #[test]
    fn test_too_many_vertices_for_u16() {
        let vertices = vec![Point3::new(0.0, 0.0, 0.0); 70_000];
        let result: Result<HalfEdgeMesh<u16>> = build_from_triangles(&vertices, &[[0, 1, 2]]);
        assert!(matches!(
            result,
            Err(MeshError::IndexOverflow { count: 70_000, index_type: "u16" })
        ));
    }

    #[test]
    fn test_empty_input() {
        let faces: Vec<Vec<usize>> = Vec::new();
        let result: Result<HalfEdgeMesh> = build_from_polygons(&[], &faces);
        assert!(matches!(result, Err(MeshError::EmptyMesh)));
    }
}

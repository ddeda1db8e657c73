//! Half-edge mesh data structure for polygon meshes.
//!
//! Faces may have any number of sides. The structure is a set of dense
//! arenas (vertices, half-edges, faces) linked through typed indices, so
//! topology edits rewrite index fields instead of pointers.
//!
//! # Structure
//!
//! - Each edge is split into two **half-edges** pointing in opposite directions
//! - Each half-edge knows its **twin**, its **next** and **prev** half-edges
//!   around its face, its **origin vertex**, and its **face**
//! - Each vertex stores one outgoing half-edge
//! - Each face stores one half-edge on its boundary
//!
//! # Boundary Handling
//!
//! Boundary half-edges have an invalid face ID and are linked into boundary
//! loops through `next`/`prev`. A vertex shared by several otherwise
//! disconnected fans has one boundary gap per fan; the builder chains those
//! gaps so that rotating around the vertex still visits every outgoing
//! half-edge, which is what makes [`HalfEdgeMesh::is_manifold`] answerable.

use nalgebra::{Point3, Vector3};

use super::index::{FaceId, HalfEdgeId, MeshIndex, VertexId};

/// A vertex in the half-edge mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex<I: MeshIndex = u32> {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// One outgoing half-edge from this vertex.
    /// For boundary vertices, this is a boundary half-edge.
    pub halfedge: HalfEdgeId<I>,
}

impl<I: MeshIndex> Vertex<I> {
    /// Create an isolated vertex at the given position.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            halfedge: HalfEdgeId::invalid(),
        }
    }
}

/// A half-edge in the mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalfEdge<I: MeshIndex = u32> {
    /// The vertex this half-edge originates from.
    pub origin: VertexId<I>,

    /// The opposite half-edge.
    pub twin: HalfEdgeId<I>,

    /// The next half-edge around the face.
    pub next: HalfEdgeId<I>,

    /// The previous half-edge around the face.
    pub prev: HalfEdgeId<I>,

    /// The face this half-edge belongs to. Invalid on the boundary.
    pub face: FaceId<I>,
}

impl<I: MeshIndex> HalfEdge<I> {
    /// Create a new unlinked half-edge.
    pub fn new() -> Self {
        Self {
            origin: VertexId::invalid(),
            twin: HalfEdgeId::invalid(),
            next: HalfEdgeId::invalid(),
            prev: HalfEdgeId::invalid(),
            face: FaceId::invalid(),
        }
    }

    /// Check if this half-edge is on the boundary.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        !self.face.is_valid()
    }
}

impl<I: MeshIndex> Default for HalfEdge<I> {
    fn default() -> Self {
        Self::new()
    }
}

/// A face in the half-edge mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face<I: MeshIndex = u32> {
    /// One half-edge on the boundary of this face.
    pub halfedge: HalfEdgeId<I>,
}

impl<I: MeshIndex> Face<I> {
    /// Create a new face with the given half-edge.
    pub fn new(halfedge: HalfEdgeId<I>) -> Self {
        Self { halfedge }
    }
}

/// A half-edge mesh with faces of arbitrary valence.
#[derive(Debug, Clone, PartialEq)]
pub struct HalfEdgeMesh<I: MeshIndex = u32> {
    pub(crate) vertices: Vec<Vertex<I>>,
    pub(crate) halfedges: Vec<HalfEdge<I>>,
    pub(crate) faces: Vec<Face<I>>,
}

impl<I: MeshIndex> Default for HalfEdgeMesh<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            halfedges: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(num_vertices: usize, num_halfedges: usize, num_faces: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(num_vertices),
            halfedges: Vec::with_capacity(num_halfedges),
            faces: Vec::with_capacity(num_faces),
        }
    }

    // ==================== Accessors ====================

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of half-edges.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Get the number of full edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.halfedges.len() / 2
    }

    /// Get the number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Get a vertex by ID.
    #[inline]
    pub fn vertex(&self, id: VertexId<I>) -> &Vertex<I> {
        &self.vertices[id.index()]
    }

    /// Get a mutable vertex by ID.
    #[inline]
    pub fn vertex_mut(&mut self, id: VertexId<I>) -> &mut Vertex<I> {
        &mut self.vertices[id.index()]
    }

    /// Get a half-edge by ID.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId<I>) -> &HalfEdge<I> {
        &self.halfedges[id.index()]
    }

    /// Get a mutable half-edge by ID.
    #[inline]
    pub fn halfedge_mut(&mut self, id: HalfEdgeId<I>) -> &mut HalfEdge<I> {
        &mut self.halfedges[id.index()]
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, id: FaceId<I>) -> &Face<I> {
        &self.faces[id.index()]
    }

    /// Get a mutable face by ID.
    #[inline]
    pub fn face_mut(&mut self, id: FaceId<I>) -> &mut Face<I> {
        &mut self.faces[id.index()]
    }

    /// The representative half-edge of a face, if the face exists.
    pub fn face_halfedge(&self, f: FaceId<I>) -> Option<HalfEdgeId<I>> {
        self.faces.get(f.index()).and_then(|face| face.halfedge.valid())
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId<I>) -> &Point3<f64> {
        &self.vertex(v).position
    }

    // ==================== Topology Queries ====================

    /// Get the twin (opposite) half-edge.
    #[inline]
    pub fn twin(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).twin
    }

    /// Get the next half-edge around the face.
    #[inline]
    pub fn next(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).next
    }

    /// Get the previous half-edge around the face.
    #[inline]
    pub fn prev(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).prev
    }

    /// Get the origin vertex of a half-edge.
    #[inline]
    pub fn origin(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.halfedge(he).origin
    }

    /// Get the destination vertex of a half-edge.
    #[inline]
    pub fn dest(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.origin(self.twin(he))
    }

    /// Get the face of a half-edge.
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId<I>) -> FaceId<I> {
        self.halfedge(he).face
    }

    /// Check if a half-edge is on the boundary.
    #[inline]
    pub fn is_boundary_halfedge(&self, he: HalfEdgeId<I>) -> bool {
        self.halfedge(he).is_boundary()
    }

    /// Check if a vertex is on the boundary.
    pub fn is_boundary_vertex(&self, v: VertexId<I>) -> bool {
        let start = self.vertex(v).halfedge;
        if !start.is_valid() {
            return true;
        }
        self.vertex_halfedges(v).any(|he| self.is_boundary_halfedge(he))
    }

    /// Check whether the faces around a vertex form a single fan.
    ///
    /// Isolated and interior vertices are manifold. A boundary vertex is
    /// manifold when exactly one boundary gap separates its incident faces;
    /// two or more gaps mean several fans touch only at this vertex.
    pub fn is_manifold(&self, v: VertexId<I>) -> bool {
        self.vertex_halfedges(v)
            .filter(|&he| self.is_boundary_halfedge(he))
            .nth(1)
            .is_none()
    }

    /// Find the half-edge going from `a` to `b`, if such an edge exists.
    pub fn find_halfedge(&self, a: VertexId<I>, b: VertexId<I>) -> Option<HalfEdgeId<I>> {
        self.vertex_halfedges(a).find(|&he| self.dest(he) == b)
    }

    /// Whether an edge connects `a` and `b`.
    #[inline]
    pub fn is_edge(&self, a: VertexId<I>, b: VertexId<I>) -> bool {
        self.find_halfedge(a, b).is_some()
    }

    // ==================== Iteration ====================

    /// Iterate over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        (0..self.vertices.len()).map(VertexId::new)
    }

    /// Iterate over all half-edge IDs.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        (0..self.halfedges.len()).map(HalfEdgeId::new)
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        (0..self.faces.len()).map(FaceId::new)
    }

    /// Iterate over half-edges around a vertex (outgoing half-edges).
    pub fn vertex_halfedges(&self, v: VertexId<I>) -> VertexHalfEdgeIter<'_, I> {
        VertexHalfEdgeIter::new(self, v)
    }

    /// Iterate over half-edges around a face.
    pub fn face_halfedges(&self, f: FaceId<I>) -> FaceHalfEdgeIter<'_, I> {
        FaceHalfEdgeIter::new(self, f)
    }

    /// Iterate over vertices of a face, in boundary order.
    pub fn face_vertices(&self, f: FaceId<I>) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.face_halfedges(f).map(|he| self.origin(he))
    }

    /// Number of sides of a face.
    pub fn face_valence(&self, f: FaceId<I>) -> usize {
        self.face_halfedges(f).count()
    }

    /// Whether every face of the mesh is a triangle.
    pub fn is_triangle_mesh(&self) -> bool {
        self.face_ids().all(|f| self.face_valence(f) == 3)
    }

    /// Compute the valence (degree) of a vertex.
    pub fn valence(&self, v: VertexId<I>) -> usize {
        self.vertex_halfedges(v).count()
    }

    // ==================== Geometry ====================

    /// Newell's vector of a face: twice its area times its unit normal.
    ///
    /// Exact for planar polygons and a reasonable average for slightly
    /// non-planar ones.
    pub fn face_area_vector(&self, f: FaceId<I>) -> Vector3<f64> {
        let points: Vec<Point3<f64>> = self.face_vertices(f).map(|v| *self.position(v)).collect();
        let n = points.len();
        (0..n)
            .map(|i| points[i].coords.cross(&points[(i + 1) % n].coords))
            .sum()
    }

    /// Compute the unit normal of a face.
    pub fn face_normal(&self, f: FaceId<I>) -> Vector3<f64> {
        self.face_area_vector(f).normalize()
    }

    /// Compute the area of a face.
    pub fn face_area(&self, f: FaceId<I>) -> f64 {
        0.5 * self.face_area_vector(f).norm()
    }

    /// Compute the centroid of a face's vertices.
    pub fn face_centroid(&self, f: FaceId<I>) -> Point3<f64> {
        let mut sum = Vector3::zeros();
        let mut count = 0usize;
        for v in self.face_vertices(f) {
            sum += self.position(v).coords;
            count += 1;
        }
        Point3::from(sum / count.max(1) as f64)
    }

    /// Compute the bounding box of the mesh.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.vertices.first()?.position;
        let mut min = first;
        let mut max = first;

        for v in &self.vertices {
            for i in 0..3 {
                min[i] = min[i].min(v.position[i]);
                max[i] = max[i].max(v.position[i]);
            }
        }

        Some((min, max))
    }

    /// Compute the total surface area of the mesh.
    pub fn surface_area(&self) -> f64 {
        self.face_ids().map(|f| self.face_area(f)).sum()
    }

    // ==================== Construction ====================

    /// Whether `halfedges` more half-edges and `faces` more faces can still
    /// be addressed by the index type `I`.
    pub fn has_room_for(&self, halfedges: usize, faces: usize) -> bool {
        let fits = |len: usize, extra: usize| {
            len.checked_add(extra)
                .map_or(false, |total| total <= I::MAX_ELEMENTS)
        };
        fits(self.halfedges.len(), halfedges) && fits(self.faces.len(), faces)
    }

    /// Add a new isolated vertex and return its ID.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> VertexId<I> {
        let id = VertexId::new(self.vertices.len());
        self.vertices.push(Vertex::new(position));
        id
    }

    /// Allocate an unlinked twin pair `a -> b`, `b -> a`.
    ///
    /// Returns the half-edge originating at `a`.
    pub(crate) fn new_edge(&mut self, a: VertexId<I>, b: VertexId<I>) -> HalfEdgeId<I> {
        let h0 = HalfEdgeId::new(self.halfedges.len());
        let h1 = HalfEdgeId::new(self.halfedges.len() + 1);
        self.halfedges.push(HalfEdge {
            origin: a,
            twin: h1,
            ..HalfEdge::new()
        });
        self.halfedges.push(HalfEdge {
            origin: b,
            twin: h0,
            ..HalfEdge::new()
        });
        h0
    }

    #[inline]
    fn link(&mut self, he: HalfEdgeId<I>, next: HalfEdgeId<I>) {
        self.halfedge_mut(he).next = next;
        self.halfedge_mut(next).prev = he;
    }

    /// Split a face by connecting the destinations of two of its half-edges.
    ///
    /// `h0` and `h1` must be distinct half-edges of the same face. A new edge
    /// is created from `dest(h0)` to `dest(h1)`. The half-edges from
    /// `next(h0)` up to `h1` move to a newly allocated face; `h0` keeps the
    /// original face. Returns the new half-edge leaving `dest(h0)`.
    pub fn insert_edge(&mut self, h0: HalfEdgeId<I>, h1: HalfEdgeId<I>) -> HalfEdgeId<I> {
        debug_assert_ne!(h0, h1);
        debug_assert_eq!(self.face_of(h0), self.face_of(h1));

        let h2 = self.next(h0);
        let h3 = self.next(h1);
        let v0 = self.dest(h0);
        let v1 = self.dest(h1);
        let f0 = self.face_of(h0);
        let f1 = FaceId::new(self.faces.len());
        self.faces.push(Face::new(HalfEdgeId::invalid()));

        let h4 = self.new_edge(v0, v1);
        let h5 = self.twin(h4);

        self.link(h0, h4);
        self.link(h4, h3);
        self.halfedge_mut(h4).face = f0;

        self.link(h1, h5);
        self.link(h5, h2);

        let mut h = h2;
        loop {
            self.halfedge_mut(h).face = f1;
            h = self.next(h);
            if h == h2 {
                break;
            }
        }

        if f0.is_valid() {
            self.face_mut(f0).halfedge = h4;
        }
        self.face_mut(f1).halfedge = h5;

        h4
    }

    // ==================== Validation ====================

    /// Check if the mesh is valid (all connectivity is consistent).
    pub fn is_valid(&self) -> bool {
        for (i, v) in self.vertices.iter().enumerate() {
            if v.halfedge.is_valid() && self.origin(v.halfedge) != VertexId::new(i) {
                return false;
            }
        }

        for (i, he) in self.halfedges.iter().enumerate() {
            let id = HalfEdgeId::new(i);
            if !he.twin.is_valid() || !he.next.is_valid() || !he.prev.is_valid() {
                return false;
            }
            if self.twin(he.twin) != id || he.twin == id {
                return false;
            }
            if self.prev(he.next) != id || self.next(he.prev) != id {
                return false;
            }
            // Consecutive half-edges must share the vertex between them.
            if self.origin(he.next) != self.dest(id) {
                return false;
            }
            if self.face_of(he.next) != he.face {
                return false;
            }
        }

        for (i, f) in self.faces.iter().enumerate() {
            if !f.halfedge.is_valid() || self.face_of(f.halfedge) != FaceId::new(i) {
                return false;
            }
            // The face loop must close within the arena size.
            let mut h = f.halfedge;
            let mut steps = 0;
            loop {
                h = self.next(h);
                steps += 1;
                if h == f.halfedge {
                    break;
                }
                if steps > self.halfedges.len() {
                    return false;
                }
            }
        }

        true
    }
}

/// Iterator over the outgoing half-edges of a vertex.
pub struct VertexHalfEdgeIter<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    done: bool,
}

impl<'a, I: MeshIndex> VertexHalfEdgeIter<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, v: VertexId<I>) -> Self {
        let start = mesh.vertex(v).halfedge;
        Self {
            mesh,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl<'a, I: MeshIndex> Iterator for VertexHalfEdgeIter<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;

        // twin(he) ends at v, so the half-edge after it leaves v again.
        self.current = self.mesh.next(self.mesh.twin(self.current));

        if self.current == self.start {
            self.done = true;
        }

        Some(result)
    }
}

/// Iterator over the half-edges around a face.
pub struct FaceHalfEdgeIter<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    done: bool,
}

impl<'a, I: MeshIndex> FaceHalfEdgeIter<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, f: FaceId<I>) -> Self {
        let start = mesh.face(f).halfedge;
        Self {
            mesh,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl<'a, I: MeshIndex> Iterator for FaceHalfEdgeIter<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;
        self.current = self.mesh.next(self.current);

        if self.current == self.start {
            self.done = true;
        }

        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_polygons;

    fn unit_square() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        build_from_polygons(&vertices, &[vec![0, 1, 2, 3]]).unwrap()
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = HalfEdgeMesh::<u32>::new();
        assert_eq!(mesh.num_vertices(), 0);
        assert_eq!(mesh.num_faces(), 0);
        assert!(mesh.is_valid());
        assert!(mesh.bounding_box().is_none());
    }

    #[test]
    fn test_polygon_geometry() {
        let mesh = unit_square();
        let f = FaceId::new(0);

        assert_eq!(mesh.face_valence(f), 4);
        assert!(!mesh.is_triangle_mesh());
        assert!((mesh.face_area(f) - 1.0).abs() < 1e-12);
        assert!((mesh.face_normal(f).z - 1.0).abs() < 1e-12);

        let c = mesh.face_centroid(f);
        assert!((c - Point3::new(0.5, 0.5, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_find_halfedge() {
        let mesh = unit_square();
        let v = |i| VertexId::new(i);

        let he = mesh.find_halfedge(v(0), v(1)).unwrap();
        assert_eq!(mesh.origin(he), v(0));
        assert_eq!(mesh.dest(he), v(1));
        assert!(!mesh.is_boundary_halfedge(he));
        assert!(mesh.is_boundary_halfedge(mesh.find_halfedge(v(1), v(0)).unwrap()));

        assert!(mesh.find_halfedge(v(0), v(2)).is_none());
        assert!(!mesh.is_edge(v(1), v(3)));
    }

    #[test]
    fn test_insert_edge_splits_face() {
        let mut mesh = unit_square();
        let f = FaceId::new(0);
        let h0 = mesh.face(f).halfedge; // 0 -> 1
        let h1 = mesh.next(mesh.next(h0)); // 2 -> 3

        let h = mesh.insert_edge(h0, h1);

        assert_eq!(mesh.origin(h), VertexId::new(1));
        assert_eq!(mesh.dest(h), VertexId::new(3));
        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.num_edges(), 5);
        assert!(mesh.is_valid());
        assert!(mesh.is_triangle_mesh());
        assert!((mesh.surface_area() - 1.0).abs() < 1e-12);
        assert!(mesh.is_edge(VertexId::new(3), VertexId::new(1)));
    }

    #[test]
    fn test_room_for_narrow_indices() {
        let mesh: HalfEdgeMesh<u16> = build_from_polygons(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            &[vec![0, 1, 2]],
        )
        .unwrap();

        assert!(mesh.has_room_for(65_535 - 6, 65_534));
        assert!(!mesh.has_room_for(65_535 - 5, 0));
        assert!(!mesh.has_room_for(0, 65_535));
        assert!(!mesh.has_room_for(usize::MAX, 0));
    }

    #[test]
    fn test_manifold_vertices() {
        let mesh = unit_square();
        for v in mesh.vertex_ids() {
            assert!(mesh.is_manifold(v));
            assert!(mesh.is_boundary_vertex(v));
            assert_eq!(mesh.valence(v), 2);
        }
    }
}

//! Boundary ring of a single face.

use crate::error::{MeshError, Result};
use crate::mesh::{FaceId, HalfEdgeId, HalfEdgeMesh, MeshIndex, VertexId};

/// One corner of a face: a boundary half-edge and the vertex it points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingEntry<I: MeshIndex = u32> {
    /// Half-edge of the face, as captured before any edits.
    pub halfedge: HalfEdgeId<I>,
    /// Destination vertex of `halfedge`.
    pub vertex: VertexId<I>,
}

/// The ordered boundary of a face, captured once per triangulation.
///
/// Entries are indexed `0..n` in "next around face" order starting from the
/// face's representative half-edge. The ring is not updated when the mesh is
/// edited afterwards; its half-edges remain valid handles, but the faces they
/// bound may change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ring<I: MeshIndex = u32> {
    face: FaceId<I>,
    entries: Vec<RingEntry<I>>,
}

impl<I: MeshIndex> Ring<I> {
    /// Walk the boundary of `face` and capture its ring.
    ///
    /// # Errors
    /// Returns [`MeshError::InvalidInput`] if the face does not exist, its
    /// boundary loop does not close, or any of its vertices is non-manifold.
    /// The mesh is never modified.
    pub fn collect(mesh: &HalfEdgeMesh<I>, face: FaceId<I>) -> Result<Self> {
        let h0 = mesh
            .face_halfedge(face)
            .ok_or_else(|| MeshError::invalid_input(format!("{:?} does not exist", face)))?;

        let mut entries = Vec::new();
        let mut h = h0;
        loop {
            let v = mesh.dest(h);
            if !mesh.is_manifold(v) {
                return Err(MeshError::invalid_input(format!(
                    "non-manifold polygon: {:?} of {:?} joins several fans",
                    v, face
                )));
            }
            entries.push(RingEntry { halfedge: h, vertex: v });

            h = mesh.next(h);
            if h == h0 {
                break;
            }
            if entries.len() > mesh.num_halfedges() {
                return Err(MeshError::invalid_input(format!(
                    "boundary of {:?} does not close",
                    face
                )));
            }
        }

        Ok(Self { face, entries })
    }

    /// The face this ring was captured from.
    #[inline]
    pub fn face(&self) -> FaceId<I> {
        self.face
    }

    /// Number of corners.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ring has no corners.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the face has more than three corners and needs splitting.
    #[inline]
    pub fn needs_triangulation(&self) -> bool {
        self.entries.len() > 3
    }

    /// Captured half-edge at ring position `i`.
    #[inline]
    pub fn halfedge(&self, i: usize) -> HalfEdgeId<I> {
        self.entries[i].halfedge
    }

    /// Vertex at ring position `i`.
    #[inline]
    pub fn vertex(&self, i: usize) -> VertexId<I> {
        self.entries[i].vertex
    }

    /// All captured corners.
    pub fn entries(&self) -> &[RingEntry<I>] {
        &self.entries
    }
}

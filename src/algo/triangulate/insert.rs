//! Replaying a split table as edge insertions on the live mesh.
//!
//! The ring and the table describe the face as it was before any edits.
//! Each inserted chord splits the face, so the half-edge captured at a ring
//! position may afterwards bound a different sub-face than the one the next
//! chord needs. Every chord is therefore searched from both of its ends.

use log::warn;

use super::ring::Ring;
use super::solver::SplitTable;
use crate::mesh::{HalfEdgeId, HalfEdgeMesh, MeshIndex, VertexId};

/// What happened to one requested chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChordOutcome<I: MeshIndex = u32> {
    /// The two vertices are already connected by an edge of the face
    /// being split; nothing to do.
    Existing,
    /// A new edge was inserted; the half-edge leaves the first vertex.
    Inserted(HalfEdgeId<I>),
    /// Neither endpoint's current face reaches the other endpoint, or the
    /// two vertices are joined by an edge lying outside this face.
    Skipped,
}

/// Tally of one replay of a split table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChordReport<I: MeshIndex = u32> {
    /// Chords that created a new edge.
    pub inserted: usize,
    /// Chords that were already present as edges.
    pub existing: usize,
    /// Chords that could not be realized, as vertex pairs.
    pub skipped: Vec<(VertexId<I>, VertexId<I>)>,
}

/// Insert the chords of the optimal decomposition stored in `table`.
///
/// The split tree is unwound with an explicit stack starting at the range
/// `(0, n - 1)`; each popped range `(start, end)` with apex `m` requests the
/// chords `(start, m)` and `(m, end)` and then expands both halves.
/// Unrealizable chords are logged and reported, never raised.
pub fn insert_chords<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    ring: &Ring<I>,
    table: &SplitTable,
) -> ChordReport<I> {
    let mut report = ChordReport {
        inserted: 0,
        existing: 0,
        skipped: Vec::new(),
    };
    let n = ring.len();
    if n < 3 {
        return report;
    }
    debug_assert_eq!(table.len(), n);

    let mut todo = Vec::with_capacity(n);
    todo.push((0, n - 1));
    while let Some((start, end)) = todo.pop() {
        if end - start < 2 {
            continue;
        }
        let Some(split) = table.split(start, end) else {
            continue;
        };

        for (i, j) in [(start, split), (split, end)] {
            match insert_chord(mesh, ring, i, j) {
                ChordOutcome::Existing => report.existing += 1,
                ChordOutcome::Inserted(_) => report.inserted += 1,
                ChordOutcome::Skipped => {
                    warn!(
                        "could not insert chord {:?}-{:?} while triangulating {:?}",
                        ring.vertex(i),
                        ring.vertex(j),
                        ring.face()
                    );
                    report.skipped.push((ring.vertex(i), ring.vertex(j)));
                }
            }
        }

        todo.push((start, split));
        todo.push((split, end));
    }

    report
}

/// Connect the vertices at ring positions `i` and `j` in the current mesh.
pub fn insert_chord<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    ring: &Ring<I>,
    i: usize,
    j: usize,
) -> ChordOutcome<I> {
    let (h0, v0) = (ring.halfedge(i), ring.vertex(i));
    let (h1, v1) = (ring.halfedge(j), ring.vertex(j));

    if let Some(he) = mesh.find_halfedge(v0, v1) {
        // A second edge between the same vertices cannot be inserted, and an
        // edge elsewhere in the mesh leaves this face unsplit.
        let (f0, f1) = (mesh.face_of(h0), mesh.face_of(h1));
        let bounds_face = |h: HalfEdgeId<I>| {
            let f = mesh.face_of(h);
            f == f0 || f == f1
        };
        return if bounds_face(he) || bounds_face(mesh.twin(he)) {
            ChordOutcome::Existing
        } else {
            ChordOutcome::Skipped
        };
    }

    if let Some(he) = split_towards(mesh, h0, v1) {
        return ChordOutcome::Inserted(he);
    }
    if let Some(he) = split_towards(mesh, h1, v0) {
        return ChordOutcome::Inserted(mesh.twin(he));
    }
    ChordOutcome::Skipped
}

/// Walk the face of `from` looking for a half-edge ending at `target`; if
/// found, split the face between `dest(from)` and `target`.
fn split_towards<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    from: HalfEdgeId<I>,
    target: VertexId<I>,
) -> Option<HalfEdgeId<I>> {
    let mut h = from;
    loop {
        h = mesh.next(h);
        if h == from {
            return None;
        }
        if mesh.dest(h) == target {
            return Some(mesh.insert_edge(from, h));
        }
    }
}

//! Optimal triangulation of polygonal faces.
//!
//! Each n-gon is replaced by n - 2 triangles chosen by dynamic programming
//! over the sub-ranges of its boundary (Liepa 2003, the same recurrence as
//! optimal matrix-chain ordering). Two objectives are available:
//!
//! - [`Objective::MinArea`]: minimize the sum of squared triangle areas
//! - [`Objective::MaxAngle`]: maximize the smallest interior angle
//!
//! Triangulating one face runs four stages:
//!
//! 1. [`Ring::collect`] walks the face boundary and rejects non-manifold corners
//! 2. [`Evaluator`] scores candidate triangles, refusing ones whose three
//!    edges all exist already
//! 3. [`solve`] fills the weight and split tables
//! 4. [`insert_chords`] unwinds the split tree and splits the face edge by edge
//!
//! Faces are optimized independently; the cost per face is O(n³) time and
//! O(n²) memory.
//!
//! # Example
//!
//! ```
//! use polytri::prelude::*;
//! use polytri::algo::triangulate::{triangulate, Objective};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(2.0, 0.0, 0.0),
//!     Point3::new(3.0, 1.0, 0.0),
//!     Point3::new(1.5, 2.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let mut mesh: HalfEdgeMesh = build_from_polygons(&vertices, &[vec![0, 1, 2, 3, 4]]).unwrap();
//!
//! let report = triangulate(&mut mesh, Objective::MaxAngle).unwrap();
//! assert!(report.is_complete());
//! assert_eq!(mesh.num_faces(), 3);
//! assert!(mesh.is_triangle_mesh());
//! ```
//!
//! # References
//!
//! - Liepa, P. (2003). "Filling Holes in Meshes." Eurographics Symposium on
//!   Geometry Processing.

mod insert;
mod objective;
mod ring;
mod solver;

use log::{debug, warn};

pub use insert::{insert_chord, insert_chords, ChordOutcome, ChordReport};
pub use objective::{Evaluator, Objective, INFEASIBLE};
pub use ring::{Ring, RingEntry};
pub use solver::{solve, SplitTable};

use crate::error::{MeshError, Result};
use crate::mesh::{FaceId, HalfEdgeMesh, MeshIndex, VertexId};

/// Options for whole-mesh triangulation.
#[derive(Debug, Clone, Default)]
pub struct TriangulateOptions {
    /// Objective optimized for every face.
    pub objective: Objective,

    /// Whether a face that cannot be triangulated (non-manifold corner)
    /// is logged and skipped instead of aborting the whole run.
    /// Default: false.
    pub skip_invalid_faces: bool,
}

impl TriangulateOptions {
    /// Create options for the given objective.
    pub fn new(objective: Objective) -> Self {
        Self {
            objective,
            skip_invalid_faces: false,
        }
    }

    /// Set whether invalid faces are skipped.
    pub fn with_skip_invalid_faces(mut self, skip: bool) -> Self {
        self.skip_invalid_faces = skip;
        self
    }
}

/// Outcome of triangulating one face.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceTriangulation<I: MeshIndex = u32> {
    /// The face that was triangulated; it keeps one of the resulting triangles.
    pub face: FaceId<I>,
    /// Number of corners the face had.
    pub valence: usize,
    /// Optimal objective value, or `None` if the face needed no work.
    pub optimum: Option<f64>,
    /// Number of new edges.
    pub inserted: usize,
    /// Chords that could not be realized, as vertex pairs.
    pub skipped: Vec<(VertexId<I>, VertexId<I>)>,
}

impl<I: MeshIndex> FaceTriangulation<I> {
    /// Whether every requested chord was realized.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// A chord that could not be realized during whole-mesh triangulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedChord<I: MeshIndex = u32> {
    /// Face being triangulated.
    pub face: FaceId<I>,
    /// First endpoint.
    pub from: VertexId<I>,
    /// Second endpoint.
    pub to: VertexId<I>,
}

/// Outcome of triangulating every face of a mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangulationReport<I: MeshIndex = u32> {
    /// Faces examined.
    pub faces_visited: usize,
    /// Faces with more than three corners that were split.
    pub faces_split: usize,
    /// New edges over all faces.
    pub chords_inserted: usize,
    /// Chords that could not be realized.
    pub skipped_chords: Vec<SkippedChord<I>>,
    /// Faces left untouched because they were rejected as invalid input.
    /// Only filled when [`TriangulateOptions::skip_invalid_faces`] is set.
    pub invalid_faces: Vec<FaceId<I>>,
}

impl<I: MeshIndex> TriangulationReport<I> {
    /// Whether every face was fully triangulated.
    pub fn is_complete(&self) -> bool {
        self.skipped_chords.is_empty() && self.invalid_faces.is_empty()
    }

    fn record(&mut self, result: &FaceTriangulation<I>) {
        if result.optimum.is_some() {
            self.faces_split += 1;
        }
        self.chords_inserted += result.inserted;
        self.skipped_chords
            .extend(result.skipped.iter().map(|&(from, to)| SkippedChord {
                face: result.face,
                from,
                to,
            }));
    }
}

/// Triangulate every face of the mesh.
///
/// Faces are processed in index order; only the faces present when the call
/// starts are visited. The first face rejected as invalid input aborts the
/// run with faces before it already triangulated. Use
/// [`triangulate_with_options`] to skip such faces instead.
pub fn triangulate<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    objective: Objective,
) -> Result<TriangulationReport<I>> {
    triangulate_with_options(mesh, &TriangulateOptions::new(objective))
}

/// Triangulate every face of the mesh with explicit options.
pub fn triangulate_with_options<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    options: &TriangulateOptions,
) -> Result<TriangulationReport<I>> {
    let mut report = TriangulationReport {
        faces_visited: 0,
        faces_split: 0,
        chords_inserted: 0,
        skipped_chords: Vec::new(),
        invalid_faces: Vec::new(),
    };

    let num_faces = mesh.num_faces();
    for fi in 0..num_faces {
        let face = FaceId::new(fi);
        report.faces_visited += 1;

        match triangulate_face(mesh, face, options.objective) {
            Ok(result) => report.record(&result),
            Err(e) if options.skip_invalid_faces && e.is_invalid_input() => {
                warn!("skipping {:?}: {}", face, e);
                report.invalid_faces.push(face);
            }
            Err(e) => return Err(e),
        }
    }

    debug!(
        "triangulated {} of {} faces, {} chords inserted, {} skipped",
        report.faces_split,
        report.faces_visited,
        report.chords_inserted,
        report.skipped_chords.len()
    );

    Ok(report)
}

/// Triangulate a single face.
///
/// Faces with three or fewer corners are left untouched.
///
/// # Errors
/// [`MeshError::InvalidInput`] if the face does not exist or touches a
/// non-manifold vertex, and [`MeshError::IndexOverflow`] if the new edges
/// and faces would not fit the mesh's index type. The mesh is not modified
/// in either case.
pub fn triangulate_face<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    face: FaceId<I>,
    objective: Objective,
) -> Result<FaceTriangulation<I>> {
    let ring = Ring::collect(mesh, face)?;
    let valence = ring.len();

    if !ring.needs_triangulation() {
        return Ok(FaceTriangulation {
            face,
            valence,
            optimum: None,
            inserted: 0,
            skipped: Vec::new(),
        });
    }

    // Each chord adds one face and two half-edges.
    let chords = valence - 3;
    if !mesh.has_room_for(2 * chords, chords) {
        return Err(MeshError::IndexOverflow {
            count: mesh.num_halfedges() + 2 * chords,
            index_type: std::any::type_name::<I>(),
        });
    }

    let table = {
        let evaluator = Evaluator::new(mesh, &ring, objective);
        solve(valence, objective, |i, m, k| evaluator.score(i, m, k))
    };
    let chords = insert_chords(mesh, &ring, &table);

    debug!(
        "{:?}: {}-gon, {:?} optimum {:?}, {} chords",
        face,
        valence,
        objective,
        table.optimum(),
        chords.inserted
    );

    Ok(FaceTriangulation {
        face,
        valence,
        optimum: table.optimum(),
        inserted: chords.inserted,
        skipped: chords.skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

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

    fn regular_polygon(n: usize) -> HalfEdgeMesh {
        let vertices: Vec<Point3<f64>> = (0..n)
            .map(|i| {
                let t = i as f64 * std::f64::consts::TAU / n as f64;
                Point3::new(t.cos(), t.sin(), 0.0)
            })
            .collect();
        let face: Vec<usize> = (0..n).collect();
        build_from_polygons(&vertices, &[face]).unwrap()
    }

    /// Closed cube made of six quads.
    fn quad_cube() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        let faces = vec![
            vec![0, 3, 2, 1],
            vec![4, 5, 6, 7],
            vec![0, 1, 5, 4],
            vec![1, 2, 6, 5],
            vec![2, 3, 7, 6],
            vec![3, 0, 4, 7],
        ];
        build_from_polygons(&vertices, &faces).unwrap()
    }

    /// A quad and a triangle touching only at vertex 2.
    fn bowtie() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(2.0, 2.0, 0.0),
        ];
        build_from_polygons(&vertices, &[vec![0, 1, 2, 3], vec![2, 4, 5]]).unwrap()
    }

    #[test]
    fn test_square_min_area() {
        let mut mesh = unit_square();
        let result = triangulate_face(&mut mesh, FaceId::new(0), Objective::MinArea).unwrap();

        assert_eq!(result.valence, 4);
        assert_eq!(result.inserted, 1);
        assert!(result.is_complete());
        // Both triangles have area 0.5, so each scores (2 * 0.5)^2.
        assert_relative_eq!(result.optimum.unwrap(), 2.0, epsilon = 1e-12);

        assert_eq!(mesh.num_faces(), 2);
        for f in mesh.face_ids() {
            assert_eq!(mesh.face_valence(f), 3);
            assert_relative_eq!(mesh.face_area(f), 0.5, epsilon = 1e-12);
        }
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_square_max_angle_tie_takes_lower_split() {
        let mesh = unit_square();
        let ring = Ring::collect(&mesh, FaceId::new(0)).unwrap();
        let evaluator = Evaluator::new(&mesh, &ring, Objective::MaxAngle);
        let table = solve(4, Objective::MaxAngle, |i, m, k| evaluator.score(i, m, k));

        assert_eq!(table.split(0, 3), Some(1));
        assert_relative_eq!(table.optimum().unwrap(), 0.5_f64.sqrt(), epsilon = 1e-12);

        // The ring starts at vertex 1, so apex 1 is vertex 2 and the chord
        // joins vertices 2 and 0.
        let mut mesh = mesh;
        triangulate_face(&mut mesh, FaceId::new(0), Objective::MaxAngle).unwrap();
        assert!(mesh.is_edge(VertexId::new(0), VertexId::new(2)));
        assert!(!mesh.is_edge(VertexId::new(1), VertexId::new(3)));
    }

    #[test]
    fn test_regular_polygons() {
        for objective in [Objective::MinArea, Objective::MaxAngle] {
            for n in 4..=12 {
                let mut mesh = regular_polygon(n);
                let area = mesh.surface_area();

                let report = triangulate(&mut mesh, objective).unwrap();

                assert!(report.is_complete());
                assert_eq!(report.faces_split, 1);
                assert_eq!(report.chords_inserted, n - 3);
                assert_eq!(mesh.num_faces(), n - 2, "n = {}", n);
                assert!(mesh.is_triangle_mesh());
                assert!(mesh.is_valid());
                assert_relative_eq!(mesh.surface_area(), area, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_triangle_is_untouched() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let mut mesh: HalfEdgeMesh = build_from_polygons(&vertices, &[vec![0, 1, 2]]).unwrap();
        let before = mesh.clone();

        let result = triangulate_face(&mut mesh, FaceId::new(0), Objective::MinArea).unwrap();

        assert_eq!(result.optimum, None);
        assert_eq!(result.inserted, 0);
        assert_eq!(mesh, before);
    }

    #[test]
    fn test_non_manifold_face_is_rejected_without_changes() {
        let mut mesh = bowtie();
        let before = mesh.clone();

        let err = triangulate_face(&mut mesh, FaceId::new(0), Objective::MinArea).unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(mesh, before);

        let err = triangulate(&mut mesh, Objective::MinArea).unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(mesh, before);
    }

    #[test]
    fn test_skip_invalid_faces() {
        let mut mesh = bowtie();
        let before = mesh.clone();
        let options = TriangulateOptions::new(Objective::MinArea).with_skip_invalid_faces(true);

        let report = triangulate_with_options(&mut mesh, &options).unwrap();

        assert_eq!(report.faces_visited, 2);
        assert_eq!(report.invalid_faces, vec![FaceId::new(0), FaceId::new(1)]);
        assert!(!report.is_complete());
        assert_eq!(mesh, before);
    }

    #[test]
    fn test_closed_quad_cube() {
        let mut mesh = quad_cube();
        let area = mesh.surface_area();

        let report = triangulate(&mut mesh, Objective::MaxAngle).unwrap();

        assert_eq!(report.faces_visited, 6);
        assert_eq!(report.faces_split, 6);
        assert_eq!(report.chords_inserted, 6);
        assert_eq!(mesh.num_faces(), 12);
        assert_eq!(mesh.num_edges(), 18);
        assert!(mesh.is_triangle_mesh());
        assert!(mesh.is_valid());
        assert!(mesh.vertex_ids().all(|v| !mesh.is_boundary_vertex(v)));
        assert_relative_eq!(mesh.surface_area(), area, epsilon = 1e-12);
    }

    #[test]
    fn test_existing_diagonal_is_avoided() {
        // Triangles around vertex 4 already connect 0 and 2, so the quad
        // must be split along 1-3 even though both diagonals tie on area.
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];
        let faces = vec![vec![0, 1, 2, 3], vec![1, 0, 4], vec![2, 1, 4], vec![0, 2, 4]];
        let mut mesh: HalfEdgeMesh = build_from_polygons(&vertices, &faces).unwrap();
        assert!(mesh.is_edge(VertexId::new(0), VertexId::new(2)));

        let result = triangulate_face(&mut mesh, FaceId::new(0), Objective::MinArea).unwrap();

        assert_eq!(result.inserted, 1);
        assert!(mesh.is_edge(VertexId::new(1), VertexId::new(3)));
        assert_eq!(mesh.face_valence(FaceId::new(0)), 3);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_new_faces_are_not_revisited() {
        let vertices: Vec<Point3<f64>> = (0..6)
            .map(|i| Point3::new(i as f64, if i % 2 == 0 { 0.0 } else { 1.0 }, 0.0))
            .collect();
        let faces = vec![vec![0, 2, 4, 5, 3, 1]];
        let mut mesh: HalfEdgeMesh = build_from_polygons(&vertices, &faces).unwrap();

        let report = triangulate(&mut mesh, Objective::MinArea).unwrap();

        assert_eq!(report.faces_visited, 1);
        assert_eq!(mesh.num_faces(), 4);
    }

    #[test]
    fn test_index_overflow_is_reported_before_editing() {
        // 2 * 20_000 half-edges fit in u16 indices, the 2 * 19_997 more that
        // the triangulation needs do not.
        let n = 20_000;
        let vertices: Vec<Point3<f64>> = (0..n)
            .map(|i| {
                let t = i as f64 * std::f64::consts::TAU / n as f64;
                Point3::new(t.cos(), t.sin(), 0.0)
            })
            .collect();
        let face: Vec<usize> = (0..n).collect();
        let mut mesh: HalfEdgeMesh<u16> = build_from_polygons(&vertices, &[face]).unwrap();
        let before = mesh.clone();

        let err = triangulate_face(&mut mesh, FaceId::new(0), Objective::MinArea).unwrap_err();

        assert!(matches!(err, MeshError::IndexOverflow { index_type: "u16", .. }));
        assert!(!err.is_invalid_input());
        assert_eq!(mesh, before);
    }

    #[test]
    fn test_outside_edge_leaves_face_incomplete() {
        // Hexagon 0..6 capped by triangles around vertex 6; the cap already
        // joins 0 and 3, which the min-area fan around vertex 0 wants.
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, -2.0, 0.0),
            Point3::new(3.0, -2.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(3.0, 2.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
            Point3::new(2.0, -1.0, 2.0),
        ];
        let faces = vec![
            vec![0, 1, 2, 3, 4, 5],
            vec![1, 0, 6],
            vec![2, 1, 6],
            vec![3, 2, 6],
            vec![0, 3, 6],
        ];
        let mesh: HalfEdgeMesh = build_from_polygons(&vertices, &faces).unwrap();

        let mut single = mesh.clone();
        let result = triangulate_face(&mut single, FaceId::new(0), Objective::MinArea).unwrap();
        assert_eq!(result.inserted, 2);
        assert_eq!(result.skipped, vec![(VertexId::new(3), VertexId::new(0))]);
        assert!(!result.is_complete());

        let mut whole = mesh;
        let report = triangulate(&mut whole, Objective::MinArea).unwrap();
        assert!(!report.is_complete());
        assert_eq!(
            report.skipped_chords,
            vec![SkippedChord {
                face: FaceId::new(0),
                from: VertexId::new(3),
                to: VertexId::new(0),
            }]
        );
        assert_eq!(report.chords_inserted, 2);

        // One quad is left over, and it is the only non-triangle.
        let valences: Vec<usize> = whole.face_ids().map(|f| whole.face_valence(f)).collect();
        assert_eq!(valences.iter().filter(|&&n| n == 4).count(), 1);
        assert!(valences.iter().all(|&n| n == 3 || n == 4));
        assert!(whole.is_valid());
    }

    #[test]
    fn test_abort_keeps_earlier_faces_triangulated() {
        let vertices = vec![
            // Quad.
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            // Pentagon.
            Point3::new(3.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(4.5, 1.0, 0.0),
            Point3::new(3.5, 1.8, 0.0),
            Point3::new(2.5, 1.0, 0.0),
            // Quad and triangle touching at vertex 11.
            Point3::new(6.0, 0.0, 0.0),
            Point3::new(7.0, 0.0, 0.0),
            Point3::new(7.0, 1.0, 0.0),
            Point3::new(6.0, 1.0, 0.0),
            Point3::new(8.0, 1.0, 0.0),
            Point3::new(8.0, 2.0, 0.0),
        ];
        let faces = vec![
            vec![0, 1, 2, 3],
            vec![4, 5, 6, 7, 8],
            vec![9, 10, 11, 12],
            vec![11, 13, 14],
        ];
        let mut mesh: HalfEdgeMesh = build_from_polygons(&vertices, &faces).unwrap();

        let err = triangulate(&mut mesh, Objective::MinArea).unwrap_err();

        assert!(err.is_invalid_input());
        // 1 + 1 + 2 new triangles from the quad and the pentagon.
        assert_eq!(mesh.num_faces(), 4 + 1 + 2);
        assert_eq!(mesh.face_valence(FaceId::new(0)), 3);
        assert_eq!(mesh.face_valence(FaceId::new(1)), 3);
        assert_eq!(mesh.face_valence(FaceId::new(2)), 4);
        assert!(
            mesh.is_edge(VertexId::new(0), VertexId::new(2))
                || mesh.is_edge(VertexId::new(1), VertexId::new(3))
        );
    }
}

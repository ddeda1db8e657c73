//! # Polytri
//!
//! Optimal triangulation of polygonal faces on a half-edge mesh.
//!
//! Every n-gon of a mesh is replaced by n - 2 triangles chosen by dynamic
//! programming, either minimizing the summed squared triangle areas or
//! maximizing the smallest angle, and the result is written back into the
//! mesh topology edge by edge.
//!
//! ## Features
//!
//! - **Half-edge data structure**: polygon faces, O(1) adjacency queries,
//!   type-safe indices
//! - **Optimal triangulation**: minimum-area and maximum-angle objectives
//! - **Multiple file formats**: OBJ and PLY polygon meshes, STL output
//!
//! ## Quick Start
//!
//! ```no_run
//! use polytri::prelude::*;
//! use polytri::algo::triangulate::{triangulate, Objective};
//!
//! let mut mesh: HalfEdgeMesh = polytri::io::load("model.obj").unwrap();
//!
//! let report = triangulate(&mut mesh, Objective::MinArea).unwrap();
//! if !report.is_complete() {
//!     eprintln!("{} chords could not be inserted", report.skipped_chords.len());
//! }
//!
//! polytri::io::save(&mesh, "triangles.stl").unwrap();
//! ```
//!
//! ## Triangulating a Single Face
//!
//! ```
//! use polytri::prelude::*;
//! use polytri::algo::triangulate::{triangulate_face, Objective};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let mut mesh: HalfEdgeMesh = build_from_polygons(&vertices, &[vec![0, 1, 2, 3]]).unwrap();
//!
//! let result = triangulate_face(&mut mesh, FaceId::new(0), Objective::MinArea).unwrap();
//! assert_eq!(result.inserted, 1);
//! assert_eq!(mesh.num_faces(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod io;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// ```
/// use polytri::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build_from_polygons, build_from_triangles, to_face_vertex, Face, FaceId, HalfEdge,
        HalfEdgeId, HalfEdgeMesh, MeshIndex, Vertex, VertexId,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;

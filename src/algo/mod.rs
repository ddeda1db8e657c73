//! Mesh processing algorithms.
//!
//! - **Triangulation**: optimal splitting of polygonal faces into triangles
//!   ([`triangulate`])

pub mod triangulate;

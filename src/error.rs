//! Error types for polytri.
//!
//! Every fallible operation in the crate returns [`Result`], whose error side
//! is [`MeshError`].

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur while building, triangulating or storing a mesh.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face has fewer than three vertices or repeats a vertex.
    #[error("face {face} is degenerate ({reason})")]
    DegenerateFace {
        /// The face index.
        face: usize,
        /// What makes the face degenerate.
        reason: &'static str,
    },

    /// A directed edge is used by more than one face.
    #[error("edge ({v0}, {v1}) is used twice in the same direction")]
    NonManifoldEdge {
        /// First vertex of the edge.
        v0: usize,
        /// Second vertex of the edge.
        v1: usize,
    },

    /// The input violates a precondition of the requested operation,
    /// e.g. a polygon touching a non-manifold vertex.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The mesh would outgrow its index type.
    #[error("{count} elements do not fit in {index_type} indices")]
    IndexOverflow {
        /// Number of elements that were needed.
        count: usize,
        /// Name of the index type.
        index_type: &'static str,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading mesh from file.
    #[error("failed to load mesh from {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Error saving mesh to file.
    #[error("failed to save mesh to {path}: {message}")]
    SaveError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },
}

impl MeshError {
    /// Create an [`MeshError::InvalidInput`] from anything printable.
    pub fn invalid_input<T: std::fmt::Display>(what: T) -> Self {
        MeshError::InvalidInput(what.to_string())
    }

    /// Whether this error rejects the input rather than reporting an
    /// environment failure (I/O, parsing).
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, MeshError::InvalidInput(_))
    }
}

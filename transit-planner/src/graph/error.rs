//! Graph error types.

/// Errors from graph mutation and lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A vertex index is not below the vertex count
    #[error("vertex {vertex} does not exist (graph has {vertex_count} vertices)")]
    OutOfRange { vertex: usize, vertex_count: usize },

    /// The reserved unreachable weight was used as a real weight
    #[error("arc ({from}, {to}) cannot use the reserved infinite weight")]
    InvalidWeight { from: usize, to: usize },

    /// No arc between the two vertices
    #[error("arc ({from}, {to}) does not exist")]
    NotFound { from: usize, to: usize },
}

use thiserror::Error;

use crate::topology::VertexId;

/// Top-level error type for the seamcut crate.
#[derive(Debug, Error)]
pub enum SeamcutError {
    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Pick(#[from] PickError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Seam(#[from] SeamError),
}

/// Errors related to mesh topology and vertex handles.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("invalid vertex handle {index} (mesh has {count} vertices)")]
    InvalidVertex { index: u32, count: usize },

    #[error("invalid half-edge handle {0}")]
    InvalidHalfEdge(u32),

    #[error("triangle {triangle} references vertex {index}, but the mesh has {count} vertices")]
    IndexOutOfBounds {
        triangle: usize,
        index: u32,
        count: usize,
    },

    #[error("triangle {0} is degenerate (repeated vertex index)")]
    DegenerateTriangle(usize),

    #[error("directed edge {from} -> {to} is used by more than one face")]
    NonManifoldEdge { from: u32, to: u32 },

    #[error("mesh has too many elements for 32-bit handles: {0}")]
    TooManyElements(usize),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Errors related to shortest-path queries.
#[derive(Debug, Error)]
pub enum PathError {
    #[error("no path from {from} to {to}")]
    Unreachable { from: VertexId, to: VertexId },

    #[error(transparent)]
    Topology(#[from] TopologyError),
}

/// Errors related to color-id vertex picking.
#[derive(Debug, Error)]
pub enum PickError {
    #[error("mesh has {0} vertices; color-id picking encodes at most 16777215")]
    TooManyVertices(usize),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Errors raised by a rendering backend.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("index count {0} is not a multiple of 3")]
    IndexCountNotTriangles(usize),

    #[error("index {index} is out of bounds for {count} vertices")]
    IndexOutOfBounds { index: u32, count: usize },

    #[error("viewport has zero size ({width}x{height})")]
    EmptyViewport { width: u32, height: u32 },

    #[error("pixel ({x}, {y}) is outside the {width}x{height} framebuffer")]
    PixelOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
}

/// Errors related to seam editing.
#[derive(Debug, Error)]
pub enum SeamError {
    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Path(#[from] PathError),
}

/// Convenience type alias for results using [`SeamcutError`].
pub type Result<T> = std::result::Result<T, SeamcutError>;

use std::fmt;

use crate::math::Point3;

/// Stable handle of a mesh vertex: its index in the vertex arena.
///
/// Handles are only created by the mesh or by callers that know the vertex
/// count; every lookup through [`super::SurfaceMesh`] is bounds-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexId(pub u32);

impl VertexId {
    /// Position of this vertex in the arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Data associated with a mesh vertex.
#[derive(Debug, Clone)]
pub struct VertexData {
    /// The 3D position of the vertex.
    pub point: Point3,
    /// Whether any incident edge lacks an opposing face.
    pub is_boundary: bool,
}

impl VertexData {
    /// Creates an interior (or isolated) vertex at the given point.
    #[must_use]
    pub fn new(point: Point3) -> Self {
        Self {
            point,
            is_boundary: false,
        }
    }
}

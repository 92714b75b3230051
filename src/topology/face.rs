use super::halfedge::HalfEdgeId;
use super::vertex::VertexId;

/// Handle of a triangle face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FaceId(pub u32);

impl FaceId {
    /// Position of this face in the arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Data associated with a triangle face.
#[derive(Debug, Clone, Copy)]
pub struct FaceData {
    /// Corner vertices, counter-clockwise.
    pub vertices: [VertexId; 3],
    /// The half-edge leaving `vertices[0]`; the other two follow it.
    pub halfedge: HalfEdgeId,
}

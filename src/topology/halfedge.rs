use super::face::FaceId;
use super::vertex::VertexId;

/// Handle of a directed half-edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HalfEdgeId(pub u32);

impl HalfEdgeId {
    /// Position of this half-edge in the arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Data associated with a half-edge.
///
/// Interior edges are a twin pair of face half-edges. A boundary edge pairs a
/// face half-edge with a face-less boundary half-edge running the other way.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdgeData {
    /// Vertex this half-edge leaves.
    pub origin: VertexId,
    /// Vertex this half-edge points to.
    pub target: VertexId,
    /// The oppositely directed half-edge of the same edge.
    pub twin: HalfEdgeId,
    /// Face on the left, `None` for boundary half-edges.
    pub face: Option<FaceId>,
}

impl HalfEdgeData {
    /// Returns `true` if no face lies on this half-edge's side.
    #[must_use]
    pub fn is_boundary(&self) -> bool {
        self.face.is_none()
    }
}

use crate::math::Point3f;

/// Points of a seam in render precision, one per seam vertex.
///
/// `revision` increases on every change so consumers can tell when a GPU
/// upload is stale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeamGeometry {
    points: Vec<Point3f>,
    revision: u64,
}

impl SeamGeometry {
    /// Seam vertex positions in seam order.
    #[must_use]
    pub fn points(&self) -> &[Point3f] {
        &self.points
    }

    /// Number of times the points were regenerated.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns `true` if the seam has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub(super) fn replace(&mut self, points: Vec<Point3f>) {
        self.points = points;
        self.revision += 1;
    }
}

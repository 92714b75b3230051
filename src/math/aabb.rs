use super::{Matrix4f, Point3, Vector3f, TOLERANCE};

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Aabb {
    /// Computes the bounding box of a set of points, or `None` if the set is empty.
    #[must_use]
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut aabb = Self {
            min: first,
            max: first,
        };
        for p in iter {
            aabb.min = aabb.min.inf(p);
            aabb.max = aabb.max.sup(p);
        }
        Some(aabb)
    }

    /// Center of the box.
    #[must_use]
    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.min, &self.max)
    }

    /// Length of the longest side.
    #[must_use]
    pub fn max_extent(&self) -> f64 {
        (self.max - self.min).max()
    }

    /// Model matrix that centers the box at the origin and scales its longest
    /// side to 2, so the geometry fits in `[-1, 1]^3`.
    ///
    /// A box with no extent (single point) is only translated.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn normalizing_transform(&self) -> Matrix4f {
        let extent = self.max_extent();
        let scale = if extent > TOLERANCE { 2.0 / extent } else { 1.0 };
        let center = self.center();
        let translation = Vector3f::new(-center.x as f32, -center.y as f32, -center.z as f32);
        Matrix4f::new_scaling(scale as f32) * Matrix4f::new_translation(&translation)
    }
}

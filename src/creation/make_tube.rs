use std::f64::consts::TAU;

use crate::error::{Result, TopologyError};
use crate::math::Point3;
use crate::topology::SurfaceMesh;

/// Creates an open cylindrical tube around the Z axis.
///
/// The tube has `rings + 1` vertex rings of `segments` vertices each; ring
/// `r` holds handles `r * segments..(r + 1) * segments`. The first and last
/// rings are the two boundary loops, which makes a seam from one rim to the
/// other a closed cut.
pub struct MakeTube {
    radius: f64,
    height: f64,
    segments: u32,
    rings: u32,
}

impl MakeTube {
    /// Creates a new `MakeTube` operation.
    #[must_use]
    pub fn new(radius: f64, height: f64, segments: u32, rings: u32) -> Self {
        Self {
            radius,
            height,
            segments,
            rings,
        }
    }

    /// Executes the operation, building the tube mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if there are fewer than 3 segments, no rings, or a
    /// non-positive radius or height.
    pub fn execute(&self) -> Result<SurfaceMesh> {
        if self.segments < 3 || self.rings == 0 {
            return Err(TopologyError::InvalidInput(format!(
                "tube needs at least 3 segments and 1 ring, got {} and {}",
                self.segments, self.rings
            ))
            .into());
        }
        if self.radius.is_nan() || self.radius <= 0.0 || self.height.is_nan() || self.height <= 0.0
        {
            return Err(TopologyError::InvalidInput(
                "tube radius and height must be positive".into(),
            )
            .into());
        }

        let s = self.segments;
        let mut positions = Vec::with_capacity(s as usize * (self.rings as usize + 1));
        for r in 0..=self.rings {
            let z = self.height * f64::from(r) / f64::from(self.rings);
            for k in 0..s {
                let angle = TAU * f64::from(k) / f64::from(s);
                positions.push(Point3::new(
                    self.radius * angle.cos(),
                    self.radius * angle.sin(),
                    z,
                ));
            }
        }

        let mut triangles = Vec::with_capacity(s as usize * self.rings as usize * 2);
        for r in 0..self.rings {
            for k in 0..s {
                let a = r * s + k;
                let b = r * s + (k + 1) % s;
                let c = a + s;
                let d = b + s;
                triangles.push([a, b, d]);
                triangles.push([a, d, c]);
            }
        }

        Ok(SurfaceMesh::from_triangles(positions, &triangles)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::topology::VertexId;

    #[test]
    fn tube_has_two_rims() {
        let mesh = MakeTube::new(1.0, 2.0, 8, 4).execute().unwrap();
        assert_eq!(mesh.vertex_count(), 40);
        assert_eq!(mesh.boundary_vertices().count(), 16);
        assert!(mesh.is_boundary(VertexId(0)).unwrap());
        assert!(!mesh.is_boundary(VertexId(8)).unwrap());
        assert!(mesh.is_boundary(VertexId(39)).unwrap());
    }

    #[test]
    fn rejects_degenerate_tube() {
        assert!(MakeTube::new(1.0, 1.0, 2, 1).execute().is_err());
        assert!(MakeTube::new(-1.0, 1.0, 6, 1).execute().is_err());
    }
}

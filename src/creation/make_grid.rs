use crate::error::{Result, TopologyError};
use crate::math::Point3;
use crate::topology::SurfaceMesh;

/// Creates a flat, open triangulated grid in the XY plane.
///
/// Vertex `(i, j)` has handle `j * (columns + 1) + i` and sits at
/// `(i * spacing, j * spacing, height(i, j))`. Every cell is split along the
/// same diagonal, so the rim vertices are the mesh boundary.
pub struct MakeGrid {
    columns: u32,
    rows: u32,
    spacing: f64,
    heights: Option<Vec<f64>>,
}

impl MakeGrid {
    /// Creates a new `MakeGrid` operation.
    #[must_use]
    pub fn new(columns: u32, rows: u32, spacing: f64) -> Self {
        Self {
            columns,
            rows,
            spacing,
            heights: None,
        }
    }

    /// Sets per-vertex z values, row-major, `(columns + 1) * (rows + 1)` entries.
    #[must_use]
    pub fn with_heights(mut self, heights: Vec<f64>) -> Self {
        self.heights = Some(heights);
        self
    }

    /// Executes the operation, building the grid mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if the grid has no cells, the spacing is not positive,
    /// or the height list has the wrong length.
    pub fn execute(&self) -> Result<SurfaceMesh> {
        if self.columns == 0 || self.rows == 0 {
            return Err(TopologyError::InvalidInput("grid needs at least one cell".into()).into());
        }
        if self.spacing.is_nan() || self.spacing <= 0.0 {
            return Err(TopologyError::InvalidInput(format!(
                "grid spacing must be positive, got {}",
                self.spacing
            ))
            .into());
        }

        let stride = self.columns + 1;
        let count = stride as usize * (self.rows as usize + 1);
        if let Some(heights) = &self.heights {
            if heights.len() != count {
                return Err(TopologyError::InvalidInput(format!(
                    "expected {count} heights, got {}",
                    heights.len()
                ))
                .into());
            }
        }

        let mut positions = Vec::with_capacity(count);
        for j in 0..=self.rows {
            for i in 0..=self.columns {
                let z = self
                    .heights
                    .as_ref()
                    .map_or(0.0, |h| h[(j * stride + i) as usize]);
                positions.push(Point3::new(
                    f64::from(i) * self.spacing,
                    f64::from(j) * self.spacing,
                    z,
                ));
            }
        }

        let mut triangles = Vec::with_capacity(self.columns as usize * self.rows as usize * 2);
        for j in 0..self.rows {
            for i in 0..self.columns {
                let a = j * stride + i;
                let b = a + 1;
                let c = a + stride;
                let d = c + 1;
                triangles.push([a, b, d]);
                triangles.push([a, d, c]);
            }
        }

        Ok(SurfaceMesh::from_triangles(positions, &triangles)?)
    }
}

//! Interface to the rendering collaborator.
//!
//! The core only talks to the GPU through [`RenderBackend`]. A GL backend maps
//! each call onto the matching GL state change or draw call; the bundled
//! [`SoftwareBackend`] rasterizes on the CPU for headless runs and tests.

pub mod shaders;
mod software;

pub use software::{SoftwareBackend, SoftwareMesh, SoftwarePoints};

use crate::error::RenderError;
use crate::math::{Matrix4f, Point3, Point3f, ScreenPoint, Vector3, Vector3f};
use crate::topology::SurfaceMesh;

/// RGBA color with components in `[0, 1]`.
pub type Color = [f32; 4];

/// How a mesh buffer is rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawMode {
    /// Filled triangles.
    #[default]
    Fill,
    /// Triangle edges only.
    Wireframe,
    /// One point sprite per vertex.
    Points,
}

/// Model, view and projection matrices for one draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraMatrices {
    pub model: Matrix4f,
    pub view: Matrix4f,
    pub projection: Matrix4f,
}

impl CameraMatrices {
    #[must_use]
    pub fn new(model: Matrix4f, view: Matrix4f, projection: Matrix4f) -> Self {
        Self {
            model,
            view,
            projection,
        }
    }

    /// Combined `projection * view * model` transform.
    #[must_use]
    pub fn model_view_projection(&self) -> Matrix4f {
        self.projection * self.view * self.model
    }

    /// Projects a model-space point to window coordinates (top-left origin).
    ///
    /// Returns `None` for points behind the camera or outside the depth range.
    #[must_use]
    pub fn project_to_window(&self, viewport: Viewport, point: &Point3f) -> Option<ScreenPoint> {
        let (x, y, _) = viewport.ndc_to_framebuffer(clip_to_ndc(
            &self.model_view_projection(),
            point,
        )?);
        #[allow(clippy::cast_precision_loss)]
        let height = viewport.height as f32;
        Some(ScreenPoint::new(x, height - y))
    }
}

impl Default for CameraMatrices {
    fn default() -> Self {
        Self::new(
            Matrix4f::identity(),
            Matrix4f::identity(),
            Matrix4f::identity(),
        )
    }
}

/// Transforms a point to normalized device coordinates, or `None` if it is
/// clipped by the camera plane or the near/far range.
pub(crate) fn clip_to_ndc(mvp: &Matrix4f, point: &Point3f) -> Option<Point3f> {
    let clip = mvp * point.to_homogeneous();
    if clip.w <= f32::EPSILON {
        return None;
    }
    let ndc = Point3f::new(clip.x / clip.w, clip.y / clip.w, clip.z / clip.w);
    (-1.0..=1.0).contains(&ndc.z).then_some(ndc)
}

/// Lighting uniforms of the Phong program.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub light_position: Point3f,
    pub light_color: [f32; 3],
    pub view_position: Point3f,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            light_position: Point3f::new(2.2, 1.0, 2.0),
            light_color: [1.0, 1.0, 1.0],
            view_position: Point3f::new(0.0, 0.0, -2.0),
        }
    }
}

/// Shader programs known to the core, with their uniforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Program {
    /// Flat uniform color.
    Solid { color: Color },
    /// Uniform color, point sprites cut to a disc.
    RoundPoint { color: Color },
    /// Writes `vertex index + 1` into the RGB bytes.
    VertexId,
    /// Lit surface shading.
    Phong { color: Color, lighting: Lighting },
}

impl Program {
    /// GLSL sources a GL backend compiles for this program.
    #[must_use]
    pub fn sources(&self) -> shaders::ShaderSources {
        match self {
            Self::Solid { .. } => shaders::SOLID,
            Self::RoundPoint { .. } => shaders::ROUND_POINT,
            Self::VertexId => shaders::VERTEX_ID,
            Self::Phong { .. } => shaders::PHONG,
        }
    }
}

/// The framebuffer region drawn into, origin at the bottom-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Maps a window position (top-left origin) to the framebuffer pixel
    /// under it (bottom-left origin), or `None` outside the viewport.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn window_to_pixel(&self, position: ScreenPoint) -> Option<(u32, u32)> {
        if !position.x.is_finite() || !position.y.is_finite() {
            return None;
        }
        let column = position.x.floor();
        let row = position.y.floor();
        if column < 0.0 || row < 0.0 {
            return None;
        }
        let (column, row) = (column as u64, row as u64);
        if column >= u64::from(self.width) || row >= u64::from(self.height) {
            return None;
        }
        Some((column as u32, self.height - 1 - row as u32))
    }

    /// Maps normalized device coordinates to framebuffer coordinates and
    /// window depth in `[0, 1]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ndc_to_framebuffer(&self, ndc: Point3f) -> (f32, f32, f32) {
        (
            (ndc.x + 1.0) * 0.5 * self.width as f32,
            (ndc.y + 1.0) * 0.5 * self.height as f32,
            (ndc.z + 1.0) * 0.5,
        )
    }
}

/// Interleaved vertex layout of an uploaded mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpuVertex {
    pub position: Point3f,
    pub normal: Vector3f,
}

/// Information a backend's mesh buffer exposes to the core.
pub trait GpuMesh {
    /// Number of vertices in the buffer.
    fn vertex_count(&self) -> usize;
}

/// The drawing operations the core needs from a GPU.
///
/// All calls are synchronous. [`RenderBackend::read_pixel_blocking`] stalls
/// until every previously issued draw has finished.
pub trait RenderBackend {
    /// Static mesh buffer.
    type MeshBuffer: GpuMesh;
    /// Dynamic point-set buffer.
    type PointBuffer;

    /// Uploads a mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if the indices do not form triangles over `vertices`
    /// or the buffer cannot be created.
    fn create_mesh_buffer(
        &mut self,
        vertices: &[GpuVertex],
        indices: &[u32],
    ) -> Result<Self::MeshBuffer, RenderError>;

    /// Creates a dynamic point buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer cannot be created.
    fn create_point_buffer(&mut self, points: &[Point3f]) -> Result<Self::PointBuffer, RenderError>;

    /// Replaces the contents of a point buffer.
    fn update_point_buffer(&mut self, buffer: &mut Self::PointBuffer, points: &[Point3f]);

    /// Binds a program and sets its transform and color uniforms.
    fn use_program(&mut self, program: &Program, camera: &CameraMatrices);

    fn draw_mesh(&mut self, mesh: &Self::MeshBuffer, mode: DrawMode);

    /// Draws every point of the buffer as a point sprite.
    fn draw_points(&mut self, buffer: &Self::PointBuffer);

    /// Draws the buffer as a connected line strip.
    fn draw_line_strip(&mut self, buffer: &Self::PointBuffer);

    fn multisample_enabled(&self) -> bool;

    fn set_multisample(&mut self, enabled: bool);

    /// Enables or disables writes to all color channels.
    fn set_color_write(&mut self, enabled: bool);

    /// Enables or disables depth buffer writes.
    fn set_depth_write(&mut self, enabled: bool);

    fn set_point_size(&mut self, size: f32);

    /// Clears color to `color` and depth to the far plane.
    fn clear(&mut self, color: Color);

    fn viewport(&self) -> Viewport;

    /// Reads one RGBA pixel of the current framebuffer, bottom-left origin.
    ///
    /// # Errors
    ///
    /// Returns an error if the pixel lies outside the framebuffer.
    fn read_pixel_blocking(&mut self, x: u32, y: u32) -> Result<[u8; 4], RenderError>;
}

/// Checks that `indices` describe whole triangles over `vertex_count` vertices.
///
/// # Errors
///
/// Returns an error on a partial triangle or an out-of-range index.
pub fn validate_triangle_indices(vertex_count: usize, indices: &[u32]) -> Result<(), RenderError> {
    if indices.len() % 3 != 0 {
        return Err(RenderError::IndexCountNotTriangles(indices.len()));
    }
    if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(RenderError::IndexOutOfBounds {
            index,
            count: vertex_count,
        });
    }
    Ok(())
}

/// Converts a mesh position to single precision.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn to_gpu_point(p: &Point3) -> Point3f {
    Point3f::new(p.x as f32, p.y as f32, p.z as f32)
}

#[allow(clippy::cast_possible_truncation)]
fn to_gpu_vector(v: &Vector3) -> Vector3f {
    Vector3f::new(v.x as f32, v.y as f32, v.z as f32)
}

/// Interleaved vertices of `mesh` with area-weighted normals.
#[must_use]
pub fn gpu_vertices(mesh: &SurfaceMesh) -> Vec<GpuVertex> {
    mesh.vertices()
        .zip(mesh.vertex_normals())
        .filter_map(|(v, normal)| {
            mesh.point(v).ok().map(|p| GpuVertex {
                position: to_gpu_point(&p),
                normal: to_gpu_vector(&normal),
            })
        })
        .collect()
}

/// Uploads `mesh` to the backend.
///
/// # Errors
///
/// Returns an error if the backend cannot create the buffer.
pub fn upload_mesh<B: RenderBackend>(
    backend: &mut B,
    mesh: &SurfaceMesh,
) -> Result<B::MeshBuffer, RenderError> {
    backend.create_mesh_buffer(&gpu_vertices(mesh), &mesh.triangle_indices())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn window_to_pixel_flips_rows() {
        let viewport = Viewport {
            width: 100,
            height: 50,
        };
        assert_eq!(
            viewport.window_to_pixel(ScreenPoint::new(0.2, 0.7)),
            Some((0, 49))
        );
        assert_eq!(
            viewport.window_to_pixel(ScreenPoint::new(99.9, 49.5)),
            Some((99, 0))
        );
        assert_eq!(viewport.window_to_pixel(ScreenPoint::new(100.0, 10.0)), None);
        assert_eq!(viewport.window_to_pixel(ScreenPoint::new(5.0, -0.5)), None);
        assert_eq!(
            viewport.window_to_pixel(ScreenPoint::new(f32::NAN, 1.0)),
            None
        );
    }

    #[test]
    fn projection_round_trips_through_pixel_lookup() {
        let viewport = Viewport {
            width: 64,
            height: 32,
        };
        let camera = CameraMatrices::default();
        let window = camera
            .project_to_window(viewport, &Point3f::new(0.5, -0.5, 0.0))
            .unwrap();
        assert_relative_eq!(window.x, 48.0);
        assert_relative_eq!(window.y, 24.0);
        // Framebuffer y = 8.0 sits on a row border and resolves to row 7.
        assert_eq!(viewport.window_to_pixel(window), Some((48, 7)));
    }

    #[test]
    fn points_behind_far_plane_are_clipped() {
        let camera = CameraMatrices::default();
        let viewport = Viewport {
            width: 8,
            height: 8,
        };
        assert!(camera
            .project_to_window(viewport, &Point3f::new(0.0, 0.0, 2.0))
            .is_none());
    }

    #[test]
    fn index_validation() {
        assert!(validate_triangle_indices(3, &[0, 1, 2]).is_ok());
        assert!(matches!(
            validate_triangle_indices(3, &[0, 1]),
            Err(RenderError::IndexCountNotTriangles(2))
        ));
        assert!(matches!(
            validate_triangle_indices(3, &[0, 1, 3]),
            Err(RenderError::IndexOutOfBounds { index: 3, count: 3 })
        ));
    }

    #[test]
    fn every_program_has_sources() {
        let programs = [
            Program::Solid { color: [1.0; 4] },
            Program::RoundPoint { color: [1.0; 4] },
            Program::VertexId,
            Program::Phong {
                color: [1.0; 4],
                lighting: Lighting::default(),
            },
        ];
        for program in programs {
            let sources = program.sources();
            assert!(sources.vertex.starts_with("#version 330 core"));
            assert!(sources.fragment.starts_with("#version 330 core"));
        }
    }
}

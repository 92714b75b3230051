use tracing::trace;

use crate::error::{PickError, RenderError};
use crate::math::{Point3f, ScreenPoint};
use crate::render::{
    to_gpu_point, CameraMatrices, Color, DrawMode, GpuMesh, Program, RenderBackend,
};
use crate::topology::{SurfaceMesh, VertexId};

use super::color_id::{decode_vertex_id, MAX_PICKABLE_VERTICES};

/// Clear color of the pick pass; decodes to "no vertex".
const PICK_CLEAR_COLOR: Color = [0.0, 0.0, 0.0, 0.0];

/// Parameters controlling vertex picking and the hover highlight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickerConfig {
    /// Point sprite size of the id pass, in pixels.
    pub point_size: f32,
    /// Color of the hovered-vertex marker.
    pub highlight_color: Color,
    /// Size of the hovered-vertex marker, in pixels.
    pub highlight_point_size: f32,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            point_size: 15.0,
            highlight_color: [1.0, 0.0, 0.0, 1.0],
            highlight_point_size: 15.0,
        }
    }
}

/// Finds the vertex under the pointer by rendering vertex ids as colors.
///
/// Owns the hovered-vertex state and the one-point buffer used to highlight it.
pub struct VertexPicker<B: RenderBackend> {
    config: PickerConfig,
    hovered: Option<VertexId>,
    highlight: B::PointBuffer,
}

impl<B: RenderBackend> VertexPicker<B> {
    /// Creates a picker and its highlight buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot create the point buffer.
    pub fn new(backend: &mut B, config: PickerConfig) -> Result<Self, RenderError> {
        let highlight = backend.create_point_buffer(&[Point3f::origin()])?;
        Ok(Self {
            config,
            hovered: None,
            highlight,
        })
    }

    /// Result of the last pick.
    #[must_use]
    pub fn hovered(&self) -> Option<VertexId> {
        self.hovered
    }

    /// Forgets the hovered vertex, e.g. when the pointer leaves the viewport.
    pub fn clear_hovered(&mut self) {
        self.hovered = None;
    }

    /// Returns the vertex drawn at window position `position`, if any.
    ///
    /// Draws into the backend's current framebuffer: a depth-only pass of the
    /// filled mesh, then every vertex as an id-colored point, then one pixel
    /// is read back. The multisample state is restored on every path. A
    /// position outside the viewport yields `None` without drawing. The
    /// hovered vertex is replaced by the result, and cleared on failure.
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh has more vertices than the color encoding
    /// can address, or if the pixel read fails.
    pub fn pick(
        &mut self,
        backend: &mut B,
        position: ScreenPoint,
        mesh: &B::MeshBuffer,
        camera: &CameraMatrices,
    ) -> Result<Option<VertexId>, PickError> {
        let vertex_count = mesh.vertex_count();
        if vertex_count > MAX_PICKABLE_VERTICES {
            self.hovered = None;
            return Err(PickError::TooManyVertices(vertex_count));
        }

        let multisample = backend.multisample_enabled();
        backend.set_multisample(false);
        let result = self.render_and_read(backend, position, mesh, camera);
        backend.set_multisample(multisample);

        self.hovered = result.as_ref().ok().copied().flatten();
        let picked = result?;
        trace!(x = position.x, y = position.y, vertex = ?picked, "picked");
        Ok(picked)
    }

    fn render_and_read(
        &self,
        backend: &mut B,
        position: ScreenPoint,
        mesh: &B::MeshBuffer,
        camera: &CameraMatrices,
    ) -> Result<Option<VertexId>, PickError> {
        let Some((x, y)) = backend.viewport().window_to_pixel(position) else {
            return Ok(None);
        };

        backend.clear(PICK_CLEAR_COLOR);

        // Depth only, so points behind the surface are occluded.
        backend.use_program(
            &Program::Solid {
                color: PICK_CLEAR_COLOR,
            },
            camera,
        );
        backend.set_color_write(false);
        backend.draw_mesh(mesh, DrawMode::Fill);
        backend.set_color_write(true);

        backend.use_program(&Program::VertexId, camera);
        backend.set_point_size(self.config.point_size);
        backend.draw_mesh(mesh, DrawMode::Points);

        let pixel = backend.read_pixel_blocking(x, y)?;
        Ok(decode_vertex_id(pixel, mesh.vertex_count()))
    }

    /// Draws a marker on the hovered vertex.
    ///
    /// With nothing hovered the marker buffer is still updated (to the origin)
    /// and drawn, with color and depth writes masked so nothing changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the hovered vertex is not a vertex of `mesh`.
    pub fn highlight_hovered_vertex(
        &mut self,
        backend: &mut B,
        mesh: &SurfaceMesh,
        camera: &CameraMatrices,
    ) -> Result<(), PickError> {
        let position = match self.hovered {
            Some(v) => to_gpu_point(&mesh.point(v)?),
            None => Point3f::origin(),
        };
        backend.update_point_buffer(&mut self.highlight, &[position]);

        backend.use_program(
            &Program::RoundPoint {
                color: self.config.highlight_color,
            },
            camera,
        );
        backend.set_point_size(self.config.highlight_point_size);

        if self.hovered.is_some() {
            backend.draw_points(&self.highlight);
        } else {
            backend.set_color_write(false);
            backend.set_depth_write(false);
            backend.draw_points(&self.highlight);
            backend.set_depth_write(true);
            backend.set_color_write(true);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::creation::MakeGrid;
    use crate::math::{Matrix4f, Point3};
    use crate::render::{
        upload_mesh, GpuVertex, SoftwareBackend, SoftwareMesh, SoftwarePoints, Viewport,
    };

    /// Mesh buffer that can claim more vertices than it holds.
    struct OversizedMesh {
        inner: SoftwareMesh,
        vertex_count: usize,
    }

    impl GpuMesh for OversizedMesh {
        fn vertex_count(&self) -> usize {
            self.vertex_count
        }
    }

    /// Software backend whose pixel reads can be made to fail.
    struct FailingReads {
        inner: SoftwareBackend,
        fail_reads: bool,
    }

    impl RenderBackend for FailingReads {
        type MeshBuffer = OversizedMesh;
        type PointBuffer = SoftwarePoints;

        fn create_mesh_buffer(
            &mut self,
            vertices: &[GpuVertex],
            indices: &[u32],
        ) -> Result<OversizedMesh, RenderError> {
            let inner = self.inner.create_mesh_buffer(vertices, indices)?;
            Ok(OversizedMesh {
                vertex_count: inner.vertex_count(),
                inner,
            })
        }

        fn create_point_buffer(&mut self, points: &[Point3f]) -> Result<SoftwarePoints, RenderError> {
            self.inner.create_point_buffer(points)
        }

        fn update_point_buffer(&mut self, buffer: &mut SoftwarePoints, points: &[Point3f]) {
            self.inner.update_point_buffer(buffer, points);
        }

        fn use_program(&mut self, program: &Program, camera: &CameraMatrices) {
            self.inner.use_program(program, camera);
        }

        fn draw_mesh(&mut self, mesh: &OversizedMesh, mode: DrawMode) {
            self.inner.draw_mesh(&mesh.inner, mode);
        }

        fn draw_points(&mut self, buffer: &SoftwarePoints) {
            self.inner.draw_points(buffer);
        }

        fn draw_line_strip(&mut self, buffer: &SoftwarePoints) {
            self.inner.draw_line_strip(buffer);
        }

        fn multisample_enabled(&self) -> bool {
            self.inner.multisample_enabled()
        }

        fn set_multisample(&mut self, enabled: bool) {
            self.inner.set_multisample(enabled);
        }

        fn set_color_write(&mut self, enabled: bool) {
            self.inner.set_color_write(enabled);
        }

        fn set_depth_write(&mut self, enabled: bool) {
            self.inner.set_depth_write(enabled);
        }

        fn set_point_size(&mut self, size: f32) {
            self.inner.set_point_size(size);
        }

        fn clear(&mut self, color: Color) {
            self.inner.clear(color);
        }

        fn viewport(&self) -> Viewport {
            self.inner.viewport()
        }

        fn read_pixel_blocking(&mut self, x: u32, y: u32) -> Result<[u8; 4], RenderError> {
            if self.fail_reads {
                let Viewport { width, height } = self.inner.viewport();
                return Err(RenderError::PixelOutOfBounds {
                    x,
                    y,
                    width,
                    height,
                });
            }
            self.inner.read_pixel_blocking(x, y)
        }
    }

    fn failing_backend() -> FailingReads {
        FailingReads {
            inner: SoftwareBackend::new(200, 200).unwrap(),
            fail_reads: false,
        }
    }

    /// 4x4-cell grid normalized into [-1, 1]^2, viewed head-on.
    fn scene() -> (SurfaceMesh, CameraMatrices) {
        let mesh = MakeGrid::new(4, 4, 1.0).execute().unwrap();
        let model = mesh.bounding_box().unwrap().normalizing_transform();
        // Shrink a little so rim vertices are not on the framebuffer edge.
        let view = Matrix4f::new_scaling(0.8);
        (mesh, CameraMatrices::new(model, view, Matrix4f::identity()))
    }

    fn window_position(
        camera: &CameraMatrices,
        viewport: Viewport,
        mesh: &SurfaceMesh,
        v: VertexId,
    ) -> ScreenPoint {
        camera
            .project_to_window(viewport, &to_gpu_point(&mesh.point(v).unwrap()))
            .unwrap()
    }

    #[test]
    fn picks_vertex_under_pointer() {
        let (mesh, camera) = scene();
        let mut backend = SoftwareBackend::new(200, 200).unwrap();
        let gpu = upload_mesh(&mut backend, &mesh).unwrap();
        let mut picker = VertexPicker::new(&mut backend, PickerConfig::default()).unwrap();
        let viewport = backend.viewport();

        for v in [VertexId(0), VertexId(6), VertexId(12), VertexId(24)] {
            let at = window_position(&camera, viewport, &mesh, v);
            let picked = picker.pick(&mut backend, at, &gpu, &camera).unwrap();
            assert_eq!(picked, Some(v));
            assert_eq!(picker.hovered(), Some(v));
        }
    }

    #[test]
    fn background_picks_nothing() {
        let (mesh, camera) = scene();
        let mut backend = SoftwareBackend::new(200, 200).unwrap();
        let gpu = upload_mesh(&mut backend, &mesh).unwrap();
        let mut picker = VertexPicker::new(&mut backend, PickerConfig::default()).unwrap();

        let picked = picker
            .pick(&mut backend, ScreenPoint::new(2.0, 2.0), &gpu, &camera)
            .unwrap();
        assert_eq!(picked, None);

        // Between vertices, on the surface but outside every point sprite.
        let a = window_position(&camera, backend.viewport(), &mesh, VertexId(6));
        let b = window_position(&camera, backend.viewport(), &mesh, VertexId(7));
        let mid = ScreenPoint::new((a.x + b.x) * 0.5, (a.y + b.y) * 0.5);
        assert_eq!(picker.pick(&mut backend, mid, &gpu, &camera).unwrap(), None);
    }

    #[test]
    fn occluded_vertex_is_not_picked() {
        // A small quad in front of the grid's center vertex (12).
        let mut positions: Vec<Point3> = MakeGrid::new(4, 4, 1.0)
            .execute()
            .unwrap()
            .vertices()
            .map(|v| Point3::new(f64::from(v.0 % 5) - 2.0, f64::from(v.0 / 5) - 2.0, 0.0))
            .collect();
        let base = u32::try_from(positions.len()).unwrap();
        positions.extend([
            Point3::new(-0.7, -0.7, -0.5),
            Point3::new(0.7, -0.7, -0.5),
            Point3::new(0.7, 0.7, -0.5),
            Point3::new(-0.7, 0.7, -0.5),
        ]);
        let mut triangles = Vec::new();
        for j in 0..4 {
            for i in 0..4 {
                let a = j * 5 + i;
                triangles.push([a, a + 1, a + 6]);
                triangles.push([a, a + 6, a + 5]);
            }
        }
        triangles.push([base, base + 1, base + 2]);
        triangles.push([base, base + 2, base + 3]);
        let mesh = SurfaceMesh::from_triangles(positions, &triangles).unwrap();

        // Orthographic camera looking down -z, nearer z is smaller depth.
        let projection = Matrix4f::new_nonuniform_scaling(&crate::math::Vector3f::new(
            0.4, 0.4, 0.5,
        ));
        let camera = CameraMatrices::new(Matrix4f::identity(), Matrix4f::identity(), projection);

        let mut backend = SoftwareBackend::new(100, 100).unwrap();
        let gpu = upload_mesh(&mut backend, &mesh).unwrap();
        let mut picker = VertexPicker::new(&mut backend, PickerConfig::default()).unwrap();

        // Vertex 12 sits at the origin, hidden behind the quad's interior.
        let at = window_position(&camera, backend.viewport(), &mesh, VertexId(12));
        let picked = picker.pick(&mut backend, at, &gpu, &camera).unwrap();
        assert_ne!(picked, Some(VertexId(12)));
        assert_eq!(picked, None);

        // A corner of the occluding quad is itself pickable.
        let corner = window_position(&camera, backend.viewport(), &mesh, VertexId(base + 2));
        let picked = picker.pick(&mut backend, corner, &gpu, &camera).unwrap();
        assert_eq!(picked, Some(VertexId(base + 2)));
    }

    #[test]
    fn restores_multisample_and_skips_outside_viewport() {
        let (mesh, camera) = scene();
        let mut backend = SoftwareBackend::new(64, 64).unwrap();
        let gpu = upload_mesh(&mut backend, &mesh).unwrap();
        let mut picker = VertexPicker::new(&mut backend, PickerConfig::default()).unwrap();

        assert!(backend.multisample_enabled());
        picker
            .pick(&mut backend, ScreenPoint::new(10.0, 10.0), &gpu, &camera)
            .unwrap();
        assert!(backend.multisample_enabled());
        assert_eq!(backend.pixel_reads(), 1);

        backend.set_multisample(false);
        let picked = picker
            .pick(&mut backend, ScreenPoint::new(-3.0, 500.0), &gpu, &camera)
            .unwrap();
        assert_eq!(picked, None);
        assert!(!backend.multisample_enabled());
        assert_eq!(backend.pixel_reads(), 1);
    }

    #[test]
    fn highlight_without_hover_changes_nothing() {
        let (mesh, camera) = scene();
        let mut backend = SoftwareBackend::new(64, 64).unwrap();
        let mut picker = VertexPicker::new(&mut backend, PickerConfig::default()).unwrap();

        backend.clear([1.0, 1.0, 1.0, 1.0]);
        picker
            .highlight_hovered_vertex(&mut backend, &mesh, &camera)
            .unwrap();
        // The origin marker would land near framebuffer (6, 6).
        assert_eq!(backend.pixel(6, 6), Some([255, 255, 255, 255]));
        assert!(backend.color_write_enabled());
        assert!(backend.depth_write_enabled());
    }

    #[test]
    fn highlight_marks_hovered_vertex() {
        let (mesh, camera) = scene();
        let mut backend = SoftwareBackend::new(200, 200).unwrap();
        let gpu = upload_mesh(&mut backend, &mesh).unwrap();
        let mut picker = VertexPicker::new(&mut backend, PickerConfig::default()).unwrap();

        let at = window_position(&camera, backend.viewport(), &mesh, VertexId(12));
        picker.pick(&mut backend, at, &gpu, &camera).unwrap();

        backend.clear([1.0, 1.0, 1.0, 1.0]);
        picker
            .highlight_hovered_vertex(&mut backend, &mesh, &camera)
            .unwrap();
        let (x, y) = backend.viewport().window_to_pixel(at).unwrap();
        assert_eq!(backend.pixel(x, y), Some([255, 0, 0, 255]));
    }

    #[test]
    fn failed_read_clears_hover_and_restores_multisample() {
        let (mesh, camera) = scene();
        let mut backend = failing_backend();
        let gpu = upload_mesh(&mut backend, &mesh).unwrap();
        let mut picker = VertexPicker::new(&mut backend, PickerConfig::default()).unwrap();

        let at = window_position(&camera, backend.viewport(), &mesh, VertexId(12));
        assert_eq!(
            picker.pick(&mut backend, at, &gpu, &camera).unwrap(),
            Some(VertexId(12))
        );

        backend.fail_reads = true;
        let result = picker.pick(&mut backend, at, &gpu, &camera);
        assert!(matches!(
            result,
            Err(PickError::Render(RenderError::PixelOutOfBounds { .. }))
        ));
        assert_eq!(picker.hovered(), None);
        assert!(backend.multisample_enabled());
    }

    #[test]
    fn refuses_meshes_beyond_the_id_range() {
        let (mesh, camera) = scene();
        let mut backend = failing_backend();
        let mut gpu = upload_mesh(&mut backend, &mesh).unwrap();
        let mut picker = VertexPicker::new(&mut backend, PickerConfig::default()).unwrap();

        let at = window_position(&camera, backend.viewport(), &mesh, VertexId(12));
        picker.pick(&mut backend, at, &gpu, &camera).unwrap();
        assert_eq!(picker.hovered(), Some(VertexId(12)));

        gpu.vertex_count = MAX_PICKABLE_VERTICES + 1;
        let reads = backend.inner.pixel_reads();
        let result = picker.pick(&mut backend, at, &gpu, &camera);
        assert!(matches!(
            result,
            Err(PickError::TooManyVertices(n)) if n == MAX_PICKABLE_VERTICES + 1
        ));
        assert_eq!(picker.hovered(), None);
        assert_eq!(backend.inner.pixel_reads(), reads);
        assert!(backend.multisample_enabled());

    }
}

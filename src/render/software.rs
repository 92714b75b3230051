use crate::error::RenderError;
use crate::math::{Matrix4f, Point3f};
use crate::picking::encode_vertex_index;

use super::{
    clip_to_ndc, validate_triangle_indices, CameraMatrices, Color, DrawMode, GpuMesh, GpuVertex,
    Program, RenderBackend, Viewport,
};

/// Depth slack for points and lines drawn on top of filled triangles.
const OVERLAY_DEPTH_BIAS: f32 = 1e-3;

/// Mesh buffer of the [`SoftwareBackend`].
#[derive(Debug, Clone)]
pub struct SoftwareMesh {
    positions: Vec<Point3f>,
    indices: Vec<u32>,
}

impl GpuMesh for SoftwareMesh {
    fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

/// Point buffer of the [`SoftwareBackend`].
#[derive(Debug, Clone, Default)]
pub struct SoftwarePoints {
    points: Vec<Point3f>,
}

/// A projected vertex: framebuffer x, y, window depth, and the index that the
/// vertex-id program encodes.
#[derive(Debug, Clone, Copy)]
struct Projected {
    x: f32,
    y: f32,
    depth: f32,
    index: u32,
}

/// CPU rasterizer implementing [`RenderBackend`].
///
/// No anti-aliasing, no blending, no lighting: every program writes its
/// uniform color, except the vertex-id program, which writes the encoded
/// index of the vertex (the last corner for triangles, like GL's default
/// provoking vertex). Triangles use a strict less-than depth test; points and
/// lines pass within [`OVERLAY_DEPTH_BIAS`] of the stored depth so they show
/// on the surface they belong to.
#[derive(Debug, Clone)]
pub struct SoftwareBackend {
    viewport: Viewport,
    color: Vec<[u8; 4]>,
    depth: Vec<f32>,
    multisample: bool,
    color_write: bool,
    depth_write: bool,
    point_size: f32,
    program: Program,
    mvp: Matrix4f,
    pixel_reads: usize,
}

impl SoftwareBackend {
    /// Creates a cleared `width` x `height` framebuffer.
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is zero.
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyViewport { width, height });
        }
        let len = width as usize * height as usize;
        Ok(Self {
            viewport: Viewport { width, height },
            color: vec![[0; 4]; len],
            depth: vec![1.0; len],
            multisample: true,
            color_write: true,
            depth_write: true,
            point_size: 1.0,
            program: Program::Solid {
                color: [1.0, 1.0, 1.0, 1.0],
            },
            mvp: Matrix4f::identity(),
            pixel_reads: 0,
        })
    }

    /// Pixel color without counting as a readback, bottom-left origin.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.offset(i64::from(x), i64::from(y))
            .map(|i| self.color[i])
    }

    /// Number of blocking pixel reads issued so far.
    #[must_use]
    pub fn pixel_reads(&self) -> usize {
        self.pixel_reads
    }

    /// Whether color writes are currently enabled.
    #[must_use]
    pub fn color_write_enabled(&self) -> bool {
        self.color_write
    }

    /// Whether depth writes are currently enabled.
    #[must_use]
    pub fn depth_write_enabled(&self) -> bool {
        self.depth_write
    }

    fn offset(&self, x: i64, y: i64) -> Option<usize> {
        let width = i64::from(self.viewport.width);
        let height = i64::from(self.viewport.height);
        if x < 0 || y < 0 || x >= width || y >= height {
            return None;
        }
        usize::try_from(y * width + x).ok()
    }

    fn project(&self, point: &Point3f, index: u32) -> Option<Projected> {
        let ndc = clip_to_ndc(&self.mvp, point)?;
        let (x, y, depth) = self.viewport.ndc_to_framebuffer(ndc);
        Some(Projected { x, y, depth, index })
    }

    fn fragment_color(&self, index: u32) -> [u8; 4] {
        match self.program {
            Program::Solid { color }
            | Program::RoundPoint { color }
            | Program::Phong { color, .. } => color_to_bytes(color),
            Program::VertexId => encode_vertex_index(index),
        }
    }

    fn write_fragment(&mut self, x: i64, y: i64, depth: f32, bias: f32, color: [u8; 4]) {
        let Some(i) = self.offset(x, y) else {
            return;
        };
        if depth >= self.depth[i] + bias {
            return;
        }
        if self.depth_write {
            self.depth[i] = depth;
        }
        if self.color_write {
            self.color[i] = color;
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::many_single_char_names)]
    fn fill_triangle(&mut self, a: Projected, b: Projected, c: Projected) {
        let area = edge(a.x, a.y, b.x, b.y, c.x, c.y);
        if area.abs() <= f32::EPSILON {
            return;
        }
        let color = self.fragment_color(c.index);
        let min_x = a.x.min(b.x).min(c.x).floor().max(0.0) as i64;
        let min_y = a.y.min(b.y).min(c.y).floor().max(0.0) as i64;
        let max_x = a.x.max(b.x).max(c.x).ceil() as i64;
        let max_y = a.y.max(b.y).max(c.y).ceil() as i64;
        let max_x = max_x.min(i64::from(self.viewport.width) - 1);
        let max_y = max_y.min(i64::from(self.viewport.height) - 1);

        for py in min_y..=max_y {
            for px in min_x..=max_x {
                let (sx, sy) = pixel_center(px, py);
                let w0 = edge(b.x, b.y, c.x, c.y, sx, sy) / area;
                let w1 = edge(c.x, c.y, a.x, a.y, sx, sy) / area;
                let w2 = edge(a.x, a.y, b.x, b.y, sx, sy) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }
                let depth = w0 * a.depth + w1 * b.depth + w2 * c.depth;
                self.write_fragment(px, py, depth, 0.0, color);
            }
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn draw_line(&mut self, a: Projected, b: Projected) {
        let color = self.fragment_color(b.index);
        let steps = (b.x - a.x).abs().max((b.y - a.y).abs()).ceil().max(1.0) as u32;
        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            let x = a.x + (b.x - a.x) * t;
            let y = a.y + (b.y - a.y) * t;
            let depth = a.depth + (b.depth - a.depth) * t;
            self.write_fragment(
                x.floor() as i64,
                y.floor() as i64,
                depth,
                OVERLAY_DEPTH_BIAS,
                color,
            );
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn draw_point(&mut self, p: Projected) {
        let half = self.point_size * 0.5;
        let round = matches!(self.program, Program::RoundPoint { .. });
        let color = self.fragment_color(p.index);
        let min_x = (p.x - half).floor() as i64;
        let max_x = (p.x + half).ceil() as i64;
        let min_y = (p.y - half).floor() as i64;
        let max_y = (p.y + half).ceil() as i64;

        for py in min_y..=max_y {
            for px in min_x..=max_x {
                let (sx, sy) = pixel_center(px, py);
                let (dx, dy) = (sx - p.x, sy - p.y);
                let inside = if round {
                    dx * dx + dy * dy <= half * half
                } else {
                    dx >= -half && dx < half && dy >= -half && dy < half
                };
                if inside {
                    self.write_fragment(px, py, p.depth, OVERLAY_DEPTH_BIAS, color);
                }
            }
        }
    }

    fn project_indexed(&self, positions: &[Point3f], index: u32) -> Option<Projected> {
        positions
            .get(index as usize)
            .and_then(|p| self.project(p, index))
    }
}

impl RenderBackend for SoftwareBackend {
    type MeshBuffer = SoftwareMesh;
    type PointBuffer = SoftwarePoints;

    fn create_mesh_buffer(
        &mut self,
        vertices: &[GpuVertex],
        indices: &[u32],
    ) -> Result<SoftwareMesh, RenderError> {
        validate_triangle_indices(vertices.len(), indices)?;
        Ok(SoftwareMesh {
            positions: vertices.iter().map(|v| v.position).collect(),
            indices: indices.to_vec(),
        })
    }

    fn create_point_buffer(&mut self, points: &[Point3f]) -> Result<SoftwarePoints, RenderError> {
        Ok(SoftwarePoints {
            points: points.to_vec(),
        })
    }

    fn update_point_buffer(&mut self, buffer: &mut SoftwarePoints, points: &[Point3f]) {
        buffer.points.clear();
        buffer.points.extend_from_slice(points);
    }

    fn use_program(&mut self, program: &Program, camera: &CameraMatrices) {
        self.program = *program;
        self.mvp = camera.model_view_projection();
    }

    fn draw_mesh(&mut self, mesh: &SoftwareMesh, mode: DrawMode) {
        match mode {
            DrawMode::Fill => {
                for tri in mesh.indices.chunks_exact(3) {
                    let corners = [tri[0], tri[1], tri[2]]
                        .map(|i| self.project_indexed(&mesh.positions, i));
                    if let [Some(a), Some(b), Some(c)] = corners {
                        self.fill_triangle(a, b, c);
                    }
                }
            }
            DrawMode::Wireframe => {
                for tri in mesh.indices.chunks_exact(3) {
                    for k in 0..3 {
                        let a = self.project_indexed(&mesh.positions, tri[k]);
                        let b = self.project_indexed(&mesh.positions, tri[(k + 1) % 3]);
                        if let (Some(a), Some(b)) = (a, b) {
                            self.draw_line(a, b);
                        }
                    }
                }
            }
            DrawMode::Points => {
                for &i in &mesh.indices {
                    if let Some(p) = self.project_indexed(&mesh.positions, i) {
                        self.draw_point(p);
                    }
                }
            }
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn draw_points(&mut self, buffer: &SoftwarePoints) {
        for (i, point) in buffer.points.iter().enumerate() {
            if let Some(p) = self.project(point, i as u32) {
                self.draw_point(p);
            }
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn draw_line_strip(&mut self, buffer: &SoftwarePoints) {
        for (i, pair) in buffer.points.windows(2).enumerate() {
            let a = self.project(&pair[0], i as u32);
            let b = self.project(&pair[1], i as u32 + 1);
            if let (Some(a), Some(b)) = (a, b) {
                self.draw_line(a, b);
            }
        }
    }

    fn multisample_enabled(&self) -> bool {
        self.multisample
    }

    fn set_multisample(&mut self, enabled: bool) {
        self.multisample = enabled;
    }

    fn set_color_write(&mut self, enabled: bool) {
        self.color_write = enabled;
    }

    fn set_depth_write(&mut self, enabled: bool) {
        self.depth_write = enabled;
    }

    fn set_point_size(&mut self, size: f32) {
        self.point_size = size.max(0.0);
    }

    fn clear(&mut self, color: Color) {
        self.color.fill(color_to_bytes(color));
        self.depth.fill(1.0);
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn read_pixel_blocking(&mut self, x: u32, y: u32) -> Result<[u8; 4], RenderError> {
        self.pixel_reads += 1;
        self.pixel(x, y).ok_or(RenderError::PixelOutOfBounds {
            x,
            y,
            width: self.viewport.width,
            height: self.viewport.height,
        })
    }
}

/// Twice the signed area of triangle `(a, b, p)`.
fn edge(ax: f32, ay: f32, bx: f32, by: f32, px: f32, py: f32) -> f32 {
    (bx - ax) * (py - ay) - (by - ay) * (px - ax)
}

#[allow(clippy::cast_precision_loss)]
fn pixel_center(x: i64, y: i64) -> (f32, f32) {
    (x as f32 + 0.5, y as f32 + 0.5)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn color_to_bytes(color: Color) -> [u8; 4] {
    color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
}

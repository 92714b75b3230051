//! Per-frame driver tying picking, seam editing and drawing together.

mod settings;

pub use settings::{InteractionMode, SessionSettings};

use crate::error::Result;
use crate::math::ScreenPoint;
use crate::picking::{PickerConfig, VertexPicker};
use crate::render::{upload_mesh, CameraMatrices, DrawMode, Program, RenderBackend};
use crate::seam::{IgnoreReason, SeamEdit, SeamPath, SeamState};
use crate::topology::{SurfaceMesh, VertexId};

/// Pointer state of one frame, as reported by the windowing layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    /// Pointer position in window coordinates (top-left origin).
    pub pointer: ScreenPoint,
    /// The pointer is over the 3D viewport.
    pub pointer_in_viewport: bool,
    /// The UI layer has captured the pointer this frame.
    pub ui_wants_pointer: bool,
    /// The primary button was pressed this frame.
    pub primary_clicked: bool,
}

impl FrameInput {
    /// A frame with the pointer at `pointer` and nothing pressed.
    #[must_use]
    pub fn hover(pointer: ScreenPoint) -> Self {
        Self {
            pointer,
            pointer_in_viewport: true,
            ui_wants_pointer: false,
            primary_clicked: false,
        }
    }

    /// A frame with a primary click at `pointer`.
    #[must_use]
    pub fn click(pointer: ScreenPoint) -> Self {
        Self {
            primary_clicked: true,
            ..Self::hover(pointer)
        }
    }
}

/// One line of status text shown by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBar {
    text: String,
}

impl StatusBar {
    /// Creates a status bar showing `text`.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The current status line.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replaces the status line.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

impl Default for StatusBar {
    fn default() -> Self {
        Self::new("no message")
    }
}

/// What a frame did, for the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    /// Vertex under the pointer, if any.
    pub hovered: Option<VertexId>,
    /// Seam state after this frame's click.
    pub seam_state: SeamState,
    /// Set when a click reached the seam this frame.
    pub edit: Option<SeamEdit>,
}

/// Interactive seam selection on one mesh.
///
/// Owns the GPU buffers of the mesh, the hover highlight and the seam. Call
/// [`SeamSession::frame`] once per frame with the input state, then
/// [`SeamSession::render`] to draw.
pub struct SeamSession<'m, B: RenderBackend> {
    mesh: &'m SurfaceMesh,
    gpu_mesh: B::MeshBuffer,
    picker: VertexPicker<B>,
    seam: SeamPath<'m>,
    seam_points: B::PointBuffer,
    uploaded_revision: u64,
    settings: SessionSettings,
}

impl<'m, B: RenderBackend> SeamSession<'m, B> {
    /// Uploads `mesh` and creates the picker and seam buffers.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot create a buffer.
    pub fn new(
        backend: &mut B,
        mesh: &'m SurfaceMesh,
        settings: SessionSettings,
        picker_config: PickerConfig,
    ) -> Result<Self> {
        let gpu_mesh = upload_mesh(backend, mesh)?;
        let picker = VertexPicker::new(backend, picker_config)?;
        let seam = SeamPath::new(mesh);
        let seam_points = backend.create_point_buffer(seam.geometry().points())?;
        Ok(Self {
            mesh,
            gpu_mesh,
            picker,
            uploaded_revision: seam.geometry().revision(),
            seam,
            seam_points,
            settings,
        })
    }

    /// The seam being edited.
    #[must_use]
    pub fn seam(&self) -> &SeamPath<'m> {
        &self.seam
    }

    /// Vertex under the pointer as of the last frame.
    #[must_use]
    pub fn hovered(&self) -> Option<VertexId> {
        self.picker.hovered()
    }

    /// Current display and interaction settings.
    #[must_use]
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Settings to adjust from the UI; applied from the next frame on.
    pub fn settings_mut(&mut self) -> &mut SessionSettings {
        &mut self.settings
    }

    /// Discards the current seam.
    pub fn reset_seam(&mut self) {
        self.seam.reset();
    }

    /// Picks the hovered vertex and applies a click to the seam.
    ///
    /// Picking draws into the current framebuffer, so call this before
    /// [`SeamSession::render`]. The pointer is ignored while it is outside
    /// the viewport or captured by the UI, and clicks only reach the seam in
    /// [`InteractionMode::SelectSeam`].
    ///
    /// # Errors
    ///
    /// Returns an error if picking fails.
    pub fn frame(
        &mut self,
        backend: &mut B,
        input: &FrameInput,
        camera: &CameraMatrices,
        status: &mut StatusBar,
    ) -> Result<FrameReport> {
        let hovered = if input.pointer_in_viewport && !input.ui_wants_pointer {
            self.picker
                .pick(backend, input.pointer, &self.gpu_mesh, camera)?
        } else {
            self.picker.clear_hovered();
            None
        };

        let edit = match hovered {
            Some(v) if input.primary_clicked && self.settings.mode == InteractionMode::SelectSeam => {
                Some(self.seam.add_vertex(v)?)
            }
            _ => None,
        };

        status.set_text(self.status_line(hovered, edit));
        Ok(FrameReport {
            hovered,
            seam_state: self.seam.state(),
            edit,
        })
    }

    /// Draws the mesh, the hover highlight and the seam.
    ///
    /// # Errors
    ///
    /// Returns an error if the hovered vertex is not part of the mesh.
    pub fn render(&mut self, backend: &mut B, camera: &CameraMatrices) -> Result<()> {
        backend.set_multisample(true);
        backend.clear(self.settings.clear_color);

        if self.settings.draw_wireframe {
            backend.use_program(
                &Program::Solid {
                    color: self.settings.wireframe_color,
                },
                camera,
            );
            backend.draw_mesh(&self.gpu_mesh, DrawMode::Wireframe);
        }

        backend.use_program(
            &Program::Phong {
                color: self.settings.surface_color,
                lighting: self.settings.lighting,
            },
            camera,
        );
        backend.draw_mesh(&self.gpu_mesh, DrawMode::Fill);

        self.picker
            .highlight_hovered_vertex(backend, self.mesh, camera)?;

        self.draw_seam(backend, camera);
        Ok(())
    }

    fn draw_seam(&mut self, backend: &mut B, camera: &CameraMatrices) {
        let geometry = self.seam.geometry();
        if geometry.revision() != self.uploaded_revision {
            backend.update_point_buffer(&mut self.seam_points, geometry.points());
            self.uploaded_revision = geometry.revision();
        }
        if geometry.is_empty() {
            return;
        }

        let style = self.settings.seam;
        backend.use_program(&Program::Solid { color: style.color }, camera);
        backend.draw_line_strip(&self.seam_points);
        backend.use_program(&Program::RoundPoint { color: style.color }, camera);
        backend.set_point_size(style.point_size);
        backend.draw_points(&self.seam_points);
    }

    fn status_line(&self, hovered: Option<VertexId>, edit: Option<SeamEdit>) -> String {
        let hover = match hovered {
            Some(v) => format!("hovering {v}"),
            None => "no vertex hovered".to_owned(),
        };
        let count = self.seam.vertices().len();
        let seam = match self.seam.state() {
            SeamState::Empty => "seam empty".to_owned(),
            SeamState::Open => format!("seam open, {count} vertices"),
            SeamState::Closed => format!("seam closed, {count} vertices"),
        };
        let Some(edit) = edit else {
            return format!("{hover} | {seam}");
        };
        let action = match edit {
            SeamEdit::Started(v) => format!("started at {v}"),
            SeamEdit::Extended { appended } => format!("added {appended}"),
            SeamEdit::Closed { appended } => format!("added {appended} and closed"),
            SeamEdit::Ignored(reason) => format!("ignored: {}", ignore_message(reason)),
        };
        format!("{hover} | {seam} | {action}")
    }
}

fn ignore_message(reason: IgnoreReason) -> &'static str {
    match reason {
        IgnoreReason::SeamClosed => "seam is already closed",
        IgnoreReason::StartNotOnBoundary => "a seam must start on the boundary",
        IgnoreReason::Unreachable => "no edge path to that vertex",
        IgnoreReason::AlreadyAtEnd => "vertex is already the seam end",
    }
}

use crate::render::{Color, Lighting};
use crate::seam::SeamStyle;

/// What a click on the mesh does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    /// Hover picking and highlighting only.
    Inspect,
    /// Clicks extend the seam.
    #[default]
    SelectSeam,
}

/// User-adjustable parameters of a [`SeamSession`](super::SeamSession).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSettings {
    /// Draw triangle edges under the shaded surface.
    pub draw_wireframe: bool,
    /// What clicks do.
    pub mode: InteractionMode,
    /// Background color.
    pub clear_color: Color,
    pub wireframe_color: Color,
    /// Base color of the shaded surface.
    pub surface_color: Color,
    pub lighting: Lighting,
    /// Appearance of the seam.
    pub seam: SeamStyle,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            draw_wireframe: true,
            mode: InteractionMode::default(),
            clear_color: [1.0, 1.0, 1.0, 1.0],
            wireframe_color: [1.0, 1.0, 1.0, 1.0],
            surface_color: [1.0, 0.5, 0.2, 1.0],
            lighting: Lighting::default(),
            seam: SeamStyle::default(),
        }
    }
}

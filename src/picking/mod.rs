//! Color-id vertex picking.

mod color_id;
mod picker;

pub use color_id::{decode_pixel, decode_vertex_id, encode_vertex_index, MAX_PICKABLE_VERTICES};
pub use picker::{PickerConfig, VertexPicker};

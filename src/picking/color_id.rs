use crate::topology::VertexId;

/// Largest vertex count whose ids fit the 24-bit color encoding.
///
/// Color 0 is the background, so index `i` is written as `i + 1`.
pub const MAX_PICKABLE_VERTICES: usize = 0x00FF_FFFF;

/// RGBA bytes the vertex-id program writes for vertex `index`.
///
/// Indices beyond [`MAX_PICKABLE_VERTICES`] wrap and must be rejected before
/// drawing.
#[must_use]
pub fn encode_vertex_index(index: u32) -> [u8; 4] {
    let biased = index.wrapping_add(1);
    let [r, g, b, _] = biased.to_le_bytes();
    [r, g, b, 0xFF]
}

/// Raw decoded value of a pick pixel; `-1` means background.
#[must_use]
pub fn decode_pixel(pixel: [u8; 4]) -> i64 {
    i64::from(pixel[0]) + (i64::from(pixel[1]) << 8) + (i64::from(pixel[2]) << 16) - 1
}

/// Vertex under a pick pixel, or `None` for background or an index outside
/// a mesh of `vertex_count` vertices.
#[must_use]
pub fn decode_vertex_id(pixel: [u8; 4], vertex_count: usize) -> Option<VertexId> {
    let index = u32::try_from(decode_pixel(pixel)).ok()?;
    ((index as usize) < vertex_count).then_some(VertexId(index))
}

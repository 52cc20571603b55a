use std::mem::offset_of;

use bytemuck::{Pod, Zeroable};
use lumen_engine::resource::InputLayoutElement;

/// Position plus texture coordinate, fetched from binding slot 0.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct VertexPositionUv {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl VertexPositionUv {
    pub const STRIDE: u64 = size_of::<Self>() as u64;

    pub const ELEMENTS: [InputLayoutElement; 2] = [
        InputLayoutElement::float(0, 3, offset_of!(VertexPositionUv, position) as u64, 0),
        InputLayoutElement::float(1, 2, offset_of!(VertexPositionUv, uv) as u64, 0),
    ];

    pub const fn new(position: [f32; 3], uv: [f32; 2]) -> Self {
        Self { position, uv }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_struct() {
        assert_eq!(VertexPositionUv::STRIDE, 20);
        assert_eq!(VertexPositionUv::ELEMENTS[0].offset, 0);
        assert_eq!(VertexPositionUv::ELEMENTS[1].offset, 12);
    }
}

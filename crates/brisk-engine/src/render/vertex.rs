//! Fixed vertex layout shared by the dynamic batch, static geometry and every shader.

use std::mem::{offset_of, size_of};

use bytemuck::{Pod, Zeroable};

use crate::coords::Vec2;
use crate::paint::Color;

/// One vertex: position, color, uv, shape size and stroke width (11 floats).
///
/// `size` and `stroke_width` let the fragment stage draw a rectangle either
/// filled (`stroke_width == 0`) or as an outline; dynamic draws leave them zero.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
    pub uv: [f32; 2],
    pub size: [f32; 2],
    pub stroke_width: f32,
}

pub const VERTEX_FLOATS: usize = 11;
pub const VERTEX_STRIDE: u64 = (VERTEX_FLOATS * size_of::<f32>()) as u64;

pub const POSITION_OFFSET: u64 = 0;
pub const COLOR_OFFSET: u64 = 8;
pub const UV_OFFSET: u64 = 24;
pub const SIZE_OFFSET: u64 = 32;
pub const STROKE_OFFSET: u64 = 40;

const _: () = assert!(size_of::<Vertex>() as u64 == VERTEX_STRIDE);
const _: () = assert!(offset_of!(Vertex, color) as u64 == COLOR_OFFSET);
const _: () = assert!(offset_of!(Vertex, uv) as u64 == UV_OFFSET);
const _: () = assert!(offset_of!(Vertex, size) as u64 == SIZE_OFFSET);
const _: () = assert!(offset_of!(Vertex, stroke_width) as u64 == STROKE_OFFSET);

impl Vertex {
    pub const ATTRS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        0 => Float32x2, // position
        1 => Float32x4, // color
        2 => Float32x2, // uv
        3 => Float32x2, // size
        4 => Float32    // stroke width
    ];

    /// Highest shader location the layout provides.
    pub const MAX_LOCATION: u32 = 4;

    #[inline]
    pub fn new(pos: Vec2, color: Color, uv: Vec2) -> Self {
        Self {
            position: pos.to_array(),
            color: color.to_array(),
            uv: uv.to_array(),
            size: [0.0; 2],
            stroke_width: 0.0,
        }
    }

    #[inline]
    pub fn with_shape(mut self, size: Vec2, stroke_width: f32) -> Self {
        self.size = size.to_array();
        self.stroke_width = stroke_width;
        self
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: VERTEX_STRIDE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Checks that the attribute table walks the struct field by field and ends exactly at the stride.
///
/// # Panics
/// On any mismatch; a drifted layout would render garbage on every backend.
pub fn assert_vertex_layout() {
    let expected = [POSITION_OFFSET, COLOR_OFFSET, UV_OFFSET, SIZE_OFFSET, STROKE_OFFSET];
    let mut offset = 0u64;
    for (attr, want) in Vertex::ATTRS.iter().zip(expected) {
        assert_eq!(
            attr.offset, want,
            "Vertex format mismatch: location {} at offset {}, expected {}",
            attr.shader_location, attr.offset, want
        );
        offset = attr.offset + attr.format.size();
    }
    assert_eq!(
        offset, VERTEX_STRIDE,
        "Vertex format mismatch: offset={offset}, stride={VERTEX_STRIDE}"
    );
}

/// Corner of an untextured primitive.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ColoredPoint {
    pub pos: Vec2,
    pub color: Color,
}

impl ColoredPoint {
    #[inline]
    pub const fn new(x: f32, y: f32, color: Color) -> Self {
        Self { pos: Vec2::new(x, y), color }
    }
}

/// Corner of a textured primitive; `uv` (0,0) is the top-left texel.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TexturedPoint {
    pub pos: Vec2,
    pub color: Color,
    pub uv: Vec2,
}

impl TexturedPoint {
    #[inline]
    pub const fn new(x: f32, y: f32, color: Color, u: f32, v: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            color,
            uv: Vec2::new(u, v),
        }
    }

    #[inline]
    pub(crate) fn to_vertex(self) -> Vertex {
        Vertex::new(self.pos, self.color, self.uv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_struct() {
        assert_vertex_layout();
    }

    #[test]
    fn vertex_is_eleven_floats() {
        let v = Vertex::new(Vec2::new(1.0, 2.0), Color::white(), Vec2::new(0.5, 0.25))
            .with_shape(Vec2::new(10.0, 20.0), 3.0);
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&v));
        assert_eq!(floats, &[1.0, 2.0, 1.0, 1.0, 1.0, 1.0, 0.5, 0.25, 10.0, 20.0, 3.0]);
    }
}

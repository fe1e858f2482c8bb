use crate::backend::BufferId;
use crate::coords::{StrokedRect, Vec2};
use crate::paint::Color;

use super::Vertex;

pub const VERTICES_PER_RECT: usize = 6;

/// GPU-resident vertex buffer built once and drawn with a single call.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StaticGeometry {
    pub(crate) buffer: BufferId,
    pub(crate) vertex_count: u32,
}

impl StaticGeometry {
    #[inline]
    pub fn buffer_id(&self) -> BufferId {
        self.buffer
    }

    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }
}

/// Two triangles per rectangle: (TL, TR, BL) then (TR, BR, BL).
///
/// Every vertex carries the rectangle's size and stroke width so the default
/// fragment stage can fill or outline it; `uv` spans the rectangle.
pub fn build_vertices(rects: &[StrokedRect], color: Color) -> Vec<Vertex> {
    let mut out = Vec::with_capacity(rects.len() * VERTICES_PER_RECT);

    for shape in rects {
        let Vec2 { x, y } = shape.rect.origin;
        let Vec2 { x: w, y: h } = shape.rect.size;

        let corners = [
            (x, y, 0.0, 0.0),
            (x + w, y, 1.0, 0.0),
            (x, y + h, 0.0, 1.0),
            (x + w, y, 1.0, 0.0),
            (x + w, y + h, 1.0, 1.0),
            (x, y + h, 0.0, 1.0),
        ];

        out.extend(corners.into_iter().map(|(px, py, u, v)| {
            Vertex::new(Vec2::new(px, py), color, Vec2::new(u, v))
                .with_shape(shape.rect.size, shape.stroke_width)
        }));
    }

    out
}

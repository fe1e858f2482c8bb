//! Batched 2D renderer.
//!
//! [`Renderer`] is the drawing surface callers program against;
//! [`BatchRenderer`] implements it over any [`GpuBackend`](crate::backend::GpuBackend).
//!
//! Per frame:
//! - `begin_frame` resets metrics, transform stack and graphics state, clears the default target
//! - draw calls append vertices to one texture-homogeneous batch
//! - any change of texture, shader, blend mode or target flushes the batch first
//! - `end_frame` flushes the remainder and submits
//!
//! The transform is uploaded per flush, so every vertex of a batch is drawn
//! with the transform active when the batch is flushed.

mod batch;
mod batch_renderer;
mod metrics;
mod shader;
mod state;
mod static_geometry;
mod target;
mod texture;
mod transform_stack;
mod vertex;

pub use batch::VertexBatch;
pub use batch_renderer::BatchRenderer;
pub use metrics::{GpuFrameTimer, RenderMetrics};
pub use shader::{Shader, DEFAULT_SHADER};
pub use state::{GraphicsState, StateChange};
pub use static_geometry::{build_vertices, StaticGeometry, VERTICES_PER_RECT};
pub use target::RenderTarget;
pub use texture::{premultiply_rgba8, PendingTexture, Texture};
pub use transform_stack::TransformStack;
pub use vertex::{
    assert_vertex_layout, ColoredPoint, TexturedPoint, Vertex, VERTEX_FLOATS, VERTEX_STRIDE,
};

use std::path::Path;

use crate::coords::{Rect, StrokedRect, Transform};
use crate::error::RenderError;
use crate::paint::{BlendMode, Color};

/// Segment count used by [`Renderer::draw_circle`] callers without a preference.
pub const DEFAULT_CIRCLE_SEGMENTS: u32 = 32;

/// Limits of a [`BatchRenderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RendererConfig {
    /// Triangles per dynamic batch; the vertex buffer holds `3 * max_triangles` vertices.
    pub max_triangles: usize,
    pub max_transform_depth: usize,
    /// Largest accepted texture edge; also capped by the backend's limit.
    pub max_texture_size: u32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            max_triangles: 8192,
            max_transform_depth: 256,
            max_texture_size: 4096,
        }
    }
}

/// Immediate-mode 2D drawing interface.
///
/// Coordinates are pixels of the bound target, origin top-left, +Y down, mapped
/// through the current transform. Colors passed to shape helpers come from the
/// flat fill color (`set_color`); points carry their own premultiplied colors.
pub trait Renderer {
    // ---- frame lifecycle ---------------------------------------------------

    fn begin_frame(&mut self, clear: Color);
    fn end_frame(&mut self);

    /// Submits pending vertices as one draw call; no-op when nothing is pending.
    fn flush(&mut self);

    fn metrics(&self) -> RenderMetrics;

    // ---- transforms --------------------------------------------------------

    fn push(&mut self);
    fn pop(&mut self);
    fn origin(&mut self);
    fn translate(&mut self, x: f32, y: f32);
    fn scale(&mut self, sx: f32, sy: f32);
    fn rotate(&mut self, angle: f32);
    fn apply_transform(&mut self, t: Transform);
    fn transform(&self) -> Transform;

    // ---- state -------------------------------------------------------------

    /// Sets the fill color from straight-alpha components.
    fn set_color(&mut self, r: f32, g: f32, b: f32, a: f32);
    fn set_rgb(&mut self, r: f32, g: f32, b: f32);
    fn set_alpha(&mut self, a: f32);
    /// Premultiplied fill color.
    fn color(&self) -> Color;

    fn set_blend_mode(&mut self, mode: BlendMode);
    fn blend_mode(&self) -> BlendMode;

    /// Selects a program; `None` restores the default.
    fn set_shader(&mut self, shader: Option<Shader>);
    fn create_shader(&mut self, vertex: &str, fragment: &str) -> Result<Shader, RenderError>;
    /// Pairs a custom vertex stage with the default fragment stage.
    fn create_vertex_shader(&mut self, vertex: &str) -> Result<Shader, RenderError>;
    /// Pairs the default vertex stage with a custom fragment stage.
    fn create_fragment_shader(&mut self, fragment: &str) -> Result<Shader, RenderError>;
    fn destroy_shader(&mut self, shader: Shader);

    // ---- primitives --------------------------------------------------------

    fn draw_triangle(&mut self, a: ColoredPoint, b: ColoredPoint, c: ColoredPoint);
    fn draw_triangle_textured(&mut self, texture: Texture, a: TexturedPoint, b: TexturedPoint, c: TexturedPoint);
    /// Two triangles: (a, b, c) and (a, c, d).
    fn draw_quad(&mut self, a: ColoredPoint, b: ColoredPoint, c: ColoredPoint, d: ColoredPoint);
    fn draw_quad_textured(
        &mut self,
        texture: Texture,
        a: TexturedPoint,
        b: TexturedPoint,
        c: TexturedPoint,
        d: TexturedPoint,
    );

    fn draw_tri(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32);
    fn draw_rect(&mut self, x: f32, y: f32, w: f32, h: f32);
    /// Triangle fan of `max(segments, 3)` triangles around `(cx, cy)`.
    fn draw_circle(&mut self, cx: f32, cy: f32, radius: f32, segments: u32);
    fn draw_point(&mut self, x: f32, y: f32);

    // ---- textures ----------------------------------------------------------

    /// Starts decoding an image file; see [`PendingTexture`].
    fn load_texture(&mut self, path: &Path) -> PendingTexture;
    /// Uploads straight-alpha RGBA8 pixels, rows top to bottom.
    fn create_texture_rgba(&mut self, width: u32, height: u32, pixels: &[u8]) -> Texture;
    fn destroy_texture(&mut self, texture: Texture);
    fn draw_texture(&mut self, texture: Texture, x: f32, y: f32);
    /// Draws the `source` region of `texture` (texel units, clamped to the texture) at `(x, y)`.
    fn draw_texture_rect(&mut self, texture: Texture, x: f32, y: f32, source: Rect);

    // ---- static geometry ---------------------------------------------------

    /// Uploads `rects` in the current fill color, replacing any previous static buffer.
    fn build_static_geometry(&mut self, rects: &[StrokedRect]);
    /// Draws the whole static buffer as one call.
    fn draw_static_geometry(&mut self);

    // ---- render targets ----------------------------------------------------

    fn create_render_target(&mut self, width: u32, height: u32) -> Result<RenderTarget, RenderError>;
    /// Binds `target`, or the default target for `None`.
    fn set_render_target(&mut self, target: Option<&RenderTarget>);
    fn draw_render_target(&mut self, target: &RenderTarget, x: f32, y: f32);
    /// Clears the bound off-screen target (transparent black by default).
    fn clear_render_target(&mut self, color: Option<Color>);
    fn destroy_render_target(&mut self, target: RenderTarget);
}

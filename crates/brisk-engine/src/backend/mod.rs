//! GPU collaborator interface.
//!
//! The renderer never talks to a graphics API directly; it drives a
//! [`GpuBackend`] through a small set of immediate-mode primitives:
//! buffers, textures, shaders and uniforms, render targets, a triangle-list
//! draw, and elapsed-time queries.
//!
//! Backends:
//! - [`WgpuBackend`] records the calls and encodes them into wgpu render passes.
//! - [`HeadlessBackend`] records the calls without a GPU (tests, tooling).

mod globals;
mod headless;
mod wgpu_backend;
mod wgsl;

pub use globals::{Globals, UniformValue};
pub use headless::{Command, DrawRecord, HeadlessBackend};
pub use wgpu_backend::WgpuBackend;
pub use wgsl::{validate_fragment, validate_vertex};

use crate::error::RenderError;
use crate::paint::{BlendMode, Color};

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) u32);

        impl $name {
            #[inline]
            pub fn raw(self) -> u32 {
                self.0
            }
        }
    };
}

handle!(
    /// GPU vertex buffer.
    BufferId
);
handle!(
    /// Sampled texture.
    TextureId
);
handle!(
    /// Linked vertex + fragment program.
    ShaderId
);
handle!(
    /// Off-screen render destination.
    TargetId
);
handle!(
    /// Elapsed-time query.
    QueryId
);

/// Monotonic id source shared by the backends.
#[derive(Debug, Default)]
pub(crate) struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub(crate) fn next(&mut self) -> u32 {
        self.next = self.next.wrapping_add(1);
        self.next
    }
}

/// Update pattern of a vertex buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BufferUsage {
    /// Rewritten every flush.
    Dynamic,
    /// Written once, drawn many times.
    Static,
}

/// Texture sampling filter.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TextureFilter {
    Nearest,
    Linear,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub filter: TextureFilter,
}

/// Primitive operations the renderer needs from a graphics API.
///
/// State set through this trait (bound texture, shader, blend mode, target)
/// is global to the backend and applies to every later `draw_triangles`.
pub trait GpuBackend {
    /// Acquires the default target for a new frame.
    fn begin_frame(&mut self);

    /// Submits recorded work and presents the default target.
    fn end_frame(&mut self);

    /// Size of the bound target in pixels (the default target when none is bound).
    fn viewport_size(&self) -> (u32, u32);

    /// Largest texture edge the device accepts.
    fn max_texture_size(&self) -> u32;

    fn create_buffer(&mut self, size: u64, usage: BufferUsage) -> BufferId;

    /// Writes `data` at `offset`; a write at offset 0 replaces the contents seen by later draws.
    fn write_buffer(&mut self, buffer: BufferId, offset: u64, data: &[u8]);

    fn destroy_buffer(&mut self, buffer: BufferId);

    /// Creates a texture; `pixels` are premultiplied RGBA8 rows, top row first.
    fn create_texture(&mut self, desc: &TextureDesc, pixels: Option<&[u8]>) -> TextureId;

    fn destroy_texture(&mut self, texture: TextureId);

    fn bind_texture(&mut self, unit: u32, texture: TextureId);

    /// Compiles and links a program from WGSL vertex and fragment modules.
    fn create_shader(&mut self, vertex: &str, fragment: &str) -> Result<ShaderId, RenderError>;

    fn destroy_shader(&mut self, shader: ShaderId);

    fn use_shader(&mut self, shader: ShaderId);

    fn set_uniform(
        &mut self,
        shader: ShaderId,
        name: &str,
        value: UniformValue,
    ) -> Result<(), RenderError>;

    fn set_blend_mode(&mut self, mode: BlendMode);

    /// Creates an off-screen target and the texture it renders into.
    fn create_render_target(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<(TargetId, TextureId), RenderError>;

    fn destroy_render_target(&mut self, target: TargetId);

    /// Binds `target`, or the default target for `None`; the viewport follows the target size.
    fn bind_render_target(&mut self, target: Option<TargetId>);

    /// Clears the bound target.
    fn clear(&mut self, color: Color);

    /// Draws `vertex_count` vertices from `buffer` as a triangle list.
    fn draw_triangles(&mut self, buffer: BufferId, first_vertex: u32, vertex_count: u32);

    fn supports_timer_queries(&self) -> bool;

    /// Starts timing GPU work; `None` when unsupported.
    fn begin_timer_query(&mut self) -> Option<QueryId>;

    fn end_timer_query(&mut self, query: QueryId);

    /// Elapsed nanoseconds if the result is available. Never blocks.
    fn poll_timer_query(&mut self, query: QueryId) -> Option<u64>;

    fn delete_timer_query(&mut self, query: QueryId);
}

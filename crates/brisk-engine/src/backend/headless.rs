//! GPU-less backend that records every call.
//!
//! Used by the test-suite and by tooling that needs to inspect what the
//! renderer would submit. Resources live in plain maps; draws snapshot the
//! vertices they read so a record stays valid after the buffer is rewritten.

use std::collections::HashMap;

use crate::error::RenderError;
use crate::paint::{BlendMode, Color};
use crate::render::{Vertex, VERTEX_STRIDE};

use super::{
    BufferId, BufferUsage, GpuBackend, Globals, IdAllocator, QueryId, ShaderId, TargetId,
    TextureDesc, TextureFilter, TextureId, UniformValue, validate_fragment, validate_vertex,
};

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    BeginFrame,
    EndFrame,
    Clear { target: Option<TargetId>, color: Color },
    BindTexture { unit: u32, texture: TextureId },
    UseShader(ShaderId),
    SetUniform { shader: ShaderId, name: String, value: UniformValue },
    SetBlendMode(BlendMode),
    BindTarget(Option<TargetId>),
    WriteBuffer { buffer: BufferId, offset: u64, len: usize },
    Draw(DrawRecord),
    BeginQuery(QueryId),
    EndQuery(QueryId),
}

/// A draw call together with the state it was issued under.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    pub buffer: BufferId,
    pub first_vertex: u32,
    pub vertex_count: u32,
    pub vertices: Vec<Vertex>,
    pub texture: Option<TextureId>,
    pub shader: Option<ShaderId>,
    pub blend: BlendMode,
    /// `None` is the default target.
    pub target: Option<TargetId>,
    /// Uniforms of `shader` at draw time.
    pub globals: Globals,
}

impl DrawRecord {
    #[inline]
    pub fn triangle_count(&self) -> u32 {
        self.vertex_count / 3
    }
}

#[derive(Debug)]
struct BufferSlot {
    usage: BufferUsage,
    data: Vec<u8>,
}

#[derive(Debug)]
struct TargetSlot {
    width: u32,
    height: u32,
    texture: TextureId,
}

#[derive(Debug, Default)]
struct QuerySlot {
    ended: bool,
    result: Option<u64>,
}

#[derive(Debug)]
pub struct HeadlessBackend {
    width: u32,
    height: u32,
    max_texture_size: u32,
    timer_queries: bool,

    ids: IdAllocator,
    buffers: HashMap<BufferId, BufferSlot>,
    textures: HashMap<TextureId, TextureDesc>,
    shaders: HashMap<ShaderId, Globals>,
    targets: HashMap<TargetId, TargetSlot>,
    queries: HashMap<QueryId, QuerySlot>,

    bound_texture: Option<TextureId>,
    bound_shader: Option<ShaderId>,
    bound_target: Option<TargetId>,
    blend: BlendMode,

    in_frame: bool,
    frames: u64,
    log: Vec<Command>,
}

impl HeadlessBackend {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            max_texture_size: 8192,
            timer_queries: true,
            ids: IdAllocator::default(),
            buffers: HashMap::new(),
            textures: HashMap::new(),
            shaders: HashMap::new(),
            targets: HashMap::new(),
            queries: HashMap::new(),
            bound_texture: None,
            bound_shader: None,
            bound_target: None,
            blend: BlendMode::default(),
            in_frame: false,
            frames: 0,
            log: Vec::new(),
        }
    }

    pub fn with_max_texture_size(mut self, size: u32) -> Self {
        self.max_texture_size = size;
        self
    }

    pub fn with_timer_queries(mut self, supported: bool) -> Self {
        self.timer_queries = supported;
        self
    }

    /// Changes the default target size, as a window resize would.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    // ---- inspection --------------------------------------------------------

    pub fn commands(&self) -> &[Command] {
        &self.log
    }

    pub fn draws(&self) -> impl Iterator<Item = &DrawRecord> {
        self.log.iter().filter_map(|c| match c {
            Command::Draw(d) => Some(d),
            _ => None,
        })
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn in_frame(&self) -> bool {
        self.in_frame
    }

    pub fn bound_target(&self) -> Option<TargetId> {
        self.bound_target
    }

    pub fn bound_texture(&self) -> Option<TextureId> {
        self.bound_texture
    }

    pub fn bound_shader(&self) -> Option<ShaderId> {
        self.bound_shader
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend
    }

    pub fn buffer_usage(&self, buffer: BufferId) -> Option<BufferUsage> {
        self.buffers.get(&buffer).map(|b| b.usage)
    }

    pub fn buffer_len(&self, buffer: BufferId) -> Option<usize> {
        self.buffers.get(&buffer).map(|b| b.data.len())
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn texture_desc(&self, texture: TextureId) -> Option<TextureDesc> {
        self.textures.get(&texture).copied()
    }

    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    pub fn has_shader(&self, shader: ShaderId) -> bool {
        self.shaders.contains_key(&shader)
    }

    pub fn has_target(&self, target: TargetId) -> bool {
        self.targets.contains_key(&target)
    }

    pub fn live_queries(&self) -> usize {
        self.queries.len()
    }

    /// Makes every ended, unresolved query report `elapsed_ns`.
    ///
    /// Stands in for the GPU finishing its work; until this is called,
    /// `poll_timer_query` keeps answering `None`.
    pub fn resolve_pending_queries(&mut self, elapsed_ns: u64) {
        for q in self.queries.values_mut() {
            if q.ended && q.result.is_none() {
                q.result = Some(elapsed_ns);
            }
        }
    }

    fn snapshot(&self, buffer: BufferId, first_vertex: u32, vertex_count: u32) -> Vec<Vertex> {
        let Some(slot) = self.buffers.get(&buffer) else {
            panic!("draw from unknown buffer {buffer:?}");
        };
        let stride = VERTEX_STRIDE as usize;
        let start = first_vertex as usize * stride;
        let end = start + vertex_count as usize * stride;
        assert!(
            end <= slot.data.len(),
            "draw reads {end} bytes from buffer {buffer:?} of {} bytes",
            slot.data.len()
        );
        slot.data[start..end]
            .chunks_exact(stride)
            .map(bytemuck::pod_read_unaligned::<Vertex>)
            .collect()
    }
}

impl GpuBackend for HeadlessBackend {
    fn begin_frame(&mut self) {
        self.in_frame = true;
        self.log.push(Command::BeginFrame);
    }

    fn end_frame(&mut self) {
        self.in_frame = false;
        self.frames += 1;
        self.log.push(Command::EndFrame);
    }

    fn viewport_size(&self) -> (u32, u32) {
        match self.bound_target.and_then(|t| self.targets.get(&t)) {
            Some(t) => (t.width, t.height),
            None => (self.width, self.height),
        }
    }

    fn max_texture_size(&self) -> u32 {
        self.max_texture_size
    }

    fn create_buffer(&mut self, size: u64, usage: BufferUsage) -> BufferId {
        let id = BufferId(self.ids.next());
        self.buffers.insert(
            id,
            BufferSlot {
                usage,
                data: vec![0; size as usize],
            },
        );
        id
    }

    fn write_buffer(&mut self, buffer: BufferId, offset: u64, data: &[u8]) {
        let Some(slot) = self.buffers.get_mut(&buffer) else {
            panic!("write to unknown buffer {buffer:?}");
        };
        let start = offset as usize;
        let end = start + data.len();
        assert!(
            end <= slot.data.len(),
            "write of {} bytes at {offset} overflows buffer {buffer:?} of {} bytes",
            data.len(),
            slot.data.len()
        );
        slot.data[start..end].copy_from_slice(data);
        self.log.push(Command::WriteBuffer {
            buffer,
            offset,
            len: data.len(),
        });
    }

    fn destroy_buffer(&mut self, buffer: BufferId) {
        self.buffers.remove(&buffer);
    }

    fn create_texture(&mut self, desc: &TextureDesc, pixels: Option<&[u8]>) -> TextureId {
        if let Some(pixels) = pixels {
            assert_eq!(
                pixels.len(),
                desc.width as usize * desc.height as usize * 4,
                "texture data does not match {}x{} RGBA8",
                desc.width,
                desc.height
            );
        }
        let id = TextureId(self.ids.next());
        self.textures.insert(id, *desc);
        id
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        self.textures.remove(&texture);
        if self.bound_texture == Some(texture) {
            self.bound_texture = None;
        }
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureId) {
        self.bound_texture = Some(texture);
        self.log.push(Command::BindTexture { unit, texture });
    }

    fn create_shader(&mut self, vertex: &str, fragment: &str) -> Result<ShaderId, RenderError> {
        validate_vertex(vertex)?;
        validate_fragment(fragment)?;
        let id = ShaderId(self.ids.next());
        self.shaders.insert(id, Globals::default());
        Ok(id)
    }

    fn destroy_shader(&mut self, shader: ShaderId) {
        self.shaders.remove(&shader);
        if self.bound_shader == Some(shader) {
            self.bound_shader = None;
        }
    }

    fn use_shader(&mut self, shader: ShaderId) {
        self.bound_shader = Some(shader);
        self.log.push(Command::UseShader(shader));
    }

    fn set_uniform(
        &mut self,
        shader: ShaderId,
        name: &str,
        value: UniformValue,
    ) -> Result<(), RenderError> {
        let Some(globals) = self.shaders.get_mut(&shader) else {
            panic!("uniform write to unknown shader {shader:?}");
        };
        globals.set(name, value)?;
        self.log.push(Command::SetUniform {
            shader,
            name: name.to_string(),
            value,
        });
        Ok(())
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend = mode;
        self.log.push(Command::SetBlendMode(mode));
    }

    fn create_render_target(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<(TargetId, TextureId), RenderError> {
        if width == 0 || height == 0 || width > self.max_texture_size || height > self.max_texture_size {
            return Err(RenderError::IncompleteTarget {
                width,
                height,
                max: self.max_texture_size,
            });
        }

        let texture = self.create_texture(
            &TextureDesc {
                width,
                height,
                filter: TextureFilter::Linear,
            },
            None,
        );
        let id = TargetId(self.ids.next());
        self.targets.insert(id, TargetSlot { width, height, texture });
        Ok((id, texture))
    }

    fn destroy_render_target(&mut self, target: TargetId) {
        if let Some(slot) = self.targets.remove(&target) {
            self.destroy_texture(slot.texture);
        }
        if self.bound_target == Some(target) {
            self.bound_target = None;
        }
    }

    fn bind_render_target(&mut self, target: Option<TargetId>) {
        self.bound_target = target;
        self.log.push(Command::BindTarget(target));
    }

    fn clear(&mut self, color: Color) {
        self.log.push(Command::Clear {
            target: self.bound_target,
            color,
        });
    }

    fn draw_triangles(&mut self, buffer: BufferId, first_vertex: u32, vertex_count: u32) {
        let vertices = self.snapshot(buffer, first_vertex, vertex_count);
        if let Some(target) = self.bound_target {
            let slot = &self.targets[&target];
            assert!(
                self.bound_texture != Some(slot.texture),
                "feedback loop: target {target:?} sampled while bound"
            );
        }
        let globals = self
            .bound_shader
            .and_then(|s| self.shaders.get(&s).copied())
            .unwrap_or_default();

        self.log.push(Command::Draw(DrawRecord {
            buffer,
            first_vertex,
            vertex_count,
            vertices,
            texture: self.bound_texture,
            shader: self.bound_shader,
            blend: self.blend,
            target: self.bound_target,
            globals,
        }));
    }

    fn supports_timer_queries(&self) -> bool {
        self.timer_queries
    }

    fn begin_timer_query(&mut self) -> Option<QueryId> {
        if !self.timer_queries {
            return None;
        }
        let id = QueryId(self.ids.next());
        self.queries.insert(id, QuerySlot::default());
        self.log.push(Command::BeginQuery(id));
        Some(id)
    }

    fn end_timer_query(&mut self, query: QueryId) {
        if let Some(q) = self.queries.get_mut(&query) {
            q.ended = true;
            self.log.push(Command::EndQuery(query));
        }
    }

    fn poll_timer_query(&mut self, query: QueryId) -> Option<u64> {
        self.queries.get(&query).and_then(|q| q.result)
    }

    fn delete_timer_query(&mut self, query: QueryId) {
        self.queries.remove(&query);
    }
}

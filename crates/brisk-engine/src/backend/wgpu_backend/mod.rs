//! wgpu implementation of [`GpuBackend`].
//!
//! Calls are recorded during the frame and encoded into render passes at
//! `end_frame`, then submitted and presented in one go.

mod frame;
mod pipeline;
mod resources;
mod timer;

use std::collections::HashMap;

use winit::dpi::PhysicalSize;

use crate::device::{Gpu, GpuFrame, SurfaceErrorAction};
use crate::error::RenderError;
use crate::paint::{BlendMode, Color};

use super::{
    validate_fragment, validate_vertex, BufferId, BufferUsage, GpuBackend, Globals, IdAllocator,
    QueryId, ShaderId, TargetId, TextureDesc, TextureFilter, TextureId, UniformValue,
};
use frame::{DrawOp, EncodeCtx, FrameOp, GlobalsArena};
use pipeline::{Layouts, PipelineCache, PipelineKey};
use resources::{BufferSlot, Samplers, TextureSlot, TEXTURE_FORMAT};
use timer::TimerQuery;

struct ShaderSlot {
    vertex: wgpu::ShaderModule,
    fragment: wgpu::ShaderModule,
    globals: Globals,
}

struct TargetSlot {
    texture: TextureId,
    width: u32,
    height: u32,
}

pub struct WgpuBackend {
    gpu: Gpu,
    layouts: Layouts,
    samplers: Samplers,
    pipelines: PipelineCache,
    arena: GlobalsArena,

    ids: IdAllocator,
    buffers: HashMap<BufferId, BufferSlot>,
    textures: HashMap<TextureId, TextureSlot>,
    shaders: HashMap<ShaderId, ShaderSlot>,
    targets: HashMap<TargetId, TargetSlot>,

    queries: HashMap<QueryId, TimerQuery>,
    free_queries: Vec<TimerQuery>,
    frame_query: Option<QueryId>,
    period_ns: f32,

    bound_texture: Option<TextureId>,
    bound_shader: Option<ShaderId>,
    bound_target: Option<TargetId>,
    blend: BlendMode,

    frame: Option<GpuFrame>,
    in_frame: bool,
    ops: Vec<FrameOp>,
    fatal: bool,
    warned_outside_frame: bool,
}

impl WgpuBackend {
    pub fn new(gpu: Gpu) -> Self {
        let device = gpu.device();
        let layouts = Layouts::new(device);
        let samplers = Samplers::new(device);
        let arena = GlobalsArena::new(device, &layouts.globals);
        let period_ns = gpu.queue().get_timestamp_period();

        Self {
            layouts,
            samplers,
            pipelines: PipelineCache::default(),
            arena,
            ids: IdAllocator::default(),
            buffers: HashMap::new(),
            textures: HashMap::new(),
            shaders: HashMap::new(),
            targets: HashMap::new(),
            queries: HashMap::new(),
            free_queries: Vec::new(),
            frame_query: None,
            period_ns,
            bound_texture: None,
            bound_shader: None,
            bound_target: None,
            blend: BlendMode::default(),
            frame: None,
            in_frame: false,
            ops: Vec::new(),
            fatal: false,
            warned_outside_frame: false,
            gpu,
        }
    }

    pub fn gpu(&self) -> &Gpu {
        &self.gpu
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.gpu.resize(size);
    }

    /// True once the surface reported an unrecoverable error.
    pub fn is_lost(&self) -> bool {
        self.fatal
    }

    fn target_view(&self, target: Option<TargetId>) -> Option<wgpu::TextureView> {
        let slot = self.targets.get(&target?)?;
        self.textures.get(&slot.texture).map(|t| t.view.clone())
    }

    fn target_format(&self) -> wgpu::TextureFormat {
        match self.bound_target {
            Some(_) => TEXTURE_FORMAT,
            None => self.gpu.surface_format(),
        }
    }

    fn accepting_ops(&mut self, what: &str) -> bool {
        if self.in_frame {
            return true;
        }
        if !self.warned_outside_frame {
            log::warn!("{what} outside begin_frame/end_frame is ignored");
            self.warned_outside_frame = true;
        }
        false
    }

    fn finish_frame(&mut self, frame: GpuFrame) {
        let device = self.gpu.device();
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("brisk frame encoder"),
        });

        let timer = self
            .frame_query
            .and_then(|q| self.queries.get(&q))
            .filter(|t| t.is_ended() && !self.ops.is_empty());

        frame::encode(
            EncodeCtx {
                device,
                queue: self.gpu.queue(),
                globals_layout: &self.layouts.globals,
                surface_view: &frame.view,
                timer,
            },
            &mut self.arena,
            &mut encoder,
            &self.ops,
        );
        let timed = timer.is_some();

        self.gpu.submit(encoder, frame);

        if let Some(t) = self.frame_query.and_then(|q| self.queries.get_mut(&q)) {
            if timed {
                t.schedule_map();
            } else {
                t.mark_lost();
            }
        }
    }
}

impl GpuBackend for WgpuBackend {
    fn begin_frame(&mut self) {
        if self.in_frame {
            log::warn!("begin_frame while a frame is open; dropping {} recorded ops", self.ops.len());
            self.ops.clear();
            self.frame = None;
        }
        self.in_frame = true;

        match self.gpu.acquire() {
            Ok(frame) => self.frame = Some(frame),
            Err(err) => {
                match self.gpu.handle_surface_error(&err) {
                    SurfaceErrorAction::Fatal => {
                        log::error!("surface lost: {err:?}");
                        self.fatal = true;
                    }
                    action => log::warn!("skipping frame: {err:?} ({action:?})"),
                }
                self.frame = None;
            }
        }
    }

    fn end_frame(&mut self) {
        if !self.in_frame {
            log::warn!("end_frame without begin_frame");
            return;
        }
        self.in_frame = false;

        match self.frame.take() {
            Some(frame) => self.finish_frame(frame),
            None => {
                if let Some(t) = self.frame_query.and_then(|q| self.queries.get_mut(&q)) {
                    t.mark_lost();
                }
            }
        }

        self.ops.clear();
        self.frame_query = None;
        for slot in self.buffers.values_mut() {
            slot.recycle();
        }
    }

    fn viewport_size(&self) -> (u32, u32) {
        match self.bound_target.and_then(|t| self.targets.get(&t)) {
            Some(t) => (t.width, t.height),
            None => {
                let size = self.gpu.size();
                (size.width.max(1), size.height.max(1))
            }
        }
    }

    fn max_texture_size(&self) -> u32 {
        self.gpu.max_texture_dimension()
    }

    fn create_buffer(&mut self, size: u64, usage: BufferUsage) -> BufferId {
        let id = BufferId(self.ids.next());
        log::debug!("creating {usage:?} vertex buffer {id:?} ({size} bytes)");
        self.buffers.insert(id, BufferSlot::new(self.gpu.device(), size, usage));
        id
    }

    fn write_buffer(&mut self, buffer: BufferId, offset: u64, data: &[u8]) {
        let Some(slot) = self.buffers.get_mut(&buffer) else {
            log::warn!("write to unknown buffer {buffer:?}");
            return;
        };
        assert!(
            offset + data.len() as u64 <= slot.size,
            "write of {} bytes at {offset} overflows buffer {buffer:?} of {} bytes",
            data.len(),
            slot.size
        );
        let target = slot.writable(self.gpu.device());
        self.gpu.queue().write_buffer(target, offset, data);
    }

    fn destroy_buffer(&mut self, buffer: BufferId) {
        self.buffers.remove(&buffer);
    }

    fn create_texture(&mut self, desc: &TextureDesc, pixels: Option<&[u8]>) -> TextureId {
        let id = TextureId(self.ids.next());
        let slot = TextureSlot::new(
            self.gpu.device(),
            self.gpu.queue(),
            &self.layouts.texture,
            &self.samplers,
            desc,
            pixels,
            false,
        );
        self.textures.insert(id, slot);
        id
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        self.textures.remove(&texture);
        if self.bound_texture == Some(texture) {
            self.bound_texture = None;
        }
    }

    fn bind_texture(&mut self, _unit: u32, texture: TextureId) {
        self.bound_texture = Some(texture);
    }

    fn create_shader(&mut self, vertex: &str, fragment: &str) -> Result<ShaderId, RenderError> {
        validate_vertex(vertex)?;
        validate_fragment(fragment)?;

        let device = self.gpu.device();
        let module = |label, src: &str| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(src.to_owned().into()),
            })
        };

        let slot = ShaderSlot {
            vertex: module("brisk vertex module", vertex),
            fragment: module("brisk fragment module", fragment),
            globals: Globals::default(),
        };
        let id = ShaderId(self.ids.next());
        self.shaders.insert(id, slot);
        Ok(id)
    }

    fn destroy_shader(&mut self, shader: ShaderId) {
        self.shaders.remove(&shader);
        self.pipelines.evict_shader(shader);
        if self.bound_shader == Some(shader) {
            self.bound_shader = None;
        }
    }

    fn use_shader(&mut self, shader: ShaderId) {
        self.bound_shader = Some(shader);
    }

    fn set_uniform(
        &mut self,
        shader: ShaderId,
        name: &str,
        value: UniformValue,
    ) -> Result<(), RenderError> {
        match self.shaders.get_mut(&shader) {
            Some(slot) => slot.globals.set(name, value),
            None => Err(RenderError::UnknownUniform(format!("{name} (shader {shader:?} destroyed)"))),
        }
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend = mode;
    }

    fn create_render_target(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<(TargetId, TextureId), RenderError> {
        let max = self.max_texture_size();
        if width == 0 || height == 0 || width > max || height > max {
            return Err(RenderError::IncompleteTarget { width, height, max });
        }

        let texture = TextureId(self.ids.next());
        let slot = TextureSlot::new(
            self.gpu.device(),
            self.gpu.queue(),
            &self.layouts.texture,
            &self.samplers,
            &TextureDesc {
                width,
                height,
                filter: TextureFilter::Linear,
            },
            None,
            true,
        );
        self.textures.insert(texture, slot);

        let id = TargetId(self.ids.next());
        self.targets.insert(id, TargetSlot { texture, width, height });
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
    }

    fn clear(&mut self, color: Color) {
        if !self.accepting_ops("clear") {
            return;
        }
        self.ops.push(FrameOp::Clear {
            target: self.bound_target,
            view: self.target_view(self.bound_target),
            color: color.to_wgpu(),
        });
    }

    fn draw_triangles(&mut self, buffer: BufferId, first_vertex: u32, vertex_count: u32) {
        if vertex_count == 0 || !self.accepting_ops("draw") {
            return;
        }

        let Some(shader_id) = self.bound_shader else {
            log::warn!("draw without a bound shader skipped");
            return;
        };
        let key = PipelineKey {
            shader: shader_id,
            blend: self.blend,
            format: self.target_format(),
        };
        let view = self.target_view(self.bound_target);
        let (Some(shader), Some(texture), Some(slot)) = (
            self.shaders.get(&shader_id),
            self.bound_texture.and_then(|t| self.textures.get(&t)),
            self.buffers.get_mut(&buffer),
        ) else {
            log::warn!("draw references a destroyed resource; skipped");
            return;
        };

        let pipeline = self.pipelines.get_or_create(
            self.gpu.device(),
            &self.layouts,
            key,
            &shader.vertex,
            &shader.fragment,
        );

        slot.referenced = true;
        let draw = DrawOp {
            pipeline,
            buffer: slot.current.clone(),
            first_vertex,
            vertex_count,
            texture: texture.bind_group.clone(),
            globals: shader.globals,
        };

        self.ops.push(FrameOp::Draw {
            target: self.bound_target,
            view,
            draw,
        });
    }

    fn supports_timer_queries(&self) -> bool {
        self.gpu.supports_timestamps()
    }

    fn begin_timer_query(&mut self) -> Option<QueryId> {
        if !self.gpu.supports_timestamps() {
            return None;
        }
        let mut query = self
            .free_queries
            .pop()
            .unwrap_or_else(|| TimerQuery::new(self.gpu.device()));
        query.reopen();

        let id = QueryId(self.ids.next());
        self.queries.insert(id, query);
        Some(id)
    }

    fn end_timer_query(&mut self, query: QueryId) {
        if let Some(q) = self.queries.get_mut(&query) {
            q.end();
            self.frame_query = Some(query);
        }
    }

    fn poll_timer_query(&mut self, query: QueryId) -> Option<u64> {
        if let Err(e) = self.gpu.device().poll(wgpu::PollType::Poll) {
            log::warn!("device poll failed: {e}");
        }
        self.queries.get_mut(&query)?.try_read(self.period_ns)
    }

    fn delete_timer_query(&mut self, query: QueryId) {
        if let Some(q) = self.queries.remove(&query)
            && q.is_reusable()
        {
            self.free_queries.push(q);
        }
    }
}

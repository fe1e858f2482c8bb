use std::collections::HashMap;
use std::f32::consts::TAU;
use std::path::Path;

use crate::backend::{
    BufferId, BufferUsage, GpuBackend, ShaderId, TargetId, TextureDesc, TextureFilter, TextureId,
    UniformValue,
};
use crate::coords::{Rect, StrokedRect, Transform, Vec2, Viewport};
use crate::error::RenderError;
use crate::paint::{BlendMode, Color};
use crate::time::CpuTimer;

use super::texture::{Decoded, TextureLoader};
use super::{
    assert_vertex_layout, build_vertices, ColoredPoint, GpuFrameTimer, GraphicsState,
    PendingTexture, RenderMetrics, RenderTarget, Renderer, RendererConfig, Shader, StateChange,
    StaticGeometry, Texture, TexturedPoint, TransformStack, Vertex, VertexBatch, DEFAULT_SHADER,
    VERTEX_STRIDE,
};

/// [`Renderer`] that accumulates vertices into a single dynamic buffer and
/// submits them through a [`GpuBackend`].
///
/// Owns the backend; use [`backend`](Self::backend) / [`backend_mut`](Self::backend_mut)
/// for backend-specific calls such as resizing a surface.
#[derive(Debug)]
pub struct BatchRenderer<B: GpuBackend> {
    gpu: B,
    config: RendererConfig,

    batch: VertexBatch,
    vertex_buffer: BufferId,
    stack: TransformStack,
    state: GraphicsState,

    default_shader: ShaderId,
    fallback: Texture,
    targets: HashMap<TargetId, TextureId>,
    static_geometry: Option<StaticGeometry>,

    metrics: RenderMetrics,
    gpu_timer: GpuFrameTimer,
    cpu_timer: CpuTimer,
    loader: TextureLoader,

    in_frame: bool,
}

impl<B: GpuBackend> BatchRenderer<B> {
    /// Allocates the dynamic vertex buffer, the 1x1 white fallback texture and
    /// the default shader.
    ///
    /// # Panics
    /// If the vertex layout does not match its stride.
    pub fn new(mut gpu: B, config: RendererConfig) -> Result<Self, RenderError> {
        assert_vertex_layout();

        let capacity = config.max_triangles * 3;
        let vertex_buffer = gpu.create_buffer(capacity as u64 * VERTEX_STRIDE, BufferUsage::Dynamic);

        let fallback_id = gpu.create_texture(
            &TextureDesc {
                width: 1,
                height: 1,
                filter: TextureFilter::Nearest,
            },
            Some(&[255, 255, 255, 255]),
        );
        let fallback = Texture {
            id: fallback_id,
            width: 1,
            height: 1,
        };

        let default_shader = gpu.create_shader(DEFAULT_SHADER, DEFAULT_SHADER)?;

        log::debug!(
            "batch renderer ready: {} triangles/batch ({} KiB vertex buffer)",
            config.max_triangles,
            capacity as u64 * VERTEX_STRIDE / 1024
        );

        Ok(Self {
            gpu,
            config,
            batch: VertexBatch::with_capacity(capacity),
            vertex_buffer,
            stack: TransformStack::new(config.max_transform_depth),
            state: GraphicsState::new(fallback_id, default_shader),
            default_shader,
            fallback,
            targets: HashMap::new(),
            static_geometry: None,
            metrics: RenderMetrics::default(),
            gpu_timer: GpuFrameTimer::new(),
            cpu_timer: CpuTimer::new(),
            loader: TextureLoader::new(),
            in_frame: false,
        })
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.gpu
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.gpu
    }

    #[inline]
    pub fn config(&self) -> RendererConfig {
        self.config
    }

    #[inline]
    pub fn state(&self) -> &GraphicsState {
        &self.state
    }

    /// Vertices waiting for the next flush.
    #[inline]
    pub fn pending_vertices(&self) -> usize {
        self.batch.len()
    }

    #[inline]
    pub fn fallback_texture(&self) -> Texture {
        self.fallback
    }

    #[inline]
    pub fn static_geometry(&self) -> Option<StaticGeometry> {
        self.static_geometry
    }

    pub fn default_shader(&self) -> Shader {
        Shader { id: self.default_shader }
    }

    /// Releases every GPU resource the renderer created.
    pub fn into_backend(mut self) -> B {
        self.gpu_timer.release(&mut self.gpu);
        if let Some(geometry) = self.static_geometry.take() {
            self.gpu.destroy_buffer(geometry.buffer);
        }
        self.gpu.destroy_buffer(self.vertex_buffer);
        self.gpu.destroy_texture(self.fallback.id);
        self.gpu.destroy_shader(self.default_shader);
        self.gpu
    }

    // ---- state gate --------------------------------------------------------

    /// Single entry point for GPU-global state: flush, then apply, when the value changes.
    fn transition(&mut self, change: StateChange) {
        if !self.state.differs(change) {
            return;
        }
        self.flush();
        self.state.apply(change);
        self.bind(change);
    }

    fn bind(&mut self, change: StateChange) {
        match change {
            StateChange::Texture(t) => self.gpu.bind_texture(0, t),
            StateChange::Shader(s) => {
                self.gpu.use_shader(s);
                self.upload_resolution();
            }
            StateChange::Blend(b) => self.gpu.set_blend_mode(b),
            StateChange::Target(t) => {
                self.gpu.bind_render_target(t);
                self.upload_resolution();
            }
        }
    }

    /// Puts the backend into the frame-start state regardless of what the renderer last saw.
    fn reset_state(&mut self) {
        self.state = GraphicsState::new(self.fallback.id, self.default_shader);
        for change in [
            StateChange::Target(None),
            StateChange::Shader(self.default_shader),
            StateChange::Blend(BlendMode::Alpha),
            StateChange::Texture(self.fallback.id),
        ] {
            self.bind(change);
        }
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        if let Err(e) = self.gpu.set_uniform(self.state.shader, name, value) {
            panic!("{e}");
        }
    }

    fn upload_resolution(&mut self) {
        let (w, h) = self.gpu.viewport_size();
        self.set_uniform("Resolution", UniformValue::Vec2(Viewport::from_pixels(w, h).to_uniform()));
    }

    fn upload_transform(&mut self) {
        let t = self.stack.current();
        self.set_uniform("Transform", UniformValue::Mat3(t.to_mat3()));
        self.set_uniform("Zoom", UniformValue::Float(t.zoom()));
    }

    // ---- accumulation ------------------------------------------------------

    fn append_triangle(&mut self, texture: Texture, vertices: [Vertex; 3]) {
        if let Some(target) = self.state.target {
            assert!(
                self.targets.get(&target) != Some(&texture.id),
                "render target {target:?} cannot be drawn into itself"
            );
        }

        self.transition(StateChange::Texture(texture.id));
        if self.batch.would_overflow(3) {
            self.flush();
        }
        for v in vertices {
            self.batch.push(v);
        }
    }

    fn texture_limit(&self) -> u32 {
        self.config.max_texture_size.min(self.gpu.max_texture_size())
    }

    fn check_texture_size(&self, width: u32, height: u32, what: &str) {
        let max = self.texture_limit();
        assert!(
            width <= max && height <= max,
            "texture {what} is {width}x{height}, larger than the maximum size {max}x{max}"
        );
    }

    fn upload_texture(&mut self, width: u32, height: u32, premultiplied: &[u8]) -> Texture {
        let id = self.gpu.create_texture(
            &TextureDesc {
                width,
                height,
                filter: TextureFilter::Linear,
            },
            Some(premultiplied),
        );
        Texture { id, width, height }
    }

    /// Uploads every image decoded since the last frame and resolves its future.
    fn upload_decoded(&mut self) {
        let finished: Vec<Decoded> = self.loader.finished().collect();
        for Decoded { completion, result } in finished {
            let result = result.map(|img| {
                self.check_texture_size(img.width, img.height, &img.path.display().to_string());
                log::debug!("uploading texture {} ({}x{})", img.path.display(), img.width, img.height);
                self.upload_texture(img.width, img.height, &img.pixels)
            });
            if let Err(e) = &result {
                log::warn!("{e}");
            }
            completion.complete(result);
        }
    }
}

impl<B: GpuBackend> Renderer for BatchRenderer<B> {
    fn begin_frame(&mut self, clear: Color) {
        if self.in_frame {
            log::warn!(
                "begin_frame called twice without end_frame; discarding {} pending vertices",
                self.batch.len()
            );
        } else if !self.batch.is_empty() {
            log::warn!("discarding {} vertices drawn outside a frame", self.batch.len());
        }
        self.batch.clear();
        self.in_frame = true;

        self.metrics.reset_counters();
        self.cpu_timer.start();

        self.upload_decoded();
        self.gpu.begin_frame();
        self.metrics.gpu_frame_time_ms = self.gpu_timer.begin_frame(&mut self.gpu);

        self.stack.reset();
        self.reset_state();
        self.gpu.clear(clear);
    }

    fn end_frame(&mut self) {
        if !self.in_frame {
            log::warn!("end_frame called without begin_frame");
            return;
        }

        self.flush();
        if let Some(ms) = self.cpu_timer.elapsed_ms() {
            self.metrics.cpu_frame_time_ms = ms;
        }
        self.gpu_timer.end_frame(&mut self.gpu);
        self.gpu.end_frame();
        self.in_frame = false;
    }

    fn flush(&mut self) {
        if self.batch.is_empty() {
            return;
        }

        let count = self.batch.len() as u32;
        self.upload_transform();
        self.gpu.write_buffer(self.vertex_buffer, 0, bytemuck::cast_slice(self.batch.as_slice()));
        self.gpu.draw_triangles(self.vertex_buffer, 0, count);
        self.metrics.record_draw(count);
        self.batch.clear();

        log::trace!("flush: {} vertices", count);
    }

    fn metrics(&self) -> RenderMetrics {
        self.metrics
    }

    // ---- transforms --------------------------------------------------------

    fn push(&mut self) {
        self.stack.push();
    }

    fn pop(&mut self) {
        self.stack.pop();
    }

    fn origin(&mut self) {
        self.stack.origin();
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.stack.translate(x, y);
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.stack.scale(sx, sy);
    }

    fn rotate(&mut self, angle: f32) {
        self.stack.rotate(angle);
    }

    fn apply_transform(&mut self, t: Transform) {
        self.stack.apply(t);
    }

    fn transform(&self) -> Transform {
        self.stack.current()
    }

    // ---- state -------------------------------------------------------------

    fn set_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.state.set_color(r, g, b, a);
    }

    fn set_rgb(&mut self, r: f32, g: f32, b: f32) {
        self.state.set_rgb(r, g, b);
    }

    fn set_alpha(&mut self, a: f32) {
        self.state.set_alpha(a);
    }

    fn color(&self) -> Color {
        self.state.color()
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.transition(StateChange::Blend(mode));
    }

    fn blend_mode(&self) -> BlendMode {
        self.state.blend
    }

    fn set_shader(&mut self, shader: Option<Shader>) {
        let id = shader.map_or(self.default_shader, |s| s.id);
        self.transition(StateChange::Shader(id));
    }

    fn create_shader(&mut self, vertex: &str, fragment: &str) -> Result<Shader, RenderError> {
        let id = self.gpu.create_shader(vertex, fragment)?;
        log::debug!("created shader {:?}", id);
        Ok(Shader { id })
    }

    fn create_vertex_shader(&mut self, vertex: &str) -> Result<Shader, RenderError> {
        self.create_shader(vertex, DEFAULT_SHADER)
    }

    fn create_fragment_shader(&mut self, fragment: &str) -> Result<Shader, RenderError> {
        self.create_shader(DEFAULT_SHADER, fragment)
    }

    fn destroy_shader(&mut self, shader: Shader) {
        if shader.id == self.default_shader {
            log::warn!("ignoring request to destroy the default shader");
            return;
        }
        if self.state.shader == shader.id {
            self.set_shader(None);
        }
        self.gpu.destroy_shader(shader.id);
    }

    // ---- primitives --------------------------------------------------------

    fn draw_triangle(&mut self, a: ColoredPoint, b: ColoredPoint, c: ColoredPoint) {
        let min_x = a.pos.x.min(b.pos.x).min(c.pos.x);
        let min_y = a.pos.y.min(b.pos.y).min(c.pos.y);
        let max_x = a.pos.x.max(b.pos.x).max(c.pos.x);
        let max_y = a.pos.y.max(b.pos.y).max(c.pos.y);
        let w = if max_x > min_x { max_x - min_x } else { 1.0 };
        let h = if max_y > min_y { max_y - min_y } else { 1.0 };

        let textured = |p: ColoredPoint| {
            TexturedPoint::new(p.pos.x, p.pos.y, p.color, (p.pos.x - min_x) / w, (p.pos.y - min_y) / h)
        };
        self.draw_triangle_textured(self.fallback, textured(a), textured(b), textured(c));
    }

    fn draw_triangle_textured(&mut self, texture: Texture, a: TexturedPoint, b: TexturedPoint, c: TexturedPoint) {
        self.append_triangle(texture, [a.to_vertex(), b.to_vertex(), c.to_vertex()]);
    }

    fn draw_quad(&mut self, a: ColoredPoint, b: ColoredPoint, c: ColoredPoint, d: ColoredPoint) {
        self.draw_triangle(a, b, c);
        self.draw_triangle(a, c, d);
    }

    fn draw_quad_textured(
        &mut self,
        texture: Texture,
        a: TexturedPoint,
        b: TexturedPoint,
        c: TexturedPoint,
        d: TexturedPoint,
    ) {
        self.draw_triangle_textured(texture, a, b, c);
        self.draw_triangle_textured(texture, a, c, d);
    }

    fn draw_tri(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32) {
        let color = self.state.color();
        self.draw_triangle(
            ColoredPoint::new(x1, y1, color),
            ColoredPoint::new(x2, y2, color),
            ColoredPoint::new(x3, y3, color),
        );
    }

    fn draw_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.draw_tri(x, y, x + w, y, x, y + h);
        self.draw_tri(x + w, y, x + w, y + h, x, y + h);
    }

    fn draw_circle(&mut self, cx: f32, cy: f32, radius: f32, segments: u32) {
        let segments = segments.max(3);
        let step = TAU / segments as f32;
        let mut prev = Vec2::new(cx + radius, cy);

        for i in 1..=segments {
            let (sin, cos) = (i as f32 * step).sin_cos();
            let next = Vec2::new(cx + cos * radius, cy + sin * radius);
            self.draw_tri(cx, cy, prev.x, prev.y, next.x, next.y);
            prev = next;
        }
    }

    fn draw_point(&mut self, x: f32, y: f32) {
        self.draw_rect(x, y, 1.0, 1.0);
    }

    // ---- textures ----------------------------------------------------------

    fn load_texture(&mut self, path: &Path) -> PendingTexture {
        self.loader.load(path)
    }

    fn create_texture_rgba(&mut self, width: u32, height: u32, pixels: &[u8]) -> Texture {
        self.check_texture_size(width, height, "from pixels");
        assert_eq!(
            pixels.len(),
            width as usize * height as usize * 4,
            "pixel data does not match a {width}x{height} RGBA8 texture"
        );

        let mut premultiplied = pixels.to_vec();
        super::premultiply_rgba8(&mut premultiplied);
        self.upload_texture(width, height, &premultiplied)
    }

    fn destroy_texture(&mut self, texture: Texture) {
        if texture.id == self.fallback.id {
            log::warn!("ignoring request to destroy the fallback texture");
            return;
        }
        if self.state.texture == texture.id {
            self.transition(StateChange::Texture(self.fallback.id));
        }
        self.gpu.destroy_texture(texture.id);
    }

    fn draw_texture(&mut self, texture: Texture, x: f32, y: f32) {
        let (w, h) = (texture.width as f32, texture.height as f32);
        let c = self.state.color();
        self.draw_triangle_textured(
            texture,
            TexturedPoint::new(x, y, c, 0.0, 0.0),
            TexturedPoint::new(x + w, y, c, 1.0, 0.0),
            TexturedPoint::new(x, y + h, c, 0.0, 1.0),
        );
        self.draw_triangle_textured(
            texture,
            TexturedPoint::new(x + w, y, c, 1.0, 0.0),
            TexturedPoint::new(x + w, y + h, c, 1.0, 1.0),
            TexturedPoint::new(x, y + h, c, 0.0, 1.0),
        );
    }

    fn draw_texture_rect(&mut self, texture: Texture, x: f32, y: f32, source: Rect) {
        let (tw, th) = (texture.width as f32, texture.height as f32);
        let src = source.clamped_to(tw, th);
        if src.is_empty() {
            return;
        }

        let (u1, v1) = (src.origin.x / tw, src.origin.y / th);
        let (u2, v2) = (src.max().x / tw, src.max().y / th);
        let (w, h) = (src.size.x, src.size.y);
        let c = self.state.color();

        self.draw_quad_textured(
            texture,
            TexturedPoint::new(x, y, c, u1, v1),
            TexturedPoint::new(x + w, y, c, u2, v1),
            TexturedPoint::new(x + w, y + h, c, u2, v2),
            TexturedPoint::new(x, y + h, c, u1, v2),
        );
    }

    // ---- static geometry ---------------------------------------------------

    fn build_static_geometry(&mut self, rects: &[StrokedRect]) {
        if let Some(previous) = self.static_geometry.take() {
            self.gpu.destroy_buffer(previous.buffer);
        }
        if rects.is_empty() {
            return;
        }

        let vertices = build_vertices(rects, self.state.color());
        let bytes: &[u8] = bytemuck::cast_slice(&vertices);
        let buffer = self.gpu.create_buffer(bytes.len() as u64, BufferUsage::Static);
        self.gpu.write_buffer(buffer, 0, bytes);

        log::debug!(
            "static geometry: {} rects, {} vertices ({} KiB)",
            rects.len(),
            vertices.len(),
            bytes.len() / 1024
        );
        self.static_geometry = Some(StaticGeometry {
            buffer,
            vertex_count: vertices.len() as u32,
        });
    }

    fn draw_static_geometry(&mut self) {
        let Some(geometry) = self.static_geometry else {
            return;
        };

        self.transition(StateChange::Texture(self.fallback.id));
        // Dynamic vertices queued earlier must land underneath.
        self.flush();

        self.upload_transform();
        self.gpu.draw_triangles(geometry.buffer, 0, geometry.vertex_count);
        self.metrics.record_draw(geometry.vertex_count);
    }

    // ---- render targets ----------------------------------------------------

    fn create_render_target(&mut self, width: u32, height: u32) -> Result<RenderTarget, RenderError> {
        self.check_texture_size(width, height, "of a render target");
        if width == 0 || height == 0 {
            let max = self.texture_limit();
            return Err(RenderError::IncompleteTarget { width, height, max });
        }

        let (id, texture) = self.gpu.create_render_target(width, height)?;
        self.targets.insert(id, texture);
        log::debug!("created render target {:?} ({}x{})", id, width, height);

        Ok(RenderTarget {
            id,
            texture: Texture {
                id: texture,
                width,
                height,
            },
        })
    }

    fn set_render_target(&mut self, target: Option<&RenderTarget>) {
        self.transition(StateChange::Target(target.map(|t| t.id)));
    }

    fn draw_render_target(&mut self, target: &RenderTarget, x: f32, y: f32) {
        self.draw_texture(target.texture, x, y);
    }

    fn clear_render_target(&mut self, color: Option<Color>) {
        if self.state.target.is_none() {
            return;
        }
        self.flush();
        self.gpu.clear(color.unwrap_or(Color::transparent()));
    }

    fn destroy_render_target(&mut self, target: RenderTarget) {
        if self.state.target == Some(target.id) {
            self.set_render_target(None);
        }
        if self.state.texture == target.texture.id {
            self.transition(StateChange::Texture(self.fallback.id));
        }
        self.targets.remove(&target.id);
        self.gpu.destroy_render_target(target.id);
    }
}

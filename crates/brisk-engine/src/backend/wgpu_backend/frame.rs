//! Per-frame command recording and encoding.
//!
//! Immediate-mode calls append [`FrameOp`]s; `end_frame` turns them into
//! render passes. A pass ends when the destination changes or a clear is
//! requested, so clears map onto `LoadOp::Clear`.

use crate::backend::{Globals, TargetId};

use super::timer::TimerQuery;

pub(super) struct DrawOp {
    pub pipeline: wgpu::RenderPipeline,
    pub buffer: wgpu::Buffer,
    pub first_vertex: u32,
    pub vertex_count: u32,
    pub texture: wgpu::BindGroup,
    pub globals: Globals,
}

pub(super) enum FrameOp {
    Clear {
        target: Option<TargetId>,
        view: Option<wgpu::TextureView>,
        color: wgpu::Color,
    },
    Draw {
        target: Option<TargetId>,
        view: Option<wgpu::TextureView>,
        draw: DrawOp,
    },
}

impl FrameOp {
    fn target(&self) -> Option<TargetId> {
        match self {
            FrameOp::Clear { target, .. } | FrameOp::Draw { target, .. } => *target,
        }
    }

    /// `None` means the surface.
    fn view(&self) -> Option<&wgpu::TextureView> {
        match self {
            FrameOp::Clear { view, .. } | FrameOp::Draw { view, .. } => view.as_ref(),
        }
    }
}

/// A run of ops that share one render pass.
struct PassPlan {
    start: usize,
    end: usize,
    clear: Option<wgpu::Color>,
}

fn plan_passes(ops: &[FrameOp]) -> Vec<PassPlan> {
    let mut passes: Vec<PassPlan> = Vec::new();

    for (i, op) in ops.iter().enumerate() {
        let continues = match (op, passes.last()) {
            (FrameOp::Draw { .. }, Some(last)) => ops[last.start].target() == op.target(),
            _ => false,
        };

        if continues {
            if let Some(last) = passes.last_mut() {
                last.end = i + 1;
            }
        } else {
            passes.push(PassPlan {
                start: i,
                end: i + 1,
                clear: match op {
                    FrameOp::Clear { color, .. } => Some(*color),
                    FrameOp::Draw { .. } => None,
                },
            });
        }
    }

    passes
}

/// Uniform buffer holding one `Globals` block per draw, addressed by dynamic offset.
pub(super) struct GlobalsArena {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    capacity: u64,
    stride: u64,
}

impl GlobalsArena {
    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout) -> Self {
        let align = u64::from(device.limits().min_uniform_buffer_offset_alignment);
        let stride = Globals::SIZE.div_ceil(align) * align;
        let (buffer, bind_group) = Self::allocate(device, layout, stride, 64);
        Self {
            buffer,
            bind_group,
            capacity: 64,
            stride,
        }
    }

    fn allocate(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        stride: u64,
        capacity: u64,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("brisk globals"),
            size: stride * capacity,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("brisk globals bind group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(Globals::SIZE),
                }),
            }],
        });

        (buffer, bind_group)
    }

    /// Uploads the blocks of every draw in `ops`, growing the buffer if needed.
    fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        ops: &[FrameOp],
    ) {
        let draws: Vec<&Globals> = ops
            .iter()
            .filter_map(|op| match op {
                FrameOp::Draw { draw, .. } => Some(&draw.globals),
                FrameOp::Clear { .. } => None,
            })
            .collect();
        if draws.is_empty() {
            return;
        }

        let needed = draws.len() as u64;
        if needed > self.capacity {
            let capacity = needed.next_power_of_two();
            log::debug!("growing globals buffer to {capacity} blocks");
            let (buffer, bind_group) = Self::allocate(device, layout, self.stride, capacity);
            self.buffer = buffer;
            self.bind_group = bind_group;
            self.capacity = capacity;
        }

        let mut bytes = vec![0u8; (needed * self.stride) as usize];
        for (i, globals) in draws.into_iter().enumerate() {
            let at = i * self.stride as usize;
            bytes[at..at + Globals::SIZE as usize].copy_from_slice(bytemuck::bytes_of(globals));
        }
        queue.write_buffer(&self.buffer, 0, &bytes);
    }
}

pub(super) struct EncodeCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub globals_layout: &'a wgpu::BindGroupLayout,
    pub surface_view: &'a wgpu::TextureView,
    pub timer: Option<&'a TimerQuery>,
}

/// Encodes `ops` into `encoder`, one render pass per [`PassPlan`].
pub(super) fn encode(
    ctx: EncodeCtx<'_>,
    arena: &mut GlobalsArena,
    encoder: &mut wgpu::CommandEncoder,
    ops: &[FrameOp],
) {
    arena.upload(ctx.device, ctx.queue, ctx.globals_layout, ops);

    let passes = plan_passes(ops);
    let last = passes.len().saturating_sub(1);
    let mut draw_index = 0u64;

    for (p, plan) in passes.iter().enumerate() {
        let view = ops[plan.start].view().unwrap_or(ctx.surface_view);
        let load = match plan.clear {
            Some(color) => wgpu::LoadOp::Clear(color),
            None => wgpu::LoadOp::Load,
        };

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("brisk batch pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: ctx.timer.and_then(|t| t.timestamp_writes(p == 0, p == last)),
            occlusion_query_set: None,
            multiview_mask: None,
        });

        for op in &ops[plan.start..plan.end] {
            let FrameOp::Draw { draw, .. } = op else { continue };

            let offset = (draw_index * arena.stride) as u32;
            draw_index += 1;

            rpass.set_pipeline(&draw.pipeline);
            rpass.set_bind_group(0, &arena.bind_group, &[offset]);
            rpass.set_bind_group(1, &draw.texture, &[]);
            rpass.set_vertex_buffer(0, draw.buffer.slice(..));
            rpass.draw(draw.first_vertex..draw.first_vertex + draw.vertex_count, 0..1);
        }
    }

    if let Some(timer) = ctx.timer
        && !passes.is_empty()
    {
        timer.encode_resolve(encoder);
    }
}

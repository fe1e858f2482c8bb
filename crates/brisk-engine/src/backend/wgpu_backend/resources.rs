use crate::backend::{BufferUsage, TextureDesc, TextureFilter};

/// Format of off-screen targets and uploaded textures.
pub(super) const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// A vertex buffer; dynamic ones are orphaned when rewritten after a recorded draw.
///
/// Queue writes land before the frame's command buffer runs, so a draw only
/// reads the bytes it was recorded with if each rewrite goes to a buffer no
/// earlier draw of the frame references.
pub(super) struct BufferSlot {
    pub usage: BufferUsage,
    pub size: u64,
    pub current: wgpu::Buffer,
    /// `current` is referenced by a draw of the frame being recorded.
    pub referenced: bool,
    /// Orphaned this frame; reusable once the frame is submitted.
    retired: Vec<wgpu::Buffer>,
    spare: Vec<wgpu::Buffer>,
}

impl BufferSlot {
    pub fn new(device: &wgpu::Device, size: u64, usage: BufferUsage) -> Self {
        Self {
            usage,
            size,
            current: create_vertex_buffer(device, size, usage),
            referenced: false,
            retired: Vec::new(),
            spare: Vec::new(),
        }
    }

    /// Buffer that a write at this point must target.
    pub fn writable(&mut self, device: &wgpu::Device) -> &wgpu::Buffer {
        if self.referenced && self.usage == BufferUsage::Dynamic {
            let fresh = self
                .spare
                .pop()
                .unwrap_or_else(|| create_vertex_buffer(device, self.size, self.usage));
            let old = std::mem::replace(&mut self.current, fresh);
            self.retired.push(old);
            self.referenced = false;
        }
        &self.current
    }

    /// Called after submission: orphans of this frame become reusable.
    pub fn recycle(&mut self) {
        self.referenced = false;
        self.spare.append(&mut self.retired);
    }
}

fn create_vertex_buffer(device: &wgpu::Device, size: u64, usage: BufferUsage) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(match usage {
            BufferUsage::Dynamic => "brisk dynamic vertices",
            BufferUsage::Static => "brisk static vertices",
        }),
        size,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

pub(super) struct TextureSlot {
    pub width: u32,
    pub height: u32,
    pub view: wgpu::TextureView,
    pub bind_group: wgpu::BindGroup,
    /// Kept so the GPU texture lives as long as the slot.
    _texture: wgpu::Texture,
}

pub(super) struct Samplers {
    nearest: wgpu::Sampler,
    linear: wgpu::Sampler,
}

impl Samplers {
    pub fn new(device: &wgpu::Device) -> Self {
        let make = |label, filter| {
            device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some(label),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                mag_filter: filter,
                min_filter: filter,
                ..Default::default()
            })
        };
        Self {
            nearest: make("brisk nearest sampler", wgpu::FilterMode::Nearest),
            linear: make("brisk linear sampler", wgpu::FilterMode::Linear),
        }
    }

    fn get(&self, filter: TextureFilter) -> &wgpu::Sampler {
        match filter {
            TextureFilter::Nearest => &self.nearest,
            TextureFilter::Linear => &self.linear,
        }
    }
}

impl TextureSlot {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        samplers: &Samplers,
        desc: &TextureDesc,
        pixels: Option<&[u8]>,
        render_target: bool,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: desc.width,
            height: desc.height,
            depth_or_array_layers: 1,
        };

        let mut usage = wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST;
        if render_target {
            usage |= wgpu::TextureUsages::RENDER_ATTACHMENT;
        }

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(if render_target { "brisk render target" } else { "brisk texture" }),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TEXTURE_FORMAT,
            usage,
            view_formats: &[],
        });

        if let Some(pixels) = pixels {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                pixels,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * desc.width),
                    rows_per_image: Some(desc.height),
                },
                size,
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("brisk texture bind group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(samplers.get(desc.filter)),
                },
            ],
        });

        Self {
            width: desc.width,
            height: desc.height,
            view,
            bind_group,
            _texture: texture,
        }
    }
}

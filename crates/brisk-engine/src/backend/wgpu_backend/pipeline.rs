use std::collections::HashMap;
use std::num::NonZeroU64;

use crate::backend::{Globals, ShaderId};
use crate::paint::BlendMode;
use crate::render::Vertex;

/// Layouts shared by every program: globals at group 0, texture + sampler at group 1.
pub(super) struct Layouts {
    pub globals: wgpu::BindGroupLayout,
    pub texture: wgpu::BindGroupLayout,
    pub pipeline: wgpu::PipelineLayout,
}

impl Layouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let globals = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("brisk globals bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(Globals::SIZE),
                },
                count: None,
            }],
        });

        let texture = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("brisk texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("brisk pipeline layout"),
            bind_group_layouts: &[&globals, &texture],
            immediate_size: 0,
        });

        Self {
            globals,
            texture,
            pipeline,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(super) struct PipelineKey {
    pub shader: ShaderId,
    pub blend: BlendMode,
    pub format: wgpu::TextureFormat,
}

/// Render pipelines built on first use, one per (shader, blend mode, target format).
#[derive(Default)]
pub(super) struct PipelineCache {
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
}

impl PipelineCache {
    pub fn get_or_create(
        &mut self,
        device: &wgpu::Device,
        layouts: &Layouts,
        key: PipelineKey,
        vertex: &wgpu::ShaderModule,
        fragment: &wgpu::ShaderModule,
    ) -> wgpu::RenderPipeline {
        self.pipelines
            .entry(key)
            .or_insert_with(|| {
                log::debug!(
                    "creating pipeline: shader {:?}, {:?} blend, {:?}",
                    key.shader,
                    key.blend,
                    key.format
                );
                create_pipeline(device, layouts, key, vertex, fragment)
            })
            .clone()
    }

    /// Drops every pipeline built from `shader`.
    pub fn evict_shader(&mut self, shader: ShaderId) {
        self.pipelines.retain(|k, _| k.shader != shader);
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layouts: &Layouts,
    key: PipelineKey,
    vertex: &wgpu::ShaderModule,
    fragment: &wgpu::ShaderModule,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("brisk batch pipeline"),
        layout: Some(&layouts.pipeline),

        vertex: wgpu::VertexState {
            module: vertex,
            entry_point: Some(crate::backend::wgsl::VERTEX_ENTRY),
            compilation_options: Default::default(),
            buffers: &[Vertex::layout()],
        },

        fragment: Some(wgpu::FragmentState {
            module: fragment,
            entry_point: Some(crate::backend::wgsl::FRAGMENT_ENTRY),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: key.format,
                blend: key.blend.to_wgpu(),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },

        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

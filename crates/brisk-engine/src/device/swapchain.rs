use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;

use super::{GpuFrame, GpuInit};

/// What the caller should do after a failed acquire.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// The surface was configured again; the next frame can proceed.
    Reconfigured,
    SkipFrame,
    /// The device is out of memory; stop rendering.
    Fatal,
}

/// Window surface plus its current configuration.
pub(crate) struct Swapchain {
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    /// Last size reported by the window; may be zero while minimized.
    size: PhysicalSize<u32>,
}

impl Swapchain {
    pub(crate) fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        device: &wgpu::Device,
        size: PhysicalSize<u32>,
        init: &GpuInit,
    ) -> Result<Self> {
        let caps = surface.get_capabilities(adapter);
        let format = pick_format(&caps.formats, init.srgb_surface)
            .context("surface reports no texture formats")?;
        let alpha_mode = init
            .alpha_mode
            .filter(|m| caps.alpha_modes.contains(m))
            .or_else(|| caps.alpha_modes.first().copied())
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: init.present_mode,
            alpha_mode,
            view_formats: Vec::new(),
            desired_maximum_frame_latency: init.frame_latency,
        };
        surface.configure(device, &config);

        Ok(Self { surface, config, size })
    }

    pub(crate) fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    fn has_area(&self) -> bool {
        self.size.width > 0 && self.size.height > 0
    }

    pub(crate) fn resize(&mut self, device: &wgpu::Device, size: PhysicalSize<u32>) {
        self.size = size;
        // A 0x0 configuration is invalid; keep the old one until the window is restored.
        if !self.has_area() {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(device, &self.config);
    }

    pub(crate) fn acquire(&self) -> Result<GpuFrame, wgpu::SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        Ok(GpuFrame { surface_texture, view })
    }

    pub(crate) fn recover(&self, device: &wgpu::Device, err: &wgpu::SurfaceError) -> SurfaceErrorAction {
        match err {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                if self.has_area() {
                    self.surface.configure(device, &self.config);
                }
                SurfaceErrorAction::Reconfigured
            }
            wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
            wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
        }
    }
}

fn pick_format(formats: &[wgpu::TextureFormat], srgb: bool) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .copied()
        .find(|f| f.is_srgb() == srgb)
        .or_else(|| formats.first().copied())
}

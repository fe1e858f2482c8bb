use std::sync::Arc;

use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::swapchain::Swapchain;
use super::{GpuFrame, GpuInit, SurfaceErrorAction};

/// Device, queue and window surface of one window.
pub struct Gpu {
    // Declared before the window so the surface is dropped first.
    swapchain: Swapchain,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
    timestamps: bool,
    _window: Arc<Window>,
}

impl Gpu {
    pub async fn new(window: Arc<Window>, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no GPU adapter can present to this window")?;

        let timestamps = init.timestamp_queries && adapter.features().contains(wgpu::Features::TIMESTAMP_QUERY);
        if init.timestamp_queries && !timestamps {
            log::warn!("adapter lacks TIMESTAMP_QUERY; GPU frame time disabled");
        }
        let mut required_features = init.required_features;
        if timestamps {
            required_features |= wgpu::Features::TIMESTAMP_QUERY;
        }

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("brisk device"),
                required_features,
                required_limits: init.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device")?;

        let swapchain = Swapchain::new(surface, &adapter, &device, size, &init)?;

        let info = adapter.get_info();
        log::info!(
            "GPU: {} ({:?}), surface {:?}, timestamps {}",
            info.name,
            info.backend,
            swapchain.format(),
            if timestamps { "on" } else { "off" }
        );

        Ok(Self {
            swapchain,
            adapter,
            device,
            queue,
            timestamps,
            _window: window,
        })
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.swapchain.format()
    }

    /// Window size in physical pixels; zero while minimized.
    pub fn size(&self) -> PhysicalSize<u32> {
        self.swapchain.size()
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    pub fn supports_timestamps(&self) -> bool {
        self.timestamps
    }

    pub fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.swapchain.resize(&self.device, size);
    }

    pub fn acquire(&self) -> Result<GpuFrame, wgpu::SurfaceError> {
        self.swapchain.acquire()
    }

    /// Submits `encoder`, then presents `frame`.
    pub fn submit(&self, encoder: wgpu::CommandEncoder, frame: GpuFrame) {
        self.queue.submit([encoder.finish()]);
        let GpuFrame { surface_texture, view } = frame;
        drop(view);
        surface_texture.present();
    }

    pub fn handle_surface_error(&self, err: &wgpu::SurfaceError) -> SurfaceErrorAction {
        self.swapchain.recover(&self.device, err)
    }
}

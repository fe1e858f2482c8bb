/// Device and surface options for [`Gpu::new`](super::Gpu::new).
#[derive(Debug, Clone)]
pub struct GpuInit {
    pub present_mode: wgpu::PresentMode,
    /// Falls back to the surface's first supported mode when unsupported.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,
    /// Picks an `*Srgb` surface format.
    ///
    /// Off by default: colors and textures are blended in the space they are
    /// given, the same as off-screen targets (`Rgba8Unorm`).
    pub srgb_surface: bool,
    pub required_features: wgpu::Features,
    pub required_limits: wgpu::Limits,
    pub frame_latency: u32,
    /// Adds `TIMESTAMP_QUERY` when the adapter has it; needed for GPU frame time.
    pub timestamp_queries: bool,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            srgb_surface: false,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            frame_latency: 2,
            timestamp_queries: true,
        }
    }
}

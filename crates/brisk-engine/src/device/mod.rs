//! wgpu device and window surface.
//!
//! [`Gpu`] is created once per window and handed to
//! [`WgpuBackend`](crate::backend::WgpuBackend), which drives all rendering.

mod context;
mod frame;
mod init;
mod swapchain;

pub use context::Gpu;
pub use frame::GpuFrame;
pub use init::GpuInit;
pub use swapchain::SurfaceErrorAction;

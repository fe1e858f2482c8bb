//! Pan/zoom stress scene for the brisk renderer.
//!
//! Left-drag pans, the wheel zooms around the cursor. Metrics are logged once a second.

mod app;
mod camera;
mod scene;

use anyhow::{Context, Result};
use winit::event_loop::EventLoop;

use brisk_engine::device::GpuInit;
use brisk_engine::logging::{init_logging, LoggingConfig};

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let gpu_init = GpuInit {
        present_mode: wgpu::PresentMode::AutoVsync,
        ..GpuInit::default()
    };

    let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
    let mut app = app::DemoApp::new(gpu_init);

    event_loop
        .run_app(&mut app)
        .context("winit event loop terminated with error")?;

    match app.take_failure() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

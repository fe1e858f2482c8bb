use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::window::{Window, WindowId};

use brisk_engine::backend::WgpuBackend;
use brisk_engine::coords::Vec2;
use brisk_engine::device::{Gpu, GpuInit};
use brisk_engine::paint::Color;
use brisk_engine::render::{BatchRenderer, Renderer, RendererConfig};
use brisk_engine::time::FrameClock;

use crate::scene::StressScene;

const CLEAR_HEX: &str = "#2f324d";
const METRICS_INTERVAL: Duration = Duration::from_secs(1);
/// Pixels per wheel line, as browsers report line-mode deltas.
const WHEEL_LINE_PX: f32 = 16.0;

struct Running {
    window: Arc<Window>,
    renderer: BatchRenderer<WgpuBackend>,
    clock: FrameClock,
    last_report: Instant,
}

pub struct DemoApp {
    gpu_init: GpuInit,
    scene: StressScene,
    clear: Color,
    running: Option<Running>,
    failure: Option<anyhow::Error>,
}

impl DemoApp {
    pub fn new(gpu_init: GpuInit) -> Self {
        Self {
            gpu_init,
            scene: StressScene::new(),
            clear: Color::from_hex(CLEAR_HEX, 1.0).unwrap_or(Color::black()),
            running: None,
            failure: None,
        }
    }

    /// Error that stopped the event loop, if any.
    pub fn take_failure(&mut self) -> Option<anyhow::Error> {
        self.failure.take()
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<Running> {
        let attrs = Window::default_attributes()
            .with_title("brisk: 50k rectangles")
            .with_inner_size(LogicalSize::new(1280.0, 720.0));

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let gpu = pollster::block_on(Gpu::new(window.clone(), self.gpu_init.clone()))?;
        let mut renderer = BatchRenderer::new(WgpuBackend::new(gpu), RendererConfig::default())
            .context("failed to create renderer")?;

        self.scene.init(&mut renderer);
        window.request_redraw();

        Ok(Running {
            window,
            renderer,
            clock: FrameClock::new(),
            last_report: Instant::now(),
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure = Some(err);
        event_loop.exit();
    }
}

impl Running {
    fn redraw(&mut self, scene: &mut StressScene, clear: Color) {
        let ft = self.clock.tick();
        scene.update(ft.dt);

        let r = &mut self.renderer;
        r.begin_frame(clear);
        scene.render(r);
        r.end_frame();

        if self.last_report.elapsed() >= METRICS_INTERVAL {
            self.last_report = Instant::now();
            let m = r.metrics();
            log::info!(
                "draw calls: {}, rectangles: {}, cpu: {:.2} ms, gpu: {}",
                m.draw_calls,
                m.triangle_count / 2,
                m.cpu_frame_time_ms,
                m.gpu_frame_time_ms
                    .map_or_else(|| "n/a".to_string(), |ms| format!("{ms:.2} ms"))
            );
        }
    }
}

impl ApplicationHandler for DemoApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }

        match self.start(event_loop) {
            Ok(running) => self.running = Some(running),
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);
        if let Some(running) = &self.running {
            running.window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(running) = self.running.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => running.renderer.backend_mut().resize(size),
            WindowEvent::CursorMoved { position, .. } => {
                self.scene.mouse = Vec2::new(position.x as f32, position.y as f32);
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.scene.mouse_down = state == ElementState::Pressed;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                // winit reports scrolling up as positive; the scene zooms out on positive deltas.
                let px = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y * WHEEL_LINE_PX,
                    MouseScrollDelta::PixelDelta(p) => -p.y as f32,
                };
                self.scene.scroll(px);
            }
            WindowEvent::RedrawRequested => {
                running.redraw(&mut self.scene, self.clear);
                if running.renderer.backend().is_lost() {
                    let err = anyhow::anyhow!("GPU surface lost");
                    self.fail(event_loop, err);
                }
            }
            _ => {}
        }
    }
}

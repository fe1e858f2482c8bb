#![allow(dead_code)]

use brisk_engine::backend::{DrawRecord, HeadlessBackend};
use brisk_engine::paint::Color;
use brisk_engine::render::{BatchRenderer, ColoredPoint, Renderer, RendererConfig};

pub const WIDTH: u32 = 640;
pub const HEIGHT: u32 = 480;

pub fn renderer_with(config: RendererConfig) -> BatchRenderer<HeadlessBackend> {
    BatchRenderer::new(HeadlessBackend::new(WIDTH, HEIGHT), config).unwrap()
}

pub fn renderer() -> BatchRenderer<HeadlessBackend> {
    renderer_with(RendererConfig::default())
}

/// Starts a frame and forgets the commands it emitted.
pub fn begin(r: &mut BatchRenderer<HeadlessBackend>) {
    r.begin_frame(Color::black());
    r.backend_mut().clear_log();
}

pub fn draws(r: &BatchRenderer<HeadlessBackend>) -> Vec<DrawRecord> {
    r.backend().draws().cloned().collect()
}

pub fn point(x: f32, y: f32) -> ColoredPoint {
    ColoredPoint::new(x, y, Color::white())
}

pub fn tri(r: &mut impl Renderer, i: usize) {
    let x = i as f32;
    r.draw_tri(x, 0.0, x + 1.0, 0.0, x, 1.0);
}

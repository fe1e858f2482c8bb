use brisk_engine::coords::{StrokedRect, Vec2};
use brisk_engine::render::Renderer;

use crate::camera::Camera;

pub const RECT_COUNT: usize = 50_000;
pub const WORLD_SIZE: f32 = 30_000.0;

const RECT_SIZES: [(f32, f32); 4] = [(100.0, 35.0), (40.0, 40.0), (80.0, 80.0), (40.0, 80.0)];
const RECT_COLOR: (f32, f32, f32) = (0.5, 0.5, 0.8);

/// SplitMix64; enough for scattering rectangles reproducibly.
struct SplitMix(u64);

impl SplitMix {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }
}

/// Outlined rectangles scattered over the world; even ones get a 2px stroke, odd ones 1–4px.
pub fn scatter_rects(count: usize, world: f32, seed: u64) -> Vec<StrokedRect> {
    let mut rng = SplitMix(seed);

    (0..count)
        .map(|i| {
            let (w, h) = RECT_SIZES[i % RECT_SIZES.len()];
            let x = rng.next_f32() * world;
            let y = rng.next_f32() * world;
            let stroke = if i % 2 == 0 {
                2.0
            } else {
                1.0 + (rng.next_f32() * 4.0).floor()
            };
            StrokedRect::new(x, y, w, h, stroke)
        })
        .collect()
}

/// The stress scene: static rectangles under a pan/zoom camera.
pub struct StressScene {
    pub camera: Camera,
    pub mouse: Vec2,
    pub mouse_down: bool,
    wheel: f32,
}

impl StressScene {
    pub fn new() -> Self {
        Self {
            camera: Camera::new(Vec2::new(WORLD_SIZE / 2.0, WORLD_SIZE / 2.0)),
            mouse: Vec2::zero(),
            mouse_down: false,
            wheel: 0.0,
        }
    }

    /// Uploads the rectangles once.
    pub fn init(&mut self, r: &mut dyn Renderer) {
        let rects = scatter_rects(RECT_COUNT, WORLD_SIZE, 0x5eed);
        let (red, green, blue) = RECT_COLOR;
        r.set_color(red, green, blue, 1.0);
        r.build_static_geometry(&rects);
        log::info!("built {} static rectangles", rects.len());
    }

    /// Accumulates a wheel delta in pixels; positive zooms out.
    pub fn scroll(&mut self, delta: f32) {
        self.wheel += delta;
    }

    pub fn update(&mut self, _dt: f32) {
        self.camera.drag(self.mouse, self.mouse_down);
        self.camera.zoom_at(self.mouse, self.wheel);
        self.wheel = 0.0;
    }

    pub fn render(&self, r: &mut dyn Renderer) {
        self.camera.apply(r);
        r.draw_static_geometry();
    }
}

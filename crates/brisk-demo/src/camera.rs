use brisk_engine::coords::Vec2;
use brisk_engine::render::Renderer;

pub const MIN_ZOOM: f32 = 0.02;
pub const MAX_ZOOM: f32 = 10.0;
pub const ZOOM_SPEED: f32 = 2.0;

/// Pan/zoom camera over a world measured in pixels.
///
/// `position` is the world point shown at the top-left corner of the window.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec2,
    pub zoom: f32,
    drag: Option<Drag>,
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    start_mouse: Vec2,
    start_position: Vec2,
}

impl Camera {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            zoom: 1.0,
            drag: None,
        }
    }

    pub fn world_pos(&self, screen: Vec2) -> Vec2 {
        self.position + screen * (1.0 / self.zoom)
    }

    /// Follows a held mouse button; the world point under the cursor stays put.
    pub fn drag(&mut self, mouse: Vec2, held: bool) {
        if !held {
            self.drag = None;
            return;
        }

        match self.drag {
            None => {
                self.drag = Some(Drag {
                    start_mouse: mouse,
                    start_position: self.position,
                });
            }
            Some(d) => {
                let delta = (mouse - d.start_mouse) * (1.0 / self.zoom);
                self.position = d.start_position - delta;
            }
        }
    }

    /// Zooms by a wheel delta in pixels (positive zooms out), anchored at `cursor`.
    pub fn zoom_at(&mut self, cursor: Vec2, wheel: f32) {
        if wheel == 0.0 {
            return;
        }

        let before = self.world_pos(cursor);
        let factor = 1.0 - wheel * 0.001 * ZOOM_SPEED;
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);

        let after = self.world_pos(cursor);
        self.position = self.position + (before - after);
    }

    pub fn apply(&self, r: &mut dyn Renderer) {
        r.scale(self.zoom, self.zoom);
        r.translate(-self.position.x, -self.position.y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_keeps_cursor_anchored() {
        let mut cam = Camera::new(Vec2::new(100.0, 200.0));
        let cursor = Vec2::new(320.0, 240.0);
        let before = cam.world_pos(cursor);

        cam.zoom_at(cursor, -120.0);
        let after = cam.world_pos(cursor);

        assert!(cam.zoom > 1.0);
        assert!((before.x - after.x).abs() < 1e-3);
        assert!((before.y - after.y).abs() < 1e-3);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut cam = Camera::new(Vec2::zero());
        for _ in 0..100 {
            cam.zoom_at(Vec2::zero(), 400.0);
        }
        assert_eq!(cam.zoom, MIN_ZOOM);
    }

    #[test]
    fn drag_pans_in_world_units() {
        let mut cam = Camera::new(Vec2::zero());
        cam.zoom = 2.0;
        cam.drag(Vec2::new(10.0, 10.0), true);
        cam.drag(Vec2::new(30.0, 0.0), true);
        assert_eq!(cam.position, Vec2::new(-10.0, 5.0));

        cam.drag(Vec2::new(30.0, 0.0), false);
        cam.drag(Vec2::new(0.0, 0.0), true);
        assert_eq!(cam.position, Vec2::new(-10.0, 5.0));
    }
}

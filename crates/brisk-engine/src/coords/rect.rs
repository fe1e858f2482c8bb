use super::Vec2;

/// Axis-aligned rectangle (top-left origin).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        Vec2::new(self.origin.x + self.size.x, self.origin.y + self.size.y)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    /// Clamps the rectangle into `[0, width] x [0, height]`.
    ///
    /// The origin is clamped first, then the size is clamped to what remains
    /// between the origin and the far edge. The result may be empty; a
    /// rectangle with a non-finite component clamps to the empty rectangle.
    #[inline]
    pub fn clamped_to(self, width: f32, height: f32) -> Self {
        let components = [self.origin.x, self.origin.y, self.size.x, self.size.y];
        if !components.iter().all(|c| c.is_finite()) {
            return Rect::default();
        }

        let x = self.origin.x.clamp(0.0, width);
        let y = self.origin.y.clamp(0.0, height);
        let w = self.size.x.clamp(0.0, width - x);
        let h = self.size.y.clamp(0.0, height - y);
        Rect::new(x, y, w, h)
    }
}

/// Rectangle with an outline width, the input record of static geometry.
///
/// `stroke_width == 0` means filled; a positive width draws only an outline of
/// that many screen pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct StrokedRect {
    pub rect: Rect,
    pub stroke_width: f32,
}

impl StrokedRect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32, stroke_width: f32) -> Self {
        Self {
            rect: Rect::new(x, y, w, h),
            stroke_width,
        }
    }

    #[inline]
    pub const fn filled(rect: Rect) -> Self {
        Self { rect, stroke_width: 0.0 }
    }
}

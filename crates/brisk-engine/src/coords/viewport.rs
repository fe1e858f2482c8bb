/// Size of a render destination in physical pixels.
///
/// Uploaded to shaders as the `Resolution` uniform and used as the basis for
/// converting target pixels to NDC.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn from_pixels(width: u32, height: u32) -> Self {
        Self::new(width as f32, height as f32)
    }

    /// Returns the size clamped to at least one pixel per axis, as a uniform payload.
    #[inline]
    pub fn to_uniform(self) -> [f32; 2] {
        [self.width.max(1.0), self.height.max(1.0)]
    }
}

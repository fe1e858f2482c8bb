use crate::backend::{ShaderId, TargetId, TextureId};
use crate::paint::{BlendMode, Color};

/// A change to GPU-global state; every one of these splits the batch.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StateChange {
    Texture(TextureId),
    Shader(ShaderId),
    Blend(BlendMode),
    /// `None` selects the default target.
    Target(Option<TargetId>),
}

/// Renderer-owned mirror of the state bound on the backend, plus the flat fill color.
///
/// The color is baked into vertices at append time and never forces a flush.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicsState {
    pub texture: TextureId,
    pub shader: ShaderId,
    pub blend: BlendMode,
    pub target: Option<TargetId>,
    color: Color,
    rgb: [f32; 3],
}

impl GraphicsState {
    pub fn new(texture: TextureId, shader: ShaderId) -> Self {
        Self {
            texture,
            shader,
            blend: BlendMode::Alpha,
            target: None,
            color: Color::white(),
            rgb: [1.0; 3],
        }
    }

    /// True when applying `change` would alter the bound state.
    pub fn differs(&self, change: StateChange) -> bool {
        match change {
            StateChange::Texture(t) => self.texture != t,
            StateChange::Shader(s) => self.shader != s,
            StateChange::Blend(b) => self.blend != b,
            StateChange::Target(t) => self.target != t,
        }
    }

    pub fn apply(&mut self, change: StateChange) {
        match change {
            StateChange::Texture(t) => self.texture = t,
            StateChange::Shader(s) => self.shader = s,
            StateChange::Blend(b) => self.blend = b,
            StateChange::Target(t) => self.target = t,
        }
    }

    /// Premultiplied fill color.
    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Sets the fill color from straight components.
    pub fn set_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.rgb = [r, g, b];
        self.color = Color::from_straight(r, g, b, a);
    }

    pub fn set_rgb(&mut self, r: f32, g: f32, b: f32) {
        self.set_color(r, g, b, self.color.a);
    }

    /// Changes alpha, re-premultiplying the last straight RGB.
    pub fn set_alpha(&mut self, a: f32) {
        let [r, g, b] = self.rgb;
        self.color = Color::from_straight(r, g, b, a);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> GraphicsState {
        GraphicsState::new(TextureId(1), ShaderId(2))
    }

    #[test]
    fn same_value_does_not_differ() {
        let s = state();
        assert!(!s.differs(StateChange::Texture(TextureId(1))));
        assert!(!s.differs(StateChange::Blend(BlendMode::Alpha)));
        assert!(!s.differs(StateChange::Target(None)));
        assert!(s.differs(StateChange::Shader(ShaderId(3))));
    }

    #[test]
    fn alpha_survives_premultiplication_round_trip() {
        let mut s = state();
        s.set_color(1.0, 0.5, 0.0, 0.0);
        s.set_alpha(0.5);
        assert_eq!(s.color().to_array(), [0.5, 0.25, 0.0, 0.5]);
    }

    #[test]
    fn set_rgb_keeps_alpha() {
        let mut s = state();
        s.set_color(1.0, 1.0, 1.0, 0.5);
        s.set_rgb(0.0, 1.0, 0.0);
        assert_eq!(s.color().to_array(), [0.0, 0.5, 0.0, 0.5]);
    }
}

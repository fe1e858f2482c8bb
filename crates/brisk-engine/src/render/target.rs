use crate::backend::TargetId;

use super::Texture;

/// Off-screen render destination: a framebuffer and the texture it renders into.
///
/// Size is fixed at creation. The caller owns the lifetime and must release it
/// with `Renderer::destroy_render_target`.
#[derive(Debug, PartialEq, Eq)]
pub struct RenderTarget {
    pub(crate) id: TargetId,
    pub(crate) texture: Texture,
}

impl RenderTarget {
    #[inline]
    pub fn id(&self) -> TargetId {
        self.id
    }

    /// Texture holding the target's contents, usable with every textured draw.
    #[inline]
    pub fn texture(&self) -> Texture {
        self.texture
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.texture.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.texture.height
    }
}

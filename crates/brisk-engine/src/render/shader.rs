use crate::backend::ShaderId;

/// WGSL source of the default program (`vs_main` + `fs_main`).
pub const DEFAULT_SHADER: &str = include_str!("shaders/default.wgsl");

/// Handle to a linked shader program.
///
/// Programs must read the `Globals` block at `@group(0) @binding(0)` and the
/// current texture at `@group(1)` (texture at binding 0, sampler at binding 1).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Shader {
    pub(crate) id: ShaderId,
}

impl Shader {
    #[inline]
    pub fn id(self) -> ShaderId {
        self.id
    }
}

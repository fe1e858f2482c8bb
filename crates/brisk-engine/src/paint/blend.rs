/// Framebuffer blend equation applied to subsequent draws.
///
/// Colors reaching the blender are premultiplied, so `Alpha` is the
/// premultiplied "over" operator.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum BlendMode {
    /// Source replaces destination.
    #[default]
    Opaque,
    /// `src + dst * (1 - src.a)`.
    Alpha,
    /// `src + dst`.
    Additive,
    /// `src * dst`.
    Multiply,
}

impl BlendMode {
    /// wgpu blend state for this mode; `None` disables blending.
    pub fn to_wgpu(self) -> Option<wgpu::BlendState> {
        let component = |src_factor, dst_factor| wgpu::BlendComponent {
            src_factor,
            dst_factor,
            operation: wgpu::BlendOperation::Add,
        };
        let state = |c: wgpu::BlendComponent| wgpu::BlendState { color: c, alpha: c };

        match self {
            BlendMode::Opaque => None,
            BlendMode::Alpha => Some(state(component(
                wgpu::BlendFactor::One,
                wgpu::BlendFactor::OneMinusSrcAlpha,
            ))),
            BlendMode::Additive => Some(state(component(
                wgpu::BlendFactor::One,
                wgpu::BlendFactor::One,
            ))),
            BlendMode::Multiply => Some(state(component(
                wgpu::BlendFactor::Dst,
                wgpu::BlendFactor::Zero,
            ))),
        }
    }
}

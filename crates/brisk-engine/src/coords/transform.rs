use super::Vec2;

/// 2D affine transform: basis vectors `i`, `j` and translation `t`.
///
/// A point `p` maps to `p.x * i + p.y * j + t`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub ix: f32,
    pub iy: f32,
    pub jx: f32,
    pub jy: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Transform {
    pub const IDENTITY: Self = Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

    #[inline]
    pub const fn new(ix: f32, iy: f32, jx: f32, jy: f32, tx: f32, ty: f32) -> Self {
        Self { ix, iy, jx, jy, tx, ty }
    }

    #[inline]
    pub const fn translation(x: f32, y: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, x, y)
    }

    #[inline]
    pub const fn scaling(sx: f32, sy: f32) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Rotation by `angle` radians; positive angles turn counter-clockwise on a +Y-down screen.
    #[inline]
    pub fn rotation(angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(cos, -sin, sin, cos, 0.0, 0.0)
    }

    /// Composes `local` inside `self`: the result maps `p` to `self(local(p))`.
    ///
    /// This is how nested local coordinate systems stack: each new transform is
    /// applied before every transform already active.
    #[inline]
    pub fn then_local(self, local: Transform) -> Transform {
        let t = self;
        Transform {
            ix: local.ix * t.ix + local.iy * t.jx,
            iy: local.ix * t.iy + local.iy * t.jy,
            jx: local.jx * t.ix + local.jy * t.jx,
            jy: local.jx * t.iy + local.jy * t.jy,
            tx: local.tx * t.ix + local.ty * t.jx + t.tx,
            ty: local.tx * t.iy + local.ty * t.jy + t.ty,
        }
    }

    #[inline]
    pub fn transform_point(self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x * self.ix + p.y * self.jx + self.tx,
            p.x * self.iy + p.y * self.jy + self.ty,
        )
    }

    /// Column-major 3x3 matrix, the layout of the `Transform` uniform.
    #[inline]
    pub fn to_mat3(self) -> [f32; 9] {
        [
            self.ix, self.iy, 0.0, //
            self.jx, self.jy, 0.0, //
            self.tx, self.ty, 1.0,
        ]
    }

    /// Scale along the first basis vector's x component, uploaded as the `Zoom` uniform.
    ///
    /// Only meaningful for uniform, unrotated scales.
    #[inline]
    pub fn zoom(self) -> f32 {
        self.ix
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

use bytemuck::{Pod, Zeroable};

use crate::error::RenderError;

/// Value written to a named uniform.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    /// Column-major.
    Mat3([f32; 9]),
    /// Column-major.
    Mat4([f32; 16]),
}

impl UniformValue {
    pub fn kind(&self) -> &'static str {
        match self {
            UniformValue::Float(_) => "float",
            UniformValue::Vec2(_) => "vec2",
            UniformValue::Vec3(_) => "vec3",
            UniformValue::Vec4(_) => "vec4",
            UniformValue::Mat3(_) => "mat3",
            UniformValue::Mat4(_) => "mat4",
        }
    }
}

/// Per-shader uniform block, bound at `@group(0) @binding(0)`.
///
/// WGSL layout:
/// ```wgsl
/// struct Globals {
///     transform: mat3x3<f32>,  // Transform
///     resolution: vec2<f32>,   // Resolution
///     zoom: f32,               // Zoom
/// }
/// ```
/// `mat3x3` columns are padded to 16 bytes, so the block is 64 bytes.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Globals {
    transform: [[f32; 4]; 3],
    resolution: [f32; 2],
    zoom: f32,
    _pad: f32,
}

impl Globals {
    pub const SIZE: u64 = std::mem::size_of::<Globals>() as u64;

    /// Writes a uniform by its shader-visible name.
    pub fn set(&mut self, name: &str, value: UniformValue) -> Result<(), RenderError> {
        let mismatch = |expected: &'static str| RenderError::UniformMismatch {
            name: name.to_string(),
            expected,
            got: value.kind(),
        };

        match (name, value) {
            ("Transform", UniformValue::Mat3(m)) => {
                for (col, column) in self.transform.iter_mut().enumerate() {
                    column[..3].copy_from_slice(&m[col * 3..col * 3 + 3]);
                }
                Ok(())
            }
            ("Transform", _) => Err(mismatch("mat3")),
            ("Resolution", UniformValue::Vec2(v)) => {
                self.resolution = v;
                Ok(())
            }
            ("Resolution", _) => Err(mismatch("vec2")),
            ("Zoom", UniformValue::Float(z)) => {
                self.zoom = z;
                Ok(())
            }
            ("Zoom", _) => Err(mismatch("float")),
            _ => Err(RenderError::UnknownUniform(name.to_string())),
        }
    }

    /// Column-major 3x3 transform without padding.
    pub fn transform(&self) -> [f32; 9] {
        let mut out = [0.0; 9];
        for (col, column) in self.transform.iter().enumerate() {
            out[col * 3..col * 3 + 3].copy_from_slice(&column[..3]);
        }
        out
    }

    pub fn resolution(&self) -> [f32; 2] {
        self.resolution
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }
}

impl Default for Globals {
    fn default() -> Self {
        Self {
            transform: [[1.0, 0.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0]],
            resolution: [1.0, 1.0],
            zoom: 1.0,
            _pad: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_is_sixty_four_bytes() {
        assert_eq!(Globals::SIZE, 64);
    }

    #[test]
    fn transform_round_trips_through_padding() {
        let mut g = Globals::default();
        let m = [1.0, 2.0, 0.0, 3.0, 4.0, 0.0, 5.0, 6.0, 1.0];
        g.set("Transform", UniformValue::Mat3(m)).unwrap();
        assert_eq!(g.transform(), m);
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = Globals::default()
            .set("Tint", UniformValue::Vec4([1.0; 4]))
            .unwrap_err();
        assert!(matches!(err, RenderError::UnknownUniform(name) if name == "Tint"));
    }

    #[test]
    fn wrong_shape_is_rejected() {
        let err = Globals::default()
            .set("Zoom", UniformValue::Vec2([1.0, 2.0]))
            .unwrap_err();
        assert!(matches!(err, RenderError::UniformMismatch { expected: "float", got: "vec2", .. }));
    }
}

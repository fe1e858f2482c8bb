//! Paint model shared between callers and the renderer.
//!
//! Scope:
//! - color representation (premultiplied alpha)
//! - blend modes understood by every backend

pub mod blend;
pub mod color;

pub use blend::BlendMode;
pub use color::Color;

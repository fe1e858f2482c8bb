//! Coordinate and geometry types shared by the renderer and its callers.
//!
//! Canonical CPU space:
//! - pixels of the bound render target
//! - origin top-left
//! - +X right, +Y down
//!
//! The active [`Transform`] maps caller coordinates into that space; the vertex
//! shader converts to NDC using the `Resolution` uniform.

mod rect;
mod transform;
mod vec2;
mod viewport;

pub use rect::{Rect, StrokedRect};
pub use transform::Transform;
pub use vec2::Vec2;
pub use viewport::Viewport;

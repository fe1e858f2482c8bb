//! Brisk engine crate.
//!
//! A batched 2D renderer: callers issue small primitives, the renderer packs
//! them into as few GPU draw calls as ordering allows.

pub mod backend;
pub mod coords;
pub mod device;
pub mod error;
pub mod logging;
pub mod paint;
pub mod render;
pub mod time;

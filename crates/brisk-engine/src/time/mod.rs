//! Time subsystem.
//!
//! - `FrameClock` produces clamped per-frame delta times for the caller's loop.
//! - `CpuTimer` measures the CPU-side span of one renderer frame.

mod cpu_timer;
mod frame_clock;

pub use cpu_timer::CpuTimer;
pub use frame_clock::{FrameClock, FrameTime};

use std::time::{Duration, Instant};

/// Result of one [`FrameClock::tick`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Seconds since the previous tick; zero on the first tick.
    pub dt: f32,
    /// Ticks before this one.
    pub frames: u64,
}

/// Delta-time source for a render loop.
///
/// Steps longer than `max_step` (window dragged, debugger pause) are cut down
/// so camera smoothing never jumps.
#[derive(Debug, Clone)]
pub struct FrameClock {
    previous: Option<Instant>,
    max_step: Duration,
    frames: u64,
}

impl FrameClock {
    pub const DEFAULT_MAX_STEP: Duration = Duration::from_millis(100);

    pub fn new() -> Self {
        Self::with_max_step(Self::DEFAULT_MAX_STEP)
    }

    pub fn with_max_step(max_step: Duration) -> Self {
        Self {
            previous: None,
            max_step,
            frames: 0,
        }
    }

    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> FrameTime {
        let step = match self.previous.replace(now) {
            Some(prev) => now.saturating_duration_since(prev).min(self.max_step),
            None => Duration::ZERO,
        };

        let ft = FrameTime {
            dt: step.as_secs_f32(),
            frames: self.frames,
        };
        self.frames += 1;
        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

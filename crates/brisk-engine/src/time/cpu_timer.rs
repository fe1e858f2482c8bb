use std::time::Instant;

/// Wall-clock span of one frame's CPU work.
#[derive(Debug, Default, Clone)]
pub struct CpuTimer {
    started: Option<Instant>,
}

impl CpuTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.started = Some(Instant::now());
    }

    /// Milliseconds since `start`, or `None` if the timer was never started.
    ///
    /// The timer keeps running; a later call measures from the same start.
    pub fn elapsed_ms(&self) -> Option<f64> {
        self.started.map(|t| t.elapsed().as_secs_f64() * 1000.0)
    }
}

use crate::backend::{GpuBackend, QueryId};

/// Per-frame statistics, read-only for callers.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct RenderMetrics {
    /// Draw calls since the last `begin_frame` (dynamic and static).
    pub draw_calls: u32,
    pub triangle_count: u64,
    /// CPU span of the last completed frame.
    pub cpu_frame_time_ms: f64,
    /// Latest GPU frame time; one or more frames old, `None` until a sample arrives.
    pub gpu_frame_time_ms: Option<f64>,
}

impl RenderMetrics {
    #[inline]
    pub(crate) fn record_draw(&mut self, vertex_count: u32) {
        self.draw_calls += 1;
        self.triangle_count += u64::from(vertex_count / 3);
    }

    #[inline]
    pub(crate) fn reset_counters(&mut self) {
        self.draw_calls = 0;
        self.triangle_count = 0;
    }
}

/// Two-slot ring of GPU timer queries.
///
/// `pending` times the frame in progress; `previous` is the last ended query,
/// read without blocking at the next `begin_frame`.
#[derive(Debug, Default)]
pub struct GpuFrameTimer {
    pending: Option<QueryId>,
    previous: Option<QueryId>,
    last_ms: Option<f64>,
    warned: bool,
}

impl GpuFrameTimer {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn last_ms(&self) -> Option<f64> {
        self.last_ms
    }

    /// Retires the previous query if its result is in, then starts timing this frame.
    pub fn begin_frame<B: GpuBackend + ?Sized>(&mut self, gpu: &mut B) -> Option<f64> {
        if let Some(prev) = self.previous
            && let Some(ns) = gpu.poll_timer_query(prev)
        {
            self.last_ms = Some(ns as f64 / 1_000_000.0);
            gpu.delete_timer_query(prev);
            self.previous = None;
        }

        if let Some(stale) = self.pending.take() {
            gpu.end_timer_query(stale);
            gpu.delete_timer_query(stale);
        }

        if gpu.supports_timer_queries() {
            self.pending = gpu.begin_timer_query();
        } else if !self.warned {
            log::warn!("GPU timer queries unsupported; GPU frame time stays unset");
            self.warned = true;
        }

        self.last_ms
    }

    /// Ends this frame's query; it becomes the one read next frame.
    pub fn end_frame<B: GpuBackend + ?Sized>(&mut self, gpu: &mut B) {
        let Some(query) = self.pending.take() else {
            return;
        };
        gpu.end_timer_query(query);

        // An unread older result is superseded by this frame's.
        if let Some(stale) = self.previous.replace(query) {
            gpu.delete_timer_query(stale);
        }
    }

    /// Releases every outstanding query.
    pub fn release<B: GpuBackend + ?Sized>(&mut self, gpu: &mut B) {
        for q in [self.pending.take(), self.previous.take()].into_iter().flatten() {
            gpu.delete_timer_query(q);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::HeadlessBackend;

    #[test]
    fn sample_arrives_one_frame_late() {
        let mut gpu = HeadlessBackend::new(1, 1);
        let mut timer = GpuFrameTimer::new();

        assert_eq!(timer.begin_frame(&mut gpu), None);
        timer.end_frame(&mut gpu);

        // Not resolved yet: value unchanged, never blocks.
        assert_eq!(timer.begin_frame(&mut gpu), None);
        timer.end_frame(&mut gpu);

        gpu.resolve_pending_queries(4_500_000);
        assert_eq!(timer.begin_frame(&mut gpu), Some(4.5));
        timer.end_frame(&mut gpu);

        // Holds the last value while the newest query is outstanding.
        assert_eq!(timer.begin_frame(&mut gpu), Some(4.5));
    }

    #[test]
    fn queries_do_not_leak() {
        let mut gpu = HeadlessBackend::new(1, 1);
        let mut timer = GpuFrameTimer::new();
        for _ in 0..10 {
            timer.begin_frame(&mut gpu);
            timer.end_frame(&mut gpu);
        }
        assert!(gpu.live_queries() <= 2);
        timer.release(&mut gpu);
        assert_eq!(gpu.live_queries(), 0);
    }

    #[test]
    fn unsupported_backend_leaves_time_unset() {
        let mut gpu = HeadlessBackend::new(1, 1).with_timer_queries(false);
        let mut timer = GpuFrameTimer::new();
        timer.begin_frame(&mut gpu);
        timer.end_frame(&mut gpu);
        gpu.resolve_pending_queries(1);
        assert_eq!(timer.begin_frame(&mut gpu), None);
    }

    #[test]
    fn counters_reset() {
        let mut m = RenderMetrics::default();
        m.record_draw(6);
        m.record_draw(3);
        assert_eq!((m.draw_calls, m.triangle_count), (2, 3));
        m.reset_counters();
        assert_eq!((m.draw_calls, m.triangle_count), (0, 0));
    }
}

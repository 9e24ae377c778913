//! Frame clock: turns platform frame timestamps into per-tick deltas.

/// Tracks the timestamp of the previous tick. The first tick after a reset
/// reports a zero delta.
#[derive(Clone, Debug, Default)]
pub struct FrameClock {
    last: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds elapsed since the previous call. Timestamps that go backwards
    /// yield zero; non-finite timestamps are ignored.
    pub fn delta(&mut self, now_seconds: f64) -> f32 {
        if !now_seconds.is_finite() {
            return 0.0;
        }
        let delta = match self.last {
            Some(prev) if now_seconds > prev => now_seconds - prev,
            _ => 0.0,
        };
        self.last = Some(now_seconds);
        delta as f32
    }

    #[inline]
    pub fn reset(&mut self) {
        self.last = None;
    }
}

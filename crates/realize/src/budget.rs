use std::collections::VecDeque;
use std::time::Duration;

/// Computes the per-frame time budget for the realization drain.
///
/// `budget = frame_interval * fraction`, with the frame interval derived
/// from a host-supplied frame-rate hint. A missing or unusable hint falls
/// back to the configured rate (60 Hz by default).
#[derive(Debug, Clone, Copy)]
pub struct FrameBudget {
    fraction: f32,
    fallback_hz: f32,
}

impl FrameBudget {
    pub fn new(fraction: f32, fallback_hz: f32) -> Self {
        Self {
            fraction,
            fallback_hz,
        }
    }

    /// Budget for one frame given the host's frame-rate hint.
    pub fn for_frame(&self, frame_rate_hint: Option<f32>) -> Duration {
        let hz = frame_rate_hint
            .filter(|hz| hz.is_finite() && *hz > 0.0)
            .unwrap_or(self.fallback_hz);
        Duration::from_secs_f32(self.fraction / hz)
    }
}

/// Ring buffer of recent frame drain durations for instrumentation.
#[derive(Debug)]
pub struct FrameTimer {
    history: VecDeque<Duration>,
    capacity: usize,
}

impl FrameTimer {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be positive");
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, dt: Duration) {
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(dt);
    }

    pub fn count(&self) -> usize {
        self.history.len()
    }

    pub fn average(&self) -> Duration {
        if self.history.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.history.iter().sum();
        total / self.history.len() as u32
    }

    pub fn max(&self) -> Duration {
        self.history.iter().copied().max().unwrap_or(Duration::ZERO)
    }

    pub fn min(&self) -> Duration {
        self.history.iter().copied().min().unwrap_or(Duration::ZERO)
    }
}

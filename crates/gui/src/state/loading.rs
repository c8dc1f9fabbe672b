use std::time::{Duration, Instant};

/// Splash-screen latch: loading until `delay` has passed since `start`, then
/// never loading again.
#[derive(Debug, Clone, Copy)]
pub struct LoadingGate {
    start: Instant,
    delay: Duration,
    loading: bool,
}

impl LoadingGate {
    pub fn new(start: Instant, delay: Duration) -> Self {
        Self {
            start,
            delay,
            loading: true,
        }
    }

    /// Advance the gate. Returns true exactly once, on the frame it opens.
    pub fn update(&mut self, now: Instant) -> bool {
        if self.loading && now.saturating_duration_since(self.start) >= self.delay {
            self.loading = false;
            tracing::debug!("Loading gate opened after {:?}", self.delay);
            return true;
        }
        false
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

//! Frame scheduling

use async_trait::async_trait;

/// Source of render-loop ticks
#[async_trait(?Send)]
pub trait FrameClock {
    /// Wait until the next frame should be produced
    async fn next_frame(&mut self);
}

/// Fixed-rate clock backed by a tokio interval
#[cfg(not(target_arch = "wasm32"))]
pub struct IntervalClock {
    interval: tokio::time::Interval,
}

#[cfg(not(target_arch = "wasm32"))]
impl IntervalClock {
    /// Tick `frame_rate` times per second; late ticks are skipped, not bunched.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(frame_rate: u32) -> Self {
        let period = std::time::Duration::from_secs_f64(1.0 / f64::from(frame_rate.max(1)));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        Self { interval }
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[async_trait(?Send)]
impl FrameClock for IntervalClock {
    async fn next_frame(&mut self) {
        self.interval.tick().await;
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use tokio::time::{Duration, Instant};

    #[tokio::test(start_paused = true)]
    async fn test_interval_rate() {
        let mut clock = IntervalClock::new(50);
        let start = Instant::now();
        for _ in 0..6 {
            clock.next_frame().await;
        }
        // First tick is immediate
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(99) && elapsed <= Duration::from_millis(101));
    }
}

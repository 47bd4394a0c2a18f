//! Time source for event timestamps and animation pacing.
//!
//! The engine never reads wall-clock time directly. [`TokioClock`] follows
//! tokio's clock, so tests running with paused time advance it virtually;
//! [`ManualClock`] only moves when told to and makes every wait resolve at once.
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;

#[async_trait]
pub trait Clock: Send + Sync {
    /// Milliseconds elapsed since the clock was created.
    fn now_ms(&self) -> u64;

    /// Suspends the caller for `duration` of this clock's time.
    async fn sleep(&self, duration: Duration);
}

/// Monotonic clock backed by [`tokio::time`].
#[derive(Clone, Copy, Debug)]
pub struct TokioClock {
    origin: tokio::time::Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for TokioClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Tick-driven clock for headless runs.
///
/// `sleep` advances the clock by the requested amount and returns after a
/// single yield, so animation waits never block.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(ms: u64) -> Self {
        Self {
            now_ms: AtomicU64::new(ms),
        }
    }

    pub fn advance(&self, duration: Duration) {
        let ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, ms: u64) {
        self.now_ms.store(ms, Ordering::SeqCst);
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }

    async fn sleep(&self, duration: Duration) {
        self.advance(duration);
        tokio::task::yield_now().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn tokio_clock_follows_virtual_time() {
        let clock = TokioClock::new();
        clock.sleep(Duration::from_millis(250)).await;
        assert_eq!(clock.now_ms(), 250);
    }

    #[tokio::test]
    async fn manual_clock_moves_only_when_driven() {
        let clock = ManualClock::starting_at(10);
        assert_eq!(clock.now_ms(), 10);
        clock.sleep(Duration::from_millis(40)).await;
        assert_eq!(clock.now_ms(), 50);
        clock.set(5);
        assert_eq!(clock.now_ms(), 5);
    }
}

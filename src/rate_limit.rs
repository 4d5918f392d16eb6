// src/rate_limit.rs
//! Windowed request budget shared across concurrent requests.

use crate::error::CollectError;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::warn;

/// Bounds outbound calls to at most `max_requests` per wall-clock window.
///
/// Fail-fast: callers over budget get `RateLimitExceeded` instead of being
/// queued. The counter is the only state shared across requests, guarded by
/// an async mutex and injected wherever it is needed.
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    state: Mutex<Window>,
}

struct Window {
    started: Instant,
    count: u32,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            state: Mutex::new(Window {
                started: Instant::now(),
                count: 0,
            }),
        }
    }

    /// Take one slot from the current window, or fail with
    /// `RateLimitExceeded`.
    pub async fn acquire(&self) -> Result<(), CollectError> {
        self.acquire_at(Instant::now()).await
    }

    async fn acquire_at(&self, now: Instant) -> Result<(), CollectError> {
        let mut window = self.state.lock().await;

        if now.duration_since(window.started) >= self.window {
            window.started = now;
            window.count = 0;
        }

        if window.count >= self.max_requests {
            warn!(
                "Rate limit hit: {} requests inside {:?} window",
                window.count, self.window
            );
            return Err(CollectError::RateLimitExceeded);
        }

        window.count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_excess_request_in_window_fails() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        let now = Instant::now();

        for _ in 0..3 {
            assert!(limiter.acquire_at(now).await.is_ok());
        }
        assert!(matches!(
            limiter.acquire_at(now).await,
            Err(CollectError::RateLimitExceeded)
        ));
    }

    #[tokio::test]
    async fn test_new_window_resets_budget() {
        let limiter = RateLimiter::new(1, Duration::from_secs(2));
        let now = Instant::now();

        assert!(limiter.acquire_at(now).await.is_ok());
        assert!(limiter.acquire_at(now).await.is_err());

        let later = now + Duration::from_secs(2);
        assert!(limiter.acquire_at(later).await.is_ok());
    }

    #[tokio::test]
    async fn test_budget_shared_across_tasks() {
        use std::sync::Arc;

        let limiter = Arc::new(RateLimiter::new(2, Duration::from_secs(60)));
        let now = Instant::now();

        let mut ok = 0;
        let mut rejected = 0;
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                tokio::spawn(async move { limiter.acquire_at(now).await.is_ok() })
            })
            .collect();
        for handle in handles {
            if handle.await.unwrap() {
                ok += 1;
            } else {
                rejected += 1;
            }
        }
        assert_eq!(ok, 2);
        assert_eq!(rejected, 2);
    }
}

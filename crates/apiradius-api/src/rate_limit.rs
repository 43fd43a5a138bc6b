//! Outbound request throttling.
//!
//! A single token bucket with a burst of one, shared by every request the
//! client sends. Callers reserve their slot under a FIFO-fair async mutex
//! and then sleep outside the lock, so waiters are served in arrival order
//! and nobody holds the lock while waiting.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::trace;

use crate::error::Error;

/// Process-wide request rate ceiling.
///
/// The default is unbounded and never blocks.
#[derive(Debug, Default)]
pub struct RateLimiter {
    bucket: Option<Mutex<TokenBucket>>,
}

#[derive(Debug)]
struct TokenBucket {
    /// Available tokens. Negative while reservations are outstanding.
    tokens: f64,
    max_tokens: f64,
    /// Tokens per second.
    refill_rate: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(requests_per_second: f64) -> Self {
        Self {
            tokens: 1.0,
            max_tokens: 1.0,
            refill_rate: requests_per_second,
            last_refill: Instant::now(),
        }
    }

    fn refill(&mut self, now: Instant) {
        let elapsed = now.duration_since(self.last_refill);
        self.tokens = (self.tokens + elapsed.as_secs_f64() * self.refill_rate).min(self.max_tokens);
        self.last_refill = now;
    }

    /// Take one token, returning how long the caller must wait before using it.
    fn reserve(&mut self) -> Duration {
        self.refill(Instant::now());
        self.tokens -= 1.0;

        if self.tokens >= 0.0 {
            Duration::ZERO
        } else {
            Duration::try_from_secs_f64(-self.tokens / self.refill_rate).unwrap_or(Duration::MAX)
        }
    }
}

impl RateLimiter {
    /// A limiter that never blocks.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Build a limiter for the given ceiling.
    ///
    /// `None` and infinite ceilings are unbounded. Zero, negative and NaN
    /// ceilings are rejected.
    pub fn new(requests_per_second: Option<f64>) -> Result<Self, Error> {
        match requests_per_second {
            None => Ok(Self::unbounded()),
            Some(rps) if rps.is_infinite() && rps > 0.0 => Ok(Self::unbounded()),
            Some(rps) if rps.is_finite() && rps > 0.0 => Ok(Self {
                bucket: Some(Mutex::new(TokenBucket::new(rps))),
            }),
            Some(rps) => Err(Error::validation(
                "rate_limit",
                format!("must be a positive number of requests per second, got {rps}"),
            )),
        }
    }

    /// Whether this limiter ever blocks.
    pub fn is_bounded(&self) -> bool {
        self.bucket.is_some()
    }

    /// Wait until the caller is permitted to send one request.
    pub async fn acquire(&self) {
        let Some(bucket) = &self.bucket else {
            return;
        };

        let wait = bucket.lock().await.reserve();

        if !wait.is_zero() {
            trace!(wait_ms = wait.as_millis(), "rate limited, waiting for slot");
            tokio::time::sleep(wait).await;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn unbounded_never_waits() {
        let limiter = RateLimiter::unbounded();
        let start = Instant::now();
        for _ in 0..100 {
            limiter.acquire().await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert!(!limiter.is_bounded());
    }

    #[tokio::test(start_paused = true)]
    async fn sequential_calls_are_spaced() {
        let limiter = RateLimiter::new(Some(10.0)).unwrap();
        let start = Instant::now();
        for _ in 0..5 {
            limiter.acquire().await;
        }
        // N requests take at least (N - 1) / R
        assert!(start.elapsed() >= Duration::from_millis(400));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_share_the_ceiling() {
        let limiter = Arc::new(RateLimiter::new(Some(4.0)).unwrap());
        let start = Instant::now();

        let handles: Vec<_> = (0..9)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                tokio::spawn(async move { limiter.acquire().await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn idle_time_does_not_accumulate_burst() {
        let limiter = RateLimiter::new(Some(2.0)).unwrap();
        limiter.acquire().await;
        tokio::time::sleep(Duration::from_secs(10)).await;

        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(500));
    }

    #[test]
    fn rejects_non_positive_ceilings() {
        assert!(RateLimiter::new(Some(0.0)).is_err());
        assert!(RateLimiter::new(Some(-1.0)).is_err());
        assert!(RateLimiter::new(Some(f64::NAN)).is_err());
        assert!(!RateLimiter::new(Some(f64::INFINITY)).unwrap().is_bounded());
        assert!(!RateLimiter::new(None).unwrap().is_bounded());
    }
}

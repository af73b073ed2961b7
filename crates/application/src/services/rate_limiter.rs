//! Per-client token bucket rate limiter
//!
//! Tokens refill continuously: a bucket regains `capacity` tokens over one
//! `window`. Buckets are created full and live in process memory only.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use parking_lot::Mutex;
use tracing::debug;

use crate::error::ApplicationError;

/// Default bucket size
pub const DEFAULT_CAPACITY: u32 = 30;
/// Default time for an empty bucket to refill completely
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(5 * 60);

/// Rate limiter configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimiterConfig {
    /// Maximum tokens per bucket
    pub capacity: u32,
    /// Full refill period
    pub window: Duration,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            window: DEFAULT_WINDOW,
        }
    }
}

#[derive(Debug, Clone)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    const fn full(capacity: f64, now: Instant) -> Self {
        Self {
            tokens: capacity,
            last_refill: now,
        }
    }

    fn refill(&mut self, now: Instant, tokens_per_second: f64, capacity: f64) {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = elapsed.mul_add(tokens_per_second, self.tokens).min(capacity);
        if now > self.last_refill {
            self.last_refill = now;
        }
    }
}

/// Thread-safe token bucket limiter keyed by client
///
/// The whole check-and-consume runs under one lock, so concurrent requests
/// for the same key can never be granted the same token twice.
#[derive(Debug)]
pub struct TokenBucketLimiter {
    buckets: Mutex<HashMap<String, TokenBucket>>,
    capacity: f64,
    tokens_per_second: f64,
}

impl TokenBucketLimiter {
    #[must_use]
    pub fn new(config: RateLimiterConfig) -> Self {
        let capacity = f64::from(config.capacity.max(1));
        let window = config.window.as_secs_f64().max(f64::EPSILON);
        Self {
            buckets: Mutex::new(HashMap::new()),
            capacity,
            tokens_per_second: capacity / window,
        }
    }

    /// Take one token for `client_key`
    pub fn try_acquire(&self, client_key: &str) -> Result<(), ApplicationError> {
        self.try_acquire_at(client_key, Instant::now())
    }

    /// Take one token for `client_key` as of `now`
    ///
    /// A rejected call consumes nothing. The error carries the number of
    /// seconds until one token will be available.
    pub fn try_acquire_at(&self, client_key: &str, now: Instant) -> Result<(), ApplicationError> {
        let mut buckets = self.buckets.lock();
        let bucket = buckets
            .entry(client_key.to_string())
            .or_insert_with(|| TokenBucket::full(self.capacity, now));

        bucket.refill(now, self.tokens_per_second, self.capacity);

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            return Ok(());
        }

        let missing = 1.0 - bucket.tokens;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let retry_after_secs = (missing / self.tokens_per_second).ceil().max(1.0) as u64;
        debug!(client_key, retry_after_secs, "Rate limit exceeded");
        Err(ApplicationError::RateLimited { retry_after_secs })
    }

    /// Tokens currently available for `client_key` as of `now`, without consuming
    pub fn available_at(&self, client_key: &str, now: Instant) -> f64 {
        let mut buckets = self.buckets.lock();
        buckets.get_mut(client_key).map_or(self.capacity, |bucket| {
            bucket.refill(now, self.tokens_per_second, self.capacity);
            bucket.tokens
        })
    }

    /// Drop buckets not touched for longer than `older_than`
    ///
    /// An idle bucket has refilled anyway, so forgetting it changes nothing.
    pub fn cleanup(&self, older_than: Duration) -> usize {
        self.cleanup_at(older_than, Instant::now())
    }

    pub fn cleanup_at(&self, older_than: Duration, now: Instant) -> usize {
        let mut buckets = self.buckets.lock();
        let before = buckets.len();
        buckets.retain(|_, bucket| now.saturating_duration_since(bucket.last_refill) <= older_than);
        before - buckets.len()
    }

    /// Number of tracked clients
    pub fn tracked_clients(&self) -> usize {
        self.buckets.lock().len()
    }
}

impl Default for TokenBucketLimiter {
    fn default() -> Self {
        Self::new(RateLimiterConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(capacity: u32, window_secs: u64) -> TokenBucketLimiter {
        TokenBucketLimiter::new(RateLimiterConfig {
            capacity,
            window: Duration::from_secs(window_secs),
        })
    }

    #[test]
    fn capacity_requests_succeed_then_limited() {
        let limiter = TokenBucketLimiter::default();
        let now = Instant::now();
        for _ in 0..DEFAULT_CAPACITY {
            assert!(limiter.try_acquire_at("1.2.3.4", now).is_ok());
        }
        let err = limiter.try_acquire_at("1.2.3.4", now).unwrap_err();
        assert!(matches!(err, ApplicationError::RateLimited { retry_after_secs: 10 }));
    }

    #[test]
    fn full_window_restores_capacity() {
        let limiter = TokenBucketLimiter::default();
        let start = Instant::now();
        for _ in 0..DEFAULT_CAPACITY {
            limiter.try_acquire_at("k", start).unwrap();
        }
        assert!(limiter.try_acquire_at("k", start).is_err());

        let later = start + DEFAULT_WINDOW;
        for _ in 0..DEFAULT_CAPACITY {
            assert!(limiter.try_acquire_at("k", later).is_ok());
        }
        assert!(limiter.try_acquire_at("k", later).is_err());
    }

    #[test]
    fn rejected_call_consumes_nothing() {
        let limiter = limiter(1, 10);
        let start = Instant::now();
        limiter.try_acquire_at("k", start).unwrap();
        assert!(limiter.try_acquire_at("k", start).is_err());
        assert!(limiter.try_acquire_at("k", start).is_err());
        // One token refills after 10s regardless of the failed attempts
        assert!(limiter.try_acquire_at("k", start + Duration::from_secs(10)).is_ok());
    }

    #[test]
    fn refill_is_proportional_and_capped() {
        let limiter = limiter(10, 100);
        let start = Instant::now();
        for _ in 0..10 {
            limiter.try_acquire_at("k", start).unwrap();
        }
        let half = limiter.available_at("k", start + Duration::from_secs(50));
        assert!((half - 5.0).abs() < 1e-9);
        let capped = limiter.available_at("k", start + Duration::from_secs(1_000));
        assert!((capped - 10.0).abs() < 1e-9);
    }

    #[test]
    fn clients_are_isolated() {
        let limiter = limiter(1, 60);
        let now = Instant::now();
        assert!(limiter.try_acquire_at("a", now).is_ok());
        assert!(limiter.try_acquire_at("a", now).is_err());
        assert!(limiter.try_acquire_at("b", now).is_ok());
    }

    #[test]
    fn earlier_timestamp_does_not_refill() {
        let limiter = limiter(1, 60);
        let now = Instant::now() + Duration::from_secs(120);
        limiter.try_acquire_at("k", now).unwrap();
        assert!(limiter.try_acquire_at("k", now - Duration::from_secs(60)).is_err());
    }

    #[test]
    fn cleanup_drops_idle_buckets() {
        let limiter = limiter(5, 60);
        let start = Instant::now();
        limiter.try_acquire_at("old", start).unwrap();
        limiter
            .try_acquire_at("fresh", start + Duration::from_secs(600))
            .unwrap();
        let removed = limiter.cleanup_at(Duration::from_secs(300), start + Duration::from_secs(601));
        assert_eq!(removed, 1);
        assert_eq!(limiter.tracked_clients(), 1);
    }

    #[test]
    fn concurrent_acquires_never_exceed_capacity() {
        use std::sync::{
            Arc,
            atomic::{AtomicU32, Ordering},
        };

        let limiter = Arc::new(limiter(30, 3_600));
        let granted = Arc::new(AtomicU32::new(0));
        let now = Instant::now();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                let granted = Arc::clone(&granted);
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        if limiter.try_acquire_at("shared", now).is_ok() {
                            granted.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(granted.load(Ordering::SeqCst), 30);
    }
}

//! Idle rate-limit bucket cleanup

use std::{sync::Arc, time::Duration};

use application::TokenBucketLimiter;
use tracing::debug;

/// Spawn a task dropping buckets idle for longer than `idle_for`, checked
/// every `interval`.
pub fn spawn_limiter_cleanup_task(
    limiter: Arc<TokenBucketLimiter>,
    interval: Duration,
    idle_for: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let removed = limiter.cleanup(idle_for);
            if removed > 0 {
                debug!(removed, remaining = limiter.tracked_clients(), "Dropped idle rate-limit buckets");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use application::RateLimiterConfig;

    #[tokio::test(start_paused = true)]
    async fn idle_buckets_are_dropped() {
        let limiter = Arc::new(TokenBucketLimiter::new(RateLimiterConfig {
            capacity: 2,
            window: Duration::from_secs(10),
        }));
        limiter.try_acquire("203.0.113.1").unwrap();
        assert_eq!(limiter.tracked_clients(), 1);
        std::thread::sleep(Duration::from_millis(2));

        let handle = spawn_limiter_cleanup_task(
            Arc::clone(&limiter),
            Duration::from_secs(60),
            Duration::ZERO,
        );
        tokio::time::sleep(Duration::from_secs(61)).await;
        tokio::task::yield_now().await;

        assert_eq!(limiter.tracked_clients(), 0);
        handle.abort();
    }
}

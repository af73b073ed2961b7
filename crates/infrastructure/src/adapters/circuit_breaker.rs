//! Circuit breaker for calls to external providers
//!
//! # States
//!
//! - **Closed**: normal operation, calls pass through
//! - **Open**: the provider is considered down, calls fail fast
//! - **Half-Open**: a trial call decides whether to close again
//!
//! ```rust,ignore
//! let cb = CircuitBreaker::new("routing");
//! let summary = cb.call(|| client.route(from, to)).await;
//! ```

use std::{
    fmt,
    time::{Duration, Instant},
};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Configuration for a circuit breaker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Number of consecutive failures before opening the circuit
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    /// Number of consecutive half-open successes to close the circuit
    #[serde(default = "default_success_threshold")]
    pub success_threshold: u32,
    /// Time to wait before moving from Open to Half-Open
    #[serde(default = "default_open_timeout", with = "duration_secs")]
    pub open_timeout: Duration,
}

const fn default_failure_threshold() -> u32 {
    5
}

const fn default_success_threshold() -> u32 {
    1
}

const fn default_open_timeout() -> Duration {
    Duration::from_secs(30)
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            success_threshold: default_success_threshold(),
            open_timeout: default_open_timeout(),
        }
    }
}

/// State of a circuit breaker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Normal operation, requests pass through
    Closed,
    /// Provider is down, requests fail fast
    Open,
    /// Testing if the provider has recovered
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
            Self::HalfOpen => write!(f, "half-open"),
        }
    }
}

/// Error returned by [`CircuitBreaker::call`]
#[derive(Debug)]
pub enum CircuitBreakerError<E> {
    /// The circuit is open, the call was not attempted
    CircuitOpen {
        /// Name of the protected service
        service_name: String,
    },
    /// The underlying call failed
    ServiceError(E),
}

impl<E: fmt::Display> fmt::Display for CircuitBreakerError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CircuitOpen { service_name } => {
                write!(f, "circuit breaker open for '{service_name}'")
            },
            Self::ServiceError(e) => write!(f, "{e}"),
        }
    }
}

impl<E> CircuitBreakerError<E> {
    /// Returns true if the call was rejected by an open circuit
    #[must_use]
    pub const fn is_circuit_open(&self) -> bool {
        matches!(self, Self::CircuitOpen { .. })
    }
}

#[derive(Debug)]
struct Inner {
    state: CircuitState,
    failure_count: u32,
    success_count: u32,
    opened_at: Option<Instant>,
}

/// Circuit breaker wrapper for external service calls
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: RwLock<Inner>,
}

impl fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl CircuitBreaker {
    /// Creates a new circuit breaker with default configuration
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, CircuitBreakerConfig::default())
    }

    /// Creates a new circuit breaker with custom configuration
    #[must_use]
    pub fn with_config(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: RwLock::new(Inner {
                state: CircuitState::Closed,
                failure_count: 0,
                success_count: 0,
                opened_at: None,
            }),
        }
    }

    /// Returns the name of this circuit breaker
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current state, moving Open to Half-Open once the timeout elapsed
    #[must_use]
    pub fn state(&self) -> CircuitState {
        let mut inner = self.inner.write();

        if inner.state == CircuitState::Open
            && inner
                .opened_at
                .is_some_and(|at| at.elapsed() >= self.config.open_timeout)
        {
            debug!(service = %self.name, "Circuit transitioning from Open to HalfOpen");
            inner.state = CircuitState::HalfOpen;
            inner.success_count = 0;
        }

        inner.state
    }

    /// Returns true if the circuit is open
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state() == CircuitState::Open
    }

    fn on_success(&self) {
        let mut inner = self.inner.write();
        inner.failure_count = 0;

        if inner.state == CircuitState::HalfOpen {
            inner.success_count += 1;
            if inner.success_count >= self.config.success_threshold {
                info!(service = %self.name, "Circuit transitioning from HalfOpen to Closed");
                inner.state = CircuitState::Closed;
                inner.success_count = 0;
                inner.opened_at = None;
            }
        }
    }

    fn on_failure(&self) {
        let mut inner = self.inner.write();
        inner.failure_count += 1;
        inner.success_count = 0;

        let should_open = match inner.state {
            CircuitState::Closed => inner.failure_count >= self.config.failure_threshold,
            CircuitState::HalfOpen => true,
            CircuitState::Open => false,
        };

        if should_open {
            warn!(
                service = %self.name,
                from = %inner.state,
                "Circuit transitioning to Open"
            );
            inner.state = CircuitState::Open;
            inner.opened_at = Some(Instant::now());
            inner.failure_count = 0;
        }
    }

    /// Calls an async operation through the circuit breaker
    ///
    /// # Errors
    ///
    /// Returns `CircuitOpen` without calling `f` while the circuit is open,
    /// otherwise the error of `f` wrapped in `ServiceError`.
    pub async fn call<F, Fut, T, E>(&self, f: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
        E: fmt::Debug,
    {
        if self.state() == CircuitState::Open {
            debug!(service = %self.name, "Circuit open, skipping call");
            return Err(CircuitBreakerError::CircuitOpen {
                service_name: self.name.clone(),
            });
        }

        match f().await {
            Ok(result) => {
                self.on_success();
                Ok(result)
            },
            Err(e) => {
                warn!(service = %self.name, error = ?e, "Service call failed");
                self.on_failure();
                Err(CircuitBreakerError::ServiceError(e))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config() -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: 2,
            success_threshold: 1,
            open_timeout: Duration::from_millis(30),
        }
    }

    async fn fail(cb: &CircuitBreaker) -> CircuitBreakerError<&'static str> {
        cb.call(|| async { Err::<(), _>("boom") }).await.unwrap_err()
    }

    #[tokio::test]
    async fn opens_after_consecutive_failures() {
        let cb = CircuitBreaker::with_config("routing", quick_config());

        assert!(!fail(&cb).await.is_circuit_open());
        assert_eq!(cb.state(), CircuitState::Closed);
        assert!(!fail(&cb).await.is_circuit_open());
        assert_eq!(cb.state(), CircuitState::Open);

        let mut called = false;
        let err = cb
            .call(|| {
                called = true;
                async { Ok::<_, &str>(()) }
            })
            .await
            .unwrap_err();
        assert!(err.is_circuit_open());
        assert!(!called);
    }

    #[tokio::test]
    async fn success_resets_failure_count() {
        let cb = CircuitBreaker::with_config("routing", quick_config());

        fail(&cb).await;
        cb.call(|| async { Ok::<_, &str>(1) }).await.unwrap();
        fail(&cb).await;

        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn half_open_closes_on_success() {
        let cb = CircuitBreaker::with_config("routing", quick_config());
        fail(&cb).await;
        fail(&cb).await;
        assert!(cb.is_open());

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(cb.state(), CircuitState::HalfOpen);

        let value = cb.call(|| async { Ok::<_, &str>(7) }).await.unwrap();
        assert_eq!(value, 7);
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn half_open_reopens_on_failure() {
        let cb = CircuitBreaker::with_config("routing", quick_config());
        fail(&cb).await;
        fail(&cb).await;

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(cb.state(), CircuitState::HalfOpen);

        fail(&cb).await;
        assert!(cb.is_open());
    }

    #[test]
    fn config_deserializes_seconds() {
        let config: CircuitBreakerConfig =
            serde_json::from_str(r#"{"failure_threshold":3,"open_timeout":12}"#).unwrap();
        assert_eq!(config.failure_threshold, 3);
        assert_eq!(config.success_threshold, 1);
        assert_eq!(config.open_timeout, Duration::from_secs(12));
    }

    #[test]
    fn display_states() {
        assert_eq!(CircuitState::HalfOpen.to_string(), "half-open");
        let err: CircuitBreakerError<String> = CircuitBreakerError::CircuitOpen {
            service_name: "routing".to_string(),
        };
        assert!(err.to_string().contains("routing"));
    }
}

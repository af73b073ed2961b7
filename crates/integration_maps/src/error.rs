//! Map provider error types

use thiserror::Error;

/// Errors that can occur while talking to a map provider
#[derive(Debug, Error)]
pub enum MapsError {
    /// Connection to the provider failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Provider answered with a non-success HTTP status
    #[error("Request failed with HTTP {status}: {message}")]
    RequestFailed {
        /// HTTP status code
        status: u16,
        /// Response body excerpt
        message: String,
    },

    /// Response could not be decoded
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Request timeout
    #[error("Request timed out after {timeout_secs} seconds")]
    Timeout {
        /// The timeout duration in seconds
        timeout_secs: u64,
    },

    /// No API key or base URL configured
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    /// Routing response without a usable route
    #[error("No route found")]
    NoRoute,

    /// Geocoder found nothing (`ZERO_RESULTS`)
    #[error("No results for query")]
    ZeroResults,

    /// Geocoder rejected the query (`INVALID_REQUEST`)
    #[error("Invalid geocoding request: {0}")]
    InvalidRequest(String),

    /// Quota exhausted (`OVER_QUERY_LIMIT`)
    #[error("Provider quota exceeded")]
    QuotaExceeded,

    /// Key rejected (`REQUEST_DENIED`)
    #[error("Request denied: {0}")]
    RequestDenied(String),

    /// `UNKNOWN_ERROR` or a status this client does not know
    #[error("Provider error status: {0}")]
    ProviderStatus(String),
}

impl MapsError {
    /// Returns true if this error is retryable
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_)
                | Self::Timeout { .. }
                | Self::QuotaExceeded
                | Self::ProviderStatus(_)
        ) || matches!(self, Self::RequestFailed { status, .. } if *status >= 500)
    }

    pub(crate) fn from_reqwest(e: &reqwest::Error, timeout_secs: u64) -> Self {
        if e.is_timeout() {
            Self::Timeout { timeout_secs }
        } else if e.is_decode() {
            Self::ParseError(e.to_string())
        } else {
            Self::ConnectionFailed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(MapsError::ConnectionFailed("reset".to_string()).is_retryable());
        assert!(MapsError::Timeout { timeout_secs: 5 }.is_retryable());
        assert!(MapsError::QuotaExceeded.is_retryable());
        assert!(
            MapsError::RequestFailed {
                status: 503,
                message: String::new()
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_non_retryable_errors() {
        assert!(!MapsError::ZeroResults.is_retryable());
        assert!(!MapsError::InvalidRequest("missing address".to_string()).is_retryable());
        assert!(!MapsError::NotConfigured("api key".to_string()).is_retryable());
        assert!(
            !MapsError::RequestFailed {
                status: 403,
                message: String::new()
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_error_display() {
        let err = MapsError::RequestFailed {
            status: 429,
            message: "slow down".to_string(),
        };
        assert_eq!(err.to_string(), "Request failed with HTTP 429: slow down");
        assert!(MapsError::Timeout { timeout_secs: 7 }.to_string().contains('7'));
    }
}

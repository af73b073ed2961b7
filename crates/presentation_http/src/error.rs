//! API error handling
//!
//! Maps application errors onto HTTP status codes. Internal error details are
//! logged and never returned to the caller.

use application::{ApplicationError, ErrorKind};
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

const GENERIC_INTERNAL_MESSAGE: &str = "An error occurred processing your request";

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error category, e.g. `invalid_input`
    pub code: &'static str,
    /// Seconds until the client may retry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
}

impl ApiError {
    const fn kind(&self) -> ErrorKind {
        match self {
            Self::BadRequest(_) => ErrorKind::InvalidInput,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::ServiceUnavailable(_) => ErrorKind::UpstreamUnavailable,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// HTTP status for this error
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let retry_after_secs = match &self {
            Self::RateLimited { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        };
        let error = match &self {
            Self::BadRequest(msg) | Self::NotFound(msg) | Self::ServiceUnavailable(msg) => {
                msg.clone()
            },
            Self::RateLimited { .. } => self.to_string(),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                GENERIC_INTERNAL_MESSAGE.to_string()
            },
        };

        let body = ErrorResponse {
            error,
            code: self.kind().as_str(),
            retry_after_secs,
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(secs) = retry_after_secs {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        match err {
            ApplicationError::RateLimited { retry_after_secs } => {
                Self::RateLimited { retry_after_secs }
            },
            other => match other.kind() {
                ErrorKind::InvalidInput => Self::BadRequest(other.to_string()),
                ErrorKind::NotFound => Self::NotFound(other.to_string()),
                ErrorKind::UpstreamUnavailable => Self::ServiceUnavailable(other.to_string()),
                ErrorKind::RateLimited | ErrorKind::Internal => Self::Internal(other.to_string()),
            },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::DomainError;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn application_errors_map_to_statuses() {
        let cases = [
            (ApplicationError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (ApplicationError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (
                ApplicationError::RateLimited { retry_after_secs: 3 },
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                ApplicationError::UpstreamUnavailable("x".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (ApplicationError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (
                ApplicationError::Configuration("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }

    #[test]
    fn domain_not_found_maps_to_404() {
        let err = ApplicationError::Domain(DomainError::NotFound {
            entity_type: "address".into(),
            id: "42".into(),
        });
        assert_eq!(ApiError::from(err).status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn rate_limited_sets_retry_after() {
        let response = ApiError::RateLimited { retry_after_secs: 7 }.into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get(RETRY_AFTER).unwrap(), "7");

        let body = body_json(response).await;
        assert_eq!(body["code"], "rate_limited");
        assert_eq!(body["retry_after_secs"], 7);
    }

    #[tokio::test]
    async fn internal_details_are_hidden() {
        let response = ApiError::Internal("r2d2 pool timed out at /var/lib/db".into()).into_response();
        let body = body_json(response).await;

        assert_eq!(body["error"], GENERIC_INTERNAL_MESSAGE);
        assert_eq!(body["code"], "internal");
        assert!(body.get("retry_after_secs").is_none());
    }

    #[tokio::test]
    async fn bad_request_keeps_message() {
        let response = ApiError::BadRequest("pickup coordinates are required".into()).into_response();
        let body = body_json(response).await;

        assert_eq!(body["error"], "pickup coordinates are required");
        assert_eq!(body["code"], "invalid_input");
    }
}

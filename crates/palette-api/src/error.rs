//! API error types and JSON error response formatting.
//!
//! ApiError gives every endpoint the same JSON error body and maps
//! classification errors to HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use palette_action::{ClassifyError, RateLimitUsage};
use serde::{Deserialize, Serialize};

/// JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g., "bad_request", "LIMIT_EXCEEDED").
    pub error: String,
    /// Human-readable error message.
    pub message: String,
    /// Daily usage, present on limit errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimitUsage>,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - missing, empty or oversized prompt.
    BadRequest(String),
    /// 404 Not Found - no such route.
    NotFound(String),
    /// 429 Too Many Requests - the client's daily limit is used up.
    LimitExceeded(RateLimitUsage),
    /// 503 Service Unavailable - classification backend not reachable.
    ServiceUnavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, rate_limit) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::LimitExceeded(usage) => (
                StatusCode::TOO_MANY_REQUESTS,
                "LIMIT_EXCEEDED",
                format!("Daily limit of {} commands reached", usage.limit),
                Some(usage),
            ),
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg, None)
            }
        };

        let body = ErrorBody {
            error: error_code.to_string(),
            message,
            rate_limit,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ClassifyError> for ApiError {
    fn from(err: ClassifyError) -> Self {
        match err {
            ClassifyError::Unavailable(msg) => ApiError::ServiceUnavailable(msg),
            ClassifyError::RateLimited(Some(usage)) => ApiError::LimitExceeded(usage),
            ClassifyError::RateLimited(None) => {
                ApiError::ServiceUnavailable("Upstream command limit reached".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body(err: ApiError) -> (StatusCode, ErrorBody) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_limit_exceeded_body() {
        let usage = RateLimitUsage {
            remaining: 0,
            used: 10,
            limit: 10,
        };
        let (status, body) = body(ApiError::LimitExceeded(usage)).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body.error, "LIMIT_EXCEEDED");
        assert_eq!(body.rate_limit, Some(usage));
    }

    #[tokio::test]
    async fn test_bad_request_has_no_usage() {
        let (status, body) = body(ApiError::BadRequest("empty prompt".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "bad_request");
        assert_eq!(body.message, "empty prompt");
        assert!(body.rate_limit.is_none());
    }

    #[tokio::test]
    async fn test_classify_errors_map_to_status() {
        let (status, body) =
            body(ClassifyError::Unavailable("backend down".to_string()).into()).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.message, "backend down");

        let (status, _) = self::body(ClassifyError::RateLimited(None).into()).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}

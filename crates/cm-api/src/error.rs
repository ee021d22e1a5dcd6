use std::borrow::Cow;
use std::future::Future;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use cm_common::db::{BookingStorageError, CrewFetchError};
use cm_common::ValidationError;

tokio::task_local! {
    static REQUEST_ID: String;
}

/// Strip control characters and cap length before a message leaves the
/// service; internals never echo raw database or path detail.
fn sanitize_message(message: &str) -> String {
    const MAX_LEN: usize = 240;

    let mut cleaned: String = message
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if cleaned.len() > MAX_LEN {
        // Cut on a char boundary; messages may carry multibyte input echoed
        // back from the caller.
        let mut cut = MAX_LEN;
        while !cleaned.is_char_boundary(cut) {
            cut -= 1;
        }
        cleaned.truncate(cut);
    }

    if cleaned.trim().is_empty() {
        "unexpected error".to_string()
    } else {
        cleaned
    }
}

pub async fn with_request_id<Fut, T>(request_id: Option<String>, fut: Fut) -> T
where
    Fut: Future<Output = T>,
{
    if let Some(request_id) = request_id {
        REQUEST_ID.scope(request_id, fut).await
    } else {
        fut.await
    }
}

pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(|value| value.clone()).ok()
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("too many requests: {0}")]
    TooManyRequests(String),
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("database error: {0}")]
    Database(String),
    #[error("internal server error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    code: &'static str,
    message: String,
    request_id: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let code = self.code();
        let request_id = current_request_id();

        error!(
            code,
            status = %status,
            request_id = request_id.as_deref().unwrap_or(""),
            error = %self,
            "api_error"
        );

        let body = Json(ErrorResponse {
            code,
            message: self.public_message().into_owned(),
            request_id,
        });

        (status, body).into_response()
    }
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::TooManyRequests(_) => "too_many_requests",
            ApiError::ServiceUnavailable(_) => "service_unavailable",
            ApiError::Database(_) => "database_error",
            ApiError::Internal(_) => "internal_error",
        }
    }

    fn public_message(&self) -> Cow<'static, str> {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg) => Cow::Owned(sanitize_message(msg)),
            ApiError::TooManyRequests(_) => Cow::Borrowed("too many requests"),
            ApiError::ServiceUnavailable(_) => Cow::Borrowed("service unavailable"),
            ApiError::Database(_) | ApiError::Internal(_) => Cow::Borrowed("internal server error"),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(value: ValidationError) -> Self {
        ApiError::BadRequest(value.to_string())
    }
}

impl From<CrewFetchError> for ApiError {
    fn from(value: CrewFetchError) -> Self {
        ApiError::Database(value.to_string())
    }
}

impl From<BookingStorageError> for ApiError {
    fn from(value: BookingStorageError) -> Self {
        match value {
            BookingStorageError::CrewNotFound(id) => {
                ApiError::NotFound(format!("crew not found: {id}"))
            }
            BookingStorageError::Overlap(id) => {
                ApiError::Conflict(format!("crew {id} is already booked over that window"))
            }
            other => ApiError::Database(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use serde_json::Value;

    use super::*;

    #[tokio::test]
    async fn includes_request_id_in_response_body_when_present() {
        let err = ApiError::Internal("boom".into());
        let response = with_request_id(Some("req-42".into()), async { err.into_response() }).await;

        let (parts, body) = response.into_parts();
        assert_eq!(parts.status, StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = body.collect().await.unwrap().to_bytes();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["request_id"], "req-42");
        assert_eq!(json["code"], "internal_error");
        assert_eq!(json["message"], "internal server error");
    }

    #[test]
    fn conflict_errors_map_to_409_with_public_detail() {
        let err = ApiError::from(BookingStorageError::Overlap(7));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert!(err.public_message().contains("crew 7"));
    }

    #[test]
    fn validation_errors_map_to_400() {
        let err = ApiError::from(ValidationError::UnknownTradeType("welding".into()));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.public_message().contains("welding"));
    }

    #[test]
    fn sanitizer_collapses_whitespace_and_caps_length() {
        let long = "x".repeat(500);
        assert_eq!(sanitize_message(&long).len(), 240);
        assert_eq!(sanitize_message("a\n\tb   c"), "a b c");
        assert_eq!(sanitize_message("   "), "unexpected error");
    }

    #[test]
    fn sanitizer_truncates_multibyte_input_on_a_char_boundary() {
        // An echoed unknown trade type can be entirely multibyte.
        let wide = format!("unknown trade type: {}", "個".repeat(120));
        let cleaned = sanitize_message(&wide);

        assert!(cleaned.len() <= 240);
        assert!(cleaned.is_char_boundary(cleaned.len()));
        assert!(cleaned.starts_with("unknown trade type: 個"));
    }
}

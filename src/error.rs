use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
};
use serde::Serialize;

use crate::api::response;
use crate::fetcher::FetchError;
use crate::llm::LlmError;

/// Shown when a page cannot be fetched, whatever the underlying cause.
pub const BLOCKED_MESSAGE: &str =
    "This site blocked the request (e.g. 403). Try pasting the page text manually in the text box instead.";

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Failures surfaced by `/api/analyze`, one variant per response class.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Extraction(String),

    #[error("{0}")]
    Configuration(String),

    #[error("AI request failed: {0}")]
    Upstream(String),

    /// Startup failure (bad HOST/PORT, client construction); never a request outcome.
    #[error("Startup error: {0}")]
    Startup(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Startup(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::Extraction(_) => "extraction",
            AppError::Configuration(_) => "configuration",
            AppError::Upstream(_) => "upstream",
            AppError::Startup(_) => "startup",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        response::error(self.status(), self.to_string()).into_response()
    }
}

// Network detail from a page fetch is never shown to the user
impl From<FetchError> for AppError {
    fn from(_: FetchError) -> Self {
        AppError::Extraction(BLOCKED_MESSAGE.to_string())
    }
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Configuration(msg) => AppError::Configuration(msg),
            LlmError::RequestFailure(detail) => AppError::Upstream(detail),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Extraction("x".into()).status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(AppError::Configuration("x".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(AppError::Upstream("x".into()).status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_startup_kind_is_distinct() {
        let startup = AppError::Startup("Invalid port".into());
        let missing_key = AppError::Configuration("missing key".into());
        assert_eq!(startup.kind(), "startup");
        assert_eq!(missing_key.kind(), "configuration");
        assert_eq!(startup.to_string(), "Startup error: Invalid port");
    }

    #[test]
    fn test_upstream_message_prefix() {
        let err = AppError::Upstream("HTTP 401 Unauthorized".into());
        assert_eq!(err.to_string(), "AI request failed: HTTP 401 Unauthorized");
    }

    #[test]
    fn test_fetch_failure_hides_detail() {
        let err: AppError = FetchError::RequestFailure("dns error: no such host".into()).into();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.to_string(), BLOCKED_MESSAGE);
    }

    #[test]
    fn test_llm_errors_map_by_kind() {
        let err: AppError = LlmError::Configuration("missing key".into()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "missing key");

        let err: AppError = LlmError::RequestFailure("HTTP 503".into()).into();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "AI request failed: HTTP 503");
    }

    #[test]
    fn test_validation_message_is_verbatim() {
        let err = AppError::Validation("question is required".into());
        assert_eq!(err.to_string(), "question is required");
    }
}

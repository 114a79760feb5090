//! API error types
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dhruva_core::DhruvaError;
use serde::Serialize;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// API error with HTTP status code
#[derive(Debug, Clone, Serialize, Error)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ApiError {
    pub fn with_code(status: StatusCode, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: Some(code.into()),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_code(StatusCode::NOT_FOUND, message, "NOT_FOUND")
    }

    /// 409: the request is valid but the session is in the wrong state
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::with_code(StatusCode::CONFLICT, message, "STATE_CONFLICT")
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::with_code(StatusCode::UNPROCESSABLE_ENTITY, message, "VALIDATION_ERROR")
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_code(StatusCode::INTERNAL_SERVER_ERROR, message, "INTERNAL_ERROR")
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "[{}] [{}] {}", self.status.as_u16(), code, self.message),
            None => write!(f, "[{}] {}", self.status.as_u16(), self.message),
        }
    }
}

impl From<DhruvaError> for ApiError {
    fn from(err: DhruvaError) -> Self {
        let message = err.to_string();
        match err {
            DhruvaError::InvalidInput(_) => Self::validation(message),
            DhruvaError::UnknownCase(_) => Self::not_found(message),
            DhruvaError::NoActiveResult
            | DhruvaError::ClarificationPending(_)
            | DhruvaError::NoPendingClarification
            | DhruvaError::InvalidTransition { .. } => Self::conflict(message),
            DhruvaError::TablesError(_) | DhruvaError::TemplateError(_) => {
                tracing::error!(error = %message, "internal error");
                Self::internal(message)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "success": false,
            "error": self.message,
            "code": self.code,
        }));
        (self.status, body).into_response()
    }
}

/// Startup configuration problems
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {key}")]
    Invalid { key: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dhruva_error_mapping() {
        let err: ApiError = DhruvaError::InvalidInput("too short".to_string()).into();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.code.as_deref(), Some("VALIDATION_ERROR"));

        let err: ApiError = DhruvaError::UnknownCase("PGRS-1".to_string()).into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let err: ApiError = DhruvaError::NoPendingClarification.into();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert!(err.message.starts_with("STATE/"));
    }

    #[test]
    fn test_display() {
        let err = ApiError::internal("boom");
        assert_eq!(err.to_string(), "[500] [INTERNAL_ERROR] boom");
    }
}

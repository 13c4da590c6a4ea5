//! API error types and response formatting.
//!
//! Errors are returned as plain-text messages; the front-end shows them
//! verbatim in the result pane.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::fixtures::ResolveError;
use crate::render::RenderError;
use crate::settings::SettingsError;

/// API error type that converts to appropriate HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A required parameter is missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// The requested resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The request violates an access policy.
    #[error("{0}")]
    Forbidden(String),

    /// The input or template could not be processed.
    #[error("{0}")]
    Processing(String),

    /// Unexpected failure.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Processing(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::Validation(msg)
            | Self::NotFound(msg)
            | Self::Forbidden(msg)
            | Self::Processing(msg) => msg,
            Self::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                "An internal error occurred".to_string()
            }
        };

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            message,
        )
            .into_response()
    }
}

impl From<SettingsError> for ApiError {
    fn from(err: SettingsError) -> Self {
        match err {
            SettingsError::MissingSection => Self::Validation(err.to_string()),
            other => Self::Internal(other.into()),
        }
    }
}

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::MissingFilename => Self::Validation(err.to_string()),
            ResolveError::NotConfigured
            | ResolveError::DirectoryMissing
            | ResolveError::FileNotFound => Self::NotFound(err.to_string()),
            ResolveError::AccessDenied(_) => Self::Forbidden(err.to_string()),
            ResolveError::Io(_) => Self::Internal(err.into()),
        }
    }
}

impl From<RenderError> for ApiError {
    fn from(err: RenderError) -> Self {
        Self::Processing(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_statuses() {
        assert_eq!(
            ApiError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Processing("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn error_display_internal() {
        let err = ApiError::Internal(anyhow::anyhow!("something broke"));
        assert_eq!(err.to_string(), "internal error: something broke");
    }

    #[test]
    fn resolve_errors_map_to_statuses() {
        let cases = [
            (ResolveError::MissingFilename, StatusCode::BAD_REQUEST),
            (ResolveError::NotConfigured, StatusCode::NOT_FOUND),
            (ResolveError::DirectoryMissing, StatusCode::NOT_FOUND),
            (ResolveError::FileNotFound, StatusCode::NOT_FOUND),
            (
                ResolveError::AccessDenied("path traversal detected"),
                StatusCode::FORBIDDEN,
            ),
            (
                ResolveError::Io(std::io::Error::other("disk")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn access_denied_message() {
        let err = ApiError::from(ResolveError::AccessDenied("path traversal detected"));
        assert_eq!(err.to_string(), "Access denied - path traversal detected");
    }

    #[test]
    fn missing_section_is_validation() {
        let err = ApiError::from(SettingsError::MissingSection);
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(err.to_string(), "Missing section parameter");
    }

    #[test]
    fn internal_response_hides_details() {
        let response = ApiError::Internal(anyhow::anyhow!("secret path")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
    }
}

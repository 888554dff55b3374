//! Error handling for the Cantata API
//!
//! This module provides a unified error type hierarchy using thiserror,
//! with automatic HTTP status code mapping via Axum's IntoResponse trait.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::player::PlaybackError;

/// API error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for client-side handling
    pub code: &'static str,
    /// Human-readable error message
    pub message: String,
}

/// Main API error type
#[derive(Error, Debug)]
pub enum ApiError {
    // ========== Resource Errors ==========
    /// Requested resource not found
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    // ========== Validation Errors ==========
    /// Request validation failed
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Invalid request body format
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// Invalid query parameter
    #[error("invalid query parameter '{name}': {reason}")]
    InvalidQueryParam { name: &'static str, reason: String },

    // ========== Playback Errors ==========
    /// A playback operation was rejected by the player
    #[error(transparent)]
    Playback(#[from] PlaybackError),

    // ========== Database Errors ==========
    /// Database query failed
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    // ========== Internal Errors ==========
    /// Internal server error (catch-all for unexpected errors)
    #[error("internal server error: {0}")]
    Internal(String),

    /// JSON serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// WebSocket error
    #[error("websocket error: {0}")]
    WebSocket(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 404 Not Found
            Self::NotFound { .. } => StatusCode::NOT_FOUND,

            // 400 Bad Request
            Self::ValidationError(_) | Self::InvalidBody(_) | Self::InvalidQueryParam { .. } => {
                StatusCode::BAD_REQUEST
            }

            // Playback errors map per variant: unresolvable ids and queue
            // indexes are 404, bad input is 400, illegal-in-current-state
            // transitions are 409.
            Self::Playback(e) => match e {
                PlaybackError::TrackNotFound(_) | PlaybackError::QueueIndexOutOfRange(_) => {
                    StatusCode::NOT_FOUND
                }
                PlaybackError::InvalidArgument(_) | PlaybackError::InvalidSeekPosition(_) => {
                    StatusCode::BAD_REQUEST
                }
                PlaybackError::NoNextTrack | PlaybackError::NoPreviousTrack => {
                    StatusCode::CONFLICT
                }
                PlaybackError::Catalog(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },

            // 422 Unprocessable Entity
            Self::Serialization(_) => StatusCode::UNPROCESSABLE_ENTITY,

            // 500 Internal Server Error
            Self::Database(_)
            | Self::Internal(_)
            | Self::WebSocket(_)
            | Self::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code string for client-side handling
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidBody(_) => "INVALID_BODY",
            Self::InvalidQueryParam { .. } => "INVALID_QUERY_PARAM",
            Self::Playback(e) => match e {
                PlaybackError::TrackNotFound(_) => "TRACK_NOT_FOUND",
                PlaybackError::InvalidArgument(_) => "INVALID_ARGUMENT",
                PlaybackError::NoNextTrack => "NO_NEXT_TRACK",
                PlaybackError::NoPreviousTrack => "NO_PREVIOUS_TRACK",
                PlaybackError::InvalidSeekPosition(_) => "INVALID_SEEK_POSITION",
                PlaybackError::QueueIndexOutOfRange(_) => "QUEUE_INDEX_OUT_OF_RANGE",
                PlaybackError::Catalog(_) => "CATALOG_ERROR",
            },
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::WebSocket(_) => "WEBSOCKET_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }

    /// Create a not found error for a specific resource
    pub fn not_found(resource_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type,
            id: id.into(),
        }
    }

    /// Log the error with appropriate severity based on status code
    pub fn log(&self) {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(
                error = %self,
                code = self.error_code(),
                status = status.as_u16(),
                "Server error occurred"
            );
        } else {
            tracing::debug!(
                error = %self,
                code = self.error_code(),
                status = status.as_u16(),
                "Client error"
            );
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();

        let status = self.status_code();
        let error_response = ErrorResponse {
            code: self.error_code(),
            message: self.to_string(),
        };

        (status, Json(error_response)).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<ApiError>() {
            Ok(api_err) => api_err,
            Err(err) => Self::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::not_found("track", "123").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::ValidationError("test".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Internal("boom".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_playback_status_codes() {
        assert_eq!(
            ApiError::from(PlaybackError::TrackNotFound(Uuid::nil())).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(PlaybackError::InvalidSeekPosition(-1.0)).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(PlaybackError::NoNextTrack).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(PlaybackError::QueueIndexOutOfRange(9)).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ApiError::not_found("track", "123").error_code(),
            "NOT_FOUND"
        );
        assert_eq!(
            ApiError::from(PlaybackError::NoPreviousTrack).error_code(),
            "NO_PREVIOUS_TRACK"
        );
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::not_found("track", "abc123");
        assert_eq!(err.to_string(), "track not found: abc123");
    }
}

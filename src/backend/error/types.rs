/**
 * Backend Error Types
 *
 * Errors surfaced by HTTP and WebSocket-upgrade handlers. Each variant maps
 * to a status code and a message for the JSON error body.
 *
 * # Error Categories
 *
 * ## Handler Errors
 *
 * Request-level problems with an explicit status code.
 *
 * ## Auth Errors
 *
 * Missing or invalid bearer tokens. Always 401; the upgrade is refused
 * before any socket exists.
 *
 * ## Realtime and Store Errors
 *
 * Delivery and data-access failures bubbling up from the realtime and
 * scheduler modules.
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::auth::AuthError;
use crate::backend::realtime::RealtimeError;
use crate::backend::scheduler::StoreError;
use crate::shared::SharedError;

/// Backend-specific error types
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error (e.g., malformed request)
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// Bearer token missing or rejected
    #[error(transparent)]
    AuthError(#[from] AuthError),

    /// Live delivery failed
    #[error(transparent)]
    RealtimeError(#[from] RealtimeError),

    /// Club store query failed
    #[error(transparent)]
    StoreError(#[from] StoreError),

    /// Shared error (from shared module)
    #[error(transparent)]
    SharedError(#[from] SharedError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl BackendError {
    /// Create a new handler error with a status code
    ///
    /// # Example
    ///
    /// ```rust
    /// use axum::http::StatusCode;
    /// use task_social::backend::error::BackendError;
    ///
    /// let err = BackendError::handler(StatusCode::BAD_REQUEST, "Invalid request");
    /// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    /// ```
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `HandlerError` - Uses the status code from the error
    /// - `AuthError` - 401 Unauthorized
    /// - `RealtimeError` - 404 when the recipient is offline, 502 otherwise
    /// - `StoreError` - 404 for missing rows, 503 otherwise
    /// - `SharedError` - 400 for validation, 500 otherwise
    /// - `SerializationError` - 500 Internal Server Error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::AuthError(_) => StatusCode::UNAUTHORIZED,
            Self::RealtimeError(err) => match err {
                RealtimeError::NotConnected { .. } => StatusCode::NOT_FOUND,
                RealtimeError::DeliveryFailed { .. } => StatusCode::BAD_GATEWAY,
                RealtimeError::Shared(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::StoreError(err) => match err {
                StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
                StoreError::Database(_) | StoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            Self::SharedError(err) => match err {
                SharedError::ValidationError { .. } | SharedError::IntervalError(_) => StatusCode::BAD_REQUEST,
                SharedError::SerializationError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::AuthError(err) => err.to_string(),
            Self::RealtimeError(err) => err.to_string(),
            // Database details stay in the logs
            Self::StoreError(StoreError::Database(_)) => "database unavailable".to_string(),
            Self::StoreError(err) => err.to_string(),
            Self::SharedError(err) => err.to_string(),
            Self::SerializationError(err) => err.to_string(),
        }
    }
}

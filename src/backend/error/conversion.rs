/**
 * Error Conversion
 *
 * `IntoResponse` for backend errors, so handlers and extractors can return
 * them directly.
 *
 * # Response Format
 *
 * ```json
 * {
 *   "error": "Error message",
 *   "status": 401
 * }
 * ```
 */

use axum::{
    response::{IntoResponse, Response},
    Json,
};

use crate::backend::error::types::BackendError;

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.message();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %message, "Request rejected");
        }

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}

/**
 * Authentication Extractor
 *
 * Pulls a bearer token from the request and verifies it against the
 * configured secret. Browsers cannot set headers on a WebSocket handshake,
 * so the token may also arrive as a `?token=` query parameter; the header
 * wins when both are present.
 */

use axum::{
    extract::{FromRef, FromRequestParts, Query},
    http::{header::AUTHORIZATION, request::Parts},
};
use serde::Deserialize;

use crate::backend::auth::{verify_token, AuthError, Credential};
use crate::backend::error::BackendError;
use crate::shared::AppConfig;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Bearer token from `Authorization: Bearer <jwt>` or `?token=<jwt>`
pub fn extract_token(parts: &Parts) -> Option<String> {
    let from_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    from_header.or_else(|| {
        Query::<TokenQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(q)| q.token)
            .filter(|t| !t.is_empty())
    })
}

/// Axum extractor for an authenticated caller
///
/// Rejects with 401 before the handler runs.
#[derive(Clone, Debug)]
pub struct AuthUser(pub Credential);

impl<S> FromRequestParts<S> for AuthUser
where
    Arc<AppConfig>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = Arc::<AppConfig>::from_ref(state);

        let token = extract_token(parts).ok_or_else(|| {
            tracing::warn!(path = %parts.uri.path(), "Missing bearer token");
            AuthError::MissingToken
        })?;

        let credential = verify_token(&config.jwt_secret, &token).map_err(|e| {
            tracing::warn!(error = %e, "Invalid bearer token");
            e
        })?;

        Ok(AuthUser(credential))
    }
}

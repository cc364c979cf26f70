/**
 * Session Tokens
 *
 * HS256 JWT verification for connection upgrades. Tokens are issued by the
 * login flow elsewhere; `create_token` exists so tooling and tests can mint
 * tokens signed with the same secret.
 */

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::backend::auth::credential::Credential;
use crate::backend::auth::AuthError;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
}

fn unix_now() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}

/// Create a JWT token for a user
///
/// # Arguments
/// * `secret` - HMAC secret
/// * `user_id` - Subject of the token
/// * `ttl` - Lifetime of the token
pub fn create_token(secret: &str, user_id: &str, ttl: Duration) -> Result<String, AuthError> {
    let now = unix_now();
    let claims = Claims {
        sub: user_id.to_string(),
        exp: now.saturating_add(ttl.as_secs()),
        iat: now,
    };

    let key = EncodingKey::from_secret(secret.as_bytes());
    Ok(encode(&Header::default(), &claims, &key)?)
}

/// Verify a JWT token and return the credential it carries
///
/// Signature, algorithm and expiry are checked; the subject must be
/// non-empty. Expiry has no leeway and is inclusive: a token is rejected
/// from the second named by `exp` onward, the same instant the sweeper
/// would evict it.
pub fn verify_token(secret: &str, token: &str) -> Result<Credential, AuthError> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::default();
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &key, &validation)?;
    let claims = token_data.claims;

    if claims.exp <= unix_now() {
        return Err(AuthError::Token(ErrorKind::ExpiredSignature.into()));
    }

    if claims.sub.is_empty() {
        return Err(AuthError::InvalidSubject);
    }

    Ok(Credential::new(claims.sub, claims.exp))
}

//! Authentication Module
//!
//! Live connections only need to know who is on the other end and until
//! when. This module verifies bearer tokens and reduces them to a
//! [`Credential`]; account management and token issuance for end users
//! happen in the REST layer.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and AuthError
//! ├── credential.rs   - Credential and expiry checks
//! └── sessions.rs     - JWT creation and verification
//! ```

/// Credential and expiry checks
pub mod credential;

/// JWT token management
pub mod sessions;

use thiserror::Error;

pub use credential::{Credential, CredentialError, UserId};
pub use sessions::{create_token, verify_token};

/// Authentication failures
#[derive(Debug, Error)]
pub enum AuthError {
    /// No bearer token in the header or query string
    #[error("missing bearer token")]
    MissingToken,

    /// Token failed signature, algorithm or expiry checks
    #[error("invalid token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Token verified but names no subject
    #[error("token has no subject")]
    InvalidSubject,
}

//! Middleware Module
//!
//! Request-level concerns shared by handlers.
//!
//! - **`auth`** - Bearer token extraction and the `AuthUser` extractor

pub mod auth;

pub use auth::{extract_token, AuthUser};

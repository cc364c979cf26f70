//! Common test utilities and helpers
//!
//! This module provides shared utilities for all tests including:
//! - Recording connection handles and a fault-injecting store
//! - Token and configuration helpers
//! - Custom assertion macros

#[cfg(feature = "ssr")]
pub mod auth_helpers;

#[cfg(feature = "ssr")]
pub use auth_helpers::*;
#[cfg(feature = "ssr")]
pub use fixtures::*;

//! Backend Error Module
//!
//! Error types for HTTP handlers and the WebSocket upgrade. Every error
//! converts into a JSON response with a matching status code.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - Error type definitions
//! └── conversion.rs - IntoResponse implementation
//! ```

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

pub use types::BackendError;

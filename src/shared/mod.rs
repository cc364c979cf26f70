//! Shared Module
//!
//! Types that do not depend on the server runtime: the wire envelope pushed
//! to live connections, metric interval parsing, configuration and shared
//! error types. Everything here compiles without the `ssr` feature.

/// Real-time event envelope
pub mod event;

/// Shared error types
pub mod error;

/// Metric interval expressions
pub mod interval;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use event::{Envelope, EventType};
pub use error::SharedError;
pub use interval::{parse_interval, IntervalError};
pub use config::{AppConfig, AppConfigBuilder, ClubScope, ConfigError};

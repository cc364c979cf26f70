//! Backend Module
//!
//! Server-side code for the task-social backend: live per-user WebSocket
//! push, expiry of connections whose token ran out, and the periodic metric
//! rollover for clubs.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - Application state, store loading, startup
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`realtime`** - Connection registry, broadcaster, sweeper, `/ws`
//! - **`scheduler`** - Club store and metric rollover ticks
//! - **`auth`** - Bearer token verification and credentials
//! - **`middleware`** - Request extractors
//! - **`clock`** - Time source for periodic work
//! - **`error`** - Backend-specific error types
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Server binary
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── realtime/       - Live connections and fan-out
//! ├── scheduler/      - Metric rollover
//! ├── auth/           - Credentials and tokens
//! ├── middleware/     - Request extractors
//! ├── clock.rs        - Clock trait
//! └── error/          - Error types
//! ```
//!
//! # Background Tasks
//!
//! Two tokio tasks run beside the HTTP server, each on its own interval:
//!
//! - the expiry sweeper, which closes connections whose credential expired
//! - the metric scheduler, which appends a new instance for every metric
//!   whose current instance is due, and announces it to club members
//!
//! Both share the registry and store with the request handlers; neither
//! holds a lock across I/O.

/// Application server setup
pub mod server;

/// HTTP routes
pub mod routes;

/// Live connections and fan-out
pub mod realtime;

/// Metric rollover scheduling
pub mod scheduler;

/// Authentication
pub mod auth;

/// Request middleware
pub mod middleware;

/// Time source
pub mod clock;

/// Backend error types
pub mod error;

pub use error::BackendError;

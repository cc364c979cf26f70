//! Route Configuration Module
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Main router creation
//! └── api_routes.rs   - Version and health endpoints
//! ```
//!
//! # Routes
//!
//! - `GET /ws` - WebSocket upgrade (see `backend::realtime::socket`)
//! - `GET /api/version` - `{version, commit_hash, build_date}`
//! - `GET /health` - `{status, connections, store}`

/// Main router creation
pub mod router;

/// API endpoint handlers
pub mod api_routes;

#[cfg(feature = "ssr")]
pub use router::create_router;

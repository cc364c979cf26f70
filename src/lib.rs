//! Task Social - Main Library
//!
//! Backend core for a social task tracker: users join clubs, clubs track
//! recurring metrics, and connected users receive live notifications over
//! WebSockets.
//!
//! # Module Structure
//!
//! - **`shared`** - Types usable without the server stack
//!   - Wire envelope and event tags
//!   - Interval expressions
//!   - Configuration
//!   - Error types
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Connection registry, broadcaster and expiry sweeper
//!   - Metric rollover scheduler and club store
//!   - Axum routes, including the `/ws` upgrade
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - Enables the backend modules and the server binary
//!
//! # Usage
//!
//! ```rust,no_run
//! use task_social::backend::server::create_app;
//! use task_social::shared::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (app, _state, _tasks) = create_app(AppConfig::default()).await;
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:5050").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! The connection registry is a single `Mutex`-guarded map, never held
//! across a network write. Metric ticks are serialized by an async mutex.

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;

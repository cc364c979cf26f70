//! Server Module
//!
//! Everything needed to stand the backend up: state, storage selection and
//! startup.
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState and FromRef implementations
//! ├── config.rs       - Database and store loading
//! └── init.rs         - State building, background tasks, app creation
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Store Loading**: PostgreSQL with migrations, or the in-memory store
//! 2. **State Creation**: registry, broadcaster, scheduler, notifier
//! 3. **Background Tasks**: expiry sweeper and metric scheduler
//! 4. **Router Creation**: routes and the trace layer
//!
//! # Example
//!
//! ```rust,no_run
//! use task_social::backend::server::create_app;
//! use task_social::shared::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::from_env()?;
//! let (router, state, _tasks) = create_app(config).await;
//! # Ok(())
//! # }
//! ```

/// Application state management
pub mod state;

/// Database and store loading
pub mod config;

/// Server initialization
pub mod init;

#[cfg(feature = "ssr")]
pub use init::{build_state, create_app, start_background_tasks, BackgroundTasks};
#[cfg(feature = "ssr")]
pub use state::AppState;

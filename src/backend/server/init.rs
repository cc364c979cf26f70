/**
 * Server Initialization
 *
 * Builds application state, starts the background tasks and configures the
 * router.
 *
 * # Initialization Process
 *
 * 1. Pick the club store (PostgreSQL if configured and reachable, otherwise
 *    in-memory)
 * 2. Build the registry, broadcaster, scheduler and notifier around it
 * 3. Start the expiry sweeper and the metric scheduler
 * 4. Create the router
 */

#[cfg(feature = "ssr")]
use axum::Router;
#[cfg(feature = "ssr")]
use std::sync::Arc;
#[cfg(feature = "ssr")]
use tokio::task::JoinHandle;

#[cfg(feature = "ssr")]
use crate::backend::realtime::ExpirySweeper;
#[cfg(feature = "ssr")]
use crate::backend::routes::router::create_router;
#[cfg(feature = "ssr")]
use crate::backend::server::config::load_store;
#[cfg(feature = "ssr")]
use crate::backend::server::state::AppState;
#[cfg(feature = "ssr")]
use crate::shared::AppConfig;

/// Handles of the periodic tasks started with the server
#[cfg(feature = "ssr")]
#[derive(Debug)]
pub struct BackgroundTasks {
    pub sweeper: JoinHandle<()>,
    pub scheduler: JoinHandle<()>,
}

#[cfg(feature = "ssr")]
impl BackgroundTasks {
    pub fn abort(&self) {
        self.sweeper.abort();
        self.scheduler.abort();
    }
}

/// Build application state for `config`
#[cfg(feature = "ssr")]
pub async fn build_state(config: AppConfig) -> AppState {
    if config.uses_default_secret() {
        tracing::warn!("JWT_SECRET_KEY not set. Using the development secret.");
    }

    let store = load_store(&config).await;
    tracing::info!(store = store.backend_name(), "Club store ready");

    AppState::new(config, store)
}

/// Start the expiry sweeper and the metric scheduler for `state`
///
/// When `notify_rollovers` is set, every rollover a tick records is
/// announced to the club's connected members.
#[cfg(feature = "ssr")]
pub fn start_background_tasks(state: &AppState) -> BackgroundTasks {
    let sweeper = ExpirySweeper::new(Arc::clone(&state.registry), Arc::clone(&state.clock))
        .spawn(state.config.sweep_interval);

    let notifier = state.notifier.clone();
    let notify = state.config.notify_rollovers;
    let scheduler = Arc::clone(&state.scheduler).spawn(state.config.scheduler_interval, move |report| {
        let notifier = notifier.clone();
        async move {
            if notify && !report.rollovers.is_empty() {
                let delivered = notifier.notify_rollovers(&report).await;
                tracing::debug!(
                    rollovers = report.rollovers.len(),
                    delivered,
                    "[Scheduler] Rollovers announced"
                );
            }
        }
    });

    BackgroundTasks { sweeper, scheduler }
}

/// Create and configure the Axum application
///
/// # Returns
///
/// The router, the state behind it, and the handles of the background tasks
#[cfg(feature = "ssr")]
pub async fn create_app(config: AppConfig) -> (Router<()>, AppState, BackgroundTasks) {
    tracing::info!("Initializing task-social backend server");

    let state = build_state(config).await;
    let tasks = start_background_tasks(&state);
    let app = create_router(state.clone());

    tracing::info!("Router configured with sweeper and scheduler tasks");

    (app, state, tasks)
}

/**
 * Application State Management
 *
 * `AppState` is the central state container handed to every handler. It
 * holds explicitly constructed components, each shared by `Arc` or by a
 * cheaply cloneable wrapper:
 *
 * - the configuration the server was started with
 * - the connection registry and the broadcaster over it
 * - the club store and the metric scheduler using it
 * - the club notifier
 *
 * # State Extraction
 *
 * The `FromRef` implementations let handlers and extractors ask for just
 * the piece they need, e.g. `State<Broadcaster<WsConnection>>`.
 */

#[cfg(feature = "ssr")]
use axum::extract::FromRef;
#[cfg(feature = "ssr")]
use std::sync::Arc;

#[cfg(feature = "ssr")]
use crate::backend::clock::{Clock, SystemClock};
#[cfg(feature = "ssr")]
use crate::backend::realtime::{Broadcaster, ClubNotifier, WsConnection, WsRegistry};
#[cfg(feature = "ssr")]
use crate::backend::scheduler::{MetricScheduler, Store};
#[cfg(feature = "ssr")]
use crate::shared::AppConfig;

#[cfg(feature = "ssr")]
#[derive(Clone)]
pub struct AppState {
    /// Configuration the server was started with
    pub config: Arc<AppConfig>,

    /// Every live WebSocket connection, one per user
    pub registry: Arc<WsRegistry>,

    /// Fan-out over `registry`
    pub broadcaster: Broadcaster<WsConnection>,

    /// Club persistence (PostgreSQL or in-memory)
    pub store: Store,

    /// Metric rollover scheduler over `store`
    pub scheduler: Arc<MetricScheduler<Store>>,

    /// Club member fan-out
    pub notifier: ClubNotifier<Store, WsConnection>,

    /// Time source shared by the sweeper and the scheduler
    pub clock: Arc<dyn Clock>,
}

#[cfg(feature = "ssr")]
impl AppState {
    /// Assemble state around an existing store, using the system clock
    pub fn new(config: AppConfig, store: Store) -> Self {
        Self::with_clock(config, store, Arc::new(SystemClock))
    }

    pub fn with_clock(config: AppConfig, store: Store, clock: Arc<dyn Clock>) -> Self {
        let registry = Arc::new(WsRegistry::new());
        let broadcaster = Broadcaster::new(Arc::clone(&registry));
        let scheduler = Arc::new(MetricScheduler::new(
            store.clone(),
            Arc::clone(&clock),
            config.club_scope,
        ));
        let notifier = ClubNotifier::new(store.clone(), broadcaster.clone());

        Self {
            config: Arc::new(config),
            registry,
            broadcaster,
            store,
            scheduler,
            notifier,
            clock,
        }
    }
}

#[cfg(feature = "ssr")]
impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.config.clone()
    }
}

#[cfg(feature = "ssr")]
impl FromRef<AppState> for Arc<WsRegistry> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.registry.clone()
    }
}

#[cfg(feature = "ssr")]
impl FromRef<AppState> for Broadcaster<WsConnection> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.broadcaster.clone()
    }
}

#[cfg(feature = "ssr")]
impl FromRef<AppState> for Store {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.store.clone()
    }
}

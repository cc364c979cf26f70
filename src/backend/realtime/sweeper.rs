/**
 * Expiry Sweeper
 *
 * Tokens expire while sockets stay open. The sweeper periodically drops
 * every connection whose credential has lapsed, or whose credential never
 * carried a usable expiry, so a client must reconnect and re-authenticate.
 */

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::backend::clock::Clock;
use crate::backend::realtime::connection::ConnectionHandle;
use crate::backend::realtime::registry::{ConnectionRegistry, EvictionReason};

pub struct ExpirySweeper<H> {
    registry: Arc<ConnectionRegistry<H>>,
    clock: Arc<dyn Clock>,
}

impl<H: ConnectionHandle> ExpirySweeper<H> {
    pub fn new(registry: Arc<ConnectionRegistry<H>>, clock: Arc<dyn Clock>) -> Self {
        Self { registry, clock }
    }

    /// Evict expired and malformed credentials, returning how many were dropped
    pub fn sweep(&self) -> usize {
        let evicted = self.registry.evict_expired(self.clock.now());

        for eviction in &evicted {
            match &eviction.reason {
                EvictionReason::Expired { at } => tracing::warn!(
                    user_id = %eviction.user_id,
                    connection_id = eviction.connection_id,
                    expired_at = %at,
                    "[Sweeper] Credential expired, connection closed"
                ),
                EvictionReason::Malformed(err) => tracing::warn!(
                    user_id = %eviction.user_id,
                    connection_id = eviction.connection_id,
                    error = %err,
                    "[Sweeper] Malformed credential, connection closed"
                ),
            }
        }

        evicted.len()
    }

    /// Run `sweep` every `interval` on the tokio runtime
    pub fn spawn(self, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            tracing::info!(interval_secs = interval.as_secs(), "[Sweeper] Started");

            loop {
                ticker.tick().await;
                let evicted = self.sweep();
                if evicted > 0 {
                    tracing::info!(evicted, remaining = self.registry.len(), "[Sweeper] Sweep complete");
                }
            }
        })
    }
}

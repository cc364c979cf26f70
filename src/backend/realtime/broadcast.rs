/**
 * Real-time Event Broadcasting
 *
 * Pushes text frames to registered connections. Business code calls the
 * broadcaster after committing its own state change; delivery is best
 * effort and never feeds back into that write.
 *
 * # Delivery
 *
 * Every reachable recipient is attempted, concurrently, with each send
 * bounded by the connection's write deadline. Recipients with no live
 * connection are skipped silently. A failed send removes that recipient
 * from the registry, unless its entry was replaced while the send was in
 * flight, and is reported alongside the count of successful deliveries.
 */

use futures_util::future::join_all;
use std::sync::Arc;

use crate::backend::realtime::connection::ConnectionHandle;
use crate::backend::realtime::error::{FailedDelivery, RealtimeError};
use crate::backend::realtime::registry::{ConnectionRegistry, Registered};
use crate::shared::Envelope;

/// Fan-out over a shared [`ConnectionRegistry`]
#[derive(Debug)]
pub struct Broadcaster<H> {
    registry: Arc<ConnectionRegistry<H>>,
}

impl<H> Clone for Broadcaster<H> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<H: ConnectionHandle> Broadcaster<H> {
    pub fn new(registry: Arc<ConnectionRegistry<H>>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry<H>> {
        &self.registry
    }

    /// Deliver `text` to each connected user in `recipients`
    ///
    /// # Returns
    ///
    /// `Ok(n)` with the number of deliveries when no send failed, otherwise
    /// `RealtimeError::DeliveryFailed` listing every failed recipient.
    pub async fn broadcast<S: AsRef<str>>(
        &self,
        recipients: &[S],
        text: &str,
    ) -> Result<usize, RealtimeError> {
        let targets = self.registry.lookup(recipients);
        let skipped = recipients.len().saturating_sub(targets.len());
        if skipped > 0 {
            tracing::debug!(skipped, "[Realtime] Skipping offline or duplicate recipients");
        }
        self.deliver(targets, text).await
    }

    /// Deliver `text` to every registered connection
    pub async fn broadcast_all(&self, text: &str) -> Result<usize, RealtimeError> {
        let targets = self.registry.snapshot();
        self.deliver(targets, text).await
    }

    /// Deliver `text` to a single user
    ///
    /// Unlike [`Broadcaster::broadcast`], an absent recipient is reported as
    /// `RealtimeError::NotConnected`.
    pub async fn send_to_one(&self, recipient: &str, text: &str) -> Result<(), RealtimeError> {
        let targets = self.registry.lookup(&[recipient]);
        if targets.is_empty() {
            return Err(RealtimeError::NotConnected {
                user_id: recipient.to_string(),
            });
        }
        self.deliver(targets, text).await.map(|_| ())
    }

    pub async fn broadcast_event<S: AsRef<str>>(
        &self,
        recipients: &[S],
        envelope: &Envelope,
    ) -> Result<usize, RealtimeError> {
        let text = envelope.to_text()?;
        self.broadcast(recipients, &text).await
    }

    pub async fn broadcast_all_event(&self, envelope: &Envelope) -> Result<usize, RealtimeError> {
        let text = envelope.to_text()?;
        self.broadcast_all(&text).await
    }

    pub async fn send_event_to_one(
        &self,
        recipient: &str,
        envelope: &Envelope,
    ) -> Result<(), RealtimeError> {
        let text = envelope.to_text()?;
        self.send_to_one(recipient, &text).await
    }

    async fn deliver(&self, targets: Vec<Registered<H>>, text: &str) -> Result<usize, RealtimeError> {
        if targets.is_empty() {
            return Ok(0);
        }

        let outcomes = join_all(targets.into_iter().map(|target| async move {
            let result = target.handle.send(text).await;
            (target, result)
        }))
        .await;

        let mut delivered = 0;
        let mut failed = Vec::new();

        for (target, result) in outcomes {
            match result {
                Ok(()) => delivered += 1,
                Err(error) => {
                    tracing::warn!(
                        user_id = %target.user_id,
                        connection_id = target.connection_id,
                        error = %error,
                        "[Realtime] Send failed, dropping connection"
                    );
                    self.registry
                        .remove_if_current(&target.user_id, target.connection_id);
                    failed.push(FailedDelivery {
                        user_id: target.user_id,
                        error,
                    });
                }
            }
        }

        if failed.is_empty() {
            tracing::debug!(delivered, "[Realtime] Broadcast delivered");
            Ok(delivered)
        } else {
            Err(RealtimeError::DeliveryFailed { delivered, failed })
        }
    }
}

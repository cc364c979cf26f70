//! Club fan-out
//!
//! Resolves a club's members through the store and pushes an envelope to
//! whichever of them are connected. Callers have already committed the
//! change being announced; a failed push is logged and returned, never
//! rolled back.

use std::collections::BTreeMap;
use uuid::Uuid;

use crate::backend::realtime::broadcast::Broadcaster;
use crate::backend::realtime::connection::ConnectionHandle;
use crate::backend::realtime::error::RealtimeError;
use crate::backend::scheduler::{ClubStore, Rollover, StoreError, TickReport};
use crate::shared::Envelope;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("resolving members of club {club_id} failed: {error}")]
    Members { club_id: Uuid, error: StoreError },

    #[error(transparent)]
    Delivery(#[from] RealtimeError),
}

pub struct ClubNotifier<S, H> {
    store: S,
    broadcaster: Broadcaster<H>,
}

impl<S: Clone, H> Clone for ClubNotifier<S, H> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            broadcaster: self.broadcaster.clone(),
        }
    }
}

impl<S: ClubStore, H: ConnectionHandle> ClubNotifier<S, H> {
    pub fn new(store: S, broadcaster: Broadcaster<H>) -> Self {
        Self { store, broadcaster }
    }

    /// Push `envelope` to every connected member of `club_id`
    pub async fn notify_club(&self, club_id: Uuid, envelope: &Envelope) -> Result<usize, NotifyError> {
        let members = self
            .store
            .list_club_member_ids(club_id)
            .await
            .map_err(|error| NotifyError::Members { club_id, error })?;

        let delivered = self.broadcaster.broadcast_event(&members, envelope).await?;
        tracing::debug!(
            club_id = %club_id,
            event = %envelope.event,
            members = members.len(),
            delivered,
            "[Notify] Club notified"
        );
        Ok(delivered)
    }

    /// Announce each rollover in `report` to its club
    ///
    /// Returns the number of deliveries. Failures are logged per club and do
    /// not stop the remaining announcements.
    pub async fn notify_rollovers(&self, report: &TickReport) -> usize {
        let mut by_club: BTreeMap<Uuid, Vec<&Rollover>> = BTreeMap::new();
        for rollover in &report.rollovers {
            by_club.entry(rollover.club_id).or_default().push(rollover);
        }

        let mut delivered = 0;
        for (club_id, rollovers) in by_club {
            for rollover in rollovers {
                let envelope = Envelope::metric_rolled_over(
                    &club_id.to_string(),
                    &rollover.metric_id.to_string(),
                    &rollover.instance.id.to_string(),
                    rollover.instance.due_at,
                );
                match self.notify_club(club_id, &envelope).await {
                    Ok(count) => delivered += count,
                    Err(NotifyError::Delivery(RealtimeError::DeliveryFailed {
                        delivered: partial,
                        failed,
                    })) => {
                        delivered += partial;
                        tracing::warn!(
                            club_id = %club_id,
                            metric_id = %rollover.metric_id,
                            failed = failed.len(),
                            "[Notify] Rollover notice partially delivered"
                        );
                    }
                    Err(err) => tracing::warn!(
                        club_id = %club_id,
                        metric_id = %rollover.metric_id,
                        error = %err,
                        "[Notify] Rollover notice failed"
                    ),
                }
            }
        }
        delivered
    }
}

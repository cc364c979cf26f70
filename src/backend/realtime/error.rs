//! Real-time delivery errors

use std::time::Duration;
use thiserror::Error;

use crate::backend::auth::UserId;
use crate::shared::SharedError;

/// A single send to a connection failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The connection was closed or its writer is gone
    #[error("connection closed")]
    Closed,
    /// The send did not complete within the write deadline
    #[error("write timed out after {0:?}")]
    Timeout(Duration),
    /// Any other transport failure
    #[error("transport error: {0}")]
    Other(String),
}

/// One recipient that could not be reached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedDelivery {
    pub user_id: UserId,
    pub error: TransportError,
}

/// Errors returned by the broadcaster
#[derive(Debug, Error)]
pub enum RealtimeError {
    /// `send_to_one` target has no live connection
    #[error("recipient {user_id} is not connected")]
    NotConnected { user_id: UserId },

    /// At least one send failed; `delivered` sends succeeded
    #[error("delivery failed for {} recipient(s), {delivered} delivered", failed.len())]
    DeliveryFailed {
        delivered: usize,
        failed: Vec<FailedDelivery>,
    },

    /// The envelope could not be serialized
    #[error(transparent)]
    Shared(#[from] SharedError),
}

impl RealtimeError {
    /// IDs of the recipients whose send failed
    pub fn failed_recipients(&self) -> Vec<&str> {
        match self {
            RealtimeError::DeliveryFailed { failed, .. } => {
                failed.iter().map(|f| f.user_id.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }
}

/**
 * Connection Registry
 *
 * Thread-safe map from user identity to that user's live connection and the
 * credential it was opened with. At most one connection per user is kept: a
 * new connection from the same user replaces the previous one, and the
 * displaced handle is closed.
 *
 * # Locking
 *
 * A single `Mutex` guards the whole map. It is held only for the lookup or
 * mutation itself: handles are cloned out before any send, and handles
 * leaving the map are closed after the guard is dropped. A poisoned lock is
 * recovered, since every critical section leaves the map consistent.
 *
 * # Connection Identity
 *
 * Every `add` assigns a fresh `ConnectionId`. Code acting on a handle it
 * fetched earlier (the connection's own reader loop, a broadcaster whose
 * send failed) removes with `remove_if_current`, so it can never evict a
 * newer connection that replaced the one it saw.
 */

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::backend::auth::{Credential, CredentialError, UserId};
use crate::backend::realtime::connection::ConnectionHandle;

/// Identifier assigned to each registered connection
pub type ConnectionId = u64;

#[derive(Debug)]
struct ConnectionEntry<H> {
    id: ConnectionId,
    handle: H,
    credential: Credential,
}

/// A registered connection as seen by callers
#[derive(Debug, Clone)]
pub struct Registered<H> {
    pub user_id: UserId,
    pub connection_id: ConnectionId,
    pub handle: H,
}

/// Why the sweeper evicted a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvictionReason {
    /// Credential expiry is at or before the sweep instant
    Expired { at: DateTime<Utc> },
    /// Credential could not yield an expiry
    Malformed(CredentialError),
}

/// A connection removed by [`ConnectionRegistry::evict_expired`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eviction {
    pub user_id: UserId,
    pub connection_id: ConnectionId,
    pub reason: EvictionReason,
}

/// Registry of live connections, one per user
#[derive(Debug)]
pub struct ConnectionRegistry<H> {
    connections: Mutex<HashMap<UserId, ConnectionEntry<H>>>,
    next_id: AtomicU64,
}

impl<H: ConnectionHandle> Default for ConnectionRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ConnectionHandle> ConnectionRegistry<H> {
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<UserId, ConnectionEntry<H>>> {
        self.connections.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `handle` for `user_id`, closing any connection it replaces
    pub fn add(&self, user_id: impl Into<UserId>, handle: H, credential: Credential) -> ConnectionId {
        let user_id = user_id.into();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let entry = ConnectionEntry {
            id,
            handle,
            credential,
        };

        let displaced = self.lock().insert(user_id.clone(), entry);

        if let Some(old) = displaced {
            tracing::info!(
                user_id = %user_id,
                old_connection_id = old.id,
                connection_id = id,
                "[Realtime] Replacing existing connection"
            );
            old.handle.close();
        } else {
            tracing::debug!(user_id = %user_id, connection_id = id, "[Realtime] Connection registered");
        }

        id
    }

    /// Remove and close the connection for `user_id`, if any
    pub fn remove(&self, user_id: &str) -> bool {
        let removed = self.lock().remove(user_id);
        match removed {
            Some(entry) => {
                tracing::debug!(user_id = %user_id, connection_id = entry.id, "[Realtime] Connection removed");
                entry.handle.close();
                true
            }
            None => false,
        }
    }

    /// Remove and close the connection for `user_id` only if it is still `connection_id`
    pub fn remove_if_current(&self, user_id: &str, connection_id: ConnectionId) -> bool {
        let removed = {
            let mut connections = self.lock();
            match connections.get(user_id) {
                Some(entry) if entry.id == connection_id => connections.remove(user_id),
                _ => None,
            }
        };

        match removed {
            Some(entry) => {
                tracing::debug!(user_id = %user_id, connection_id, "[Realtime] Connection removed");
                entry.handle.close();
                true
            }
            None => false,
        }
    }

    /// Handle for `user_id`. Does not check credential expiry.
    pub fn get(&self, user_id: &str) -> Option<H> {
        self.lock().get(user_id).map(|entry| entry.handle.clone())
    }

    pub fn connection_id(&self, user_id: &str) -> Option<ConnectionId> {
        self.lock().get(user_id).map(|entry| entry.id)
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.lock().contains_key(user_id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Registered connections among `user_ids`
    ///
    /// Absent users are skipped and duplicates are returned once, in order
    /// of first appearance.
    pub fn lookup<S: AsRef<str>>(&self, user_ids: &[S]) -> Vec<Registered<H>> {
        let mut seen = HashSet::with_capacity(user_ids.len());
        let connections = self.lock();

        user_ids
            .iter()
            .map(AsRef::as_ref)
            .filter(|user_id| seen.insert(*user_id))
            .filter_map(|user_id| {
                connections.get(user_id).map(|entry| Registered {
                    user_id: user_id.to_string(),
                    connection_id: entry.id,
                    handle: entry.handle.clone(),
                })
            })
            .collect()
    }

    /// Every registered connection
    pub fn snapshot(&self) -> Vec<Registered<H>> {
        self.lock()
            .iter()
            .map(|(user_id, entry)| Registered {
                user_id: user_id.clone(),
                connection_id: entry.id,
                handle: entry.handle.clone(),
            })
            .collect()
    }

    /// Remove and close every connection whose credential is expired at `now`
    /// or cannot yield an expiry
    pub fn evict_expired(&self, now: DateTime<Utc>) -> Vec<Eviction> {
        let mut evicted = Vec::new();
        {
            let mut connections = self.lock();
            connections.retain(|user_id, entry| {
                let reason = match entry.credential.expiry() {
                    Ok(at) if now >= at => EvictionReason::Expired { at },
                    Ok(_) => return true,
                    Err(err) => EvictionReason::Malformed(err),
                };
                evicted.push((
                    Eviction {
                        user_id: user_id.clone(),
                        connection_id: entry.id,
                        reason,
                    },
                    entry.handle.clone(),
                ));
                false
            });
        }

        evicted
            .into_iter()
            .map(|(eviction, handle)| {
                handle.close();
                eviction
            })
            .collect()
    }

    /// Remove and close every connection
    pub fn close_all(&self) -> usize {
        let drained: Vec<ConnectionEntry<H>> = self.lock().drain().map(|(_, entry)| entry).collect();
        let count = drained.len();
        for entry in drained {
            entry.handle.close();
        }
        count
    }
}

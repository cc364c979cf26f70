/**
 * Connection Handles
 *
 * A connection handle is the registry's view of one live client: something
 * a text frame can be pushed into, and something that can be told to shut
 * down. The registry never touches sockets directly.
 *
 * # WebSocket Connections
 *
 * `WsConnection` does not own the socket either. Each upgraded socket gets
 * a writer task that drains a bounded queue into the socket sink; the
 * handle holds the sending half of that queue plus a `watch` close signal.
 *
 * - `send` enqueues a frame, waiting at most the write deadline for queue
 *   space. A client that stops reading fills its queue and then times out
 *   instead of stalling the caller.
 * - `close` flips the signal. The writer task sends a close frame and
 *   exits, and the reader loop observes the same signal and ends the
 *   connection.
 */

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::SendTimeoutError;
use tokio::sync::{mpsc, watch};

use crate::backend::realtime::error::TransportError;

/// A live bidirectional endpoint owned by the registry
pub trait ConnectionHandle: Clone + Send + Sync + 'static {
    /// Push one text frame to the client
    fn send(&self, text: &str) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Ask the connection to shut down. Must not block.
    fn close(&self);
}

/// Handle to an upgraded WebSocket connection
#[derive(Debug, Clone)]
pub struct WsConnection {
    outbound: mpsc::Sender<String>,
    closed: Arc<watch::Sender<bool>>,
    write_timeout: Duration,
}

impl WsConnection {
    /// Create a handle and the queue its writer task drains
    pub fn channel(buffer: usize, write_timeout: Duration) -> (Self, mpsc::Receiver<String>) {
        let (outbound, rx) = mpsc::channel(buffer.max(1));
        let (closed, _) = watch::channel(false);
        let handle = Self {
            outbound,
            closed: Arc::new(closed),
            write_timeout,
        };
        (handle, rx)
    }

    /// Receiver that resolves once the handle is closed
    pub fn closed_signal(&self) -> watch::Receiver<bool> {
        self.closed.subscribe()
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }
}

impl ConnectionHandle for WsConnection {
    async fn send(&self, text: &str) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }

        self.outbound
            .send_timeout(text.to_string(), self.write_timeout)
            .await
            .map_err(|err| match err {
                SendTimeoutError::Timeout(_) => TransportError::Timeout(self.write_timeout),
                SendTimeoutError::Closed(_) => TransportError::Closed,
            })
    }

    fn close(&self) {
        self.closed.send_replace(true);
    }
}

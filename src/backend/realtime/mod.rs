//! Real-time Update Module
//!
//! Live, per-user push over WebSockets. A single registry owns every open
//! connection; broadcasters, the expiry sweeper and the socket handler all
//! share it by `Arc` rather than through a global.
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs          - Module exports and documentation
//! ├── connection.rs   - ConnectionHandle trait and WsConnection
//! ├── registry.rs     - ConnectionRegistry (one connection per user)
//! ├── broadcast.rs    - Broadcaster fan-out with per-recipient outcomes
//! ├── sweeper.rs      - Expiry sweeper
//! ├── notify.rs       - Club member fan-out
//! ├── socket.rs       - GET /ws upgrade handler
//! └── error.rs        - TransportError and RealtimeError
//! ```
//!
//! # Wire Format
//!
//! Every pushed frame is a text frame holding an [`Envelope`]:
//!
//! ```json
//! { "event": "new_post", "payload": { "...": "..." } }
//! ```
//!
//! [`Envelope`]: crate::shared::Envelope

pub mod broadcast;
pub mod connection;
pub mod error;
pub mod notify;
pub mod registry;
pub mod socket;
pub mod sweeper;

pub use broadcast::Broadcaster;
pub use connection::{ConnectionHandle, WsConnection};
pub use error::{FailedDelivery, RealtimeError, TransportError};
pub use notify::{ClubNotifier, NotifyError};
pub use registry::{ConnectionId, ConnectionRegistry, Eviction, EvictionReason, Registered};
pub use socket::ws_upgrade;
pub use sweeper::ExpirySweeper;

/// Registry of live WebSocket connections
pub type WsRegistry = ConnectionRegistry<WsConnection>;

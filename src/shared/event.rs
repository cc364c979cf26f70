/**
 * Real-time Event Envelope
 *
 * This module defines the wire shape of every message pushed to a live
 * connection. Each message is a tagged envelope serialized as JSON text:
 *
 * ```json
 * {"event": "new_post", "payload": {"club_id": "...", "content": "..."}}
 * ```
 *
 * Clients dispatch on the `event` tag and hand `payload` to whichever
 * listener subscribed to that tag.
 */
use serde::{Deserialize, Serialize};

use crate::shared::error::SharedError;

/// Kind of real-time event
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventType {
    /// A post was created in a club the recipient belongs to
    NewPost,
    /// A metric rolled over into a new instance
    MetricRolledOver,
    /// Generic user notification
    Notification,
    /// Any other tag
    Custom(String),
}

impl EventType {
    /// Wire tag for this event type
    pub fn as_str(&self) -> &str {
        match self {
            EventType::NewPost => "new_post",
            EventType::MetricRolledOver => "metric_instance_created",
            EventType::Notification => "notification",
            EventType::Custom(name) => name.as_str(),
        }
    }

    /// Map a wire tag back to an event type
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "new_post" => EventType::NewPost,
            "metric_instance_created" => EventType::MetricRolledOver,
            "notification" => EventType::Notification,
            other => EventType::Custom(other.to_string()),
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tagged message delivered to live connections
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Envelope {
    /// Event tag (see [`EventType::as_str`])
    pub event: String,
    /// Event-specific payload
    pub payload: serde_json::Value,
}

impl Envelope {
    /// Create an envelope for the given event type
    pub fn new(event_type: EventType, payload: serde_json::Value) -> Self {
        Self {
            event: event_type.as_str().to_string(),
            payload,
        }
    }

    /// Club post notice; `post` is the created post as the API returns it
    pub fn new_post(post: serde_json::Value) -> Self {
        Self::new(EventType::NewPost, post)
    }

    /// Metric rollover notice
    pub fn metric_rolled_over(
        club_id: &str,
        metric_id: &str,
        instance_id: &str,
        due_at: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        Self::new(
            EventType::MetricRolledOver,
            serde_json::json!({
                "club_id": club_id,
                "metric_id": metric_id,
                "instance_id": instance_id,
                "due_at": due_at.to_rfc3339(),
            }),
        )
    }

    /// Create a notification event
    pub fn notification(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            EventType::Notification,
            serde_json::json!({
                "title": title.into(),
                "message": message.into(),
            }),
        )
    }

    pub fn event_type(&self) -> EventType {
        EventType::from_tag(&self.event)
    }

    /// Serialize to the text frame sent over the wire
    pub fn to_text(&self) -> Result<String, SharedError> {
        Ok(serde_json::to_string(self)?)
    }
}

use eventsub_events::Event;
use serde::{Deserialize, Serialize};

/// Frame-level metadata common to every EventSub message.
///
/// `message_id` is the deduplication key; `message_type` selects the frame
/// handler. The subscription fields are only present on notification and
/// revocation frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub message_id: String,
    pub message_type: String,
    pub message_timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_version: Option<String>,
}

/// Server-assigned identity and timing parameters for one logical
/// connection instance. Carried by welcome and reconnect frames.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub reconnect_url: Option<String>,
    #[serde(default)]
    pub connected_at: String,
    /// Absent on reconnect sessions; the new socket's welcome carries the
    /// authoritative value.
    #[serde(default)]
    pub keepalive_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub status: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub version: String,
    #[serde(default)]
    pub condition: Condition,
    pub transport: Transport,
    pub created_at: String,
    #[serde(default)]
    pub cost: i64,
}

/// Subscription condition; which fields are set depends on the event type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broadcaster_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_broadcaster_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_broadcaster_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moderator_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension_client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Transport {
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// The decoded business payload of a notification or revocation frame.
///
/// Revocation frames omit the event body on the wire, so `event` is `None`
/// there; notification frames always carry one.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub subscription: Subscription,
    pub event: Option<Event>,
}

/// What a frame handler resolved from a frame, handed to the matching
/// user callback.
#[derive(Debug, Clone)]
pub enum Payload {
    Session(Session),
    Notification(Notification),
    Keepalive,
}

impl Payload {
    pub fn as_session(&self) -> Option<&Session> {
        match self {
            Payload::Session(session) => Some(session),
            _ => None,
        }
    }

    pub fn as_notification(&self) -> Option<&Notification> {
        match self {
            Payload::Notification(notification) => Some(notification),
            _ => None,
        }
    }
}

//! Wire codec for EventSub frames.
//!
//! Every frame is a JSON envelope `{"metadata": {...}, "payload": {...}}`.
//! The functions here are pure: text in, decoded value or [`CodecError`]
//! out. Notification decoding is two-phase — the envelope is parsed once to
//! recover the `(type, version)` discriminator, then the registry's
//! per-variant decoder re-reads the raw event body into its concrete shape.

mod wire;

pub use wire::{Condition, Metadata, Notification, Payload, Session, Subscription, Transport};

use chrono::{DateTime, FixedOffset};
use eventsub_events::registry::{self, DecodeEventFn};
use serde::Deserialize;
use serde_json::value::RawValue;
use thiserror::Error;

/// Decode failures for a single frame.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("malformed frame: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid message timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),

    /// The `(type, version)` pair has no usable registry entry.
    #[error("unsupported event: {kind} (version {version})")]
    UnsupportedEvent { kind: String, version: String },
}

#[derive(Deserialize)]
struct MetadataEnvelope {
    metadata: Metadata,
}

#[derive(Deserialize)]
struct SessionEnvelope {
    payload: SessionPayload,
}

#[derive(Deserialize)]
struct SessionPayload {
    session: Session,
}

#[derive(Deserialize)]
struct NotificationEnvelope<'a> {
    #[serde(borrow)]
    payload: NotificationPayload<'a>,
}

#[derive(Deserialize)]
struct NotificationPayload<'a> {
    subscription: Subscription,
    #[serde(borrow, default)]
    event: Option<&'a RawValue>,
}

/// Extracts the `metadata` object of a frame.
pub fn decode_metadata(frame: &str) -> Result<Metadata, CodecError> {
    let envelope: MetadataEnvelope = serde_json::from_str(frame)?;
    Ok(envelope.metadata)
}

/// Extracts the `payload.session` object of a welcome or reconnect frame.
pub fn decode_session(frame: &str) -> Result<Session, CodecError> {
    let envelope: SessionEnvelope = serde_json::from_str(frame)?;
    Ok(envelope.payload.session)
}

/// Decodes a notification or revocation frame into its subscription and
/// typed event.
///
/// The registry is consulted even when the event body is absent (as on
/// revocations), so an unsupported `(type, version)` pair is always
/// reported.
pub fn decode_notification(frame: &str) -> Result<Notification, CodecError> {
    let envelope: NotificationEnvelope = serde_json::from_str(frame)?;
    let subscription = envelope.payload.subscription;

    let decode = resolve_decoder(&subscription.kind, &subscription.version)?;
    let event = match envelope.payload.event {
        Some(raw) => Some(decode(raw)?),
        None => None,
    };

    Ok(Notification { subscription, event })
}

/// Validates an RFC3339 message timestamp.
pub fn parse_timestamp(value: &str) -> Result<DateTime<FixedOffset>, CodecError> {
    Ok(DateTime::parse_from_rfc3339(value)?)
}

fn resolve_decoder(kind: &str, version: &str) -> Result<DecodeEventFn, CodecError> {
    let unsupported = || CodecError::UnsupportedEvent {
        kind: kind.to_string(),
        version: version.to_string(),
    };

    let scopes = registry::scopes(kind).ok_or_else(unsupported)?;
    let scope = scopes
        .iter()
        .find(|scope| scope.version == version)
        .ok_or_else(unsupported)?;
    scope.decode.ok_or_else(unsupported)
}

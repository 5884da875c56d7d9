//! Payload schemas for Twitch EventSub notifications.
//!
//! Every struct here is pure data: the shape of one `event` object as it
//! appears inside a `notification` frame. The [`registry`] module maps a
//! wire-level `(subscription type, version)` pair to the decoder that
//! produces the matching [`Event`] variant.

pub mod events;
pub mod registry;

pub use events::*;
pub use registry::{scopes, DecodeEventFn, Event, EventScope};

//! Twitch EventSub WebSocket client - Main Library
//!
//! This crate re-exports the workspace libraries that make up the
//! EventSub WebSocket client:
//!
//! - **eventsub_ws**: connection lifecycle, frame dispatch and the
//!   reconnect handoff machinery (re-exported from workspace)
//! - **eventsub_events**: event payload schemas and the
//!   `(type, version)` decoder registry (re-exported from workspace)

// Re-export workspace libraries for convenience
pub use eventsub_events;
pub use eventsub_ws;

pub use eventsub_ws::{Client, ClientBuilder, ClientError};

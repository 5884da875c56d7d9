//! # eventsub-ws
//!
//! A client for Twitch's EventSub WebSocket transport.
//!
//! ## Features
//!
//! - **Session handshake**: waits for `session_welcome` and arms the
//!   keepalive contract the server negotiates
//! - **Typed dispatch**: decodes notification frames through the
//!   `eventsub-events` registry and hands them to per-frame callbacks
//! - **Staleness detection**: an atomically shared liveness tracker with a
//!   20% safety margin over the server-declared keepalive window
//! - **Transparent reconnect**: `session_reconnect` frames migrate the
//!   session to a new socket without dropping or duplicating notifications
//!
//! ## Example
//!
//! ```rust,ignore
//! use eventsub_ws::Client;
//!
//! #[tokio::main]
//! async fn main() -> eventsub_ws::Result<()> {
//!     let client = Client::builder("wss://eventsub.wss.twitch.tv/ws")
//!         .on_welcome(|metadata, payload| {
//!             println!("welcome: {metadata:?} {payload:?}");
//!         })
//!         .on_notification(|_, payload| {
//!             println!("notification: {payload:?}");
//!         })
//!         .build();
//!
//!     client.connect()?;
//!     client.wait().await?;
//!     client.close().await
//! }
//! ```

pub mod codec;
pub mod core;
pub mod error;

pub use codec::{
    CodecError, Condition, Metadata, Notification, Payload, Session, Subscription, Transport,
};
pub use self::core::{
    builder::ClientBuilder,
    client::{Client, TWITCH_EVENTSUB_URL},
    config::{Callbacks, ClientConfig, OnLifecycleFn, OnMessageFn},
    connection_state::ClientState,
    dedup::MessageCache,
    liveness::LivenessTracker,
};
pub use error::ClientError;

/// Type alias for Result with ClientError
pub type Result<T> = std::result::Result<T, error::ClientError>;

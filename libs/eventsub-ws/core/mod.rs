//! Client core: the lifecycle state machine, the frame-dispatch pipeline
//! and the supporting trackers.

pub mod builder;
pub mod client;
pub mod config;
pub mod connection_state;
pub mod dedup;
pub mod liveness;

// Re-export main types
pub use builder::ClientBuilder;
pub use client::{Client, TWITCH_EVENTSUB_URL};
pub use config::{Callbacks, ClientConfig};
pub use connection_state::ClientState;
pub use dedup::MessageCache;
pub use liveness::LivenessTracker;

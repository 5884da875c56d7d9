use std::sync::Arc;
use std::time::Duration;

use crate::codec::{Metadata, Payload};

/// Callback invoked on connection lifecycle edges (connect/disconnect).
pub type OnLifecycleFn = Arc<dyn Fn() + Send + Sync>;

/// Callback invoked with a decoded frame's metadata and resolved payload.
pub type OnMessageFn = Arc<dyn Fn(&Metadata, &Payload) + Send + Sync>;

/// The optional user callbacks, each independently settable.
///
/// A callback is only ever invoked with fully decoded data; decode
/// failures skip the callback and surface through the error channel.
#[derive(Clone, Default)]
pub struct Callbacks {
    pub(crate) on_connect: Option<OnLifecycleFn>,
    pub(crate) on_disconnect: Option<OnLifecycleFn>,
    pub(crate) on_welcome: Option<OnMessageFn>,
    pub(crate) on_keepalive: Option<OnMessageFn>,
    pub(crate) on_notification: Option<OnMessageFn>,
    pub(crate) on_revocation: Option<OnMessageFn>,
    pub(crate) on_reconnect: Option<OnMessageFn>,
}

/// Configuration handed from the builder to the client.
pub struct ClientConfig {
    pub(crate) url: String,
    pub(crate) callbacks: Callbacks,
    /// Read deadline before the first welcome negotiates the real window.
    pub(crate) default_keepalive_timeout: Duration,
    /// Retention of seen message ids in the dedup cache.
    pub(crate) message_ttl: Duration,
    /// Overall bound on waiting for a welcome during reconnect handoff.
    pub(crate) reconnect_wait_ceiling: Duration,
}

impl ClientConfig {
    pub fn url(&self) -> &str {
        &self.url
    }
}

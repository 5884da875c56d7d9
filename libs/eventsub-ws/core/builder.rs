use std::sync::Arc;
use std::time::Duration;

use crate::codec::{Metadata, Payload};
use crate::core::client::{Client, TWITCH_EVENTSUB_URL};
use crate::core::config::{Callbacks, ClientConfig};
use crate::core::dedup::DEFAULT_MESSAGE_TTL;

/// Pre-handshake read deadline; the first welcome replaces it.
const DEFAULT_KEEPALIVE_TIMEOUT: Duration = Duration::from_secs(60);

/// Overall bound on the reconnect welcome handshake.
const DEFAULT_RECONNECT_WAIT_CEILING: Duration = Duration::from_secs(60);

/// Builder for [`Client`].
///
/// Only the endpoint URL is required; every callback is optional and
/// independently settable.
///
/// # Example
/// ```ignore
/// let client = Client::builder("ws://127.0.0.1:8080/ws")
///     .on_connect(|| println!("connected"))
///     .on_notification(|metadata, payload| {
///         println!("{}: {payload:?}", metadata.message_id);
///     })
///     .build();
/// ```
pub struct ClientBuilder {
    url: String,
    callbacks: Callbacks,
    default_keepalive_timeout: Duration,
    message_ttl: Duration,
    reconnect_wait_ceiling: Duration,
}

impl ClientBuilder {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            callbacks: Callbacks::default(),
            default_keepalive_timeout: DEFAULT_KEEPALIVE_TIMEOUT,
            message_ttl: DEFAULT_MESSAGE_TTL,
            reconnect_wait_ceiling: DEFAULT_RECONNECT_WAIT_CEILING,
        }
    }

    /// Builder targeting the production Twitch EventSub endpoint.
    pub fn twitch() -> Self {
        Self::new(TWITCH_EVENTSUB_URL)
    }

    pub fn on_connect(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.callbacks.on_connect = Some(Arc::new(callback));
        self
    }

    pub fn on_disconnect(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.callbacks.on_disconnect = Some(Arc::new(callback));
        self
    }

    pub fn on_welcome(
        mut self,
        callback: impl Fn(&Metadata, &Payload) + Send + Sync + 'static,
    ) -> Self {
        self.callbacks.on_welcome = Some(Arc::new(callback));
        self
    }

    pub fn on_keepalive(
        mut self,
        callback: impl Fn(&Metadata, &Payload) + Send + Sync + 'static,
    ) -> Self {
        self.callbacks.on_keepalive = Some(Arc::new(callback));
        self
    }

    pub fn on_notification(
        mut self,
        callback: impl Fn(&Metadata, &Payload) + Send + Sync + 'static,
    ) -> Self {
        self.callbacks.on_notification = Some(Arc::new(callback));
        self
    }

    pub fn on_revocation(
        mut self,
        callback: impl Fn(&Metadata, &Payload) + Send + Sync + 'static,
    ) -> Self {
        self.callbacks.on_revocation = Some(Arc::new(callback));
        self
    }

    pub fn on_reconnect(
        mut self,
        callback: impl Fn(&Metadata, &Payload) + Send + Sync + 'static,
    ) -> Self {
        self.callbacks.on_reconnect = Some(Arc::new(callback));
        self
    }

    /// Overrides the read deadline used before the first welcome.
    pub fn keepalive_timeout(mut self, timeout: Duration) -> Self {
        self.default_keepalive_timeout = timeout;
        self
    }

    /// Overrides the dedup cache retention.
    pub fn message_ttl(mut self, ttl: Duration) -> Self {
        self.message_ttl = ttl;
        self
    }

    /// Overrides the overall bound on the reconnect welcome handshake.
    pub fn reconnect_wait_ceiling(mut self, ceiling: Duration) -> Self {
        self.reconnect_wait_ceiling = ceiling;
        self
    }

    pub fn build(self) -> Client {
        Client::new(ClientConfig {
            url: self.url,
            callbacks: self.callbacks,
            default_keepalive_timeout: self.default_keepalive_timeout,
            message_ttl: self.message_ttl,
            reconnect_wait_ceiling: self.reconnect_wait_ceiling,
        })
    }
}

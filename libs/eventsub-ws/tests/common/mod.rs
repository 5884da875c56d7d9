//! Common test utilities for eventsub-ws integration tests.
//!
//! Provides a scripted mock EventSub server: each accepted connection
//! plays one script of frames, then keeps reading so the close frame the
//! client sends can be captured and asserted on.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

#[allow(dead_code)]
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

/// One step of a per-connection server script.
#[derive(Debug, Clone)]
pub enum Action {
    /// Send one frame to the client.
    Send(Value),
    /// Pause before the next step.
    Wait(Duration),
    /// Close the connection from the server side.
    #[allow(dead_code)]
    Close,
}

/// A mock EventSub server.
///
/// Connection `n` plays `scripts[n]`; extra connections get an empty
/// script (accept, then just read). Close frames received from the client
/// are recorded per connection order of arrival.
pub struct MockEventSubServer {
    pub addr: SocketAddr,
    scripts: Arc<Mutex<Vec<Vec<Action>>>>,
    shutdown: Arc<Notify>,
    close_codes: Arc<Mutex<Vec<Option<u16>>>>,
    connections: Arc<AtomicUsize>,
}

impl MockEventSubServer {
    /// Binds with no scripts, so scripts that need the server's own
    /// address (e.g. as a reconnect URL) can be installed with
    /// [`MockEventSubServer::play`] before the client connects.
    pub async fn bind() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let scripts: Arc<Mutex<Vec<Vec<Action>>>> = Arc::new(Mutex::new(Vec::new()));
        let shutdown = Arc::new(Notify::new());
        let close_codes = Arc::new(Mutex::new(Vec::new()));
        let connections = Arc::new(AtomicUsize::new(0));

        let scripts_accept = Arc::clone(&scripts);
        let shutdown_accept = Arc::clone(&shutdown);
        let close_codes_accept = Arc::clone(&close_codes);
        let connections_accept = Arc::clone(&connections);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        match result {
                            Ok((stream, _)) => {
                                let index = connections_accept.fetch_add(1, Ordering::SeqCst);
                                let script = scripts_accept
                                    .lock()
                                    .get(index)
                                    .cloned()
                                    .unwrap_or_default();
                                let shutdown = Arc::clone(&shutdown_accept);
                                let close_codes = Arc::clone(&close_codes_accept);
                                tokio::spawn(async move {
                                    handle_connection(stream, script, close_codes, shutdown).await;
                                });
                            }
                            Err(e) => {
                                eprintln!("Accept error: {}", e);
                                break;
                            }
                        }
                    }
                    _ = shutdown_accept.notified() => {
                        break;
                    }
                }
            }
        });

        Self {
            addr,
            scripts,
            shutdown,
            close_codes,
            connections,
        }
    }

    /// Installs the per-connection scripts.
    pub fn play(&self, scripts: Vec<Vec<Action>>) {
        *self.scripts.lock() = scripts;
    }

    pub async fn start(scripts: Vec<Vec<Action>>) -> Self {
        let server = Self::bind().await;
        server.play(scripts);
        server
    }

    /// Get the WebSocket URL for this server
    pub fn ws_url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// How many connections have been accepted so far.
    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// Close codes received from the client, in order of arrival.
    pub fn close_codes(&self) -> Vec<Option<u16>> {
        self.close_codes.lock().clone()
    }

    /// Shutdown the server
    pub fn shutdown(&self) {
        self.shutdown.notify_waiters();
    }
}

impl Drop for MockEventSubServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn handle_connection(
    stream: TcpStream,
    script: Vec<Action>,
    close_codes: Arc<Mutex<Vec<Option<u16>>>>,
    shutdown: Arc<Notify>,
) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            eprintln!("WebSocket handshake failed: {}", e);
            return;
        }
    };

    let (mut write, mut read) = ws_stream.split();

    for action in script {
        match action {
            Action::Send(frame) => {
                if write.send(Message::Text(frame.to_string())).await.is_err() {
                    return;
                }
            }
            Action::Wait(duration) => tokio::time::sleep(duration).await,
            Action::Close => {
                let _ = write.close().await;
                break;
            }
        }
    }

    // Keep reading so the client's close frame is captured.
    loop {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Close(frame))) => {
                        close_codes.lock().push(frame.map(|f| u16::from(f.code)));
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(_)) | None => break,
                }
            }
            _ = shutdown.notified() => {
                break;
            }
        }
    }
}

/// Polls `predicate` until it holds or `timeout` elapses.
#[allow(dead_code)]
pub async fn wait_until(predicate: impl Fn() -> bool, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if predicate() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    predicate()
}

static MESSAGE_SEQ: AtomicUsize = AtomicUsize::new(0);

fn next_message_id() -> String {
    format!("mock-{}", MESSAGE_SEQ.fetch_add(1, Ordering::SeqCst))
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

pub fn welcome_frame(session_id: &str, keepalive_secs: u64) -> Value {
    json!({
        "metadata": {
            "message_id": next_message_id(),
            "message_type": "session_welcome",
            "message_timestamp": now_rfc3339(),
        },
        "payload": {
            "session": {
                "id": session_id,
                "status": "connected",
                "connected_at": now_rfc3339(),
                "keepalive_timeout_seconds": keepalive_secs,
                "reconnect_url": null,
            }
        }
    })
}

#[allow(dead_code)]
pub fn keepalive_frame() -> Value {
    json!({
        "metadata": {
            "message_id": next_message_id(),
            "message_type": "session_keepalive",
            "message_timestamp": now_rfc3339(),
        },
        "payload": {}
    })
}

#[allow(dead_code)]
pub fn reconnect_frame(session_id: &str, reconnect_url: &str) -> Value {
    json!({
        "metadata": {
            "message_id": next_message_id(),
            "message_type": "session_reconnect",
            "message_timestamp": now_rfc3339(),
        },
        "payload": {
            "session": {
                "id": session_id,
                "status": "reconnecting",
                "connected_at": now_rfc3339(),
                "keepalive_timeout_seconds": null,
                "reconnect_url": reconnect_url,
            }
        }
    })
}

fn subscription_json(kind: &str, version: &str) -> Value {
    json!({
        "id": "f1c2a387-161a-49f9-a165-0f21d7a4e1c4",
        "status": "enabled",
        "type": kind,
        "version": version,
        "condition": { "broadcaster_user_id": "12826" },
        "transport": {
            "method": "websocket",
            "session_id": "AQoQILE98gtqShGmLD7AM6yJThAB",
        },
        "created_at": now_rfc3339(),
        "cost": 1,
    })
}

#[allow(dead_code)]
pub fn notification_frame(message_id: &str, kind: &str, version: &str, event: Value) -> Value {
    json!({
        "metadata": {
            "message_id": message_id,
            "message_type": "notification",
            "message_timestamp": now_rfc3339(),
            "subscription_type": kind,
            "subscription_version": version,
        },
        "payload": {
            "subscription": subscription_json(kind, version),
            "event": event,
        }
    })
}

#[allow(dead_code)]
pub fn revocation_frame(kind: &str, version: &str) -> Value {
    json!({
        "metadata": {
            "message_id": next_message_id(),
            "message_type": "revocation",
            "message_timestamp": now_rfc3339(),
            "subscription_type": kind,
            "subscription_version": version,
        },
        "payload": {
            "subscription": subscription_json(kind, version),
        }
    })
}

/// A frame whose `message_type` the dispatcher does not recognize.
#[allow(dead_code)]
pub fn unknown_frame() -> Value {
    json!({
        "metadata": {
            "message_id": next_message_id(),
            "message_type": "session_party",
            "message_timestamp": now_rfc3339(),
        },
        "payload": {}
    })
}

#[allow(dead_code)]
pub fn ban_event_json() -> Value {
    json!({
        "user_id": "1234",
        "user_login": "viewer",
        "user_name": "Viewer",
        "broadcaster_user_id": "12826",
        "broadcaster_user_login": "streamer",
        "broadcaster_user_name": "Streamer",
        "moderator_user_id": "9001",
        "moderator_user_login": "mod",
        "moderator_user_name": "Mod",
        "reason": "spam",
        "banned_at": now_rfc3339(),
        "ends_at": null,
        "is_permanent": true,
    })
}

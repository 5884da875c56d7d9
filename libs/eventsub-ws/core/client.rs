use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use parking_lot::{Mutex, RwLock};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio::time::{timeout, timeout_at, Instant};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::codec::{self, Metadata, Payload, Session};
use crate::core::builder::ClientBuilder;
use crate::core::config::{Callbacks, ClientConfig, OnMessageFn};
use crate::core::connection_state::{ClientFlags, ClientState};
use crate::core::dedup::MessageCache;
use crate::core::liveness::LivenessTracker;
use crate::error::ClientError;

/// Production EventSub WebSocket endpoint.
pub const TWITCH_EVENTSUB_URL: &str = "wss://eventsub.wss.twitch.tv/ws";

const SESSION_WELCOME: &str = "session_welcome";

pub(crate) type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

type FrameHandlerFn =
    fn(&mut Worker, &Metadata, &str) -> Result<(Payload, Option<OnMessageFn>), ClientError>;

/// Static dispatch table from `metadata.message_type` to frame handler.
static FRAME_HANDLERS: [(&str, FrameHandlerFn); 5] = [
    (SESSION_WELCOME, welcome_frame_handler),
    ("session_keepalive", keepalive_frame_handler),
    ("notification", notification_frame_handler),
    ("revocation", revocation_frame_handler),
    ("session_reconnect", reconnect_frame_handler),
];

fn frame_handler(message_type: &str) -> Option<FrameHandlerFn> {
    FRAME_HANDLERS
        .iter()
        .find(|(tag, _)| *tag == message_type)
        .map(|(_, handler)| *handler)
}

/// State shared between the facade, the worker task and the reconnect
/// coordinator.
///
/// The flags and the liveness tracker are atomic; the pending-socket slot
/// is a single-assignment mutex written by the coordinator and consumed at
/// the swap, ordered by the cancel-then-swap sequence.
pub(crate) struct ClientInner {
    url: RwLock<String>,
    callbacks: Callbacks,
    flags: ClientFlags,
    liveness: LivenessTracker,
    pending_conn: Mutex<Option<WsStream>>,
    /// Outer scope spanning the whole client lifetime.
    main_token: RwLock<CancellationToken>,
    /// Inner scope bounding one connection's reads; re-created on every
    /// `Connecting` entry and on the reconnect swap.
    op_token: RwLock<CancellationToken>,
    message_ttl: Duration,
    reconnect_wait_ceiling: Duration,
}

impl ClientInner {
    fn url(&self) -> String {
        self.url.read().clone()
    }

    fn main_token(&self) -> CancellationToken {
        self.main_token.read().clone()
    }

    fn op_token(&self) -> CancellationToken {
        self.op_token.read().clone()
    }

    fn reset_main_token(&self) {
        let token = CancellationToken::new();
        *self.op_token.write() = token.child_token();
        *self.main_token.write() = token;
    }

    fn reset_op_token(&self) {
        let child = self.main_token.read().child_token();
        *self.op_token.write() = child;
    }

    fn cancel_op(&self) {
        self.op_token.read().cancel();
    }
}

/// EventSub WebSocket client.
///
/// `connect` starts a single long-lived worker task that drives the
/// lifecycle state machine; `wait` blocks until it finishes; `close`
/// requests a clean stop and joins it. The client can be connected again
/// after a completed `close`.
pub struct Client {
    inner: Arc<ClientInner>,
    worker: Mutex<Option<JoinHandle<Result<(), ClientError>>>>,
}

impl Client {
    pub fn builder(url: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(url)
    }

    pub(crate) fn new(config: ClientConfig) -> Self {
        let inner = ClientInner {
            url: RwLock::new(config.url),
            callbacks: config.callbacks,
            flags: ClientFlags::default(),
            liveness: LivenessTracker::new(config.default_keepalive_timeout),
            pending_conn: Mutex::new(None),
            main_token: RwLock::new(CancellationToken::new()),
            op_token: RwLock::new(CancellationToken::new()),
            message_ttl: config.message_ttl,
            reconnect_wait_ceiling: config.reconnect_wait_ceiling,
        };

        Self {
            inner: Arc::new(inner),
            worker: Mutex::new(None),
        }
    }

    /// Starts the worker task.
    ///
    /// Fails with [`ClientError::AlreadyInUse`] if the client is already
    /// active; the running worker is unaffected in that case.
    pub fn connect(&self) -> Result<(), ClientError> {
        if !self.inner.flags.set_active() {
            return Err(ClientError::AlreadyInUse);
        }

        self.inner.flags.reset_stop();
        self.inner.reset_main_token();

        let worker = Worker::new(Arc::clone(&self.inner));
        *self.worker.lock() = Some(tokio::spawn(worker.run()));

        Ok(())
    }

    /// Blocks until the worker task (and any in-flight reconnect task it
    /// owns) has completed, returning its final error.
    pub async fn wait(&self) -> Result<(), ClientError> {
        let handle = self.worker.lock().take();

        match handle {
            Some(handle) => handle
                .await
                .unwrap_or_else(|join_error| Err(ClientError::Task(join_error.to_string()))),
            None => Ok(()),
        }
    }

    /// Signals a stop, cancels the outer scope and joins the worker.
    ///
    /// Fails with [`ClientError::NotConnected`] if the client is not
    /// active. The cancellation the stop itself produces is not reported
    /// as an error.
    pub async fn close(&self) -> Result<(), ClientError> {
        if !self.inner.flags.set_inactive() {
            return Err(ClientError::NotConnected);
        }

        self.inner.flags.request_stop();
        self.inner.main_token().cancel();

        match self.wait().await {
            Err(err) if err.is_cancelled() => Ok(()),
            result => result,
        }
    }

    /// Whether the underlying socket is currently connected.
    pub fn is_connected(&self) -> bool {
        self.inner.flags.is_connected()
    }
}

/// How one pass of the read loop ended.
enum SessionExit {
    /// Explicit stop signal; clean, no error.
    Stopped,
    /// The per-connection scope was cancelled (close mid-read, or the
    /// reconnect coordinator forcing the handoff).
    Cancelled,
    /// Read, decode, handling or liveness failure.
    Failed(ClientError),
}

/// The lifecycle state machine task. Owns the active socket, the dedup
/// cache and the in-flight reconnect task handle.
struct Worker {
    inner: Arc<ClientInner>,
    conn: Option<WsStream>,
    cache: MessageCache,
    state: ClientState,
    reconnect_task: Option<JoinHandle<Result<(), ClientError>>>,
}

impl Worker {
    fn new(inner: Arc<ClientInner>) -> Self {
        let cache = MessageCache::new(inner.message_ttl);
        Self {
            inner,
            conn: None,
            cache,
            state: ClientState::Connecting,
            reconnect_task: None,
        }
    }

    async fn run(mut self) -> Result<(), ClientError> {
        let mut last_err: Option<ClientError> = None;
        let mut should_exit = false;

        loop {
            match self.state {
                ClientState::Connecting => {
                    self.inner.reset_op_token();

                    match dial(&self.inner.op_token(), &self.inner.url()).await {
                        Ok(conn) => {
                            self.conn = Some(conn);
                            self.state = ClientState::Connected;
                        }
                        Err(err) => {
                            if !err.is_cancelled() {
                                error!(error = %err, "failed to establish eventsub connection");
                            }
                            last_err = Some(err);
                            should_exit = true;
                            self.state = ClientState::Disconnected;
                        }
                    }
                }
                ClientState::Connected => {
                    self.inner.flags.set_connected();
                    if let Some(on_connect) = &self.inner.callbacks.on_connect {
                        on_connect();
                    }

                    let exit = self.session_loop().await;

                    if self.inner.flags.take_reconnect_required() {
                        match self.join_reconnect_task().await {
                            Ok(()) => match exit {
                                SessionExit::Stopped => {
                                    // stop wins; cleanup discards any swapped-in socket
                                    last_err = None;
                                    should_exit = true;
                                    self.state = ClientState::Disconnected;
                                }
                                SessionExit::Cancelled => {
                                    debug!("reconnect handoff ready, swapping sockets");
                                    last_err = None;
                                    should_exit = false;
                                    self.state = ClientState::Reconnecting;
                                }
                                SessionExit::Failed(err) => {
                                    error!(error = %err, "session failed during reconnect handoff");
                                    last_err = Some(err);
                                    should_exit = false;
                                    self.state = ClientState::Disconnected;
                                }
                            },
                            Err(err) => {
                                // a coordinator cancelled by our own stop is a clean exit
                                if err.is_cancelled() && self.inner.flags.stop_requested() {
                                    last_err = None;
                                } else {
                                    error!(error = %err, "reconnect handoff failed");
                                    last_err = Some(err);
                                }
                                should_exit = true;
                                self.state = ClientState::Disconnected;
                            }
                        }
                    } else {
                        match exit {
                            SessionExit::Stopped => {
                                last_err = None;
                                should_exit = true;
                            }
                            SessionExit::Cancelled => {
                                last_err = Some(ClientError::Cancelled);
                                should_exit = true;
                            }
                            SessionExit::Failed(err) => {
                                error!(error = %err, "session ended");
                                last_err = Some(err);
                                should_exit = false;
                            }
                        }
                        self.state = ClientState::Disconnected;
                    }
                }
                ClientState::Reconnecting => {
                    self.inner.reset_op_token();

                    if let Some(old) = self.conn.take() {
                        close_socket(old, CloseCode::Restart, String::new()).await;
                    }

                    let pending = self.inner.pending_conn.lock().take();
                    match pending {
                        Some(conn) => {
                            self.conn = Some(conn);
                            self.state = ClientState::Connected;
                        }
                        None => {
                            error!("reconnect handoff produced no pending connection");
                            last_err = Some(ClientError::ConnectionFailed(
                                "reconnect produced no pending connection".into(),
                            ));
                            should_exit = true;
                            self.state = ClientState::Disconnected;
                        }
                    }
                }
                ClientState::Disconnected => {
                    self.clean_up(last_err.as_ref()).await;
                    self.inner.flags.set_disconnected();

                    if let Some(on_disconnect) = &self.inner.callbacks.on_disconnect {
                        on_disconnect();
                    }

                    self.state = if should_exit {
                        ClientState::Inactive
                    } else {
                        ClientState::Connecting
                    };
                }
                ClientState::Inactive => {
                    info!("eventsub worker exiting");
                    return match last_err {
                        Some(err) => Err(err),
                        None => Ok(()),
                    };
                }
            }
        }
    }

    /// The read loop: one frame per iteration until a stop, a
    /// cancellation, or a failure.
    async fn session_loop(&mut self) -> SessionExit {
        loop {
            if self.inner.flags.stop_requested() {
                return SessionExit::Stopped;
            }

            if let Err(err) = self.handle_single_message().await {
                if err.is_cancelled() {
                    if self.inner.flags.stop_requested() {
                        return SessionExit::Stopped;
                    }
                    return SessionExit::Cancelled;
                }
                return SessionExit::Failed(err);
            }

            self.cache.evict_expired();

            if self.inner.flags.welcome_received() && !self.inner.liveness.is_alive() {
                debug!("no keepalive or notification frames inside the liveness window");
                return SessionExit::Failed(ClientError::ConnectionNotAlive);
            }
        }
    }

    /// Reads, decodes and dispatches one frame.
    async fn handle_single_message(&mut self) -> Result<(), ClientError> {
        let frame = self.read_frame().await?;
        let metadata = codec::decode_metadata(&frame).map_err(ClientError::Unmarshal)?;

        if let Some(seen_at) = self.cache.timestamp(&metadata.message_id) {
            debug!(
                message_id = %metadata.message_id,
                first_seen = %seen_at,
                "message id already seen, forwarding anyway"
            );
        }
        self.cache
            .insert(metadata.message_id.clone(), metadata.message_timestamp.clone());

        match frame_handler(&metadata.message_type) {
            Some(handler) => {
                let (payload, callback) = handler(self, &metadata, &frame)?;
                if let Some(callback) = callback {
                    callback(&metadata, &payload);
                }
            }
            None => warn!(message_type = %metadata.message_type, "unknown eventsub message type"),
        }

        Ok(())
    }

    /// Reads one text frame with a deadline equal to the current
    /// keepalive window, racing the per-connection scope.
    async fn read_frame(&mut self) -> Result<String, ClientError> {
        let op_token = self.inner.op_token();
        let window = self.inner.liveness.timeout();
        let conn = self
            .conn
            .as_mut()
            .ok_or_else(|| ClientError::Read("no active connection".into()))?;

        tokio::select! {
            _ = op_token.cancelled() => Err(ClientError::Cancelled),
            read = timeout(window, next_data_frame(conn)) => match read {
                Ok(frame) => frame,
                Err(_) => Err(ClientError::Read(format!(
                    "no frame within the keepalive window ({window:?})"
                ))),
            },
        }
    }

    /// Joins the reconnect coordinator, capturing its first error.
    async fn join_reconnect_task(&mut self) -> Result<(), ClientError> {
        match self.reconnect_task.take() {
            Some(handle) => handle
                .await
                .unwrap_or_else(|join_error| Err(ClientError::Task(join_error.to_string()))),
            None => Ok(()),
        }
    }

    /// Cleanup on every `Disconnected` entry: forget liveness, clear the
    /// welcome flag and the dedup cache, drop any unconsumed pending
    /// socket, and close the active socket if one was connected.
    async fn clean_up(&mut self, err: Option<&ClientError>) {
        self.inner.liveness.reset();
        self.inner.flags.clear_welcome_received();
        self.cache.clear();
        self.inner.pending_conn.lock().take();

        if !self.inner.flags.is_connected() {
            return;
        }

        if let Some(conn) = self.conn.take() {
            let (code, reason) = match err {
                None => (CloseCode::Normal, String::new()),
                Some(err) => (CloseCode::Error, format!("error occurred: {err}")),
            };
            close_socket(conn, code, reason).await;
        }
    }
}

/// Dials `url`, racing the given cancellation scope.
async fn dial(token: &CancellationToken, url: &str) -> Result<WsStream, ClientError> {
    tokio::select! {
        _ = token.cancelled() => Err(ClientError::Cancelled),
        result = connect_async(url) => match result {
            Ok((conn, _response)) => {
                info!(%url, "eventsub connection established");
                Ok(conn)
            }
            Err(err) => Err(ClientError::ConnectionFailed(err.to_string())),
        },
    }
}

/// Pulls the next text frame, absorbing ping/pong control frames.
async fn next_data_frame(conn: &mut WsStream) -> Result<String, ClientError> {
    loop {
        match conn.next().await {
            Some(Ok(Message::Text(text))) => return Ok(text),
            Some(Ok(Message::Binary(_))) => {
                return Err(ClientError::Read("binary frames are not supported".into()))
            }
            Some(Ok(Message::Close(frame))) => {
                return Err(ClientError::Read(format!(
                    "connection closed by server: {frame:?}"
                )))
            }
            Some(Ok(_)) => continue,
            Some(Err(err)) => return Err(ClientError::Read(err.to_string())),
            None => return Err(ClientError::Read("stream ended".into())),
        }
    }
}

async fn close_socket(mut conn: WsStream, code: CloseCode, reason: String) {
    let frame = CloseFrame {
        code,
        reason: reason.into(),
    };
    if let Err(err) = conn.close(Some(frame)).await {
        debug!(error = %err, "websocket close failed");
    }
}

/// Validates the frame timestamp and records a liveness signal.
fn touch_liveness(inner: &ClientInner, metadata: &Metadata) -> Result<(), ClientError> {
    codec::parse_timestamp(&metadata.message_timestamp).map_err(ClientError::Handling)?;
    inner.liveness.record_heard();
    Ok(())
}

/// Welcome side effects, shared by the welcome frame handler and the
/// reconnect coordinator: negotiate the keepalive window, mark the
/// handshake done, record liveness.
fn apply_welcome(
    inner: &ClientInner,
    metadata: &Metadata,
    frame: &str,
) -> Result<Session, ClientError> {
    let session = codec::decode_session(frame).map_err(ClientError::Handling)?;

    if let Some(seconds) = session.keepalive_timeout_seconds {
        inner.liveness.set_timeout_from_negotiated(seconds);
    }
    inner.flags.set_welcome_received();
    touch_liveness(inner, metadata)?;

    debug!(session_id = %session.id, "session welcome applied");
    Ok(session)
}

fn welcome_frame_handler(
    worker: &mut Worker,
    metadata: &Metadata,
    frame: &str,
) -> Result<(Payload, Option<OnMessageFn>), ClientError> {
    let session = apply_welcome(&worker.inner, metadata, frame)?;
    Ok((
        Payload::Session(session),
        worker.inner.callbacks.on_welcome.clone(),
    ))
}

fn keepalive_frame_handler(
    worker: &mut Worker,
    metadata: &Metadata,
    _frame: &str,
) -> Result<(Payload, Option<OnMessageFn>), ClientError> {
    touch_liveness(&worker.inner, metadata)?;
    Ok((Payload::Keepalive, worker.inner.callbacks.on_keepalive.clone()))
}

fn notification_frame_handler(
    worker: &mut Worker,
    metadata: &Metadata,
    frame: &str,
) -> Result<(Payload, Option<OnMessageFn>), ClientError> {
    let notification = codec::decode_notification(frame).map_err(ClientError::Handling)?;
    touch_liveness(&worker.inner, metadata)?;

    debug!(subscription = %notification.subscription.kind, "notification received");
    Ok((
        Payload::Notification(notification),
        worker.inner.callbacks.on_notification.clone(),
    ))
}

fn revocation_frame_handler(
    worker: &mut Worker,
    metadata: &Metadata,
    frame: &str,
) -> Result<(Payload, Option<OnMessageFn>), ClientError> {
    let notification = codec::decode_notification(frame).map_err(ClientError::Handling)?;
    touch_liveness(&worker.inner, metadata)?;

    debug!(subscription = %notification.subscription.kind, "subscription revoked");
    Ok((
        Payload::Notification(notification),
        worker.inner.callbacks.on_revocation.clone(),
    ))
}

/// Spawns the reconnect coordinator on the client-lifetime scope so the
/// handoff survives the old socket's teardown.
fn reconnect_frame_handler(
    worker: &mut Worker,
    _metadata: &Metadata,
    frame: &str,
) -> Result<(Payload, Option<OnMessageFn>), ClientError> {
    let session = codec::decode_session(frame).map_err(ClientError::Handling)?;

    worker.inner.flags.require_reconnect();
    let inner = Arc::clone(&worker.inner);
    let url = session.reconnect_url.clone().unwrap_or_default();
    worker.reconnect_task = Some(tokio::spawn(reconnect_coordinator(inner, url)));

    Ok((
        Payload::Session(session),
        worker.inner.callbacks.on_reconnect.clone(),
    ))
}

/// Dials the reconnect URL and completes the welcome handshake on the new
/// socket while the old read loop keeps running.
async fn reconnect_coordinator(inner: Arc<ClientInner>, url: String) -> Result<(), ClientError> {
    let main_token = inner.main_token();
    let conn = dial(&main_token, &url).await?;
    *inner.url.write() = url;

    reconnect_wait_welcome(inner, main_token, conn).await
}

/// Reads frames on the new socket until its welcome arrives, bounded by
/// the reconnect wait ceiling, then publishes the socket and cancels the
/// old connection's scope.
async fn reconnect_wait_welcome(
    inner: Arc<ClientInner>,
    token: CancellationToken,
    mut conn: WsStream,
) -> Result<(), ClientError> {
    let deadline = Instant::now() + inner.reconnect_wait_ceiling;

    loop {
        if Instant::now() >= deadline {
            return Err(ClientError::ReconnectTimeout);
        }

        let frame = tokio::select! {
            _ = token.cancelled() => return Err(ClientError::Cancelled),
            read = timeout_at(deadline, next_data_frame(&mut conn)) => match read {
                Ok(frame) => frame?,
                Err(_) => return Err(ClientError::ReconnectTimeout),
            },
        };

        let metadata = codec::decode_metadata(&frame).map_err(ClientError::Unmarshal)?;
        if metadata.message_type != SESSION_WELCOME {
            debug!(
                message_type = %metadata.message_type,
                "ignoring frame while awaiting reconnect welcome"
            );
            continue;
        }

        // The welcome side effects run here; the on_welcome callback does
        // not fire for the handoff welcome.
        apply_welcome(&inner, &metadata, &frame)?;

        *inner.pending_conn.lock() = Some(conn);
        inner.cancel_op();
        return Ok(());
    }
}

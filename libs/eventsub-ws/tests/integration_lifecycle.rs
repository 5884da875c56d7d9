//! Integration tests for the connection lifecycle.
//!
//! These tests run the client against a scripted mock EventSub server and
//! verify the handshake, callback dispatch, staleness detection and the
//! terminal error paths.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use eventsub_events::Event;
use eventsub_ws::{Client, ClientError};
use parking_lot::Mutex;

use common::*;

const CLOSE_NORMAL: u16 = 1000;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn welcome_notification_and_clean_close() {
    init_tracing();
    verbose_println!("Testing welcome, dispatch and clean close...");

    let server = MockEventSubServer::start(vec![vec![
        Action::Send(welcome_frame("session-1", 10)),
        Action::Send(keepalive_frame()),
        Action::Send(notification_frame(
            "n1",
            "channel.ban",
            "1",
            ban_event_json(),
        )),
    ]])
    .await;

    let connects = Arc::new(AtomicUsize::new(0));
    let keepalives = Arc::new(AtomicUsize::new(0));
    let welcomes: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let notifications: Arc<Mutex<Vec<(String, Event)>>> = Arc::new(Mutex::new(Vec::new()));

    let client = Client::builder(server.ws_url())
        .on_connect({
            let connects = Arc::clone(&connects);
            move || {
                connects.fetch_add(1, Ordering::SeqCst);
            }
        })
        .on_welcome({
            let welcomes = Arc::clone(&welcomes);
            move |_, payload| {
                let session = payload.as_session().expect("welcome carries a session");
                welcomes.lock().push(session.id.clone());
            }
        })
        .on_keepalive({
            let keepalives = Arc::clone(&keepalives);
            move |_, _| {
                keepalives.fetch_add(1, Ordering::SeqCst);
            }
        })
        .on_notification({
            let notifications = Arc::clone(&notifications);
            move |metadata, payload| {
                let notification = payload.as_notification().expect("decoded notification");
                let event = notification.event.clone().expect("notification carries an event");
                notifications
                    .lock()
                    .push((metadata.message_id.clone(), event));
            }
        })
        .build();

    client.connect().unwrap();

    assert!(
        wait_until(
            || notifications.lock().len() == 1,
            Duration::from_secs(2)
        )
        .await,
        "notification should be dispatched"
    );

    client.close().await.unwrap();

    assert_eq!(connects.load(Ordering::SeqCst), 1);
    assert_eq!(keepalives.load(Ordering::SeqCst), 1);
    assert_eq!(welcomes.lock().as_slice(), ["session-1"]);

    let delivered = notifications.lock();
    assert_eq!(delivered[0].0, "n1");
    match &delivered[0].1 {
        Event::ChannelBan(event) => {
            assert_eq!(event.user_login, "viewer");
            assert!(event.is_permanent);
        }
        other => panic!("unexpected event variant: {other:?}"),
    }
    drop(delivered);

    assert!(
        wait_until(
            || server.close_codes() == vec![Some(CLOSE_NORMAL)],
            Duration::from_secs(2)
        )
        .await,
        "clean stop should close the socket with normal closure, got {:?}",
        server.close_codes()
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn second_connect_is_rejected() {
    init_tracing();
    verbose_println!("Testing double connect...");

    let server = MockEventSubServer::start(vec![vec![Action::Send(welcome_frame(
        "session-1",
        10,
    ))]])
    .await;

    let welcomes = Arc::new(AtomicUsize::new(0));
    let client = Client::builder(server.ws_url())
        .on_welcome({
            let welcomes = Arc::clone(&welcomes);
            move |_, _| {
                welcomes.fetch_add(1, Ordering::SeqCst);
            }
        })
        .build();

    client.connect().unwrap();
    assert!(matches!(client.connect(), Err(ClientError::AlreadyInUse)));

    // the first connection keeps working
    assert!(
        wait_until(|| welcomes.load(Ordering::SeqCst) == 1, Duration::from_secs(2)).await,
        "first connection should still complete its handshake"
    );
    assert_eq!(server.connection_count(), 1);

    client.close().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn dial_failure_is_terminal() {
    init_tracing();
    verbose_println!("Testing dial failure...");

    // nothing listens here
    let client = Client::builder("ws://127.0.0.1:9/").build();
    client.connect().unwrap();

    let err = client.wait().await.unwrap_err();
    assert!(
        matches!(err, ClientError::ConnectionFailed(_)),
        "expected connection failure, got {err:?}"
    );

    client.close().await.unwrap();
    assert!(matches!(client.close().await, Err(ClientError::NotConnected)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn client_is_reusable_after_close() {
    init_tracing();

    let server = MockEventSubServer::start(vec![
        vec![Action::Send(welcome_frame("session-1", 10))],
        vec![Action::Send(welcome_frame("session-2", 10))],
    ])
    .await;

    let welcomes: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let client = Client::builder(server.ws_url())
        .on_welcome({
            let welcomes = Arc::clone(&welcomes);
            move |_, payload| {
                welcomes
                    .lock()
                    .push(payload.as_session().unwrap().id.clone());
            }
        })
        .build();

    client.connect().unwrap();
    assert!(wait_until(|| welcomes.lock().len() == 1, Duration::from_secs(2)).await);
    client.close().await.unwrap();

    client.connect().unwrap();
    assert!(wait_until(|| welcomes.lock().len() == 2, Duration::from_secs(2)).await);
    client.close().await.unwrap();

    assert_eq!(welcomes.lock().as_slice(), ["session-1", "session-2"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn silent_server_triggers_reconnect() {
    init_tracing();
    verbose_println!("Testing read timeout and automatic redial...");

    // keepalive of 1s arms a 1s read deadline; the server then goes silent
    let server = MockEventSubServer::start(vec![
        vec![Action::Send(welcome_frame("session-1", 1))],
        vec![Action::Send(welcome_frame("session-2", 1))],
    ])
    .await;

    let connects = Arc::new(AtomicUsize::new(0));
    let disconnects = Arc::new(AtomicUsize::new(0));

    let client = Client::builder(server.ws_url())
        .on_connect({
            let connects = Arc::clone(&connects);
            move || {
                connects.fetch_add(1, Ordering::SeqCst);
            }
        })
        .on_disconnect({
            let disconnects = Arc::clone(&disconnects);
            move || {
                disconnects.fetch_add(1, Ordering::SeqCst);
            }
        })
        .build();

    client.connect().unwrap();

    assert!(
        wait_until(|| connects.load(Ordering::SeqCst) >= 2, Duration::from_secs(5)).await,
        "client should redial after the read deadline elapses"
    );
    assert!(disconnects.load(Ordering::SeqCst) >= 1);
    assert!(server.connection_count() >= 2);

    client.close().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stale_liveness_triggers_reconnect() {
    init_tracing();
    verbose_println!("Testing liveness staleness with unrecognized frames...");

    // Unrecognized frames keep the reads succeeding but never count as
    // liveness signals, so the tracker goes stale while traffic flows.
    let mut chatter = vec![Action::Send(welcome_frame("session-1", 1))];
    for _ in 0..6 {
        chatter.push(Action::Wait(Duration::from_millis(300)));
        chatter.push(Action::Send(unknown_frame()));
    }

    let server = MockEventSubServer::start(vec![
        chatter,
        vec![Action::Send(welcome_frame("session-2", 1))],
    ])
    .await;

    let connects = Arc::new(AtomicUsize::new(0));
    let client = Client::builder(server.ws_url())
        .on_connect({
            let connects = Arc::clone(&connects);
            move || {
                connects.fetch_add(1, Ordering::SeqCst);
            }
        })
        .build();

    client.connect().unwrap();

    assert!(
        wait_until(|| connects.load(Ordering::SeqCst) >= 2, Duration::from_secs(5)).await,
        "client should tear down the stale session and redial"
    );

    client.close().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unsupported_notification_skips_callback() {
    init_tracing();
    verbose_println!("Testing unsupported event classification...");

    let server = MockEventSubServer::start(vec![
        vec![
            Action::Send(welcome_frame("session-1", 10)),
            Action::Send(notification_frame(
                "n1",
                "channel.made_up",
                "1",
                serde_json::json!({}),
            )),
        ],
        vec![Action::Send(welcome_frame("session-2", 10))],
    ])
    .await;

    let connects = Arc::new(AtomicUsize::new(0));
    let notifications = Arc::new(AtomicUsize::new(0));

    let client = Client::builder(server.ws_url())
        .on_connect({
            let connects = Arc::clone(&connects);
            move || {
                connects.fetch_add(1, Ordering::SeqCst);
            }
        })
        .on_notification({
            let notifications = Arc::clone(&notifications);
            move |_, _| {
                notifications.fetch_add(1, Ordering::SeqCst);
            }
        })
        .build();

    client.connect().unwrap();

    // the handling error tears the connection down and the client redials
    assert!(
        wait_until(|| connects.load(Ordering::SeqCst) >= 2, Duration::from_secs(5)).await,
        "unsupported event should be treated as a connection error"
    );
    assert_eq!(
        notifications.load(Ordering::SeqCst),
        0,
        "callback must not fire for an undecodable notification"
    );

    client.close().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn revocation_dispatches_without_event_body() {
    init_tracing();

    let server = MockEventSubServer::start(vec![vec![
        Action::Send(welcome_frame("session-1", 10)),
        Action::Send(revocation_frame("channel.follow", "2")),
    ]])
    .await;

    let revocations: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let client = Client::builder(server.ws_url())
        .on_revocation({
            let revocations = Arc::clone(&revocations);
            move |_, payload| {
                let notification = payload.as_notification().unwrap();
                assert!(notification.event.is_none());
                revocations.lock().push(notification.subscription.kind.clone());
            }
        })
        .build();

    client.connect().unwrap();

    assert!(
        wait_until(|| revocations.lock().len() == 1, Duration::from_secs(2)).await,
        "revocation should be dispatched"
    );
    assert_eq!(revocations.lock().as_slice(), ["channel.follow"]);

    client.close().await.unwrap();
}

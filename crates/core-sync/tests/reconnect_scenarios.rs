//! Timing scenarios for the change listener, run on a paused clock.

use core_config::ListenerConfig;
use core_events::{TransportEvent, transport_channel};
use core_sync::{ChangeListener, SyncHandler};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::{Instant, sleep};

#[derive(Clone, Default)]
struct Recorder {
    calls: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn count(&self, name: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == name).count()
    }

    fn push(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

impl SyncHandler for Recorder {
    fn on_message(&mut self, message: &str) {
        self.push(format!("message:{message}"));
    }
    fn refetch_users(&mut self) {
        self.push("users");
    }
    fn refetch_boards(&mut self) {
        self.push("boards");
    }
    fn refetch_views(&mut self) {
        self.push("views");
    }
}

/// Let the listener task drain what has been sent so far.
async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn short_blip_is_invisible() {
    let (tx, rx) = transport_channel();
    let recorder = Recorder::default();
    let handle = ChangeListener::spawn(rx, recorder.clone(), &ListenerConfig::default());

    tx.send(TransportEvent::Open).await.unwrap();
    settle().await;
    tx.send(TransportEvent::Close).await.unwrap();
    sleep(Duration::from_millis(2000)).await;
    assert!(!handle.is_closed());
    tx.send(TransportEvent::Open).await.unwrap();
    settle().await;

    sleep(Duration::from_millis(10_000)).await;
    assert!(!handle.is_closed());
    assert!(recorder.calls().is_empty());
    handle.close().await;
}

#[tokio::test(start_paused = true)]
async fn long_outage_surfaces_at_grace_then_resyncs_once() {
    let (tx, rx) = transport_channel();
    let recorder = Recorder::default();
    let handle = ChangeListener::spawn(rx, recorder.clone(), &ListenerConfig::default());
    let mut closed = handle.closed();

    tx.send(TransportEvent::Open).await.unwrap();
    settle().await;
    let start = Instant::now();
    tx.send(TransportEvent::Close).await.unwrap();
    closed.changed().await.unwrap();
    assert!(*closed.borrow());
    assert_eq!(start.elapsed(), Duration::from_millis(5000));

    sleep(Duration::from_millis(1000)).await;
    assert!(handle.is_closed());
    assert!(recorder.calls().is_empty());

    tx.send(TransportEvent::Open).await.unwrap();
    settle().await;
    assert!(!handle.is_closed());
    assert_eq!(recorder.count("users"), 1);
    assert_eq!(recorder.count("boards"), 1);
    assert_eq!(recorder.count("views"), 1);

    // A further open while already open is not another resync.
    tx.send(TransportEvent::Open).await.unwrap();
    settle().await;
    assert_eq!(recorder.calls().len(), 3);
    handle.close().await;
}

#[tokio::test(start_paused = true)]
async fn repeated_closes_keep_one_timer() {
    let (tx, rx) = transport_channel();
    let recorder = Recorder::default();
    let handle = ChangeListener::spawn(rx, recorder.clone(), &ListenerConfig::default());

    tx.send(TransportEvent::Open).await.unwrap();
    settle().await;
    let start = Instant::now();
    tx.send(TransportEvent::Close).await.unwrap();
    settle().await;
    sleep(Duration::from_millis(3000)).await;
    // A second close must not restart the grace period.
    tx.send(TransportEvent::Close).await.unwrap();
    let mut closed = handle.closed();
    closed.changed().await.unwrap();
    assert_eq!(start.elapsed(), Duration::from_millis(5000));
    handle.close().await;
}

#[tokio::test(start_paused = true)]
async fn configured_grace_period_is_used() {
    let (tx, rx) = transport_channel();
    let config = ListenerConfig {
        grace_period_ms: 250,
    };
    let handle = ChangeListener::spawn(rx, Recorder::default(), &config);
    let mut closed = handle.closed();

    tx.send(TransportEvent::Open).await.unwrap();
    settle().await;
    let start = Instant::now();
    tx.send(TransportEvent::Close).await.unwrap();
    closed.changed().await.unwrap();
    assert_eq!(start.elapsed(), Duration::from_millis(250));
    handle.close().await;
}

#[tokio::test(start_paused = true)]
async fn messages_are_forwarded_in_order() {
    let (tx, rx) = transport_channel();
    let recorder = Recorder::default();
    let handle = ChangeListener::spawn(rx, recorder.clone(), &ListenerConfig::default());

    tx.send(TransportEvent::Open).await.unwrap();
    tx.send(TransportEvent::Message("a".into())).await.unwrap();
    tx.send(TransportEvent::Message("b".into())).await.unwrap();
    settle().await;
    assert_eq!(recorder.calls(), vec!["message:a", "message:b"]);
    handle.close().await;
}

#[tokio::test(start_paused = true)]
async fn nothing_fires_after_close() {
    let (tx, rx) = transport_channel();
    let recorder = Recorder::default();
    let handle = ChangeListener::spawn(rx, recorder.clone(), &ListenerConfig::default());
    let closed = handle.closed();

    tx.send(TransportEvent::Open).await.unwrap();
    settle().await;
    tx.send(TransportEvent::Close).await.unwrap();
    settle().await;
    handle.close().await;

    sleep(Duration::from_millis(10_000)).await;
    assert!(!*closed.borrow());
    assert!(tx.send(TransportEvent::Open).await.is_err());
    assert!(recorder.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn dropping_handle_cancels_armed_timer() {
    let (tx, rx) = transport_channel();
    let recorder = Recorder::default();
    let handle = ChangeListener::spawn(rx, recorder.clone(), &ListenerConfig::default());
    let closed = handle.closed();

    tx.send(TransportEvent::Open).await.unwrap();
    settle().await;
    tx.send(TransportEvent::Close).await.unwrap();
    settle().await;
    drop(handle);

    sleep(Duration::from_millis(10_000)).await;
    assert!(!*closed.borrow());
    assert!(tx.send(TransportEvent::Open).await.is_err());
    assert!(recorder.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn listener_stops_when_transport_drops() {
    let (tx, rx) = transport_channel();
    let handle = ChangeListener::spawn(rx, Recorder::default(), &ListenerConfig::default());
    let mut closed = handle.closed();
    drop(tx);
    // Sender side of the watch goes away with the task.
    assert!(closed.changed().await.is_err());
    handle.close().await;
}

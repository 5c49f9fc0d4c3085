use crate::monitor::{ConnectionMonitor, Effect};
use core_config::ListenerConfig;
use core_events::TransportEvent;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::Receiver;
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{Instrument, debug, info, trace, warn};

/// Receiver of transport payloads and resync requests.
///
/// Calls are made from the listener task and must not block; refetches are
/// fire-and-forget, so implementations spawn their own work and own their
/// own failure handling.
pub trait SyncHandler: Send + 'static {
    fn on_message(&mut self, message: &str);
    fn refetch_users(&mut self);
    fn refetch_boards(&mut self);
    fn refetch_views(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ExitReason {
    Shutdown,
    TransportEnded,
}

impl ExitReason {
    fn as_str(&self) -> &'static str {
        match self {
            ExitReason::Shutdown => "shutdown",
            ExitReason::TransportEnded => "transport_ended",
        }
    }
}

/// Owner side of a running listener.
#[derive(Debug)]
pub struct ListenerHandle {
    shutdown: Arc<Notify>,
    closed: watch::Receiver<bool>,
    task: Option<JoinHandle<()>>,
}

impl ListenerHandle {
    /// Current value of the user-visible "connection closed" flag.
    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Subscribe to changes of the closed flag.
    pub fn closed(&self) -> watch::Receiver<bool> {
        self.closed.clone()
    }

    /// Stop the listener. Cancels any pending grace timer and drops the
    /// transport receiver; once this returns no handler method runs again.
    pub async fn close(mut self) {
        self.shutdown.notify_one();
        if let Some(task) = self.task.take()
            && let Err(err) = task.await
        {
            warn!(target: "listener", ?err, "listener_task_join_failed");
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            self.shutdown.notify_one();
            task.abort();
        }
    }
}

pub struct ChangeListener<H: SyncHandler> {
    transport: Receiver<TransportEvent>,
    handler: H,
    grace_period: Duration,
    monitor: ConnectionMonitor,
    closed: watch::Sender<bool>,
    shutdown: Arc<Notify>,
    /// Deadline and generation of the live grace timer, if any.
    timer: Option<(Instant, u64)>,
}

impl<H: SyncHandler> ChangeListener<H> {
    /// Spawn the listener on the current Tokio runtime.
    pub fn spawn(
        transport: Receiver<TransportEvent>,
        handler: H,
        config: &ListenerConfig,
    ) -> ListenerHandle {
        let (closed_tx, closed_rx) = watch::channel(false);
        let shutdown = Arc::new(Notify::new());
        let listener = ChangeListener {
            transport,
            handler,
            grace_period: config.grace_period(),
            monitor: ConnectionMonitor::new(),
            closed: closed_tx,
            shutdown: shutdown.clone(),
            timer: None,
        };
        let span = tracing::debug_span!(target: "listener", "change_listener");
        let task = tokio::spawn(listener.run().instrument(span));
        ListenerHandle {
            shutdown,
            closed: closed_rx,
            task: Some(task),
        }
    }

    async fn run(mut self) {
        info!(target: "listener", grace_ms = self.grace_period.as_millis() as u64, "listener_started");

        let reason = loop {
            let deadline = self.timer.map(|(at, _)| at);
            let effects = tokio::select! {
                biased;
                _ = self.shutdown.notified() => break ExitReason::Shutdown,
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    match self.timer.take() {
                        Some((_, generation)) => self.monitor.on_grace_elapsed(generation),
                        None => Vec::new(),
                    }
                }
                event = self.transport.recv() => match event {
                    Some(TransportEvent::Open) => self.monitor.on_open(),
                    Some(TransportEvent::Close) => self.monitor.on_close(),
                    Some(TransportEvent::Message(message)) => {
                        trace!(target: "listener", bytes = message.len(), "message");
                        self.handler.on_message(&message);
                        Vec::new()
                    }
                    None => break ExitReason::TransportEnded,
                },
            };
            self.apply(effects);
        };

        let teardown = self.monitor.on_teardown();
        self.apply(teardown);
        self.transport.close();
        info!(target: "listener", reason = reason.as_str(), "listener_stopped");
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ArmGraceTimer { generation } => {
                    self.timer = Some((Instant::now() + self.grace_period, generation));
                }
                Effect::CancelGraceTimer => {
                    if self.timer.take().is_some() {
                        debug!(target: "listener", "grace_timer_cancelled");
                    }
                }
                Effect::Resync => {
                    info!(target: "listener", "resync");
                    self.handler.refetch_users();
                    self.handler.refetch_boards();
                    self.handler.refetch_views();
                }
                Effect::Closed(closed) => {
                    self.closed.send_replace(closed);
                }
            }
        }
    }
}

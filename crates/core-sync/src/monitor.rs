use tracing::{debug, info, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Open,
    Closed,
    /// Disconnect observed, grace timer running.
    PendingClose,
}

/// Side effects requested by a transition. The driver applies them in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Start (or restart) the single grace timer, tagged with `generation`.
    ArmGraceTimer { generation: u64 },
    CancelGraceTimer,
    /// Refetch users, boards and views.
    Resync,
    /// New value of the user-visible "connection closed" flag.
    Closed(bool),
}

#[derive(Debug, Clone)]
pub struct ConnectionMonitor {
    state: ConnectionState,
    generation: u64,
    error_shown: bool,
}

impl Default for ConnectionMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionMonitor {
    /// Starts `Closed` without a visible error: nothing has connected yet.
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Closed,
            generation: 0,
            error_shown: false,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Whether the connection-error state is currently surfaced.
    pub fn is_closed(&self) -> bool {
        self.error_shown
    }

    /// Generation of the most recently armed timer.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn on_open(&mut self) -> Vec<Effect> {
        let from = self.state;
        self.state = ConnectionState::Open;
        match from {
            ConnectionState::Open => Vec::new(),
            ConnectionState::PendingClose => {
                self.generation += 1;
                debug!(target: "listener", "reconnected_within_grace");
                vec![Effect::CancelGraceTimer]
            }
            ConnectionState::Closed if self.error_shown => {
                self.error_shown = false;
                info!(target: "listener", "reconnected_after_outage");
                vec![Effect::Closed(false), Effect::Resync]
            }
            ConnectionState::Closed => {
                debug!(target: "listener", "connected");
                Vec::new()
            }
        }
    }

    /// Transport errors are routed here too.
    pub fn on_close(&mut self) -> Vec<Effect> {
        match self.state {
            ConnectionState::Closed | ConnectionState::PendingClose => {
                trace!(target: "listener", state = ?self.state, "close_ignored");
                Vec::new()
            }
            ConnectionState::Open => {
                self.state = ConnectionState::PendingClose;
                self.generation += 1;
                debug!(target: "listener", generation = self.generation, "grace_timer_armed");
                vec![Effect::ArmGraceTimer {
                    generation: self.generation,
                }]
            }
        }
    }

    /// Grace timer tagged `generation` fired. Stale firings are ignored.
    pub fn on_grace_elapsed(&mut self, generation: u64) -> Vec<Effect> {
        if self.state != ConnectionState::PendingClose || generation != self.generation {
            trace!(target: "listener", generation, current = self.generation, "stale_grace_timer");
            return Vec::new();
        }
        self.state = ConnectionState::Closed;
        self.error_shown = true;
        info!(target: "listener", "connection_closed");
        vec![Effect::Closed(true)]
    }

    /// Listener teardown: invalidate any running timer.
    pub fn on_teardown(&mut self) -> Vec<Effect> {
        if self.state == ConnectionState::PendingClose {
            self.generation += 1;
            self.state = ConnectionState::Closed;
            return vec![Effect::CancelGraceTimer];
        }
        Vec::new()
    }
}

//! Reconnecting change listener.
//!
//! Wraps a push-update transport so that short disconnects never reach the
//! user. A disconnect starts a grace timer; reconnecting before it fires is
//! silent. Only when the timer fires is the connection reported closed, and
//! the reconnect after such a surfaced outage triggers a full resync of
//! users, boards and views.
//!
//! [`ConnectionMonitor`] holds the transition rules and performs no I/O;
//! [`ChangeListener`] drives it from a Tokio task.

mod listener;
mod monitor;

pub use listener::{ChangeListener, ListenerHandle, SyncHandler};
pub use monitor::{ConnectionMonitor, ConnectionState, Effect};

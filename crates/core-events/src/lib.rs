//! Core event types and channel helpers.
//!
//! Document edits arrive as [`EditEvent`]s and are applied one at a time by
//! the editor state. Connection events from the push-update transport arrive
//! as [`TransportEvent`]s on a bounded channel drained by the change listener.

use core_model::{BlockKey, BlockType, Selection};
use tokio::sync::mpsc::{self, Receiver, Sender};

/// Bounded capacity of the transport channel. A full channel applies
/// backpressure to the adapter instead of dropping events.
pub const EVENT_CHANNEL_CAP: usize = 8192;

/// Document change requests. Offsets are char indices within the block.
#[derive(Debug, Clone, PartialEq)]
pub enum EditEvent {
    /// Initial load / import of a whole document.
    Load { text: String },
    InsertText {
        block: BlockKey,
        offset: usize,
        text: String,
    },
    /// Delete the half-open char range `[start, end)`.
    DeleteText {
        block: BlockKey,
        start: usize,
        end: usize,
    },
    /// Enter key.
    SplitBlock { block: BlockKey, offset: usize },
    /// Shift+Enter: line break inside the block.
    SoftBreak { block: BlockKey, offset: usize },
    /// Backspace at the start of `block`.
    MergeBlock { block: BlockKey },
    Paste {
        block: BlockKey,
        offset: usize,
        text: String,
    },
    Replace { text: String },
    SetBlockType {
        block: BlockKey,
        block_type: BlockType,
    },
    SetSelection(Selection),
}

impl EditEvent {
    /// Stable short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            EditEvent::Load { .. } => "load",
            EditEvent::InsertText { .. } => "insert_text",
            EditEvent::DeleteText { .. } => "delete_text",
            EditEvent::SplitBlock { .. } => "split_block",
            EditEvent::SoftBreak { .. } => "soft_break",
            EditEvent::MergeBlock { .. } => "merge_block",
            EditEvent::Paste { .. } => "paste",
            EditEvent::Replace { .. } => "replace",
            EditEvent::SetBlockType { .. } => "set_block_type",
            EditEvent::SetSelection(_) => "set_selection",
        }
    }
}

/// Callbacks of the push-update transport, reified as values. Transport
/// errors are reported as `Close` by the adapter; the listener does not
/// distinguish them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Open,
    Close,
    Message(String),
}

/// Bounded channel a transport adapter feeds and the change listener drains.
pub fn transport_channel() -> (Sender<TransportEvent>, Receiver<TransportEvent>) {
    mpsc::channel(EVENT_CHANNEL_CAP)
}

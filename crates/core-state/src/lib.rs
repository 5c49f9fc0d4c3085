//! Editor state: the live document, the style maintenance engine, and dirty
//! block tracking for the render layer.
//!
//! Every edit flows through [`EditorState::dispatch`]:
//! 1. the edit is applied to the document (recording its change kind),
//! 2. one maintenance pass runs over the scope that change kind implies,
//! 3. edited, retyped and restyled blocks are marked dirty.
//!
//! The engine performs no I/O and never suspends, so a dispatch completes
//! synchronously on the event loop; its cost is bounded by the rescanned
//! scope, not the document size, except for bulk loads and pastes.

pub mod dirty;
pub mod engine;
mod error;

pub use dirty::DirtyBlocks;
pub use engine::{Maintenance, Scope, StyleMaintenanceEngine};
pub use error::StyleError;

use core_events::EditEvent;
use core_model::{ChangeKind, Document, ModelError};
use tracing::{debug, trace};

#[derive(Debug)]
pub struct EditorState {
    document: Document,
    engine: StyleMaintenanceEngine,
    dirty: DirtyBlocks,
    passes: u64,
}

impl EditorState {
    /// Empty document; call `dispatch(EditEvent::Load { .. })` to populate.
    pub fn new(engine: StyleMaintenanceEngine) -> Self {
        let mut state = Self {
            document: Document::default(),
            engine,
            dirty: DirtyBlocks::new(),
            passes: 0,
        };
        state.run_pass();
        state
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn engine(&self) -> &StyleMaintenanceEngine {
        &self.engine
    }

    /// Number of non-skipped maintenance passes run so far.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Consume dirty keys for the renderer (document order).
    pub fn take_dirty(&mut self) -> Vec<core_model::BlockKey> {
        self.dirty.take(&self.document)
    }

    pub fn dirty(&self) -> &DirtyBlocks {
        &self.dirty
    }

    /// Apply one edit and run the maintenance pass it calls for.
    pub fn dispatch(&mut self, event: EditEvent) -> Result<(), ModelError> {
        trace!(target: "state", event = event.name(), "dispatch");
        let doc = &mut self.document;
        match event {
            EditEvent::Load { text } => {
                *doc = Document::from_text(&text);
            }
            EditEvent::InsertText {
                block,
                offset,
                text,
            } => doc.insert_text(block, offset, &text)?,
            EditEvent::DeleteText { block, start, end } => doc.delete_text(block, start, end)?,
            EditEvent::SplitBlock { block, offset } => {
                doc.split_block(block, offset)?;
            }
            EditEvent::SoftBreak { block, offset } => doc.insert_soft_break(block, offset)?,
            EditEvent::MergeBlock { block } => {
                doc.merge_with_previous(block)?;
            }
            EditEvent::Paste {
                block,
                offset,
                text,
            } => doc.insert_fragment(block, offset, &text)?,
            EditEvent::Replace { text } => doc.replace(&text),
            EditEvent::SetBlockType { block, block_type } => {
                doc.set_block_type(block, block_type)?;
            }
            EditEvent::SetSelection(selection) => {
                // Selection moves are not document changes; no pass.
                return doc.set_selection(selection);
            }
        }
        self.mark_edited();
        self.run_pass();
        Ok(())
    }

    /// Dirty marks implied by the edit itself, before styling.
    fn mark_edited(&mut self) {
        match self.document.last_change() {
            Some(ChangeKind::InsertText { block })
            | Some(ChangeKind::DeleteText { block })
            | Some(ChangeKind::ChangeBlockType { block }) => self.dirty.mark(block),
            Some(ChangeKind::SplitBlock { .. })
            | Some(ChangeKind::MergeBlock { .. })
            | Some(ChangeKind::InsertFragment)
            | Some(ChangeKind::Replace)
            | None => self.dirty.mark_structure(),
            Some(ChangeKind::ChangeInlineStyle) => {}
        }
    }

    fn run_pass(&mut self) {
        let outcome = self.engine.maintain(&self.document);
        if !outcome.is_skipped() {
            self.passes += 1;
        }
        self.dirty.mark_all(outcome.retyped.iter().copied());
        self.dirty.mark_all(outcome.restyled.iter().copied());
        debug!(
            target: "state",
            skipped = outcome.is_skipped(),
            restyled = outcome.restyled.len(),
            retyped = outcome.retyped.len(),
            "pass_applied"
        );
        self.document = outcome.document;
    }
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(StyleMaintenanceEngine::default())
    }
}

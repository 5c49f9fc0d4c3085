//! Dirty block tracking for the render layer.
//!
//! Records block keys whose text, type or annotations changed since the
//! renderer last looked. Kept separate from the maintenance result so several
//! passes can accumulate before one repaint.
//!
//! Design constraints:
//! * Duplicate marks are deduped lazily when `take` is called.
//! * Structural edits (paste, replace, merge) mark the whole document; the
//!   renderer must then re-list blocks rather than patch individual ones.
//! * Not thread-safe (mutably borrowed in the single-threaded event loop).
//!
//! Invariants:
//! * `take` returns keys in document order, unique, restricted to blocks that
//!   still exist.
//! * After `take`, internal storage is cleared (one-shot consumption).

use core_model::{BlockKey, Document};

#[derive(Debug, Default)]
pub struct DirtyBlocks {
    keys: Vec<BlockKey>,
    full: bool,
}

impl DirtyBlocks {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self {
            keys: Vec::new(),
            full: false,
        }
    }

    /// Mark a single block as dirty.
    pub fn mark(&mut self, key: BlockKey) {
        self.keys.push(key);
    }

    pub fn mark_all(&mut self, keys: impl IntoIterator<Item = BlockKey>) {
        self.keys.extend(keys);
    }

    /// Block list itself changed (blocks added or removed).
    pub fn mark_structure(&mut self) {
        self.full = true;
    }

    /// True when a structural change is pending.
    pub fn is_structural(&self) -> bool {
        self.full
    }

    /// Consume and return dirty keys that still exist in `doc`, in document
    /// order. A structural mark returns every block.
    pub fn take(&mut self, doc: &Document) -> Vec<BlockKey> {
        if self.full {
            self.clear();
            return doc.keys().collect();
        }
        if self.keys.is_empty() {
            return Vec::new();
        }
        let marked: Vec<BlockKey> = self.keys.drain(..).collect();
        doc.keys().filter(|k| marked.contains(k)).collect()
    }

    /// True if nothing has been marked since last consumption.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty() && !self.full
    }

    /// Clear all tracked state without returning it.
    pub fn clear(&mut self) {
        self.keys.clear();
        self.full = false;
    }
}

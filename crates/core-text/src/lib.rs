//! Character-indexed text primitives shared by the model and the markdown
//! strategies.
//!
//! All public offsets in this workspace are *char* indices (Unicode scalar
//! values), never byte offsets. The per-character style annotation list of a
//! block is indexed the same way, so a `TextRange` produced here can be
//! applied to an annotation list without further conversion. Byte offsets
//! only appear at the `regex` boundary and are translated by `CharIndex`.

use serde::Serialize;

pub mod matcher;

pub use matcher::{Guard, Pattern, find_ranges};

/// Inclusive character interval `[start, end]` within one block's text.
///
/// Inclusive bounds cannot express an empty interval; producers drop
/// zero-length matches instead of emitting them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "inverted range {start}..={end}");
        Self { start, end }
    }

    /// Build from a half-open char interval. Returns `None` when empty.
    pub fn from_exclusive(start: usize, end_exclusive: usize) -> Option<Self> {
        (end_exclusive > start).then(|| Self::new(start, end_exclusive - 1))
    }

    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, idx: usize) -> bool {
        idx >= self.start && idx <= self.end
    }

    /// True when the range lies entirely inside a text of `len` chars.
    pub fn fits(&self, len: usize) -> bool {
        self.start <= self.end && self.end < len
    }

    pub fn as_std(&self) -> std::ops::Range<usize> {
        self.start..self.end + 1
    }
}

/// Byte offset <-> char index table for a single string.
///
/// Built once per text so converting every regex match is a binary search
/// instead of a rescan from the start of the string.
#[derive(Debug, Clone)]
pub struct CharIndex {
    /// Byte offset of each char, followed by the total byte length.
    offsets: Vec<usize>,
}

impl CharIndex {
    pub fn new(text: &str) -> Self {
        let mut offsets: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        offsets.push(text.len());
        Self { offsets }
    }

    /// Number of chars in the indexed text.
    pub fn char_len(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Char index of the char starting at `byte`. A byte inside a multi-byte
    /// char maps to the char that contains it.
    pub fn char_at_byte(&self, byte: usize) -> usize {
        match self.offsets.binary_search(&byte) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        }
    }

    /// Byte offset where char `idx` starts (clamped to the text length).
    pub fn byte_at_char(&self, idx: usize) -> usize {
        self.offsets[idx.min(self.char_len())]
    }
}

/// Char count of `text`; the length every style annotation list must match.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte offset of char index `idx` in `text`, or `None` past the end.
pub fn byte_offset(text: &str, idx: usize) -> Option<usize> {
    if idx == char_len(text) {
        return Some(text.len());
    }
    text.char_indices().nth(idx).map(|(b, _)| b)
}

//! Persistent block value.
//!
//! A `Block` is cheap to clone: text and annotations live behind `Arc`s and
//! every edit builds a new value (copy-on-write). Two clones of an untouched
//! block share storage, which lets callers check "was this block rewritten"
//! with `Block::shares_storage`.
//!
//! Invariant: `styles.len() == char_len(text)` for every constructed block.

use crate::error::ModelError;
use crate::style::{BlockType, StyleSet};
use core_text::{TextRange, char_len};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Stable block identity; survives edits, never reused within a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockKey(pub u64);

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}", self.0)
    }
}

impl Serialize for BlockKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    key: BlockKey,
    #[serde(rename = "type")]
    block_type: BlockType,
    text: Arc<str>,
    styles: Arc<[StyleSet]>,
}

impl Block {
    /// New paragraph with empty annotations.
    pub fn new(key: BlockKey, text: &str) -> Self {
        Self::with_type(key, BlockType::Paragraph, text)
    }

    pub fn with_type(key: BlockKey, block_type: BlockType, text: &str) -> Self {
        let styles = vec![StyleSet::empty(); char_len(text)];
        Self {
            key,
            block_type,
            text: Arc::from(text),
            styles: Arc::from(styles),
        }
    }

    pub fn key(&self) -> BlockKey {
        self.key
    }

    pub fn block_type(&self) -> BlockType {
        self.block_type
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn styles(&self) -> &[StyleSet] {
        &self.styles
    }

    /// Number of chars (and annotations).
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Style set at char `idx`, empty when out of bounds.
    pub fn style_at(&self, idx: usize) -> StyleSet {
        self.styles.get(idx).copied().unwrap_or_default()
    }

    /// True when every char in `range` carries all of `tags`.
    pub fn has_style(&self, range: TextRange, tags: StyleSet) -> bool {
        range.fits(self.len()) && self.styles[range.as_std()].iter().all(|s| s.contains(tags))
    }

    /// Copy with a different block type; text and annotations are shared.
    pub fn retyped(&self, block_type: BlockType) -> Self {
        Self {
            block_type,
            ..self.clone()
        }
    }

    /// Copy carrying a freshly computed annotation list.
    pub fn restyled(&self, styles: Vec<StyleSet>) -> Result<Self, ModelError> {
        if styles.len() != self.len() {
            return Err(ModelError::AnnotationLength {
                block: self.key,
                expected: self.len(),
                actual: styles.len(),
            });
        }
        Ok(Self {
            styles: Arc::from(styles),
            ..self.clone()
        })
    }

    /// Copy with new text. Annotations are carried over by char position and
    /// padded with empty sets; the maintenance pass recomputes them.
    pub(crate) fn with_text(&self, text: String) -> Self {
        let len = char_len(&text);
        let mut styles: Vec<StyleSet> = self.styles.iter().copied().take(len).collect();
        styles.resize(len, StyleSet::empty());
        Self {
            key: self.key,
            block_type: self.block_type,
            text: Arc::from(text),
            styles: Arc::from(styles),
        }
    }

    /// Both values point at the same text and annotation storage.
    pub fn shares_storage(&self, other: &Block) -> bool {
        Arc::ptr_eq(&self.text, &other.text) && Arc::ptr_eq(&self.styles, &other.styles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotations_track_char_length() {
        let b = Block::new(BlockKey(1), "héllo");
        assert_eq!(b.len(), 5);
        let b2 = b.with_text("hé".to_string());
        assert_eq!(b2.len(), 2);
        let b3 = b2.with_text("héllo wörld".to_string());
        assert_eq!(b3.len(), 11);
    }

    #[test]
    fn restyled_rejects_wrong_length() {
        let b = Block::new(BlockKey(1), "abc");
        let err = b.restyled(vec![StyleSet::BOLD]).unwrap_err();
        assert!(matches!(err, ModelError::AnnotationLength { expected: 3, actual: 1, .. }));
        let ok = b.restyled(vec![StyleSet::BOLD; 3]).unwrap();
        assert!(ok.has_style(TextRange::new(0, 2), StyleSet::BOLD));
        assert!(!ok.shares_storage(&b));
    }

    #[test]
    fn retyped_shares_storage() {
        let b = Block::new(BlockKey(7), "x");
        let c = b.retyped(BlockType::CodeBlock);
        assert!(c.shares_storage(&b));
        assert_eq!(c.block_type(), BlockType::CodeBlock);
    }
}

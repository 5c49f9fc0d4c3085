//! Ordered block document with change tracking and selection.
//!
//! Invariants (hold after every public call):
//! * `blocks` is never empty; a document always has at least one block.
//! * Block keys are unique and never reused (`next_key` only grows).
//! * `selection` names blocks that exist, with offsets `<= block.len()`.
//! * Every edit records exactly one `ChangeKind` describing what happened so
//!   the maintenance pass can bound its rescan scope.

use crate::block::{Block, BlockKey};
use crate::error::ModelError;
use crate::style::BlockType;
use core_text::{byte_offset, char_len};
use serde::Serialize;
use tracing::trace;

/// One end of a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Caret {
    pub block: BlockKey,
    pub offset: usize,
}

impl Caret {
    pub fn new(block: BlockKey, offset: usize) -> Self {
        Self { block, offset }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub anchor: Caret,
    pub focus: Caret,
}

impl Selection {
    pub fn collapsed(at: Caret) -> Self {
        Self {
            anchor: at,
            focus: at,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}

/// Kind of the most recent document change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum ChangeKind {
    InsertText { block: BlockKey },
    DeleteText { block: BlockKey },
    SplitBlock { previous: BlockKey, created: BlockKey },
    MergeBlock { into: BlockKey },
    /// Paste / fragment insertion, possibly spanning several new blocks.
    InsertFragment,
    /// Whole document swapped out.
    Replace,
    /// Type set from outside the style pass; the block keeps it.
    ChangeBlockType { block: BlockKey },
    ChangeInlineStyle,
}

#[derive(Debug, Clone, Serialize)]
pub struct Document {
    blocks: Vec<Block>,
    #[serde(skip)]
    last_change: Option<ChangeKind>,
    selection: Selection,
    #[serde(skip)]
    next_key: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::from_text("")
    }
}

const CODE_FENCE: &str = "```";

fn split_at_char(text: &str, idx: usize) -> (&str, &str) {
    let at = byte_offset(text, idx).unwrap_or(text.len());
    text.split_at(at)
}

impl Document {
    /// Initial load: one paragraph per line, no prior change kind.
    pub fn from_text(text: &str) -> Self {
        let mut doc = Self {
            blocks: Vec::new(),
            last_change: None,
            selection: Selection::collapsed(Caret::new(BlockKey(0), 0)),
            next_key: 0,
        };
        doc.blocks = doc.blocks_from_lines(text);
        doc.selection = Selection::collapsed(Caret::new(doc.blocks[0].key(), 0));
        doc
    }

    fn allocate_key(&mut self) -> BlockKey {
        let key = BlockKey(self.next_key);
        self.next_key += 1;
        key
    }

    fn blocks_from_lines(&mut self, text: &str) -> Vec<Block> {
        text.split('\n')
            .map(|line| {
                let key = self.allocate_key();
                Block::new(key, line)
            })
            .collect()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn block(&self, key: BlockKey) -> Option<&Block> {
        self.blocks.iter().find(|b| b.key() == key)
    }

    pub fn index_of(&self, key: BlockKey) -> Option<usize> {
        self.blocks.iter().position(|b| b.key() == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = BlockKey> + '_ {
        self.blocks.iter().map(Block::key)
    }

    pub fn last_change(&self) -> Option<ChangeKind> {
        self.last_change
    }

    pub fn set_last_change(&mut self, change: Option<ChangeKind>) {
        self.last_change = change;
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Full text with blocks joined by `\n`.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(block.text());
        }
        out
    }

    fn checked_index(&self, key: BlockKey) -> Result<usize, ModelError> {
        self.index_of(key).ok_or(ModelError::UnknownBlock(key))
    }

    fn checked_offset(&self, idx: usize, offset: usize) -> Result<(), ModelError> {
        let block = &self.blocks[idx];
        if offset > block.len() {
            return Err(ModelError::OffsetOutOfRange {
                block: block.key(),
                offset,
                len: block.len(),
            });
        }
        Ok(())
    }

    fn validate_caret(&self, caret: Caret) -> Result<(), ModelError> {
        let idx = self.checked_index(caret.block)?;
        self.checked_offset(idx, caret.offset)
    }

    pub fn set_selection(&mut self, selection: Selection) -> Result<(), ModelError> {
        self.validate_caret(selection.anchor)?;
        self.validate_caret(selection.focus)?;
        self.selection = selection;
        Ok(())
    }

    fn place_caret(&mut self, block: BlockKey, offset: usize) {
        self.selection = Selection::collapsed(Caret::new(block, offset));
    }

    /// Swap in a block carrying the same key. Used by the maintenance pass to
    /// install recomputed types and annotations; text must be unchanged.
    pub fn replace_block(&mut self, block: Block) -> Result<(), ModelError> {
        let idx = self.checked_index(block.key())?;
        debug_assert_eq!(self.blocks[idx].text(), block.text());
        self.blocks[idx] = block;
        Ok(())
    }

    /// Insert plain text at a char offset. Text containing newlines is routed
    /// through `insert_fragment`.
    pub fn insert_text(&mut self, key: BlockKey, offset: usize, text: &str) -> Result<(), ModelError> {
        if text.contains('\n') {
            return self.insert_fragment(key, offset, text);
        }
        let idx = self.checked_index(key)?;
        self.checked_offset(idx, offset)?;
        let block = &self.blocks[idx];
        let (head, tail) = split_at_char(block.text(), offset);
        let next = block.with_text(format!("{head}{text}{tail}"));
        self.blocks[idx] = next;
        self.place_caret(key, offset + char_len(text));
        self.last_change = Some(ChangeKind::InsertText { block: key });
        trace!(target: "model", block = %key, offset, "insert_text");
        Ok(())
    }

    /// Delete the half-open char range `[start, end)`.
    pub fn delete_text(&mut self, key: BlockKey, start: usize, end: usize) -> Result<(), ModelError> {
        let idx = self.checked_index(key)?;
        self.checked_offset(idx, end)?;
        self.checked_offset(idx, start)?;
        let (start, end) = (start.min(end), start.max(end));
        let block = &self.blocks[idx];
        let (head, rest) = split_at_char(block.text(), start);
        let (_, tail) = split_at_char(rest, end - start);
        let next = block.with_text(format!("{head}{tail}"));
        self.blocks[idx] = next;
        self.place_caret(key, start);
        self.last_change = Some(ChangeKind::DeleteText { block: key });
        trace!(target: "model", block = %key, start, end, "delete_text");
        Ok(())
    }

    /// Enter key. Splits the block at `offset` and returns the key of the
    /// block holding the caret afterwards. Code blocks, and paragraphs that
    /// open a fence, take a soft line break instead so a fenced block stays
    /// one unit.
    pub fn split_block(&mut self, key: BlockKey, offset: usize) -> Result<BlockKey, ModelError> {
        let idx = self.checked_index(key)?;
        self.checked_offset(idx, offset)?;
        let current = &self.blocks[idx];
        let opens_fence =
            current.block_type() == BlockType::Paragraph && current.text().starts_with(CODE_FENCE);
        if current.block_type() == BlockType::CodeBlock || opens_fence {
            self.insert_soft_break(key, offset)?;
            return Ok(key);
        }
        let created = self.allocate_key();
        let block = &self.blocks[idx];
        let (head, tail) = split_at_char(block.text(), offset);
        let new_block = Block::new(created, tail);
        let shortened = block.with_text(head.to_string());
        self.blocks[idx] = shortened;
        self.blocks.insert(idx + 1, new_block);
        self.place_caret(created, 0);
        self.last_change = Some(ChangeKind::SplitBlock {
            previous: key,
            created,
        });
        trace!(target: "model", block = %key, %created, offset, "split_block");
        Ok(created)
    }

    /// Shift+Enter: a line break inside the block. Fenced code is written
    /// this way so the fences and body stay one block.
    pub fn insert_soft_break(&mut self, key: BlockKey, offset: usize) -> Result<(), ModelError> {
        let idx = self.checked_index(key)?;
        self.checked_offset(idx, offset)?;
        let block = &self.blocks[idx];
        let (head, tail) = split_at_char(block.text(), offset);
        let next = block.with_text(format!("{head}\n{tail}"));
        self.blocks[idx] = next;
        self.place_caret(key, offset + 1);
        self.last_change = Some(ChangeKind::InsertText { block: key });
        Ok(())
    }

    /// Backspace at block start: append this block's text to the previous
    /// block and remove it. Returns the surviving block key.
    pub fn merge_with_previous(&mut self, key: BlockKey) -> Result<BlockKey, ModelError> {
        let idx = self.checked_index(key)?;
        if idx == 0 {
            return Err(ModelError::NothingToMerge(key));
        }
        let removed = self.blocks.remove(idx);
        let prev = &self.blocks[idx - 1];
        let into = prev.key();
        let join_at = prev.len();
        let merged = prev.with_text(format!("{}{}", prev.text(), removed.text()));
        self.blocks[idx - 1] = merged;
        self.place_caret(into, join_at);
        self.last_change = Some(ChangeKind::MergeBlock { into });
        trace!(target: "model", removed = %key, %into, "merge_block");
        Ok(into)
    }

    /// Paste. The first line joins the target block at `offset`, following
    /// lines become new paragraphs, and the remainder of the target block is
    /// appended to the last pasted line. Pasting into a code block inserts
    /// the text verbatim.
    pub fn insert_fragment(&mut self, key: BlockKey, offset: usize, text: &str) -> Result<(), ModelError> {
        let idx = self.checked_index(key)?;
        self.checked_offset(idx, offset)?;
        let lines: Vec<&str> = text.split('\n').collect();
        let block = self.blocks[idx].clone();
        let (head, tail) = split_at_char(block.text(), offset);
        // Code blocks keep pasted line breaks inside the block.
        if lines.len() == 1 || block.block_type() == BlockType::CodeBlock {
            self.blocks[idx] = block.with_text(format!("{head}{text}{tail}"));
            self.place_caret(key, offset + char_len(text));
        } else {
            let last = lines.len() - 1;
            self.blocks[idx] = block.with_text(format!("{head}{}", lines[0]));
            let mut caret = Caret::new(key, 0);
            for (n, line) in lines.iter().enumerate().skip(1) {
                let new_key = self.allocate_key();
                let content = if n == last {
                    caret = Caret::new(new_key, char_len(line));
                    format!("{line}{tail}")
                } else {
                    (*line).to_string()
                };
                self.blocks.insert(idx + n, Block::new(new_key, &content));
            }
            self.selection = Selection::collapsed(caret);
        }
        self.last_change = Some(ChangeKind::InsertFragment);
        trace!(target: "model", block = %key, lines = lines.len(), "insert_fragment");
        Ok(())
    }

    /// Replace the whole document content. All blocks get fresh keys.
    pub fn replace(&mut self, text: &str) {
        self.blocks = self.blocks_from_lines(text);
        self.place_caret(self.blocks[0].key(), 0);
        self.last_change = Some(ChangeKind::Replace);
    }

    /// Externally driven block type change (toolbar, host command).
    pub fn set_block_type(&mut self, key: BlockKey, block_type: BlockType) -> Result<(), ModelError> {
        let idx = self.checked_index(key)?;
        self.blocks[idx] = self.blocks[idx].retyped(block_type);
        self.last_change = Some(ChangeKind::ChangeBlockType { block: key });
        Ok(())
    }
}

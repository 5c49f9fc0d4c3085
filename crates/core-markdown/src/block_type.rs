//! Block-type strategies: whole-block reclassification.
//!
//! Ownership rule: a strategy only ever writes block types it *owns*, and
//! only considers blocks that are currently `Paragraph` or already carry one
//! of its own types. Types set by anything else (list items, quotes set by a
//! host command) are left alone. A block previously promoted by a strategy
//! falls back to `Paragraph` once its text stops matching.
//!
//! Classification is run to a fixpoint per block so the result does not
//! depend on which strategy happened to see the block first; this is what
//! makes a second pass over an unchanged document a no-op.

use core_model::{BlockKey, BlockType, Document, HeadingLevel};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::{debug, warn};

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#+)[ \t]").expect("heading pattern must compile"));
static FENCED_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^```[^\n]*\n(?:.*\n)?```[ \t]*$").expect("code fence pattern must compile")
});

/// Upper bound on fixpoint rounds; two strategies settle in at most two.
const MAX_ROUNDS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockTypeStrategy {
    CodeBlock,
    Heading,
}

impl BlockTypeStrategy {
    pub const DEFAULT_ORDER: [BlockTypeStrategy; 2] =
        [BlockTypeStrategy::CodeBlock, BlockTypeStrategy::Heading];

    pub fn name(self) -> &'static str {
        match self {
            BlockTypeStrategy::CodeBlock => "code-block",
            BlockTypeStrategy::Heading => "heading",
        }
    }

    /// Whether `block_type` is one this strategy assigns.
    pub fn owns(self, block_type: BlockType) -> bool {
        match self {
            BlockTypeStrategy::CodeBlock => block_type == BlockType::CodeBlock,
            BlockTypeStrategy::Heading => block_type.is_heading(),
        }
    }

    /// Type implied by `text` alone, if the pattern matches.
    pub fn classify(self, text: &str) -> Option<BlockType> {
        match self {
            BlockTypeStrategy::CodeBlock => {
                FENCED_CODE.is_match(text).then_some(BlockType::CodeBlock)
            }
            BlockTypeStrategy::Heading => HEADING.captures(text).and_then(|caps| {
                let hashes = caps.get(1)?.as_str().len();
                if hashes > HeadingLevel::MAX as usize {
                    debug!(target: "markdown.block_type", hashes, "heading_level_clamped");
                }
                Some(BlockType::Heading(HeadingLevel::clamped(hashes)))
            }),
        }
    }

    /// Next type for a block currently typed `current` holding `text`.
    pub fn apply(self, text: &str, current: BlockType) -> BlockType {
        if current != BlockType::Paragraph && !self.owns(current) {
            return current;
        }
        match self.classify(text) {
            Some(next) => next,
            None if self.owns(current) => BlockType::Paragraph,
            None => current,
        }
    }
}

/// Run `strategies` over one block's text until the type settles.
pub fn classify_block(strategies: &[BlockTypeStrategy], text: &str, current: BlockType) -> BlockType {
    let mut block_type = current;
    for _ in 0..MAX_ROUNDS {
        let before = block_type;
        for strategy in strategies {
            block_type = strategy.apply(text, block_type);
        }
        if block_type == before {
            return block_type;
        }
    }
    warn!(target: "markdown.block_type", ?current, ?block_type, "classification_did_not_settle");
    block_type
}

/// Reclassify the blocks named in `scope`; returns the keys whose type
/// changed. Keys that no longer exist are skipped.
pub fn classify_blocks(
    doc: &mut Document,
    strategies: &[BlockTypeStrategy],
    scope: &[BlockKey],
) -> Vec<BlockKey> {
    let mut changed = Vec::new();
    for &key in scope {
        let Some(block) = doc.block(key) else {
            continue;
        };
        let next = classify_block(strategies, block.text(), block.block_type());
        if next == block.block_type() {
            continue;
        }
        let retyped = block.retyped(next);
        debug!(target: "markdown.block_type", block = %key, from = %block.block_type(), to = %next, "block_retyped");
        if doc.replace_block(retyped).is_ok() {
            changed.push(key);
        }
    }
    changed
}

//! Style maintenance engine.
//!
//! One synchronous pass per document change: pick the rescan scope from the
//! document's last change kind, reclassify block types in that scope, then
//! recompute per-character style annotations for the same blocks.
//!
//! Scope table:
//!
//! | last change                       | rescanned                         |
//! |-----------------------------------|-----------------------------------|
//! | insert / delete text in a block   | that block                        |
//! | split (Enter)                     | previous block and created block  |
//! | merge (Backspace at block start)  | surviving block                   |
//! | paste, replace, none (initial)    | every block                       |
//! | external block type change        | that block, restyled only         |
//! | inline style change (own output)  | nothing (pass skipped)            |
//!
//! Every completed pass stamps `ChangeInlineStyle` on its output, so feeding
//! the result straight back in is a no-op instead of a reclassification
//! loop. Only bulk operations pay for a full-document rescan.
//!
//! Guarantees: the pass never alters block text or block count, leaves the
//! selection exactly as it found it, and keeps untouched blocks sharing
//! storage with the input document. Annotations are replaced wholesale
//! (copy-on-write); a block whose recomputed annotations equal the old ones
//! keeps its old storage.

use crate::error::StyleError;
use core_config::Config;
use core_markdown::{BlockTypeStrategy, StrategyRanges, StyleStrategy, classify_blocks};
use core_model::{Block, BlockKey, ChangeKind, Document, StyleSet};
use tracing::{debug, trace, warn};

/// Blocks a pass will rescan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Skip,
    All,
    Blocks(Vec<BlockKey>),
    /// Recompute annotations only; block types are kept as set.
    Restyle(Vec<BlockKey>),
}

impl Scope {
    /// Scope implied by the last change recorded on `doc`.
    pub fn for_change(change: Option<ChangeKind>) -> Self {
        match change {
            None | Some(ChangeKind::InsertFragment) | Some(ChangeKind::Replace) => Scope::All,
            Some(ChangeKind::InsertText { block }) | Some(ChangeKind::DeleteText { block }) => {
                Scope::Blocks(vec![block])
            }
            Some(ChangeKind::SplitBlock { previous, created }) => {
                Scope::Blocks(vec![previous, created])
            }
            Some(ChangeKind::MergeBlock { into }) => Scope::Blocks(vec![into]),
            Some(ChangeKind::ChangeBlockType { block }) => Scope::Restyle(vec![block]),
            Some(ChangeKind::ChangeInlineStyle) => Scope::Skip,
        }
    }

    fn keys(&self, doc: &Document) -> Vec<BlockKey> {
        match self {
            Scope::Skip => Vec::new(),
            Scope::All => doc.keys().collect(),
            Scope::Blocks(keys) | Scope::Restyle(keys) => keys.clone(),
        }
    }
}

/// Result of one pass.
#[derive(Debug, Clone)]
pub struct Maintenance {
    pub document: Document,
    pub scope: Scope,
    /// Blocks whose type changed, in scan order.
    pub retyped: Vec<BlockKey>,
    /// Blocks whose annotations changed, in scan order.
    pub restyled: Vec<BlockKey>,
}

impl Maintenance {
    pub fn is_skipped(&self) -> bool {
        self.scope == Scope::Skip
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleMaintenanceEngine {
    style_strategies: Vec<StyleStrategy>,
    block_type_strategies: Vec<BlockTypeStrategy>,
}

impl Default for StyleMaintenanceEngine {
    fn default() -> Self {
        Self::new(
            StyleStrategy::DEFAULT_ORDER.to_vec(),
            BlockTypeStrategy::DEFAULT_ORDER.to_vec(),
        )
    }
}

impl StyleMaintenanceEngine {
    pub fn new(
        style_strategies: Vec<StyleStrategy>,
        block_type_strategies: Vec<BlockTypeStrategy>,
    ) -> Self {
        Self {
            style_strategies,
            block_type_strategies,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.inline_strategies().to_vec(),
            config.block_type_strategies().to_vec(),
        )
    }

    pub fn style_strategies(&self) -> &[StyleStrategy] {
        &self.style_strategies
    }

    pub fn block_type_strategies(&self) -> &[BlockTypeStrategy] {
        &self.block_type_strategies
    }

    /// Run one maintenance pass over `doc`.
    pub fn maintain(&self, doc: &Document) -> Maintenance {
        let scope = Scope::for_change(doc.last_change());
        let span = tracing::debug_span!(target: "engine", "maintenance_pass", ?scope);
        let _enter = span.enter();

        if scope == Scope::Skip {
            trace!(target: "engine.scope", change = ?doc.last_change(), "pass_skipped");
            return Maintenance {
                document: doc.clone(),
                scope,
                retyped: Vec::new(),
                restyled: Vec::new(),
            };
        }

        let keys = scope.keys(doc);
        let mut next = doc.clone();
        let retyped = match scope {
            Scope::Restyle(_) => Vec::new(),
            _ => classify_blocks(&mut next, &self.block_type_strategies, &keys),
        };

        let mut restyled = Vec::new();
        for key in &keys {
            let Some(block) = next.block(*key) else {
                debug!(target: "engine.scope", block = %key, "scoped_block_missing");
                continue;
            };
            let styles = self.compute_styles(block);
            if styles.as_slice() == block.styles() {
                continue;
            }
            match block.restyled(styles) {
                Ok(updated) => {
                    if next.replace_block(updated).is_ok() {
                        restyled.push(*key);
                    }
                }
                Err(err) => {
                    warn!(target: "engine", block = %key, error = %err, "restyle_rejected");
                }
            }
        }

        // Selection is carried over untouched; the pass never moves the caret.
        if let Err(err) = next.set_selection(doc.selection()) {
            warn!(target: "engine", error = %err, "selection_reapply_failed");
        }
        next.set_last_change(Some(ChangeKind::ChangeInlineStyle));

        debug!(
            target: "engine",
            scanned = keys.len(),
            retyped = retyped.len(),
            restyled = restyled.len(),
            "maintenance_complete"
        );
        Maintenance {
            document: next,
            scope,
            retyped,
            restyled,
        }
    }

    /// Fresh annotation list for `block`, unioning every strategy's tags.
    pub fn compute_styles(&self, block: &Block) -> Vec<StyleSet> {
        let mut styles = vec![StyleSet::empty(); block.len()];
        for &strategy in &self.style_strategies {
            let ranges = strategy.ranges(block);
            if let Err(err) = apply_strategy(&mut styles, strategy, &ranges) {
                warn!(
                    target: "engine",
                    strategy = strategy.name(),
                    block = %block.key(),
                    error = %err,
                    "strategy_ranges_dropped"
                );
            }
        }
        styles
    }
}

/// Union one strategy's tags into `styles`. All ranges are validated first so
/// a strategy with any out-of-bounds range contributes nothing at all.
pub(crate) fn apply_strategy(
    styles: &mut [StyleSet],
    strategy: StyleStrategy,
    ranges: &StrategyRanges,
) -> Result<(), StyleError> {
    let len = styles.len();
    if let Some(bad) = ranges
        .style
        .iter()
        .chain(&ranges.delimiter)
        .find(|r| !r.fits(len))
    {
        return Err(StyleError::RangeOutOfBounds {
            strategy: strategy.name(),
            start: bad.start,
            end: bad.end,
            len,
        });
    }
    let primary = strategy.style();
    for range in &ranges.style {
        for set in &mut styles[range.as_std()] {
            set.insert(primary);
        }
    }
    if let Some(delimiter) = strategy.delimiter_style() {
        for range in &ranges.delimiter {
            for set in &mut styles[range.as_std()] {
                set.insert(delimiter);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_model::{BlockType, Caret, HeadingLevel, Selection, TextRange};
    use pretty_assertions::assert_eq;

    fn engine() -> StyleMaintenanceEngine {
        StyleMaintenanceEngine::default()
    }

    fn styles_of(doc: &Document, idx: usize) -> Vec<StyleSet> {
        doc.blocks()[idx].styles().to_vec()
    }

    #[test]
    fn scope_table() {
        let k = BlockKey(3);
        let j = BlockKey(4);
        assert_eq!(Scope::for_change(None), Scope::All);
        assert_eq!(Scope::for_change(Some(ChangeKind::InsertFragment)), Scope::All);
        assert_eq!(Scope::for_change(Some(ChangeKind::Replace)), Scope::All);
        assert_eq!(
            Scope::for_change(Some(ChangeKind::InsertText { block: k })),
            Scope::Blocks(vec![k])
        );
        assert_eq!(
            Scope::for_change(Some(ChangeKind::SplitBlock { previous: k, created: j })),
            Scope::Blocks(vec![k, j])
        );
        assert_eq!(
            Scope::for_change(Some(ChangeKind::MergeBlock { into: k })),
            Scope::Blocks(vec![k])
        );
        assert_eq!(Scope::for_change(Some(ChangeKind::ChangeInlineStyle)), Scope::Skip);
        assert_eq!(
            Scope::for_change(Some(ChangeKind::ChangeBlockType { block: k })),
            Scope::Restyle(vec![k])
        );
    }

    #[test]
    fn external_type_is_restyled_not_reclassified() {
        let mut doc = engine().maintain(&Document::from_text("## x")).document;
        let key = doc.blocks()[0].key();
        doc.set_block_type(key, BlockType::Paragraph).unwrap();
        let out = engine().maintain(&doc);
        assert_eq!(out.scope, Scope::Restyle(vec![key]));
        assert!(out.retyped.is_empty());
        assert_eq!(out.restyled, vec![key]);
        let block = &out.document.blocks()[0];
        assert_eq!(block.block_type(), BlockType::Paragraph);
        assert!(block.styles().iter().all(|s| s.is_empty()));
    }

    #[test]
    fn bold_content_and_delimiters() {
        let out = engine().maintain(&Document::from_text("**bold**"));
        let styles = styles_of(&out.document, 0);
        let d = StyleSet::MARKDOWN_DELIMITER;
        let b = StyleSet::BOLD;
        assert_eq!(styles, vec![d, d, b, b, b, b, d, d]);
    }

    #[test]
    fn heading_typed_before_delimiter_styled() {
        let out = engine().maintain(&Document::from_text("# Heading"));
        let block = &out.document.blocks()[0];
        assert_eq!(block.block_type(), BlockType::Heading(HeadingLevel::clamped(1)));
        assert!(block.has_style(TextRange::new(0, 1), StyleSet::HEADING_DELIMITER));
        assert_eq!(block.style_at(2), StyleSet::empty());
        assert_eq!(out.retyped, vec![block.key()]);
    }

    #[test]
    fn quote_delimiter_is_prefix_only() {
        let out = engine().maintain(&Document::from_text("> quoted"));
        let block = &out.document.blocks()[0];
        assert!(block.has_style(TextRange::new(0, 7), StyleSet::QUOTE));
        assert!(block.has_style(TextRange::new(0, 1), StyleSet::QUOTE_DELIMITER));
        assert!(!block.style_at(2).contains(StyleSet::QUOTE_DELIMITER));
    }

    #[test]
    fn overlapping_tags_union() {
        let out = engine().maintain(&Document::from_text("> **x**"));
        let block = &out.document.blocks()[0];
        assert_eq!(block.style_at(4), StyleSet::QUOTE | StyleSet::BOLD);
    }

    #[test]
    fn inline_code_declines_in_code_block() {
        let mut doc = Document::from_text("```");
        let key = doc.blocks()[0].key();
        doc.insert_soft_break(key, 3).unwrap();
        doc.insert_text(key, 4, "`code`").unwrap();
        doc.insert_soft_break(key, 10).unwrap();
        doc.insert_text(key, 11, "```").unwrap();
        let out = engine().maintain(&doc);
        let block = out.document.block(key).unwrap();
        assert_eq!(block.text(), "```\n`code`\n```");
        assert_eq!(block.block_type(), BlockType::CodeBlock);
        assert!(block.styles().iter().all(|s| !s.contains(StyleSet::INLINE_CODE)));

        // Same text in a paragraph gets inline code styling.
        let para = engine().maintain(&Document::from_text("`code`")).document;
        assert!(para.blocks()[0].style_at(1).contains(StyleSet::INLINE_CODE));
    }

    #[test]
    fn pass_output_is_skipped_next_time() {
        let first = engine().maintain(&Document::from_text("*a*"));
        assert_eq!(first.document.last_change(), Some(ChangeKind::ChangeInlineStyle));
        let second = engine().maintain(&first.document);
        assert!(second.is_skipped());
        assert!(second.restyled.is_empty());
        assert_eq!(styles_of(&second.document, 0), styles_of(&first.document, 0));
    }

    #[test]
    fn split_restyles_previous_and_created() {
        let mut doc = engine().maintain(&Document::from_text("**bold** rest")).document;
        let key = doc.blocks()[0].key();
        // Split inside the bold run: neither half is bold any more.
        let created = doc.split_block(key, 4).unwrap();
        let out = engine().maintain(&doc);
        assert_eq!(out.scope, Scope::Blocks(vec![key, created]));
        assert!(out.restyled.contains(&key));
        assert!(out.document.blocks()[0].styles().iter().all(|s| s.is_empty()));
    }

    #[test]
    fn selection_is_preserved() {
        let mut doc = Document::from_text("# Title");
        let key = doc.blocks()[0].key();
        let sel = Selection {
            anchor: Caret::new(key, 2),
            focus: Caret::new(key, 7),
        };
        doc.set_selection(sel).unwrap();
        let out = engine().maintain(&doc);
        assert_eq!(out.document.selection(), sel);
    }

    #[test]
    fn out_of_bounds_strategy_contributes_nothing() {
        let mut styles = vec![StyleSet::empty(); 3];
        let ranges = StrategyRanges {
            style: vec![TextRange::new(0, 1)],
            delimiter: vec![TextRange::new(2, 5)],
        };
        let err = apply_strategy(&mut styles, StyleStrategy::Bold, &ranges).unwrap_err();
        assert!(matches!(err, StyleError::RangeOutOfBounds { strategy: "bold", len: 3, .. }));
        assert!(styles.iter().all(|s| s.is_empty()));

        let ok = StrategyRanges {
            style: vec![TextRange::new(1, 1)],
            delimiter: vec![TextRange::new(0, 0), TextRange::new(2, 2)],
        };
        apply_strategy(&mut styles, StyleStrategy::Italic, &ok).unwrap();
        assert_eq!(
            styles,
            vec![StyleSet::MARKDOWN_DELIMITER, StyleSet::ITALIC, StyleSet::MARKDOWN_DELIMITER]
        );
    }

    #[test]
    fn disabled_strategies_do_not_style() {
        let only_bold = StyleMaintenanceEngine::new(vec![StyleStrategy::Bold], vec![]);
        let out = only_bold.maintain(&Document::from_text("# *x* **y**"));
        let block = &out.document.blocks()[0];
        assert_eq!(block.block_type(), BlockType::Paragraph);
        assert!(block.styles().iter().all(|s| !s.contains(StyleSet::ITALIC)));
        assert!(block.style_at(8).contains(StyleSet::BOLD));
    }
}

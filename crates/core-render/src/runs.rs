//! Contiguous style runs.
//!
//! Renderers emit one span per run instead of one per character. Runs cover
//! the block exactly: they are ordered, non-empty, adjacent, and two
//! neighbouring runs never carry the same tag set.

use core_model::{Block, StyleSet};
use core_text::TextRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleRun {
    pub range: TextRange,
    pub styles: StyleSet,
}

pub fn style_runs(block: &Block) -> Vec<StyleRun> {
    let mut runs: Vec<StyleRun> = Vec::new();
    for (idx, &styles) in block.styles().iter().enumerate() {
        match runs.last_mut() {
            Some(run) if run.styles == styles => run.range.end = idx,
            _ => runs.push(StyleRun {
                range: TextRange::new(idx, idx),
                styles,
            }),
        }
    }
    runs
}

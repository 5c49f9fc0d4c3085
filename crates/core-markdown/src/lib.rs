//! Markdown recognisers for the live style pass.
//!
//! Two closed strategy families:
//! * [`StyleStrategy`]: inline constructs mapped to per-character style tags.
//! * [`BlockTypeStrategy`]: whole-block patterns mapped to block types.
//!
//! Both are plain enums so configuration selects and orders variants rather
//! than injecting arbitrary objects. Block-type strategies must run before
//! inline ones because two inline strategies read the block type
//! (`HeadingDelimiter` requires a heading, `InlineCode` declines inside a
//! code block).

mod block_type;
mod inline;

pub use block_type::{BlockTypeStrategy, classify_block, classify_blocks};
pub use inline::{StrategyRanges, StyleStrategy};

//! Inline style strategies.
//!
//! Each strategy is a pure function of one block: it finds *content* ranges
//! tagged with its primary style and, for constructs whose syntax stays in
//! the text, *delimiter* ranges derived from those content ranges. Results
//! of different strategies are unioned per character by the engine, so a
//! strategy never needs to know about the others.
//!
//! Strategies never fail. Text too short to hold a construct, empty text and
//! multi-byte characters all simply produce no ranges.

use core_model::{Block, BlockType, StyleSet};
use core_text::{Pattern, TextRange, find_ranges};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::LazyLock;

fn compile(re: &str) -> Regex {
    Regex::new(re).expect("inline strategy pattern must compile")
}

static BOLD_STAR: LazyLock<Pattern> =
    LazyLock::new(|| Pattern::new(compile(r"\*\*([^*\s](?:[^*\n]*[^*\s])?)\*\*")).group(1));
static BOLD_UNDERSCORE: LazyLock<Pattern> =
    LazyLock::new(|| Pattern::new(compile(r"__([^_\s](?:[^_\n]*[^_\s])?)__")).group(1));
static ITALIC_STAR: LazyLock<Pattern> = LazyLock::new(|| {
    Pattern::new(compile(r"\*([^*\s](?:[^*\n]*[^*\s])?)\*"))
        .group(1)
        .guard(not_touching_star)
});
static ITALIC_UNDERSCORE: LazyLock<Pattern> = LazyLock::new(|| {
    Pattern::new(compile(r"_([^_\s](?:[^_\n]*[^_\s])?)_"))
        .group(1)
        .guard(not_intraword_underscore)
});
static STRIKETHROUGH: LazyLock<Pattern> =
    LazyLock::new(|| Pattern::new(compile(r"~~([^~\s](?:[^~\n]*[^~\s])?)~~")).group(1));
static HEADING_DELIMITER: LazyLock<Pattern> = LazyLock::new(|| Pattern::new(compile(r"^#+[ \t]+")));
static UL_DELIMITER: LazyLock<Pattern> =
    LazyLock::new(|| Pattern::new(compile(r"(?m)^[ \t]*([-*+][ \t])")).group(1));
static OL_DELIMITER: LazyLock<Pattern> =
    LazyLock::new(|| Pattern::new(compile(r"(?m)^[ \t]*(\d{1,9}[.)][ \t])")).group(1));
static QUOTE: LazyLock<Pattern> = LazyLock::new(|| Pattern::new(compile(r"(?m)^>.*$")));
static INLINE_CODE: LazyLock<Pattern> =
    LazyLock::new(|| Pattern::new(compile(r"`([^`\n]+)`")).group(1));

fn char_before(text: &str, byte: usize) -> Option<char> {
    text[..byte].chars().next_back()
}

fn char_after(text: &str, byte: usize) -> Option<char> {
    text[byte..].chars().next()
}

/// `*x*` must not be part of a `**` run on either side.
fn not_touching_star(text: &str, span: Range<usize>) -> bool {
    char_before(text, span.start) != Some('*') && char_after(text, span.end) != Some('*')
}

/// `_x_` must not touch another `_` or sit inside a word (`snake_case_name`).
fn not_intraword_underscore(text: &str, span: Range<usize>) -> bool {
    let blocks = |c: Option<char>| c.is_some_and(|c| c == '_' || c.is_alphanumeric());
    !blocks(char_before(text, span.start)) && !blocks(char_after(text, span.end))
}

/// Merge per-pattern results into one ordered, non-overlapping list. On
/// overlap the earlier-starting range wins.
fn merge_disjoint(mut ranges: Vec<TextRange>) -> Vec<TextRange> {
    ranges.sort();
    let mut out: Vec<TextRange> = Vec::with_capacity(ranges.len());
    for r in ranges {
        match out.last() {
            Some(prev) if r.start <= prev.end => {}
            _ => out.push(r),
        }
    }
    out
}

/// Delimiter ranges of `width` chars immediately before and after each
/// content range.
fn surrounding(content: &[TextRange], width: usize, len: usize) -> Vec<TextRange> {
    let mut out = Vec::with_capacity(content.len() * 2);
    for r in content {
        if r.start >= width {
            out.push(TextRange::new(r.start - width, r.start - 1));
        }
        if r.end + width < len {
            out.push(TextRange::new(r.end + 1, r.end + width));
        }
    }
    out
}

/// Inline markdown construct recognisers, in default application order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleStrategy {
    Bold,
    Italic,
    Strikethrough,
    HeadingDelimiter,
    UlDelimiter,
    OlDelimiter,
    Quote,
    InlineCode,
}

/// Content and delimiter ranges produced by one strategy for one block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrategyRanges {
    pub style: Vec<TextRange>,
    pub delimiter: Vec<TextRange>,
}

impl StyleStrategy {
    pub const DEFAULT_ORDER: [StyleStrategy; 8] = [
        StyleStrategy::Bold,
        StyleStrategy::Italic,
        StyleStrategy::Strikethrough,
        StyleStrategy::HeadingDelimiter,
        StyleStrategy::UlDelimiter,
        StyleStrategy::OlDelimiter,
        StyleStrategy::Quote,
        StyleStrategy::InlineCode,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StyleStrategy::Bold => "bold",
            StyleStrategy::Italic => "italic",
            StyleStrategy::Strikethrough => "strikethrough",
            StyleStrategy::HeadingDelimiter => "heading-delimiter",
            StyleStrategy::UlDelimiter => "ul-delimiter",
            StyleStrategy::OlDelimiter => "ol-delimiter",
            StyleStrategy::Quote => "quote",
            StyleStrategy::InlineCode => "inline-code",
        }
    }

    /// Primary tag applied to content ranges.
    pub fn style(self) -> StyleSet {
        match self {
            StyleStrategy::Bold => StyleSet::BOLD,
            StyleStrategy::Italic => StyleSet::ITALIC,
            StyleStrategy::Strikethrough => StyleSet::STRIKETHROUGH,
            StyleStrategy::HeadingDelimiter => StyleSet::HEADING_DELIMITER,
            StyleStrategy::UlDelimiter => StyleSet::UL_DELIMITER,
            StyleStrategy::OlDelimiter => StyleSet::OL_DELIMITER,
            StyleStrategy::Quote => StyleSet::QUOTE,
            StyleStrategy::InlineCode => StyleSet::INLINE_CODE,
        }
    }

    /// Separate tag for the literal syntax, when the strategy has one.
    pub fn delimiter_style(self) -> Option<StyleSet> {
        match self {
            StyleStrategy::Bold
            | StyleStrategy::Italic
            | StyleStrategy::Strikethrough
            | StyleStrategy::InlineCode => Some(StyleSet::MARKDOWN_DELIMITER),
            StyleStrategy::Quote => Some(StyleSet::QUOTE_DELIMITER),
            StyleStrategy::HeadingDelimiter
            | StyleStrategy::UlDelimiter
            | StyleStrategy::OlDelimiter => None,
        }
    }

    pub fn find_style_ranges(self, block: &Block) -> Vec<TextRange> {
        let text = block.text();
        match self {
            StyleStrategy::Bold => merge_disjoint(
                [&*BOLD_STAR, &*BOLD_UNDERSCORE]
                    .into_iter()
                    .flat_map(|p| find_ranges(text, p))
                    .collect(),
            ),
            StyleStrategy::Italic => merge_disjoint(
                [&*ITALIC_STAR, &*ITALIC_UNDERSCORE]
                    .into_iter()
                    .flat_map(|p| find_ranges(text, p))
                    .collect(),
            ),
            StyleStrategy::Strikethrough => find_ranges(text, &STRIKETHROUGH),
            StyleStrategy::HeadingDelimiter => {
                if !block.block_type().is_heading() {
                    return Vec::new();
                }
                find_ranges(text, &HEADING_DELIMITER)
            }
            StyleStrategy::UlDelimiter => find_ranges(text, &UL_DELIMITER),
            StyleStrategy::OlDelimiter => find_ranges(text, &OL_DELIMITER),
            StyleStrategy::Quote => find_ranges(text, &QUOTE),
            StyleStrategy::InlineCode => {
                if block.block_type() == BlockType::CodeBlock {
                    return Vec::new();
                }
                find_ranges(text, &INLINE_CODE)
            }
        }
    }

    /// Delimiter ranges relative to previously found content ranges.
    pub fn find_delimiter_ranges(self, block: &Block, content: &[TextRange]) -> Vec<TextRange> {
        let len = block.len();
        match self {
            StyleStrategy::Bold | StyleStrategy::Strikethrough => surrounding(content, 2, len),
            StyleStrategy::Italic | StyleStrategy::InlineCode => surrounding(content, 1, len),
            StyleStrategy::Quote => {
                let chars: Vec<char> = block.text().chars().collect();
                content
                    .iter()
                    .filter(|r| chars.get(r.start) == Some(&'>'))
                    .map(|r| {
                        let spaced = r.end > r.start
                            && matches!(chars.get(r.start + 1), Some(' ') | Some('\t'));
                        TextRange::new(r.start, if spaced { r.start + 1 } else { r.start })
                    })
                    .collect()
            }
            StyleStrategy::HeadingDelimiter
            | StyleStrategy::UlDelimiter
            | StyleStrategy::OlDelimiter => Vec::new(),
        }
    }

    /// Run both phases for `block`.
    pub fn ranges(self, block: &Block) -> StrategyRanges {
        let style = self.find_style_ranges(block);
        let delimiter = if self.delimiter_style().is_some() && !style.is_empty() {
            self.find_delimiter_ranges(block, &style)
        } else {
            Vec::new()
        };
        StrategyRanges { style, delimiter }
    }
}

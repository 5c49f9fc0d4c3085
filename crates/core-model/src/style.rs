//! Inline style tags and block types.

use bitflags::bitflags;
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use std::fmt;

bitflags! {
    /// Set of inline style tags active on one character.
    ///
    /// Tags are additive: several strategies may tag the same character
    /// (bold text inside a quote carries `BOLD | QUOTE`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StyleSet: u16 {
        const BOLD = 1 << 0;
        const ITALIC = 1 << 1;
        const STRIKETHROUGH = 1 << 2;
        const INLINE_CODE = 1 << 3;
        const QUOTE = 1 << 4;
        const QUOTE_DELIMITER = 1 << 5;
        const HEADING_DELIMITER = 1 << 6;
        const UL_DELIMITER = 1 << 7;
        const OL_DELIMITER = 1 << 8;
        /// Literal syntax of inline constructs (`**`, `_`, `~~`, backticks).
        const MARKDOWN_DELIMITER = 1 << 9;
    }
}

const TAG_NAMES: &[(StyleSet, &str)] = &[
    (StyleSet::BOLD, "BOLD"),
    (StyleSet::ITALIC, "ITALIC"),
    (StyleSet::STRIKETHROUGH, "STRIKETHROUGH"),
    (StyleSet::INLINE_CODE, "INLINE-CODE"),
    (StyleSet::QUOTE, "QUOTE"),
    (StyleSet::QUOTE_DELIMITER, "QUOTE-DELIMITER"),
    (StyleSet::HEADING_DELIMITER, "HEADING-DELIMITER"),
    (StyleSet::UL_DELIMITER, "UL-DELIMITER"),
    (StyleSet::OL_DELIMITER, "OL-DELIMITER"),
    (StyleSet::MARKDOWN_DELIMITER, "MARKDOWN-DELIMITER"),
];

impl StyleSet {
    /// Display names of the contained tags in declaration order.
    pub fn tag_names(self) -> impl Iterator<Item = &'static str> {
        TAG_NAMES
            .iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
    }

    /// Reverse lookup of a single tag by display name.
    pub fn from_tag_name(name: &str) -> Option<Self> {
        TAG_NAMES
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|(flag, _)| *flag)
    }
}

impl fmt::Display for StyleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, name) in self.tag_names().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(name)?;
        }
        f.write_str("}")
    }
}

impl Serialize for StyleSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.bits().count_ones() as usize))?;
        for name in self.tag_names() {
            seq.serialize_element(name)?;
        }
        seq.end()
    }
}

/// Heading level, always within `1..=6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct HeadingLevel(u8);

impl HeadingLevel {
    pub const MAX: u8 = 6;

    /// Level from a count of leading `#` characters, clamped to `1..=6`.
    pub fn clamped(count: usize) -> Self {
        Self(count.clamp(1, Self::MAX as usize) as u8)
    }

    pub fn new(level: u8) -> Option<Self> {
        (1..=Self::MAX).contains(&level).then_some(Self(level))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

/// Block-level classification controlling layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "level")]
pub enum BlockType {
    #[default]
    Paragraph,
    Heading(HeadingLevel),
    CodeBlock,
    Blockquote,
    UnorderedListItem,
    OrderedListItem,
}

impl BlockType {
    pub fn is_heading(self) -> bool {
        matches!(self, BlockType::Heading(_))
    }

    /// Stable kebab-case name (`header-two`, `code-block`, ...).
    pub fn name(self) -> &'static str {
        match self {
            BlockType::Paragraph => "unstyled",
            BlockType::Heading(level) => match level.get() {
                1 => "header-one",
                2 => "header-two",
                3 => "header-three",
                4 => "header-four",
                5 => "header-five",
                _ => "header-six",
            },
            BlockType::CodeBlock => "code-block",
            BlockType::Blockquote => "blockquote",
            BlockType::UnorderedListItem => "unordered-list-item",
            BlockType::OrderedListItem => "ordered-list-item",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

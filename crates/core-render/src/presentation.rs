//! Custom style map: inline tag sets to visual attributes.
//!
//! Each tag contributes a fixed [`Presentation`]; a character carrying
//! several tags gets the merge of all of them. Delimiters stay in the text
//! but are dimmed, and block-level delimiters (heading hashes, list markers)
//! hang into the left margin so body text lines up across block types.

use core_model::StyleSet;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presentation {
    pub font_weight: FontWeight,
    pub italic: bool,
    pub line_through: bool,
    pub monospace: bool,
    pub muted: bool,
    /// Percent; 100 is fully opaque.
    pub opacity: u8,
    /// Positioned to the left of the block's text start.
    pub hanging: bool,
}

const PLAIN: Presentation = Presentation {
    font_weight: FontWeight::Normal,
    italic: false,
    line_through: false,
    monospace: false,
    muted: false,
    opacity: 100,
    hanging: false,
};

const DIMMED: u8 = 40;

const STYLE_MAP: &[(StyleSet, Presentation)] = &[
    (
        StyleSet::BOLD,
        Presentation {
            font_weight: FontWeight::Bold,
            ..PLAIN
        },
    ),
    (
        StyleSet::ITALIC,
        Presentation {
            italic: true,
            ..PLAIN
        },
    ),
    (
        StyleSet::STRIKETHROUGH,
        Presentation {
            line_through: true,
            ..PLAIN
        },
    ),
    (
        StyleSet::INLINE_CODE,
        Presentation {
            monospace: true,
            ..PLAIN
        },
    ),
    (
        StyleSet::QUOTE,
        Presentation {
            muted: true,
            ..PLAIN
        },
    ),
    (
        StyleSet::QUOTE_DELIMITER,
        Presentation {
            opacity: DIMMED,
            ..PLAIN
        },
    ),
    (
        StyleSet::HEADING_DELIMITER,
        Presentation {
            opacity: DIMMED,
            hanging: true,
            ..PLAIN
        },
    ),
    (
        StyleSet::UL_DELIMITER,
        Presentation {
            opacity: DIMMED,
            hanging: true,
            ..PLAIN
        },
    ),
    (
        StyleSet::OL_DELIMITER,
        Presentation {
            opacity: DIMMED,
            hanging: true,
            ..PLAIN
        },
    ),
    (
        StyleSet::MARKDOWN_DELIMITER,
        Presentation {
            opacity: DIMMED,
            ..PLAIN
        },
    ),
];

impl Default for Presentation {
    fn default() -> Self {
        PLAIN
    }
}

impl Presentation {
    pub fn is_plain(&self) -> bool {
        *self == PLAIN
    }

    /// Combine two presentations; the stronger attribute wins.
    pub fn merge(self, other: Presentation) -> Presentation {
        Presentation {
            font_weight: self.font_weight.max(other.font_weight),
            italic: self.italic || other.italic,
            line_through: self.line_through || other.line_through,
            monospace: self.monospace || other.monospace,
            muted: self.muted || other.muted,
            opacity: self.opacity.min(other.opacity),
            hanging: self.hanging || other.hanging,
        }
    }

    /// Inline CSS declarations; empty for plain text.
    pub fn css(&self) -> String {
        let mut out = String::new();
        if self.font_weight == FontWeight::Bold {
            out.push_str("font-weight:bold;");
        }
        if self.italic {
            out.push_str("font-style:italic;");
        }
        if self.line_through {
            out.push_str("text-decoration:line-through;");
        }
        if self.monospace {
            out.push_str("font-family:monospace;");
        }
        if self.muted {
            out.push_str("color:gray;");
        }
        if self.opacity < 100 {
            let _ = write!(out, "opacity:{}.{:02};", self.opacity / 100, self.opacity % 100);
        }
        if self.hanging {
            out.push_str("position:absolute;transform:translateX(-100%);");
        }
        out
    }
}

/// Presentation for a character carrying `styles`.
pub fn presentation(styles: StyleSet) -> Presentation {
    STYLE_MAP
        .iter()
        .filter(|(tag, _)| styles.contains(*tag))
        .fold(PLAIN, |acc, (_, p)| acc.merge(*p))
}

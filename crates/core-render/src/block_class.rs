//! Block type to block-level CSS class and HTML element.

use core_model::BlockType;

pub fn block_class(block_type: BlockType) -> &'static str {
    match block_type {
        BlockType::Paragraph => "md-paragraph",
        BlockType::Heading(level) => match level.get() {
            1 => "md-heading md-heading-1",
            2 => "md-heading md-heading-2",
            3 => "md-heading md-heading-3",
            4 => "md-heading md-heading-4",
            5 => "md-heading md-heading-5",
            _ => "md-heading md-heading-6",
        },
        BlockType::CodeBlock => "md-code-block",
        BlockType::Blockquote => "md-blockquote",
        BlockType::UnorderedListItem => "md-list-item md-unordered",
        BlockType::OrderedListItem => "md-list-item md-ordered",
    }
}

pub fn block_element(block_type: BlockType) -> &'static str {
    match block_type {
        BlockType::Paragraph => "p",
        BlockType::Heading(level) => match level.get() {
            1 => "h1",
            2 => "h2",
            3 => "h3",
            4 => "h4",
            5 => "h5",
            _ => "h6",
        },
        BlockType::CodeBlock => "pre",
        BlockType::Blockquote => "blockquote",
        BlockType::UnorderedListItem | BlockType::OrderedListItem => "li",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_model::HeadingLevel;

    #[test]
    fn headings_map_by_level() {
        for level in 1..=6u8 {
            let bt = BlockType::Heading(HeadingLevel::new(level).unwrap());
            assert_eq!(block_element(bt), format!("h{level}"));
            assert!(block_class(bt).ends_with(&format!("md-heading-{level}")));
        }
    }

    #[test]
    fn plain_and_code() {
        assert_eq!(block_class(BlockType::Paragraph), "md-paragraph");
        assert_eq!(block_element(BlockType::CodeBlock), "pre");
    }
}

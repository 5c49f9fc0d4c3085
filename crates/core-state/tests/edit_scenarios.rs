//! End-to-end editing scenarios through `EditorState::dispatch`.

use core_events::EditEvent;
use core_model::{BlockType, HeadingLevel, StyleSet, TextRange};
use core_state::EditorState;
use pretty_assertions::assert_eq;

fn load(text: &str) -> EditorState {
    let mut state = EditorState::default();
    state
        .dispatch(EditEvent::Load {
            text: text.to_string(),
        })
        .unwrap();
    state
}

#[test]
fn initial_load_styles_every_block() {
    let state = load("# Title\n**bold** and *it*\n> quote\n- item\n2. step");
    let blocks = state.document().blocks();
    assert_eq!(blocks[0].block_type(), BlockType::Heading(HeadingLevel::clamped(1)));
    assert!(blocks[1].has_style(TextRange::new(2, 5), StyleSet::BOLD));
    assert!(blocks[1].has_style(TextRange::new(14, 15), StyleSet::ITALIC));
    assert!(blocks[2].has_style(TextRange::new(0, 6), StyleSet::QUOTE));
    assert!(blocks[3].has_style(TextRange::new(0, 1), StyleSet::UL_DELIMITER));
    assert!(blocks[4].has_style(TextRange::new(0, 2), StyleSet::OL_DELIMITER));
}

#[test]
fn enter_after_heading_leaves_new_block_plain() {
    let mut state = load("# Title");
    let key = state.document().blocks()[0].key();
    state
        .dispatch(EditEvent::SplitBlock { block: key, offset: 7 })
        .unwrap();
    let blocks = state.document().blocks();
    assert_eq!(blocks.len(), 2);
    assert!(blocks[0].block_type().is_heading());
    assert_eq!(blocks[1].block_type(), BlockType::Paragraph);
    assert_eq!(state.document().selection().focus.block, blocks[1].key());
}

#[test]
fn deleting_hash_reverts_heading() {
    let mut state = load("## Sub");
    let key = state.document().blocks()[0].key();
    state
        .dispatch(EditEvent::DeleteText { block: key, start: 0, end: 3 })
        .unwrap();
    let block = &state.document().blocks()[0];
    assert_eq!(block.text(), "Sub");
    assert_eq!(block.block_type(), BlockType::Paragraph);
    assert!(block.styles().iter().all(|s| s.is_empty()));
}

#[test]
fn split_inside_bold_clears_trailing_delimiters() {
    let mut state = load("**bold**");
    let key = state.document().blocks()[0].key();
    state
        .dispatch(EditEvent::SplitBlock { block: key, offset: 6 })
        .unwrap();
    let blocks = state.document().blocks();
    assert_eq!(blocks[0].text(), "**bold");
    assert!(blocks[0].styles().iter().all(|s| s.is_empty()));
    assert_eq!(blocks[1].text(), "**");
}

#[test]
fn merge_rejoins_and_restyles() {
    let mut state = load("**bo\nld**");
    let second = state.document().blocks()[1].key();
    state.dispatch(EditEvent::MergeBlock { block: second }).unwrap();
    let block = &state.document().blocks()[0];
    assert_eq!(block.text(), "**bold**");
    assert!(block.has_style(TextRange::new(2, 5), StyleSet::BOLD));
}

#[test]
fn paste_restyles_all_new_blocks() {
    let mut state = load("x");
    let key = state.document().blocks()[0].key();
    state
        .dispatch(EditEvent::Paste {
            block: key,
            offset: 1,
            text: "\n# Pasted\n~~gone~~".into(),
        })
        .unwrap();
    let blocks = state.document().blocks();
    assert_eq!(blocks.len(), 3);
    assert!(blocks[1].block_type().is_heading());
    assert!(blocks[2].has_style(TextRange::new(2, 5), StyleSet::STRIKETHROUGH));
    assert_eq!(state.take_dirty().len(), 3);
}

#[test]
fn fenced_code_built_with_soft_breaks() {
    let mut state = load("```");
    let key = state.document().blocks()[0].key();
    state.dispatch(EditEvent::SoftBreak { block: key, offset: 3 }).unwrap();
    state
        .dispatch(EditEvent::InsertText { block: key, offset: 4, text: "let `x` = 1;".into() })
        .unwrap();
    assert_eq!(state.document().blocks()[0].block_type(), BlockType::Paragraph);
    state.dispatch(EditEvent::SoftBreak { block: key, offset: 16 }).unwrap();
    state
        .dispatch(EditEvent::InsertText { block: key, offset: 17, text: "```".into() })
        .unwrap();
    let block = &state.document().blocks()[0];
    assert_eq!(block.block_type(), BlockType::CodeBlock);
    assert!(block.styles().iter().all(|s| !s.contains(StyleSet::INLINE_CODE)));
}

#[test]
fn seven_hashes_clamp_to_level_six() {
    let state = load("####### deep");
    assert_eq!(
        state.document().blocks()[0].block_type(),
        BlockType::Heading(HeadingLevel::clamped(6))
    );
    assert!(state.document().blocks()[0].has_style(TextRange::new(0, 7), StyleSet::HEADING_DELIMITER));
}

#[test]
fn external_code_type_clears_inline_code() {
    let mut state = load("`code`\n# Title");
    let key = state.document().blocks()[0].key();
    assert!(state.document().blocks()[0].style_at(1).contains(StyleSet::INLINE_CODE));
    state
        .dispatch(EditEvent::SetBlockType {
            block: key,
            block_type: BlockType::CodeBlock,
        })
        .unwrap();
    let blocks = state.document().blocks();
    assert_eq!(blocks[0].block_type(), BlockType::CodeBlock);
    assert!(blocks[0].styles().iter().all(|s| !s.contains(StyleSet::INLINE_CODE)));
    assert_eq!(blocks[1].block_type(), BlockType::Heading(HeadingLevel::clamped(1)));
    assert!(blocks[1].style_at(0).contains(StyleSet::HEADING_DELIMITER));
}

#[test]
fn external_paragraph_type_clears_heading_delimiter() {
    let mut state = load("## x");
    let key = state.document().blocks()[0].key();
    state.take_dirty();
    state
        .dispatch(EditEvent::SetBlockType {
            block: key,
            block_type: BlockType::Paragraph,
        })
        .unwrap();
    let block = &state.document().blocks()[0];
    assert_eq!(block.block_type(), BlockType::Paragraph);
    assert!(block.style_at(0).is_empty());
    assert_eq!(state.take_dirty(), vec![key]);
}

#[test]
fn enter_on_fence_line_keeps_one_block() {
    let mut state = load("```");
    let key = state.document().blocks()[0].key();
    state
        .dispatch(EditEvent::SplitBlock { block: key, offset: 3 })
        .unwrap();
    let blocks = state.document().blocks();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].text(), "```\n");
    assert_eq!(state.document().selection().focus.block, key);
}

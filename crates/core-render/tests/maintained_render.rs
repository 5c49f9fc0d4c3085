//! Rendering documents produced by the maintenance engine.

use core_events::EditEvent;
use core_model::{BlockKey, Document, StyleSet};
use core_render::{HtmlRenderer, presentation, style_runs};
use core_state::{EditorState, StyleMaintenanceEngine};
use proptest::prelude::*;
use std::collections::HashMap;

fn maintained(text: &str) -> Document {
    StyleMaintenanceEngine::default()
        .maintain(&Document::from_text(text))
        .document
}

#[test]
fn heading_quote_and_list_render() {
    let doc = maintained("# Title\n> said @alice\n- one\n- two");
    let users = HashMap::from([("alice".to_string(), "Alice".to_string())]);
    let html = HtmlRenderer::new(users).render_document(&doc);
    assert!(html.contains("<h1 class=\"md-heading md-heading-1\""));
    assert!(html.contains(
        "<span class=\"md-syntax-block\" style=\"opacity:0.40;position:absolute;transform:translateX(-100%);\"># </span>"
    ));
    assert!(html.contains("data-user=\"alice\">@Alice</span>"));
    // List markers are styled, but the blocks stay paragraphs.
    assert!(!html.contains("<ul>"));
    assert_eq!(html.matches("md-paragraph").count(), 3);
}

#[test]
fn heading_delimiter_presentation_hangs() {
    let doc = maintained("## Sub");
    let runs = style_runs(&doc.blocks()[0]);
    assert_eq!(runs[0].styles, StyleSet::HEADING_DELIMITER);
    assert!(presentation(runs[0].styles).hanging);
    assert!(runs[1].styles.is_empty());
}

#[test]
fn dirty_blocks_rerender_alone() {
    let mut state = EditorState::default();
    state
        .dispatch(EditEvent::Load {
            text: "# Title\nplain".to_string(),
        })
        .unwrap();
    state.take_dirty();
    let key = state.document().blocks()[1].key();
    state
        .dispatch(EditEvent::InsertText {
            block: key,
            offset: 0,
            text: "*".to_string(),
        })
        .unwrap();
    state
        .dispatch(EditEvent::InsertText {
            block: key,
            offset: 6,
            text: "*".to_string(),
        })
        .unwrap();

    let mut dirty = state.take_dirty();
    assert_eq!(dirty, vec![key]);
    dirty.push(BlockKey(999));
    let rendered = HtmlRenderer::new(()).render_blocks(state.document(), &dirty);
    assert_eq!(rendered.len(), 1);
    assert_eq!(rendered[0].0, key);
    assert!(rendered[0].1.contains("<span style=\"font-style:italic;\">plain</span>"));
}

proptest! {
    #[test]
    fn runs_tile_every_block(text in "[a-z *_~`#>\\-1.\n]{0,60}") {
        let doc = maintained(&text);
        for block in doc.blocks() {
            let runs = style_runs(block);
            let mut next = 0;
            for (i, run) in runs.iter().enumerate() {
                prop_assert_eq!(run.range.start, next);
                prop_assert!(run.range.end >= run.range.start);
                if i > 0 {
                    prop_assert_ne!(runs[i - 1].styles, run.styles);
                }
                next = run.range.end + 1;
            }
            prop_assert_eq!(next, block.len());
        }
    }
}

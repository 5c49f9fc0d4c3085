//! HTML rendering with injected user resolution.
//!
//! `@username` mentions in ordinary text are replaced by the user's display
//! name when the [`UserResolver`] knows the user; unknown names, code, and
//! delimiter runs are left as written.

use crate::block_class::{block_class, block_element};
use crate::presentation::presentation;
use crate::runs::style_runs;
use core_model::{Block, BlockKey, BlockType, Document, StyleSet};
use core_text::CharIndex;
use pulldown_cmark_escape::escape_html;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::trace;

static MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@([A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9_-])?)")
        .expect("mention pattern must compile")
});

const INLINE_SYNTAX: StyleSet = StyleSet::MARKDOWN_DELIMITER;
const BLOCK_SYNTAX: StyleSet = StyleSet::QUOTE_DELIMITER
    .union(StyleSet::HEADING_DELIMITER)
    .union(StyleSet::UL_DELIMITER)
    .union(StyleSet::OL_DELIMITER);

/// Looks up display names for `@mentions`.
pub trait UserResolver {
    fn display_name(&self, username: &str) -> Option<String>;
}

/// Unit type implementation - mentions stay as written.
impl UserResolver for () {
    fn display_name(&self, _username: &str) -> Option<String> {
        None
    }
}

impl<T: UserResolver> UserResolver for &T {
    fn display_name(&self, username: &str) -> Option<String> {
        (*self).display_name(username)
    }
}

impl<T: UserResolver> UserResolver for Option<T> {
    fn display_name(&self, username: &str) -> Option<String> {
        self.as_ref().and_then(|r| r.display_name(username))
    }
}

impl UserResolver for HashMap<String, String> {
    fn display_name(&self, username: &str) -> Option<String> {
        self.get(username).cloned()
    }
}

#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer<R: UserResolver> {
    resolver: R,
}

impl<R: UserResolver> HtmlRenderer<R> {
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// One block as a single element.
    pub fn render_block(&self, block: &Block) -> String {
        let element = block_element(block.block_type());
        let mut out = format!(
            "<{element} class=\"{}\" data-block=\"{}\">",
            block_class(block.block_type()),
            block.key()
        );
        let code = block.block_type() == BlockType::CodeBlock;
        if code {
            out.push_str("<code>");
        }
        let index = CharIndex::new(block.text());
        for run in style_runs(block) {
            let text = &block.text()[index.byte_at_char(run.range.start)..index.byte_at_char(run.range.end + 1)];
            let css = presentation(run.styles).css();
            let syntax_class = if run.styles.intersects(BLOCK_SYNTAX) {
                Some("md-syntax-block")
            } else if run.styles.intersects(INLINE_SYNTAX) {
                Some("md-syntax-inline")
            } else {
                None
            };
            let resolve = !code && syntax_class.is_none() && !run.styles.contains(StyleSet::INLINE_CODE);

            if css.is_empty() && syntax_class.is_none() {
                self.write_text(&mut out, text, resolve);
                continue;
            }
            out.push_str("<span");
            if let Some(class) = syntax_class {
                out.push_str(" class=\"");
                out.push_str(class);
                out.push('"');
            }
            if !css.is_empty() {
                out.push_str(" style=\"");
                out.push_str(&css);
                out.push('"');
            }
            out.push('>');
            self.write_text(&mut out, text, resolve);
            out.push_str("</span>");
        }
        if code {
            out.push_str("</code>");
        }
        out.push_str("</");
        out.push_str(element);
        out.push('>');
        out
    }

    /// Whole document. Consecutive list items are wrapped in `<ul>`/`<ol>`.
    pub fn render_document(&self, doc: &Document) -> String {
        let mut out = String::new();
        let mut open_list: Option<&'static str> = None;
        for block in doc.blocks() {
            let list = match block.block_type() {
                BlockType::UnorderedListItem => Some("ul"),
                BlockType::OrderedListItem => Some("ol"),
                _ => None,
            };
            if open_list != list {
                if let Some(tag) = open_list {
                    out.push_str("</");
                    out.push_str(tag);
                    out.push_str(">\n");
                }
                if let Some(tag) = list {
                    out.push('<');
                    out.push_str(tag);
                    out.push_str(">\n");
                }
                open_list = list;
            }
            out.push_str(&self.render_block(block));
            out.push('\n');
        }
        if let Some(tag) = open_list {
            out.push_str("</");
            out.push_str(tag);
            out.push_str(">\n");
        }
        out
    }

    /// Render only `keys`, in the given order; unknown keys are skipped.
    pub fn render_blocks(&self, doc: &Document, keys: &[BlockKey]) -> Vec<(BlockKey, String)> {
        keys.iter()
            .filter_map(|&key| doc.block(key).map(|b| (key, self.render_block(b))))
            .collect()
    }

    fn write_text(&self, out: &mut String, text: &str, resolve: bool) {
        if !resolve {
            push_escaped(out, text);
            return;
        }
        let mut last = 0;
        for caps in MENTION.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            // `a@b` is an address, not a mention.
            if text[..whole.start()]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_alphanumeric())
            {
                continue;
            }
            let Some(display) = self.resolver.display_name(name.as_str()) else {
                trace!(target: "render.mention", username = name.as_str(), "mention_unresolved");
                continue;
            };
            push_escaped(out, &text[last..whole.start()]);
            out.push_str("<span class=\"md-mention\" data-user=\"");
            push_escaped(out, name.as_str());
            out.push_str("\">@");
            push_escaped(out, &display);
            out.push_str("</span>");
            last = whole.end();
        }
        push_escaped(out, &text[last..]);
    }
}

/// Append `text` to `out` with HTML special characters escaped.
fn push_escaped(out: &mut String, text: &str) {
    // Writes into a `String` are infallible.
    if let Err(never) = escape_html(&mut *out, text) {
        match never {
            std::fmt::Error => unreachable!("writes into a String are infallible"),
        }
    }
}

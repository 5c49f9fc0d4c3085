//! Document model for the live markdown editor.
//!
//! A `Document` is an ordered list of persistent `Block`s. Each block owns
//! its text, a `BlockType` and a per-character `StyleSet` annotation list of
//! exactly the same length as its text. Edits go through `Document` methods,
//! which record the `ChangeKind` the maintenance pass uses to decide which
//! blocks to rescan. Annotations themselves are only ever replaced wholesale
//! (`Block::restyled`), never patched in place.

mod block;
mod document;
mod error;
mod style;

pub use block::{Block, BlockKey};
pub use document::{Caret, ChangeKind, Document, Selection};
pub use error::ModelError;
pub use style::{BlockType, HeadingLevel, StyleSet};

pub use core_text::TextRange;

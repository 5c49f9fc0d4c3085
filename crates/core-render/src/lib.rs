//! Presentation of maintained documents.
//!
//! The maintenance engine only produces per-character tag sets and block
//! types. This crate maps them to something displayable:
//! - `presentation`: the custom style map (tag set -> visual attributes),
//! - `block_class`: block type -> block-level CSS class and element,
//! - `runs`: per-character tag sets collapsed into contiguous runs,
//! - `html`: block and document HTML, with `@mentions` resolved through an
//!   injected [`UserResolver`].

pub mod block_class;
pub mod html;
pub mod presentation;
pub mod runs;

pub use block_class::{block_class, block_element};
pub use html::{HtmlRenderer, UserResolver};
pub use presentation::{FontWeight, Presentation, presentation};
pub use runs::{StyleRun, style_runs};

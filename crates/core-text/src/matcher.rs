//! Range matcher: exhaustive, non-overlapping pattern search reported in
//! char coordinates.
//!
//! Contract:
//! * Results are ordered left to right and never overlap.
//! * The search always makes forward progress: an accepted match resumes at
//!   its end, a rejected or zero-length candidate resumes one char past the
//!   candidate start. A pattern that can match the empty string therefore
//!   terminates instead of spinning.
//! * No state survives a call; the same `Pattern` may be used concurrently on
//!   unrelated texts.
//!
//! The `regex` crate has no look-around, so a `Guard` can veto a candidate
//! after the fact (for example "this `*` must not touch another `*`").

use crate::{CharIndex, TextRange};
use regex::Regex;
use std::ops::Range;

/// Post-match filter. Receives the full text and the byte span of the whole
/// match (group 0); returns `false` to reject the candidate.
pub type Guard = fn(&str, Range<usize>) -> bool;

/// A compiled markdown construct matcher.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
    group: usize,
    guard: Option<Guard>,
}

impl Pattern {
    /// Report whole-match spans.
    pub fn new(regex: Regex) -> Self {
        Self {
            regex,
            group: 0,
            guard: None,
        }
    }

    /// Report the span of capture `group` instead of the whole match. A
    /// candidate whose group did not participate is skipped.
    pub fn group(mut self, group: usize) -> Self {
        self.group = group;
        self
    }

    pub fn guard(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }
}

/// Find every non-overlapping occurrence of `pattern` in `text`.
pub fn find_ranges(text: &str, pattern: &Pattern) -> Vec<TextRange> {
    let mut out = Vec::new();
    if text.is_empty() {
        return out;
    }
    let index = CharIndex::new(text);
    let mut pos = 0usize;
    while pos <= text.len() {
        let Some(caps) = pattern.regex.captures_at(text, pos) else {
            break;
        };
        let Some(whole) = caps.get(0) else {
            break;
        };
        let accepted = whole.end() > whole.start()
            && pattern
                .guard
                .is_none_or(|guard| guard(text, whole.start()..whole.end()));
        let reported = caps.get(pattern.group).filter(|m| m.end() > m.start());
        match (accepted, reported) {
            (true, Some(m)) => {
                let start = index.char_at_byte(m.start());
                let end = index.char_at_byte(m.end());
                if let Some(range) = TextRange::from_exclusive(start, end) {
                    out.push(range);
                }
                pos = whole.end();
            }
            _ => {
                // Step one char past the candidate start.
                let next_char = index.char_at_byte(whole.start()) + 1;
                if next_char > index.char_len() {
                    break;
                }
                pos = index.byte_at_char(next_char);
            }
        }
    }
    out
}

use thiserror::Error;

/// Failures inside a maintenance pass. Never surfaced to the user: the pass
/// logs them and keeps the rest of the block's styling.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StyleError {
    #[error("strategy {strategy} produced range {start}..={end} outside text of length {len}")]
    RangeOutOfBounds {
        strategy: &'static str,
        start: usize,
        end: usize,
        len: usize,
    },
}

use crate::block::BlockKey;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("unknown block {0}")]
    UnknownBlock(BlockKey),
    #[error("offset {offset} out of range for block {block} (len {len})")]
    OffsetOutOfRange {
        block: BlockKey,
        offset: usize,
        len: usize,
    },
    #[error("block {0} has no previous block to merge into")]
    NothingToMerge(BlockKey),
    #[error("annotation length {actual} does not match text length {expected} in block {block}")]
    AnnotationLength {
        block: BlockKey,
        expected: usize,
        actual: usize,
    },
}

use thiserror::Error;

use crate::editing::BlockId;

/// Errors surfaced by document operations.
///
/// `NotFound` is recoverable: the id may have raced with a deletion, so
/// callers ignore the operation. `InvariantViolation` rejects the mutation
/// and leaves the document untouched. `IndexOutOfBounds` indicates a
/// programming error in the host and should not occur from valid input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("No block with id {0} in this document")]
    NotFound(BlockId),

    #[error("Document invariant violated: {0}")]
    InvariantViolation(&'static str),

    #[error("Index {index} out of range for document of {len} blocks")]
    IndexOutOfBounds { index: isize, len: usize },

    #[error("Unknown block kind: {0}")]
    UnknownType(String),
}

//! Error types for [`HashList`](crate::HashList).

/// Alias for `Result<T, HashListError>`.
pub type HashListResult<T> = Result<T, HashListError>;

/// Failures of [`HashList`](crate::HashList) operations.
///
/// A key collision on `add`, `insert` or `replace` is an ordinary outcome and
/// is reported through the return value, not through this type.
#[non_exhaustive]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HashListError {
    /// Two elements of the adopted input map to the same key.
    ///
    /// `position` is the input position of the first element whose key was
    /// already taken.
    #[error("duplicate key for the element at position {position}")]
    DuplicateKey { position: usize },

    /// A position lies outside the valid bounds.
    #[error("position {index} is out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// `start + count` lies beyond the end of the list.
    #[error("range of {count} starting at {start} is out of range for length {len}")]
    RangeOutOfRange {
        start: usize,
        count: usize,
        len: usize,
    },

    /// An indexer for this key type is already attached.
    #[error("an indexer keyed by `{key_type}` already exists")]
    DuplicateIndexer { key_type: &'static str },
}

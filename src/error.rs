//! Errors reported by a sort call.

use std::fmt;

/// The only recoverable failure of a sort call.
///
/// A failed call leaves the sequence as some permutation of its input. Partial progress is not
/// undone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortError {
    /// The merge buffer had to grow and the allocation failed, or the growth was refused by the
    /// limit set with [`MergeSort::with_buffer_limit`](crate::MergeSort::with_buffer_limit).
    OutOfMemory {
        /// Size in bytes the buffer would have needed.
        bytes: usize,
    },
}

impl fmt::Display for SortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortError::OutOfMemory { bytes } => {
                write!(f, "out of memory: merge buffer needs {} bytes", bytes)
            }
        }
    }
}

impl std::error::Error for SortError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_requested_size() {
        let err = SortError::OutOfMemory { bytes: 4096 };
        assert_eq!(err.to_string(), "out of memory: merge buffer needs 4096 bytes");
    }
}

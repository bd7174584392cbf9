//! Allocation error types.

use std::error::Error;
use std::fmt;

/// Errors an [`AllocPolicy`](crate::AllocPolicy) can report.
///
/// Buffers never retry: the error is handed back to the caller and the
/// buffer that requested the block is left exactly as it was before the call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// The requested element count does not fit in a valid `Layout`.
    CapacityOverflow {
        /// Number of elements requested.
        requested: usize,
    },
    /// The underlying allocator returned null.
    OutOfMemory {
        /// Size of the rejected request in bytes.
        size: usize,
        /// Alignment of the rejected request in bytes.
        align: usize,
    },
    /// A budgeted policy refused the request.
    LimitExceeded {
        /// Size of the rejected request in bytes.
        requested: usize,
        /// Bytes still available under the budget.
        remaining: usize,
    },
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityOverflow { requested } => {
                write!(f, "capacity overflow: {requested} elements do not fit a layout")
            }
            Self::OutOfMemory { size, align } => {
                write!(f, "out of memory: {size} bytes at alignment {align}")
            }
            Self::LimitExceeded {
                requested,
                remaining,
            } => {
                write!(
                    f,
                    "allocation limit exceeded: requested {requested} bytes, {remaining} bytes remaining"
                )
            }
        }
    }
}

impl Error for AllocError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_sizes() {
        let err = AllocError::LimitExceeded {
            requested: 64,
            remaining: 16,
        };
        let msg = err.to_string();
        assert!(msg.contains("64"));
        assert!(msg.contains("16"));
    }

    #[test]
    fn overflow_display() {
        let err = AllocError::CapacityOverflow {
            requested: usize::MAX,
        };
        assert!(err.to_string().starts_with("capacity overflow"));
    }
}

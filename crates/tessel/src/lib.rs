//! Tessel: exclusively-owned contiguous buffers.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the Tessel sub-crates. For most users, adding `tessel` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use tessel::prelude::*;
//!
//! let mut samples = buffer![3, 1, 4, 1, 5];
//! assert_eq!(samples.len(), 5);
//!
//! // Every resize moves the contents into a block of exactly the new size.
//! samples.resize_filled(8, 9).unwrap();
//! assert_eq!(samples, [3, 1, 4, 1, 5, 9, 9, 9]);
//!
//! // Cursors are contiguous random-access positions.
//! let third = samples.begin() + 2;
//! assert_eq!(*third, 4);
//! assert_eq!(third[1], 1);
//! assert_eq!(samples.end() - third, 6);
//!
//! // Reverse cursors walk from the last element toward the first.
//! let tail: Vec<i32> = samples.rcursors().take(3).copied().collect();
//! assert_eq!(tail, [9, 9, 9]);
//!
//! // Ordering is length-first.
//! assert!(samples > buffer![100, 100]);
//!
//! // Moving out leaves the canonical empty state behind.
//! let moved = samples.take();
//! assert!(samples.is_empty() && !samples.has_storage());
//! assert_eq!(moved.len(), 8);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`policy`] | `tessel-core` | `AllocPolicy`, `Global`, `AllocError`, contract checks |
//! | [`buffers`] | `tessel-buffer` | `DynamicBuffer`, `UninitBuffer`, cursors and walks |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Allocation policies, errors, and contract checks (`tessel-core`).
///
/// Implement [`policy::AllocPolicy`] to control where buffer blocks come
/// from and how elements are placed into them.
pub use tessel_core as policy;

/// Buffers, the uninitialized builder, and cursors (`tessel-buffer`).
pub use tessel_buffer as buffers;

/// Common imports for typical Tessel usage.
///
/// ```rust
/// use tessel::prelude::*;
/// ```
pub mod prelude {
    // Buffers
    pub use tessel_buffer::{buffer, swap, DynamicBuffer, UninitBuffer};

    // Cursors
    pub use tessel_buffer::{Cursor, CursorMut, Cursors, CursorsMut, RevCursor, RevCursorMut};

    // Policies and errors
    pub use tessel_core::{AllocError, AllocPolicy, Global};
}

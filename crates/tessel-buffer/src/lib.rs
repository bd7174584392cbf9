//! Exclusively-owned contiguous buffers for Tessel.
//!
//! A [`DynamicBuffer`] owns a heap block holding exactly `len` live
//! elements. Its length only changes when it is explicitly resized, and a
//! resize always moves the contents into a freshly allocated block: there
//! is no spare capacity.
//!
//! # Architecture
//!
//! ```text
//! DynamicBuffer<T, A: AllocPolicy>
//! ├── raw          (allocate / construct / destroy / release blocks)
//! ├── buffer       (construction, drop, swap, take, clone)
//! ├── access       (bounds-checked indexing, move-out)
//! ├── compare      (element-wise equality, length-first ordering)
//! ├── resize       (always-reallocating resize)
//! ├── uninit       (UninitBuffer: raw slots until every slot is built)
//! └── cursor/walk  (Cursor, CursorMut × Forward, Reverse; range iterators)
//! ```
//!
//! # Canonical empty state
//!
//! A buffer with no elements never holds an allocation: storage is present
//! if and only if `len > 0`. Default construction, [`DynamicBuffer::take`],
//! resizing to zero, and drop all land in that single representation.
//!
//! # Ordering
//!
//! Buffers compare equal element-wise, but order *length first*: buffers of
//! different lengths are ordered by length alone, and any comparison with a
//! buffer that has no storage is unordered, even though two empty buffers
//! are equal.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod access;
pub mod buffer;
mod compare;
pub mod cursor;
mod raw;
mod resize;
pub mod uninit;
pub mod walk;

// Public re-exports for the primary API surface.
pub use buffer::{swap, DynamicBuffer};
pub use cursor::{
    Cursor, CursorMut, Direction, Forward, RevCursor, RevCursorMut, Reverse,
};
pub use tessel_core::{AllocError, AllocPolicy, Global};
pub use uninit::UninitBuffer;
pub use walk::{Cursors, CursorsMut};

/// Build a [`DynamicBuffer`] from a list of values, or from one value
/// repeated `n` times.
///
/// ```
/// use tessel_buffer::buffer;
///
/// let digits = buffer![0, 1, 2, 3];
/// assert_eq!(digits.len(), 4);
///
/// let zeros = buffer![0u8; 3];
/// assert_eq!(zeros, [0, 0, 0]);
/// ```
///
/// # Panics
///
/// Panics if the allocation fails.
#[macro_export]
macro_rules! buffer {
    () => {
        $crate::DynamicBuffer::new()
    };
    ($elem:expr; $n:expr) => {
        match $crate::DynamicBuffer::filled($n, $elem) {
            Ok(built) => built,
            Err(err) => panic!("buffer! allocation failed: {err}"),
        }
    };
    ($($x:expr),+ $(,)?) => {
        $crate::DynamicBuffer::from([$($x),+])
    };
}

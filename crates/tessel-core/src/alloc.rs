//! Allocation policies.
//!
//! An [`AllocPolicy`] owns every memory decision a buffer makes: where a
//! block comes from, how an element is placed into a slot, how it is torn
//! down again, which policy instance a copy of the buffer should use, and
//! whether the policy travels with the storage on swap.

use std::alloc::Layout;
use std::ptr::{self, NonNull};

use crate::error::AllocError;

/// Injectable allocation strategy for buffers.
///
/// Implementations are free to keep state (pools, counters, budgets) and
/// are reached through `&self`, so stateful policies use interior
/// mutability. Buffers only ever ask for non-zero-sized layouts.
pub trait AllocPolicy {
    /// Whether the policy instance is exchanged along with the storage
    /// when two buffers are swapped.
    ///
    /// When `false`, swapping is only meaningful between buffers whose
    /// policies are [`interchangeable`](AllocPolicy::interchangeable).
    const PROPAGATE_ON_SWAP: bool = false;

    /// Allocate a block for `layout`.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Release a block previously returned by [`allocate`](AllocPolicy::allocate).
    ///
    /// # Safety
    ///
    /// `ptr` must come from `allocate` on this policy (or one
    /// interchangeable with it) with the same `layout`, and must not have
    /// been released already.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

    /// Place `value` into the raw slot at `slot`.
    ///
    /// # Safety
    ///
    /// `slot` must be valid for writes and must not hold a live value.
    unsafe fn construct<T>(&self, slot: NonNull<T>, value: T) {
        // SAFETY: the caller guarantees `slot` is writable and vacant.
        unsafe { slot.as_ptr().write(value) }
    }

    /// Drop the live value at `slot`, leaving it raw.
    ///
    /// # Safety
    ///
    /// `slot` must hold a live value that is not used again.
    unsafe fn destroy<T>(&self, slot: NonNull<T>) {
        // SAFETY: the caller guarantees `slot` holds a live value.
        unsafe { ptr::drop_in_place(slot.as_ptr()) }
    }

    /// The policy instance a copy of a buffer using `self` should allocate with.
    ///
    /// This need not be a verbatim duplicate of `self`.
    fn select_on_copy(&self) -> Self
    where
        Self: Sized;

    /// Whether blocks allocated by `self` may be released by `other`.
    fn interchangeable(&self, other: &Self) -> bool
    where
        Self: Sized,
    {
        let _ = other;
        true
    }
}

/// The process-wide allocator behind `std::alloc`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Global;

impl AllocPolicy for Global {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        if layout.size() == 0 {
            return Ok(dangling(layout));
        }
        // SAFETY: `layout` has a non-zero size.
        let raw = unsafe { std::alloc::alloc(layout) };
        NonNull::new(raw).ok_or_else(|| {
            tracing::debug!(
                size = layout.size(),
                align = layout.align(),
                "global allocation failed"
            );
            AllocError::OutOfMemory {
                size: layout.size(),
                align: layout.align(),
            }
        })
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() != 0 {
            // SAFETY: forwarded from the caller's contract.
            unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) }
        }
    }

    fn select_on_copy(&self) -> Self {
        Global
    }
}

/// Layout of a contiguous run of `len` values of `T`.
pub fn array_layout<T>(len: usize) -> Result<Layout, AllocError> {
    Layout::array::<T>(len).map_err(|_| AllocError::CapacityOverflow { requested: len })
}

/// A well-aligned, non-null address that owns no memory.
pub fn dangling(layout: Layout) -> NonNull<u8> {
    // Alignments are non-zero powers of two.
    NonNull::new(ptr::null_mut::<u8>().wrapping_add(layout.align())).unwrap_or(NonNull::dangling())
}

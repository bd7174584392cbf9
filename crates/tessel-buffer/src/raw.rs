//! Low-level block primitives shared by every buffer operation.
//!
//! A block is `Option<NonNull<T>>` plus the slot count it was allocated
//! with: `None` is the null block and is the only representation of zero
//! slots. Every `unsafe` operation in this crate bottoms out here or in the
//! cursor skeleton, and each carries a `// SAFETY:` comment.

use std::mem;
use std::ops::Range;
use std::ptr::NonNull;

use tessel_core::alloc::array_layout;
use tessel_core::contract::{self, ContractKind};
use tessel_core::{AllocError, AllocPolicy};

/// Allocate raw storage for `len` slots. Zero slots allocate nothing.
pub(crate) fn allocate<T, A: AllocPolicy>(
    alloc: &A,
    len: usize,
) -> Result<Option<NonNull<T>>, AllocError> {
    if len == 0 {
        return Ok(None);
    }
    let layout = array_layout::<T>(len)?;
    if layout.size() == 0 {
        return Ok(Some(NonNull::dangling()));
    }
    Ok(Some(alloc.allocate(layout)?.cast()))
}

/// Release a block of `len` slots without touching its contents.
///
/// # Safety
///
/// `block` must have come from [`allocate`] (or an adopted block with the
/// same layout) on a policy interchangeable with `alloc`, for exactly `len`
/// slots, and every slot must already be raw.
pub(crate) unsafe fn release<T, A: AllocPolicy>(alloc: &A, block: Option<NonNull<T>>, len: usize) {
    let Some(block) = block else {
        return;
    };
    // The layout was valid when the block was allocated.
    let Ok(layout) = array_layout::<T>(len) else {
        return;
    };
    if layout.size() != 0 {
        // SAFETY: forwarded from the caller's contract.
        unsafe { alloc.deallocate(block.cast(), layout) }
    }
}

/// Destroy the live slots in `range`, ascending.
///
/// # Safety
///
/// Every slot in `range` must be in bounds of `block` and hold a live value.
pub(crate) unsafe fn destroy_range<T, A: AllocPolicy>(
    alloc: &A,
    block: NonNull<T>,
    range: Range<usize>,
) {
    for index in range {
        // SAFETY: in bounds and live per the caller's contract.
        unsafe { alloc.destroy(block.add(index)) }
    }
}

/// A block being filled front to back.
///
/// Slots `start..next` are live. If construction is abandoned (a panic in a
/// constructor, a failed contract) the live slots are destroyed and the
/// block is released, so a half-built buffer is never observable.
pub(crate) struct PartialBlock<'a, T, A: AllocPolicy> {
    alloc: &'a A,
    block: Option<NonNull<T>>,
    len: usize,
    start: usize,
    next: usize,
}

impl<'a, T, A: AllocPolicy> PartialBlock<'a, T, A> {
    /// Allocate `len` raw slots, to be filled from slot 0.
    pub(crate) fn new(alloc: &'a A, len: usize) -> Result<Self, AllocError> {
        Self::starting_at(alloc, len, 0)
    }

    /// Allocate `len` raw slots, to be filled from slot `start`.
    ///
    /// Slots before `start` are the caller's responsibility.
    pub(crate) fn starting_at(alloc: &'a A, len: usize, start: usize) -> Result<Self, AllocError> {
        let block = allocate::<T, A>(alloc, len)?;
        Ok(Self {
            alloc,
            block,
            len,
            start,
            next: start,
        })
    }

    /// Construct `value` in the next raw slot.
    #[track_caller]
    pub(crate) fn push(&mut self, value: T) {
        let block = match self.block {
            Some(block) if self.next < self.len => block,
            _ => contract::violated(ContractKind::Precondition, "next < len"),
        };
        // SAFETY: `next < len`, and slots at or past `next` are raw.
        unsafe { self.alloc.construct(block.add(self.next), value) };
        self.next += 1;
    }

    /// Hand over the block once every slot from `start` on is live.
    #[track_caller]
    pub(crate) fn finish(self) -> Option<NonNull<T>> {
        if self.next != self.len {
            contract::violated(ContractKind::Postcondition, "next == len");
        }
        let block = self.block;
        mem::forget(self);
        block
    }
}

impl<T, A: AllocPolicy> Drop for PartialBlock<'_, T, A> {
    fn drop(&mut self) {
        if let Some(block) = self.block.take() {
            // SAFETY: exactly `start..next` were constructed by `push`, and
            // the block came from `allocate` with `len` slots. Slots before
            // `start` were never written by this guard.
            unsafe {
                destroy_range(self.alloc, block, self.start..self.next);
                release(self.alloc, Some(block), self.len);
            }
        }
    }
}

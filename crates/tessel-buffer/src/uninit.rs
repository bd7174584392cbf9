//! Raw slots that become a buffer once every slot is constructed.
//!
//! [`UninitBuffer`] is the only way to hold allocated-but-unconstructed
//! storage. Its raw slots are `MaybeUninit<T>` and are never exposed as
//! `T`; a [`DynamicBuffer`] comes out of it either through
//! [`finish`](UninitBuffer::finish), once every slot was filled through the
//! builder, or through the `unsafe` [`assume_init`](UninitBuffer::assume_init)
//! after a bulk fill via [`spare_slots_mut`](UninitBuffer::spare_slots_mut).

use std::fmt;
use std::mem::{self, MaybeUninit};
use std::ptr::{self, NonNull};
use std::slice;

use tessel_core::{AllocError, AllocPolicy, Global};

use crate::buffer::DynamicBuffer;
use crate::raw;

/// Allocated storage for `len` elements, filled front to back.
///
/// Slots `0..filled` hold values constructed through the builder; the rest
/// are raw. Dropping an unfinished builder destroys the filled slots and
/// releases the block.
pub struct UninitBuffer<T, A: AllocPolicy = Global> {
    alloc: A,
    data: Option<NonNull<T>>,
    len: usize,
    filled: usize,
}

impl<T, A: AllocPolicy> UninitBuffer<T, A> {
    pub(crate) fn allocate(len: usize, alloc: A) -> Result<Self, AllocError> {
        let data = raw::allocate::<T, A>(&alloc, len)?;
        Ok(Self {
            alloc,
            data,
            len,
            filled: 0,
        })
    }

    /// Total number of slots.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether there are no slots at all.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots constructed so far.
    pub fn filled(&self) -> usize {
        self.filled
    }

    /// Whether every slot has been constructed.
    pub fn is_complete(&self) -> bool {
        self.filled == self.len
    }

    /// Pointer to slot 0, or null when there are no slots.
    pub fn as_ptr(&self) -> *const T {
        self.data.map_or(ptr::null(), |block| block.as_ptr().cast_const())
    }

    /// Construct `value` in the next raw slot.
    ///
    /// Hands `value` back if every slot is already filled.
    pub fn push(&mut self, value: T) -> Result<(), T> {
        match self.data {
            Some(block) if self.filled < self.len => {
                // SAFETY: `filled < len`, and slot `filled` is raw.
                unsafe { self.alloc.construct(block.add(self.filled), value) };
                self.filled += 1;
                Ok(())
            }
            _ => Err(value),
        }
    }

    /// Construct every remaining slot from `make(index)`, ascending.
    pub fn fill_with(&mut self, mut make: impl FnMut(usize) -> T) {
        while self.filled < self.len {
            let index = self.filled;
            if self.push(make(index)).is_err() {
                break;
            }
        }
    }

    /// The raw slots that have not been filled yet.
    ///
    /// Writing here does not advance [`filled`](UninitBuffer::filled); pair
    /// bulk writes with [`assume_init`](UninitBuffer::assume_init).
    pub fn spare_slots_mut(&mut self) -> &mut [MaybeUninit<T>] {
        match self.data {
            // SAFETY: slots `filled..len` are in bounds, raw, and exclusively
            // borrowed; `MaybeUninit<T>` has the layout of `T`.
            Some(block) => unsafe {
                slice::from_raw_parts_mut(
                    block.as_ptr().add(self.filled).cast::<MaybeUninit<T>>(),
                    self.len - self.filled,
                )
            },
            None => &mut [],
        }
    }

    /// Convert into a buffer once every slot has been pushed.
    ///
    /// Hands the builder back if any slot is still raw.
    pub fn finish(self) -> Result<DynamicBuffer<T, A>, Self> {
        if !self.is_complete() {
            return Err(self);
        }
        let (data, len, alloc) = self.into_parts();
        Ok(DynamicBuffer::from_parts(data, len, alloc))
    }

    /// Convert into a buffer, treating every slot as constructed.
    ///
    /// # Safety
    ///
    /// Every slot in `filled()..len()` must have been initialized through
    /// [`spare_slots_mut`](UninitBuffer::spare_slots_mut).
    pub unsafe fn assume_init(self) -> DynamicBuffer<T, A> {
        let (data, len, alloc) = self.into_parts();
        DynamicBuffer::from_parts(data, len, alloc)
    }

    fn into_parts(self) -> (Option<NonNull<T>>, usize, A) {
        let this = mem::ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so the policy is read out once.
        let alloc = unsafe { ptr::read(&this.alloc) };
        (this.data, this.len, alloc)
    }
}

impl<T, A: AllocPolicy> Drop for UninitBuffer<T, A> {
    fn drop(&mut self) {
        if let Some(block) = self.data.take() {
            // SAFETY: exactly `0..filled` were constructed by `push`.
            unsafe {
                raw::destroy_range(&self.alloc, block, 0..self.filled);
                raw::release(&self.alloc, Some(block), self.len);
            }
        }
        self.filled = 0;
    }
}

impl<T, A: AllocPolicy> fmt::Debug for UninitBuffer<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UninitBuffer")
            .field("len", &self.len)
            .field("filled", &self.filled)
            .finish_non_exhaustive()
    }
}

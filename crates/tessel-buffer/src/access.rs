//! Bounds-checked element access.
//!
//! `index < len` is a precondition of every accessor. The safe accessors
//! always check it and report a contract failure; the `unsafe` unchecked
//! forms only check it when contracts are enabled.

use std::ops::{Index, IndexMut};
use std::ptr;

use tessel_core::contract::{self, ContractKind};
use tessel_core::{pre, AllocPolicy};

use crate::buffer::DynamicBuffer;
use crate::raw;

impl<T, A: AllocPolicy> DynamicBuffer<T, A> {
    /// The element at `index`.
    ///
    /// # Panics
    ///
    /// Contract failure if `index >= len`.
    #[track_caller]
    pub fn at(&self, index: usize) -> &T {
        self.check_index(index);
        // SAFETY: checked above.
        unsafe { self.get_unchecked(index) }
    }

    /// The element at `index`, mutably.
    ///
    /// # Panics
    ///
    /// Contract failure if `index >= len`.
    #[track_caller]
    pub fn at_mut(&mut self, index: usize) -> &mut T {
        self.check_index(index);
        // SAFETY: checked above.
        unsafe { self.get_unchecked_mut(index) }
    }

    /// The element at `index` without a release-build bounds check.
    ///
    /// # Safety
    ///
    /// `index` must be less than `len`.
    #[track_caller]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        pre!(index < self.len());
        // SAFETY: `index < len`, so the block exists and the slot is live.
        unsafe { &*self.storage().add(index) }
    }

    /// The element at `index`, mutably, without a release-build bounds check.
    ///
    /// # Safety
    ///
    /// `index` must be less than `len`.
    #[track_caller]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        pre!(index < self.len());
        // SAFETY: `index < len`, and `self` is borrowed exclusively.
        unsafe { &mut *self.storage().add(index) }
    }

    /// Consume the buffer and move out the element at `index`.
    ///
    /// Every other element is destroyed in ascending order and the block is
    /// released.
    ///
    /// # Panics
    ///
    /// Contract failure if `index >= len`.
    #[track_caller]
    pub fn into_element(mut self, index: usize) -> T {
        self.check_index(index);
        let (data, len) = self.replace_block(None, 0);
        let Some(block) = data else {
            contract::violated(ContractKind::Invariant, "storage present when len > 0");
        };
        // SAFETY: `index < len`; the slot is read exactly once and then
        // treated as raw, and the rest of the block is torn down below.
        unsafe {
            let value = ptr::read(block.as_ptr().add(index));
            raw::destroy_range(self.allocator(), block, 0..index);
            raw::destroy_range(self.allocator(), block, index + 1..len);
            raw::release(self.allocator(), Some(block), len);
            value
        }
    }

    #[track_caller]
    fn check_index(&self, index: usize) {
        if index >= self.len() {
            contract::violated(ContractKind::Precondition, "index < len");
        }
    }
}

impl<T, A: AllocPolicy> Index<usize> for DynamicBuffer<T, A> {
    type Output = T;

    #[track_caller]
    fn index(&self, index: usize) -> &T {
        self.at(index)
    }
}

impl<T, A: AllocPolicy> IndexMut<usize> for DynamicBuffer<T, A> {
    #[track_caller]
    fn index_mut(&mut self, index: usize) -> &mut T {
        self.at_mut(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_test_utils::{Probe, TrackingAlloc};

    #[test]
    fn subscript_reads_and_writes() {
        let mut buffer = DynamicBuffer::from([0, 2, 4, 6, 8, 10]);
        for i in 0..buffer.len() {
            assert_eq!(buffer[i], i as i32 * 2);
        }
        buffer[2] = 1000;
        // SAFETY: slot 2 of a six-element buffer.
        assert_eq!(unsafe { *buffer.as_ptr().add(2) }, 1000);
    }

    #[test]
    fn at_matches_subscript() {
        let mut buffer = DynamicBuffer::from(['a', 'b', 'c']);
        assert_eq!(buffer.at(1), &'b');
        *buffer.at_mut(1) = 'z';
        assert_eq!(buffer[1], 'z');
    }

    #[test]
    #[should_panic(expected = "index < len")]
    fn out_of_bounds_read_is_a_contract_failure() {
        let buffer = DynamicBuffer::from([1, 2, 3]);
        let _ = buffer[3];
    }

    #[test]
    #[should_panic(expected = "index < len")]
    fn empty_buffer_has_no_valid_index() {
        let mut buffer: DynamicBuffer<u8> = DynamicBuffer::new();
        buffer[0] = 1;
    }

    #[test]
    fn into_element_moves_one_and_drops_the_rest() {
        let alloc = TrackingAlloc::new();
        let probe = Probe::new();
        let source = [probe.spawn(0), probe.spawn(1), probe.spawn(2)];
        let buffer = DynamicBuffer::from_slice_in(&source, alloc.clone()).unwrap();
        drop(source);
        let drops_before = probe.drops();

        let middle = buffer.into_element(1);
        assert_eq!(middle.id(), 1);
        assert_eq!(probe.drops(), drops_before + 2);
        assert_eq!(alloc.ledger().live_blocks(), 0);
        drop(middle);
        assert_eq!(probe.drops(), drops_before + 3);
    }

    #[test]
    fn into_element_of_owned_strings() {
        let buffer = DynamicBuffer::from([String::from("a"), String::from("b")]);
        assert_eq!(buffer.into_element(1), "b");
    }
}

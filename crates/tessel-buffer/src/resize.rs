//! Always-reallocating resize.
//!
//! Resizing to the current length is a no-op. Any other length allocates a
//! fresh block of exactly `new_len` slots, relocates the first
//! `min(len, new_len)` elements into it in order, builds the remaining
//! slots from the fill (or leaves them raw), and then tears down the old
//! block: the elements that did not fit are destroyed in ascending order
//! and the block is released. Nothing is ever kept in spare capacity.
//!
//! If the new block cannot be allocated, or a fill panics, the buffer is
//! left exactly as it was.

use std::ptr;

use tessel_core::{cond, post, AllocError, AllocPolicy};

use crate::buffer::DynamicBuffer;
use crate::raw::{self, PartialBlock};

impl<T, A: AllocPolicy> DynamicBuffer<T, A> {
    /// Resize to `new_len`, default-constructing any new slots.
    pub fn resize(&mut self, new_len: usize) -> Result<(), AllocError>
    where
        T: Default,
    {
        self.reallocate(new_len, Some(T::default))
    }

    /// Resize to `new_len`, cloning `value` into every new slot.
    pub fn resize_filled(&mut self, new_len: usize, value: T) -> Result<(), AllocError>
    where
        T: Clone,
    {
        self.reallocate(new_len, Some(|| value.clone()))
    }

    /// Resize to `new_len`, leaving any new slots raw.
    ///
    /// # Safety
    ///
    /// When growing, every slot from the old length up to `new_len` holds
    /// no value. Before the buffer is read, compared, cloned, resized
    /// again, or dropped, each of those slots must be written through
    /// [`as_mut_ptr`](DynamicBuffer::as_mut_ptr) (e.g. with `ptr::write`).
    pub unsafe fn resize_uninit(&mut self, new_len: usize) -> Result<(), AllocError> {
        self.reallocate(new_len, None::<fn() -> T>)
    }

    fn reallocate<F>(&mut self, new_len: usize, fill: Option<F>) -> Result<(), AllocError>
    where
        F: FnMut() -> T,
    {
        let old_len = self.len();
        if new_len == old_len {
            return Ok(());
        }
        let kept = old_len.min(new_len);
        tracing::trace!(from = old_len, to = new_len, "reallocating buffer");

        let fresh = match fill {
            Some(mut fill) => {
                let mut block = PartialBlock::starting_at(self.allocator(), new_len, kept)?;
                for _ in kept..new_len {
                    block.push(fill());
                }
                block.finish()
            }
            None => raw::allocate::<T, A>(self.allocator(), new_len)?,
        };

        let (old, old_len) = self.replace_block(fresh, new_len);
        if let Some(old) = old {
            // SAFETY: the old block holds `old_len` live elements. The first
            // `kept` are relocated bitwise into the fresh block (which has at
            // least `kept` raw slots when `kept > 0`), after which they are
            // only reachable there; the rest are destroyed before release.
            unsafe {
                if let Some(fresh) = fresh {
                    ptr::copy_nonoverlapping(old.as_ptr(), fresh.as_ptr(), kept);
                }
                raw::destroy_range(self.allocator(), old, kept..old_len);
                raw::release(self.allocator(), Some(old), old_len);
            }
        }

        post!(self.len() == new_len);
        cond!(self.has_storage() == (new_len > 0));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_test_utils::{Probe, TrackingAlloc};

    #[test]
    fn grow_with_default_fill() {
        let original = DynamicBuffer::from([0, 1, 2, 3, 4, 5]);
        let mut resized = original.clone();
        let before = resized.as_ptr();

        resized.resize(9).unwrap();
        assert_eq!(resized.len(), 9);
        assert_ne!(resized.as_ptr(), before);
        assert_ne!(resized, original);
        assert_eq!(resized, DynamicBuffer::from([0, 1, 2, 3, 4, 5, 0, 0, 0]));
    }

    #[test]
    fn grow_with_value_fill() {
        let original = DynamicBuffer::from([0, 1, 2, 3, 4, 5]);
        let mut resized = original.clone();
        let before = resized.as_ptr();

        resized.resize_filled(9, 1000).unwrap();
        assert_eq!(resized.len(), 9);
        assert_ne!(resized.as_ptr(), before);
        assert_ne!(resized, original);
        assert_eq!(
            resized,
            DynamicBuffer::from([0, 1, 2, 3, 4, 5, 1000, 1000, 1000])
        );
    }

    #[test]
    fn shrink_to_zero_is_canonical_empty() {
        let mut buffer = DynamicBuffer::from([0, 1, 2, 3]);
        buffer.resize(0).unwrap();
        assert_eq!(buffer, DynamicBuffer::new());
        assert!(buffer.as_ptr().is_null());
    }

    #[test]
    fn shrink_destroys_the_dropped_tail() {
        let probe = Probe::new();
        let mut buffer = DynamicBuffer::from([
            probe.spawn(0),
            probe.spawn(1),
            probe.spawn(2),
            probe.spawn(3),
        ]);
        buffer.resize_filled(2, probe.spawn(99)).unwrap();
        let ids: Vec<u32> = buffer.iter().map(|p| p.id()).collect();
        assert_eq!(ids, [0, 1]);
        // Slots 2 and 3, then the unused fill value.
        assert_eq!(probe.drop_order(), [2, 3, 99]);
        assert_eq!(probe.clones(), 0);
    }

    #[test]
    fn same_len_is_a_no_op() {
        let alloc = TrackingAlloc::new();
        let mut buffer = DynamicBuffer::from_slice_in(&[1, 2, 3], alloc.clone()).unwrap();
        buffer.resize(5).unwrap();
        let block = buffer.as_ptr();
        let allocations = alloc.ledger().allocations();

        buffer.resize(5).unwrap();
        assert_eq!(buffer.as_ptr(), block);
        assert_eq!(alloc.ledger().allocations(), allocations);
        assert_eq!(buffer, [1, 2, 3, 0, 0]);
    }

    #[test]
    fn every_resize_releases_the_old_block() {
        let alloc = TrackingAlloc::new();
        let mut buffer = DynamicBuffer::from_slice_in(&[1u32, 2], alloc.clone()).unwrap();
        buffer.resize(4).unwrap();
        buffer.resize(1).unwrap();
        buffer.resize(3).unwrap();
        assert_eq!(alloc.ledger().allocations(), 4);
        assert_eq!(alloc.ledger().deallocations(), 3);
        assert_eq!(alloc.ledger().live_blocks(), 1);
        assert_eq!(buffer, [1, 0, 0]);

        // Relocated prefixes are neither constructed nor destroyed again.
        drop(buffer);
        assert_eq!(alloc.ledger().constructs(), 6);
        assert_eq!(alloc.ledger().destroys(), 6);
        assert_eq!(alloc.ledger().live_blocks(), 0);
    }

    #[test]
    fn failed_allocation_leaves_buffer_untouched() {
        let alloc = TrackingAlloc::with_limit(32);
        let mut buffer = DynamicBuffer::from_slice_in(&[7u64, 8], alloc.clone()).unwrap();
        let block = buffer.as_ptr();

        let err = buffer.resize(8).unwrap_err();
        assert!(matches!(err, AllocError::LimitExceeded { .. }));
        assert_eq!(buffer.as_ptr(), block);
        assert_eq!(buffer, [7, 8]);
    }

    #[test]
    fn uninit_resize_keeps_the_prefix() {
        let mut buffer = DynamicBuffer::from([0, 1, 2, 3, 4, 5]);
        let before = buffer.as_ptr();
        // SAFETY: the three new slots are written before any read.
        unsafe {
            buffer.resize_uninit(9).unwrap();
            for i in 6..9 {
                buffer.as_mut_ptr().add(i).write(i as i32 * 10);
            }
        }
        assert_eq!(buffer.len(), 9);
        assert_ne!(buffer.as_ptr(), before);
        assert_eq!(buffer, [0, 1, 2, 3, 4, 5, 60, 70, 80]);
    }

    #[test]
    fn uninit_shrink_needs_no_writes() {
        let probe = Probe::new();
        let mut buffer = DynamicBuffer::from([probe.spawn(0), probe.spawn(1), probe.spawn(2)]);
        // SAFETY: shrinking creates no raw slots.
        unsafe { buffer.resize_uninit(1).unwrap() };
        assert_eq!(buffer.len(), 1);
        assert_eq!(probe.drop_order(), [1, 2]);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn resize_keeps_prefix_and_fills_tail(
                values in proptest::collection::vec(any::<i32>(), 0..32),
                new_len in 0usize..48,
                fill in any::<i32>(),
            ) {
                let mut buffer = DynamicBuffer::from(values.clone());
                buffer.resize_filled(new_len, fill).unwrap();

                let kept = values.len().min(new_len);
                prop_assert_eq!(buffer.len(), new_len);
                prop_assert_eq!(&buffer.as_slice()[..kept], &values[..kept]);
                prop_assert!(buffer.as_slice()[kept..].iter().all(|&v| v == fill));
                prop_assert_eq!(buffer.has_storage(), new_len > 0);
            }

            #[test]
            fn repeated_resize_is_idempotent(
                values in proptest::collection::vec(any::<u8>(), 0..16),
                new_len in 0usize..24,
            ) {
                let alloc = TrackingAlloc::new();
                let mut buffer = DynamicBuffer::from_slice_in(&values, alloc.clone()).unwrap();
                buffer.resize(new_len).unwrap();
                let snapshot = buffer.clone();
                let allocations = alloc.ledger().allocations();

                buffer.resize(new_len).unwrap();
                prop_assert_eq!(alloc.ledger().allocations(), allocations);
                prop_assert_eq!(buffer, snapshot);
            }
        }
    }
}

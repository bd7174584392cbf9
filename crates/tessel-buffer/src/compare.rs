//! Equality and ordering between buffers.
//!
//! Equality is element-wise. Ordering is length-first and partial:
//!
//! 1. If either buffer has no storage the result is unordered (`None`),
//!    including for two empty buffers, which still compare *equal*.
//! 2. Otherwise, different lengths order by length alone; the elements are
//!    not inspected.
//! 3. Otherwise, the first element pair that is not `Equal` decides.
//!
//! Equality and ordering therefore disagree at the empty state.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use tessel_core::AllocPolicy;

use crate::buffer::DynamicBuffer;

impl<T: PartialEq, A: AllocPolicy> PartialEq for DynamicBuffer<T, A> {
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().zip(other.iter()).all(|(left, right)| left == right)
    }
}

impl<T: Eq, A: AllocPolicy> Eq for DynamicBuffer<T, A> {}

impl<T: PartialOrd, A: AllocPolicy> PartialOrd for DynamicBuffer<T, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if !self.has_storage() || !other.has_storage() {
            return None;
        }
        if self.len() != other.len() {
            return Some(self.len().cmp(&other.len()));
        }
        for (left, right) in self.iter().zip(other.iter()) {
            match left.partial_cmp(right) {
                Some(Ordering::Equal) => {}
                decided => return decided,
            }
        }
        Some(Ordering::Equal)
    }
}

impl<T: PartialEq, A: AllocPolicy> PartialEq<[T]> for DynamicBuffer<T, A> {
    fn eq(&self, other: &[T]) -> bool {
        self.as_slice() == other
    }
}

impl<T: PartialEq, A: AllocPolicy, const N: usize> PartialEq<[T; N]> for DynamicBuffer<T, A> {
    fn eq(&self, other: &[T; N]) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Hash, A: AllocPolicy> Hash for DynamicBuffer<T, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

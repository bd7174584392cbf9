//! The owning buffer: construction, drop, swap, take, and copy.
//!
//! [`DynamicBuffer`] owns exactly `len` live elements in one block obtained
//! from its [`AllocPolicy`]. Elements are constructed in ascending index
//! order and destroyed in ascending index order before the block is
//! released.

use std::fmt;
use std::marker::PhantomData;
use std::mem::{self, ManuallyDrop};
use std::ptr::{self, NonNull};
use std::slice;

use tessel_core::contract::{self, ContractKind};
use tessel_core::{cond, post, pre, AllocError, AllocPolicy, Global};

use crate::raw::{self, PartialBlock};
use crate::uninit::UninitBuffer;

/// A contiguous, exclusively-owned run of `len` elements of `T`.
///
/// The length is fixed between explicit [`resize`](DynamicBuffer::resize)
/// calls, and every resize reallocates. Storage is present if and only if
/// `len > 0`.
pub struct DynamicBuffer<T, A: AllocPolicy = Global> {
    len: usize,
    alloc: A,
    data: Option<NonNull<T>>,
    _owns: PhantomData<T>,
}

// SAFETY: the buffer owns its elements and policy outright, like `Box<[T]>`.
unsafe impl<T: Send, A: AllocPolicy + Send> Send for DynamicBuffer<T, A> {}
// SAFETY: shared access only hands out `&T` and `&A`.
unsafe impl<T: Sync, A: AllocPolicy + Sync> Sync for DynamicBuffer<T, A> {}

impl<T> DynamicBuffer<T> {
    /// An empty buffer with no storage. Does not allocate.
    pub const fn new() -> Self {
        Self::new_in(Global)
    }

    /// Clone each of `values`, in order, into a block of exactly
    /// `values.len()` elements.
    pub fn from_slice(values: &[T]) -> Result<Self, AllocError>
    where
        T: Clone,
    {
        Self::from_slice_in(values, Global)
    }

    /// A buffer of `len` default-constructed elements.
    pub fn with_len(len: usize) -> Result<Self, AllocError>
    where
        T: Default,
    {
        Self::with_len_in(len, Global)
    }

    /// A buffer of `len` elements, each cloned from the same `value`.
    pub fn filled(len: usize, value: T) -> Result<Self, AllocError>
    where
        T: Clone,
    {
        Self::filled_in(len, value, Global)
    }

    /// Allocate `len` raw slots without constructing anything.
    ///
    /// See [`UninitBuffer`] for filling the slots.
    pub fn uninit(len: usize) -> Result<UninitBuffer<T>, AllocError> {
        Self::uninit_in(len, Global)
    }

    /// Adopt an external block of `len` constructed elements.
    ///
    /// # Safety
    ///
    /// See [`from_raw_parts_in`](DynamicBuffer::from_raw_parts_in). The block
    /// must be releasable through `std::alloc` with
    /// `Layout::array::<T>(len)`, e.g. the pointer of a `Box<[T]>`.
    pub unsafe fn from_raw_parts(ptr: *mut T, len: usize) -> Self {
        // SAFETY: forwarded.
        unsafe { Self::from_raw_parts_in(ptr, len, Global) }
    }
}

impl<T, A: AllocPolicy> DynamicBuffer<T, A> {
    /// An empty buffer using `alloc`. Does not allocate.
    pub const fn new_in(alloc: A) -> Self {
        Self {
            len: 0,
            alloc,
            data: None,
            _owns: PhantomData,
        }
    }

    /// [`from_slice`](DynamicBuffer::from_slice) with an explicit policy.
    pub fn from_slice_in(values: &[T], alloc: A) -> Result<Self, AllocError>
    where
        T: Clone,
    {
        let built = Self::build_in(values.len(), alloc, |index| values[index].clone())?;
        post!(built.len == values.len());
        Ok(built)
    }

    /// [`with_len`](DynamicBuffer::with_len) with an explicit policy.
    pub fn with_len_in(len: usize, alloc: A) -> Result<Self, AllocError>
    where
        T: Default,
    {
        Self::build_in(len, alloc, |_| T::default())
    }

    /// [`filled`](DynamicBuffer::filled) with an explicit policy.
    pub fn filled_in(len: usize, value: T, alloc: A) -> Result<Self, AllocError>
    where
        T: Clone,
    {
        Self::build_in(len, alloc, |_| value.clone())
    }

    /// [`uninit`](DynamicBuffer::uninit) with an explicit policy.
    pub fn uninit_in(len: usize, alloc: A) -> Result<UninitBuffer<T, A>, AllocError> {
        UninitBuffer::allocate(len, alloc)
    }

    /// Adopt an external block of `len` constructed elements.
    ///
    /// The buffer becomes the block's sole owner and destroys and releases
    /// it exactly as if it had allocated it. No element is constructed.
    ///
    /// `ptr` must be non-null if and only if `len > 0`; this is checked as
    /// a contract.
    ///
    /// # Safety
    ///
    /// - `ptr` must point to `len` live, properly aligned values of `T`
    ///   that nothing else owns or will drop.
    /// - The block must be releasable by `alloc` with
    ///   `Layout::array::<T>(len)`.
    pub unsafe fn from_raw_parts_in(ptr: *mut T, len: usize, alloc: A) -> Self {
        pre!(ptr.is_null() == (len == 0));
        tracing::trace!(len, "adopting external block");
        let data = if len == 0 { None } else { NonNull::new(ptr) };
        let len = if data.is_some() { len } else { 0 };
        Self::from_parts(data, len, alloc)
    }

    /// Give up ownership of the block.
    ///
    /// Returns the storage pointer (null for an empty buffer), the length,
    /// and the policy responsible for releasing the block. The inverse of
    /// [`from_raw_parts_in`](DynamicBuffer::from_raw_parts_in).
    pub fn into_raw_parts(self) -> (*mut T, usize, A) {
        let this = ManuallyDrop::new(self);
        let ptr = this.storage();
        // SAFETY: `this` is never dropped, so the policy is read out once.
        let alloc = unsafe { ptr::read(&this.alloc) };
        (ptr, this.len, alloc)
    }

    /// Build `len` elements in ascending order from `make(index)`.
    pub(crate) fn build_in(
        len: usize,
        alloc: A,
        mut make: impl FnMut(usize) -> T,
    ) -> Result<Self, AllocError> {
        let data = {
            let mut block = PartialBlock::new(&alloc, len)?;
            for index in 0..len {
                block.push(make(index));
            }
            block.finish()
        };
        Ok(Self::from_parts(data, len, alloc))
    }

    /// Build from an iterator that reports its exact length.
    pub(crate) fn from_exact_iter_in<I>(values: I, alloc: A) -> Result<Self, AllocError>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let mut values = values.into_iter();
        let len = values.len();
        Self::build_in(len, alloc, |_| match values.next() {
            Some(value) => value,
            None => contract::violated(ContractKind::Precondition, "iterator yields len items"),
        })
    }

    pub(crate) fn from_parts(data: Option<NonNull<T>>, len: usize, alloc: A) -> Self {
        cond!(data.is_some() == (len > 0));
        Self {
            len,
            alloc,
            data,
            _owns: PhantomData,
        }
    }

    /// Replace the block and length, handing back the previous pair.
    ///
    /// The caller takes over responsibility for the old block.
    pub(crate) fn replace_block(
        &mut self,
        data: Option<NonNull<T>>,
        len: usize,
    ) -> (Option<NonNull<T>>, usize) {
        cond!(data.is_some() == (len > 0));
        let old_data = mem::replace(&mut self.data, data);
        let old_len = mem::replace(&mut self.len, len);
        (old_data, old_len)
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer has no elements (and therefore no storage).
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the buffer currently owns a block.
    pub fn has_storage(&self) -> bool {
        self.data.is_some()
    }

    /// The buffer's allocation policy.
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Pointer to the first element, or null when there is no storage.
    pub fn as_ptr(&self) -> *const T {
        self.storage()
    }

    /// Mutable pointer to the first element, or null when there is no storage.
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.storage()
    }

    pub(crate) fn storage(&self) -> *mut T {
        self.data.map_or(ptr::null_mut(), NonNull::as_ptr)
    }

    /// The live elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        match self.data {
            // SAFETY: `data` holds `len` live elements.
            Some(block) => unsafe { slice::from_raw_parts(block.as_ptr(), self.len) },
            None => &[],
        }
    }

    /// The live elements as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        match self.data {
            // SAFETY: `data` holds `len` live elements, borrowed exclusively.
            Some(block) => unsafe { slice::from_raw_parts_mut(block.as_ptr(), self.len) },
            None => &mut [],
        }
    }

    /// Iterate the elements in index order.
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Iterate the elements mutably in index order.
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    /// Exchange contents with `other` in O(1).
    ///
    /// Only the block and length move; no element is constructed or
    /// destroyed. The policies are exchanged too when
    /// [`AllocPolicy::PROPAGATE_ON_SWAP`] is set; otherwise they must be
    /// interchangeable.
    ///
    /// # Panics
    ///
    /// Panics, in every build profile, if the policies stay put and are
    /// not interchangeable: each block would end up released by a policy
    /// that never handed it out.
    pub fn swap(&mut self, other: &mut Self) {
        if !A::PROPAGATE_ON_SWAP && !self.alloc.interchangeable(&other.alloc) {
            contract::violated(
                ContractKind::Precondition,
                "policies propagate on swap or are interchangeable",
            );
        }
        mem::swap(&mut self.len, &mut other.len);
        mem::swap(&mut self.data, &mut other.data);
        if A::PROPAGATE_ON_SWAP {
            mem::swap(&mut self.alloc, &mut other.alloc);
        }
    }

    /// Move the whole block out, leaving `self` in the canonical empty state.
    ///
    /// The block leaves together with the policy that allocated it; `self`
    /// keeps a policy selected from the old one via `select_on_copy`.
    /// Elements are never moved individually.
    pub fn take(&mut self) -> Self {
        let fresh = Self::new_in(self.alloc.select_on_copy());
        let taken = mem::replace(self, fresh);
        post!(self.len == 0 && self.data.is_none());
        taken
    }

    /// Replace the contents with `other`'s.
    ///
    /// `other` is swapped in and the previous contents are dropped with it.
    pub fn assign(&mut self, mut other: Self) {
        self.swap(&mut other);
    }

    /// Copy into a fresh block using `select_on_copy()` of this policy.
    pub fn try_clone(&self) -> Result<Self, AllocError>
    where
        T: Clone,
    {
        let alloc = self.alloc.select_on_copy();
        let source = self.as_slice();
        let copy = Self::build_in(self.len, alloc, |index| source[index].clone())?;
        post!(copy.len == self.len);
        cond!(copy.data.is_some() == (copy.len > 0));
        Ok(copy)
    }
}

/// Exchange the contents of two buffers. See [`DynamicBuffer::swap`].
pub fn swap<T, A: AllocPolicy>(left: &mut DynamicBuffer<T, A>, right: &mut DynamicBuffer<T, A>) {
    left.swap(right);
}

impl<T, A: AllocPolicy> Drop for DynamicBuffer<T, A> {
    fn drop(&mut self) {
        let (data, len) = self.replace_block(None, 0);
        if let Some(block) = data {
            // SAFETY: the block holds `len` live elements and came from this
            // buffer's policy (or was adopted under the same contract).
            unsafe {
                raw::destroy_range(&self.alloc, block, 0..len);
                raw::release(&self.alloc, Some(block), len);
            }
        }
        post!(self.len == 0);
        post!(self.data.is_none());
    }
}

impl<T, A: AllocPolicy + Default> Default for DynamicBuffer<T, A> {
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<T: Clone, A: AllocPolicy> Clone for DynamicBuffer<T, A> {
    /// # Panics
    ///
    /// Panics if the allocation fails; use
    /// [`try_clone`](DynamicBuffer::try_clone) to handle it.
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(copy) => copy,
            Err(err) => panic!("failed to clone buffer of {} elements: {err}", self.len),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        let mut copy = source.clone();
        if A::PROPAGATE_ON_SWAP || self.alloc.interchangeable(&copy.alloc) {
            self.swap(&mut copy);
        } else {
            *self = copy;
        }
    }
}

impl<T: fmt::Debug, A: AllocPolicy> fmt::Debug for DynamicBuffer<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<T, const N: usize> From<[T; N]> for DynamicBuffer<T> {
    /// # Panics
    ///
    /// Panics if the allocation fails.
    fn from(values: [T; N]) -> Self {
        match Self::from_exact_iter_in(values, Global) {
            Ok(built) => built,
            Err(err) => panic!("failed to allocate buffer of {N} elements: {err}"),
        }
    }
}

impl<T: Clone> From<&[T]> for DynamicBuffer<T> {
    /// # Panics
    ///
    /// Panics if the allocation fails.
    fn from(values: &[T]) -> Self {
        match Self::from_slice(values) {
            Ok(built) => built,
            Err(err) => panic!("failed to allocate buffer of {} elements: {err}", values.len()),
        }
    }
}

impl<T> From<Vec<T>> for DynamicBuffer<T> {
    /// # Panics
    ///
    /// Panics if the allocation fails.
    fn from(values: Vec<T>) -> Self {
        let len = values.len();
        match Self::from_exact_iter_in(values, Global) {
            Ok(built) => built,
            Err(err) => panic!("failed to allocate buffer of {len} elements: {err}"),
        }
    }
}

impl<T> FromIterator<T> for DynamicBuffer<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        iter.into_iter().collect::<Vec<T>>().into()
    }
}

impl<'a, T, A: AllocPolicy> IntoIterator for &'a DynamicBuffer<T, A> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, A: AllocPolicy> IntoIterator for &'a mut DynamicBuffer<T, A> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T, A: AllocPolicy> AsRef<[T]> for DynamicBuffer<T, A> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A: AllocPolicy> AsMut<[T]> for DynamicBuffer<T, A> {
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

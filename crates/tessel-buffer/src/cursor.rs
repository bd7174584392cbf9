//! Contiguous random-access cursors.
//!
//! One skeleton serves four cursor types:
//!
//! | | forward | reverse |
//! |---|---|---|
//! | shared | [`Cursor`] | [`RevCursor`] |
//! | exclusive | [`CursorMut`] | [`RevCursorMut`] |
//!
//! A cursor is a position inside a borrowed block. It can be moved freely
//! (including one past either end) and compared; dereferencing is only
//! valid at a live element and is a contract failure anywhere else,
//! including on a default cursor. Reverse cursors mirror the arithmetic:
//! `rbegin` addresses the last element, incrementing moves toward index 0,
//! and ordering and distance are measured along the reverse traversal.
//!
//! Cursors borrow the buffer, so resize, take, and drop cannot happen while
//! any cursor is alive. Comparing cursors from different buffers orders
//! them by block address, which is well-defined but meaningless.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::mem;
use std::ops::{Add, AddAssign, Deref, DerefMut, Index, IndexMut, Sub, SubAssign};
use std::ptr;

use tessel_core::contract::{self, ContractKind};
use tessel_core::{pre, AllocPolicy};

use crate::buffer::DynamicBuffer;
use crate::walk::{Cursors, CursorsMut};

mod sealed {
    pub trait Sealed {}
}

/// Traversal direction of a cursor.
///
/// Positions live in index space: position `p` of a forward cursor
/// addresses slot `p`, position `p` of a reverse cursor addresses slot
/// `p - 1`.
pub trait Direction: sealed::Sealed + 'static {
    /// Slot addressed at position `pos`.
    fn slot(pos: isize) -> isize;
    /// Position reached after `steps` along the traversal.
    fn advance(pos: isize, steps: isize) -> isize;
    /// Steps along the traversal from `from` to `to`.
    fn distance(to: isize, from: isize) -> isize;
    /// Traversal order of two positions.
    fn order(left: isize, right: isize) -> Ordering;
}

/// Ascending index order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Forward {}

/// Descending index order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reverse {}

impl sealed::Sealed for Forward {}
impl sealed::Sealed for Reverse {}

impl Direction for Forward {
    fn slot(pos: isize) -> isize {
        pos
    }

    fn advance(pos: isize, steps: isize) -> isize {
        pos.wrapping_add(steps)
    }

    fn distance(to: isize, from: isize) -> isize {
        to.wrapping_sub(from)
    }

    fn order(left: isize, right: isize) -> Ordering {
        left.cmp(&right)
    }
}

impl Direction for Reverse {
    fn slot(pos: isize) -> isize {
        pos.wrapping_sub(1)
    }

    fn advance(pos: isize, steps: isize) -> isize {
        pos.wrapping_sub(steps)
    }

    fn distance(to: isize, from: isize) -> isize {
        from.wrapping_sub(to)
    }

    fn order(left: isize, right: isize) -> Ordering {
        right.cmp(&left)
    }
}

/// Position within a block: the shared skeleton of every cursor.
pub(crate) struct Position<T> {
    base: *mut T,
    len: usize,
    pub(crate) pos: isize,
}

impl<T> Clone for Position<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Position<T> {}

impl<T> Position<T> {
    pub(crate) const fn detached() -> Self {
        Self {
            base: ptr::null_mut(),
            len: 0,
            pos: 0,
        }
    }

    pub(crate) fn new(base: *mut T, len: usize, pos: isize) -> Self {
        Self { base, len, pos }
    }

    fn slot_at<D: Direction>(&self, steps: isize) -> Option<usize> {
        let slot = D::slot(D::advance(self.pos, steps));
        if self.base.is_null() || slot < 0 || slot as usize >= self.len {
            None
        } else {
            Some(slot as usize)
        }
    }

    /// Pointer to the live element `steps` along from here.
    #[track_caller]
    pub(crate) fn element<D: Direction>(&self, steps: isize) -> *mut T {
        match self.slot_at::<D>(steps) {
            // SAFETY: `slot < len`, inside the borrowed block.
            Some(slot) => unsafe { self.base.add(slot) },
            None => contract::violated(
                ContractKind::Precondition,
                "cursor addresses a live element",
            ),
        }
    }

    pub(crate) fn same_block(&self, other: &Self) -> bool {
        ptr::eq(self.base, other.base)
    }

    fn order<D: Direction>(&self, other: &Self) -> Ordering {
        (self.base as usize)
            .cmp(&(other.base as usize))
            .then_with(|| D::order(self.pos, other.pos))
    }
}

impl<T> PartialEq for Position<T> {
    fn eq(&self, other: &Self) -> bool {
        self.same_block(other) && self.pos == other.pos
    }
}

impl<T> fmt::Debug for Position<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Position")
            .field("base", &self.base)
            .field("len", &self.len)
            .field("pos", &self.pos)
            .finish()
    }
}

/// Shared cursor over a buffer's elements.
///
/// `Copy`, ordered, and usable with `+`, `-`, `+=`, `-=`, `[n]`, and `*`.
pub struct Cursor<'a, T, D: Direction = Forward> {
    pub(crate) place: Position<T>,
    _marker: PhantomData<(&'a [T], D)>,
}

/// Shared cursor walking from the last element toward the first.
pub type RevCursor<'a, T> = Cursor<'a, T, Reverse>;

// SAFETY: a shared cursor only hands out `&T`, like `&[T]`.
unsafe impl<T: Sync, D: Direction> Send for Cursor<'_, T, D> {}
// SAFETY: as above.
unsafe impl<T: Sync, D: Direction> Sync for Cursor<'_, T, D> {}

impl<'a, T, D: Direction> Cursor<'a, T, D> {
    pub(crate) fn from_position(place: Position<T>) -> Self {
        Self {
            place,
            _marker: PhantomData,
        }
    }

    /// The element under the cursor.
    ///
    /// # Panics
    ///
    /// Contract failure if the cursor is not at a live element.
    #[track_caller]
    pub fn get(&self) -> &'a T {
        // SAFETY: `element` only returns pointers to live slots of a block
        // borrowed shared for `'a`.
        unsafe { &*self.place.element::<D>(0) }
    }

    /// The element `steps` along from the cursor, without moving it.
    ///
    /// # Panics
    ///
    /// Contract failure if that position is not a live element.
    #[track_caller]
    pub fn at(&self, steps: isize) -> &'a T {
        // SAFETY: as in `get`.
        unsafe { &*self.place.element::<D>(steps) }
    }

    /// Slot index under the cursor, if it addresses a live element.
    pub fn slot(&self) -> Option<usize> {
        self.place.slot_at::<D>(0)
    }

    /// Advance one step (`++c`).
    pub fn inc(&mut self) -> &mut Self {
        self.place.pos = D::advance(self.place.pos, 1);
        self
    }

    /// Retreat one step (`--c`).
    pub fn dec(&mut self) -> &mut Self {
        self.place.pos = D::advance(self.place.pos, -1);
        self
    }

    /// Advance one step, returning the prior position (`c++`).
    pub fn post_inc(&mut self) -> Self {
        let prior = *self;
        self.inc();
        prior
    }

    /// Retreat one step, returning the prior position (`c--`).
    pub fn post_dec(&mut self) -> Self {
        let prior = *self;
        self.dec();
        prior
    }

    /// Exchange positions with `other`.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Signed number of steps from `origin` to `self`.
    pub fn distance_from(&self, origin: &Self) -> isize {
        pre!(self.place.same_block(&origin.place));
        D::distance(self.place.pos, origin.place.pos)
    }

    /// Iterate from this cursor up to (not including) `end`.
    pub fn until(self, end: Self) -> Cursors<'a, T, D> {
        pre!(self.place.same_block(&end.place));
        pre!(self <= end);
        Cursors::new(self.place, end.place)
    }
}

impl<T, D: Direction> Clone for Cursor<'_, T, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, D: Direction> Copy for Cursor<'_, T, D> {}

impl<T, D: Direction> Default for Cursor<'_, T, D> {
    fn default() -> Self {
        Self::from_position(Position::detached())
    }
}

impl<T, D: Direction> fmt::Debug for Cursor<'_, T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("pos", &self.place.pos)
            .field("slot", &self.slot())
            .finish()
    }
}

impl<T, D: Direction> PartialEq for Cursor<'_, T, D> {
    fn eq(&self, other: &Self) -> bool {
        self.place == other.place
    }
}

impl<T, D: Direction> Eq for Cursor<'_, T, D> {}

impl<T, D: Direction> PartialOrd for Cursor<'_, T, D> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T, D: Direction> Ord for Cursor<'_, T, D> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.place.order::<D>(&other.place)
    }
}

impl<T, D: Direction> Hash for Cursor<'_, T, D> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.place.base as usize).hash(state);
        self.place.pos.hash(state);
    }
}

impl<T, D: Direction> Deref for Cursor<'_, T, D> {
    type Target = T;

    #[track_caller]
    fn deref(&self) -> &T {
        self.get()
    }
}

impl<T, D: Direction> Index<isize> for Cursor<'_, T, D> {
    type Output = T;

    #[track_caller]
    fn index(&self, steps: isize) -> &T {
        self.at(steps)
    }
}

impl<T, D: Direction> AddAssign<isize> for Cursor<'_, T, D> {
    fn add_assign(&mut self, steps: isize) {
        self.place.pos = D::advance(self.place.pos, steps);
    }
}

impl<T, D: Direction> SubAssign<isize> for Cursor<'_, T, D> {
    fn sub_assign(&mut self, steps: isize) {
        self.place.pos = D::advance(self.place.pos, steps.wrapping_neg());
    }
}

impl<T, D: Direction> Add<isize> for Cursor<'_, T, D> {
    type Output = Self;

    fn add(mut self, steps: isize) -> Self {
        self += steps;
        self
    }
}

impl<'a, T, D: Direction> Add<Cursor<'a, T, D>> for isize {
    type Output = Cursor<'a, T, D>;

    fn add(self, cursor: Cursor<'a, T, D>) -> Cursor<'a, T, D> {
        cursor + self
    }
}

impl<T, D: Direction> Sub<isize> for Cursor<'_, T, D> {
    type Output = Self;

    fn sub(mut self, steps: isize) -> Self {
        self -= steps;
        self
    }
}

impl<T, D: Direction> Sub for Cursor<'_, T, D> {
    type Output = isize;

    fn sub(self, origin: Self) -> isize {
        self.distance_from(&origin)
    }
}

/// Exclusive cursor over a buffer's elements.
///
/// Move-only: a second copy would alias `&mut T`. Use
/// [`reborrow`](CursorMut::reborrow) for a temporary copy and
/// [`as_cursor`](CursorMut::as_cursor) for a shared view.
pub struct CursorMut<'a, T, D: Direction = Forward> {
    place: Position<T>,
    _marker: PhantomData<(&'a mut [T], D)>,
}

/// Exclusive cursor walking from the last element toward the first.
pub type RevCursorMut<'a, T> = CursorMut<'a, T, Reverse>;

// SAFETY: an exclusive cursor behaves like `&mut [T]`.
unsafe impl<T: Send, D: Direction> Send for CursorMut<'_, T, D> {}
// SAFETY: shared access to the cursor only yields `&T`.
unsafe impl<T: Sync, D: Direction> Sync for CursorMut<'_, T, D> {}

impl<'a, T, D: Direction> CursorMut<'a, T, D> {
    pub(crate) fn from_position(place: Position<T>) -> Self {
        Self {
            place,
            _marker: PhantomData,
        }
    }

    /// The element under the cursor.
    #[track_caller]
    pub fn get(&self) -> &T {
        // SAFETY: live slot; the shared borrow of `self` prevents any
        // `&mut` from this cursor for its duration.
        unsafe { &*self.place.element::<D>(0) }
    }

    /// The element under the cursor, mutably.
    #[track_caller]
    pub fn get_mut(&mut self) -> &mut T {
        // SAFETY: live slot of a block borrowed exclusively by this cursor.
        unsafe { &mut *self.place.element::<D>(0) }
    }

    /// Consume the cursor, keeping the element borrowed for `'a`.
    #[track_caller]
    pub fn into_mut(self) -> &'a mut T {
        // SAFETY: the cursor's exclusive borrow is handed to the result.
        unsafe { &mut *self.place.element::<D>(0) }
    }

    /// The element `steps` along from the cursor.
    #[track_caller]
    pub fn at(&self, steps: isize) -> &T {
        // SAFETY: as in `get`.
        unsafe { &*self.place.element::<D>(steps) }
    }

    /// The element `steps` along from the cursor, mutably.
    #[track_caller]
    pub fn at_mut(&mut self, steps: isize) -> &mut T {
        // SAFETY: as in `get_mut`.
        unsafe { &mut *self.place.element::<D>(steps) }
    }

    /// Slot index under the cursor, if it addresses a live element.
    pub fn slot(&self) -> Option<usize> {
        self.place.slot_at::<D>(0)
    }

    /// Advance one step (`++c`).
    pub fn inc(&mut self) -> &mut Self {
        self.place.pos = D::advance(self.place.pos, 1);
        self
    }

    /// Retreat one step (`--c`).
    pub fn dec(&mut self) -> &mut Self {
        self.place.pos = D::advance(self.place.pos, -1);
        self
    }

    /// Advance one step, returning a shared view of the prior position (`c++`).
    pub fn post_inc(&mut self) -> Cursor<'_, T, D> {
        let prior = self.place;
        self.inc();
        Cursor::from_position(prior)
    }

    /// Retreat one step, returning a shared view of the prior position (`c--`).
    pub fn post_dec(&mut self) -> Cursor<'_, T, D> {
        let prior = self.place;
        self.dec();
        Cursor::from_position(prior)
    }

    /// A shorter-lived exclusive cursor at the same position.
    pub fn reborrow(&mut self) -> CursorMut<'_, T, D> {
        CursorMut::from_position(self.place)
    }

    /// A shared cursor at the same position.
    pub fn as_cursor(&self) -> Cursor<'_, T, D> {
        Cursor::from_position(self.place)
    }

    /// Exchange positions with `other`.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Signed number of steps from `origin` to `self`.
    pub fn distance_from(&self, origin: &Self) -> isize {
        pre!(self.place.same_block(&origin.place));
        D::distance(self.place.pos, origin.place.pos)
    }

    /// Iterate mutably over the next `count` elements.
    ///
    /// # Panics
    ///
    /// Contract failure if fewer than `count` live elements follow.
    #[track_caller]
    pub fn walk(self, count: usize) -> CursorsMut<'a, T, D> {
        let end = Position::new(
            self.place.base,
            self.place.len,
            D::advance(self.place.pos, count as isize),
        );
        if count > 0 {
            // Both ends of the walk must stay inside the block.
            let _ = self.place.element::<D>(0);
            let _ = end.element::<D>(-1);
        }
        CursorsMut::new(self.place, end)
    }
}

impl<T, D: Direction> Default for CursorMut<'_, T, D> {
    fn default() -> Self {
        Self::from_position(Position::detached())
    }
}

impl<T, D: Direction> fmt::Debug for CursorMut<'_, T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorMut")
            .field("pos", &self.place.pos)
            .field("slot", &self.slot())
            .finish()
    }
}

impl<T, D: Direction> PartialEq for CursorMut<'_, T, D> {
    fn eq(&self, other: &Self) -> bool {
        self.place == other.place
    }
}

impl<T, D: Direction> Eq for CursorMut<'_, T, D> {}

impl<T, D: Direction> PartialOrd for CursorMut<'_, T, D> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T, D: Direction> Ord for CursorMut<'_, T, D> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.place.order::<D>(&other.place)
    }
}

impl<T, D: Direction> Deref for CursorMut<'_, T, D> {
    type Target = T;

    #[track_caller]
    fn deref(&self) -> &T {
        self.get()
    }
}

impl<T, D: Direction> DerefMut for CursorMut<'_, T, D> {
    #[track_caller]
    fn deref_mut(&mut self) -> &mut T {
        self.get_mut()
    }
}

impl<T, D: Direction> Index<isize> for CursorMut<'_, T, D> {
    type Output = T;

    #[track_caller]
    fn index(&self, steps: isize) -> &T {
        self.at(steps)
    }
}

impl<T, D: Direction> IndexMut<isize> for CursorMut<'_, T, D> {
    #[track_caller]
    fn index_mut(&mut self, steps: isize) -> &mut T {
        self.at_mut(steps)
    }
}

impl<T, D: Direction> AddAssign<isize> for CursorMut<'_, T, D> {
    fn add_assign(&mut self, steps: isize) {
        self.place.pos = D::advance(self.place.pos, steps);
    }
}

impl<T, D: Direction> SubAssign<isize> for CursorMut<'_, T, D> {
    fn sub_assign(&mut self, steps: isize) {
        self.place.pos = D::advance(self.place.pos, steps.wrapping_neg());
    }
}

impl<T, D: Direction> Add<isize> for CursorMut<'_, T, D> {
    type Output = Self;

    fn add(mut self, steps: isize) -> Self {
        self += steps;
        self
    }
}

impl<'a, T, D: Direction> Add<CursorMut<'a, T, D>> for isize {
    type Output = CursorMut<'a, T, D>;

    fn add(self, cursor: CursorMut<'a, T, D>) -> CursorMut<'a, T, D> {
        cursor + self
    }
}

impl<T, D: Direction> Sub<isize> for CursorMut<'_, T, D> {
    type Output = Self;

    fn sub(mut self, steps: isize) -> Self {
        self -= steps;
        self
    }
}

impl<T, D: Direction> Sub for &CursorMut<'_, T, D> {
    type Output = isize;

    fn sub(self, origin: Self) -> isize {
        self.distance_from(origin)
    }
}

/// Cursor accessors.
///
/// `[begin, end)` covers the live elements in index order and
/// `[rbegin, rend)` covers them in reverse index order. An empty buffer
/// yields equal, non-dereferenceable bounds.
impl<T, A: AllocPolicy> DynamicBuffer<T, A> {
    fn position(&self, pos: usize) -> Position<T> {
        Position::new(self.storage(), self.len(), pos as isize)
    }

    /// Cursor at the first element.
    pub fn begin(&self) -> Cursor<'_, T> {
        Cursor::from_position(self.position(0))
    }

    /// Cursor one past the last element.
    pub fn end(&self) -> Cursor<'_, T> {
        Cursor::from_position(self.position(self.len()))
    }

    /// Alias of [`begin`](DynamicBuffer::begin).
    pub fn cbegin(&self) -> Cursor<'_, T> {
        self.begin()
    }

    /// Alias of [`end`](DynamicBuffer::end).
    pub fn cend(&self) -> Cursor<'_, T> {
        self.end()
    }

    /// Reverse cursor at the last element.
    pub fn rbegin(&self) -> RevCursor<'_, T> {
        Cursor::from_position(self.position(self.len()))
    }

    /// Reverse cursor one before the first element.
    pub fn rend(&self) -> RevCursor<'_, T> {
        Cursor::from_position(self.position(0))
    }

    /// Alias of [`rbegin`](DynamicBuffer::rbegin).
    pub fn crbegin(&self) -> RevCursor<'_, T> {
        self.rbegin()
    }

    /// Alias of [`rend`](DynamicBuffer::rend).
    pub fn crend(&self) -> RevCursor<'_, T> {
        self.rend()
    }

    /// Exclusive cursor at the first element.
    pub fn begin_mut(&mut self) -> CursorMut<'_, T> {
        CursorMut::from_position(self.position(0))
    }

    /// Exclusive cursor one past the last element.
    pub fn end_mut(&mut self) -> CursorMut<'_, T> {
        CursorMut::from_position(self.position(self.len()))
    }

    /// Exclusive reverse cursor at the last element.
    pub fn rbegin_mut(&mut self) -> RevCursorMut<'_, T> {
        CursorMut::from_position(self.position(self.len()))
    }

    /// Exclusive reverse cursor one before the first element.
    pub fn rend_mut(&mut self) -> RevCursorMut<'_, T> {
        CursorMut::from_position(self.position(0))
    }

    /// Walk `[begin, end)`.
    pub fn cursors(&self) -> Cursors<'_, T> {
        self.begin().until(self.end())
    }

    /// Walk `[rbegin, rend)`.
    pub fn rcursors(&self) -> Cursors<'_, T, Reverse> {
        self.rbegin().until(self.rend())
    }

    /// Walk `[begin, end)` mutably.
    pub fn cursors_mut(&mut self) -> CursorsMut<'_, T> {
        CursorsMut::new(self.position(0), self.position(self.len()))
    }

    /// Walk `[rbegin, rend)` mutably.
    pub fn rcursors_mut(&mut self) -> CursorsMut<'_, T, Reverse> {
        CursorsMut::new(self.position(self.len()), self.position(0))
    }
}

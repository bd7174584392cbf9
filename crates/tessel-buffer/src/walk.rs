//! Iterators over a half-open cursor range.
//!
//! [`Cursors`] and [`CursorsMut`] walk `[front, back)` in the cursor's
//! direction, so `buffer.rcursors()` yields the last element first. Both
//! are double-ended and know their exact length.

use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;

use crate::cursor::{Cursor, Direction, Forward, Position};

fn remaining<T, D: Direction>(front: &Position<T>, back: &Position<T>) -> usize {
    D::distance(back.pos, front.pos).max(0) as usize
}

/// Shared iterator over `[front, back)`.
pub struct Cursors<'a, T, D: Direction = Forward> {
    front: Position<T>,
    back: Position<T>,
    _marker: PhantomData<(&'a [T], D)>,
}

// SAFETY: yields `&T` only, like `slice::Iter`.
unsafe impl<T: Sync, D: Direction> Send for Cursors<'_, T, D> {}
// SAFETY: as above.
unsafe impl<T: Sync, D: Direction> Sync for Cursors<'_, T, D> {}

impl<'a, T, D: Direction> Cursors<'a, T, D> {
    pub(crate) fn new(front: Position<T>, back: Position<T>) -> Self {
        Self {
            front,
            back,
            _marker: PhantomData,
        }
    }

    /// Cursor at the next element to be yielded from the front.
    pub fn front(&self) -> Cursor<'a, T, D> {
        Cursor::from_position(self.front)
    }

    /// Cursor one past the next element to be yielded from the back.
    pub fn back(&self) -> Cursor<'a, T, D> {
        Cursor::from_position(self.back)
    }
}

impl<T, D: Direction> Clone for Cursors<'_, T, D> {
    fn clone(&self) -> Self {
        Self::new(self.front, self.back)
    }
}

impl<'a, T, D: Direction> Iterator for Cursors<'a, T, D> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if remaining::<T, D>(&self.front, &self.back) == 0 {
            return None;
        }
        let element = self.front.element::<D>(0);
        self.front.pos = D::advance(self.front.pos, 1);
        // SAFETY: the front was strictly before the back, inside a block
        // borrowed shared for `'a`.
        Some(unsafe { &*element })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = remaining::<T, D>(&self.front, &self.back);
        (len, Some(len))
    }
}

impl<T, D: Direction> DoubleEndedIterator for Cursors<'_, T, D> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if remaining::<T, D>(&self.front, &self.back) == 0 {
            return None;
        }
        self.back.pos = D::advance(self.back.pos, -1);
        // SAFETY: as in `next`.
        Some(unsafe { &*self.back.element::<D>(0) })
    }
}

impl<T, D: Direction> ExactSizeIterator for Cursors<'_, T, D> {}

impl<T, D: Direction> FusedIterator for Cursors<'_, T, D> {}

impl<T, D: Direction> fmt::Debug for Cursors<'_, T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursors")
            .field("remaining", &remaining::<T, D>(&self.front, &self.back))
            .finish()
    }
}

/// Exclusive iterator over `[front, back)`.
pub struct CursorsMut<'a, T, D: Direction = Forward> {
    front: Position<T>,
    back: Position<T>,
    _marker: PhantomData<(&'a mut [T], D)>,
}

// SAFETY: yields disjoint `&mut T`, like `slice::IterMut`.
unsafe impl<T: Send, D: Direction> Send for CursorsMut<'_, T, D> {}
// SAFETY: shared access yields nothing.
unsafe impl<T: Sync, D: Direction> Sync for CursorsMut<'_, T, D> {}

impl<T, D: Direction> CursorsMut<'_, T, D> {
    pub(crate) fn new(front: Position<T>, back: Position<T>) -> Self {
        Self {
            front,
            back,
            _marker: PhantomData,
        }
    }

    /// Shared view of the elements not yet yielded.
    pub fn as_cursors(&self) -> Cursors<'_, T, D> {
        Cursors::new(self.front, self.back)
    }
}

impl<'a, T, D: Direction> Iterator for CursorsMut<'a, T, D> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<&'a mut T> {
        if remaining::<T, D>(&self.front, &self.back) == 0 {
            return None;
        }
        let element = self.front.element::<D>(0);
        self.front.pos = D::advance(self.front.pos, 1);
        // SAFETY: each slot is yielded at most once, from a block borrowed
        // exclusively for `'a`.
        Some(unsafe { &mut *element })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = remaining::<T, D>(&self.front, &self.back);
        (len, Some(len))
    }
}

impl<T, D: Direction> DoubleEndedIterator for CursorsMut<'_, T, D> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if remaining::<T, D>(&self.front, &self.back) == 0 {
            return None;
        }
        self.back.pos = D::advance(self.back.pos, -1);
        // SAFETY: as in `next`.
        Some(unsafe { &mut *self.back.element::<D>(0) })
    }
}

impl<T, D: Direction> ExactSizeIterator for CursorsMut<'_, T, D> {}

impl<T, D: Direction> FusedIterator for CursorsMut<'_, T, D> {}

impl<T, D: Direction> fmt::Debug for CursorsMut<'_, T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorsMut")
            .field("remaining", &remaining::<T, D>(&self.front, &self.back))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::DynamicBuffer;

    #[test]
    fn forward_walk_visits_every_element_once() {
        let buffer: DynamicBuffer<usize> = (0..=10).collect();
        let mut expected = 0;
        for value in buffer.cursors() {
            assert_eq!(*value, expected);
            expected += 1;
        }
        assert_eq!(expected, 11);
    }

    #[test]
    fn reverse_walk_visits_every_element_once() {
        let buffer: DynamicBuffer<usize> = (0..=10).collect();
        let mut expected = 10;
        let mut visited = 0;
        for value in buffer.rcursors() {
            assert_eq!(*value, expected);
            expected = expected.wrapping_sub(1);
            visited += 1;
        }
        assert_eq!(visited, 11);
    }

    #[test]
    fn manual_cursor_loop_matches_walk() {
        let buffer = DynamicBuffer::from([3, 1, 4, 1, 5]);
        let mut seen = Vec::new();
        let mut cursor = buffer.begin();
        while cursor != buffer.end() {
            seen.push(*cursor);
            cursor.inc();
        }
        assert_eq!(seen, buffer.cursors().copied().collect::<Vec<_>>());
    }

    #[test]
    fn both_ends_meet_in_the_middle() {
        let buffer = DynamicBuffer::from([1, 2, 3, 4, 5]);
        let mut walk = buffer.cursors();
        assert_eq!(walk.len(), 5);
        assert_eq!(walk.next(), Some(&1));
        assert_eq!(walk.next_back(), Some(&5));
        assert_eq!(walk.next_back(), Some(&4));
        assert_eq!(walk.len(), 2);
        assert_eq!(walk.front() - buffer.begin(), 1);
        assert_eq!(walk.back() - buffer.begin(), 3);
        assert_eq!(walk.collect::<Vec<_>>(), [&2, &3]);
    }

    #[test]
    fn reverse_walk_from_the_back_is_forward_order() {
        let buffer = DynamicBuffer::from(['a', 'b', 'c']);
        let letters: String = buffer.rcursors().rev().collect();
        assert_eq!(letters, "abc");
    }

    #[test]
    fn empty_buffer_walks_nothing() {
        let mut buffer: DynamicBuffer<u8> = DynamicBuffer::new();
        assert_eq!(buffer.cursors().next(), None);
        assert_eq!(buffer.rcursors().next_back(), None);
        assert_eq!(buffer.cursors_mut().len(), 0);
    }

    #[test]
    fn mutable_walks_write_in_order() {
        let mut buffer = DynamicBuffer::filled(4, 0).unwrap();
        for (i, value) in buffer.cursors_mut().enumerate() {
            *value = i;
        }
        assert_eq!(buffer, [0, 1, 2, 3]);
        for (i, value) in buffer.rcursors_mut().enumerate() {
            *value = i * 10;
        }
        assert_eq!(buffer, [30, 20, 10, 0]);
    }

    #[test]
    fn partial_range_with_until() {
        let buffer = DynamicBuffer::from([0, 1, 2, 3, 4, 5]);
        let middle: Vec<i32> = (buffer.begin() + 1).until(buffer.end() - 1).copied().collect();
        assert_eq!(middle, [1, 2, 3, 4]);
    }

    #[test]
    fn mutable_walk_exposes_remaining_view() {
        let mut buffer = DynamicBuffer::from([1, 2, 3]);
        let mut walk = buffer.cursors_mut();
        *walk.next().unwrap() = 10;
        assert_eq!(walk.as_cursors().copied().collect::<Vec<_>>(), [2, 3]);
    }
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The storage seam mutations are applied to.

use alloc::collections::VecDeque;
use alloc::vec::Vec;

/// An ordered, index-addressable container a [`Mutation`](crate::Mutation) can be applied to.
///
/// Callers of these methods have already validated every index, so
/// implementations may panic on out-of-range input like the standard
/// collections do.
pub trait Sequence {
    /// Element type.
    type Item;

    /// Number of elements.
    fn len(&self) -> usize;

    /// Returns `true` if the sequence holds no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts `value` so that it ends up at `index`.
    fn insert(&mut self, index: usize, value: Self::Item);

    /// Removes and returns the element at `index`.
    fn remove(&mut self, index: usize) -> Self::Item;

    /// Replaces the element at `index`, returning the previous one.
    fn replace(&mut self, index: usize, value: Self::Item) -> Self::Item;

    /// Appends `value` at the end.
    fn push_back(&mut self, value: Self::Item) {
        let len = self.len();
        self.insert(len, value);
    }

    /// Prepends `value` at the start.
    fn push_front(&mut self, value: Self::Item) {
        self.insert(0, value);
    }

    /// Removes the first element, if any.
    fn pop_front(&mut self) -> Option<Self::Item> {
        if self.is_empty() {
            None
        } else {
            Some(self.remove(0))
        }
    }

    /// Removes the last element, if any.
    fn pop_back(&mut self) -> Option<Self::Item> {
        let len = self.len();
        if len == 0 {
            None
        } else {
            Some(self.remove(len - 1))
        }
    }

    /// Discards every element and refills the sequence from `values`.
    fn reset<I: IntoIterator<Item = Self::Item>>(&mut self, values: I);
}

impl<T> Sequence for Vec<T> {
    type Item = T;

    fn len(&self) -> usize {
        Self::len(self)
    }

    fn insert(&mut self, index: usize, value: T) {
        Self::insert(self, index, value);
    }

    fn remove(&mut self, index: usize) -> T {
        Self::remove(self, index)
    }

    fn replace(&mut self, index: usize, value: T) -> T {
        core::mem::replace(&mut self[index], value)
    }

    fn pop_back(&mut self) -> Option<T> {
        self.pop()
    }

    fn reset<I: IntoIterator<Item = T>>(&mut self, values: I) {
        self.clear();
        self.extend(values);
    }
}

impl<T> Sequence for VecDeque<T> {
    type Item = T;

    fn len(&self) -> usize {
        Self::len(self)
    }

    fn insert(&mut self, index: usize, value: T) {
        Self::insert(self, index, value);
    }

    fn remove(&mut self, index: usize) -> T {
        Self::remove(self, index).expect("index validated before removal")
    }

    fn replace(&mut self, index: usize, value: T) -> T {
        core::mem::replace(&mut self[index], value)
    }

    fn push_back(&mut self, value: T) {
        Self::push_back(self, value);
    }

    fn push_front(&mut self, value: T) {
        Self::push_front(self, value);
    }

    fn pop_front(&mut self) -> Option<T> {
        Self::pop_front(self)
    }

    fn pop_back(&mut self) -> Option<T> {
        Self::pop_back(self)
    }

    fn reset<I: IntoIterator<Item = T>>(&mut self, values: I) {
        self.clear();
        self.extend(values);
    }
}

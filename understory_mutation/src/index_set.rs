// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An ordered set of indices stored as disjoint runs.

use core::fmt;
use core::iter::FusedIterator;
use core::ops::{Range, RangeInclusive};

use smallvec::SmallVec;

/// An ordered set of `usize` indices.
///
/// Indices are stored as sorted, disjoint, non-adjacent runs, so contiguous
/// runs (the common case for list changes) cost a single entry. Sets made of
/// at most two runs do not allocate. Runs are closed on both ends, so every
/// `usize` including `usize::MAX` can be a member.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct IndexSet {
    /// `(first, last)` of each run, both inclusive.
    spans: SmallVec<[(usize, usize); 2]>,
    len: usize,
}

impl IndexSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set containing every index in `range`.
    #[must_use]
    pub fn from_range(range: Range<usize>) -> Self {
        let mut set = Self::new();
        set.insert_range(range);
        set
    }

    /// Creates a set containing only `index`.
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        let mut set = Self::new();
        set.insert_span(index, index);
        set
    }

    /// Number of indices in the set.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the set holds no indices.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Smallest index in the set.
    #[must_use]
    pub fn first(&self) -> Option<usize> {
        self.spans.first().map(|&(first, _)| first)
    }

    /// Largest index in the set.
    #[must_use]
    pub fn last(&self) -> Option<usize> {
        self.spans.last().map(|&(_, last)| last)
    }

    /// The maximal runs of consecutive indices, in ascending order.
    pub fn ranges(&self) -> impl DoubleEndedIterator<Item = RangeInclusive<usize>> + '_ {
        self.spans.iter().map(|&(first, last)| first..=last)
    }

    /// Returns `true` if `index` is in the set.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        // First run that ends at or after `index`.
        let at = self.spans.partition_point(|&(_, last)| last < index);
        self.spans.get(at).is_some_and(|&(first, _)| first <= index)
    }

    /// Adds `index` to the set. Returns `true` if it was not already present.
    pub fn insert(&mut self, index: usize) -> bool {
        let before = self.len;
        self.insert_span(index, index);
        self.len != before
    }

    /// Adds every index in `range` to the set.
    pub fn insert_range(&mut self, range: Range<usize>) {
        if !range.is_empty() {
            self.insert_span(range.start, range.end - 1);
        }
    }

    fn insert_span(&mut self, first: usize, last: usize) {
        // Runs that overlap or touch `first..=last` get merged into it.
        let lo = self
            .spans
            .partition_point(|&(_, l)| l.saturating_add(1) < first);
        let hi = self
            .spans
            .partition_point(|&(f, _)| f <= last.saturating_add(1));
        let mut merged = (first, last);
        for &(f, l) in &self.spans[lo..hi] {
            merged.0 = merged.0.min(f);
            merged.1 = merged.1.max(l);
            self.len -= span_len(f, l);
        }
        self.len = self.len.saturating_add(span_len(merged.0, merged.1));
        self.spans.drain(lo..hi);
        self.spans.insert(lo, merged);
    }

    /// Iterates over the indices in ascending order.
    ///
    /// The iterator is double-ended, so `iter().rev()` walks descending.
    pub fn iter(&self) -> Indices<'_> {
        Indices {
            spans: &self.spans,
            front: self.first().unwrap_or(0),
            back: self.last().unwrap_or(0),
            remaining: self.len,
        }
    }
}

/// Size of `first..=last`, saturating for the full `usize` domain.
fn span_len(first: usize, last: usize) -> usize {
    (last - first).saturating_add(1)
}

impl fmt::Debug for IndexSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.ranges()).finish()
    }
}

impl From<Range<usize>> for IndexSet {
    fn from(range: Range<usize>) -> Self {
        Self::from_range(range)
    }
}

impl FromIterator<usize> for IndexSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl Extend<usize> for IndexSet {
    fn extend<I: IntoIterator<Item = usize>>(&mut self, iter: I) {
        for index in iter {
            self.insert(index);
        }
    }
}

impl<'a> IntoIterator for &'a IndexSet {
    type Item = usize;
    type IntoIter = Indices<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the indices of an [`IndexSet`].
#[derive(Clone, Debug)]
pub struct Indices<'a> {
    spans: &'a [(usize, usize)],
    /// Next index yielded from the front.
    front: usize,
    /// Next index yielded from the back.
    back: usize,
    remaining: usize,
}

impl Iterator for Indices<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let (&(_, last), rest) = self.spans.split_first()?;
        let index = self.front;
        self.remaining -= 1;
        if index < last {
            self.front = index + 1;
        } else if let Some(&(next, _)) = rest.first() {
            self.spans = rest;
            self.front = next;
        }
        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl DoubleEndedIterator for Indices<'_> {
    fn next_back(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let (&(first, _), rest) = self.spans.split_last()?;
        let index = self.back;
        self.remaining -= 1;
        if index > first {
            self.back = index - 1;
        } else if let Some(&(_, prev)) = rest.last() {
            self.spans = rest;
            self.back = prev;
        }
        Some(index)
    }
}

impl ExactSizeIterator for Indices<'_> {}

impl FusedIterator for Indices<'_> {}

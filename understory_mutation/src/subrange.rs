// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A mirror of a window into a larger collection.

use alloc::collections::VecDeque;
use core::ops::Range;

use crate::window::settle_leaf;
use crate::{InvalidMutation, Mutation, SubrangeInfo, Window};

/// A mutation addressed at a [`SubrangeState`].
pub type SubrangeMutation<T, L = ()> = Mutation<T, SubrangeInfo<L>>;

/// Mirrors a window of a conceptually larger collection.
///
/// Only the elements inside the window are held. [`SubrangeState::local_offset`]
/// places the first of them within the larger collection and
/// [`SubrangeState::global_count`] is that collection's size. Typical hosts are
/// virtualized lists that only realize what is near the viewport.
///
/// ## Example
///
/// ```rust
/// use understory_mutation::{Mutation, SubrangeState};
///
/// let mut state = SubrangeState::<char>::new();
/// state.apply(Mutation::reload(vec!['a', 'b', 'c'])).unwrap();
///
/// // Slide the window forward by one, revealing `d`.
/// state.apply(Mutation::scrolled(1, vec!['d'], 3).unwrap()).unwrap();
/// assert_eq!(state.local_offset(), 1);
/// assert_eq!(state.global_range(), 1..4);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubrangeState<T, L = ()> {
    values: Option<VecDeque<T>>,
    window: Window,
    leaf: Option<L>,
}

impl<T, L> Default for SubrangeState<T, L> {
    fn default() -> Self {
        Self {
            values: None,
            window: Window::default(),
            leaf: None,
        }
    }
}

impl<T, L> SubrangeState<T, L> {
    /// Creates an empty, unmaterialized state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The mirrored elements, if any mutation has touched them yet.
    #[must_use]
    pub const fn values(&self) -> Option<&VecDeque<T>> {
        self.values.as_ref()
    }

    /// Returns `true` once a mutation has materialized the element storage.
    #[must_use]
    pub const fn is_materialized(&self) -> bool {
        self.values.is_some()
    }

    /// Number of mirrored elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.as_ref().map_or(0, VecDeque::len)
    }

    /// Returns `true` if no elements are mirrored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Position of the first mirrored element within the larger collection.
    #[must_use]
    pub const fn local_offset(&self) -> usize {
        self.window.local_offset
    }

    /// Size of the larger collection.
    #[must_use]
    pub const fn global_count(&self) -> usize {
        self.window.global_count
    }

    /// Current window.
    #[must_use]
    pub const fn window(&self) -> Window {
        self.window
    }

    /// Leaf payload.
    #[must_use]
    pub const fn leaf(&self) -> Option<&L> {
        self.leaf.as_ref()
    }

    /// Positions in the larger collection covered by the mirrored elements.
    #[must_use]
    pub fn global_range(&self) -> Range<usize> {
        self.window.local_offset..self.window.local_offset + self.len()
    }

    /// Applies `mutation`, updating elements and window bookkeeping.
    ///
    /// Elements are skipped for metadata-only updates. When the mutation
    /// carries [`SubrangeInfo`], its set fields replace the window and leaf;
    /// otherwise the window follows [`Window::advanced`] and a reload clears
    /// the leaf. On error nothing changes.
    pub fn apply(&mut self, mutation: SubrangeMutation<T, L>) -> Result<(), InvalidMutation> {
        let kind = mutation.kind();
        let window = self.window.after(&mutation)?;
        let (mutation, info) = mutation.split_metadata();
        if !mutation.has_no_effect_on_elements() {
            mutation.check(self.len())?;
            mutation.apply(self.values.get_or_insert_with(VecDeque::new))?;
        }
        self.window = window;
        settle_leaf(&mut self.leaf, kind, info);
        Ok(())
    }
}

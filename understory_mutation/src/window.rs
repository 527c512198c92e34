// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Window bookkeeping shared by the windowed mirrors.

use crate::{InvalidMutation, Mutation, MutationKind};

/// Position of a mirrored window inside a larger conceptual collection.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Window {
    /// Position of the first mirrored element within the larger collection.
    pub local_offset: usize,
    /// Size of the larger collection.
    pub global_count: usize,
}

impl Window {
    /// Creates a window at `local_offset` over a collection of `global_count` elements.
    #[must_use]
    pub const fn new(local_offset: usize, global_count: usize) -> Self {
        Self {
            local_offset,
            global_count,
        }
    }

    /// The window after `mutation`, inferred from its kind alone.
    ///
    /// Used when a producer sends no explicit [`SubrangeInfo`]:
    /// - reload: offset `0`, count = number of values,
    /// - delete: count shrinks by the number of indices,
    /// - insert: count grows by the number of indices,
    /// - scroll by `n`: offset moves by `n`,
    /// - update and move: unchanged.
    pub fn advanced<T, M>(self, mutation: &Mutation<T, M>) -> Result<Self, InvalidMutation> {
        let kind = mutation.kind();
        let count = mutation.indices().len();
        let underflow = || InvalidMutation::WindowUnderflow { kind };
        let mut next = self;
        match kind {
            MutationKind::Reload => {
                next.local_offset = 0;
                next.global_count = mutation.values().len();
            }
            MutationKind::Delete => {
                next.global_count = self.global_count.checked_sub(count).ok_or_else(underflow)?;
            }
            MutationKind::Insert => next.global_count = self.global_count + count,
            MutationKind::Scroll(by) => {
                next.local_offset = self
                    .local_offset
                    .checked_add_signed(by)
                    .ok_or_else(underflow)?;
            }
            MutationKind::Update | MutationKind::Move(_) => {}
        }
        Ok(next)
    }

    /// The window after `mutation`: explicit [`SubrangeInfo`] fields when the
    /// mutation carries metadata, [`Window::advanced`] otherwise.
    pub fn after<T, L>(self, mutation: &Mutation<T, SubrangeInfo<L>>) -> Result<Self, InvalidMutation> {
        match mutation.metadata() {
            Some(info) => Ok(self.overridden(info)),
            None => self.advanced(mutation),
        }
    }

    /// The window with every field `info` sets replaced.
    #[must_use]
    pub fn overridden<L>(self, info: &SubrangeInfo<L>) -> Self {
        Self {
            local_offset: info.local_offset.unwrap_or(self.local_offset),
            global_count: info.global_count.unwrap_or(self.global_count),
        }
    }
}

/// Explicit windowing metadata carried by a mutation.
///
/// Every field is optional; only the fields that are set replace the
/// corresponding state. This lets a producer drive windowing itself (for
/// example with server-driven paging) while a mirror that receives no
/// metadata infers the window from each mutation's kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubrangeInfo<L = ()> {
    /// New position of the first mirrored element.
    pub local_offset: Option<usize>,
    /// New size of the larger collection.
    pub global_count: Option<usize>,
    /// New leaf payload.
    pub leaf: Option<L>,
}

impl<L> Default for SubrangeInfo<L> {
    fn default() -> Self {
        Self {
            local_offset: None,
            global_count: None,
            leaf: None,
        }
    }
}

impl<L> SubrangeInfo<L> {
    /// Metadata that sets nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the local offset.
    #[must_use]
    pub fn local_offset(mut self, local_offset: usize) -> Self {
        self.local_offset = Some(local_offset);
        self
    }

    /// Sets the global count.
    #[must_use]
    pub fn global_count(mut self, global_count: usize) -> Self {
        self.global_count = Some(global_count);
        self
    }

    /// Sets the leaf payload.
    #[must_use]
    pub fn leaf(mut self, leaf: L) -> Self {
        self.leaf = Some(leaf);
        self
    }
}

/// Settles a mirror's leaf after a mutation of `kind` carrying `info`.
///
/// An explicit leaf replaces the current one. Without metadata a reload
/// clears it; every other kind keeps it.
pub(crate) fn settle_leaf<L>(leaf: &mut Option<L>, kind: MutationKind, info: Option<SubrangeInfo<L>>) {
    match info {
        Some(SubrangeInfo {
            leaf: Some(next), ..
        }) => *leaf = Some(next),
        Some(_) => {}
        None if kind == MutationKind::Reload => *leaf = None,
        None => {}
    }
}

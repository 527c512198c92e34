// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hierarchical mirrors where every node's child list is a window.

use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::ops::Range;

use crate::window::settle_leaf;
use crate::{InvalidMutation, Mutation, MutationKind, SubrangeInfo, Window};

/// A mutation of a windowed tree node.
///
/// Like [`TreeMutation`](crate::TreeMutation), but the metadata slot carries
/// [`SubrangeInfo`], so each node's child list can be a window into a larger
/// set of children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeSubrangeMutation<L>(Mutation<Self, SubrangeInfo<L>>);

impl<L> TreeSubrangeMutation<L> {
    /// Wraps a mutation of a node's windowed child list.
    #[must_use]
    pub const fn new(mutation: Mutation<Self, SubrangeInfo<L>>) -> Self {
        Self(mutation)
    }

    /// A childless node carrying `leaf`.
    #[must_use]
    pub fn leaf(leaf: L) -> Self {
        Self(Mutation::metadata_only(SubrangeInfo::new().leaf(leaf)))
    }

    /// A node carrying `leaf` whose children are all of `children`.
    #[must_use]
    pub fn node(leaf: L, children: Vec<Self>) -> Self {
        let info = SubrangeInfo::new()
            .local_offset(0)
            .global_count(children.len())
            .leaf(leaf);
        Self(Mutation::reload(children).with_metadata(info))
    }

    /// The wrapped mutation.
    #[must_use]
    pub const fn as_mutation(&self) -> &Mutation<Self, SubrangeInfo<L>> {
        &self.0
    }

    /// Unwraps the mutation.
    #[must_use]
    pub fn into_mutation(self) -> Mutation<Self, SubrangeInfo<L>> {
        self.0
    }
}

impl<L> From<Mutation<TreeSubrangeMutation<L>, SubrangeInfo<L>>> for TreeSubrangeMutation<L> {
    fn from(mutation: Mutation<Self, SubrangeInfo<L>>) -> Self {
        Self(mutation)
    }
}

/// A tree node whose child list mirrors a window of a larger set of children.
///
/// Window and leaf bookkeeping follow [`SubrangeState`](crate::SubrangeState);
/// child handling follows [`TreeState`](crate::TreeState), including routing
/// updates into existing children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeSubrangeState<L> {
    children: Option<VecDeque<Self>>,
    window: Window,
    leaf: Option<L>,
}

impl<L> Default for TreeSubrangeState<L> {
    fn default() -> Self {
        Self {
            children: None,
            window: Window::default(),
            leaf: None,
        }
    }
}

impl<L> TreeSubrangeState<L> {
    /// Creates an empty node.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a node by applying `mutation` to an empty one.
    pub fn from_mutation(mutation: TreeSubrangeMutation<L>) -> Result<Self, InvalidMutation> {
        let mut node = Self::new();
        node.apply(mutation)?;
        Ok(node)
    }

    /// The mirrored children, if materialized.
    #[must_use]
    pub const fn children(&self) -> Option<&VecDeque<Self>> {
        self.children.as_ref()
    }

    /// Number of mirrored children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.as_ref().map_or(0, VecDeque::len)
    }

    /// Returns `true` if no children are mirrored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Position of the first mirrored child among all children.
    #[must_use]
    pub const fn local_offset(&self) -> usize {
        self.window.local_offset
    }

    /// Total number of children, mirrored or not.
    #[must_use]
    pub const fn global_count(&self) -> usize {
        self.window.global_count
    }

    /// Positions among all children covered by the mirrored ones.
    #[must_use]
    pub fn global_range(&self) -> Range<usize> {
        self.window.local_offset..self.window.local_offset + self.len()
    }

    /// The node's payload.
    #[must_use]
    pub const fn leaf(&self) -> Option<&L> {
        self.leaf.as_ref()
    }

    /// The descendant reached by following `path` (local child indices).
    #[must_use]
    pub fn node_at(&self, path: &[usize]) -> Option<&Self> {
        path.iter()
            .try_fold(self, |node, &index| node.children.as_ref()?.get(index))
    }

    /// Applies `mutation` to this node; on error nothing changes.
    pub fn apply(&mut self, mutation: TreeSubrangeMutation<L>) -> Result<(), InvalidMutation> {
        if let Err(err) = self.check(&mutation) {
            tracing::debug!(kind = ?mutation.0.kind(), %err, "rejected windowed tree mutation");
            return Err(err);
        }
        self.apply_checked(mutation)
    }

    /// Checks that `mutation`, including every nested mutation, fits this node.
    pub fn check(&self, mutation: &TreeSubrangeMutation<L>) -> Result<(), InvalidMutation> {
        let mutation = &mutation.0;
        self.window.after(mutation)?;
        if mutation.has_no_effect_on_elements() {
            return Ok(());
        }
        mutation.check(self.len())?;
        if mutation.kind() == MutationKind::Update {
            for (index, nested) in mutation.indices().iter().zip(mutation.values()) {
                self.child(index)?.check(nested)?;
            }
        } else {
            let fresh = Self::new();
            for nested in mutation.values() {
                fresh.check(nested)?;
            }
        }
        Ok(())
    }

    fn child(&self, index: usize) -> Result<&Self, InvalidMutation> {
        self.children
            .as_ref()
            .and_then(|children| children.get(index))
            .ok_or(InvalidMutation::IndexOutOfBounds {
                index,
                len: self.len(),
            })
    }

    fn apply_checked(&mut self, mutation: TreeSubrangeMutation<L>) -> Result<(), InvalidMutation> {
        let kind = mutation.0.kind();
        let window = self.window.after(&mutation.0)?;
        let (mutation, info) = mutation.0.split_metadata();
        if !mutation.has_no_effect_on_elements() {
            let children = self.children.get_or_insert_with(VecDeque::new);
            if kind == MutationKind::Update {
                let (_, indices, values, _) = mutation.into_parts();
                for (index, nested) in indices.iter().zip(values) {
                    let len = children.len();
                    children
                        .get_mut(index)
                        .ok_or(InvalidMutation::IndexOutOfBounds { index, len })?
                        .apply_checked(nested)?;
                }
            } else {
                mutation
                    .try_map_values(|nested| {
                        let mut child = Self::new();
                        child.apply_checked(nested).map(|()| child)
                    })?
                    .apply(children)?;
            }
        }
        self.window = window;
        settle_leaf(&mut self.leaf, kind, info);
        Ok(())
    }
}

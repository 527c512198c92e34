// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mirrors of hierarchical collections fed by nested mutations.

use alloc::vec::Vec;

use crate::{InvalidMutation, Mutation, MutationKind};

/// A mutation of a tree node whose values are themselves tree mutations.
///
/// The metadata slot carries the node's own payload `L`. Each value describes
/// one child: for an [`MutationKind::Update`] it is routed into the existing
/// child at that index, for every other kind it builds a fresh child.
///
/// The values live in the mutation's `Vec`, so the recursion has a finite
/// representation without extra boxing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeMutation<L>(Mutation<Self, L>);

impl<L> TreeMutation<L> {
    /// Wraps a mutation of a node's child list.
    #[must_use]
    pub const fn new(mutation: Mutation<Self, L>) -> Self {
        Self(mutation)
    }

    /// A childless node carrying `leaf`.
    ///
    /// Applied to a fresh node this only sets the payload; its child list
    /// stays unmaterialized.
    #[must_use]
    pub fn leaf(leaf: L) -> Self {
        Self(Mutation::metadata_only(leaf))
    }

    /// A node carrying `leaf` whose child list is reloaded from `children`.
    #[must_use]
    pub fn node(leaf: L, children: Vec<Self>) -> Self {
        Self(Mutation::reload(children).with_metadata(leaf))
    }

    /// The wrapped mutation.
    #[must_use]
    pub const fn as_mutation(&self) -> &Mutation<Self, L> {
        &self.0
    }

    /// Unwraps the mutation.
    #[must_use]
    pub fn into_mutation(self) -> Mutation<Self, L> {
        self.0
    }
}

impl<L> From<Mutation<TreeMutation<L>, L>> for TreeMutation<L> {
    fn from(mutation: Mutation<Self, L>) -> Self {
        Self(mutation)
    }
}

/// Mirrors one node of a hierarchical collection and, recursively, its children.
///
/// Children are exclusively owned by their parent's child list. Upward
/// traversal goes through a [`TreeCursor`], which borrows the tree and
/// remembers the path it took.
///
/// ## Example
///
/// ```rust
/// use understory_mutation::{Mutation, TreeMutation, TreeState};
///
/// let mut tree = TreeState::new();
/// tree.apply(TreeMutation::node(
///     "root",
///     vec![TreeMutation::leaf("x"), TreeMutation::leaf("y")],
/// ))
/// .unwrap();
///
/// // Give `y` a child without rebuilding it.
/// let grow_y = TreeMutation::new(Mutation::inserted_at(TreeMutation::leaf("y.0"), 0));
/// tree.apply(TreeMutation::new(Mutation::updated_at(grow_y, 1)))
///     .unwrap();
///
/// assert_eq!(tree.node_at(&[1, 0]).and_then(|n| n.metadata()), Some(&"y.0"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeState<L> {
    metadata: Option<L>,
    children: Option<Vec<Self>>,
}

impl<L> Default for TreeState<L> {
    fn default() -> Self {
        Self {
            metadata: None,
            children: None,
        }
    }
}

impl<L> TreeState<L> {
    /// Creates an empty node.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a node by applying `mutation` to an empty one.
    pub fn from_mutation(mutation: TreeMutation<L>) -> Result<Self, InvalidMutation> {
        let mut node = Self::new();
        node.apply(mutation)?;
        Ok(node)
    }

    /// The node's payload.
    #[must_use]
    pub const fn metadata(&self) -> Option<&L> {
        self.metadata.as_ref()
    }

    /// The node's children; empty when not materialized.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Returns `true` once a mutation has materialized the child list.
    #[must_use]
    pub const fn is_materialized(&self) -> bool {
        self.children.is_some()
    }

    /// The descendant reached by following `path` (child indices from this node).
    #[must_use]
    pub fn node_at(&self, path: &[usize]) -> Option<&Self> {
        path.iter()
            .try_fold(self, |node, &index| node.children().get(index))
    }

    /// A cursor positioned at this node.
    #[must_use]
    pub fn cursor(&self) -> TreeCursor<'_, L> {
        TreeCursor {
            node: self,
            ancestors: Vec::new(),
        }
    }

    /// Applies `mutation` to this node.
    ///
    /// Metadata, when present, replaces the node's payload. Updates recurse
    /// into the addressed children so unrelated descendants survive; every
    /// other kind builds fresh children and edits the child list. The whole
    /// mutation is checked first, so on error the tree is unchanged.
    pub fn apply(&mut self, mutation: TreeMutation<L>) -> Result<(), InvalidMutation> {
        if let Err(err) = self.check(&mutation) {
            tracing::debug!(kind = ?mutation.0.kind(), %err, "rejected tree mutation");
            return Err(err);
        }
        self.apply_checked(mutation)
    }

    /// Checks that `mutation`, including every nested mutation, fits this node.
    pub fn check(&self, mutation: &TreeMutation<L>) -> Result<(), InvalidMutation> {
        let mutation = &mutation.0;
        if mutation.has_no_effect_on_elements() {
            return Ok(());
        }
        let children = self.children();
        mutation.check(children.len())?;
        if mutation.kind() == MutationKind::Update {
            for (index, nested) in mutation.indices().iter().zip(mutation.values()) {
                child_at(children, index)?.check(nested)?;
            }
        } else {
            let fresh = Self::new();
            for nested in mutation.values() {
                fresh.check(nested)?;
            }
        }
        Ok(())
    }

    fn apply_checked(&mut self, mutation: TreeMutation<L>) -> Result<(), InvalidMutation> {
        let (mutation, metadata) = mutation.0.split_metadata();
        if let Some(metadata) = metadata {
            self.metadata = Some(metadata);
        }
        if mutation.has_no_effect_on_elements() {
            return Ok(());
        }
        let children = self.children.get_or_insert_with(Vec::new);
        if mutation.kind() == MutationKind::Update {
            let (_, indices, values, _) = mutation.into_parts();
            for (index, nested) in indices.iter().zip(values) {
                let len = children.len();
                children
                    .get_mut(index)
                    .ok_or(InvalidMutation::IndexOutOfBounds { index, len })?
                    .apply_checked(nested)?;
            }
            Ok(())
        } else {
            mutation
                .try_map_values(|nested| {
                    let mut child = Self::new();
                    child.apply_checked(nested).map(|()| child)
                })?
                .apply(children)
        }
    }
}

fn child_at<L>(children: &[TreeState<L>], index: usize) -> Result<&TreeState<L>, InvalidMutation> {
    children.get(index).ok_or(InvalidMutation::IndexOutOfBounds {
        index,
        len: children.len(),
    })
}

/// A borrowing cursor over a [`TreeState`] that can walk back up.
///
/// The cursor keeps the chain of ancestors it descended through, which plays
/// the role of a parent back-reference without owning anything.
#[derive(Clone, Debug)]
pub struct TreeCursor<'a, L> {
    node: &'a TreeState<L>,
    /// Ancestors from the root down, each with the child index taken from it.
    ancestors: Vec<(&'a TreeState<L>, usize)>,
}

impl<'a, L> TreeCursor<'a, L> {
    /// The node under the cursor.
    #[must_use]
    pub const fn node(&self) -> &'a TreeState<L> {
        self.node
    }

    /// Number of steps from the cursor's root.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.ancestors.len()
    }

    /// Child indices leading from the root to the current node.
    pub fn path(&self) -> impl Iterator<Item = usize> + '_ {
        self.ancestors.iter().map(|&(_, index)| index)
    }

    /// The parent of the current node, if it is not the root.
    #[must_use]
    pub fn parent(&self) -> Option<&'a TreeState<L>> {
        self.ancestors.last().map(|&(parent, _)| parent)
    }

    /// Moves to the parent. Returns `false` at the root.
    pub fn to_parent(&mut self) -> bool {
        match self.ancestors.pop() {
            Some((parent, _)) => {
                self.node = parent;
                true
            }
            None => false,
        }
    }

    /// Moves to the child at `index`. Returns `false` if there is none.
    pub fn to_child(&mut self, index: usize) -> bool {
        match self.node.children().get(index) {
            Some(child) => {
                self.ancestors.push((self.node, index));
                self.node = child;
                true
            }
            None => false,
        }
    }

    /// Moves to the next node in depth-first pre-order.
    ///
    /// Returns `false` once the traversal is exhausted, leaving the cursor at the root.
    pub fn next_depth_first(&mut self) -> bool {
        if self.to_child(0) {
            return true;
        }
        while let Some((parent, index)) = self.ancestors.pop() {
            self.node = parent;
            if self.to_child(index + 1) {
                return true;
            }
        }
        false
    }
}

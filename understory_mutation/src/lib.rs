// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_mutation --heading-base-level=0

//! Understory Mutation: incremental changes to ordered collections.
//!
//! This crate provides a value-oriented description of structural changes to an
//! ordered collection, plus the algorithms to mirror those changes on the
//! consumer side. It is intended to sit between a data source and a list,
//! table, or outline view that animates what changed.
//!
//! The core concepts are:
//!
//! - [`Mutation`]: one atomic change (see [`MutationKind`]): delete, insert,
//!   scroll, update, move, or reload, addressed by an [`IndexSet`] and carrying
//!   new values and optional metadata.
//! - [`Mutation::apply`]: applies a mutation to any [`Sequence`] (`Vec` or
//!   `VecDeque`). [`Mutation::resulting_len`] tracks sizes without materializing.
//! - [`SubrangeState`]: mirrors a window of a larger collection. Mutations may
//!   carry [`SubrangeInfo`] to drive the window explicitly, or let it follow
//!   from each mutation's kind (see [`Window::advanced`]).
//! - [`TreeState`] and [`TreeSubrangeState`]: mirror hierarchical collections.
//!   Their mutations carry nested mutations as values; an update is routed into
//!   the existing child so deep partial changes keep unrelated descendants.
//! - [`SetMutation`] and [`SortedMirror`]: turn an unordered batch of deleted,
//!   inserted, or updated elements into the ordered mutations that take a
//!   sorted mirror from its old state to its new one.
//!
//! Mutations are *differential*. Each one only makes sense on the state produced
//! by the one before, so producers must deliver them in order, without loss or
//! duplication. Nothing here detects a dropped or reordered mutation.
//!
//! This crate deliberately does **not** animate, schedule, or perform I/O.
//! Host frameworks own delivery and presentation; everything here is a
//! synchronous, deterministic transformation of in-memory values.
//!
//! ## Minimal example
//!
//! ```rust
//! use understory_mutation::{IndexSet, Mutation};
//!
//! let mut mirror = vec!['a', 'b', 'c'];
//!
//! // Remove `a` and `c` (pre-mutation indices).
//! Mutation::<char>::deleted(IndexSet::from_iter([0, 2]))
//!     .apply(&mut mirror)
//!     .unwrap();
//! assert_eq!(mirror, ['b']);
//!
//! // Insert so that `x` lands at 0 and `y` at 2 (post-mutation indices).
//! Mutation::<char>::inserted(IndexSet::from_iter([0, 2]), vec!['x', 'y'])
//!     .unwrap()
//!     .apply(&mut mirror)
//!     .unwrap();
//! assert_eq!(mirror, ['x', 'b', 'y']);
//! ```
//!
//! ## Sorted lists from unordered changes
//!
//! ```rust
//! use understory_mutation::{Mutation, SetMutation};
//!
//! // Rows are `(id, name)`: identity is the id, order is the name.
//! let mut mirror = vec![(1, "a"), (2, "b"), (3, "c"), (4, "d")];
//!
//! // Row 2 was renamed to `e`: it moves to the end, then updates there.
//! let out = SetMutation::update(vec![(2, "e")])
//!     .apply_to(&mut mirror, |a, b| a.0 == b.0, |a, b| a.1.cmp(b.1))
//!     .unwrap();
//! assert_eq!(
//!     out,
//!     [
//!         Mutation::<(i32, &str)>::moved_from(1, 3),
//!         Mutation::<(i32, &str)>::updated_at((2, "e"), 3),
//!     ]
//! );
//! assert_eq!(mirror, [(1, "a"), (3, "c"), (4, "d"), (2, "e")]);
//! ```
//!
//! ## Errors
//!
//! A mutation that does not fit its mirror yields an [`InvalidMutation`] and
//! leaves the mirror untouched. These errors mean the producer is broken; the
//! usual recovery is to discard the mirror and request a fresh reload.
//!
//! ## Features
//!
//! - `std` *(default)*: enables `std` support in `thiserror` and `tracing`.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod error;
mod index_set;
mod kind;
mod mutation;
mod sequence;
mod set_diff;
mod subrange;
mod tree;
mod tree_subrange;
mod window;

pub use error::InvalidMutation;
pub use index_set::{IndexSet, Indices};
pub use kind::MutationKind;
pub use mutation::Mutation;
pub use sequence::Sequence;
pub use set_diff::{SetMutation, SetMutationKind, SortedMirror};
pub use subrange::{SubrangeMutation, SubrangeState};
pub use tree::{TreeCursor, TreeMutation, TreeState};
pub use tree_subrange::{TreeSubrangeMutation, TreeSubrangeState};
pub use window::{SubrangeInfo, Window};

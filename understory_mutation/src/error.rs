// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The error returned when a mutation cannot be applied.

use thiserror::Error;

use crate::MutationKind;

/// A mutation that violates its own invariants or does not fit the mirror it
/// is applied to.
///
/// These errors mean the producer emitted something inconsistent. They are
/// deterministic and never worth retrying: the usual recovery is to discard
/// the mirror and ask the producer for a fresh [`MutationKind::Reload`].
///
/// A failed `apply` leaves the mirror exactly as it was before the call.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvalidMutation {
    /// The number of values does not match the number of indices.
    #[error("{kind:?} carries {values} values for {indices} indices")]
    CountMismatch {
        /// Kind of the offending mutation.
        kind: MutationKind,
        /// Number of indices in the index set.
        indices: usize,
        /// Number of values.
        values: usize,
    },
    /// A delete or move carried values.
    #[error("{kind:?} must not carry values, got {values}")]
    UnexpectedValues {
        /// Kind of the offending mutation.
        kind: MutationKind,
        /// Number of values.
        values: usize,
    },
    /// An index does not address an element of the sequence.
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds {
        /// The offending index.
        index: usize,
        /// Length of the sequence at the time the index was used.
        len: usize,
    },
    /// A move target lies beyond the end of the sequence after removal.
    #[error("move target {target} out of bounds for length {len} after removal")]
    MoveTargetOutOfBounds {
        /// Requested target.
        target: usize,
        /// Length of the sequence once the moved run was removed.
        len: usize,
    },
    /// A scroll removes more elements than the sequence holds.
    #[error("cannot scroll by {by} over {len} elements")]
    ScrollOutOfBounds {
        /// Requested scroll amount.
        by: isize,
        /// Length of the sequence.
        len: usize,
    },
    /// Default window bookkeeping would drive an offset or count below zero.
    #[error("window bookkeeping underflow applying {kind:?}")]
    WindowUnderflow {
        /// Kind of the offending mutation.
        kind: MutationKind,
    },
    /// A set-diff delete or update referenced an element the mirror does not hold.
    #[error("element not found in sorted mirror")]
    ElementNotFound,
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Operation tags for [`Mutation`](crate::Mutation).

/// The structural change a [`Mutation`](crate::Mutation) describes.
///
/// The meaning of the mutation's index set depends on the kind: deletes and
/// moves address elements *before* the change, inserts and scrolls address
/// positions *after* it, and updates address positions that are the same on
/// both sides.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MutationKind {
    /// Remove the elements at the given pre-mutation indices. Carries no values.
    Delete,
    /// Insert values so that they land at the given post-mutation indices.
    Insert,
    /// Slide a window over a larger collection.
    ///
    /// A positive amount removes that many elements from the start and appends
    /// the values at the end; a negative amount removes from the end and
    /// prepends the values. The index set holds the revealed positions of the
    /// new values.
    Scroll(isize),
    /// Replace elements in place, preserving their identity.
    ///
    /// An update without values touches no elements and only carries metadata.
    Update,
    /// Remove the elements at the given pre-mutation indices and reinsert them,
    /// as one contiguous run in their original relative order, starting at the
    /// target index (counted after removal).
    Move(usize),
    /// Replace the whole collection with the values.
    Reload,
}

impl MutationKind {
    /// Returns `true` if mutations of this kind must carry exactly one value per index.
    #[must_use]
    pub const fn pairs_values_with_indices(self) -> bool {
        matches!(self, Self::Insert | Self::Update | Self::Scroll(_))
    }

    /// Returns `true` if mutations of this kind never carry values.
    #[must_use]
    pub const fn forbids_values(self) -> bool {
        matches!(self, Self::Delete | Self::Move(_))
    }
}

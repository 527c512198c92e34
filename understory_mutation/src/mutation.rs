// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The mutation value type and its application to flat sequences.

use alloc::vec::Vec;

use crate::{IndexSet, InvalidMutation, MutationKind, Sequence};

/// One atomic structural change to an ordered collection.
///
/// A mutation is *differential*: it only makes sense when applied to the exact
/// state produced by the mutation before it. Producers must deliver mutations
/// in order, without loss or duplication. The first mutation of a stream is
/// conventionally a [`Mutation::reload`] so a fresh consumer needs no prior state.
///
/// `T` is the element type and `M` an optional metadata payload that rides
/// along with the change (windowing information, a tree node's own value, …).
///
/// The fields are read-only so consumers can drive animations from a mutation
/// they are about to apply (see [`Mutation::apply_cloned`]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mutation<T, M = ()> {
    kind: MutationKind,
    metadata: Option<M>,
    indices: IndexSet,
    values: Vec<T>,
}

impl<T, M> Mutation<T, M> {
    /// Creates a mutation, validating that `indices` and `values` fit `kind`.
    ///
    /// Inserts, updates, and scrolls need one value per index (an update with
    /// no values at all is a metadata-only update). Deletes and moves must not
    /// carry values. Reloads accept anything.
    pub fn new(
        kind: MutationKind,
        indices: IndexSet,
        values: Vec<T>,
    ) -> Result<Self, InvalidMutation> {
        check_shape(kind, &indices, values.len())?;
        Ok(Self {
            kind,
            metadata: None,
            indices,
            values,
        })
    }

    pub(crate) fn from_parts_unchecked(kind: MutationKind, indices: IndexSet, values: Vec<T>) -> Self {
        Self {
            kind,
            metadata: None,
            indices,
            values,
        }
    }

    /// Replaces the whole collection with `values`.
    #[must_use]
    pub fn reload(values: Vec<T>) -> Self {
        let indices = IndexSet::from_range(0..values.len());
        Self::from_parts_unchecked(MutationKind::Reload, indices, values)
    }

    /// Deletes the elements at `indices` (pre-mutation positions).
    #[must_use]
    pub fn deleted(indices: impl Into<IndexSet>) -> Self {
        Self::from_parts_unchecked(MutationKind::Delete, indices.into(), Vec::new())
    }

    /// Deletes the element at `index`.
    #[must_use]
    pub fn deleted_at(index: usize) -> Self {
        Self::deleted(IndexSet::from_index(index))
    }

    /// Inserts `values` so that they land at `indices` (post-mutation positions).
    pub fn inserted(indices: impl Into<IndexSet>, values: Vec<T>) -> Result<Self, InvalidMutation> {
        Self::new(MutationKind::Insert, indices.into(), values)
    }

    /// Inserts a single `value` at `index`.
    #[must_use]
    pub fn inserted_at(value: T, index: usize) -> Self {
        Self::from_parts_unchecked(
            MutationKind::Insert,
            IndexSet::from_index(index),
            alloc::vec![value],
        )
    }

    /// Replaces the elements at `indices` with `values`, preserving identity.
    pub fn updated(indices: impl Into<IndexSet>, values: Vec<T>) -> Result<Self, InvalidMutation> {
        Self::new(MutationKind::Update, indices.into(), values)
    }

    /// Replaces the element at `index` with `value`.
    #[must_use]
    pub fn updated_at(value: T, index: usize) -> Self {
        Self::from_parts_unchecked(
            MutationKind::Update,
            IndexSet::from_index(index),
            alloc::vec![value],
        )
    }

    /// Moves the elements at `indices` as one contiguous run starting at `to`.
    ///
    /// `to` is counted after the run has been removed.
    #[must_use]
    pub fn moved(indices: impl Into<IndexSet>, to: usize) -> Self {
        Self::from_parts_unchecked(MutationKind::Move(to), indices.into(), Vec::new())
    }

    /// Moves the single element at `from` so it ends up at `to`.
    #[must_use]
    pub fn moved_from(from: usize, to: usize) -> Self {
        Self::moved(IndexSet::from_index(from), to)
    }

    /// Scrolls a window of `len_before` elements by `by`, revealing `values`.
    ///
    /// The revealed indices are derived: appended positions for a positive
    /// `by`, leading positions for a negative one.
    pub fn scrolled(by: isize, values: Vec<T>, len_before: usize) -> Result<Self, InvalidMutation> {
        let dropped = by.unsigned_abs();
        let Some(kept) = len_before.checked_sub(dropped) else {
            return Err(InvalidMutation::ScrollOutOfBounds {
                by,
                len: len_before,
            });
        };
        let indices = if by > 0 {
            IndexSet::from_range(kept..kept + values.len())
        } else {
            IndexSet::from_range(0..values.len())
        };
        Ok(Self::from_parts_unchecked(
            MutationKind::Scroll(by),
            indices,
            values,
        ))
    }

    /// An update that touches no elements and only carries `metadata`.
    #[must_use]
    pub fn metadata_only(metadata: M) -> Self {
        Self::from_parts_unchecked(MutationKind::Update, IndexSet::new(), Vec::new())
            .with_metadata(metadata)
    }

    /// Attaches `metadata`, replacing any previous payload.
    #[must_use]
    pub fn with_metadata(mut self, metadata: M) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Drops the metadata, re-typing the payload slot.
    #[must_use]
    pub fn without_metadata<N>(self) -> Mutation<T, N> {
        Mutation {
            kind: self.kind,
            metadata: None,
            indices: self.indices,
            values: self.values,
        }
    }

    /// Detaches the metadata, returning a bare mutation and the payload.
    #[must_use]
    pub fn split_metadata(self) -> (Mutation<T>, Option<M>) {
        let metadata = self.metadata;
        let bare = Mutation {
            kind: self.kind,
            metadata: None,
            indices: self.indices,
            values: self.values,
        };
        (bare, metadata)
    }

    /// The structural change this mutation performs.
    #[must_use]
    pub const fn kind(&self) -> MutationKind {
        self.kind
    }

    /// The affected indices. See [`MutationKind`] for whether they are pre- or post-mutation.
    #[must_use]
    pub const fn indices(&self) -> &IndexSet {
        &self.indices
    }

    /// New or updated values, in index order.
    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Optional metadata payload.
    #[must_use]
    pub const fn metadata(&self) -> Option<&M> {
        self.metadata.as_ref()
    }

    /// Splits the mutation into kind, indices, values, and metadata.
    #[must_use]
    pub fn into_parts(self) -> (MutationKind, IndexSet, Vec<T>, Option<M>) {
        (self.kind, self.indices, self.values, self.metadata)
    }

    /// Returns `true` if applying this mutation leaves the elements untouched.
    ///
    /// That is the case for an update without values. Consumers check this
    /// before touching a mirrored sequence so metadata-only updates skip it.
    #[must_use]
    pub fn has_no_effect_on_elements(&self) -> bool {
        self.kind == MutationKind::Update && self.values.is_empty()
    }

    /// Signed change in element count.
    ///
    /// `None` for a reload, whose result does not depend on the previous
    /// length, and for a change too large to express as an `isize`.
    #[must_use]
    pub fn len_delta(&self) -> Option<isize> {
        match self.kind {
            MutationKind::Reload => None,
            MutationKind::Delete => isize::try_from(self.indices.len()).ok().map(|n| -n),
            MutationKind::Insert => isize::try_from(self.indices.len()).ok(),
            MutationKind::Scroll(by) => isize::try_from(self.values.len())
                .ok()?
                .checked_sub_unsigned(by.unsigned_abs()),
            MutationKind::Update | MutationKind::Move(_) => Some(0),
        }
    }

    /// Number of elements after applying this mutation to a sequence of `len` elements.
    ///
    /// This does not materialize anything, so windowing and diffing can track
    /// sizes cheaply.
    #[must_use]
    pub fn resulting_len(&self, len: usize) -> usize {
        match self.kind {
            MutationKind::Reload => self.values.len(),
            MutationKind::Delete => len.saturating_sub(self.indices.len()),
            MutationKind::Insert => len + self.indices.len(),
            MutationKind::Scroll(by) => (len + self.values.len()).saturating_sub(by.unsigned_abs()),
            MutationKind::Update | MutationKind::Move(_) => len,
        }
    }

    /// Checks that this mutation can be applied to a sequence of `len` elements.
    pub fn check(&self, len: usize) -> Result<(), InvalidMutation> {
        check_shape(self.kind, &self.indices, self.values.len())?;
        let count = self.indices.len();
        match self.kind {
            MutationKind::Reload => Ok(()),
            MutationKind::Update if self.values.is_empty() => Ok(()),
            MutationKind::Delete | MutationKind::Update => check_existing(&self.indices, len),
            MutationKind::Insert => match self.indices.last() {
                // Ascending distinct indices fit iff the largest lands inside the grown sequence.
                Some(last) if last >= len.saturating_add(count) => {
                    Err(InvalidMutation::IndexOutOfBounds { index: last, len })
                }
                _ => Ok(()),
            },
            MutationKind::Scroll(by) => {
                if by.unsigned_abs() > len {
                    Err(InvalidMutation::ScrollOutOfBounds { by, len })
                } else {
                    Ok(())
                }
            }
            MutationKind::Move(target) => {
                check_existing(&self.indices, len)?;
                let remaining = len - count;
                if target > remaining {
                    Err(InvalidMutation::MoveTargetOutOfBounds {
                        target,
                        len: remaining,
                    })
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Applies this mutation to `target` in place.
    ///
    /// The mutation is checked against `target` first; on error `target` is
    /// left untouched.
    pub fn apply<S>(self, target: &mut S) -> Result<(), InvalidMutation>
    where
        S: Sequence<Item = T> + ?Sized,
    {
        if let Err(err) = self.check(target.len()) {
            tracing::debug!(kind = ?self.kind, len = target.len(), %err, "rejected mutation");
            return Err(err);
        }
        tracing::trace!(
            kind = ?self.kind,
            indices = self.indices.len(),
            values = self.values.len(),
            "applying mutation"
        );
        match self.kind {
            MutationKind::Reload => target.reset(self.values),
            MutationKind::Delete => remove_descending(target, &self.indices),
            MutationKind::Insert => {
                for (index, value) in self.indices.iter().zip(self.values) {
                    target.insert(index, value);
                }
            }
            MutationKind::Scroll(by) => {
                let dropped = by.unsigned_abs();
                if by > 0 {
                    for _ in 0..dropped {
                        target.pop_front();
                    }
                    for value in self.values {
                        target.push_back(value);
                    }
                } else {
                    for _ in 0..dropped {
                        target.pop_back();
                    }
                    for value in self.values.into_iter().rev() {
                        target.push_front(value);
                    }
                }
            }
            MutationKind::Update => {
                for (index, value) in self.indices.iter().zip(self.values) {
                    target.replace(index, value);
                }
            }
            MutationKind::Move(to) => {
                let mut run = Vec::with_capacity(self.indices.len());
                for index in self.indices.iter().rev() {
                    run.push(target.remove(index));
                }
                for (offset, value) in run.into_iter().rev().enumerate() {
                    target.insert(to + offset, value);
                }
            }
        }
        Ok(())
    }

    /// Applies a copy of this mutation to `target`, keeping `self` readable.
    pub fn apply_cloned<S>(&self, target: &mut S) -> Result<(), InvalidMutation>
    where
        S: Sequence<Item = T> + ?Sized,
        T: Clone,
    {
        Mutation::<T, ()>::from_parts_unchecked(self.kind, self.indices.clone(), self.values.clone())
            .apply(target)
    }

    /// Maps every value, keeping kind, indices, and metadata.
    #[must_use]
    pub fn map_values<U>(self, f: impl FnMut(T) -> U) -> Mutation<U, M> {
        Mutation {
            kind: self.kind,
            metadata: self.metadata,
            indices: self.indices,
            values: self.values.into_iter().map(f).collect(),
        }
    }

    /// Maps every value with a fallible function, stopping at the first error.
    pub fn try_map_values<U, E>(
        self,
        f: impl FnMut(T) -> Result<U, E>,
    ) -> Result<Mutation<U, M>, E> {
        Ok(Mutation {
            kind: self.kind,
            metadata: self.metadata,
            indices: self.indices,
            values: self.values.into_iter().map(f).collect::<Result<_, _>>()?,
        })
    }

    /// Maps the metadata payload, if any.
    #[must_use]
    pub fn map_metadata<N>(self, f: impl FnOnce(M) -> N) -> Mutation<T, N> {
        Mutation {
            kind: self.kind,
            metadata: self.metadata.map(f),
            indices: self.indices,
            values: self.values,
        }
    }
}

fn check_shape(kind: MutationKind, indices: &IndexSet, values: usize) -> Result<(), InvalidMutation> {
    if kind.forbids_values() && values != 0 {
        return Err(InvalidMutation::UnexpectedValues { kind, values });
    }
    let metadata_only = kind == MutationKind::Update && values == 0;
    if kind.pairs_values_with_indices() && !metadata_only && indices.len() != values {
        return Err(InvalidMutation::CountMismatch {
            kind,
            indices: indices.len(),
            values,
        });
    }
    Ok(())
}

fn check_existing(indices: &IndexSet, len: usize) -> Result<(), InvalidMutation> {
    match indices.last() {
        Some(last) if last >= len => Err(InvalidMutation::IndexOutOfBounds { index: last, len }),
        _ => Ok(()),
    }
}

fn remove_descending<S>(target: &mut S, indices: &IndexSet)
where
    S: Sequence + ?Sized,
{
    for index in indices.iter().rev() {
        target.remove(index);
    }
}

#[cfg(test)]
mod tests {
    use alloc::collections::VecDeque;
    use alloc::vec;
    use alloc::vec::Vec;

    use super::Mutation;
    use crate::{IndexSet, InvalidMutation, MutationKind};

    fn letters(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn delete_removes_descending() {
        let mut seq = letters("abcdef");
        let set: IndexSet = [0, 2, 3, 5].into_iter().collect();
        Mutation::<char>::deleted(set).apply(&mut seq).unwrap();
        assert_eq!(seq, letters("be"));
    }

    #[test]
    fn insert_lands_at_post_mutation_indices() {
        let mut seq = letters("bd");
        let set: IndexSet = [0, 2, 4].into_iter().collect();
        Mutation::<char>::inserted(set, vec!['a', 'c', 'e'])
            .unwrap()
            .apply(&mut seq)
            .unwrap();
        assert_eq!(seq, letters("abcde"));
    }

    #[test]
    fn scroll_forward_and_backward() {
        let mut seq: VecDeque<char> = "abcd".chars().collect();
        let forward = Mutation::<char>::scrolled(2, vec!['e', 'f'], 4).unwrap();
        assert!(forward.indices().ranges().eq([2..=3]));
        forward.apply(&mut seq).unwrap();
        assert_eq!(seq.iter().collect::<alloc::string::String>(), "cdef");

        let backward = Mutation::<char>::scrolled(-1, vec!['b'], 4).unwrap();
        assert!(backward.indices().ranges().eq([0..=0]));
        backward.apply(&mut seq).unwrap();
        assert_eq!(seq.iter().collect::<alloc::string::String>(), "bcde");
    }

    #[test]
    fn move_reinserts_run_in_order() {
        let mut seq = letters("abcdef");
        let set: IndexSet = [1, 3].into_iter().collect();
        // After removing b and d: a c e f; run goes in front of f.
        Mutation::<char>::moved(set, 3).apply(&mut seq).unwrap();
        assert_eq!(seq, letters("acebdf"));
    }

    #[test]
    fn update_replaces_in_place() {
        let mut seq = letters("abc");
        Mutation::<char>::updated_at('x', 1)
            .apply(&mut seq)
            .unwrap();
        assert_eq!(seq, letters("axc"));
    }

    #[test]
    fn reload_discards_previous_state() {
        let mut seq = letters("abc");
        Mutation::<char>::reload(letters("zy")).apply(&mut seq).unwrap();
        assert_eq!(seq, letters("zy"));
    }

    #[test]
    fn metadata_only_update_has_no_effect() {
        let mutation = Mutation::<char, u32>::metadata_only(7);
        assert!(mutation.has_no_effect_on_elements());
        assert_eq!(mutation.metadata(), Some(&7));
        let mut seq = letters("abc");
        mutation.apply(&mut seq).unwrap();
        assert_eq!(seq, letters("abc"));
    }

    #[test]
    fn shape_violations_are_rejected() {
        assert_eq!(
            Mutation::<char>::inserted(IndexSet::from_range(0..2), vec!['a']),
            Err(InvalidMutation::CountMismatch {
                kind: MutationKind::Insert,
                indices: 2,
                values: 1,
            })
        );
        assert_eq!(
            Mutation::<char>::new(MutationKind::Delete, IndexSet::from_index(0), vec!['a']),
            Err(InvalidMutation::UnexpectedValues {
                kind: MutationKind::Delete,
                values: 1,
            })
        );
        assert!(Mutation::<char>::scrolled(5, vec![], 3).is_err());
    }

    #[test]
    fn out_of_range_leaves_target_untouched() {
        let mut seq = letters("abc");
        let set: IndexSet = [0, 3].into_iter().collect();
        let err = Mutation::<char>::deleted(set).apply(&mut seq).unwrap_err();
        assert_eq!(err, InvalidMutation::IndexOutOfBounds { index: 3, len: 3 });
        assert_eq!(seq, letters("abc"));

        let err = Mutation::<char>::moved_from(0, 3).apply(&mut seq).unwrap_err();
        assert_eq!(err, InvalidMutation::MoveTargetOutOfBounds { target: 3, len: 2 });

        let err = Mutation::<char>::inserted_at('z', 5).apply(&mut seq).unwrap_err();
        assert_eq!(err, InvalidMutation::IndexOutOfBounds { index: 5, len: 3 });
        assert_eq!(seq, letters("abc"));
    }

    #[test]
    fn largest_index_is_out_of_bounds_not_dropped() {
        let mut seq = letters("abc");
        let err = Mutation::<char>::deleted_at(usize::MAX)
            .apply(&mut seq)
            .unwrap_err();
        assert_eq!(
            err,
            InvalidMutation::IndexOutOfBounds {
                index: usize::MAX,
                len: 3
            }
        );
        let err = Mutation::<char>::updated_at('x', usize::MAX)
            .apply(&mut seq)
            .unwrap_err();
        assert_eq!(
            err,
            InvalidMutation::IndexOutOfBounds {
                index: usize::MAX,
                len: 3
            }
        );
        assert_eq!(seq, letters("abc"));
    }

    #[test]
    fn len_delta_of_extreme_scroll_does_not_overflow() {
        let scroll =
            Mutation::<char>::new(MutationKind::Scroll(isize::MIN), IndexSet::new(), vec![])
                .unwrap();
        assert_eq!(scroll.len_delta(), Some(isize::MIN));
        assert_eq!(scroll.resulting_len(3), 0);
        let mut seq = letters("abc");
        assert_eq!(
            scroll.apply(&mut seq),
            Err(InvalidMutation::ScrollOutOfBounds {
                by: isize::MIN,
                len: 3
            })
        );

        let scroll = Mutation::<char>::scrolled(isize::MAX, vec![], usize::MAX).unwrap();
        assert_eq!(scroll.len_delta(), Some(-isize::MAX));
    }

    #[test]
    fn resulting_len_matches_applied_len() {
        let seq = letters("abcde");
        let mutations: Vec<Mutation<char>> = vec![
            Mutation::reload(letters("xy")),
            Mutation::deleted(IndexSet::from_range(1..3)),
            Mutation::inserted_at('q', 5),
            Mutation::scrolled(2, letters("xyz"), 5).unwrap(),
            Mutation::scrolled(-3, letters("x"), 5).unwrap(),
            Mutation::moved_from(0, 4),
            Mutation::updated_at('u', 0),
        ];
        for mutation in mutations {
            let mut copy = seq.clone();
            let expected = mutation.resulting_len(copy.len());
            if let Some(delta) = mutation.len_delta() {
                assert_eq!(expected as isize, copy.len() as isize + delta);
            }
            mutation.apply(&mut copy).unwrap();
            assert_eq!(copy.len(), expected);
        }
    }

    #[test]
    fn apply_cloned_keeps_the_mutation_readable() {
        let mut seq = letters("abc");
        let mutation = Mutation::<char>::inserted_at('d', 3);
        mutation.apply_cloned(&mut seq).unwrap();
        assert_eq!(mutation.indices().first(), Some(3));
        assert_eq!(seq, letters("abcd"));
    }

    #[test]
    fn mapping_preserves_structure() {
        let mutation = Mutation::<u8, u8>::updated_at(3, 1).with_metadata(9);
        let mapped = mutation.map_values(u32::from).map_metadata(|m| m * 2);
        assert_eq!(mapped.values(), &[3_u32]);
        assert_eq!(mapped.metadata(), Some(&18));
        assert_eq!(mapped.kind(), MutationKind::Update);
        let bare: Mutation<u32, ()> = mapped.without_metadata();
        assert_eq!(bare.metadata(), None);
    }
}

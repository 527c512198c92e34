// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Turning unordered batches of changes into ordered mutations of a sorted mirror.

use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;

use crate::{IndexSet, InvalidMutation, Mutation, MutationKind};

/// The kind of an unordered [`SetMutation`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SetMutationKind {
    /// The values left the set.
    Delete,
    /// The values joined the set.
    Insert,
    /// The values changed but kept their identity.
    Update,
    /// The values are the whole set.
    Reload,
}

/// An unordered batch of changes to a set of elements.
///
/// Applied to a mirror kept sorted by a caller-supplied order, a set mutation
/// yields the ordered [`Mutation`]s a list display needs to animate the change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetMutation<T> {
    /// What happened to the values.
    pub kind: SetMutationKind,
    /// The affected values, in no particular order.
    pub values: Vec<T>,
}

impl<T> SetMutation<T> {
    /// The values were removed.
    #[must_use]
    pub const fn delete(values: Vec<T>) -> Self {
        Self {
            kind: SetMutationKind::Delete,
            values,
        }
    }

    /// The values were added.
    #[must_use]
    pub const fn insert(values: Vec<T>) -> Self {
        Self {
            kind: SetMutationKind::Insert,
            values,
        }
    }

    /// The values changed in place.
    #[must_use]
    pub const fn update(values: Vec<T>) -> Self {
        Self {
            kind: SetMutationKind::Update,
            values,
        }
    }

    /// The values replace the whole set.
    #[must_use]
    pub const fn reload(values: Vec<T>) -> Self {
        Self {
            kind: SetMutationKind::Reload,
            values,
        }
    }

    /// Applies this batch to `mirror`, which must be sorted by `compare`.
    ///
    /// `equate` decides identity (the same logical element, even if its value
    /// changed) and `compare` is the total order the mirror is kept in. The
    /// returned mutations, applied in order to a copy of the mirror as it was,
    /// reproduce the new mirror:
    ///
    /// - delete: one [`Mutation::deleted`] at the positions of the removed elements,
    /// - insert: one [`Mutation::inserted`] at the positions the values landed in;
    ///   a value goes before existing elements that compare equal to it,
    /// - update: per value, a [`Mutation::updated_at`] if it stayed put, or a
    ///   [`Mutation::moved_from`] followed by [`Mutation::updated_at`] at the new
    ///   position if the change reordered it,
    /// - reload: one [`Mutation::reload`] with the sorted values.
    ///
    /// Empty delete, insert, and update batches yield no mutations.
    ///
    /// Deletes and updates fail with [`InvalidMutation::ElementNotFound`] if a
    /// value has no identical element in the mirror, or names one twice; the
    /// mirror is then unchanged. `compare` may tie distinct elements: a delete
    /// still finds each of them whatever order the batch lists them in.
    pub fn apply_to<E, C>(
        self,
        mirror: &mut Vec<T>,
        equate: E,
        compare: C,
    ) -> Result<Vec<Mutation<T>>, InvalidMutation>
    where
        T: Clone,
        E: Fn(&T, &T) -> bool,
        C: Fn(&T, &T) -> Ordering,
    {
        let count = self.values.len();
        let mutations = match self.kind {
            SetMutationKind::Delete => delete(self.values, mirror, &equate, &compare),
            SetMutationKind::Insert => Ok(insert(self.values, mirror, &compare)),
            SetMutationKind::Update => update(self.values, mirror, &equate, &compare),
            SetMutationKind::Reload => {
                let mut values = self.values;
                values.sort_by(&compare);
                mirror.clone_from(&values);
                Ok(alloc::vec![Mutation::reload(values)])
            }
        };
        match &mutations {
            Ok(out) => tracing::trace!(
                kind = ?self.kind,
                values = count,
                mutations = out.len(),
                len = mirror.len(),
                "diffed set mutation"
            ),
            Err(err) => tracing::debug!(kind = ?self.kind, %err, "rejected set mutation"),
        }
        mutations
    }
}

fn delete<T, E, C>(
    mut values: Vec<T>,
    mirror: &mut Vec<T>,
    equate: &E,
    compare: &C,
) -> Result<Vec<Mutation<T>>, InvalidMutation>
where
    E: Fn(&T, &T) -> bool,
    C: Fn(&T, &T) -> Ordering,
{
    if values.is_empty() {
        return Ok(Vec::new());
    }
    values.sort_by(compare);
    let mut indices = IndexSet::new();
    let mut position = 0;
    for value in &values {
        let ahead = (position..mirror.len()).find(|&i| equate(&mirror[i], value));
        // Elements that compare equal may sit in either order, so a miss
        // ahead can still be an unclaimed element behind the scan.
        let found = ahead.or_else(|| {
            (0..position).find(|&i| !indices.contains(i) && equate(&mirror[i], value))
        });
        let Some(at) = found else {
            return Err(InvalidMutation::ElementNotFound);
        };
        indices.insert(at);
        position = position.max(at + 1);
    }
    for index in indices.iter().rev() {
        mirror.remove(index);
    }
    Ok(alloc::vec![Mutation::deleted(indices)])
}

fn insert<T, C>(mut values: Vec<T>, mirror: &mut Vec<T>, compare: &C) -> Vec<Mutation<T>>
where
    T: Clone,
    C: Fn(&T, &T) -> Ordering,
{
    if values.is_empty() {
        return Vec::new();
    }
    values.sort_by(compare);
    let mut indices = IndexSet::new();
    let mut position = 0;
    for value in &values {
        while position < mirror.len() && compare(&mirror[position], value) == Ordering::Less {
            position += 1;
        }
        mirror.insert(position, value.clone());
        indices.insert(position);
        position += 1;
    }
    // One index per value, collected in ascending order.
    alloc::vec![Mutation::from_parts_unchecked(
        MutationKind::Insert,
        indices,
        values
    )]
}

fn update<T, E, C>(
    values: Vec<T>,
    mirror: &mut Vec<T>,
    equate: &E,
    compare: &C,
) -> Result<Vec<Mutation<T>>, InvalidMutation>
where
    T: Clone,
    E: Fn(&T, &T) -> bool,
    C: Fn(&T, &T) -> Ordering,
{
    // Identity survives the reordering below, so presence can be checked up front.
    if values
        .iter()
        .any(|value| !mirror.iter().any(|existing| equate(existing, value)))
    {
        return Err(InvalidMutation::ElementNotFound);
    }
    let mut out = Vec::with_capacity(values.len());
    for value in values {
        let Some(from) = mirror.iter().position(|existing| equate(existing, &value)) else {
            return Err(InvalidMutation::ElementNotFound);
        };
        mirror.remove(from);
        let to = mirror.partition_point(|existing| compare(existing, &value) == Ordering::Less);
        mirror.insert(to, value.clone());
        if from != to {
            out.push(Mutation::moved_from(from, to));
        }
        out.push(Mutation::updated_at(value, to));
    }
    Ok(out)
}

/// A vector kept sorted by `compare`, fed by [`SetMutation`]s.
///
/// This bundles the mirror with its identity and order functions so callers
/// do not have to pass them on every batch.
///
/// ## Example
///
/// ```rust
/// use understory_mutation::{Mutation, SetMutation, SortedMirror};
///
/// let mut mirror = SortedMirror::new(|a: &&str, b: &&str| a == b, |a: &&str, b: &&str| a.cmp(b));
/// mirror.apply(SetMutation::reload(vec!["c", "a", "b"])).unwrap();
///
/// let out = mirror.apply(SetMutation::insert(vec!["d"])).unwrap();
/// assert_eq!(out, [Mutation::<&str>::inserted_at("d", 3)]);
/// assert_eq!(mirror.as_slice(), ["a", "b", "c", "d"]);
/// ```
pub struct SortedMirror<T, E, C> {
    values: Vec<T>,
    equate: E,
    compare: C,
}

impl<T, E, C> SortedMirror<T, E, C>
where
    T: Clone,
    E: Fn(&T, &T) -> bool,
    C: Fn(&T, &T) -> Ordering,
{
    /// Creates an empty mirror.
    pub fn new(equate: E, compare: C) -> Self {
        Self {
            values: Vec::new(),
            equate,
            compare,
        }
    }

    /// Applies `mutation`, returning the ordered mutations it amounts to.
    pub fn apply(&mut self, mutation: SetMutation<T>) -> Result<Vec<Mutation<T>>, InvalidMutation> {
        mutation.apply_to(&mut self.values, &self.equate, &self.compare)
    }

    /// The sorted elements.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the mirror is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Unwraps the sorted elements.
    #[must_use]
    pub fn into_inner(self) -> Vec<T> {
        self.values
    }
}

impl<T: fmt::Debug, E, C> fmt::Debug for SortedMirror<T, E, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortedMirror")
            .field("values", &self.values)
            .finish_non_exhaustive()
    }
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property tests for mutation application, windowing, trees, and set diffing.

use std::cmp::Ordering;
use std::collections::{BTreeMap, VecDeque};

use proptest::prelude::*;
use understory_mutation::{
    IndexSet, Mutation, SetMutation, SubrangeInfo, SubrangeState, TreeMutation, TreeState,
};

fn contents<T: Clone>(state: &SubrangeState<T>) -> Vec<T> {
    state
        .values()
        .map(|v| v.iter().cloned().collect())
        .unwrap_or_default()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn reload_ignores_prior_state(
        prior in prop::collection::vec(any::<u8>(), 0..16),
        next in prop::collection::vec(any::<u8>(), 0..16),
    ) {
        let mut flat = prior.clone();
        Mutation::<u8>::reload(next.clone()).apply(&mut flat).unwrap();
        prop_assert_eq!(&flat, &next);

        let mut deque: VecDeque<u8> = prior.into_iter().collect();
        Mutation::<u8>::reload(next.clone()).apply(&mut deque).unwrap();
        prop_assert!(deque.iter().eq(next.iter()));
    }

    #[test]
    fn delete_then_reinsert_restores(
        seq in prop::collection::vec(any::<u8>(), 0..24),
        mask in prop::collection::vec(any::<bool>(), 24),
    ) {
        let picked: IndexSet = (0..seq.len()).filter(|&i| mask[i]).collect();
        let removed: Vec<u8> = picked.iter().map(|i| seq[i]).collect();

        let mut work = seq.clone();
        Mutation::<u8>::deleted(picked.clone()).apply(&mut work).unwrap();
        prop_assert_eq!(work.len(), seq.len() - picked.len());

        Mutation::<u8>::inserted(picked, removed).unwrap().apply(&mut work).unwrap();
        prop_assert_eq!(work, seq);
    }

    #[test]
    fn move_and_move_back_restores(
        seq in prop::collection::vec(any::<u8>(), 1..24),
        from in any::<prop::sample::Index>(),
        to in any::<prop::sample::Index>(),
    ) {
        let from = from.index(seq.len());
        let to = to.index(seq.len());
        let mut work = seq.clone();
        Mutation::<u8>::moved_from(from, to).apply(&mut work).unwrap();
        prop_assert_eq!(work[to], seq[from]);
        Mutation::<u8>::moved_from(to, from).apply(&mut work).unwrap();
        prop_assert_eq!(work, seq);
    }

    #[test]
    fn metadata_only_updates_keep_elements(
        seq in prop::collection::vec(any::<u8>(), 0..16),
        offset in proptest::option::of(0_usize..100),
        count in proptest::option::of(0_usize..100),
    ) {
        let mut state = SubrangeState::<u8>::new();
        state.apply(Mutation::reload(seq.clone())).unwrap();
        let info = SubrangeInfo { local_offset: offset, global_count: count, leaf: None };
        state.apply(Mutation::metadata_only(info)).unwrap();
        prop_assert_eq!(contents(&state), seq.clone());
        prop_assert_eq!(state.local_offset(), offset.unwrap_or(0));
        prop_assert_eq!(state.global_count(), count.unwrap_or(seq.len()));
    }
}

/// A step against a window into a larger collection, with raw selectors that
/// are folded into range when applied.
#[derive(Clone, Debug)]
enum WindowStep {
    Insert(usize),
    Delete(usize),
    Forward { by: usize, reveal: usize },
    Backward(usize),
}

fn window_step() -> impl Strategy<Value = WindowStep> {
    prop_oneof![
        any::<usize>().prop_map(WindowStep::Insert),
        any::<usize>().prop_map(WindowStep::Delete),
        (any::<usize>(), any::<usize>()).prop_map(|(by, reveal)| WindowStep::Forward { by, reveal }),
        any::<usize>().prop_map(WindowStep::Backward),
    ]
}

/// The whole collection next to the window a mirror should be showing.
#[derive(Debug)]
struct Conceptual {
    full: Vec<u32>,
    offset: usize,
    len: usize,
    next: u32,
}

impl Conceptual {
    /// Turns `step` into the mutation a producer would send and updates the
    /// model to match. Steps that do not fit the current window are skipped.
    fn mutation(&mut self, step: &WindowStep) -> Option<Mutation<u32, SubrangeInfo>> {
        match *step {
            WindowStep::Insert(at) => {
                let at = at % (self.len + 1);
                let value = self.next;
                self.next += 1;
                self.full.insert(self.offset + at, value);
                self.len += 1;
                Some(Mutation::inserted_at(value, at))
            }
            WindowStep::Delete(at) => {
                if self.len == 0 {
                    return None;
                }
                let at = at % self.len;
                self.full.remove(self.offset + at);
                self.len -= 1;
                Some(Mutation::deleted_at(at))
            }
            WindowStep::Forward { by, reveal } => {
                if self.len == 0 {
                    return None;
                }
                let by = 1 + by % self.len;
                let end = self.offset + self.len;
                let reveal = reveal % (self.full.len() - end + 1);
                let values = self.full[end..end + reveal].to_vec();
                let mutation = Mutation::scrolled(by as isize, values, self.len).ok()?;
                self.offset += by;
                self.len = self.len - by + reveal;
                Some(mutation)
            }
            WindowStep::Backward(by) => {
                let max = self.offset.min(self.len);
                if max == 0 {
                    return None;
                }
                let by = 1 + by % max;
                let values = self.full[self.offset - by..self.offset].to_vec();
                let mutation = Mutation::scrolled(-(by as isize), values, self.len).ok()?;
                self.offset -= by;
                Some(mutation)
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn default_window_bookkeeping_matches_direct_count(
        total in 0_usize..40,
        start in any::<prop::sample::Index>(),
        width in any::<prop::sample::Index>(),
        steps in prop::collection::vec(window_step(), 0..32),
    ) {
        let full: Vec<u32> = (0..total as u32).collect();
        let offset = start.index(total + 1);
        let len = width.index(total - offset + 1);
        let mut model = Conceptual { full, offset, len, next: total as u32 };

        let mut state = SubrangeState::<u32>::new();
        let first = Mutation::reload(model.full[offset..offset + len].to_vec())
            .with_metadata(SubrangeInfo::new().local_offset(offset).global_count(total));
        state.apply(first).unwrap();

        for step in &steps {
            let Some(mutation) = model.mutation(step) else { continue };
            state.apply(mutation).unwrap();
            prop_assert_eq!(state.global_count(), model.full.len());
            prop_assert_eq!(state.local_offset(), model.offset);
            prop_assert_eq!(
                contents(&state),
                model.full[model.offset..model.offset + model.len].to_vec()
            );
        }
    }
}

/// Rows are `(id, key)`; the mirror is ordered by key, then id.
type Row = (u32, u8);

fn same(a: &Row, b: &Row) -> bool {
    a.0 == b.0
}

fn by_key(a: &Row, b: &Row) -> Ordering {
    (a.1, a.0).cmp(&(b.1, b.0))
}

#[derive(Clone, Debug)]
enum Batch {
    Insert(Vec<u8>),
    Delete(Vec<usize>),
    Update(Vec<(usize, u8)>),
}

fn batch() -> impl Strategy<Value = Batch> {
    prop_oneof![
        prop::collection::vec(any::<u8>(), 0..6).prop_map(Batch::Insert),
        prop::collection::vec(any::<usize>(), 0..4).prop_map(Batch::Delete),
        prop::collection::vec((any::<usize>(), any::<u8>()), 0..4).prop_map(Batch::Update),
    ]
}

/// Ids currently in the set, picked by raw selectors without repeats.
fn pick(model: &BTreeMap<u32, u8>, selectors: impl IntoIterator<Item = usize>) -> Vec<u32> {
    let ids: Vec<u32> = model.keys().copied().collect();
    let mut picked = Vec::new();
    if ids.is_empty() {
        return picked;
    }
    for selector in selectors {
        let id = ids[selector % ids.len()];
        if !picked.contains(&id) {
            picked.push(id);
        }
    }
    picked
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn set_diff_keeps_mirror_sorted_and_replayable(
        initial in prop::collection::vec(any::<u8>(), 0..8),
        batches in prop::collection::vec(batch(), 0..12),
    ) {
        let mut model: BTreeMap<u32, u8> = BTreeMap::new();
        let mut next_id = 0_u32;
        let mut rows = Vec::new();
        for key in initial {
            model.insert(next_id, key);
            rows.push((next_id, key));
            next_id += 1;
        }

        let mut mirror = Vec::new();
        let out = SetMutation::reload(rows).apply_to(&mut mirror, same, by_key).unwrap();
        prop_assert_eq!(out.len(), 1);

        for batch in batches {
            let set_mutation = match batch {
                Batch::Insert(keys) => {
                    let mut values = Vec::new();
                    for key in keys {
                        model.insert(next_id, key);
                        values.push((next_id, key));
                        next_id += 1;
                    }
                    SetMutation::insert(values)
                }
                Batch::Delete(selectors) => {
                    let ids = pick(&model, selectors);
                    let values = ids
                        .into_iter()
                        .filter_map(|id| model.remove(&id).map(|key| (id, key)))
                        .collect();
                    SetMutation::delete(values)
                }
                Batch::Update(changes) => {
                    let ids = pick(&model, changes.iter().map(|&(s, _)| s));
                    let values = ids
                        .into_iter()
                        .zip(changes.iter().map(|&(_, key)| key))
                        .map(|(id, key)| {
                            model.insert(id, key);
                            (id, key)
                        })
                        .collect();
                    SetMutation::update(values)
                }
            };

            let mut replay = mirror.clone();
            let out = set_mutation.apply_to(&mut mirror, same, by_key).unwrap();
            for mutation in out {
                mutation.apply(&mut replay).unwrap();
            }
            prop_assert_eq!(&replay, &mirror);
            prop_assert!(mirror.windows(2).all(|w| by_key(&w[0], &w[1]) == Ordering::Less));

            let expected: Vec<Row> = model.iter().map(|(&id, &key)| (id, key)).collect();
            let mut actual = mirror.clone();
            actual.sort_unstable();
            prop_assert_eq!(actual, expected);
        }
    }

    #[test]
    fn tree_update_touches_only_its_target(
        fanout in prop::collection::vec(0_usize..4, 1..6),
        target in any::<prop::sample::Index>(),
        leaf in any::<u32>(),
    ) {
        let children = fanout
            .iter()
            .enumerate()
            .map(|(i, &n)| {
                let grandchildren = (0..n).map(|j| TreeMutation::leaf((i * 10 + j) as u32)).collect();
                TreeMutation::node(i as u32, grandchildren)
            })
            .collect();
        let mut tree = TreeState::from_mutation(TreeMutation::node(u32::MAX, children)).unwrap();
        let before = tree.clone();
        let target = target.index(fanout.len());

        // Relabel the target and insert a new first child under it.
        let nested = TreeMutation::new(
            Mutation::inserted_at(TreeMutation::leaf(leaf), 0).with_metadata(leaf),
        );
        tree.apply(TreeMutation::new(Mutation::updated_at(nested, target)))
            .unwrap();

        for (i, (now, was)) in tree.children().iter().zip(before.children()).enumerate() {
            if i == target {
                prop_assert_eq!(now.metadata(), Some(&leaf));
                prop_assert_eq!(now.children()[0].metadata(), Some(&leaf));
                prop_assert_eq!(&now.children()[1..], was.children());
            } else {
                prop_assert_eq!(now, was);
            }
        }
        prop_assert_eq!(tree.metadata(), Some(&u32::MAX));
    }
}

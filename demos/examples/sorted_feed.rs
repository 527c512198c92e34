// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A sorted feed mirrored through a scrolling window.
//!
//! This example shows how to combine:
//! - `SortedMirror` to turn unordered server batches into ordered list mutations,
//! - `SubrangeState` to mirror only the rows near the viewport,
//! - `TreeState` with `TreeCursor` to walk a grouped outline.
//!
//! Run:
//! - `RUST_LOG=trace cargo run -p understory_demos --example sorted_feed`

use understory_mutation::{
    Mutation, SetMutation, SortedMirror, SubrangeInfo, SubrangeState, TreeMutation, TreeState,
};

/// A feed entry: identity is the id, order is the score (highest first).
#[derive(Clone, Debug, PartialEq, Eq)]
struct Post {
    id: u32,
    score: i32,
    title: &'static str,
}

fn post(id: u32, score: i32, title: &'static str) -> Post {
    Post { id, score, title }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut feed = SortedMirror::new(
        |a: &Post, b: &Post| a.id == b.id,
        |a: &Post, b: &Post| b.score.cmp(&a.score).then(a.id.cmp(&b.id)),
    );

    let batches = [
        SetMutation::reload(vec![
            post(1, 10, "hello"),
            post(2, 40, "rust 2024"),
            post(3, 25, "no_std tips"),
        ]),
        SetMutation::insert(vec![post(4, 30, "windowed lists"), post(5, 5, "misc")]),
        SetMutation::update(vec![post(1, 50, "hello (trending)")]),
        SetMutation::delete(vec![post(5, 5, "misc")]),
    ];

    for batch in batches {
        println!("batch: {:?}", batch.kind);
        match feed.apply(batch) {
            Ok(mutations) => {
                for mutation in &mutations {
                    println!("  {:?} at {:?}", mutation.kind(), mutation.indices());
                }
            }
            Err(err) => println!("  rejected: {err}"),
        }
        let titles: Vec<_> = feed.as_slice().iter().map(|p| p.title).collect();
        println!("  feed: {titles:?}");
    }

    // A viewport of two rows over the feed.
    let rows = feed.into_inner();
    let mut viewport = SubrangeState::<Post>::new();
    let first = Mutation::reload(rows[..2].to_vec())
        .with_metadata(SubrangeInfo::new().local_offset(0).global_count(rows.len()));
    if let Err(err) = viewport.apply(first) {
        println!("viewport rejected reload: {err}");
        return;
    }
    while viewport.global_range().end < viewport.global_count() {
        let next = rows[viewport.global_range().end].clone();
        let step = Mutation::scrolled(1, vec![next], viewport.len())
            .and_then(|scroll| viewport.apply(scroll));
        if let Err(err) = step {
            println!("viewport rejected scroll: {err}");
            return;
        }
        println!(
            "viewport {:?} of {}: {:?}",
            viewport.global_range(),
            viewport.global_count(),
            viewport
                .values()
                .map(|v| v.iter().map(|p| p.id).collect::<Vec<_>>())
        );
    }

    // Group the rows into an outline and walk it depth first.
    let outline = TreeMutation::node(
        "feed",
        vec![
            TreeMutation::node(
                "hot",
                rows.iter()
                    .filter(|p| p.score >= 30)
                    .map(|p| TreeMutation::leaf(p.title))
                    .collect(),
            ),
            TreeMutation::node(
                "rest",
                rows.iter()
                    .filter(|p| p.score < 30)
                    .map(|p| TreeMutation::leaf(p.title))
                    .collect(),
            ),
        ],
    );
    let tree = match TreeState::from_mutation(outline) {
        Ok(tree) => tree,
        Err(err) => {
            println!("outline rejected: {err}");
            return;
        }
    };
    let mut cursor = tree.cursor();
    loop {
        let indent = "  ".repeat(cursor.depth());
        println!("{indent}{}", cursor.node().metadata().copied().unwrap_or("?"));
        if !cursor.next_depth_first() {
            break;
        }
    }
}

// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Scroll cursors and sorts survive a trip through JSON.
//!
//! Run with: `cargo test --features serde -p entity-query --test serde`

#![cfg(feature = "serde")]

use entity_query::prelude::*;

#[test]
fn keyset_position_resumes_query() {
    let position = ScrollPosition::Keyset(KeysetScrollPosition::forward([
        ("age", Value::Int(35)),
        ("id", Value::Int(2))
    ]));
    let json = serde_json::to_string(&position).expect("serialize");
    let parsed: ScrollPosition = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(parsed, position);
}

#[test]
fn sort_from_request() {
    let sort = Sort::by_orders(vec![Order::desc("age").ignore_case(), Order::asc("id")]);
    let json = serde_json::to_value(&sort).expect("serialize");
    let parsed: Sort = serde_json::from_value(json).expect("deserialize");
    assert_eq!(parsed, sort);
}

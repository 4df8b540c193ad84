// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Queries derived from method names, executed against an in-memory provider.

mod common;

use common::{MemoryFactory, User, init_tracing, metamodel, users};
use entity_query::{OffsetScrollPosition, prelude::*};

fn derive(method: &str, parameters: MethodParameters) -> PartTreeQuery {
    PartTreeQuery::new(method, "app.User", metamodel(), parameters).expect("derived query")
}

fn lastname(method: &str) -> MethodParameters {
    MethodParameters::new(method).bindable("lastname", ValueType::String)
}

fn age(method: &str) -> MethodParameters {
    MethodParameters::new(method).bindable("age", ValueType::Integer)
}

#[test]
fn binds_simple_property() {
    init_tracing();
    let query = derive("findByLastname", lastname("findByLastname"));
    let arguments = Arguments::new().with("lastname", "Matthews");
    let created = query
        .prepare(&arguments)
        .and_then(|prepared| prepared.create(&MemoryFactory::default(), &arguments))
        .expect("query");

    assert_eq!(created.text, "SELECT u FROM User u WHERE u.lastname = ?1");
    assert_eq!(created.value("?1"), Some(&Value::from("Matthews")));
    assert!(!created.tuple);
}

#[test]
fn like_arguments_get_wildcards() {
    let method = "findByLastnameContainingIgnoreCase";
    let query = derive(method, lastname(method));
    let arguments = Arguments::new().with("lastname", "att");
    let created = query
        .prepare(&arguments)
        .and_then(|prepared| prepared.create(&MemoryFactory::default(), &arguments))
        .expect("query");

    assert_eq!(
        created.text,
        "SELECT u FROM User u WHERE UPPER(u.lastname) LIKE UPPER(?1) ESCAPE '\\'"
    );
    assert_eq!(created.value("?1"), Some(&Value::from("%att%")));
}

#[test]
fn null_argument_renders_is_null() {
    let query = derive("findByLastname", lastname("findByLastname"));
    let arguments = Arguments::new().with("lastname", Value::Null);
    let created = query
        .prepare(&arguments)
        .and_then(|prepared| prepared.create(&MemoryFactory::default(), &arguments))
        .expect("query");

    assert_eq!(created.text, "SELECT u FROM User u WHERE u.lastname IS NULL");
    assert!(created.bound.is_empty());
}

#[test]
fn collection_path_joins_outer() {
    let method = "findByRolesName";
    let query = derive(method, MethodParameters::new(method).bindable("name", ValueType::String));
    let prepared = query.prepare(&Arguments::new().with("name", "admin")).expect("query");

    assert_eq!(
        prepared.query_string(),
        "SELECT u FROM User u LEFT JOIN u.roles r WHERE r.name = ?1"
    );
}

#[test]
fn collection_predicates_do_not_join() {
    let query = derive("findByRolesIsNotEmpty", MethodParameters::new("findByRolesIsNotEmpty"));
    let prepared = query.prepare(&Arguments::new()).expect("query");
    assert_eq!(prepared.query_string(), "SELECT u FROM User u WHERE u.roles IS NOT EMPTY");

    let method = "findByRolesContaining";
    let query = derive(method, MethodParameters::new(method).bindable("role", ValueType::named("app.Role")));
    let arguments = Arguments::new().with("role", 7);
    let created = query
        .prepare(&arguments)
        .and_then(|prepared| prepared.create(&MemoryFactory::default(), &arguments))
        .expect("query");
    assert_eq!(created.text, "SELECT u FROM User u WHERE ?1 MEMBER OF u.roles");
    assert_eq!(created.value("?1"), Some(&Value::Int(7)));

    let method = "findByRolesNotContaining";
    let query = derive(method, MethodParameters::new(method).bindable("role", ValueType::named("app.Role")));
    assert_eq!(
        query.prepare(&arguments).expect("query").query_string(),
        "SELECT u FROM User u WHERE ?1 NOT MEMBER OF u.roles"
    );
}

#[test]
fn page_request_bounds_rows() {
    let method = "findByAgeGreaterThan";
    let query = derive(method, age(method).pageable());
    let arguments = Arguments::new().with("age", 18).with_pageable(Pageable::of(1, 2));
    let rows = query
        .execute(&MemoryFactory::with_rows(users()), &arguments)
        .expect("rows");

    let ids: Vec<i64> = rows.iter().map(|user| user.id).collect();
    assert_eq!(ids, vec![3, 4]);
}

#[test]
fn first_keyword_caps_results() {
    let method = "findFirst2ByLastname";
    let query = derive(method, lastname(method));
    let rows = query
        .execute(
            &MemoryFactory::with_rows(users()),
            &Arguments::new().with("lastname", "Matthews")
        )
        .expect("rows");

    assert_eq!(rows.len(), 2);
}

#[test]
fn count_query_shares_predicate() {
    let method = "findByAgeGreaterThanOrderByLastnameAsc";
    let query = derive(method, age(method));
    let arguments = Arguments::new().with("age", 30);
    let count = query
        .prepare_count(&arguments)
        .and_then(|prepared| prepared.create(&MemoryFactory::default(), &arguments))
        .expect("count");

    assert_eq!(count.text, "SELECT COUNT(u) FROM User u WHERE u.age > ?1");
    assert_eq!(count.value("?1"), Some(&Value::Int(30)));
    assert_eq!(count.max, usize::MAX);
}

#[test]
fn dynamic_sort_is_cached_per_shape() {
    let query = derive("findByLastname", lastname("findByLastname").sort());
    for name in ["Matthews", "Beauford", "Tinsley"] {
        query.prepare(&Arguments::new().with("lastname", name)).expect("unsorted");
    }
    assert_eq!(query.cached_queries(), 1);

    let sorted = Arguments::new()
        .with("lastname", "Matthews")
        .with_sort(Sort::by_orders(vec![Order::desc("age")]));
    assert_eq!(
        query.prepare(&sorted).expect("sorted").query_string(),
        "SELECT u FROM User u WHERE u.lastname = ?1 ORDER BY u.age desc"
    );
    assert_eq!(query.cached_queries(), 2);
}

#[test]
fn offset_scroll_builds_window() {
    let method = "findByAgeGreaterThan";
    let query = derive(method, age(method).scroll_position().limit());
    let arguments = Arguments::new()
        .with("age", 18)
        .with_scroll_position(ScrollPosition::Offset(OffsetScrollPosition::of(0)))
        .with_limit(Limit::of(2));
    let window = query
        .scroll(&MemoryFactory::with_rows(users()), &arguments, User::key)
        .expect("window");

    let ids: Vec<i64> = window.content().iter().map(|user| user.id).collect();
    assert_eq!(ids, vec![2, 3]);
    assert!(window.has_next());
    assert_eq!(
        window.last_position(),
        Some(&ScrollPosition::Offset(OffsetScrollPosition::of(2)))
    );
}

#[test]
fn keyset_scroll_builds_window() {
    init_tracing();
    let method = "findFirst2ByLastnameOrderByAgeAsc";
    let query = derive(method, lastname(method).scroll_position());
    let arguments = Arguments::new()
        .with("lastname", "Matthews")
        .with_scroll_position(ScrollPosition::Keyset(KeysetScrollPosition::initial()));

    let prepared = query.prepare(&arguments).expect("initial");
    assert_eq!(
        prepared.query_string(),
        "SELECT u FROM User u WHERE u.lastname = ?1 ORDER BY u.age asc, u.id asc"
    );

    let window = query
        .scroll(&MemoryFactory::with_rows(users()), &arguments, User::key)
        .expect("window");
    assert_eq!(window.len(), 2);
    assert!(window.has_next());
    assert_eq!(
        window.last_position(),
        Some(&ScrollPosition::Keyset(KeysetScrollPosition::forward([
            ("age", Value::Int(35)),
            ("id", Value::Int(2))
        ])))
    );

    let next = Arguments::new()
        .with("lastname", "Matthews")
        .with_scroll_position(window.last_position().cloned().expect("position"));
    let created = query
        .prepare(&next)
        .and_then(|prepared| prepared.create(&MemoryFactory::default(), &next))
        .expect("next");
    assert_eq!(
        created.text,
        "SELECT u FROM User u WHERE (u.lastname = ?1) AND ((u.age > ?2) OR (u.age = ?3 AND u.id > ?4)) ORDER BY u.age asc, u.id asc"
    );
    assert_eq!(created.value("?2"), Some(&Value::Int(35)));
    assert_eq!(created.value("?4"), Some(&Value::Int(2)));
    assert_eq!(created.max, 3);
}

#[test]
fn scroll_requires_position() {
    let query = derive("findByLastname", lastname("findByLastname"));
    let err = query
        .scroll(
            &MemoryFactory::default(),
            &Arguments::new().with("lastname", "x"),
            User::key
        )
        .expect_err("position");
    assert!(matches!(err, QueryError::InvalidArgument(_)));
}

#[test]
fn invalid_methods_fail_early() {
    let err = PartTreeQuery::new(
        "findByLastnameIn",
        "app.User",
        metamodel(),
        lastname("findByLastnameIn")
    )
    .expect_err("scalar for IN");
    assert!(matches!(err, QueryError::InvalidArgument(_)));

    let err = PartTreeQuery::new("findByShoeSize", "app.User", metamodel(), age("findByShoeSize"))
        .expect_err("unknown property");
    assert!(matches!(err, QueryError::PropertyNotFound { .. }));
}

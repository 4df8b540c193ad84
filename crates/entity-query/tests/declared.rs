// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Declared queries: preprocessing, rewriting and binding.

mod common;

use std::sync::Arc;

use chrono::NaiveDate;
use common::MemoryFactory;
use entity_query::{TemporalType, prelude::*};

fn bind(query: &EntityQuery, text: &str, parameters: &MethodParameters, arguments: &Arguments) -> common::MemoryQuery {
    let binder = query.binder(parameters).expect("binder");
    let mut created = MemoryFactory::default()
        .create_query(text, query.is_native(), false)
        .expect("query");
    binder.bind(&mut created, arguments, ErrorHandling::Strict).expect("bind");
    created
}

#[test]
fn named_like_and_comparison() {
    let query = EntityQuery::jpql("select u from User u where u.lastname like %:name% and u.age > :age")
        .expect("query");
    let parameters = MethodParameters::new("findByName")
        .bindable("name", ValueType::String)
        .bindable("age", ValueType::Integer);
    let arguments = Arguments::new().with("name", "att").with("age", 30);
    let created = bind(&query, query.query_string(), &parameters, &arguments);

    assert_eq!(
        created.text,
        "select u from User u where u.lastname like :name and u.age > :age"
    );
    assert_eq!(created.value(":name"), Some(&Value::from("%att%")));
    assert_eq!(created.value(":age"), Some(&Value::Int(30)));
}

#[test]
fn sorted_rewrite_keeps_bindings() {
    let query = EntityQuery::jpql("select u from User u where u.lastname = ?1").expect("query");
    let sorted = query
        .rewrite(&Sort::by_orders(vec![Order::desc("age")]), &ReturnedType::Domain)
        .expect("sorted");
    assert_eq!(sorted, "select u from User u where u.lastname = ?1 order by u.age desc");

    let parameters = MethodParameters::new("findByLastname")
        .bindable("lastname", ValueType::String)
        .sort();
    let created = bind(&query, &sorted, &parameters, &Arguments::new().with("lastname", "Matthews"));
    assert_eq!(created.value("?1"), Some(&Value::from("Matthews")));
}

#[test]
fn count_query_binds_leniently() {
    let query = EntityQuery::jpql("select u from User u where u.lastname like ?1% order by u.age").expect("query");
    let count = query.derive_count_query(None).expect("count");
    assert_eq!(count.query_string(), "select count(u) from User u where u.lastname like ?1");

    let parameters = MethodParameters::new("findByLastname").bindable("lastname", ValueType::String);
    let binder = count.binder(&parameters).expect("binder");
    let mut created = MemoryFactory::default()
        .create_query(count.query_string(), false, false)
        .expect("query");
    binder
        .bind(&mut created, &Arguments::new().with("lastname", "Ma"), ErrorHandling::Lenient)
        .expect("bind");
    assert_eq!(created.value("?1"), Some(&Value::from("Ma%")));
}

#[test]
fn lenient_binding_skips_dropped_markers() {
    common::init_tracing();
    let query = EntityQuery::jpql("select u from User u where u.lastname = ?1 and u.age > ?2").expect("query");
    let parameters = MethodParameters::new("findByLastnameAndAge")
        .bindable("lastname", ValueType::String)
        .bindable("age", ValueType::Integer);
    let binder = query.binder(&parameters).expect("binder");
    let arguments = Arguments::new().with("lastname", "Matthews").with("age", 30);

    let mut reduced = MemoryFactory::default()
        .create_query("select count(u) from User u where u.lastname = ?1", false, false)
        .expect("query");
    binder
        .bind(&mut reduced, &arguments, ErrorHandling::Lenient)
        .expect("lenient");
    assert_eq!(reduced.bound.len(), 1);

    let mut strict = MemoryFactory::default()
        .create_query("select count(u) from User u where u.lastname = ?1", false, false)
        .expect("query");
    binder.bind(&mut strict, &arguments, ErrorHandling::Strict).expect("positions in range");
    assert_eq!(strict.bound.len(), 1);
}

#[test]
fn paging_applies_to_query() {
    let query = EntityQuery::jpql("select u from User u").expect("query");
    let parameters = MethodParameters::new("findAll").pageable();
    let binder = query.binder(&parameters).expect("binder");
    let mut created = MemoryFactory::default()
        .create_query(query.query_string(), false, false)
        .expect("query");
    binder
        .bind_and_prepare(&mut created, &Arguments::new().with_pageable(Pageable::of(3, 5)))
        .expect("bind");
    assert_eq!(created.first, 15);
    assert_eq!(created.max, 5);
}

#[test]
fn temporal_precision_is_passed_on() {
    let query = EntityQuery::jpql("select u from User u where u.birthday = :birthday").expect("query");
    let parameters =
        MethodParameters::new("findByBirthday").temporal("birthday", ValueType::Date, TemporalType::Date);
    let birthday = NaiveDate::from_ymd_opt(1990, 5, 17).expect("date");
    let created = bind(
        &query,
        query.query_string(),
        &parameters,
        &Arguments::new().with("birthday", birthday)
    );
    assert_eq!(created.value(":birthday"), Some(&Value::Date(birthday)));
    assert_eq!(created.temporal.get(":birthday"), Some(&TemporalType::Date));
}

fn evaluate(expression: &str, accessor: &dyn ParameterAccessor) -> QueryResult<Value> {
    match expression {
        "#lastname" => Ok(accessor.value_by_name("lastname").cloned().unwrap_or_default()),
        other => Err(QueryError::InvalidArgument(format!("Cannot evaluate {other}")))
    }
}

#[test]
fn expressions_use_evaluator() {
    let query = EntityQuery::create(
        "select u from User u where u.lastname = :#{#lastname}",
        false,
        QueryEnhancerSelector::fallback()
    )
    .expect("query");
    let parameters = MethodParameters::new("findByLastname").bindable("lastname", ValueType::String);
    let binder = query
        .binder(&parameters)
        .expect("binder")
        .with_evaluator(Arc::new(evaluate));
    let mut created = MemoryFactory::default()
        .create_query(query.query_string(), false, false)
        .expect("query");
    binder
        .bind(&mut created, &Arguments::new().with("lastname", "Matthews"), ErrorHandling::Strict)
        .expect("bind");

    assert_eq!(created.bound.len(), 1);
    assert_eq!(created.bound.values().next(), Some(&Value::from("Matthews")));
}

#[test]
fn native_queries_bind_without_grammar() {
    let query = EntityQuery::native("SELECT * FROM users WHERE lastname = :name LIMIT 10").expect("native");
    let parameters = MethodParameters::new("findNative").bindable("name", ValueType::String);
    let created = bind(
        &query,
        query.query_string(),
        &parameters,
        &Arguments::new().with("name", "Tinsley")
    );
    assert_eq!(created.value(":name"), Some(&Value::from("Tinsley")));
}

#[test]
fn broken_grammar_is_reported() {
    let err = EntityQuery::jpql("select u from User u where").expect_err("grammar");
    assert!(err.is_bad_grammar());
}

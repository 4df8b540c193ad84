// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! In-memory provider used by the integration tests.

#![allow(dead_code)]

use std::{
    collections::BTreeMap,
    sync::{Arc, LazyLock}
};

use entity_query::prelude::*;
use entity_query::{QueryParameter, TemporalType};
use regex::Regex;

static MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\?(\d+)|:([A-Za-z_$][A-Za-z0-9_$]*)").expect("marker regex"));

#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    #[error("Could not locate parameter {0}")]
    UnknownParameter(String)
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id:       i64,
    pub lastname: String,
    pub age:      i64
}

impl User {
    pub fn new(id: i64, lastname: &str, age: i64) -> Self {
        Self {
            id,
            lastname: lastname.to_owned(),
            age
        }
    }

    pub fn key(&self, property: &str) -> Value {
        match property {
            "id" => Value::Int(self.id),
            "lastname" => Value::from(self.lastname.as_str()),
            "age" => Value::Int(self.age),
            _ => Value::Null
        }
    }
}

/// Query recording everything the binder sets.
#[derive(Debug)]
pub struct MemoryQuery {
    pub text:     String,
    pub tuple:    bool,
    pub bound:    BTreeMap<String, Value>,
    pub temporal: BTreeMap<String, TemporalType>,
    pub first:    usize,
    pub max:      usize,
    markers:      Vec<QueryParameter>,
    rows:         Vec<User>
}

impl MemoryQuery {
    pub fn value(&self, marker: &str) -> Option<&Value> {
        self.bound.get(marker)
    }
}

impl Query for MemoryQuery {
    type Error = MemoryError;
    type Row = User;

    fn parameters(&self) -> Vec<QueryParameter> {
        self.markers.clone()
    }

    fn set_parameter_by_name(
        &mut self,
        name: &str,
        value: Value,
        temporal: Option<TemporalType>
    ) -> Result<(), MemoryError> {
        if !self.has_named_parameter(name) {
            return Err(MemoryError::UnknownParameter(name.to_owned()));
        }
        if let Some(temporal) = temporal {
            self.temporal.insert(format!(":{name}"), temporal);
        }
        self.bound.insert(format!(":{name}"), value);
        Ok(())
    }

    fn set_parameter_by_position(
        &mut self,
        position: usize,
        value: Value,
        temporal: Option<TemporalType>
    ) -> Result<(), MemoryError> {
        if !self.has_positional_parameter(position) {
            return Err(MemoryError::UnknownParameter(position.to_string()));
        }
        if let Some(temporal) = temporal {
            self.temporal.insert(format!("?{position}"), temporal);
        }
        self.bound.insert(format!("?{position}"), value);
        Ok(())
    }

    fn max_results(&self) -> usize {
        self.max
    }

    fn set_max_results(&mut self, max: usize) {
        self.max = max;
    }

    fn first_result(&self) -> usize {
        self.first
    }

    fn set_first_result(&mut self, first: usize) {
        self.first = first;
    }

    fn result_list(&mut self) -> Result<Vec<User>, MemoryError> {
        Ok(self
            .rows
            .iter()
            .skip(self.first)
            .take(self.max)
            .cloned()
            .collect())
    }
}

/// Factory handing out [`MemoryQuery`] objects over fixed rows.
#[derive(Debug, Default)]
pub struct MemoryFactory {
    pub rows: Vec<User>
}

impl MemoryFactory {
    pub fn with_rows(rows: Vec<User>) -> Self {
        Self {
            rows
        }
    }
}

impl QueryFactory for MemoryFactory {
    type Query = MemoryQuery;

    fn create_query(&self, query: &str, _native: bool, tuple: bool) -> Result<MemoryQuery, MemoryError> {
        let mut markers: Vec<QueryParameter> = Vec::new();
        for capture in MARKER.captures_iter(query) {
            let marker = match (capture.get(1), capture.get(2)) {
                (Some(position), _) => QueryParameter::positional(position.as_str().parse().unwrap_or(0)),
                (_, Some(name)) => QueryParameter::named(name.as_str()),
                _ => continue
            };
            if !markers.contains(&marker) {
                markers.push(marker);
            }
        }
        Ok(MemoryQuery {
            text: query.to_owned(),
            tuple,
            bound: BTreeMap::new(),
            temporal: BTreeMap::new(),
            first: 0,
            max: usize::MAX,
            markers,
            rows: self.rows.clone()
        })
    }
}

/// Route library events to the test output; `RUST_LOG` overrides the level.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("entity_query_impl=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

pub fn metamodel() -> Arc<dyn Metamodel> {
    Arc::new(
        StaticMetamodel::builder()
            .entity(
                ManagedType::entity("app.User", "User")
                    .with(Attribute::id("id", ValueType::Long))
                    .with(Attribute::basic("lastname", ValueType::String))
                    .with(Attribute::basic("firstname", ValueType::String))
                    .with(Attribute::basic("age", ValueType::Integer))
                    .with(Attribute::basic("birthday", ValueType::Date))
                    .with(Attribute::many_to_one("manager", "app.User"))
                    .with(Attribute::one_to_many("roles", "app.Role").mapped_by("user"))
            )
            .entity(
                ManagedType::entity("app.Role", "Role")
                    .with(Attribute::id("id", ValueType::Long))
                    .with(Attribute::basic("name", ValueType::String))
                    .with(Attribute::many_to_one("user", "app.User"))
            )
            .build()
    )
}

pub fn users() -> Vec<User> {
    vec![
        User::new(1, "Matthews", 30),
        User::new(2, "Beauford", 35),
        User::new(3, "Matthews", 40),
        User::new(4, "Tinsley", 45),
        User::new(5, "Lessard", 50)
    ]
}

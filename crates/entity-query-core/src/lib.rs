// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Core types and collaborator traits for entity-query.
//!
//! This crate provides the value objects that flow through query derivation
//! and the traits the query compiler needs from its surroundings. It has no
//! knowledge of query text; parsing, rewriting and binding live in
//! `entity-query-impl`.
//!
//! # Overview
//!
//! - [`Sort`], [`Order`], [`Direction`] — Dynamic ordering requests
//! - [`Pageable`], [`Limit`] — Offset pagination and result limits
//! - [`ScrollPosition`], [`Window`] — Keyset and offset scrolling
//! - [`Value`] — Dynamically typed method argument
//! - [`Metamodel`] — Entity/attribute lookup used for join resolution
//! - [`Query`], [`QueryFactory`] — Executable queries handed out by the persistence provider
//! - [`ParameterAccessor`] — Access to method invocation arguments
//! - [`prelude`] — Convenient re-exports
//!
//! # Usage
//!
//! Most users should use `entity-query` directly, which re-exports this crate.
//!
//! ```rust
//! use entity_query_core::{Order, Sort};
//!
//! let sort = Sort::by_orders(vec![Order::asc("lastname"), Order::desc("age")]);
//! assert!(sort.is_sorted());
//! assert_eq!(sort.len(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod metamodel;
pub mod page;
pub mod parameters;
pub mod prelude;
pub mod query;
pub mod returned;
pub mod score;
pub mod scroll;
pub mod sort;
pub mod value;

pub use metamodel::{
    Attribute, AttributeKind, ManagedType, Metamodel, StaticMetamodel, StaticMetamodelBuilder
};
pub use page::{Limit, Pageable};
pub use parameters::{
    Arguments, MethodParameter, MethodParameters, ParameterAccessor, ParameterKind
};
pub use query::{Query, QueryFactory, QueryParameter};
pub use returned::ReturnedType;
pub use score::{Bound, Range, Score, ScoreKind, ScoringFunction};
pub use scroll::{
    KeysetScrollPosition, OffsetScrollPosition, ScrollDirection, ScrollPosition, Window
};
pub use sort::{Direction, NullHandling, Order, Sort};
pub use value::{TemporalType, Value, ValueType};

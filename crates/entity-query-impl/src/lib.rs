// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_docs,
    rustdoc::missing_crate_level_docs,
    rustdoc::broken_intra_doc_links,
    rust_2018_idioms
)]
#![deny(unsafe_code)]

//! Query compiler behind `entity-query`.
//!
//! Turns repository methods into executable JPQL: either by parsing a method
//! name such as `findByLastnameAndAgeGreaterThan` or by preprocessing a
//! declared query string. Both paths end in rendered text plus a list of
//! [`ParameterBinding`]s that a [`ParameterBinder`] applies to a provider
//! query.
//!
//! Use `entity-query` instead of depending on this crate directly.
//!
//! # Quick Navigation
//!
//! | Concern | Module |
//! |---------|--------|
//! | Token stream rendering | [`token`] |
//! | Parameter bindings | [`binding`] |
//! | Marker extraction from declared queries | [`extract`] |
//! | JPQL/HQL/EQL grammar | [`parser`] |
//! | Count and sort rewriting | [`enhancer`] |
//! | Declared queries | [`declared`] |
//! | Method name parsing | [`part_tree`] |
//! | Criteria rendering | [`creator`] |
//! | Keyset scrolling | [`keyset`] |
//! | Binding arguments | [`binder`] |
//! | Derived queries with caching | [`derived`], [`cache`] |
//!
//! # Pipeline
//!
//! ```text
//! method name ──► PartTree ──► PartTreeQueryCreator ──► text + bindings ─┐
//!                                   ▲                                    │
//!                        KeysetScrollQueryCreator                        ▼
//! declared query ──► PreprocessedQuery ──► QueryEnhancer ──► ParameterBinder ──► Query
//! ```
//!
//! # Logging
//!
//! Events are emitted through [`tracing`]: `debug` for derived and
//! rewritten queries, `trace` for each bound value and `info` for
//! parameters skipped by lenient binding.

pub mod binder;
pub mod binding;
pub mod cache;
pub mod creator;
pub mod declared;
pub mod derived;
pub mod enhancer;
pub mod error;
pub mod extract;
pub mod keyset;
pub mod parser;
pub mod part_tree;
pub mod token;

pub use binder::{ErrorHandling, ExpressionEvaluator, ParameterBinder};
pub use binding::{BindingIdentifier, BindingKind, ParameterBinding, ParameterOrigin};
pub use creator::{CreatorOptions, JpqlQueryCreator, PartTreeQueryCreator};
pub use declared::{DeclaredQuery, EntityQuery};
pub use derived::{PartTreeQuery, PreparedQuery};
pub use enhancer::{QueryEnhancer, QueryEnhancerSelector};
pub use error::{QueryError, QueryResult};
pub use extract::PreprocessedQuery;
pub use keyset::{KeysetScrollDelegate, KeysetScrollQueryCreator, ScrollDelegate};
pub use parser::Dialect;
pub use part_tree::PartTree;

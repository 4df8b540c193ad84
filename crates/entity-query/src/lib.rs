// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

//! # entity-query
//!
//! One crate, all features. Re-exports:
//! - the query compiler from `entity-query-impl` ([`PartTreeQuery`],
//!   [`EntityQuery`], [`ParameterBinder`], enhancers and keyset scrolling)
//! - all types from `entity-query-core` ([`Sort`], [`Pageable`],
//!   [`ScrollPosition`], [`Metamodel`], [`Query`])
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use entity_query::prelude::*;
//!
//! let metamodel = StaticMetamodel::builder()
//!     .entity(
//!         ManagedType::entity("app.User", "User")
//!             .with(Attribute::id("id", ValueType::Long))
//!             .with(Attribute::basic("lastname", ValueType::String))
//!     )
//!     .build();
//!
//! let parameters = MethodParameters::new("findByLastname").bindable("lastname", ValueType::String);
//! let query = PartTreeQuery::new("findByLastname", "app.User", Arc::new(metamodel), parameters)?;
//!
//! let users = query.execute(&factory, &Arguments::new().with("lastname", "Matthews"))?;
//! ```
//!
//! # Declared Queries
//!
//! ```rust,ignore
//! let query = EntityQuery::jpql("select u from User u where u.lastname like %:name%")?;
//!
//! let sorted = query.rewrite(&Sort::by(["age"]), &ReturnedType::Domain)?;
//! let count = query.derive_count_query(None)?;
//! ```
//!
//! # Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | `Serialize`/`Deserialize` for sorts, pages, scroll positions and values |

pub mod prelude;

pub use entity_query_core::*;
pub use entity_query_impl::{
    DeclaredQuery, Dialect, EntityQuery, ErrorHandling, ExpressionEvaluator, JpqlQueryCreator,
    ParameterBinder, ParameterBinding, PartTree, PartTreeQuery, PartTreeQueryCreator,
    PreparedQuery, PreprocessedQuery, QueryEnhancer, QueryEnhancerSelector, QueryError,
    QueryResult, binder, binding, cache, creator, declared, derived, enhancer, extract, keyset,
    parser, part_tree, token
};

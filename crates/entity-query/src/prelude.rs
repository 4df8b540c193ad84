// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Everything needed to derive, declare and bind queries.
//!
//! ```rust,ignore
//! use entity_query::prelude::*;
//! ```

pub use entity_query_core::prelude::*;
pub use entity_query_impl::{
    DeclaredQuery, EntityQuery, ErrorHandling, ParameterBinder, PartTreeQuery, PreparedQuery,
    QueryEnhancerSelector, QueryError, QueryResult
};

// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Query enhancers.
//!
//! An enhancer wraps one declared query and derives variants from it: the
//! query with a dynamic sort appended and the matching count query. It also
//! answers introspection questions the executor needs (alias, projection,
//! constructor expressions).
//!
//! # Overview
//!
//! - [`QueryEnhancer`] — Strategy trait
//! - [`GrammarQueryEnhancer`] — Parses JPQL, HQL or EQL and rewrites the tree
//! - [`NativeQueryEnhancer`] — Lexical rewrites for native SQL
//! - [`QueryEnhancerSelector`] — Picks a strategy per query
//!
//! # Example
//!
//! ```rust,ignore
//! let enhancer = QueryEnhancerSelector::default().select("select u from User u", false);
//!
//! assert_eq!(enhancer.detect_alias().as_deref(), Some("u"));
//! assert_eq!(enhancer.create_count_query(None)?, "select count(u) from User u");
//! ```

mod count;
mod grammar;
mod native;
pub(crate) mod render;
mod sort;

use std::fmt;

use entity_query_core::{Order, ReturnedType, Sort};
pub use grammar::GrammarQueryEnhancer;
pub use native::NativeQueryEnhancer;

use crate::{
    error::{QueryError, QueryResult},
    parser::Dialect
};

/// Rewrites and introspection of one declared query.
///
/// Introspection never fails: on a query the enhancer cannot understand it
/// reports no alias, an empty projection and no constructor expression.
/// Rewrites surface the failure instead.
pub trait QueryEnhancer: fmt::Debug + Send + Sync {
    /// Query as declared.
    fn query_string(&self) -> &str;

    /// Identification variable of the primary entity.
    fn detect_alias(&self) -> Option<String>;

    /// Select list of the primary query block.
    fn projection(&self) -> String;

    /// Check for `SELECT NEW …`.
    fn has_constructor_expression(&self) -> bool;

    /// Check that the query can be rewritten at all.
    ///
    /// # Errors
    ///
    /// The grammar error of a query that does not parse.
    fn validate(&self) -> QueryResult<()> {
        Ok(())
    }

    /// Query with `sort` applied.
    ///
    /// # Errors
    ///
    /// Grammar errors of the declared query and unsafe sort expressions.
    fn apply_sort(&self, sort: &Sort) -> QueryResult<String> {
        self.rewrite(sort, &ReturnedType::Domain)
    }

    /// Query with `sort` applied, selecting `returned_type`.
    ///
    /// # Errors
    ///
    /// Grammar errors of the declared query and unsafe sort expressions.
    fn rewrite(&self, sort: &Sort, returned_type: &ReturnedType) -> QueryResult<String>;

    /// Count query derived from the declared query.
    ///
    /// # Arguments
    ///
    /// * `projection` — Expression to count instead of the primary alias
    ///
    /// # Errors
    ///
    /// Grammar errors of the declared query.
    fn create_count_query(&self, projection: Option<&str>) -> QueryResult<String>;
}

/// Strategy for one kind of query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnhancerChoice {
    /// Parse with a grammar.
    Grammar(Dialect),

    /// Scan lexically.
    Native
}

impl EnhancerChoice {
    fn create(self, query: &str) -> Box<dyn QueryEnhancer> {
        match self {
            Self::Grammar(dialect) => Box::new(GrammarQueryEnhancer::new(query, dialect)),
            Self::Native => Box::new(NativeQueryEnhancer::new(query))
        }
    }
}

/// Registry choosing the enhancer for declared queries.
///
/// Built once per repository and passed to query construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryEnhancerSelector {
    jpql:   EnhancerChoice,
    native: EnhancerChoice
}

impl QueryEnhancerSelector {
    /// Selector with explicit strategies.
    ///
    /// # Arguments
    ///
    /// * `jpql` — Strategy for entity queries
    /// * `native` — Strategy for native SQL queries
    pub const fn new(jpql: EnhancerChoice, native: EnhancerChoice) -> Self {
        Self {
            jpql,
            native
        }
    }

    /// Hibernate grammar for entity queries.
    pub const fn hql() -> Self {
        Self::new(EnhancerChoice::Grammar(Dialect::Hql), EnhancerChoice::Native)
    }

    /// EclipseLink grammar for entity queries.
    pub const fn eql() -> Self {
        Self::new(EnhancerChoice::Grammar(Dialect::Eql), EnhancerChoice::Native)
    }

    /// Lexical enhancer for every query.
    pub const fn fallback() -> Self {
        Self::new(EnhancerChoice::Native, EnhancerChoice::Native)
    }

    /// Strategy for entity queries.
    pub const fn jpql_choice(&self) -> EnhancerChoice {
        self.jpql
    }

    /// Enhancer for `query`.
    pub fn select(&self, query: &str, native: bool) -> Box<dyn QueryEnhancer> {
        if native {
            self.native.create(query)
        } else {
            self.jpql.create(query)
        }
    }
}

impl Default for QueryEnhancerSelector {
    fn default() -> Self {
        Self::new(EnhancerChoice::Grammar(Dialect::Jpql), EnhancerChoice::Native)
    }
}

/// Reject sort properties that are not plain paths unless marked unsafe.
pub(crate) fn check_sort_expression(order: &Order) -> QueryResult<()> {
    if order.is_unsafe() {
        return Ok(());
    }
    let punctuation = order
        .property()
        .chars()
        .any(|c| c.is_whitespace() || (c.is_ascii_punctuation() && c != '.' && c != '_'));
    if punctuation {
        return Err(QueryError::UnsafeSort(format!(
            "Sort expression '{order}' must only contain property references or aliases used in the select clause; If you really want to use something other than that for sorting, please use JpaSort.unsafe(…)"
        )));
    }
    Ok(())
}

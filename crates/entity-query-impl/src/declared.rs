// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Queries declared as strings.
//!
//! An [`EntityQuery`] is the preprocessed form of a declared JPQL, HQL, EQL
//! or native query: the cleaned text, its bindings and the enhancer that
//! derives sorted and counting variants from it.
//!
//! ```text
//! select u from User u where u.name like %:name%
//!   query_string()          select u from User u where u.name like :name
//!   parameter_bindings()    [name] Like(Containing)
//!   derive_count_query()    select count(u) from User u where u.name like :name
//! ```

use std::fmt;

use entity_query_core::{MethodParameters, ReturnedType, Sort};
use tracing::debug;

use crate::{
    binder::ParameterBinder,
    binding::ParameterBinding,
    enhancer::{QueryEnhancer, QueryEnhancerSelector},
    error::QueryResult,
    extract::PreprocessedQuery
};

/// Read access to a declared query.
pub trait DeclaredQuery {
    /// Query text with normalized markers.
    fn query_string(&self) -> &str;

    /// Check for native SQL.
    fn is_native(&self) -> bool;

    /// Bindings in order of first occurrence.
    fn parameter_bindings(&self) -> &[ParameterBinding];

    /// Check if a named marker binds a method argument.
    fn has_named_parameter(&self) -> bool;

    /// Check for any bindings.
    fn has_parameter_bindings(&self) -> bool {
        !self.parameter_bindings().is_empty()
    }
}

/// Declared query ready for rewriting and binding.
///
/// Immutable: derived variants are new values.
///
/// # Example
///
/// ```rust,ignore
/// let query = EntityQuery::jpql("select u from User u where u.lastname = ?1")?;
/// let count = query.derive_count_query(None)?;
///
/// assert_eq!(count.query_string(), "select count(u) from User u where u.lastname = ?1");
/// ```
pub struct EntityQuery {
    preprocessed: PreprocessedQuery,
    selector:     QueryEnhancerSelector,
    enhancer:     Box<dyn QueryEnhancer>
}

impl fmt::Debug for EntityQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityQuery")
            .field("query", &self.preprocessed.query_string())
            .field("native", &self.preprocessed.is_native())
            .field("bindings", &self.preprocessed.bindings())
            .finish()
    }
}

impl EntityQuery {
    /// Preprocess `query` and select its enhancer.
    ///
    /// # Arguments
    ///
    /// * `query` — Declared query text
    /// * `native` — `true` for native SQL
    /// * `selector` — Enhancer registry
    ///
    /// # Errors
    ///
    /// - [`QueryError::InvalidQuery`](crate::error::QueryError::InvalidQuery)
    ///   for mixed marker styles
    /// - [`QueryError::Binding`](crate::error::QueryError::Binding) for
    ///   conflicting bindings of one marker
    /// - [`QueryError::BadGrammar`](crate::error::QueryError::BadGrammar)
    ///   when the grammar enhancer cannot parse the query
    pub fn create(query: &str, native: bool, selector: QueryEnhancerSelector) -> QueryResult<Self> {
        let preprocessed = PreprocessedQuery::parse(query, native)?;
        let enhancer = selector.select(preprocessed.query_string(), native);
        enhancer.validate()?;
        Ok(Self {
            preprocessed,
            selector,
            enhancer
        })
    }

    /// JPQL query with the default selector.
    ///
    /// # Errors
    ///
    /// See [`EntityQuery::create`].
    pub fn jpql(query: &str) -> QueryResult<Self> {
        Self::create(query, false, QueryEnhancerSelector::default())
    }

    /// Native SQL query with the default selector.
    ///
    /// # Errors
    ///
    /// See [`EntityQuery::create`].
    pub fn native(query: &str) -> QueryResult<Self> {
        Self::create(query, true, QueryEnhancerSelector::default())
    }

    /// Enhancer of the query.
    pub fn enhancer(&self) -> &dyn QueryEnhancer {
        self.enhancer.as_ref()
    }

    /// Identification variable of the primary entity.
    pub fn alias(&self) -> Option<String> {
        self.enhancer.detect_alias()
    }

    /// Select list of the primary query block.
    pub fn projection(&self) -> String {
        self.enhancer.projection()
    }

    /// Check for `SELECT NEW …`.
    pub fn has_constructor_expression(&self) -> bool {
        self.enhancer.has_constructor_expression()
    }

    /// Check for JDBC-style `?` markers.
    pub const fn uses_jdbc_style_parameters(&self) -> bool {
        self.preprocessed.uses_jdbc_style_parameters()
    }

    /// Check if a value expression references the pageable.
    pub const fn uses_paging(&self) -> bool {
        self.preprocessed.contains_pageable_in_expression()
    }

    /// Count query derived from this query.
    ///
    /// Bindings of markers that survive in the count query are carried
    /// over. Bind the result with
    /// [`ErrorHandling::Lenient`](crate::binder::ErrorHandling::Lenient).
    ///
    /// # Errors
    ///
    /// Grammar errors and count derivation failures, e.g. for modifying
    /// queries.
    pub fn derive_count_query(&self, projection: Option<&str>) -> QueryResult<Self> {
        let count = self.enhancer.create_count_query(projection)?;
        debug!(query = %self.preprocessed.query_string(), %count, "derived count query");
        let preprocessed = self.preprocessed.rewrite(&count)?;
        let enhancer = self.selector.select(preprocessed.query_string(), self.is_native());
        Ok(Self {
            preprocessed,
            selector: self.selector,
            enhancer
        })
    }

    /// Query text with `sort` applied, selecting `returned_type`.
    ///
    /// An unsorted request for the domain type returns the query unchanged.
    ///
    /// # Errors
    ///
    /// Grammar errors and [`QueryError::UnsafeSort`](crate::error::QueryError::UnsafeSort).
    pub fn rewrite(&self, sort: &Sort, returned_type: &ReturnedType) -> QueryResult<String> {
        let rewritten = self.enhancer.rewrite(sort, returned_type)?;
        if rewritten != self.preprocessed.query_string() {
            debug!(query = %self.preprocessed.query_string(), %rewritten, "rewrote query");
        }
        Ok(rewritten)
    }

    /// Binder for a method declaring `parameters`.
    ///
    /// # Errors
    ///
    /// See [`ParameterBinder::new`].
    pub fn binder(&self, parameters: &MethodParameters) -> QueryResult<ParameterBinder> {
        ParameterBinder::new(parameters, self.preprocessed.bindings())
    }
}

impl DeclaredQuery for EntityQuery {
    fn query_string(&self) -> &str {
        self.preprocessed.query_string()
    }

    fn is_native(&self) -> bool {
        self.preprocessed.is_native()
    }

    fn parameter_bindings(&self) -> &[ParameterBinding] {
        self.preprocessed.bindings()
    }

    fn has_named_parameter(&self) -> bool {
        self.preprocessed.has_named_parameter()
    }
}

#[cfg(test)]
mod tests {
    use entity_query_core::{Order, ValueType};

    use super::*;
    use crate::{binding::BindingKind, error::QueryError, parser::Dialect};

    #[test]
    fn strips_like_decoration() {
        let query = EntityQuery::jpql("select u from User u where u.name like %:name%").expect("query");
        assert_eq!(query.query_string(), "select u from User u where u.name like :name");
        assert!(query.has_named_parameter());
        assert!(matches!(query.parameter_bindings()[0].kind(), BindingKind::Like(_)));
        assert_eq!(query.alias().as_deref(), Some("u"));
    }

    #[test]
    fn grammar_errors_fail_construction() {
        let err = EntityQuery::jpql("select from User u").expect_err("grammar");
        assert!(err.is_bad_grammar());
        assert!(err.to_string().ends_with("Bad JPQL grammar [select from User u]"));

        assert!(EntityQuery::create("select from User u", false, QueryEnhancerSelector::fallback()).is_ok());
    }

    #[test]
    fn native_queries_skip_grammar() {
        let query = EntityQuery::native("SELECT * FROM users u WHERE u.name = ?1 LIMIT 10").expect("native");
        assert!(query.is_native());
        assert!(query.has_parameter_bindings());
    }

    #[test]
    fn count_query_keeps_bindings() {
        let query = EntityQuery::jpql("select u from User u where u.name like %:name% order by u.age").expect("query");
        let count = query.derive_count_query(None).expect("count");
        assert_eq!(count.query_string(), "select count(u) from User u where u.name like :name");
        assert_eq!(count.parameter_bindings(), query.parameter_bindings());

        let again = count.derive_count_query(None).expect("count of count");
        assert_eq!(again.query_string(), count.query_string());
    }

    #[test]
    fn count_query_with_projection() {
        let query = EntityQuery::jpql("select u from User u").expect("query");
        assert_eq!(
            query.derive_count_query(Some("u.id")).expect("count").query_string(),
            "select count(u.id) from User u"
        );
    }

    #[test]
    fn rewrite_appends_sort() {
        let query = EntityQuery::jpql("select u from User u where u.age > ?1").expect("query");
        assert_eq!(
            query.rewrite(&Sort::unsorted(), &ReturnedType::Domain).expect("unsorted"),
            "select u from User u where u.age > ?1"
        );
        assert_eq!(
            query
                .rewrite(&Sort::by_orders(vec![Order::desc("name")]), &ReturnedType::Domain)
                .expect("sorted"),
            "select u from User u where u.age > ?1 order by u.name desc"
        );
        let err = query
            .rewrite(&Sort::by(["name; drop table"]), &ReturnedType::Domain)
            .expect_err("unsafe");
        assert!(matches!(err, QueryError::UnsafeSort(_)));
    }

    #[test]
    fn hql_selector_allows_missing_select() {
        let query = EntityQuery::create("from User u where u.age > :age", false, QueryEnhancerSelector::hql())
            .expect("hql");
        assert_eq!(query.enhancer().query_string(), "from User u where u.age > :age");
        assert_eq!(
            query.derive_count_query(None).expect("count").query_string(),
            "select count(u) from User u where u.age > :age"
        );
        assert!(EntityQuery::create(
            "from User u",
            false,
            QueryEnhancerSelector::new(
                crate::enhancer::EnhancerChoice::Grammar(Dialect::Jpql),
                crate::enhancer::EnhancerChoice::Native
            )
        )
        .is_err());
    }

    #[test]
    fn binder_checks_positions() {
        let query = EntityQuery::jpql("select u from User u where u.age > ?2").expect("query");
        let parameters = MethodParameters::new("findOlder").bindable("age", ValueType::Integer);
        let err = query.binder(&parameters).expect_err("position");
        assert!(matches!(err, QueryError::Binding(_)));
    }
}

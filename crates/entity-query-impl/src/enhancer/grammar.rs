// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Enhancer backed by the query grammar.

use entity_query_core::{ReturnedType, Sort};
use tracing::warn;

use super::{QueryEnhancer, count, render, sort};
use crate::{
    error::{QueryError, QueryResult},
    parser::{
        Dialect, SyntaxError,
        ast::{Expr, Statement},
        parse
    }
};

/// Parses the declared query once and rewrites the tree on demand.
///
/// A query that does not parse is kept: introspection degrades to empty
/// answers while [`QueryEnhancer::rewrite`] and
/// [`QueryEnhancer::create_count_query`] return the grammar error.
#[derive(Debug, Clone)]
pub struct GrammarQueryEnhancer {
    query:           String,
    dialect:         Dialect,
    parsed:          Result<Statement, SyntaxError>,
    alias:           Option<String>,
    projection:      String,
    has_constructor: bool
}

impl GrammarQueryEnhancer {
    /// Parse `query` with `dialect`.
    pub fn new(query: &str, dialect: Dialect) -> Self {
        let parsed = parse(query, dialect);
        if let Err(error) = &parsed {
            warn!(grammar = dialect.grammar_name(), %error, "query does not match grammar");
        }
        let (alias, projection, has_constructor) = match &parsed {
            Ok(statement) => introspect(statement),
            Err(_) => (None, String::new(), false)
        };
        Self {
            query: query.to_owned(),
            dialect,
            parsed,
            alias,
            projection,
            has_constructor
        }
    }

    /// Grammar used for parsing.
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Parsed statement.
    ///
    /// # Errors
    ///
    /// The grammar error when the query does not parse.
    pub fn statement(&self) -> QueryResult<&Statement> {
        self.parsed.as_ref().map_err(|error| QueryError::from(error.clone()))
    }
}

fn introspect(statement: &Statement) -> (Option<String>, String, bool) {
    match statement {
        Statement::Select(select) => {
            let Some(spec) = select.primary_spec() else {
                return (None, String::new(), false);
            };
            let alias = spec.primary_alias().map(str::to_owned);
            let (projection, has_constructor) = match &spec.select {
                Some(clause) => (
                    render::list(&clause.items, |item| render::expr(&item.expr)).render(),
                    clause
                        .items
                        .iter()
                        .any(|item| matches!(item.expr, Expr::Constructor { .. }))
                ),
                None => (String::new(), false)
            };
            (alias, projection, has_constructor)
        }
        Statement::Update(update) => (update.alias.clone(), String::new(), false),
        Statement::Delete(delete) => (delete.alias.clone(), String::new(), false)
    }
}

impl QueryEnhancer for GrammarQueryEnhancer {
    fn query_string(&self) -> &str {
        &self.query
    }

    fn detect_alias(&self) -> Option<String> {
        self.alias.clone()
    }

    fn projection(&self) -> String {
        self.projection.clone()
    }

    fn has_constructor_expression(&self) -> bool {
        self.has_constructor
    }

    fn validate(&self) -> QueryResult<()> {
        self.statement().map(|_| ())
    }

    fn rewrite(&self, sort: &Sort, returned_type: &ReturnedType) -> QueryResult<String> {
        let statement = self.statement()?;
        if sort.is_unsorted() && !matches!(returned_type, ReturnedType::Dto { .. }) {
            return Ok(self.query.clone());
        }
        let sorted = sort::apply(statement, sort, returned_type)?;
        Ok(render::statement(&sorted).render())
    }

    fn create_count_query(&self, projection: Option<&str>) -> QueryResult<String> {
        let statement = self.statement()?;
        let counted = count::derive(statement, projection)?;
        Ok(render::statement(&counted).render())
    }
}

#[cfg(test)]
mod tests {
    use entity_query_core::Order;

    use super::*;

    #[test]
    fn introspection() {
        let enhancer = GrammarQueryEnhancer::new("select u.name, u.age from User u", Dialect::Jpql);
        assert_eq!(enhancer.detect_alias().as_deref(), Some("u"));
        assert_eq!(enhancer.projection(), "u.name, u.age");
        assert!(!enhancer.has_constructor_expression());

        let dto = GrammarQueryEnhancer::new("select new a.Dto(u.name) from User u", Dialect::Jpql);
        assert!(dto.has_constructor_expression());
    }

    #[test]
    fn invalid_query_degrades_introspection() {
        let enhancer = GrammarQueryEnhancer::new("select u form User u", Dialect::Jpql);
        assert_eq!(enhancer.detect_alias(), None);
        assert_eq!(enhancer.projection(), "");
        assert!(!enhancer.has_constructor_expression());
        assert!(enhancer.apply_sort(&Sort::by(["name"])).expect_err("bad grammar").is_bad_grammar());
        assert!(enhancer.create_count_query(None).expect_err("bad grammar").is_bad_grammar());
    }

    #[test]
    fn unsorted_keeps_query_text() {
        let query = "select u  from User u";
        let enhancer = GrammarQueryEnhancer::new(query, Dialect::Jpql);
        assert_eq!(enhancer.apply_sort(&Sort::unsorted()).expect("unsorted"), query);
    }

    #[test]
    fn sort_and_count() {
        let enhancer = GrammarQueryEnhancer::new("SELECT u FROM User u WHERE u.active = true", Dialect::Jpql);
        assert_eq!(
            enhancer.apply_sort(&Sort::by_orders(vec![Order::asc("name")])).expect("sorted"),
            "SELECT u FROM User u WHERE u.active = true order by u.name asc"
        );
        assert_eq!(
            enhancer.create_count_query(None).expect("count"),
            "SELECT count(u) FROM User u WHERE u.active = true"
        );
    }

    #[test]
    fn delete_alias() {
        let enhancer = GrammarQueryEnhancer::new("delete from User u where u.id = ?1", Dialect::Jpql);
        assert_eq!(enhancer.detect_alias().as_deref(), Some("u"));
    }
}

// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! JPQL, HQL and EQL parsing.
//!
//! # Overview
//!
//! - [`Lexer`] — Turns query text into [`Token`]s
//! - [`grammar::Parser`] — Builds the [`ast`] from tokens
//! - [`parse`] — Entry point with the fast/backtracking retry
//!
//! All three dialects share one grammar. [`Dialect`] switches the few rules
//! where they differ.

pub mod ast;
mod error;
pub mod grammar;
mod lexer;
mod token;

pub use error::{ParseFailure, SyntaxError};
pub use lexer::Lexer;
pub use token::{Position, Token, TokenType, is_reserved_keyword};
use tracing::trace;

use self::{
    ast::Statement,
    grammar::{Mode, Parser}
};

/// Functions defined by the JPA specification.
const JPQL_FUNCTIONS: &[&str] = &[
    "ABS", "AVG", "CAST", "CEILING", "COALESCE", "CONCAT", "COUNT", "ENTRY", "EXP", "EXTRACT",
    "FLOOR", "FUNCTION", "ID", "INDEX", "KEY", "LEFT", "LENGTH", "LN", "LOCATE", "LOWER", "MAX",
    "MIN", "MOD", "NULLIF", "POWER", "REPLACE", "RIGHT", "ROUND", "SIGN", "SIZE", "SQRT",
    "SUBSTRING", "SUM", "TREAT", "TRIM", "TYPE", "UPPER", "VALUE", "VERSION"
];

/// EclipseLink extensions on top of [`JPQL_FUNCTIONS`].
const EQL_FUNCTIONS: &[&str] = &["COLUMN", "FUNC", "OPERATOR", "SQL"];

/// Query language flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    /// Jakarta Persistence Query Language.
    #[default]
    Jpql,

    /// Hibernate Query Language.
    Hql,

    /// EclipseLink Query Language.
    Eql
}

impl Dialect {
    /// Grammar name used in error messages.
    pub const fn grammar_name(self) -> &'static str {
        match self {
            Self::Jpql => "JPQL",
            Self::Hql => "HQL",
            Self::Eql => "EQL"
        }
    }

    /// HQL accepts `from User u` without a select clause.
    pub const fn allows_missing_select(self) -> bool {
        matches!(self, Self::Hql)
    }

    /// HQL accepts `LIMIT`, `OFFSET` and `FETCH` clauses.
    pub const fn allows_paging(self) -> bool {
        matches!(self, Self::Hql)
    }

    /// Check if `name(…)` is a function call in this dialect.
    ///
    /// HQL passes unknown functions through to the database.
    pub fn accepts_function(self, name: &str) -> bool {
        let known = |list: &[&str]| list.iter().any(|f| f.eq_ignore_ascii_case(name));
        match self {
            Self::Hql => true,
            Self::Jpql => known(JPQL_FUNCTIONS),
            Self::Eql => known(JPQL_FUNCTIONS) || known(EQL_FUNCTIONS)
        }
    }
}

/// Parse `query` as a statement of `dialect`.
///
/// A fast pass with one token of lookahead runs first. When it reports
/// [`ParseFailure::PredictionFailed`] the query is parsed again with
/// backtracking. Syntax errors of either pass are final.
///
/// # Errors
///
/// Returns [`SyntaxError`] when the query does not match the grammar.
///
/// # Example
///
/// ```rust,ignore
/// let statement = parse("select u from User u", Dialect::Jpql)?;
/// ```
pub fn parse(query: &str, dialect: Dialect) -> Result<Statement, SyntaxError> {
    let tokens = Lexer::new(query).tokenize();
    match Parser::new(&tokens, query, dialect, Mode::Fast).parse() {
        Ok(statement) => Ok(statement),
        Err(ParseFailure::Syntax(error)) => Err(error),
        Err(ParseFailure::PredictionFailed) => {
            trace!(grammar = dialect.grammar_name(), "prediction failed, retrying with backtracking");
            match Parser::new(&tokens, query, dialect, Mode::Backtracking).parse() {
                Ok(statement) => Ok(statement),
                Err(ParseFailure::Syntax(error)) => Err(error),
                Err(ParseFailure::PredictionFailed) => Err(SyntaxError::no_viable_alternative(
                    &tokens[0],
                    dialect.grammar_name(),
                    query
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jpql_requires_select() {
        let err = parse("from User u", Dialect::Jpql).expect_err("select-less JPQL");
        assert_eq!(err.grammar(), "JPQL");
        assert!(err.message().starts_with("At 1:0 and token 'from'"), "{}", err.message());
        assert!(parse("from User u", Dialect::Hql).is_ok());
    }

    #[test]
    fn missing_from_is_reported_with_position() {
        let err = parse("select u where u.id = 1", Dialect::Jpql).expect_err("no from");
        assert_eq!(
            err.message(),
            "At 1:9 and token 'where', mismatched input 'where' expecting FROM"
        );
        assert_eq!(
            err.to_string(),
            "At 1:9 and token 'where', mismatched input 'where' expecting FROM; Bad JPQL grammar [select u where u.id = 1]"
        );
    }

    #[test]
    fn eclipselink_functions() {
        let query = "select u from User u where column('NAME', u) = 'x'";
        assert!(parse(query, Dialect::Eql).is_ok());
        assert!(parse(query, Dialect::Jpql).is_err());
        assert!(parse(query, Dialect::Hql).is_ok());
    }

    #[test]
    fn retries_ambiguous_parentheses() {
        let query = "select u from User u where u.id in ((select a.id from A a) union (select b.id from B b))";
        assert!(parse(query, Dialect::Jpql).is_ok());
    }

    #[test]
    fn reserved_word_as_entity_name() {
        assert!(parse("select o from Order o where o.order.id = 1", Dialect::Jpql).is_ok());
    }

    #[test]
    fn update_and_delete() {
        assert!(matches!(
            parse("update User u set u.active = false where u.id = :id", Dialect::Jpql),
            Ok(Statement::Update(_))
        ));
        assert!(matches!(parse("delete from User u", Dialect::Jpql), Ok(Statement::Delete(_))));
    }

    #[test]
    fn cte_and_set_operations() {
        let query = "with recent as (select u.id from User u) select r from recent r union all select a from Admin a";
        let Ok(Statement::Select(select)) = parse(query, Dialect::Hql) else {
            panic!("expected select");
        };
        assert!(select.with.is_some());
        assert_eq!(select.set_operations[0].words, "union all");
    }

    #[test]
    fn constructor_expression() {
        assert!(parse("select new com.example.Dto(u.name, u.age) from User u", Dialect::Jpql).is_ok());
    }
}

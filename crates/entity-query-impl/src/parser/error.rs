// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Syntax errors.

use std::fmt;

use super::token::Token;
use crate::error::QueryError;

/// Query that does not match its grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    message: String,
    grammar: &'static str,
    query:   String
}

impl SyntaxError {
    /// Unexpected `token` where one of `expected` should have been.
    ///
    /// # Arguments
    ///
    /// * `token` — Offending token
    /// * `expected` — Human readable alternatives, e.g. `"FROM"`
    /// * `grammar` — Grammar name
    /// * `query` — Query text
    pub fn mismatched(token: &Token, expected: &str, grammar: &'static str, query: &str) -> Self {
        Self {
            message: format!(
                "At {} and token '{token}', mismatched input '{token}' expecting {expected}",
                token.position
            ),
            grammar,
            query: query.to_owned()
        }
    }

    /// No alternative of the grammar applies at `token`.
    ///
    /// The offending line is quoted with a `*` marking the position.
    pub fn no_viable_alternative(token: &Token, grammar: &'static str, query: &str) -> Self {
        let line = query
            .lines()
            .nth(token.position.line.saturating_sub(1))
            .unwrap_or_default();
        let split = line
            .char_indices()
            .nth(token.position.column)
            .map_or(line.len(), |(i, _)| i);
        Self {
            message: format!(
                "At {} and token '{token}', no viable alternative at input '{}*{}'",
                token.position,
                &line[..split],
                &line[split..]
            ),
            grammar,
            query: query.to_owned()
        }
    }

    /// Location and offending token.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Grammar name.
    pub const fn grammar(&self) -> &'static str {
        self.grammar
    }

    /// Query text.
    pub fn query(&self) -> &str {
        &self.query
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}; Bad {} grammar [{}]", self.message, self.grammar, self.query)
    }
}

impl std::error::Error for SyntaxError {}

impl From<SyntaxError> for QueryError {
    fn from(error: SyntaxError) -> Self {
        Self::BadGrammar {
            message: error.message,
            grammar: error.grammar,
            query:   error.query
        }
    }
}

/// Outcome of a failed parse attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    /// The fast pass met a decision it cannot make with one token of
    /// lookahead. The caller retries in backtracking mode.
    PredictionFailed,

    /// The query is invalid.
    Syntax(SyntaxError)
}

impl From<SyntaxError> for ParseFailure {
    fn from(error: SyntaxError) -> Self {
        Self::Syntax(error)
    }
}

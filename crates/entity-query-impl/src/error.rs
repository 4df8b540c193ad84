// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Error types of the query compiler.
//!
//! Configuration errors ([`QueryError::BadGrammar`],
//! [`QueryError::InvalidQuery`], [`QueryError::PropertyNotFound`],
//! [`QueryError::InvalidArgument`]) surface when a query object is
//! constructed. The remaining variants are raised per invocation.

use thiserror::Error;

/// Query compilation, rewriting or binding failure.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Declared query does not match the grammar of its dialect.
    #[error("{message}; Bad {grammar} grammar [{query}]")]
    BadGrammar {
        /// Location and offending token.
        message: String,

        /// Grammar name (`JPQL`, `HQL`, `EQL`).
        grammar: &'static str,

        /// Query text.
        query: String
    },

    /// Query cannot be derived or rewritten.
    #[error("{0}")]
    InvalidQuery(String),

    /// Dynamic sort references something other than a property or alias.
    #[error("{0}")]
    UnsafeSort(String),

    /// Property path does not resolve against the metamodel.
    #[error("No property '{property}' found for type '{owner}'")]
    PropertyNotFound {
        /// Unresolved path segment.
        property: String,

        /// Simple name of the type searched.
        owner: String
    },

    /// Method arguments do not fit the derived predicates.
    #[error("{0}")]
    InvalidArgument(String),

    /// Keyset cursor misses a value of the effective sort.
    #[error("KeysetScrollPosition does not contain all keyset values")]
    IncompleteKeyset,

    /// Binding could not be applied to the query.
    #[error("{0}")]
    Binding(String),

    /// Error raised by the persistence provider.
    #[error(transparent)]
    Provider(Box<dyn std::error::Error + Send + Sync>)
}

impl QueryError {
    /// Wrap a provider error.
    pub fn provider<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static
    {
        Self::Provider(Box::new(error))
    }

    /// Check if this is a grammar error.
    pub const fn is_bad_grammar(&self) -> bool {
        matches!(self, Self::BadGrammar { .. })
    }
}

/// Result alias used throughout the compiler.
pub type QueryResult<T> = Result<T, QueryError>;

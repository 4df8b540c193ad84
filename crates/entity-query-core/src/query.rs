// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Executable query handed out by the persistence provider.

use crate::value::{TemporalType, Value};

/// Parameter marker discovered by the provider in a query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryParameter {
    name:     Option<String>,
    position: Option<usize>
}

impl QueryParameter {
    /// Named marker `:name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name:     Some(name.into()),
            position: None
        }
    }

    /// Positional marker `?position`.
    pub const fn positional(position: usize) -> Self {
        Self {
            name:     None,
            position: Some(position)
        }
    }

    /// Marker name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Marker position (1-based).
    pub const fn position(&self) -> Option<usize> {
        self.position
    }
}

/// Query created by the provider from rendered query text.
///
/// The binder only sets parameters and paging bounds; execution goes through
/// [`Query::result_list`].
pub trait Query {
    /// Provider error.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Result row.
    type Row;

    /// Markers present in the query text.
    fn parameters(&self) -> Vec<QueryParameter>;

    /// Set the value of a named marker.
    fn set_parameter_by_name(
        &mut self,
        name: &str,
        value: Value,
        temporal: Option<TemporalType>
    ) -> Result<(), Self::Error>;

    /// Set the value of a positional marker.
    fn set_parameter_by_position(
        &mut self,
        position: usize,
        value: Value,
        temporal: Option<TemporalType>
    ) -> Result<(), Self::Error>;

    /// Maximum number of rows. `usize::MAX` means unbounded.
    fn max_results(&self) -> usize;

    /// Limit the number of rows.
    fn set_max_results(&mut self, max: usize);

    /// Offset of the first row.
    fn first_result(&self) -> usize;

    /// Skip rows.
    fn set_first_result(&mut self, first: usize);

    /// Execute and fetch all rows.
    fn result_list(&mut self) -> Result<Vec<Self::Row>, Self::Error>;

    /// Check if the query declares a marker with `name`.
    fn has_named_parameter(&self, name: &str) -> bool {
        self.parameters().iter().any(|p| p.name() == Some(name))
    }

    /// Check if the query declares a marker at `position`.
    fn has_positional_parameter(&self, position: usize) -> bool {
        self.parameters().iter().any(|p| p.position() == Some(position))
    }
}

/// Creates [`Query`] objects from rendered query text.
pub trait QueryFactory {
    /// Query type produced.
    type Query: Query;

    /// Create a query.
    ///
    /// # Arguments
    ///
    /// * `query` — Rendered query text
    /// * `native` — `true` for native SQL
    /// * `tuple` — `true` when rows are read as tuples instead of entities
    fn create_query(
        &self,
        query: &str,
        native: bool,
        tuple: bool
    ) -> Result<Self::Query, <Self::Query as Query>::Error>;
}

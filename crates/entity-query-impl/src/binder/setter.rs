// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Setters applying one binding to a query.

use entity_query_core::{ParameterAccessor, Query, TemporalType, Value};
use tracing::{info, trace};

use super::ExpressionEvaluator;
use crate::{
    binding::ParameterBinding,
    error::{QueryError, QueryResult}
};

/// How provider errors raised while setting parameters are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ErrorHandling {
    /// Propagate every error.
    #[default]
    Strict,

    /// Log and skip parameters the query rejects.
    ///
    /// Used for count queries whose text lost markers of the original.
    Lenient
}

impl ErrorHandling {
    /// Check for [`ErrorHandling::Lenient`].
    pub const fn is_lenient(&self) -> bool {
        matches!(self, Self::Lenient)
    }

    /// Apply the handling to the outcome of a provider call.
    ///
    /// # Errors
    ///
    /// The provider error wrapped in [`QueryError::Provider`] when strict.
    pub fn execute<E>(self, result: Result<(), E>) -> QueryResult<()>
    where
        E: std::error::Error + Send + Sync + 'static
    {
        match (self, result) {
            (_, Ok(())) => Ok(()),
            (Self::Strict, Err(error)) => Err(QueryError::provider(error)),
            (Self::Lenient, Err(error)) => {
                info!(%error, "Silently ignoring");
                Ok(())
            }
        }
    }
}

/// Where a setter takes its raw value from.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueSource {
    /// Bindable method argument at a 0-based index.
    Argument(usize),

    /// Value expression.
    Expression(String),

    /// Captured value.
    Synthetic(Value)
}

/// Applies one [`ParameterBinding`] to a [`Query`].
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterSetter {
    /// Binds nothing. Used for `IS NULL` predicates and names without a
    /// matching method parameter.
    Noop,

    /// Binds a prepared value.
    Bind {
        /// Binding to apply.
        binding:  ParameterBinding,

        /// Raw value source.
        source:   ValueSource,

        /// Declared temporal precision of the argument.
        temporal: Option<TemporalType>
    }
}

impl ParameterSetter {
    /// Setter binding the value of `source`.
    pub const fn bind(
        binding: ParameterBinding,
        source: ValueSource,
        temporal: Option<TemporalType>
    ) -> Self {
        Self::Bind {
            binding,
            source,
            temporal
        }
    }

    /// Check for [`ParameterSetter::Noop`].
    pub const fn is_noop(&self) -> bool {
        matches!(self, Self::Noop)
    }

    /// Binding of the setter.
    pub const fn binding(&self) -> Option<&ParameterBinding> {
        match self {
            Self::Noop => None,
            Self::Bind {
                binding, ..
            } => Some(binding)
        }
    }

    /// Set the prepared value on `query`.
    ///
    /// Uses the binding name when the query declares named markers, else
    /// the binding position. Positions beyond the markers of the query are
    /// only attempted leniently.
    ///
    /// # Errors
    ///
    /// Expression evaluation failures, and provider errors under
    /// [`ErrorHandling::Strict`].
    pub fn set<Q>(
        &self,
        query: &mut Q,
        accessor: &dyn ParameterAccessor,
        evaluator: Option<&dyn ExpressionEvaluator>,
        handling: ErrorHandling
    ) -> QueryResult<()>
    where
        Q: Query
    {
        let Self::Bind {
            binding,
            source,
            temporal
        } = self
        else {
            return Ok(());
        };

        let raw = match source {
            ValueSource::Argument(index) => accessor.bindable_value(*index).cloned().unwrap_or_default(),
            ValueSource::Expression(expression) => {
                let evaluator = evaluator.ok_or_else(|| {
                    QueryError::Binding(format!("No expression evaluator available for {expression}"))
                })?;
                evaluator.evaluate(expression, accessor)?
            }
            ValueSource::Synthetic(value) => value.clone()
        };
        let value = binding.prepare(raw);
        trace!(%binding, ?value, "binding parameter");

        let parameters = query.parameters();
        let has_named = parameters.iter().any(|p| p.name().is_some());
        if has_named && let Some(name) = binding.name() {
            return handling.execute(query.set_parameter_by_name(name, value, *temporal));
        }
        if let Some(position) = binding.position()
            && (position <= parameters.len()
                || handling.is_lenient()
                || query.has_positional_parameter(position))
        {
            return handling.execute(query.set_parameter_by_position(position, value, *temporal));
        }
        Ok(())
    }
}

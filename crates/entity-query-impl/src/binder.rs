// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Binding of method arguments to executable queries.
//!
//! A [`ParameterBinder`] turns the [`ParameterBinding`]s of a query into one
//! [`ParameterSetter`] each. Setters are resolved once, when the binder is
//! created, so every invocation only looks values up and applies them.
//!
//! # Overview
//!
//! - [`ParameterBinder`] — Binds arguments and paging bounds
//! - [`ParameterSetter`] — Applies a single binding
//! - [`ErrorHandling`] — Strict or lenient treatment of provider errors
//! - [`ExpressionEvaluator`] — Evaluates value expressions such as `:#{[0]}`
//!
//! # Example
//!
//! ```rust,ignore
//! let binder = ParameterBinder::new(&parameters, query.parameter_bindings())?;
//! let mut jpa = factory.create_query(query.query_string(), false, false)?;
//! binder.bind_and_prepare(&mut jpa, &arguments)?;
//! ```

mod setter;

use std::{fmt, sync::Arc};

use entity_query_core::{MethodParameters, ParameterAccessor, Query, Value};

pub use self::setter::{ErrorHandling, ParameterSetter, ValueSource};
use crate::{
    binding::{BindingIdentifier, ParameterBinding, ParameterOrigin},
    error::{QueryError, QueryResult}
};

/// Evaluates value expressions of declared queries.
pub trait ExpressionEvaluator: Send + Sync {
    /// Value of `expression` for the current invocation.
    ///
    /// # Errors
    ///
    /// Implementation specific; usually [`QueryError::InvalidArgument`].
    fn evaluate(&self, expression: &str, accessor: &dyn ParameterAccessor) -> QueryResult<Value>;
}

impl<F> ExpressionEvaluator for F
where
    F: Fn(&str, &dyn ParameterAccessor) -> QueryResult<Value> + Send + Sync
{
    fn evaluate(&self, expression: &str, accessor: &dyn ParameterAccessor) -> QueryResult<Value> {
        self(expression, accessor)
    }
}

/// Binds method arguments to a [`Query`].
#[derive(Clone, Default)]
pub struct ParameterBinder {
    setters:   Vec<ParameterSetter>,
    evaluator: Option<Arc<dyn ExpressionEvaluator>>
}

impl fmt::Debug for ParameterBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterBinder")
            .field("setters", &self.setters)
            .field("evaluator", &self.evaluator.is_some())
            .finish()
    }
}

impl ParameterBinder {
    /// Binder for `bindings` of a query declared on a method with
    /// `parameters`.
    ///
    /// # Errors
    ///
    /// [`QueryError::Binding`] when a positional binding points past the
    /// bindable parameters of the method.
    pub fn new(parameters: &MethodParameters, bindings: &[ParameterBinding]) -> QueryResult<Self> {
        let setters = bindings
            .iter()
            .map(|binding| setter(parameters, binding))
            .collect::<QueryResult<Vec<_>>>()?;
        Ok(Self {
            setters,
            evaluator: None
        })
    }

    /// Evaluate value expressions with `evaluator`.
    #[must_use]
    pub fn with_evaluator(mut self, evaluator: Arc<dyn ExpressionEvaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    /// Setters in binding order.
    pub fn setters(&self) -> &[ParameterSetter] {
        &self.setters
    }

    /// Set every parameter of `query` from `accessor`.
    ///
    /// # Errors
    ///
    /// Provider errors under [`ErrorHandling::Strict`] and expression
    /// evaluation failures.
    pub fn bind<Q>(&self, query: &mut Q, accessor: &dyn ParameterAccessor, handling: ErrorHandling) -> QueryResult<()>
    where
        Q: Query
    {
        let evaluator = self.evaluator.as_deref();
        for setter in &self.setters {
            setter.set(query, accessor, evaluator, handling)?;
        }
        Ok(())
    }

    /// Bind strictly, then apply the page request of `accessor`.
    ///
    /// # Errors
    ///
    /// See [`ParameterBinder::bind`].
    pub fn bind_and_prepare<Q>(&self, query: &mut Q, accessor: &dyn ParameterAccessor) -> QueryResult<()>
    where
        Q: Query
    {
        self.bind(query, accessor, ErrorHandling::Strict)?;
        let pageable = accessor.pageable();
        if let (Some(offset), Some(size)) = (pageable.offset(), pageable.page_size()) {
            query.set_first_result(to_usize(offset));
            query.set_max_results(to_usize(size));
        }
        Ok(())
    }
}

fn to_usize(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

fn setter(parameters: &MethodParameters, binding: &ParameterBinding) -> QueryResult<ParameterSetter> {
    if binding.is_is_null() {
        return Ok(ParameterSetter::Noop);
    }
    let setter = match binding.origin() {
        ParameterOrigin::Expression(expression) => {
            ParameterSetter::bind(binding.clone(), ValueSource::Expression(expression.clone()), None)
        }
        ParameterOrigin::Synthetic {
            value, ..
        } => ParameterSetter::bind(binding.clone(), ValueSource::Synthetic(value.clone()), None),
        ParameterOrigin::MethodArgument(identifier) => {
            let found = match identifier {
                BindingIdentifier::Named(name) | BindingIdentifier::NamedAndIndexed(name, _) => parameters
                    .bindable_parameters()
                    .enumerate()
                    .find(|(_, p)| p.name() == Some(name.as_str())),
                BindingIdentifier::Indexed(position) => {
                    let available = parameters.bindable_len();
                    if *position == 0 || *position > available {
                        return Err(QueryError::Binding(format!(
                            "At least {position} parameter(s) provided but only {available} parameter(s) present in query"
                        )));
                    }
                    parameters
                        .bindable_parameters()
                        .enumerate()
                        .nth(position - 1)
                }
            };
            match found {
                Some((index, parameter)) => ParameterSetter::bind(
                    binding.clone(),
                    ValueSource::Argument(index),
                    parameter.temporal_type().filter(|_| parameter.is_temporal())
                ),
                None => ParameterSetter::Noop
            }
        }
    };
    Ok(setter)
}

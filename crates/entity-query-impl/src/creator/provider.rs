// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Parameter bookkeeping while a part tree is rendered.

use entity_query_core::{MethodParameters, ParameterAccessor, ValueType};

use crate::{
    binding::{
        BindingIdentifier, BindingKind, EscapeCharacter, ParameterBinding, ParameterOrigin, PartTreeBinding
    },
    error::{QueryError, QueryResult},
    part_tree::{IgnoreCaseType, Part, PartTree, PartType}
};

/// Type a predicate expects its argument to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Expected {
    /// Declared parameter type.
    Declared,

    /// String pattern.
    Text,

    /// Collection of values.
    Collection
}

/// Hands out the method parameters in declaration order and records a
/// [`ParameterBinding`] with a fresh `?N` position for each of them.
pub(crate) struct ParameterMetadataProvider<'a> {
    parameters: &'a MethodParameters,
    values:     Option<&'a dyn ParameterAccessor>,
    escape:     EscapeCharacter,
    next:       usize,
    position:   usize,
    bindings:   Vec<ParameterBinding>
}

impl<'a> ParameterMetadataProvider<'a> {
    /// Provider over `parameters`.
    ///
    /// With `values`, a `null` argument of a simple property turns its
    /// predicate into `IS NULL`.
    pub(crate) fn new(
        parameters: &'a MethodParameters,
        values: Option<&'a dyn ParameterAccessor>,
        escape: EscapeCharacter
    ) -> Self {
        Self {
            parameters,
            values,
            escape,
            next: 0,
            position: 0,
            bindings: Vec::new()
        }
    }

    /// Binding for the next argument of `part`.
    ///
    /// # Errors
    ///
    /// [`QueryError::InvalidArgument`] when the method has no parameter left.
    pub(crate) fn next(&mut self, part: &Part, expected: Expected) -> QueryResult<ParameterBinding> {
        let index = self.next;
        let parameter = self.parameters.bindable_at(index).ok_or_else(|| {
            QueryError::InvalidArgument(format!("No parameter available for part {}", part.source()))
        })?;
        self.next += 1;
        self.position += 1;

        let declared = parameter.value_type().cloned().unwrap_or(ValueType::String);
        let value_type = match expected {
            Expected::Declared => declared,
            Expected::Text => ValueType::String,
            Expected::Collection if declared.is_collection_like() => declared,
            Expected::Collection => ValueType::collection_of(declared)
        };
        let binds_null = self
            .values
            .and_then(|values| values.bindable_value(index))
            .is_some_and(|value| value.is_null());
        let part_type = match part.part_type() {
            PartType::SimpleProperty | PartType::NegatingSimpleProperty if binds_null => PartType::IsNull,
            other => other
        };
        let prepared = PartTreeBinding::new(part_type, value_type)
            .ignore_case(part.ignore_case() == IgnoreCaseType::Always)
            .no_wildcards(part.property().is_collection())
            .escape(self.escape);

        let argument = match parameter.name() {
            Some(name) => BindingIdentifier::NamedAndIndexed(name.to_owned(), index + 1),
            None => BindingIdentifier::indexed(index + 1)
        };
        let binding = ParameterBinding::with_kind(
            BindingIdentifier::indexed(self.position),
            ParameterOrigin::argument(argument),
            BindingKind::PartTree(prepared)
        );
        self.bindings.push(binding.clone());
        Ok(binding)
    }

    /// Escape character of LIKE predicates.
    pub(crate) const fn escape(&self) -> EscapeCharacter {
        self.escape
    }

    /// Bindings created so far.
    pub(crate) fn into_bindings(self) -> Vec<ParameterBinding> {
        self.bindings
    }
}

/// Check the declared parameters against the arguments the tree consumes.
///
/// # Errors
///
/// [`QueryError::InvalidArgument`] when parameters are missing or an `IN`
/// operator does not get a collection.
pub fn validate(tree: &PartTree, parameters: &MethodParameters) -> QueryResult<()> {
    let method = parameters.method_name();
    let mut index = 0;
    for part in tree.parts() {
        for _ in 0..part.number_of_arguments() {
            let property = part.property().to_dot_path();
            let part_type = part.part_type();
            let Some(parameter) = parameters.bindable_at(index) else {
                return Err(QueryError::InvalidArgument(format!(
                    "Method {method} expects at least {} arguments but only found {index}; This leaves an operator of type {} for property {property} unbound",
                    index + 1,
                    part_type.name()
                )));
            };
            let declared = parameter.value_type().cloned().unwrap_or(ValueType::String);
            let expects_collection = matches!(part_type, PartType::In | PartType::NotIn);
            let mismatch = if expects_collection && !declared.is_collection_like() {
                Some("Collection")
            } else if !expects_collection && matches!(declared, ValueType::Collection(_)) {
                Some("scalar")
            } else {
                None
            };
            if let Some(expected) = mismatch {
                return Err(QueryError::InvalidArgument(format!(
                    "Operator {} on {property} requires a {expected} argument, found {} in method {method}",
                    part_type.name(),
                    declared.name()
                )));
            }
            index += 1;
        }
    }
    Ok(())
}

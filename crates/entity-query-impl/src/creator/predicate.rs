// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Predicates for single method name parts.

use super::{
    CreatorOptions,
    builder::{Expression, Predicate, SelectQuery},
    join,
    provider::{Expected, ParameterMetadataProvider}
};
use crate::{
    binding::ParameterBinding,
    error::{QueryError, QueryResult},
    part_tree::{IgnoreCaseType, Part, PartType}
};

/// Renders one [`Part`] into a [`Predicate`], adding joins and bindings.
pub(crate) struct PredicateBuilder<'a, 'p> {
    part:     &'a Part,
    options:  &'a CreatorOptions,
    provider: &'a mut ParameterMetadataProvider<'p>
}

impl<'a, 'p> PredicateBuilder<'a, 'p> {
    pub(crate) fn new(
        part: &'a Part,
        options: &'a CreatorOptions,
        provider: &'a mut ParameterMetadataProvider<'p>
    ) -> Self {
        Self {
            part,
            options,
            provider
        }
    }

    /// Predicate of the part.
    ///
    /// # Errors
    ///
    /// [`QueryError::InvalidArgument`] for ignore-case on non-string
    /// properties, emptiness checks on scalar properties and missing
    /// arguments. [`QueryError::InvalidQuery`] for keywords without a JPQL
    /// rendering.
    pub(crate) fn build(mut self, query: &mut SelectQuery) -> QueryResult<Predicate> {
        let property = self.part.property();
        let part_type = self.part.part_type();
        let path: Expression = if navigates_collection(property.is_collection(), part_type) {
            join::implicit(property).into()
        } else {
            join::resolve(query, property, false, self.options.path_optimization()).into()
        };
        let path_ignoring_case = self.ignore_case(path.clone())?;

        let predicate = match part_type {
            PartType::Between => {
                let lower = self.parameter(Expected::Declared)?;
                let upper = self.parameter(Expected::Declared)?;
                Predicate::Between {
                    expr: path,
                    lower,
                    upper
                }
            }
            PartType::After | PartType::GreaterThan => self.compare(path, ">")?,
            PartType::GreaterThanEqual => self.compare(path, ">=")?,
            PartType::Before | PartType::LessThan => self.compare(path, "<")?,
            PartType::LessThanEqual => self.compare(path, "<=")?,
            PartType::IsNull => Predicate::Is {
                expr: path,
                test: "NULL"
            },
            PartType::IsNotNull => Predicate::Is {
                expr: path,
                test: "NOT NULL"
            },
            PartType::In | PartType::NotIn => Predicate::In {
                expr:    path_ignoring_case,
                negated: part_type == PartType::NotIn,
                values:  self.parameter(Expected::Collection)?
            },
            PartType::StartingWith
            | PartType::EndingWith
            | PartType::Containing
            | PartType::NotContaining
                if property.is_collection() =>
            {
                Predicate::MemberOf {
                    value:      self.parameter(Expected::Declared)?,
                    negated:    part_type == PartType::NotContaining,
                    collection: path
                }
            }
            PartType::StartingWith
            | PartType::EndingWith
            | PartType::Containing
            | PartType::NotContaining
            | PartType::Like
            | PartType::NotLike => {
                let pattern = self.parameter(Expected::Text)?;
                Predicate::Like {
                    left:    path_ignoring_case,
                    negated: matches!(part_type, PartType::NotLike | PartType::NotContaining),
                    right:   self.ignore_case(pattern)?,
                    escape:  self.provider.escape().value()
                }
            }
            PartType::True => Predicate::Compare {
                left:     path,
                operator: "=",
                right:    Expression::Literal("TRUE".to_owned())
            },
            PartType::False => Predicate::Compare {
                left:     path,
                operator: "=",
                right:    Expression::Literal("FALSE".to_owned())
            },
            PartType::SimpleProperty | PartType::NegatingSimpleProperty => {
                let binding = self.provider.next(self.part, Expected::Declared)?;
                let negated = part_type == PartType::NegatingSimpleProperty;
                if binding.is_is_null() {
                    Predicate::Is {
                        expr: path,
                        test: if negated { "NOT NULL" } else { "NULL" }
                    }
                } else {
                    Predicate::Compare {
                        left:     path_ignoring_case,
                        operator: if negated { "!=" } else { "=" },
                        right:    self.ignore_case(placeholder(&binding)?)?
                    }
                }
            }
            PartType::IsEmpty | PartType::IsNotEmpty => {
                if !property.is_collection() {
                    return Err(QueryError::InvalidArgument(
                        "IsEmpty / IsNotEmpty can only be used on collection properties".to_owned()
                    ));
                }
                Predicate::Is {
                    expr: path,
                    test: if part_type == PartType::IsNotEmpty { "NOT EMPTY" } else { "EMPTY" }
                }
            }
            PartType::Near | PartType::Within | PartType::Regex | PartType::Exists => {
                return Err(QueryError::InvalidQuery(format!("Unsupported keyword {}", part_type.name())));
            }
        };
        Ok(predicate)
    }

    fn parameter(&mut self, expected: Expected) -> QueryResult<Expression> {
        let binding = self.provider.next(self.part, expected)?;
        placeholder(&binding)
    }

    fn compare(&mut self, path: Expression, operator: &'static str) -> QueryResult<Predicate> {
        Ok(Predicate::Compare {
            left: path,
            operator,
            right: self.parameter(Expected::Declared)?
        })
    }

    /// Wrap `expression` in the ignore-case function when the part asks for it.
    fn ignore_case(&self, expression: Expression) -> QueryResult<Expression> {
        let property = self.part.property();
        let is_string = property.leaf_type().is_string();
        let function = self.options.ignore_case_template().function();
        match self.part.ignore_case() {
            IgnoreCaseType::Always if !is_string => Err(QueryError::InvalidArgument(format!(
                "Unable to ignore case of {} types, the property '{}' must reference a String",
                property.leaf_type().name(),
                property.head().name()
            ))),
            IgnoreCaseType::Always => Ok(Expression::function(function, expression)),
            IgnoreCaseType::WhenPossible if is_string => Ok(Expression::function(function, expression)),
            IgnoreCaseType::WhenPossible | IgnoreCaseType::Never => Ok(expression)
        }
    }
}

/// `MEMBER OF` and emptiness checks address the collection itself and must
/// not join it.
fn navigates_collection(is_collection: bool, part_type: PartType) -> bool {
    match part_type {
        PartType::IsEmpty | PartType::IsNotEmpty => true,
        PartType::StartingWith
        | PartType::EndingWith
        | PartType::Containing
        | PartType::NotContaining => is_collection,
        _ => false
    }
}

fn placeholder(binding: &ParameterBinding) -> QueryResult<Expression> {
    Ok(Expression::Parameter(binding.required_position()?))
}

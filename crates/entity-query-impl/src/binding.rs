// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Parameter binding model.
//!
//! A [`ParameterBinding`] ties a query parameter marker to the value that is
//! bound to it at execution time. It records:
//!
//! - where the marker is ([`BindingIdentifier`]): `:name`, `?1`, or both;
//! - where the value comes from ([`ParameterOrigin`]): a method argument, a
//!   value expression, or a value captured by the framework itself;
//! - how the raw value is transformed before binding ([`BindingKind`]).
//!
//! # Overview
//!
//! - [`LikeType`] — Wildcard placement of a declared `LIKE` marker
//! - [`EscapeCharacter`] — Escaping of LIKE wildcards in bound values
//! - [`SimilarityNormalizer`] — Similarity to score conversion
//! - [`PartTreeBinding`] — Preparation rules of derived predicates

mod escape;
mod like;
mod part_tree;
mod similarity;

use std::fmt;

use entity_query_core::Value;

pub use self::{
    escape::EscapeCharacter, like::LikeType, part_tree::PartTreeBinding,
    similarity::SimilarityNormalizer
};
use crate::error::{QueryError, QueryResult};

/// Location of a parameter marker in query text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BindingIdentifier {
    /// `:name`
    Named(String),

    /// `?position` (1-based)
    Indexed(usize),

    /// Marker reachable both by name and by position.
    NamedAndIndexed(String, usize)
}

impl BindingIdentifier {
    /// Named identifier.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Positional identifier.
    pub const fn indexed(position: usize) -> Self {
        Self::Indexed(position)
    }

    /// Identifier from an optional name and position. The name wins if it is
    /// non-empty; both are kept when present.
    pub fn of(name: Option<&str>, position: Option<usize>) -> QueryResult<Self> {
        match (name.filter(|n| !n.is_empty()), position) {
            (Some(name), Some(position)) => Ok(Self::NamedAndIndexed(name.to_owned(), position)),
            (Some(name), None) => Ok(Self::Named(name.to_owned())),
            (None, Some(position)) if position > 0 => Ok(Self::Indexed(position)),
            _ => Err(QueryError::InvalidQuery(
                "Parameter binding requires a name or a positive index".into()
            ))
        }
    }

    /// Marker name.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(name) | Self::NamedAndIndexed(name, _) => Some(name),
            Self::Indexed(_) => None
        }
    }

    /// Marker position.
    pub const fn position(&self) -> Option<usize> {
        match self {
            Self::Indexed(position) | Self::NamedAndIndexed(_, position) => Some(*position),
            Self::Named(_) => None
        }
    }
}

impl fmt::Display for BindingIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::Indexed(position) => write!(f, "[{position}]"),
            Self::NamedAndIndexed(name, position) => write!(f, "[{name}, {position}]")
        }
    }
}

/// Source of the bound value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterOrigin {
    /// Bindable method argument located by name or position.
    MethodArgument(BindingIdentifier),

    /// Value expression evaluated against the method arguments.
    Expression(String),

    /// Value captured by the framework, e.g. a keyset boundary.
    Synthetic {
        /// Captured value.
        value: Value,

        /// What produced the value, for diagnostics.
        source: String
    }
}

impl ParameterOrigin {
    /// Method argument origin.
    pub fn argument(identifier: BindingIdentifier) -> Self {
        Self::MethodArgument(identifier)
    }

    /// Method argument origin by 1-based position.
    pub fn argument_at(position: usize) -> Self {
        Self::MethodArgument(BindingIdentifier::Indexed(position))
    }

    /// Expression origin.
    pub fn expression(expression: impl Into<String>) -> Self {
        Self::Expression(expression.into())
    }

    /// Synthetic origin.
    pub fn synthetic(value: Value, source: impl Into<String>) -> Self {
        Self::Synthetic {
            value,
            source: source.into()
        }
    }

    /// Check for method argument origins.
    pub const fn is_method_argument(&self) -> bool {
        matches!(self, Self::MethodArgument(_))
    }

    /// Check for expression origins.
    pub const fn is_expression(&self) -> bool {
        matches!(self, Self::Expression(_))
    }

    /// Check for synthetic origins.
    pub const fn is_synthetic(&self) -> bool {
        matches!(self, Self::Synthetic { .. })
    }
}

/// Which bound of a [`Range`](entity_query_core::Range) argument to bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeBound {
    /// Lower bound.
    Lower,

    /// Upper bound.
    Upper
}

/// Value transformation applied before binding.
#[derive(Debug, Clone, PartialEq)]
pub enum BindingKind {
    /// Value is bound as is.
    Basic,

    /// Declared `LIKE` marker decorated with `%`.
    Like(LikeType),

    /// Declared `IN` marker; arrays are bound as collections.
    In,

    /// Predicate derived from a method name.
    PartTree(PartTreeBinding),

    /// One bound of a range argument.
    Range {
        /// Bound to extract.
        bound: RangeBound,

        /// Converts similarity bounds to scores.
        normalizer: SimilarityNormalizer
    },

    /// Score threshold argument.
    Score(SimilarityNormalizer)
}

/// Binding of one query parameter marker.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterBinding {
    identifier: BindingIdentifier,
    origin:     ParameterOrigin,
    kind:       BindingKind
}

impl ParameterBinding {
    /// Binding that passes the value through.
    pub fn new(identifier: BindingIdentifier, origin: ParameterOrigin) -> Self {
        Self::with_kind(identifier, origin, BindingKind::Basic)
    }

    /// Binding with an explicit transformation.
    pub fn with_kind(identifier: BindingIdentifier, origin: ParameterOrigin, kind: BindingKind) -> Self {
        Self {
            identifier,
            origin,
            kind
        }
    }

    /// `LIKE` binding.
    pub fn like(identifier: BindingIdentifier, origin: ParameterOrigin, like: LikeType) -> Self {
        Self::with_kind(identifier, origin, BindingKind::Like(like))
    }

    /// `IN` binding.
    pub fn in_list(identifier: BindingIdentifier, origin: ParameterOrigin) -> Self {
        Self::with_kind(identifier, origin, BindingKind::In)
    }

    /// Marker location.
    pub const fn identifier(&self) -> &BindingIdentifier {
        &self.identifier
    }

    /// Value source.
    pub const fn origin(&self) -> &ParameterOrigin {
        &self.origin
    }

    /// Value transformation.
    pub const fn kind(&self) -> &BindingKind {
        &self.kind
    }

    /// Marker name.
    pub fn name(&self) -> Option<&str> {
        self.identifier.name()
    }

    /// Marker position.
    pub const fn position(&self) -> Option<usize> {
        self.identifier.position()
    }

    /// Marker name, failing for positional-only bindings.
    pub fn required_name(&self) -> QueryResult<&str> {
        self.name()
            .ok_or_else(|| QueryError::Binding(format!("Required name for {self} not available")))
    }

    /// Marker position, failing for named-only bindings.
    pub fn required_position(&self) -> QueryResult<usize> {
        self.position()
            .ok_or_else(|| QueryError::Binding(format!("Required position for {self} not available")))
    }

    /// Check if this is a derived binding normalized to `IS NULL`.
    pub fn is_is_null(&self) -> bool {
        match &self.kind {
            BindingKind::PartTree(part) => part.is_is_null(),
            BindingKind::Basic
            | BindingKind::Like(_)
            | BindingKind::In
            | BindingKind::Range { .. }
            | BindingKind::Score(_) => false
        }
    }

    /// Transform a raw argument value into the value to bind.
    pub fn prepare(&self, value: Value) -> Value {
        match &self.kind {
            BindingKind::Basic => value,
            BindingKind::Like(like) => like.prepare(value),
            BindingKind::In => match value {
                Value::Array(items) => Value::List(items),
                other => other
            },
            BindingKind::PartTree(part) => part.prepare(value),
            BindingKind::Range {
                bound,
                normalizer
            } => prepare_range(value, *bound, normalizer),
            BindingKind::Score(normalizer) => prepare_score(value, normalizer)
        }
    }

    /// Check if both bindings address the same marker.
    pub fn binds_to(&self, other: &ParameterBinding) -> bool {
        let same_name = matches!((self.name(), other.name()), (Some(a), Some(b)) if a == b);
        let same_position =
            matches!((self.position(), other.position()), (Some(a), Some(b)) if a == b);
        same_name || same_position
    }

    /// Check if both bindings may share one query parameter.
    ///
    /// Requires the same kind, the same origin, and equal kind attributes.
    pub fn is_compatible_with(&self, other: &ParameterBinding) -> bool {
        if self.origin != other.origin {
            return false;
        }
        match (&self.kind, &other.kind) {
            (BindingKind::Basic, BindingKind::Basic) | (BindingKind::In, BindingKind::In) => true,
            (BindingKind::Like(a), BindingKind::Like(b)) => a == b,
            (BindingKind::PartTree(a), BindingKind::PartTree(b)) => a == b,
            (
                BindingKind::Range {
                    bound: a, ..
                },
                BindingKind::Range {
                    bound: b, ..
                }
            ) => a == b,
            (BindingKind::Score(a), BindingKind::Score(b)) => a == b,
            _ => false
        }
    }
}

impl fmt::Display for ParameterBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            BindingKind::Like(like) => write!(
                f,
                "LikeBinding [identifier: {}, origin: {:?}, type: {}]",
                self.identifier,
                self.origin,
                like.name()
            ),
            _ => write!(
                f,
                "ParameterBinding [identifier: {}, origin: {:?}]",
                self.identifier, self.origin
            )
        }
    }
}

fn prepare_range(value: Value, bound: RangeBound, normalizer: &SimilarityNormalizer) -> Value {
    let Value::Range(range) = value else {
        return value;
    };
    let selected = match bound {
        RangeBound::Lower => range.lower(),
        RangeBound::Upper => range.upper()
    };
    match selected.value() {
        Some(Value::Score(score)) => prepare_score(Value::Score(*score), normalizer),
        Some(other) => other.clone(),
        None => Value::Null
    }
}

fn prepare_score(value: Value, normalizer: &SimilarityNormalizer) -> Value {
    match value {
        Value::Score(score) => Value::Float(normalizer.to_score(score)),
        other => other
    }
}

#[cfg(test)]
mod tests {
    use entity_query_core::{Bound, Range, Score, ScoringFunction};

    use super::*;

    fn arg(position: usize) -> ParameterOrigin {
        ParameterOrigin::argument_at(position)
    }

    #[test]
    fn identifier_accessors() {
        let id = BindingIdentifier::NamedAndIndexed("name".into(), 2);
        assert_eq!(id.name(), Some("name"));
        assert_eq!(id.position(), Some(2));
        assert_eq!(id.to_string(), "[name, 2]");
        assert!(BindingIdentifier::of(None, None).is_err());
        assert_eq!(BindingIdentifier::of(Some(""), Some(3)).ok(), Some(BindingIdentifier::Indexed(3)));
    }

    #[test]
    fn binds_to_by_name_or_position() {
        let a = ParameterBinding::new(BindingIdentifier::named("x"), arg(1));
        let b = ParameterBinding::like(BindingIdentifier::named("x"), arg(1), LikeType::Containing);
        let c = ParameterBinding::new(BindingIdentifier::indexed(1), arg(1));
        assert!(a.binds_to(&b));
        assert!(!a.binds_to(&c));
    }

    #[test]
    fn as_is_and_like_are_incompatible() {
        let plain = ParameterBinding::new(BindingIdentifier::indexed(1), arg(1));
        let same = ParameterBinding::new(BindingIdentifier::indexed(2), arg(1));
        let like = ParameterBinding::like(BindingIdentifier::indexed(3), arg(1), LikeType::Containing);
        assert!(plain.is_compatible_with(&same));
        assert!(!plain.is_compatible_with(&like));
        assert!(!like.is_compatible_with(&plain));
    }

    #[test]
    fn like_types_must_match() {
        let a = ParameterBinding::like(BindingIdentifier::indexed(1), arg(1), LikeType::StartingWith);
        let b = ParameterBinding::like(BindingIdentifier::indexed(2), arg(1), LikeType::EndingWith);
        assert!(!a.is_compatible_with(&b));
    }

    #[test]
    fn in_binding_flattens_arrays() {
        let binding = ParameterBinding::in_list(BindingIdentifier::indexed(1), arg(1));
        let prepared = binding.prepare(Value::Array(vec![Value::Int(1), Value::Int(2)]));
        assert_eq!(prepared, Value::List(vec![Value::Int(1), Value::Int(2)]));
    }

    #[test]
    fn range_binding_extracts_bound() {
        let lower = ParameterBinding::with_kind(
            BindingIdentifier::indexed(1),
            arg(1),
            BindingKind::Range {
                bound:      RangeBound::Lower,
                normalizer: SimilarityNormalizer::IDENTITY
            }
        );
        let range = Value::Range(Box::new(Range::new(Bound::inclusive(3_i64), Bound::unbounded())));
        assert_eq!(lower.prepare(range), Value::Int(3));
    }

    #[test]
    fn score_binding_normalizes_similarity() {
        let binding = ParameterBinding::with_kind(
            BindingIdentifier::indexed(1),
            arg(1),
            BindingKind::Score(SimilarityNormalizer::COSINE)
        );
        let prepared = binding.prepare(Value::Score(Score::similarity(1.0, ScoringFunction::Cosine)));
        assert_eq!(prepared, Value::Float(0.0));

        let raw = binding.prepare(Value::Score(Score::of(0.25, ScoringFunction::Cosine)));
        assert_eq!(raw, Value::Float(0.25));
    }

    #[test]
    fn required_accessors() {
        let binding = ParameterBinding::new(BindingIdentifier::indexed(1), arg(1));
        assert!(binding.required_name().is_err());
        assert_eq!(binding.required_position().ok(), Some(1));
    }
}

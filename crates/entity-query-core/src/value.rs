// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Dynamically typed argument values.
//!
//! Repository method arguments arrive as [`Value`]s. Bindings transform them
//! (LIKE wildcards, collection coercion, range extraction) before they are
//! handed to the provider's [`Query`](crate::Query).
//!
//! [`ValueType`] describes the declared type of a method parameter or a
//! mapped attribute; it is what method validation and case-insensitive
//! comparisons look at.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::score::{Range, Score};

/// Temporal precision for date/time parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TemporalType {
    /// Date without time.
    Date,

    /// Time without date.
    Time,

    /// Date and time.
    Timestamp
}

/// Runtime value of a method argument.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Value {
    /// Absent value.
    #[default]
    Null,

    /// Boolean.
    Bool(bool),

    /// Integral number.
    Int(i64),

    /// Floating point number.
    Float(f64),

    /// Text.
    Text(String),

    /// Calendar date.
    Date(NaiveDate),

    /// Wall-clock time.
    Time(NaiveTime),

    /// Date and time.
    Timestamp(NaiveDateTime),

    /// UUID.
    Uuid(Uuid),

    /// Fixed-size array argument.
    Array(Vec<Value>),

    /// Collection argument.
    List(Vec<Value>),

    /// Range with lower/upper bounds.
    Range(Box<Range>),

    /// Score or similarity threshold.
    Score(Score),

    /// Opaque object identified by its type name.
    Object(String)
}

impl Value {
    /// Check for [`Value::Null`].
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Check for array or collection values.
    pub const fn is_collection_like(&self) -> bool {
        matches!(self, Self::Array(_) | Self::List(_))
    }

    /// Text content, if this is [`Value::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None
        }
    }

    /// Elements of arrays and collections.
    pub fn as_elements(&self) -> Option<&[Value]> {
        match self {
            Self::Array(v) | Self::List(v) => Some(v),
            _ => None
        }
    }

    /// Short type name used in diagnostics.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "Boolean",
            Self::Int(_) => "Long",
            Self::Float(_) => "Double",
            Self::Text(_) => "String",
            Self::Date(_) => "LocalDate",
            Self::Time(_) => "LocalTime",
            Self::Timestamp(_) => "LocalDateTime",
            Self::Uuid(_) => "UUID",
            Self::Array(_) => "Array",
            Self::List(_) => "Collection",
            Self::Range(_) => "Range",
            Self::Score(_) => "Score",
            Self::Object(name) => name
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
            Self::Date(d) => write!(f, "{d}"),
            Self::Time(t) => write!(f, "{t}"),
            Self::Timestamp(ts) => write!(f, "{ts}"),
            Self::Uuid(u) => write!(f, "{u}"),
            Self::Array(items) | Self::List(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Self::Range(r) => write!(f, "{r}"),
            Self::Score(s) => write!(f, "{}", s.value()),
            Self::Object(name) => write!(f, "<{name}>")
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Self::Timestamp(value)
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

/// Declared type of a parameter or attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ValueType {
    /// Text.
    String,

    /// 32-bit integer.
    Integer,

    /// 64-bit integer.
    Long,

    /// Floating point.
    Double,

    /// Boolean.
    Boolean,

    /// Calendar date.
    Date,

    /// Wall-clock time.
    Time,

    /// Date and time.
    Timestamp,

    /// UUID.
    Uuid,

    /// Collection of elements.
    Collection(Box<ValueType>),

    /// Array of elements.
    Array(Box<ValueType>),

    /// Range of elements.
    Range(Box<ValueType>),

    /// Score/similarity.
    Score,

    /// Any other type, typically an entity or embeddable.
    Named(String)
}

impl ValueType {
    /// Collection of `element`.
    pub fn collection_of(element: ValueType) -> Self {
        Self::Collection(Box::new(element))
    }

    /// Named type.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Check for [`ValueType::String`].
    pub const fn is_string(&self) -> bool {
        matches!(self, Self::String)
    }

    /// Check for collections and arrays.
    pub const fn is_collection_like(&self) -> bool {
        matches!(self, Self::Collection(_) | Self::Array(_))
    }

    /// Check for temporal types.
    pub const fn is_temporal(&self) -> bool {
        matches!(self, Self::Date | Self::Time | Self::Timestamp)
    }

    /// Element type for collections/arrays/ranges, the type itself otherwise.
    pub fn element(&self) -> &ValueType {
        match self {
            Self::Collection(e) | Self::Array(e) | Self::Range(e) => e.element(),
            other => other
        }
    }

    /// Short name used in diagnostics and rendered queries.
    pub fn name(&self) -> &str {
        match self {
            Self::String => "String",
            Self::Integer => "Integer",
            Self::Long => "Long",
            Self::Double => "Double",
            Self::Boolean => "Boolean",
            Self::Date => "LocalDate",
            Self::Time => "LocalTime",
            Self::Timestamp => "LocalDateTime",
            Self::Uuid => "UUID",
            Self::Collection(_) => "Collection",
            Self::Array(_) => "Array",
            Self::Range(_) => "Range",
            Self::Score => "Score",
            Self::Named(name) => name
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_conversion() {
        assert_eq!(Value::from(None::<&str>), Value::Null);
        assert_eq!(Value::from(Some("a")), Value::Text("a".into()));
    }

    #[test]
    fn type_names() {
        assert_eq!(Value::from("x").type_name(), "String");
        assert_eq!(Value::from(vec![1_i64]).type_name(), "Collection");
        assert_eq!(Value::Object("Person".into()).type_name(), "Person");
    }

    #[test]
    fn element_type_unwraps_nesting() {
        let ty = ValueType::collection_of(ValueType::named("LineItem"));
        assert_eq!(ty.element(), &ValueType::named("LineItem"));
        assert!(ty.is_collection_like());
        assert!(!ty.element().is_collection_like());
    }

    #[test]
    fn display_list() {
        let v = Value::List(vec![Value::Int(1), Value::from("a")]);
        assert_eq!(v.to_string(), "[1, a]");
    }
}

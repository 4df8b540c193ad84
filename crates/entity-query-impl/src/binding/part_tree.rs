// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Value preparation for predicates derived from method names.

use entity_query_core::{Value, ValueType};

use super::EscapeCharacter;
use crate::part_tree::PartType;

/// Preparation rules of one derived predicate argument.
///
/// Built by the query creator for every argument a [`PartType`] consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartTreeBinding {
    part_type:    PartType,
    ignore_case:  bool,
    no_wildcards: bool,
    value_type:   ValueType,
    escape:       EscapeCharacter
}

impl PartTreeBinding {
    /// Rules for an argument of `part_type` bound against `value_type`.
    ///
    /// # Arguments
    ///
    /// * `part_type` — Predicate keyword; `IsNull` when a simple property
    ///   argument was `null`
    /// * `value_type` — Type of the expression the parameter is compared to
    pub fn new(part_type: PartType, value_type: ValueType) -> Self {
        Self {
            part_type,
            ignore_case: false,
            no_wildcards: false,
            value_type,
            escape: EscapeCharacter::DEFAULT
        }
    }

    /// Upper case collection elements; set for `IgnoreCase` parts.
    pub fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    /// Skip wildcard decoration; set when the leaf property is a collection.
    pub fn no_wildcards(mut self, no_wildcards: bool) -> Self {
        self.no_wildcards = no_wildcards;
        self
    }

    /// Escape character for LIKE values.
    pub fn escape(mut self, escape: EscapeCharacter) -> Self {
        self.escape = escape;
        self
    }

    /// Predicate keyword.
    pub const fn part_type(&self) -> PartType {
        self.part_type
    }

    /// Expression type.
    pub const fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    /// Check if the predicate was normalized to `IS NULL`.
    pub const fn is_is_null(&self) -> bool {
        matches!(self.part_type, PartType::IsNull)
    }

    /// Decorate `value` according to the predicate.
    ///
    /// ```text
    /// StartingWith  "a%b"  -> "a\%b%"
    /// In            [x, y] -> (x, y), upper cased with IgnoreCase
    /// ```
    pub fn prepare(&self, value: Value) -> Value {
        if value.is_null() {
            return value;
        }
        if self.value_type.is_string() && !self.no_wildcards {
            let Value::Text(text) = value else {
                return value;
            };
            return Value::Text(match self.part_type {
                PartType::StartingWith => format!("{}%", self.escape.escape(&text)),
                PartType::EndingWith => format!("%{}", self.escape.escape(&text)),
                PartType::Containing | PartType::NotContaining => {
                    format!("%{}%", self.escape.escape(&text))
                }
                _ => text
            });
        }
        if self.value_type.is_collection_like() {
            return match to_collection(value) {
                Value::List(items) if self.ignore_case => Value::List(items.into_iter().map(upper).collect()),
                other => other
            };
        }
        value
    }
}

/// Empty collections become `null`, scalars become singleton lists.
fn to_collection(value: Value) -> Value {
    match value {
        Value::List(items) | Value::Array(items) if items.is_empty() => Value::Null,
        Value::Array(items) => Value::List(items),
        list @ Value::List(_) => list,
        scalar => Value::List(vec![scalar])
    }
}

fn upper(value: Value) -> Value {
    match value {
        Value::Text(text) => Value::Text(text.to_uppercase()),
        other => other
    }
}

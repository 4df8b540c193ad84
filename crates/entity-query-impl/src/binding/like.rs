// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Wildcard placement of declared `LIKE` markers.

use entity_query_core::Value;

/// Where `%` wildcards surround a `LIKE` marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LikeType {
    /// No decoration; the value carries its own wildcards.
    Like,

    /// `:name%`
    StartingWith,

    /// `%:name`
    EndingWith,

    /// `%:name%`
    Containing
}

impl LikeType {
    /// Detect the type from a decorated marker such as `%:name%`.
    pub fn from_expression(expression: &str) -> Self {
        let leading = expression.starts_with('%');
        let trailing = expression.len() > 1 && expression.ends_with('%');
        match (leading, trailing) {
            (true, true) => Self::Containing,
            (true, false) => Self::EndingWith,
            (false, true) => Self::StartingWith,
            (false, false) => Self::Like
        }
    }

    /// Upper snake case name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Like => "LIKE",
            Self::StartingWith => "STARTING_WITH",
            Self::EndingWith => "ENDING_WITH",
            Self::Containing => "CONTAINING"
        }
    }

    /// Decorate `value` with wildcards. Null passes through.
    pub fn prepare(&self, value: Value) -> Value {
        if value.is_null() {
            return value;
        }
        let text = value.to_string();
        match self {
            Self::Like => value,
            Self::StartingWith => Value::Text(format!("{text}%")),
            Self::EndingWith => Value::Text(format!("%{text}")),
            Self::Containing => Value::Text(format!("%{text}%"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_placement() {
        assert_eq!(LikeType::from_expression("%:name%"), LikeType::Containing);
        assert_eq!(LikeType::from_expression("%?1"), LikeType::EndingWith);
        assert_eq!(LikeType::from_expression("?1%"), LikeType::StartingWith);
        assert_eq!(LikeType::from_expression(":name"), LikeType::Like);
    }

    #[test]
    fn prepares_values() {
        assert_eq!(LikeType::Containing.prepare("ol".into()), Value::from("%ol%"));
        assert_eq!(LikeType::StartingWith.prepare(Value::Int(4)), Value::from("4%"));
        assert_eq!(LikeType::EndingWith.prepare(Value::Null), Value::Null);
        assert_eq!(LikeType::Like.prepare("a%".into()), Value::from("a%"));
    }
}

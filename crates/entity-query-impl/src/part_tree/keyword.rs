// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Predicate keywords recognised at the end of a method name part.
//!
//! Detection walks [`PartType::ALL`] in order and picks the first type with a
//! keyword the part ends with. Negated and longer keywords precede the ones
//! they contain (`IsNotNull` before `Null`, `NotIn` before `In`), and
//! [`PartType::SimpleProperty`] is the fallback.

use std::fmt;

use convert_case::{Case, Casing};

/// Predicate keyword of a method name part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartType {
    /// `IsNotNull`, `NotNull`
    IsNotNull,
    /// `IsNull`, `Null`
    IsNull,
    /// `IsBetween`, `Between`
    Between,
    /// `IsLessThan`, `LessThan`
    LessThan,
    /// `IsLessThanEqual`, `LessThanEqual`
    LessThanEqual,
    /// `IsGreaterThan`, `GreaterThan`
    GreaterThan,
    /// `IsGreaterThanEqual`, `GreaterThanEqual`
    GreaterThanEqual,
    /// `IsBefore`, `Before`
    Before,
    /// `IsAfter`, `After`
    After,
    /// `IsNotLike`, `NotLike`
    NotLike,
    /// `IsLike`, `Like`
    Like,
    /// `IsStartingWith`, `StartingWith`, `StartsWith`
    StartingWith,
    /// `IsEndingWith`, `EndingWith`, `EndsWith`
    EndingWith,
    /// `IsNotEmpty`, `NotEmpty`
    IsNotEmpty,
    /// `IsEmpty`, `Empty`
    IsEmpty,
    /// `IsNotContaining`, `NotContaining`, `NotContains`
    NotContaining,
    /// `IsContaining`, `Containing`, `Contains`
    Containing,
    /// `IsNotIn`, `NotIn`
    NotIn,
    /// `IsIn`, `In`
    In,
    /// `IsNear`, `Near`
    Near,
    /// `IsWithin`, `Within`
    Within,
    /// `MatchesRegex`, `Matches`, `Regex`
    Regex,
    /// `Exists`
    Exists,
    /// `IsTrue`, `True`
    True,
    /// `IsFalse`, `False`
    False,
    /// `IsNot`, `Not`
    NegatingSimpleProperty,
    /// `Is`, `Equals`, or no keyword
    SimpleProperty
}

impl PartType {
    /// Detection order.
    pub const ALL: [PartType; 27] = [
        Self::IsNotNull,
        Self::IsNull,
        Self::Between,
        Self::LessThan,
        Self::LessThanEqual,
        Self::GreaterThan,
        Self::GreaterThanEqual,
        Self::Before,
        Self::After,
        Self::NotLike,
        Self::Like,
        Self::StartingWith,
        Self::EndingWith,
        Self::IsNotEmpty,
        Self::IsEmpty,
        Self::NotContaining,
        Self::Containing,
        Self::NotIn,
        Self::In,
        Self::Near,
        Self::Within,
        Self::Regex,
        Self::Exists,
        Self::True,
        Self::False,
        Self::NegatingSimpleProperty,
        Self::SimpleProperty
    ];

    /// Keywords in match order.
    pub const fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::IsNotNull => &["IsNotNull", "NotNull"],
            Self::IsNull => &["IsNull", "Null"],
            Self::Between => &["IsBetween", "Between"],
            Self::LessThan => &["IsLessThan", "LessThan"],
            Self::LessThanEqual => &["IsLessThanEqual", "LessThanEqual"],
            Self::GreaterThan => &["IsGreaterThan", "GreaterThan"],
            Self::GreaterThanEqual => &["IsGreaterThanEqual", "GreaterThanEqual"],
            Self::Before => &["IsBefore", "Before"],
            Self::After => &["IsAfter", "After"],
            Self::NotLike => &["IsNotLike", "NotLike"],
            Self::Like => &["IsLike", "Like"],
            Self::StartingWith => &["IsStartingWith", "StartingWith", "StartsWith"],
            Self::EndingWith => &["IsEndingWith", "EndingWith", "EndsWith"],
            Self::IsNotEmpty => &["IsNotEmpty", "NotEmpty"],
            Self::IsEmpty => &["IsEmpty", "Empty"],
            Self::NotContaining => &["IsNotContaining", "NotContaining", "NotContains"],
            Self::Containing => &["IsContaining", "Containing", "Contains"],
            Self::NotIn => &["IsNotIn", "NotIn"],
            Self::In => &["IsIn", "In"],
            Self::Near => &["IsNear", "Near"],
            Self::Within => &["IsWithin", "Within"],
            Self::Regex => &["MatchesRegex", "Matches", "Regex"],
            Self::Exists => &["Exists"],
            Self::True => &["IsTrue", "True"],
            Self::False => &["IsFalse", "False"],
            Self::NegatingSimpleProperty => &["IsNot", "Not"],
            Self::SimpleProperty => &["Is", "Equals"]
        }
    }

    /// Number of method arguments the predicate consumes.
    pub const fn number_of_arguments(&self) -> usize {
        match self {
            Self::IsNotNull
            | Self::IsNull
            | Self::IsNotEmpty
            | Self::IsEmpty
            | Self::Exists
            | Self::True
            | Self::False => 0,
            Self::Between => 2,
            Self::LessThan
            | Self::LessThanEqual
            | Self::GreaterThan
            | Self::GreaterThanEqual
            | Self::Before
            | Self::After
            | Self::NotLike
            | Self::Like
            | Self::StartingWith
            | Self::EndingWith
            | Self::NotContaining
            | Self::Containing
            | Self::NotIn
            | Self::In
            | Self::Near
            | Self::Within
            | Self::Regex
            | Self::NegatingSimpleProperty
            | Self::SimpleProperty => 1
        }
    }

    /// Check if `raw` ends with one of this type's keywords.
    pub fn supports(&self, raw: &str) -> bool {
        self.keywords().iter().any(|k| raw.ends_with(k))
    }

    /// Detect the type of a method name part.
    pub fn from_property(raw: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|t| t.supports(raw))
            .unwrap_or(Self::SimpleProperty)
    }

    /// Property source with the keyword removed and the first letter lowered.
    pub fn extract_property(&self, part: &str) -> String {
        let candidate = uncapitalize(part);
        for keyword in self.keywords() {
            if let Some(stripped) = candidate.strip_suffix(keyword) {
                return stripped.to_owned();
            }
        }
        candidate
    }

    /// Check for the `LIKE` family that takes wildcards.
    pub const fn is_like_family(&self) -> bool {
        matches!(
            self,
            Self::Like | Self::NotLike | Self::StartingWith | Self::EndingWith | Self::Containing | Self::NotContaining
        )
    }

    /// Upper snake case name, e.g. `NOT_IN`.
    pub fn name(&self) -> String {
        format!("{self:?}").to_case(Case::Snake).to_uppercase()
    }
}

impl fmt::Display for PartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

fn uncapitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detection_order() {
        assert_eq!(PartType::from_property("NameIsNotNull"), PartType::IsNotNull);
        assert_eq!(PartType::from_property("NameNull"), PartType::IsNull);
        assert_eq!(PartType::from_property("AgeLessThanEqual"), PartType::LessThanEqual);
        assert_eq!(PartType::from_property("NameNotIn"), PartType::NotIn);
        assert_eq!(PartType::from_property("NameStartsWith"), PartType::StartingWith);
        assert_eq!(PartType::from_property("ActiveIsTrue"), PartType::True);
        assert_eq!(PartType::from_property("NameIsNot"), PartType::NegatingSimpleProperty);
        assert_eq!(PartType::from_property("Name"), PartType::SimpleProperty);
    }

    #[test]
    fn extracts_property() {
        assert_eq!(PartType::Between.extract_property("AgeBetween"), "age");
        assert_eq!(PartType::SimpleProperty.extract_property("NameIs"), "name");
        assert_eq!(PartType::SimpleProperty.extract_property("Name"), "name");
        assert_eq!(PartType::In.extract_property("LastnameIn"), "lastname");
    }

    #[test]
    fn argument_counts() {
        assert_eq!(PartType::IsNull.number_of_arguments(), 0);
        assert_eq!(PartType::Between.number_of_arguments(), 2);
        assert_eq!(PartType::Containing.number_of_arguments(), 1);
    }

    #[test]
    fn upper_snake_names() {
        assert_eq!(PartType::NotIn.name(), "NOT_IN");
        assert_eq!(PartType::NegatingSimpleProperty.to_string(), "NEGATING_SIMPLE_PROPERTY");
        assert_eq!(PartType::In.name(), "IN");
    }
}

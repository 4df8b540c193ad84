// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Range and score arguments.
//!
//! Both are compound arguments: a binding extracts one scalar out of them
//! (a bound of a [`Range`], or the threshold of a [`Score`]) before it reaches
//! the query.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::value::Value;

/// One end of a [`Range`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bound {
    value:     Option<Value>,
    inclusive: bool
}

impl Bound {
    /// Inclusive bound at `value`.
    pub fn inclusive(value: impl Into<Value>) -> Self {
        Self {
            value:     Some(value.into()),
            inclusive: true
        }
    }

    /// Exclusive bound at `value`.
    pub fn exclusive(value: impl Into<Value>) -> Self {
        Self {
            value:     Some(value.into()),
            inclusive: false
        }
    }

    /// Open end.
    pub const fn unbounded() -> Self {
        Self {
            value:     None,
            inclusive: false
        }
    }

    /// Bound value, `None` when unbounded.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Check if the bound includes its value.
    pub const fn is_inclusive(&self) -> bool {
        self.inclusive
    }

    /// Check if the bound has a value.
    pub const fn is_bounded(&self) -> bool {
        self.value.is_some()
    }
}

/// Range between two bounds.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Range {
    lower: Bound,
    upper: Bound
}

impl Range {
    /// Range from explicit bounds.
    pub const fn new(lower: Bound, upper: Bound) -> Self {
        Self {
            lower,
            upper
        }
    }

    /// Closed range `[lower, upper]`.
    pub fn closed(lower: impl Into<Value>, upper: impl Into<Value>) -> Self {
        Self::new(Bound::inclusive(lower), Bound::inclusive(upper))
    }

    /// Lower bound.
    pub const fn lower(&self) -> &Bound {
        &self.lower
    }

    /// Upper bound.
    pub const fn upper(&self) -> &Bound {
        &self.upper
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = if self.lower.inclusive { '[' } else { '(' };
        let close = if self.upper.inclusive { ']' } else { ')' };
        let show = |b: &Bound| b.value.as_ref().map_or_else(|| "unbounded".to_owned(), ToString::to_string);
        write!(f, "{open}{}-{}{close}", show(&self.lower), show(&self.upper))
    }
}

/// Scoring function a database uses to compare vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ScoringFunction {
    /// No specific function; scores are passed through.
    #[default]
    Unspecified,

    /// Euclidean distance.
    Euclidean,

    /// Cosine distance.
    Cosine,

    /// Negative dot product.
    Dot,

    /// Inner product.
    InnerProduct,

    /// Manhattan distance.
    Taxicab,

    /// Hamming distance.
    Hamming
}

impl ScoringFunction {
    /// Display name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Unspecified => "Unspecified",
            Self::Euclidean => "Euclidean",
            Self::Cosine => "Cosine",
            Self::Dot => "Dot",
            Self::InnerProduct => "InnerProduct",
            Self::Taxicab => "Taxicab",
            Self::Hamming => "Hamming"
        }
    }
}

/// Whether a [`Score`] holds a raw database score or a normalized similarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ScoreKind {
    /// Raw score as computed by the database.
    Score,

    /// Similarity normalized to `0..=1`.
    Similarity
}

/// Score threshold argument.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Score {
    value:    f64,
    function: ScoringFunction,
    kind:     ScoreKind
}

impl Score {
    /// Raw score.
    pub const fn of(value: f64, function: ScoringFunction) -> Self {
        Self {
            value,
            function,
            kind: ScoreKind::Score
        }
    }

    /// Normalized similarity.
    pub const fn similarity(value: f64, function: ScoringFunction) -> Self {
        Self {
            value,
            function,
            kind: ScoreKind::Similarity
        }
    }

    /// Numeric value.
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Scoring function.
    pub const fn function(&self) -> ScoringFunction {
        self.function
    }

    /// Score or similarity.
    pub const fn kind(&self) -> ScoreKind {
        self.kind
    }
}

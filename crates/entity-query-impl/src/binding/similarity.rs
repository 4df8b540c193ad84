// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Conversion between normalized similarities and raw database scores.

use std::fmt;

use entity_query_core::{Score, ScoreKind, ScoringFunction};

use crate::error::{QueryError, QueryResult};

/// Maps similarities in `0..=1` to the score scale of a scoring function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SimilarityNormalizer {
    function: ScoringFunction
}

impl SimilarityNormalizer {
    /// Pass-through normalizer.
    pub const IDENTITY: Self = Self {
        function: ScoringFunction::Unspecified
    };

    /// Euclidean distance normalizer.
    pub const EUCLIDEAN: Self = Self {
        function: ScoringFunction::Euclidean
    };

    /// Cosine distance normalizer.
    pub const COSINE: Self = Self {
        function: ScoringFunction::Cosine
    };

    /// Dot product normalizer, also used for inner product.
    pub const DOT: Self = Self {
        function: ScoringFunction::Dot
    };

    /// Normalizer for `function`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidArgument`] for functions without a
    /// normalization, such as taxicab or hamming distance.
    pub fn get(function: ScoringFunction) -> QueryResult<Self> {
        match function {
            ScoringFunction::Euclidean => Ok(Self::EUCLIDEAN),
            ScoringFunction::Cosine => Ok(Self::COSINE),
            ScoringFunction::Dot | ScoringFunction::InnerProduct => Ok(Self::DOT),
            ScoringFunction::Unspecified
            | ScoringFunction::Taxicab
            | ScoringFunction::Hamming => Err(QueryError::InvalidArgument(format!(
                "No SimilarityNormalizer found for {}",
                function.name()
            )))
        }
    }

    /// Normalizer for `function`, identity if there is none.
    pub fn get_or_identity(function: ScoringFunction) -> Self {
        Self::get(function).unwrap_or(Self::IDENTITY)
    }

    /// Scoring function.
    pub const fn function(&self) -> ScoringFunction {
        self.function
    }

    /// Similarity for a raw score.
    pub fn similarity(&self, score: f64) -> f64 {
        match self.function {
            ScoringFunction::Euclidean => 1.0 / (1.0 + score.powi(2)),
            ScoringFunction::Cosine => (1.0 + (1.0 - score)) / 2.0,
            ScoringFunction::Dot | ScoringFunction::InnerProduct => (1.0 - score) / 2.0,
            ScoringFunction::Unspecified
            | ScoringFunction::Taxicab
            | ScoringFunction::Hamming => score
        }
    }

    /// Raw score for a similarity.
    pub fn score(&self, similarity: f64) -> f64 {
        match self.function {
            ScoringFunction::Euclidean if similarity == 0.0 => f64::from(f32::MAX),
            ScoringFunction::Euclidean => ((1.0 / similarity) - 1.0).sqrt(),
            ScoringFunction::Cosine => 1.0 - ((similarity * 2.0) - 1.0),
            ScoringFunction::Dot | ScoringFunction::InnerProduct => 1.0 - (similarity * 2.0),
            ScoringFunction::Unspecified
            | ScoringFunction::Taxicab
            | ScoringFunction::Hamming => similarity
        }
    }

    /// Raw score to bind for a [`Score`] argument.
    pub fn to_score(&self, score: Score) -> f64 {
        match score.kind() {
            ScoreKind::Similarity => self.score(score.value()),
            ScoreKind::Score => score.value()
        }
    }
}

impl fmt::Display for SimilarityNormalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Normalizer: Similarity[0 to 1] -> Score[{:.6} to {:.6}]",
            self.function.name(),
            self.score(0.0),
            self.score(1.0)
        )
    }
}

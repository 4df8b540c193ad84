// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Result shape requested by a repository method.

use crate::value::ValueType;

/// What a query method returns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReturnedType {
    /// The managed entity itself.
    #[default]
    Domain,

    /// Class-based projection instantiated through a constructor expression.
    Dto {
        /// Fully qualified class name used in `new X(...)`.
        class_name: String,

        /// Constructor arguments, in order.
        properties: Vec<String>
    },

    /// Interface-based projection fetched as tuples.
    Projection {
        /// Selected properties.
        properties: Vec<String>
    },

    /// Raw tuples.
    Tuple,

    /// Single scalar value.
    Value(ValueType)
}

impl ReturnedType {
    /// DTO projection.
    pub fn dto<I, S>(class_name: impl Into<String>, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>
    {
        Self::Dto {
            class_name: class_name.into(),
            properties: properties.into_iter().map(Into::into).collect()
        }
    }

    /// Interface projection.
    pub fn projection<I, S>(properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>
    {
        Self::Projection {
            properties: properties.into_iter().map(Into::into).collect()
        }
    }

    /// Check if the result differs from the domain type.
    pub const fn is_projecting(&self) -> bool {
        !matches!(self, Self::Domain)
    }

    /// Check if rows need to be constructed from selected properties.
    pub fn needs_custom_construction(&self) -> bool {
        match self {
            Self::Dto {
                properties, ..
            }
            | Self::Projection {
                properties
            } => !properties.is_empty(),
            Self::Domain | Self::Tuple | Self::Value(_) => false
        }
    }

    /// Check if the query must be created as a tuple query.
    pub fn use_tuple_query(&self) -> bool {
        match self {
            Self::Projection {
                properties
            } => !properties.is_empty(),
            Self::Tuple => true,
            Self::Domain | Self::Dto { .. } | Self::Value(_) => false
        }
    }

    /// Properties to select, empty for the domain type.
    pub fn input_properties(&self) -> &[String] {
        match self {
            Self::Dto {
                properties, ..
            }
            | Self::Projection {
                properties
            } => properties,
            Self::Domain | Self::Tuple | Self::Value(_) => &[]
        }
    }
}

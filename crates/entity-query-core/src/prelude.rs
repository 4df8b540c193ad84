// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Convenient re-exports for common usage.
//!
//! # Usage
//!
//! ```rust,ignore
//! use entity_query_core::prelude::*;
//! ```

pub use crate::{
    Arguments, Attribute, Direction, KeysetScrollPosition, Limit, ManagedType, Metamodel,
    MethodParameters, Order, Pageable, ParameterAccessor, Query, QueryFactory, ReturnedType,
    ScrollPosition, Sort, StaticMetamodel, Value, ValueType, Window
};

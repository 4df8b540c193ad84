// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Repository method parameters and invocation arguments.
//!
//! [`MethodParameters`] describes a method signature once, at construction
//! time. [`ParameterAccessor`] exposes the arguments of one invocation.
//! Special parameters ([`Sort`], [`Pageable`], [`ScrollPosition`], [`Limit`])
//! never bind to query parameters; only bindable ones are counted when a
//! binding refers to "parameter N".

use crate::{
    page::{Limit, Pageable},
    scroll::ScrollPosition,
    sort::Sort,
    value::{TemporalType, Value, ValueType}
};

/// Role of a method parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterKind {
    /// Regular argument bound to a query parameter.
    Bindable(ValueType),

    /// Dynamic sort.
    Sort,

    /// Page request.
    Pageable,

    /// Scroll cursor.
    ScrollPosition,

    /// Result limit.
    Limit
}

/// Single declared method parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodParameter {
    index:    usize,
    name:     Option<String>,
    kind:     ParameterKind,
    temporal: Option<TemporalType>
}

impl MethodParameter {
    /// Position in the full method signature (0-based).
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Declared name, if known.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Parameter role.
    pub const fn kind(&self) -> &ParameterKind {
        &self.kind
    }

    /// Declared type of a bindable parameter.
    pub const fn value_type(&self) -> Option<&ValueType> {
        match &self.kind {
            ParameterKind::Bindable(ty) => Some(ty),
            _ => None
        }
    }

    /// Check if the parameter binds to the query.
    pub const fn is_bindable(&self) -> bool {
        matches!(self.kind, ParameterKind::Bindable(_))
    }

    /// Declared temporal precision.
    pub const fn temporal_type(&self) -> Option<TemporalType> {
        self.temporal
    }

    /// Check if the parameter is a temporal value with declared precision.
    pub fn is_temporal(&self) -> bool {
        self.temporal.is_some() && self.value_type().is_some_and(ValueType::is_temporal)
    }
}

/// Declared parameters of one repository method.
///
/// # Example
///
/// ```rust
/// use entity_query_core::{MethodParameters, ValueType};
///
/// let params = MethodParameters::new("findByLastnameIn")
///     .bindable("names", ValueType::collection_of(ValueType::String))
///     .sort();
///
/// assert_eq!(params.bindable_len(), 1);
/// assert!(params.has_sort_parameter());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodParameters {
    method_name: String,
    parameters:  Vec<MethodParameter>
}

impl MethodParameters {
    /// Empty signature of `method_name`.
    pub fn new(method_name: impl Into<String>) -> Self {
        Self {
            method_name: method_name.into(),
            parameters:  Vec::new()
        }
    }

    fn push(mut self, name: Option<String>, kind: ParameterKind, temporal: Option<TemporalType>) -> Self {
        let index = self.parameters.len();
        self.parameters.push(MethodParameter {
            index,
            name,
            kind,
            temporal
        });
        self
    }

    /// Append a named bindable parameter.
    #[must_use]
    pub fn bindable(self, name: impl Into<String>, value_type: ValueType) -> Self {
        self.push(Some(name.into()), ParameterKind::Bindable(value_type), None)
    }

    /// Append an unnamed bindable parameter.
    #[must_use]
    pub fn unnamed(self, value_type: ValueType) -> Self {
        self.push(None, ParameterKind::Bindable(value_type), None)
    }

    /// Append a temporal parameter with declared precision.
    #[must_use]
    pub fn temporal(self, name: impl Into<String>, value_type: ValueType, temporal: TemporalType) -> Self {
        self.push(Some(name.into()), ParameterKind::Bindable(value_type), Some(temporal))
    }

    /// Append a [`Sort`] parameter.
    #[must_use]
    pub fn sort(self) -> Self {
        self.push(None, ParameterKind::Sort, None)
    }

    /// Append a [`Pageable`] parameter.
    #[must_use]
    pub fn pageable(self) -> Self {
        self.push(None, ParameterKind::Pageable, None)
    }

    /// Append a [`ScrollPosition`] parameter.
    #[must_use]
    pub fn scroll_position(self) -> Self {
        self.push(None, ParameterKind::ScrollPosition, None)
    }

    /// Append a [`Limit`] parameter.
    #[must_use]
    pub fn limit(self) -> Self {
        self.push(None, ParameterKind::Limit, None)
    }

    /// Name of the declaring method.
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// All parameters in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &MethodParameter> {
        self.parameters.iter()
    }

    /// Bindable parameters in declaration order.
    pub fn bindable_parameters(&self) -> impl Iterator<Item = &MethodParameter> {
        self.parameters.iter().filter(|p| p.is_bindable())
    }

    /// Number of bindable parameters.
    pub fn bindable_len(&self) -> usize {
        self.bindable_parameters().count()
    }

    /// The `index`-th bindable parameter (0-based).
    pub fn bindable_at(&self, index: usize) -> Option<&MethodParameter> {
        self.bindable_parameters().nth(index)
    }

    /// Bindable parameter by name.
    pub fn by_name(&self, name: &str) -> Option<&MethodParameter> {
        self.bindable_parameters().find(|p| p.name() == Some(name))
    }

    /// Check if a [`Sort`] parameter is declared.
    pub fn has_sort_parameter(&self) -> bool {
        self.parameters.iter().any(|p| p.kind == ParameterKind::Sort)
    }

    /// Check if a [`Pageable`] parameter is declared.
    pub fn has_pageable_parameter(&self) -> bool {
        self.parameters.iter().any(|p| p.kind == ParameterKind::Pageable)
    }

    /// Check if a [`ScrollPosition`] parameter is declared.
    pub fn has_scroll_position_parameter(&self) -> bool {
        self.parameters.iter().any(|p| p.kind == ParameterKind::ScrollPosition)
    }
}

/// Access to the arguments of one method invocation.
pub trait ParameterAccessor {
    /// Value of the `index`-th bindable argument (0-based).
    fn bindable_value(&self, index: usize) -> Option<&Value>;

    /// Value of the bindable argument declared as `name`.
    fn value_by_name(&self, name: &str) -> Option<&Value>;

    /// Number of bindable arguments.
    fn bindable_len(&self) -> usize;

    /// Dynamic sort. Falls back to the sort of the page request.
    fn sort(&self) -> Sort;

    /// Page request.
    fn pageable(&self) -> Pageable;

    /// Scroll cursor.
    fn scroll_position(&self) -> Option<&ScrollPosition>;

    /// Result limit.
    fn limit(&self) -> Limit;

    /// Check if any bindable argument is null.
    fn has_bindable_null_value(&self) -> bool {
        (0..self.bindable_len()).any(|i| self.bindable_value(i).is_none_or(Value::is_null))
    }
}

/// Invocation arguments held in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values:   Vec<(Option<String>, Value)>,
    sort:     Option<Sort>,
    pageable: Pageable,
    scroll:   Option<ScrollPosition>,
    limit:    Limit
}

impl Arguments {
    /// Arguments without values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Unnamed arguments in order.
    pub fn of<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>
    {
        Self {
            values: values.into_iter().map(|v| (None, v.into())).collect(),
            ..Self::default()
        }
    }

    /// Append a named argument.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.push((Some(name.into()), value.into()));
        self
    }

    /// Append an unnamed argument.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.values.push((None, value.into()));
        self
    }

    /// Attach a dynamic sort.
    #[must_use]
    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Attach a page request.
    #[must_use]
    pub fn with_pageable(mut self, pageable: Pageable) -> Self {
        self.pageable = pageable;
        self
    }

    /// Attach a scroll cursor.
    #[must_use]
    pub fn with_scroll_position(mut self, position: ScrollPosition) -> Self {
        self.scroll = Some(position);
        self
    }

    /// Attach a result limit.
    #[must_use]
    pub fn with_limit(mut self, limit: Limit) -> Self {
        self.limit = limit;
        self
    }

    /// Bindable values in order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.values.iter().map(|(_, v)| v)
    }
}

impl ParameterAccessor for Arguments {
    fn bindable_value(&self, index: usize) -> Option<&Value> {
        self.values.get(index).map(|(_, v)| v)
    }

    fn value_by_name(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(n, _)| n.as_deref() == Some(name))
            .map(|(_, v)| v)
    }

    fn bindable_len(&self) -> usize {
        self.values.len()
    }

    fn sort(&self) -> Sort {
        match &self.sort {
            Some(sort) => sort.clone(),
            None => self.pageable.sort()
        }
    }

    fn pageable(&self) -> Pageable {
        self.pageable.clone()
    }

    fn scroll_position(&self) -> Option<&ScrollPosition> {
        self.scroll.as_ref()
    }

    fn limit(&self) -> Limit {
        self.limit
    }
}

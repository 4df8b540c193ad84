// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Sorting requests.
//!
//! A [`Sort`] is an ordered list of [`Order`]s. Sorts are immutable values:
//! every combinator returns a new instance so a caller-supplied sort is never
//! changed behind its back.
//!
//! # Example
//!
//! ```rust
//! use entity_query_core::{Direction, Order, Sort};
//!
//! let sort = Sort::by(["lastname", "firstname"]).and(&Sort::by_orders(vec![Order::desc("age")]));
//! let reversed = sort.reverse();
//!
//! assert_eq!(sort.orders()[2].direction(), Direction::Desc);
//! assert_eq!(reversed.orders()[0].direction(), Direction::Desc);
//! ```

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sort direction for ordered queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Ascending order (A-Z, 0-9, oldest first).
    #[default]
    Asc,

    /// Descending order (Z-A, 9-0, newest first).
    Desc
}

impl Direction {
    /// Upper-case SQL keyword.
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC"
        }
    }

    /// Lower-case JPQL keyword as used when rendering `ORDER BY` items.
    pub const fn as_jpql(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc"
        }
    }

    /// Check if this is the ascending direction.
    pub const fn is_ascending(&self) -> bool {
        matches!(self, Self::Asc)
    }

    /// Opposite direction.
    #[must_use]
    pub const fn reverse(&self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc
        }
    }
}

/// Placement of `NULL` values within an ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NullHandling {
    /// Leave null placement to the database.
    #[default]
    Native,

    /// `NULLS FIRST`.
    NullsFirst,

    /// `NULLS LAST`.
    NullsLast
}

/// Single ordering instruction for one property.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Order {
    property:      String,
    direction:     Direction,
    ignore_case:   bool,
    null_handling: NullHandling,
    unsafe_expr:   bool
}

impl Order {
    /// Create an order with an explicit direction.
    ///
    /// # Arguments
    ///
    /// * `property` — Property path or select alias to order by
    /// * `direction` — Sort direction
    pub fn new(property: impl Into<String>, direction: Direction) -> Self {
        Self {
            property: property.into(),
            direction,
            ignore_case: false,
            null_handling: NullHandling::Native,
            unsafe_expr: false
        }
    }

    /// Ascending order for `property`.
    pub fn asc(property: impl Into<String>) -> Self {
        Self::new(property, Direction::Asc)
    }

    /// Descending order for `property`.
    pub fn desc(property: impl Into<String>) -> Self {
        Self::new(property, Direction::Desc)
    }

    /// Order by an arbitrary expression that bypasses property validation.
    ///
    /// Query rewriting rejects order properties that contain punctuation
    /// other than `.` and `_`. Orders created here skip that check and are
    /// rendered verbatim, so they must never carry end-user input.
    pub fn unsafe_expression(expression: impl Into<String>, direction: Direction) -> Self {
        Self {
            unsafe_expr: true,
            ..Self::new(expression, direction)
        }
    }

    /// Copy of this order that compares case-insensitively.
    #[must_use]
    pub fn ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }

    /// Copy of this order with the given null handling.
    #[must_use]
    pub fn with_null_handling(mut self, null_handling: NullHandling) -> Self {
        self.null_handling = null_handling;
        self
    }

    /// Copy of this order with a different direction.
    #[must_use]
    pub fn with_direction(&self, direction: Direction) -> Self {
        Self {
            direction,
            ..self.clone()
        }
    }

    /// Copy of this order with the opposite direction.
    #[must_use]
    pub fn reversed(&self) -> Self {
        self.with_direction(self.direction.reverse())
    }

    /// Property path or expression.
    pub fn property(&self) -> &str {
        &self.property
    }

    /// Sort direction.
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Check if the order is ascending.
    pub const fn is_ascending(&self) -> bool {
        self.direction.is_ascending()
    }

    /// Check if the order is descending.
    pub const fn is_descending(&self) -> bool {
        !self.direction.is_ascending()
    }

    /// Check if the order compares case-insensitively.
    pub const fn is_ignore_case(&self) -> bool {
        self.ignore_case
    }

    /// Null placement.
    pub const fn null_handling(&self) -> NullHandling {
        self.null_handling
    }

    /// Check if the order was created through [`Order::unsafe_expression`].
    pub const fn is_unsafe(&self) -> bool {
        self.unsafe_expr
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.property, self.direction.as_sql())?;
        if self.ignore_case {
            f.write_str(", ignoring case")?;
        }
        Ok(())
    }
}

/// Ordered collection of [`Order`]s.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sort {
    orders: Vec<Order>
}

impl Sort {
    /// Sort without any order.
    pub const fn unsorted() -> Self {
        Self {
            orders: Vec::new()
        }
    }

    /// Ascending sort over the given properties.
    pub fn by<I, S>(properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>
    {
        Self::by_direction(Direction::Asc, properties)
    }

    /// Sort over the given properties, all using `direction`.
    pub fn by_direction<I, S>(direction: Direction, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>
    {
        Self {
            orders: properties
                .into_iter()
                .map(|p| Order::new(p, direction))
                .collect()
        }
    }

    /// Sort from explicit orders.
    pub fn by_orders(orders: Vec<Order>) -> Self {
        Self {
            orders
        }
    }

    /// Check if at least one order is present.
    pub fn is_sorted(&self) -> bool {
        !self.orders.is_empty()
    }

    /// Check if no order is present.
    pub fn is_unsorted(&self) -> bool {
        self.orders.is_empty()
    }

    /// Number of orders.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Check if no order is present.
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Orders in declaration order.
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Iterate over the orders.
    pub fn iter(&self) -> std::slice::Iter<'_, Order> {
        self.orders.iter()
    }

    /// Order for `property`, if any.
    pub fn order_for(&self, property: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.property == property)
    }

    /// New sort with the orders of `other` appended.
    #[must_use]
    pub fn and(&self, other: &Sort) -> Self {
        let mut orders = self.orders.clone();
        orders.extend(other.orders.iter().cloned());
        Self {
            orders
        }
    }

    /// New sort with every direction flipped.
    #[must_use]
    pub fn reverse(&self) -> Self {
        Self {
            orders: self.orders.iter().map(Order::reversed).collect()
        }
    }
}

impl<'a> IntoIterator for &'a Sort {
    type Item = &'a Order;
    type IntoIter = std::slice::Iter<'a, Order>;

    fn into_iter(self) -> Self::IntoIter {
        self.orders.iter()
    }
}

impl FromIterator<Order> for Sort {
    fn from_iter<T: IntoIterator<Item = Order>>(iter: T) -> Self {
        Self {
            orders: iter.into_iter().collect()
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.orders.is_empty() {
            return f.write_str("UNSORTED");
        }
        let parts: Vec<String> = self.orders.iter().map(ToString::to_string).collect();
        f.write_str(&parts.join(", "))
    }
}

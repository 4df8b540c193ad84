// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Keyset scrolling.
//!
//! A keyset cursor stores the last-seen values of the sort properties. The
//! next window starts right after them:
//!
//! ```text
//! sort: age asc, id asc       cursor: { age: 30, id: 5 }
//!   -> (u.age > ?2) OR (u.age = ?3 AND u.id > ?4)
//! ```
//!
//! Scrolling backward flips every direction of the sort, reads the rows in
//! reverse and restores their order afterwards.
//!
//! # Overview
//!
//! - [`KeysetScrollDelegate`] — Sort completion and cursor predicates
//! - [`QueryAdapter`] — Predicate construction strategy
//! - [`JpqlQueryAdapter`] — Adapter producing [`Predicate`]s and synthetic
//!   bindings
//! - [`KeysetScrollQueryCreator`] — Part tree creator constrained by a cursor
//! - [`ScrollDelegate`] — Window assembly from over-fetched rows

use entity_query_core::{
    KeysetScrollPosition, ManagedType, Metamodel, OffsetScrollPosition, Order, ScrollDirection,
    ScrollPosition, Sort, Value, Window
};
use tracing::debug;

use crate::{
    binder::ParameterBinder,
    binding::{BindingIdentifier, ParameterBinding, ParameterOrigin},
    creator::{
        CreatorOptions, Expression, JpqlQueryCreator, PartTreeQueryCreator, Predicate,
        SelectQuery, resolve_path
    },
    error::{QueryError, QueryResult},
    part_tree::PropertyPath
};

/// Builds predicates for one store.
///
/// [`KeysetScrollDelegate::create_predicate`] only talks to this trait, so
/// the cursor logic is independent of the query representation.
pub trait QueryAdapter {
    /// Expression of a property.
    type Expression;

    /// Predicate.
    type Predicate;

    /// Expression for `property`.
    ///
    /// # Errors
    ///
    /// [`QueryError::PropertyNotFound`] when the property does not resolve.
    fn create_expression(&mut self, property: &str) -> QueryResult<Self::Expression>;

    /// `expression > value` for ascending orders, `<` otherwise.
    fn compare(&mut self, order: &Order, expression: Self::Expression, value: &Value) -> Self::Predicate;

    /// `expression = value`, or `IS NULL` for a null value.
    fn compare_eq(&mut self, expression: Self::Expression, value: &Value) -> Self::Predicate;

    /// Conjunction.
    fn and(&mut self, predicates: Vec<Self::Predicate>) -> Self::Predicate;

    /// Disjunction.
    fn or(&mut self, predicates: Vec<Self::Predicate>) -> Self::Predicate;
}

/// Direction specific part of keyset scrolling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeysetScrollDelegate {
    direction: ScrollDirection
}

impl KeysetScrollDelegate {
    /// Delegate for `direction`.
    pub const fn of(direction: ScrollDirection) -> Self {
        Self {
            direction
        }
    }

    /// Delegate matching the direction of `position`.
    pub const fn for_position(position: &KeysetScrollPosition) -> Self {
        Self::of(position.direction())
    }

    /// Scroll direction.
    pub const fn direction(&self) -> ScrollDirection {
        self.direction
    }

    /// Sort to run the keyset query with.
    ///
    /// Appends the identifier properties missing from `sort` in ascending
    /// order so rows are totally ordered. Scrolling backward flips every
    /// direction. `sort` itself is left untouched.
    pub fn create_sort(&self, sort: &Sort, id_properties: &[&str]) -> Sort {
        let mut orders: Vec<Order> = sort.iter().cloned().collect();
        for id in id_properties {
            if sort.order_for(id).is_none() {
                orders.push(Order::asc(*id));
            }
        }
        let orders = match self.direction {
            ScrollDirection::Forward => orders,
            ScrollDirection::Backward => orders.iter().map(Order::reversed).collect()
        };
        Sort::by_orders(orders)
    }

    /// Predicate selecting the rows after `position` under `sort`.
    ///
    /// `sort` is expected to come from [`Self::create_sort`]. Returns `None`
    /// for the initial position.
    ///
    /// # Errors
    ///
    /// [`QueryError::IncompleteKeyset`] when the cursor misses a value of a
    /// sorted property. Expression errors of the adapter are propagated.
    pub fn create_predicate<A>(
        &self,
        position: &KeysetScrollPosition,
        sort: &Sort,
        adapter: &mut A
    ) -> QueryResult<Option<A::Predicate>>
    where
        A: QueryAdapter
    {
        if position.is_initial() {
            return Ok(None);
        }
        let orders = sort.orders();
        let mut disjuncts = Vec::with_capacity(orders.len());
        for (i, order) in orders.iter().enumerate() {
            let mut conjuncts = Vec::with_capacity(i + 1);
            for previous in &orders[..i] {
                let value = key(position, previous.property())?;
                let expression = adapter.create_expression(previous.property())?;
                conjuncts.push(adapter.compare_eq(expression, value));
            }
            let value = key(position, order.property())?;
            let expression = adapter.create_expression(order.property())?;
            conjuncts.push(adapter.compare(order, expression, value));
            disjuncts.push(adapter.and(conjuncts));
        }
        if disjuncts.is_empty() {
            return Ok(None);
        }
        Ok(Some(adapter.or(disjuncts)))
    }

    /// Restore the sort order of rows read by a backward query.
    pub fn post_process_results<T>(&self, mut results: Vec<T>) -> Vec<T> {
        if self.direction == ScrollDirection::Backward {
            results.reverse();
        }
        results
    }

    /// Rows of the window out of an over-fetched, post-processed result.
    ///
    /// Forward scrolling keeps the head, backward scrolling keeps the tail.
    pub fn result_window<T>(&self, mut results: Vec<T>, limit: usize) -> Vec<T> {
        if results.len() <= limit {
            return results;
        }
        match self.direction {
            ScrollDirection::Forward => {
                results.truncate(limit);
                results
            }
            ScrollDirection::Backward => results.split_off(results.len() - limit)
        }
    }
}

fn key<'p>(position: &'p KeysetScrollPosition, property: &str) -> QueryResult<&'p Value> {
    position.get(property).ok_or(QueryError::IncompleteKeyset)
}

/// [`QueryAdapter`] over a [`SelectQuery`].
///
/// Cursor values become synthetic bindings numbered after the positions
/// the query already uses.
pub struct JpqlQueryAdapter<'q> {
    query:     &'q mut SelectQuery,
    entity:    &'q ManagedType,
    metamodel: &'q dyn Metamodel,
    options:   CreatorOptions,
    position:  usize,
    bindings:  Vec<ParameterBinding>
}

impl<'q> JpqlQueryAdapter<'q> {
    /// Adapter adding joins to `query` and numbering markers after `offset`.
    pub fn new(
        query: &'q mut SelectQuery,
        entity: &'q ManagedType,
        metamodel: &'q dyn Metamodel,
        options: CreatorOptions,
        offset: usize
    ) -> Self {
        Self {
            query,
            entity,
            metamodel,
            options,
            position: offset,
            bindings: Vec::new()
        }
    }

    /// Synthetic bindings created for cursor values.
    pub fn into_bindings(self) -> Vec<ParameterBinding> {
        self.bindings
    }

    fn parameter(&mut self, expression: &Expression, value: &Value) -> Expression {
        self.position += 1;
        let source = match expression {
            Expression::Path(path) => path.name().to_owned(),
            Expression::Parameter(_) | Expression::Literal(_) | Expression::Function { .. } => {
                "keyset".to_owned()
            }
        };
        self.bindings.push(ParameterBinding::new(
            BindingIdentifier::indexed(self.position),
            ParameterOrigin::synthetic(value.clone(), source)
        ));
        Expression::Parameter(self.position)
    }
}

impl QueryAdapter for JpqlQueryAdapter<'_> {
    type Expression = Expression;
    type Predicate = Predicate;

    fn create_expression(&mut self, property: &str) -> QueryResult<Expression> {
        let path = PropertyPath::from(property, self.entity, self.metamodel)?;
        Ok(resolve_path(self.query, &path, false, self.options.path_optimization()).into())
    }

    fn compare(&mut self, order: &Order, expression: Expression, value: &Value) -> Predicate {
        let right = self.parameter(&expression, value);
        Predicate::Compare {
            left: expression,
            operator: if order.is_ascending() { ">" } else { "<" },
            right
        }
    }

    fn compare_eq(&mut self, expression: Expression, value: &Value) -> Predicate {
        if value.is_null() {
            return Predicate::Is {
                expr: expression,
                test: "NULL"
            };
        }
        let right = self.parameter(&expression, value);
        Predicate::Compare {
            left: expression,
            operator: "=",
            right
        }
    }

    fn and(&mut self, predicates: Vec<Predicate>) -> Predicate {
        predicates
            .into_iter()
            .reduce(Predicate::and)
            .unwrap_or_else(|| Predicate::Is {
                expr: Expression::Literal("TRUE".to_owned()),
                test: "NOT NULL"
            })
    }

    fn or(&mut self, predicates: Vec<Predicate>) -> Predicate {
        predicates
            .into_iter()
            .map(Predicate::nested)
            .reduce(Predicate::or)
            .unwrap_or_else(|| Predicate::Is {
                expr: Expression::Literal("TRUE".to_owned()),
                test: "NOT NULL"
            })
    }
}

/// [`PartTreeQueryCreator`] constrained to the rows after a keyset cursor.
///
/// The rendered query orders by the completed keyset sort and combines the
/// method name predicate with the cursor predicate:
///
/// ```text
/// SELECT u FROM User u WHERE (u.lastname = ?1) AND ((u.age > ?2) OR (u.age = ?3 AND u.id > ?4))
///   ORDER BY u.age asc, u.id asc
/// ```
pub struct KeysetScrollQueryCreator<'a> {
    creator:  PartTreeQueryCreator<'a>,
    position: &'a KeysetScrollPosition,
    sort:     Sort,
    bindings: Vec<ParameterBinding>
}

impl<'a> KeysetScrollQueryCreator<'a> {
    /// Wrap `creator` with the cursor `position`.
    pub fn new(creator: PartTreeQueryCreator<'a>, position: &'a KeysetScrollPosition) -> Self {
        Self {
            creator,
            position,
            sort: Sort::unsorted(),
            bindings: Vec::new()
        }
    }

    /// Keyset sort of the last created query.
    pub const fn keyset_sort(&self) -> &Sort {
        &self.sort
    }

    /// Delegate of the cursor direction.
    pub const fn delegate(&self) -> KeysetScrollDelegate {
        KeysetScrollDelegate::for_position(self.position)
    }
}

impl JpqlQueryCreator for KeysetScrollQueryCreator<'_> {
    fn create_query(&mut self, sort: &Sort) -> QueryResult<String> {
        let delegate = self.delegate();
        let entity = self.creator.entity();
        let ids: Vec<&str> = entity.id_attributes().into_iter().map(|a| a.name()).collect();
        let keyset_sort = delegate.create_sort(&self.creator.tree().sort().and(sort), &ids);

        let mut query = self.creator.build(&keyset_sort)?;
        let offset = self.creator.binding_count();
        let mut adapter = JpqlQueryAdapter::new(
            &mut query,
            entity,
            self.creator.metamodel(),
            *self.creator.options(),
            offset
        );
        let keyset = delegate.create_predicate(self.position, &keyset_sort, &mut adapter)?;
        let synthetic = adapter.into_bindings();

        if let Some(keyset) = keyset {
            let predicate = match query.predicate() {
                Some(tree) => tree.clone().nested().and(keyset.nested()),
                None => keyset
            };
            query.set_predicate(predicate);
        }

        let mut bindings = self.creator.bindings().to_vec();
        bindings.extend(synthetic);
        self.bindings = bindings;
        self.sort = keyset_sort;

        let rendered = query.render();
        debug!(entity = entity.simple_name(), query = %rendered, "derived keyset query");
        Ok(rendered)
    }

    fn bindings(&self) -> &[ParameterBinding] {
        &self.bindings
    }

    fn binder(&self) -> QueryResult<ParameterBinder> {
        ParameterBinder::new(self.creator.parameters(), &self.bindings)
    }

    fn use_tuple_query(&self) -> bool {
        self.creator.use_tuple_query()
    }
}

/// Turns over-fetched rows into a [`Window`].
pub struct ScrollDelegate;

impl ScrollDelegate {
    /// Window of at most `limit` rows.
    ///
    /// `results` must be read with `limit + 1` as the maximum so that
    /// `has_next` can be detected. For keyset positions, `key_of` extracts
    /// the value of a sort property from a row to build the row's cursor.
    ///
    /// # Arguments
    ///
    /// * `results` — Rows as returned by the query
    /// * `limit` — Window size
    /// * `position` — Cursor the rows were read from
    /// * `sort` — Keyset sort the query ran with
    /// * `key_of` — Sort property value of a row
    pub fn create_window<T, F>(
        results: Vec<T>,
        limit: usize,
        position: &ScrollPosition,
        sort: &Sort,
        key_of: F
    ) -> Window<T>
    where
        F: Fn(&T, &str) -> Value
    {
        let has_next = !results.is_empty() && results.len() > limit;
        match position {
            ScrollPosition::Offset(offset) => {
                let start = offset.start();
                let mut content = results;
                content.truncate(limit);
                Window::from(
                    content,
                    |i, _| ScrollPosition::Offset(OffsetScrollPosition::of(start + i as u64)),
                    has_next
                )
            }
            ScrollPosition::Keyset(keyset) => {
                let delegate = KeysetScrollDelegate::for_position(keyset);
                let content = delegate.result_window(delegate.post_process_results(results), limit);
                let direction = keyset.direction();
                Window::from(
                    content,
                    |_, row| {
                        let keys = sort.iter().map(|order| {
                            (order.property().to_owned(), key_of(row, order.property()))
                        });
                        ScrollPosition::Keyset(KeysetScrollPosition::of(keys, direction))
                    },
                    has_next
                )
            }
        }
    }
}

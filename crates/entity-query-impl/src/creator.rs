// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! JPQL creation from parsed method names.
//!
//! A [`PartTreeQueryCreator`] walks a [`PartTree`] and renders one select
//! query per call to [`JpqlQueryCreator::create_query`]. Each argument a
//! predicate consumes becomes a positional `?N` marker backed by a
//! [`ParameterBinding`], in method parameter order.
//!
//! ```text
//! findByLineItemsQuantityGreaterThanOrderByDateDesc
//!   -> SELECT o FROM Order o LEFT JOIN o.lineItems l WHERE l.quantity > ?1 ORDER BY o.date desc
//! ```
//!
//! # Overview
//!
//! - [`JpqlQueryCreator`] — Creator SPI used by derived queries
//! - [`PartTreeQueryCreator`] — Creator for entity, count, exists, delete and
//!   projection queries
//! - [`CreatorOptions`] — Escape character, ignore-case function, path
//!   optimization
//! - [`requires_outer_join`] — Outer join rule for association segments
//! - [`validate`] — Method parameter check against the tree

mod builder;
mod join;
mod predicate;
mod provider;

use entity_query_core::{
    ManagedType, Metamodel, MethodParameters, ParameterAccessor, ReturnedType, Sort
};
use tracing::debug;

pub use self::{
    builder::{
        Expression, Join, JoinType, OrderExpression, Origin, PathExpression, Predicate, SelectQuery,
        Selection
    },
    join::requires_outer_join,
    provider::validate
};
pub(crate) use self::join::resolve as resolve_path;
use self::{predicate::PredicateBuilder, provider::ParameterMetadataProvider};
use crate::{
    binder::ParameterBinder,
    binding::{EscapeCharacter, ParameterBinding},
    enhancer::check_sort_expression,
    error::{QueryError, QueryResult},
    part_tree::{PartTree, PropertyPath}
};

/// Whether `a.customer.id` may skip the join to `customer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PathOptimizationStrategy {
    /// Join every association that is not a leaf.
    #[default]
    Disabled,

    /// Navigate to the id of a to-one target through its foreign key.
    ForeignKey
}

impl PathOptimizationStrategy {
    /// Check if foreign key navigation is allowed.
    pub const fn is_enabled(&self) -> bool {
        matches!(self, Self::ForeignKey)
    }
}

/// Function applied to both sides of an ignore-case comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IgnoreCaseTemplate {
    /// `UPPER(…)`
    #[default]
    Upper,

    /// `LOWER(…)`
    Lower
}

impl IgnoreCaseTemplate {
    /// Function name.
    pub const fn function(&self) -> &'static str {
        match self {
            Self::Upper => "UPPER",
            Self::Lower => "LOWER"
        }
    }
}

/// Rendering options of a [`PartTreeQueryCreator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatorOptions {
    path_optimization: PathOptimizationStrategy,
    escape:            EscapeCharacter,
    ignore_case:       IgnoreCaseTemplate
}

impl Default for CreatorOptions {
    fn default() -> Self {
        Self {
            path_optimization: PathOptimizationStrategy::Disabled,
            escape:            EscapeCharacter::DEFAULT,
            ignore_case:       IgnoreCaseTemplate::Upper
        }
    }
}

impl CreatorOptions {
    /// Defaults: no path optimization, `\` escape, `UPPER`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the path optimization.
    #[must_use]
    pub const fn with_path_optimization(mut self, strategy: PathOptimizationStrategy) -> Self {
        self.path_optimization = strategy;
        self
    }

    /// Set the LIKE escape character.
    #[must_use]
    pub const fn with_escape(mut self, escape: EscapeCharacter) -> Self {
        self.escape = escape;
        self
    }

    /// Set the ignore-case function.
    #[must_use]
    pub const fn with_ignore_case(mut self, template: IgnoreCaseTemplate) -> Self {
        self.ignore_case = template;
        self
    }

    /// Path optimization.
    pub const fn path_optimization(&self) -> PathOptimizationStrategy {
        self.path_optimization
    }

    /// LIKE escape character.
    pub const fn escape(&self) -> EscapeCharacter {
        self.escape
    }

    /// Ignore-case function.
    pub const fn ignore_case_template(&self) -> IgnoreCaseTemplate {
        self.ignore_case
    }
}

/// Creates query text and the bindings that go with it.
///
/// Bindings are only complete after [`JpqlQueryCreator::create_query`]
/// returned.
pub trait JpqlQueryCreator {
    /// Render the query, appending `sort` to the static sort.
    ///
    /// # Errors
    ///
    /// Fails on invalid arguments, unresolvable properties and unsafe sort
    /// expressions.
    fn create_query(&mut self, sort: &Sort) -> QueryResult<String>;

    /// Bindings of the last created query.
    fn bindings(&self) -> &[ParameterBinding];

    /// Binder for the last created query.
    ///
    /// # Errors
    ///
    /// [`QueryError::Binding`] when a binding references a missing parameter.
    fn binder(&self) -> QueryResult<ParameterBinder>;

    /// Check if rows are read as tuples.
    fn use_tuple_query(&self) -> bool;
}

/// Shape of the rendered query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Projection {
    /// Shape follows the method name and returned type.
    Tree,

    /// `COUNT` regardless of the method name.
    Count
}

/// Query creator for a [`PartTree`].
///
/// # Example
///
/// ```rust,ignore
/// let tree = PartTree::parse("findByCountry", order, &metamodel)?;
/// let mut creator = PartTreeQueryCreator::new(&tree, order, &metamodel, &parameters);
///
/// assert_eq!(
///     creator.create_query(&Sort::unsorted())?,
///     "SELECT o FROM Order o WHERE o.country = ?1"
/// );
/// ```
pub struct PartTreeQueryCreator<'a> {
    tree:          &'a PartTree,
    entity:        &'a ManagedType,
    metamodel:     &'a dyn Metamodel,
    parameters:    &'a MethodParameters,
    values:        Option<&'a dyn ParameterAccessor>,
    returned_type: ReturnedType,
    options:       CreatorOptions,
    projection:    Projection,
    bindings:      Vec<ParameterBinding>
}

impl<'a> PartTreeQueryCreator<'a> {
    /// Creator for `tree` over `entity`.
    ///
    /// # Arguments
    ///
    /// * `tree` — Parsed method name
    /// * `entity` — Domain type of the repository
    /// * `metamodel` — Resolves properties of selections and sorts
    /// * `parameters` — Declared method parameters
    pub fn new(
        tree: &'a PartTree,
        entity: &'a ManagedType,
        metamodel: &'a dyn Metamodel,
        parameters: &'a MethodParameters
    ) -> Self {
        Self {
            tree,
            entity,
            metamodel,
            parameters,
            values: None,
            returned_type: ReturnedType::Domain,
            options: CreatorOptions::default(),
            projection: Projection::Tree,
            bindings: Vec::new()
        }
    }

    /// Result shape requested by the method.
    #[must_use]
    pub fn returning(mut self, returned_type: ReturnedType) -> Self {
        self.returned_type = returned_type;
        self
    }

    /// Rendering options.
    #[must_use]
    pub const fn with_options(mut self, options: CreatorOptions) -> Self {
        self.options = options;
        self
    }

    /// Argument values; `null` simple properties render as `IS NULL`.
    #[must_use]
    pub fn with_values(mut self, values: &'a dyn ParameterAccessor) -> Self {
        self.values = Some(values);
        self
    }

    /// Render `COUNT` instead of the tree's own projection.
    #[must_use]
    pub const fn counting(mut self) -> Self {
        self.projection = Projection::Count;
        self
    }

    /// Domain type.
    pub const fn entity(&self) -> &'a ManagedType {
        self.entity
    }

    /// Number of bindings of the last created query.
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// Parsed method name.
    pub const fn tree(&self) -> &'a PartTree {
        self.tree
    }

    pub(crate) const fn parameters(&self) -> &'a MethodParameters {
        self.parameters
    }

    pub(crate) const fn metamodel(&self) -> &'a dyn Metamodel {
        self.metamodel
    }

    pub(crate) const fn options(&self) -> &CreatorOptions {
        &self.options
    }

    /// Build the select query without rendering it.
    ///
    /// # Errors
    ///
    /// See [`JpqlQueryCreator::create_query`].
    pub fn select_query(&mut self, sort: &Sort) -> QueryResult<SelectQuery> {
        let sort = self.tree.sort().and(sort);
        self.build(&sort)
    }

    /// Build the select query ordered by exactly `sort`.
    pub(crate) fn build(&mut self, sort: &Sort) -> QueryResult<SelectQuery> {
        let mut query = SelectQuery::new(self.entity.entity_name(), self.entity.simple_name(), Selection::Entity);
        let mut provider =
            ParameterMetadataProvider::new(self.parameters, self.values, self.options.escape());

        let mut predicate: Option<Predicate> = None;
        for node in self.tree.nodes() {
            let mut conjunction: Option<Predicate> = None;
            for part in node.parts() {
                let next = PredicateBuilder::new(part, &self.options, &mut provider).build(&mut query)?;
                conjunction = Some(match conjunction {
                    Some(base) => base.and(next),
                    None => next
                });
            }
            if let Some(conjunction) = conjunction {
                predicate = Some(match predicate {
                    Some(base) => base.or(conjunction),
                    None => conjunction
                });
            }
        }
        self.bindings = provider.into_bindings();

        let counting = self.projection == Projection::Count || self.tree.is_count_projection();
        let selection = self.selection(&mut query, counting)?;
        query.set_selection(selection);
        query.set_distinct(self.tree.is_distinct() && !self.tree.is_delete());
        if let Some(predicate) = predicate {
            query.set_predicate(predicate);
        }
        if !counting && !self.tree.is_delete() {
            self.order_by(&mut query, sort)?;
        }
        Ok(query)
    }

    fn selection(&self, query: &mut SelectQuery, counting: bool) -> QueryResult<Selection> {
        if self.tree.is_delete() {
            return Ok(Selection::Entity);
        }
        if counting {
            return Ok(Selection::Count);
        }
        let custom = match &self.returned_type {
            ReturnedType::Dto {
                class_name,
                properties
            } if !properties.is_empty() => Some(Selection::Constructor {
                class_name: class_name.clone(),
                paths:      self.select_paths(query, properties.iter().map(String::as_str))?
            }),
            ReturnedType::Projection {
                properties
            } if !properties.is_empty() => Some(Selection::Paths(
                self.select_paths(query, properties.iter().map(String::as_str))?
            )),
            ReturnedType::Tuple => Some(Selection::Paths(
                self.select_paths(query, self.entity.attributes().iter().map(|a| a.name()))?
            )),
            ReturnedType::Domain
            | ReturnedType::Dto { .. }
            | ReturnedType::Projection { .. }
            | ReturnedType::Value(_) => None
        };
        if let Some(selection) = custom {
            return Ok(selection);
        }
        if self.tree.is_exists_projection() {
            let ids: Vec<&str> = self.entity.id_attributes().into_iter().map(|a| a.name()).collect();
            if ids.is_empty() {
                return Err(QueryError::InvalidQuery(format!(
                    "Cannot derive exists query for {} without identifier",
                    self.entity.simple_name()
                )));
            }
            return Ok(Selection::Paths(self.select_paths(query, ids)?));
        }
        Ok(Selection::Entity)
    }

    fn select_paths<'s>(
        &self,
        query: &mut SelectQuery,
        properties: impl IntoIterator<Item = &'s str>
    ) -> QueryResult<Vec<PathExpression>> {
        properties
            .into_iter()
            .map(|property| {
                let path = PropertyPath::from(property, self.entity, self.metamodel)?;
                Ok(join::resolve(query, &path, true, self.options.path_optimization()))
            })
            .collect()
    }

    fn order_by(&self, query: &mut SelectQuery, sort: &Sort) -> QueryResult<()> {
        for order in sort {
            check_sort_expression(order)?;
            let expression = match PropertyPath::from(order.property(), self.entity, self.metamodel) {
                Ok(path) => join::resolve(query, &path, true, self.options.path_optimization()).into(),
                Err(_) if order.is_unsafe() => Expression::Literal(order.property().to_owned()),
                Err(error) => return Err(error)
            };
            let expression = if order.is_ignore_case() {
                Expression::function(self.options.ignore_case_template().function(), expression)
            } else {
                expression
            };
            query.order_by(OrderExpression::new(expression, order.clone()));
        }
        Ok(())
    }
}

impl JpqlQueryCreator for PartTreeQueryCreator<'_> {
    fn create_query(&mut self, sort: &Sort) -> QueryResult<String> {
        let query = self.select_query(sort)?.render();
        debug!(entity = self.entity.simple_name(), %query, "derived query");
        Ok(query)
    }

    fn bindings(&self) -> &[ParameterBinding] {
        &self.bindings
    }

    fn binder(&self) -> QueryResult<ParameterBinder> {
        ParameterBinder::new(self.parameters, &self.bindings)
    }

    fn use_tuple_query(&self) -> bool {
        self.returned_type.use_tuple_query()
    }
}

#[cfg(test)]
mod tests {
    use entity_query_core::{
        Arguments, Attribute, Direction, Order, StaticMetamodel, Value, ValueType
    };

    use super::*;
    use crate::binding::BindingKind;

    fn model() -> StaticMetamodel {
        StaticMetamodel::builder()
            .entity(
                ManagedType::entity("shop.Order", "Order")
                    .with(Attribute::id("id", ValueType::Long))
                    .with(Attribute::basic("country", ValueType::String))
                    .with(Attribute::basic("date", ValueType::Date))
                    .with(Attribute::basic("completed", ValueType::Boolean))
                    .with(Attribute::basic("total", ValueType::Integer))
                    .with(Attribute::one_to_many("lineItems", "shop.LineItem"))
            )
            .entity(
                ManagedType::entity("shop.LineItem", "LineItem")
                    .with(Attribute::id("id", ValueType::Long))
                    .with(Attribute::basic("quantity", ValueType::Integer))
                    .with(Attribute::many_to_one("product", "shop.Product").required())
            )
            .entity(
                ManagedType::entity("shop.Product", "Product")
                    .with(Attribute::id("id", ValueType::Long))
                    .with(Attribute::basic("name", ValueType::String))
                    .with(Attribute::basic("productType", ValueType::String))
                    .with(Attribute::element_collection("categories", ValueType::String))
            )
            .build()
    }

    struct Fixture {
        model: StaticMetamodel
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                model: model()
            }
        }

        fn entity(&self, name: &str) -> &ManagedType {
            self.model.entity(name).expect("entity")
        }

        fn tree(&self, entity: &str, method: &str) -> PartTree {
            PartTree::parse(method, self.entity(entity), &self.model).expect("tree")
        }
    }

    fn parameters(method: &str, types: &[ValueType]) -> MethodParameters {
        types
            .iter()
            .enumerate()
            .fold(MethodParameters::new(method), |parameters, (index, value_type)| {
                parameters.bindable(format!("arg{index}"), value_type.clone())
            })
    }

    fn order_query(method: &str, types: &[ValueType]) -> String {
        let fixture = Fixture::new();
        let tree = fixture.tree("shop.Order", method);
        let parameters = parameters(method, types);
        PartTreeQueryCreator::new(&tree, fixture.entity("shop.Order"), &fixture.model, &parameters)
            .create_query(&Sort::unsorted())
            .expect("query")
    }

    fn product_query(method: &str, types: &[ValueType]) -> String {
        let fixture = Fixture::new();
        let tree = fixture.tree("shop.Product", method);
        let parameters = parameters(method, types);
        PartTreeQueryCreator::new(&tree, fixture.entity("shop.Product"), &fixture.model, &parameters)
            .create_query(&Sort::unsorted())
            .expect("query")
    }

    #[test]
    fn simple_property() {
        assert_eq!(
            order_query("findByCountry", &[ValueType::String]),
            "SELECT o FROM Order o WHERE o.country = ?1"
        );
        assert_eq!(
            order_query("findByCountryNot", &[ValueType::String]),
            "SELECT o FROM Order o WHERE o.country != ?1"
        );
    }

    #[test]
    fn comparison_keywords() {
        assert_eq!(
            order_query("findByDateBetween", &[ValueType::Date, ValueType::Date]),
            "SELECT o FROM Order o WHERE o.date BETWEEN ?1 AND ?2"
        );
        assert_eq!(
            order_query("findByTotalGreaterThanEqual", &[ValueType::Integer]),
            "SELECT o FROM Order o WHERE o.total >= ?1"
        );
        assert_eq!(
            order_query("findByDateBefore", &[ValueType::Date]),
            "SELECT o FROM Order o WHERE o.date < ?1"
        );
        assert_eq!(
            order_query("findByCountryIsNotNull", &[]),
            "SELECT o FROM Order o WHERE o.country IS NOT NULL"
        );
        assert_eq!(
            order_query("findByCompletedTrue", &[]),
            "SELECT o FROM Order o WHERE o.completed = TRUE"
        );
    }

    #[test]
    fn and_or_precedence() {
        assert_eq!(
            order_query(
                "findByCountryAndDateOrCompletedFalse",
                &[ValueType::String, ValueType::Date]
            ),
            "SELECT o FROM Order o WHERE o.country = ?1 AND o.date = ?2 OR o.completed = FALSE"
        );
    }

    #[test]
    fn ignore_case() {
        assert_eq!(
            order_query("findByCountryIgnoreCase", &[ValueType::String]),
            "SELECT o FROM Order o WHERE UPPER(o.country) = UPPER(?1)"
        );
        assert_eq!(
            order_query("findByCountryAndTotalAllIgnoreCase", &[ValueType::String, ValueType::Integer]),
            "SELECT o FROM Order o WHERE UPPER(o.country) = UPPER(?1) AND o.total = ?2"
        );

        let fixture = Fixture::new();
        let tree = fixture.tree("shop.Order", "findByTotalIgnoreCase");
        let parameters = parameters("findByTotalIgnoreCase", &[ValueType::Integer]);
        let err = PartTreeQueryCreator::new(&tree, fixture.entity("shop.Order"), &fixture.model, &parameters)
            .create_query(&Sort::unsorted())
            .expect_err("integer");
        assert_eq!(
            err.to_string(),
            "Unable to ignore case of Integer types, the property 'total' must reference a String"
        );
    }

    #[test]
    fn lower_template() {
        let fixture = Fixture::new();
        let tree = fixture.tree("shop.Order", "findByCountryIgnoreCase");
        let parameters = parameters("findByCountryIgnoreCase", &[ValueType::String]);
        let query = PartTreeQueryCreator::new(&tree, fixture.entity("shop.Order"), &fixture.model, &parameters)
            .with_options(CreatorOptions::new().with_ignore_case(IgnoreCaseTemplate::Lower))
            .create_query(&Sort::unsorted())
            .expect("query");
        assert_eq!(query, "SELECT o FROM Order o WHERE LOWER(o.country) = LOWER(?1)");
    }

    #[test]
    fn like_family() {
        assert_eq!(
            product_query("findByNameStartingWith", &[ValueType::String]),
            "SELECT p FROM Product p WHERE p.name LIKE ?1 ESCAPE '\\'"
        );
        assert_eq!(
            product_query("findByNameNotContainingIgnoreCase", &[ValueType::String]),
            "SELECT p FROM Product p WHERE UPPER(p.name) NOT LIKE UPPER(?1) ESCAPE '\\'"
        );
        assert_eq!(
            product_query("findByNameNotLike", &[ValueType::String]),
            "SELECT p FROM Product p WHERE p.name NOT LIKE ?1 ESCAPE '\\'"
        );
    }

    #[test]
    fn like_binding_adds_wildcards() {
        let fixture = Fixture::new();
        let tree = fixture.tree("shop.Product", "findByNameEndingWith");
        let parameters = parameters("findByNameEndingWith", &[ValueType::String]);
        let mut creator =
            PartTreeQueryCreator::new(&tree, fixture.entity("shop.Product"), &fixture.model, &parameters);
        creator.create_query(&Sort::unsorted()).expect("query");
        let binding = &creator.bindings()[0];
        assert_eq!(binding.position(), Some(1));
        assert!(matches!(binding.kind(), BindingKind::PartTree(_)));
        assert_eq!(binding.prepare(Value::from("50%")), Value::from("%50\\%"));
    }

    #[test]
    fn in_and_member_of() {
        let names = ValueType::collection_of(ValueType::String);
        assert_eq!(
            product_query("findByNameIn", &[names.clone()]),
            "SELECT p FROM Product p WHERE p.name IN (?1)"
        );
        assert_eq!(
            product_query("findByNameNotIn", &[names]),
            "SELECT p FROM Product p WHERE p.name NOT IN (?1)"
        );
        assert_eq!(
            product_query("findByCategoriesContaining", &[ValueType::String]),
            "SELECT p FROM Product p WHERE ?1 MEMBER OF p.categories"
        );
        assert_eq!(
            product_query("findByCategoriesNotContaining", &[ValueType::String]),
            "SELECT p FROM Product p WHERE ?1 NOT MEMBER OF p.categories"
        );
    }

    #[test]
    fn emptiness_requires_collection() {
        assert_eq!(
            order_query("findByLineItemsIsEmpty", &[]),
            "SELECT o FROM Order o WHERE o.lineItems IS EMPTY"
        );
        assert_eq!(
            order_query("findByLineItemsIsNotEmpty", &[]),
            "SELECT o FROM Order o WHERE o.lineItems IS NOT EMPTY"
        );

        assert_eq!(
            order_query(
                "findByLineItemsQuantityGreaterThanAndLineItemsIsNotEmpty",
                &[ValueType::Integer]
            ),
            "SELECT o FROM Order o LEFT JOIN o.lineItems l WHERE l.quantity > ?1 AND o.lineItems IS NOT EMPTY"
        );

        let fixture = Fixture::new();
        let tree = fixture.tree("shop.Order", "findByCountryIsEmpty");
        let parameters = MethodParameters::new("findByCountryIsEmpty");
        let err = PartTreeQueryCreator::new(&tree, fixture.entity("shop.Order"), &fixture.model, &parameters)
            .create_query(&Sort::unsorted())
            .expect_err("scalar");
        assert_eq!(err.to_string(), "IsEmpty / IsNotEmpty can only be used on collection properties");
    }

    #[test]
    fn joins_collection_path() {
        assert_eq!(
            order_query("findByLineItemsQuantityGreaterThan", &[ValueType::Integer]),
            "SELECT o FROM Order o LEFT JOIN o.lineItems l WHERE l.quantity > ?1"
        );
        assert_eq!(
            order_query("findByLineItemsProductName", &[ValueType::String]),
            "SELECT o FROM Order o LEFT JOIN o.lineItems l LEFT JOIN l.product p WHERE p.name = ?1"
        );
    }

    #[test]
    fn null_arguments_become_is_null() {
        let fixture = Fixture::new();
        let tree = fixture.tree("shop.Order", "findByCountryAndDateNot");
        let parameters = parameters("findByCountryAndDateNot", &[ValueType::String, ValueType::Date]);
        let arguments = Arguments::of([Value::Null, Value::Null]);
        let mut creator = PartTreeQueryCreator::new(&tree, fixture.entity("shop.Order"), &fixture.model, &parameters)
            .with_values(&arguments);
        assert_eq!(
            creator.create_query(&Sort::unsorted()).expect("query"),
            "SELECT o FROM Order o WHERE o.country IS NULL AND o.date IS NOT NULL"
        );
        assert!(creator.bindings().iter().all(ParameterBinding::is_is_null));
    }

    #[test]
    fn static_and_dynamic_sort() {
        let fixture = Fixture::new();
        let tree = fixture.tree("shop.Order", "findDistinctByCountryOrderByDateDesc");
        let parameters = parameters("findDistinctByCountryOrderByDateDesc", &[ValueType::String]);
        let mut creator =
            PartTreeQueryCreator::new(&tree, fixture.entity("shop.Order"), &fixture.model, &parameters);
        let sort = Sort::by_orders(vec![Order::asc("country").ignore_case()]);
        assert_eq!(
            creator.create_query(&sort).expect("query"),
            "SELECT DISTINCT o FROM Order o WHERE o.country = ?1 ORDER BY o.date desc, UPPER(o.country) asc"
        );
    }

    #[test]
    fn sort_on_joined_property_and_unsafe_sort() {
        let fixture = Fixture::new();
        let tree = fixture.tree("shop.Order", "findByCountry");
        let parameters = parameters("findByCountry", &[ValueType::String]);
        let mut creator =
            PartTreeQueryCreator::new(&tree, fixture.entity("shop.Order"), &fixture.model, &parameters);
        assert_eq!(
            creator.create_query(&Sort::by(["lineItems.quantity"])).expect("query"),
            "SELECT o FROM Order o LEFT JOIN o.lineItems l WHERE o.country = ?1 ORDER BY l.quantity asc"
        );
        assert_eq!(
            creator
                .create_query(&Sort::by_orders(vec![Order::unsafe_expression("LENGTH(o.country)", Direction::Desc)]))
                .expect("query"),
            "SELECT o FROM Order o WHERE o.country = ?1 ORDER BY LENGTH(o.country) desc"
        );
        assert!(matches!(
            creator.create_query(&Sort::by(["country; drop"])),
            Err(QueryError::UnsafeSort(_))
        ));
        assert!(matches!(
            creator.create_query(&Sort::by(["unknown"])),
            Err(QueryError::PropertyNotFound { .. })
        ));
    }

    #[test]
    fn count_exists_and_delete() {
        assert_eq!(
            order_query("countByCountry", &[ValueType::String]),
            "SELECT COUNT(o) FROM Order o WHERE o.country = ?1"
        );
        assert_eq!(
            order_query("countDistinctByCountry", &[ValueType::String]),
            "SELECT COUNT(DISTINCT o) FROM Order o WHERE o.country = ?1"
        );
        assert_eq!(
            order_query("existsByCountry", &[ValueType::String]),
            "SELECT o.id id FROM Order o WHERE o.country = ?1"
        );
        assert_eq!(
            order_query("deleteByCountryOrderByDate", &[ValueType::String]),
            "SELECT o FROM Order o WHERE o.country = ?1"
        );
    }

    #[test]
    fn counting_ignores_sort() {
        let fixture = Fixture::new();
        let tree = fixture.tree("shop.Order", "findByCountryOrderByDateAsc");
        let parameters = parameters("findByCountryOrderByDateAsc", &[ValueType::String]);
        let query = PartTreeQueryCreator::new(&tree, fixture.entity("shop.Order"), &fixture.model, &parameters)
            .counting()
            .create_query(&Sort::by(["total"]))
            .expect("count");
        assert_eq!(query, "SELECT COUNT(o) FROM Order o WHERE o.country = ?1");
    }

    #[test]
    fn projections() {
        let fixture = Fixture::new();
        let tree = fixture.tree("shop.Product", "findByName");
        let parameters = parameters("findByName", &[ValueType::String]);
        let product = fixture.entity("shop.Product");

        let mut dto = PartTreeQueryCreator::new(&tree, product, &fixture.model, &parameters)
            .returning(ReturnedType::dto("shop.ProductDto", ["name", "productType"]));
        assert_eq!(
            dto.create_query(&Sort::unsorted()).expect("dto"),
            "SELECT new shop.ProductDto(p.name, p.productType) FROM Product p WHERE p.name = ?1"
        );
        assert!(!dto.use_tuple_query());

        let mut tuple = PartTreeQueryCreator::new(&tree, product, &fixture.model, &parameters)
            .returning(ReturnedType::projection(["name", "productType"]));
        assert_eq!(
            tuple.create_query(&Sort::unsorted()).expect("tuple"),
            "SELECT p.name name, p.productType productType FROM Product p WHERE p.name = ?1"
        );
        assert!(tuple.use_tuple_query());
    }

    #[test]
    fn missing_parameter_fails() {
        let fixture = Fixture::new();
        let tree = fixture.tree("shop.Order", "findByCountry");
        let parameters = MethodParameters::new("findByCountry");
        let err = PartTreeQueryCreator::new(&tree, fixture.entity("shop.Order"), &fixture.model, &parameters)
            .create_query(&Sort::unsorted())
            .expect_err("missing");
        assert_eq!(err.to_string(), "No parameter available for part Country");
    }

    #[test]
    fn path_optimization_strategy() {
        assert!(!PathOptimizationStrategy::default().is_enabled());
        assert!(PathOptimizationStrategy::ForeignKey.is_enabled());
        assert_eq!(IgnoreCaseTemplate::default().function(), "UPPER");
    }
}

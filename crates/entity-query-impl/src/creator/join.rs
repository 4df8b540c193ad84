// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Join promotion for property paths.
//!
//! Every association segment of a path is either navigated implicitly
//! (`o.customer.name`) or turned into an explicit join. Optional and
//! collection valued associations join `LEFT` so that rows without a related
//! entity are not dropped; once a path joined `LEFT`, every deeper join does
//! too.

use entity_query_core::{Attribute, AttributeKind};

use super::{
    PathOptimizationStrategy,
    builder::{JoinType, Origin, PathExpression, SelectQuery}
};
use crate::part_tree::PropertyPath;

/// Check if `attribute` must be joined with an outer join.
///
/// # Arguments
///
/// * `attribute` — Attribute of the current segment
/// * `for_selection` — Path is used in the select clause or ORDER BY
/// * `is_leaf` — Segment ends the path, or only an id follows it
/// * `has_required_outer_join` — A preceding segment already joined `LEFT`
pub fn requires_outer_join(
    attribute: &Attribute,
    for_selection: bool,
    is_leaf: bool,
    has_required_outer_join: bool
) -> bool {
    let kind = attribute.kind();
    if !kind.is_association() {
        return false;
    }
    let inverse_one_to_one =
        kind == AttributeKind::OneToOne && attribute.mapped_by_attribute().is_some();
    if is_leaf
        && !for_selection
        && !kind.is_collection()
        && !inverse_one_to_one
        && !has_required_outer_join
    {
        return false;
    }
    has_required_outer_join || attribute.is_optional()
}

/// Resolve `path` against `query`, adding the joins it needs.
///
/// The returned expression is relative to the last join, or to the root when
/// no join was needed. A path ending in a joined association references the
/// join alias itself.
pub fn resolve(
    query: &mut SelectQuery,
    path: &PropertyPath,
    for_selection: bool,
    strategy: PathOptimizationStrategy
) -> PathExpression {
    let segments = path.segments();
    let last = segments.len() - 1;
    let mut origin = Origin::Root;
    let mut pending: Vec<&str> = Vec::new();
    let mut outer = false;

    for (index, segment) in segments.iter().enumerate() {
        let attribute = segment.attribute();
        if !attribute.kind().is_association() {
            pending.push(segment.name());
            continue;
        }
        let is_leaf = index == last;
        let relationship_id = strategy.is_enabled()
            && attribute.kind().is_to_one()
            && index + 1 == last
            && segments[last].attribute().is_id();
        let requires = requires_outer_join(attribute, for_selection, is_leaf || relationship_id, outer);
        if !requires && (is_leaf || relationship_id) {
            pending.push(segment.name());
            continue;
        }
        pending.push(segment.name());
        let join_type = if requires { JoinType::Left } else { JoinType::Inner };
        origin = query.join(join_type, origin, &pending.join("."));
        pending.clear();
        outer = requires;
    }

    PathExpression::new(origin, pending.join("."), path.leaf().name())
}

/// Path relative to the root, without joins.
pub fn implicit(path: &PropertyPath) -> PathExpression {
    PathExpression::new(Origin::Root, path.to_dot_path(), path.leaf().name())
}

#[cfg(test)]
mod tests {
    use entity_query_core::{ManagedType, Metamodel, StaticMetamodel, ValueType};

    use super::*;
    use crate::creator::builder::{Expression, Predicate, Selection};

    fn model() -> StaticMetamodel {
        StaticMetamodel::builder()
            .entity(
                ManagedType::entity("shop.Order", "Order")
                    .with(Attribute::id("id", ValueType::Long))
                    .with(Attribute::basic("country", ValueType::String))
                    .with(Attribute::many_to_one("customer", "shop.Customer"))
                    .with(Attribute::many_to_one("seller", "shop.Customer").required())
                    .with(Attribute::one_to_many("lineItems", "shop.LineItem"))
            )
            .entity(
                ManagedType::entity("shop.Customer", "Customer")
                    .with(Attribute::id("id", ValueType::Long))
                    .with(Attribute::basic("name", ValueType::String))
                    .with(Attribute::many_to_one("address", "shop.Address").required())
            )
            .entity(
                ManagedType::entity("shop.Address", "Address")
                    .with(Attribute::id("id", ValueType::Long))
                    .with(Attribute::basic("city", ValueType::String))
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
            )
            .build()
    }

    fn render(source: &str, for_selection: bool, strategy: PathOptimizationStrategy) -> String {
        let model = model();
        let order = model.entity("shop.Order").expect("order");
        let path = PropertyPath::from(source, order, &model).expect("path");
        let mut query = SelectQuery::new(order.entity_name(), order.simple_name(), Selection::Entity);
        let resolved = resolve(&mut query, &path, for_selection, strategy);
        query.set_predicate(Predicate::Is {
            expr: Expression::Path(resolved),
            test: "NULL"
        });
        query.render()
    }

    fn attribute(case: &str) -> Attribute {
        match case {
            "basic" => Attribute::basic("name", ValueType::String),
            "embedded" => Attribute::embedded("address", "shop.Address"),
            "optional many-to-one" => Attribute::many_to_one("customer", "shop.Customer"),
            "required many-to-one" => Attribute::many_to_one("customer", "shop.Customer").required(),
            "optional one-to-one" => Attribute::one_to_one("profile", "shop.Profile"),
            "required one-to-one" => Attribute::one_to_one("profile", "shop.Profile").required(),
            "inverse one-to-one" => Attribute::one_to_one("profile", "shop.Profile").mapped_by("owner"),
            "required inverse one-to-one" => Attribute::one_to_one("profile", "shop.Profile")
                .mapped_by("owner")
                .required(),
            "one-to-many" => Attribute::one_to_many("items", "shop.Item"),
            "required one-to-many" => Attribute::one_to_many("items", "shop.Item").required(),
            "many-to-many" => Attribute::many_to_many("tags", "shop.Tag"),
            "element collection" => Attribute::element_collection("labels", ValueType::String),
            other => panic!("unknown case {other}")
        }
    }

    /// (case, for_selection, is_leaf, has_required_outer_join, expected)
    #[rustfmt::skip]
    const OUTER_JOIN: &[(&str, bool, bool, bool, bool)] = &[
        ("basic",                       false, false, false, false),
        ("basic",                       false, false, true,  false),
        ("basic",                       false, true,  false, false),
        ("basic",                       false, true,  true,  false),
        ("basic",                       true,  false, false, false),
        ("basic",                       true,  false, true,  false),
        ("basic",                       true,  true,  false, false),
        ("basic",                       true,  true,  true,  false),
        ("embedded",                    false, false, false, false),
        ("embedded",                    false, false, true,  false),
        ("embedded",                    false, true,  false, false),
        ("embedded",                    false, true,  true,  false),
        ("embedded",                    true,  false, false, false),
        ("embedded",                    true,  false, true,  false),
        ("embedded",                    true,  true,  false, false),
        ("embedded",                    true,  true,  true,  false),
        ("optional many-to-one",        false, false, false, true),
        ("optional many-to-one",        false, false, true,  true),
        ("optional many-to-one",        false, true,  false, false),
        ("optional many-to-one",        false, true,  true,  true),
        ("optional many-to-one",        true,  false, false, true),
        ("optional many-to-one",        true,  false, true,  true),
        ("optional many-to-one",        true,  true,  false, true),
        ("optional many-to-one",        true,  true,  true,  true),
        ("required many-to-one",        false, false, false, false),
        ("required many-to-one",        false, false, true,  true),
        ("required many-to-one",        false, true,  false, false),
        ("required many-to-one",        false, true,  true,  true),
        ("required many-to-one",        true,  false, false, false),
        ("required many-to-one",        true,  false, true,  true),
        ("required many-to-one",        true,  true,  false, false),
        ("required many-to-one",        true,  true,  true,  true),
        ("optional one-to-one",         false, false, false, true),
        ("optional one-to-one",         false, false, true,  true),
        ("optional one-to-one",         false, true,  false, false),
        ("optional one-to-one",         false, true,  true,  true),
        ("optional one-to-one",         true,  false, false, true),
        ("optional one-to-one",         true,  false, true,  true),
        ("optional one-to-one",         true,  true,  false, true),
        ("optional one-to-one",         true,  true,  true,  true),
        ("required one-to-one",         false, false, false, false),
        ("required one-to-one",         false, false, true,  true),
        ("required one-to-one",         false, true,  false, false),
        ("required one-to-one",         false, true,  true,  true),
        ("required one-to-one",         true,  false, false, false),
        ("required one-to-one",         true,  false, true,  true),
        ("required one-to-one",         true,  true,  false, false),
        ("required one-to-one",         true,  true,  true,  true),
        ("inverse one-to-one",          false, false, false, true),
        ("inverse one-to-one",          false, false, true,  true),
        ("inverse one-to-one",          false, true,  false, true),
        ("inverse one-to-one",          false, true,  true,  true),
        ("inverse one-to-one",          true,  false, false, true),
        ("inverse one-to-one",          true,  false, true,  true),
        ("inverse one-to-one",          true,  true,  false, true),
        ("inverse one-to-one",          true,  true,  true,  true),
        ("required inverse one-to-one", false, false, false, false),
        ("required inverse one-to-one", false, false, true,  true),
        ("required inverse one-to-one", false, true,  false, false),
        ("required inverse one-to-one", false, true,  true,  true),
        ("required inverse one-to-one", true,  false, false, false),
        ("required inverse one-to-one", true,  false, true,  true),
        ("required inverse one-to-one", true,  true,  false, false),
        ("required inverse one-to-one", true,  true,  true,  true),
        ("one-to-many",                 false, false, false, true),
        ("one-to-many",                 false, false, true,  true),
        ("one-to-many",                 false, true,  false, true),
        ("one-to-many",                 false, true,  true,  true),
        ("one-to-many",                 true,  false, false, true),
        ("one-to-many",                 true,  false, true,  true),
        ("one-to-many",                 true,  true,  false, true),
        ("one-to-many",                 true,  true,  true,  true),
        ("required one-to-many",        false, false, false, false),
        ("required one-to-many",        false, false, true,  true),
        ("required one-to-many",        false, true,  false, false),
        ("required one-to-many",        false, true,  true,  true),
        ("required one-to-many",        true,  false, false, false),
        ("required one-to-many",        true,  false, true,  true),
        ("required one-to-many",        true,  true,  false, false),
        ("required one-to-many",        true,  true,  true,  true),
        ("many-to-many",                false, false, false, true),
        ("many-to-many",                false, false, true,  true),
        ("many-to-many",                false, true,  false, true),
        ("many-to-many",                false, true,  true,  true),
        ("many-to-many",                true,  false, false, true),
        ("many-to-many",                true,  false, true,  true),
        ("many-to-many",                true,  true,  false, true),
        ("many-to-many",                true,  true,  true,  true),
        ("element collection",          false, false, false, true),
        ("element collection",          false, false, true,  true),
        ("element collection",          false, true,  false, true),
        ("element collection",          false, true,  true,  true),
        ("element collection",          true,  false, false, true),
        ("element collection",          true,  false, true,  true),
        ("element collection",          true,  true,  false, true),
        ("element collection",          true,  true,  true,  true)
    ];

    #[test]
    fn outer_join_truth_table() {
        assert_eq!(OUTER_JOIN.len(), 96);
        for &(case, for_selection, is_leaf, has_required, expected) in OUTER_JOIN {
            assert_eq!(
                requires_outer_join(&attribute(case), for_selection, is_leaf, has_required),
                expected,
                "{case} selection={for_selection} leaf={is_leaf} outer={has_required}"
            );
        }
    }

    #[test]
    fn outer_join_spot_checks() {
        let optional = Attribute::many_to_one("customer", "shop.Customer");
        let required = Attribute::many_to_one("customer", "shop.Customer").required();
        let collection = Attribute::one_to_many("items", "shop.Item");
        let inverse = Attribute::one_to_one("profile", "shop.Profile").mapped_by("owner");

        assert!(!requires_outer_join(&optional, false, true, false));
        assert!(requires_outer_join(&optional, true, true, false));
        assert!(requires_outer_join(&optional, false, false, false));
        assert!(!requires_outer_join(&required, false, false, false));
        assert!(requires_outer_join(&required, false, false, true));
        assert!(requires_outer_join(&collection, false, true, false));
        assert!(requires_outer_join(&inverse, false, true, false));
        assert!(!requires_outer_join(&Attribute::basic("name", ValueType::String), true, false, true));
    }

    #[test]
    fn basic_path_needs_no_join() {
        assert_eq!(
            render("country", false, PathOptimizationStrategy::Disabled),
            "SELECT o FROM Order o WHERE o.country IS NULL"
        );
    }

    #[test]
    fn optional_association_joins_left() {
        assert_eq!(
            render("customer.name", false, PathOptimizationStrategy::Disabled),
            "SELECT o FROM Order o LEFT JOIN o.customer c WHERE c.name IS NULL"
        );
    }

    #[test]
    fn required_association_joins_inner() {
        assert_eq!(
            render("seller.name", false, PathOptimizationStrategy::Disabled),
            "SELECT o FROM Order o INNER JOIN o.seller s WHERE s.name IS NULL"
        );
    }

    #[test]
    fn outer_join_is_sticky() {
        assert_eq!(
            render("customer.address.city", false, PathOptimizationStrategy::Disabled),
            "SELECT o FROM Order o LEFT JOIN o.customer c LEFT JOIN c.address a WHERE a.city IS NULL"
        );
    }

    #[test]
    fn leaf_association_in_predicate_is_implicit() {
        assert_eq!(
            render("customer", false, PathOptimizationStrategy::Disabled),
            "SELECT o FROM Order o WHERE o.customer IS NULL"
        );
        assert_eq!(
            render("customer", true, PathOptimizationStrategy::Disabled),
            "SELECT o FROM Order o LEFT JOIN o.customer c WHERE c IS NULL"
        );
    }

    #[test]
    fn collection_joins_left_and_nested_required_stays_left() {
        assert_eq!(
            render("lineItems.product.name", false, PathOptimizationStrategy::Disabled),
            "SELECT o FROM Order o LEFT JOIN o.lineItems l LEFT JOIN l.product p WHERE p.name IS NULL"
        );
    }

    #[test]
    fn foreign_key_optimization_skips_join() {
        assert_eq!(
            render("seller.id", false, PathOptimizationStrategy::ForeignKey),
            "SELECT o FROM Order o WHERE o.seller.id IS NULL"
        );
        assert_eq!(
            render("seller.id", false, PathOptimizationStrategy::Disabled),
            "SELECT o FROM Order o INNER JOIN o.seller s WHERE s.id IS NULL"
        );
        assert_eq!(
            render("customer.id", false, PathOptimizationStrategy::ForeignKey),
            "SELECT o FROM Order o WHERE o.customer.id IS NULL"
        );
    }
}

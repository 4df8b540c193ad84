// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Dynamic sort applied to a parsed select statement.

use entity_query_core::{NullHandling, Order, ReturnedType, Sort};

use super::check_sort_expression;
use crate::{
    error::QueryResult,
    parser::ast::{
        Expr, Fragment, OrderByClause, OrderItem, QuerySpec, QueryTerm, SelectItem, SelectStatement,
        Statement
    },
    token::{TOKEN_ASC, TOKEN_DESC, TOKEN_FIRST, TOKEN_LAST, TOKEN_NULLS, TOKEN_ORDER_BY}
};

/// Copy of `statement` with `sort` appended to its ORDER BY.
///
/// With set operations the ORDER BY lands on the last branch. A DTO
/// `returned_type` turns `select u` into `select new Dto(u.a, u.b)`.
pub(crate) fn apply(
    statement: &Statement,
    sort: &Sort,
    returned_type: &ReturnedType
) -> QueryResult<Statement> {
    let Statement::Select(select) = statement else {
        return Ok(statement.clone());
    };
    for order in sort {
        check_sort_expression(order)?;
    }
    let mut select = select.clone();
    if let ReturnedType::Dto {
        class_name,
        properties
    } = returned_type
        && !properties.is_empty()
    {
        rewrite_projection(&mut select, class_name, properties);
    }
    if sort.is_sorted()
        && let Some(spec) = last_spec_mut(&mut select)
    {
        append_orders(spec, sort);
    }
    Ok(Statement::Select(select))
}

fn last_spec_mut(statement: &mut SelectStatement) -> Option<&mut QuerySpec> {
    match statement.last_term_mut() {
        QueryTerm::Spec(spec) => Some(spec),
        QueryTerm::Nested(nested) => last_spec_mut(nested)
    }
}

fn append_orders(spec: &mut QuerySpec, sort: &Sort) {
    let alias = spec.primary_alias().map(str::to_owned);
    let known = known_aliases(spec);
    let items: Vec<OrderItem> = sort
        .iter()
        .map(|order| order_item(order, alias.as_deref(), &known))
        .collect();
    match &mut spec.order_by {
        Some(order_by) => order_by.items.extend(items),
        None => {
            spec.order_by = Some(OrderByClause {
                keyword: TOKEN_ORDER_BY.value().to_owned(),
                items
            });
        }
    }
}

/// Result variables of the select clause and join aliases.
fn known_aliases(spec: &QuerySpec) -> Vec<String> {
    let mut aliases: Vec<String> = spec
        .select
        .iter()
        .flat_map(|select| select.items.iter())
        .filter_map(|item| item.alias.clone())
        .collect();
    if let Some(from) = &spec.from {
        for root in from.roots.iter().skip(1) {
            aliases.extend(root.alias.clone());
        }
        for join in from.roots.iter().flat_map(|root| root.joins.iter()) {
            aliases.extend(join.alias.clone());
        }
    }
    aliases
}

/// ORDER BY item for `order`, qualified with `alias` unless `known` covers it.
pub(crate) fn order_item(order: &Order, alias: Option<&str>, known: &[String]) -> OrderItem {
    let property = order.property();
    let reference = match alias {
        Some(alias) if should_prefix(property, alias, known) => format!("{alias}.{property}"),
        _ => property.to_owned()
    };
    let expr = if order.is_ignore_case() {
        Expr::Function {
            name: "lower".to_owned(),
            args: vec![vec![Fragment::Expr(Expr::Raw(reference))]]
        }
    } else {
        Expr::Raw(reference)
    };
    let direction = if order.is_ascending() { TOKEN_ASC } else { TOKEN_DESC };
    let nulls = match order.null_handling() {
        NullHandling::Native => None,
        NullHandling::NullsFirst => Some(format!("{} {}", TOKEN_NULLS.value(), TOKEN_FIRST.value())),
        NullHandling::NullsLast => Some(format!("{} {}", TOKEN_NULLS.value(), TOKEN_LAST.value()))
    };
    OrderItem {
        expr,
        direction: Some(direction.value().to_owned()),
        nulls
    }
}

fn should_prefix(property: &str, alias: &str, known: &[String]) -> bool {
    let qualified_by = |prefix: &str| {
        property == prefix
            || property
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('.'))
    };
    !property.contains('(') && !qualified_by(alias) && !known.iter().any(|k| qualified_by(k.as_str()))
}

/// `select u` becomes `select new Dto(u.a, …)`.
fn rewrite_projection(statement: &mut SelectStatement, class_name: &str, properties: &[String]) {
    let QueryTerm::Spec(spec) = &mut statement.first else {
        return;
    };
    let Some(alias) = spec.primary_alias().map(str::to_owned) else {
        return;
    };
    let Some(select) = &mut spec.select else {
        return;
    };
    let selects_alias = select.items.len() == 1
        && select.items[0].expr.as_path().is_some_and(|path| path == alias);
    if !selects_alias {
        return;
    }
    select.items = vec![SelectItem {
        expr:  Expr::Constructor {
            new_kw: "new".to_owned(),
            class:  class_name.to_owned(),
            args:   properties
                .iter()
                .map(|p| Expr::Path(vec![alias.clone(), p.clone()]))
                .collect()
        },
        as_kw: None,
        alias: None
    }];
}

#[cfg(test)]
mod tests {
    use entity_query_core::Direction;

    use super::*;
    use crate::{
        enhancer::render,
        parser::{Dialect, parse}
    };

    fn sorted(query: &str, sort: &Sort) -> String {
        let statement = parse(query, Dialect::Jpql).expect("valid");
        render::statement(&apply(&statement, sort, &ReturnedType::Domain).expect("sorted")).render()
    }

    #[test]
    fn adds_order_by_with_alias() {
        assert_eq!(
            sorted("select u from User u", &Sort::by(["name"])),
            "select u from User u order by u.name asc"
        );
    }

    #[test]
    fn extends_existing_order_by() {
        assert_eq!(
            sorted(
                "select u from User u order by u.lastname",
                &Sort::by_orders(vec![Order::desc("firstname")])
            ),
            "select u from User u order by u.lastname, u.firstname desc"
        );
    }

    #[test]
    fn keeps_result_variables_and_join_aliases() {
        assert_eq!(
            sorted(
                "select u.name as n from User u join u.roles r",
                &Sort::by(["n", "r.title", "u.age"])
            ),
            "select u.name as n from User u join u.roles r order by n asc, r.title asc, u.age asc"
        );
    }

    #[test]
    fn ignore_case_and_null_handling() {
        let sort = Sort::by_orders(vec![
            Order::asc("name").ignore_case().with_null_handling(NullHandling::NullsLast),
        ]);
        assert_eq!(
            sorted("select u from User u", &sort),
            "select u from User u order by lower(u.name) asc NULLS LAST"
        );
    }

    #[test]
    fn unsafe_expression_passes_unchanged() {
        let sort = Sort::by_orders(vec![Order::unsafe_expression("LENGTH(u.name)", Direction::Desc)]);
        assert_eq!(
            sorted("select u from User u", &sort),
            "select u from User u order by LENGTH(u.name) desc"
        );
    }

    #[test]
    fn rejects_unsafe_property() {
        let statement = parse("select u from User u", Dialect::Jpql).expect("valid");
        let err = apply(&statement, &Sort::by(["name; drop"]), &ReturnedType::Domain).expect_err("unsafe");
        assert!(err.to_string().starts_with("Sort expression 'name; drop: ASC'"));
    }

    #[test]
    fn order_by_goes_on_last_union_branch() {
        assert_eq!(
            sorted("select u from User u union select a from Admin a", &Sort::by(["name"])),
            "select u from User u union select a from Admin a order by a.name asc"
        );
    }

    #[test]
    fn dto_projection_rewrite() {
        let statement = parse("select u from User u", Dialect::Jpql).expect("valid");
        let rewritten = apply(
            &statement,
            &Sort::unsorted(),
            &ReturnedType::dto("com.example.UserDto", ["name", "age"])
        )
        .expect("rewritten");
        assert_eq!(
            render::statement(&rewritten).render(),
            "select new com.example.UserDto(u.name, u.age) from User u"
        );
    }
}

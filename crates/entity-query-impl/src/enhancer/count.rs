// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Count query derivation from a parsed select statement.

use crate::{
    error::{QueryError, QueryResult},
    parser::ast::{Expr, Fragment, QuerySpec, QueryTerm, SelectClause, SelectItem, SelectStatement, Statement},
    token::TOKEN_DOUBLE_UNDERSCORE
};

/// Synthetic alias given to alias-less HQL roots.
fn synthetic_alias() -> String {
    TOKEN_DOUBLE_UNDERSCORE.value().to_owned()
}

/// Count variant of `statement`.
///
/// ORDER BY is removed from every top-level branch. CTEs are kept.
///
/// # Arguments
///
/// * `statement` — Parsed select statement
/// * `projection` — Expression counted instead of the derived one
pub(crate) fn derive(statement: &Statement, projection: Option<&str>) -> QueryResult<Statement> {
    let Statement::Select(select) = statement else {
        return Err(QueryError::InvalidQuery(
            "Cannot derive a count query from a modifying query".to_owned()
        ));
    };
    let mut select = select.clone();
    transform_statement(&mut select, projection);
    Ok(Statement::Select(select))
}

fn transform_term(term: &mut QueryTerm, projection: Option<&str>) {
    match term {
        QueryTerm::Spec(spec) => transform_spec(spec, projection),
        QueryTerm::Nested(nested) => transform_statement(nested, projection)
    }
}

fn transform_statement(statement: &mut SelectStatement, projection: Option<&str>) {
    transform_term(&mut statement.first, projection);
    for operation in &mut statement.set_operations {
        transform_term(&mut operation.term, projection);
    }
}

fn transform_spec(spec: &mut QuerySpec, projection: Option<&str>) {
    spec.order_by = None;

    if spec.primary_alias().is_none()
        && spec.select.is_none()
        && let Some(root) = spec.from.as_mut().and_then(|from| from.roots.first_mut())
    {
        root.alias = Some(synthetic_alias());
    }
    let alias = spec.primary_alias().map_or_else(synthetic_alias, str::to_owned);

    let (keyword, distinct, items) = match spec.select.take() {
        Some(SelectClause {
            keyword,
            distinct,
            items
        }) => (keyword, distinct, items),
        None => ("select".to_owned(), None, Vec::new())
    };

    if projection.is_none() && items.len() == 1 && items[0].expr.is_count() {
        spec.select = Some(SelectClause {
            keyword,
            distinct,
            items
        });
        return;
    }

    let mut argument = Vec::new();
    match projection {
        Some(projection) => argument.push(Fragment::Expr(Expr::Raw(projection.to_owned()))),
        None => {
            if let Some(distinct) = distinct {
                argument.push(Fragment::Word(distinct));
            }
            let counted = match items.as_slice() {
                [SelectItem {
                    expr: path @ Expr::Path(_),
                    ..
                }] => path.clone(),
                _ => Expr::Path(vec![alias])
            };
            argument.push(Fragment::Expr(counted));
        }
    }

    spec.select = Some(SelectClause {
        keyword,
        distinct: None,
        items: vec![SelectItem {
            expr:  Expr::Function {
                name: "count".to_owned(),
                args: vec![argument]
            },
            as_kw: None,
            alias: None
        }]
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        enhancer::render,
        parser::{Dialect, parse}
    };

    fn count(query: &str, dialect: Dialect, projection: Option<&str>) -> String {
        let statement = parse(query, dialect).expect("valid");
        render::statement(&derive(&statement, projection).expect("count")).render()
    }

    #[test]
    fn counts_alias() {
        assert_eq!(
            count("SELECT u FROM User u WHERE u.age > 18 ORDER BY u.name", Dialect::Jpql, None),
            "SELECT count(u) FROM User u WHERE u.age > 18"
        );
    }

    #[test]
    fn counts_single_column() {
        assert_eq!(
            count("SELECT u.name FROM User u WHERE u.active = true", Dialect::Jpql, None),
            "SELECT count(u.name) FROM User u WHERE u.active = true"
        );
    }

    #[test]
    fn keeps_distinct() {
        assert_eq!(
            count("select distinct u.name from User u", Dialect::Jpql, None),
            "select count(distinct u.name) from User u"
        );
        assert_eq!(
            count("select distinct u, r from User u join u.roles r", Dialect::Jpql, None),
            "select count(distinct u) from User u join u.roles r"
        );
    }

    #[test]
    fn constructor_counts_alias() {
        assert_eq!(
            count("select new com.example.Dto(u.name) from User u", Dialect::Jpql, None),
            "select count(u) from User u"
        );
    }

    #[test]
    fn explicit_projection() {
        assert_eq!(
            count("select u from User u", Dialect::Jpql, Some("u.id")),
            "select count(u.id) from User u"
        );
    }

    #[test]
    fn idempotent_on_count_query() {
        let query = "select count(u) from User u";
        assert_eq!(count(query, Dialect::Jpql, None), query);
    }

    #[test]
    fn hql_without_select_or_alias() {
        assert_eq!(count("from User u", Dialect::Hql, None), "select count(u) from User u");
        assert_eq!(
            count("from User where name = :name", Dialect::Hql, None),
            "select count(__) from User __ where name = :name"
        );
    }

    #[test]
    fn keeps_cte() {
        assert_eq!(
            count(
                "with recent as (select u.id from User u) select r from recent r order by r.id",
                Dialect::Hql,
                None
            ),
            "with recent as (select u.id from User u) select count(r) from recent r"
        );
    }

    #[test]
    fn modifying_query_is_rejected() {
        let statement = parse("delete from User u", Dialect::Jpql).expect("valid");
        assert!(derive(&statement, None).is_err());
    }
}

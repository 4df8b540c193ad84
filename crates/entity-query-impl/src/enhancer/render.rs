// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Syntax tree to token stream.
//!
//! Words render as expression tokens so that neighbours are spaced; paths,
//! literals and punctuation render as plain tokens. Function calls and
//! parenthesized groups keep their content inline.

use crate::{
    parser::ast::{
        Condition, DeleteStatement, Expr, Fragment, FromClause, FromRoot, InList, Join,
        OrderByClause, OrderItem, QuerySpec, QueryTerm, RootSource, SelectClause, SelectItem,
        SelectStatement, Statement, UpdateStatement
    },
    token::{
        QueryRenderer, QueryRendererBuilder, TOKEN_CLOSE_PAREN, TOKEN_COMMA, TOKEN_OPEN_PAREN,
        expression, token
    }
};

fn word(value: &str) -> QueryRenderer {
    QueryRenderer::from_token(expression(value))
}

fn plain(value: &str) -> QueryRenderer {
    QueryRenderer::from_token(token(value))
}

/// `(` content `)` with the content glued to the parentheses.
fn parenthesized(content: QueryRenderer) -> QueryRenderer {
    let mut builder = QueryRendererBuilder::from_token(TOKEN_OPEN_PAREN);
    builder.append_inline(content);
    builder.append(TOKEN_CLOSE_PAREN);
    builder.build()
}

/// Comma separated list.
pub(crate) fn list<'a, T: 'a>(
    items: impl IntoIterator<Item = &'a T>,
    render: impl Fn(&'a T) -> QueryRenderer
) -> QueryRenderer {
    QueryRendererBuilder::concat(
        items,
        |item| {
            let mut builder = QueryRendererBuilder::new();
            builder.append_expression(render(item));
            builder
        },
        TOKEN_COMMA
    )
    .build()
}

/// Render a statement.
pub(crate) fn statement(statement: &Statement) -> QueryRenderer {
    match statement {
        Statement::Select(select) => select_statement(select),
        Statement::Update(update) => update_statement(update),
        Statement::Delete(delete) => delete_statement(delete)
    }
}

/// Render a select statement with its CTEs and set operations.
pub(crate) fn select_statement(statement: &SelectStatement) -> QueryRenderer {
    let mut builder = QueryRendererBuilder::new();
    if let Some(with) = &statement.with {
        builder.append_expression(word(&with.keyword));
        builder.append_expression(list(&with.ctes, |cte| {
            let mut cte_builder = QueryRendererBuilder::new();
            cte_builder.append_expression(plain(&cte.name));
            cte_builder.append_expression(word(&cte.as_kw));
            cte_builder.append_expression(parenthesized(select_statement(&cte.query)));
            cte_builder.build()
        }));
    }
    builder.append_expression(query_term(&statement.first));
    for operation in &statement.set_operations {
        builder.append_expression(word(&operation.words));
        builder.append_expression(query_term(&operation.term));
    }
    builder.build()
}

fn query_term(term: &QueryTerm) -> QueryRenderer {
    match term {
        QueryTerm::Spec(spec) => query_spec(spec),
        QueryTerm::Nested(nested) => parenthesized(select_statement(nested))
    }
}

/// Render a single query block.
pub(crate) fn query_spec(spec: &QuerySpec) -> QueryRenderer {
    let mut builder = QueryRendererBuilder::new();
    if let Some(select) = &spec.select {
        builder.append_expression(select_clause(select));
    }
    if let Some(from) = &spec.from {
        builder.append_expression(from_clause(from));
    }
    if let Some(where_clause) = &spec.where_clause {
        builder.append_expression(condition(where_clause));
    }
    if let Some(group_by) = &spec.group_by {
        builder.append_expression(word(&group_by.keyword));
        builder.append_expression(list(&group_by.items, expr));
    }
    if let Some(having) = &spec.having {
        builder.append_expression(condition(having));
    }
    if let Some(order_by) = &spec.order_by {
        builder.append_expression(order_by_clause(order_by));
    }
    for fragment in &spec.paging {
        builder.append_expression(self::fragment(fragment));
    }
    builder.build()
}

/// Render `SELECT [DISTINCT] items`.
pub(crate) fn select_clause(select: &SelectClause) -> QueryRenderer {
    let mut builder = QueryRendererBuilder::new();
    builder.append_expression(word(&select.keyword));
    if let Some(distinct) = &select.distinct {
        builder.append_expression(word(distinct));
    }
    builder.append_expression(list(&select.items, select_item));
    builder.build()
}

fn select_item(item: &SelectItem) -> QueryRenderer {
    let mut builder = QueryRendererBuilder::new();
    builder.append_expression(expr(&item.expr));
    if let Some(as_kw) = &item.as_kw {
        builder.append_expression(word(as_kw));
    }
    if let Some(alias) = &item.alias {
        builder.append_expression(plain(alias));
    }
    builder.build()
}

fn from_clause(from: &FromClause) -> QueryRenderer {
    let mut builder = QueryRendererBuilder::new();
    builder.append_expression(word(&from.keyword));
    builder.append_expression(list(&from.roots, from_root));
    builder.build()
}

fn from_root(root: &FromRoot) -> QueryRenderer {
    let mut builder = QueryRendererBuilder::new();
    match &root.source {
        RootSource::Entity(name) => {
            builder.append_expression(plain(name));
        }
        RootSource::Collection {
            keyword,
            path
        } => {
            let mut collection = QueryRendererBuilder::from_token(token(keyword.as_str()));
            collection.append_renderer(parenthesized(expr(path)));
            builder.append_expression(collection.build());
        }
        RootSource::Subquery(query) => {
            builder.append_expression(parenthesized(select_statement(query)));
        }
    }
    append_alias(&mut builder, root.as_kw.as_deref(), root.alias.as_deref());
    for join in &root.joins {
        builder.append_expression(self::join(join));
    }
    builder.build()
}

fn join(join: &Join) -> QueryRenderer {
    let mut builder = QueryRendererBuilder::new();
    builder.append_expression(word(&join.words));
    builder.append_expression(expr(&join.target));
    append_alias(&mut builder, join.as_kw.as_deref(), join.alias.as_deref());
    if let Some(on) = &join.condition {
        builder.append_expression(condition(on));
    }
    builder.build()
}

fn append_alias(builder: &mut QueryRendererBuilder, as_kw: Option<&str>, alias: Option<&str>) {
    if let Some(as_kw) = as_kw {
        builder.append_expression(word(as_kw));
    }
    if let Some(alias) = alias {
        builder.append_expression(plain(alias));
    }
}

fn condition(condition: &Condition) -> QueryRenderer {
    let mut builder = QueryRendererBuilder::new();
    builder.append_expression(word(&condition.keyword));
    builder.append_expression(expr(&condition.expr));
    builder.build()
}

fn order_by_clause(order_by: &OrderByClause) -> QueryRenderer {
    let mut builder = QueryRendererBuilder::new();
    builder.append_expression(word(&order_by.keyword));
    builder.append_expression(list(&order_by.items, order_item));
    builder.build()
}

/// Render `expr [ASC|DESC] [NULLS FIRST|LAST]`.
pub(crate) fn order_item(item: &OrderItem) -> QueryRenderer {
    let mut builder = QueryRendererBuilder::new();
    builder.append_expression(expr(&item.expr));
    if let Some(direction) = &item.direction {
        builder.append_expression(word(direction));
    }
    if let Some(nulls) = &item.nulls {
        builder.append_expression(word(nulls));
    }
    builder.build()
}

fn update_statement(update: &UpdateStatement) -> QueryRenderer {
    let mut builder = QueryRendererBuilder::new();
    builder.append_expression(word(&update.keyword));
    builder.append_expression(plain(&update.entity));
    append_alias(&mut builder, update.as_kw.as_deref(), update.alias.as_deref());
    builder.append_expression(word(&update.set_kw));
    builder.append_expression(list(&update.assignments, |(target, value)| {
        let mut assignment = QueryRendererBuilder::new();
        assignment.append_expression(expr(target));
        assignment.append_expression(word("="));
        assignment.append_expression(expr(value));
        assignment.build()
    }));
    if let Some(where_clause) = &update.where_clause {
        builder.append_expression(condition(where_clause));
    }
    builder.build()
}

fn delete_statement(delete: &DeleteStatement) -> QueryRenderer {
    let mut builder = QueryRendererBuilder::new();
    builder.append_expression(word(&delete.words));
    builder.append_expression(plain(&delete.entity));
    append_alias(&mut builder, delete.as_kw.as_deref(), delete.alias.as_deref());
    if let Some(where_clause) = &delete.where_clause {
        builder.append_expression(condition(where_clause));
    }
    builder.build()
}

fn fragment(fragment: &Fragment) -> QueryRenderer {
    match fragment {
        Fragment::Word(value) => word(value),
        Fragment::Expr(value) => expr(value)
    }
}

fn fragments(fragments: &[Fragment]) -> QueryRenderer {
    let mut builder = QueryRendererBuilder::new();
    for item in fragments {
        builder.append_expression(fragment(item));
    }
    builder.build()
}

/// `name(args)` with arguments glued to the parentheses.
pub(crate) fn call(name: &str, args: QueryRenderer) -> QueryRenderer {
    let mut builder = QueryRendererBuilder::from_token(token(name));
    builder.append_renderer(parenthesized(args));
    builder.build()
}

/// Render an expression.
pub(crate) fn expr(value: &Expr) -> QueryRenderer {
    match value {
        Expr::Path(segments) => plain(&segments.join(".")),
        Expr::Parameter(text) | Expr::Literal(text) | Expr::Raw(text) => plain(text),
        Expr::Star => plain("*"),
        Expr::Function {
            name,
            args
        } => call(name, list(args, |arg| fragments(arg))),
        Expr::Unary {
            op,
            operand
        } => {
            let mut builder = QueryRendererBuilder::new();
            if op == "-" || op == "+" {
                builder.append(token(op.as_str()));
                builder.append_inline(expr(operand));
            } else {
                builder.append_expression(word(op));
                builder.append_expression(expr(operand));
            }
            builder.build()
        }
        Expr::Binary {
            left,
            op,
            right
        } => spaced([expr(left), word(op), expr(right)]),
        Expr::Between {
            expr: tested,
            words,
            low,
            and_kw,
            high
        } => spaced([expr(tested), word(words), expr(low), word(and_kw), expr(high)]),
        Expr::Like {
            expr: tested,
            words,
            pattern,
            escape
        } => {
            let mut parts = vec![expr(tested), word(words), expr(pattern)];
            if let Some((escape_kw, character)) = escape {
                parts.push(word(escape_kw));
                parts.push(expr(character));
            }
            spaced(parts)
        }
        Expr::In {
            expr: tested,
            words,
            list: candidates
        } => {
            let candidates = match candidates {
                InList::Values(values) => parenthesized(list(values, expr)),
                InList::Subquery(query) => parenthesized(select_statement(query)),
                InList::Single(single) => expr(single)
            };
            spaced([expr(tested), word(words), candidates])
        }
        Expr::Is {
            expr: tested,
            words,
            right
        } => {
            let mut parts = vec![expr(tested), word(words)];
            if let Some(right) = right {
                parts.push(expr(right));
            }
            spaced(parts)
        }
        Expr::Member {
            expr: tested,
            words,
            collection
        } => spaced([expr(tested), word(words), expr(collection)]),
        Expr::Case {
            keyword,
            operand,
            whens,
            otherwise,
            end_kw
        } => {
            let mut parts = vec![word(keyword)];
            if let Some(operand) = operand {
                parts.push(expr(operand));
            }
            for when in whens {
                parts.push(word(&when.when_kw));
                parts.push(expr(&when.condition));
                parts.push(word(&when.then_kw));
                parts.push(expr(&when.result));
            }
            if let Some((else_kw, value)) = otherwise {
                parts.push(word(else_kw));
                parts.push(expr(value));
            }
            parts.push(word(end_kw));
            spaced(parts)
        }
        Expr::Quantified {
            keyword,
            query
        } => spaced([word(keyword), parenthesized(select_statement(query))]),
        Expr::Subquery(query) => parenthesized(select_statement(query)),
        Expr::Nested(inner) => parenthesized(expr(inner)),
        Expr::Tuple(items) => parenthesized(list(items, expr)),
        Expr::Constructor {
            new_kw,
            class,
            args
        } => spaced([word(new_kw), call(class, list(args, expr))])
    }
}

/// Renderers separated by single spaces.
pub(crate) fn spaced(parts: impl IntoIterator<Item = QueryRenderer>) -> QueryRenderer {
    let mut builder = QueryRendererBuilder::new();
    for part in parts {
        builder.append_expression(part);
    }
    builder.build()
}

// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! JPQL select builder for derived queries.
//!
//! A [`SelectQuery`] holds the selection, the join graph, the predicate and
//! the ORDER BY items of one derived query. Paths reference their
//! [`Origin`], so aliases are only resolved when the query is rendered.
//!
//! # Overview
//!
//! - [`SelectQuery`] — Query under construction
//! - [`Selection`] — What the query returns
//! - [`Predicate`] — WHERE clause tree
//! - [`Expression`] — Operand of a predicate or ORDER BY item
//! - [`PathExpression`] — Property reference relative to an origin

use entity_query_core::{NullHandling, Order};

use crate::{
    enhancer::render::{call, list, spaced},
    token::{QueryRenderer, QueryRendererBuilder, TOKEN_ASC, TOKEN_DESC, expression, token}
};

/// Root entity or one of the joins of a [`SelectQuery`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Entity in the FROM clause.
    Root,

    /// Join at the given index.
    Join(usize)
}

/// Join flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinType {
    /// `INNER JOIN`
    Inner,

    /// `LEFT JOIN`
    Left
}

impl JoinType {
    /// JPQL keywords.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN"
        }
    }
}

/// Join of an association path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    join_type: JoinType,
    source:    Origin,
    path:      String,
    alias:     String
}

impl Join {
    /// Join flavour.
    pub const fn join_type(&self) -> JoinType {
        self.join_type
    }

    /// Origin the path starts at.
    pub const fn source(&self) -> Origin {
        self.source
    }

    /// Joined path relative to the source.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Identification variable of the join.
    pub fn alias(&self) -> &str {
        &self.alias
    }
}

/// Property reference relative to an [`Origin`].
///
/// An empty path references the origin itself, e.g. a joined collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpression {
    origin: Origin,
    path:   String,
    name:   String
}

impl PathExpression {
    /// Path `path` below `origin`, selected as `name`.
    pub fn new(origin: Origin, path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            origin,
            path: path.into(),
            name: name.into()
        }
    }

    /// Origin of the path.
    pub const fn origin(&self) -> Origin {
        self.origin
    }

    /// Dot path below the origin.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Leaf property name, used as result variable in tuple selections.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Operand of a predicate or ORDER BY item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    /// Property reference.
    Path(PathExpression),

    /// Positional parameter `?n`.
    Parameter(usize),

    /// Literal text such as `TRUE`.
    Literal(String),

    /// Single argument function such as `UPPER(x)`.
    Function {
        /// Function name.
        name: String,

        /// Argument.
        argument: Box<Expression>
    }
}

impl Expression {
    /// Wrap in `name(…)`.
    pub fn function(name: &str, argument: Expression) -> Self {
        Self::Function {
            name:     name.to_owned(),
            argument: Box::new(argument)
        }
    }
}

impl From<PathExpression> for Expression {
    fn from(path: PathExpression) -> Self {
        Self::Path(path)
    }
}

/// WHERE clause tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `left op right`
    Compare {
        /// Left operand.
        left: Expression,

        /// Comparison operator.
        operator: &'static str,

        /// Right operand.
        right: Expression
    },

    /// `left [NOT] LIKE right ESCAPE 'c'`
    Like {
        /// Compared expression.
        left: Expression,

        /// `NOT LIKE`.
        negated: bool,

        /// Pattern.
        right: Expression,

        /// Escape character.
        escape: char
    },

    /// `expr BETWEEN lower AND upper`
    Between {
        /// Tested expression.
        expr: Expression,

        /// Lower bound.
        lower: Expression,

        /// Upper bound.
        upper: Expression
    },

    /// `expr [NOT] IN (values)`
    In {
        /// Tested expression.
        expr: Expression,

        /// `NOT IN`.
        negated: bool,

        /// Collection parameter.
        values: Expression
    },

    /// `value [NOT] MEMBER OF collection`
    MemberOf {
        /// Element parameter.
        value: Expression,

        /// `NOT MEMBER OF`.
        negated: bool,

        /// Collection path.
        collection: Expression
    },

    /// `expr IS NULL`, `expr IS NOT EMPTY` and friends.
    Is {
        /// Tested expression.
        expr: Expression,

        /// Words after `IS`.
        test: &'static str
    },

    /// Conjunction.
    And(Box<Predicate>, Box<Predicate>),

    /// Disjunction.
    Or(Box<Predicate>, Box<Predicate>),

    /// Parenthesized predicate.
    Nested(Box<Predicate>)
}

impl Predicate {
    /// `self AND other`
    #[must_use]
    pub fn and(self, other: Predicate) -> Self {
        Self::And(Box::new(self), Box::new(other))
    }

    /// `self OR other`
    #[must_use]
    pub fn or(self, other: Predicate) -> Self {
        Self::Or(Box::new(self), Box::new(other))
    }

    /// `(self)`
    #[must_use]
    pub fn nested(self) -> Self {
        match self {
            nested @ Self::Nested(_) => nested,
            other => Self::Nested(Box::new(other))
        }
    }
}

/// What a [`SelectQuery`] returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The root entity.
    Entity,

    /// `COUNT` of the root entity.
    Count,

    /// Tuple of paths, each selected under its leaf name.
    Paths(Vec<PathExpression>),

    /// `new Class(paths…)`
    Constructor {
        /// Fully qualified result class.
        class_name: String,

        /// Constructor arguments.
        paths: Vec<PathExpression>
    }
}

/// ORDER BY item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderExpression {
    expression: Expression,
    order:      Order
}

impl OrderExpression {
    /// Order `expression` the way `order` requests.
    pub fn new(expression: Expression, order: Order) -> Self {
        Self {
            expression,
            order
        }
    }
}

/// Derived select query under construction.
///
/// # Example
///
/// ```rust,ignore
/// let mut query = SelectQuery::new("com.acme.Order", "Order", Selection::Entity);
/// let items = query.join(JoinType::Left, Origin::Root, "lineItems");
/// query.set_predicate(Predicate::Compare {
///     left:     PathExpression::new(items, "quantity", "quantity").into(),
///     operator: ">",
///     right:    Expression::Parameter(1)
/// });
///
/// assert_eq!(
///     query.render(),
///     "SELECT o FROM com.acme.Order o LEFT JOIN o.lineItems l WHERE l.quantity > ?1"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectQuery {
    entity_name: String,
    alias:       String,
    selection:   Selection,
    distinct:    bool,
    joins:       Vec<Join>,
    predicate:   Option<Predicate>,
    order_by:    Vec<OrderExpression>,
    fallbacks:   usize
}

impl SelectQuery {
    /// Query over `entity_name`, aliased after the first letter of
    /// `simple_name`.
    ///
    /// # Arguments
    ///
    /// * `entity_name` — Name of the entity in query text
    /// * `simple_name` — Unqualified type name
    /// * `selection` — Result shape
    pub fn new(entity_name: &str, simple_name: &str, selection: Selection) -> Self {
        let alias = simple_name
            .chars()
            .next()
            .filter(|c| c.is_alphabetic() || *c == '_')
            .map_or_else(|| "r".to_owned(), |c| c.to_lowercase().collect());
        Self {
            entity_name: entity_name.to_owned(),
            alias,
            selection,
            distinct: false,
            joins: Vec::new(),
            predicate: None,
            order_by: Vec::new(),
            fallbacks: 0
        }
    }

    /// Select distinct results.
    #[must_use]
    pub fn distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    /// Replace the result shape.
    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
    }

    /// Select distinct results.
    pub fn set_distinct(&mut self, distinct: bool) {
        self.distinct = distinct;
    }

    /// Identification variable of the root entity.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Result shape.
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Joins in creation order.
    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    /// Join `path` from `source`, reusing an identical join.
    pub fn join(&mut self, join_type: JoinType, source: Origin, path: &str) -> Origin {
        if let Some(index) = self
            .joins
            .iter()
            .position(|j| j.join_type == join_type && j.source == source && j.path == path)
        {
            return Origin::Join(index);
        }
        let alias = self.next_alias(path);
        self.joins.push(Join {
            join_type,
            source,
            path: path.to_owned(),
            alias
        });
        Origin::Join(self.joins.len() - 1)
    }

    fn next_alias(&mut self, path: &str) -> String {
        let name = path.rsplit('.').next().unwrap_or(path);
        let candidate: Option<String> = name
            .chars()
            .next()
            .filter(|c| c.is_alphabetic() || *c == '_')
            .map(|c| c.to_lowercase().collect());
        match candidate {
            Some(alias) if alias != self.alias && self.joins.iter().all(|j| j.alias != alias) => alias,
            _ => {
                let alias = format!("join_{}", self.fallbacks);
                self.fallbacks += 1;
                alias
            }
        }
    }

    /// Replace the WHERE clause.
    pub fn set_predicate(&mut self, predicate: Predicate) {
        self.predicate = Some(predicate);
    }

    /// WHERE clause.
    pub const fn predicate(&self) -> Option<&Predicate> {
        self.predicate.as_ref()
    }

    /// Append an ORDER BY item.
    pub fn order_by(&mut self, order: OrderExpression) {
        self.order_by.push(order);
    }

    fn origin_alias(&self, origin: Origin) -> &str {
        match origin {
            Origin::Root => &self.alias,
            Origin::Join(index) => self.joins.get(index).map_or(self.alias.as_str(), |j| j.alias.as_str())
        }
    }

    fn path(&self, path: &PathExpression) -> QueryRenderer {
        let alias = self.origin_alias(path.origin);
        if path.path.is_empty() {
            QueryRenderer::from_token(token(alias))
        } else {
            QueryRenderer::from_token(token(format!("{alias}.{}", path.path)))
        }
    }

    fn expression(&self, value: &Expression) -> QueryRenderer {
        match value {
            Expression::Path(path) => self.path(path),
            Expression::Parameter(position) => QueryRenderer::from_token(token(format!("?{position}"))),
            Expression::Literal(text) => QueryRenderer::from_token(token(text.as_str())),
            Expression::Function {
                name,
                argument
            } => call(name, self.expression(argument))
        }
    }

    fn predicate_renderer(&self, predicate: &Predicate) -> QueryRenderer {
        let word = |w: &str| QueryRenderer::from_token(expression(w));
        match predicate {
            Predicate::Compare {
                left,
                operator,
                right
            } => spaced([self.expression(left), word(operator), self.expression(right)]),
            Predicate::Like {
                left,
                negated,
                right,
                escape
            } => spaced([
                self.expression(left),
                word(if *negated { "NOT LIKE" } else { "LIKE" }),
                self.expression(right),
                word("ESCAPE"),
                QueryRenderer::from_token(token(format!("'{escape}'")))
            ]),
            Predicate::Between {
                expr,
                lower,
                upper
            } => spaced([
                self.expression(expr),
                word("BETWEEN"),
                self.expression(lower),
                word("AND"),
                self.expression(upper)
            ]),
            Predicate::In {
                expr,
                negated,
                values
            } => spaced([
                self.expression(expr),
                word(if *negated { "NOT IN" } else { "IN" }),
                parenthesized(self.expression(values))
            ]),
            Predicate::MemberOf {
                value,
                negated,
                collection
            } => spaced([
                self.expression(value),
                word(if *negated { "NOT MEMBER OF" } else { "MEMBER OF" }),
                self.expression(collection)
            ]),
            Predicate::Is {
                expr,
                test
            } => spaced([self.expression(expr), word("IS"), word(test)]),
            Predicate::And(left, right) => spaced([
                self.predicate_renderer(left),
                word("AND"),
                self.predicate_renderer(right)
            ]),
            Predicate::Or(left, right) => spaced([
                self.predicate_renderer(left),
                word("OR"),
                self.predicate_renderer(right)
            ]),
            Predicate::Nested(inner) => parenthesized(self.predicate_renderer(inner))
        }
    }

    fn selection_renderer(&self) -> QueryRenderer {
        let alias = QueryRenderer::from_token(token(self.alias.as_str()));
        let selection = match &self.selection {
            Selection::Entity => alias,
            Selection::Count => {
                let argument = if self.distinct {
                    spaced([QueryRenderer::from_token(expression("DISTINCT")), alias])
                } else {
                    alias
                };
                return call("COUNT", argument);
            }
            Selection::Paths(paths) => list(paths, |path| {
                spaced([self.path(path), QueryRenderer::from_token(token(path.name.as_str()))])
            }),
            Selection::Constructor {
                class_name,
                paths
            } => spaced([
                QueryRenderer::from_token(expression("new")),
                call(class_name, list(paths, |path| self.path(path)))
            ])
        };
        if self.distinct {
            spaced([QueryRenderer::from_token(expression("DISTINCT")), selection])
        } else {
            selection
        }
    }

    fn order_renderer(&self, item: &OrderExpression) -> QueryRenderer {
        let direction = if item.order.is_ascending() { TOKEN_ASC } else { TOKEN_DESC };
        let mut builder = QueryRendererBuilder::new();
        builder.append_expression(self.expression(&item.expression));
        builder.append_expression(QueryRenderer::from_token(direction));
        match item.order.null_handling() {
            NullHandling::Native => {}
            NullHandling::NullsFirst => {
                builder.append_expression(QueryRenderer::from_token(expression("NULLS FIRST")));
            }
            NullHandling::NullsLast => {
                builder.append_expression(QueryRenderer::from_token(expression("NULLS LAST")));
            }
        }
        builder.build()
    }

    /// Token stream of the query.
    pub fn renderer(&self) -> QueryRenderer {
        let word = |w: &str| QueryRenderer::from_token(expression(w));
        let mut builder = QueryRendererBuilder::new();
        builder.append_expression(word("SELECT"));
        builder.append_expression(self.selection_renderer());
        builder.append_expression(word("FROM"));
        builder.append_expression(QueryRenderer::from_token(token(self.entity_name.as_str())));
        builder.append_expression(QueryRenderer::from_token(token(self.alias.as_str())));
        for join in &self.joins {
            builder.append_expression(word(join.join_type.as_str()));
            builder.append_expression(QueryRenderer::from_token(token(format!(
                "{}.{}",
                self.origin_alias(join.source),
                join.path
            ))));
            builder.append_expression(QueryRenderer::from_token(token(join.alias.as_str())));
        }
        if let Some(predicate) = &self.predicate {
            builder.append_expression(word("WHERE"));
            builder.append_expression(self.predicate_renderer(predicate));
        }
        if !self.order_by.is_empty() {
            builder.append_expression(word("ORDER BY"));
            builder.append_expression(list(&self.order_by, |item| self.order_renderer(item)));
        }
        builder.build()
    }

    /// Query text.
    pub fn render(&self) -> String {
        self.renderer().render()
    }
}

fn parenthesized(content: QueryRenderer) -> QueryRenderer {
    call("", content)
}

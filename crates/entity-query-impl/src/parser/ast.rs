// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Syntax tree of JPQL, HQL and EQL statements.
//!
//! Keywords are stored as written so that a rendered tree reproduces the
//! query's own casing. Multi-word keywords (`ORDER BY`, `LEFT OUTER JOIN`,
//! `IS NOT NULL`) are joined with single spaces.

/// Top-level statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `SELECT …`, including select-less HQL queries.
    Select(SelectStatement),

    /// `UPDATE … SET …`
    Update(UpdateStatement),

    /// `DELETE FROM …`
    Delete(DeleteStatement)
}

/// Select query with optional CTEs and set operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectStatement {
    /// `WITH` prologue.
    pub with: Option<WithClause>,

    /// First query term.
    pub first: QueryTerm,

    /// `UNION …` branches following the first term.
    pub set_operations: Vec<SetOperation>
}

impl SelectStatement {
    /// The term that carries a trailing ORDER BY.
    pub fn last_term_mut(&mut self) -> &mut QueryTerm {
        match self.set_operations.last_mut() {
            Some(operation) => &mut operation.term,
            None => &mut self.first
        }
    }

    /// First query specification, descending into parenthesized terms.
    pub fn primary_spec(&self) -> Option<&QuerySpec> {
        self.first.primary_spec()
    }

    /// Check if the statement combines several terms.
    pub fn has_set_operations(&self) -> bool {
        !self.set_operations.is_empty()
    }
}

/// `WITH name AS (query), …`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithClause {
    /// `WITH`, or `WITH RECURSIVE`.
    pub keyword: String,

    /// Common table expressions.
    pub ctes: Vec<Cte>
}

/// Single common table expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cte {
    /// Name.
    pub name: String,

    /// `AS`
    pub as_kw: String,

    /// Body.
    pub query: SelectStatement
}

/// `UNION ALL (…)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetOperation {
    /// Operator words, e.g. `UNION ALL`.
    pub words: String,

    /// Right-hand term.
    pub term: QueryTerm
}

/// Operand of a set operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryTerm {
    /// Plain query.
    Spec(Box<QuerySpec>),

    /// Parenthesized query.
    Nested(Box<SelectStatement>)
}

impl QueryTerm {
    /// First query specification.
    pub fn primary_spec(&self) -> Option<&QuerySpec> {
        match self {
            Self::Spec(spec) => Some(spec),
            Self::Nested(statement) => statement.primary_spec()
        }
    }
}

/// Single `SELECT … FROM … WHERE …` block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuerySpec {
    /// Missing in select-less HQL queries.
    pub select: Option<SelectClause>,

    /// Missing in from-less HQL queries.
    pub from: Option<FromClause>,

    /// `WHERE`
    pub where_clause: Option<Condition>,

    /// `GROUP BY`
    pub group_by: Option<GroupByClause>,

    /// `HAVING`
    pub having: Option<Condition>,

    /// `ORDER BY`
    pub order_by: Option<OrderByClause>,

    /// HQL `LIMIT`, `OFFSET` and `FETCH` clauses.
    pub paging: Vec<Fragment>
}

impl QuerySpec {
    /// Identification variable of the first FROM root.
    pub fn primary_alias(&self) -> Option<&str> {
        self.from
            .as_ref()
            .and_then(|from| from.roots.first())
            .and_then(|root| root.alias.as_deref())
    }
}

/// `SELECT [DISTINCT] items`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectClause {
    /// `SELECT` as written.
    pub keyword: String,

    /// `DISTINCT` as written.
    pub distinct: Option<String>,

    /// Projection items.
    pub items: Vec<SelectItem>
}

/// Projection item with optional result variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectItem {
    /// Selected expression.
    pub expr: Expr,

    /// `AS` as written.
    pub as_kw: Option<String>,

    /// Result variable.
    pub alias: Option<String>
}

/// `FROM roots`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FromClause {
    /// `FROM` as written.
    pub keyword: String,

    /// Comma separated roots.
    pub roots: Vec<FromRoot>
}

/// Range variable declaration with its joins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FromRoot {
    /// What the variable ranges over.
    pub source: RootSource,

    /// `AS` as written.
    pub as_kw: Option<String>,

    /// Identification variable.
    pub alias: Option<String>,

    /// Joins hanging off this root.
    pub joins: Vec<Join>
}

/// Source of a range variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootSource {
    /// Entity name, possibly qualified.
    Entity(String),

    /// `IN (path)`
    Collection {
        /// `IN` as written.
        keyword: String,

        /// Collection valued path.
        path: Expr
    },

    /// HQL derived root `(select …)`.
    Subquery(Box<SelectStatement>)
}

/// `LEFT JOIN FETCH u.roles r ON …`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    /// Join words, e.g. `LEFT OUTER JOIN FETCH`.
    pub words: String,

    /// Joined path or entity.
    pub target: Expr,

    /// `AS` as written.
    pub as_kw: Option<String>,

    /// Identification variable.
    pub alias: Option<String>,

    /// `ON` / `WITH` condition.
    pub condition: Option<Condition>
}

/// Keyword followed by a boolean expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    /// `WHERE`, `HAVING`, `ON` or `WITH` as written.
    pub keyword: String,

    /// Predicate.
    pub expr: Expr
}

/// `GROUP BY items`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupByClause {
    /// `GROUP BY` as written.
    pub keyword: String,

    /// Grouping expressions.
    pub items: Vec<Expr>
}

/// `ORDER BY items`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderByClause {
    /// `ORDER BY` as written.
    pub keyword: String,

    /// Sort items.
    pub items: Vec<OrderItem>
}

/// `expr [ASC|DESC] [NULLS FIRST|LAST]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    /// Sort expression.
    pub expr: Expr,

    /// `ASC` or `DESC` as written.
    pub direction: Option<String>,

    /// `NULLS FIRST` or `NULLS LAST` as written.
    pub nulls: Option<String>
}

/// `UPDATE Entity e SET … WHERE …`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStatement {
    /// `UPDATE` as written.
    pub keyword: String,

    /// Entity name.
    pub entity: String,

    /// `AS` as written.
    pub as_kw: Option<String>,

    /// Identification variable.
    pub alias: Option<String>,

    /// `SET` as written.
    pub set_kw: String,

    /// `path = value` pairs.
    pub assignments: Vec<(Expr, Expr)>,

    /// `WHERE`
    pub where_clause: Option<Condition>
}

/// `DELETE FROM Entity e WHERE …`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteStatement {
    /// `DELETE FROM` or `DELETE` as written.
    pub words: String,

    /// Entity name.
    pub entity: String,

    /// `AS` as written.
    pub as_kw: Option<String>,

    /// Identification variable.
    pub alias: Option<String>,

    /// `WHERE`
    pub where_clause: Option<Condition>
}

/// Word or expression inside a function call or paging clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Keyword such as `DISTINCT`, `FROM` or `AS`.
    Word(String),

    /// Expression.
    Expr(Expr)
}

/// Right-hand side of `IN`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InList {
    /// `(a, b, c)`
    Values(Vec<Expr>),

    /// `(select …)`
    Subquery(Box<SelectStatement>),

    /// Unparenthesized parameter or path, e.g. `IN :names`.
    Single(Box<Expr>)
}

/// `WHEN condition THEN result`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhenClause {
    /// `WHEN` as written.
    pub when_kw: String,

    /// Condition or compared value.
    pub condition: Expr,

    /// `THEN` as written.
    pub then_kw: String,

    /// Result.
    pub result: Expr
}

/// Expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// `u.address.city`
    Path(Vec<String>),

    /// `?1`, `?`, `:name`
    Parameter(String),

    /// String, numeric, boolean, null or JDBC escape literal.
    Literal(String),

    /// `*` inside `count(*)`.
    Star,

    /// `name(args)`
    Function {
        /// Function name as written.
        name: String,

        /// Comma separated argument fragments.
        args: Vec<Vec<Fragment>>
    },

    /// `NOT x`, `-x`, `EXISTS (…)`
    Unary {
        /// Operator as written.
        op: String,

        /// Operand.
        operand: Box<Expr>
    },

    /// `a AND b`, `a = b`, `a || b`
    Binary {
        /// Left operand.
        left: Box<Expr>,

        /// Operator as written.
        op: String,

        /// Right operand.
        right: Box<Expr>
    },

    /// `x [NOT] BETWEEN a AND b`
    Between {
        /// Tested value.
        expr: Box<Expr>,

        /// `BETWEEN` or `NOT BETWEEN` as written.
        words: String,

        /// Lower bound.
        low: Box<Expr>,

        /// `AND` as written.
        and_kw: String,

        /// Upper bound.
        high: Box<Expr>
    },

    /// `x [NOT] LIKE p [ESCAPE e]`
    Like {
        /// Tested value.
        expr: Box<Expr>,

        /// `LIKE` or `NOT LIKE` as written.
        words: String,

        /// Pattern.
        pattern: Box<Expr>,

        /// `ESCAPE` keyword and escape character.
        escape: Option<(String, Box<Expr>)>
    },

    /// `x [NOT] IN …`
    In {
        /// Tested value.
        expr: Box<Expr>,

        /// `IN` or `NOT IN` as written.
        words: String,

        /// Candidates.
        list: InList
    },

    /// `x IS [NOT] NULL|EMPTY|TRUE|FALSE` and `x IS [NOT] DISTINCT FROM y`
    Is {
        /// Tested value.
        expr: Box<Expr>,

        /// Predicate words.
        words: String,

        /// Compared value of `DISTINCT FROM`.
        right: Option<Box<Expr>>
    },

    /// `x [NOT] MEMBER [OF] collection`
    Member {
        /// Element.
        expr: Box<Expr>,

        /// Predicate words.
        words: String,

        /// Collection valued path.
        collection: Box<Expr>
    },

    /// `CASE [operand] WHEN … THEN … [ELSE …] END`
    Case {
        /// `CASE` as written.
        keyword: String,

        /// Operand of a simple case.
        operand: Option<Box<Expr>>,

        /// Branches.
        whens: Vec<WhenClause>,

        /// `ELSE` keyword and value.
        otherwise: Option<(String, Box<Expr>)>,

        /// `END` as written.
        end_kw: String
    },

    /// `ALL (…)`, `ANY (…)`, `SOME (…)`
    Quantified {
        /// Quantifier as written.
        keyword: String,

        /// Subquery.
        query: Box<SelectStatement>
    },

    /// `(select …)`
    Subquery(Box<SelectStatement>),

    /// `(expr)`
    Nested(Box<Expr>),

    /// `(a, b)`
    Tuple(Vec<Expr>),

    /// `NEW com.example.Dto(a, b)`
    Constructor {
        /// `NEW` as written.
        new_kw: String,

        /// Qualified class name.
        class: String,

        /// Constructor arguments.
        args: Vec<Expr>
    },

    /// Text spliced in by a rewrite, rendered verbatim.
    Raw(String)
}

impl Expr {
    /// Dotted path text, if this is a path.
    pub fn as_path(&self) -> Option<String> {
        match self {
            Self::Path(segments) => Some(segments.join(".")),
            _ => None
        }
    }

    /// Check for an aggregate `count(…)` call.
    pub fn is_count(&self) -> bool {
        matches!(self, Self::Function { name, .. } if name.eq_ignore_ascii_case("count"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_alias_is_first_root() {
        let spec = QuerySpec {
            from: Some(FromClause {
                keyword: "from".into(),
                roots:   vec![FromRoot {
                    source: RootSource::Entity("User".into()),
                    as_kw:  None,
                    alias:  Some("u".into()),
                    joins:  Vec::new()
                }]
            }),
            ..QuerySpec::default()
        };
        assert_eq!(spec.primary_alias(), Some("u"));
    }

    #[test]
    fn count_detection() {
        let count = Expr::Function {
            name: "COUNT".into(),
            args: vec![vec![Fragment::Expr(Expr::Path(vec!["u".into()]))]]
        };
        assert!(count.is_count());
        assert!(!Expr::Path(vec!["u".into()]).is_count());
    }
}

// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Recursive descent parser with Pratt expression parsing.
//!
//! The parser runs in one of two [`Mode`]s. [`Mode::Fast`] decides every
//! alternative from the current and next token and gives up with
//! [`ParseFailure::PredictionFailed`] where that is not enough. [`Mode::Backtracking`]
//! resolves the same decision points by trying one alternative and rewinding
//! on failure.

use super::{
    Dialect,
    ast::{
        Condition, Cte, DeleteStatement, Expr, Fragment, FromClause, FromRoot, GroupByClause,
        InList, Join, OrderByClause, OrderItem, QuerySpec, QueryTerm, RootSource, SelectClause,
        SelectItem, SelectStatement, SetOperation, Statement, UpdateStatement, WhenClause,
        WithClause
    },
    error::{ParseFailure, SyntaxError},
    token::{Token, TokenType}
};

type Parse<T> = Result<T, ParseFailure>;

/// Decision strategy at ambiguous points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// One token of lookahead.
    Fast,

    /// Speculative parsing with rewind.
    Backtracking
}

/// Binding power of infix operators, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Or,
    And,
    Not,
    Comparison,
    Sum,
    Product,
    Prefix
}

/// Parser over a token vector ending in [`TokenType::Eof`].
pub struct Parser<'a> {
    tokens:  &'a [Token],
    index:   usize,
    query:   &'a str,
    dialect: Dialect,
    mode:    Mode
}

impl<'a> Parser<'a> {
    /// Create a parser.
    ///
    /// # Arguments
    ///
    /// * `tokens` — Output of the lexer, terminated by an EOF token
    /// * `query` — Source text, quoted in error messages
    /// * `dialect` — Grammar flavour
    /// * `mode` — Decision strategy
    pub fn new(tokens: &'a [Token], query: &'a str, dialect: Dialect, mode: Mode) -> Self {
        Self {
            tokens,
            index: 0,
            query,
            dialect,
            mode
        }
    }

    /// Parse a complete statement.
    pub fn parse(&mut self) -> Parse<Statement> {
        let statement = if self.at_keyword("UPDATE") {
            Statement::Update(self.parse_update()?)
        } else if self.at_keyword("DELETE") {
            Statement::Delete(self.parse_delete()?)
        } else if self.at_keyword("SELECT")
            || self.at_keyword("WITH")
            || self.at_punct("(")
            || (self.at_keyword("FROM") && self.dialect.allows_missing_select())
        {
            Statement::Select(self.parse_select_statement()?)
        } else {
            return Err(self.mismatched("{SELECT, UPDATE, DELETE}"));
        };
        if self.cur().token_type != TokenType::Eof {
            return Err(self.mismatched("<EOF>"));
        }
        Ok(statement)
    }

    fn cur(&self) -> &Token {
        self.peek_n(0)
    }

    fn peek(&self) -> &Token {
        self.peek_n(1)
    }

    fn peek_n(&self, n: usize) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[(self.index + n).min(last)]
    }

    fn advance(&mut self) -> String {
        let literal = self.cur().literal.clone();
        if self.cur().token_type != TokenType::Eof {
            self.index += 1;
        }
        literal
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        self.cur().is_keyword(keyword)
    }

    fn at_word(&self, word: &str) -> bool {
        self.cur().is_word(word)
    }

    fn at_punct(&self, punct: &str) -> bool {
        self.cur().is_punct(punct)
    }

    fn eat_keyword(&mut self, keyword: &str) -> Option<String> {
        self.at_keyword(keyword).then(|| self.advance())
    }

    fn eat_word(&mut self, word: &str) -> Option<String> {
        self.at_word(word).then(|| self.advance())
    }

    fn eat_punct(&mut self, punct: &str) -> bool {
        let found = self.at_punct(punct);
        if found {
            self.advance();
        }
        found
    }

    fn expect_keyword(&mut self, keyword: &str) -> Parse<String> {
        self.eat_keyword(keyword).ok_or_else(|| self.mismatched(keyword))
    }

    fn expect_word(&mut self, word: &str) -> Parse<String> {
        self.eat_word(word).ok_or_else(|| self.mismatched(word))
    }

    fn expect_punct(&mut self, punct: &str) -> Parse<()> {
        if self.eat_punct(punct) {
            Ok(())
        } else {
            Err(self.mismatched(&format!("'{punct}'")))
        }
    }

    /// Two consecutive keywords joined as written, e.g. `ORDER BY`.
    fn expect_pair(&mut self, first: &str, second: &str) -> Parse<String> {
        let first = self.expect_keyword(first)?;
        let second = self.expect_keyword(second)?;
        Ok(format!("{first} {second}"))
    }

    fn mismatched(&self, expected: &str) -> ParseFailure {
        SyntaxError::mismatched(self.cur(), expected, self.dialect.grammar_name(), self.query).into()
    }

    fn no_viable_alternative(&self) -> ParseFailure {
        SyntaxError::no_viable_alternative(self.cur(), self.dialect.grammar_name(), self.query).into()
    }

    fn parse_select_statement(&mut self) -> Parse<SelectStatement> {
        let with = if self.at_keyword("WITH") {
            Some(self.parse_with()?)
        } else {
            None
        };
        let first = self.parse_query_term()?;
        let mut set_operations = Vec::new();
        while self.at_keyword("UNION") || self.at_keyword("INTERSECT") || self.at_keyword("EXCEPT") {
            let mut words = self.advance();
            if let Some(all) = self.eat_keyword("ALL").or_else(|| self.eat_keyword("DISTINCT")) {
                words = format!("{words} {all}");
            }
            let term = self.parse_query_term()?;
            set_operations.push(SetOperation {
                words,
                term
            });
        }
        Ok(SelectStatement {
            with,
            first,
            set_operations
        })
    }

    fn parse_with(&mut self) -> Parse<WithClause> {
        let mut keyword = self.advance();
        if let Some(recursive) = self.eat_word("RECURSIVE") {
            keyword = format!("{keyword} {recursive}");
        }
        let mut ctes = Vec::new();
        loop {
            let name = self.expect_name()?;
            let as_kw = self.expect_keyword("AS")?;
            self.expect_punct("(")?;
            let query = self.parse_select_statement()?;
            self.expect_punct(")")?;
            ctes.push(Cte {
                name,
                as_kw,
                query
            });
            if !self.eat_punct(",") {
                break;
            }
        }
        Ok(WithClause {
            keyword,
            ctes
        })
    }

    fn parse_query_term(&mut self) -> Parse<QueryTerm> {
        if self.eat_punct("(") {
            let nested = self.parse_select_statement()?;
            self.expect_punct(")")?;
            return Ok(QueryTerm::Nested(Box::new(nested)));
        }
        Ok(QueryTerm::Spec(Box::new(self.parse_query_spec()?)))
    }

    fn parse_query_spec(&mut self) -> Parse<QuerySpec> {
        let mut spec = QuerySpec::default();
        if self.at_keyword("SELECT") {
            spec.select = Some(self.parse_select_clause()?);
        } else if !self.dialect.allows_missing_select() {
            return Err(self.mismatched("SELECT"));
        }
        if self.at_keyword("FROM") {
            spec.from = Some(self.parse_from_clause()?);
        } else if !self.dialect.allows_missing_select() {
            return Err(self.mismatched("FROM"));
        }
        if spec.select.is_none() && spec.from.is_none() {
            return Err(self.mismatched("{SELECT, FROM}"));
        }
        if let Some(keyword) = self.eat_keyword("WHERE") {
            spec.where_clause = Some(Condition {
                keyword,
                expr: self.parse_expression(Precedence::Lowest)?
            });
        }
        if self.at_keyword("GROUP") {
            let keyword = self.expect_pair("GROUP", "BY")?;
            let items = self.parse_expression_list()?;
            spec.group_by = Some(GroupByClause {
                keyword,
                items
            });
        }
        if let Some(keyword) = self.eat_keyword("HAVING") {
            spec.having = Some(Condition {
                keyword,
                expr: self.parse_expression(Precedence::Lowest)?
            });
        }
        if self.at_keyword("ORDER") {
            spec.order_by = Some(self.parse_order_by()?);
        }
        if self.dialect.allows_paging() {
            spec.paging = self.parse_paging()?;
        }
        Ok(spec)
    }

    fn parse_select_clause(&mut self) -> Parse<SelectClause> {
        let keyword = self.advance();
        let distinct = self.eat_keyword("DISTINCT");
        let mut items = vec![self.parse_select_item()?];
        while self.eat_punct(",") {
            items.push(self.parse_select_item()?);
        }
        Ok(SelectClause {
            keyword,
            distinct,
            items
        })
    }

    fn parse_select_item(&mut self) -> Parse<SelectItem> {
        let expr = self.parse_expression(Precedence::Lowest)?;
        let (as_kw, alias) = self.parse_alias()?;
        Ok(SelectItem {
            expr,
            as_kw,
            alias
        })
    }

    /// `[AS] alias`; without `AS` only a non-reserved identifier qualifies.
    fn parse_alias(&mut self) -> Parse<(Option<String>, Option<String>)> {
        if let Some(as_kw) = self.eat_keyword("AS") {
            let alias = self.expect_name()?;
            return Ok((Some(as_kw), Some(alias)));
        }
        if self.cur().token_type == TokenType::Identifier && !self.is_clause_word() {
            return Ok((None, Some(self.advance())));
        }
        Ok((None, None))
    }

    /// Non-reserved words that start a clause after an alias position.
    fn is_clause_word(&self) -> bool {
        (self.dialect.allows_paging()
            && (self.at_word("LIMIT") || self.at_word("OFFSET")))
            || self.is_join_start()
    }

    fn expect_name(&mut self) -> Parse<String> {
        if self.cur().is_any_word() {
            Ok(self.advance())
        } else {
            Err(self.mismatched("identifier"))
        }
    }

    fn parse_qualified_name(&mut self) -> Parse<String> {
        let mut name = self.expect_name()?;
        while self.at_punct(".") && self.peek().is_any_word() {
            self.advance();
            name.push('.');
            name.push_str(&self.advance());
        }
        Ok(name)
    }

    fn parse_from_clause(&mut self) -> Parse<FromClause> {
        let keyword = self.advance();
        let mut roots = vec![self.parse_root()?];
        while self.eat_punct(",") {
            roots.push(self.parse_root()?);
        }
        Ok(FromClause {
            keyword,
            roots
        })
    }

    fn parse_root(&mut self) -> Parse<FromRoot> {
        let source = if self.at_keyword("IN") && self.peek().is_punct("(") {
            let keyword = self.advance();
            self.expect_punct("(")?;
            let path = self.parse_expression(Precedence::Lowest)?;
            self.expect_punct(")")?;
            RootSource::Collection {
                keyword,
                path
            }
        } else if self.at_punct("(") && self.dialect.allows_missing_select() {
            self.advance();
            let query = self.parse_select_statement()?;
            self.expect_punct(")")?;
            RootSource::Subquery(Box::new(query))
        } else {
            RootSource::Entity(self.parse_qualified_name()?)
        };
        let (as_kw, alias) = self.parse_alias()?;
        let mut joins = Vec::new();
        while self.is_join_start() {
            joins.push(self.parse_join()?);
        }
        Ok(FromRoot {
            source,
            as_kw,
            alias,
            joins
        })
    }

    fn is_join_start(&self) -> bool {
        const MODIFIERS: [&str; 6] = ["INNER", "LEFT", "RIGHT", "FULL", "CROSS", "OUTER"];
        let is_modifier = |token: &Token| MODIFIERS.iter().any(|m| token.is_word(m));
        let cur = self.cur();
        cur.is_keyword("JOIN")
            || (is_modifier(cur)
                && (self.peek().is_keyword("JOIN")
                    || (self.peek().is_keyword("OUTER") && self.peek_n(2).is_keyword("JOIN"))))
    }

    fn parse_join(&mut self) -> Parse<Join> {
        let mut words = Vec::new();
        while !self.at_keyword("JOIN") {
            words.push(self.advance());
        }
        words.push(self.advance());
        if let Some(fetch) = self.eat_keyword("FETCH") {
            words.push(fetch);
        }
        let target = self.parse_expression(Precedence::Prefix)?;
        let (as_kw, alias) = self.parse_alias()?;
        let condition = match self.eat_keyword("ON").or_else(|| self.eat_keyword("WITH")) {
            Some(keyword) => Some(Condition {
                keyword,
                expr: self.parse_expression(Precedence::Lowest)?
            }),
            None => None
        };
        Ok(Join {
            words: words.join(" "),
            target,
            as_kw,
            alias,
            condition
        })
    }

    fn parse_order_by(&mut self) -> Parse<OrderByClause> {
        let keyword = self.expect_pair("ORDER", "BY")?;
        let mut items = vec![self.parse_order_item()?];
        while self.eat_punct(",") {
            items.push(self.parse_order_item()?);
        }
        Ok(OrderByClause {
            keyword,
            items
        })
    }

    fn parse_order_item(&mut self) -> Parse<OrderItem> {
        let expr = self.parse_expression(Precedence::Lowest)?;
        let direction = self.eat_keyword("ASC").or_else(|| self.eat_keyword("DESC"));
        let nulls = match self.eat_keyword("NULLS") {
            Some(nulls) => {
                let position = self
                    .eat_word("FIRST")
                    .or_else(|| self.eat_word("LAST"))
                    .ok_or_else(|| self.mismatched("{FIRST, LAST}"))?;
                Some(format!("{nulls} {position}"))
            }
            None => None
        };
        Ok(OrderItem {
            expr,
            direction,
            nulls
        })
    }

    fn parse_paging(&mut self) -> Parse<Vec<Fragment>> {
        let mut fragments = Vec::new();
        loop {
            if let Some(limit) = self.eat_word("LIMIT") {
                fragments.push(Fragment::Word(limit));
                fragments.push(Fragment::Expr(self.parse_expression(Precedence::Sum)?));
            } else if let Some(offset) = self.eat_word("OFFSET") {
                fragments.push(Fragment::Word(offset));
                fragments.push(Fragment::Expr(self.parse_expression(Precedence::Sum)?));
                if let Some(rows) = self.eat_word("ROWS").or_else(|| self.eat_word("ROW")) {
                    fragments.push(Fragment::Word(rows));
                }
            } else if let Some(fetch) = self.eat_keyword("FETCH") {
                fragments.push(Fragment::Word(fetch));
                let first = self
                    .eat_word("FIRST")
                    .or_else(|| self.eat_word("NEXT"))
                    .ok_or_else(|| self.mismatched("{FIRST, NEXT}"))?;
                fragments.push(Fragment::Word(first));
                fragments.push(Fragment::Expr(self.parse_expression(Precedence::Sum)?));
                if let Some(percent) = self.eat_word("PERCENT") {
                    fragments.push(Fragment::Word(percent));
                }
                let rows = self
                    .eat_word("ROWS")
                    .or_else(|| self.eat_word("ROW"))
                    .ok_or_else(|| self.mismatched("{ROWS, ROW}"))?;
                fragments.push(Fragment::Word(rows));
                if let Some(only) = self.eat_word("ONLY") {
                    fragments.push(Fragment::Word(only));
                } else {
                    let with = self.expect_keyword("WITH")?;
                    let ties = self.expect_word("TIES")?;
                    fragments.push(Fragment::Word(format!("{with} {ties}")));
                }
            } else {
                return Ok(fragments);
            }
        }
    }

    fn parse_update(&mut self) -> Parse<UpdateStatement> {
        let keyword = self.advance();
        let entity = self.parse_qualified_name()?;
        let (as_kw, alias) = self.parse_alias()?;
        let set_kw = self.expect_keyword("SET")?;
        let mut assignments = Vec::new();
        loop {
            let target = self.parse_expression(Precedence::Sum)?;
            if !self.cur().is_operator("=") {
                return Err(self.mismatched("'='"));
            }
            self.advance();
            let value = self.parse_expression(Precedence::Lowest)?;
            assignments.push((target, value));
            if !self.eat_punct(",") {
                break;
            }
        }
        let where_clause = match self.eat_keyword("WHERE") {
            Some(keyword) => Some(Condition {
                keyword,
                expr: self.parse_expression(Precedence::Lowest)?
            }),
            None => None
        };
        Ok(UpdateStatement {
            keyword,
            entity,
            as_kw,
            alias,
            set_kw,
            assignments,
            where_clause
        })
    }

    fn parse_delete(&mut self) -> Parse<DeleteStatement> {
        let mut words = self.advance();
        if let Some(from) = self.eat_keyword("FROM") {
            words = format!("{words} {from}");
        }
        let entity = self.parse_qualified_name()?;
        let (as_kw, alias) = self.parse_alias()?;
        let where_clause = match self.eat_keyword("WHERE") {
            Some(keyword) => Some(Condition {
                keyword,
                expr: self.parse_expression(Precedence::Lowest)?
            }),
            None => None
        };
        Ok(DeleteStatement {
            words,
            entity,
            as_kw,
            alias,
            where_clause
        })
    }

    fn parse_expression_list(&mut self) -> Parse<Vec<Expr>> {
        let mut items = vec![self.parse_expression(Precedence::Lowest)?];
        while self.eat_punct(",") {
            items.push(self.parse_expression(Precedence::Lowest)?);
        }
        Ok(items)
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Parse<Expr> {
        let mut left = self.parse_prefix()?;
        loop {
            let next = self.infix_precedence();
            if next <= precedence {
                return Ok(left);
            }
            left = self.parse_infix(left, next)?;
        }
    }

    fn infix_precedence(&self) -> Precedence {
        let cur = self.cur();
        match cur.token_type {
            TokenType::Keyword => match cur.literal.to_ascii_uppercase().as_str() {
                "OR" => Precedence::Or,
                "AND" => Precedence::And,
                "IS" | "LIKE" | "IN" | "BETWEEN" | "MEMBER" => Precedence::Comparison,
                "NOT" => {
                    let next = self.peek();
                    if ["LIKE", "IN", "BETWEEN", "MEMBER"].iter().any(|k| next.is_keyword(k)) {
                        Precedence::Comparison
                    } else {
                        Precedence::Lowest
                    }
                }
                _ => Precedence::Lowest
            },
            TokenType::Operator => match cur.literal.as_str() {
                "=" | "<>" | "!=" | "^=" | "<" | ">" | "<=" | ">=" => Precedence::Comparison,
                "+" | "-" | "||" => Precedence::Sum,
                "*" | "/" | "%" => Precedence::Product,
                _ => Precedence::Lowest
            },
            _ => Precedence::Lowest
        }
    }

    fn parse_infix(&mut self, left: Expr, precedence: Precedence) -> Parse<Expr> {
        let left = Box::new(left);
        if self.cur().token_type == TokenType::Operator
            || self.at_keyword("AND")
            || self.at_keyword("OR")
        {
            let op = self.advance();
            let right = Box::new(self.parse_expression(precedence)?);
            return Ok(Expr::Binary {
                left,
                op,
                right
            });
        }
        if self.at_keyword("IS") {
            return self.parse_is(left);
        }
        let mut words = Vec::new();
        if let Some(not) = self.eat_keyword("NOT") {
            words.push(not);
        }
        let keyword = self.cur().literal.to_ascii_uppercase();
        words.push(self.advance());
        match keyword.as_str() {
            "LIKE" => {
                let pattern = Box::new(self.parse_expression(Precedence::Comparison)?);
                let escape = match self.eat_keyword("ESCAPE") {
                    Some(escape) => Some((escape, Box::new(self.parse_prefix()?))),
                    None => None
                };
                Ok(Expr::Like {
                    expr: left,
                    words: words.join(" "),
                    pattern,
                    escape
                })
            }
            "IN" => {
                let list = self.parse_in_list()?;
                Ok(Expr::In {
                    expr: left,
                    words: words.join(" "),
                    list
                })
            }
            "BETWEEN" => {
                let low = Box::new(self.parse_expression(Precedence::Comparison)?);
                let and_kw = self.expect_keyword("AND")?;
                let high = Box::new(self.parse_expression(Precedence::Comparison)?);
                Ok(Expr::Between {
                    expr: left,
                    words: words.join(" "),
                    low,
                    and_kw,
                    high
                })
            }
            "MEMBER" => {
                if let Some(of) = self.eat_keyword("OF") {
                    words.push(of);
                }
                let collection = Box::new(self.parse_expression(Precedence::Comparison)?);
                Ok(Expr::Member {
                    expr: left,
                    words: words.join(" "),
                    collection
                })
            }
            _ => Err(self.no_viable_alternative())
        }
    }

    fn parse_is(&mut self, left: Box<Expr>) -> Parse<Expr> {
        let mut words = vec![self.advance()];
        if let Some(not) = self.eat_keyword("NOT") {
            words.push(not);
        }
        if let Some(distinct) = self.eat_keyword("DISTINCT") {
            words.push(distinct);
            words.push(self.expect_keyword("FROM")?);
            let right = Box::new(self.parse_expression(Precedence::Comparison)?);
            return Ok(Expr::Is {
                expr: left,
                words: words.join(" "),
                right: Some(right)
            });
        }
        let word = ["NULL", "EMPTY", "TRUE", "FALSE"]
            .iter()
            .find_map(|k| self.eat_keyword(k))
            .ok_or_else(|| self.mismatched("{NULL, EMPTY, TRUE, FALSE}"))?;
        words.push(word);
        Ok(Expr::Is {
            expr:  left,
            words: words.join(" "),
            right: None
        })
    }

    fn parse_in_list(&mut self) -> Parse<InList> {
        if !self.at_punct("(") {
            return Ok(InList::Single(Box::new(self.parse_prefix()?)));
        }
        if self.peek().is_punct("(") {
            match self.mode {
                Mode::Fast => return Err(ParseFailure::PredictionFailed),
                Mode::Backtracking => {
                    let saved = self.index;
                    if let Ok(query) = self.try_parenthesized_query() {
                        return Ok(InList::Subquery(Box::new(query)));
                    }
                    self.index = saved;
                }
            }
        }
        if self.peek().is_keyword("SELECT") || self.peek().is_keyword("WITH") {
            self.advance();
            let query = self.parse_select_statement()?;
            self.expect_punct(")")?;
            return Ok(InList::Subquery(Box::new(query)));
        }
        self.advance();
        if self.eat_punct(")") {
            return Ok(InList::Values(Vec::new()));
        }
        let values = self.parse_expression_list()?;
        self.expect_punct(")")?;
        Ok(InList::Values(values))
    }

    fn parse_prefix(&mut self) -> Parse<Expr> {
        let cur = self.cur().clone();
        match cur.token_type {
            TokenType::Parameter => Ok(Expr::Parameter(self.advance())),
            TokenType::String | TokenType::Integer | TokenType::Decimal => {
                Ok(Expr::Literal(self.advance()))
            }
            TokenType::Operator if cur.literal == "-" || cur.literal == "+" => {
                let op = self.advance();
                let operand = Box::new(self.parse_expression(Precedence::Prefix)?);
                Ok(Expr::Unary {
                    op,
                    operand
                })
            }
            TokenType::Operator if cur.literal == "*" => {
                self.advance();
                Ok(Expr::Star)
            }
            TokenType::Identifier => {
                if self.peek().is_punct("(") {
                    self.parse_function()
                } else {
                    self.parse_path()
                }
            }
            TokenType::Punctuator if cur.literal == "(" => self.parse_parenthesized(),
            TokenType::Punctuator if cur.literal == "{" => self.parse_escape_literal(),
            TokenType::Keyword => self.parse_keyword_prefix(&cur),
            TokenType::Eof => Err(self.mismatched("expression")),
            _ => Err(self.no_viable_alternative())
        }
    }

    fn parse_keyword_prefix(&mut self, cur: &Token) -> Parse<Expr> {
        match cur.literal.to_ascii_uppercase().as_str() {
            "NOT" => {
                let op = self.advance();
                let operand = Box::new(self.parse_expression(Precedence::Not)?);
                Ok(Expr::Unary {
                    op,
                    operand
                })
            }
            "EXISTS" => {
                let op = self.advance();
                if !self.at_punct("(") {
                    return Err(self.mismatched("'('"));
                }
                let operand = Box::new(self.parse_parenthesized()?);
                Ok(Expr::Unary {
                    op,
                    operand
                })
            }
            "TRUE" | "FALSE" | "NULL" => Ok(Expr::Literal(self.advance())),
            "CASE" => self.parse_case(),
            "NEW" => self.parse_constructor(),
            "ALL" | "ANY" | "SOME" if self.peek().is_punct("(") => {
                let keyword = self.advance();
                self.expect_punct("(")?;
                let query = Box::new(self.parse_select_statement()?);
                self.expect_punct(")")?;
                Ok(Expr::Quantified {
                    keyword,
                    query
                })
            }
            "LEFT" if self.peek().is_punct("(") => self.parse_function(),
            _ => Err(self.mismatched("expression"))
        }
    }

    fn parse_path(&mut self) -> Parse<Expr> {
        let mut segments = vec![self.advance()];
        while self.at_punct(".") && self.peek().is_any_word() {
            self.advance();
            segments.push(self.advance());
        }
        Ok(Expr::Path(segments))
    }

    fn parse_function(&mut self) -> Parse<Expr> {
        if !self.dialect.accepts_function(&self.cur().literal) {
            return Err(self.no_viable_alternative());
        }
        let name = self.advance();
        self.expect_punct("(")?;
        let mut args = Vec::new();
        if !self.eat_punct(")") {
            loop {
                args.push(self.parse_argument()?);
                if self.eat_punct(")") {
                    break;
                }
                self.expect_punct(",")?;
            }
        }
        Ok(Expr::Function {
            name,
            args
        })
    }

    /// One argument: expressions interleaved with keywords such as
    /// `DISTINCT`, `FROM` or `AS`.
    fn parse_argument(&mut self) -> Parse<Vec<Fragment>> {
        const ARGUMENT_WORDS: [&str; 5] = ["DISTINCT", "FROM", "AS", "ALL", "IN"];
        let mut fragments = Vec::new();
        while !self.at_punct(",") && !self.at_punct(")") && self.cur().token_type != TokenType::Eof {
            if ARGUMENT_WORDS.iter().any(|w| self.at_keyword(w)) && !self.peek().is_punct("(") {
                fragments.push(Fragment::Word(self.advance()));
            } else {
                fragments.push(Fragment::Expr(self.parse_expression(Precedence::Lowest)?));
            }
        }
        if fragments.is_empty() {
            return Err(self.mismatched("expression"));
        }
        Ok(fragments)
    }

    /// `(` starts a subquery, a nested expression or a tuple.
    fn parse_parenthesized(&mut self) -> Parse<Expr> {
        if self.peek().is_punct("(") {
            match self.mode {
                Mode::Fast => return Err(ParseFailure::PredictionFailed),
                Mode::Backtracking => {
                    let saved = self.index;
                    if let Ok(query) = self.try_parenthesized_query() {
                        return Ok(Expr::Subquery(Box::new(query)));
                    }
                    self.index = saved;
                }
            }
        }
        self.expect_punct("(")?;
        if self.at_keyword("SELECT") || self.at_keyword("WITH") {
            let query = self.parse_select_statement()?;
            self.expect_punct(")")?;
            return Ok(Expr::Subquery(Box::new(query)));
        }
        let first = self.parse_expression(Precedence::Lowest)?;
        if self.at_punct(",") {
            let mut items = vec![first];
            while self.eat_punct(",") {
                items.push(self.parse_expression(Precedence::Lowest)?);
            }
            self.expect_punct(")")?;
            return Ok(Expr::Tuple(items));
        }
        self.expect_punct(")")?;
        Ok(Expr::Nested(Box::new(first)))
    }

    fn try_parenthesized_query(&mut self) -> Parse<SelectStatement> {
        self.expect_punct("(")?;
        let query = self.parse_select_statement()?;
        self.expect_punct(")")?;
        Ok(query)
    }

    /// JDBC escape such as `{d '2024-01-01'}`, kept verbatim.
    fn parse_escape_literal(&mut self) -> Parse<Expr> {
        self.advance();
        let mut parts = Vec::new();
        while !self.at_punct("}") {
            if self.cur().token_type == TokenType::Eof {
                return Err(self.mismatched("'}'"));
            }
            parts.push(self.advance());
        }
        self.advance();
        Ok(Expr::Literal(format!("{{{}}}", parts.join(" "))))
    }

    fn parse_case(&mut self) -> Parse<Expr> {
        let keyword = self.advance();
        let operand = if self.at_keyword("WHEN") {
            None
        } else {
            Some(Box::new(self.parse_expression(Precedence::Lowest)?))
        };
        let mut whens = Vec::new();
        while let Some(when_kw) = self.eat_keyword("WHEN") {
            let condition = self.parse_expression(Precedence::Lowest)?;
            let then_kw = self.expect_keyword("THEN")?;
            let result = self.parse_expression(Precedence::Lowest)?;
            whens.push(WhenClause {
                when_kw,
                condition,
                then_kw,
                result
            });
        }
        if whens.is_empty() {
            return Err(self.mismatched("WHEN"));
        }
        let otherwise = match self.eat_keyword("ELSE") {
            Some(else_kw) => Some((else_kw, Box::new(self.parse_expression(Precedence::Lowest)?))),
            None => None
        };
        let end_kw = self.expect_keyword("END")?;
        Ok(Expr::Case {
            keyword,
            operand,
            whens,
            otherwise,
            end_kw
        })
    }

    fn parse_constructor(&mut self) -> Parse<Expr> {
        let new_kw = self.advance();
        let class = self.parse_qualified_name()?;
        self.expect_punct("(")?;
        let args = self.parse_expression_list()?;
        self.expect_punct(")")?;
        Ok(Expr::Constructor {
            new_kw,
            class,
            args
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::Lexer;

    fn parse(query: &str, dialect: Dialect, mode: Mode) -> Parse<Statement> {
        let tokens = Lexer::new(query).tokenize();
        Parser::new(&tokens, query, dialect, mode).parse()
    }

    fn spec(statement: &Statement) -> &QuerySpec {
        match statement {
            Statement::Select(select) => select.primary_spec().expect("spec"),
            other => panic!("not a select: {other:?}")
        }
    }

    #[test]
    fn simple_select() {
        let statement =
            parse("select u from User u where u.name = ?1", Dialect::Jpql, Mode::Fast).expect("parse");
        let spec = spec(&statement);
        assert_eq!(spec.primary_alias(), Some("u"));
        assert!(spec.where_clause.is_some());
    }

    #[test]
    fn precedence_binds_and_tighter_than_or() {
        let statement = parse(
            "select u from User u where u.a = 1 or u.b = 2 and u.c = 3",
            Dialect::Jpql,
            Mode::Fast
        )
        .expect("parse");
        let condition = spec(&statement).where_clause.as_ref().expect("where");
        match &condition.expr {
            Expr::Binary {
                op, ..
            } => assert_eq!(op, "or"),
            other => panic!("expected binary, got {other:?}")
        }
    }

    #[test]
    fn nested_parentheses_need_backtracking() {
        let query = "select u from User u where u.id in ((select a.id from A a))";
        assert_eq!(parse(query, Dialect::Jpql, Mode::Fast), Err(ParseFailure::PredictionFailed));
        assert!(parse(query, Dialect::Jpql, Mode::Backtracking).is_ok());
    }

    #[test]
    fn joins_and_fetch() {
        let statement = parse(
            "select u from User u left outer join fetch u.roles r join u.address a on a.id = 1",
            Dialect::Jpql,
            Mode::Fast
        )
        .expect("parse");
        let joins = &spec(&statement).from.as_ref().expect("from").roots[0].joins;
        assert_eq!(joins.len(), 2);
        assert_eq!(joins[0].words, "left outer join fetch");
        assert_eq!(joins[0].alias.as_deref(), Some("r"));
        assert!(joins[1].condition.is_some());
    }

    #[test]
    fn hql_paging() {
        let statement =
            parse("from User u order by u.name limit 10 offset 5", Dialect::Hql, Mode::Fast).expect("parse");
        assert_eq!(spec(&statement).paging.len(), 4);
        assert!(parse("select u from User u limit 10", Dialect::Jpql, Mode::Fast).is_err());
    }

    #[test]
    fn function_arguments_with_keywords() {
        assert!(
            parse(
                "select count(distinct u.name), trim(leading 'x' from u.name) from User u",
                Dialect::Jpql,
                Mode::Fast
            )
            .is_ok()
        );
    }

    #[test]
    fn between_and_like_escape() {
        assert!(
            parse(
                "select u from User u where u.age between 1 and 10 and u.name not like :n escape '\\'",
                Dialect::Jpql,
                Mode::Fast
            )
            .is_ok()
        );
    }
}

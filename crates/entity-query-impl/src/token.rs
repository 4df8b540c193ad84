// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Token stream rendering.
//!
//! Query transformers never concatenate strings directly. They emit
//! [`QueryToken`]s into a [`QueryRendererBuilder`] and render once at the end.
//! Tokens come in two flavours:
//!
//! | Flavour | Example | Spacing |
//! |---------|---------|---------|
//! | plain | `(`, `, `, `u.name` | none |
//! | expression | `select`, `order by`, `asc` | separated from neighbours by one space |
//!
//! A space is only inserted when the output does not already end with one, so
//! `", "` followed by an expression renders without a double space.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut builder = QueryRendererBuilder::new();
//! builder.append(expression("select"));
//! builder.append(token("u"));
//! builder.append_expression(QueryRenderer::from_tokens([expression("from"), token("User u")]));
//!
//! assert_eq!(builder.render(), "select u from User u");
//! ```

use std::{borrow::Cow, fmt};

/// Single fragment of query text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryToken {
    value:      Cow<'static, str>,
    expression: bool
}

impl QueryToken {
    /// Plain token from a static string.
    pub const fn plain(value: &'static str) -> Self {
        Self {
            value:      Cow::Borrowed(value),
            expression: false
        }
    }

    /// Expression token from a static string.
    pub const fn keyword(value: &'static str) -> Self {
        Self {
            value:      Cow::Borrowed(value),
            expression: true
        }
    }

    /// Token text.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Check if the token is separated from its neighbours by whitespace.
    pub const fn is_expression(&self) -> bool {
        self.expression
    }
}

impl fmt::Display for QueryToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Plain token.
pub fn token(value: impl Into<String>) -> QueryToken {
    QueryToken {
        value:      Cow::Owned(value.into()),
        expression: false
    }
}

/// Expression token.
pub fn expression(value: impl Into<String>) -> QueryToken {
    QueryToken {
        value:      Cow::Owned(value.into()),
        expression: true
    }
}

/// Plain token padded with a space on both sides.
pub fn ventilated(value: &str) -> QueryToken {
    token(format!(" {value} "))
}

/// `, `
pub const TOKEN_COMMA: QueryToken = QueryToken::plain(", ");
/// ` `
pub const TOKEN_SPACE: QueryToken = QueryToken::plain(" ");
/// `.`
pub const TOKEN_DOT: QueryToken = QueryToken::plain(".");
/// ` = `
pub const TOKEN_EQUALS: QueryToken = QueryToken::plain(" = ");
/// `(`
pub const TOKEN_OPEN_PAREN: QueryToken = QueryToken::plain("(");
/// `)`
pub const TOKEN_CLOSE_PAREN: QueryToken = QueryToken::plain(")");
/// `lower(`
pub const TOKEN_LOWER_FUNC: QueryToken = QueryToken::plain("lower(");
/// `count(`
pub const TOKEN_COUNT_FUNC: QueryToken = QueryToken::plain("count(");
/// `select count(`
pub const TOKEN_SELECT_COUNT: QueryToken = QueryToken::plain("select count(");
/// ` || `
pub const TOKEN_DOUBLE_PIPE: QueryToken = QueryToken::plain(" || ");
/// `__`, the synthetic alias of alias-less HQL queries.
pub const TOKEN_DOUBLE_UNDERSCORE: QueryToken = QueryToken::plain("__");
/// `order by`
pub const TOKEN_ORDER_BY: QueryToken = QueryToken::keyword("order by");
/// `AS`
pub const TOKEN_AS: QueryToken = QueryToken::keyword("AS");
/// `asc`
pub const TOKEN_ASC: QueryToken = QueryToken::keyword("asc");
/// `desc`
pub const TOKEN_DESC: QueryToken = QueryToken::keyword("desc");
/// `NOT`
pub const TOKEN_NOT: QueryToken = QueryToken::keyword("NOT");
/// `NULLS`
pub const TOKEN_NULLS: QueryToken = QueryToken::keyword("NULLS");
/// `FIRST`
pub const TOKEN_FIRST: QueryToken = QueryToken::keyword("FIRST");
/// `LAST`
pub const TOKEN_LAST: QueryToken = QueryToken::keyword("LAST");

/// Immutable tree of tokens.
///
/// Appending to [`QueryRenderer::Empty`] yields the other operand unchanged,
/// so empty fragments never introduce spacing artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum QueryRenderer {
    /// Renders nothing.
    #[default]
    Empty,

    /// Flat token run.
    Tokens(Vec<QueryToken>),

    /// Nested renderers, spaced around expressions.
    Composite(Vec<QueryRenderer>),

    /// Wrapper that never counts as an expression.
    Inline(Box<QueryRenderer>),

    /// Wrapper that always counts as an expression.
    Expression(Box<QueryRenderer>)
}

impl QueryRenderer {
    /// Renderer over `tokens`.
    pub fn from_tokens(tokens: impl IntoIterator<Item = QueryToken>) -> Self {
        let tokens: Vec<QueryToken> = tokens.into_iter().collect();
        if tokens.is_empty() {
            Self::Empty
        } else {
            Self::Tokens(tokens)
        }
    }

    /// Renderer over a single token.
    pub fn from_token(token: QueryToken) -> Self {
        Self::Tokens(vec![token])
    }

    /// Wrap as inline fragment.
    pub fn inline(self) -> Self {
        match self {
            Self::Empty => Self::Empty,
            Self::Inline(_) => self,
            other => Self::Inline(Box::new(other))
        }
    }

    /// Wrap as expression fragment.
    pub fn expression(self) -> Self {
        match self {
            Self::Empty => Self::Empty,
            Self::Expression(_) => self,
            other => Self::Expression(Box::new(other))
        }
    }

    /// Append `other`, flattening where possible.
    #[must_use]
    pub fn append(self, other: QueryRenderer) -> Self {
        match (self, other) {
            (Self::Empty, other) => other,
            (this, Self::Empty) => this,
            (Self::Tokens(mut left), Self::Tokens(right)) => {
                left.extend(right);
                Self::Tokens(left)
            }
            (Self::Composite(mut nested), other) => {
                nested.push(other);
                Self::Composite(nested)
            }
            (this, other) => Self::Composite(vec![this, other])
        }
    }

    /// Check if appending to this renderer needs a separating space.
    pub fn is_expression(&self) -> bool {
        match self {
            Self::Empty | Self::Inline(_) => false,
            Self::Tokens(tokens) => tokens.last().is_some_and(QueryToken::is_expression),
            Self::Composite(nested) => nested.last().is_some_and(Self::is_expression),
            Self::Expression(_) => true
        }
    }

    /// Check if the renderer holds no tokens.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Tokens(tokens) => tokens.is_empty(),
            Self::Composite(nested) => nested.iter().all(Self::is_empty),
            Self::Inline(inner) | Self::Expression(inner) => inner.is_empty()
        }
    }

    /// All tokens in order.
    pub fn tokens(&self) -> Vec<&QueryToken> {
        let mut out = Vec::new();
        self.collect_tokens(&mut out);
        out
    }

    fn collect_tokens<'a>(&'a self, out: &mut Vec<&'a QueryToken>) {
        match self {
            Self::Empty => {}
            Self::Tokens(tokens) => out.extend(tokens.iter()),
            Self::Composite(nested) => nested.iter().for_each(|r| r.collect_tokens(out)),
            Self::Inline(inner) | Self::Expression(inner) => inner.collect_tokens(out)
        }
    }

    /// Render to query text.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out);
        out
    }

    fn render_into(&self, out: &mut String) {
        match self {
            Self::Empty => {}
            Self::Tokens(tokens) => {
                let mut previous_expression = false;
                for token in tokens {
                    if previous_expression && !out.is_empty() && !out.ends_with(' ') {
                        out.push(' ');
                    }
                    previous_expression = token.is_expression();
                    out.push_str(token.value());
                }
            }
            Self::Composite(nested) => {
                // Spacing is decided between siblings only; the enclosing
                // renderer owns the space in front of the first one.
                let mut last_expression: Option<bool> = None;
                for renderer in nested.iter().filter(|r| !r.is_empty()) {
                    if let Some(last) = last_expression
                        && !out.ends_with(' ')
                        && (last || renderer.is_expression())
                    {
                        out.push(' ');
                    }
                    renderer.render_into(out);
                    last_expression = Some(renderer.is_expression());
                }
            }
            Self::Inline(inner) | Self::Expression(inner) => inner.render_into(out)
        }
    }
}

impl fmt::Display for QueryRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Mutable accumulator producing a [`QueryRenderer`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryRendererBuilder {
    current: QueryRenderer
}

impl QueryRendererBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder holding one token.
    pub fn from_token(token: QueryToken) -> Self {
        let mut builder = Self::new();
        builder.append(token);
        builder
    }

    /// Join rendered elements with `separator`, each element as inline.
    ///
    /// # Arguments
    ///
    /// * `elements` — Items to render
    /// * `visitor` — Renders one item
    /// * `separator` — Token placed between items
    pub fn concat<T, F>(elements: impl IntoIterator<Item = T>, visitor: F, separator: QueryToken) -> Self
    where
        F: FnMut(T) -> QueryRendererBuilder
    {
        Self::concat_with(elements, visitor, QueryRendererBuilder::to_inline, separator)
    }

    /// Join rendered elements with `separator`, each element as expression.
    pub fn concat_expressions<T, F>(
        elements: impl IntoIterator<Item = T>,
        visitor: F,
        separator: QueryToken
    ) -> Self
    where
        F: FnMut(T) -> QueryRendererBuilder
    {
        Self::concat_with(elements, visitor, QueryRendererBuilder::to_expression, separator)
    }

    fn concat_with<T, F, P>(
        elements: impl IntoIterator<Item = T>,
        mut visitor: F,
        post: P,
        separator: QueryToken
    ) -> Self
    where
        F: FnMut(T) -> QueryRendererBuilder,
        P: Fn(QueryRendererBuilder) -> QueryRenderer
    {
        let mut builder = Self::new();
        for element in elements {
            if !builder.is_empty() {
                builder.append(separator.clone());
            }
            builder.append_renderer(post(visitor(element)));
        }
        builder
    }

    /// Append a token.
    pub fn append(&mut self, token: QueryToken) -> &mut Self {
        self.append_renderer(QueryRenderer::from_token(token))
    }

    /// Append several tokens as one run.
    pub fn append_tokens(&mut self, tokens: impl IntoIterator<Item = QueryToken>) -> &mut Self {
        self.append_renderer(QueryRenderer::from_tokens(tokens))
    }

    /// Append a renderer as is.
    pub fn append_renderer(&mut self, renderer: QueryRenderer) -> &mut Self {
        if !renderer.is_empty() {
            let current = std::mem::take(&mut self.current);
            self.current = current.append(renderer);
        }
        self
    }

    /// Append another builder's content as is.
    pub fn append_builder(&mut self, builder: QueryRendererBuilder) -> &mut Self {
        self.append_renderer(builder.current)
    }

    /// Append a renderer so that it never forces a following space.
    pub fn append_inline(&mut self, renderer: QueryRenderer) -> &mut Self {
        if renderer.is_expression() {
            self.append_renderer(renderer.inline())
        } else {
            self.append_renderer(renderer)
        }
    }

    /// Append a builder's content as inline fragment.
    pub fn append_inline_builder(&mut self, builder: QueryRendererBuilder) -> &mut Self {
        self.append_inline(builder.current)
    }

    /// Append a renderer spaced off from its neighbours.
    pub fn append_expression(&mut self, renderer: QueryRenderer) -> &mut Self {
        if renderer.is_expression() {
            self.append_renderer(renderer)
        } else {
            self.append_renderer(renderer.expression())
        }
    }

    /// Append a builder's content as expression.
    pub fn append_expression_builder(&mut self, builder: QueryRendererBuilder) -> &mut Self {
        self.append_expression(builder.current)
    }

    /// Check if nothing was appended.
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Content as expression renderer.
    pub fn to_expression(self) -> QueryRenderer {
        self.current.expression()
    }

    /// Content as inline renderer.
    pub fn to_inline(self) -> QueryRenderer {
        self.current.inline()
    }

    /// Finish building.
    pub fn build(self) -> QueryRenderer {
        self.current
    }

    /// Render the current content.
    pub fn render(&self) -> String {
        self.current.render()
    }
}

impl fmt::Display for QueryRendererBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.current.render())
    }
}

impl From<QueryRendererBuilder> for QueryRenderer {
    fn from(builder: QueryRendererBuilder) -> Self {
        builder.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expressions_are_spaced() {
        let r = QueryRenderer::from_tokens([expression("select"), token("u")]);
        assert_eq!(r.render(), "select u");
    }

    #[test]
    fn plain_tokens_are_glued() {
        let r = QueryRenderer::from_tokens([TOKEN_COUNT_FUNC, token("u"), TOKEN_CLOSE_PAREN]);
        assert_eq!(r.render(), "count(u)");
    }

    #[test]
    fn no_double_space_after_comma() {
        let mut b = QueryRendererBuilder::new();
        b.append(token("a"));
        b.append(TOKEN_COMMA);
        b.append_expression(QueryRenderer::from_token(token("b")));
        assert_eq!(b.render(), "a, b");
    }

    #[test]
    fn empty_is_neutral() {
        let r = QueryRenderer::from_token(expression("x"));
        assert_eq!(QueryRenderer::Empty.append(r.clone()), r);
        assert_eq!(r.clone().append(QueryRenderer::Empty), r);
    }

    #[test]
    fn composite_takes_expression_from_last() {
        let r = QueryRenderer::from_token(token("a"))
            .inline()
            .append(QueryRenderer::from_token(token("b")).expression());
        assert!(r.is_expression());
        let r = r.append(QueryRenderer::from_token(token("c")).inline());
        assert!(!r.is_expression());
    }

    #[test]
    fn clause_composition() {
        let mut select = QueryRendererBuilder::new();
        select.append(expression("select"));
        select.append(token("u"));

        let mut from = QueryRendererBuilder::new();
        from.append(expression("from"));
        from.append(token("User u"));

        let mut query = QueryRendererBuilder::new();
        query.append_expression_builder(select);
        query.append_expression_builder(from);
        assert_eq!(query.render(), "select u from User u");
    }

    #[test]
    fn concat_with_separator() {
        let b = QueryRendererBuilder::concat(
            ["a", "b", "c"],
            |s| QueryRendererBuilder::from_token(token(s)),
            TOKEN_COMMA
        );
        assert_eq!(b.render(), "a, b, c");
    }

    #[test]
    fn tokens_flatten_in_order() {
        let r = QueryRenderer::from_token(token("a"))
            .expression()
            .append(QueryRenderer::from_tokens([token("b"), token("c")]));
        let values: Vec<&str> = r.tokens().into_iter().map(QueryToken::value).collect();
        assert_eq!(values, ["a", "b", "c"]);
    }
}

// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Lexical enhancer for native SQL.
//!
//! Native queries are not parsed. The enhancer locates the top-level
//! `select`, `from` and `order by` keywords (outside quotes and parentheses)
//! and splices text around them.

use std::sync::LazyLock;

use entity_query_core::{ReturnedType, Sort};
use regex::Regex;

use super::{QueryEnhancer, check_sort_expression, render, sort};
use crate::{
    error::{QueryError, QueryResult},
    token::{QueryRenderer, QueryRendererBuilder, TOKEN_COMMA, TOKEN_ORDER_BY, expression, token}
};

/// Entity or table followed by its alias, anchored at `from`.
static ALIAS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^from\s+([\w.$`"\[\]]+)(?:\s+as)?\s+([\w$]+)"#)
        .expect("static regex")
});

/// Result variables declared in a select list.
static SELECT_ALIAS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bas\s+([\w$]+)").expect("static regex")
});

/// Aliases of joined tables.
static JOIN_ALIAS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bjoin\s+(?:fetch\s+)?[\w.$]+\s+(?:as\s+)?([\w$]+)")
        .expect("static regex")
});

/// Words that follow a table name but are not its alias.
const NOT_ALIASES: &[&str] = &[
    "on", "where", "having", "order", "group", "join", "natural", "left", "right", "inner", "cross",
    "full", "set", "union", "fetch", "outer", "window", "limit", "offset", "with", "for"
];

/// Clauses that may follow ORDER BY.
const AFTER_ORDER_BY: &[&str] = &["limit", "offset", "fetch", "for"];

/// Word outside quotes with its nesting depth.
#[derive(Debug, Clone, Copy)]
struct Word {
    start: usize,
    end:   usize,
    depth: usize
}

fn scan(query: &str) -> Vec<Word> {
    let mut words = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut word_start: Option<usize> = None;
    for (i, c) in query.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        let is_word_char = c.is_alphanumeric() || c == '_' || c == '$';
        if is_word_char {
            word_start.get_or_insert(i);
            continue;
        }
        if let Some(start) = word_start.take() {
            words.push(Word {
                start,
                end: i,
                depth
            });
        }
        match c {
            '\'' | '"' | '`' => quote = Some(c),
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    if let Some(start) = word_start {
        words.push(Word {
            start,
            end: query.len(),
            depth
        });
    }
    words
}

/// Lexical enhancer for native SQL and queries no grammar understands.
#[derive(Debug, Clone)]
pub struct NativeQueryEnhancer {
    query:      String,
    select:     Option<(usize, usize)>,
    distinct:   bool,
    from:       Option<usize>,
    order_by:   Option<(usize, usize)>,
    tail_start: Option<usize>,
    alias:      Option<String>,
    projection: String
}

impl NativeQueryEnhancer {
    /// Scan `query`.
    pub fn new(query: &str) -> Self {
        let words: Vec<Word> = scan(query).into_iter().filter(|w| w.depth == 0).collect();
        let is = |w: &Word, keyword: &str| query[w.start..w.end].eq_ignore_ascii_case(keyword);

        let select_index = words.iter().position(|w| is(w, "select"));
        let distinct = select_index
            .and_then(|i| words.get(i + 1))
            .is_some_and(|w| is(w, "distinct"));
        let from_index = words
            .iter()
            .enumerate()
            .skip(select_index.unwrap_or(0))
            .find(|(_, w)| is(w, "from"))
            .map(|(i, _)| i);

        let order_index = words
            .windows(2)
            .rposition(|pair| is(&pair[0], "order") && is(&pair[1], "by"));
        let tail_index = words
            .iter()
            .enumerate()
            .skip(order_index.or(from_index).unwrap_or(0))
            .find(|(_, w)| AFTER_ORDER_BY.iter().any(|k| is(w, k)))
            .map(|(i, _)| i);

        let select = select_index.map(|i| (words[i].start, words[i].end));
        let from = from_index.map(|i| words[i].start);
        let tail_start = tail_index.map(|i| words[i].start);
        let order_by = order_index.map(|i| (words[i].start, tail_start.unwrap_or(query.len())));

        let projection = match (select_index, from) {
            (Some(i), Some(from)) => {
                let start = if distinct { words[i + 1].end } else { words[i].end };
                query[start..from].trim().to_owned()
            }
            _ => String::new()
        };

        let alias = from.and_then(|from| {
            ALIAS
                .captures(&query[from..])
                .and_then(|caps| caps.get(2))
                .map(|m| m.as_str())
                .filter(|alias| !NOT_ALIASES.iter().any(|k| alias.eq_ignore_ascii_case(k)))
                .map(str::to_owned)
        });

        Self {
            query: query.to_owned(),
            select,
            distinct,
            from,
            order_by,
            tail_start,
            alias,
            projection
        }
    }

    /// Result variables and join aliases that need no qualification.
    fn known_aliases(&self) -> Vec<String> {
        let mut known: Vec<String> = SELECT_ALIAS
            .captures_iter(&self.projection)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_owned()))
            .collect();
        if let Some(from) = self.from {
            known.extend(
                JOIN_ALIAS
                    .captures_iter(&self.query[from..])
                    .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_owned()))
            );
        }
        known
    }

    /// Query without its ORDER BY clause.
    fn without_order_by(&self) -> String {
        match self.order_by {
            Some((start, end)) => {
                let head = self.query[..start].trim_end();
                let tail = self.query[end..].trim();
                if tail.is_empty() {
                    head.to_owned()
                } else {
                    format!("{head} {tail}")
                }
            }
            None => self.query.trim_end().to_owned()
        }
    }

    fn count_argument(&self, projection: Option<&str>) -> String {
        if let Some(projection) = projection {
            return projection.to_owned();
        }
        let list = self.projection.as_str();
        let single = !list.is_empty()
            && !list.contains(',')
            && list != "*"
            && !list.ends_with(".*")
            && !list.to_ascii_lowercase().starts_with("new ");
        match (single, self.distinct) {
            (true, true) => format!("distinct {list}"),
            (true, false) => list.to_owned(),
            (false, _) if list.to_ascii_lowercase().starts_with("new ") => {
                self.alias.clone().unwrap_or_else(|| "*".to_owned())
            }
            (false, _) => "*".to_owned()
        }
    }
}

impl QueryEnhancer for NativeQueryEnhancer {
    fn query_string(&self) -> &str {
        &self.query
    }

    fn detect_alias(&self) -> Option<String> {
        self.alias.clone()
    }

    fn projection(&self) -> String {
        self.projection.clone()
    }

    fn has_constructor_expression(&self) -> bool {
        self.projection.to_ascii_lowercase().starts_with("new ")
    }

    fn rewrite(&self, sort: &Sort, _returned_type: &ReturnedType) -> QueryResult<String> {
        if sort.is_unsorted() {
            return Ok(self.query.clone());
        }
        for order in sort {
            check_sort_expression(order)?;
        }
        let known = self.known_aliases();
        let items = render::list(sort.iter(), |order| {
            render::order_item(&sort::order_item(order, self.alias.as_deref(), &known))
        });

        let split = self.tail_start.unwrap_or(self.query.len());
        let head = self.query[..split].trim_end();
        let tail = self.query[split..].trim();

        let mut builder = QueryRendererBuilder::new();
        if self.order_by.is_some() {
            builder.append_tokens([token(head), TOKEN_COMMA]);
        } else {
            builder.append_expression(QueryRenderer::from_token(token(head)));
            builder.append_expression(QueryRenderer::from_token(TOKEN_ORDER_BY));
        }
        builder.append_expression(items);
        if !tail.is_empty() {
            builder.append_expression(QueryRenderer::from_token(token(tail)));
        }
        Ok(builder.render())
    }

    fn create_count_query(&self, projection: Option<&str>) -> QueryResult<String> {
        let (Some((select_start, select_end)), Some(from)) = (self.select, self.from) else {
            return Err(QueryError::InvalidQuery(format!(
                "Cannot derive count query for [{}]",
                self.query
            )));
        };
        if projection.is_none() && self.projection.to_ascii_lowercase().starts_with("count(") {
            return Ok(self.without_order_by());
        }
        let stripped = self.without_order_by();
        let body = stripped.get(from..).unwrap_or_default().trim();

        let mut builder = QueryRendererBuilder::new();
        let prologue = self.query[..select_start].trim();
        if !prologue.is_empty() {
            builder.append_expression(QueryRenderer::from_token(token(prologue)));
        }
        builder.append_expression(QueryRenderer::from_token(expression(&self.query[select_start..select_end])));
        builder.append_expression(render::call(
            "count",
            QueryRenderer::from_token(token(self.count_argument(projection)))
        ));
        builder.append_expression(QueryRenderer::from_token(token(body)));
        Ok(builder.render())
    }
}

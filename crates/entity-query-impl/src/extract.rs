// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Parameter extraction from declared query strings.
//!
//! Declared queries may decorate markers with wildcards (`like %:name%`) and
//! embed value expressions (`:#{#user.name}`). Neither is understood by the
//! persistence provider, so extraction produces a cleaned query string that
//! only contains plain `?N` / `:name` markers together with the
//! [`ParameterBinding`]s describing how to produce each bound value.
//!
//! ```text
//! select u from User u where u.name like %:name% or u.alias = :name
//!                                        ^^^^^^^               ^^^^^
//!                                        Like(Containing)      Basic
//! select u from User u where u.name like :name or u.alias = :name_1
//! ```
//!
//! Two markers bound to the same method argument share one query parameter
//! only when their bindings are compatible. Otherwise the later one receives a
//! fresh parameter, `name_1` for named markers or the next free index for
//! positional ones.

use std::{
    collections::{BTreeSet, HashMap},
    sync::LazyLock
};

use regex::{Captures, Regex};

use crate::{
    binding::{BindingIdentifier, BindingKind, LikeType, ParameterBinding, ParameterOrigin},
    error::{QueryError, QueryResult}
};

/// Name prefix of markers substituted for named value expressions.
const EXPRESSION_PARAMETER_PREFIX: &str = "__$synthetic$__";

/// Groups: 1 keyword, 2 decorated marker, 4 index digits, 6 name.
static PARAMETER_BINDING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)(like |in )?(?: )?\(?",
        r"(%?(\?(\d*))%?|%?(:([^\p{Z}\p{Cc}\p{Cf}!-#%-\-/:-@\[-^`{-~]+))%?)",
        r"\)?"
    ))
    .expect("static regex")
});

static INDEXED_PARAMETER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\?(\d*)").expect("static regex"));

const MIXED_STYLE: &str = "Mixing of ? parameters and other forms like ?1 is not supported";

/// Declared query with its markers normalized and bindings extracted.
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessedQuery {
    query:               String,
    is_native:           bool,
    bindings:            Vec<ParameterBinding>,
    uses_jdbc_style:     bool,
    contains_pageable:   bool,
    has_named_parameter: bool
}

impl PreprocessedQuery {
    /// Extract the bindings of `query`.
    ///
    /// # Errors
    ///
    /// - [`QueryError::InvalidQuery`] when `?` is mixed with `?1` or `:name`
    /// - [`QueryError::Binding`] when one marker is used with differing
    ///   binding types
    pub fn parse(query: &str, is_native: bool) -> QueryResult<Self> {
        Self::parse_with(query, is_native, |_| {})
    }

    fn parse_with<F>(query: &str, is_native: bool, post_process: F) -> QueryResult<Self>
    where
        F: FnOnce(&mut Vec<ParameterBinding>)
    {
        let mut labels = ParameterLabels::new(find_parameter_indices(query));
        let by_index = labels.has_labels() || query.contains("?#{");
        let substituted = substitute_expressions(query, by_index, &mut labels);
        let quoted = QuotedRanges::scan(&substituted.query);

        let mut bindings = Vec::new();
        let mut registry = Registry::default();
        let mut result = String::with_capacity(substituted.query.len());
        let mut copied = 0;
        let mut jdbc_style = false;
        let mut jpa_style = false;

        let mut search_from = 0;
        while let Some(caps) = PARAMETER_BINDING.captures_at(&substituted.query, search_from) {
            let Some(whole) = caps.get(0) else {
                break;
            };
            let Some(marker) = valid_marker(&substituted.query, &caps) else {
                search_from = next_char_boundary(&substituted.query, whole.start());
                continue;
            };
            search_from = whole.end().max(next_char_boundary(&substituted.query, whole.start()));
            if quoted.contains(whole.start()) {
                continue;
            }

            match &marker {
                Marker::Indexed(None) => jdbc_style = true,
                Marker::Indexed(Some(_)) | Marker::Named(_) => jpa_style = true
            }
            if jpa_style && jdbc_style {
                return Err(QueryError::InvalidQuery(MIXED_STYLE.into()));
            }

            let Some(decorated) = caps.get(2) else {
                continue;
            };
            let expression = match &marker {
                Marker::Indexed(Some(index)) => substituted.expressions.get(&index.to_string()),
                Marker::Indexed(None) => None,
                Marker::Named(name) => substituted.expressions.get(name.as_str())
            };

            let (query_parameter, argument) = match &marker {
                Marker::Indexed(Some(index)) => {
                    (BindingIdentifier::indexed(*index), BindingIdentifier::indexed(*index))
                }
                Marker::Indexed(None) => {
                    let index = labels.allocate();
                    (BindingIdentifier::indexed(index), BindingIdentifier::indexed(index))
                }
                Marker::Named(name) => (BindingIdentifier::named(name.clone()), BindingIdentifier::named(name.clone()))
            };

            let kind = match caps.get(1).map(|m| m.as_str().trim().to_ascii_lowercase()) {
                Some(keyword) if keyword == "like" => {
                    BindingKind::Like(LikeType::from_expression(decorated.as_str()))
                }
                Some(keyword) if keyword == "in" => BindingKind::In,
                _ => BindingKind::Basic
            };

            let target = match expression {
                Some(expression) => {
                    let binding = ParameterBinding::with_kind(
                        query_parameter.clone(),
                        ParameterOrigin::expression(expression.clone()),
                        kind
                    );
                    check_and_register(binding, &mut bindings)?;
                    query_parameter
                }
                None => registry.register(query_parameter, argument, kind, &mut bindings, &mut labels)?
            };

            let replacement = match target.name() {
                Some(name) => format!(":{name}"),
                None if !jpa_style && jdbc_style => "?".to_owned(),
                None => format!("?{}", target.position().unwrap_or_default())
            };

            result.push_str(&substituted.query[copied..decorated.start()]);
            result.push_str(&replacement);
            copied = decorated.end();
        }
        result.push_str(&substituted.query[copied..]);

        post_process(&mut bindings);

        let has_named_parameter = bindings
            .iter()
            .any(|b| b.name().is_some() && b.origin().is_method_argument());

        tracing::trace!(bindings = bindings.len(), native = is_native, "extracted parameter bindings");

        Ok(Self {
            query: result,
            is_native,
            bindings,
            uses_jdbc_style: jdbc_style,
            contains_pageable: query.contains("#pageable"),
            has_named_parameter
        })
    }

    /// Cleaned query string.
    pub fn query_string(&self) -> &str {
        &self.query
    }

    /// Check for native SQL.
    pub const fn is_native(&self) -> bool {
        self.is_native
    }

    /// Extracted bindings in order of first occurrence.
    pub fn bindings(&self) -> &[ParameterBinding] {
        &self.bindings
    }

    /// Check for any bindings.
    pub fn has_bindings(&self) -> bool {
        !self.bindings.is_empty()
    }

    /// Check if a named marker is bound to a method argument.
    pub const fn has_named_parameter(&self) -> bool {
        self.has_named_parameter
    }

    /// Check for JDBC-style `?` markers.
    pub const fn uses_jdbc_style_parameters(&self) -> bool {
        self.uses_jdbc_style
    }

    /// Check if a value expression references the pageable.
    pub const fn contains_pageable_in_expression(&self) -> bool {
        self.contains_pageable
    }

    /// Extract `query`, derived from this one, keeping the original bindings
    /// where the derived markers would bind differently.
    ///
    /// Derived queries (count queries, sorted variants) only see plain
    /// markers, so expression and LIKE bindings are carried over.
    pub fn rewrite(&self, query: &str) -> QueryResult<Self> {
        let original = &self.bindings;
        Self::parse_with(query, self.is_native, |derived| {
            if original.is_empty() || original == derived {
                return;
            }
            for binding in original {
                let before = derived.len();
                derived.retain(|it| !(binding.binds_to(it) && !binding.is_compatible_with(it)));
                if derived.len() != before {
                    derived.push(binding.clone());
                }
            }
        })
    }
}

/// Marker recognised by the scan.
enum Marker {
    /// `?N`, or `?` when `None`.
    Indexed(Option<usize>),

    /// `:name`
    Named(String)
}

/// Apply the neighbour checks the pattern cannot express.
///
/// `?` must not be followed by `#` or a word character, `:` must not be
/// preceded by `:` or `\`.
fn valid_marker(text: &str, caps: &Captures<'_>) -> Option<Marker> {
    if let Some(digits) = caps.get(4) {
        let next = text[digits.end()..].chars().next();
        if next.is_some_and(|c| c == '#' || c.is_alphanumeric() || c == '_') {
            return None;
        }
        if digits.as_str().is_empty() {
            return Some(Marker::Indexed(None));
        }
        return digits.as_str().parse().ok().map(|i| Marker::Indexed(Some(i)));
    }
    let colon = caps.get(5)?;
    let previous = text[..colon.start()].chars().next_back();
    if previous.is_some_and(|c| c == ':' || c == '\\') {
        return None;
    }
    caps.get(6).map(|name| Marker::Named(name.as_str().to_owned()))
}

fn next_char_boundary(text: &str, from: usize) -> usize {
    text[from..].chars().next().map_or(text.len(), |c| from + c.len_utf8())
}

fn find_parameter_indices(query: &str) -> BTreeSet<usize> {
    INDEXED_PARAMETER
        .captures_iter(query)
        .filter_map(|caps| {
            let digits = caps.get(1)?;
            let next = query[digits.end()..].chars().next();
            if next.is_some_and(|c| c == '#' || c.is_alphanumeric() || c == '_') {
                return None;
            }
            digits.as_str().parse().ok()
        })
        .collect()
}

/// Registers bindings of method argument markers.
#[derive(Default)]
struct Registry {
    by_argument: HashMap<BindingIdentifier, Vec<ParameterBinding>>
}

impl Registry {
    fn register(
        &mut self,
        identifier: BindingIdentifier,
        argument: BindingIdentifier,
        kind: BindingKind,
        bindings: &mut Vec<ParameterBinding>,
        labels: &mut ParameterLabels
    ) -> QueryResult<BindingIdentifier> {
        let origin = ParameterOrigin::argument(argument.clone());
        let is_bound = self
            .by_argument
            .get(&identifier)
            .is_some_and(|existing| !existing.is_empty());

        if !is_bound {
            let binding = ParameterBinding::with_kind(identifier.clone(), origin, kind);
            check_and_register(binding.clone(), bindings)?;
            self.by_argument.entry(argument).or_default().push(binding);
            return Ok(identifier);
        }

        let candidate = ParameterBinding::with_kind(identifier.clone(), origin.clone(), kind.clone());
        if let Some(existing) = self
            .by_argument
            .get(&argument)
            .and_then(|list| list.iter().find(|existing| existing.is_compatible_with(&candidate)))
        {
            return Ok(existing.identifier().clone());
        }

        let synthetic = match (identifier.name(), argument.name()) {
            (Some(_), Some(base)) => {
                let mut index = 0;
                let mut name = base.to_owned();
                while self.exists_name(&name) {
                    index += 1;
                    name = format!("{base}_{index}");
                }
                BindingIdentifier::named(name)
            }
            _ => BindingIdentifier::indexed(labels.allocate())
        };

        let binding = ParameterBinding::with_kind(synthetic.clone(), origin, kind);
        check_and_register(binding.clone(), bindings)?;
        self.by_argument.entry(argument).or_default().push(binding);
        Ok(synthetic)
    }

    fn exists_name(&self, name: &str) -> bool {
        self.by_argument
            .values()
            .flatten()
            .any(|binding| binding.name() == Some(name))
    }
}

fn check_and_register(binding: ParameterBinding, bindings: &mut Vec<ParameterBinding>) -> QueryResult<()> {
    if let Some(existing) = bindings.iter().find(|it| it.binds_to(&binding) && **it != binding) {
        return Err(QueryError::Binding(format!(
            "Already found parameter binding with same index / parameter name but differing binding type; \
             Already have: {existing}, found {binding}; \
             If you bind a parameter multiple times make sure they use the same binding"
        )));
    }
    if !bindings.contains(&binding) {
        bindings.push(binding);
    }
    Ok(())
}

/// Allocator of positional labels.
///
/// When the used labels are exactly `1..=n`, new labels are appended;
/// otherwise the first gap is filled.
struct ParameterLabels {
    used:       BTreeSet<usize>,
    sequential: bool
}

impl ParameterLabels {
    fn new(used: BTreeSet<usize>) -> Self {
        let sequential = (1..=used.len()).all(|i| used.contains(&i));
        Self {
            used,
            sequential
        }
    }

    fn has_labels(&self) -> bool {
        !self.used.is_empty()
    }

    fn allocate(&mut self) -> usize {
        let index = if self.sequential {
            self.used.len() + 1
        } else {
            (1..).find(|i| !self.used.contains(i)).unwrap_or(self.used.len() + 1)
        };
        self.used.insert(index);
        index
    }
}

/// Query with value expressions replaced by markers.
struct Substituted {
    query:       String,
    expressions: HashMap<String, String>
}

/// Replace `:#{…}` and `?#{…}` outside quotes with synthetic markers.
fn substitute_expressions(query: &str, by_index: bool, labels: &mut ParameterLabels) -> Substituted {
    let quoted = QuotedRanges::scan(query);
    let mut out = String::with_capacity(query.len());
    let mut expressions = HashMap::new();
    let mut rest = 0;
    let mut cursor = 0;
    let bytes = query.as_bytes();

    while cursor + 2 < bytes.len() {
        let is_start = (bytes[cursor] == b':' || bytes[cursor] == b'?')
            && bytes[cursor + 1] == b'#'
            && bytes[cursor + 2] == b'{';
        if !is_start || quoted.contains(cursor) {
            cursor += 1;
            continue;
        }
        let Some(end) = matching_brace(query, cursor + 2) else {
            break;
        };
        let expression = &query[cursor + 3..end];
        let name = if by_index {
            labels.allocate().to_string()
        } else {
            format!("{EXPRESSION_PARAMETER_PREFIX}{}", expressions.len() + 1)
        };
        out.push_str(&query[rest..cursor]);
        out.push(if by_index { '?' } else { ':' });
        out.push_str(&name);
        expressions.insert(name, expression.trim().to_owned());
        cursor = end + 1;
        rest = cursor;
    }
    out.push_str(&query[rest..]);

    Substituted {
        query: out,
        expressions
    }
}

/// Index of the `}` closing the `{` at `open`.
fn matching_brace(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (index, c) in text[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + index);
                }
            }
            _ => {}
        }
    }
    None
}

/// Byte ranges enclosed in single or double quotes.
struct QuotedRanges {
    ranges: Vec<(usize, usize)>
}

impl QuotedRanges {
    fn scan(text: &str) -> Self {
        let mut ranges = Vec::new();
        let mut open: Option<(char, usize)> = None;
        for (index, c) in text.char_indices() {
            if c != '\'' && c != '"' {
                continue;
            }
            match open {
                None => open = Some((c, index)),
                Some((quote, start)) if quote == c => {
                    ranges.push((start, index));
                    open = None;
                }
                Some(_) => {}
            }
        }
        if let Some((_, start)) = open {
            ranges.push((start, text.len()));
        }
        Self {
            ranges
        }
    }

    fn contains(&self, position: usize) -> bool {
        self.ranges
            .iter()
            .any(|&(start, end)| start <= position && position <= end)
    }
}

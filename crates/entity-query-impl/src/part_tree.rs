// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Method name parsing.
//!
//! A derived query method name has the shape
//!
//! ```text
//! find Distinct First10 Users By Lastname And AgeGreaterThan Or Email IgnoreCase OrderBy AgeDesc
//! |--- subject ----------------| |--------------- predicate -----------------| |-- order --|
//! ```
//!
//! The predicate is a disjunction ([`OrPart`]) of conjunctions of [`Part`]s.
//! Every part resolves its property path against the [`Metamodel`] while the
//! tree is built, so misspelled properties fail when the repository method is
//! set up rather than when it is called.
//!
//! # Overview
//!
//! - [`PartTree`] — Parsed method name
//! - [`PartType`] — Predicate keyword of a part
//! - [`PropertyPath`] — Resolved dot path of a part
//! - [`IgnoreCaseType`] — Case sensitivity of a part

mod keyword;
mod property;

use std::sync::LazyLock;

use entity_query_core::{ManagedType, Metamodel, Order, Sort};
use regex::Regex;

pub use self::{
    keyword::PartType,
    property::{PathSegment, PropertyPath}
};
use crate::error::{QueryError, QueryResult};

static PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(find|read|get|query|search|stream|count|exists|delete|remove)((\p{Lu}.*?))??By")
        .expect("static regex")
});

static LIMITED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(find|read|get|query|search|stream)(Distinct)?(First|Top)(\d*)?(\p{Lu}.*?)??By")
        .expect("static regex")
});

static ALL_IGNORE_CASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"AllIgnor(ing|e)Case").expect("static regex"));

static IGNORE_CASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Ignor(ing|e)Case").expect("static regex"));

const ORDER_BY: &str = "OrderBy";

/// Case sensitivity requested for a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IgnoreCaseType {
    /// Compare as is.
    #[default]
    Never,

    /// `IgnoreCase` on the part; non-string properties are an error.
    Always,

    /// `AllIgnoreCase` on the method; applied to string properties only.
    WhenPossible
}

/// Single predicate of a method name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    source:      String,
    part_type:   PartType,
    property:    PropertyPath,
    ignore_case: IgnoreCaseType
}

impl Part {
    /// Parse one part, e.g. `LastnameIgnoreCase` or `AgeGreaterThan`.
    pub fn parse(
        source: &str,
        owner: &ManagedType,
        metamodel: &dyn Metamodel,
        always_ignore_case: bool
    ) -> QueryResult<Self> {
        let (stripped, mut ignore_case) = match IGNORE_CASE.find(source) {
            Some(m) => (
                format!("{}{}", &source[..m.start()], &source[m.end()..]),
                IgnoreCaseType::Always
            ),
            None => (source.to_owned(), IgnoreCaseType::Never)
        };
        if always_ignore_case && ignore_case != IgnoreCaseType::Always {
            ignore_case = IgnoreCaseType::WhenPossible;
        }
        let part_type = PartType::from_property(&stripped);
        let property = PropertyPath::from(&part_type.extract_property(&stripped), owner, metamodel)?;
        Ok(Self {
            source: source.to_owned(),
            part_type,
            property,
            ignore_case
        })
    }

    /// Part with an explicit type, used for keyset and example predicates.
    pub fn of(property: PropertyPath, part_type: PartType) -> Self {
        Self {
            source: property.to_dot_path(),
            part_type,
            property,
            ignore_case: IgnoreCaseType::Never
        }
    }

    /// Source text of the part.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Predicate keyword.
    pub const fn part_type(&self) -> PartType {
        self.part_type
    }

    /// Resolved property.
    pub const fn property(&self) -> &PropertyPath {
        &self.property
    }

    /// Case sensitivity.
    pub const fn ignore_case(&self) -> IgnoreCaseType {
        self.ignore_case
    }

    /// Number of method arguments consumed.
    pub const fn number_of_arguments(&self) -> usize {
        self.part_type.number_of_arguments()
    }
}

/// Conjunction of parts; the predicate is a disjunction of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrPart {
    parts: Vec<Part>
}

impl OrPart {
    /// Parts joined with `AND`.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }
}

/// Parsed method name.
///
/// # Example
///
/// ```rust,ignore
/// let tree = PartTree::parse("findTop3ByLastnameOrderByAgeDesc", &user, &metamodel)?;
///
/// assert_eq!(tree.max_results(), Some(3));
/// assert_eq!(tree.sort().orders()[0].property(), "age");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartTree {
    distinct:    bool,
    count:       bool,
    exists:      bool,
    delete:      bool,
    max_results: Option<usize>,
    nodes:       Vec<OrPart>,
    sort:        Sort
}

impl PartTree {
    /// Parse `method_name` for the domain type `owner`.
    ///
    /// # Errors
    ///
    /// - [`QueryError::PropertyNotFound`] for unresolvable properties
    /// - [`QueryError::InvalidQuery`] for malformed `OrderBy` clauses
    pub fn parse(method_name: &str, owner: &ManagedType, metamodel: &dyn Metamodel) -> QueryResult<Self> {
        let (subject, predicate) = match PREFIX.find(method_name) {
            Some(m) => (m.as_str(), &method_name[m.end()..]),
            None => ("", method_name)
        };

        let count = subject.starts_with("count");
        let exists = subject.starts_with("exists");
        let delete = subject.starts_with("delete") || subject.starts_with("remove");
        let distinct = subject.contains("Distinct");
        let max_results = LIMITED.captures(subject).map(|caps| {
            caps.get(4)
                .map(|m| m.as_str())
                .filter(|digits| !digits.is_empty())
                .and_then(|digits| digits.parse().ok())
                .unwrap_or(1)
        });

        let (predicate, always_ignore_case) = match ALL_IGNORE_CASE.find(predicate) {
            Some(m) => (format!("{}{}", &predicate[..m.start()], &predicate[m.end()..]), true),
            None => (predicate.to_owned(), false)
        };

        let clauses = split_keyword(&predicate, ORDER_BY);
        if clauses.len() > 2 {
            return Err(QueryError::InvalidQuery(
                "OrderBy must not be used more than once in a method name".into()
            ));
        }

        let mut nodes = Vec::new();
        for or_source in split_keyword(clauses[0], "Or").into_iter().filter(|s| !s.is_empty()) {
            let mut parts = Vec::new();
            for and_source in split_keyword(or_source, "And").into_iter().filter(|s| !s.is_empty()) {
                parts.push(Part::parse(and_source, owner, metamodel, always_ignore_case)?);
            }
            nodes.push(OrPart {
                parts
            });
        }

        let sort = match clauses.get(1) {
            Some(clause) => parse_order_by(clause, owner, metamodel)?,
            None => Sort::unsorted()
        };

        tracing::trace!(method = method_name, parts = nodes.len(), "parsed method name");

        Ok(Self {
            distinct,
            count,
            exists,
            delete,
            max_results,
            nodes,
            sort
        })
    }

    /// Check for `Distinct`.
    pub const fn is_distinct(&self) -> bool {
        self.distinct
    }

    /// Check for `count…By`.
    pub const fn is_count_projection(&self) -> bool {
        self.count
    }

    /// Check for `exists…By`.
    pub const fn is_exists_projection(&self) -> bool {
        self.exists
    }

    /// Check for `delete…By` / `remove…By`.
    pub const fn is_delete(&self) -> bool {
        self.delete
    }

    /// Check for `First` / `Top`.
    pub const fn is_limiting(&self) -> bool {
        self.max_results.is_some()
    }

    /// Limit from `First` / `Top`, 1 when no number follows.
    pub const fn max_results(&self) -> Option<usize> {
        self.max_results
    }

    /// Disjunction of conjunctions.
    pub fn nodes(&self) -> &[OrPart] {
        &self.nodes
    }

    /// All parts in order.
    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.nodes.iter().flat_map(|n| n.parts.iter())
    }

    /// Check if the method name carries a predicate.
    pub fn has_predicate(&self) -> bool {
        !self.nodes.is_empty()
    }

    /// Static sort from `OrderBy`.
    pub const fn sort(&self) -> &Sort {
        &self.sort
    }
}

/// Split on `keyword` when it is followed by an upper case or non-ASCII char.
fn split_keyword<'a>(text: &'a str, keyword: &str) -> Vec<&'a str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut search = 0;
    while let Some(found) = text[search..].find(keyword) {
        let at = search + found;
        let after = at + keyword.len();
        let boundary = text[after..]
            .chars()
            .next()
            .is_some_and(|c| c.is_uppercase() || !c.is_ascii());
        if boundary {
            out.push(&text[start..at]);
            start = after;
        }
        search = after;
    }
    out.push(&text[start..]);
    out
}

/// Split `LastnameAscAgeDesc` into `Lastname`, `Asc`, `Age`, `Desc`.
fn parse_order_by(clause: &str, owner: &ManagedType, metamodel: &dyn Metamodel) -> QueryResult<Sort> {
    let mut orders = Vec::new();
    for block in split_direction_blocks(clause) {
        let (property, direction) = if let Some(p) = block.strip_suffix("Asc") {
            (p, Some(entity_query_core::Direction::Asc))
        } else if let Some(p) = block.strip_suffix("Desc") {
            (p, Some(entity_query_core::Direction::Desc))
        } else {
            (block, None)
        };
        if property.is_empty() {
            return Err(QueryError::InvalidQuery(format!("Invalid order syntax for part {block}")));
        }
        let path = PropertyPath::from(property, owner, metamodel)?;
        orders.push(Order::new(path.to_dot_path(), direction.unwrap_or_default()));
    }
    Ok(Sort::by_orders(orders))
}

/// Split after `Asc` / `Desc` when an upper case letter follows.
fn split_direction_blocks(clause: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    for (index, c) in clause.char_indices() {
        if index == 0 || !c.is_uppercase() {
            continue;
        }
        let head = &clause[start..index];
        if head.ends_with("Asc") || head.ends_with("Desc") {
            out.push(head);
            start = index;
        }
    }
    out.push(&clause[start..]);
    out
}

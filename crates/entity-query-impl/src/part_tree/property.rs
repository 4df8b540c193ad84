// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Property path resolution against the metamodel.
//!
//! A method name carries property paths without separators
//! (`AddressZipCode`). Resolution first tries the whole source as one
//! property, then moves camel-case words from the right into a nested tail
//! until every segment resolves. `_` and `.` force a split.
//!
//! ```text
//! addressZipCode      -> no such property
//! addressZip + Code   -> no such property
//! address + ZipCode   -> address.zipCode
//! ```

use std::fmt;

use entity_query_core::{Attribute, ManagedType, Metamodel, ValueType};

use crate::error::{QueryError, QueryResult};

/// Upper bound on resolved segments; guards against cyclic models.
const MAX_DEPTH: usize = 1000;

/// One resolved segment of a [`PropertyPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    owner:     String,
    attribute: Attribute
}

impl PathSegment {
    /// Property name.
    pub fn name(&self) -> &str {
        self.attribute.name()
    }

    /// Fully qualified name of the type declaring the property.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Mapped attribute.
    pub const fn attribute(&self) -> &Attribute {
        &self.attribute
    }
}

/// Resolved property path, at least one segment long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyPath {
    segments: Vec<PathSegment>
}

/// Resolution failure together with the number of segments resolved before it.
struct Failure {
    depth: usize,
    error: QueryError
}

impl PropertyPath {
    /// Resolve `source` starting at the managed type `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::PropertyNotFound`] for the deepest segment that
    /// could not be resolved.
    pub fn from(source: &str, owner: &ManagedType, metamodel: &dyn Metamodel) -> QueryResult<Self> {
        let mut segments: Vec<PathSegment> = Vec::new();
        for explicit in source.split(['_', '.']).filter(|s| !s.is_empty()) {
            let owner_type = match segments.last() {
                None => owner.name().to_owned(),
                Some(last) => type_key(last.attribute.target_type())
            };
            let resolved = create(explicit, &owner_type, "", &segments, metamodel)
                .map_err(|failure| failure.error)?;
            segments.extend(resolved);
        }
        if segments.is_empty() {
            return Err(QueryError::PropertyNotFound {
                property: source.to_owned(),
                owner:    owner.simple_name().to_owned()
            });
        }
        Ok(Self {
            segments
        })
    }

    /// Path of already resolved segments.
    pub fn of(segments: Vec<PathSegment>) -> Option<Self> {
        if segments.is_empty() {
            None
        } else {
            Some(Self {
                segments
            })
        }
    }

    /// Segments from the root.
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// First segment.
    pub fn head(&self) -> &PathSegment {
        &self.segments[0]
    }

    /// Last segment.
    pub fn leaf(&self) -> &PathSegment {
        &self.segments[self.segments.len() - 1]
    }

    /// Dot separated property names.
    pub fn to_dot_path(&self) -> String {
        self.segments
            .iter()
            .map(PathSegment::name)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Check if the leaf property is collection valued.
    pub fn is_collection(&self) -> bool {
        self.leaf().attribute.kind().is_collection()
    }

    /// Declared type of the leaf property; element type for collections.
    pub fn leaf_type(&self) -> &ValueType {
        self.leaf().attribute.target_type()
    }

    /// Declared type of the leaf property including collection wrappers.
    pub fn leaf_declared_type(&self) -> &ValueType {
        self.leaf().attribute.value_type()
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_dot_path())
    }
}

fn type_key(value_type: &ValueType) -> String {
    value_type.element().name().to_owned()
}

fn simple(name: &str) -> &str {
    name.rsplit(['.', '$']).next().unwrap_or(name)
}

/// Resolve `source` (plus an unresolved `tail`) against `owner_type`.
fn create(
    source: &str,
    owner_type: &str,
    tail: &str,
    base: &[PathSegment],
    metamodel: &dyn Metamodel
) -> Result<Vec<PathSegment>, Failure> {
    if base.len() > MAX_DEPTH {
        return Err(Failure {
            depth: base.len(),
            error: QueryError::InvalidQuery(format!(
                "Trying to parse a path with depth greater than {MAX_DEPTH}"
            ))
        });
    }

    let direct = resolve_segment(source, owner_type, base, metamodel).and_then(|segment| {
        let mut resolved = vec![segment];
        if !tail.is_empty() {
            let mut nested_base = base.to_vec();
            nested_base.extend(resolved.iter().cloned());
            let nested_owner = type_key(resolved[0].attribute.target_type());
            resolved.extend(create(tail, &nested_owner, "", &nested_base, metamodel)?);
        }
        Ok(resolved)
    });

    let failure = match direct {
        Ok(resolved) => return Ok(resolved),
        Err(failure) => failure
    };

    match last_camel_word_start(source) {
        Some(position) if position != 0 => {
            let (head, word) = source.split_at(position);
            let new_tail = format!("{word}{tail}");
            create(head, owner_type, &new_tail, base, metamodel).map_err(|other| {
                if other.depth > failure.depth { other } else { failure }
            })
        }
        _ => Err(failure)
    }
}

fn resolve_segment(
    source: &str,
    owner_type: &str,
    base: &[PathSegment],
    metamodel: &dyn Metamodel
) -> Result<PathSegment, Failure> {
    let name = decapitalize(source);
    let attribute = metamodel
        .managed_type(owner_type)
        .and_then(|t| t.attribute(&name))
        .cloned();
    match attribute {
        Some(attribute) => Ok(PathSegment {
            owner: owner_type.to_owned(),
            attribute
        }),
        None => Err(Failure {
            depth: base.len(),
            error: QueryError::PropertyNotFound {
                property: name,
                owner:    simple(owner_type).to_owned()
            }
        })
    }
}

/// Start of the trailing `\p{Lu}[\p{Ll}\p{Nd}]*` word.
fn last_camel_word_start(source: &str) -> Option<usize> {
    let mut start = None;
    for (index, c) in source.char_indices().rev() {
        if c.is_uppercase() {
            start = Some(index);
            break;
        }
        if !(c.is_lowercase() || c.is_numeric()) {
            return None;
        }
    }
    start
}

/// Lower the first letter unless the name starts with two capitals (`URL`).
pub(crate) fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    if let Some(second) = chars.clone().next()
        && first.is_uppercase()
        && second.is_uppercase()
    {
        return name.to_owned();
    }
    first.to_lowercase().chain(chars).collect()
}

#[cfg(test)]
mod tests {
    use entity_query_core::StaticMetamodel;

    use super::*;

    fn model() -> StaticMetamodel {
        StaticMetamodel::builder()
            .entity(
                ManagedType::entity("test.User", "User")
                    .with(Attribute::id("id", ValueType::Long))
                    .with(Attribute::basic("firstname", ValueType::String))
                    .with(Attribute::embedded("address", "test.Address"))
                    .with(Attribute::basic("addressLine", ValueType::String))
                    .with(Attribute::many_to_one("manager", "test.User"))
                    .with(Attribute::basic("URL", ValueType::String))
            )
            .embeddable(
                ManagedType::embeddable("test.Address")
                    .with(Attribute::basic("zipCode", ValueType::String))
                    .with(Attribute::basic("city", ValueType::String))
            )
            .build()
    }

    fn resolve(source: &str) -> QueryResult<String> {
        let model = model();
        let owner = model.managed_type("test.User").cloned().expect("user type");
        PropertyPath::from(source, &owner, &model).map(|p| p.to_dot_path())
    }

    #[test]
    fn simple_property() {
        assert_eq!(resolve("firstname").ok().as_deref(), Some("firstname"));
        assert_eq!(resolve("Firstname").ok().as_deref(), Some("firstname"));
    }

    #[test]
    fn camel_case_nesting() {
        assert_eq!(resolve("addressZipCode").ok().as_deref(), Some("address.zipCode"));
        assert_eq!(resolve("managerFirstname").ok().as_deref(), Some("manager.firstname"));
    }

    #[test]
    fn longest_match_wins() {
        assert_eq!(resolve("addressLine").ok().as_deref(), Some("addressLine"));
    }

    #[test]
    fn explicit_separator() {
        assert_eq!(resolve("address_city").ok().as_deref(), Some("address.city"));
        assert_eq!(resolve("manager_address_city").ok().as_deref(), Some("manager.address.city"));
    }

    #[test]
    fn acronyms_keep_case() {
        assert_eq!(decapitalize("URL"), "URL");
        assert_eq!(decapitalize("Name"), "name");
        assert_eq!(resolve("URL").ok().as_deref(), Some("URL"));
    }

    #[test]
    fn deepest_error_is_reported() {
        let err = resolve("addressStreet").unwrap_err();
        assert_eq!(err.to_string(), "No property 'street' found for type 'Address'");

        let err = resolve("nickname").unwrap_err();
        assert_eq!(err.to_string(), "No property 'nickname' found for type 'User'");
    }
}

// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Entity metamodel lookup.
//!
//! The query creator resolves property paths segment by segment. For every
//! segment it needs to know whether the attribute is an association, whether
//! it is collection valued, whether it is optional and which type it points
//! to. [`Metamodel`] is the seam a persistence provider implements; the
//! in-memory [`StaticMetamodel`] covers tests and code-generated mappings.
//!
//! # Example
//!
//! ```rust
//! use entity_query_core::{Attribute, ManagedType, Metamodel, StaticMetamodel, ValueType};
//!
//! let model = StaticMetamodel::builder()
//!     .entity(
//!         ManagedType::entity("com.acme.Order", "Order")
//!             .with(Attribute::id("id", ValueType::Long))
//!             .with(Attribute::one_to_many("lineItems", "com.acme.LineItem"))
//!     )
//!     .build();
//!
//! let order = model.managed_type("com.acme.Order").unwrap();
//! assert!(order.attribute("lineItems").unwrap().kind().is_collection());
//! ```

use std::collections::HashMap;

use crate::value::ValueType;

/// Mapping category of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    /// Scalar column.
    Basic,

    /// Embedded value object.
    Embedded,

    /// Many-to-one association.
    ManyToOne,

    /// One-to-one association.
    OneToOne,

    /// One-to-many association.
    OneToMany,

    /// Many-to-many association.
    ManyToMany,

    /// Collection of basic or embeddable values.
    ElementCollection
}

impl AttributeKind {
    /// Check if traversing the attribute requires a join.
    pub const fn is_association(&self) -> bool {
        matches!(
            self,
            Self::ManyToOne
                | Self::OneToOne
                | Self::OneToMany
                | Self::ManyToMany
                | Self::ElementCollection
        )
    }

    /// Check if the attribute holds many values.
    pub const fn is_collection(&self) -> bool {
        matches!(self, Self::OneToMany | Self::ManyToMany | Self::ElementCollection)
    }

    /// Check if the attribute points to a single related entity.
    pub const fn is_to_one(&self) -> bool {
        matches!(self, Self::ManyToOne | Self::OneToOne)
    }
}

/// Mapped attribute of a managed type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    name:       String,
    kind:       AttributeKind,
    value_type: ValueType,
    optional:   bool,
    mapped_by:  Option<String>,
    id:         bool
}

impl Attribute {
    fn new(name: impl Into<String>, kind: AttributeKind, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            kind,
            value_type,
            optional: true,
            mapped_by: None,
            id: false
        }
    }

    /// Scalar attribute.
    pub fn basic(name: impl Into<String>, value_type: ValueType) -> Self {
        Self::new(name, AttributeKind::Basic, value_type)
    }

    /// Identifier attribute. Identifiers are never optional.
    pub fn id(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            id: true,
            optional: false,
            ..Self::basic(name, value_type)
        }
    }

    /// Embedded attribute of the given embeddable type.
    pub fn embedded(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::Embedded, ValueType::named(target))
    }

    /// Many-to-one association to `target`.
    pub fn many_to_one(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::ManyToOne, ValueType::named(target))
    }

    /// One-to-one association to `target`.
    pub fn one_to_one(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::OneToOne, ValueType::named(target))
    }

    /// One-to-many association to `target`.
    pub fn one_to_many(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(
            name,
            AttributeKind::OneToMany,
            ValueType::collection_of(ValueType::named(target))
        )
    }

    /// Many-to-many association to `target`.
    pub fn many_to_many(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(
            name,
            AttributeKind::ManyToMany,
            ValueType::collection_of(ValueType::named(target))
        )
    }

    /// Element collection of `element` values.
    pub fn element_collection(name: impl Into<String>, element: ValueType) -> Self {
        Self::new(
            name,
            AttributeKind::ElementCollection,
            ValueType::collection_of(element)
        )
    }

    /// Mark the attribute as mandatory.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.optional = false;
        self
    }

    /// Mark the attribute as the inverse side of a mapping owned by `owner`.
    #[must_use]
    pub fn mapped_by(mut self, owner: impl Into<String>) -> Self {
        self.mapped_by = Some(owner.into());
        self
    }

    /// Attribute name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Mapping category.
    pub const fn kind(&self) -> AttributeKind {
        self.kind
    }

    /// Declared type. Collections report [`ValueType::Collection`].
    pub const fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    /// Check if the attribute may be null.
    pub const fn is_optional(&self) -> bool {
        self.optional
    }

    /// Owning attribute on the other side, if this is the inverse side.
    pub fn mapped_by_attribute(&self) -> Option<&str> {
        self.mapped_by.as_deref().filter(|m| !m.is_empty())
    }

    /// Check if the attribute is (part of) the identifier.
    pub const fn is_id(&self) -> bool {
        self.id
    }

    /// Element type for collections, the declared type otherwise.
    pub fn target_type(&self) -> &ValueType {
        self.value_type.element()
    }

    /// Name of the related managed type for associations and embeddables.
    pub fn target_type_name(&self) -> Option<&str> {
        match self.target_type() {
            ValueType::Named(name) => Some(name),
            _ => None
        }
    }
}

/// Entity or embeddable known to the metamodel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedType {
    name:        String,
    entity_name: String,
    attributes:  Vec<Attribute>,
    entity:      bool
}

impl ManagedType {
    /// Entity type.
    ///
    /// # Arguments
    ///
    /// * `name` — Fully qualified type name used for lookups
    /// * `entity_name` — Name used in query text
    pub fn entity(name: impl Into<String>, entity_name: impl Into<String>) -> Self {
        Self {
            name:        name.into(),
            entity_name: entity_name.into(),
            attributes:  Vec::new(),
            entity:      true
        }
    }

    /// Embeddable type.
    pub fn embeddable(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            entity_name: simple_name(&name).to_owned(),
            name,
            attributes: Vec::new(),
            entity: false
        }
    }

    /// Add an attribute.
    #[must_use]
    pub fn with(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Fully qualified type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unqualified type name.
    pub fn simple_name(&self) -> &str {
        simple_name(&self.name)
    }

    /// Name used in query text.
    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    /// Check if this is an entity rather than an embeddable.
    pub const fn is_entity(&self) -> bool {
        self.entity
    }

    /// All attributes in declaration order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Identifier attributes in declaration order.
    pub fn id_attributes(&self) -> Vec<&Attribute> {
        self.attributes.iter().filter(|a| a.id).collect()
    }

    /// Check if the identifier consists of exactly one attribute.
    pub fn has_single_id_attribute(&self) -> bool {
        self.attributes.iter().filter(|a| a.id).count() == 1
    }
}

fn simple_name(name: &str) -> &str {
    name.rsplit(['.', '$']).next().unwrap_or(name)
}

/// Managed type lookup.
pub trait Metamodel: Send + Sync {
    /// Managed type (entity or embeddable) by fully qualified name.
    fn managed_type(&self, name: &str) -> Option<&ManagedType>;

    /// Entity by fully qualified name.
    fn entity(&self, name: &str) -> Option<&ManagedType> {
        self.managed_type(name).filter(|t| t.is_entity())
    }
}

/// In-memory metamodel.
#[derive(Debug, Clone, Default)]
pub struct StaticMetamodel {
    types: HashMap<String, ManagedType>
}

impl StaticMetamodel {
    /// Start building a metamodel.
    pub fn builder() -> StaticMetamodelBuilder {
        StaticMetamodelBuilder::default()
    }
}

impl Metamodel for StaticMetamodel {
    fn managed_type(&self, name: &str) -> Option<&ManagedType> {
        self.types.get(name)
    }
}

/// Builder for [`StaticMetamodel`].
#[derive(Debug, Default)]
pub struct StaticMetamodelBuilder {
    types: HashMap<String, ManagedType>
}

impl StaticMetamodelBuilder {
    /// Register an entity.
    #[must_use]
    pub fn entity(mut self, managed: ManagedType) -> Self {
        self.types.insert(managed.name.clone(), managed);
        self
    }

    /// Register an embeddable.
    #[must_use]
    pub fn embeddable(self, managed: ManagedType) -> Self {
        self.entity(managed)
    }

    /// Finish the metamodel.
    pub fn build(self) -> StaticMetamodel {
        StaticMetamodel {
            types: self.types
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> StaticMetamodel {
        StaticMetamodel::builder()
            .entity(
                ManagedType::entity("shop.Order", "Order")
                    .with(Attribute::id("id", ValueType::Long))
                    .with(Attribute::one_to_many("lineItems", "shop.LineItem"))
                    .with(Attribute::one_to_one("invoice", "shop.Invoice").mapped_by("order"))
            )
            .embeddable(ManagedType::embeddable("shop.Address"))
            .build()
    }

    #[test]
    fn attribute_kinds() {
        assert!(AttributeKind::OneToMany.is_collection());
        assert!(AttributeKind::ElementCollection.is_association());
        assert!(!AttributeKind::Embedded.is_association());
        assert!(AttributeKind::OneToOne.is_to_one());
    }

    #[test]
    fn lookup_and_targets() {
        let model = model();
        let order = model.entity("shop.Order").unwrap();
        let items = order.attribute("lineItems").unwrap();
        assert_eq!(items.target_type_name(), Some("shop.LineItem"));
        assert!(items.is_optional());
        assert_eq!(order.simple_name(), "Order");
        assert!(order.has_single_id_attribute());
    }

    #[test]
    fn mapped_by_is_exposed() {
        let model = model();
        let invoice = model.entity("shop.Order").unwrap().attribute("invoice").unwrap();
        assert_eq!(invoice.mapped_by_attribute(), Some("order"));
    }

    #[test]
    fn embeddables_are_not_entities() {
        let model = model();
        assert!(model.managed_type("shop.Address").is_some());
        assert!(model.entity("shop.Address").is_none());
    }

    #[test]
    fn id_is_required() {
        assert!(!Attribute::id("id", ValueType::Long).is_optional());
        assert!(!Attribute::many_to_one("customer", "C").required().is_optional());
    }
}

//! Compiled schema types.
//!
//! Element declarations reference a named [`ComplexType`], which carries the
//! content model ([`OrderIndicator`]), the attribute declarations and the
//! text type. The same tag may be declared with different types under
//! different parents, so lookups are keyed by type name.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{SchemaError, SchemaResult};

/// Upper bound on the number of occurrences of a particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaxOccurs {
    Bounded(u32),
    Unbounded,
}

impl MaxOccurs {
    pub fn allows(self, count: usize) -> bool {
        match self {
            MaxOccurs::Bounded(n) => count <= n as usize,
            MaxOccurs::Unbounded => true,
        }
    }

    pub fn is_repeatable(self) -> bool {
        !matches!(self, MaxOccurs::Bounded(0) | MaxOccurs::Bounded(1))
    }
}

impl Default for MaxOccurs {
    fn default() -> Self {
        MaxOccurs::Bounded(1)
    }
}

/// Declared lexical type of an attribute or of element text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Integer,
    Decimal,
    Boolean,
}

impl ValueType {
    pub fn name(self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Integer => "integer",
            ValueType::Decimal => "decimal",
            ValueType::Boolean => "boolean",
        }
    }
}

/// Enumeration restriction. The first value doubles as the default when a
/// required attribute has no declared default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enumeration {
    pub name: String,
    pub values: Vec<String>,
}

impl Enumeration {
    pub fn new(name: impl Into<String>, values: &[&str]) -> Self {
        Self {
            name: name.into(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    pub fn first(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDef {
    pub name: String,
    pub value_type: ValueType,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub enumeration: Option<Enumeration>,
    #[serde(default)]
    pub doc: Option<String>,
}

impl AttributeDef {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            default: None,
            required: false,
            enumeration: None,
            doc: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_enumeration(mut self, enumeration: Enumeration) -> Self {
        self.enumeration = Some(enumeration);
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Raw value written when a required attribute must be synthesized:
    /// the declared default, else the first enumeration value, else the
    /// zero value of the declared type.
    pub fn fallback_value(&self) -> String {
        if let Some(default) = &self.default {
            return default.clone();
        }
        if let Some(first) = self.enumeration.as_ref().and_then(Enumeration::first) {
            return first.to_string();
        }
        match self.value_type {
            ValueType::String => String::new(),
            ValueType::Integer | ValueType::Decimal => "0".to_string(),
            ValueType::Boolean => "false".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementDef {
    pub tag: String,
    pub type_name: String,
    #[serde(default = "default_min_occurs")]
    pub min_occurs: u32,
    #[serde(default)]
    pub max_occurs: MaxOccurs,
    #[serde(default)]
    pub doc: Option<String>,
}

fn default_min_occurs() -> u32 {
    1
}

impl ElementDef {
    pub fn new(tag: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            type_name: type_name.into(),
            min_occurs: 1,
            max_occurs: MaxOccurs::Bounded(1),
            doc: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.min_occurs = 0;
        self
    }

    pub fn repeated(mut self) -> Self {
        self.max_occurs = MaxOccurs::Unbounded;
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compositor {
    Sequence,
    Choice,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Particle {
    Element(ElementDef),
    Indicator(OrderIndicator),
}

impl From<ElementDef> for Particle {
    fn from(def: ElementDef) -> Self {
        Particle::Element(def)
    }
}

impl From<OrderIndicator> for Particle {
    fn from(indicator: OrderIndicator) -> Self {
        Particle::Indicator(indicator)
    }
}

/// A `sequence` or `choice` over particles, itself repeatable as a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderIndicator {
    pub compositor: Compositor,
    pub particles: Vec<Particle>,
    #[serde(default = "default_min_occurs")]
    pub min_occurs: u32,
    #[serde(default)]
    pub max_occurs: MaxOccurs,
}

impl OrderIndicator {
    pub fn sequence(particles: Vec<Particle>) -> Self {
        Self {
            compositor: Compositor::Sequence,
            particles,
            min_occurs: 1,
            max_occurs: MaxOccurs::Bounded(1),
        }
    }

    pub fn choice(particles: Vec<Particle>) -> Self {
        Self {
            compositor: Compositor::Choice,
            particles,
            min_occurs: 1,
            max_occurs: MaxOccurs::Bounded(1),
        }
    }

    /// Content model of an element that has no child elements.
    pub fn empty() -> Self {
        Self::sequence(Vec::new())
    }

    pub fn with_occurs(mut self, min_occurs: u32, max_occurs: MaxOccurs) -> Self {
        self.min_occurs = min_occurs;
        self.max_occurs = max_occurs;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexType {
    pub name: String,
    pub content: OrderIndicator,
    #[serde(default)]
    pub text: Option<ValueType>,
    #[serde(default)]
    pub attributes: Vec<AttributeDef>,
    #[serde(default)]
    pub doc: Option<String>,
}

impl ComplexType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: OrderIndicator::empty(),
            text: None,
            attributes: Vec::new(),
            doc: None,
        }
    }

    pub fn content(mut self, content: OrderIndicator) -> Self {
        self.content = content;
        self
    }

    pub fn text(mut self, text: ValueType) -> Self {
        self.text = Some(text);
        self
    }

    pub fn attribute(mut self, attribute: AttributeDef) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}

/// The compiled schema: a pure lookup table, immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    roots: Vec<ElementDef>,
    types: BTreeMap<String, ComplexType>,
}

impl Schema {
    pub fn new(roots: Vec<ElementDef>, types: impl IntoIterator<Item = ComplexType>) -> Self {
        Self {
            roots,
            types: types.into_iter().map(|t| (t.name.clone(), t)).collect(),
        }
    }

    /// Load a schema compiled elsewhere.
    pub fn from_json(source: &str) -> SchemaResult<Self> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn to_json(&self) -> SchemaResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn roots(&self) -> &[ElementDef] {
        &self.roots
    }

    pub fn root(&self, tag: &str) -> SchemaResult<&ElementDef> {
        self.roots
            .iter()
            .find(|r| r.tag == tag)
            .ok_or_else(|| SchemaError::unknown_tag("<document>", tag))
    }

    pub fn complex_type(&self, type_name: &str) -> SchemaResult<&ComplexType> {
        self.types
            .get(type_name)
            .ok_or_else(|| SchemaError::UnknownType(type_name.to_string()))
    }

    /// Declaration of `tag` as a child of an element of type `parent_type`.
    pub fn child_element(&self, parent_type: &str, tag: &str) -> SchemaResult<&ElementDef> {
        self.valid_children(parent_type)?
            .element(tag)
            .ok_or_else(|| SchemaError::unknown_tag(parent_type, tag))
    }

    pub fn valid_children(&self, type_name: &str) -> SchemaResult<&OrderIndicator> {
        Ok(&self.complex_type(type_name)?.content)
    }

    pub fn valid_attributes(&self, type_name: &str) -> SchemaResult<&[AttributeDef]> {
        Ok(&self.complex_type(type_name)?.attributes)
    }

    pub fn attribute(&self, type_name: &str, name: &str) -> SchemaResult<&AttributeDef> {
        self.valid_attributes(type_name)?
            .iter()
            .find(|a| a.name == name)
            .ok_or_else(|| SchemaError::unknown_attribute(type_name, name))
    }

    /// Tags that must be present, with their minimum counts.
    pub fn required_children(&self, type_name: &str) -> SchemaResult<Vec<(String, u32)>> {
        Ok(self.valid_children(type_name)?.required_children())
    }

    pub fn element_type(&self, type_name: &str) -> SchemaResult<Option<ValueType>> {
        Ok(self.complex_type(type_name)?.text)
    }
}

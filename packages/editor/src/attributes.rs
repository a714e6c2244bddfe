//! Typed access to raw attribute storage.
//!
//! Nodes store attributes as strings. Reads parse them according to the
//! declared [`ValueType`], writes coerce the incoming value and store its
//! canonical string form. An absent attribute reads as its declared
//! default.

use std::fmt;

use fomod_schema::{AttributeDef, ValueType};
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::mutations::{Mutation, MutationError};
use crate::node::NodeId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Decimal(f64),
    Str(String),
}

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttributeValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            AttributeValue::Decimal(d) => Some(*d),
            AttributeValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Bool(b) => write!(f, "{}", b),
            AttributeValue::Int(i) => write!(f, "{}", i),
            AttributeValue::Decimal(d) => write!(f, "{}", d),
            AttributeValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Str(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::Str(s)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Bool(b)
    }
}

impl From<i64> for AttributeValue {
    fn from(i: i64) -> Self {
        AttributeValue::Int(i)
    }
}

impl From<i32> for AttributeValue {
    fn from(i: i32) -> Self {
        AttributeValue::Int(i64::from(i))
    }
}

impl From<u32> for AttributeValue {
    fn from(i: u32) -> Self {
        AttributeValue::Int(i64::from(i))
    }
}

impl From<f64> for AttributeValue {
    fn from(d: f64) -> Self {
        AttributeValue::Decimal(d)
    }
}

/// Convert `value` to the declared type and check the enumeration.
pub(crate) fn coerce(
    def: &AttributeDef,
    value: &AttributeValue,
) -> Result<AttributeValue, MutationError> {
    let mismatch = || MutationError::TypeCoercion {
        name: def.name.clone(),
        value: value.to_string(),
        expected: def.value_type.name().to_string(),
    };

    let typed = match (def.value_type, value) {
        (ValueType::String, v) => AttributeValue::Str(v.to_string()),

        (ValueType::Integer, AttributeValue::Int(i)) => AttributeValue::Int(*i),
        (ValueType::Integer, AttributeValue::Decimal(d)) if d.is_finite() && d.fract() == 0.0 => {
            AttributeValue::Int(*d as i64)
        }
        (ValueType::Integer, AttributeValue::Str(s)) => {
            AttributeValue::Int(s.trim().parse().map_err(|_| mismatch())?)
        }

        (ValueType::Decimal, AttributeValue::Int(i)) => AttributeValue::Decimal(*i as f64),
        (ValueType::Decimal, AttributeValue::Decimal(d)) if d.is_finite() => {
            AttributeValue::Decimal(*d)
        }
        (ValueType::Decimal, AttributeValue::Str(s)) => {
            let d: f64 = s.trim().parse().map_err(|_| mismatch())?;
            if !d.is_finite() {
                return Err(mismatch());
            }
            AttributeValue::Decimal(d)
        }

        (ValueType::Boolean, AttributeValue::Bool(b)) => AttributeValue::Bool(*b),
        (ValueType::Boolean, AttributeValue::Int(0)) => AttributeValue::Bool(false),
        (ValueType::Boolean, AttributeValue::Int(1)) => AttributeValue::Bool(true),
        (ValueType::Boolean, AttributeValue::Str(s)) => match s.trim() {
            "true" | "1" => AttributeValue::Bool(true),
            "false" | "0" => AttributeValue::Bool(false),
            _ => return Err(mismatch()),
        },

        _ => return Err(mismatch()),
    };

    if let Some(enumeration) = &def.enumeration {
        let raw = typed.to_string();
        if !enumeration.contains(&raw) {
            return Err(MutationError::Restriction {
                name: def.name.clone(),
                value: raw,
                allowed: enumeration.values.join(", "),
            });
        }
    }
    Ok(typed)
}

impl Document {
    fn attribute_def(&self, id: NodeId, name: &str) -> Result<&AttributeDef, MutationError> {
        if !self.contains(id) {
            return Err(MutationError::NodeNotFound(id));
        }
        self.schema
            .attribute(self.kind(id), name)
            .map_err(|_| MutationError::UnknownAttribute {
                tag: self.tag(id).to_string(),
                name: name.to_string(),
            })
    }

    /// Typed value of an attribute, falling back to the declared default.
    /// `None` means the attribute is unset and has no default.
    pub fn get_attribute(
        &self,
        id: NodeId,
        name: &str,
    ) -> Result<Option<AttributeValue>, MutationError> {
        let def = self.attribute_def(id, name)?;
        let raw = match self.node(id).attributes.get(name).or(def.default.as_ref()) {
            Some(raw) => raw,
            None => return Ok(None),
        };
        coerce(def, &AttributeValue::Str(raw.clone())).map(Some)
    }

    /// Raw string value of an attribute, falling back to the declared default.
    ///
    /// Undeclared names read as `None`.
    ///
    /// # Panics
    ///
    /// If `id` was not created by this document. [`Document::get_attribute`]
    /// reports that case as [`MutationError::NodeNotFound`] instead.
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        if let Some(raw) = self.node(id).attributes.get(name) {
            return Some(raw);
        }
        self.schema
            .attribute(self.kind(id), name)
            .ok()?
            .default
            .as_deref()
    }

    /// Is the attribute explicitly stored on the node?
    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.node(id).attributes.contains_key(name)
    }

    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: &str,
        value: impl Into<AttributeValue>,
    ) -> Result<(), MutationError> {
        self.update_attribute(id, name, Some(value.into()))
    }

    /// Remove an attribute so reads return the declared default.
    pub fn unset_attribute(&mut self, id: NodeId, name: &str) -> Result<(), MutationError> {
        self.update_attribute(id, name, None)
    }

    pub fn update_attribute(
        &mut self,
        id: NodeId,
        name: &str,
        value: Option<AttributeValue>,
    ) -> Result<(), MutationError> {
        Mutation::SetAttribute {
            node: id,
            name: name.to_string(),
            value,
        }
        .apply(self)
        .map(|_| ())
    }

    pub(crate) fn validate_attribute(
        &self,
        id: NodeId,
        name: &str,
        value: Option<&AttributeValue>,
    ) -> Result<Option<String>, MutationError> {
        let def = self.attribute_def(id, name)?;
        match value {
            Some(value) => coerce(def, value).map(|typed| Some(typed.to_string())),
            None if def.required => Err(MutationError::SchemaViolation(format!(
                "'{}' is required on '{}' and cannot be removed",
                name,
                self.tag(id)
            ))),
            None => Ok(None),
        }
    }
}

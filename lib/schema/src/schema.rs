//! Schema definitions
//!
//! Defines the typed attribute layout of a record collection. A schema is an
//! ordered set of named, typed attributes plus the name of the identifier
//! field. Records are validated against the schema before they enter the
//! store.

use ahash::AHashMap;
use rankx_core::{AttributeValue, Error, Result};
use serde::{Deserialize, Serialize};

/// Type of a record attribute
///
/// Numeric attributes carry their declared `[min, max]` range; number spaces
/// normalize against it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum AttributeType {
    Text,
    Categorical,
    Numeric { min: f64, max: f64 },
}

impl AttributeType {
    /// Human-readable name of the type
    pub fn name(&self) -> &'static str {
        match self {
            AttributeType::Text => "text",
            AttributeType::Categorical => "categorical",
            AttributeType::Numeric { .. } => "numeric",
        }
    }

    /// Check a value against this type
    pub fn accepts(&self, value: &AttributeValue) -> bool {
        matches!(
            (self, value),
            (AttributeType::Text, AttributeValue::Text(_))
                | (AttributeType::Categorical, AttributeValue::Categorical(_))
                | (AttributeType::Numeric { .. }, AttributeValue::Number(_))
        )
    }

    /// Coerce a JSON value into a typed attribute value
    ///
    /// Returns `None` when the JSON value cannot represent this type.
    /// Non-finite numbers are rejected.
    pub fn coerce(&self, value: &serde_json::Value) -> Option<AttributeValue> {
        match self {
            AttributeType::Text => value
                .as_str()
                .map(|s| AttributeValue::Text(s.to_string())),
            AttributeType::Categorical => value
                .as_str()
                .map(|s| AttributeValue::Categorical(s.to_string())),
            AttributeType::Numeric { .. } => value
                .as_f64()
                .filter(|n| n.is_finite())
                .map(AttributeValue::Number),
        }
    }
}

/// One named, typed attribute in a schema
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttributeDef {
    pub name: String,
    #[serde(flatten)]
    pub attr_type: AttributeType,
}

impl AttributeDef {
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attr_type: AttributeType::Text,
        }
    }

    pub fn categorical(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attr_type: AttributeType::Categorical,
        }
    }

    pub fn numeric(name: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            name: name.into(),
            attr_type: AttributeType::Numeric { min, max },
        }
    }
}

/// Ordered attribute layout with a designated identifier field
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SchemaConfig")]
pub struct Schema {
    id_field: String,
    attributes: Vec<AttributeDef>,
    #[serde(skip)]
    positions: AHashMap<String, usize>,
}

/// Wire form of a schema; validated through `Schema::new` on deserialization
#[derive(Debug, Clone, Deserialize)]
struct SchemaConfig {
    id_field: String,
    attributes: Vec<AttributeDef>,
}

impl TryFrom<SchemaConfig> for Schema {
    type Error = Error;

    fn try_from(config: SchemaConfig) -> Result<Self> {
        Schema::new(config.id_field, config.attributes)
    }
}

impl Schema {
    /// Create a schema from an id field name and attribute definitions
    ///
    /// Fails when attribute names collide with each other or with the id
    /// field, or when a numeric attribute declares an empty range.
    pub fn new(id_field: impl Into<String>, attributes: Vec<AttributeDef>) -> Result<Self> {
        let id_field = id_field.into();
        let mut positions = AHashMap::with_capacity(attributes.len());
        for (pos, attr) in attributes.iter().enumerate() {
            if attr.name == id_field {
                return Err(Error::InvalidSchema(format!(
                    "attribute '{}' collides with the id field",
                    attr.name
                )));
            }
            if let AttributeType::Numeric { min, max } = attr.attr_type {
                if !(min < max) {
                    return Err(Error::InvalidSchema(format!(
                        "attribute '{}' declares an empty numeric range [{}, {}]",
                        attr.name, min, max
                    )));
                }
            }
            if positions.insert(attr.name.clone(), pos).is_some() {
                return Err(Error::InvalidSchema(format!(
                    "duplicate attribute '{}'",
                    attr.name
                )));
            }
        }
        Ok(Self {
            id_field,
            attributes,
            positions,
        })
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    pub fn attributes(&self) -> &[AttributeDef] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeDef> {
        self.positions.get(name).map(|&pos| &self.attributes[pos])
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Attribute names in declaration order
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|a| a.name.as_str())
    }
}

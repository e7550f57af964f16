use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a record
///
/// Ordered so that ranked output can break score ties deterministically:
/// variants compare by rank first, then by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Integer(u64),
    String(String),
    Uuid(Uuid),
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordId::Integer(i) => write!(f, "{}", i),
            RecordId::String(s) => write!(f, "{}", s),
            RecordId::Uuid(u) => write!(f, "{}", u),
        }
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        RecordId::String(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::String(s.to_string())
    }
}

impl From<u64> for RecordId {
    fn from(i: u64) -> Self {
        RecordId::Integer(i)
    }
}

impl From<Uuid> for RecordId {
    fn from(u: Uuid) -> Self {
        RecordId::Uuid(u)
    }
}

/// A typed attribute value of a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeValue {
    Text(String),
    Categorical(String),
    Number(f64),
}

impl AttributeValue {
    /// Human-readable name of the value's type
    pub fn type_name(&self) -> &'static str {
        match self {
            AttributeValue::Text(_) => "text",
            AttributeValue::Categorical(_) => "categorical",
            AttributeValue::Number(_) => "number",
        }
    }

    /// True for text or categorical values holding an empty string
    pub fn is_empty_text(&self) -> bool {
        match self {
            AttributeValue::Text(s) | AttributeValue::Categorical(s) => s.trim().is_empty(),
            AttributeValue::Number(_) => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) | AttributeValue::Categorical(s) => Some(s),
            AttributeValue::Number(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Convert into a plain JSON value for result rows and exports
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            AttributeValue::Text(s) | AttributeValue::Categorical(s) => {
                serde_json::Value::String(s.clone())
            }
            AttributeValue::Number(n) => serde_json::json!(n),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Text(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::Text(s)
    }
}

impl From<f64> for AttributeValue {
    fn from(n: f64) -> Self {
        AttributeValue::Number(n)
    }
}

/// One entity: identifier plus attribute values keyed by attribute name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    values: AHashMap<String, AttributeValue>,
}

impl Record {
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            values: AHashMap::new(),
        }
    }

    /// Set an attribute value, builder style
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Set a categorical attribute value, builder style
    #[must_use]
    pub fn with_category(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values
            .insert(name.into(), AttributeValue::Categorical(value.into()));
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: AttributeValue) {
        self.values.insert(name.into(), value);
    }

    pub fn value(&self, name: &str) -> Option<&AttributeValue> {
        self.values.get(name)
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

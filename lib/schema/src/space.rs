//! Similarity spaces
//!
//! A space maps one record attribute to a fixed-length vector and defines a
//! similarity function over such vectors. The variant set is closed: text,
//! categorical, and number spaces cover the three attribute types, so
//! callers match exhaustively instead of dispatching through a trait object.

use crate::embedder::{HashingTextEmbedder, TextEmbedder};
use crate::schema::AttributeType;
use crate::store::RecordStore;
use ahash::AHashMap;
use parking_lot::Mutex;
use rankx_core::{AttributeValue, Error, Result, Vector};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// What a categorical space does with a value outside its frozen vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnknownCategoryPolicy {
    /// Fail the operation with `UnknownCategory`
    #[default]
    Reject,
    /// Map unknowns to a dedicated extra slot
    OtherBucket,
}

/// What a number space does with a value outside its declared range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutOfRangePolicy {
    /// Clamp into the range; normalized values stay in [0, 1]
    #[default]
    Clip,
    /// Fail the operation with `OutOfRange`
    Reject,
}

/// Where a categorical space's vocabulary comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VocabularySource {
    /// An explicit, enumerated category list
    Fixed(Vec<String>),
    /// Distinct values of the bound attribute in the ingested corpus,
    /// in first-seen order
    FromCorpus,
}

/// Declarative configuration for one space
///
/// Specs arrive from the configuration collaborator as data; `Space::from_spec`
/// resolves them against a record store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SpaceSpec {
    Text {
        name: String,
        attribute: String,
        model: String,
    },
    Categorical {
        name: String,
        attribute: String,
        vocabulary: VocabularySource,
        #[serde(default)]
        unknown: UnknownCategoryPolicy,
    },
    Number {
        name: String,
        attribute: String,
        #[serde(default)]
        out_of_range: OutOfRangePolicy,
    },
}

impl SpaceSpec {
    pub fn name(&self) -> &str {
        match self {
            SpaceSpec::Text { name, .. }
            | SpaceSpec::Categorical { name, .. }
            | SpaceSpec::Number { name, .. } => name,
        }
    }

    pub fn attribute(&self) -> &str {
        match self {
            SpaceSpec::Text { attribute, .. }
            | SpaceSpec::Categorical { attribute, .. }
            | SpaceSpec::Number { attribute, .. } => attribute,
        }
    }
}

/// Semantic text space: embeds text through a pinned model, cosine similarity
///
/// Embeddings are memoized per instance keyed by exact text, so repeated
/// queries and re-indexing never hit the backend twice for the same input.
#[derive(Clone)]
pub struct TextSpace {
    name: String,
    attribute: String,
    embedder: Arc<dyn TextEmbedder>,
    cache: Arc<Mutex<AHashMap<String, Vector>>>,
}

impl std::fmt::Debug for TextSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextSpace")
            .field("name", &self.name)
            .field("attribute", &self.attribute)
            .field("model", &self.embedder.model())
            .field("dim", &self.embedder.dim())
            .finish()
    }
}

impl TextSpace {
    /// Create a text space backed by the default hashing embedder
    pub fn new(
        name: impl Into<String>,
        attribute: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self::with_embedder(name, attribute, Arc::new(HashingTextEmbedder::new(model)))
    }

    /// Create a text space backed by a custom embedding backend
    pub fn with_embedder(
        name: impl Into<String>,
        attribute: impl Into<String>,
        embedder: Arc<dyn TextEmbedder>,
    ) -> Self {
        Self {
            name: name.into(),
            attribute: attribute.into(),
            embedder,
            cache: Arc::new(Mutex::new(AHashMap::new())),
        }
    }

    pub fn model(&self) -> &str {
        self.embedder.model()
    }

    fn embed_text(&self, text: &str) -> Result<Vector> {
        if let Some(cached) = self.cache.lock().get(text) {
            return Ok(cached.clone());
        }

        let vector = self.embedder.embed(text)?;
        if vector.dim() != self.embedder.dim() {
            return Err(Error::InvalidDimension {
                expected: self.embedder.dim(),
                actual: vector.dim(),
            });
        }

        self.cache
            .lock()
            .insert(text.to_string(), vector.clone());
        Ok(vector)
    }
}

/// Categorical space: one-hot over a frozen vocabulary, equality indicator
#[derive(Debug, Clone)]
pub struct CategoricalSpace {
    name: String,
    attribute: String,
    vocabulary: Vec<String>,
    slots: AHashMap<String, usize>,
    policy: UnknownCategoryPolicy,
}

impl CategoricalSpace {
    pub fn new(
        name: impl Into<String>,
        attribute: impl Into<String>,
        vocabulary: Vec<String>,
        policy: UnknownCategoryPolicy,
    ) -> Self {
        let mut slots = AHashMap::with_capacity(vocabulary.len());
        let mut deduped = Vec::with_capacity(vocabulary.len());
        for category in vocabulary {
            if !slots.contains_key(&category) {
                slots.insert(category.clone(), deduped.len());
                deduped.push(category);
            }
        }
        Self {
            name: name.into(),
            attribute: attribute.into(),
            vocabulary: deduped,
            slots,
            policy,
        }
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn dim(&self) -> usize {
        self.vocabulary.len() + usize::from(self.policy == UnknownCategoryPolicy::OtherBucket)
    }

    fn embed_category(&self, category: &str) -> Result<Vector> {
        let slot = match self.slots.get(category) {
            Some(&slot) => slot,
            None => match self.policy {
                UnknownCategoryPolicy::OtherBucket => self.vocabulary.len(),
                UnknownCategoryPolicy::Reject => {
                    return Err(Error::UnknownCategory {
                        space: self.name.clone(),
                        value: category.to_string(),
                    })
                }
            },
        };

        let mut components = vec![0.0f32; self.dim()];
        components[slot] = 1.0;
        Ok(Vector::new(components))
    }
}

/// Number space in SIMILAR mode: linear normalization, closeness similarity
#[derive(Debug, Clone)]
pub struct NumberSpace {
    name: String,
    attribute: String,
    min: f64,
    max: f64,
    policy: OutOfRangePolicy,
}

impl NumberSpace {
    pub fn new(
        name: impl Into<String>,
        attribute: impl Into<String>,
        min: f64,
        max: f64,
        policy: OutOfRangePolicy,
    ) -> Self {
        Self {
            name: name.into(),
            attribute: attribute.into(),
            min,
            max,
            policy,
        }
    }

    pub fn range(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    fn embed_number(&self, value: f64) -> Result<Vector> {
        if (value < self.min || value > self.max)
            && self.policy == OutOfRangePolicy::Reject
        {
            return Err(Error::OutOfRange {
                space: self.name.clone(),
                value,
                min: self.min,
                max: self.max,
            });
        }

        let normalized = ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0);
        Ok(Vector::new(vec![normalized as f32]))
    }
}

/// A per-attribute embedding plus similarity function pair
///
/// The contract is `embed(value) -> vector` (pure, deterministic, fixed
/// output dimension per instance) and `similarity(a, b) -> f32`.
#[derive(Debug, Clone)]
pub enum Space {
    Text(TextSpace),
    Categorical(CategoricalSpace),
    Number(NumberSpace),
}

impl Space {
    /// Resolve a declarative spec against a record store
    ///
    /// Validates that the bound attribute exists and its type fits the space
    /// kind: text spaces accept text or categorical attributes (category
    /// labels embed as text), categorical spaces require a categorical
    /// attribute, number spaces require a numeric attribute and inherit its
    /// declared range.
    pub fn from_spec(spec: &SpaceSpec, store: &RecordStore) -> Result<Space> {
        let schema = store.schema();
        let attr = schema
            .attribute(spec.attribute())
            .ok_or_else(|| Error::UnknownAttribute(spec.attribute().to_string()))?;

        match spec {
            SpaceSpec::Text {
                name,
                attribute,
                model,
            } => {
                if matches!(attr.attr_type, AttributeType::Numeric { .. }) {
                    return Err(Error::InvalidSchema(format!(
                        "text space '{}' cannot bind numeric attribute '{}'",
                        name, attribute
                    )));
                }
                Ok(Space::Text(TextSpace::new(name, attribute, model)))
            }
            SpaceSpec::Categorical {
                name,
                attribute,
                vocabulary,
                unknown,
            } => {
                if attr.attr_type != AttributeType::Categorical {
                    return Err(Error::InvalidSchema(format!(
                        "categorical space '{}' requires a categorical attribute, '{}' is {}",
                        name,
                        attribute,
                        attr.attr_type.name()
                    )));
                }
                let categories = match vocabulary {
                    VocabularySource::Fixed(categories) => categories.clone(),
                    VocabularySource::FromCorpus => store.distinct_categories(attribute),
                };
                Ok(Space::Categorical(CategoricalSpace::new(
                    name, attribute, categories, *unknown,
                )))
            }
            SpaceSpec::Number {
                name,
                attribute,
                out_of_range,
            } => match attr.attr_type {
                AttributeType::Numeric { min, max } => Ok(Space::Number(NumberSpace::new(
                    name,
                    attribute,
                    min,
                    max,
                    *out_of_range,
                ))),
                _ => Err(Error::InvalidSchema(format!(
                    "number space '{}' requires a numeric attribute, '{}' is {}",
                    name,
                    attribute,
                    attr.attr_type.name()
                ))),
            },
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Space::Text(s) => &s.name,
            Space::Categorical(s) => &s.name,
            Space::Number(s) => &s.name,
        }
    }

    /// Name of the record attribute this space is bound to
    pub fn attribute(&self) -> &str {
        match self {
            Space::Text(s) => &s.attribute,
            Space::Categorical(s) => &s.attribute,
            Space::Number(s) => &s.attribute,
        }
    }

    /// Fixed output dimension of `embed`
    pub fn dim(&self) -> usize {
        match self {
            Space::Text(s) => s.embedder.dim(),
            Space::Categorical(s) => s.dim(),
            Space::Number(_) => 1,
        }
    }

    /// Map one attribute value to this space's vector
    pub fn embed(&self, value: &AttributeValue) -> Result<Vector> {
        match (self, value) {
            (Space::Text(s), AttributeValue::Text(text))
            | (Space::Text(s), AttributeValue::Categorical(text)) => s.embed_text(text),
            (Space::Categorical(s), AttributeValue::Categorical(category))
            | (Space::Categorical(s), AttributeValue::Text(category)) => {
                s.embed_category(category)
            }
            (Space::Number(s), AttributeValue::Number(n)) => s.embed_number(*n),
            _ => Err(Error::InvalidQuery(format!(
                "space '{}' cannot embed a {} value",
                self.name(),
                value.type_name()
            ))),
        }
    }

    /// Similarity of two vectors produced by this space
    ///
    /// Text: cosine in [-1, 1]. Categorical: equality indicator (two
    /// distinct unknowns under the other-bucket policy collapse to the same
    /// slot and compare equal). Number: `1 - |a - b|` over normalized
    /// values, in [0, 1]. Mismatched dimensions score 0.
    pub fn similarity(&self, a: &Vector, b: &Vector) -> f32 {
        if a.dim() != b.dim() {
            return 0.0;
        }
        match self {
            Space::Text(_) => a.cosine_similarity(b),
            Space::Categorical(_) => a.dot(b),
            Space::Number(_) => {
                let (na, nb) = (a.as_slice()[0], b.as_slice()[0]);
                (1.0 - (na - nb).abs()).clamp(0.0, 1.0)
            }
        }
    }
}

//! Declarative queries
//!
//! A query is an immutable description of a search: which spaces
//! participate, as weighted similarity terms or hard filters, and where
//! their query-side values come from (inline literals or named parameters
//! bound at execution time). Queries are built once and bound per request.

use ahash::AHashMap;
use rankx_core::AttributeValue;

/// Where a term's query-side value comes from
#[derive(Debug, Clone, PartialEq)]
pub enum ValueSource {
    /// An inline value fixed at query construction
    Literal(AttributeValue),
    /// A named parameter resolved from the binding at execution
    Param(String),
}

impl From<AttributeValue> for ValueSource {
    fn from(value: AttributeValue) -> Self {
        ValueSource::Literal(value)
    }
}

impl From<&str> for ValueSource {
    fn from(text: &str) -> Self {
        ValueSource::Literal(AttributeValue::Text(text.to_string()))
    }
}

impl From<String> for ValueSource {
    fn from(text: String) -> Self {
        ValueSource::Literal(AttributeValue::Text(text))
    }
}

impl From<f64> for ValueSource {
    fn from(number: f64) -> Self {
        ValueSource::Literal(AttributeValue::Number(number))
    }
}

/// A named query parameter, bound at execution time
pub fn param(name: impl Into<String>) -> ValueSource {
    ValueSource::Param(name.into())
}

/// Where a similar term's weight comes from
#[derive(Debug, Clone, PartialEq)]
pub enum WeightSource {
    Fixed(f32),
    /// Resolved from the binding; defaults to 1.0 when left unbound
    Param(String),
}

impl From<f32> for WeightSource {
    fn from(weight: f32) -> Self {
        WeightSource::Fixed(weight)
    }
}

/// A named weight parameter, bound at execution time
pub fn weight_param(name: impl Into<String>) -> WeightSource {
    WeightSource::Param(name.into())
}

/// Role of a term in the query
#[derive(Debug, Clone, PartialEq)]
pub enum TermKind {
    /// Contributes `weight * similarity` to the composite score. Weights are
    /// signed; negative weights penalize similarity on the space.
    Similar { weight: WeightSource },
    /// Binary gate: candidates must match the bound value exactly.
    /// Multiple filters are conjunctive.
    Filter,
}

/// One clause of a query referencing a space by name
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub space: String,
    pub kind: TermKind,
    pub value: ValueSource,
}

/// Which output columns to materialize
///
/// The record identifier and the computed `similarity_score` always
/// materialize regardless of the selection.
#[derive(Debug, Clone, PartialEq)]
pub enum Select {
    All,
    Columns(Vec<String>),
}

/// Immutable description of a search over one index
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    terms: Vec<Term>,
    select: Select,
}

impl Query {
    pub fn builder() -> QueryBuilder {
        QueryBuilder {
            terms: Vec::new(),
            select: Select::All,
        }
    }

    /// Terms in declared order; score contributions sum in this order
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn select(&self) -> &Select {
        &self.select
    }
}

/// Builder enumerating every term role and weight explicitly
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    terms: Vec<Term>,
    select: Select,
}

impl QueryBuilder {
    /// Add a similarity term with weight 1.0
    #[must_use]
    pub fn similar(self, space: impl Into<String>, value: impl Into<ValueSource>) -> Self {
        self.similar_weighted(space, value, 1.0)
    }

    /// Add a similarity term with an explicit weight
    ///
    /// A zero weight contributes nothing to the score but the term's value
    /// is still embedded, so embedding failures surface. A term whose
    /// parameter is left unbound (or bound to empty text) is skipped.
    #[must_use]
    pub fn similar_weighted(
        mut self,
        space: impl Into<String>,
        value: impl Into<ValueSource>,
        weight: impl Into<WeightSource>,
    ) -> Self {
        self.terms.push(Term {
            space: space.into(),
            kind: TermKind::Similar {
                weight: weight.into(),
            },
            value: value.into(),
        });
        self
    }

    /// Add a hard filter term
    ///
    /// The bound value must match the record's attribute value exactly;
    /// a filter whose parameter is left unbound is skipped.
    #[must_use]
    pub fn filter(mut self, space: impl Into<String>, value: impl Into<ValueSource>) -> Self {
        self.terms.push(Term {
            space: space.into(),
            kind: TermKind::Filter,
            value: value.into(),
        });
        self
    }

    /// Materialize only the named attributes
    #[must_use]
    pub fn select(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.select = Select::Columns(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Materialize every schema attribute
    #[must_use]
    pub fn select_all(mut self) -> Self {
        self.select = Select::All;
        self
    }

    pub fn build(self) -> Query {
        Query {
            terms: self.terms,
            select: self.select,
        }
    }
}

/// Single-use substitution of concrete values for a query's parameters
#[derive(Debug, Clone, Default)]
pub struct Binding {
    values: AHashMap<String, AttributeValue>,
    weights: AHashMap<String, f32>,
}

impl Binding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value parameter
    #[must_use]
    pub fn set(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Bind a value parameter to a categorical value
    #[must_use]
    pub fn set_category(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values
            .insert(name.into(), AttributeValue::Categorical(value.into()));
        self
    }

    /// Bind a weight parameter
    #[must_use]
    pub fn set_weight(mut self, name: impl Into<String>, weight: f32) -> Self {
        self.weights.insert(name.into(), weight);
        self
    }

    pub fn value(&self, name: &str) -> Option<&AttributeValue> {
        self.values.get(name)
    }

    pub fn weight(&self, name: &str) -> Option<f32> {
        self.weights.get(name).copied()
    }
}

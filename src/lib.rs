//! # rankx
//!
//! A schema-driven retrieval engine that ranks structured records by a
//! weighted combination of heterogeneous similarity measures: free-text
//! semantic similarity, categorical match, and bounded-numeric closeness,
//! each computed over an independently defined space.
//!
//! ## Quick Start
//!
//! ```rust
//! use rankx::prelude::*;
//!
//! // Declare the attribute layout
//! let schema = Schema::new(
//!     "fdc_id",
//!     vec![
//!         AttributeDef::text("description"),
//!         AttributeDef::categorical("food_category"),
//!         AttributeDef::numeric("calories", 0.0, 1000.0),
//!     ],
//! ).unwrap();
//!
//! // Ingest records
//! let mut store = RecordStore::new(schema);
//! store.put(vec![
//!     Record::new(1u64)
//!         .with("description", "sweet cereal")
//!         .with_category("food_category", "breakfast")
//!         .with("calories", 120.0),
//!     Record::new(2u64)
//!         .with("description", "grilled chicken")
//!         .with_category("food_category", "dinner")
//!         .with("calories", 250.0),
//! ]).unwrap();
//!
//! // One space per attribute
//! let specs = [
//!     SpaceSpec::Text {
//!         name: "description".into(),
//!         attribute: "description".into(),
//!         model: "all-MiniLM-L6-v2".into(),
//!     },
//!     SpaceSpec::Categorical {
//!         name: "category".into(),
//!         attribute: "food_category".into(),
//!         vocabulary: VocabularySource::FromCorpus,
//!         unknown: UnknownCategoryPolicy::Reject,
//!     },
//!     SpaceSpec::Number {
//!         name: "calories".into(),
//!         attribute: "calories".into(),
//!         out_of_range: OutOfRangePolicy::Clip,
//!     },
//! ];
//! let engine = Engine::from_specs(store, &specs).unwrap();
//!
//! // Declare the query once, bind it per request
//! let query = Query::builder()
//!     .similar("description", param("q"))
//!     .filter("category", param("cat"))
//!     .build();
//! let results = engine.search(
//!     &query,
//!     &Binding::new()
//!         .set("q", "sugary cereal")
//!         .set_category("cat", "breakfast"),
//! ).unwrap();
//! assert_eq!(results.rows()[0].id, RecordId::Integer(1));
//! ```
//!
//! ## Crate Structure
//!
//! rankx is composed of several crates:
//!
//! - [`rankx-core`](https://docs.rs/rankx-core) - Vectors, records, attribute values, errors
//! - [`rankx-schema`](https://docs.rs/rankx-schema) - Schema, similarity spaces, record store
//! - [`rankx-query`](https://docs.rs/rankx-query) - Index, declarative queries, ranking executor
//!
//! ## Features
//!
//! - **Heterogeneous spaces**: text, categorical, and numeric similarity per attribute
//! - **Signed weights**: boost, mute, or penalize any space per query
//! - **Hard filters**: conjunctive exact-match gates alongside soft similarity
//! - **Deterministic ranking**: reproducible output with id tie-breaks
//! - **Snapshot swap**: ingest rebuilds incrementally, readers never block
//! - **Vector export**: composite vectors handed off for external projection

// Re-export core types
pub use rankx_core::{
    AttributeValue, Error, Record, RecordId, Result, SchemaViolation, Vector,
};

// Re-export schema layer
pub use rankx_schema::{
    AttributeDef, AttributeType, HashingTextEmbedder, OutOfRangePolicy, RecordStore, Schema,
    Space, SpaceSpec, TextEmbedder, UnknownCategoryPolicy, VocabularySource, DEFAULT_TEXT_DIM,
};

// Re-export query layer
pub use rankx_query::{
    execute, param, weight_param, Binding, Engine, Index, Query, QueryBuilder, ResultRow,
    ResultSet, ResultStats, Select, Term, TermKind, ValueSource, WeightSource,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        param, weight_param, AttributeDef, AttributeType, AttributeValue, Binding, Engine,
        Error, Index, OutOfRangePolicy, Query, Record, RecordId, RecordStore, Result, Schema,
        Space, SpaceSpec, UnknownCategoryPolicy, Vector, VocabularySource,
    };
}

//! # rankx Query
//!
//! Index, declarative queries, and the ranking executor for the rankx
//! retrieval engine.
//!
//! ## Features
//!
//! - **Index**: frozen per-record vector tables over an ordered set of
//!   spaces, with composite-vector export and incremental rebuild
//! - **Query**: immutable term list (weighted similar terms, hard filters)
//!   with named parameters bound per execution
//! - **Executor**: filter, score, rank, project; deterministic output,
//!   parallel scoring
//! - **Engine**: store + index with atomic snapshot swap on ingest
//!
//! ## Example
//!
//! ```rust
//! use rankx_core::Record;
//! use rankx_query::{param, Binding, Engine, Query};
//! use rankx_schema::{
//!     AttributeDef, OutOfRangePolicy, RecordStore, Schema, SpaceSpec,
//!     UnknownCategoryPolicy, VocabularySource,
//! };
//!
//! let schema = Schema::new(
//!     "fdc_id",
//!     vec![
//!         AttributeDef::text("description"),
//!         AttributeDef::categorical("food_category"),
//!         AttributeDef::numeric("calories", 0.0, 1000.0),
//!     ],
//! ).unwrap();
//! let mut store = RecordStore::new(schema);
//! store.put(vec![
//!     Record::new(1u64)
//!         .with("description", "sweet cereal")
//!         .with_category("food_category", "breakfast")
//!         .with("calories", 120.0),
//! ]).unwrap();
//!
//! let engine = Engine::from_specs(store, &[SpaceSpec::Text {
//!     name: "description".into(),
//!     attribute: "description".into(),
//!     model: "all-MiniLM-L6-v2".into(),
//! }]).unwrap();
//!
//! let query = Query::builder().similar("description", param("q")).build();
//! let results = engine
//!     .search(&query, &Binding::new().set("q", "sugary cereal"))
//!     .unwrap();
//! assert_eq!(results.len(), 1);
//! ```

pub mod engine;
pub mod executor;
pub mod index;
pub mod query;
pub mod results;

pub use engine::Engine;
pub use executor::execute;
pub use index::Index;
pub use query::{
    param, weight_param, Binding, Query, QueryBuilder, Select, Term, TermKind, ValueSource,
    WeightSource,
};
pub use results::{ResultRow, ResultSet, ResultStats};

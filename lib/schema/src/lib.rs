//! # rankx Schema
//!
//! Typed attribute layout, similarity spaces, and the record store for the
//! rankx retrieval engine.
//!
//! ## Features
//!
//! - **Schema**: ordered, typed attribute layout with a designated id field
//! - **Spaces**: per-attribute embedding + similarity pairs (text,
//!   categorical, number) as a closed sum type
//! - **Embedding backends**: the [`TextEmbedder`] trait with a deterministic
//!   hashing default, memoized per space instance
//! - **Record store**: validated batch ingest with full violation reports
//!
//! ## Example
//!
//! ```rust
//! use rankx_schema::{AttributeDef, Schema, RecordStore, Space, SpaceSpec, VocabularySource, UnknownCategoryPolicy};
//! use rankx_core::Record;
//!
//! let schema = Schema::new(
//!     "fdc_id",
//!     vec![
//!         AttributeDef::text("description"),
//!         AttributeDef::categorical("food_category"),
//!         AttributeDef::numeric("calories", 0.0, 1000.0),
//!     ],
//! ).unwrap();
//!
//! let mut store = RecordStore::new(schema);
//! store.put(vec![
//!     Record::new(1u64)
//!         .with("description", "sweet cereal")
//!         .with_category("food_category", "breakfast")
//!         .with("calories", 120.0),
//! ]).unwrap();
//!
//! let spec = SpaceSpec::Categorical {
//!     name: "category".into(),
//!     attribute: "food_category".into(),
//!     vocabulary: VocabularySource::FromCorpus,
//!     unknown: UnknownCategoryPolicy::Reject,
//! };
//! let space = Space::from_spec(&spec, &store).unwrap();
//! assert_eq!(space.dim(), 1);
//! ```

pub mod embedder;
pub mod schema;
pub mod space;
pub mod store;

pub use embedder::{HashingTextEmbedder, TextEmbedder, DEFAULT_TEXT_DIM};
pub use schema::{AttributeDef, AttributeType, Schema};
pub use space::{
    CategoricalSpace, NumberSpace, OutOfRangePolicy, Space, SpaceSpec, TextSpace,
    UnknownCategoryPolicy, VocabularySource,
};
pub use store::RecordStore;

//! # rankx Core
//!
//! Core library for the rankx retrieval engine.
//!
//! This crate provides the fundamental data structures shared by the
//! schema and query layers:
//!
//! - [`Vector`] - Dense vector representation with cosine similarity
//! - [`Record`] - One entity: identifier plus typed attribute values
//! - [`RecordId`] - String, integer, or UUID identifier with a total order
//! - [`AttributeValue`] - Text, categorical, or numeric value
//! - [`Error`] - The shared error taxonomy
//!
//! ## Example
//!
//! ```rust
//! use rankx_core::{AttributeValue, Record, RecordId, Vector};
//!
//! let record = Record::new(1u64)
//!     .with("description", "sweet cereal")
//!     .with_category("category", "breakfast")
//!     .with("calories", 120.0);
//! assert_eq!(record.id, RecordId::Integer(1));
//!
//! let a = Vector::new(vec![1.0, 0.0]);
//! let b = Vector::new(vec![1.0, 0.0]);
//! assert!((a.cosine_similarity(&b) - 1.0).abs() < 1e-6);
//! ```

pub mod error;
pub mod record;
pub mod vector;

pub use error::{Error, Result, SchemaViolation};
pub use record::{AttributeValue, Record, RecordId};
pub use vector::Vector;

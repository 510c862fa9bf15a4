//! # vizrec Core
//!
//! Core data model for the vizrec chart recommender.
//!
//! - [`FieldDescriptor`] - One schema column with its semantic type
//! - [`Encoding`] - A mark type plus channel bindings
//! - [`EncodedField`] - A field bound to a channel (plain, aggregated or binned)
//! - [`StatsProvider`] - Per-field cardinality statistics
//!
//! ## Example
//!
//! ```rust
//! use vizrec_core::{Channel, EncodedField, Encoding, FieldDescriptor, FieldType, Mark};
//!
//! let origin = FieldDescriptor::nominal("Origin").selected(true);
//! assert!(origin.is_selected());
//!
//! let encoding = Encoding::new(Mark::Bar)
//!     .with(Channel::X, EncodedField::plain("Origin", FieldType::Nominal))
//!     .with(Channel::Y, EncodedField::count());
//! assert_eq!(encoding.shorthand(), "bar|x=Origin(N)|y=count_*(Q)");
//! ```

pub mod error;
pub mod field;
pub mod encoding;
pub mod stats;

pub use error::{Error, Result};
pub use field::{
    fields_from_json, fields_from_raw, Aggregate, FieldDescriptor, FieldType, RawFieldDescriptor,
};
pub use encoding::{Channel, ColumnKey, EncodedField, Encoding, Mark, COUNT_COLUMN};
pub use stats::{
    cardinality, encoded_cardinality, ColumnStats, FieldStats, StatsProvider,
    DEFAULT_FALLBACK_SAMPLE_SIZE,
};

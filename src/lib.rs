//! # vizrec
//!
//! A chart recommendation engine. Given a schema and a field selection,
//! vizrec enumerates the field sets worth visualizing, scores the candidate
//! encodings for each one and clusters near-duplicate encodings so a UI can
//! show one representative per cluster.
//!
//! ## Quick Start
//!
//! ### As a CLI
//!
//! ```bash
//! vizrec projections request.json
//! vizrec recommend request.json --threshold 2.5 --pretty
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use vizrec::prelude::*;
//!
//! let fields = vec![
//!     FieldDescriptor::nominal("Origin").selected(true),
//!     FieldDescriptor::quantitative("Horsepower").selected(true),
//! ];
//!
//! // Any closure from projection to candidates works as a generator
//! let generator = |p: &Projection| {
//!     let origin = EncodedField::plain("Origin", FieldType::Nominal);
//!     let hp = EncodedField::aggregated("Horsepower", FieldType::Quantitative, Aggregate::Mean);
//!     if p.key() != "Origin,Horsepower" {
//!         return Vec::new();
//!     }
//!     vec![
//!         Encoding::new(Mark::Bar).with(Channel::X, origin.clone()).with(Channel::Y, hp.clone()),
//!         Encoding::new(Mark::Point).with(Channel::X, origin).with(Channel::Y, hp),
//!     ]
//! };
//!
//! let recommendations = Recommender::default().recommend(&fields, &generator).unwrap();
//! let best = recommendations[0].top().unwrap();
//! assert_eq!(best.encoding.mark, Mark::Bar);
//! ```
//!
//! ## Crate Structure
//!
//! - `vizrec-core` - Data model (fields, encodings, statistics, errors)
//! - `vizrec-projection` - Projection generation
//! - `vizrec-rank` - Scoring, distance tables and clustering

pub mod pipeline;

pub use vizrec_core::{
    Aggregate, Channel, EncodedField, Encoding, Error, FieldDescriptor, FieldStats, FieldType,
    Mark, Result, StatsProvider,
};
pub use vizrec_projection::{Projection, ProjectionOptions};
pub use vizrec_rank::{Cluster, ClusterSet, DistanceTable, EncodingScorer, ScoredEncoding};
pub use pipeline::{
    EncodingGenerator, PrecomputedEncodings, RecommendConfig, RecommendRequest, Recommendation,
    Recommender, DEFAULT_CLUSTER_THRESHOLD,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Aggregate, Channel, EncodedField, Encoding, Error, FieldDescriptor, FieldStats, FieldType,
        Mark, Result, StatsProvider,
        Projection, ProjectionOptions,
        Cluster, ClusterSet, DistanceTable, EncodingScorer, ScoredEncoding,
        EncodingGenerator, PrecomputedEncodings, RecommendConfig, RecommendRequest,
        Recommendation, Recommender,
    };
}

/// Individual pipeline stages
pub mod stages {
    pub use vizrec_projection::{generate as generate_projections, projection_key};
    pub use vizrec_rank::{build_distance_table, cluster, cluster_with_table, encoding_distance};
}

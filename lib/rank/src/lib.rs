//! # vizrec Rank
//!
//! Scores candidate encodings, measures how different they are from each
//! other, and groups near-duplicates so that one representative per group
//! can be shown.
//!
//! ## Example
//!
//! ```rust
//! use vizrec_core::{Aggregate, Channel, EncodedField, Encoding, FieldType, Mark};
//! use vizrec_rank::{cluster, EncodingScorer};
//!
//! let origin = EncodedField::plain("Origin", FieldType::Nominal);
//! let hp = EncodedField::aggregated("Horsepower", FieldType::Quantitative, Aggregate::Mean);
//!
//! let candidates = vec![
//!     Encoding::new(Mark::Bar).with(Channel::X, origin.clone()).with(Channel::Y, hp.clone()),
//!     Encoding::new(Mark::Bar).with(Channel::Y, origin).with(Channel::X, hp),
//! ];
//!
//! let scored = EncodingScorer::new().score_all(candidates);
//! let clusters = cluster(&scored, 2.5).unwrap();
//!
//! // The transposed bar chart is a near-duplicate
//! assert_eq!(clusters.len(), 1);
//! assert_eq!(clusters.clusters()[0].top(), 0);
//! ```

pub mod score;
pub mod distance;
pub mod cluster;

pub use score::{compare_ranked, mark_score, rank_order, EncodingScorer, ScoredEncoding};
pub use distance::{build_distance_table, channel_distance, encoding_distance, DistanceTable};
pub use cluster::{cluster, cluster_with_table, Cluster, ClusterSet};

//! # vizrec Projection
//!
//! Decides which field sets are worth visualizing for a user's selection.
//!
//! ## Example
//!
//! ```rust
//! use vizrec_core::FieldDescriptor;
//! use vizrec_projection::{generate, ProjectionOptions};
//!
//! let fields = vec![
//!     FieldDescriptor::nominal("Origin").selected(true),
//!     FieldDescriptor::quantitative("Horsepower").selected(true),
//!     FieldDescriptor::temporal("Year"),
//! ];
//!
//! let projections = generate(&fields, None, &ProjectionOptions::default()).unwrap();
//! let keys: Vec<&str> = projections.iter().map(|p| p.key()).collect();
//! assert_eq!(keys, vec!["Origin,Horsepower", "Origin,Horsepower,Year"]);
//! ```

pub mod combinations;
pub mod generator;
pub mod options;

pub use combinations::{choose_k, choose_k_or_less};
pub use generator::{generate, projection_key, Projection, MAX_ADDED_FIELDS};
pub use options::ProjectionOptions;

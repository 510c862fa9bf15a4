//! Field statistics
//!
//! The projection generator and the scorer only need one statistic: the
//! number of distinct values a field takes.

use crate::encoding::EncodedField;
use crate::field::FieldDescriptor;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Sample size assumed when no statistic is known for a field
pub const DEFAULT_FALLBACK_SAMPLE_SIZE: u64 = 15;

/// Source of per-field statistics
pub trait StatsProvider {
    /// Distinct-value count of the named column, if known
    fn distinct(&self, field: &str) -> Option<u64>;

    /// Cardinality of a schema field
    ///
    /// Count fields have cardinality 1. Otherwise the provider's statistic
    /// wins over the descriptor's own `cardinality`, and
    /// `fallback_sample_size` is used when neither is known.
    fn cardinality(&self, field: &FieldDescriptor, fallback_sample_size: u64) -> u64 {
        if field.is_count() {
            return 1;
        }
        self.distinct(&field.field)
            .or(field.cardinality)
            .unwrap_or(fallback_sample_size)
    }
}

/// Cardinality of `field` with an optional provider
pub fn cardinality(
    field: &FieldDescriptor,
    stats: Option<&dyn StatsProvider>,
    fallback_sample_size: u64,
) -> u64 {
    match stats {
        Some(stats) => stats.cardinality(field, fallback_sample_size),
        None if field.is_count() => 1,
        None => field.cardinality.unwrap_or(fallback_sample_size),
    }
}

/// Cardinality of a channel-bound field
///
/// Binned fields have at most `maxbins` values and aggregates collapse to
/// one value per group.
pub fn encoded_cardinality(
    field: &EncodedField,
    stats: Option<&dyn StatsProvider>,
    fallback_sample_size: u64,
) -> u64 {
    match field {
        EncodedField::Binned { maxbins, .. } => u64::from(*maxbins),
        EncodedField::Aggregated { .. } => 1,
        EncodedField::Plain { name, .. } => stats
            .and_then(|s| s.distinct(name))
            .unwrap_or(fallback_sample_size),
    }
}

/// Statistics of one column
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnStats {
    pub distinct: u64,
}

/// In-memory statistics keyed by field name
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct FieldStats {
    columns: AHashMap<String, ColumnStats>,
}

impl FieldStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_distinct(mut self, field: impl Into<String>, distinct: u64) -> Self {
        self.insert(field, distinct);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, distinct: u64) {
        self.columns.insert(field.into(), ColumnStats { distinct });
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl StatsProvider for FieldStats {
    fn distinct(&self, field: &str) -> Option<u64> {
        self.columns.get(field).map(|c| c.distinct)
    }
}

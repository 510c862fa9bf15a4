//! Schema field descriptors
//!
//! A [`FieldDescriptor`] describes one column of the data schema: its name,
//! semantic type, whether the user selected it, and optionally its
//! cardinality and aggregate.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic type of a data field
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Unordered categories
    Nominal,
    /// Ordered categories
    Ordinal,
    /// Dates and times
    Temporal,
    /// Numbers
    Quantitative,
}

impl FieldType {
    /// Dimensions are fields suited to grouping
    pub fn is_dimension(&self) -> bool {
        matches!(self, FieldType::Nominal | FieldType::Ordinal | FieldType::Temporal)
    }

    /// Measures are fields suited to aggregation
    pub fn is_measure(&self) -> bool {
        !self.is_dimension()
    }

    /// Nominal or ordinal
    pub fn is_categorical(&self) -> bool {
        matches!(self, FieldType::Nominal | FieldType::Ordinal)
    }

    /// Single-letter code used in shorthand labels
    pub fn code(&self) -> &'static str {
        match self {
            FieldType::Nominal => "N",
            FieldType::Ordinal => "O",
            FieldType::Temporal => "T",
            FieldType::Quantitative => "Q",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Aggregation applied to a field
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Aggregate {
    Count,
    Sum,
    Mean,
    Median,
    Min,
    Max,
}

impl Aggregate {
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregate::Count => "count",
            Aggregate::Sum => "sum",
            Aggregate::Mean => "mean",
            Aggregate::Median => "median",
            Aggregate::Min => "min",
            Aggregate::Max => "max",
        }
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One schema column
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Unique field name. May be empty for the count field.
    pub field: String,

    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// `Some(true)` selected, `Some(false)` excluded, `None` eligible for auto-add
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,

    /// Known number of distinct values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardinality: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate: Option<Aggregate>,
}

impl FieldDescriptor {
    pub fn new(field: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            field: field.into(),
            field_type,
            selected: None,
            cardinality: None,
            aggregate: None,
        }
    }

    pub fn nominal(field: impl Into<String>) -> Self {
        Self::new(field, FieldType::Nominal)
    }

    pub fn ordinal(field: impl Into<String>) -> Self {
        Self::new(field, FieldType::Ordinal)
    }

    pub fn temporal(field: impl Into<String>) -> Self {
        Self::new(field, FieldType::Temporal)
    }

    pub fn quantitative(field: impl Into<String>) -> Self {
        Self::new(field, FieldType::Quantitative)
    }

    /// The record-count pseudo field
    pub fn count() -> Self {
        Self {
            aggregate: Some(Aggregate::Count),
            ..Self::new("", FieldType::Quantitative)
        }
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = Some(selected);
        self
    }

    pub fn with_cardinality(mut self, cardinality: u64) -> Self {
        self.cardinality = Some(cardinality);
        self
    }

    pub fn is_selected(&self) -> bool {
        self.selected == Some(true)
    }

    pub fn is_count(&self) -> bool {
        self.aggregate == Some(Aggregate::Count)
    }

    /// Name used in projection keys
    pub fn key_name(&self) -> &str {
        if self.is_count() {
            "count"
        } else {
            &self.field
        }
    }
}

/// Permissive descriptor shape for hosts that deserialize untrusted JSON
///
/// Every member is optional so that a missing `field` or `type` surfaces as
/// [`Error::MalformedField`] carrying the descriptor's index, instead of an
/// opaque deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawFieldDescriptor {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default, rename = "type")]
    pub field_type: Option<FieldType>,
    #[serde(default)]
    pub selected: Option<bool>,
    #[serde(default)]
    pub cardinality: Option<u64>,
    #[serde(default)]
    pub aggregate: Option<Aggregate>,
}

impl RawFieldDescriptor {
    /// Convert into a descriptor, reporting `index` on failure
    pub fn into_descriptor(self, index: usize) -> Result<FieldDescriptor> {
        let is_count = self.aggregate == Some(Aggregate::Count);

        let field = match self.field {
            Some(name) => name,
            None if is_count => String::new(),
            None => {
                return Err(Error::MalformedField {
                    index,
                    reason: "missing 'field'".to_string(),
                })
            }
        };

        let field_type = match self.field_type {
            Some(t) => t,
            None if is_count => FieldType::Quantitative,
            None => {
                return Err(Error::MalformedField {
                    index,
                    reason: format!("missing 'type' for field '{}'", field),
                })
            }
        };

        Ok(FieldDescriptor {
            field,
            field_type,
            selected: self.selected,
            cardinality: self.cardinality,
            aggregate: self.aggregate,
        })
    }
}

/// Convert a list of raw descriptors, failing on the first malformed one
pub fn fields_from_raw(raw: Vec<RawFieldDescriptor>) -> Result<Vec<FieldDescriptor>> {
    raw.into_iter()
        .enumerate()
        .map(|(index, r)| r.into_descriptor(index))
        .collect()
}

/// Parse a JSON array of field descriptors
pub fn fields_from_json(json: &str) -> Result<Vec<FieldDescriptor>> {
    let raw: Vec<RawFieldDescriptor> = serde_json::from_str(json)?;
    fields_from_raw(raw)
}

//! Projection options
//!
//! Missing options take their defaults. [`ProjectionOptions::from_value`]
//! additionally tolerates values of the wrong type, replacing each one with
//! its default instead of rejecting the whole configuration.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Options controlling projection generation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectionOptions {
    /// Exclude single-field projections (dot plots)
    pub omit_dot_plot: bool,

    /// Max cardinality for an ordinal field to be considered for auto adding.
    ///
    /// The filter only runs when this is `None` or `Some(0)`, so any positive
    /// maximum leaves it inert and `Some(0)` excludes every categorical field
    /// with at least one value.
    pub max_cardinality_for_auto_add_ordinal: Option<u64>,

    /// Reserved
    pub always_add_histogram: bool,
}

pub const DEFAULT_OMIT_DOT_PLOT: bool = true;
pub const DEFAULT_MAX_CARDINALITY_FOR_AUTO_ADD_ORDINAL: u64 = 50;
pub const DEFAULT_ALWAYS_ADD_HISTOGRAM: bool = true;

impl Default for ProjectionOptions {
    fn default() -> Self {
        Self {
            omit_dot_plot: DEFAULT_OMIT_DOT_PLOT,
            max_cardinality_for_auto_add_ordinal: Some(
                DEFAULT_MAX_CARDINALITY_FOR_AUTO_ADD_ORDINAL,
            ),
            always_add_histogram: DEFAULT_ALWAYS_ADD_HISTOGRAM,
        }
    }
}

impl ProjectionOptions {
    pub fn omit_dot_plot(mut self, omit: bool) -> Self {
        self.omit_dot_plot = omit;
        self
    }

    pub fn max_cardinality_for_auto_add_ordinal(mut self, max: Option<u64>) -> Self {
        self.max_cardinality_for_auto_add_ordinal = max;
        self
    }

    /// Build options from loosely-typed JSON
    ///
    /// Unknown keys are ignored. A key holding a value of the wrong type
    /// keeps its default and is logged. An explicit `null` for the maximum
    /// cardinality clears it.
    pub fn from_value(value: &Value) -> Self {
        let mut opt = Self::default();

        let Some(map) = value.as_object() else {
            if !value.is_null() {
                warn!("Projection options must be an object, using defaults");
            }
            return opt;
        };

        if let Some(v) = map.get("omitDotPlot") {
            match v.as_bool() {
                Some(b) => opt.omit_dot_plot = b,
                None => warn!(value = %v, "Invalid omitDotPlot, using default"),
            }
        }

        if let Some(v) = map.get("maxCardinalityForAutoAddOrdinal") {
            match v {
                Value::Null => opt.max_cardinality_for_auto_add_ordinal = None,
                _ => match v.as_u64() {
                    Some(n) => opt.max_cardinality_for_auto_add_ordinal = Some(n),
                    None => warn!(
                        value = %v,
                        "Invalid maxCardinalityForAutoAddOrdinal, using default"
                    ),
                },
            }
        }

        if let Some(v) = map.get("alwaysAddHistogram") {
            match v.as_bool() {
                Some(b) => opt.always_add_histogram = b,
                None => warn!(value = %v, "Invalid alwaysAddHistogram, using default"),
            }
        }

        opt
    }

    /// Whether the ordinal cardinality filter runs at all
    pub(crate) fn cardinality_filter_active(&self) -> bool {
        matches!(self.max_cardinality_for_auto_add_ordinal, None | Some(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let opt = ProjectionOptions::default();
        assert!(opt.omit_dot_plot);
        assert_eq!(opt.max_cardinality_for_auto_add_ordinal, Some(50));
        assert!(opt.always_add_histogram);
        assert!(!opt.cardinality_filter_active());
    }

    #[test]
    fn test_serde_defaults_for_missing_keys() {
        let opt: ProjectionOptions = serde_json::from_str(r#"{"omitDotPlot": false}"#).unwrap();
        assert!(!opt.omit_dot_plot);
        assert_eq!(opt.max_cardinality_for_auto_add_ordinal, Some(50));
    }

    #[test]
    fn test_from_value_invalid_values_fall_back() {
        let opt = ProjectionOptions::from_value(&json!({
            "omitDotPlot": "yes",
            "maxCardinalityForAutoAddOrdinal": -3,
            "alwaysAddHistogram": false
        }));

        assert!(opt.omit_dot_plot);
        assert_eq!(opt.max_cardinality_for_auto_add_ordinal, Some(50));
        assert!(!opt.always_add_histogram);
    }

    #[test]
    fn test_from_value_non_object() {
        assert_eq!(ProjectionOptions::from_value(&json!(42)), ProjectionOptions::default());
        assert_eq!(ProjectionOptions::from_value(&Value::Null), ProjectionOptions::default());
    }

    #[test]
    fn test_from_value_null_max_activates_filter() {
        let opt = ProjectionOptions::from_value(&json!({"maxCardinalityForAutoAddOrdinal": null}));
        assert_eq!(opt.max_cardinality_for_auto_add_ordinal, None);
        assert!(opt.cardinality_filter_active());
    }
}

//! Projection generation
//!
//! A projection is the ordered set of fields a chart should show: every
//! selected field, in schema order, followed by at most
//! [`MAX_ADDED_FIELDS`] automatically suggested fields.

use crate::combinations::choose_k_or_less;
use crate::options::ProjectionOptions;
use ahash::AHashMap;
use serde::Serialize;
use tracing::debug;
use vizrec_core::{cardinality, Error, FieldDescriptor, FieldType, Result, StatsProvider};

/// Number of fields that may be auto-added to the selection
pub const MAX_ADDED_FIELDS: usize = 1;

/// Sample size passed to the cardinality lookup of the auto-add filter
pub const CARDINALITY_FALLBACK_SAMPLE_SIZE: u64 = 15;

/// An ordered field set with its key
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Projection {
    fields: Vec<FieldDescriptor>,
    key: String,
    #[serde(skip)]
    selected_len: usize,
}

impl Projection {
    /// `selected_len` leading fields are the user's selection
    pub fn new(fields: Vec<FieldDescriptor>, selected_len: usize) -> Self {
        let key = projection_key(&fields);
        Self {
            selected_len: selected_len.min(fields.len()),
            fields,
            key,
        }
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldDescriptor> {
        self.fields.iter()
    }

    pub fn selected_len(&self) -> usize {
        self.selected_len
    }

    /// Fields added on top of the selection
    pub fn added(&self) -> &[FieldDescriptor] {
        &self.fields[self.selected_len..]
    }
}

impl<'a> IntoIterator for &'a Projection {
    type Item = &'a FieldDescriptor;
    type IntoIter = std::slice::Iter<'a, FieldDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// Comma-joined field names in order, `count` for count fields
pub fn projection_key(fields: &[FieldDescriptor]) -> String {
    fields
        .iter()
        .map(FieldDescriptor::key_name)
        .collect::<Vec<_>>()
        .join(",")
}

/// Larger means more measure-like
fn type_priority(field_type: FieldType) -> u8 {
    match field_type {
        FieldType::Nominal | FieldType::Ordinal => 0,
        FieldType::Temporal => 2,
        FieldType::Quantitative => 3,
    }
}

/// Non-count fields need a name, and names must be unique
fn validate(fields: &[FieldDescriptor]) -> Result<()> {
    let mut seen: AHashMap<&str, usize> = AHashMap::with_capacity(fields.len());

    for (index, field) in fields.iter().enumerate() {
        if field.is_count() {
            continue;
        }
        if field.field.trim().is_empty() {
            return Err(Error::MalformedField {
                index,
                reason: "empty field name".to_string(),
            });
        }
        if let Some(&first) = seen.get(field.field.as_str()) {
            return Err(Error::DuplicateField {
                name: field.field.clone(),
                first,
                second: index,
            });
        }
        seen.insert(&field.field, index);
    }

    Ok(())
}

/// The ordinal cardinality filter of the auto-add step
///
/// Runs only when no positive maximum is configured. A missing maximum
/// never compares greater, so in practice only `Some(0)` filters.
fn exceeds_auto_add_cardinality(
    field: &FieldDescriptor,
    stats: Option<&dyn StatsProvider>,
    opt: &ProjectionOptions,
) -> bool {
    if !field.field_type.is_categorical() || !opt.cardinality_filter_active() {
        return false;
    }
    match opt.max_cardinality_for_auto_add_ordinal {
        Some(max) => cardinality(field, stats, CARDINALITY_FALLBACK_SAMPLE_SIZE) > max,
        None => false,
    }
}

/// Generate the projections worth visualizing for a field selection
///
/// Selected fields come first in schema order. Candidates for auto-adding
/// are fields not explicitly deselected and not counts, ordered
/// measures-first when a dimension is selected and dimensions-first
/// otherwise, with schema position breaking ties. The result holds the
/// selection alone followed by the selection plus each single candidate,
/// minus empty projections and, with `omit_dot_plot`, single-field ones.
pub fn generate(
    fields: &[FieldDescriptor],
    stats: Option<&dyn StatsProvider>,
    opt: &ProjectionOptions,
) -> Result<Vec<Projection>> {
    validate(fields)?;

    let mut selected: Vec<FieldDescriptor> = Vec::new();
    let mut to_add: Vec<(usize, &FieldDescriptor)> = Vec::new();
    let mut has_selected_dimension = false;
    let mut has_selected_measure = false;

    for (index, field) in fields.iter().enumerate() {
        if field.is_selected() {
            if field.field_type.is_dimension() {
                has_selected_dimension = true;
            } else {
                has_selected_measure = true;
            }
            selected.push(field.clone());
        } else if field.selected != Some(false) && !field.is_count() {
            if exceeds_auto_add_cardinality(field, stats, opt) {
                debug!(field = %field.field, "Skipping high-cardinality field for auto add");
                continue;
            }
            to_add.push((index, field));
        }
    }

    to_add.sort_by(|(ia, a), (ib, b)| {
        let (pa, pb) = (type_priority(a.field_type), type_priority(b.field_type));
        let by_type = if has_selected_dimension {
            pb.cmp(&pa)
        } else {
            pa.cmp(&pb)
        };
        by_type.then(ia.cmp(ib))
    });

    debug!(
        selected = selected.len(),
        candidates = to_add.len(),
        has_selected_dimension,
        has_selected_measure,
        "Partitioned fields"
    );

    let selected_len = selected.len();
    let projections: Vec<Projection> = choose_k_or_less(&to_add, MAX_ADDED_FIELDS)
        .into_iter()
        .filter_map(|set_to_add| {
            let total = selected_len + set_to_add.len();
            if total == 0 || (opt.omit_dot_plot && total == 1) {
                return None;
            }
            let mut members = selected.clone();
            members.extend(set_to_add.into_iter().map(|(_, f)| f.clone()));
            Some(Projection::new(members, selected_len))
        })
        .collect();

    debug!(count = projections.len(), "Generated projections");
    Ok(projections)
}

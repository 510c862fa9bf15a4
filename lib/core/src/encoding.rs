//! Visual encodings
//!
//! An [`Encoding`] is a mark type plus a mapping from visual channels to
//! encoded fields. Encodings are produced by an external generator; the
//! ranking crates only read them.

use crate::field::{Aggregate, FieldType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Mark type of a chart
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    Point,
    Tick,
    Bar,
    Line,
    Area,
    Circle,
    Square,
    Text,
}

impl Mark {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mark::Point => "point",
            Mark::Tick => "tick",
            Mark::Bar => "bar",
            Mark::Line => "line",
            Mark::Area => "area",
            Mark::Circle => "circle",
            Mark::Square => "square",
            Mark::Text => "text",
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visual channel
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    X,
    Y,
    Row,
    Col,
    Size,
    Color,
    Shape,
    Text,
    Detail,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::X => "x",
            Channel::Y => "y",
            Channel::Row => "row",
            Channel::Col => "col",
            Channel::Size => "size",
            Channel::Color => "color",
            Channel::Shape => "shape",
            Channel::Text => "text",
            Channel::Detail => "detail",
        }
    }

    pub fn is_position(&self) -> bool {
        matches!(self, Channel::X | Channel::Y)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name used for the count aggregate, which has no underlying column
pub const COUNT_COLUMN: &str = "*";

/// A field as bound to a channel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EncodedField {
    /// Raw column values
    Plain {
        name: String,
        #[serde(rename = "type")]
        field_type: FieldType,
    },
    /// Aggregated column; `name` is `None` for count
    Aggregated {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(rename = "type")]
        field_type: FieldType,
        aggregate: Aggregate,
    },
    /// Binned column
    Binned {
        name: String,
        #[serde(rename = "type")]
        field_type: FieldType,
        maxbins: u32,
    },
}

/// Identity of the data column behind an encoded field, including transform
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnKey {
    pub name: String,
    pub aggregate: Option<Aggregate>,
    pub binned: bool,
}

impl EncodedField {
    pub fn plain(name: impl Into<String>, field_type: FieldType) -> Self {
        EncodedField::Plain {
            name: name.into(),
            field_type,
        }
    }

    pub fn aggregated(
        name: impl Into<String>,
        field_type: FieldType,
        aggregate: Aggregate,
    ) -> Self {
        EncodedField::Aggregated {
            name: Some(name.into()),
            field_type,
            aggregate,
        }
    }

    pub fn count() -> Self {
        EncodedField::Aggregated {
            name: None,
            field_type: FieldType::Quantitative,
            aggregate: Aggregate::Count,
        }
    }

    pub fn binned(name: impl Into<String>, field_type: FieldType, maxbins: u32) -> Self {
        EncodedField::Binned {
            name: name.into(),
            field_type,
            maxbins,
        }
    }

    /// Column name, `*` for count
    pub fn name(&self) -> &str {
        match self {
            EncodedField::Plain { name, .. } | EncodedField::Binned { name, .. } => name,
            EncodedField::Aggregated { name, .. } => name.as_deref().unwrap_or(COUNT_COLUMN),
        }
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            EncodedField::Plain { field_type, .. }
            | EncodedField::Aggregated { field_type, .. }
            | EncodedField::Binned { field_type, .. } => *field_type,
        }
    }

    pub fn aggregate(&self) -> Option<Aggregate> {
        match self {
            EncodedField::Aggregated { aggregate, .. } => Some(*aggregate),
            _ => None,
        }
    }

    pub fn is_binned(&self) -> bool {
        matches!(self, EncodedField::Binned { .. })
    }

    /// Binned quantitative fields behave like dimensions
    pub fn is_dimension(&self) -> bool {
        self.is_binned() || self.field_type().is_dimension()
    }

    pub fn column_key(&self) -> ColumnKey {
        ColumnKey {
            name: self.name().to_string(),
            aggregate: self.aggregate(),
            binned: self.is_binned(),
        }
    }

    /// `[aggr_][bin_]name(type)`
    pub fn label(&self) -> String {
        let mut label = String::new();
        if let Some(aggregate) = self.aggregate() {
            label.push_str(aggregate.as_str());
            label.push('_');
        }
        if self.is_binned() {
            label.push_str("bin_");
        }
        label.push_str(self.name());
        label.push('(');
        label.push_str(self.field_type().code());
        label.push(')');
        label
    }
}

/// Mark type plus channel bindings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Encoding {
    pub mark: Mark,
    #[serde(default)]
    pub channels: BTreeMap<Channel, EncodedField>,
}

impl Encoding {
    pub fn new(mark: Mark) -> Self {
        Self {
            mark,
            channels: BTreeMap::new(),
        }
    }

    /// Bind `field` to `channel`, replacing any previous binding
    pub fn with(mut self, channel: Channel, field: EncodedField) -> Self {
        self.channels.insert(channel, field);
        self
    }

    pub fn get(&self, channel: Channel) -> Option<&EncodedField> {
        self.channels.get(&channel)
    }

    pub fn has(&self, channel: Channel) -> bool {
        self.channels.contains_key(&channel)
    }

    /// Channel bindings in channel order
    pub fn iter(&self) -> impl Iterator<Item = (Channel, &EncodedField)> {
        self.channels.iter().map(|(c, f)| (*c, f))
    }

    pub fn fields(&self) -> impl Iterator<Item = &EncodedField> {
        self.channels.values()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// `mark|channel=label|...`
    pub fn shorthand(&self) -> String {
        let mut out = self.mark.as_str().to_string();
        for (channel, field) in self.iter() {
            out.push('|');
            out.push_str(channel.as_str());
            out.push('=');
            out.push_str(&field.label());
        }
        out
    }
}

impl AsRef<Encoding> for Encoding {
    fn as_ref(&self) -> &Encoding {
        self
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.shorthand())
    }
}

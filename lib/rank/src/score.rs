//! Encoding quality scoring
//!
//! Every channel binding contributes one feature in `(0, 1]`, looked up in a
//! dimension table or a measure table depending on the bound field. Two
//! chart-level features follow: a penalty for multi-channel charts that
//! leave a position channel unused, and a prior on the mark type. The score
//! is the product of all features.

use ordered_float::OrderedFloat;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use vizrec_core::{
    encoded_cardinality, Channel, EncodedField, Encoding, FieldType, Mark, StatsProvider,
    DEFAULT_FALLBACK_SAMPLE_SIZE,
};

pub const BAD: f64 = 0.1;
pub const TERRIBLE: f64 = 0.01;

// Dimension scores
pub const D_POS: f64 = 1.0;
pub const D_MINOR: f64 = 0.01;
pub const D_Y_TEMPORAL: f64 = 0.8;
pub const D_FACET_TEXT: f64 = 1.0;
pub const D_FACET_GOOD: f64 = 0.7;
pub const D_FACET_OK: f64 = 0.55;
pub const D_FACET_BAD: f64 = 0.4;
pub const D_COLOR_GOOD: f64 = 0.7;
pub const D_COLOR_OK: f64 = 0.65;
pub const D_COLOR_BAD: f64 = 0.4;
pub const D_SHAPE: f64 = 0.6;
pub const D_DETAIL: f64 = 0.5;

// Measure scores
pub const M_POS: f64 = 1.0;
pub const M_SIZE: f64 = 0.6;
pub const M_COLOR: f64 = 0.5;
pub const M_TEXT: f64 = 0.4;

pub const UNUSED_POSITION: f64 = 0.5;

pub const FEATURE_UNUSED_POSITION: &str = "unusedPosition";
pub const FEATURE_MARK_TYPE: &str = "markType";

/// Prior preference for each mark type
pub fn mark_score(mark: Mark) -> f64 {
    match mark {
        Mark::Line => 0.99,
        Mark::Area => 0.98,
        Mark::Bar => 0.97,
        Mark::Tick => 0.96,
        Mark::Point => 0.95,
        Mark::Circle | Mark::Square => 0.94,
        Mark::Text => 0.8,
    }
}

/// An encoding with its score and per-feature breakdown
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScoredEncoding {
    pub encoding: Encoding,
    pub score: f64,
    pub features: BTreeMap<String, f64>,
}

impl AsRef<Encoding> for ScoredEncoding {
    fn as_ref(&self) -> &Encoding {
        &self.encoding
    }
}

/// Descending by score, lower index first on ties
pub fn compare_ranked(a: (usize, f64), b: (usize, f64)) -> Ordering {
    OrderedFloat(b.1)
        .cmp(&OrderedFloat(a.1))
        .then(a.0.cmp(&b.0))
}

/// Indices of `encodings` from best to worst
pub fn rank_order(encodings: &[ScoredEncoding]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..encodings.len()).collect();
    order.sort_by(|&a, &b| compare_ranked((a, encodings[a].score), (b, encodings[b].score)));
    order
}

/// Heuristic scorer for encodings
#[derive(Clone, Copy, Default)]
pub struct EncodingScorer<'a> {
    stats: Option<&'a dyn StatsProvider>,
}

impl<'a> EncodingScorer<'a> {
    pub fn new() -> Self {
        Self { stats: None }
    }

    /// Use `stats` for cardinality-sensitive channels (facets, color, shape)
    pub fn with_stats(stats: &'a dyn StatsProvider) -> Self {
        Self { stats: Some(stats) }
    }

    fn cardinality(&self, field: &EncodedField) -> u64 {
        encoded_cardinality(field, self.stats, DEFAULT_FALLBACK_SAMPLE_SIZE)
    }

    fn dimension_score(&self, channel: Channel, field: &EncodedField, mark: Mark) -> f64 {
        let field_type = field.field_type();
        let categorical = field_type.is_categorical();

        match channel {
            Channel::X => {
                if categorical {
                    D_POS - D_MINOR
                } else {
                    D_POS
                }
            }
            Channel::Y => {
                // time reads badly on y
                if field_type == FieldType::Temporal && !field.is_binned() {
                    D_Y_TEMPORAL
                } else {
                    D_POS - D_MINOR
                }
            }
            Channel::Row | Channel::Col => {
                if mark == Mark::Text {
                    return D_FACET_TEXT;
                }
                let ok_limit = if channel == Channel::Row { 6 } else { 5 };
                match self.cardinality(field) {
                    c if c <= 3 => D_FACET_GOOD,
                    c if c <= ok_limit => D_FACET_OK,
                    _ => D_FACET_BAD,
                }
            }
            Channel::Color => match self.cardinality(field) {
                c if c > 20 => TERRIBLE,
                c if c <= 7 => {
                    if field_type == FieldType::Temporal {
                        D_COLOR_OK
                    } else {
                        D_COLOR_GOOD
                    }
                }
                _ => D_COLOR_BAD,
            },
            Channel::Shape => {
                if self.cardinality(field) <= 6 {
                    D_SHAPE
                } else {
                    TERRIBLE
                }
            }
            Channel::Detail => D_DETAIL,
            Channel::Size | Channel::Text => BAD,
        }
    }

    fn measure_score(&self, channel: Channel, mark: Mark) -> f64 {
        match channel {
            Channel::X | Channel::Y => M_POS,
            Channel::Size => match mark {
                Mark::Bar | Mark::Line | Mark::Text => BAD,
                _ => M_SIZE,
            },
            Channel::Color => M_COLOR,
            Channel::Text => M_TEXT,
            Channel::Row | Channel::Col | Channel::Shape | Channel::Detail => BAD,
        }
    }

    /// Feature breakdown of one encoding
    pub fn features(&self, encoding: &Encoding) -> BTreeMap<String, f64> {
        let mut features = BTreeMap::new();

        for (channel, field) in encoding.iter() {
            let value = if field.is_dimension() {
                self.dimension_score(channel, field, encoding.mark)
            } else {
                self.measure_score(channel, encoding.mark)
            };
            features.insert(channel.as_str().to_string(), value);
        }

        let missing_position = encoding.iter().filter(|(c, _)| c.is_position()).count() < 2;
        if encoding.len() > 1
            && encoding.mark != Mark::Text
            && missing_position
            && !encoding.has(Channel::Text)
        {
            features.insert(FEATURE_UNUSED_POSITION.to_string(), UNUSED_POSITION);
        }

        features.insert(FEATURE_MARK_TYPE.to_string(), mark_score(encoding.mark));
        features
    }

    /// Score one encoding
    pub fn score(&self, encoding: Encoding) -> ScoredEncoding {
        let features = self.features(&encoding);
        let score = features.values().product();
        ScoredEncoding {
            encoding,
            score,
            features,
        }
    }

    /// Score encodings, preserving candidate order
    pub fn score_all(&self, encodings: Vec<Encoding>) -> Vec<ScoredEncoding> {
        encodings.into_iter().map(|e| self.score(e)).collect()
    }
}

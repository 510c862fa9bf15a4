//! Recommendation pipeline
//!
//! Runs projection generation, encoding generation, scoring, distance
//! computation and clustering as one synchronous call per selection.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use vizrec_core::{
    fields_from_raw, Encoding, FieldDescriptor, FieldStats, RawFieldDescriptor, Result,
    StatsProvider,
};
use vizrec_projection::{generate, Projection, ProjectionOptions};
use vizrec_rank::{
    build_distance_table, cluster_with_table, ClusterSet, DistanceTable, EncodingScorer,
    ScoredEncoding,
};

/// Merge threshold used when none is configured
pub const DEFAULT_CLUSTER_THRESHOLD: f64 = 2.5;

/// Produces candidate encodings for a projection
pub trait EncodingGenerator {
    fn generate(&self, projection: &Projection) -> Vec<Encoding>;
}

impl<F> EncodingGenerator for F
where
    F: Fn(&Projection) -> Vec<Encoding>,
{
    fn generate(&self, projection: &Projection) -> Vec<Encoding> {
        self(projection)
    }
}

/// Encodings supplied up front, keyed by projection key
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct PrecomputedEncodings {
    by_key: AHashMap<String, Vec<Encoding>>,
}

impl PrecomputedEncodings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, encodings: Vec<Encoding>) -> Self {
        self.insert(key, encodings);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, encodings: Vec<Encoding>) {
        self.by_key.insert(key.into(), encodings);
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

impl EncodingGenerator for PrecomputedEncodings {
    fn generate(&self, projection: &Projection) -> Vec<Encoding> {
        self.by_key.get(projection.key()).cloned().unwrap_or_default()
    }
}

/// Pipeline configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RecommendConfig {
    pub projection: ProjectionOptions,
    pub cluster_threshold: f64,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            projection: ProjectionOptions::default(),
            cluster_threshold: DEFAULT_CLUSTER_THRESHOLD,
        }
    }
}

/// Ranked, clustered encodings for one projection
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub projection: Projection,
    pub encodings: Vec<ScoredEncoding>,
    pub distances: DistanceTable,
    pub clusters: ClusterSet,
}

impl Recommendation {
    /// Best member of the best cluster
    pub fn top(&self) -> Option<&ScoredEncoding> {
        self.clusters
            .clusters()
            .first()
            .map(|c| &self.encodings[c.top()])
    }
}

/// Runs the full pipeline for a field selection
#[derive(Clone, Copy, Default)]
pub struct Recommender<'a> {
    config: RecommendConfig,
    stats: Option<&'a dyn StatsProvider>,
}

impl<'a> Recommender<'a> {
    pub fn new(config: RecommendConfig) -> Self {
        Self { config, stats: None }
    }

    pub fn with_stats(mut self, stats: &'a dyn StatsProvider) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn config(&self) -> &RecommendConfig {
        &self.config
    }

    pub fn projections(&self, fields: &[FieldDescriptor]) -> Result<Vec<Projection>> {
        generate(fields, self.stats, &self.config.projection)
    }

    /// Score, compare and cluster the candidates of one projection
    pub fn recommend_projection<G>(
        &self,
        projection: Projection,
        generator: &G,
    ) -> Result<Recommendation>
    where
        G: EncodingGenerator + ?Sized,
    {
        let scorer = match self.stats {
            Some(stats) => EncodingScorer::with_stats(stats),
            None => EncodingScorer::new(),
        };

        let encodings = scorer.score_all(generator.generate(&projection));
        let distances = build_distance_table(&encodings);
        let clusters = cluster_with_table(&encodings, &distances, self.config.cluster_threshold)?;

        debug!(
            projection = projection.key(),
            encodings = encodings.len(),
            clusters = clusters.len(),
            "Ranked projection"
        );

        Ok(Recommendation {
            projection,
            encodings,
            distances,
            clusters,
        })
    }

    /// Recommendations for every projection of `fields`, in projection order
    pub fn recommend<G>(
        &self,
        fields: &[FieldDescriptor],
        generator: &G,
    ) -> Result<Vec<Recommendation>>
    where
        G: EncodingGenerator + ?Sized,
    {
        self.projections(fields)?
            .into_iter()
            .map(|projection| self.recommend_projection(projection, generator))
            .collect()
    }
}

/// Self-contained pipeline input as a host would send it
///
/// `options` and `clusterThreshold` are parsed leniently: invalid values
/// fall back to their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest {
    pub fields: Vec<RawFieldDescriptor>,
    #[serde(default)]
    pub options: Value,
    #[serde(default)]
    pub stats: Option<FieldStats>,
    #[serde(default)]
    pub cluster_threshold: Value,
    #[serde(default)]
    pub encodings: PrecomputedEncodings,
}

impl RecommendRequest {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn fields(&self) -> Result<Vec<FieldDescriptor>> {
        fields_from_raw(self.fields.clone())
    }

    pub fn config(&self) -> RecommendConfig {
        let cluster_threshold = match &self.cluster_threshold {
            Value::Null => DEFAULT_CLUSTER_THRESHOLD,
            v => match v.as_f64() {
                Some(t) if t.is_finite() && t >= 0.0 => t,
                _ => {
                    warn!(value = %v, "Invalid clusterThreshold, using default");
                    DEFAULT_CLUSTER_THRESHOLD
                }
            },
        };

        RecommendConfig {
            projection: ProjectionOptions::from_value(&self.options),
            cluster_threshold,
        }
    }

    pub fn recommender(&self) -> Recommender<'_> {
        let recommender = Recommender::new(self.config());
        match &self.stats {
            Some(stats) => recommender.with_stats(stats),
            None => recommender,
        }
    }

    pub fn projections(&self) -> Result<Vec<Projection>> {
        self.recommender().projections(&self.fields()?)
    }

    pub fn run(&self) -> Result<Vec<Recommendation>> {
        self.recommender().recommend(&self.fields()?, &self.encodings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vizrec_core::{Aggregate, Channel, EncodedField, Error, FieldType, Mark};

    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::nominal("Origin").selected(true),
            FieldDescriptor::quantitative("Horsepower").selected(true),
        ]
    }

    fn bar(x: EncodedField, y: EncodedField) -> Encoding {
        Encoding::new(Mark::Bar).with(Channel::X, x).with(Channel::Y, y)
    }

    fn candidates() -> Vec<Encoding> {
        let origin = EncodedField::plain("Origin", FieldType::Nominal);
        let mean = EncodedField::aggregated("Horsepower", FieldType::Quantitative, Aggregate::Mean);
        let raw = EncodedField::plain("Horsepower", FieldType::Quantitative);
        vec![
            bar(origin.clone(), mean.clone()),
            bar(mean, origin.clone()),
            Encoding::new(Mark::Point).with(Channel::X, raw).with(Channel::Y, origin),
        ]
    }

    #[test]
    fn test_closure_generator() {
        let generator = |_: &Projection| candidates();
        let recs = Recommender::default().recommend(&fields(), &generator).unwrap();

        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].projection.key(), "Origin,Horsepower");
        assert_eq!(recs[0].encodings.len(), 3);
        assert_eq!(recs[0].distances.len(), 3);
        // Transposed bars merge, the raw point chart stands alone
        assert_eq!(recs[0].clusters.len(), 2);
        assert_eq!(recs[0].top().unwrap().encoding.mark, Mark::Bar);
    }

    #[test]
    fn test_precomputed_unknown_key_yields_empty() {
        let generator = PrecomputedEncodings::new().with("Other", candidates());
        let recs = Recommender::default().recommend(&fields(), &generator).unwrap();

        assert_eq!(recs.len(), 1);
        assert!(recs[0].encodings.is_empty());
        assert!(recs[0].clusters.is_empty());
        assert!(recs[0].top().is_none());
    }

    #[test]
    fn test_invalid_threshold_is_error() {
        let config = RecommendConfig {
            cluster_threshold: -1.0,
            ..RecommendConfig::default()
        };
        let generator = |_: &Projection| candidates();
        let err = Recommender::new(config).recommend(&fields(), &generator).unwrap_err();
        assert_eq!(err, Error::InvalidThreshold(-1.0));
    }

    #[test]
    fn test_request_lenient_config() {
        let request: RecommendRequest = serde_json::from_value(json!({
            "fields": [{"field": "A", "type": "nominal", "selected": true}],
            "options": {"omitDotPlot": "nope"},
            "clusterThreshold": "high"
        }))
        .unwrap();

        let config = request.config();
        assert!(config.projection.omit_dot_plot);
        assert_eq!(config.cluster_threshold, DEFAULT_CLUSTER_THRESHOLD);
    }

    #[test]
    fn test_request_run() {
        let request = RecommendRequest::from_json_str(
            &json!({
                "fields": [
                    {"field": "Origin", "type": "nominal", "selected": true},
                    {"field": "Horsepower", "type": "quantitative"}
                ],
                "options": {"omitDotPlot": false},
                "stats": {"Origin": {"distinct": 3}},
                "clusterThreshold": 1.0,
                "encodings": {
                    "Origin": [
                        {"mark": "bar", "channels": {
                            "x": {"kind": "plain", "name": "Origin", "type": "nominal"},
                            "y": {"kind": "aggregated", "type": "quantitative", "aggregate": "count"}
                        }}
                    ]
                }
            })
            .to_string(),
        )
        .unwrap();

        let recs = request.run().unwrap();
        let keys: Vec<&str> = recs.iter().map(|r| r.projection.key()).collect();
        assert_eq!(keys, vec!["Origin", "Origin,Horsepower"]);
        assert_eq!(recs[0].encodings.len(), 1);
        assert!(recs[1].encodings.is_empty());
        assert_eq!(request.config().cluster_threshold, 1.0);
    }

    #[test]
    fn test_request_malformed_field() {
        let request =
            RecommendRequest::from_json_str(r#"{"fields": [{"type": "nominal"}]}"#).unwrap();
        assert!(matches!(request.run(), Err(Error::MalformedField { index: 0, .. })));
    }
}

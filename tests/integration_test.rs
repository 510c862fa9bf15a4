// Integration tests for vizrec
use vizrec::prelude::*;
use vizrec::DEFAULT_CLUSTER_THRESHOLD;
use vizrec::stages::{build_distance_table, cluster, generate_projections};
use std::collections::BTreeSet;

fn cars_schema() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::nominal("Origin").selected(true),
        FieldDescriptor::quantitative("Horsepower").selected(true),
        FieldDescriptor::ordinal("Cylinders"),
        FieldDescriptor::temporal("Year"),
        FieldDescriptor::quantitative("Weight"),
        FieldDescriptor::nominal("Name").selected(false),
        FieldDescriptor::count(),
    ]
}

fn cars_stats() -> FieldStats {
    FieldStats::new()
        .with_distinct("Origin", 3)
        .with_distinct("Cylinders", 5)
        .with_distinct("Year", 12)
        .with_distinct("Name", 300)
}

fn as_encoded(field: &FieldDescriptor, aggregate: bool) -> EncodedField {
    if field.is_count() {
        return EncodedField::count();
    }
    if field.field_type == FieldType::Quantitative && aggregate {
        EncodedField::aggregated(&field.field, FieldType::Quantitative, Aggregate::Mean)
    } else {
        EncodedField::plain(&field.field, field.field_type)
    }
}

/// Every assignment of the projection's fields to distinct channels, for a few marks
fn enumerate_candidates(projection: &Projection) -> Vec<Encoding> {
    let channels = [Channel::X, Channel::Y, Channel::Color, Channel::Row];
    let fields = projection.fields();
    let mut out = Vec::new();

    fn assign(
        fields: &[FieldDescriptor],
        channels: &[Channel],
        used: &mut Vec<Channel>,
        out: &mut Vec<Vec<Channel>>,
    ) {
        if used.len() == fields.len() {
            out.push(used.clone());
            return;
        }
        for &c in channels {
            if !used.contains(&c) {
                used.push(c);
                assign(fields, channels, used, out);
                used.pop();
            }
        }
    }

    let mut assignments = Vec::new();
    assign(fields, &channels, &mut Vec::new(), &mut assignments);

    for mark in [Mark::Point, Mark::Tick, Mark::Bar] {
        let aggregate = mark == Mark::Bar;
        for assignment in &assignments {
            let mut encoding = Encoding::new(mark);
            for (field, channel) in fields.iter().zip(assignment) {
                encoding = encoding.with(*channel, as_encoded(field, aggregate));
            }
            out.push(encoding);
        }
    }
    out
}

#[test]
fn test_projections_keep_selection_prefix() {
    let fields = cars_schema();
    let projections = generate_projections(&fields, None, &ProjectionOptions::default()).unwrap();

    // Selection alone plus Weight, Year, Cylinders; Name is deselected and count never added
    let keys: Vec<&str> = projections.iter().map(|p| p.key()).collect();
    assert_eq!(
        keys,
        vec![
            "Origin,Horsepower",
            "Origin,Horsepower,Weight",
            "Origin,Horsepower,Year",
            "Origin,Horsepower,Cylinders",
        ]
    );

    for projection in &projections {
        assert_eq!(projection.fields()[0].field, "Origin");
        assert_eq!(projection.fields()[1].field, "Horsepower");
        assert!(!projection.is_empty());
        let names: Vec<&str> = projection.iter().map(|f| f.key_name()).collect();
        assert_eq!(names.join(","), projection.key());
    }
}

#[test]
fn test_full_pipeline_invariants() {
    let fields = cars_schema();
    let stats = cars_stats();
    let recommender = Recommender::default().with_stats(&stats);

    let recommendations = recommender.recommend(&fields, &enumerate_candidates).unwrap();
    assert_eq!(recommendations.len(), 4);

    for rec in &recommendations {
        let n = rec.encodings.len();
        assert!(n > 0);

        // Symmetric, non-negative, zero diagonal
        assert_eq!(rec.distances.len(), n);
        for i in 0..n {
            assert_eq!(rec.distances.get(i, i), 0.0);
            for j in 0..n {
                assert_eq!(rec.distances.get(i, j), rec.distances.get(j, i));
                assert!(rec.distances.get(i, j) >= 0.0);
            }
        }

        // Clusters partition the encodings
        let mut seen = BTreeSet::new();
        for cluster in &rec.clusters {
            for &i in cluster.members() {
                assert!(seen.insert(i), "index {} appears twice", i);
            }
        }
        assert_eq!(seen, (0..n).collect::<BTreeSet<_>>());

        // Members best-first, clusters ordered by their best member
        for cluster in &rec.clusters {
            for w in cluster.members().windows(2) {
                let (a, b) = (&rec.encodings[w[0]], &rec.encodings[w[1]]);
                assert!(a.score > b.score || (a.score == b.score && w[0] < w[1]));
            }
        }
        for w in rec.clusters.clusters().windows(2) {
            let (a, b) = (rec.encodings[w[0].top()].score, rec.encodings[w[1].top()].score);
            assert!(a >= b);
        }

        // The overall best encoding is a cluster representative
        let best = rec
            .encodings
            .iter()
            .map(|e| e.score)
            .fold(f64::MIN, f64::max);
        assert_eq!(rec.top().unwrap().score, best);
    }
}

#[test]
fn test_pipeline_is_deterministic() {
    let fields = cars_schema();
    let stats = cars_stats();
    let recommender = Recommender::default().with_stats(&stats);

    let first = recommender.recommend(&fields, &enumerate_candidates).unwrap();
    let second = recommender.recommend(&fields, &enumerate_candidates).unwrap();

    let first_json = serde_json::to_string(&first).unwrap();
    let second_json = serde_json::to_string(&second).unwrap();
    assert_eq!(first_json, second_json);
}

#[test]
fn test_mark_variants_cluster_together() {
    let projection = Projection::new(
        vec![
            FieldDescriptor::quantitative("Horsepower"),
            FieldDescriptor::quantitative("Weight"),
        ],
        2,
    );
    let hp = EncodedField::plain("Horsepower", FieldType::Quantitative);
    let weight = EncodedField::plain("Weight", FieldType::Quantitative);
    let candidates = vec![
        Encoding::new(Mark::Point).with(Channel::X, hp.clone()).with(Channel::Y, weight.clone()),
        Encoding::new(Mark::Circle).with(Channel::X, hp.clone()).with(Channel::Y, weight.clone()),
        Encoding::new(Mark::Point).with(Channel::Y, hp).with(Channel::X, weight),
        Encoding::new(Mark::Bar)
            .with(Channel::X, EncodedField::binned("Horsepower", FieldType::Quantitative, 10))
            .with(Channel::Y, EncodedField::count()),
    ];

    let scored = EncodingScorer::new().score_all(candidates);
    let clusters = cluster(&scored, DEFAULT_CLUSTER_THRESHOLD).unwrap();

    // Scatterplot variants merge, the histogram stays apart and ranks first
    assert_eq!(clusters.len(), 2);
    assert_eq!(clusters.clusters()[0].members(), &[3]);
    assert_eq!(clusters.clusters()[1].members(), &[0, 2, 1]);
    assert_eq!(projection.key(), "Horsepower,Weight");
}

#[test]
fn test_distance_table_over_scored_and_raw_encodings_agree() {
    let projection = Projection::new(
        vec![
            FieldDescriptor::nominal("Origin"),
            FieldDescriptor::quantitative("Horsepower"),
        ],
        2,
    );
    let raw = enumerate_candidates(&projection);
    let scored = EncodingScorer::new().score_all(raw.clone());

    assert_eq!(build_distance_table(&raw), build_distance_table(&scored));
}

#[test]
fn test_request_round_trip_through_json() {
    let json = r#"{
        "fields": [
            {"field": "Origin", "type": "nominal", "selected": true},
            {"field": "Horsepower", "type": "quantitative", "selected": true}
        ],
        "encodings": {
            "Origin,Horsepower": [
                {"mark": "bar", "channels": {
                    "x": {"kind": "plain", "name": "Origin", "type": "nominal"},
                    "y": {"kind": "aggregated", "name": "Horsepower", "type": "quantitative", "aggregate": "mean"}
                }},
                {"mark": "bar", "channels": {
                    "y": {"kind": "plain", "name": "Origin", "type": "nominal"},
                    "x": {"kind": "aggregated", "name": "Horsepower", "type": "quantitative", "aggregate": "mean"}
                }}
            ]
        }
    }"#;

    let request = RecommendRequest::from_json_str(json).unwrap();
    let recommendations = request.run().unwrap();

    assert_eq!(recommendations.len(), 1);
    let value = serde_json::to_value(&recommendations).unwrap();
    assert_eq!(value[0]["projection"]["key"], "Origin,Horsepower");
    assert_eq!(value[0]["clusters"], serde_json::json!([[0, 1]]));
    assert_eq!(value[0]["distances"][0][1], serde_json::json!(0.4));
}

#[test]
fn test_malformed_descriptor_fails_fast() {
    let fields = vec![
        FieldDescriptor::nominal("Origin").selected(true),
        FieldDescriptor::quantitative(""),
    ];
    let err = Recommender::default()
        .recommend(&fields, &enumerate_candidates)
        .unwrap_err();
    assert!(matches!(err, Error::MalformedField { index: 1, .. }));
}

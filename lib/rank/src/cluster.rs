//! Threshold clustering of near-duplicate encodings
//!
//! Agglomerative single-linkage clustering: every encoding starts in its own
//! cluster and the two closest clusters are merged until no pair lies within
//! the threshold. Members are ordered best-first and clusters are ordered by
//! their best member, so the first member of each cluster is the one to show.

use crate::distance::{build_distance_table, DistanceTable};
use crate::score::{compare_ranked, ScoredEncoding};
use serde::Serialize;
use tracing::debug;
use vizrec_core::{Error, Result};

/// Encoding indices judged near-duplicates, best first
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Cluster {
    members: Vec<usize>,
}

impl Cluster {
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    /// Best member
    pub fn top(&self) -> usize {
        self.members[0]
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, usize> {
        self.members.iter()
    }
}

/// Clusters ordered by their best member
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ClusterSet {
    clusters: Vec<Cluster>,
}

impl ClusterSet {
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cluster> {
        self.clusters.iter()
    }

    /// Top member of every cluster, in cluster order
    pub fn representatives(&self) -> Vec<usize> {
        self.clusters.iter().map(Cluster::top).collect()
    }
}

impl<'a> IntoIterator for &'a ClusterSet {
    type Item = &'a Cluster;
    type IntoIter = std::slice::Iter<'a, Cluster>;

    fn into_iter(self) -> Self::IntoIter {
        self.clusters.iter()
    }
}

/// Working state: live clusters by id and their pairwise linkage distances
struct Arena {
    n: usize,
    members: Vec<Option<Vec<usize>>>,
    linkage: Vec<f64>,
}

impl Arena {
    fn new(table: &DistanceTable) -> Self {
        let n = table.len();
        let mut linkage = Vec::with_capacity(n * n);
        for i in 0..n {
            linkage.extend_from_slice(table.row(i));
        }
        Self {
            n,
            members: (0..n).map(|i| Some(vec![i])).collect(),
            linkage,
        }
    }

    fn is_live(&self, id: usize) -> bool {
        self.members[id].is_some()
    }

    /// Closest live pair; ties go to the lowest ids
    fn closest_pair(&self) -> Option<(usize, usize, f64)> {
        let mut best: Option<(usize, usize, f64)> = None;
        for a in (0..self.n).filter(|&a| self.is_live(a)) {
            for b in (a + 1..self.n).filter(|&b| self.is_live(b)) {
                let d = self.linkage[a * self.n + b];
                if best.map_or(true, |(_, _, bd)| d < bd) {
                    best = Some((a, b, d));
                }
            }
        }
        best
    }

    /// Fold cluster `b` into `a`
    fn merge(&mut self, a: usize, b: usize) {
        let moved = self.members[b].take().unwrap_or_default();
        if let Some(target) = self.members[a].as_mut() {
            target.extend(moved);
        }

        let n = self.n;
        for k in 0..n {
            if k == a || !self.is_live(k) {
                continue;
            }
            let d = self.linkage[a * n + k].min(self.linkage[b * n + k]);
            self.linkage[a * n + k] = d;
            self.linkage[k * n + a] = d;
        }
    }

    fn into_clusters(self) -> Vec<Vec<usize>> {
        self.members.into_iter().flatten().collect()
    }
}

/// Cluster `encodings`, building their distance table first
pub fn cluster(encodings: &[ScoredEncoding], threshold: f64) -> Result<ClusterSet> {
    let table = build_distance_table(encodings);
    cluster_with_table(encodings, &table, threshold)
}

/// Cluster `encodings` using a precomputed distance table
///
/// Clusters whose closest members are at most `threshold` apart are merged.
/// Every table entry must be finite and non-negative.
pub fn cluster_with_table(
    encodings: &[ScoredEncoding],
    table: &DistanceTable,
    threshold: f64,
) -> Result<ClusterSet> {
    if threshold.is_nan() || threshold < 0.0 {
        return Err(Error::InvalidThreshold(threshold));
    }
    if table.len() != encodings.len() {
        return Err(Error::DistanceTableMismatch {
            expected: encodings.len(),
            actual: table.len(),
        });
    }
    if let Some(index) = encodings.iter().position(|e| !e.score.is_finite()) {
        return Err(Error::NonFiniteScore { index });
    }
    for i in 0..table.len() {
        if let Some(j) = table.row(i).iter().position(|d| !d.is_finite() || *d < 0.0) {
            return Err(Error::InvalidDistance { i, j });
        }
    }

    let mut arena = Arena::new(table);
    let mut merges = 0usize;
    while let Some((a, b, d)) = arena.closest_pair() {
        if d > threshold {
            break;
        }
        arena.merge(a, b);
        merges += 1;
    }

    let score = |i: usize| encodings[i].score;
    let mut clusters: Vec<Cluster> = arena
        .into_clusters()
        .into_iter()
        .map(|mut members| {
            members.sort_by(|&x, &y| compare_ranked((x, score(x)), (y, score(y))));
            Cluster { members }
        })
        .collect();
    clusters.sort_by(|c1, c2| {
        compare_ranked((c1.top(), score(c1.top())), (c2.top(), score(c2.top())))
    });

    debug!(
        encodings = encodings.len(),
        clusters = clusters.len(),
        merges,
        threshold,
        "Clustered encodings"
    );

    Ok(ClusterSet { clusters })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use vizrec_core::{Encoding, Mark};

    fn scored(scores: &[f64]) -> Vec<ScoredEncoding> {
        scores
            .iter()
            .map(|&score| ScoredEncoding {
                encoding: Encoding::new(Mark::Point),
                score,
                features: BTreeMap::new(),
            })
            .collect()
    }

    fn table(n: usize, pairs: &[(usize, usize, f64)], default: f64) -> DistanceTable {
        let mut table = DistanceTable::zeros(n);
        for i in 0..n {
            for j in i + 1..n {
                table.set(i, j, default);
            }
        }
        for &(i, j, d) in pairs {
            table.set(i, j, d);
        }
        table
    }

    fn members(set: &ClusterSet) -> Vec<Vec<usize>> {
        set.iter().map(|c| c.members().to_vec()).collect()
    }

    #[test]
    fn test_empty() {
        let set = cluster_with_table(&[], &DistanceTable::zeros(0), 2.5).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_single() {
        let encodings = scored(&[0.4]);
        let set = cluster(&encodings, 2.5).unwrap();
        assert_eq!(members(&set), vec![vec![0]]);
    }

    #[test]
    fn test_all_apart_gives_singletons() {
        let encodings = scored(&[0.2, 0.9, 0.5, 0.7, 0.1]);
        let t = table(5, &[], 10.0);

        let set = cluster_with_table(&encodings, &t, 2.5).unwrap();
        assert_eq!(members(&set), vec![vec![1], vec![3], vec![2], vec![0], vec![4]]);
    }

    #[test]
    fn test_two_pairs_and_a_singleton() {
        let encodings = scored(&[0.3, 0.8, 0.6, 0.5, 0.9]);
        let t = table(5, &[(0, 1, 1.0), (2, 3, 2.5)], 50.0);

        let set = cluster_with_table(&encodings, &t, 2.5).unwrap();
        assert_eq!(members(&set), vec![vec![4], vec![1, 0], vec![2, 3]]);
        assert_eq!(set.representatives(), vec![4, 1, 2]);
    }

    #[test]
    fn test_all_close_gives_one_cluster() {
        let encodings = scored(&[0.3, 0.8, 0.6, 0.5]);
        let t = table(4, &[], 0.5);

        let set = cluster_with_table(&encodings, &t, 2.5).unwrap();
        assert_eq!(members(&set), vec![vec![1, 2, 3, 0]]);
    }

    #[test]
    fn test_single_linkage_chains() {
        // 0-1 and 1-2 are close, 0-2 is not
        let encodings = scored(&[0.5, 0.5, 0.5]);
        let t = table(3, &[(0, 1, 1.0), (1, 2, 1.0)], 10.0);

        let set = cluster_with_table(&encodings, &t, 2.5).unwrap();
        assert_eq!(members(&set), vec![vec![0, 1, 2]]);
    }

    #[test]
    fn test_ties_break_by_index() {
        let encodings = scored(&[0.5, 0.5, 0.5, 0.5]);
        let t = table(4, &[(1, 3, 0.0)], 10.0);

        let set = cluster_with_table(&encodings, &t, 2.5).unwrap();
        assert_eq!(members(&set), vec![vec![0], vec![1, 3], vec![2]]);
    }

    #[test]
    fn test_zero_threshold_merges_exact_duplicates() {
        let encodings = scored(&[0.1, 0.2]);
        let t = table(2, &[], 0.0);

        let set = cluster_with_table(&encodings, &t, 0.0).unwrap();
        assert_eq!(members(&set), vec![vec![1, 0]]);
    }

    #[test]
    fn test_partition() {
        let encodings = scored(&[0.1, 0.9, 0.4, 0.4, 0.6, 0.2, 0.8]);
        let t = table(7, &[(0, 5, 1.0), (2, 6, 2.0), (6, 3, 0.3)], 7.0);

        let set = cluster_with_table(&encodings, &t, 2.5).unwrap();
        let mut all: Vec<usize> = set.iter().flat_map(|c| c.iter().copied()).collect();
        all.sort();
        assert_eq!(all, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn test_invalid_threshold() {
        let encodings = scored(&[0.1]);
        assert!(matches!(
            cluster(&encodings, f64::NAN),
            Err(Error::InvalidThreshold(_))
        ));
        assert!(matches!(
            cluster(&encodings, -1.0),
            Err(Error::InvalidThreshold(_))
        ));
    }

    #[test]
    fn test_table_mismatch() {
        let encodings = scored(&[0.1, 0.2]);
        let err = cluster_with_table(&encodings, &DistanceTable::zeros(3), 1.0).unwrap_err();
        assert_eq!(err, Error::DistanceTableMismatch { expected: 2, actual: 3 });
    }

    #[test]
    fn test_non_finite_score() {
        let encodings = scored(&[0.1, f64::NAN]);
        let err = cluster(&encodings, 1.0).unwrap_err();
        assert_eq!(err, Error::NonFiniteScore { index: 1 });
    }

    #[test]
    fn test_nan_distance_is_rejected() {
        let encodings = scored(&[0.3, 0.8]);
        let mut t = DistanceTable::zeros(2);
        t.set(0, 1, f64::NAN);

        let err = cluster_with_table(&encodings, &t, 1.0).unwrap_err();
        assert_eq!(err, Error::InvalidDistance { i: 0, j: 1 });
    }

    #[test]
    fn test_negative_distance_is_rejected() {
        let encodings = scored(&[0.3, 0.8, 0.5]);
        let t = table(3, &[(1, 2, -0.5)], 10.0);

        let err = cluster_with_table(&encodings, &t, 1.0).unwrap_err();
        assert_eq!(err, Error::InvalidDistance { i: 1, j: 2 });
    }

    #[test]
    fn test_serializes_as_nested_arrays() {
        let encodings = scored(&[0.3, 0.8]);
        let set = cluster_with_table(&encodings, &table(2, &[], 1.0), 2.5).unwrap();
        assert_eq!(serde_json::to_string(&set).unwrap(), "[[1,0]]");
    }
}

//! Pairwise encoding distances
//!
//! Two encodings are compared column by column, where a column is a data
//! field together with its aggregate and bin transform. A column bound to
//! the same channel in both encodings costs nothing, a column moved to a
//! related channel costs little, and a column present in only one of them
//! costs [`DIST_MISSING`]. Changing the mark adds [`DIST_MARK`].

use rayon::prelude::*;
use serde::{Serialize, Serializer};
use smallvec::SmallVec;
use std::collections::{BTreeMap, BTreeSet};
use vizrec_core::{Channel, ColumnKey, Encoding, Mark};

/// Cost of a column that only one encoding uses
pub const DIST_MISSING: f64 = 100.0;

/// Cost of a mark type change
pub const DIST_MARK: f64 = 0.5;

/// Cost of moving a column between unrelated channels
pub const DIST_CHANNEL: f64 = 1.0;

/// Cost of swapping between closely related channels
pub const DIST_CHANNEL_SWAP: f64 = 0.2;

/// Tables at least this large are computed in parallel
pub const PARALLEL_THRESHOLD: usize = 64;

/// Cost of binding the same column to `a` instead of `b`
pub fn channel_distance(a: Channel, b: Channel) -> f64 {
    if a == b {
        return 0.0;
    }
    match (a.min(b), a.max(b)) {
        (Channel::X, Channel::Y)
        | (Channel::Row, Channel::Col)
        | (Channel::Color, Channel::Shape)
        | (Channel::Size, Channel::Color) => DIST_CHANNEL_SWAP,
        _ => DIST_CHANNEL,
    }
}

/// Column view of an encoding
struct Profile {
    mark: Mark,
    columns: BTreeMap<ColumnKey, SmallVec<[Channel; 2]>>,
}

impl Profile {
    fn of(encoding: &Encoding) -> Self {
        let mut columns: BTreeMap<ColumnKey, SmallVec<[Channel; 2]>> = BTreeMap::new();
        for (channel, field) in encoding.iter() {
            columns.entry(field.column_key()).or_default().push(channel);
        }
        Self {
            mark: encoding.mark,
            columns,
        }
    }

    fn distance(&self, other: &Profile) -> f64 {
        let keys: BTreeSet<&ColumnKey> = self.columns.keys().chain(other.columns.keys()).collect();

        let mut dist = 0.0;
        for key in keys {
            let a = self.columns.get(key).map(|c| c.as_slice()).unwrap_or(&[]);
            let b = other.columns.get(key).map(|c| c.as_slice()).unwrap_or(&[]);

            // identical channels pair up for free, the rest pair in channel order
            let rest_a: SmallVec<[Channel; 2]> =
                a.iter().copied().filter(|c| !b.contains(c)).collect();
            let rest_b: SmallVec<[Channel; 2]> =
                b.iter().copied().filter(|c| !a.contains(c)).collect();
            for (ca, cb) in rest_a.iter().zip(&rest_b) {
                dist += channel_distance(*ca, *cb);
            }
            let unpaired = rest_a.len().max(rest_b.len()) - rest_a.len().min(rest_b.len());
            dist += DIST_MISSING * unpaired as f64;
        }

        if self.mark != other.mark {
            dist += DIST_MARK;
        }
        dist
    }
}

/// Distance between two encodings
pub fn encoding_distance(a: &Encoding, b: &Encoding) -> f64 {
    Profile::of(a).distance(&Profile::of(b))
}

/// Symmetric matrix of encoding distances with a zero diagonal
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceTable {
    n: usize,
    data: Vec<f64>,
}

impl DistanceTable {
    /// Table over `n` encodings with every distance zero
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            data: vec![0.0; n * n],
        }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    /// Set `d(i, j)` and `d(j, i)`. The diagonal stays zero.
    pub fn set(&mut self, i: usize, j: usize, dist: f64) {
        if i == j {
            return;
        }
        self.data[i * self.n + j] = dist;
        self.data[j * self.n + i] = dist;
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n..(i + 1) * self.n]
    }
}

impl Serialize for DistanceTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq((0..self.n).map(|i| self.row(i)))
    }
}

/// Pairwise distances between `encodings`
///
/// Each unordered pair is computed once and mirrored.
pub fn build_distance_table<E: AsRef<Encoding>>(encodings: &[E]) -> DistanceTable {
    let n = encodings.len();
    let profiles: Vec<Profile> = encodings.iter().map(|e| Profile::of(e.as_ref())).collect();
    let pairs: Vec<(usize, usize)> = (0..n)
        .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
        .collect();

    let distances: Vec<f64> = if n >= PARALLEL_THRESHOLD {
        pairs
            .par_iter()
            .map(|&(i, j)| profiles[i].distance(&profiles[j]))
            .collect()
    } else {
        pairs
            .iter()
            .map(|&(i, j)| profiles[i].distance(&profiles[j]))
            .collect()
    };

    let mut table = DistanceTable::zeros(n);
    for (&(i, j), dist) in pairs.iter().zip(distances) {
        table.set(i, j, dist);
    }
    table
}

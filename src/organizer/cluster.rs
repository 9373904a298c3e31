use anyhow::Result;
use tracing::{debug, warn};

/// One step of the dendrogram: the clusters held in slots `a` and `b` were
/// merged at `height`. Slots are named after one of their member points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Merge {
    pub a: usize,
    pub b: usize,
    pub height: f64,
}

/// Hierarchical agglomerative clustering with Ward linkage and a distance
/// cut-off instead of a fixed cluster count.
///
/// Vectors are L2-normalised first, so Euclidean distance tracks cosine
/// similarity. Lower thresholds give more, smaller groups.
pub struct AgglomerativeClusterer {
    distance_threshold: f64,
}

impl AgglomerativeClusterer {
    pub fn new(distance_threshold: f64) -> Self {
        Self { distance_threshold }
    }

    /// One label per input vector. Labels are numbered in order of first
    /// appearance. Never fails: on bad input every vector gets label 0.
    pub fn assign_labels(&self, vectors: &[Vec<f32>]) -> Vec<usize> {
        match vectors.len() {
            0 => Vec::new(),
            1 => vec![0],
            n => match self.try_assign_labels(vectors) {
                Ok(labels) => labels,
                Err(e) => {
                    warn!("Clustering failed, using a single group: {:#}", e);
                    vec![0; n]
                }
            },
        }
    }

    fn try_assign_labels(&self, vectors: &[Vec<f32>]) -> Result<Vec<usize>> {
        let points = normalize(vectors)?;
        let merges = ward_linkage(&points);

        let mut sets = DisjointSets::new(points.len());
        for merge in &merges {
            // Ward heights never decrease along the tree, so cutting each
            // merge on its own height gives the flat clustering at the threshold.
            if merge.height < self.distance_threshold {
                sets.union(merge.a, merge.b);
            }
        }

        let mut label_of_root = vec![usize::MAX; points.len()];
        let mut next = 0;
        let labels = (0..points.len())
            .map(|i| {
                let root = sets.find(i);
                if label_of_root[root] == usize::MAX {
                    label_of_root[root] = next;
                    next += 1;
                }
                label_of_root[root]
            })
            .collect();

        debug!(
            "Clustered {} vectors into {} groups (threshold {})",
            points.len(),
            next,
            self.distance_threshold
        );
        Ok(labels)
    }
}

/// Unit-length copies of `vectors` in f64. A zero vector stays zero.
fn normalize(vectors: &[Vec<f32>]) -> Result<Vec<Vec<f64>>> {
    let dim = vectors.first().map(Vec::len).unwrap_or(0);
    if dim == 0 {
        anyhow::bail!("Empty vectors cannot be clustered");
    }

    let mut points = Vec::with_capacity(vectors.len());
    for (i, v) in vectors.iter().enumerate() {
        if v.len() != dim {
            anyhow::bail!("Vector {} has dimension {}, expected {}", i, v.len(), dim);
        }
        if v.iter().any(|x| !x.is_finite()) {
            anyhow::bail!("Vector {} contains a non-finite value", i);
        }
        let norm = v.iter().map(|&x| (x as f64) * (x as f64)).sum::<f64>().sqrt();
        let norm = if norm == 0.0 { 1.0 } else { norm };
        points.push(v.iter().map(|&x| x as f64 / norm).collect());
    }
    Ok(points)
}

/// Condensed upper-triangle distance matrix
struct Condensed {
    n: usize,
    data: Vec<f64>,
}

impl Condensed {
    fn squared_euclidean(points: &[Vec<f64>]) -> Self {
        let n = points.len();
        let mut data = Vec::with_capacity(n * (n - 1) / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                let d2 = points[i]
                    .iter()
                    .zip(&points[j])
                    .map(|(x, y)| (x - y) * (x - y))
                    .sum();
                data.push(d2);
            }
        }
        Self { n, data }
    }

    fn index(&self, i: usize, j: usize) -> usize {
        let (i, j) = if i < j { (i, j) } else { (j, i) };
        self.n * i - i * (i + 1) / 2 + (j - i - 1)
    }

    fn get(&self, i: usize, j: usize) -> f64 {
        self.data[self.index(i, j)]
    }

    fn set(&mut self, i: usize, j: usize, value: f64) {
        let idx = self.index(i, j);
        self.data[idx] = value;
    }
}

/// Ward linkage by the nearest-neighbour chain algorithm, O(n²) time.
///
/// Works on squared distances with the Lance-Williams update; reported
/// heights are the square roots, matching the usual Ward dendrogram.
/// Merges come out in chain order, not sorted by height.
pub(crate) fn ward_linkage(points: &[Vec<f64>]) -> Vec<Merge> {
    let n = points.len();
    if n < 2 {
        return Vec::new();
    }

    let mut dist = Condensed::squared_euclidean(points);
    let mut size = vec![1usize; n];
    let mut active = vec![true; n];
    let mut chain: Vec<usize> = Vec::with_capacity(n);
    let mut merges = Vec::with_capacity(n - 1);

    while merges.len() < n - 1 {
        if chain.is_empty() {
            if let Some(first) = (0..n).find(|&i| active[i]) {
                chain.push(first);
            }
        }

        // Grow the chain until its last two slots are reciprocal nearest neighbours
        let (a, b) = loop {
            let current = chain[chain.len() - 1];
            let previous = if chain.len() >= 2 {
                Some(chain[chain.len() - 2])
            } else {
                None
            };

            // Ties go to the previous element so the chain always terminates
            let mut best = previous;
            let mut best_dist = previous.map_or(f64::INFINITY, |p| dist.get(current, p));
            for k in 0..n {
                if !active[k] || k == current || Some(k) == previous {
                    continue;
                }
                let d = dist.get(current, k);
                if d < best_dist {
                    best_dist = d;
                    best = Some(k);
                }
            }

            match best {
                Some(next) if Some(next) == previous => break (current, next),
                Some(next) => chain.push(next),
                None => break (current, current),
            }
        };
        if a == b {
            break;
        }
        chain.truncate(chain.len() - 2);

        let d_ab = dist.get(a, b);
        merges.push(Merge {
            a,
            b,
            height: d_ab.max(0.0).sqrt(),
        });

        // Slot b now holds the union; slot a retires
        let (na, nb) = (size[a] as f64, size[b] as f64);
        for k in 0..n {
            if !active[k] || k == a || k == b {
                continue;
            }
            let nk = size[k] as f64;
            let updated = ((nk + na) * dist.get(k, a) + (nk + nb) * dist.get(k, b) - nk * d_ab)
                / (na + nb + nk);
            dist.set(k, b, updated);
        }
        active[a] = false;
        size[b] += size[a];
    }

    merges
}

/// Union-find with path halving
struct DisjointSets {
    parent: Vec<usize>,
}

impl DisjointSets {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[ra] = rb;
        }
    }
}

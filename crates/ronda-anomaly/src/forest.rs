//! Seeded isolation forest over a feature matrix.
//!
//! Trees are stored as index-addressed node arenas and built iteratively
//! with an explicit work stack, so tree depth is bounded by configuration
//! rather than by the call stack. Construction is data-parallel across trees;
//! each tree derives its own PRNG stream from the base seed and its tree
//! index, which keeps the ensemble bit-identical at any thread count.

use ndarray::{ArrayView1, ArrayView2};
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use rayon::prelude::*;
use ronda_core::{Result, RondaError};
use serde::{Deserialize, Serialize};

/// Euler-Mascheroni constant, used by the harmonic-number approximation in
/// the average path length normalizer.
const EULER_MASCHERONI: f64 = 0.577_215_664_901_532_9;

/// Configuration for isolation forest construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees in the ensemble.
    pub n_trees: usize,
    /// Subsample size per tree (capped at the number of observations).
    pub sample_size: usize,
    /// Depth cap per tree; `None` uses ceil(log2(sample size)).
    pub max_depth: Option<usize>,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            sample_size: 256,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        size: usize,
    },
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Build one randomized partition tree over the rows named by `indices`.
    fn build(
        data: ArrayView2<'_, f64>,
        indices: Vec<usize>,
        max_depth: usize,
        rng: &mut Pcg64,
    ) -> Self {
        let mut nodes = vec![Node::Leaf { size: indices.len() }];
        let mut stack = vec![(0_usize, indices, 0_usize)];

        while let Some((slot, idx, depth)) = stack.pop() {
            if depth >= max_depth || idx.len() <= 1 {
                nodes[slot] = Node::Leaf { size: idx.len() };
                continue;
            }

            // Only features with an actual spread at this node can split it.
            let splittable: Vec<(usize, f64, f64)> = (0..data.ncols())
                .filter_map(|f| {
                    let (lo, hi) = feature_range(data, &idx, f);
                    (hi > lo).then_some((f, lo, hi))
                })
                .collect();

            if splittable.is_empty() {
                nodes[slot] = Node::Leaf { size: idx.len() };
                continue;
            }

            let (feature, lo, hi) = splittable[rng.gen_range(0..splittable.len())];
            let threshold = rng.gen_range(lo..hi);

            let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = idx
                .iter()
                .copied()
                .partition(|&i| data[[i, feature]] < threshold);

            if left_idx.is_empty() || right_idx.is_empty() {
                nodes[slot] = Node::Leaf { size: idx.len() };
                continue;
            }

            let left = nodes.len();
            nodes.push(Node::Leaf { size: 0 });
            let right = nodes.len();
            nodes.push(Node::Leaf { size: 0 });
            nodes[slot] = Node::Split {
                feature,
                threshold,
                left,
                right,
            };
            stack.push((left, left_idx, depth + 1));
            stack.push((right, right_idx, depth + 1));
        }

        Self { nodes }
    }

    /// Isolation path length of a point, with the standard leaf-size
    /// adjustment for partitions that were not fully isolated.
    fn path_length(&self, point: ArrayView1<'_, f64>) -> f64 {
        let mut node = 0_usize;
        let mut depth = 0.0;
        loop {
            match self.nodes[node] {
                Node::Leaf { size } => return depth + average_path_length(size),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if point[feature] < threshold { left } else { right };
                    depth += 1.0;
                }
            }
        }
    }
}

/// An ensemble of randomized partition trees for outlier scoring.
///
/// Scores follow the isolation-forest convention: s(x) = 2^(−E[h(x)]/c(ψ)),
/// bounded in (0, 1], where shorter average isolation paths (more anomalous
/// points) map to higher scores.
#[derive(Debug, Clone)]
pub struct IsolationForest {
    trees: Vec<Tree>,
    sample_size: usize,
}

impl IsolationForest {
    /// Fit an ensemble on the feature matrix (rows are observations).
    ///
    /// # Errors
    ///
    /// [`RondaError::InsufficientData`] below two rows,
    /// [`RondaError::InvalidInput`] for an empty ensemble configuration.
    pub fn fit(data: ArrayView2<'_, f64>, config: &ForestConfig, seed: u64) -> Result<Self> {
        let n = data.nrows();
        if n < 2 {
            return Err(RondaError::InsufficientData {
                required: 2,
                actual: n,
                context: "isolation forest",
            });
        }
        if config.n_trees == 0 {
            return Err(RondaError::InvalidInput(
                "isolation forest needs at least one tree".to_string(),
            ));
        }

        let sample_size = config.sample_size.clamp(2, n);
        let max_depth = config
            .max_depth
            .unwrap_or_else(|| (sample_size as f64).log2().ceil() as usize);

        let trees: Vec<Tree> = (0..config.n_trees)
            .into_par_iter()
            .map(|t| {
                let mut rng = Pcg64::seed_from_u64(seed.wrapping_add(t as u64));
                let indices = index::sample(&mut rng, n, sample_size).into_vec();
                Tree::build(data, indices, max_depth, &mut rng)
            })
            .collect();

        Ok(Self { trees, sample_size })
    }

    /// Anomaly score per row of the matrix, in (0, 1].
    ///
    /// Aggregation over trees is serial and in tree order, so scores are
    /// reproducible regardless of how the ensemble was built.
    #[must_use]
    pub fn scores(&self, data: ArrayView2<'_, f64>) -> Vec<f64> {
        let norm = average_path_length(self.sample_size).max(f64::EPSILON);
        (0..data.nrows())
            .map(|i| {
                let point = data.row(i);
                let total: f64 = self.trees.iter().map(|t| t.path_length(point)).sum();
                let mean_path = total / self.trees.len() as f64;
                2.0_f64.powf(-mean_path / norm)
            })
            .collect()
    }

    /// Number of trees in the ensemble.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Effective subsample size used per tree.
    #[must_use]
    pub const fn sample_size(&self) -> usize {
        self.sample_size
    }
}

fn feature_range(data: ArrayView2<'_, f64>, indices: &[usize], feature: usize) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &i in indices {
        let v = data[[i, feature]];
        lo = lo.min(v);
        hi = hi.max(v);
    }
    (lo, hi)
}

/// Average path length of an unsuccessful BST search over `n` points,
/// the normalizer c(n) of the isolation-forest score.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let nf = n as f64;
            2.0 * ((nf - 1.0).ln() + EULER_MASCHERONI) - 2.0 * (nf - 1.0) / nf
        }
    }
}

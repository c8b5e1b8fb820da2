use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::tree::RegressionTree;
use crate::config::ForestConfig;
use crate::error::ScreenError;

// ---------------------------------------------------------------------------
// Bagged forest of regression trees
// ---------------------------------------------------------------------------

/// Bootstrap-aggregated regression trees.  Prediction is the mean of the
/// individual tree predictions.
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<RegressionTree>,
    n_features: usize,
}

impl RandomForest {
    /// Fit `config.n_trees` trees, each on its own bootstrap sample.
    ///
    /// Each tree draws from a `ChaCha8Rng` seeded from a master stream
    /// rooted at `config.seed`, so a given seed always yields the same forest.
    pub fn fit(x: &[Vec<f64>], y: &[f64], config: &ForestConfig) -> Result<Self, ScreenError> {
        let n = y.len();
        if n == 0 || x.len() != n {
            return Err(ScreenError::EmptyTrainingSet);
        }
        let (lo, hi) = y
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        if hi - lo == 0.0 {
            return Err(ScreenError::ConstantTarget(lo));
        }

        let params = config.tree_params();
        let mut master = ChaCha8Rng::seed_from_u64(config.seed);
        let trees: Vec<RegressionTree> = (0..config.n_trees)
            .map(|t| {
                let mut rng = ChaCha8Rng::seed_from_u64(master.gen());
                let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                let tree = RegressionTree::fit(x, y, &bootstrap, &params, &mut rng);
                log::debug!(
                    "tree {t}: {} nodes, {} leaves, depth {}",
                    tree.n_nodes(),
                    tree.n_leaves(),
                    tree.depth()
                );
                tree
            })
            .collect();

        Ok(Self {
            trees,
            n_features: x[0].len(),
        })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn predict_one(&self, row: &[f64]) -> f64 {
        let total: f64 = self.trees.iter().map(|t| t.predict_one(row)).sum();
        total / self.trees.len() as f64
    }

    /// One prediction per input row, in input order.
    pub fn predict(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter().map(|row| self.predict_one(row)).collect()
    }

    /// Mean-decrease-in-impurity importance, averaged over trees that split
    /// at least once and renormalised to sum to 1.
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut acc = vec![0.0; self.n_features];
        let mut used = 0usize;
        for tree in self.trees.iter().filter(|t| t.n_nodes() > 1) {
            for (a, v) in acc.iter_mut().zip(tree.feature_importances()) {
                *a += v;
            }
            used += 1;
        }
        if used == 0 {
            return acc;
        }
        let total: f64 = acc.iter().sum();
        if total > 0.0 {
            acc.iter_mut().for_each(|a| *a /= total);
        }
        acc
    }
}

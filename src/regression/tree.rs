use rand::seq::SliceRandom;
use rand::Rng;

/// Nodes whose target variance is at or below this are not split further.
const IMPURITY_EPSILON: f64 = f64::EPSILON;
/// Consecutive feature values closer than this are treated as equal.
const FEATURE_THRESHOLD: f64 = 1e-7;

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

// ---------------------------------------------------------------------------
// Regression tree (CART, squared error)
// ---------------------------------------------------------------------------

/// Binary regression tree stored as a flat node arena; node 0 is the root.
/// A row goes left when `row[feature] <= threshold`.
#[derive(Debug, Clone)]
pub struct RegressionTree {
    nodes: Vec<Node>,
    /// Total weighted impurity decrease contributed by each feature.
    impurity_decrease: Vec<f64>,
}

/// Pending node: its slot in the arena and its sample range.
struct Pending {
    node: usize,
    start: usize,
    end: usize,
    depth: usize,
}

struct Candidate {
    feature: usize,
    /// Number of (sorted) samples sent left.
    pos: usize,
    threshold: f64,
    improvement: f64,
}

impl RegressionTree {
    /// Grow a tree on `x[i], y[i]` for every `i` in `indices` (duplicates
    /// allowed, as produced by bootstrap sampling).  `rng` only decides the
    /// order in which features are tried, which breaks ties between equally
    /// good splits.
    pub fn fit<R: Rng + ?Sized>(
        x: &[Vec<f64>],
        y: &[f64],
        indices: &[usize],
        params: &TreeParams,
        rng: &mut R,
    ) -> Self {
        let n_features = x.first().map_or(0, Vec::len);
        let mut idx = indices.to_vec();
        let mut nodes = vec![Node::Leaf { value: 0.0 }];
        let mut impurity_decrease = vec![0.0; n_features];
        let mut features: Vec<usize> = (0..n_features).collect();

        let mut stack = vec![Pending {
            node: 0,
            start: 0,
            end: idx.len(),
            depth: 0,
        }];

        while let Some(p) = stack.pop() {
            let samples = &mut idx[p.start..p.end];
            let n = samples.len();
            let (sum, sum_sq) = samples
                .iter()
                .fold((0.0, 0.0), |(s, sq), &i| (s + y[i], sq + y[i] * y[i]));
            let mean = if n > 0 { sum / n as f64 } else { 0.0 };
            let impurity = if n > 0 { sum_sq / n as f64 - mean * mean } else { 0.0 };

            let is_leaf = n < params.min_samples_split
                || n < 2 * params.min_samples_leaf
                || params.max_depth.is_some_and(|d| p.depth >= d)
                || impurity <= IMPURITY_EPSILON;

            let candidate = if is_leaf {
                None
            } else {
                features.shuffle(rng);
                best_split(x, y, samples, &features, params.min_samples_leaf, sum)
            };

            let Some(split) = candidate else {
                nodes[p.node] = Node::Leaf { value: mean };
                continue;
            };

            samples.sort_by(|&a, &b| x[a][split.feature].total_cmp(&x[b][split.feature]));
            impurity_decrease[split.feature] += split.improvement;

            let left = nodes.len();
            let right = left + 1;
            nodes.push(Node::Leaf { value: 0.0 });
            nodes.push(Node::Leaf { value: 0.0 });
            nodes[p.node] = Node::Split {
                feature: split.feature,
                threshold: split.threshold,
                left,
                right,
            };

            let mid = p.start + split.pos;
            stack.push(Pending {
                node: right,
                start: mid,
                end: p.end,
                depth: p.depth + 1,
            });
            stack.push(Pending {
                node: left,
                start: p.start,
                end: mid,
                depth: p.depth + 1,
            });
        }

        Self {
            nodes,
            impurity_decrease,
        }
    }

    pub fn predict_one(&self, row: &[f64]) -> f64 {
        let mut at = 0;
        loop {
            match self.nodes[at] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => at = if row[feature] <= threshold { left } else { right },
            }
        }
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    /// Length of the longest root-to-leaf path (a lone root has depth 0).
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((at, d)) = stack.pop() {
            deepest = deepest.max(d);
            if let Node::Split { left, right, .. } = self.nodes[at] {
                stack.push((left, d + 1));
                stack.push((right, d + 1));
            }
        }
        deepest
    }

    /// Impurity decrease per feature normalised to sum to 1, or all zeros
    /// when the tree never split.
    pub fn feature_importances(&self) -> Vec<f64> {
        let total: f64 = self.impurity_decrease.iter().sum();
        if total > 0.0 {
            self.impurity_decrease.iter().map(|v| v / total).collect()
        } else {
            vec![0.0; self.impurity_decrease.len()]
        }
    }
}

/// Best squared-error split over `features`, tried in the given order.
///
/// For a split into left/right the weighted impurity decrease is
/// `S_l²/n_l + S_r²/n_r − S²/n` where `S` is the target sum.
fn best_split(
    x: &[Vec<f64>],
    y: &[f64],
    samples: &mut [usize],
    features: &[usize],
    min_samples_leaf: usize,
    sum: f64,
) -> Option<Candidate> {
    let n = samples.len();
    let parent_term = sum * sum / n as f64;
    let mut best: Option<Candidate> = None;

    for &f in features {
        samples.sort_by(|&a, &b| x[a][f].total_cmp(&x[b][f]));
        let lo = x[samples[0]][f];
        let hi = x[samples[n - 1]][f];
        if hi <= lo + FEATURE_THRESHOLD {
            continue;
        }

        let mut left_sum = 0.0;
        for pos in 1..n {
            left_sum += y[samples[pos - 1]];
            let prev = x[samples[pos - 1]][f];
            let next = x[samples[pos]][f];
            if next <= prev + FEATURE_THRESHOLD {
                continue;
            }
            let (n_left, n_right) = (pos, n - pos);
            if n_left < min_samples_leaf || n_right < min_samples_leaf {
                continue;
            }

            let right_sum = sum - left_sum;
            let improvement = left_sum * left_sum / n_left as f64
                + right_sum * right_sum / n_right as f64
                - parent_term;

            if best.as_ref().map_or(true, |b| improvement > b.improvement) {
                let mut threshold = 0.5 * (prev + next);
                if threshold >= next || !threshold.is_finite() {
                    threshold = prev;
                }
                best = Some(Candidate {
                    feature: f,
                    pos,
                    threshold,
                    improvement,
                });
            }
        }
    }
    best
}

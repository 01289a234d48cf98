use rand::Rng;

#[derive(Debug, Clone)]
enum Node {
    Leaf(f64),
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn predict(&self, row: &[f64]) -> f64 {
        match self {
            Node::Leaf(value) => *value,
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if row[*feature] <= *threshold {
                    left.predict(row)
                } else {
                    right.predict(row)
                }
            }
        }
    }
}

/// CART regression tree using squared-error splits
#[derive(Debug, Clone)]
pub struct RegressionTree {
    root: Node,
}

impl RegressionTree {
    /// Fit on the rows selected by `indices` (repeats allowed)
    pub fn fit(rows: &[Vec<f64>], targets: &[f64], indices: &[usize], max_depth: usize) -> Self {
        Self {
            root: build_node(rows, targets, indices.to_vec(), max_depth),
        }
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        self.root.predict(row)
    }
}

fn mean(targets: &[f64], indices: &[usize]) -> f64 {
    indices.iter().map(|&i| targets[i]).sum::<f64>() / indices.len() as f64
}

fn build_node(rows: &[Vec<f64>], targets: &[f64], indices: Vec<usize>, depth: usize) -> Node {
    let value = mean(targets, &indices);
    if depth == 0 || indices.len() < 2 {
        return Node::Leaf(value);
    }

    match best_split(rows, targets, &indices) {
        Some((feature, threshold)) => {
            let (left, right): (Vec<usize>, Vec<usize>) = indices
                .into_iter()
                .partition(|&i| rows[i][feature] <= threshold);
            Node::Split {
                feature,
                threshold,
                left: Box::new(build_node(rows, targets, left, depth - 1)),
                right: Box::new(build_node(rows, targets, right, depth - 1)),
            }
        }
        None => Node::Leaf(value),
    }
}

/// Split with the lowest summed squared error, if any split reduces it
fn best_split(rows: &[Vec<f64>], targets: &[f64], indices: &[usize]) -> Option<(usize, f64)> {
    let n = indices.len() as f64;
    let total: f64 = indices.iter().map(|&i| targets[i]).sum();
    let total_sq: f64 = indices.iter().map(|&i| targets[i].powi(2)).sum();
    let parent_error = total_sq - total * total / n;

    let mut best: Option<(usize, f64, f64)> = None;
    let n_features = rows[indices[0]].len();

    for feature in 0..n_features {
        let mut sorted = indices.to_vec();
        sorted.sort_by(|&a, &b| {
            rows[a][feature]
                .partial_cmp(&rows[b][feature])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for split in 1..sorted.len() {
            let moved = targets[sorted[split - 1]];
            left_sum += moved;
            left_sq += moved * moved;

            let lo = rows[sorted[split - 1]][feature];
            let hi = rows[sorted[split]][feature];
            if lo == hi {
                continue;
            }

            let left_n = split as f64;
            let right_n = n - left_n;
            let right_sum = total - left_sum;
            let right_sq = total_sq - left_sq;
            let error = (left_sq - left_sum * left_sum / left_n)
                + (right_sq - right_sum * right_sum / right_n);

            if best.map_or(true, |(_, _, e)| error < e) {
                best = Some((feature, (lo + hi) / 2.0, error));
            }
        }
    }

    best.filter(|&(_, _, error)| error < parent_error - 1e-12)
        .map(|(feature, threshold, _)| (feature, threshold))
}

/// Bootstrap-aggregated ensemble of regression trees
#[derive(Debug, Clone)]
pub struct RegressionForest {
    trees: Vec<RegressionTree>,
}

impl RegressionForest {
    /// Fit `n_trees` trees, each on a bootstrap sample of the rows
    ///
    /// Returns `None` for an empty training set or mismatched lengths.
    pub fn fit<R: Rng>(
        rows: &[Vec<f64>],
        targets: &[f64],
        n_trees: usize,
        max_depth: usize,
        rng: &mut R,
    ) -> Option<Self> {
        if rows.is_empty() || rows.len() != targets.len() || n_trees == 0 {
            return None;
        }

        let trees = (0..n_trees)
            .map(|_| {
                let sample: Vec<usize> =
                    (0..rows.len()).map(|_| rng.gen_range(0..rows.len())).collect();
                RegressionTree::fit(rows, targets, &sample, max_depth)
            })
            .collect();

        Some(Self { trees })
    }

    /// Mean prediction over the trees
    pub fn predict(&self, row: &[f64]) -> f64 {
        self.trees.iter().map(|t| t.predict(row)).sum::<f64>() / self.trees.len() as f64
    }
}

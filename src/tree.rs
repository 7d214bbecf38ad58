use crate::data::Matrix;
use crate::node::{Node, NodeInfo, SplittableNode};
use crate::splitter::Splitter;
use hashbrown::HashMap;
use log::debug;
use rayon::prelude::*;
use rayon::ThreadPool;
use serde::{Deserialize, Serialize};
use std::cmp::max;
use std::fmt::{self, Display};

/// Limits on how far a tree may grow.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
pub struct GrowthLimits {
    pub max_depth: usize,
    pub min_samples_split: usize,
}

/// Binary classification tree. Leaves store the weighted share of the
/// positive class among the training rows that reached them.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Tree {
    pub nodes: Vec<Node>,
    pub depth: usize,
    pub n_leaves: usize,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    pub fn new() -> Self {
        Tree {
            nodes: Vec::new(),
            depth: 0,
            n_leaves: 0,
        }
    }

    pub fn is_fitted(&self) -> bool {
        !self.nodes.is_empty()
    }

    /// Grow the tree depth first from the rows in `index`.
    ///
    /// * `data` - Feature matrix.
    /// * `index` - Rows of `data` to fit on.
    /// * `y` - Labels, 0 or 1, addressed by row.
    /// * `sample_weight` - Weight of every row.
    #[allow(clippy::too_many_arguments)]
    pub fn fit<T: Splitter + Sync>(
        &mut self,
        data: &Matrix<f64>,
        mut index: Vec<usize>,
        col_index: &[usize],
        y: &[f64],
        sample_weight: &[f64],
        splitter: &T,
        limits: &GrowthLimits,
        pool: &ThreadPool,
    ) {
        self.nodes.clear();
        self.depth = 0;
        self.n_leaves = 1;

        let root = SplittableNode::new(0, 0, 0, index.len(), NodeInfo::from_rows(&index, y, sample_weight));
        self.nodes.push(root.as_node());
        let mut n_nodes = 1;

        let mut growable = vec![root];
        while let Some(node) = growable.pop() {
            if node.depth >= limits.max_depth
                || node.info.counts < limits.min_samples_split
                || node.info.gini() <= f64::EPSILON
            {
                continue;
            }

            let Some((split_info, children)) =
                splitter.split_node(&n_nodes, &node, &mut index, col_index, data, y, sample_weight, pool)
            else {
                continue;
            };

            self.nodes[node.num].make_parent_node(&split_info, children[0].num, children[1].num);
            n_nodes += children.len();
            self.n_leaves += children.len() - 1;

            // Node numbers are positions in `nodes`.
            for child in children.iter() {
                self.depth = max(self.depth, child.depth);
                self.nodes.push(child.as_node());
            }
            // Left subtree is grown first.
            growable.extend(children.into_iter().rev());
        }
        debug!("Grew tree with {} nodes, depth {}", self.nodes.len(), self.depth);
    }

    /// Probability of the positive class for a single row.
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let mut node_idx = 0;
        loop {
            let node = &self.nodes[node_idx];
            if node.is_leaf {
                return node.probability;
            }
            node_idx = node.get_child_idx(row[node.split_feature]);
        }
    }

    /// Probability of the positive class for every row of `data`.
    pub fn predict(&self, data: &Matrix<f64>, parallel: bool) -> Vec<f64> {
        if parallel {
            data.index
                .par_iter()
                .map(|i| self.predict_row(&data.get_row(*i)))
                .collect()
        } else {
            data.index.iter().map(|i| self.predict_row(&data.get_row(*i))).collect()
        }
    }

    /// Sum of the weighted impurity decrease of every split, per feature.
    pub fn calculate_importance_gain(&self, stats: &mut HashMap<usize, f64>) {
        for node in self.nodes.iter().filter(|n| !n.is_leaf) {
            *stats.entry(node.split_feature).or_insert(0.0) += node.split_gain;
        }
    }
}

impl Display for Tree {
    // This trait requires `fmt` with this exact signature.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.nodes.is_empty() {
            return write!(f, "");
        }
        let mut print_buffer: Vec<usize> = vec![0];
        let mut r = String::new();
        while let Some(idx) = print_buffer.pop() {
            let node = &self.nodes[idx];
            r += format!("{}{}\n", "      ".repeat(node.depth).as_str(), node).as_str();
            if !node.is_leaf {
                print_buffer.push(node.right_child);
                print_buffer.push(node.left_child);
            }
        }
        write!(f, "{}", r)
    }
}

// Unit-testing
#[cfg(test)]
mod tests {
    use super::*;
    use crate::splitter::GiniSplitter;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn pool() -> ThreadPool {
        rayon::ThreadPoolBuilder::new().num_threads(2).build().unwrap()
    }

    fn synthetic(rows: usize) -> (Vec<f64>, Vec<f64>) {
        let mut rng = StdRng::seed_from_u64(0);
        let x0: Vec<f64> = (0..rows).map(|_| rng.gen_range(0.0..100.0)).collect();
        let x1: Vec<f64> = (0..rows).map(|_| rng.gen_range(0.0..1.0)).collect();
        let y: Vec<f64> = x0.iter().map(|v| if *v > 60.0 { 1.0 } else { 0.0 }).collect();
        let mut data = x0;
        data.extend(x1);
        (data, y)
    }

    #[test]
    fn test_tree_fit() {
        let (data_vec, y) = synthetic(500);
        let data = Matrix::new(&data_vec, 500, 2);
        let w = vec![1.0; 500];
        let limits = GrowthLimits {
            max_depth: 8,
            min_samples_split: 2,
        };
        let mut tree = Tree::new();
        tree.fit(&data, data.index.to_owned(), &[0, 1], &y, &w, &GiniSplitter::new(5), &limits, &pool());

        println!("{}", tree);
        assert!(tree.is_fitted());
        // The labels are a pure threshold on feature 0.
        assert_eq!(tree.nodes.len(), 3);
        assert_eq!(tree.nodes[0].split_feature, 0);
        assert_eq!(tree.n_leaves, 2);
        assert_eq!(tree.depth, 1);
        assert_eq!(tree.predict_row(&[80.0, 0.5]), 1.0);
        assert_eq!(tree.predict_row(&[10.0, 0.5]), 0.0);

        let preds = tree.predict(&data, true);
        assert_eq!(preds, tree.predict(&data, false));
        for (p, label) in preds.iter().zip(y.iter()) {
            assert_eq!(p, label);
        }
    }

    #[test]
    fn test_tree_respects_limits() {
        let mut rng = StdRng::seed_from_u64(1);
        let rows = 400;
        let data_vec: Vec<f64> = (0..rows * 2).map(|_| rng.gen_range(0.0..1.0)).collect();
        let y: Vec<f64> = (0..rows).map(|_| if rng.gen_bool(0.5) { 1.0 } else { 0.0 }).collect();
        let data = Matrix::new(&data_vec, rows, 2);
        let w = vec![1.0; rows];
        let limits = GrowthLimits {
            max_depth: 3,
            min_samples_split: 2,
        };
        let mut tree = Tree::new();
        tree.fit(&data, data.index.to_owned(), &[0, 1], &y, &w, &GiniSplitter::new(20), &limits, &pool());

        assert!(tree.depth <= 3);
        assert!(tree.n_leaves <= 8);
        for (i, node) in tree.nodes.iter().enumerate() {
            assert_eq!(node.num, i);
            if node.is_leaf {
                assert!(node.n_samples >= 20);
                assert!((0.0..=1.0).contains(&node.probability));
            }
        }
        assert_eq!(tree.nodes.iter().filter(|n| n.is_leaf).count(), tree.n_leaves);
    }

    #[test]
    fn test_tree_importance() {
        let (data_vec, y) = synthetic(200);
        let data = Matrix::new(&data_vec, 200, 2);
        let w = vec![1.0; 200];
        let limits = GrowthLimits {
            max_depth: 8,
            min_samples_split: 2,
        };
        let mut tree = Tree::new();
        tree.fit(&data, data.index.to_owned(), &[0, 1], &y, &w, &GiniSplitter::new(1), &limits, &pool());
        let mut gain = HashMap::new();
        tree.calculate_importance_gain(&mut gain);
        assert!(gain[&0] > 0.0);
        assert!(!gain.contains_key(&1));
        assert_eq!(tree.nodes.iter().filter(|n| !n.is_leaf).count(), 1);
    }
}

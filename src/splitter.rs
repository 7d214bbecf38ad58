//! Splitter
//!
//! Exhaustive threshold search over every feature, scoring candidate
//! splits by the decrease of weighted Gini impurity.
use crate::constants::MIN_GAIN;
use crate::data::Matrix;
use crate::node::{NodeInfo, SplittableNode};
use rayon::prelude::*;
use rayon::ThreadPool;

#[derive(Debug, Clone, PartialEq)]
pub struct SplitInfo {
    /// Weighted impurity decrease, `w * gini - w_l * gini_l - w_r * gini_r`.
    pub split_gain: f64,
    pub split_feature: usize,
    /// Rows with a value `<= split_value` go left.
    pub split_value: f64,
    pub left_node: NodeInfo,
    pub right_node: NodeInfo,
}

pub trait Splitter {
    /// Find the best split of a single feature, if any.
    fn best_feature_split(
        &self,
        node: &SplittableNode,
        feature: usize,
        data: &Matrix<f64>,
        index: &[usize],
        y: &[f64],
        sample_weight: &[f64],
    ) -> Option<SplitInfo>;

    /// Find the best possible split, considering all features.
    ///
    /// Features are scored in parallel. Ties go to the lowest feature
    /// number so the result does not depend on scheduling.
    #[allow(clippy::too_many_arguments)]
    fn best_split(
        &self,
        node: &SplittableNode,
        col_index: &[usize],
        data: &Matrix<f64>,
        index: &[usize],
        y: &[f64],
        sample_weight: &[f64],
        pool: &ThreadPool,
    ) -> Option<SplitInfo>
    where
        Self: Sync,
    {
        let candidates: Vec<Option<SplitInfo>> = pool.install(|| {
            col_index
                .par_iter()
                .map(|&feature| self.best_feature_split(node, feature, data, index, y, sample_weight))
                .collect()
        });
        let mut best: Option<SplitInfo> = None;
        for split in candidates.into_iter().flatten() {
            match &best {
                Some(b) if split.split_gain <= b.split_gain => {}
                _ => best = Some(split),
            }
        }
        best
    }

    /// Split the node if a valid split exists, reordering its rows in
    /// `index` so the left child rows come first. Returns the two children,
    /// or nothing when the node stays a leaf.
    #[allow(clippy::too_many_arguments)]
    fn split_node(
        &self,
        n_nodes: &usize,
        node: &SplittableNode,
        index: &mut [usize],
        col_index: &[usize],
        data: &Matrix<f64>,
        y: &[f64],
        sample_weight: &[f64],
        pool: &ThreadPool,
    ) -> Option<(SplitInfo, Vec<SplittableNode>)>
    where
        Self: Sync,
    {
        let node_index = &index[node.start_idx..node.stop_idx];
        let split_info = self.best_split(node, col_index, data, node_index, y, sample_weight, pool)?;

        let col = data.get_col(split_info.split_feature);
        let (left, right): (Vec<usize>, Vec<usize>) = index[node.start_idx..node.stop_idx]
            .iter()
            .partition(|&&i| col[i] <= split_info.split_value);
        let split_idx = node.start_idx + left.len();
        index[node.start_idx..split_idx].copy_from_slice(&left);
        index[split_idx..node.stop_idx].copy_from_slice(&right);

        let children = vec![
            SplittableNode::new(
                *n_nodes,
                node.depth + 1,
                node.start_idx,
                split_idx,
                split_info.left_node,
            ),
            SplittableNode::new(
                *n_nodes + 1,
                node.depth + 1,
                split_idx,
                node.stop_idx,
                split_info.right_node,
            ),
        ];
        Some((split_info, children))
    }
}

/// CART splitter scoring thresholds by weighted Gini impurity.
pub struct GiniSplitter {
    pub min_samples_leaf: usize,
}

impl GiniSplitter {
    pub fn new(min_samples_leaf: usize) -> Self {
        GiniSplitter {
            min_samples_leaf: min_samples_leaf.max(1),
        }
    }
}

impl Splitter for GiniSplitter {
    fn best_feature_split(
        &self,
        node: &SplittableNode,
        feature: usize,
        data: &Matrix<f64>,
        index: &[usize],
        y: &[f64],
        sample_weight: &[f64],
    ) -> Option<SplitInfo> {
        let n = index.len();
        if n / 2 < self.min_samples_leaf {
            return None;
        }
        let col = data.get_col(feature);
        let mut sorted = index.to_vec();
        sorted.sort_by(|&a, &b| col[a].total_cmp(&col[b]));

        let parent_impurity = node.info.weight() * node.info.gini();
        let mut left = NodeInfo::default();
        let mut best: Option<SplitInfo> = None;

        for k in 0..(n - 1) {
            let i = sorted[k];
            left.add(y[i], sample_weight[i]);
            let n_left = k + 1;
            if n_left < self.min_samples_leaf {
                continue;
            }
            if n - n_left < self.min_samples_leaf {
                break;
            }
            let v = col[i];
            let v_next = col[sorted[k + 1]];
            if v >= v_next {
                continue;
            }
            let right = node.info.sub(&left);
            let gain = parent_impurity - left.weight() * left.gini() - right.weight() * right.gini();
            if gain <= MIN_GAIN {
                continue;
            }
            if best.as_ref().map_or(true, |b| gain > b.split_gain) {
                let mut split_value = (v + v_next) / 2.0;
                if split_value >= v_next || !split_value.is_finite() {
                    split_value = v;
                }
                best = Some(SplitInfo {
                    split_gain: gain,
                    split_feature: feature,
                    split_value,
                    left_node: left,
                    right_node: right,
                });
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> ThreadPool {
        rayon::ThreadPoolBuilder::new().num_threads(2).build().unwrap()
    }

    #[test]
    fn test_best_split_separable() {
        // Feature 0 is noise, feature 1 separates the labels perfectly.
        let data_vec = vec![
            3.0, 1.0, 2.0, 3.0, 1.0, 2.0, //
            1.0, 2.0, 3.0, 10.0, 11.0, 12.0,
        ];
        let data = Matrix::new(&data_vec, 6, 2);
        let y = vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        let w = vec![1.0; 6];
        let mut index = data.index.to_owned();
        let info = NodeInfo::from_rows(&index, &y, &w);
        let node = SplittableNode::new(0, 0, 0, 6, info);
        let splitter = GiniSplitter::new(1);

        let (split, children) = splitter
            .split_node(&1, &node, &mut index, &[0, 1], &data, &y, &w, &pool())
            .unwrap();
        assert_eq!(split.split_feature, 1);
        assert_eq!(split.split_value, 6.5);
        assert_eq!(split.split_gain, 3.0);
        assert_eq!(children[0].num, 1);
        assert_eq!(children[1].num, 2);
        assert_eq!(children[0].info.probability(), 0.0);
        assert_eq!(children[1].info.probability(), 1.0);
        assert_eq!(&index[..3], &[0, 1, 2]);
        assert_eq!(&index[3..], &[3, 4, 5]);
    }

    #[test]
    fn test_min_samples_leaf_is_respected() {
        let data_vec = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let data = Matrix::new(&data_vec, 6, 1);
        let y = vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let w = vec![1.0; 6];
        let index = data.index.to_owned();
        let node = SplittableNode::new(0, 0, 0, 6, NodeInfo::from_rows(&index, &y, &w));

        let split = GiniSplitter::new(1).best_split(&node, &[0], &data, &index, &y, &w, &pool());
        assert_eq!(split.unwrap().split_value, 1.5);

        let split = GiniSplitter::new(2)
            .best_split(&node, &[0], &data, &index, &y, &w, &pool())
            .unwrap();
        assert_eq!(split.split_value, 2.5);
        assert!(split.left_node.counts >= 2 && split.right_node.counts >= 2);

        assert!(GiniSplitter::new(4)
            .best_split(&node, &[0], &data, &index, &y, &w, &pool())
            .is_none());

        let split = GiniSplitter::new(3)
            .best_split(&node, &[0], &data, &index, &y, &w, &pool())
            .unwrap();
        assert_eq!(split.split_value, 3.5);
    }

    #[test]
    fn test_huge_min_samples_leaf() {
        let data_vec = vec![1.0, 2.0, 3.0, 4.0];
        let data = Matrix::new(&data_vec, 4, 1);
        let y = vec![0.0, 0.0, 1.0, 1.0];
        let w = vec![1.0; 4];
        let index = data.index.to_owned();
        let node = SplittableNode::new(0, 0, 0, 4, NodeInfo::from_rows(&index, &y, &w));
        for min_samples_leaf in [usize::MAX, usize::MAX / 2 + 1] {
            assert!(GiniSplitter::new(min_samples_leaf)
                .best_feature_split(&node, 0, &data, &index, &y, &w)
                .is_none());
        }
    }

    #[test]
    fn test_no_split_on_constant_feature() {
        let data_vec = vec![5.0; 4];
        let data = Matrix::new(&data_vec, 4, 1);
        let y = vec![1.0, 0.0, 1.0, 0.0];
        let w = vec![1.0; 4];
        let index = data.index.to_owned();
        let node = SplittableNode::new(0, 0, 0, 4, NodeInfo::from_rows(&index, &y, &w));
        assert!(GiniSplitter::new(1)
            .best_split(&node, &[0], &data, &index, &y, &w, &pool())
            .is_none());
    }
}

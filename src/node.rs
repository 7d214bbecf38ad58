use crate::splitter::SplitInfo;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Weighted class statistics of the rows reaching a node.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq)]
pub struct NodeInfo {
    /// Summed weight of the non canceled rows.
    pub negative_weight: f64,
    /// Summed weight of the canceled rows.
    pub positive_weight: f64,
    /// Number of rows.
    pub counts: usize,
}

impl NodeInfo {
    pub fn from_rows(index: &[usize], y: &[f64], sample_weight: &[f64]) -> Self {
        let mut info = NodeInfo::default();
        for &i in index {
            info.add(y[i], sample_weight[i]);
        }
        info
    }

    pub fn add(&mut self, label: f64, weight: f64) {
        if label > 0.5 {
            self.positive_weight += weight;
        } else {
            self.negative_weight += weight;
        }
        self.counts += 1;
    }

    pub fn sub(&self, other: &NodeInfo) -> NodeInfo {
        NodeInfo {
            negative_weight: self.negative_weight - other.negative_weight,
            positive_weight: self.positive_weight - other.positive_weight,
            counts: self.counts - other.counts,
        }
    }

    pub fn weight(&self) -> f64 {
        self.negative_weight + self.positive_weight
    }

    /// Weighted share of canceled rows, 0 for an empty node.
    pub fn probability(&self) -> f64 {
        let w = self.weight();
        if w > 0.0 {
            self.positive_weight / w
        } else {
            0.0
        }
    }

    /// Weighted Gini impurity.
    pub fn gini(&self) -> f64 {
        let w = self.weight();
        if w <= 0.0 {
            return 0.0;
        }
        let p = self.positive_weight / w;
        let q = self.negative_weight / w;
        1.0 - p * p - q * q
    }
}

/// A node waiting to be split during tree growth. Its rows are
/// `index[start_idx..stop_idx]`.
#[derive(Debug)]
pub struct SplittableNode {
    pub num: usize,
    pub depth: usize,
    pub start_idx: usize,
    pub stop_idx: usize,
    pub info: NodeInfo,
}

impl SplittableNode {
    pub fn new(num: usize, depth: usize, start_idx: usize, stop_idx: usize, info: NodeInfo) -> Self {
        SplittableNode {
            num,
            depth,
            start_idx,
            stop_idx,
            info,
        }
    }

    pub fn as_node(&self) -> Node {
        Node {
            num: self.num,
            depth: self.depth,
            split_feature: 0,
            split_value: 0.0,
            split_gain: 0.0,
            left_child: 0,
            right_child: 0,
            is_leaf: true,
            n_samples: self.info.counts,
            weighted_samples: self.info.weight(),
            probability: self.info.probability(),
            impurity: self.info.gini(),
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Node {
    pub num: usize,
    pub depth: usize,
    pub split_feature: usize,
    pub split_value: f64,
    pub split_gain: f64,
    pub left_child: usize,
    pub right_child: usize,
    pub is_leaf: bool,
    pub n_samples: usize,
    pub weighted_samples: f64,
    pub probability: f64,
    pub impurity: f64,
}

impl Node {
    /// Update all the info that is needed if this node is a
    /// parent node.
    pub fn make_parent_node(&mut self, split_info: &SplitInfo, left_child: usize, right_child: usize) {
        self.is_leaf = false;
        self.split_feature = split_info.split_feature;
        self.split_value = split_info.split_value;
        self.split_gain = split_info.split_gain;
        self.left_child = left_child;
        self.right_child = right_child;
    }

    /// Get the path that should be traveled down, given a value.
    pub fn get_child_idx(&self, v: f64) -> usize {
        if v <= self.split_value {
            self.left_child
        } else {
            self.right_child
        }
    }
}

impl fmt::Display for Node {
    // This trait requires `fmt` with this exact signature.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_leaf {
            write!(
                f,
                "{}:leaf={:.4},samples={},cover={:.4}",
                self.num, self.probability, self.n_samples, self.weighted_samples
            )
        } else {
            write!(
                f,
                "{}:[{} <= {}] yes={},no={},gain={:.4},cover={:.4}",
                self.num,
                self.split_feature,
                self.split_value,
                self.left_child,
                self.right_child,
                self.split_gain,
                self.weighted_samples
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_info() {
        let y = vec![1.0, 0.0, 0.0, 1.0];
        let w = vec![2.0, 1.0, 1.0, 2.0];
        let info = NodeInfo::from_rows(&[0, 1, 2], &y, &w);
        assert_eq!(info.counts, 3);
        assert_eq!(info.probability(), 0.5);
        assert_eq!(info.gini(), 0.5);

        let left = NodeInfo::from_rows(&[0], &y, &w);
        let right = info.sub(&left);
        assert_eq!(right.positive_weight, 0.0);
        assert_eq!(right.gini(), 0.0);
        assert_eq!(NodeInfo::default().probability(), 0.0);
    }

    #[test]
    fn test_get_child_idx() {
        let mut node = SplittableNode::new(0, 0, 0, 4, NodeInfo::default()).as_node();
        let split = SplitInfo {
            split_gain: 1.0,
            split_feature: 0,
            split_value: 10.5,
            left_node: NodeInfo::default(),
            right_node: NodeInfo::default(),
        };
        node.make_parent_node(&split, 1, 2);
        assert!(!node.is_leaf);
        assert_eq!(node.get_child_idx(10.5), 1);
        assert_eq!(node.get_child_idx(11.0), 2);
    }
}

//! Model
//!
//! The fitted classifier together with the feature layout it was fitted
//! with, and the single-row inference contract built on it.
use crate::constants::{DECISION_THRESHOLD, FEATURE_NAMES, N_FEATURES};
use crate::data::Matrix;
use crate::errors::CancelGuardError;
use crate::features::FeatureVector;
use crate::metric::Evaluation;
use crate::tree::Tree;
use hashbrown::HashMap;
use serde::Serialize;
use std::fmt;

/// Outcome of a single prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    /// 1 when the booking is expected to be canceled.
    pub label: u8,
    /// Estimated probability of cancellation.
    pub probability: f64,
}

impl Prediction {
    pub fn from_probability(probability: f64) -> Self {
        Prediction {
            label: u8::from(probability > DECISION_THRESHOLD),
            probability,
        }
    }

    pub fn is_cancellation(&self) -> bool {
        self.label == 1
    }

    pub fn verdict(&self) -> &'static str {
        if self.is_cancellation() {
            "WILL CANCEL"
        } else {
            "WILL NOT CANCEL"
        }
    }

    pub fn percentage(&self) -> f64 {
        self.probability * 100.0
    }

    pub fn as_tuple(&self) -> (u8, f64) {
        (self.label, self.probability)
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} (probability {:.2}%)", self.verdict(), self.percentage())
    }
}

/// Immutable bundle of the fitted tree and its feature layout.
///
/// Only the trainer creates containers and nothing mutates them
/// afterwards, so a container can be shared by any number of
/// concurrent predictions.
#[derive(Debug, Clone, Serialize)]
pub struct ModelContainer {
    tree: Tree,
    feature_names: Vec<String>,
    evaluation: Evaluation,
}

impl ModelContainer {
    pub(crate) fn new(
        tree: Tree,
        feature_names: Vec<String>,
        evaluation: Evaluation,
    ) -> Result<Self, CancelGuardError> {
        let container = ModelContainer {
            tree,
            feature_names,
            evaluation,
        };
        container.validate()?;
        Ok(container)
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Scores on the rows held out during training.
    pub fn evaluation(&self) -> &Evaluation {
        &self.evaluation
    }

    /// Check the classifier is fitted, its nodes reference valid
    /// features and children, and the layout is the expected one.
    pub fn validate(&self) -> Result<(), CancelGuardError> {
        if !self.tree.is_fitted() {
            return Err(CancelGuardError::MalformedModel("the tree has no nodes".to_string()));
        }
        if self.feature_names.len() != FEATURE_NAMES.len() || self.feature_names.iter().zip(FEATURE_NAMES).any(|(a, b)| a != b)
        {
            return Err(CancelGuardError::FeatureLayoutMismatch {
                expected: FEATURE_NAMES.iter().map(|f| f.to_string()).collect(),
                got: self.feature_names.clone(),
            });
        }
        let n_nodes = self.tree.nodes.len();
        for (i, node) in self.tree.nodes.iter().enumerate() {
            if node.num != i {
                return Err(CancelGuardError::MalformedModel(format!("node {} is stored at {}", node.num, i)));
            }
            if !node.is_leaf
                && (node.split_feature >= self.feature_names.len()
                    || node.left_child >= n_nodes
                    || node.right_child >= n_nodes
                    || node.left_child <= i
                    || node.right_child <= i)
            {
                return Err(CancelGuardError::MalformedModel(format!("node {} has an invalid split", i)));
            }
        }
        Ok(())
    }

    /// Probability that the booking is canceled.
    pub fn predict_proba(&self, features: &FeatureVector) -> Result<f64, CancelGuardError> {
        if !self.tree.is_fitted() {
            return Err(CancelGuardError::MalformedModel("the tree has no nodes".to_string()));
        }
        Ok(self.tree.predict_row(features.values()))
    }

    /// Label and probability for a single booking.
    pub fn predict(&self, features: &FeatureVector) -> Result<Prediction, CancelGuardError> {
        self.predict_proba(features).map(Prediction::from_probability)
    }

    /// Predict many bookings in parallel.
    pub fn predict_batch(&self, features: &[FeatureVector]) -> Result<Vec<Prediction>, CancelGuardError> {
        if !self.tree.is_fitted() {
            return Err(CancelGuardError::MalformedModel("the tree has no nodes".to_string()));
        }
        let mut data = Vec::with_capacity(features.len() * N_FEATURES);
        for j in 0..N_FEATURES {
            data.extend(features.iter().map(|f| f.values()[j]));
        }
        let matrix = Matrix::new(&data, features.len(), N_FEATURES);
        Ok(self
            .tree
            .predict(&matrix, true)
            .into_iter()
            .map(Prediction::from_probability)
            .collect())
    }

    /// Share of the total impurity decrease contributed by each feature.
    pub fn feature_importance(&self) -> HashMap<String, f64> {
        let mut stats = HashMap::new();
        self.tree.calculate_importance_gain(&mut stats);
        let total: f64 = stats.values().sum();
        self.feature_names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let gain = stats.get(&i).copied().unwrap_or(0.0);
                let share = if total > 0.0 { gain / total } else { 0.0 };
                (name.clone(), share)
            })
            .collect()
    }

    /// Render the container as JSON, for inspection only.
    pub fn json_dump(&self) -> Result<String, CancelGuardError> {
        serde_json::to_string(self).map_err(|e| CancelGuardError::MalformedModel(e.to_string()))
    }
}

/// Run the classifier on one feature vector.
pub fn predict(container: &ModelContainer, features: &FeatureVector) -> Result<Prediction, CancelGuardError> {
    container.predict(features)
}

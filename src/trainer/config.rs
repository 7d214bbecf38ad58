//! Trainer Configuration
//!
//! Hyperparameters of the cancellation classifier and the holdout split.
use crate::constants::{MAX_DEPTH, MIN_SAMPLES_LEAF, MIN_SAMPLES_SPLIT, SEED, TEST_SIZE};
use crate::errors::CancelGuardError;
use crate::utils::{validate_float_parameter, validate_positive_usize_parameter};
use serde::{Deserialize, Serialize};

/// How rows are weighted when the tree measures impurity.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Debug, Default)]
pub enum ClassWeight {
    /// Every row weighs `n_rows / (n_classes * n_rows_of_its_class)`.
    #[default]
    Balanced,
    /// Every row weighs 1.
    None,
}

impl ClassWeight {
    /// Weight of every row given its label.
    pub fn sample_weight(&self, y: &[f64]) -> Vec<f64> {
        match self {
            ClassWeight::None => vec![1.0; y.len()],
            ClassWeight::Balanced => {
                let n = y.len() as f64;
                let n_positive = y.iter().filter(|v| **v > 0.5).count() as f64;
                let n_negative = n - n_positive;
                let n_classes = (n_positive > 0.0) as u8 + (n_negative > 0.0) as u8;
                let n_classes = f64::from(n_classes.max(1));
                y.iter()
                    .map(|v| {
                        if *v > 0.5 {
                            n / (n_classes * n_positive)
                        } else {
                            n / (n_classes * n_negative)
                        }
                    })
                    .collect()
            }
        }
    }
}

fn default_max_depth() -> usize {
    MAX_DEPTH
}
fn default_min_samples_leaf() -> usize {
    MIN_SAMPLES_LEAF
}
fn default_min_samples_split() -> usize {
    MIN_SAMPLES_SPLIT
}
fn default_test_size() -> f64 {
    TEST_SIZE
}
fn default_seed() -> u64 {
    SEED
}

/// Configuration for the [`Trainer`](crate::trainer::Trainer).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Maximum depth of the tree, the root is at depth 0.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Minimum number of rows in every leaf.
    #[serde(default = "default_min_samples_leaf")]
    pub min_samples_leaf: usize,
    /// Minimum number of rows a node needs to be split.
    #[serde(default = "default_min_samples_split")]
    pub min_samples_split: usize,
    /// Fraction of the complete rows held out for evaluation.
    #[serde(default = "default_test_size")]
    pub test_size: f64,
    /// Seed of the holdout split.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Row weighting scheme.
    #[serde(default)]
    pub class_weight: ClassWeight,
    /// Number of threads for the split search, rayon decides when unset.
    #[serde(default)]
    pub num_threads: Option<usize>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            max_depth: default_max_depth(),
            min_samples_leaf: default_min_samples_leaf(),
            min_samples_split: default_min_samples_split(),
            test_size: default_test_size(),
            seed: default_seed(),
            class_weight: ClassWeight::default(),
            num_threads: None,
        }
    }
}

impl TrainerConfig {
    /// Read a configuration from JSON, absent keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, CancelGuardError> {
        let cfg: TrainerConfig = serde_json::from_str(json).map_err(|e| {
            CancelGuardError::InvalidParameter(
                "TrainerConfig".to_string(),
                "a JSON object".to_string(),
                e.to_string(),
            )
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), CancelGuardError> {
        validate_positive_usize_parameter(self.max_depth, "max_depth")?;
        validate_positive_usize_parameter(self.min_samples_leaf, "min_samples_leaf")?;
        validate_positive_usize_parameter(self.min_samples_split, "min_samples_split")?;
        validate_float_parameter(self.test_size, 0.0, 1.0, "test_size")?;
        if self.test_size >= 1.0 {
            return Err(CancelGuardError::InvalidParameter(
                "test_size".to_string(),
                "real value below 1".to_string(),
                self.test_size.to_string(),
            ));
        }
        if let Some(n) = self.num_threads {
            validate_positive_usize_parameter(n, "num_threads")?;
        }
        Ok(())
    }
}

//! Trainer Core
//!
//! Builds the training set from a booking table, splits it into fitting
//! and held-out rows and grows the classifier.
use crate::constants::{
    ADR, FEATURE_NAMES, IS_CANCELED, LEAD_TIME, N_FEATURES, REQUIRED_COLUMNS, SPECIAL_REQUESTS, TOTAL_NIGHTS,
    WEEKEND_NIGHTS, WEEK_NIGHTS,
};
use crate::data::{BookingTable, Matrix};
use crate::errors::CancelGuardError;
use crate::metric::Evaluation;
use crate::model::ModelContainer;
use crate::sampler::{Sampler, StratifiedSampler};
use crate::splitter::GiniSplitter;
use crate::trainer::config::TrainerConfig;
use crate::tree::{GrowthLimits, Tree};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::ThreadPool;

/// Complete rows of the booking table, features stored column major in
/// [`FEATURE_NAMES`] order.
#[derive(Debug, Clone)]
pub struct TrainingSet {
    pub features: Vec<f64>,
    pub labels: Vec<f64>,
    pub rows: usize,
    /// Rows of the table skipped because a required value was missing.
    pub dropped: usize,
}

impl TrainingSet {
    /// Collect the rows without a missing required value.
    ///
    /// `total_nights` is derived from the weekend and week night counts
    /// when the table does not carry it.
    pub fn from_table(table: &BookingTable) -> Result<Self, CancelGuardError> {
        let derive_nights =
            !table.has_column(TOTAL_NIGHTS) && table.has_column(WEEKEND_NIGHTS) && table.has_column(WEEK_NIGHTS);
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| !(table.has_column(c) || (**c == TOTAL_NIGHTS && derive_nights)))
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(CancelGuardError::MissingColumns(missing));
        }

        let total_nights = if derive_nights {
            let weekend = table.numeric_column(WEEKEND_NIGHTS)?;
            let week = table.numeric_column(WEEK_NIGHTS)?;
            weekend
                .iter()
                .zip(week)
                .map(|(a, b)| match (a, b) {
                    (Some(a), Some(b)) => Some(a + b),
                    _ => None,
                })
                .collect()
        } else {
            table.numeric_column(TOTAL_NIGHTS)?
        };
        let columns = [
            table.numeric_column(LEAD_TIME)?,
            total_nights,
            table.numeric_column(ADR)?,
            table.numeric_column(SPECIAL_REQUESTS)?,
        ];
        let target = table.numeric_column(IS_CANCELED)?;

        let complete: Vec<usize> = (0..table.rows())
            .filter(|&i| target[i].is_some() && columns.iter().all(|c| c[i].is_some()))
            .collect();
        if complete.is_empty() {
            return Err(CancelGuardError::EmptyTrainingSet);
        }

        let mut labels = Vec::with_capacity(complete.len());
        for &i in &complete {
            let label = target[i].unwrap_or(f64::NAN);
            if label != 0.0 && label != 1.0 {
                return Err(CancelGuardError::InvalidLabel(label));
            }
            labels.push(label);
        }
        let mut features = Vec::with_capacity(complete.len() * N_FEATURES);
        for column in columns.iter() {
            features.extend(complete.iter().map(|&i| column[i].unwrap_or(f64::NAN)));
        }

        Ok(TrainingSet {
            features,
            labels,
            rows: complete.len(),
            dropped: table.rows() - complete.len(),
        })
    }

    pub fn matrix(&self) -> Matrix<f64> {
        Matrix::new(&self.features, self.rows, N_FEATURES)
    }

    /// Share of canceled bookings among `index`, NaN when empty.
    pub fn cancellation_rate(&self, index: &[usize]) -> f64 {
        if index.is_empty() {
            return f64::NAN;
        }
        index.iter().map(|&i| self.labels[i]).sum::<f64>() / index.len() as f64
    }
}

/// Fits the cancellation classifier.
#[derive(Debug, Clone, Default)]
pub struct Trainer {
    pub cfg: TrainerConfig,
}

impl Trainer {
    pub fn new(cfg: TrainerConfig) -> Self {
        Trainer { cfg }
    }

    /// Seeded stratified split of the training set, returning the fitting
    /// rows and the held-out rows.
    pub fn split(&self, set: &TrainingSet) -> (Vec<usize>, Vec<usize>) {
        let mut rng = StdRng::seed_from_u64(self.cfg.seed);
        let mut sampler = StratifiedSampler::new(self.cfg.test_size, &set.labels);
        let index: Vec<usize> = (0..set.rows).collect();
        sampler.sample(&mut rng, &index)
    }

    /// Train a classifier on the booking table.
    ///
    /// Fails before fitting anything when a required column is absent,
    /// when no complete row exists or when a label is not 0 or 1.
    pub fn fit(&self, table: &BookingTable) -> Result<ModelContainer, CancelGuardError> {
        self.cfg.validate()?;
        let set = TrainingSet::from_table(table)?;
        if set.dropped > 0 {
            info!("Dropped {} rows with missing required values", set.dropped);
        }

        let (train_index, test_index) = self.split(&set);
        info!(
            "Training on {} rows (cancellation rate {:.4}), holding out {} rows (cancellation rate {:.4})",
            train_index.len(),
            set.cancellation_rate(&train_index),
            test_index.len(),
            set.cancellation_rate(&test_index),
        );

        let data = set.matrix();
        let train_labels: Vec<f64> = train_index.iter().map(|&i| set.labels[i]).collect();
        let train_weights = self.cfg.class_weight.sample_weight(&train_labels);
        let mut sample_weight = vec![0.0; set.rows];
        for (&i, w) in train_index.iter().zip(train_weights) {
            sample_weight[i] = w;
        }

        let pool = self.thread_pool()?;
        let splitter = GiniSplitter::new(self.cfg.min_samples_leaf);
        let limits = GrowthLimits {
            max_depth: self.cfg.max_depth,
            min_samples_split: self.cfg.min_samples_split,
        };
        let col_index: Vec<usize> = (0..N_FEATURES).collect();

        let mut tree = Tree::new();
        tree.fit(
            &data,
            train_index,
            &col_index,
            &set.labels,
            &sample_weight,
            &splitter,
            &limits,
            &pool,
        );
        info!("Fitted tree with depth {} and {} leaves", tree.depth, tree.n_leaves);

        let test_labels: Vec<f64> = test_index.iter().map(|&i| set.labels[i]).collect();
        let mut test_features = Vec::with_capacity(test_index.len() * N_FEATURES);
        for j in 0..N_FEATURES {
            let col = data.get_col(j);
            test_features.extend(test_index.iter().map(|&i| col[i]));
        }
        let test_data = Matrix::new(&test_features, test_index.len(), N_FEATURES);
        let test_preds = pool.install(|| tree.predict(&test_data, true));
        let evaluation = Evaluation::from_predictions(&test_labels, &test_preds);
        if evaluation.n_rows == 0 {
            warn!("No rows were held out, the model is not evaluated.");
        } else if evaluation.roc_auc.is_nan() {
            warn!("Held out rows contain a single class, ROC AUC is undefined.");
        }
        info!("Holdout evaluation: {}", evaluation);

        let feature_names = FEATURE_NAMES.iter().map(|f| f.to_string()).collect();
        ModelContainer::new(tree, feature_names, evaluation)
    }

    fn thread_pool(&self) -> Result<ThreadPool, CancelGuardError> {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(n) = self.cfg.num_threads {
            builder = builder.num_threads(n);
        }
        builder.build().map_err(|e| {
            CancelGuardError::InvalidParameter("num_threads".to_string(), "a usable thread count".to_string(), e.to_string())
        })
    }
}

/// Train a classifier with the default configuration.
pub fn fit(table: &BookingTable) -> Result<ModelContainer, CancelGuardError> {
    Trainer::default().fit(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Cell;
    use crate::errors::ErrorKind;
    use crate::testing::synthetic_bookings;

    #[test]
    fn test_fit_requires_target() {
        let table = BookingTable::from_numeric_columns(&[
            (LEAD_TIME, vec![10.0]),
            (TOTAL_NIGHTS, vec![2.0]),
            (ADR, vec![90.0]),
            (SPECIAL_REQUESTS, vec![0.0]),
        ])
        .unwrap();
        let err = fit(&table).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(matches!(err, CancelGuardError::MissingColumns(ref c) if c == &vec![IS_CANCELED.to_string()]));
    }

    #[test]
    fn test_fit_lists_every_missing_column() {
        let table = BookingTable::from_numeric_columns(&[(LEAD_TIME, vec![10.0])]).unwrap();
        match fit(&table) {
            Err(CancelGuardError::MissingColumns(c)) => {
                assert_eq!(c, vec![TOTAL_NIGHTS, ADR, SPECIAL_REQUESTS, IS_CANCELED])
            }
            _ => panic!("expected missing columns"),
        }
    }

    #[test]
    fn test_fit_single_complete_row() {
        let table = BookingTable::from_numeric_columns(&[
            (LEAD_TIME, vec![10.0, f64::NAN]),
            (TOTAL_NIGHTS, vec![2.0, 3.0]),
            (ADR, vec![90.0, 80.0]),
            (SPECIAL_REQUESTS, vec![0.0, 1.0]),
            (IS_CANCELED, vec![1.0, 0.0]),
        ])
        .unwrap();
        let model = fit(&table).unwrap();
        assert_eq!(model.feature_names().len(), 4);
        assert_eq!(model.evaluation().n_rows, 0);
    }

    #[test]
    fn test_fit_no_complete_row() {
        let table = BookingTable::from_numeric_columns(&[
            (LEAD_TIME, vec![10.0, f64::NAN]),
            (TOTAL_NIGHTS, vec![f64::NAN, 3.0]),
            (ADR, vec![90.0, 80.0]),
            (SPECIAL_REQUESTS, vec![0.0, 1.0]),
            (IS_CANCELED, vec![1.0, 0.0]),
        ])
        .unwrap();
        assert!(matches!(fit(&table), Err(CancelGuardError::EmptyTrainingSet)));
    }

    #[test]
    fn test_fit_rejects_bad_labels() {
        let table = BookingTable::from_numeric_columns(&[
            (LEAD_TIME, vec![10.0]),
            (TOTAL_NIGHTS, vec![2.0]),
            (ADR, vec![90.0]),
            (SPECIAL_REQUESTS, vec![0.0]),
            (IS_CANCELED, vec![2.0]),
        ])
        .unwrap();
        assert!(matches!(fit(&table), Err(CancelGuardError::InvalidLabel(v)) if v == 2.0));
    }

    #[test]
    fn test_fit_rejects_text_in_required_column() {
        let mut table = BookingTable::from_numeric_columns(&[
            (TOTAL_NIGHTS, vec![2.0]),
            (ADR, vec![90.0]),
            (SPECIAL_REQUESTS, vec![0.0]),
            (IS_CANCELED, vec![0.0]),
        ])
        .unwrap();
        table.push_column(LEAD_TIME, vec![Cell::from("soon")]).unwrap();
        assert!(matches!(fit(&table), Err(CancelGuardError::MalformedData { .. })));
    }

    #[test]
    fn test_training_set_derives_total_nights() {
        let table = BookingTable::from_numeric_columns(&[
            (LEAD_TIME, vec![10.0, 20.0, 30.0]),
            (WEEKEND_NIGHTS, vec![1.0, f64::NAN, 0.0]),
            (WEEK_NIGHTS, vec![2.0, 1.0, 4.0]),
            (ADR, vec![90.0, 80.0, 70.0]),
            (SPECIAL_REQUESTS, vec![0.0, 1.0, 2.0]),
            (IS_CANCELED, vec![1.0, 0.0, 0.0]),
        ])
        .unwrap();
        let set = TrainingSet::from_table(&table).unwrap();
        assert_eq!(set.rows, 2);
        assert_eq!(set.dropped, 1);
        let m = set.matrix();
        assert_eq!(m.get_row(0), vec![10.0, 3.0, 90.0, 0.0]);
        assert_eq!(m.get_row(1), vec![30.0, 4.0, 70.0, 2.0]);
        assert_eq!(set.labels, vec![1.0, 0.0]);
    }

    #[test]
    fn test_split_is_stratified() {
        let table = synthetic_bookings(5000, 7);
        let set = TrainingSet::from_table(&table).unwrap();
        let (train, test) = Trainer::default().split(&set);
        let rate = set.cancellation_rate(&(0..set.rows).collect::<Vec<_>>());
        assert_eq!(train.len(), 4000);
        assert_eq!(test.len(), 1000);
        assert!((set.cancellation_rate(&train) - rate).abs() < 0.02);
        assert!((set.cancellation_rate(&test) - rate).abs() < 0.02);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let table = synthetic_bookings(1000, 3);
        let first = fit(&table).unwrap();
        let second = Trainer::new(TrainerConfig::default().set_num_threads(Some(1)))
            .fit(&table)
            .unwrap();
        assert_eq!(first.tree(), second.tree());
        assert_eq!(first.evaluation(), second.evaluation());
    }

    #[test]
    fn test_holdout_evaluation_matches_tree() {
        let table = synthetic_bookings(1000, 5);
        let trainer = Trainer::default();
        let set = TrainingSet::from_table(&table).unwrap();
        let (_, test) = trainer.split(&set);
        let model = trainer.fit(&table).unwrap();

        let m = set.matrix();
        let y: Vec<f64> = test.iter().map(|&i| set.labels[i]).collect();
        let yhat: Vec<f64> = test.iter().map(|&i| model.tree().predict_row(&m.get_row(i))).collect();
        assert_eq!(model.evaluation().n_rows, 200);
        assert_eq!(model.evaluation(), &Evaluation::from_predictions(&y, &yhat));
    }

    #[test]
    fn test_fit_respects_config() {
        let table = synthetic_bookings(1000, 11);
        let cfg = TrainerConfig::default().set_max_depth(2).set_min_samples_leaf(50);
        let model = Trainer::new(cfg).fit(&table).unwrap();
        assert!(model.tree().depth <= 2);
        for node in model.tree().nodes.iter().filter(|n| n.is_leaf) {
            assert!(node.n_samples >= 50);
        }
        assert!(Trainer::new(TrainerConfig::default().set_test_size(1.5)).fit(&table).is_err());
    }
}

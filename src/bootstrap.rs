//! Bootstrap
//!
//! Start-up wiring: read the bookings once, train once, and hand the
//! resulting model to every request handler.
use crate::analysis::PredictionDefaults;
use crate::constants::{DATA_PATH_ENV, DEFAULT_DATA_PATH};
use crate::data::BookingTable;
use crate::dataset;
use crate::errors::CancelGuardError;
use crate::features::{extract, BookingFields};
use crate::model::{ModelContainer, Prediction};
use crate::trainer::{Trainer, TrainerConfig};
use log::{info, warn};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

/// Where the bookings live and how to train on them.
#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapConfig {
    pub data_path: PathBuf,
    pub trainer: TrainerConfig,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        BootstrapConfig {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            trainer: TrainerConfig::default(),
        }
    }
}

impl BootstrapConfig {
    /// Default configuration, with the dataset path taken from
    /// `CANCELGUARD_DATA_PATH` when it is set.
    pub fn from_env() -> Self {
        let config = BootstrapConfig::default();
        match env::var(DATA_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => config.set_data_path(path.trim()),
            _ => config,
        }
    }

    pub fn set_data_path(mut self, data_path: impl Into<PathBuf>) -> Self {
        self.data_path = data_path.into();
        self
    }

    pub fn set_trainer(mut self, trainer: TrainerConfig) -> Self {
        self.trainer = trainer;
        self
    }
}

/// Whether the process holds a trained model.
///
/// There is one transition, from `Untrained` to `Trained`, made at
/// start-up. The trained container is shared and never mutated.
#[derive(Debug, Clone, Default)]
pub enum ModelState {
    #[default]
    Untrained,
    Trained(Arc<ModelContainer>),
}

impl ModelState {
    pub fn from_training(container: ModelContainer) -> Self {
        ModelState::Trained(Arc::new(container))
    }

    pub fn is_trained(&self) -> bool {
        matches!(self, ModelState::Trained(_))
    }

    pub fn container(&self) -> Result<&ModelContainer, CancelGuardError> {
        match self {
            ModelState::Trained(container) => Ok(container),
            ModelState::Untrained => Err(CancelGuardError::ModelNotInitialized),
        }
    }
}

/// Read the bookings named by the environment and train on them.
///
/// Any error returned here should abort start-up.
pub fn load_model() -> Result<ModelContainer, CancelGuardError> {
    load_model_from(&BootstrapConfig::from_env())
}

pub fn load_model_from(config: &BootstrapConfig) -> Result<ModelContainer, CancelGuardError> {
    let table = dataset::load(&config.data_path)?;
    Trainer::new(config.trainer.clone()).fit(&table)
}

/// Label and probability for a booking.
pub fn predict_cancellation(state: &ModelState, fields: &BookingFields) -> Result<(u8, f64), CancelGuardError> {
    let container = state.container()?;
    let features = extract(fields)?;
    container.predict(&features).map(|p| p.as_tuple())
}

/// Result of a prediction as shown to the analyst.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionOutcome {
    Predicted(Prediction),
    Failed(String),
}

/// Predict without ever failing the caller; errors become a message.
pub fn predict_for_display(state: &ModelState, fields: &BookingFields) -> PredictionOutcome {
    match predict_cancellation(state, fields) {
        Ok((label, probability)) => PredictionOutcome::Predicted(Prediction { label, probability }),
        Err(e) => {
            warn!("Prediction failed: {}", e);
            PredictionOutcome::Failed(format!("could not generate a prediction: {}", e))
        }
    }
}

/// Everything the dashboard needs after start-up: the bookings for the
/// exploration views, the trained model and the form defaults.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub table: BookingTable,
    pub state: ModelState,
    pub defaults: PredictionDefaults,
}

impl Dashboard {
    /// Read the dataset once and train once.
    pub fn start(config: &BootstrapConfig) -> Result<Self, CancelGuardError> {
        let table = dataset::load(&config.data_path)?;
        let container = Trainer::new(config.trainer.clone()).fit(&table)?;
        let defaults = PredictionDefaults::from_table(&table)?;
        info!(
            "Dashboard ready with {} bookings, holdout accuracy {:.4}",
            table.rows(),
            container.evaluation().accuracy
        );
        Ok(Dashboard {
            table,
            state: ModelState::from_training(container),
            defaults,
        })
    }

    pub fn predict(&self, fields: &BookingFields) -> PredictionOutcome {
        predict_for_display(&self.state, fields)
    }
}

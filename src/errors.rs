//! Errors
//!
//! Custom error types used throughout the `cancelguard` crate.
use thiserror::Error;

/// Broad class of a failure, used by the presentation layer to decide
/// whether start-up must abort or a single request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Dataset or training configuration is unusable. Start-up must abort.
    Configuration,
    /// Prediction was requested against a missing or inconsistent model.
    ModelState,
    /// A user supplied value could not be coerced.
    Input,
}

/// Errors that can occur while loading bookings, training or predicting.
#[derive(Debug, Error)]
pub enum CancelGuardError {
    /// Unable to read the dataset.
    #[error("Unable to read dataset: {0}")]
    UnableToRead(String),
    /// The CSV source is structurally broken.
    #[error("Malformed CSV data: {0}")]
    MalformedCsv(String),
    /// A numeric column holds a value that is not a number.
    #[error("Row {row} of column {column} holds a non-numeric value {value:?}.")]
    MalformedData { row: usize, column: String, value: String },
    /// Columns needed to train the model are absent.
    #[error("Missing columns required to train the model: {0:?}")]
    MissingColumns(Vec<String>),
    /// No rows remain after removing incomplete ones.
    #[error("No complete rows are available to train the model.")]
    EmptyTrainingSet,
    /// The target column must only hold 0 or 1.
    #[error("The value {0} is not a valid cancellation label, expected 0 or 1.")]
    InvalidLabel(f64),
    /// First value is the name of the parameter, second is expected, third is what was passed.
    #[error("Invalid parameter value passed for {0}, expected {1} but {2} provided.")]
    InvalidParameter(String, String, String),
    /// Prediction was requested before a model was trained.
    #[error("The model is not initialized, call load_model() at start-up.")]
    ModelNotInitialized,
    /// The container does not hold a usable classifier.
    #[error("The model is malformed: {0}")]
    MalformedModel(String),
    /// A field could not be coerced to a floating point value.
    #[error("Invalid value {value} passed for {field}, expected a finite number.")]
    InvalidFeatureValue { field: String, value: String },
    /// Feature layout does not match the one the classifier was fitted with.
    #[error("Feature layout mismatch, expected {expected:?} but {got:?} provided.")]
    FeatureLayoutMismatch { expected: Vec<String>, got: Vec<String> },
}

impl CancelGuardError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CancelGuardError::UnableToRead(_)
            | CancelGuardError::MalformedCsv(_)
            | CancelGuardError::MalformedData { .. }
            | CancelGuardError::MissingColumns(_)
            | CancelGuardError::EmptyTrainingSet
            | CancelGuardError::InvalidLabel(_)
            | CancelGuardError::InvalidParameter(..) => ErrorKind::Configuration,
            CancelGuardError::ModelNotInitialized
            | CancelGuardError::MalformedModel(_)
            | CancelGuardError::FeatureLayoutMismatch { .. } => ErrorKind::ModelState,
            CancelGuardError::InvalidFeatureValue { .. } => ErrorKind::Input,
        }
    }
}

impl From<csv::Error> for CancelGuardError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            CancelGuardError::UnableToRead(err.to_string())
        } else {
            CancelGuardError::MalformedCsv(err.to_string())
        }
    }
}

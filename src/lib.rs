// Private modules
mod node;

#[cfg(test)]
mod testing;

// Modules
pub mod analysis;
pub mod bootstrap;
pub mod constants;
pub mod data;
pub mod dataset;
pub mod errors;
pub mod features;
pub mod metric;
pub mod model;
pub mod sampler;
pub mod splitter;
pub mod trainer;
pub mod tree;
pub mod utils;

// Individual classes, and functions
pub use bootstrap::{
    load_model, load_model_from, predict_cancellation, predict_for_display, BootstrapConfig, Dashboard, ModelState,
    PredictionOutcome,
};
pub use data::{BookingTable, Matrix};
pub use errors::{CancelGuardError, ErrorKind};
pub use features::{extract, BookingFields, FeatureVector, FieldValue};
pub use metric::Evaluation;
pub use model::{predict, ModelContainer, Prediction};
pub use trainer::{fit, ClassWeight, Trainer, TrainerConfig};

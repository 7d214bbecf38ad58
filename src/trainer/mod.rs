// public modules
pub mod config;
pub mod core;

// private modules
mod setters;

pub use self::config::{ClassWeight, TrainerConfig};
pub use self::core::{fit, Trainer, TrainingSet};

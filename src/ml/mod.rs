/// Machine learning module for the fraud classifier
///
/// This module provides:
/// - Feature standardization (fit once per training run)
/// - A random-forest binary classifier behind the `Classifier` seam
/// - Evaluation metrics (accuracy, confusion matrix, text report)
/// - The process-wide model state and the train/predict operations

pub mod evaluation;
pub mod forest;
pub mod scaler;
pub mod service;

pub use forest::{Classifier, RandomForestClassifier, RandomForestParams};
pub use scaler::StandardScaler;
pub use service::{ModelInfo, ModelService, PredictionOutcome, TrainedModel, TrainingReport};

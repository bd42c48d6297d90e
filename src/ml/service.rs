use crate::config::ModelConfig;
use crate::data::{Dataset, DatasetStats};
use crate::error::{AppError, Result};
use crate::ml::evaluation::{accuracy, classification_report, confusion_matrix};
use crate::ml::forest::{Classifier, RandomForestClassifier, RandomForestParams};
use crate::ml::scaler::StandardScaler;
use crate::models::FEATURE_NAMES;
use ndarray::{Array2, Axis};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// A fitted scaler/classifier pair from one training run.
///
/// The two are always stored and swapped together, so a reader can never
/// observe a scaler from one run and a classifier from another.
pub struct TrainedModel {
    pub scaler: StandardScaler,
    pub classifier: Box<dyn Classifier>,
    pub trained_at: chrono::DateTime<chrono::Utc>,
    pub train_accuracy: f64,
    pub test_accuracy: f64,
}

/// Everything a successful training run reports back
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub train_accuracy: f64,
    pub test_accuracy: f64,
    pub classification_report: String,
    pub confusion_matrix: [[u64; 2]; 2],
    /// Size of the held-out test partition
    pub test_size: usize,
    /// Descriptive statistics over the full dataset
    pub stats: DatasetStats,
}

/// Outcome of scoring a single record
#[derive(Debug, Clone)]
pub struct PredictionOutcome {
    pub label: usize,
    pub fraud_probability: f64,
    pub confidence: f64,
    pub feature_importance: HashMap<String, f64>,
}

/// Trained-model metadata for the `/model` endpoint
#[derive(Debug, Clone, serde::Serialize)]
pub struct ModelInfo {
    pub trained: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trained_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub train_accuracy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_accuracy: Option<f64>,
    pub n_features: usize,
    pub feature_names: Vec<String>,
    pub n_trees: usize,
    pub max_depth: usize,
    pub seed: u64,
    pub test_size: f64,
}

/// Process-wide model state plus the train/predict operations.
pub struct ModelService {
    dataset_path: PathBuf,
    config: ModelConfig,
    model: RwLock<Option<Arc<TrainedModel>>>,
}

impl ModelService {
    pub fn new(dataset_path: PathBuf, config: ModelConfig) -> Self {
        Self {
            dataset_path,
            config,
            model: RwLock::new(None),
        }
    }

    /// Train a fresh scaler/classifier pair from the configured dataset.
    ///
    /// The process-wide state is only replaced after every step has
    /// succeeded; any failure leaves the previous model (or its absence)
    /// untouched.
    pub async fn train(&self) -> Result<TrainingReport> {
        info!(path = %self.dataset_path.display(), "Loading training dataset");
        let dataset = Dataset::load(&self.dataset_path)?;
        let stats = dataset.stats();
        info!(
            rows = dataset.n_samples,
            fraud_rows = stats.fraud_rows,
            "Dataset loaded"
        );

        // The scaler is fitted on the full matrix before the split; the
        // held-out rows leak into the means/stds.
        let scaler = StandardScaler::fit(&dataset.features)?;
        let scaled = scaler.transform(&dataset.features)?;

        let (train_idx, test_idx) =
            dataset.stratified_split(self.config.test_size, self.config.seed);

        let x_train = scaled.select(Axis(0), &train_idx);
        let x_test = scaled.select(Axis(0), &test_idx);
        let y_train = dataset.labels.select(Axis(0), &train_idx);
        let y_test = dataset.labels.select(Axis(0), &test_idx);

        info!(
            train_rows = x_train.nrows(),
            test_rows = x_test.nrows(),
            n_trees = self.config.n_trees,
            "Fitting random forest"
        );
        let mut forest = RandomForestClassifier::new(RandomForestParams {
            n_trees: self.config.n_trees,
            max_depth: self.config.max_depth,
            seed: self.config.seed,
        });
        forest.fit(&x_train, &y_train)?;

        let train_pred = forest.predict(&x_train)?;
        let test_pred = forest.predict(&x_test)?;

        let y_train_vec: Vec<usize> = y_train.to_vec();
        let y_test_vec: Vec<usize> = y_test.to_vec();
        let train_pred_vec: Vec<usize> = train_pred.to_vec();
        let test_pred_vec: Vec<usize> = test_pred.to_vec();

        let train_accuracy = accuracy(&y_train_vec, &train_pred_vec);
        let test_accuracy = accuracy(&y_test_vec, &test_pred_vec);
        let matrix = confusion_matrix(&y_test_vec, &test_pred_vec);
        let report = classification_report(&y_test_vec, &test_pred_vec);

        info!(
            train_accuracy = train_accuracy,
            test_accuracy = test_accuracy,
            "Training complete"
        );

        let trained = TrainedModel {
            scaler,
            classifier: Box::new(forest),
            trained_at: chrono::Utc::now(),
            train_accuracy,
            test_accuracy,
        };

        // Single atomic swap of the whole pair
        *self.model.write().await = Some(Arc::new(trained));

        Ok(TrainingReport {
            train_accuracy,
            test_accuracy,
            classification_report: report.to_string(),
            confusion_matrix: matrix,
            test_size: y_test_vec.len(),
            stats,
        })
    }

    /// Score one feature vector with the current model.
    pub async fn predict(&self, features: &[f64]) -> Result<PredictionOutcome> {
        let model = self
            .model
            .read()
            .await
            .clone()
            .ok_or(AppError::Untrained)?;

        let scaled = model.scaler.transform_row(features)?;
        let x = Array2::from_shape_vec((1, scaled.len()), scaled.to_vec())
            .map_err(|e| AppError::Prediction(format!("failed to build input row: {e}")))?;

        let proba = model.classifier.predict_proba(&x)?;
        let labels = model.classifier.predict(&x)?;
        let label = labels[0];

        let importances = model.classifier.feature_importances()?;
        let feature_importance: HashMap<String, f64> = FEATURE_NAMES
            .iter()
            .zip(importances.iter())
            .map(|(name, &value)| (name.to_string(), value))
            .collect();

        Ok(PredictionOutcome {
            label,
            fraud_probability: proba[[0, 1]],
            confidence: proba[[0, 0]].max(proba[[0, 1]]),
            feature_importance,
        })
    }

    /// Whether a trained model is currently available
    pub async fn is_trained(&self) -> bool {
        self.model.read().await.is_some()
    }

    /// Metadata about the current model and its hyperparameters
    pub async fn info(&self) -> ModelInfo {
        let model = self.model.read().await.clone();

        ModelInfo {
            trained: model.is_some(),
            trained_at: model.as_ref().map(|m| m.trained_at),
            train_accuracy: model.as_ref().map(|m| m.train_accuracy),
            test_accuracy: model.as_ref().map(|m| m.test_accuracy),
            n_features: FEATURE_NAMES.len(),
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            n_trees: self.config.n_trees,
            max_depth: self.config.max_depth,
            seed: self.config.seed,
            test_size: self.config.test_size,
        }
    }
}

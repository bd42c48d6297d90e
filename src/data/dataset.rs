use crate::error::{AppError, Result};
use crate::models::{TransactionRecord, FEATURE_NAMES};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// In-memory training dataset: feature matrix plus labels.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Feature matrix (n_samples x 15), columns in `FEATURE_NAMES` order
    pub features: Array2<f64>,

    /// Fraud labels (0/1)
    pub labels: Array1<usize>,

    /// Number of samples
    pub n_samples: usize,
}

/// Descriptive statistics over the full dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetStats {
    pub total_rows: usize,
    pub fraud_rows: usize,
    pub fraud_percentage: f64,
    pub avg_transaction_amount: f64,
    pub weekend_transactions_pct: f64,
    pub night_transactions_pct: f64,
}

impl Dataset {
    /// Load the training CSV. The header must name all 15 features plus TX_FRAUD.
    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| {
            AppError::Dataset(format!("could not open {}: {e}", path.display()))
        })?;

        let mut rows: Vec<[f64; 15]> = Vec::new();
        let mut labels: Vec<usize> = Vec::new();

        for result in reader.deserialize() {
            let record: TransactionRecord = result?;
            labels.push(record.label()?);
            rows.push(record.to_feature_vector());
        }

        if rows.is_empty() {
            return Err(AppError::Dataset("dataset is empty".to_string()));
        }

        let n_samples = rows.len();
        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        let features = Array2::from_shape_vec((n_samples, FEATURE_NAMES.len()), flat)
            .map_err(|e| AppError::Internal(format!("failed to build feature matrix: {e}")))?;

        Ok(Self {
            features,
            labels: Array1::from_vec(labels),
            n_samples,
        })
    }

    /// Descriptive statistics over the whole dataset
    pub fn stats(&self) -> DatasetStats {
        let n = self.n_samples as f64;
        let fraud_rows = self.labels.iter().filter(|&&l| l == 1).count();

        DatasetStats {
            total_rows: self.n_samples,
            fraud_rows,
            fraud_percentage: fraud_rows as f64 / n * 100.0,
            avg_transaction_amount: self.features.column(0).mean().unwrap_or(0.0),
            weekend_transactions_pct: self.features.column(1).sum() / n * 100.0,
            night_transactions_pct: self.features.column(2).sum() / n * 100.0,
        }
    }

    /// Deterministic stratified split.
    ///
    /// Each class contributes `round(n_class * test_size)` rows to the test
    /// partition, so both partitions preserve the class-frequency ratio.
    /// Returns (train indices, test indices).
    pub fn stratified_split(&self, test_size: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut train_idx = Vec::new();
        let mut test_idx = Vec::new();

        for class in [0usize, 1] {
            let mut class_idx: Vec<usize> = self
                .labels
                .iter()
                .enumerate()
                .filter(|(_, &l)| l == class)
                .map(|(i, _)| i)
                .collect();

            class_idx.shuffle(&mut rng);

            let n_test = ((class_idx.len() as f64) * test_size).round() as usize;
            let n_test = n_test.min(class_idx.len());

            test_idx.extend_from_slice(&class_idx[..n_test]);
            train_idx.extend_from_slice(&class_idx[n_test..]);
        }

        (train_idx, test_idx)
    }
}

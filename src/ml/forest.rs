use crate::error::{AppError, Result};
use linfa::traits::{Fit, Predict};
use linfa_trees::{DecisionTree, SplitQuality};
use ndarray::{Array1, Array2, Axis};
use ndarray_stats::QuantileExt;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Seam between the model service and the underlying ML library.
///
/// Anything that can fit on a scaled feature matrix and produce labels,
/// class probabilities and per-feature importances satisfies this contract.
pub trait Classifier: Send + Sync {
    /// Fit on a feature matrix and 0/1 labels
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()>;

    /// Predict class labels
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>>;

    /// Predict class probabilities, one (p0, p1) row per sample
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>>;

    /// Per-feature importance scores, non-negative and summing to 1
    fn feature_importances(&self) -> Result<Vec<f64>>;

    /// Check if the model is fitted
    fn is_trained(&self) -> bool;
}

/// Hyperparameters for the forest
#[derive(Debug, Clone)]
pub struct RandomForestParams {
    /// Number of trees
    pub n_trees: usize,

    /// Maximum depth of each tree
    pub max_depth: usize,

    /// Seed for the bootstrap sampling
    pub seed: u64,
}

impl Default for RandomForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 10,
            seed: 42,
        }
    }
}

/// Random forest: bagged Gini decision trees over balanced bootstrap samples.
///
/// Each tree fits on `n_samples` rows drawn with replacement, with per-row
/// draw weight `n / (n_classes * n_class)` so the minority class is
/// oversampled to balance. Class probabilities are the fraction of tree
/// votes; importances are the per-tree impurity-decrease importances
/// averaged over the ensemble.
pub struct RandomForestClassifier {
    params: RandomForestParams,
    trees: Vec<DecisionTree<f64, usize>>,
    n_features: usize,
    trained: bool,
}

impl RandomForestClassifier {
    pub fn new(params: RandomForestParams) -> Self {
        Self {
            params,
            trees: Vec::new(),
            n_features: 0,
            trained: false,
        }
    }

    pub fn params(&self) -> &RandomForestParams {
        &self.params
    }

    fn check_trained(&self) -> Result<()> {
        if !self.trained {
            return Err(AppError::Prediction("model not fitted".to_string()));
        }
        Ok(())
    }

    fn check_features(&self, x: &Array2<f64>) -> Result<()> {
        if x.ncols() != self.n_features {
            return Err(AppError::Prediction(format!(
                "expected {} features, got {}",
                self.n_features,
                x.ncols()
            )));
        }
        Ok(())
    }
}

impl Classifier for RandomForestClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        let n = x.nrows();
        if n == 0 {
            return Err(AppError::Training("training set is empty".to_string()));
        }
        if y.len() != n {
            return Err(AppError::Training(format!(
                "feature matrix has {n} rows but {} labels were given",
                y.len()
            )));
        }

        let n_fraud = y.iter().filter(|&&l| l == 1).count();
        let n_legit = n - n_fraud;
        if n_fraud == 0 || n_legit == 0 {
            return Err(AppError::Training(
                "training set must contain both classes".to_string(),
            ));
        }
        if y.iter().any(|&l| l > 1) {
            return Err(AppError::Training("labels must be 0 or 1".to_string()));
        }

        // Balanced class weights: n / (n_classes * n_class)
        let class_weights = [
            n as f64 / (2.0 * n_legit as f64),
            n as f64 / (2.0 * n_fraud as f64),
        ];
        let sample_weights: Vec<f64> = y.iter().map(|&l| class_weights[l]).collect();

        let dist = WeightedIndex::new(&sample_weights)
            .map_err(|e| AppError::Training(format!("invalid sample weights: {e}")))?;
        let mut rng = StdRng::seed_from_u64(self.params.seed);

        let mut trees = Vec::with_capacity(self.params.n_trees);
        for _ in 0..self.params.n_trees {
            let indices: Vec<usize> = (0..n).map(|_| dist.sample(&mut rng)).collect();
            let x_boot = x.select(Axis(0), &indices);
            let y_boot = y.select(Axis(0), &indices);

            let tree = DecisionTree::<f64, usize>::params()
                .split_quality(SplitQuality::Gini)
                .max_depth(Some(self.params.max_depth))
                .fit(&linfa::Dataset::new(x_boot, y_boot))
                .map_err(|e| AppError::Training(format!("failed to fit tree: {e}")))?;

            trees.push(tree);
        }

        self.trees = trees;
        self.n_features = x.ncols();
        self.trained = true;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        let proba = self.predict_proba(x)?;

        let mut labels = Vec::with_capacity(proba.nrows());
        for row in proba.rows() {
            let label = row
                .argmax()
                .map_err(|e| AppError::Prediction(format!("degenerate vote row: {e}")))?;
            labels.push(label);
        }
        Ok(Array1::from_vec(labels))
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_trained()?;
        self.check_features(x)?;

        let mut votes = Array2::<f64>::zeros((x.nrows(), 2));
        for tree in &self.trees {
            let predictions = tree.predict(x);
            for (i, &label) in predictions.iter().enumerate() {
                votes[[i, label]] += 1.0;
            }
        }
        votes /= self.trees.len() as f64;
        Ok(votes)
    }

    fn feature_importances(&self) -> Result<Vec<f64>> {
        self.check_trained()?;

        let mut totals = vec![0.0; self.n_features];
        for tree in &self.trees {
            for (i, importance) in tree.feature_importance().into_iter().enumerate() {
                totals[i] += importance;
            }
        }

        let sum: f64 = totals.iter().sum();
        if sum > 0.0 {
            for value in &mut totals {
                *value /= sum;
            }
        } else {
            // No split anywhere in the ensemble; spread importance uniformly
            let uniform = 1.0 / self.n_features as f64;
            totals.iter_mut().for_each(|v| *v = uniform);
        }
        Ok(totals)
    }

    fn is_trained(&self) -> bool {
        self.trained
    }
}

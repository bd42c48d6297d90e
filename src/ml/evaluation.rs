//! Binary-classification evaluation: accuracy, confusion matrix and a
//! per-class precision/recall/F1 report rendered as text.

use std::fmt;

/// Fraction of matching labels.
pub fn accuracy(y_true: &[usize], y_pred: &[usize]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t == p)
        .count();
    correct as f64 / y_true.len() as f64
}

/// 2x2 confusion matrix, rows = true class, columns = predicted class,
/// class order {0, 1}.
pub fn confusion_matrix(y_true: &[usize], y_pred: &[usize]) -> [[u64; 2]; 2] {
    let mut matrix = [[0u64; 2]; 2];
    for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
        if t < 2 && p < 2 {
            matrix[t][p] += 1;
        }
    }
    matrix
}

/// Per-class evaluation metrics
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Full per-class report plus macro and support-weighted averages.
#[derive(Debug, Clone)]
pub struct ClassificationReport {
    pub classes: [ClassMetrics; 2],
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
    pub total_support: usize,
}

/// Compute the report over 0/1 labels.
pub fn classification_report(y_true: &[usize], y_pred: &[usize]) -> ClassificationReport {
    let per_class = [0usize, 1].map(|class| {
        let tp = y_true
            .iter()
            .zip(y_pred.iter())
            .filter(|(&t, &p)| t == class && p == class)
            .count();
        let fp = y_true
            .iter()
            .zip(y_pred.iter())
            .filter(|(&t, &p)| t != class && p == class)
            .count();
        let fn_count = y_true
            .iter()
            .zip(y_pred.iter())
            .filter(|(&t, &p)| t == class && p != class)
            .count();

        let precision = if tp + fp > 0 {
            tp as f64 / (tp + fp) as f64
        } else {
            0.0
        };
        let recall = if tp + fn_count > 0 {
            tp as f64 / (tp + fn_count) as f64
        } else {
            0.0
        };
        let f1_score = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        let support = y_true.iter().filter(|&&t| t == class).count();

        ClassMetrics {
            precision,
            recall,
            f1_score,
            support,
        }
    });

    let total_support = y_true.len();
    let macro_avg = ClassMetrics {
        precision: per_class.iter().map(|m| m.precision).sum::<f64>() / 2.0,
        recall: per_class.iter().map(|m| m.recall).sum::<f64>() / 2.0,
        f1_score: per_class.iter().map(|m| m.f1_score).sum::<f64>() / 2.0,
        support: total_support,
    };

    let weight = |f: fn(&ClassMetrics) -> f64| {
        if total_support == 0 {
            0.0
        } else {
            per_class
                .iter()
                .map(|m| f(m) * m.support as f64)
                .sum::<f64>()
                / total_support as f64
        }
    };
    let weighted_avg = ClassMetrics {
        precision: weight(|m| m.precision),
        recall: weight(|m| m.recall),
        f1_score: weight(|m| m.f1_score),
        support: total_support,
    };

    ClassificationReport {
        classes: per_class,
        accuracy: accuracy(y_true, y_pred),
        macro_avg,
        weighted_avg,
        total_support,
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>13} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for (class, metrics) in self.classes.iter().enumerate() {
            writeln!(
                f,
                "{:>13} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                class, metrics.precision, metrics.recall, metrics.f1_score, metrics.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>13} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.total_support
        )?;
        writeln!(
            f,
            "{:>13} {:>9.2} {:>9.2} {:>9.2} {:>9}",
            "macro avg",
            self.macro_avg.precision,
            self.macro_avg.recall,
            self.macro_avg.f1_score,
            self.total_support
        )?;
        writeln!(
            f,
            "{:>13} {:>9.2} {:>9.2} {:>9.2} {:>9}",
            "weighted avg",
            self.weighted_avg.precision,
            self.weighted_avg.recall,
            self.weighted_avg.f1_score,
            self.total_support
        )
    }
}

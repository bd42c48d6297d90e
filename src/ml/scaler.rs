use crate::error::{AppError, Result};
use ndarray::{Array1, Array2, Axis};

/// Per-feature standardization transform (subtract mean, divide by std).
///
/// The std is the population standard deviation (ddof = 0). Zero-variance
/// features divide by 1.0, so their standardized value is 0.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: Array1<f64>,
    std: Array1<f64>,
}

impl StandardScaler {
    /// Fit means and stds over every row of the given matrix.
    pub fn fit(features: &Array2<f64>) -> Result<Self> {
        let mean = features
            .mean_axis(Axis(0))
            .ok_or_else(|| AppError::Training("cannot fit scaler on an empty matrix".to_string()))?;

        let std = features
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s == 0.0 { 1.0 } else { s });

        Ok(Self { mean, std })
    }

    /// Standardize a full matrix with the fitted means/stds.
    pub fn transform(&self, features: &Array2<f64>) -> Result<Array2<f64>> {
        if features.ncols() != self.mean.len() {
            return Err(AppError::Prediction(format!(
                "expected {} features, got {}",
                self.mean.len(),
                features.ncols()
            )));
        }
        Ok((features - &self.mean) / &self.std)
    }

    /// Standardize a single row.
    pub fn transform_row(&self, row: &[f64]) -> Result<Array1<f64>> {
        if row.len() != self.mean.len() {
            return Err(AppError::Prediction(format!(
                "expected {} features, got {}",
                self.mean.len(),
                row.len()
            )));
        }
        let row = Array1::from_vec(row.to_vec());
        Ok((&row - &self.mean) / &self.std)
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_fit_mean_and_std() {
        let x = array![[1.0, 10.0], [3.0, 10.0], [5.0, 10.0]];
        let scaler = StandardScaler::fit(&x).unwrap();

        let scaled = scaler.transform(&x).unwrap();

        // First column: mean 3, population std sqrt(8/3)
        let expected = (1.0f64 - 3.0) / (8.0f64 / 3.0).sqrt();
        assert!((scaled[[0, 0]] - expected).abs() < 1e-12);

        // Zero-variance column standardizes to 0, not NaN
        for i in 0..3 {
            assert_eq!(scaled[[i, 1]], 0.0);
        }
    }

    #[test]
    fn test_transform_is_zero_mean_unit_std() {
        let x = array![[2.0, -1.0], [4.0, 0.0], [6.0, 1.0], [8.0, 2.0]];
        let scaler = StandardScaler::fit(&x).unwrap();
        let scaled = scaler.transform(&x).unwrap();

        for col in 0..2 {
            let mean = scaled.column(col).mean().unwrap();
            let std = scaled.column(col).std(0.0);
            assert!(mean.abs() < 1e-12);
            assert!((std - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_transform_row_matches_matrix_transform() {
        let x = array![[1.0, 4.0], [2.0, 5.0], [3.0, 9.0]];
        let scaler = StandardScaler::fit(&x).unwrap();

        let scaled = scaler.transform(&x).unwrap();
        let row = scaler.transform_row(&[2.0, 5.0]).unwrap();

        assert!((row[0] - scaled[[1, 0]]).abs() < 1e-12);
        assert!((row[1] - scaled[[1, 1]]).abs() < 1e-12);
    }

    #[test]
    fn test_dimension_mismatch() {
        let x = array![[1.0, 2.0], [3.0, 4.0]];
        let scaler = StandardScaler::fit(&x).unwrap();

        assert!(scaler.transform_row(&[1.0]).is_err());
    }
}

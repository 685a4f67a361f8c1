//! Per-column min-max scaling to `[0, 1]`.
use crate::error::{NetError, Result};
use crate::matrix::Matrix;
use ndarray::{Array1, Axis};
use serde::{Deserialize, Serialize};

/// Scaling fitted on a training matrix: `(x - min) / range` per column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    min: Vec<f64>,
    /// `max - min`; constant columns store 1.0 so they map to 0.
    range: Vec<f64>,
}

impl MinMaxScaler {
    pub fn fit(data: &Matrix) -> Result<Self> {
        if data.nrows() == 0 {
            return Err(NetError::config("cannot fit a scaler on an empty matrix"));
        }
        let min = data.fold_axis(Axis(0), f64::INFINITY, |&a, &b| a.min(b));
        let max = data.fold_axis(Axis(0), f64::NEG_INFINITY, |&a, &b| a.max(b));
        let range = (&max - &min).mapv(|r| if r.abs() < 1e-12 { 1.0 } else { r });
        Ok(Self {
            min: min.to_vec(),
            range: range.to_vec(),
        })
    }

    /// Rebuild a scaler from stored column minimums and ranges.
    pub fn from_parts(min: Vec<f64>, range: Vec<f64>) -> Result<Self> {
        if min.len() != range.len() {
            return Err(NetError::ShapeMismatch {
                op: "min_max_scale",
                left: (1, min.len()),
                right: (1, range.len()),
            });
        }
        if min.iter().chain(&range).any(|v| !v.is_finite()) || range.contains(&0.0) {
            return Err(NetError::config("scaler needs finite values and non-zero ranges"));
        }
        Ok(Self { min, range })
    }

    pub fn fit_transform(data: &Matrix) -> Result<(Self, Matrix)> {
        let scaler = Self::fit(data)?;
        let scaled = scaler.transform(data)?;
        Ok((scaler, scaled))
    }

    pub fn n_features(&self) -> usize {
        self.min.len()
    }

    pub fn min(&self) -> &[f64] {
        &self.min
    }

    pub fn range(&self) -> &[f64] {
        &self.range
    }

    fn check(&self, data: &Matrix) -> Result<()> {
        if data.ncols() != self.n_features() {
            return Err(NetError::ShapeMismatch {
                op: "min_max_scale",
                left: data.dim(),
                right: (1, self.n_features()),
            });
        }
        Ok(())
    }

    pub fn transform(&self, data: &Matrix) -> Result<Matrix> {
        self.check(data)?;
        let min = Array1::from(self.min.clone());
        let range = Array1::from(self.range.clone());
        Ok((data - &min) / &range)
    }

    pub fn inverse_transform(&self, data: &Matrix) -> Result<Matrix> {
        self.check(data)?;
        let min = Array1::from(self.min.clone());
        let range = Array1::from(self.range.clone());
        Ok(data * &range + &min)
    }
}

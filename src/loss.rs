//! Training cost used for progress monitoring.
use crate::error::{NetError, Result};
use crate::matrix::{ensure_same_shape, Matrix};
use crate::params::Parameters;
use crate::propagation::forward;

/// `1/(2m) · Σ (prediction - label)²` over all `m x c` entries.
pub fn squared_error_cost(prediction: &Matrix, labels: &Matrix) -> Result<f64> {
    ensure_same_shape("cost", prediction, labels)?;
    let m = prediction.nrows();
    if m == 0 {
        return Err(NetError::config("cost of an empty batch is undefined"));
    }
    let sum: f64 = prediction
        .iter()
        .zip(labels.iter())
        .map(|(&p, &t)| (p - t).powi(2))
        .sum();
    Ok(sum / (2.0 * m as f64))
}

/// Cost of `params` on `(features, labels)` from a fresh forward pass.
pub fn cost(features: &Matrix, labels: &Matrix, params: &Parameters) -> Result<f64> {
    let prediction = forward(features, params)?.output_out;
    squared_error_cost(&prediction, labels)
}

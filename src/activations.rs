//! Logistic activation used by both layers of the network.
use crate::matrix::Matrix;

/// Sigmoid: 1 / (1 + exp(-x))
#[derive(Debug, Clone, Copy, Default)]
pub struct Sigmoid;

impl Sigmoid {
    pub fn apply(&self, x: f64) -> f64 {
        1.0 / (1.0 + (-x).exp())
    }

    /// Derivative taken at the pre-activation `x`.
    pub fn derivative(&self, x: f64) -> f64 {
        let s = self.apply(x);
        s * (1.0 - s)
    }

    pub fn apply_matrix(&self, m: &Matrix) -> Matrix {
        m.mapv(|x| self.apply(x))
    }

    pub fn derivative_matrix(&self, m: &Matrix) -> Matrix {
        m.mapv(|x| self.derivative(x))
    }
}

//! Xavier/Glorot-style uniform initialization for weights and biases.
use crate::error::{NetError, Result};
use crate::matrix::Matrix;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::Rng;

/// Half-width of the sampling interval: `4·√6 / √(fan_in + fan_out)`.
pub fn xavier_bound(fan_in: usize, fan_out: usize) -> Result<f64> {
    let fan = fan_in + fan_out;
    if fan == 0 {
        return Err(NetError::config("fan_in + fan_out must be positive"));
    }
    Ok(4.0 * 6f64.sqrt() / (fan as f64).sqrt())
}

fn uniform<R: Rng + ?Sized>(shape: (usize, usize), bound: f64, rng: &mut R) -> Matrix {
    Matrix::random_using(shape, Uniform::new_inclusive(-bound, bound), rng)
}

/// `fan_in x fan_out` weight matrix drawn from `[-bound, bound]`.
pub fn init_weights<R: Rng + ?Sized>(
    fan_in: usize,
    fan_out: usize,
    rng: &mut R,
) -> Result<Matrix> {
    let bound = xavier_bound(fan_in, fan_out)?;
    Ok(uniform((fan_in, fan_out), bound, rng))
}

/// `1 x width` bias row, treated as a matrix with a single input row.
pub fn init_bias<R: Rng + ?Sized>(width: usize, rng: &mut R) -> Result<Matrix> {
    let bound = xavier_bound(1, width)?;
    Ok(uniform((1, width), bound, rng))
}

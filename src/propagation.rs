//! Forward and backward passes through the hidden and output layers.
use crate::activations::Sigmoid;
use crate::error::Result;
use crate::matrix::{add_bias, checked_dot, ensure_same_shape, Matrix};
use crate::params::Parameters;

/// Everything computed on the way forward, kept for the backward pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Activations {
    /// `F·w0 + b0`, `m x h`.
    pub hidden_in: Matrix,
    /// `sigmoid(hidden_in)`.
    pub hidden_out: Matrix,
    /// `hidden_out·w1 + b1`, `m x c`.
    pub output_in: Matrix,
    /// `sigmoid(output_in)`.
    pub output_out: Matrix,
}

/// Error terms for each layer, shaped like that layer's activations.
#[derive(Debug, Clone, PartialEq)]
pub struct Deltas {
    /// `m x c`
    pub output: Matrix,
    /// `m x h`
    pub hidden: Matrix,
}

/// Run the network on `features` (`m x n`). Deterministic; no parameter is touched.
pub fn forward(features: &Matrix, params: &Parameters) -> Result<Activations> {
    let hidden_in = checked_dot("hidden_in", features, &params.w0)?;
    let hidden_in = add_bias("hidden_in", hidden_in, &params.b0)?;
    let hidden_out = Sigmoid.apply_matrix(&hidden_in);
    let output_in = checked_dot("output_in", &hidden_out, &params.w1)?;
    let output_in = add_bias("output_in", output_in, &params.b1)?;
    let output_out = Sigmoid.apply_matrix(&output_in);
    Ok(Activations {
        hidden_in,
        hidden_out,
        output_in,
        output_out,
    })
}

/// Chain rule through both layers for the squared-error loss.
///
/// `delta_output = -(labels - output_out) ⊙ σ'(output_in)`
/// `delta_hidden = (delta_output · w1ᵗ) ⊙ σ'(hidden_in)`
pub fn backward(labels: &Matrix, acts: &Activations, w1: &Matrix) -> Result<Deltas> {
    ensure_same_shape("delta_output", labels, &acts.output_out)?;
    let output = -(labels - &acts.output_out) * Sigmoid.derivative_matrix(&acts.output_in);
    let back = checked_dot("delta_hidden", &output, &w1.t().to_owned())?;
    ensure_same_shape("delta_hidden", &back, &acts.hidden_in)?;
    let hidden = back * Sigmoid.derivative_matrix(&acts.hidden_in);
    Ok(Deltas { output, hidden })
}

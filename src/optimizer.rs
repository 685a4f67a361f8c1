//! Full-batch gradient descent over the four parameter matrices.
use crate::error::{NetError, Result};
use crate::matrix::{checked_dot, column_mean, ensure_same_shape, Matrix};
use crate::params::Parameters;
use crate::propagation::{Activations, Deltas};

/// Gradients for every parameter matrix, shaped like the matrix itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradients {
    pub w0: Matrix,
    pub b0: Matrix,
    pub w1: Matrix,
    pub b1: Matrix,
}

/// Weight gradients are summed over the batch; bias gradients are averaged.
pub fn compute_gradients(
    features: &Matrix,
    acts: &Activations,
    deltas: &Deltas,
) -> Result<Gradients> {
    let w1 = checked_dot("grad_w1", &acts.hidden_out.t().to_owned(), &deltas.output)?;
    let b1 = column_mean(&deltas.output)?;
    let w0 = checked_dot("grad_w0", &features.t().to_owned(), &deltas.hidden)?;
    let b0 = column_mean(&deltas.hidden)?;
    Ok(Gradients { w0, b0, w1, b1 })
}

/// Plain gradient descent with a fixed learning rate.
#[derive(Debug, Clone, Copy)]
pub struct GradientDescent {
    learning_rate: f64,
}

impl GradientDescent {
    pub fn new(learning_rate: f64) -> Result<Self> {
        if !(learning_rate.is_finite() && learning_rate > 0.0) {
            return Err(NetError::config(format!(
                "learning rate must be a positive finite number, got {learning_rate}"
            )));
        }
        Ok(Self { learning_rate })
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// `p -= α·g` for each matrix. Shapes are checked before anything is written.
    pub fn apply(&self, params: &mut Parameters, grads: &Gradients) -> Result<()> {
        ensure_same_shape("update_w0", &params.w0, &grads.w0)?;
        ensure_same_shape("update_b0", &params.b0, &grads.b0)?;
        ensure_same_shape("update_w1", &params.w1, &grads.w1)?;
        ensure_same_shape("update_b1", &params.b1, &grads.b1)?;
        let lr = self.learning_rate;
        params.w1.scaled_add(-lr, &grads.w1);
        params.b1.scaled_add(-lr, &grads.b1);
        params.w0.scaled_add(-lr, &grads.w0);
        params.b0.scaled_add(-lr, &grads.b0);
        Ok(())
    }

    /// One training step from the activations and deltas of the current batch.
    pub fn step(
        &self,
        params: &mut Parameters,
        features: &Matrix,
        acts: &Activations,
        deltas: &Deltas,
    ) -> Result<()> {
        let grads = compute_gradients(features, acts, deltas)?;
        self.apply(params, &grads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propagation::{backward, forward};
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    // 0.5 * sum of squared errors; the weight gradients are exact derivatives of this.
    fn half_sse(features: &Matrix, labels: &Matrix, params: &Parameters) -> f64 {
        let out = forward(features, params).unwrap().output_out;
        0.5 * (&out - labels).mapv(|d| d * d).sum()
    }

    fn param_mut(p: &mut Parameters, which: usize) -> &mut Matrix {
        match which {
            0 => &mut p.w0,
            1 => &mut p.b0,
            2 => &mut p.w1,
            _ => &mut p.b1,
        }
    }

    fn fixture() -> (Matrix, Matrix, Parameters) {
        let features = array![
            [0.2, -0.4, 1.0],
            [0.9, 0.1, -0.3],
            [-0.5, 0.7, 0.4],
            [0.0, 0.3, 0.8]
        ];
        let labels = array![[1.0, 0.0], [0.0, 1.0], [1.0, 0.0], [0.0, 1.0]];
        let params = Parameters::initialize(3, 4, 2, &mut StdRng::seed_from_u64(5)).unwrap();
        (features, labels, params)
    }

    #[test]
    fn rejects_non_positive_learning_rate() {
        assert!(GradientDescent::new(0.0).is_err());
        assert!(GradientDescent::new(-0.1).is_err());
        assert!(GradientDescent::new(f64::NAN).is_err());
        assert_eq!(GradientDescent::new(0.25).unwrap().learning_rate(), 0.25);
    }

    #[test]
    fn gradient_shapes_match_parameters() {
        let (features, labels, params) = fixture();
        let acts = forward(&features, &params).unwrap();
        let deltas = backward(&labels, &acts, params.w1()).unwrap();
        let g = compute_gradients(&features, &acts, &deltas).unwrap();
        assert_eq!(g.w0.dim(), params.w0().dim());
        assert_eq!(g.b0.dim(), params.b0().dim());
        assert_eq!(g.w1.dim(), params.w1().dim());
        assert_eq!(g.b1.dim(), params.b1().dim());
    }

    #[test]
    fn analytic_gradients_match_finite_differences() {
        let (features, labels, params) = fixture();
        let m = features.nrows() as f64;
        let acts = forward(&features, &params).unwrap();
        let deltas = backward(&labels, &acts, params.w1()).unwrap();
        let g = compute_gradients(&features, &acts, &deltas).unwrap();

        let eps = 1e-6;
        let numeric = |which: usize, idx: (usize, usize)| {
            let mut plus = params.clone();
            param_mut(&mut plus, which)[idx] += eps;
            let mut minus = params.clone();
            param_mut(&mut minus, which)[idx] -= eps;
            let diff = half_sse(&features, &labels, &plus) - half_sse(&features, &labels, &minus);
            diff / (2.0 * eps)
        };

        for (idx, &v) in g.w0.indexed_iter() {
            assert!((v - numeric(0, idx)).abs() < 1e-6);
        }
        for (idx, &v) in g.w1.indexed_iter() {
            assert!((v - numeric(2, idx)).abs() < 1e-6);
        }
        // Bias gradients are batch means, so they are the true derivative divided by m.
        for (idx, &v) in g.b0.indexed_iter() {
            assert!((v * m - numeric(1, idx)).abs() < 1e-6);
        }
        for (idx, &v) in g.b1.indexed_iter() {
            assert!((v * m - numeric(3, idx)).abs() < 1e-6);
        }
    }

    #[test]
    fn apply_subtracts_scaled_gradient() {
        let mut params = Parameters::from_parts(
            array![[1.0, 2.0]],
            array![[0.0, 0.0]],
            array![[1.0], [1.0]],
            array![[0.5]],
        )
        .unwrap();
        let grads = Gradients {
            w0: array![[2.0, -2.0]],
            b0: array![[1.0, 1.0]],
            w1: array![[0.0], [4.0]],
            b1: array![[-1.0]],
        };
        GradientDescent::new(0.5).unwrap().apply(&mut params, &grads).unwrap();
        assert_eq!(params.w0(), &array![[0.0, 3.0]]);
        assert_eq!(params.b0(), &array![[-0.5, -0.5]]);
        assert_eq!(params.w1(), &array![[1.0], [-1.0]]);
        assert_eq!(params.b1(), &array![[1.0]]);
    }

    #[test]
    fn apply_leaves_parameters_untouched_on_shape_error() {
        let (_, _, mut params) = fixture();
        let before = params.clone();
        let grads = Gradients {
            w0: Matrix::zeros((3, 4)),
            b0: Matrix::zeros((1, 4)),
            w1: Matrix::zeros((4, 2)),
            b1: Matrix::zeros((1, 3)),
        };
        let err = GradientDescent::new(0.1).unwrap().apply(&mut params, &grads).unwrap_err();
        assert!(matches!(err, NetError::ShapeMismatch { op: "update_b1", .. }));
        assert_eq!(params, before);
    }

    #[test]
    fn small_step_lowers_the_loss() {
        let (features, labels, mut params) = fixture();
        let before = half_sse(&features, &labels, &params);
        let acts = forward(&features, &params).unwrap();
        let deltas = backward(&labels, &acts, params.w1()).unwrap();
        GradientDescent::new(0.05)
            .unwrap()
            .step(&mut params, &features, &acts, &deltas)
            .unwrap();
        assert!(half_sse(&features, &labels, &params) < before);
    }
}

//! The four parameter matrices of the network.
use crate::error::{NetError, Result};
use crate::init::{init_bias, init_weights};
use crate::matrix::Matrix;
use rand::Rng;

/// Weights and biases of an `n -> h -> c` network.
///
/// Shapes are checked on construction and preserved by every update, so a
/// `Parameters` value always describes a consistent network. Only the
/// optimizer mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    /// Input to hidden weights, `n x h`.
    pub(crate) w0: Matrix,
    /// Hidden bias, `1 x h`.
    pub(crate) b0: Matrix,
    /// Hidden to output weights, `h x c`.
    pub(crate) w1: Matrix,
    /// Output bias, `1 x c`.
    pub(crate) b1: Matrix,
}

impl Parameters {
    /// Assemble a bundle from existing matrices, validating their shapes.
    pub fn from_parts(w0: Matrix, b0: Matrix, w1: Matrix, b1: Matrix) -> Result<Self> {
        let h = w0.ncols();
        if h == 0 {
            return Err(NetError::config("hidden layer must have at least one unit"));
        }
        if b0.dim() != (1, h) {
            return Err(NetError::ShapeMismatch {
                op: "b0",
                left: b0.dim(),
                right: (1, h),
            });
        }
        if w1.nrows() != h {
            return Err(NetError::ShapeMismatch {
                op: "w1",
                left: w1.dim(),
                right: (h, w1.ncols()),
            });
        }
        if b1.dim() != (1, w1.ncols()) {
            return Err(NetError::ShapeMismatch {
                op: "b1",
                left: b1.dim(),
                right: (1, w1.ncols()),
            });
        }
        Ok(Self { w0, b0, w1, b1 })
    }

    /// Random initial parameters for an `n_input -> n_hidden -> n_output` network.
    pub fn initialize<R: Rng + ?Sized>(
        n_input: usize,
        n_hidden: usize,
        n_output: usize,
        rng: &mut R,
    ) -> Result<Self> {
        if n_hidden == 0 {
            return Err(NetError::config("hidden layer must have at least one unit"));
        }
        if n_output == 0 {
            return Err(NetError::config("output layer must have at least one unit"));
        }
        let w0 = init_weights(n_input, n_hidden, rng)?;
        let b0 = init_bias(n_hidden, rng)?;
        let w1 = init_weights(n_hidden, n_output, rng)?;
        let b1 = init_bias(n_output, rng)?;
        Ok(Self { w0, b0, w1, b1 })
    }

    pub fn w0(&self) -> &Matrix {
        &self.w0
    }

    pub fn b0(&self) -> &Matrix {
        &self.b0
    }

    pub fn w1(&self) -> &Matrix {
        &self.w1
    }

    pub fn b1(&self) -> &Matrix {
        &self.b1
    }

    pub fn n_input(&self) -> usize {
        self.w0.nrows()
    }

    pub fn n_hidden(&self) -> usize {
        self.w0.ncols()
    }

    pub fn n_output(&self) -> usize {
        self.w1.ncols()
    }

    /// Total number of scalar parameters.
    pub fn num_parameters(&self) -> usize {
        self.w0.len() + self.b0.len() + self.w1.len() + self.b1.len()
    }

    pub fn is_finite(&self) -> bool {
        [&self.w0, &self.b0, &self.w1, &self.b1]
            .iter()
            .all(|m| m.iter().all(|v| v.is_finite()))
    }

    /// Consume the bundle, returning `(w0, b0, w1, b1)`.
    pub fn into_parts(self) -> (Matrix, Matrix, Matrix, Matrix) {
        (self.w0, self.b0, self.w1, self.b1)
    }
}

impl std::fmt::Display for Parameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Network: [{}, {}, {}] ({} parameters)",
            self.n_input(),
            self.n_hidden(),
            self.n_output(),
            self.num_parameters()
        )
    }
}

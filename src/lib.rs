//! A single-hidden-layer neural network trained by full-batch backpropagation,
//! for multi-class classification of tab-delimited numeric data.
//!
//! - Xavier-style uniform initialization of all weights and biases
//! - Sigmoid hidden and output layers, squared-error cost
//! - Fixed-length gradient-descent training with sampled cost reporting
//! - Tab-delimited data loading, min-max scaling, and text/`.pere` persistence

pub mod activations;
pub mod datasets;
pub mod error;
pub mod init;
pub mod loss;
pub mod matrix;
pub mod metrics;
pub mod network;
pub mod normalize;
pub mod optimizer;
pub mod params;
pub mod persistence;
pub mod propagation;
pub mod training;
pub mod utils;

pub use activations::Sigmoid;
pub use datasets::{load_tab_delimited, one_hot, Dataset};
pub use error::{NetError, Result};
pub use loss::{cost, squared_error_cost};
pub use matrix::Matrix;
pub use metrics::{accuracy, classify, confusion_matrix, err_rate, predict};
pub use network::Network;
pub use normalize::MinMaxScaler;
pub use optimizer::{compute_gradients, GradientDescent, Gradients};
pub use params::Parameters;
pub use persistence::{load_parameters, save_parameters};
pub use propagation::{backward, forward, Activations, Deltas};
pub use training::{
    bp_train, CostHistory, NoProgress, ProgressSink, TracingProgress, TrainConfig, Trainer,
    TrainingState, TrainingSummary,
};
pub use utils::{cost_table, xor_dataset};

//! Batch training loop: initialize once, then forward, backward and update
//! for a fixed number of cycles.
//!
//! - [`TrainConfig`] holds the immutable hyperparameters
//! - [`Trainer`] owns the parameters and walks `Idle -> Initialized -> Training -> Completed`
//! - [`ProgressSink`] receives sampled `(iteration, cost)` pairs; it never affects training
use crate::error::{NetError, Result};
use crate::loss::cost;
use crate::matrix::Matrix;
use crate::optimizer::GradientDescent;
use crate::params::Parameters;
use crate::propagation::{backward, forward};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Hyperparameters of a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Number of hidden units.
    pub hidden_units: usize,
    /// Exact number of update cycles to run.
    pub max_cycle: usize,
    /// Fixed gradient-descent step size.
    pub learning_rate: f64,
    /// Expected number of classes; `None` takes it from the label matrix.
    pub n_output: Option<usize>,
    /// Sample the cost every this many cycles; 0 disables sampling.
    pub report_every: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            hidden_units: 20,
            max_cycle: 1000,
            learning_rate: 0.1,
            n_output: None,
            report_every: 100,
        }
    }
}

impl TrainConfig {
    pub fn new(hidden_units: usize, max_cycle: usize, learning_rate: f64) -> Self {
        Self {
            hidden_units,
            max_cycle,
            learning_rate,
            ..Self::default()
        }
    }

    pub fn with_n_output(mut self, n_output: usize) -> Self {
        self.n_output = Some(n_output);
        self
    }

    pub fn with_report_every(mut self, report_every: usize) -> Self {
        self.report_every = report_every;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.hidden_units == 0 {
            return Err(NetError::config("hidden unit count must be positive"));
        }
        if self.n_output == Some(0) {
            return Err(NetError::config("output class count must be positive"));
        }
        GradientDescent::new(self.learning_rate)?;
        Ok(())
    }
}

/// Receives sampled training costs.
pub trait ProgressSink {
    fn record(&mut self, iteration: usize, cost: f64);
}

impl<F: FnMut(usize, f64)> ProgressSink for F {
    fn record(&mut self, iteration: usize, cost: f64) {
        self(iteration, cost)
    }
}

/// Discards every sample.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn record(&mut self, _iteration: usize, _cost: f64) {}
}

/// Keeps every sample in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CostHistory {
    pub points: Vec<(usize, f64)>,
}

impl CostHistory {
    pub fn last_cost(&self) -> Option<f64> {
        self.points.last().map(|&(_, c)| c)
    }
}

impl ProgressSink for CostHistory {
    fn record(&mut self, iteration: usize, cost: f64) {
        self.points.push((iteration, cost));
    }
}

/// Emits each sample as a `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn record(&mut self, iteration: usize, cost: f64) {
        info!(iteration, cost, "training progress");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingState {
    Idle,
    Initialized,
    Training,
    Completed,
}

impl TrainingState {
    fn name(self) -> &'static str {
        match self {
            TrainingState::Idle => "idle",
            TrainingState::Initialized => "initialized",
            TrainingState::Training => "training",
            TrainingState::Completed => "completed",
        }
    }
}

impl std::fmt::Display for TrainingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingSummary {
    pub iterations: usize,
    pub final_cost: f64,
}

/// Owns the parameters for the duration of training.
#[derive(Debug)]
pub struct Trainer {
    config: TrainConfig,
    optimizer: GradientDescent,
    state: TrainingState,
    params: Option<Parameters>,
}

impl Trainer {
    pub fn new(config: TrainConfig) -> Result<Self> {
        config.validate()?;
        let optimizer = GradientDescent::new(config.learning_rate)?;
        Ok(Self {
            config,
            optimizer,
            state: TrainingState::Idle,
            params: None,
        })
    }

    /// Start from existing parameters instead of a random initialization.
    pub fn with_parameters(config: TrainConfig, params: Parameters) -> Result<Self> {
        let mut trainer = Self::new(config)?;
        if params.n_hidden() != trainer.config.hidden_units {
            return Err(NetError::config(format!(
                "parameters have {} hidden units, configuration expects {}",
                params.n_hidden(),
                trainer.config.hidden_units
            )));
        }
        trainer.check_n_output(params.n_output())?;
        trainer.params = Some(params);
        trainer.state = TrainingState::Initialized;
        Ok(trainer)
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub fn state(&self) -> TrainingState {
        self.state
    }

    pub fn parameters(&self) -> Option<&Parameters> {
        self.params.as_ref()
    }

    pub fn into_parameters(self) -> Option<Parameters> {
        self.params
    }

    fn check_n_output(&self, n_output: usize) -> Result<()> {
        match self.config.n_output {
            Some(expected) if expected != n_output => Err(NetError::config(format!(
                "configured for {expected} output classes, got {n_output}"
            ))),
            _ => Ok(()),
        }
    }

    fn require(&self, expected: TrainingState, action: &'static str) -> Result<()> {
        if self.state != expected {
            return Err(NetError::InvalidState {
                from: self.state.name(),
                action,
            });
        }
        Ok(())
    }

    /// Draw initial parameters for an `n_input -> hidden_units -> n_output` network.
    pub fn initialize<R: Rng + ?Sized>(
        &mut self,
        n_input: usize,
        n_output: usize,
        rng: &mut R,
    ) -> Result<()> {
        self.require(TrainingState::Idle, "initialize")?;
        self.check_n_output(n_output)?;
        let params = Parameters::initialize(n_input, self.config.hidden_units, n_output, rng)?;
        debug!(%params, "parameters initialized");
        self.params = Some(params);
        self.state = TrainingState::Initialized;
        Ok(())
    }

    fn check_training_set(
        &self,
        params: &Parameters,
        features: &Matrix,
        labels: &Matrix,
    ) -> Result<()> {
        if features.nrows() != labels.nrows() {
            return Err(NetError::ShapeMismatch {
                op: "training_set",
                left: features.dim(),
                right: labels.dim(),
            });
        }
        if features.nrows() == 0 {
            return Err(NetError::config("training set has no samples"));
        }
        if features.ncols() != params.n_input() {
            return Err(NetError::ShapeMismatch {
                op: "training_set",
                left: features.dim(),
                right: params.w0().dim(),
            });
        }
        self.check_n_output(labels.ncols())?;
        if labels.ncols() != params.n_output() {
            return Err(NetError::config(format!(
                "network has {} output units but labels have {} classes",
                params.n_output(),
                labels.ncols()
            )));
        }
        Ok(())
    }

    /// Run exactly `max_cycle` full-batch updates on `(features, labels)`.
    ///
    /// Every validation happens before the first update. Cost samples go to
    /// `sink` and are never used to stop early.
    pub fn train(
        &mut self,
        features: &Matrix,
        labels: &Matrix,
        sink: &mut dyn ProgressSink,
    ) -> Result<TrainingSummary> {
        self.require(TrainingState::Initialized, "train")?;
        let mut params = self.params.take().ok_or(NetError::InvalidState {
            from: self.state.name(),
            action: "train",
        })?;
        if let Err(e) = self.check_training_set(&params, features, labels) {
            self.params = Some(params);
            return Err(e);
        }

        info!(
            samples = features.nrows(),
            features = features.ncols(),
            hidden = params.n_hidden(),
            classes = labels.ncols(),
            max_cycle = self.config.max_cycle,
            learning_rate = self.config.learning_rate,
            "training started"
        );
        self.state = TrainingState::Training;
        let result = self.run_cycles(&mut params, features, labels, sink);
        self.params = Some(params);
        match result {
            Ok(summary) => {
                self.state = TrainingState::Completed;
                info!(
                    iterations = summary.iterations,
                    final_cost = summary.final_cost,
                    "training completed"
                );
                Ok(summary)
            }
            Err(e) => {
                self.state = TrainingState::Initialized;
                Err(e)
            }
        }
    }

    fn run_cycles(
        &self,
        params: &mut Parameters,
        features: &Matrix,
        labels: &Matrix,
        sink: &mut dyn ProgressSink,
    ) -> Result<TrainingSummary> {
        let every = self.config.report_every;
        for i in 0..self.config.max_cycle {
            let acts = forward(features, params)?;
            let deltas = backward(labels, &acts, params.w1())?;
            self.optimizer.step(params, features, &acts, &deltas)?;
            if every > 0 && i % every == 0 {
                let c = cost(features, labels, params)?;
                if !c.is_finite() {
                    warn!(iteration = i, cost = c, "cost is not finite");
                }
                sink.record(i, c);
            }
        }
        Ok(TrainingSummary {
            iterations: self.config.max_cycle,
            final_cost: cost(features, labels, params)?,
        })
    }

    /// Initialize from the shapes of `(features, labels)` and train.
    pub fn fit<R: Rng + ?Sized>(
        &mut self,
        features: &Matrix,
        labels: &Matrix,
        rng: &mut R,
        sink: &mut dyn ProgressSink,
    ) -> Result<TrainingSummary> {
        self.initialize(features.ncols(), labels.ncols(), rng)?;
        self.train(features, labels, sink)
    }
}

/// Train a fresh network and hand back its final parameters.
pub fn bp_train<R: Rng + ?Sized>(
    features: &Matrix,
    labels: &Matrix,
    config: &TrainConfig,
    rng: &mut R,
    sink: &mut dyn ProgressSink,
) -> Result<(Parameters, TrainingSummary)> {
    let mut trainer = Trainer::new(config.clone())?;
    let summary = trainer.fit(features, labels, rng, sink)?;
    let params = trainer.into_parameters().ok_or(NetError::InvalidState {
        from: TrainingState::Completed.name(),
        action: "take parameters",
    })?;
    Ok((params, summary))
}

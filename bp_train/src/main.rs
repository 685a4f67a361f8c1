// bp_train/src/main.rs
//! Train and evaluate a backpropagation network on tab-delimited data.
//!
//! ```text
//! bp_train train --data data.txt --hidden 20 --max-cycle 1000 --alpha 0.1 --out model
//! bp_train evaluate --data data.txt --model model
//! bp_train xor
//! ```
use anyhow::{Context, Result};
use bpnet::{
    bp_train, cost_table, err_rate, load_tab_delimited, predict, xor_dataset, CostHistory,
    MinMaxScaler, Network, ProgressSink, TracingProgress, TrainConfig,
};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Single-hidden-layer backpropagation classifier")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train on a tab-delimited file and save the parameters
    Train {
        /// Data file: feature columns followed by an integer label
        #[arg(short, long)]
        data: PathBuf,

        /// Number of hidden units
        #[arg(long, default_value_t = 20)]
        hidden: usize,

        /// Number of gradient-descent cycles
        #[arg(short, long, default_value_t = 1000)]
        max_cycle: usize,

        /// Learning rate
        #[arg(short, long, default_value_t = 0.1)]
        alpha: f64,

        /// Log the cost every N cycles (0 disables)
        #[arg(long, default_value_t = 100)]
        report_every: usize,

        /// Seed for the weight initialization
        #[arg(long)]
        seed: Option<u64>,

        /// Min-max scale features before training
        #[arg(long)]
        normalize: bool,

        /// Directory for the weight_w0/w1/b0/b1, classes and scaler files
        #[arg(short, long, default_value = "model")]
        out: PathBuf,

        /// Also write a gzip JSON bundle (.pere) with labels and scaler
        #[arg(long)]
        bundle: Option<PathBuf>,
    },

    /// Report the error rate of saved parameters on a data file
    Evaluate {
        #[arg(short, long)]
        data: PathBuf,

        /// Directory written by `train --out`
        #[arg(short, long, conflicts_with = "bundle")]
        model: Option<PathBuf>,

        /// Bundle written by `train --bundle`
        #[arg(long)]
        bundle: Option<PathBuf>,
    },

    /// Fit the four XOR points and print the learned outputs
    Xor {
        #[arg(long, default_value_t = 2000)]
        max_cycle: usize,

        #[arg(long, default_value_t = 0.5)]
        alpha: f64,

        #[arg(long)]
        seed: Option<u64>,
    },
}

/// Logs through `tracing` and keeps the samples for the summary table.
struct Recorder {
    history: CostHistory,
}

impl ProgressSink for Recorder {
    fn record(&mut self, iteration: usize, cost: f64) {
        TracingProgress.record(iteration, cost);
        self.history.record(iteration, cost);
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::seed_from_u64(rand::thread_rng().gen()),
    }
}

#[allow(clippy::too_many_arguments)]
fn train(
    data: PathBuf,
    hidden: usize,
    max_cycle: usize,
    alpha: f64,
    report_every: usize,
    seed: Option<u64>,
    normalize: bool,
    out: PathBuf,
    bundle: Option<PathBuf>,
) -> Result<()> {
    let dataset = load_tab_delimited(&data)
        .with_context(|| format!("failed to load {}", data.display()))?;
    info!(
        samples = dataset.n_samples(),
        features = dataset.n_features(),
        classes = dataset.n_classes(),
        "loaded {}",
        data.display()
    );

    let (scaler, features) = if normalize {
        let (s, f) = MinMaxScaler::fit_transform(&dataset.features)?;
        (Some(s), f)
    } else {
        (None, dataset.features.clone())
    };

    let config = TrainConfig::new(hidden, max_cycle, alpha)
        .with_n_output(dataset.n_classes())
        .with_report_every(report_every);
    let mut rng = make_rng(seed);
    let mut recorder = Recorder {
        history: CostHistory::default(),
    };
    let started = std::time::Instant::now();
    let (params, summary) =
        bp_train(&features, &dataset.labels, &config, &mut rng, &mut recorder)?;
    info!(elapsed = ?started.elapsed(), final_cost = summary.final_cost, "training finished");
    if !recorder.history.points.is_empty() {
        println!("{}", cost_table(&recorder.history, "Training Cost"));
    }

    let out_rate = err_rate(&dataset.labels, &predict(&params, &features)?)?;
    println!("Training accuracy: {:.2}%", (1.0 - out_rate) * 100.0);

    let mut net = Network::new(params).with_classes(dataset.classes.clone())?;
    if let Some(s) = scaler {
        net = net.with_scaler(s)?;
    }
    net.save_dir(&out)
        .with_context(|| format!("failed to save to {}", out.display()))?;
    info!("model written to {}", out.display());

    if let Some(path) = bundle {
        net.save_pere(&path)
            .with_context(|| format!("failed to save bundle {}", path.display()))?;
        info!("bundle written to {}", path.display());
    }
    Ok(())
}

fn evaluate(data: PathBuf, model: Option<PathBuf>, bundle: Option<PathBuf>) -> Result<()> {
    let dataset = load_tab_delimited(&data)
        .with_context(|| format!("failed to load {}", data.display()))?;
    let net = match (model, bundle) {
        (_, Some(path)) => Network::load_pere(&path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        (model, None) => {
            let dir = model.unwrap_or_else(|| PathBuf::from("model"));
            Network::load_dir(&dir).with_context(|| format!("failed to load {}", dir.display()))?
        }
    };
    info!("{net}");
    let rate = net.evaluate(&dataset)?;
    println!("Error rate: {:.4} (accuracy {:.2}%)", rate, (1.0 - rate) * 100.0);
    Ok(())
}

fn xor(max_cycle: usize, alpha: f64, seed: Option<u64>) -> Result<()> {
    let data = xor_dataset()?;
    let config = TrainConfig::new(4, max_cycle, alpha).with_report_every(max_cycle.max(10) / 10);
    let mut recorder = Recorder {
        history: CostHistory::default(),
    };
    let mut rng = make_rng(seed);
    let (params, summary) =
        bp_train(&data.features, &data.labels, &config, &mut rng, &mut recorder)?;
    let out = predict(&params, &data.features)?;
    for (x, y) in data.features.rows().into_iter().zip(out.rows()) {
        println!("{:?} -> [{:.4}, {:.4}]", x.to_vec(), y[0], y[1]);
    }
    println!(
        "Final cost: {:.6}, error rate: {:.2}",
        summary.final_cost,
        err_rate(&data.labels, &out)?
    );
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Command::Train {
            data,
            hidden,
            max_cycle,
            alpha,
            report_every,
            seed,
            normalize,
            out,
            bundle,
        } => train(data, hidden, max_cycle, alpha, report_every, seed, normalize, out, bundle),
        Command::Evaluate { data, model, bundle } => evaluate(data, model, bundle),
        Command::Xor {
            max_cycle,
            alpha,
            seed,
        } => xor(max_cycle, alpha, seed),
    }
}

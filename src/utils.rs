//! Small helpers for demos and reports.
use crate::datasets::{one_hot, Dataset};
use crate::error::Result;
use crate::matrix::Matrix;
use crate::training::CostHistory;
use ndarray::array;

/// The four XOR points, class 1 where exactly one input is set.
pub fn xor_dataset() -> Result<Dataset> {
    let features: Matrix = array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
    let labels = one_hot(&[0, 1, 1, 0], 2)?;
    Ok(Dataset {
        features,
        labels,
        classes: vec![0, 1],
    })
}

/// Text table of sampled costs.
pub fn cost_table(history: &CostHistory, title: &str) -> String {
    const RULE: &str = "+------------+--------------+\n";
    let mut out = format!("{title}\n{RULE}| Iteration  | Cost         |\n{RULE}");
    for &(i, c) in &history.points {
        out.push_str(&format!("| {i:>10} | {c:>12.6} |\n"));
    }
    out.push_str(RULE);
    out
}

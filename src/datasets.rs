//! Loader for tab-delimited numeric data.
//!
//! Each non-empty line holds `n` feature values followed by one integer class
//! label in the last column. Distinct labels are sorted and mapped to class
//! indices `0..c`, and the labels are returned one-hot encoded.
use crate::error::{NetError, Result};
use crate::matrix::{argmax_rows, Matrix};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Features, one-hot labels, and the label value behind each class index.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// `m x n`
    pub features: Matrix,
    /// `m x c`, one-hot
    pub labels: Matrix,
    /// `classes[k]` is the raw label encoded by column `k`.
    pub classes: Vec<i64>,
}

impl Dataset {
    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Raw label value for a class index.
    pub fn class_label(&self, index: usize) -> Option<i64> {
        self.classes.get(index).copied()
    }

    /// Class index of every sample.
    pub fn class_indices(&self) -> Vec<usize> {
        argmax_rows(&self.labels)
    }
}

/// One-hot encode class indices into an `m x num_classes` matrix.
pub fn one_hot(indices: &[usize], num_classes: usize) -> Result<Matrix> {
    let mut labels = Matrix::zeros((indices.len(), num_classes));
    for (row, &class) in indices.iter().enumerate() {
        if class >= num_classes {
            return Err(NetError::config(format!(
                "class index {class} outside of {num_classes} classes"
            )));
        }
        labels[[row, class]] = 1.0;
    }
    Ok(labels)
}

fn parse_record(record: &StringRecord, line: usize) -> Result<(Vec<f64>, i64)> {
    if record.len() < 2 {
        return Err(NetError::malformed(
            line,
            format!("expected at least one feature and a label, found {} field(s)", record.len()),
        ));
    }
    let last = record.len() - 1;
    let features = record
        .iter()
        .take(last)
        .map(|field| {
            field
                .parse::<f64>()
                .map_err(|_| {
                    NetError::malformed(line, format!("feature {field:?} is not a number"))
                })
        })
        .collect::<Result<Vec<f64>>>()?;
    let label = record[last].parse::<i64>().map_err(|_| {
        NetError::malformed(line, format!("label {:?} is not an integer", &record[last]))
    })?;
    Ok((features, label))
}

/// Parse tab-delimited rows from any reader.
pub fn from_reader<R: Read>(reader: R) -> Result<Dataset> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(reader);

    let mut rows: Vec<Vec<f64>> = Vec::new();
    let mut raw_labels: Vec<i64> = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let line = record.position().map_or(i + 1, |p| p.line() as usize);
        if record.iter().all(str::is_empty) {
            continue;
        }
        let (features, label) = parse_record(&record, line)?;
        if let Some(first) = rows.first() {
            if features.len() != first.len() {
                return Err(NetError::malformed(
                    line,
                    format!("expected {} features, found {}", first.len(), features.len()),
                ));
            }
        }
        rows.push(features);
        raw_labels.push(label);
    }
    if rows.is_empty() {
        return Err(NetError::malformed(0, "no data rows"));
    }

    let classes: Vec<i64> = raw_labels
        .iter()
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let indices: Vec<usize> = raw_labels
        .iter()
        .map(|label| classes.binary_search(label).unwrap_or_default())
        .collect();
    let labels = one_hot(&indices, classes.len())?;
    let features = crate::matrix::from_rows(&rows)?;
    debug!(
        samples = features.nrows(),
        features = features.ncols(),
        classes = classes.len(),
        "dataset parsed"
    );
    Ok(Dataset {
        features,
        labels,
        classes,
    })
}

/// Load a tab-delimited data file.
pub fn load_tab_delimited<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let file = File::open(path.as_ref())?;
    debug!(path = %path.as_ref().display(), "loading dataset");
    from_reader(file)
}

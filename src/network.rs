//! Trained network: parameters plus what is needed to use them on raw data.
use crate::datasets::Dataset;
use crate::error::{NetError, Result};
use crate::matrix::{argmax_rows, from_rows, Matrix};
use crate::metrics::predict;
use crate::normalize::MinMaxScaler;
use crate::params::Parameters;
use crate::persistence::{
    load_classes, load_matrix, load_parameters, save_classes, save_matrix, save_parameters,
    CLASSES_FILE, SCALER_FILE,
};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::debug;

/// Parameters, the raw label of each output unit, and an optional input scaler.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    params: Parameters,
    classes: Vec<i64>,
    scaler: Option<MinMaxScaler>,
}

impl Network {
    /// Output unit `k` stands for label `k` until [`Network::with_classes`] says otherwise.
    pub fn new(params: Parameters) -> Self {
        let classes = (0..params.n_output() as i64).collect();
        Self {
            params,
            classes,
            scaler: None,
        }
    }

    pub fn with_classes(mut self, classes: Vec<i64>) -> Result<Self> {
        if classes.len() != self.params.n_output() {
            return Err(NetError::config(format!(
                "{} class labels for {} output units",
                classes.len(),
                self.params.n_output()
            )));
        }
        self.classes = classes;
        Ok(self)
    }

    /// Scale raw features with `scaler` before every prediction.
    pub fn with_scaler(mut self, scaler: MinMaxScaler) -> Result<Self> {
        if scaler.n_features() != self.params.n_input() {
            return Err(NetError::config(format!(
                "scaler covers {} features, network expects {}",
                scaler.n_features(),
                self.params.n_input()
            )));
        }
        self.scaler = Some(scaler);
        Ok(self)
    }

    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    pub fn scaler(&self) -> Option<&MinMaxScaler> {
        self.scaler.as_ref()
    }

    fn prepare<'a>(&self, features: &'a Matrix) -> Result<Cow<'a, Matrix>> {
        match &self.scaler {
            Some(scaler) => Ok(Cow::Owned(scaler.transform(features)?)),
            None => Ok(Cow::Borrowed(features)),
        }
    }

    /// Output activations for raw (unscaled) features.
    pub fn predict(&self, features: &Matrix) -> Result<Matrix> {
        let x = self.prepare(features)?;
        predict(&self.params, &x)
    }

    /// Predicted raw label per row.
    pub fn classify(&self, features: &Matrix) -> Result<Vec<i64>> {
        let out = self.predict(features)?;
        Ok(argmax_rows(&out).into_iter().map(|k| self.classes[k]).collect())
    }

    /// Error rate on a labelled dataset, compared by raw label value.
    pub fn evaluate(&self, dataset: &Dataset) -> Result<f64> {
        if dataset.n_samples() == 0 {
            return Err(NetError::config("error rate of an empty set is undefined"));
        }
        let predicted = self.classify(&dataset.features)?;
        let wrong = dataset
            .class_indices()
            .into_iter()
            .zip(predicted)
            .filter(|&(k, p)| dataset.class_label(k) != Some(p))
            .count();
        Ok(wrong as f64 / dataset.n_samples() as f64)
    }

    /// Save as plain-text files in `dir`: the four weight files, the class
    /// labels, and the scaler if there is one.
    pub fn save_dir<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        save_parameters(dir, &self.params)?;
        save_classes(dir.join(CLASSES_FILE), &self.classes)?;
        let scaler_path = dir.join(SCALER_FILE);
        match &self.scaler {
            Some(scaler) => {
                let stored = from_rows(&[scaler.min().to_vec(), scaler.range().to_vec()])?;
                save_matrix(&scaler_path, &stored)?;
            }
            // A scaler left over from an earlier save would be picked up on load.
            None if scaler_path.exists() => std::fs::remove_file(&scaler_path)?,
            None => {}
        }
        debug!(dir = %dir.display(), "network saved");
        Ok(())
    }

    /// Load a network written by [`Network::save_dir`].
    ///
    /// Fails when the class label file is missing, since raw labels could not
    /// be reported.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let params = load_parameters(dir)?;
        let classes_path = dir.join(CLASSES_FILE);
        if !classes_path.is_file() {
            return Err(NetError::config(format!(
                "{} not found, class labels are unknown",
                classes_path.display()
            )));
        }
        let network = Network::new(params).with_classes(load_classes(&classes_path)?)?;
        let scaler_path = dir.join(SCALER_FILE);
        if !scaler_path.is_file() {
            return Ok(network);
        }
        let stored = load_matrix(&scaler_path)?;
        if stored.nrows() != 2 {
            return Err(NetError::ShapeMismatch {
                op: "scaler",
                left: stored.dim(),
                right: (2, network.params.n_input()),
            });
        }
        let scaler = MinMaxScaler::from_parts(stored.row(0).to_vec(), stored.row(1).to_vec())?;
        network.with_scaler(scaler)
    }

    /// Save as gzip-compressed JSON (`.pere`).
    pub fn save_pere<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let dto = NetworkDto::from_network(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        let mut enc = GzEncoder::new(BufWriter::new(file), Compression::default());
        serde_json::to_writer(&mut enc, &dto)?;
        enc.finish()?.flush()?;
        debug!(path = %path.display(), "network saved");
        Ok(())
    }

    /// Load a network written by [`Network::save_pere`].
    pub fn load_pere<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut dec = GzDecoder::new(BufReader::new(file));
        let mut buf = Vec::new();
        dec.read_to_end(&mut buf)?;
        let dto: NetworkDto = serde_json::from_slice(&buf)?;
        let network = dto.into_network()?;
        debug!(path = %path.display(), params = %network.params, "network loaded");
        Ok(network)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, classes {:?}", self.params, self.classes)?;
        if self.scaler.is_some() {
            write!(f, ", min-max scaled input")?;
        }
        Ok(())
    }
}

// ============ Persistence DTOs ============

#[derive(Debug, Serialize, Deserialize)]
struct MatrixDto {
    rows: usize,
    cols: usize,
    data: Vec<f64>, // row-major
}

impl MatrixDto {
    fn from_matrix(name: &str, m: &Matrix) -> Result<Self> {
        if m.iter().any(|v| !v.is_finite()) {
            return Err(NetError::config(format!("{name} contains non-finite values")));
        }
        Ok(Self {
            rows: m.nrows(),
            cols: m.ncols(),
            data: m.iter().copied().collect(),
        })
    }

    fn into_matrix(self) -> Result<Matrix> {
        let (rows, cols) = (self.rows, self.cols);
        let len = self.data.len();
        Array2::from_shape_vec((rows, cols), self.data).map_err(|_| NetError::ShapeMismatch {
            op: "load_matrix",
            left: (rows, cols),
            right: (1, len),
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct NetworkDto {
    w0: MatrixDto,
    b0: MatrixDto,
    w1: MatrixDto,
    b1: MatrixDto,
    classes: Vec<i64>,
    scaler: Option<MinMaxScaler>,
}

impl NetworkDto {
    fn from_network(net: &Network) -> Result<Self> {
        let p = &net.params;
        Ok(Self {
            w0: MatrixDto::from_matrix("w0", p.w0())?,
            b0: MatrixDto::from_matrix("b0", p.b0())?,
            w1: MatrixDto::from_matrix("w1", p.w1())?,
            b1: MatrixDto::from_matrix("b1", p.b1())?,
            classes: net.classes.clone(),
            scaler: net.scaler.clone(),
        })
    }

    fn into_network(self) -> Result<Network> {
        let params = Parameters::from_parts(
            self.w0.into_matrix()?,
            self.b0.into_matrix()?,
            self.w1.into_matrix()?,
            self.b1.into_matrix()?,
        )?;
        let network = Network::new(params).with_classes(self.classes)?;
        match self.scaler {
            Some(scaler) => network.with_scaler(scaler),
            None => Ok(network),
        }
    }
}

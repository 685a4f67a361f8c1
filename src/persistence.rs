//! Plain-text storage for parameter matrices and class labels.
//!
//! A matrix is written as one line per row with tab-separated values. Values use
//! the shortest decimal form that parses back to the same `f64`.
use crate::error::{NetError, Result};
use crate::matrix::{from_rows, Matrix};
use crate::params::Parameters;
use csv::{ReaderBuilder, Terminator, Trim, WriterBuilder};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::debug;

/// File names used by [`save_parameters`] and [`load_parameters`].
pub const W0_FILE: &str = "weight_w0";
pub const W1_FILE: &str = "weight_w1";
pub const B0_FILE: &str = "weight_b0";
pub const B1_FILE: &str = "weight_b1";
/// Raw label behind each output unit, one tab-separated line.
pub const CLASSES_FILE: &str = "classes";
/// Min-max scaler as a two-row matrix: column minimums, then ranges.
pub const SCALER_FILE: &str = "scaler";

fn tab_writer<W: Write>(writer: W) -> csv::Writer<W> {
    WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer)
}

fn tab_reader<R: Read>(reader: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader)
}

pub fn write_matrix<W: Write>(writer: W, m: &Matrix) -> Result<()> {
    let mut wtr = tab_writer(writer);
    for row in m.rows() {
        wtr.write_record(row.iter().map(|v| v.to_string()))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn read_matrix<R: Read>(reader: R) -> Result<Matrix> {
    let mut rdr = tab_reader(reader);
    let mut rows: Vec<Vec<f64>> = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let line = record.position().map_or(i + 1, |p| p.line() as usize);
        let row = record
            .iter()
            .map(|field| {
                field
                    .parse::<f64>()
                    .map_err(|_| NetError::malformed(line, format!("{field:?} is not a number")))
            })
            .collect::<Result<Vec<f64>>>()?;
        if let Some(first) = rows.first() {
            if row.len() != first.len() {
                return Err(NetError::malformed(
                    line,
                    format!("expected {} values, found {}", first.len(), row.len()),
                ));
            }
        }
        rows.push(row);
    }
    from_rows(&rows)
}

pub fn save_matrix<P: AsRef<Path>>(path: P, m: &Matrix) -> Result<()> {
    let file = File::create(path.as_ref())?;
    write_matrix(BufWriter::new(file), m)
}

pub fn load_matrix<P: AsRef<Path>>(path: P) -> Result<Matrix> {
    let file = File::open(path.as_ref())?;
    read_matrix(BufReader::new(file))
}

pub fn save_classes<P: AsRef<Path>>(path: P, classes: &[i64]) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut wtr = tab_writer(BufWriter::new(file));
    wtr.write_record(classes.iter().map(|c| c.to_string()))?;
    wtr.flush()?;
    Ok(())
}

pub fn load_classes<P: AsRef<Path>>(path: P) -> Result<Vec<i64>> {
    let file = File::open(path.as_ref())?;
    let mut rdr = tab_reader(BufReader::new(file));
    let record = match rdr.records().next() {
        Some(record) => record?,
        None => return Err(NetError::malformed(1, "no class labels")),
    };
    record
        .iter()
        .map(|field| {
            field
                .parse::<i64>()
                .map_err(|_| NetError::malformed(1, format!("{field:?} is not an integer label")))
        })
        .collect()
}

/// Write the four matrices into `dir`, creating it if needed.
pub fn save_parameters<P: AsRef<Path>>(dir: P, params: &Parameters) -> Result<()> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    save_matrix(dir.join(W0_FILE), params.w0())?;
    save_matrix(dir.join(W1_FILE), params.w1())?;
    save_matrix(dir.join(B0_FILE), params.b0())?;
    save_matrix(dir.join(B1_FILE), params.b1())?;
    debug!(dir = %dir.display(), "parameters saved");
    Ok(())
}

/// Read the four matrices written by [`save_parameters`] and check their shapes.
pub fn load_parameters<P: AsRef<Path>>(dir: P) -> Result<Parameters> {
    let dir = dir.as_ref();
    let w0 = load_matrix(dir.join(W0_FILE))?;
    let w1 = load_matrix(dir.join(W1_FILE))?;
    let b0 = load_matrix(dir.join(B0_FILE))?;
    let b1 = load_matrix(dir.join(B1_FILE))?;
    let params = Parameters::from_parts(w0, b0, w1, b1)?;
    debug!(dir = %dir.display(), %params, "parameters loaded");
    Ok(params)
}

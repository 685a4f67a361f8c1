//! Prediction and classification metrics.
use crate::error::{NetError, Result};
use crate::matrix::{argmax_rows, Matrix};
use crate::params::Parameters;
use crate::propagation::forward;

/// Output-layer activations for every row of `features`.
pub fn predict(params: &Parameters, features: &Matrix) -> Result<Matrix> {
    Ok(forward(features, params)?.output_out)
}

/// Predicted class index per row (argmax over the class axis).
pub fn classify(params: &Parameters, features: &Matrix) -> Result<Vec<usize>> {
    Ok(argmax_rows(&predict(params, features)?))
}

fn check_rows(labels: &Matrix, predictions: &Matrix) -> Result<usize> {
    if labels.nrows() != predictions.nrows() {
        return Err(NetError::ShapeMismatch {
            op: "err_rate",
            left: labels.dim(),
            right: predictions.dim(),
        });
    }
    if labels.nrows() == 0 {
        return Err(NetError::config("error rate of an empty set is undefined"));
    }
    Ok(labels.nrows())
}

/// Fraction of rows whose argmax differs between `labels` and `predictions`.
pub fn err_rate(labels: &Matrix, predictions: &Matrix) -> Result<f64> {
    let m = check_rows(labels, predictions)?;
    let wrong = argmax_rows(labels)
        .into_iter()
        .zip(argmax_rows(predictions))
        .filter(|(t, p)| t != p)
        .count();
    Ok(wrong as f64 / m as f64)
}

/// Accuracy
pub fn accuracy(labels: &Matrix, predictions: &Matrix) -> Result<f64> {
    Ok(1.0 - err_rate(labels, predictions)?)
}

/// Confusion counts indexed `[true][predicted]`.
pub fn confusion_matrix(
    labels: &Matrix,
    predictions: &Matrix,
    num_classes: usize,
) -> Result<Vec<Vec<usize>>> {
    check_rows(labels, predictions)?;
    let mut cm = vec![vec![0; num_classes]; num_classes];
    for (t, p) in argmax_rows(labels).into_iter().zip(argmax_rows(predictions)) {
        if t >= num_classes || p >= num_classes {
            return Err(NetError::config(format!(
                "class index {} outside of {num_classes} classes",
                t.max(p)
            )));
        }
        cm[t][p] += 1;
    }
    Ok(cm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn err_rate_zero_on_matching_argmax() {
        let labels = array![[1.0, 0.0, 0.0], [0.0, 0.0, 1.0]];
        let predictions = array![[0.6, 0.3, 0.1], [0.2, 0.3, 0.9]];
        assert_eq!(err_rate(&labels, &predictions).unwrap(), 0.0);
        assert_eq!(accuracy(&labels, &predictions).unwrap(), 1.0);
    }

    #[test]
    fn err_rate_one_when_every_row_differs() {
        let labels = array![[1.0, 0.0], [0.0, 1.0], [1.0, 0.0]];
        let predictions = array![[0.1, 0.9], [0.8, 0.2], [0.3, 0.7]];
        assert_eq!(err_rate(&labels, &predictions).unwrap(), 1.0);
    }

    #[test]
    fn err_rate_counts_partial_misses() {
        let labels = array![[1.0, 0.0], [0.0, 1.0], [1.0, 0.0], [0.0, 1.0]];
        let predictions = array![[0.9, 0.1], [0.4, 0.6], [0.2, 0.8], [0.3, 0.7]];
        assert_eq!(err_rate(&labels, &predictions).unwrap(), 0.25);
    }

    #[test]
    fn err_rate_rejects_row_mismatch_and_empty_sets() {
        let labels = array![[1.0, 0.0]];
        assert!(err_rate(&labels, &array![[0.5, 0.5], [0.1, 0.9]]).is_err());
        assert!(err_rate(&Matrix::zeros((0, 2)), &Matrix::zeros((0, 2))).is_err());
    }

    #[test]
    fn confusion_counts_pairs() {
        let labels = array![[1.0, 0.0], [0.0, 1.0], [0.0, 1.0]];
        let predictions = array![[0.9, 0.1], [0.7, 0.3], [0.2, 0.8]];
        let cm = confusion_matrix(&labels, &predictions, 2).unwrap();
        assert_eq!(cm, vec![vec![1, 0], vec![1, 1]]);
        assert!(confusion_matrix(&labels, &predictions, 1).is_err());
    }

    #[test]
    fn classify_uses_output_argmax() {
        let params = Parameters::from_parts(
            array![[1.0]],
            array![[0.0]],
            array![[4.0, -4.0]],
            array![[0.0, 0.0]],
        )
        .unwrap();
        let features = array![[2.0], [-3.0]];
        // Hidden output is always positive, so class 0 always wins here.
        assert_eq!(classify(&params, &features).unwrap(), vec![0, 0]);
        assert_eq!(predict(&params, &features).unwrap().dim(), (2, 2));
    }
}

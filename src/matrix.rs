//! Dense matrix helpers with explicit shape checks.
//!
//! `ndarray` panics on incompatible operands; every helper here checks first
//! and reports a [`NetError::ShapeMismatch`] naming the operation instead.
use crate::error::{NetError, Result};
use ndarray::{Array2, Axis};

/// Row-major dense matrix of `f64`.
pub type Matrix = Array2<f64>;

/// `(rows, cols)` of a matrix.
pub fn dims(m: &Matrix) -> (usize, usize) {
    m.dim()
}

/// Build a matrix from equally sized rows.
///
/// An empty slice yields a `0 x 0` matrix.
pub fn from_rows(rows: &[Vec<f64>]) -> Result<Matrix> {
    let n_cols = rows.first().map_or(0, Vec::len);
    let mut data = Vec::with_capacity(rows.len() * n_cols);
    for row in rows {
        if row.len() != n_cols {
            return Err(NetError::ShapeMismatch {
                op: "from_rows",
                left: (1, row.len()),
                right: (1, n_cols),
            });
        }
        data.extend_from_slice(row);
    }
    Array2::from_shape_vec((rows.len(), n_cols), data).map_err(|_| NetError::ShapeMismatch {
        op: "from_rows",
        left: (rows.len(), n_cols),
        right: (rows.len(), n_cols),
    })
}

/// Matrix product `a · b`.
pub fn checked_dot(op: &'static str, a: &Matrix, b: &Matrix) -> Result<Matrix> {
    if a.ncols() != b.nrows() {
        return Err(NetError::ShapeMismatch {
            op,
            left: a.dim(),
            right: b.dim(),
        });
    }
    Ok(a.dot(b))
}

/// Add a `1 x c` bias row to every row of an `m x c` matrix.
pub fn add_bias(op: &'static str, m: Matrix, bias: &Matrix) -> Result<Matrix> {
    if bias.nrows() != 1 || bias.ncols() != m.ncols() {
        return Err(NetError::ShapeMismatch {
            op,
            left: m.dim(),
            right: bias.dim(),
        });
    }
    let mut out = m;
    out += &bias.row(0);
    Ok(out)
}

/// Fail unless both operands have identical dimensions.
pub fn ensure_same_shape(op: &'static str, a: &Matrix, b: &Matrix) -> Result<()> {
    if a.dim() != b.dim() {
        return Err(NetError::ShapeMismatch {
            op,
            left: a.dim(),
            right: b.dim(),
        });
    }
    Ok(())
}

/// Column-wise mean as a `1 x c` row.
pub fn column_mean(m: &Matrix) -> Result<Matrix> {
    m.mean_axis(Axis(0))
        .map(|mean| mean.insert_axis(Axis(0)))
        .ok_or_else(|| NetError::config("column mean of a matrix with no rows"))
}

/// Index of the largest value in each row; ties go to the lowest index.
pub fn argmax_rows(m: &Matrix) -> Vec<usize> {
    m.rows()
        .into_iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .fold(0usize, |best, (i, &v)| if v > row[best] { i } else { best })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn from_rows_rejects_ragged_input() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(matches!(
            from_rows(&rows),
            Err(NetError::ShapeMismatch { op: "from_rows", .. })
        ));
    }

    #[test]
    fn from_rows_keeps_row_major_order() {
        let m = from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(m, array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
    }

    #[test]
    fn dot_checks_inner_dimension() {
        let a = Matrix::zeros((4, 3));
        let b = Matrix::zeros((2, 5));
        let err = checked_dot("test", &a, &b).unwrap_err();
        assert!(matches!(
            err,
            NetError::ShapeMismatch {
                left: (4, 3),
                right: (2, 5),
                ..
            }
        ));
        assert_eq!(checked_dot("test", &a, &Matrix::zeros((3, 5))).unwrap().dim(), (4, 5));
    }

    #[test]
    fn bias_is_broadcast_to_every_row() {
        let m = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let out = add_bias("test", m, &array![[10.0, 20.0]]).unwrap();
        assert_eq!(out, array![[11.0, 22.0], [13.0, 24.0], [15.0, 26.0]]);
    }

    #[test]
    fn bias_must_be_a_single_matching_row() {
        let m = Matrix::zeros((3, 2));
        assert!(add_bias("test", m.clone(), &Matrix::zeros((1, 3))).is_err());
        assert!(add_bias("test", m, &Matrix::zeros((2, 2))).is_err());
    }

    #[test]
    fn column_mean_of_empty_matrix_fails() {
        assert!(column_mean(&Matrix::zeros((0, 3))).is_err());
        let mean = column_mean(&array![[1.0, 4.0], [3.0, 8.0]]).unwrap();
        assert_eq!(mean, array![[2.0, 6.0]]);
    }

    #[test]
    fn argmax_prefers_first_on_ties() {
        let m = array![[0.2, 0.7, 0.1], [0.5, 0.5, 0.0], [0.0, 0.1, 0.9]];
        assert_eq!(argmax_rows(&m), vec![1, 0, 2]);
    }
}

//! Pairwise distance matrices between leaves.
//!
//! A [DistanceMatrix] is built either from a tree
//! ([distance_matrix](crate::distance::distance_matrix)) or from PHYLIP text
//! ([parse_phylip]). It can be written back with [to_phylip].

pub mod phylip;

pub use phylip::{PhylipShape, parse_phylip, to_phylip, to_phylip_lower};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

// =#========================================================================#=
// MATRIX FORMAT ERROR
// =#========================================================================#=
/// Errors from reading PHYLIP text or assembling a [DistanceMatrix].
///
/// Row indices are 0-based and count data rows (the header is not a row).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatrixFormatError {
    /// First line is not a number of taxa
    #[error("Invalid header '{0}', expected the number of taxa")]
    HeaderInvalid(String),
    /// Fewer data lines than announced by the header
    #[error("Truncated matrix: expected {expected} rows but found {found}")]
    Truncated { expected: usize, found: usize },
    /// A row with the wrong number of values for the detected format
    #[error("Row {row} has {found} values, expected {expected}")]
    RowLengthMismatch { row: usize, expected: usize, found: usize },
    /// First row is neither square (`n` values) nor lower-triangular (1 value)
    #[error("Unrecognized matrix format: first row has {found} values")]
    UnrecognizedFormat { found: usize },
    /// A value that does not parse as a number
    #[error("Row {row}: '{token}' is not a number")]
    InvalidNumber { row: usize, token: String },
    /// Number of rows does not match the number of labels
    #[error("Matrix has {found} rows for {expected} labels")]
    DimensionMismatch { expected: usize, found: usize },
    /// A label already used by an earlier row
    #[error("Row {row}: duplicate label '{label}'")]
    DuplicateLabel { row: usize, label: String },
}

// =#========================================================================#=
// DISTANCE MATRIX
// =#========================================================================#=
/// Square matrix of pairwise distances between labelled taxa.
///
/// # Invariants
/// - `labels` and `matrix` have the same length `n`
/// - every row has `n` values
/// - labels are unique
///
/// Matrices computed from a tree are additionally symmetric with a zero
/// diagonal; matrices read from square PHYLIP text are kept verbatim.
///
/// # Example
/// ```
/// use nhxtree::matrix::DistanceMatrix;
///
/// let matrix = DistanceMatrix::new(
///     vec!["A".to_string(), "B".to_string()],
///     vec![vec![0.0, 0.3], vec![0.3, 0.0]],
/// ).unwrap();
/// assert_eq!(matrix.distance("A", "B"), Some(0.3));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MatrixParts")]
pub struct DistanceMatrix {
    labels: Vec<String>,
    matrix: Vec<Vec<f64>>,
    n: usize,
}

/// Unchecked fields, validated through [DistanceMatrix::new] on deserialization.
#[derive(Deserialize)]
struct MatrixParts {
    labels: Vec<String>,
    matrix: Vec<Vec<f64>>,
}

impl TryFrom<MatrixParts> for DistanceMatrix {
    type Error = MatrixFormatError;

    fn try_from(parts: MatrixParts) -> Result<Self, Self::Error> {
        DistanceMatrix::new(parts.labels, parts.matrix)
    }
}

impl DistanceMatrix {
    /// Creates a distance matrix, checking that it is square, matches the labels
    /// and that no label repeats.
    ///
    /// # Errors
    /// * [MatrixFormatError::DimensionMismatch] if the number of rows differs from the number of labels
    /// * [MatrixFormatError::RowLengthMismatch] for the first row of wrong length
    /// * [MatrixFormatError::DuplicateLabel] for the first label seen twice
    pub fn new(labels: Vec<String>, matrix: Vec<Vec<f64>>) -> Result<Self, MatrixFormatError> {
        let n = labels.len();
        if matrix.len() != n {
            return Err(MatrixFormatError::DimensionMismatch { expected: n, found: matrix.len() });
        }
        if let Some((row, values)) = matrix.iter().enumerate().find(|(_, values)| values.len() != n) {
            return Err(MatrixFormatError::RowLengthMismatch { row, expected: n, found: values.len() });
        }
        let mut seen = HashSet::with_capacity(n);
        if let Some((row, label)) = labels.iter().enumerate().find(|&(_, label)| !seen.insert(label.as_str())) {
            return Err(MatrixFormatError::DuplicateLabel { row, label: label.clone() });
        }

        Ok(DistanceMatrix { labels, matrix, n })
    }

    /// Creates an all-zero matrix for the given labels.
    pub fn zeros(labels: Vec<String>) -> Self {
        let n = labels.len();
        DistanceMatrix { labels, matrix: vec![vec![0.0; n]; n], n }
    }

    /// Returns the number of taxa.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Returns `true` if the matrix has no taxa.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Returns the taxon labels, in row order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Returns the rows of the matrix.
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.matrix
    }

    /// Returns the distance between the taxa at rows `i` and `j`.
    ///
    /// # Panics
    /// Panics if `i` or `j` is out of bounds.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.matrix[i][j]
    }

    /// Returns the row of the taxon with the given label.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Returns the distance between two taxa by label.
    pub fn distance(&self, a: &str, b: &str) -> Option<f64> {
        Some(self.matrix[self.index_of(a)?][self.index_of(b)?])
    }

    /// Returns whether `matrix[i][j]` and `matrix[j][i]` differ by at most `epsilon`
    /// for all pairs and the diagonal is within `epsilon` of zero.
    pub fn is_symmetric(&self, epsilon: f64) -> bool {
        (0..self.n).all(|i| {
            self.matrix[i][i].abs() <= epsilon
                && (0..i).all(|j| (self.matrix[i][j] - self.matrix[j][i]).abs() <= epsilon)
        })
    }

    /// Returns the square PHYLIP representation of this matrix.
    pub fn to_phylip(&self) -> String {
        to_phylip(&self.labels, &self.matrix)
    }

    /// Consumes the matrix and returns labels and rows.
    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<f64>>) {
        (self.labels, self.matrix)
    }

    /// Wraps rows known to form an `n x n` matrix for `n` labels.
    pub(crate) fn from_square(labels: Vec<String>, matrix: Vec<Vec<f64>>) -> Self {
        let n = labels.len();
        DistanceMatrix { labels, matrix, n }
    }

    pub(crate) fn set_symmetric(&mut self, i: usize, j: usize, value: f64) {
        self.matrix[i][j] = value;
        self.matrix[j][i] = value;
    }
}

//! PHYLIP distance matrix text format.
//!
//! The first line holds the number of taxa `n`, followed by `n` rows.
//! Each row starts with a label field of 10 characters, followed by
//! whitespace-separated distances. Two shapes are understood:
//!
//! * square: every row holds all `n` distances
//!
//!   ```text
//!   3
//!   Kea       0.00000 0.30000 0.50000
//!   Kaka      0.30000 0.00000 0.40000
//!   Kakapo    0.50000 0.40000 0.00000
//!   ```
//!
//! * lower triangular: row `i` holds the distances to taxa `0..=i`
//!
//!   ```text
//!   3
//!   Kea       0
//!   Kaka      0.3 0
//!   Kakapo    0.5 0.4 0
//!   ```
//!
//! The shape is detected from the number of values in the first row.

use crate::matrix::{DistanceMatrix, MatrixFormatError};
use tracing::{debug, instrument};

/// Width of the label field at the start of each row
pub const LABEL_WIDTH: usize = 10;

/// Number of decimals written per distance
pub const DECIMALS: usize = 5;

/// Layout of the rows of a PHYLIP matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhylipShape {
    /// Every row holds `n` values
    Square,
    /// Row `i` holds `i + 1` values, columns `0..=i`
    LowerTriangular,
}

impl PhylipShape {
    /// Number of values expected in `row` of an `n`-taxa matrix of this shape.
    pub fn row_len(&self, row: usize, n: usize) -> usize {
        match self {
            PhylipShape::Square => n,
            PhylipShape::LowerTriangular => row + 1,
        }
    }
}

// ============================================================================
// Reading (pub)
// ============================================================================
/// Parses a PHYLIP distance matrix in square or lower-triangular shape.
///
/// Blank lines are ignored. Lower-triangular input is mirrored into a full
/// symmetric matrix; square input is taken verbatim.
///
/// # Errors
/// * [MatrixFormatError::HeaderInvalid] - first line is not a taxon count
/// * [MatrixFormatError::Truncated] - fewer than `n` rows (checked before parsing rows)
/// * [MatrixFormatError::InvalidNumber] - a value does not parse
/// * [MatrixFormatError::UnrecognizedFormat] - first row has neither `n` nor 1 values
/// * [MatrixFormatError::RowLengthMismatch] - a later row does not match the shape
/// * [MatrixFormatError::DuplicateLabel] - two rows share a label, including labels
///   that only collide after truncation to the 10-character field
///
/// # Example
/// ```
/// use nhxtree::matrix::parse_phylip;
///
/// let matrix = parse_phylip("2\nA         0 1.5\nB         1.5 0\n").unwrap();
/// assert_eq!(matrix.distance("A", "B"), Some(1.5));
/// ```
#[instrument(level = "trace", skip_all)]
pub fn parse_phylip(text: &str) -> Result<DistanceMatrix, MatrixFormatError> {
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());

    let header = lines.next().unwrap_or("").trim();
    let n: usize = header
        .parse()
        .map_err(|_| MatrixFormatError::HeaderInvalid(header.to_string()))?;

    let rows: Vec<&str> = lines.take(n).collect();
    if rows.len() < n {
        return Err(MatrixFormatError::Truncated { expected: n, found: rows.len() });
    }
    if n == 0 {
        return Ok(DistanceMatrix::zeros(Vec::new()));
    }

    let mut labels = Vec::with_capacity(n);
    let mut matrix = vec![vec![0.0; n]; n];
    let mut detected = None;

    for (row, line) in rows.iter().enumerate() {
        let (label, values) = split_row(row, line)?;

        // First row decides the shape
        let shape = match detected {
            Some(shape) => shape,
            None => *detected.insert(detect_shape(values.len(), n)?),
        };
        let expected = shape.row_len(row, n);
        if values.len() != expected {
            return Err(MatrixFormatError::RowLengthMismatch { row, expected, found: values.len() });
        }

        match shape {
            PhylipShape::Square => matrix[row] = values,
            PhylipShape::LowerTriangular => {
                for (col, value) in values.into_iter().enumerate() {
                    matrix[row][col] = value;
                    matrix[col][row] = value;
                }
            }
        }
        labels.push(label);
    }

    debug!(taxa = n, shape = ?detected, "parsed PHYLIP matrix");
    DistanceMatrix::new(labels, matrix)
}

/// Shape implied by the number of values in the first row.
fn detect_shape(num_values: usize, n: usize) -> Result<PhylipShape, MatrixFormatError> {
    if num_values == n {
        Ok(PhylipShape::Square)
    } else if num_values == 1 {
        Ok(PhylipShape::LowerTriangular)
    } else {
        Err(MatrixFormatError::UnrecognizedFormat { found: num_values })
    }
}

/// Splits a row into its trimmed label field and parsed values.
fn split_row(row: usize, line: &str) -> Result<(String, Vec<f64>), MatrixFormatError> {
    let split = line
        .char_indices()
        .nth(LABEL_WIDTH)
        .map_or(line.len(), |(offset, _)| offset);
    let (label, values) = line.split_at(split);

    let values = values
        .split_whitespace()
        .map(|token| {
            token.parse::<f64>().map_err(|_| MatrixFormatError::InvalidNumber {
                row,
                token: token.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok((label.trim().to_string(), values))
}

// ============================================================================
// Writing (pub)
// ============================================================================
/// Writes a square PHYLIP matrix.
///
/// Labels are left-aligned in a 10-character field (longer labels are
/// truncated), followed by the row's values with 5 decimals, separated by
/// single spaces.
///
/// # Example
/// ```
/// use nhxtree::matrix::to_phylip;
///
/// let text = to_phylip(&["A", "B"], &[vec![0.0, 0.3], vec![0.3, 0.0]]);
/// assert_eq!(text, "2\nA         0.00000 0.30000\nB         0.30000 0.00000\n");
/// ```
pub fn to_phylip<S: AsRef<str>>(labels: &[S], matrix: &[Vec<f64>]) -> String {
    write_rows(labels, matrix, PhylipShape::Square)
}

/// Writes a lower-triangular PHYLIP matrix (row `i` holds columns `0..=i`).
pub fn to_phylip_lower<S: AsRef<str>>(labels: &[S], matrix: &[Vec<f64>]) -> String {
    write_rows(labels, matrix, PhylipShape::LowerTriangular)
}

fn write_rows<S: AsRef<str>>(labels: &[S], matrix: &[Vec<f64>], shape: PhylipShape) -> String {
    let n = labels.len();
    // Estimate: label field plus "0.00000 " per value
    let mut text = String::with_capacity(8 + n * (LABEL_WIDTH + 1 + n * (DECIMALS + 4)));
    text.push_str(&n.to_string());
    text.push('\n');

    for (row, (label, values)) in labels.iter().zip(matrix).enumerate() {
        let field: String = label.as_ref().chars().take(LABEL_WIDTH).collect();
        let num_values = shape.row_len(row, n).min(values.len());
        let values: Vec<String> = values[..num_values]
            .iter()
            .map(|value| format!("{value:.DECIMALS$}"))
            .collect();

        text.push_str(&format!("{field:<LABEL_WIDTH$}{}\n", values.join(" ")));
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_row_label_field() {
        let (label, values) = split_row(0, "Tui       0 1 2").unwrap();
        assert_eq!(label, "Tui");
        assert_eq!(values, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_split_row_label_with_space() {
        let (label, values) = split_row(0, "Bell bird 0.5").unwrap();
        assert_eq!(label, "Bell bird");
        assert_eq!(values, vec![0.5]);
    }

    #[test]
    fn test_split_row_full_width_label() {
        let (label, values) = split_row(0, "Pohutukawa0.25 1").unwrap();
        assert_eq!(label, "Pohutukawa");
        assert_eq!(values, vec![0.25, 1.0]);
    }

    #[test]
    fn test_split_row_short_line() {
        let (label, values) = split_row(3, "Ruru").unwrap();
        assert_eq!(label, "Ruru");
        assert!(values.is_empty());
    }

    #[test]
    fn test_split_row_invalid_number() {
        let err = split_row(2, "Weka      0 x").unwrap_err();
        assert_eq!(err, MatrixFormatError::InvalidNumber { row: 2, token: "x".to_string() });
    }

    #[test]
    fn test_detect_shape() {
        assert_eq!(detect_shape(4, 4).unwrap(), PhylipShape::Square);
        assert_eq!(detect_shape(1, 4).unwrap(), PhylipShape::LowerTriangular);
        assert_eq!(detect_shape(1, 1).unwrap(), PhylipShape::Square);
        assert_eq!(detect_shape(2, 4).unwrap_err(), MatrixFormatError::UnrecognizedFormat { found: 2 });
    }
}

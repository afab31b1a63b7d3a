mod common;

use common::{EPSILON, assert_close};
use nhxtree::matrix::{DistanceMatrix, MatrixFormatError, parse_phylip, to_phylip, to_phylip_lower};
use nhxtree::{distance_matrix, parse_newick_str, parse_phylip_str};
use rstest::rstest;

const SQUARE: &str = "\
3
Kea       0.0 0.3 0.5
Kaka      0.3 0.0 0.4
Kakapo    0.5 0.4 0.0
";

const LOWER: &str = "\
3
Kea       0
Kaka      0.3 0
Kakapo    0.5 0.4 0
";

fn assert_matrices_close(actual: &DistanceMatrix, expected: &DistanceMatrix) {
    assert_eq!(actual.labels(), expected.labels());
    for i in 0..expected.n() {
        for j in 0..expected.n() {
            assert!(
                (actual.get(i, j) - expected.get(i, j)).abs() <= 1e-5,
                "({i}, {j}): {} vs {}",
                actual.get(i, j),
                expected.get(i, j)
            );
        }
    }
}

#[test]
fn test_parse_square() {
    let matrix = parse_phylip(SQUARE).unwrap();

    assert_eq!(matrix.n(), 3);
    assert_eq!(matrix.labels(), &["Kea", "Kaka", "Kakapo"]);
    assert_close(matrix.distance("Kea", "Kakapo").unwrap(), 0.5);
    assert_close(matrix.get(1, 2), 0.4);
    assert!(matrix.is_symmetric(EPSILON));
}

#[test]
fn test_square_and_lower_parse_equal() {
    let square = parse_phylip(SQUARE).unwrap();
    let lower = parse_phylip(LOWER).unwrap();
    assert_eq!(square, lower);
}

#[test]
fn test_blank_lines_ignored() {
    let text = "\n  3\n\nKea       0\n\nKaka      0.3 0\n   \nKakapo    0.5 0.4 0\n\n";
    assert_eq!(parse_phylip(text).unwrap(), parse_phylip(LOWER).unwrap());
}

#[test]
fn test_labels_with_spaces_and_full_width() {
    let text = "2\nNorth kiwi0 1.5\nRowi      1.5 0\n";
    let matrix = parse_phylip_str(text).unwrap();
    assert_eq!(matrix.labels(), &["North kiwi", "Rowi"]);
    assert_close(matrix.get(0, 1), 1.5);
}

#[test]
fn test_square_kept_verbatim() {
    let text = "2\nA         0 1\nB         2 0\n";
    let matrix = parse_phylip(text).unwrap();

    assert_eq!(matrix.get(0, 1), 1.0);
    assert_eq!(matrix.get(1, 0), 2.0);
    assert!(!matrix.is_symmetric(EPSILON));
}

#[test]
fn test_empty_matrix() {
    let matrix = parse_phylip("0\n").unwrap();
    assert!(matrix.is_empty());
    assert_eq!(matrix.to_phylip(), "0\n");
}

#[test]
fn test_single_taxon() {
    let matrix = parse_phylip("1\nHihi      0\n").unwrap();
    assert_eq!(matrix.n(), 1);
    assert_eq!(matrix.labels(), &["Hihi"]);
}

#[test]
fn test_extra_lines_ignored() {
    let text = format!("{SQUARE}Trailing  not part of the matrix\n");
    assert_eq!(parse_phylip(&text).unwrap().n(), 3);
}

#[rstest]
#[case("", MatrixFormatError::HeaderInvalid(String::new()))]
#[case("three\nA 0\n", MatrixFormatError::HeaderInvalid("three".to_string()))]
#[case("-1\n", MatrixFormatError::HeaderInvalid("-1".to_string()))]
#[case("3\nA         0\nB         1 0\n", MatrixFormatError::Truncated { expected: 3, found: 2 })]
#[case("3\nA         x y z\n", MatrixFormatError::Truncated { expected: 3, found: 1 })]
#[case("2\nA         0 abc\nB         1 0\n", MatrixFormatError::InvalidNumber { row: 0, token: "abc".to_string() })]
#[case("3\nA         0 1\nB         1 0\nC         1 1\n", MatrixFormatError::UnrecognizedFormat { found: 2 })]
#[case("3\nA         0 1 2\nB         1 0\nC         2 1 0\n", MatrixFormatError::RowLengthMismatch { row: 1, expected: 3, found: 2 })]
#[case("3\nA         0\nB         1 0\nC         2 0\n", MatrixFormatError::RowLengthMismatch { row: 2, expected: 3, found: 2 })]
#[case("2\nA         \nB         1 0\n", MatrixFormatError::UnrecognizedFormat { found: 0 })]
#[case("2\nA         0 1\nA         1 0\n", MatrixFormatError::DuplicateLabel { row: 1, label: "A".to_string() })]
#[case("3\nKea       0\nKaka      0.3 0\nKea       0.5 0.4 0\n", MatrixFormatError::DuplicateLabel { row: 2, label: "Kea".to_string() })]
fn test_malformed(#[case] text: &str, #[case] expected: MatrixFormatError) {
    assert_eq!(parse_phylip(text).unwrap_err(), expected);
}

#[test]
fn test_to_phylip_format() {
    let labels = ["Kea", "A_very_long_label", "Kakapo"];
    let matrix = vec![vec![0.0, 0.3, 0.5], vec![0.3, 0.0, 0.4], vec![0.5, 0.4, 0.0]];

    let text = to_phylip(&labels, &matrix);
    let expected = "\
3
Kea       0.00000 0.30000 0.50000
A_very_lon0.30000 0.00000 0.40000
Kakapo    0.50000 0.40000 0.00000
";
    assert_eq!(text, expected);
}

#[test]
fn test_to_phylip_lower_format() {
    let matrix = parse_phylip(SQUARE).unwrap();
    let text = to_phylip_lower(matrix.labels(), matrix.rows());

    assert_eq!(text, "3\nKea       0.00000\nKaka      0.30000 0.00000\nKakapo    0.50000 0.40000 0.00000\n");
    assert_eq!(parse_phylip(&text).unwrap(), matrix);
}

#[test]
fn test_round_trip_from_tree() {
    let tree = parse_newick_str("((Kea:0.123456,Kaka:0.2):0.3333333,(Kakapo:1e-3,Takahe:2.5):0.7);").unwrap();
    let matrix = distance_matrix(&tree).unwrap();

    let restored = parse_phylip(&matrix.to_phylip()).unwrap();
    assert_matrices_close(&restored, &matrix);
}

#[test]
fn test_truncated_labels_collide_on_read() {
    let tree = parse_newick_str(
        "((Aptenodytes_forsteri:0.12,Aptenodytes_patagonicus:0.09):0.31,Eudyptula_minor:0.3);",
    )
    .unwrap();
    let text = distance_matrix(&tree).unwrap().to_phylip();

    assert_eq!(
        parse_phylip(&text).unwrap_err(),
        MatrixFormatError::DuplicateLabel { row: 1, label: "Aptenodyte".to_string() }
    );
}

#[test]
fn test_new_rejects_duplicate_labels() {
    let labels = vec!["Tui".to_string(), "Weka".to_string(), "Tui".to_string()];
    let err = DistanceMatrix::new(labels, vec![vec![0.0; 3]; 3]).unwrap_err();
    assert_eq!(err, MatrixFormatError::DuplicateLabel { row: 2, label: "Tui".to_string() });

    let duplicated = r#"{"labels": ["A", "A"], "matrix": [[0.0, 1.0], [1.0, 0.0]]}"#;
    assert!(serde_json::from_str::<DistanceMatrix>(duplicated).is_err());
}

#[test]
fn test_new_validates_shape() {
    let labels = vec!["A".to_string(), "B".to_string()];

    let err = DistanceMatrix::new(labels.clone(), vec![vec![0.0, 1.0]]).unwrap_err();
    assert_eq!(err, MatrixFormatError::DimensionMismatch { expected: 2, found: 1 });

    let err = DistanceMatrix::new(labels.clone(), vec![vec![0.0, 1.0], vec![1.0]]).unwrap_err();
    assert_eq!(err, MatrixFormatError::RowLengthMismatch { row: 1, expected: 2, found: 1 });

    let matrix = DistanceMatrix::new(labels, vec![vec![0.0, 1.0], vec![1.0, 0.0]]).unwrap();
    assert_eq!(matrix.index_of("B"), Some(1));
    assert_eq!(matrix.distance("A", "Z"), None);
}

#[test]
fn test_json_round_trip() {
    let matrix = parse_phylip(LOWER).unwrap();

    let json = serde_json::to_string(&matrix).unwrap();
    let back: DistanceMatrix = serde_json::from_str(&json).unwrap();
    assert_matrices_close(&back, &matrix);

    let invalid = r#"{"labels": ["A", "B"], "matrix": [[0.0]]}"#;
    assert!(serde_json::from_str::<DistanceMatrix>(invalid).is_err());
}

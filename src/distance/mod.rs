//! Patristic (path length) distances between the leaves of a [Tree].
//!
//! [index_tree] records parent and cumulative depth of every reachable vertex
//! in one pre-order pass. The distance of two leaves `u` and `v` is then
//! `depth(u) + depth(v) - 2 * depth(lca(u, v))`.
//!
//! * [distance_matrix] - all leaf pairs with default settings
//! * [distance_matrix_with] - choose the [DuplicateLabelPolicy]
//! * [distance_matrix_par] - rows computed on the rayon thread pool

use crate::matrix::DistanceMatrix;
use crate::model::{Tree, VertexIndex};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Errors when indexing a tree for distance queries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DistanceError {
    #[error("Duplicate leaf label '{0}'")]
    DuplicateLabel(String),
}

/// What to do when several leaves share a label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuplicateLabelPolicy {
    /// Fail with [DistanceError::DuplicateLabel]
    Error,
    /// Keep the leftmost leaf
    FirstWins,
    /// Keep the rightmost leaf; the label keeps the position of its first occurrence
    #[default]
    LastWins,
}

// =#========================================================================#=
// TREE INDEX
// =#========================================================================#=
/// Parents and root distances of the reachable vertices of a tree, plus the
/// leaves by label in left-to-right order.
#[derive(Debug, Clone)]
pub struct TreeIndex {
    parents: Vec<Option<VertexIndex>>,
    depths: Vec<f64>,
    indexed: Vec<bool>,
    /// (label, leaf) in order of first occurrence
    leaves: Vec<(String, VertexIndex)>,
    positions: HashMap<String, usize>,
}

/// Indexes the reachable vertices of `tree` in a single pre-order traversal.
///
/// The root has depth 0; its own branch length is ignored.
///
/// # Errors
/// [DistanceError::DuplicateLabel] if two leaves share a label and `policy`
/// is [DuplicateLabelPolicy::Error].
pub fn index_tree(tree: &Tree, policy: DuplicateLabelPolicy) -> Result<TreeIndex, DistanceError> {
    let arena_len = tree.arena_len();
    let mut index = TreeIndex {
        parents: vec![None; arena_len],
        depths: vec![0.0; arena_len],
        indexed: vec![false; arena_len],
        leaves: Vec::new(),
        positions: HashMap::new(),
    };

    for vertex in tree.pre_order_iter() {
        let current = vertex.index();
        index.indexed[current] = true;
        for &child in vertex.children() {
            index.parents[child] = Some(current);
            index.depths[child] = index.depths[current] + tree[child].branch_length();
        }
        if vertex.is_leaf() {
            index.insert_leaf(vertex.label(), current, policy)?;
        }
    }

    Ok(index)
}

impl TreeIndex {
    fn insert_leaf(&mut self, label: &str, leaf: VertexIndex, policy: DuplicateLabelPolicy) -> Result<(), DistanceError> {
        let Some(&position) = self.positions.get(label) else {
            self.positions.insert(label.to_string(), self.leaves.len());
            self.leaves.push((label.to_string(), leaf));
            return Ok(());
        };

        match policy {
            DuplicateLabelPolicy::Error => return Err(DistanceError::DuplicateLabel(label.to_string())),
            DuplicateLabelPolicy::FirstWins => {
                debug!(label, ignored = leaf, "duplicate leaf label, keeping first leaf");
            }
            DuplicateLabelPolicy::LastWins => {
                warn!(label, replaced = self.leaves[position].1, by = leaf, "duplicate leaf label, later leaf wins");
                self.leaves[position].1 = leaf;
            }
        }
        Ok(())
    }

    /// Returns the number of distinct leaf labels.
    pub fn num_leaves(&self) -> usize {
        self.leaves.len()
    }

    /// Returns the leaf labels in order of first occurrence.
    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.leaves.iter().map(|(label, _)| label.as_str())
    }

    /// Returns the leaf a label resolves to under the chosen policy.
    pub fn leaf(&self, label: &str) -> Option<VertexIndex> {
        self.positions.get(label).map(|&position| self.leaves[position].1)
    }

    /// Returns the cumulative branch length from the root to `vertex`.
    pub fn depth(&self, vertex: VertexIndex) -> Option<f64> {
        self.contains(vertex).then(|| self.depths[vertex])
    }

    /// Returns the lowest common ancestor of `u` and `v`, or `None` if either
    /// is not a reachable vertex.
    pub fn lca(&self, u: VertexIndex, v: VertexIndex) -> Option<VertexIndex> {
        (self.contains(u) && self.contains(v)).then(|| self.lca_unchecked(u, v))
    }

    /// Returns the path length between `u` and `v`, or `None` if either is
    /// not a reachable vertex.
    pub fn distance(&self, u: VertexIndex, v: VertexIndex) -> Option<f64> {
        (self.contains(u) && self.contains(v)).then(|| self.distance_unchecked(u, v))
    }

    /// Returns the path length between the leaves labelled `a` and `b`.
    pub fn distance_by_label(&self, a: &str, b: &str) -> Option<f64> {
        Some(self.distance_unchecked(self.leaf(a)?, self.leaf(b)?))
    }

    fn contains(&self, vertex: VertexIndex) -> bool {
        self.indexed.get(vertex).copied().unwrap_or(false)
    }

    fn lca_unchecked(&self, u: VertexIndex, v: VertexIndex) -> VertexIndex {
        let mut ancestors = HashSet::new();
        let mut current = Some(u);
        while let Some(vertex) = current {
            ancestors.insert(vertex);
            current = self.parents[vertex];
        }

        let mut current = v;
        while !ancestors.contains(&current) {
            match self.parents[current] {
                Some(parent) => current = parent,
                None => break,
            }
        }
        current
    }

    fn distance_unchecked(&self, u: VertexIndex, v: VertexIndex) -> f64 {
        let lca = self.lca_unchecked(u, v);
        self.depths[u] + self.depths[v] - 2.0 * self.depths[lca]
    }

    /// Distances from leaf `row` to all leaves, in label order.
    fn row(&self, row: usize) -> Vec<f64> {
        let u = self.leaves[row].1;
        self.leaves
            .iter()
            .enumerate()
            .map(|(col, &(_, v))| if col == row { 0.0 } else { self.distance_unchecked(u, v) })
            .collect()
    }

    fn label_vec(&self) -> Vec<String> {
        self.leaves.iter().map(|(label, _)| label.clone()).collect()
    }
}

// =#========================================================================#=
// DISTANCE MATRIX
// =#========================================================================#=
/// Computes the leaf-to-leaf distance matrix with [DuplicateLabelPolicy::LastWins].
///
/// Never fails with the default policy; the [Result] matches [distance_matrix_with].
///
/// # Example
/// ```
/// use nhxtree::distance::distance_matrix;
/// use nhxtree::parse_newick_str;
///
/// let tree = parse_newick_str("(A:0.1,B:0.2);")?;
/// let matrix = distance_matrix(&tree)?;
/// assert!((matrix.distance("A", "B").unwrap() - 0.3).abs() < 1e-12);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn distance_matrix(tree: &Tree) -> Result<DistanceMatrix, DistanceError> {
    distance_matrix_with(tree, DuplicateLabelPolicy::default())
}

/// Computes the leaf-to-leaf distance matrix.
///
/// Rows follow the left-to-right order of first occurrence of each label.
/// Each unordered pair is computed once and mirrored; the diagonal is 0.
#[instrument(level = "debug", skip(tree))]
pub fn distance_matrix_with(tree: &Tree, policy: DuplicateLabelPolicy) -> Result<DistanceMatrix, DistanceError> {
    let index = index_tree(tree, policy)?;
    let n = index.num_leaves();

    let mut matrix = DistanceMatrix::zeros(index.label_vec());
    for i in 0..n {
        let u = index.leaves[i].1;
        for j in (i + 1)..n {
            let v = index.leaves[j].1;
            matrix.set_symmetric(i, j, index.distance_unchecked(u, v));
        }
    }

    debug!(leaves = n, "computed distance matrix");
    Ok(matrix)
}

/// Computes the same matrix as [distance_matrix_with], with rows in parallel.
#[instrument(level = "debug", skip(tree))]
pub fn distance_matrix_par(tree: &Tree, policy: DuplicateLabelPolicy) -> Result<DistanceMatrix, DistanceError> {
    let index = index_tree(tree, policy)?;
    let n = index.num_leaves();

    let rows: Vec<Vec<f64>> = (0..n).into_par_iter().map(|row| index.row(row)).collect();

    debug!(leaves = n, "computed distance matrix in parallel");
    Ok(DistanceMatrix::from_square(index.label_vec(), rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::newick::parse_str;

    #[test]
    fn test_index_depths() {
        let tree = parse_str("(A:1,(B:2,C:3):4):10;").unwrap();
        let index = index_tree(&tree, DuplicateLabelPolicy::default()).unwrap();

        assert_eq!(index.depth(tree.root_index()), Some(0.0));
        assert_eq!(index.depth(index.leaf("A").unwrap()), Some(1.0));
        assert_eq!(index.depth(index.leaf("C").unwrap()), Some(7.0));
    }

    #[test]
    fn test_lca() {
        let tree = parse_str("(A,(B,C)BC)R;").unwrap();
        let index = index_tree(&tree, DuplicateLabelPolicy::default()).unwrap();
        let [a, b, c] = ["A", "B", "C"].map(|label| index.leaf(label).unwrap());
        let bc = tree.parent_of(b).unwrap();

        assert_eq!(index.lca(b, c), Some(bc));
        assert_eq!(index.lca(a, c), Some(tree.root_index()));
        assert_eq!(index.lca(b, bc), Some(bc));
        assert_eq!(index.lca(a, a), Some(a));
        assert_eq!(index.lca(a, 99), None);
    }

    #[test]
    fn test_duplicate_last_wins_keeps_position() {
        let tree = parse_str("(A:1,B:2,A:3);").unwrap();
        let index = index_tree(&tree, DuplicateLabelPolicy::LastWins).unwrap();

        assert_eq!(index.labels().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(index.depth(index.leaf("A").unwrap()), Some(3.0));
    }

    #[test]
    fn test_duplicate_first_wins() {
        let tree = parse_str("(A:1,B:2,A:3);").unwrap();
        let index = index_tree(&tree, DuplicateLabelPolicy::FirstWins).unwrap();
        assert_eq!(index.depth(index.leaf("A").unwrap()), Some(1.0));
    }

    #[test]
    fn test_duplicate_error() {
        let tree = parse_str("(A,B,A);").unwrap();
        let err = index_tree(&tree, DuplicateLabelPolicy::Error).unwrap_err();
        assert_eq!(err, DistanceError::DuplicateLabel("A".to_string()));
    }
}

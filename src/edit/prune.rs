use crate::model::{BranchLength, Tree, VertexIndex};
use thiserror::Error;
use tracing::{instrument, trace};

/// Errors when pruning a vertex.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PruneError {
    /// Target is the root of the tree
    #[error("Cannot prune the root, it has no parent")]
    NoParent,
    /// Target is out of range or already detached from the tree
    #[error("Vertex {0} is not part of the tree")]
    UnknownVertex(VertexIndex),
    /// No reachable leaf carries the label
    #[error("No leaf labelled '{0}'")]
    UnknownLabel(String),
    /// Parent of the target has no other child
    #[error("Parent {0} of the target has a single child")]
    UnaryParent(VertexIndex),
}

/// Removes the vertex `target`, together with its subtree, from `tree`.
///
/// * If the parent of `target` is binary, the parent is dissolved: the
///   sibling of `target` takes the parent's place in the grandparent's
///   children and its branch length grows by the parent's branch length.
///   Without a grandparent the sibling becomes the new root.
/// * If the parent has more than two children, `target` is simply removed
///   from them and no branch length changes.
///
/// On error the tree is left untouched.
///
/// # Returns
/// Index of the (possibly new) root.
///
/// # Errors
/// * [PruneError::NoParent] - `target` is the root
/// * [PruneError::UnknownVertex] - `target` is out of range or unreachable
/// * [PruneError::UnaryParent] - the parent of `target` has only this child
///
/// # Example
/// ```
/// use nhxtree::edit::prune;
/// use nhxtree::parse_newick_str;
///
/// let mut tree = parse_newick_str("(A:0.1,(B:0.2,C:0.3):0.4);")?;
/// let b = tree.find_leaf("B").unwrap();
/// prune(&mut tree, b)?;
///
/// let c = tree.find_leaf("C").unwrap();
/// assert_eq!(tree.num_leaves(), 2);
/// assert!((tree[c].branch_length() - 0.7).abs() < 1e-12);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[instrument(level = "trace", skip(tree))]
pub fn prune(tree: &mut Tree, target: VertexIndex) -> Result<VertexIndex, PruneError> {
    if !tree.is_reachable(target) {
        return Err(PruneError::UnknownVertex(target));
    }
    let parent = tree.parent_of(target).ok_or(PruneError::NoParent)?;

    let siblings = tree.children_of(parent);
    match siblings.len() {
        0 | 1 => Err(PruneError::UnaryParent(parent)),
        2 => {
            let sibling = if siblings[0] == target { siblings[1] } else { siblings[0] };
            dissolve_parent(tree, parent, sibling);
            Ok(tree.root_index())
        }
        num_children => {
            trace!(parent, num_children, "removing child of polytomy");
            tree.remove_child(parent, target);
            Ok(tree.root_index())
        }
    }
}

/// Prunes the first reachable leaf labelled `label`, see [prune].
///
/// # Errors
/// * [PruneError::UnknownLabel] - no reachable leaf has this label
/// * any error of [prune]
pub fn prune_leaf(tree: &mut Tree, label: &str) -> Result<VertexIndex, PruneError> {
    let target = tree
        .find_leaf(label)
        .ok_or_else(|| PruneError::UnknownLabel(label.to_string()))?;
    prune(tree, target)
}

/// Replaces the binary vertex `parent` by its child `sibling`, merging branch lengths.
fn dissolve_parent(tree: &mut Tree, parent: VertexIndex, sibling: VertexIndex) {
    let merged = tree[sibling].branch_length() + tree[parent].branch_length();
    tree[sibling].set_branch_length(BranchLength::try_new(merged).unwrap_or(BranchLength::ZERO));

    match tree.parent_of(parent) {
        Some(grandparent) => {
            trace!(parent, sibling, grandparent, "sibling replaces binary parent");
            tree.replace_child(grandparent, parent, sibling);
        }
        None => {
            trace!(parent, sibling, "sibling becomes root");
            tree.set_root(sibling);
        }
    }

    // Detached parent keeps only the pruned subtree
    tree.remove_child(parent, sibling);
}

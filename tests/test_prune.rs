mod common;

use common::{assert_close, init_test_logging, leaf_labels, leaf_length};
use nhxtree::edit::{PruneError, prune, prune_leaf};
use nhxtree::{distance_matrix, parse_newick_str};

#[test]
fn test_prune_merges_sibling_branch() {
    init_test_logging();
    let mut tree = parse_newick_str("(A:0.1,(B:0.2,C:0.3):0.4);").unwrap();
    let root = tree.root_index();

    let new_root = prune_leaf(&mut tree, "B").unwrap();

    assert_eq!(new_root, root);
    assert_eq!(leaf_labels(&tree), vec!["A", "C"]);
    assert_close(leaf_length(&tree, "A"), 0.1);
    assert_close(leaf_length(&tree, "C"), 0.7);
    assert_eq!(tree.num_vertices(), 3);
    assert!(tree.is_valid());

    // Equivalent to (A:0.1,C:0.7);
    let expected = parse_newick_str("(A:0.1,C:0.7);").unwrap();
    let pruned = distance_matrix(&tree).unwrap();
    let reference = distance_matrix(&expected).unwrap();
    assert_eq!(pruned.labels(), reference.labels());
    assert_close(pruned.get(0, 1), reference.get(0, 1));
}

#[test]
fn test_prune_keeps_child_position() {
    let mut tree = parse_newick_str("(X,((A,B):1,C):2,D);").unwrap();
    prune_leaf(&mut tree, "C").unwrap();

    assert_eq!(leaf_labels(&tree), vec!["X", "A", "B", "D"]);
    let a = tree.find_leaf("A").unwrap();
    let ab = tree.parent_of(a).unwrap();
    assert_eq!(tree.children_of(tree.root_index())[1], ab);
    assert_close(tree[ab].branch_length(), 3.0);
}

#[test]
fn test_prune_sibling_becomes_root() {
    let mut tree = parse_newick_str("(A:0.1,B:0.2):0.5;").unwrap();
    let b = tree.find_leaf("B").unwrap();

    let new_root = prune_leaf(&mut tree, "A").unwrap();

    assert_eq!(new_root, b);
    assert_eq!(tree.root_index(), b);
    assert_eq!(tree.parent_of(b), None);
    assert_eq!(tree.num_vertices(), 1);
    assert_close(tree[b].branch_length(), 0.7);
    assert!(tree.is_valid());
}

#[test]
fn test_prune_from_polytomy() {
    let mut tree = parse_newick_str("(A:1,B:2,C:3);").unwrap();
    prune_leaf(&mut tree, "B").unwrap();

    assert_eq!(leaf_labels(&tree), vec!["A", "C"]);
    assert_eq!(tree.root().num_children(), 2);
    assert_close(leaf_length(&tree, "A"), 1.0);
    assert_close(leaf_length(&tree, "C"), 3.0);
    assert!(tree.is_valid());
}

#[test]
fn test_prune_subtree() {
    let mut tree = parse_newick_str("((A,B):1,(C,D):2,E);").unwrap();
    let a = tree.find_leaf("A").unwrap();
    let ab = tree.parent_of(a).unwrap();

    prune(&mut tree, ab).unwrap();

    assert_eq!(leaf_labels(&tree), vec!["C", "D", "E"]);
    assert!(!tree.is_reachable(a));
    assert!(!tree.is_reachable(ab));
    assert_eq!(tree.find_leaf("A"), None);
}

#[test]
fn test_repeated_prunes() {
    let mut tree = parse_newick_str("((A:1,B:2):3,(C:4,D:5):6);").unwrap();
    let d = tree.find_leaf("D").unwrap();

    prune_leaf(&mut tree, "A").unwrap();
    assert_close(leaf_length(&tree, "B"), 5.0);

    prune_leaf(&mut tree, "C").unwrap();
    assert_close(leaf_length(&tree, "D"), 11.0);
    assert_eq!(leaf_labels(&tree), vec!["B", "D"]);

    assert_eq!(prune_leaf(&mut tree, "B"), Ok(d));
    assert_eq!(tree.num_vertices(), 1);
    assert_close(leaf_length(&tree, "D"), 11.0);

    assert_eq!(prune(&mut tree, d), Err(PruneError::NoParent));
}

#[test]
fn test_prune_root() {
    let mut tree = parse_newick_str("(A,B);").unwrap();
    let root = tree.root_index();
    assert_eq!(prune(&mut tree, root), Err(PruneError::NoParent));
}

#[test]
fn test_prune_unary_parent() {
    let mut tree = parse_newick_str("((A),B);").unwrap();
    let a = tree.find_leaf("A").unwrap();
    let parent = tree.parent_of(a).unwrap();
    let before = tree.to_string();

    assert_eq!(prune(&mut tree, a), Err(PruneError::UnaryParent(parent)));
    assert_eq!(tree.to_string(), before);
}

#[test]
fn test_prune_unknown_label() {
    let mut tree = parse_newick_str("(A,B);").unwrap();
    let err = prune_leaf(&mut tree, "Takahe").unwrap_err();

    assert_eq!(err, PruneError::UnknownLabel("Takahe".to_string()));
    assert_eq!(err.to_string(), "No leaf labelled 'Takahe'");
    assert_eq!(tree.num_leaves(), 2);
}

#[test]
fn test_prune_detached_vertex() {
    let mut tree = parse_newick_str("(A,(B,C));").unwrap();
    let b = tree.find_leaf("B").unwrap();
    prune(&mut tree, b).unwrap();

    let before = tree.to_string();
    assert_eq!(prune(&mut tree, b), Err(PruneError::UnknownVertex(b)));
    assert_eq!(tree.to_string(), before);
    assert_eq!(prune(&mut tree, 1000), Err(PruneError::UnknownVertex(1000)));
}

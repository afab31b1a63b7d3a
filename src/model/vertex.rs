//! Vertex module for phylogenetic tree representation.

use crate::model::annotation::Annotations;
use crate::model::tree::VertexIndex;
use std::ops::Deref;

// =#========================================================================#=
// VERTEX
// =#========================================================================#=
/// Represents a vertex (node) in a phylogenetic [Tree](crate::model::Tree).
///
/// A vertex with no children is a leaf; the root is the only reachable vertex
/// without a parent. Vertices do not own each other: children and parent are
/// [VertexIndex]es into the tree's arena.
///
/// # Invariants
/// - `index` is the position of this vertex in the arena
/// - `branch_length` is non-negative and finite (enforced by [BranchLength]),
///   zero when the input gave none
/// - `parent` is `None` for the root and for vertices still under construction
/// - `children` keep the order in which they were parsed
/// - `annotations` is empty unless NHX annotations were decoded
#[derive(PartialEq, Debug, Clone)]
pub struct Vertex {
    index: VertexIndex,
    parent: Option<VertexIndex>,
    children: Vec<VertexIndex>,
    label: String,
    branch_length: BranchLength,
    annotations: Annotations,
}

impl Vertex {
    /// Creates a new vertex without parent.
    ///
    /// # Arguments
    /// * `index` - The unique index of this vertex in the tree (arena)
    /// * `children` - Child indices, empty for a leaf
    /// * `label` - Label of this vertex, possibly empty
    /// * `branch_length` - Distance to parent vertex
    pub fn new(
        index: VertexIndex,
        children: Vec<VertexIndex>,
        label: String,
        branch_length: BranchLength,
    ) -> Self {
        Vertex {
            index,
            parent: None,
            children,
            label,
            branch_length,
            annotations: Annotations::new(),
        }
    }

    /// Returns the index of this vertex.
    pub fn index(&self) -> VertexIndex {
        self.index
    }

    /// Returns the label of this vertex (possibly empty).
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns whether this vertex carries a non-empty label.
    pub fn has_label(&self) -> bool {
        !self.label.is_empty()
    }

    /// Returns the branch length, i.e. the distance to the parent.
    pub fn branch_length(&self) -> f64 {
        *self.branch_length
    }

    /// Returns the NHX annotations of this vertex.
    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    /// Returns the value of annotation `key`, if present.
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }

    /// Returns the children of this vertex, in parsed order.
    pub fn children(&self) -> &[VertexIndex] {
        &self.children
    }

    /// Returns the number of children.
    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    /// Returns `true` if this vertex has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns the index of the parent, `None` for the root.
    pub fn parent_index(&self) -> Option<VertexIndex> {
        self.parent
    }

    /// Returns `true` if this vertex has a parent set.
    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    pub(crate) fn set_label(&mut self, label: String) {
        self.label = label;
    }

    pub(crate) fn set_branch_length(&mut self, branch_length: BranchLength) {
        self.branch_length = branch_length;
    }

    pub(crate) fn set_annotations(&mut self, annotations: Annotations) {
        self.annotations = annotations;
    }

    pub(crate) fn set_parent(&mut self, parent: Option<VertexIndex>) {
        self.parent = parent;
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<VertexIndex> {
        &mut self.children
    }
}

// =#========================================================================#=
// BRANCH LENGTH
// =#========================================================================#=
/// Branch length in a phylogenetic tree, enforced non-negative and finite.
///
/// Represents the evolutionary distance between a vertex and its parent.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct BranchLength(f64);

impl BranchLength {
    /// Branch length of zero, used when the input gives none.
    pub const ZERO: BranchLength = BranchLength(0.0);

    /// Creates a new branch length.
    ///
    /// # Panics
    /// Panics if `length` is negative or not finite.
    pub fn new(length: f64) -> Self {
        assert!(length >= 0.0, "Branch length must be non-negative, got {}", length);
        assert!(length.is_finite(), "Branch length must be finite, got {}", length);
        BranchLength(length)
    }

    /// Creates a new branch length, or `None` if `length` is negative or not finite.
    pub fn try_new(length: f64) -> Option<Self> {
        (length >= 0.0 && length.is_finite()).then_some(BranchLength(length))
    }
}

impl Deref for BranchLength {
    type Target = f64;
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl std::ops::Add for BranchLength {
    type Output = BranchLength;

    fn add(self, other: BranchLength) -> BranchLength {
        BranchLength(self.0 + other.0)
    }
}

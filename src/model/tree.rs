//! Tree module for phylogenetic tree representation.
//!
//! This module provides the core data structures for representing phylogenetic trees:
//! - [Tree]: The main tree structure using the arena pattern on [Vertex].
//! - [VertexIndex] is used to index vertices.

use crate::model::annotation::Annotations;
use crate::model::vertex::{BranchLength, Vertex};
use std::collections::HashSet;
use std::fmt;

/// Index of a vertex in a tree (arena).
pub type VertexIndex = usize;

/// *During construction only*, index for unset root.
const NO_ROOT_SET_INDEX: VertexIndex = usize::MAX;

/// Prefix of labels generated for unlabelled leaves
pub const SYNTHETIC_LABEL_PREFIX: &str = "leaf_";

// =#========================================================================#=
// TREE
// =#========================================================================#=
/// A rooted phylogenetic tree represented using the arena pattern on [Vertex].
///
/// Vertices are stored in a contiguous vector and referenced by [VertexIndex].
/// A vertex owns its children only in the sense that the tree reaches them
/// through it; the parent back-reference is a plain index, so there is never
/// a second owning edge.
///
/// # Structure
/// - All vertices (root, internal, and leaves) are stored in the arena
/// - Index of root is maintained
/// - Vertices may have any number of children (polytomies are allowed)
/// - Structural edits ([prune](crate::edit::prune)) detach vertices without
///   removing them from the arena, so everything that counts or traverses
///   starts at the root and only sees *reachable* vertices
///
/// # Construction
/// Add vertices bottom-up with [add_leaf](Tree::add_leaf) and
/// [add_internal](Tree::add_internal), then call [set_root](Tree::set_root).
/// Test validity with [Tree::is_valid].
///
/// # Example
/// ```
/// use nhxtree::model::{BranchLength, Tree};
///
/// // Create a tree: ((A:0.2,B:0.2):0.2,C:0.4);
/// let mut tree = Tree::new(3);
///
/// // Add leaves (bottom-up construction)
/// let a = tree.add_leaf("A", BranchLength::new(0.2));
/// let b = tree.add_leaf("B", BranchLength::new(0.2));
/// let c = tree.add_leaf("C", BranchLength::new(0.4));
///
/// // Add internal vertex with A and B as children
/// let ab = tree.add_internal(vec![a, b], "", BranchLength::new(0.2));
///
/// // Add root with internal vertex and C as children
/// let root = tree.add_internal(vec![ab, c], "", BranchLength::ZERO);
/// tree.set_root(root);
///
/// assert!(tree.is_valid());
/// assert_eq!(tree.num_leaves(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct Tree {
    /// Vertices of this tree (arena pattern)
    vertices: Vec<Vertex>,

    /// Index of the root of this tree
    root_index: VertexIndex,
}

// ============================================================================
// New, Construction (pub)
// ============================================================================
impl Tree {
    /// Creates a new, empty tree with capacity for a tree with `num_leaves` leaves.
    pub fn new(num_leaves: usize) -> Self {
        let capacity = (2 * num_leaves).saturating_sub(1);
        Tree {
            root_index: NO_ROOT_SET_INDEX,
            vertices: Vec::with_capacity(capacity),
        }
    }

    /// Adds a leaf to the tree, assigning a unique index, which gets returned.
    ///
    /// # Arguments
    /// * `label` - Label of the leaf; may be empty
    /// * `branch_length` - Length of incoming branch, i.e. distance to parent
    pub fn add_leaf(&mut self, label: impl Into<String>, branch_length: BranchLength) -> VertexIndex {
        self.add_internal(Vec::new(), label, branch_length)
    }

    /// Adds a vertex with the given children to the tree, assigning a unique
    /// index, which gets returned. The children's parent is set to the new vertex.
    ///
    /// With an empty `children` vector this adds a leaf.
    ///
    /// # Panics
    /// Panics if a child index is out of bounds.
    pub fn add_internal(
        &mut self,
        children: Vec<VertexIndex>,
        label: impl Into<String>,
        branch_length: BranchLength,
    ) -> VertexIndex {
        let index = self.vertices.len();
        for &child in &children {
            self.vertices[child].set_parent(Some(index));
        }
        self.vertices.push(Vertex::new(index, children, label.into(), branch_length));
        index
    }

    /// Replaces the annotations of the vertex at `index`.
    pub fn set_annotations(&mut self, index: VertexIndex, annotations: Annotations) {
        self.vertices[index].set_annotations(annotations);
    }

    /// Makes the vertex at `index` the root of this tree (clearing its parent).
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn set_root(&mut self, index: VertexIndex) {
        self.vertices[index].set_parent(None);
        self.root_index = index;
    }

    /// Assigns the synthetic label `leaf_<k>` to every unlabelled reachable leaf,
    /// `k` being the position of the leaf in [leaves](Tree::leaves) order.
    ///
    /// If `leaf_<k>` is already the label of another leaf, `k` is increased until
    /// the label is free, so synthetic labels never collide with given ones.
    /// Labels that are already set are never changed, so repeated calls are
    /// idempotent.
    ///
    /// # Returns
    /// Number of labels assigned by this call.
    pub fn assign_synthetic_labels(&mut self) -> usize {
        let mut taken: HashSet<String> = HashSet::new();
        let mut unlabelled: Vec<(usize, VertexIndex)> = Vec::new();
        for (k, leaf) in self.leaves().enumerate() {
            if leaf.has_label() {
                taken.insert(leaf.label().to_string());
            } else {
                unlabelled.push((k, leaf.index()));
            }
        }

        for &(k, index) in &unlabelled {
            let mut label = format!("{SYNTHETIC_LABEL_PREFIX}{k}");
            let mut k = k;
            while taken.contains(&label) {
                k += 1;
                label = format!("{SYNTHETIC_LABEL_PREFIX}{k}");
            }
            taken.insert(label.clone());
            self.vertices[index].set_label(label);
        }

        unlabelled.len()
    }
}

impl Default for Tree {
    fn default() -> Self {
        Tree::new(0)
    }
}

// ============================================================================
// Getters / Accessors, Queries (pub)
// ============================================================================
impl Tree {
    /// Returns whether root of tree has been set.
    pub fn is_root_set(&self) -> bool {
        self.root_index != NO_ROOT_SET_INDEX
    }

    /// Returns the index of the root vertex.
    pub fn root_index(&self) -> VertexIndex {
        self.root_index
    }

    /// Returns a reference to the root vertex.
    ///
    /// # Panics
    /// Panics if the root hasn't been set and thus tree hasn't been fully constructed yet.
    pub fn root(&self) -> &Vertex {
        &self[self.root_index]
    }

    /// Returns a reference to the vertex at the given index.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn vertex(&self, index: VertexIndex) -> &Vertex {
        &self[index]
    }

    /// Returns a reference to the vertex at the given index, or `None` if out of bounds.
    pub fn get(&self, index: VertexIndex) -> Option<&Vertex> {
        self.vertices.get(index)
    }

    /// Returns the parent of the vertex at `index`, `None` for the root.
    pub fn parent_of(&self, index: VertexIndex) -> Option<VertexIndex> {
        self[index].parent_index()
    }

    /// Returns `true` if the vertex at `index` is the root of this tree.
    pub fn is_root(&self, index: VertexIndex) -> bool {
        index == self.root_index
    }

    /// Returns the children of the vertex at `index`.
    pub fn children_of(&self, index: VertexIndex) -> &[VertexIndex] {
        self[index].children()
    }

    /// Returns `true` if the vertex at `index` can be reached from the root.
    ///
    /// Walks the parent references upwards and checks at every step that the
    /// parent still lists the vertex as a child, which is not the case any
    /// more for vertices detached by a prune.
    pub fn is_reachable(&self, index: VertexIndex) -> bool {
        if !self.is_root_set() || index >= self.vertices.len() {
            return false;
        }

        let mut current = index;
        // Bounded by the arena size, which protects against corrupted cycles
        for _ in 0..self.vertices.len() {
            if current == self.root_index {
                return true;
            }
            match self.vertices[current].parent_index() {
                Some(parent) if self.vertices[parent].children().contains(&current) => {
                    current = parent;
                }
                _ => return false,
            }
        }

        false
    }

    /// Returns the index of the first reachable leaf (in [leaves](Tree::leaves)
    /// order) with the given label.
    pub fn find_leaf(&self, label: &str) -> Option<VertexIndex> {
        self.leaves().find(|leaf| leaf.label() == label).map(Vertex::index)
    }

    /// Returns the number of reachable leaves in this tree.
    pub fn num_leaves(&self) -> usize {
        self.leaves().count()
    }

    /// Returns the number of reachable vertices with children (including the root,
    /// unless the tree is a single leaf).
    pub fn num_internal(&self) -> usize {
        self.pre_order_iter().filter(|v| !v.is_leaf()).count()
    }

    /// Returns the number of reachable vertices in this tree.
    pub fn num_vertices(&self) -> usize {
        self.pre_order_iter().count()
    }

    /// Returns the number of vertices in the arena, including detached ones.
    pub fn arena_len(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the sum of the branch lengths of all reachable vertices.
    pub fn total_branch_length(&self) -> f64 {
        self.pre_order_iter().map(Vertex::branch_length).sum()
    }

    /// Validates the tree structure and all index references.
    ///
    /// Checks:
    /// - Root index is set, in bounds and the root has no parent
    /// - All vertex indices match their position in the arena
    /// - All child indices of reachable vertices are valid, point back to
    ///   the correct parent and are visited only once (no cycles, no sharing)
    /// - All reachable leaves have a label
    ///
    /// # Returns
    /// `true` if tree is valid, `false` otherwise
    pub fn is_valid(&self) -> bool {
        if !self.is_root_set() || self.root_index >= self.vertices.len() {
            return false;
        }

        if self.root().has_parent() {
            return false;
        }

        for (index, vertex) in self.vertices.iter().enumerate() {
            if vertex.index() != index {
                return false;
            }
        }

        let mut visited = vec![false; self.vertices.len()];
        let mut stack = vec![self.root_index];
        while let Some(index) = stack.pop() {
            if visited[index] {
                return false;
            }
            visited[index] = true;

            let vertex = &self.vertices[index];
            if vertex.is_leaf() && !vertex.has_label() {
                return false;
            }

            for &child in vertex.children() {
                if child >= self.vertices.len() {
                    return false;
                }
                if self.vertices[child].parent_index() != Some(index) {
                    return false;
                }
                stack.push(child);
            }
        }

        true
    }
}

impl std::ops::Index<VertexIndex> for Tree {
    type Output = Vertex;

    fn index(&self, index: VertexIndex) -> &Self::Output {
        &self.vertices[index]
    }
}

impl std::ops::IndexMut<VertexIndex> for Tree {
    fn index_mut(&mut self, index: VertexIndex) -> &mut Self::Output {
        &mut self.vertices[index]
    }
}

// ============================================================================
// Traversals (pub)
// ============================================================================
impl Tree {
    /// Returns a lazy iterator over the reachable leaves, left to right in
    /// parsed order (pre-order, filtered to vertices without children).
    ///
    /// # Example
    /// ```
    /// use nhxtree::parse_newick_str;
    ///
    /// let tree = parse_newick_str("((A,B),(C,D));").unwrap();
    /// let labels: Vec<_> = tree.leaves().map(|leaf| leaf.label()).collect();
    /// assert_eq!(labels, ["A", "B", "C", "D"]);
    /// ```
    pub fn leaves(&self) -> impl Iterator<Item = &Vertex> + '_ {
        self.pre_order_iter().filter(|v| v.is_leaf())
    }

    /// Returns an iterator over the tree in post-order (children before parents).
    ///
    /// Useful for computing heights and aggregating data from leaves upward.
    pub fn post_order_iter(&self) -> PostOrderIter<'_> {
        PostOrderIter::new(self)
    }

    /// Returns an iterator over the tree in pre-order (parents before children).
    ///
    /// Useful for propagating data from root to leaves.
    pub fn pre_order_iter(&self) -> PreOrderIter<'_> {
        PreOrderIter::new(self)
    }
}

// ============================================================================
// Mutation helpers for structural edits (crate)
// ============================================================================
impl Tree {
    /// Replaces `old` by `new` in the children of `parent`, keeping its position,
    /// and sets the parent of `new`.
    pub(crate) fn replace_child(&mut self, parent: VertexIndex, old: VertexIndex, new: VertexIndex) {
        if let Some(slot) = self.vertices[parent].children_mut().iter_mut().find(|c| **c == old) {
            *slot = new;
        }
        self.vertices[new].set_parent(Some(parent));
    }

    /// Removes `child` from the children of `parent`.
    pub(crate) fn remove_child(&mut self, parent: VertexIndex, child: VertexIndex) {
        self.vertices[parent].children_mut().retain(|&c| c != child);
    }
}

// ============================================================================
// Printing (pub)
// ============================================================================
/// Visual representation of the reachable tree.
///
/// # Example Output
/// ```text
/// Tree with 3 leaves (5 vertices):
/// [4] (branch: 0.000)
///   ├─ [2] (branch: 0.300)
///   │  ├─ [0] "A" (branch: 0.100)
///   │  └─ [1] "B" (branch: 0.200)
///   └─ [3] "C" (branch: 0.400)
/// ```
impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_root_set() {
            return writeln!(f, "(No root set)");
        }

        writeln!(f, "Tree with {} leaves ({} vertices):", self.num_leaves(), self.num_vertices())?;
        self.fmt_vertex(f, self.root_index, "", true)
    }
}

impl Tree {
    /// Helper function to recursively print a vertex and its children.
    fn fmt_vertex(&self, f: &mut fmt::Formatter<'_>, index: VertexIndex, prefix: &str, is_last: bool) -> fmt::Result {
        let vertex = &self.vertices[index];
        let connector = if prefix.is_empty() { "" } else if is_last { "└─ " } else { "├─ " };

        write!(f, "{prefix}{connector}[{index}]")?;
        if vertex.has_label() {
            write!(f, " \"{}\"", vertex.label())?;
        }
        writeln!(f, " (branch: {:.3})", vertex.branch_length())?;

        let child_prefix = if prefix.is_empty() {
            "  ".to_string()
        } else {
            format!("{}{}  ", prefix, if is_last { " " } else { "│" })
        };
        let num_children = vertex.num_children();
        for (i, &child) in vertex.children().iter().enumerate() {
            self.fmt_vertex(f, child, &child_prefix, i + 1 == num_children)?;
        }

        Ok(())
    }
}

// =#========================================================================#=
// ITERATORS
// =#========================================================================#=
/// Iterator for post-order traversal (children before parents).
///
/// This iterator uses a stack-based approach to traverse the tree without recursion.
/// Each vertex is visited after all its descendants have been visited.
pub struct PostOrderIter<'a> {
    tree: &'a Tree,
    stack: Vec<(VertexIndex, bool)>, // (index, children_visited)
}

impl<'a> PostOrderIter<'a> {
    fn new(tree: &'a Tree) -> Self {
        let mut stack = Vec::new();
        if tree.is_root_set() {
            stack.push((tree.root_index, false));
        }
        PostOrderIter { tree, stack }
    }
}

impl<'a> Iterator for PostOrderIter<'a> {
    type Item = &'a Vertex;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((index, children_visited)) = self.stack.pop() {
            let vertex = &self.tree[index];

            if children_visited || vertex.is_leaf() {
                return Some(vertex);
            }

            self.stack.push((index, true));
            // Push children in reverse, so leftmost is processed first
            for &child in vertex.children().iter().rev() {
                self.stack.push((child, false));
            }
        }
        None
    }
}

/// Iterator for pre-order traversal (parents before children).
///
/// This iterator uses a stack-based approach to traverse the tree without recursion.
/// Each vertex is visited before any of its descendants.
pub struct PreOrderIter<'a> {
    tree: &'a Tree,
    stack: Vec<VertexIndex>,
}

impl<'a> PreOrderIter<'a> {
    fn new(tree: &'a Tree) -> Self {
        let mut stack = Vec::new();
        if tree.is_root_set() {
            stack.push(tree.root_index);
        }
        PreOrderIter { tree, stack }
    }
}

impl<'a> Iterator for PreOrderIter<'a> {
    type Item = &'a Vertex;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        let vertex = &self.tree[index];

        for &child in vertex.children().iter().rev() {
            self.stack.push(child);
        }

        Some(vertex)
    }
}

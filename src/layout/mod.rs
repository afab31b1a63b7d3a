//! Coordinate layout of a [Tree], independent of any rendering technology.
//!
//! [layout] assigns every reachable vertex a pair of scalars:
//! * [LayoutMode::Radial]: `position` is an angle in radians, `depth` a radius
//! * [LayoutMode::Rectangular]: `position` is the vertical, `depth` the horizontal coordinate
//!
//! Leaves are spread evenly in left-to-right order and every internal vertex
//! sits at the mean position of its children. Depths either follow the branch
//! lengths or, in topology mode, align all leaves on the outer edge. In both
//! cases the deepest vertex lands exactly on the available extent.
//!
//! Turning angles and radii into screen coordinates is left to the renderer.

use crate::model::{Tree, VertexIndex};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use thiserror::Error;
use tracing::{debug, instrument};

/// Errors when computing a layout.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// Width or height is not a positive finite number
    #[error("Invalid layout bounds {width} x {height}")]
    InvalidBounds { width: f64, height: f64 },
}

/// Shape of the layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutMode {
    /// Leaves on a circle, depth as radius
    #[default]
    Radial,
    /// Leaves stacked vertically, depth as horizontal offset
    Rectangular,
}

/// Size of the area the layout has to fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(width: f64, height: f64) -> Self {
        Bounds { width, height }
    }

    fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Bounds::new(800.0, 800.0)
    }
}

/// Options for [layout].
///
/// # Example
/// ```
/// use nhxtree::layout::{Bounds, LayoutMode, LayoutOptions};
///
/// let options = LayoutOptions {
///     mode: LayoutMode::Rectangular,
///     use_branch_lengths: false,
///     bounds: Bounds::new(400.0, 300.0),
///     annotation_key: Some("S".to_string()),
/// };
/// assert_eq!(options.available_extent(), 400.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    pub mode: LayoutMode,
    /// Depth from branch lengths (`true`) or from topology only (`false`)
    pub use_branch_lengths: bool,
    pub bounds: Bounds,
    /// Annotation to collect per vertex, e.g. for coloring
    pub annotation_key: Option<String>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        LayoutOptions {
            mode: LayoutMode::default(),
            use_branch_lengths: true,
            bounds: Bounds::default(),
            annotation_key: None,
        }
    }
}

impl LayoutOptions {
    /// Depth extent the deepest vertex is scaled to: half the shorter side in
    /// radial mode, the width in rectangular mode.
    pub fn available_extent(&self) -> f64 {
        match self.mode {
            LayoutMode::Radial => self.bounds.width.min(self.bounds.height) / 2.0,
            LayoutMode::Rectangular => self.bounds.width,
        }
    }
}

/// Coordinates of one vertex, see [LayoutMode] for their meaning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VertexCoordinates {
    /// Angle (radial) or vertical coordinate (rectangular)
    pub position: f64,
    /// Radius (radial) or horizontal coordinate (rectangular)
    pub depth: f64,
}

/// Result of [layout], indexed by [VertexIndex].
///
/// Vertices not reachable from the root have no coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutResult {
    mode: LayoutMode,
    extent: f64,
    coordinates: Vec<Option<VertexCoordinates>>,
    annotation_key: Option<String>,
    annotation_values: Vec<Option<String>>,
}

impl LayoutResult {
    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    /// Available depth extent the layout was scaled to.
    pub fn extent(&self) -> f64 {
        self.extent
    }

    /// Returns the coordinates of the vertex at `index`, if it was laid out.
    pub fn get(&self, index: VertexIndex) -> Option<VertexCoordinates> {
        self.coordinates.get(index).copied().flatten()
    }

    /// Returns an iterator over all laid out vertices and their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (VertexIndex, VertexCoordinates)> + '_ {
        self.coordinates
            .iter()
            .enumerate()
            .filter_map(|(index, coordinates)| coordinates.map(|c| (index, c)))
    }

    /// Returns the number of laid out vertices.
    pub fn len(&self) -> usize {
        self.coordinates.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Key of the collected annotation, as given in [LayoutOptions::annotation_key].
    pub fn annotation_key(&self) -> Option<&str> {
        self.annotation_key.as_deref()
    }

    /// Value of the collected annotation at vertex `index`.
    pub fn annotation_value(&self, index: VertexIndex) -> Option<&str> {
        self.annotation_values.get(index)?.as_deref()
    }

    /// Largest depth over all laid out vertices.
    pub fn max_depth(&self) -> f64 {
        self.iter().map(|(_, c)| c.depth).fold(0.0, f64::max)
    }
}

/// Computes the coordinates of all reachable vertices of `tree`.
///
/// Runs one post-order pass for positions (and heights) and one pre-order
/// pass for depths.
///
/// # Errors
/// [LayoutError::InvalidBounds] if width or height is not positive and finite.
///
/// # Example
/// ```
/// use nhxtree::layout::{layout, LayoutMode, LayoutOptions};
/// use nhxtree::parse_newick_str;
///
/// let tree = parse_newick_str("(A:1,B:2);")?;
/// let options = LayoutOptions { mode: LayoutMode::Rectangular, ..Default::default() };
/// let result = layout(&tree, &options)?;
///
/// let b = tree.find_leaf("B").unwrap();
/// assert_eq!(result.get(b).unwrap().depth, options.bounds.width);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[instrument(level = "debug", skip(tree))]
pub fn layout(tree: &Tree, options: &LayoutOptions) -> Result<LayoutResult, LayoutError> {
    if !options.bounds.is_valid() {
        return Err(LayoutError::InvalidBounds {
            width: options.bounds.width,
            height: options.bounds.height,
        });
    }

    let extent = options.available_extent();
    let positions = leaf_spread_positions(tree, options);
    let depths = if options.use_branch_lengths {
        branch_length_depths(tree, extent)
    } else {
        topology_depths(tree, extent)
    };

    let mut coordinates = vec![None; tree.arena_len()];
    for vertex in tree.pre_order_iter() {
        let index = vertex.index();
        coordinates[index] = Some(VertexCoordinates { position: positions[index], depth: depths[index] });
    }

    let annotation_values = match &options.annotation_key {
        Some(key) => {
            let mut values = vec![None; tree.arena_len()];
            for vertex in tree.pre_order_iter() {
                values[vertex.index()] = vertex.annotation(key).map(str::to_string);
            }
            values
        }
        None => Vec::new(),
    };

    debug!(vertices = tree.num_vertices(), extent, "computed layout");
    Ok(LayoutResult {
        mode: options.mode,
        extent,
        coordinates,
        annotation_key: options.annotation_key.clone(),
        annotation_values,
    })
}

/// Angle or vertical position: leaves evenly spaced, internal vertices at the
/// mean of their children.
fn leaf_spread_positions(tree: &Tree, options: &LayoutOptions) -> Vec<f64> {
    let num_leaves = tree.num_leaves() as f64;
    let step = match options.mode {
        LayoutMode::Radial => TAU / num_leaves,
        LayoutMode::Rectangular => options.bounds.height / (num_leaves + 1.0),
    };
    let offset = match options.mode {
        LayoutMode::Radial => 0.0,
        LayoutMode::Rectangular => step,
    };

    let mut positions = vec![0.0; tree.arena_len()];
    let mut leaf_ordinal = 0.0;
    for vertex in tree.post_order_iter() {
        positions[vertex.index()] = if vertex.is_leaf() {
            let position = offset + leaf_ordinal * step;
            leaf_ordinal += 1.0;
            position
        } else {
            let sum: f64 = vertex.children().iter().map(|&child| positions[child]).sum();
            sum / vertex.num_children() as f64
        };
    }

    positions
}

/// Depth as cumulative branch length from the root, scaled to `extent`.
fn branch_length_depths(tree: &Tree, extent: f64) -> Vec<f64> {
    let mut depths = vec![0.0; tree.arena_len()];
    let mut max_depth: f64 = 0.0;
    for vertex in tree.pre_order_iter() {
        let depth = depths[vertex.index()];
        max_depth = max_depth.max(depth);
        for &child in vertex.children() {
            depths[child] = depth + tree[child].branch_length();
        }
    }

    if max_depth > 0.0 {
        let scale = extent / max_depth;
        depths.iter_mut().for_each(|depth| *depth *= scale);
    }
    depths
}

/// Depth from the height above the leaves, so that all leaves reach `extent`.
fn topology_depths(tree: &Tree, extent: f64) -> Vec<f64> {
    let mut heights = vec![0usize; tree.arena_len()];
    for vertex in tree.post_order_iter() {
        heights[vertex.index()] = vertex
            .children()
            .iter()
            .map(|&child| heights[child] + 1)
            .max()
            .unwrap_or(0);
    }

    let max_height = if tree.is_root_set() { heights[tree.root_index()] } else { 0 };
    if max_height == 0 {
        return vec![0.0; tree.arena_len()];
    }

    let scale = extent / max_height as f64;
    heights
        .into_iter()
        .map(|height| max_height.saturating_sub(height) as f64 * scale)
        .collect()
}

//! Flattened, priority-ordered view of a scene subtree
//!
//! Building a list walks the tree once, computing every node's world matrix
//! from its parent's. Sorting is stable and descending by priority, so
//! cameras come before lights and lights before geometry while siblings keep
//! their tree order.

use std::cmp::Reverse;

use super::ids::NodeId;
use super::scene_graph::Scene;
use crate::foundation::math::Mat4;

/// One node ready to draw
#[derive(Debug, Clone, PartialEq)]
pub struct RenderEntry {
    /// Node handle
    pub node: NodeId,
    /// Accumulated model matrix
    pub world: Mat4,
    /// Priority copied at build time
    pub priority: i32,
}

/// Ordered collection of [`RenderEntry`] values
#[derive(Debug, Clone, Default)]
pub struct RenderList {
    entries: Vec<RenderEntry>,
}

impl RenderList {
    /// Empty list
    #[must_use]
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Flatten `root` and its descendants in pre-order
    ///
    /// `parent_matrix` is the world matrix of `root`'s parent; pass identity
    /// when `root` is the scene root.
    #[must_use]
    pub fn build(scene: &Scene, root: NodeId, parent_matrix: &Mat4) -> Self {
        let mut list = Self::new();
        list.append(scene, root, parent_matrix);
        list
    }

    /// Append `root` and its descendants in pre-order
    pub fn append(&mut self, scene: &Scene, root: NodeId, parent_matrix: &Mat4) {
        let mut stack = vec![(root, *parent_matrix)];
        while let Some((handle, parent_world)) = stack.pop() {
            let Some(node) = scene.node(handle) else {
                continue;
            };
            let world = parent_world * node.local_matrix();
            self.entries.push(RenderEntry {
                node: handle,
                world,
                priority: node.priority(),
            });
            stack.extend(node.children().iter().rev().map(|&child| (child, world)));
        }
    }

    /// Stable sort, highest priority first
    pub fn sort(&mut self) {
        self.entries.sort_by_key(|entry| Reverse(entry.priority));
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries in current order
    #[must_use]
    pub fn entries(&self) -> &[RenderEntry] {
        &self.entries
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries
    pub fn iter(&self) -> std::slice::Iter<'_, RenderEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a RenderList {
    type Item = &'a RenderEntry;
    type IntoIter = std::slice::Iter<'a, RenderEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

//! Arena-backed scene tree
//!
//! Nodes live in a [`SlotMap`] owned by the [`Scene`]. A parent owns its
//! children through the ordered handle list; the parent handle stored on a
//! child is only used to walk upwards (world matrices, ancestry checks).
//! Removing a node removes its whole subtree and returns its object ids and
//! light slots to the scene's allocators.

use slotmap::SlotMap;

use super::ids::{LightSlotAllocator, NodeId, ObjectId, ObjectIdAllocator};
use super::node::{Node, NodeKind};
use super::SceneError;
use crate::foundation::math::Mat4;

/// Name given to the root of every scene
pub const ROOT_NAME: &str = "Root";

/// Scene tree plus the identity and light-slot counters it hands out
#[derive(Debug, Clone)]
pub struct Scene {
    nodes: SlotMap<NodeId, Node>,
    root: NodeId,
    object_ids: ObjectIdAllocator,
    light_slots: LightSlotAllocator,
}

impl Scene {
    /// Empty scene with a group root and `max_lights` light slots
    #[must_use]
    pub fn new(max_lights: u32) -> Self {
        let mut object_ids = ObjectIdAllocator::new();
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new(object_ids.allocate(), ROOT_NAME, NodeKind::Group));
        Self {
            nodes,
            root,
            object_ids,
            light_slots: LightSlotAllocator::new(max_lights),
        }
    }

    /// Root handle
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Nodes in the arena, attached or not
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether only the root exists
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Whether a handle is live
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    /// Look up a node
    #[must_use]
    pub fn node(&self, node: NodeId) -> Option<&Node> {
        self.nodes.get(node)
    }

    /// Look up a node mutably
    pub fn node_mut(&mut self, node: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(node)
    }

    /// Light slot pool
    #[must_use]
    pub const fn light_slots(&self) -> &LightSlotAllocator {
        &self.light_slots
    }

    /// Object id counter
    #[must_use]
    pub const fn object_ids(&self) -> &ObjectIdAllocator {
        &self.object_ids
    }

    /// Create a detached node; lights receive a slot here
    pub fn create_node(&mut self, name: impl Into<String>, mut kind: NodeKind) -> NodeId {
        if let NodeKind::Light(light) = &mut kind {
            light.slot = self.light_slots.allocate();
        }
        let id = self.object_ids.allocate();
        let node = self.nodes.insert(Node::new(id, name, kind));
        log::trace!("Created node {:?} ({id})", node);
        node
    }

    /// Shrink the light slot pool to `max` slots
    ///
    /// Lights holding a slot at or above `max` become unbound. Returns how
    /// many lights lost their slot.
    pub fn limit_light_slots(&mut self, max: u32) -> usize {
        if max >= self.light_slots.max() {
            return 0;
        }

        let mut unbound = 0;
        for node in self.nodes.values_mut() {
            if let Some(light) = node.as_light_mut() {
                if light.slot.is_some_and(|slot| slot >= max) {
                    light.slot = None;
                    unbound += 1;
                }
            }
        }
        self.light_slots.truncate(max);
        if unbound > 0 {
            log::warn!("{unbound} lights left unbound; only {max} light slots are available");
        }
        unbound
    }

    /// Create a node and attach it under `parent`
    pub fn spawn(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        kind: NodeKind,
    ) -> Result<NodeId, SceneError> {
        if !self.contains(parent) {
            return Err(SceneError::NodeNotFound(parent));
        }
        let node = self.create_node(name, kind);
        self.add_child(parent, node)?;
        Ok(node)
    }

    /// Move `child` under `parent`, detaching it from any previous parent
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        if !self.contains(parent) {
            return Err(SceneError::NodeNotFound(parent));
        }
        if !self.contains(child) {
            return Err(SceneError::NodeNotFound(child));
        }
        if parent == child || self.is_descendant(parent, child) {
            return Err(SceneError::WouldCreateCycle { parent, child });
        }

        self.detach(child);
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(child);
        }
        Ok(())
    }

    /// Unlink a node from its parent, keeping it alive
    pub fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get_mut(node).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.retain(|&c| c != node);
        }
    }

    /// Destroy a node and everything below it; returns how many were removed
    pub fn remove_subtree(&mut self, node: NodeId) -> Result<usize, SceneError> {
        if node == self.root {
            return Err(SceneError::CannotRemoveRoot);
        }
        if !self.contains(node) {
            return Err(SceneError::NodeNotFound(node));
        }
        Ok(self.remove_subtrees(&[node]))
    }

    /// Destroy every child of `node`
    pub fn remove_all_children(&mut self, node: NodeId) -> Result<usize, SceneError> {
        let children = self
            .nodes
            .get(node)
            .ok_or(SceneError::NodeNotFound(node))?
            .children
            .clone();
        Ok(self.remove_subtrees(&children))
    }

    fn remove_subtrees(&mut self, tops: &[NodeId]) -> usize {
        let mut doomed = Vec::new();
        for &top in tops {
            self.detach(top);
            doomed.extend(self.descendants(top));
        }

        let mut released_ids = Vec::with_capacity(doomed.len());
        for handle in &doomed {
            if let Some(removed) = self.nodes.remove(*handle) {
                if let Some(slot) = removed.as_light().and_then(|light| light.slot) {
                    self.light_slots.release(slot);
                }
                released_ids.push(removed.id());
            }
        }

        // Newest first so the counter can roll back over a contiguous tail
        released_ids.sort_unstable_by(|a, b| b.cmp(a));
        for id in released_ids {
            self.object_ids.release(id);
        }
        log::trace!("Removed {} nodes", doomed.len());
        doomed.len()
    }

    /// `start` and its descendants in pre-order
    #[must_use]
    pub fn descendants(&self, start: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![start];
        while let Some(handle) = stack.pop() {
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };
            order.push(handle);
            stack.extend(node.children.iter().rev());
        }
        order
    }

    /// Number of nodes in the subtree rooted at `start`
    #[must_use]
    pub fn node_count(&self, start: NodeId) -> usize {
        self.descendants(start).len()
    }

    /// First node named `name` in pre-order below and including `start`
    #[must_use]
    pub fn find_by_name(&self, start: NodeId, name: &str) -> Option<NodeId> {
        self.descendants(start)
            .into_iter()
            .find(|&handle| self.nodes.get(handle).is_some_and(|n| n.name() == name))
    }

    /// Node with object id `id` below and including `start`
    #[must_use]
    pub fn find_by_id(&self, start: NodeId, id: ObjectId) -> Option<NodeId> {
        self.descendants(start)
            .into_iter()
            .find(|&handle| self.nodes.get(handle).is_some_and(|n| n.id() == id))
    }

    /// Whether `ancestor` lies on the parent chain of `node`
    #[must_use]
    pub fn is_descendant(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.nodes.get(node).and_then(Node::parent);
        while let Some(handle) = current {
            if handle == ancestor {
                return true;
            }
            current = self.nodes.get(handle).and_then(Node::parent);
        }
        false
    }

    /// Product of local matrices from the top of the parent chain down to `node`
    #[must_use]
    pub fn world_matrix(&self, node: NodeId) -> Option<Mat4> {
        let mut matrix = self.nodes.get(node)?.local_matrix();
        let mut current = self.nodes.get(node)?.parent;
        while let Some(handle) = current {
            let parent = self.nodes.get(handle)?;
            matrix = parent.local_matrix() * matrix;
            current = parent.parent;
        }
        Some(matrix)
    }

    /// Iterate over every live node
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::render::{Camera, Light, Mesh};
    use approx::assert_relative_eq;

    fn chain() -> (Scene, NodeId, NodeId, NodeId) {
        let mut scene = Scene::new(8);
        let root = scene.root();
        let a = scene.spawn(root, "a", NodeKind::Group).unwrap();
        let b = scene.spawn(a, "b", NodeKind::Mesh(Mesh::default())).unwrap();
        let c = scene.spawn(a, "c", NodeKind::Light(Light::point())).unwrap();
        (scene, a, b, c)
    }

    #[test]
    fn test_spawn_links_parent_and_child() {
        let (scene, a, b, c) = chain();
        assert_eq!(scene.node(a).unwrap().children(), &[b, c]);
        assert_eq!(scene.node(b).unwrap().parent(), Some(a));
        assert_eq!(scene.node_count(scene.root()), 4);
        assert!(scene.is_descendant(b, scene.root()));
        assert!(!scene.is_descendant(a, b));
    }

    #[test]
    fn test_lights_take_slots_from_their_scene() {
        let (mut scene, _, _, c) = chain();
        assert_eq!(scene.node(c).unwrap().as_light().unwrap().slot, Some(0));
        assert_eq!(scene.light_slots().in_use(), 1);

        // A second scene starts its own pool
        let mut other = Scene::new(8);
        let light = other.create_node("l", NodeKind::Light(Light::point()));
        assert_eq!(other.node(light).unwrap().as_light().unwrap().slot, Some(0));

        scene.remove_subtree(c).unwrap();
        assert_eq!(scene.light_slots().in_use(), 0);
    }

    #[test]
    fn test_limit_light_slots_unbinds_lights_beyond_the_limit() {
        let mut scene = Scene::new(4);
        let root = scene.root();
        let lights: Vec<NodeId> = (0..3)
            .map(|i| {
                scene
                    .spawn(root, format!("l{i}"), NodeKind::Light(Light::point()))
                    .unwrap()
            })
            .collect();

        assert_eq!(scene.limit_light_slots(8), 0);
        assert_eq!(scene.limit_light_slots(1), 2);

        let slots: Vec<Option<u32>> = lights
            .iter()
            .map(|&l| scene.node(l).unwrap().as_light().unwrap().slot)
            .collect();
        assert_eq!(slots, vec![Some(0), None, None]);
        assert_eq!(scene.light_slots().max(), 1);
        assert_eq!(scene.light_slots().in_use(), 1);

        // Removing an unbound light leaves the remaining slot alone
        scene.remove_subtree(lights[2]).unwrap();
        assert_eq!(scene.light_slots().in_use(), 1);
    }

    #[test]
    fn test_add_child_reparents() {
        let (mut scene, a, b, _) = chain();
        let root = scene.root();
        scene.add_child(root, b).unwrap();
        assert_eq!(scene.node(b).unwrap().parent(), Some(root));
        assert!(!scene.node(a).unwrap().children().contains(&b));
    }

    #[test]
    fn test_cycles_are_rejected() {
        let (mut scene, a, b, _) = chain();
        assert!(matches!(
            scene.add_child(b, a),
            Err(SceneError::WouldCreateCycle { .. })
        ));
        assert!(matches!(
            scene.add_child(a, a),
            Err(SceneError::WouldCreateCycle { .. })
        ));
    }

    #[test]
    fn test_remove_subtree_releases_ids() {
        let (mut scene, a, _, _) = chain();
        let next_before = scene.object_ids().peek();
        assert_eq!(scene.remove_subtree(a).unwrap(), 3);
        assert_eq!(scene.node_count(scene.root()), 1);
        // Ids 2..=4 were the newest, so the counter rolls back to 2
        assert_eq!(next_before, ObjectId(5));
        assert_eq!(scene.object_ids().peek(), ObjectId(2));
    }

    #[test]
    fn test_root_cannot_be_removed() {
        let mut scene = Scene::new(1);
        let root = scene.root();
        assert!(matches!(scene.remove_subtree(root), Err(SceneError::CannotRemoveRoot)));
    }

    #[test]
    fn test_remove_all_children() {
        let (mut scene, a, _, _) = chain();
        assert_eq!(scene.remove_all_children(a).unwrap(), 2);
        assert!(scene.node(a).unwrap().children().is_empty());
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn test_find_by_name_and_id() {
        let (scene, _, b, c) = chain();
        let root = scene.root();
        assert_eq!(scene.find_by_name(root, "b"), Some(b));
        assert_eq!(scene.find_by_name(root, "missing"), None);
        let id = scene.node(c).unwrap().id();
        assert_eq!(scene.find_by_id(root, id), Some(c));
        assert_eq!(scene.find_by_id(root, scene.node(root).unwrap().id()), Some(root));
    }

    #[test]
    fn test_world_matrix_composes_parent_chain() {
        let mut scene = Scene::new(1);
        let root = scene.root();
        let arm = scene.spawn(root, "arm", NodeKind::Group).unwrap();
        let cam = scene.spawn(arm, "cam", NodeKind::Camera(Camera::new())).unwrap();
        scene.node_mut(arm).unwrap().set_position(Vec3::new(0.0, 10.0, 0.0));
        scene.node_mut(cam).unwrap().set_position(Vec3::new(0.0, 0.0, 5.0));

        let world = scene.world_matrix(cam).unwrap();
        let origin = world.transform_point(&nalgebra::Point3::origin());
        assert_relative_eq!(origin.coords, Vec3::new(0.0, 10.0, 5.0));
    }
}

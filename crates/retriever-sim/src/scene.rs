//! Transform hierarchy standing in for the renderer's scene graph.
//!
//! Nodes are stored in an arena keyed by [`NodeId`]; parent/child links are ids, never
//! references. A detached node keeps its data until [`SceneGraph::release`] drops it.

use std::collections::BTreeMap;

use glam::{Quat, Vec3};

use crate::math::{Pose, Transform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Group,
    /// Skeletal joint; searched when resolving attachment anchors.
    Joint,
    /// Renderable object owning visual resources until released.
    Visual,
    /// Static decoration (home ring).
    Marker,
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub kind: NodeKind,
    pub local: Transform,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SceneNode {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Fire-and-forget ring effect: grows from 0.8 to 1.2 while fading out over its lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransientMarker {
    pub position: Vec3,
    pub age: f32,
    pub lifetime: f32,
}

impl TransientMarker {
    const START_SCALE: f32 = 0.8;
    const END_SCALE: f32 = 1.2;
    const START_OPACITY: f32 = 0.9;
    const MIN_HEIGHT: f32 = 0.005;
    /// Seconds from spawn until the marker is released.
    const LIFETIME: f32 = 1.0;

    fn progress(&self) -> f32 {
        (self.age / self.lifetime.max(f32::EPSILON)).clamp(0.0, 1.0)
    }

    pub fn scale(&self) -> f32 {
        Self::START_SCALE + (Self::END_SCALE - Self::START_SCALE) * self.progress()
    }

    pub fn opacity(&self) -> f32 {
        Self::START_OPACITY * (1.0 - self.progress()).powf(2.2)
    }

    pub fn expired(&self) -> bool {
        self.age >= self.lifetime
    }
}

#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: BTreeMap<NodeId, SceneNode>,
    root: NodeId,
    next_id: u64,
    markers: Vec<TransientMarker>,
    released: u64,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        let root = NodeId(0);
        let mut nodes = BTreeMap::new();
        nodes.insert(
            root,
            SceneNode {
                name: "scene".to_string(),
                kind: NodeKind::Root,
                local: Transform::IDENTITY,
                parent: None,
                children: Vec::new(),
            },
        );
        Self {
            nodes,
            root,
            next_id: 1,
            markers: Vec::new(),
            released: 0,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Number of nodes whose resources were released so far.
    pub fn released_count(&self) -> u64 {
        self.released
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    /// Create a node under `parent` (the root when `None` or when `parent` is gone).
    pub fn spawn(
        &mut self,
        name: impl Into<String>,
        kind: NodeKind,
        parent: Option<NodeId>,
        local: Transform,
    ) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;

        let parent = parent
            .filter(|p| self.nodes.contains_key(p))
            .unwrap_or(self.root);
        self.nodes.insert(
            id,
            SceneNode {
                name: name.into(),
                kind,
                local,
                parent: None,
                children: Vec::new(),
            },
        );
        self.link(id, parent);
        id
    }

    /// True when `id` is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == self.root {
                return true;
            }
            cursor = self.nodes.get(&current).and_then(|n| n.parent);
        }
        false
    }

    pub fn local(&self, id: NodeId) -> Option<Transform> {
        self.nodes.get(&id).map(|n| n.local)
    }

    pub fn set_local(&mut self, id: NodeId, local: Transform) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.local = local;
                true
            }
            None => false,
        }
    }

    pub fn set_local_pose(&mut self, id: NodeId, position: Vec3, rotation: Quat) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.local.translation = position;
                node.local.rotation = rotation;
                true
            }
            None => false,
        }
    }

    pub fn world_transform(&self, id: NodeId) -> Option<Transform> {
        let node = self.nodes.get(&id)?;
        match node.parent {
            Some(parent) => Some(self.world_transform(parent)?.mul_transform(&node.local)),
            None => Some(node.local),
        }
    }

    pub fn world_position(&self, id: NodeId) -> Option<Vec3> {
        self.world_transform(id).map(|t| t.translation)
    }

    pub fn world_scale(&self, id: NodeId) -> Option<Vec3> {
        self.world_transform(id).map(|t| t.scale)
    }

    pub fn world_pose(&self, id: NodeId) -> Option<Pose> {
        self.world_transform(id).map(|t| t.pose())
    }

    /// Move `child` under `new_parent` keeping its world-space scale.
    ///
    /// The local translation and rotation are kept as-is (callers set the new local pose
    /// afterwards); the local scale becomes `world_scale(child) / world_scale(new_parent)`
    /// component-wise. Returns `false` if either node is missing or the move would create a cycle.
    pub fn reparent_preserve_world_scale(&mut self, child: NodeId, new_parent: NodeId) -> bool {
        if child == self.root || self.is_ancestor(child, new_parent) {
            return false;
        }
        let (Some(child_scale), Some(parent_scale)) =
            (self.world_scale(child), self.world_scale(new_parent))
        else {
            return false;
        };

        self.unlink(child);
        self.link(child, new_parent);
        if let Some(node) = self.nodes.get_mut(&child) {
            node.local.scale = preserved_local_scale(child_scale, parent_scale);
        }
        true
    }

    /// Unlink `id` from its parent. The node and its subtree stay allocated.
    pub fn detach(&mut self, id: NodeId) -> bool {
        if id == self.root || !self.nodes.contains_key(&id) {
            return false;
        }
        self.unlink(id);
        true
    }

    /// Detach `id` and drop it together with its subtree.
    pub fn release(&mut self, id: NodeId) -> bool {
        if id == self.root || !self.nodes.contains_key(&id) {
            return false;
        }
        self.unlink(id);
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                self.released += 1;
                stack.extend(node.children);
            }
        }
        true
    }

    /// Depth-first search below `from` (inclusive) for the first node matching `pred`.
    pub fn find(&self, from: NodeId, mut pred: impl FnMut(&SceneNode) -> bool) -> Option<NodeId> {
        let mut stack = vec![from];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            if pred(node) {
                return Some(current);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    pub fn spawn_transient_marker(&mut self, position: Vec3) {
        self.markers.push(TransientMarker {
            position: Vec3::new(
                position.x,
                position.y.max(TransientMarker::MIN_HEIGHT),
                position.z,
            ),
            age: 0.0,
            lifetime: TransientMarker::LIFETIME,
        });
    }

    pub fn markers(&self) -> &[TransientMarker] {
        &self.markers
    }

    /// Age transient markers and drop the expired ones.
    pub fn update_markers(&mut self, dt: f32) {
        for marker in self.markers.iter_mut() {
            marker.age += dt.max(0.0);
        }
        self.markers.retain(|m| !m.expired());
    }

    fn is_ancestor(&self, ancestor: NodeId, of: NodeId) -> bool {
        let mut cursor = Some(of);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.nodes.get(&current).and_then(|n| n.parent);
        }
        false
    }

    fn link(&mut self, child: NodeId, parent: NodeId) {
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(child);
        }
        if let Some(c) = self.nodes.get_mut(&child) {
            c.parent = Some(parent);
        }
    }

    fn unlink(&mut self, child: NodeId) {
        let Some(parent) = self.nodes.get_mut(&child).and_then(|c| c.parent.take()) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.retain(|c| *c != child);
        }
    }
}

/// Local scale that keeps `child_world` once parented under a node of scale `parent_world`.
pub fn preserved_local_scale(child_world: Vec3, parent_world: Vec3) -> Vec3 {
    let safe = |p: f32| if p.abs() <= f32::EPSILON { 1.0 } else { p };
    Vec3::new(
        child_world.x / safe(parent_world.x),
        child_world.y / safe(parent_world.y),
        child_world.z / safe(parent_world.z),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_links_under_root_when_parent_missing() {
        let mut scene = SceneGraph::new();
        let a = scene.spawn("a", NodeKind::Group, Some(NodeId(99)), Transform::IDENTITY);
        assert_eq!(scene.node(a).unwrap().parent(), Some(scene.root()));
        assert!(scene.is_attached(a));
    }

    #[test]
    fn reparent_keeps_world_scale_under_scaled_parent() {
        let mut scene = SceneGraph::new();
        let rig = scene.spawn(
            "rig",
            NodeKind::Group,
            None,
            Transform::IDENTITY.with_scale(Vec3::splat(0.05)),
        );
        let jaw = scene.spawn("jaw", NodeKind::Joint, Some(rig), Transform::IDENTITY);
        let ball = scene.spawn(
            "ball",
            NodeKind::Visual,
            None,
            Transform::IDENTITY.with_scale(Vec3::splat(0.5)),
        );

        assert!(scene.reparent_preserve_world_scale(ball, jaw));
        assert_eq!(scene.node(ball).unwrap().parent(), Some(jaw));
        let world = scene.world_scale(ball).unwrap();
        assert!((world - Vec3::splat(0.5)).length() < 1e-5);
        assert!((scene.local(ball).unwrap().scale - Vec3::splat(10.0)).length() < 1e-4);

        assert!(scene.reparent_preserve_world_scale(ball, scene.root()));
        assert!((scene.local(ball).unwrap().scale - Vec3::splat(0.5)).length() < 1e-5);
    }

    #[test]
    fn reparent_rejects_cycles() {
        let mut scene = SceneGraph::new();
        let a = scene.spawn("a", NodeKind::Group, None, Transform::IDENTITY);
        let b = scene.spawn("b", NodeKind::Group, Some(a), Transform::IDENTITY);
        assert!(!scene.reparent_preserve_world_scale(a, b));
    }

    #[test]
    fn release_drops_the_subtree() {
        let mut scene = SceneGraph::new();
        let a = scene.spawn("a", NodeKind::Group, None, Transform::IDENTITY);
        let b = scene.spawn("b", NodeKind::Visual, Some(a), Transform::IDENTITY);
        assert!(scene.release(a));
        assert!(!scene.contains(a));
        assert!(!scene.contains(b));
        assert_eq!(scene.released_count(), 2);
        assert!(!scene.release(a));
    }

    #[test]
    fn detached_nodes_are_not_attached() {
        let mut scene = SceneGraph::new();
        let a = scene.spawn("a", NodeKind::Visual, None, Transform::IDENTITY);
        assert!(scene.detach(a));
        assert!(scene.contains(a));
        assert!(!scene.is_attached(a));
    }

    #[test]
    fn markers_grow_fade_and_expire() {
        let mut scene = SceneGraph::new();
        scene.spawn_transient_marker(Vec3::new(0.0, -1.0, -2.0));
        assert_eq!(scene.markers()[0].position.y, 0.005);
        assert!((scene.markers()[0].scale() - 0.8).abs() < 1e-6);

        scene.update_markers(0.5);
        let m = scene.markers()[0];
        assert!((m.scale() - 1.0).abs() < 1e-5);
        assert!(m.opacity() < 0.9 && m.opacity() > 0.0);

        scene.update_markers(0.6);
        assert!(scene.markers().is_empty());
    }

    #[test]
    fn find_prefers_depth_first_order() {
        let mut scene = SceneGraph::new();
        let head = scene.spawn("head", NodeKind::Joint, None, Transform::IDENTITY);
        let snout = scene.spawn(
            "SnoutUpper_metarig",
            NodeKind::Joint,
            Some(head),
            Transform::IDENTITY,
        );
        let found = scene.find(scene.root(), |n| n.name.contains("Snout"));
        assert_eq!(found, Some(snout));
    }
}

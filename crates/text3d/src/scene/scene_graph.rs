//! Scene graph trait and the slot-map backed scene
//!
//! The scene is owned by the host; text controllers only add and remove
//! their own mesh node.

use slotmap::{new_key_type, SlotMap};

use super::SceneMesh;
use crate::foundation::math::Vec3;
use crate::material::Color;

new_key_type! {
    /// Stable handle to a mesh node in a [`Scene`]
    pub struct NodeKey;
}

/// Axis-Aligned Bounding Box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl AABB {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Inverted box that any point expands; `is_empty` until then
    pub fn empty() -> Self {
        Self {
            min: Vec3::repeat(f32::INFINITY),
            max: Vec3::repeat(f32::NEG_INFINITY),
        }
    }

    /// True when no point has been added
    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    /// Grow the box to include `point`
    pub fn expand_by_point(&mut self, point: Vec3) {
        self.min = self.min.inf(&point);
        self.max = self.max.sup(&point);
    }

    /// Smallest box containing both boxes
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Full edge lengths of the box
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }
}

/// Container of renderable mesh nodes
///
/// Kept as a trait so hosts can back it with their own renderer's node store.
pub trait SceneGraph {
    /// Insert a mesh node and return its key
    fn add(&mut self, mesh: SceneMesh) -> NodeKey;

    /// Remove a mesh node, returning it if it was present
    fn remove(&mut self, key: NodeKey) -> Option<SceneMesh>;

    /// Borrow a mesh node
    fn get(&self, key: NodeKey) -> Option<&SceneMesh>;

    /// Get the total number of nodes in the scene
    fn len(&self) -> usize;

    /// Whether a node is present
    fn contains(&self, key: NodeKey) -> bool {
        self.get(key).is_some()
    }

    /// True when the scene holds no nodes
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Default scene: nodes in a slot map plus a background color
#[derive(Debug)]
pub struct Scene {
    nodes: SlotMap<NodeKey, SceneMesh>,
    /// Clear color the host renders behind the nodes
    pub background: Color,
}

impl Scene {
    /// Create a new empty scene with a white background
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            background: Color::WHITE,
        }
    }

    /// Iterate over all nodes
    pub fn iter(&self) -> impl Iterator<Item = (NodeKey, &SceneMesh)> {
        self.nodes.iter()
    }

    /// Bounds of every node with its transform applied
    pub fn world_bounds(&self) -> Option<AABB> {
        self.nodes
            .values()
            .filter_map(SceneMesh::world_bounds)
            .reduce(|acc, b| acc.union(&b))
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph for Scene {
    fn add(&mut self, mesh: SceneMesh) -> NodeKey {
        log::trace!("Scene add '{}'", mesh.name);
        self.nodes.insert(mesh)
    }

    fn remove(&mut self, key: NodeKey) -> Option<SceneMesh> {
        self.nodes.remove(key)
    }

    fn get(&self, key: NodeKey) -> Option<&SceneMesh> {
        self.nodes.get(key)
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{TextGeometry, Vertex};
    use crate::material::SurfaceMaterial;
    use std::sync::Arc;

    fn node(name: &str) -> SceneMesh {
        SceneMesh::new(
            name,
            Arc::new(TextGeometry::default()),
            Arc::new(SurfaceMaterial::default()),
        )
    }

    #[test]
    fn test_aabb_contains_point() {
        let aabb = AABB::new(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, 1.0),
        );

        assert!(aabb.contains_point(Vec3::zeros()));
        assert!(aabb.contains_point(Vec3::new(0.5, 0.5, 0.5)));
        assert!(!aabb.contains_point(Vec3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_empty_aabb_expands() {
        let mut aabb = AABB::empty();
        assert!(aabb.is_empty());

        aabb.expand_by_point(Vec3::new(1.0, 2.0, 3.0));
        aabb.expand_by_point(Vec3::new(-1.0, 0.0, 0.0));
        assert!(!aabb.is_empty());
        assert_eq!(aabb.min, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(aabb.center().x, 0.0);
    }

    #[test]
    fn test_scene_add_remove() {
        let mut scene = Scene::new();
        let a = scene.add(node("a"));
        let b = scene.add(node("b"));
        assert_eq!(scene.len(), 2);

        assert_eq!(scene.remove(a).map(|m| m.name), Some("a".to_string()));
        assert!(!scene.contains(a));
        assert!(scene.contains(b));
        assert!(scene.remove(a).is_none());
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_world_bounds_follow_node_transforms() {
        let vertex = |x: f32| Vertex::new([x, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]);
        let geometry = Arc::new(TextGeometry::new(vec![vertex(0.0), vertex(2.0)], vec![]));

        let mut scene = Scene::new();
        assert!(scene.world_bounds().is_none());

        let mut left = SceneMesh::new("left", Arc::clone(&geometry), Arc::new(SurfaceMaterial::default()));
        left.transform.position.x = -1.0;
        let mut right = SceneMesh::new("right", geometry, Arc::new(SurfaceMaterial::default()));
        right.transform.position = Vec3::new(3.0, 1.0, 0.0);
        scene.add(left);
        scene.add(right);
        // empty geometry contributes nothing
        scene.add(node("empty"));

        let bounds = scene.world_bounds().unwrap();
        assert_eq!(bounds.min, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(5.0, 1.0, 0.0));
    }
}

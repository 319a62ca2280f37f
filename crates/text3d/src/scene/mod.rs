//! Scene management
//!
//! A flat container of mesh nodes owned by the host. Controllers hold a
//! shared handle and add or remove their own node.

mod scene_graph;
mod scene_mesh;

pub use scene_graph::{NodeKey, Scene, SceneGraph, AABB};
pub use scene_mesh::SceneMesh;

use std::cell::RefCell;
use std::rc::Rc;

/// Scene handle shared between the host and its controllers
pub type SharedScene<S = Scene> = Rc<RefCell<S>>;

/// Wrap a scene for sharing
pub fn shared<S: SceneGraph>(scene: S) -> SharedScene<S> {
    Rc::new(RefCell::new(scene))
}

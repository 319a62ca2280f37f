//! Mesh node stored in the scene

use std::sync::Arc;

use super::AABB;
use crate::foundation::math::{Point3, Transform};
use crate::geometry::TextGeometry;
use crate::material::SurfaceMaterial;

/// Renderable node: shared geometry and material plus a transform
#[derive(Debug, Clone)]
pub struct SceneMesh {
    /// Debug name, usually the owning controller's label
    pub name: String,
    /// Geometry shared with the controller that built it
    pub geometry: Arc<TextGeometry>,
    /// Surface material
    pub material: Arc<SurfaceMaterial>,
    /// Node transform
    pub transform: Transform,
}

impl SceneMesh {
    /// Create a mesh node at the origin
    pub fn new(
        name: impl Into<String>,
        geometry: Arc<TextGeometry>,
        material: Arc<SurfaceMaterial>,
    ) -> Self {
        Self {
            name: name.into(),
            geometry,
            material,
            transform: Transform::identity(),
        }
    }

    /// Geometry bounds moved by the node transform
    pub fn world_bounds(&self) -> Option<AABB> {
        let local = self.geometry.bounding_box()?;
        let matrix = self.transform.to_matrix();
        let mut world = AABB::empty();
        for x in [local.min.x, local.max.x] {
            for y in [local.min.y, local.max.y] {
                for z in [local.min.z, local.max.z] {
                    world.expand_by_point(matrix.transform_point(&Point3::new(x, y, z)).coords);
                }
            }
        }
        Some(world)
    }
}

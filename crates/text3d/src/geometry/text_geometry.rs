//! Extruded text geometry container
//!
//! Holds vertex and index data for one generated text mesh. Geometry is
//! rebuilt from scratch on every text or font change, so any transform a
//! hook applies here lasts only until the next regeneration.

use bytemuck::{Pod, Zeroable};
use nalgebra::Matrix3;

use crate::foundation::math::{Mat4, Mat4Ext, Point3, Vec3};
use crate::scene::AABB;

/// Vertex with position, normal and texture coordinate
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    /// Position in 3D space
    pub position: [f32; 3],

    /// Normal vector
    pub normal: [f32; 3],

    /// Texture coordinates
    pub tex_coord: [f32; 2],
}

impl Vertex {
    /// Create a new vertex
    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tex_coord,
        }
    }
}

/// Triangle mesh produced by the extrusion routine
#[derive(Debug, Clone, Default)]
pub struct TextGeometry {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    bounding_box: Option<AABB>,
}

impl TextGeometry {
    /// Create geometry from vertex and index data
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self {
            vertices,
            indices,
            bounding_box: None,
        }
    }

    /// Vertex data
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Triangle indices, three per triangle
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Raw vertex bytes for GPU upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// True when there is nothing to draw (empty or whitespace-only text)
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Append another geometry, rebasing its indices
    pub fn merge(&mut self, other: Self) {
        let base = self.vertices.len() as u32;
        self.vertices.extend(other.vertices);
        self.indices.extend(other.indices.into_iter().map(|i| i + base));
        self.bounding_box = None;
    }

    /// Compute and cache the axis-aligned bounds; `None` when empty
    pub fn compute_bounding_box(&mut self) -> Option<AABB> {
        self.bounding_box = self.measure();
        self.bounding_box
    }

    /// Cached bounds, or freshly measured bounds if none are cached
    pub fn bounding_box(&self) -> Option<AABB> {
        self.bounding_box.or_else(|| self.measure())
    }

    fn measure(&self) -> Option<AABB> {
        if self.vertices.is_empty() {
            return None;
        }
        let mut aabb = AABB::empty();
        for v in &self.vertices {
            aabb.expand_by_point(Vec3::from(v.position));
        }
        Some(aabb)
    }

    /// Transform positions by `matrix` and normals by its normal matrix
    pub fn apply_matrix(&mut self, matrix: &Mat4) {
        let linear: Matrix3<f32> = matrix.fixed_view::<3, 3>(0, 0).into_owned();
        let normal_matrix = linear
            .try_inverse()
            .map_or(linear, |inverse| inverse.transpose());

        for v in &mut self.vertices {
            let p = matrix.transform_point(&Point3::from(v.position));
            v.position = [p.x, p.y, p.z];

            let n = normal_matrix * Vec3::from(v.normal);
            let n = n.try_normalize(f32::EPSILON).unwrap_or(n);
            v.normal = [n.x, n.y, n.z];
        }
        self.bounding_box = None;
    }

    /// Rotate about the X axis (radians)
    pub fn rotate_x(&mut self, angle: f32) -> &mut Self {
        self.apply_matrix(&Mat4::rotation_x(angle));
        self
    }

    /// Rotate about the Y axis (radians)
    pub fn rotate_y(&mut self, angle: f32) -> &mut Self {
        self.apply_matrix(&Mat4::rotation_y(angle));
        self
    }

    /// Rotate about the Z axis (radians)
    pub fn rotate_z(&mut self, angle: f32) -> &mut Self {
        self.apply_matrix(&Mat4::rotation_z(angle));
        self
    }

    /// Translate every vertex
    pub fn translate(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.apply_matrix(&Mat4::new_translation(&Vec3::new(x, y, z)));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::constants::HALF_PI;
    use approx::assert_relative_eq;

    fn unit_triangle() -> TextGeometry {
        TextGeometry::new(
            vec![
                Vertex::new([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
                Vertex::new([1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]),
                Vertex::new([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0]),
            ],
            vec![0, 1, 2],
        )
    }

    #[test]
    fn test_bounding_box() {
        let mut geometry = unit_triangle();
        let bbox = geometry.compute_bounding_box().unwrap();
        assert_eq!(bbox.min, Vec3::zeros());
        assert_eq!(bbox.max, Vec3::new(1.0, 1.0, 0.0));
        assert!(TextGeometry::default().bounding_box().is_none());
    }

    #[test]
    fn test_translate_invalidates_cached_bounds() {
        let mut geometry = unit_triangle();
        geometry.compute_bounding_box();
        geometry.translate(2.0, 0.0, -1.0);
        let bbox = geometry.bounding_box().unwrap();
        assert_relative_eq!(bbox.min, Vec3::new(2.0, 0.0, -1.0));
    }

    #[test]
    fn test_rotate_x_turns_normals() {
        let mut geometry = unit_triangle();
        geometry.rotate_x(-HALF_PI);
        let v = geometry.vertices()[2];
        assert_relative_eq!(Vec3::from(v.position), Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-6);
        assert_relative_eq!(Vec3::from(v.normal), Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_merge_rebases_indices() {
        let mut geometry = unit_triangle();
        geometry.merge(unit_triangle());
        assert_eq!(geometry.indices(), &[0, 1, 2, 3, 4, 5]);
        assert_eq!(geometry.triangle_count(), 2);
        assert_eq!(geometry.vertex_bytes().len(), 6 * std::mem::size_of::<Vertex>());
    }
}

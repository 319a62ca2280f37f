//! Post-processing hooks run on every regeneration
//!
//! Geometry is rebuilt from scratch whenever the text or font changes, so a
//! transform that must persist (tilting a title back, dropping a subtitle
//! below it) has to be re-applied by a hook each time.

use serde::{Deserialize, Serialize};

use crate::foundation::math::{Mat4, Mat4Ext, Vec3};
use crate::geometry::TextGeometry;
use crate::material::SurfaceMaterial;

/// Callbacks invoked before the mesh is built from new geometry/material
pub trait MeshHooks {
    /// Called with freshly extruded geometry
    fn on_geometry_change(&mut self, _geometry: &mut TextGeometry) {}

    /// Called after the material for this regeneration is chosen
    fn on_material_change(&mut self, _geometry: &mut TextGeometry, _material: &mut SurfaceMaterial) {}
}

/// Hooks that do nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl MeshHooks for NoHooks {}

type GeometryFn = Box<dyn FnMut(&mut TextGeometry)>;
type MaterialFn = Box<dyn FnMut(&mut TextGeometry, &mut SurfaceMaterial)>;

/// Hooks backed by closures
#[derive(Default)]
pub struct FnHooks {
    geometry: Option<GeometryFn>,
    material: Option<MaterialFn>,
}

impl FnHooks {
    /// No closures installed
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` on every new geometry
    pub fn on_geometry(mut self, f: impl FnMut(&mut TextGeometry) + 'static) -> Self {
        self.geometry = Some(Box::new(f));
        self
    }

    /// Run `f` whenever the material is chosen
    pub fn on_material(mut self, f: impl FnMut(&mut TextGeometry, &mut SurfaceMaterial) + 'static) -> Self {
        self.material = Some(Box::new(f));
        self
    }
}

impl MeshHooks for FnHooks {
    fn on_geometry_change(&mut self, geometry: &mut TextGeometry) {
        if let Some(f) = self.geometry.as_mut() {
            f(geometry);
        }
    }

    fn on_material_change(&mut self, geometry: &mut TextGeometry, material: &mut SurfaceMaterial) {
        if let Some(f) = self.material.as_mut() {
            f(geometry, material);
        }
    }
}

/// Rotate (Euler X, Y, Z in radians) then translate every new geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformHooks {
    /// Euler angles, applied X first
    pub rotation: Vec3,
    /// Offset applied after rotation
    pub translation: Vec3,
}

impl Default for TransformHooks {
    fn default() -> Self {
        Self::rotation(Vec3::zeros())
    }
}

impl TransformHooks {
    /// Rotation only
    pub fn rotation(rotation: Vec3) -> Self {
        Self {
            rotation,
            translation: Vec3::zeros(),
        }
    }

    /// Set the translation
    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    /// Combined matrix
    pub fn matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.translation) * Mat4::rotation_euler_xyz(self.rotation)
    }
}

impl MeshHooks for TransformHooks {
    fn on_geometry_change(&mut self, geometry: &mut TextGeometry) {
        geometry.apply_matrix(&self.matrix());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::constants::HALF_PI;
    use crate::geometry::Vertex;
    use approx::assert_relative_eq;

    fn point_geometry() -> TextGeometry {
        TextGeometry::new(vec![Vertex::new([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0])], vec![])
    }

    #[test]
    fn test_transform_hooks_rotate_then_translate() {
        let mut hooks = TransformHooks::rotation(Vec3::new(HALF_PI, 0.0, 0.0))
            .with_translation(Vec3::new(0.0, -0.58, -0.98));
        let mut geometry = point_geometry();
        hooks.on_geometry_change(&mut geometry);

        let p = Vec3::from(geometry.vertices()[0].position);
        assert_relative_eq!(p, Vec3::new(0.0, -0.58, 0.02), epsilon = 1e-6);
    }

    #[test]
    fn test_fn_hooks_forward_calls() {
        let mut hooks = FnHooks::new()
            .on_geometry(|g| {
                g.translate(1.0, 0.0, 0.0);
            })
            .on_material(|_, m| *m = SurfaceMaterial::standard(crate::material::Color::WHITE));

        let mut geometry = point_geometry();
        let mut material = SurfaceMaterial::default();
        hooks.on_geometry_change(&mut geometry);
        hooks.on_material_change(&mut geometry, &mut material);

        assert_relative_eq!(geometry.vertices()[0].position[0], 1.0);
        assert_eq!(material.color(), crate::material::Color::WHITE);
    }

    #[test]
    fn test_transform_hooks_from_toml() {
        let hooks: TransformHooks = toml::from_str("rotation = [-0.785, 0.0, 0.0]").unwrap();
        assert_relative_eq!(hooks.rotation.x, -0.785);
        assert_eq!(hooks.translation, Vec3::zeros());
    }
}

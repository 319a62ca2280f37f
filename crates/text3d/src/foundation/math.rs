//! Math utilities and types
//!
//! Thin aliases over `nalgebra` used by geometry, scene and hook code.

pub use nalgebra::{Matrix4, Quaternion, Unit, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Convert to a transformation matrix
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Apply this transform to a point
    pub fn transform_point(&self, point: Point3) -> Point3 {
        self.to_matrix().transform_point(&point)
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Pi / 4
    pub const QUARTER_PI: f32 = PI * 0.25;
}

/// Extension trait for Mat4 with additional convenience methods
pub trait Mat4Ext {
    /// Create a rotation matrix around the X axis
    fn rotation_x(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Y axis
    fn rotation_y(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Z axis
    fn rotation_z(angle: f32) -> Mat4;

    /// Rotation applying X, then Y, then Z (radians)
    fn rotation_euler_xyz(angles: Vec3) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn rotation_x(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::x_axis(), angle)
    }

    fn rotation_y(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::y_axis(), angle)
    }

    fn rotation_z(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::z_axis(), angle)
    }

    fn rotation_euler_xyz(angles: Vec3) -> Mat4 {
        Self::rotation_z(angles.z) * Self::rotation_y(angles.y) * Self::rotation_x(angles.x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rotation_x_quarter_turn() {
        let m = Mat4::rotation_x(constants::HALF_PI);
        let p = m.transform_point(&Point3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(p.z, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_euler_xyz_applies_x_first() {
        let angles = Vec3::new(constants::HALF_PI, 0.0, constants::HALF_PI);
        let m = Mat4::rotation_euler_xyz(angles);
        // +Y -> +Z by X, then Z rotation leaves +Z alone
        let p = m.transform_point(&Point3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(p.z, 1.0, epsilon = 1e-6);
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_transform_to_matrix_translates() {
        let t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        let p = t.transform_point(Point3::origin());
        assert_relative_eq!(p.coords, Vec3::new(1.0, 2.0, 3.0));
    }
}

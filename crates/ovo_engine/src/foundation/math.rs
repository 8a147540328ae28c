//! Math utilities and types
//!
//! Type aliases over nalgebra plus the handful of fixed-function matrix
//! builders the renderer needs (Euler rotations in degrees, GL-style
//! perspective and orthographic projections).

pub use nalgebra::{Matrix4, Rotation3, Unit, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    #[must_use]
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    #[must_use]
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Linear interpolation
    #[must_use]
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        (b - a).mul_add(t, a)
    }
}

/// Extension trait for Mat4 with the fixed-function matrix builders
pub trait Mat4Ext {
    /// Rotation from Euler angles in degrees, applied Z·Y·X
    /// (`Rz * Ry * Rx`, so X is applied to the vertex first).
    fn euler_degrees(angles: &Vec3) -> Mat4;

    /// OpenGL-style perspective projection (`fov_y` in degrees, clip z in `[-w, w]`)
    fn perspective_gl(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// OpenGL-style orthographic projection
    fn orthographic_gl(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4;

    /// Non-uniform scale about the origin
    fn scaling(x: f32, y: f32, z: f32) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn euler_degrees(angles: &Vec3) -> Mat4 {
        Rotation3::from_euler_angles(
            utils::deg_to_rad(angles.x),
            utils::deg_to_rad(angles.y),
            utils::deg_to_rad(angles.z),
        )
        .to_homogeneous()
    }

    fn perspective_gl(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let f = 1.0 / (utils::deg_to_rad(fov_y_degrees) * 0.5).tan();

        let mut result = Mat4::zeros();
        result[(0, 0)] = f / aspect;
        result[(1, 1)] = f;
        result[(2, 2)] = (far + near) / (near - far);
        result[(2, 3)] = (2.0 * far * near) / (near - far);
        result[(3, 2)] = -1.0;
        result
    }

    fn orthographic_gl(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
        let mut result = Mat4::identity();
        result[(0, 0)] = 2.0 / (right - left);
        result[(1, 1)] = 2.0 / (top - bottom);
        result[(2, 2)] = -2.0 / (far - near);
        result[(0, 3)] = -(right + left) / (right - left);
        result[(1, 3)] = -(top + bottom) / (top - bottom);
        result[(2, 3)] = -(far + near) / (far - near);
        result
    }

    fn scaling(x: f32, y: f32, z: f32) -> Mat4 {
        Mat4::new_nonuniform_scaling(&Vec3::new(x, y, z))
    }
}

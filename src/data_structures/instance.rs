//! Placement of a model in the world.

use cgmath::{One, Rad, Rotation3};

/// Translation, rotation (as quaternion) and scale of one drawn model.
///
/// [`to_matrix`](Self::to_matrix) composes them as `T * R * S`, so the
/// rotation happens around the model's own origin.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Instance {
    pub position: cgmath::Vector3<f32>,
    pub rotation: cgmath::Quaternion<f32>,
    pub scale: cgmath::Vector3<f32>,
}

impl Instance {
    /// Identity transformation (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            position: cgmath::Vector3::new(0.0, 0.0, 0.0),
            rotation: cgmath::Quaternion::one(),
            scale: cgmath::Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn at(position: cgmath::Vector3<f32>) -> Self {
        Self {
            position,
            ..Self::new()
        }
    }

    pub fn rotated_x(mut self, angle: Rad<f32>) -> Self {
        self.rotation = self.rotation * cgmath::Quaternion::from_angle_x(angle);
        self
    }

    pub fn rotated_y(mut self, angle: Rad<f32>) -> Self {
        self.rotation = self.rotation * cgmath::Quaternion::from_angle_y(angle);
        self
    }

    pub fn to_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.position)
            * cgmath::Matrix4::from(self.rotation)
            * cgmath::Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

impl Default for Instance {
    fn default() -> Self {
        Self::new()
    }
}

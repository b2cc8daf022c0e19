//! The owner-entity handle an action reads and mutates.
//!
//! The engine never owns the entity; the host lends a shared handle whose
//! transform actions may rotate or read. The runner hosts a single flat
//! entity, so world-space translation coincides with local translation,
//! but the two stay separate accessors because the box-containment action
//! is specified against world space.

use std::cell::RefCell;
use std::rc::Rc;

use glam::{EulerRot, Mat3, Quat, Vec3};

#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Mat3,
}

impl Default for Transform {
    fn default() -> Self {
        Transform {
            translation: Vec3::ZERO,
            rotation: Mat3::IDENTITY,
        }
    }
}

/// Cloneable handle to the host's entity transform.
#[derive(Clone, Default)]
pub struct OwnerEntity {
    inner: Rc<RefCell<Transform>>,
}

impl OwnerEntity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn translation(&self) -> Vec3 {
        self.inner.borrow().translation
    }

    pub fn set_translation(&self, translation: Vec3) {
        self.inner.borrow_mut().translation = translation;
    }

    pub fn world_translation(&self) -> Vec3 {
        self.inner.borrow().translation
    }

    pub fn rotation(&self) -> Mat3 {
        self.inner.borrow().rotation
    }

    pub fn rotate_x(&self, radians: f32) {
        let mut transform = self.inner.borrow_mut();
        transform.rotation = transform.rotation * Mat3::from_rotation_x(radians);
    }

    pub fn rotate_y(&self, radians: f32) {
        let mut transform = self.inner.borrow_mut();
        transform.rotation = transform.rotation * Mat3::from_rotation_y(radians);
    }

    pub fn rotate_z(&self, radians: f32) {
        let mut transform = self.inner.borrow_mut();
        transform.rotation = transform.rotation * Mat3::from_rotation_z(radians);
    }

    pub fn set_rotation_xyz(&self, x: f32, y: f32, z: f32) {
        self.inner.borrow_mut().rotation = Mat3::from_euler(EulerRot::XYZ, x, y, z);
    }

    /// Rotation decomposed as XYZ Euler angles, for hosts that report pose.
    pub fn rotation_euler_xyz(&self) -> (f32, f32, f32) {
        Quat::from_mat3(&self.inner.borrow().rotation).to_euler(EulerRot::XYZ)
    }
}

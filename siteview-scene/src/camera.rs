//! Perspective camera

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// 3D camera for viewing the scene
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera3D {
    /// Camera position in world space
    pub position: Vec3,
    /// Target position the camera is looking at
    pub target: Vec3,
    /// Up vector (usually Y-axis)
    pub up: Vec3,
    /// Vertical field of view in radians
    pub fov: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
    /// Aspect ratio (width / height)
    pub aspect_ratio: f32,
    projection: Mat4,
}

impl Camera3D {
    /// Create a new perspective camera
    pub fn new_perspective(
        position: Vec3,
        target: Vec3,
        fov: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let mut camera = Self {
            position,
            target,
            up: Vec3::Y,
            fov,
            near,
            far,
            aspect_ratio,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    /// Get the view matrix (world to camera space)
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Projection matrix as of the last [`Camera3D::update_projection_matrix`] call
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    /// Recompute the projection matrix after fov, aspect or clip planes changed
    pub fn update_projection_matrix(&mut self) {
        self.projection = Mat4::perspective_rh(
            self.fov,
            self.aspect_ratio.max(f32::EPSILON),
            self.near,
            self.far,
        );
    }

    /// Get the combined view-projection matrix
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }

    /// Update aspect ratio (e.g., when window resizes)
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }
}

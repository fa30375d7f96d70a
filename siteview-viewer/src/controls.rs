//! Orbit-style camera controls
//!
//! The camera orbits a target on a sphere described by radius, polar angle `phi`
//! (from +Y) and azimuth `theta` (around +Y, from +Z). Input moves a goal state;
//! [`CameraControls::update`] moves the camera toward it.

use crate::config::ControlsConfig;
use serde::{Deserialize, Serialize};
use siteview_scene::{Aabb, Camera3D, Vec3};
use std::f32::consts::{FRAC_PI_2, PI};

/// Keeps the polar angle off the poles
const POLAR_EPSILON: f32 = 1e-4;
/// Closest allowed orbit radius
const MIN_DISTANCE: f32 = 1e-3;
/// Goal and current closer than this count as settled
const REST_THRESHOLD: f32 = 1e-4;

/// What a mouse button does while dragging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseAction {
    /// Ignore the button
    None,
    /// Orbit around the target
    Rotate,
    /// Pan the target in the view plane
    Truck,
    /// Move toward or away from the target
    Dolly,
}

/// Mouse buttons the controls understand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    /// Primary button
    Left,
    /// Wheel button
    Middle,
    /// Secondary button
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    phi: f32,
    theta: f32,
}

impl Spherical {
    fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self { radius, phi: 0.0, theta: 0.0 };
        }
        Self {
            radius,
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            theta: offset.x.atan2(offset.z),
        }
    }

    fn direction(&self) -> Vec3 {
        let sin_phi = self.phi.sin();
        Vec3::new(sin_phi * self.theta.sin(), self.phi.cos(), sin_phi * self.theta.cos())
    }

    fn to_offset(self) -> Vec3 {
        self.direction() * self.radius
    }

    fn clamp_phi(&mut self) {
        self.phi = self.phi.clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
    }
}

/// Orbit camera controls with smoothing, wheel dolly and box fitting
#[derive(Debug, Clone)]
pub struct CameraControls {
    config: ControlsConfig,
    target: Vec3,
    goal_target: Vec3,
    spherical: Spherical,
    goal: Spherical,
    dragging: bool,
    needs_update: bool,
    enabled: bool,
}

impl CameraControls {
    /// Attach controls to a camera's current pose
    pub fn new(camera: &Camera3D, config: ControlsConfig) -> Self {
        let mut spherical = Spherical::from_offset(camera.position - camera.target);
        spherical.clamp_phi();
        Self {
            config,
            target: camera.target,
            goal_target: camera.target,
            spherical,
            goal: spherical,
            dragging: false,
            needs_update: true,
            enabled: true,
        }
    }

    /// Orbit the goal by the given angles in radians
    pub fn rotate(&mut self, azimuth: f32, polar: f32) {
        if !self.enabled {
            return;
        }
        self.goal.theta += azimuth;
        self.goal.phi += polar;
        self.goal.clamp_phi();
        self.needs_update = true;
    }

    /// Move the goal toward the target by `distance`
    pub fn dolly(&mut self, distance: f32) {
        if !self.enabled {
            return;
        }
        self.goal.radius = (self.goal.radius - distance).max(MIN_DISTANCE);
        self.needs_update = true;
    }

    /// Pan the goal target in the view plane
    pub fn truck(&mut self, x: f32, y: f32) {
        if !self.enabled {
            return;
        }
        let (right, up) = view_axes(&self.goal);
        self.goal_target += right * x + up * y;
        self.needs_update = true;
    }

    /// Apply a pointer drag of `dx`/`dy` pixels on a viewport `height` pixels tall
    pub fn handle_drag(&mut self, button: MouseButton, dx: f32, dy: f32, height: f32) {
        let height = height.max(1.0);
        self.dragging = true;
        match self.action_for(button) {
            MouseAction::None => {}
            MouseAction::Rotate => self.rotate(-2.0 * PI * dx / height, -2.0 * PI * dy / height),
            MouseAction::Truck => {
                let scale = self.goal.radius / height;
                self.truck(-dx * scale, dy * scale);
            }
            MouseAction::Dolly => self.dolly(-dy * self.goal.radius / height),
        }
    }

    /// Finish a pointer drag
    pub fn end_drag(&mut self) {
        self.dragging = false;
        self.needs_update = true;
    }

    /// Zoom by a wheel step; positive `delta` moves away.
    ///
    /// With dolly-to-cursor enabled and a world-space `cursor` point, the target
    /// slides toward that point by the same fraction the radius shrinks.
    pub fn handle_wheel(&mut self, delta: f32, cursor: Option<Vec3>) {
        if !self.enabled {
            return;
        }
        let radius = self.goal.radius;
        let next = (radius * 0.95f32.powf(-delta * self.config.dolly_speed)).max(MIN_DISTANCE);
        if self.config.dolly_to_cursor {
            if let Some(point) = cursor {
                let fraction = 1.0 - next / radius;
                self.goal_target += (point - self.goal_target) * fraction;
            }
        }
        self.goal.radius = next;
        self.needs_update = true;
    }

    /// Frame a box: snap the orbit to the nearest quarter turns, center on the box
    /// and back off until it fills the view.
    pub fn fit_to_box(&mut self, camera: &Camera3D, bounds: &Aabb, transition: bool) {
        let mut goal = Spherical {
            radius: self.goal.radius,
            theta: snap_quarter(self.goal.theta),
            phi: snap_quarter(self.goal.phi),
        };
        goal.clamp_phi();

        let size = bounds.size();
        let (right, up) = view_axes(&goal);
        let width = size.dot(right.abs());
        let height = size.dot(up.abs()).max(f32::EPSILON);
        let depth = size.dot(goal.direction().abs());

        let aspect = camera.aspect_ratio;
        let height_to_fit = if width / height < aspect { height } else { width / aspect };
        let distance = height_to_fit * 0.5 / (camera.fov * 0.5).tan() + depth * 0.5;
        goal.radius = distance.max(MIN_DISTANCE);

        self.goal = goal;
        self.goal_target = bounds.center();
        if !transition {
            self.spherical = goal;
            self.target = self.goal_target;
        }
        self.needs_update = true;
        tracing::debug!(distance = goal.radius, center = ?self.goal_target, "fit camera to box");
    }

    /// Advance toward the goal and write the pose into `camera`.
    ///
    /// Returns whether the camera moved.
    pub fn update(&mut self, camera: &mut Camera3D, delta: f32) -> bool {
        if !self.enabled || !(self.needs_update || self.dragging) {
            return false;
        }

        let smooth_time = if self.dragging {
            self.config.dragging_smooth_time
        } else {
            self.config.smooth_time
        };
        if smooth_time <= 0.0 {
            self.spherical = self.goal;
            self.target = self.goal_target;
        } else {
            let t = 1.0 - (-4.0 * delta.max(0.0) / smooth_time).exp();
            self.spherical.radius += (self.goal.radius - self.spherical.radius) * t;
            self.spherical.phi += (self.goal.phi - self.spherical.phi) * t;
            self.spherical.theta += (self.goal.theta - self.spherical.theta) * t;
            self.target = self.target.lerp(self.goal_target, t);
        }

        if self.is_settled() {
            self.spherical = self.goal;
            self.target = self.goal_target;
            self.needs_update = false;
        }

        let position = self.target + self.spherical.to_offset();
        let moved = position != camera.position || self.target != camera.target;
        camera.position = position;
        camera.target = self.target;
        moved
    }

    /// Stop reacting to input and updates
    pub fn dispose(&mut self) {
        self.enabled = false;
        self.dragging = false;
        self.needs_update = false;
    }

    /// Whether the controls still react
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Current orbit target
    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Current orbit radius
    pub fn distance(&self) -> f32 {
        self.spherical.radius
    }

    /// Current azimuth in radians
    pub fn azimuth(&self) -> f32 {
        self.spherical.theta
    }

    /// Current polar angle in radians
    pub fn polar(&self) -> f32 {
        self.spherical.phi
    }

    fn action_for(&self, button: MouseButton) -> MouseAction {
        match button {
            MouseButton::Left => self.config.left_button,
            MouseButton::Middle => self.config.middle_button,
            MouseButton::Right => self.config.right_button,
        }
    }

    fn is_settled(&self) -> bool {
        (self.goal.radius - self.spherical.radius).abs() < REST_THRESHOLD
            && (self.goal.phi - self.spherical.phi).abs() < REST_THRESHOLD
            && (self.goal.theta - self.spherical.theta).abs() < REST_THRESHOLD
            && self.goal_target.distance(self.target) < REST_THRESHOLD
    }
}

/// Screen right and up in world space for an orbit pose
fn view_axes(spherical: &Spherical) -> (Vec3, Vec3) {
    let right = Vec3::new(spherical.theta.cos(), 0.0, -spherical.theta.sin());
    let up = spherical.direction().cross(right);
    (right, up)
}

fn snap_quarter(angle: f32) -> f32 {
    (angle / FRAC_PI_2).round() * FRAC_PI_2
}

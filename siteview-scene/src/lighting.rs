//! Lighting system for 3D scenes

use crate::primitives::Color;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Types of lights supported
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LightType {
    /// Ambient light - uniform lighting from all directions
    Ambient {
        /// Light color
        color: Color,
        /// Intensity
        intensity: f32,
    },
    /// Directional light - parallel rays (like the sun) from `position` toward `target`
    Directional {
        /// Position the rays originate from
        position: Vec3,
        /// Point the light is aimed at
        target: Vec3,
        /// Light color
        color: Color,
        /// Intensity
        intensity: f32,
    },
}

/// Shadow map settings for a shadow-casting light
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShadowSettings {
    /// Shadow map width in texels
    pub map_width: u32,
    /// Shadow map height in texels
    pub map_height: u32,
    /// Near plane of the shadow camera
    pub near: f32,
    /// Far plane of the shadow camera
    pub far: f32,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            map_width: 512,
            map_height: 512,
            near: 0.5,
            far: 500.0,
        }
    }
}

/// A light source in the 3D scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Light {
    /// Unique identifier
    pub id: String,
    /// Type of light
    pub light_type: LightType,
    /// Whether the light is enabled
    pub enabled: bool,
    /// Shadow settings, `Some` when the light casts shadows
    pub shadow: Option<ShadowSettings>,
}

impl Light {
    /// Create a new ambient light
    pub fn new_ambient(id: String, color: Color, intensity: f32) -> Self {
        Self {
            id,
            light_type: LightType::Ambient { color, intensity },
            enabled: true,
            shadow: None, // Ambient lights don't cast shadows
        }
    }

    /// Create a new directional light aimed at the origin
    pub fn new_directional(id: String, position: Vec3, color: Color, intensity: f32) -> Self {
        Self {
            id,
            light_type: LightType::Directional {
                position,
                target: Vec3::ZERO,
                color,
                intensity,
            },
            enabled: true,
            shadow: None,
        }
    }

    /// Enable shadow casting with the given settings
    pub fn with_shadow(mut self, shadow: ShadowSettings) -> Self {
        self.shadow = Some(shadow);
        self
    }

    /// Whether this light casts shadows
    pub fn casts_shadows(&self) -> bool {
        self.shadow.is_some()
    }

    /// Direction of the rays for directional lights
    pub fn direction(&self) -> Option<Vec3> {
        match self.light_type {
            LightType::Directional {
                position, target, ..
            } => Some((target - position).normalize_or_zero()),
            LightType::Ambient { .. } => None,
        }
    }
}

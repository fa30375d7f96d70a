//! Material system for 3D objects

use crate::primitives::Color;
use serde::{Deserialize, Serialize};

/// Types of materials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MaterialType {
    /// Basic unlit material
    Unlit {
        /// Base color
        color: Color,
    },
    /// Physically-based rendering material
    PBR {
        /// Base color
        base_color: Color,
        /// Metallic factor (0.0 = dielectric, 1.0 = metal)
        metallic: f32,
        /// Roughness factor (0.0 = smooth, 1.0 = rough)
        roughness: f32,
        /// Emissive color (for glowing materials)
        emissive: Color,
        /// Multiplier applied to the emissive color
        emissive_intensity: f32,
    },
    /// Simple Phong shading
    Phong {
        /// Diffuse color
        diffuse: Color,
        /// Specular color
        specular: Color,
        /// Shininess
        shininess: f32,
    },
}

/// A material defines how a surface looks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material3D {
    /// Material uuid from the source document, if any
    pub uuid: Option<String>,
    /// Material name
    pub name: String,
    /// Material type
    pub material_type: MaterialType,
    /// Opacity (1.0 = opaque)
    pub opacity: f32,
    /// Whether the renderer should blend this material
    pub transparent: bool,
    /// Double-sided rendering
    pub double_sided: bool,
}

impl Material3D {
    fn with_type(name: String, material_type: MaterialType) -> Self {
        Self {
            uuid: None,
            name,
            material_type,
            opacity: 1.0,
            transparent: false,
            double_sided: false,
        }
    }

    /// Create a new unlit material
    pub fn new_unlit(name: String, color: Color) -> Self {
        Self::with_type(name, MaterialType::Unlit { color })
    }

    /// Create a new PBR material
    pub fn new_pbr(name: String, base_color: Color, metallic: f32, roughness: f32) -> Self {
        Self::with_type(
            name,
            MaterialType::PBR {
                base_color,
                metallic,
                roughness,
                emissive: Color::BLACK,
                emissive_intensity: 1.0,
            },
        )
    }

    /// Create a new Phong material
    pub fn new_phong(name: String, diffuse: Color, specular: Color, shininess: f32) -> Self {
        Self::with_type(
            name,
            MaterialType::Phong {
                diffuse,
                specular,
                shininess,
            },
        )
    }

    /// Set the emissive color and intensity; only PBR materials glow
    pub fn with_emissive(mut self, color: Color, intensity: f32) -> Self {
        if let MaterialType::PBR {
            ref mut emissive,
            ref mut emissive_intensity,
            ..
        } = self.material_type
        {
            *emissive = color;
            *emissive_intensity = intensity;
        }
        self
    }

    /// Make the material translucent with the given opacity
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self.transparent = opacity < 1.0;
        self
    }

    /// The main surface color regardless of shading model
    pub fn color(&self) -> Color {
        match self.material_type {
            MaterialType::Unlit { color } => color,
            MaterialType::PBR { base_color, .. } => base_color,
            MaterialType::Phong { diffuse, .. } => diffuse,
        }
    }
}

impl Default for Material3D {
    fn default() -> Self {
        Self::new_pbr("Default".to_string(), Color::WHITE, 0.0, 1.0)
    }
}

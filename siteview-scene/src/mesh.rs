//! Geometry representation

use crate::bounds::Aabb;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Upper bound on sphere segments and rings
pub const MAX_SPHERE_SEGMENTS: u32 = 512;

/// A 3D vertex with position, normal, and texture coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex3D {
    /// Position in 3D space
    pub position: Vec3,
    /// Surface normal
    pub normal: Vec3,
    /// Texture coordinates
    pub tex_coords: Vec2,
}

impl Vertex3D {
    /// Create a new vertex
    pub fn new(position: Vec3, normal: Vec3, tex_coords: Vec2) -> Self {
        Self {
            position,
            normal,
            tex_coords,
        }
    }
}

/// Triangle geometry shared by any number of mesh nodes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mesh3D {
    /// Geometry uuid from the source document, if any
    pub uuid: Option<String>,
    /// Geometry name
    pub name: String,
    /// Vertex data
    pub vertices: Vec<Vertex3D>,
    /// Index data (triangles)
    pub indices: Vec<u32>,
}

impl Mesh3D {
    /// Create a new empty geometry
    pub fn new(name: String) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    /// Local-space bounding box, `None` for an empty geometry
    pub fn bounding_box(&self) -> Option<Aabb> {
        Aabb::from_points(self.vertices.iter().map(|v| v.position))
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Create an axis-aligned box centered on the origin
    pub fn create_box(width: f32, height: f32, depth: f32) -> Self {
        let (hx, hy, hz) = (width * 0.5, height * 0.5, depth * 0.5);

        let vertices = vec![
            // Front face
            Vertex3D::new(Vec3::new(-hx, -hy, hz), Vec3::Z, Vec2::new(0.0, 0.0)),
            Vertex3D::new(Vec3::new(hx, -hy, hz), Vec3::Z, Vec2::new(1.0, 0.0)),
            Vertex3D::new(Vec3::new(hx, hy, hz), Vec3::Z, Vec2::new(1.0, 1.0)),
            Vertex3D::new(Vec3::new(-hx, hy, hz), Vec3::Z, Vec2::new(0.0, 1.0)),
            // Back face
            Vertex3D::new(Vec3::new(-hx, -hy, -hz), -Vec3::Z, Vec2::new(1.0, 0.0)),
            Vertex3D::new(Vec3::new(-hx, hy, -hz), -Vec3::Z, Vec2::new(1.0, 1.0)),
            Vertex3D::new(Vec3::new(hx, hy, -hz), -Vec3::Z, Vec2::new(0.0, 1.0)),
            Vertex3D::new(Vec3::new(hx, -hy, -hz), -Vec3::Z, Vec2::new(0.0, 0.0)),
            // Top face
            Vertex3D::new(Vec3::new(-hx, hy, -hz), Vec3::Y, Vec2::new(0.0, 1.0)),
            Vertex3D::new(Vec3::new(-hx, hy, hz), Vec3::Y, Vec2::new(0.0, 0.0)),
            Vertex3D::new(Vec3::new(hx, hy, hz), Vec3::Y, Vec2::new(1.0, 0.0)),
            Vertex3D::new(Vec3::new(hx, hy, -hz), Vec3::Y, Vec2::new(1.0, 1.0)),
            // Bottom face
            Vertex3D::new(Vec3::new(-hx, -hy, -hz), -Vec3::Y, Vec2::new(1.0, 1.0)),
            Vertex3D::new(Vec3::new(hx, -hy, -hz), -Vec3::Y, Vec2::new(0.0, 1.0)),
            Vertex3D::new(Vec3::new(hx, -hy, hz), -Vec3::Y, Vec2::new(0.0, 0.0)),
            Vertex3D::new(Vec3::new(-hx, -hy, hz), -Vec3::Y, Vec2::new(1.0, 0.0)),
            // Right face
            Vertex3D::new(Vec3::new(hx, -hy, -hz), Vec3::X, Vec2::new(1.0, 0.0)),
            Vertex3D::new(Vec3::new(hx, hy, -hz), Vec3::X, Vec2::new(1.0, 1.0)),
            Vertex3D::new(Vec3::new(hx, hy, hz), Vec3::X, Vec2::new(0.0, 1.0)),
            Vertex3D::new(Vec3::new(hx, -hy, hz), Vec3::X, Vec2::new(0.0, 0.0)),
            // Left face
            Vertex3D::new(Vec3::new(-hx, -hy, -hz), -Vec3::X, Vec2::new(0.0, 0.0)),
            Vertex3D::new(Vec3::new(-hx, -hy, hz), -Vec3::X, Vec2::new(1.0, 0.0)),
            Vertex3D::new(Vec3::new(-hx, hy, hz), -Vec3::X, Vec2::new(1.0, 1.0)),
            Vertex3D::new(Vec3::new(-hx, hy, -hz), -Vec3::X, Vec2::new(0.0, 1.0)),
        ];

        let indices = vec![
            0, 1, 2, 2, 3, 0,       // front
            4, 5, 6, 6, 7, 4,       // back
            8, 9, 10, 10, 11, 8,    // top
            12, 13, 14, 14, 15, 12, // bottom
            16, 17, 18, 18, 19, 16, // right
            20, 21, 22, 22, 23, 20, // left
        ];

        Self {
            uuid: None,
            name: "Box".to_string(),
            vertices,
            indices,
        }
    }

    /// Create a UV sphere centered on the origin
    pub fn create_sphere(radius: f32, segments: u32, rings: u32) -> Self {
        let segments = segments.clamp(3, MAX_SPHERE_SEGMENTS);
        let rings = rings.clamp(2, MAX_SPHERE_SEGMENTS);
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        for ring in 0..=rings {
            let phi = std::f32::consts::PI * (ring as f32) / (rings as f32);
            let y = phi.cos();
            let r = phi.sin();

            for segment in 0..=segments {
                let theta = 2.0 * std::f32::consts::PI * (segment as f32) / (segments as f32);
                let x = r * theta.cos();
                let z = r * theta.sin();

                let position = Vec3::new(x, y, z) * radius;
                let normal = Vec3::new(x, y, z).normalize_or_zero();
                let tex_coords = Vec2::new(
                    (segment as f32) / (segments as f32),
                    (ring as f32) / (rings as f32),
                );

                vertices.push(Vertex3D::new(position, normal, tex_coords));
            }
        }

        for ring in 0..rings {
            for segment in 0..segments {
                let current = ring * (segments + 1) + segment;
                let next = current + segments + 1;

                indices.push(current);
                indices.push(next);
                indices.push(current + 1);

                indices.push(current + 1);
                indices.push(next);
                indices.push(next + 1);
            }
        }

        Self {
            uuid: None,
            name: "Sphere".to_string(),
            vertices,
            indices,
        }
    }
}

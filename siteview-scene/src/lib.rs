//! Scene graph model for the siteview viewer
//!
//! This crate provides the rendering-library side of the viewer: an owned tree of
//! transformable nodes, geometry, materials, lights, a perspective camera and the
//! loader for the JSON "Object" scene format.

#![warn(missing_docs)]

pub mod bounds;
pub mod camera;
pub mod error;
pub mod lighting;
pub mod material;
pub mod mesh;
pub mod object;
pub mod object_loader;
pub mod primitives;
pub mod scene3d;

pub use bounds::Aabb;
pub use camera::Camera3D;
pub use error::{Result, SceneError};
pub use lighting::{Light, LightType, ShadowSettings};
pub use material::{Material3D, MaterialType};
pub use mesh::{Mesh3D, Vertex3D, MAX_SPHERE_SEGMENTS};
pub use object::{NodeId, NodeKind, Object3D};
pub use object_loader::ObjectLoader;
pub use primitives::Color;
pub use scene3d::Scene3D;

pub use glam::{Mat4, Quat, Vec2, Vec3};

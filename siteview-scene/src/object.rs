//! Owned scene graph nodes
//!
//! Children are owned by their parent, so a node can never have two parents and the
//! tree can never contain a cycle.

use crate::bounds::Aabb;
use crate::material::Material3D;
use crate::mesh::Mesh3D;
use glam::{Mat4, Quat, Vec3};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Identity of a node inside one scene graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a node contributes to the rendered image
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Pure grouping node
    Group,
    /// Renderable geometry with a material
    Mesh {
        /// Shared geometry
        geometry: Arc<Mesh3D>,
        /// Current material
        material: Arc<Material3D>,
    },
}

/// A node in the scene graph
#[derive(Debug, Clone)]
pub struct Object3D {
    /// Identity of the node
    pub id: NodeId,
    /// Uuid from the source document, if any
    pub uuid: Option<String>,
    /// Human-readable name, empty when unnamed
    pub name: String,
    /// Type name from the source document (`Group`, `Mesh`, ...)
    pub object_type: String,
    /// Local translation
    pub position: Vec3,
    /// Local rotation
    pub rotation: Quat,
    /// Local scale
    pub scale: Vec3,
    /// Group or mesh payload
    pub kind: NodeKind,
    /// Owned children in order
    pub children: Vec<Object3D>,
    /// Open metadata bag
    pub user_data: Map<String, Value>,
}

impl Object3D {
    /// Create a grouping node
    pub fn new_group(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            uuid: None,
            name: name.into(),
            object_type: "Group".to_string(),
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            kind: NodeKind::Group,
            children: Vec::new(),
            user_data: Map::new(),
        }
    }

    /// Create a renderable mesh node
    pub fn new_mesh(
        id: NodeId,
        name: impl Into<String>,
        geometry: Arc<Mesh3D>,
        material: Arc<Material3D>,
    ) -> Self {
        Self {
            object_type: "Mesh".to_string(),
            kind: NodeKind::Mesh { geometry, material },
            ..Self::new_group(id, name)
        }
    }

    /// Append a child, taking ownership of it
    pub fn add(&mut self, child: Object3D) {
        self.children.push(child);
    }

    /// Whether this node carries geometry and a material
    pub fn is_renderable(&self) -> bool {
        matches!(self.kind, NodeKind::Mesh { .. })
    }

    /// Current material of a mesh node
    pub fn material(&self) -> Option<&Arc<Material3D>> {
        match &self.kind {
            NodeKind::Mesh { material, .. } => Some(material),
            NodeKind::Group => None,
        }
    }

    /// Replace the material of a mesh node, returning the previous one
    pub fn set_material(&mut self, new_material: Arc<Material3D>) -> Option<Arc<Material3D>> {
        match &mut self.kind {
            NodeKind::Mesh { material, .. } => Some(std::mem::replace(material, new_material)),
            NodeKind::Group => None,
        }
    }

    /// Local transform matrix
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Set the local transform from a matrix
    pub fn set_matrix(&mut self, matrix: Mat4) {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        self.scale = scale;
        self.rotation = rotation;
        self.position = translation;
    }

    /// Rotate around the local X axis
    pub fn rotate_x(&mut self, angle: f32) {
        self.rotation = (self.rotation * Quat::from_rotation_x(angle)).normalize();
    }

    /// Pre-order iterator over this node and all of its descendants
    pub fn traverse(&self) -> Traverse<'_> {
        Traverse { stack: vec![self] }
    }

    /// Visit this node and all descendants in pre-order, mutably
    pub fn traverse_mut<F: FnMut(&mut Object3D)>(&mut self, f: &mut F) {
        f(self);
        for child in &mut self.children {
            child.traverse_mut(f);
        }
    }

    /// Find a node in this subtree
    pub fn find(&self, id: NodeId) -> Option<&Object3D> {
        self.traverse().find(|node| node.id == id)
    }

    /// Find a node in this subtree, mutably
    pub fn find_mut(&mut self, id: NodeId) -> Option<&mut Object3D> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    /// Ids of every renderable node in this subtree, in pre-order
    pub fn mesh_ids(&self) -> Vec<NodeId> {
        self.traverse().filter(|n| n.is_renderable()).map(|n| n.id).collect()
    }

    /// World-space bounds of this subtree, treating this node's parent as the world
    pub fn bounding_box(&self) -> Option<Aabb> {
        let mut bounds = None;
        self.expand_bounds(Mat4::IDENTITY, &mut bounds);
        bounds
    }

    fn expand_bounds(&self, parent: Mat4, bounds: &mut Option<Aabb>) {
        let world = parent * self.matrix();
        if let NodeKind::Mesh { geometry, .. } = &self.kind {
            if let Some(local) = geometry.bounding_box() {
                let transformed = local.transformed(&world);
                *bounds = Some(match bounds {
                    Some(acc) => acc.union(&transformed),
                    None => transformed,
                });
            }
        }
        for child in &self.children {
            child.expand_bounds(world, bounds);
        }
    }
}

/// Pre-order traversal over a subtree
pub struct Traverse<'a> {
    stack: Vec<&'a Object3D>,
}

impl<'a> Iterator for Traverse<'a> {
    type Item = &'a Object3D;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> Object3D {
        let geometry = Arc::new(Mesh3D::create_box(1.0, 1.0, 1.0));
        let material = Arc::new(Material3D::default());

        let mut root = Object3D::new_group(NodeId(0), "root");
        let mut group = Object3D::new_group(NodeId(1), "group");
        group.add(Object3D::new_mesh(NodeId(2), "a", geometry.clone(), material.clone()));
        group.add(Object3D::new_mesh(NodeId(3), "b", geometry.clone(), material.clone()));
        root.add(group);
        root.add(Object3D::new_mesh(NodeId(4), "c", geometry, material));
        root
    }

    #[test]
    fn test_traverse_is_preorder() {
        let root = sample_tree();
        let ids: Vec<u32> = root.traverse().map(|n| n.id.0).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
        assert_eq!(root.mesh_ids(), vec![NodeId(2), NodeId(3), NodeId(4)]);
    }

    #[test]
    fn test_find_mut_and_material_swap() {
        let mut root = sample_tree();
        let replacement = Arc::new(Material3D::new_unlit("x".to_string(), crate::Color::BLACK));

        let node = root.find_mut(NodeId(3)).unwrap();
        let previous = node.set_material(replacement.clone()).unwrap();
        assert_eq!(previous.name, "Default");
        assert!(Arc::ptr_eq(root.find(NodeId(3)).unwrap().material().unwrap(), &replacement));

        assert!(root.find_mut(NodeId(1)).unwrap().set_material(replacement).is_none());
        assert!(root.find(NodeId(42)).is_none());
    }

    #[test]
    fn test_bounds_include_transforms() {
        let mut root = sample_tree();
        root.children[1].position = Vec3::new(10.0, 0.0, 0.0);
        let bounds = root.bounding_box().unwrap();
        assert_eq!(bounds.min, Vec3::splat(-0.5));
        assert_eq!(bounds.max, Vec3::new(10.5, 0.5, 0.5));
    }
}

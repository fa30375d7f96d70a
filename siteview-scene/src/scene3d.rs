//! 3D scene management

use crate::lighting::Light;
use crate::object::{NodeId, Object3D};
use crate::primitives::Color;

/// A complete 3D scene: top-level objects, lights and background
#[derive(Debug, Clone)]
pub struct Scene3D {
    /// Scene name
    pub name: String,
    /// Clear color
    pub background: Color,
    /// All lights
    pub lights: Vec<Light>,
    /// Top-level objects
    pub children: Vec<Object3D>,
}

impl Scene3D {
    /// Create a new empty scene
    pub fn new(name: String) -> Self {
        Self {
            name,
            background: Color::BLACK,
            lights: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add a top-level object
    pub fn add(&mut self, object: Object3D) {
        self.children.push(object);
    }

    /// Add a light
    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    /// Remove a top-level object
    pub fn remove(&mut self, id: NodeId) -> Option<Object3D> {
        let index = self.children.iter().position(|child| child.id == id)?;
        Some(self.children.remove(index))
    }

    /// Remove every object and light
    pub fn clear(&mut self) {
        self.children.clear();
        self.lights.clear();
    }

    /// Find a node anywhere in the scene
    pub fn find(&self, id: NodeId) -> Option<&Object3D> {
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Find a node anywhere in the scene, mutably
    pub fn find_mut(&mut self, id: NodeId) -> Option<&mut Object3D> {
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    /// Iterate every node in the scene in pre-order
    pub fn objects(&self) -> impl Iterator<Item = &Object3D> {
        self.children.iter().flat_map(|child| child.traverse())
    }

    /// Number of renderable nodes
    pub fn mesh_count(&self) -> usize {
        self.objects().filter(|node| node.is_renderable()).count()
    }
}

impl Default for Scene3D {
    fn default() -> Self {
        Self::new("Scene".to_string())
    }
}

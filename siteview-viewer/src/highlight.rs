//! Status-colored highlighting by material swap
//!
//! Original materials are captured at most once per highlight session and restored
//! from that capture, never from whatever the node carries at clear time.

use crate::error::{Result, ViewerError};
use crate::redraw::RedrawFlag;
use crate::status::{status_color, ProgressStatus, StatusMetadata};
use siteview_scene::{Material3D, NodeId, Object3D, Scene3D};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

/// Emissive strength of highlight materials
pub const HIGHLIGHT_EMISSIVE_INTENSITY: f32 = 0.5;
/// Opacity of highlight materials
pub const HIGHLIGHT_OPACITY: f32 = 0.7;

/// Owns every active highlight and the materials it displaced
pub struct HighlightManager {
    original_materials: HashMap<NodeId, Arc<Material3D>>,
    highlighted: Vec<NodeId>,
    palette: HashMap<i64, Arc<Material3D>>,
    redraw: RedrawFlag,
}

impl HighlightManager {
    /// Create a manager that requests redraws through `redraw`
    pub fn new(redraw: RedrawFlag) -> Self {
        Self {
            original_materials: HashMap::new(),
            highlighted: Vec::new(),
            palette: HashMap::new(),
            redraw,
        }
    }

    /// Replace the current highlight with every renderable descendant of `targets`.
    ///
    /// Unknown targets fail the whole call before anything changes. Returns the
    /// number of meshes now highlighted.
    pub fn highlight_objects(&mut self, scene: &mut Scene3D, targets: &[NodeId]) -> Result<usize> {
        if let Some(missing) = targets.iter().find(|id| scene.find(**id).is_none()) {
            return Err(ViewerError::UnknownNode(missing.0));
        }

        self.clear_highlight(scene);

        for target in targets {
            let Some(node) = scene.find_mut(*target) else {
                continue;
            };
            let originals = &mut self.original_materials;
            let highlighted = &mut self.highlighted;
            let palette = &mut self.palette;
            node.traverse_mut(&mut |child: &mut Object3D| {
                let Some(current) = child.material().cloned() else {
                    return;
                };
                if let Entry::Vacant(entry) = originals.entry(child.id) {
                    entry.insert(current);
                    highlighted.push(child.id);
                }
                let code = StatusMetadata::from_node(child).map_or(1, |m| m.status_code);
                let material = palette
                    .entry(code)
                    .or_insert_with(|| Arc::new(highlight_material(code)))
                    .clone();
                child.set_material(material);
            });
        }

        tracing::debug!(
            targets = targets.len(),
            meshes = self.highlighted.len(),
            "highlight applied"
        );
        self.redraw.request();
        Ok(self.highlighted.len())
    }

    /// Restore every captured material and end the session
    pub fn clear_highlight(&mut self, scene: &mut Scene3D) {
        for id in self.highlighted.drain(..) {
            let Some(original) = self.original_materials.remove(&id) else {
                continue;
            };
            match scene.find_mut(id) {
                Some(node) => {
                    node.set_material(original);
                }
                None => tracing::debug!(node = %id, "highlighted node left the scene"),
            }
        }
        self.original_materials.clear();
        self.redraw.request();
    }

    /// Forget all highlight state without touching the scene
    pub fn reset(&mut self) {
        self.highlighted.clear();
        self.original_materials.clear();
    }

    /// Number of meshes whose material is currently swapped
    pub fn highlighted_count(&self) -> usize {
        self.highlighted.len()
    }

    /// Whether a node's material is currently swapped
    pub fn is_highlighted(&self, id: NodeId) -> bool {
        self.original_materials.contains_key(&id)
    }

    /// Material captured for a node when it entered the highlight
    pub fn original_material(&self, id: NodeId) -> Option<&Arc<Material3D>> {
        self.original_materials.get(&id)
    }
}

/// Emissive, translucent material in the status color
pub fn highlight_material(status_code: i64) -> Material3D {
    let color = status_color(status_code);
    let name = match ProgressStatus::from_code(status_code) {
        Some(status) => format!("highlight-{:?}", status),
        None => "highlight".to_string(),
    };
    Material3D::new_pbr(name, color, 0.0, 1.0)
        .with_emissive(color, HIGHLIGHT_EMISSIVE_INTENSITY)
        .with_opacity(HIGHLIGHT_OPACITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use siteview_scene::{Color, Mesh3D, MaterialType};

    fn part(id: u32, status: Option<i64>, material: &Arc<Material3D>) -> Object3D {
        let mut node = Object3D::new_mesh(
            NodeId(id),
            format!("part {}", id),
            Arc::new(Mesh3D::create_box(1.0, 1.0, 1.0)),
            material.clone(),
        );
        if let Some(code) = status {
            StatusMetadata {
                status_code: code,
                status_text: String::new(),
            }
            .attach(&mut node);
        }
        node
    }

    /// root(0) -> [group(1) -> [2, 3], 4, 5]
    fn scene() -> (Scene3D, Vec<Arc<Material3D>>) {
        let materials: Vec<Arc<Material3D>> = (0..4)
            .map(|i| Arc::new(Material3D::new_unlit(format!("m{}", i), Color::WHITE)))
            .collect();
        let mut root = Object3D::new_group(NodeId(0), "root");
        let mut group = Object3D::new_group(NodeId(1), "group");
        group.add(part(2, Some(2), &materials[0]));
        group.add(part(3, Some(4), &materials[1]));
        root.add(group);
        root.add(part(4, None, &materials[2]));
        root.add(part(5, Some(3), &materials[3]));

        let mut scene = Scene3D::default();
        scene.add(root);
        (scene, materials)
    }

    fn material_of(scene: &Scene3D, id: u32) -> Arc<Material3D> {
        scene.find(NodeId(id)).unwrap().material().unwrap().clone()
    }

    #[test]
    fn test_highlight_uses_status_colors() {
        let (mut scene, _) = scene();
        let mut manager = HighlightManager::new(RedrawFlag::default());

        let count = manager.highlight_objects(&mut scene, &[NodeId(1), NodeId(4)]).unwrap();
        assert_eq!(count, 3);

        assert_eq!(material_of(&scene, 2).color().to_rgb_u32(), 0xffaa00);
        assert_eq!(material_of(&scene, 3).color().to_rgb_u32(), 0x00ff00);
        // No metadata falls back to status 1
        assert_eq!(material_of(&scene, 4).color().to_rgb_u32(), 0xff4444);

        let highlight = material_of(&scene, 2);
        assert!(highlight.transparent);
        assert_eq!(highlight.opacity, HIGHLIGHT_OPACITY);
        assert!(matches!(
            highlight.material_type,
            MaterialType::PBR { emissive_intensity, .. }
                if emissive_intensity == HIGHLIGHT_EMISSIVE_INTENSITY
        ));
    }

    #[test]
    fn test_clear_restores_exact_originals() {
        let (mut scene, materials) = scene();
        let redraw = RedrawFlag::default();
        let mut manager = HighlightManager::new(redraw.clone());

        manager.highlight_objects(&mut scene, &[NodeId(0)]).unwrap();
        assert_eq!(manager.highlighted_count(), 4);
        assert!(redraw.take());

        manager.clear_highlight(&mut scene);
        assert!(redraw.take());
        assert_eq!(manager.highlighted_count(), 0);
        for (id, original) in [2, 3, 4, 5].into_iter().zip(&materials) {
            assert!(Arc::ptr_eq(&material_of(&scene, id), original));
        }
    }

    #[test]
    fn test_overlapping_targets_capture_once() {
        let (mut scene, materials) = scene();
        let mut manager = HighlightManager::new(RedrawFlag::default());

        // The group and its child both reach node 2
        manager.highlight_objects(&mut scene, &[NodeId(1), NodeId(2)]).unwrap();
        assert_eq!(manager.highlighted_count(), 2);
        assert!(Arc::ptr_eq(manager.original_material(NodeId(2)).unwrap(), &materials[0]));

        manager.clear_highlight(&mut scene);
        assert!(Arc::ptr_eq(&material_of(&scene, 2), &materials[0]));
    }

    #[test]
    fn test_second_highlight_replaces_first() {
        let (mut scene, materials) = scene();
        let mut manager = HighlightManager::new(RedrawFlag::default());

        manager.highlight_objects(&mut scene, &[NodeId(1)]).unwrap();
        manager.highlight_objects(&mut scene, &[NodeId(5)]).unwrap();

        assert_eq!(manager.highlighted_count(), 1);
        assert!(!manager.is_highlighted(NodeId(2)));
        assert!(!manager.is_highlighted(NodeId(3)));
        assert!(Arc::ptr_eq(&material_of(&scene, 2), &materials[0]));
        assert!(Arc::ptr_eq(&material_of(&scene, 3), &materials[1]));
        assert!(Arc::ptr_eq(manager.original_material(NodeId(5)).unwrap(), &materials[3]));
    }

    #[test]
    fn test_unknown_target_changes_nothing() {
        let (mut scene, materials) = scene();
        let mut manager = HighlightManager::new(RedrawFlag::default());
        manager.highlight_objects(&mut scene, &[NodeId(2)]).unwrap();

        let err = manager.highlight_objects(&mut scene, &[NodeId(3), NodeId(99)]).unwrap_err();
        assert!(matches!(err, ViewerError::UnknownNode(99)));
        assert!(manager.is_highlighted(NodeId(2)));
        assert!(Arc::ptr_eq(&material_of(&scene, 3), &materials[1]));
    }

    #[test]
    fn test_empty_input_reverts_scene() {
        let (mut scene, materials) = scene();
        let mut manager = HighlightManager::new(RedrawFlag::default());
        manager.highlight_objects(&mut scene, &[NodeId(5)]).unwrap();

        assert_eq!(manager.highlight_objects(&mut scene, &[]).unwrap(), 0);
        assert!(Arc::ptr_eq(&material_of(&scene, 5), &materials[3]));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let (mut scene, _) = scene();
        let redraw = RedrawFlag::default();
        let mut manager = HighlightManager::new(redraw.clone());

        manager.clear_highlight(&mut scene);
        manager.clear_highlight(&mut scene);
        assert!(redraw.take());
        assert_eq!(manager.highlighted_count(), 0);
    }
}

//! Read-only tree snapshot for side-panel collaborators

use crate::status::StatusMetadata;
use serde::Serialize;
use siteview_scene::Object3D;

/// One node of the hierarchy snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyNode {
    /// Node id
    pub id: u32,
    /// Display label: the node name, or `Object_<id>` when unnamed
    pub label: String,
    /// Status code of renderable nodes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i64>,
    /// Child snapshots in scene order
    pub children: Vec<HierarchyNode>,
}

impl HierarchyNode {
    /// Snapshot `node` and its subtree
    pub fn from_object(node: &Object3D) -> Self {
        let label = if node.name.is_empty() {
            format!("Object_{}", node.id)
        } else {
            node.name.clone()
        };
        Self {
            id: node.id.0,
            label,
            status: StatusMetadata::from_node(node).map(|meta| meta.status_code),
            children: node.children.iter().map(Self::from_object).collect(),
        }
    }

    /// Number of nodes in this subtree
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(HierarchyNode::node_count).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siteview_scene::NodeId;

    #[test]
    fn test_unnamed_nodes_get_fallback_label() {
        let mut root = Object3D::new_group(NodeId(0), "Конструкция");
        root.add(Object3D::new_group(NodeId(7), ""));

        let tree = HierarchyNode::from_object(&root);
        assert_eq!(tree.label, "Конструкция");
        assert_eq!(tree.children[0].label, "Object_7");
        assert_eq!(tree.children[0].status, None);
        assert_eq!(tree.node_count(), 2);
    }
}

//! Viewer status and per-part progress status

use serde::{Deserialize, Serialize};
use siteview_scene::{Color, NodeId, Object3D};
use std::fmt;

/// Key of the status metadata in a node's metadata bag
pub const STATUS_KEY: &str = "propertyValue";

/// Lifecycle state of a viewer instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewerStatus {
    /// A model load is in flight
    Loading,
    /// The model is attached
    Idle,
    /// The last load failed
    Error,
}

impl fmt::Display for ViewerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ViewerStatus::Loading => "loading",
            ViewerStatus::Idle => "idle",
            ViewerStatus::Error => "error",
        };
        f.write_str(name)
    }
}

/// Construction progress of a part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProgressStatus {
    /// Not started
    Planned = 1,
    /// Work under way
    InProgress = 2,
    /// Partly mounted
    PartiallyInstalled = 3,
    /// Done
    Installed = 4,
}

impl ProgressStatus {
    /// All statuses in code order
    pub const ALL: [ProgressStatus; 4] = [
        ProgressStatus::Planned,
        ProgressStatus::InProgress,
        ProgressStatus::PartiallyInstalled,
        ProgressStatus::Installed,
    ];

    /// Status for a numeric code
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(ProgressStatus::Planned),
            2 => Some(ProgressStatus::InProgress),
            3 => Some(ProgressStatus::PartiallyInstalled),
            4 => Some(ProgressStatus::Installed),
            _ => None,
        }
    }

    /// Status derived from a node identity: `(id mod 4) + 1`
    pub fn for_node(id: NodeId) -> Self {
        match id.0 % 4 {
            0 => ProgressStatus::Planned,
            1 => ProgressStatus::InProgress,
            2 => ProgressStatus::PartiallyInstalled,
            _ => ProgressStatus::Installed,
        }
    }

    /// Numeric code (1-4)
    pub fn code(self) -> i64 {
        self as i64
    }

    /// Indicator color, shared by highlights and UI
    pub fn color(self) -> Color {
        status_color(self.code())
    }
}

/// Indicator color for a status code; unknown codes are white
pub fn status_color(code: i64) -> Color {
    let rgb = match code {
        1 => 0xff4444,
        2 => 0xffaa00,
        3 => 0xffff00,
        4 => 0x00ff00,
        _ => 0xffffff,
    };
    Color::from_rgb_u32(rgb)
}

/// Status tag attached to every renderable leaf at load time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusMetadata {
    /// Status code (1-4)
    pub status_code: i64,
    /// Human label of the status
    pub status_text: String,
}

impl StatusMetadata {
    /// Read the metadata from a node, if present and well-formed
    pub fn from_node(node: &Object3D) -> Option<Self> {
        let value = node.user_data.get(STATUS_KEY)?;
        serde_json::from_value(value.clone()).ok()
    }

    /// Store the metadata in a node's metadata bag
    pub fn attach(&self, node: &mut Object3D) {
        // Two plain fields always serialize.
        if let Ok(value) = serde_json::to_value(self) {
            node.user_data.insert(STATUS_KEY.to_string(), value);
        }
    }

    /// Known status, if the code is in range
    pub fn status(&self) -> Option<ProgressStatus> {
        ProgressStatus::from_code(self.status_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_mapping() {
        let codes: Vec<i64> = (0..8)
            .map(|id| ProgressStatus::for_node(NodeId(id)).code())
            .collect();
        assert_eq!(codes, vec![1, 2, 3, 4, 1, 2, 3, 4]);
    }

    #[test]
    fn test_color_table() {
        assert_eq!(status_color(1).to_rgb_u32(), 0xff4444);
        assert_eq!(status_color(2).to_rgb_u32(), 0xffaa00);
        assert_eq!(status_color(3).to_rgb_u32(), 0xffff00);
        assert_eq!(status_color(4).to_rgb_u32(), 0x00ff00);
        assert_eq!(status_color(0).to_rgb_u32(), 0xffffff);
        assert_eq!(status_color(9).to_rgb_u32(), 0xffffff);
        for status in ProgressStatus::ALL {
            assert_eq!(status.color(), status_color(status.code()));
        }
    }

    #[test]
    fn test_metadata_round_trips_through_node() {
        let mut node = Object3D::new_group(NodeId(5), "part");
        assert!(StatusMetadata::from_node(&node).is_none());

        let metadata = StatusMetadata {
            status_code: 2,
            status_text: "In progress".to_string(),
        };
        metadata.attach(&mut node);

        assert_eq!(node.user_data[STATUS_KEY]["statusCode"], 2);
        assert_eq!(StatusMetadata::from_node(&node), Some(metadata));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ViewerStatus::Loading.to_string(), "loading");
        assert_eq!(serde_json::to_string(&ViewerStatus::Idle).unwrap(), "\"idle\"");
    }
}

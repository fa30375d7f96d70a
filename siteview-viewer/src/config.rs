//! Viewer configuration

use crate::controls::MouseAction;
use crate::error::ConfigError;
use crate::status::ProgressStatus;
use serde::{Deserialize, Serialize};
use siteview_scene::Color;
use std::path::Path;

/// Viewer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Endpoint serving the model document
    #[serde(default = "default_model_url")]
    pub model_url: String,

    /// Scene background as a hex color
    #[serde(default = "default_background")]
    pub background: String,

    /// Initial camera setup
    #[serde(default)]
    pub camera: CameraConfig,

    /// Camera controls tuning
    #[serde(default)]
    pub controls: ControlsConfig,

    /// Light rig
    #[serde(default)]
    pub lights: LightsConfig,

    /// Display names written into the model
    #[serde(default)]
    pub labels: LabelsConfig,

    /// Target frames per second of the native frame clock
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,

    /// Whether the renderer draws shadows
    #[serde(default = "default_true")]
    pub shadow_map: bool,

    /// Give up on the model request after this many seconds (native only)
    #[serde(default)]
    pub load_timeout_secs: Option<u64>,
}

/// Initial camera setup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    #[serde(default = "default_fov")]
    pub fov_degrees: f32,
    /// Near clipping plane
    #[serde(default = "default_near")]
    pub near: f32,
    /// Far clipping plane
    #[serde(default = "default_far")]
    pub far: f32,
    /// Initial camera position
    #[serde(default = "default_camera_position")]
    pub position: [f32; 3],
}

/// Camera controls tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlsConfig {
    /// Zoom toward the point under the cursor
    #[serde(default = "default_true")]
    pub dolly_to_cursor: bool,
    /// Wheel zoom speed factor
    #[serde(default = "default_dolly_speed")]
    pub dolly_speed: f32,
    /// Seconds to settle after programmatic moves (0 = instant)
    #[serde(default)]
    pub smooth_time: f32,
    /// Seconds to settle while dragging (0 = instant)
    #[serde(default)]
    pub dragging_smooth_time: f32,
    /// Action bound to the left mouse button
    #[serde(default = "default_left_button")]
    pub left_button: MouseAction,
    /// Action bound to the middle mouse button
    #[serde(default = "default_middle_button")]
    pub middle_button: MouseAction,
    /// Action bound to the right mouse button
    #[serde(default = "default_right_button")]
    pub right_button: MouseAction,
}

/// Light rig configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightsConfig {
    /// Directional light color
    #[serde(default = "default_light_color")]
    pub directional_color: String,
    /// Directional light intensity
    #[serde(default = "default_directional_intensity")]
    pub directional_intensity: f32,
    /// Directional light position, aimed at the origin
    #[serde(default = "default_directional_position")]
    pub directional_position: [f32; 3],
    /// Shadow map resolution (square)
    #[serde(default = "default_shadow_map_size")]
    pub shadow_map_size: u32,
    /// Shadow camera near plane
    #[serde(default = "default_shadow_near")]
    pub shadow_near: f32,
    /// Shadow camera far plane
    #[serde(default = "default_shadow_far")]
    pub shadow_far: f32,
    /// Ambient fill color
    #[serde(default = "default_light_color")]
    pub ambient_color: String,
    /// Ambient fill intensity
    #[serde(default = "default_ambient_intensity")]
    pub ambient_intensity: f32,
}

/// Display names written into the model at load time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelsConfig {
    /// Root name in the source document that gets replaced
    #[serde(default = "default_root_name")]
    pub root_name: String,
    /// Replacement for [`LabelsConfig::root_name`]
    #[serde(default = "default_root_label")]
    pub root_label: String,
    /// Prefix of synthesized part names
    #[serde(default = "default_part_prefix")]
    pub part_prefix: String,
    /// Human labels of the four progress statuses
    #[serde(default)]
    pub statuses: StatusLabels,
}

/// Human labels of the progress statuses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusLabels {
    /// Label of status 1
    pub planned: String,
    /// Label of status 2
    pub in_progress: String,
    /// Label of status 3
    pub partially_installed: String,
    /// Label of status 4
    pub installed: String,
}

fn default_model_url() -> String {
    "https://storage.yandexcloud.net/lahta.contextmachine.online/files/pretty_ceiling_props.json".to_string()
}

fn default_background() -> String {
    "#333333".to_string()
}

fn default_frame_rate() -> u32 {
    60
}

fn default_true() -> bool {
    true
}

fn default_fov() -> f32 {
    75.0
}

fn default_near() -> f32 {
    0.1
}

fn default_far() -> f32 {
    1000.0
}

fn default_camera_position() -> [f32; 3] {
    [10.0, 10.0, 10.0]
}

fn default_dolly_speed() -> f32 {
    0.4
}

fn default_left_button() -> MouseAction {
    MouseAction::None
}

fn default_middle_button() -> MouseAction {
    MouseAction::Dolly
}

fn default_right_button() -> MouseAction {
    MouseAction::Rotate
}

fn default_light_color() -> String {
    "#ffffff".to_string()
}

fn default_directional_intensity() -> f32 {
    1.0
}

fn default_directional_position() -> [f32; 3] {
    [5.0, 10.0, 15.0]
}

fn default_shadow_map_size() -> u32 {
    2048
}

fn default_shadow_near() -> f32 {
    0.5
}

fn default_shadow_far() -> f32 {
    50.0
}

fn default_ambient_intensity() -> f32 {
    1.5
}

fn default_root_name() -> String {
    "PrettyCeiling".to_string()
}

fn default_root_label() -> String {
    "Конструкция".to_string()
}

fn default_part_prefix() -> String {
    "Деталь здания".to_string()
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            model_url: default_model_url(),
            background: default_background(),
            camera: CameraConfig::default(),
            controls: ControlsConfig::default(),
            lights: LightsConfig::default(),
            labels: LabelsConfig::default(),
            frame_rate: default_frame_rate(),
            shadow_map: default_true(),
            load_timeout_secs: None,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: default_fov(),
            near: default_near(),
            far: default_far(),
            position: default_camera_position(),
        }
    }
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            dolly_to_cursor: default_true(),
            dolly_speed: default_dolly_speed(),
            smooth_time: 0.0,
            dragging_smooth_time: 0.0,
            left_button: default_left_button(),
            middle_button: default_middle_button(),
            right_button: default_right_button(),
        }
    }
}

impl Default for LightsConfig {
    fn default() -> Self {
        Self {
            directional_color: default_light_color(),
            directional_intensity: default_directional_intensity(),
            directional_position: default_directional_position(),
            shadow_map_size: default_shadow_map_size(),
            shadow_near: default_shadow_near(),
            shadow_far: default_shadow_far(),
            ambient_color: default_light_color(),
            ambient_intensity: default_ambient_intensity(),
        }
    }
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            root_name: default_root_name(),
            root_label: default_root_label(),
            part_prefix: default_part_prefix(),
            statuses: StatusLabels::default(),
        }
    }
}

impl Default for StatusLabels {
    fn default() -> Self {
        Self {
            planned: "В планах".to_string(),
            in_progress: "В процессе".to_string(),
            partially_installed: "Частичная установка".to_string(),
            installed: "Установлено".to_string(),
        }
    }
}

impl StatusLabels {
    /// English labels
    pub fn english() -> Self {
        Self {
            planned: "Planned".to_string(),
            in_progress: "In progress".to_string(),
            partially_installed: "Partially installed".to_string(),
            installed: "Installed".to_string(),
        }
    }

    /// Label of a status
    pub fn label(&self, status: ProgressStatus) -> &str {
        match status {
            ProgressStatus::Planned => &self.planned,
            ProgressStatus::InProgress => &self.in_progress,
            ProgressStatus::PartiallyInstalled => &self.partially_installed,
            ProgressStatus::Installed => &self.installed,
        }
    }
}

impl LabelsConfig {
    /// English part names and status labels, keeping the root rename
    pub fn english() -> Self {
        Self {
            part_prefix: "Part".to_string(),
            statuses: StatusLabels::english(),
            ..Self::default()
        }
    }
}

impl ViewerConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Background color, falling back to the default on a malformed value
    pub fn background_color(&self) -> Color {
        parse_color(&self.background, &default_background())
    }
}

/// Parse a hex color, logging and falling back on failure
pub(crate) fn parse_color(value: &str, fallback: &str) -> Color {
    Color::from_hex(value).unwrap_or_else(|err| {
        tracing::warn!(value, %err, "invalid color in config, using {}", fallback);
        Color::from_hex(fallback).unwrap_or(Color::WHITE)
    })
}

//! Site viewer runtime
//!
//! Loads a construction model from a remote document, keeps it in a live scene
//! rendered by a continuous loop, and highlights parts by their progress status.
//!
//! ```no_run
//! use siteview_viewer::{HeadlessRenderer, IntervalClock, Viewer, ViewerConfig, Viewport};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ViewerConfig::default();
//! let frame_rate = config.frame_rate;
//! let renderer = Box::new(HeadlessRenderer::new());
//! let viewer = Viewer::from_config(config, renderer, Viewport::new(1280, 720))?;
//! let (_resize, events) = tokio::sync::mpsc::unbounded_channel();
//! viewer.mount(IntervalClock::new(frame_rate), events)?;
//! viewer.load().await?;
//! let planned = viewer.nodes_with_status(1);
//! viewer.highlight_objects(&planned)?;
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod config;
pub mod controls;
pub mod error;
pub mod hierarchy;
pub mod highlight;
pub mod lights;
pub mod loader;
pub mod payload;
pub mod redraw;
pub mod render;
pub mod resize;
pub mod source;
pub mod status;
pub mod task;
pub mod viewer;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use clock::FrameClock;
#[cfg(not(target_arch = "wasm32"))]
pub use clock::IntervalClock;
pub use config::{
    CameraConfig, ControlsConfig, LabelsConfig, LightsConfig, StatusLabels, ViewerConfig,
};
pub use controls::{CameraControls, MouseAction, MouseButton};
pub use error::{ConfigError, LoadError, Result, ViewerError};
pub use hierarchy::HierarchyNode;
pub use highlight::HighlightManager;
pub use loader::ModelLoader;
pub use redraw::RedrawFlag;
pub use render::{FrameLog, HeadlessRenderer, RenderBackend};
pub use resize::{ResizeHandler, Viewport};
#[cfg(not(target_arch = "wasm32"))]
pub use source::FileSource;
pub use source::{DocumentSource, HttpSource, StaticSource};
pub use status::{ProgressStatus, StatusMetadata, ViewerStatus};
pub use viewer::Viewer;

pub use siteview_scene as scene;

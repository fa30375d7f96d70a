//! Viewer error types

use serde_json::Value;
use siteview_scene::SceneError;
use std::path::PathBuf;
use thiserror::Error;

/// Type alias for viewer command results
pub type Result<T> = std::result::Result<T, ViewerError>;

/// Why a model could not be produced
#[derive(Error, Debug)]
pub enum LoadError {
    /// The HTTP request failed or returned a non-success status
    #[error("Failed to fetch model document: {0}")]
    Http(#[from] reqwest::Error),

    /// A local document could not be read
    #[error("Failed to read model document {path}: {source}")]
    Io {
        /// Path of the document
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The response body is not JSON
    #[error("Model document is not valid JSON: {0}")]
    Document(#[from] serde_json::Error),

    /// The document contains no embedded scene description
    #[error("No embedded scene description found in the model document")]
    SignatureNotFound,

    /// The embedded scene description could not be turned into a scene
    #[error("Failed to parse scene description: {source}")]
    Parse {
        /// The underlying scene error
        #[source]
        source: SceneError,
        /// The sanitized payload that failed, for diagnosis
        payload: Box<Value>,
    },
}

impl LoadError {
    /// Whether the failure happened before a document was available
    pub fn is_transport(&self) -> bool {
        matches!(self, LoadError::Http(_) | LoadError::Io { .. } | LoadError::Document(_))
    }
}

/// Errors returned by viewer commands
#[derive(Error, Debug)]
pub enum ViewerError {
    /// The viewer has been disposed
    #[error("Viewer has been disposed")]
    Disposed,

    /// A command referenced a node that is not in the scene
    #[error("Node {0} is not part of the scene")]
    UnknownNode(u32),

    /// The render backend failed to draw a frame
    #[error("Render error: {0}")]
    Render(String),
}

/// Errors reading a viewer configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// Path of the config file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid TOML for [`crate::ViewerConfig`]
    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

//! Scene loading error types

use thiserror::Error;

/// Type alias for scene results
pub type Result<T> = std::result::Result<T, SceneError>;

/// Errors that can occur while building a scene from an object document
#[derive(Error, Debug)]
pub enum SceneError {
    /// The document has no `object` entry to build a node tree from
    #[error("Invalid object document: missing `object` entry")]
    MissingObject,

    /// A material uses a type the loader cannot construct
    #[error("Unknown material type `{kind}` for material {uuid}")]
    UnknownMaterialType {
        /// Material uuid
        uuid: String,
        /// The unsupported type name
        kind: String,
    },

    /// A geometry attribute array is malformed
    #[error("Invalid attribute `{attribute}` in geometry {geometry}: {reason}")]
    InvalidAttribute {
        /// Geometry uuid
        geometry: String,
        /// Attribute name
        attribute: String,
        /// What is wrong with it
        reason: String,
    },

    /// An object matrix does not have 16 elements
    #[error("Invalid matrix on object {object}: expected 16 elements, got {len}")]
    InvalidMatrix {
        /// Object name or uuid
        object: String,
        /// Number of elements found
        len: usize,
    },

    /// The document does not have the expected JSON shape
    #[error("Malformed object document: {0}")]
    Json(#[from] serde_json::Error),
}

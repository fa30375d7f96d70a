//! Model acquisition: fetch, locate, sanitize, parse, tag

use crate::config::LabelsConfig;
use crate::error::LoadError;
use crate::payload::{find_scene_payload, sanitize};
use crate::source::DocumentSource;
use crate::status::{ProgressStatus, StatusMetadata};
use siteview_scene::{Object3D, ObjectLoader};

/// Loads the model tree from a document source
pub struct ModelLoader {
    source: Box<dyn DocumentSource>,
    labels: LabelsConfig,
}

impl ModelLoader {
    /// Create a loader reading from `source`
    pub fn new(source: Box<dyn DocumentSource>, labels: LabelsConfig) -> Self {
        Self { source, labels }
    }

    /// Where documents come from, for logs
    pub fn describe(&self) -> String {
        self.source.describe()
    }

    /// Load the model.
    ///
    /// Transport failures and documents without a scene description resolve to
    /// `Ok(None)` after being logged; a payload that fails to parse is an error.
    pub async fn load_model(&self) -> Result<Option<Object3D>, LoadError> {
        match self.try_load().await {
            Ok(model) => Ok(Some(model)),
            Err(err) if err.is_transport() => {
                tracing::warn!(
                    source = %self.source.describe(),
                    error = %err,
                    "Failed to load model"
                );
                Ok(None)
            }
            Err(LoadError::SignatureNotFound) => {
                tracing::warn!(
                    source = %self.source.describe(),
                    "no embedded scene description in model document"
                );
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Load the model, reporting every failure kind distinctly
    pub async fn try_load(&self) -> Result<Object3D, LoadError> {
        let document = self.source.fetch().await?;
        let payload = find_scene_payload(&document).ok_or(LoadError::SignatureNotFound)?;
        let mut model = parse_payload(payload.clone(), &self.labels)?;
        assign_property_values(&mut model, &self.labels);
        Ok(model)
    }
}

/// Sanitize a located payload and build the node tree from it
pub fn parse_payload(
    payload: serde_json::Value,
    labels: &LabelsConfig,
) -> Result<Object3D, LoadError> {
    let cleaned = sanitize(payload, labels);
    ObjectLoader::parse(&cleaned).map_err(|source| {
        tracing::error!(error = %source, "error while parsing scene description");
        tracing::error!(
            payload = %serde_json::to_string_pretty(&cleaned).unwrap_or_default(),
            "problematic scene description"
        );
        LoadError::Parse {
            source,
            payload: Box::new(cleaned),
        }
    })
}

/// Name every renderable leaf and tag it with the status derived from its identity
pub fn assign_property_values(model: &mut Object3D, labels: &LabelsConfig) {
    let mut counter = 1;
    model.traverse_mut(&mut |node: &mut Object3D| {
        if !node.is_renderable() {
            return;
        }
        let status = ProgressStatus::for_node(node.id);
        let label = labels.statuses.label(status);
        node.name = format!("{} {} ({})", labels.part_prefix, counter, label);
        counter += 1;

        StatusMetadata {
            status_code: status.code(),
            status_text: label.to_string(),
        }
        .attach(node);
    });
}

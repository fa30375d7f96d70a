//! Shared fixtures for viewer integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use siteview_viewer::clock::FrameClock;
use siteview_viewer::render::FrameLog;
use siteview_viewer::{
    DocumentSource, HeadlessRenderer, LoadError, StaticSource, Viewer, ViewerConfig, Viewport,
};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use tokio::sync::{mpsc, oneshot};

/// Scene payload with four geometries whose root is named `PrettyCeiling`.
///
/// Pre-order ids: 0 root, 1 column, 2 roof frame, 3 slab, 4 dome, 5 panel.
pub fn scene_payload(generator: &str) -> Value {
    json!({
        "metadata": { "version": 4.6, "type": "Object", "generator": generator },
        "geometries": [
            { "uuid": "g-column", "type": "BoxGeometry", "width": 1, "height": 10, "depth": 1 },
            { "uuid": "g-slab", "type": "BoxGeometry", "width": 4, "height": 1, "depth": 4 },
            {
                "uuid": "g-dome", "type": "SphereGeometry",
                "radius": 1, "widthSegments": 8, "heightSegments": 6
            },
            {
                "uuid": "g-panel",
                "type": "BufferGeometry",
                "data": {
                    "attributes": {
                        "position": {
                            "itemSize": 3,
                            "type": "Float32Array",
                            "array": [0, 0, 0, 1, 0, 0, 0, 1, 0],
                            "normalized": false
                        }
                    }
                }
            }
        ],
        "materials": [
            {
                "uuid": "m-concrete", "type": "MeshStandardMaterial",
                "color": 0xcccccc, "__typename": "Material"
            },
            {
                "uuid": "m-steel", "type": "MeshStandardMaterial",
                "color": 0x8899aa, "metalness": 0.8, "emissive": null
            }
        ],
        "object": {
            "uuid": "root",
            "type": "Group",
            "name": "PrettyCeiling",
            "children": [
                {
                    "type": "Mesh", "name": "column_a",
                    "geometry": "g-column", "material": "m-concrete", "position": [0, 5, 0]
                },
                {
                    "type": "Group",
                    "name": "roof_frame",
                    "children": [
                        {
                            "type": "Mesh", "geometry": "g-slab",
                            "material": "m-concrete", "position": [0, 10.5, 0]
                        },
                        {
                            "type": "Mesh", "geometry": "g-dome",
                            "material": "m-steel", "position": [0, 12, 0]
                        },
                        {
                            "type": "Mesh", "geometry": "g-panel",
                            "material": "m-steel", "userData": null
                        }
                    ]
                }
            ]
        }
    })
}

/// The payload wrapped in an API envelope with unrelated noise
pub fn enveloped_document() -> Value {
    json!({
        "data": {
            "__typename": "Query",
            "project": {
                "title": "Lahta",
                "files": [
                    { "name": "readme", "content": "n/a", "meta": null },
                    { "name": "ceiling", "content": { "scene": scene_payload("X") } }
                ]
            }
        }
    })
}

/// Viewer over an in-memory document with a headless renderer
pub fn headless_viewer(document: Value) -> (Viewer, Rc<RefCell<FrameLog>>) {
    viewer_with_source(Box::new(StaticSource::new(document)))
}

/// Viewer over any source with a headless renderer
pub fn viewer_with_source(source: Box<dyn DocumentSource>) -> (Viewer, Rc<RefCell<FrameLog>>) {
    let renderer = HeadlessRenderer::new();
    let log = renderer.log();
    let viewport = Viewport::new(800, 600);
    let viewer = Viewer::new(ViewerConfig::default(), source, Box::new(renderer), viewport);
    (viewer, log)
}

/// Source that always fails like a dropped connection
pub struct OfflineSource;

#[async_trait(?Send)]
impl DocumentSource for OfflineSource {
    async fn fetch(&self) -> Result<Value, LoadError> {
        Err(LoadError::Io {
            path: "offline".into(),
            source: std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            ),
        })
    }

    fn describe(&self) -> String {
        "offline".to_string()
    }
}

/// Source whose fetch stays pending until the test releases a document
pub struct GatedSource {
    gate: RefCell<Option<oneshot::Receiver<Value>>>,
}

impl GatedSource {
    /// The source and the sender that releases it
    pub fn new() -> (Self, oneshot::Sender<Value>) {
        let (sender, receiver) = oneshot::channel();
        (
            Self {
                gate: RefCell::new(Some(receiver)),
            },
            sender,
        )
    }
}

#[async_trait(?Send)]
impl DocumentSource for GatedSource {
    async fn fetch(&self) -> Result<Value, LoadError> {
        let gate = self.gate.borrow_mut().take();
        match gate {
            Some(receiver) => Ok(receiver.await.unwrap_or(Value::Null)),
            None => Ok(Value::Null),
        }
    }

    fn describe(&self) -> String {
        "gated".to_string()
    }
}

/// Source that serves its documents in order, then waits on an optional gate
pub struct SequenceSource {
    documents: RefCell<VecDeque<Value>>,
    gate: RefCell<Option<oneshot::Receiver<Value>>>,
}

impl SequenceSource {
    pub fn new(documents: impl IntoIterator<Item = Value>) -> Self {
        Self {
            documents: RefCell::new(documents.into_iter().collect()),
            gate: RefCell::new(None),
        }
    }

    /// Serves `documents`, then stays pending until the returned sender fires
    pub fn gated_after(
        documents: impl IntoIterator<Item = Value>,
    ) -> (Self, oneshot::Sender<Value>) {
        let (sender, receiver) = oneshot::channel();
        let source = Self::new(documents);
        *source.gate.borrow_mut() = Some(receiver);
        (source, sender)
    }
}

#[async_trait(?Send)]
impl DocumentSource for SequenceSource {
    async fn fetch(&self) -> Result<Value, LoadError> {
        if let Some(document) = self.documents.borrow_mut().pop_front() {
            return Ok(document);
        }
        let gate = self.gate.borrow_mut().take();
        match gate {
            Some(receiver) => Ok(receiver.await.unwrap_or(Value::Null)),
            None => Ok(Value::Null),
        }
    }

    fn describe(&self) -> String {
        "sequence".to_string()
    }
}

/// Frame clock driven by hand
pub struct ManualClock {
    ticks: mpsc::UnboundedReceiver<()>,
}

impl ManualClock {
    /// The clock and the sender that fires frames
    pub fn new() -> (Self, mpsc::UnboundedSender<()>) {
        let (sender, ticks) = mpsc::unbounded_channel();
        (Self { ticks }, sender)
    }
}

#[async_trait(?Send)]
impl FrameClock for ManualClock {
    async fn next_frame(&mut self) {
        if self.ticks.recv().await.is_none() {
            futures::future::pending::<()>().await;
        }
    }
}

/// Let spawned local tasks run
pub async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

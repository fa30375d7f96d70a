//! Viewport resize handling

use crate::redraw::RedrawFlag;
use crate::task::spawn_local;
use futures::future::AbortHandle;
use siteview_scene::Camera3D;
use tokio::sync::mpsc::UnboundedReceiver;

/// Size of the drawing surface in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Width in CSS pixels
    pub width: u32,
    /// Height in CSS pixels
    pub height: u32,
    /// Physical pixels per CSS pixel
    pub pixel_ratio: f32,
}

impl Viewport {
    /// A viewport with a pixel ratio of 1
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixel_ratio: 1.0,
        }
    }

    /// Width over height; a zero height counts as one pixel
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// Point the camera at a new viewport and ask for a redraw
pub fn apply_resize(camera: &mut Camera3D, viewport: Viewport, redraw: &RedrawFlag) {
    camera.set_aspect_ratio(viewport.aspect());
    camera.update_projection_matrix();
    redraw.request();
}

/// Subscription to viewport size changes
#[derive(Debug, Default)]
pub struct ResizeHandler {
    task: Option<AbortHandle>,
}

impl ResizeHandler {
    /// Create an unregistered handler
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `on_resize` for every event until the channel closes or [`ResizeHandler::cleanup`].
    ///
    /// Replaces any earlier registration.
    pub fn setup<F>(&mut self, mut events: UnboundedReceiver<Viewport>, mut on_resize: F)
    where
        F: FnMut(Viewport) + 'static,
    {
        self.cleanup();
        self.task = Some(spawn_local(async move {
            while let Some(viewport) = events.recv().await {
                on_resize(viewport);
            }
        }));
    }

    /// Whether the handler is registered
    pub fn is_active(&self) -> bool {
        self.task.as_ref().map_or(false, |task| !task.is_aborted())
    }

    /// Stop listening
    pub fn cleanup(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for ResizeHandler {
    fn drop(&mut self) {
        self.cleanup();
    }
}

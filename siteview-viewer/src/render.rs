//! Render backend seam

use crate::error::{Result, ViewerError};
use siteview_scene::{Camera3D, Color, Mat4, Scene3D};
use std::cell::RefCell;
use std::rc::Rc;

/// Draws a scene through a camera into some surface
pub trait RenderBackend {
    /// Resize the drawing surface
    fn set_size(&mut self, width: u32, height: u32, pixel_ratio: f32);

    /// Enable or disable shadow mapping
    fn set_shadow_map_enabled(&mut self, enabled: bool);

    /// Draw one frame
    fn render(&mut self, scene: &Scene3D, camera: &Camera3D) -> Result<()>;

    /// Release the surface and any GPU resources
    fn dispose(&mut self);
}

/// What a [`HeadlessRenderer`] has seen
#[derive(Debug, Clone, Default)]
pub struct FrameLog {
    /// Frames drawn
    pub frames: usize,
    /// Renderable nodes in the last frame
    pub meshes: usize,
    /// Lights in the last frame
    pub lights: usize,
    /// Translucent materials in the last frame
    pub translucent: usize,
    /// Clear color of the last frame
    pub background: Option<Color>,
    /// View-projection matrix of the last frame
    pub view_projection: Option<Mat4>,
    /// Surface size in physical pixels
    pub size: (u32, u32),
    /// Whether shadow mapping is on
    pub shadow_map: bool,
    /// Whether the renderer was disposed
    pub disposed: bool,
}

/// Renderer that draws nothing and records every frame, for native hosts and tests
#[derive(Debug, Clone, Default)]
pub struct HeadlessRenderer {
    log: Rc<RefCell<FrameLog>>,
}

impl HeadlessRenderer {
    /// Create a headless renderer
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the frame log; stays readable after the renderer moves into a viewer
    pub fn log(&self) -> Rc<RefCell<FrameLog>> {
        self.log.clone()
    }
}

impl RenderBackend for HeadlessRenderer {
    fn set_size(&mut self, width: u32, height: u32, pixel_ratio: f32) {
        let scale = |v: u32| (v as f32 * pixel_ratio).round() as u32;
        self.log.borrow_mut().size = (scale(width), scale(height));
    }

    fn set_shadow_map_enabled(&mut self, enabled: bool) {
        self.log.borrow_mut().shadow_map = enabled;
    }

    fn render(&mut self, scene: &Scene3D, camera: &Camera3D) -> Result<()> {
        let mut log = self.log.borrow_mut();
        if log.disposed {
            return Err(ViewerError::Render("renderer has been disposed".to_string()));
        }

        let mut meshes = 0;
        let mut translucent = 0;
        for node in scene.objects() {
            if let Some(material) = node.material() {
                meshes += 1;
                if material.transparent {
                    translucent += 1;
                }
            }
        }

        log.frames += 1;
        log.meshes = meshes;
        log.translucent = translucent;
        log.lights = scene.lights.iter().filter(|light| light.enabled).count();
        log.background = Some(scene.background);
        log.view_projection = Some(camera.view_projection_matrix());
        tracing::trace!(frame = log.frames, meshes, "headless frame");
        Ok(())
    }

    fn dispose(&mut self) {
        self.log.borrow_mut().disposed = true;
    }
}

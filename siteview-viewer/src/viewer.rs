//! Viewer runtime: owns the scene and drives loading, highlighting and the render loop

use crate::clock::FrameClock;
use crate::config::ViewerConfig;
use crate::controls::CameraControls;
use crate::error::{LoadError, Result, ViewerError};
use crate::hierarchy::HierarchyNode;
use crate::highlight::HighlightManager;
use crate::lights::setup_lights;
use crate::loader::ModelLoader;
use crate::redraw::RedrawFlag;
use crate::render::RenderBackend;
use crate::resize::{apply_resize, ResizeHandler, Viewport};
use crate::source::{DocumentSource, HttpSource};
use crate::status::{StatusMetadata, ViewerStatus};
use crate::task::spawn_local;
use futures::future::AbortHandle;
use siteview_scene::{Camera3D, NodeId, Object3D, Scene3D, Vec3};
use std::cell::{Cell, RefCell};
use std::f32::consts::FRAC_PI_2;
use std::rc::{Rc, Weak};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::watch;
use tracing::Instrument;
use uuid::Uuid;
use web_time::Instant;

struct ViewerState {
    scene: Scene3D,
    camera: Camera3D,
    controls: CameraControls,
    renderer: Box<dyn RenderBackend>,
    highlight: HighlightManager,
    model: Option<NodeId>,
    viewport: Viewport,
    last_frame: Instant,
    frame_count: u64,
}

struct Shared {
    id: Uuid,
    config: ViewerConfig,
    state: RefCell<ViewerState>,
    status: watch::Sender<ViewerStatus>,
    redraw: RedrawFlag,
    loader: ModelLoader,
    render_task: RefCell<Option<AbortHandle>>,
    resize: RefCell<ResizeHandler>,
    disposed: Cell<bool>,
}

/// A mounted 3D viewer.
///
/// Single-threaded: all commands, the render loop and model loading run on one
/// thread and interleave only at `.await` points. Clones share the same instance.
#[derive(Clone)]
pub struct Viewer {
    shared: Rc<Shared>,
}

impl Viewer {
    /// Create a viewer with the light rig in place and status `Loading`
    pub fn new(
        config: ViewerConfig,
        source: Box<dyn DocumentSource>,
        mut renderer: Box<dyn RenderBackend>,
        viewport: Viewport,
    ) -> Self {
        let id = Uuid::new_v4();

        let mut scene = Scene3D::new(format!("viewer-{}", id));
        scene.background = config.background_color();
        setup_lights(&mut scene, &config.lights);

        let camera = Camera3D::new_perspective(
            Vec3::from_array(config.camera.position),
            Vec3::ZERO,
            config.camera.fov_degrees.to_radians(),
            viewport.aspect(),
            config.camera.near,
            config.camera.far,
        );
        let controls = CameraControls::new(&camera, config.controls.clone());

        renderer.set_size(viewport.width, viewport.height, viewport.pixel_ratio);
        renderer.set_shadow_map_enabled(config.shadow_map);

        let redraw = RedrawFlag::new();
        let (status, _) = watch::channel(ViewerStatus::Loading);
        let loader = ModelLoader::new(source, config.labels.clone());

        tracing::info!(viewer = %id, source = %loader.describe(), "viewer created");

        Self {
            shared: Rc::new(Shared {
                id,
                state: RefCell::new(ViewerState {
                    scene,
                    camera,
                    controls,
                    renderer,
                    highlight: HighlightManager::new(redraw.clone()),
                    model: None,
                    viewport,
                    last_frame: Instant::now(),
                    frame_count: 0,
                }),
                status,
                redraw,
                loader,
                config,
                render_task: RefCell::new(None),
                resize: RefCell::new(ResizeHandler::new()),
                disposed: Cell::new(false),
            }),
        }
    }

    /// Create a viewer fetching `config.model_url` over HTTP
    pub fn from_config(
        config: ViewerConfig,
        renderer: Box<dyn RenderBackend>,
        viewport: Viewport,
    ) -> std::result::Result<Self, LoadError> {
        let timeout = config.load_timeout_secs.map(std::time::Duration::from_secs);
        let source = HttpSource::new(config.model_url.clone(), timeout)?;
        Ok(Self::new(config, Box::new(source), renderer, viewport))
    }

    /// Start the render loop on `clock` and react to `resize_events`.
    ///
    /// Natively this must run inside a `tokio::task::LocalSet`.
    pub fn mount<C>(&self, clock: C, resize_events: UnboundedReceiver<Viewport>) -> Result<()>
    where
        C: FrameClock + 'static,
    {
        self.ensure_alive()?;

        let weak = Rc::downgrade(&self.shared);
        self.shared
            .resize
            .borrow_mut()
            .setup(resize_events, move |viewport| {
                if let Some(shared) = weak.upgrade() {
                    shared.resize(viewport);
                }
            });

        let weak = Rc::downgrade(&self.shared);
        let handle = spawn_local(render_loop(weak, clock));
        if let Some(previous) = self.shared.render_task.borrow_mut().replace(handle) {
            previous.abort();
        }
        tracing::debug!(viewer = %self.shared.id, "render loop started");
        Ok(())
    }

    /// Fetch, parse and attach the model, moving status to `Idle` or `Error`.
    ///
    /// The render loop keeps running while this is pending.
    pub async fn load(&self) -> Result<ViewerStatus> {
        let span = tracing::info_span!("load", viewer = %self.shared.id);
        self.shared.clone().load().instrument(span).await
    }

    /// Run one loop step: advance the controls by `delta` seconds and draw if anything changed.
    ///
    /// Returns whether a frame was drawn.
    pub fn tick(&self, delta: f32) -> Result<bool> {
        self.ensure_alive()?;
        self.shared.tick(delta)
    }

    /// Ask for the next loop step to draw
    pub fn request_redraw(&self) {
        self.shared.redraw.request();
    }

    /// Highlight a single node and its renderable descendants
    pub fn highlight_object(&self, id: NodeId) -> Result<usize> {
        self.highlight_objects(&[id])
    }

    /// Replace the highlight with the given nodes; returns the number of meshes highlighted
    pub fn highlight_objects(&self, ids: &[NodeId]) -> Result<usize> {
        self.ensure_alive()?;
        let mut guard = self.shared.state.borrow_mut();
        let state = &mut *guard;
        state.highlight.highlight_objects(&mut state.scene, ids)
    }

    /// Restore every highlighted material
    pub fn clear_highlight(&self) -> Result<()> {
        self.ensure_alive()?;
        let mut guard = self.shared.state.borrow_mut();
        let state = &mut *guard;
        state.highlight.clear_highlight(&mut state.scene);
        Ok(())
    }

    /// Number of meshes currently showing a highlight material
    pub fn highlighted_count(&self) -> usize {
        self.shared.state.borrow().highlight.highlighted_count()
    }

    /// Id of the attached model root
    pub fn model_id(&self) -> Option<NodeId> {
        self.shared.state.borrow().model
    }

    /// Snapshot of the attached model
    pub fn model(&self) -> Option<Object3D> {
        self.with_model(Object3D::clone)
    }

    /// Borrow the attached model
    pub fn with_model<R>(&self, f: impl FnOnce(&Object3D) -> R) -> Option<R> {
        let state = self.shared.state.borrow();
        let root = state.model.and_then(|id| state.scene.find(id))?;
        Some(f(root))
    }

    /// Current status
    pub fn status(&self) -> ViewerStatus {
        *self.shared.status.borrow()
    }

    /// Observe status changes; the receiver starts at the current value
    pub fn subscribe_status(&self) -> watch::Receiver<ViewerStatus> {
        self.shared.status.subscribe()
    }

    /// Tree of the attached model with labels and statuses
    pub fn hierarchy(&self) -> Option<HierarchyNode> {
        self.with_model(HierarchyNode::from_object)
    }

    /// Renderable nodes of the model whose status code is `code`
    pub fn nodes_with_status(&self, code: i64) -> Vec<NodeId> {
        self.with_model(|root| {
            root.traverse()
                .filter(|node| node.is_renderable())
                .filter(|node| {
                    StatusMetadata::from_node(node).map_or(false, |meta| meta.status_code == code)
                })
                .map(|node| node.id)
                .collect()
        })
        .unwrap_or_default()
    }

    /// Copy of the camera
    pub fn camera(&self) -> Camera3D {
        self.shared.state.borrow().camera.clone()
    }

    /// Drive the camera controls, e.g. from pointer input
    pub fn with_controls<R>(&self, f: impl FnOnce(&mut CameraControls) -> R) -> Result<R> {
        self.ensure_alive()?;
        let mut state = self.shared.state.borrow_mut();
        Ok(f(&mut state.controls))
    }

    /// Apply a new viewport size
    pub fn resize(&self, viewport: Viewport) {
        self.shared.resize(viewport);
    }

    /// Current viewport
    pub fn viewport(&self) -> Viewport {
        self.shared.state.borrow().viewport
    }

    /// Frames drawn so far
    pub fn frame_count(&self) -> u64 {
        self.shared.state.borrow().frame_count
    }

    /// Instance id used in logs
    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    /// Configuration the viewer was built with
    pub fn config(&self) -> &ViewerConfig {
        &self.shared.config
    }

    /// Whether [`Viewer::dispose`] has run
    pub fn is_disposed(&self) -> bool {
        self.shared.disposed.get()
    }

    /// Stop the loop and resize handling, release the renderer and empty the scene.
    ///
    /// Runs once; later calls do nothing.
    pub fn dispose(&self) {
        self.shared.dispose();
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.shared.disposed.get() {
            Err(ViewerError::Disposed)
        } else {
            Ok(())
        }
    }
}

async fn render_loop<C: FrameClock>(viewer: Weak<Shared>, mut clock: C) {
    loop {
        clock.next_frame().await;
        let Some(shared) = viewer.upgrade() else {
            break;
        };
        if shared.disposed.get() {
            break;
        }
        let delta = {
            let mut state = shared.state.borrow_mut();
            let now = Instant::now();
            let delta = now.duration_since(state.last_frame).as_secs_f32();
            state.last_frame = now;
            delta
        };
        if let Err(err) = shared.tick(delta) {
            tracing::warn!(viewer = %shared.id, error = %err, "frame failed");
        }
    }
}

impl Shared {
    async fn load(self: Rc<Self>) -> Result<ViewerStatus> {
        if self.disposed.get() {
            return Err(ViewerError::Disposed);
        }
        self.detach_model();
        self.set_status(ViewerStatus::Loading);
        tracing::info!(source = %self.loader.describe(), "loading model");

        let outcome = self.loader.load_model().await;
        if self.disposed.get() {
            tracing::debug!("viewer disposed while loading, dropping result");
            return Err(ViewerError::Disposed);
        }

        let status = match outcome {
            Ok(Some(model)) => {
                self.attach_model(model);
                ViewerStatus::Idle
            }
            Ok(None) => ViewerStatus::Error,
            Err(err) => {
                tracing::error!(error = %err, "model load failed");
                ViewerStatus::Error
            }
        };
        self.set_status(status);
        tracing::info!(%status, "model load finished");
        Ok(status)
    }

    fn detach_model(&self) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let Some(previous) = state.model.take() else {
            return;
        };
        state.highlight.clear_highlight(&mut state.scene);
        state.scene.remove(previous);
        drop(guard);

        tracing::debug!(model = ?previous, "previous model detached");
        self.redraw.request();
    }

    fn attach_model(&self, mut model: Object3D) {
        model.rotate_x(-FRAC_PI_2);
        let id = model.id;
        let bounds = model.bounding_box();

        self.detach_model();
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        state.scene.add(model);
        match bounds {
            Some(bounds) => state.controls.fit_to_box(&state.camera, &bounds, false),
            None => tracing::warn!("model has no geometry, camera left in place"),
        }
        state.model = Some(id);
        drop(guard);

        self.redraw.request();
    }

    fn tick(&self, delta: f32) -> Result<bool> {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let moved = state.controls.update(&mut state.camera, delta);
        let requested = self.redraw.take();
        if !(moved || requested) {
            return Ok(false);
        }
        state.renderer.render(&state.scene, &state.camera)?;
        state.frame_count += 1;
        tracing::trace!(frame = state.frame_count, moved, requested, "frame drawn");
        Ok(true)
    }

    fn resize(&self, viewport: Viewport) {
        if self.disposed.get() {
            return;
        }
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        state.viewport = viewport;
        state
            .renderer
            .set_size(viewport.width, viewport.height, viewport.pixel_ratio);
        apply_resize(&mut state.camera, viewport, &self.redraw);
        tracing::debug!(width = viewport.width, height = viewport.height, "viewport resized");
    }

    fn set_status(&self, status: ViewerStatus) {
        self.status.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status;
                true
            }
        });
    }

    fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        self.resize.borrow_mut().cleanup();
        if let Some(task) = self.render_task.borrow_mut().take() {
            task.abort();
        }

        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        state.controls.dispose();
        state.highlight.reset();
        state.scene.clear();
        state.model = None;
        state.renderer.dispose();
        drop(guard);

        self.redraw.suppress();
        tracing::info!(viewer = %self.id, "viewer disposed");
    }
}

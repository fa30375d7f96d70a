//! Browser bindings

use crate::clock::FrameClock;
use crate::config::ViewerConfig;
use crate::controls::MouseButton;
use crate::error::{Result as ViewerResult, ViewerError};
use crate::render::RenderBackend;
use crate::resize::Viewport;
use crate::task::spawn_local;
use crate::viewer::Viewer;
use async_trait::async_trait;
use futures::future::AbortHandle;
use siteview_scene::{Camera3D, NodeId, Scene3D};
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Install the panic hook and route logs to the browser console
#[wasm_bindgen]
pub fn init() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
}

fn window() -> std::result::Result<web_sys::Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no global `window` exists"))
}

fn current_viewport(window: &web_sys::Window) -> Viewport {
    let dimension = |value: std::result::Result<JsValue, JsValue>| {
        value.ok().and_then(|v| v.as_f64()).unwrap_or(1.0).max(1.0) as u32
    };
    Viewport {
        width: dimension(window.inner_width()),
        height: dimension(window.inner_height()),
        pixel_ratio: window.device_pixel_ratio() as f32,
    }
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Ticks once per `requestAnimationFrame`
pub struct AnimationFrameClock;

#[async_trait(?Send)]
impl FrameClock for AnimationFrameClock {
    async fn next_frame(&mut self) {
        let (sender, receiver) = futures::channel::oneshot::channel::<()>();
        let callback = Closure::once_into_js(move |_timestamp: f64| {
            let _ = sender.send(());
        });
        let scheduled = window()
            .and_then(|window| window.request_animation_frame(callback.unchecked_ref()))
            .is_ok();
        if !scheduled {
            tracing::error!("requestAnimationFrame unavailable, render loop parked");
            futures::future::pending::<()>().await;
        }
        let _ = receiver.await;
    }
}

/// Window `resize` subscription that forwards viewport sizes into a channel
struct ResizeListener {
    window: web_sys::Window,
    closure: Closure<dyn FnMut()>,
}

impl ResizeListener {
    fn new(
        window: web_sys::Window,
        sender: UnboundedSender<Viewport>,
    ) -> std::result::Result<Self, JsValue> {
        let source = window.clone();
        let closure = Closure::<dyn FnMut()>::new(move || {
            let _ = sender.send(current_viewport(&source));
        });
        window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        Ok(Self { window, closure })
    }
}

impl Drop for ResizeListener {
    fn drop(&mut self) {
        let _ = self
            .window
            .remove_event_listener_with_callback("resize", self.closure.as_ref().unchecked_ref());
    }
}

/// Hands every frame to a JavaScript drawing callback
pub struct CallbackRenderer {
    on_frame: js_sys::Function,
    frame: u32,
    shadow_map: bool,
    disposed: bool,
}

impl CallbackRenderer {
    /// `on_frame` receives `{ frame, meshes, background, shadowMap, viewProjection }`
    pub fn new(on_frame: js_sys::Function) -> Self {
        Self {
            on_frame,
            frame: 0,
            shadow_map: false,
            disposed: false,
        }
    }
}

impl RenderBackend for CallbackRenderer {
    fn set_size(&mut self, width: u32, height: u32, pixel_ratio: f32) {
        tracing::debug!(width, height, pixel_ratio, "canvas resized");
    }

    fn set_shadow_map_enabled(&mut self, enabled: bool) {
        self.shadow_map = enabled;
    }

    fn render(&mut self, scene: &Scene3D, camera: &Camera3D) -> ViewerResult<()> {
        if self.disposed {
            return Err(ViewerError::Render("renderer has been disposed".to_string()));
        }
        self.frame += 1;

        let meshes = scene.mesh_count();
        let columns = camera.view_projection_matrix().to_cols_array();
        let matrix = js_sys::Float32Array::from(&columns[..]);

        let info = js_sys::Object::new();
        let set = |key: &str, value: JsValue| {
            js_sys::Reflect::set(&info, &JsValue::from_str(key), &value)
        };
        set("frame", self.frame.into())
            .and_then(|_| set("meshes", (meshes as u32).into()))
            .and_then(|_| set("background", scene.background.to_rgb_u32().into()))
            .and_then(|_| set("shadowMap", self.shadow_map.into()))
            .and_then(|_| set("viewProjection", matrix.into()))
            .and_then(|_| self.on_frame.call1(&JsValue::NULL, &info))
            .map(|_| ())
            .map_err(|err| ViewerError::Render(format!("{:?}", err)))
    }

    fn dispose(&mut self) {
        self.disposed = true;
    }
}

/// Viewer handle exported to JavaScript
#[wasm_bindgen]
pub struct SiteViewer {
    viewer: Viewer,
    resize: Option<ResizeListener>,
    watchers: Vec<AbortHandle>,
}

#[wasm_bindgen]
impl SiteViewer {
    /// Create a viewer, start its render loop and begin loading the model.
    ///
    /// `config_toml` overrides the default configuration.
    #[wasm_bindgen(constructor)]
    pub fn new(
        on_frame: js_sys::Function,
        config_toml: Option<String>,
    ) -> std::result::Result<SiteViewer, JsValue> {
        init();

        let config = match config_toml {
            Some(text) => ViewerConfig::from_toml_str(&text).map_err(to_js)?,
            None => ViewerConfig::default(),
        };
        let window = window()?;
        let renderer = CallbackRenderer::new(on_frame);
        let viewer = Viewer::from_config(config, Box::new(renderer), current_viewport(&window))
            .map_err(to_js)?;

        let (sender, receiver) = unbounded_channel();
        let resize = ResizeListener::new(window, sender)?;
        viewer.mount(AnimationFrameClock, receiver).map_err(to_js)?;

        let loading = viewer.clone();
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(err) = loading.load().await {
                tracing::warn!(error = %err, "model load abandoned");
            }
        });

        Ok(SiteViewer {
            viewer,
            resize: Some(resize),
            watchers: Vec::new(),
        })
    }

    /// Current status: `loading`, `idle` or `error`
    pub fn status(&self) -> String {
        self.viewer.status().to_string()
    }

    /// Call `callback(status)` now and on every status change
    #[wasm_bindgen(js_name = onStatus)]
    pub fn on_status(&mut self, callback: js_sys::Function) {
        let mut receiver = self.viewer.subscribe_status();
        self.watchers.push(spawn_local(async move {
            loop {
                let status = receiver.borrow_and_update().to_string();
                if callback.call1(&JsValue::NULL, &JsValue::from_str(&status)).is_err() {
                    tracing::warn!("status callback threw");
                }
                if receiver.changed().await.is_err() {
                    break;
                }
            }
        }));
    }

    /// Model tree as `{ id, label, status, children }`, or `null` before load
    pub fn hierarchy(&self) -> std::result::Result<JsValue, JsValue> {
        match self.viewer.hierarchy() {
            Some(tree) => {
                let text = serde_json::to_string(&tree).map_err(to_js)?;
                js_sys::JSON::parse(&text)
            }
            None => Ok(JsValue::NULL),
        }
    }

    /// Highlight the given node ids; returns the number of meshes highlighted
    #[wasm_bindgen(js_name = highlightObjects)]
    pub fn highlight_objects(&self, ids: Vec<u32>) -> std::result::Result<usize, JsValue> {
        let ids: Vec<NodeId> = ids.into_iter().map(NodeId).collect();
        self.viewer.highlight_objects(&ids).map_err(to_js)
    }

    /// Highlight every part with the given status code
    #[wasm_bindgen(js_name = highlightStatus)]
    pub fn highlight_status(&self, code: i32) -> std::result::Result<usize, JsValue> {
        let ids = self.viewer.nodes_with_status(i64::from(code));
        self.viewer.highlight_objects(&ids).map_err(to_js)
    }

    /// Remove every highlight
    #[wasm_bindgen(js_name = clearHighlight)]
    pub fn clear_highlight(&self) -> std::result::Result<(), JsValue> {
        self.viewer.clear_highlight().map_err(to_js)
    }

    /// Pointer drag in CSS pixels; `button` follows `MouseEvent.button`
    #[wasm_bindgen(js_name = onDrag)]
    pub fn on_drag(&self, button: i16, dx: f32, dy: f32) -> std::result::Result<(), JsValue> {
        let button = match button {
            0 => MouseButton::Left,
            1 => MouseButton::Middle,
            _ => MouseButton::Right,
        };
        let height = self.viewer.viewport().height as f32;
        self.viewer
            .with_controls(|controls| controls.handle_drag(button, dx, dy, height))
            .map_err(to_js)
    }

    /// Pointer released
    #[wasm_bindgen(js_name = endDrag)]
    pub fn end_drag(&self) -> std::result::Result<(), JsValue> {
        self.viewer.with_controls(|controls| controls.end_drag()).map_err(to_js)
    }

    /// Wheel step, normalized so one notch is about 1
    #[wasm_bindgen(js_name = onWheel)]
    pub fn on_wheel(&self, delta: f32) -> std::result::Result<(), JsValue> {
        self.viewer
            .with_controls(|controls| controls.handle_wheel(delta, None))
            .map_err(to_js)
    }

    /// Tear the viewer down
    pub fn dispose(&mut self) {
        self.resize.take();
        for watcher in self.watchers.drain(..) {
            watcher.abort();
        }
        self.viewer.dispose();
    }
}

//! wasm-bindgen wrapper around `SceneHost`.
//!
//! The browser side is reached through one bridge object passed to the
//! constructor. It must provide:
//!
//! - `createSurface(width, height) -> number` (throw on WebGL failure)
//! - `resizeSurface(id, width, height)`
//! - `drawFrame(id, frame)` where `frame` is the serialized `FrameSnapshot`
//! - `releaseSurface(id)`
//! - `loadAsset(url, generation)`; answer later with `assetLoaded` / `assetFailed`
//! - `requestFrame() -> number`; the callback must call `onFrame(handle, timestampMs)`
//! - `cancelFrame(handle)`
//!
//! Listeners run synchronously before the triggering call returns. They must not
//! call back into the stage synchronously; defer with `queueMicrotask` instead.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use js_sys::{Function, Reflect};
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use vizij_avatar_core::{
    AssetDescriptor, AssetError, AssetSource, AssetTicket, FrameHandle, FrameScheduler,
    FrameSnapshot, Generation, GraphicsBackend, RenderSurface, SceneHost, StageConfig, StageError,
    StageEvent,
};

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn stage_error(err: StageError) -> JsError {
    JsError::new(&err.to_string())
}

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

struct JsBridge {
    obj: JsValue,
}

impl JsBridge {
    fn method(&self, name: &str) -> Result<Function, JsValue> {
        Reflect::get(&self.obj, &JsValue::from_str(name))?
            .dyn_into::<Function>()
            .map_err(|_| JsValue::from_str(&format!("bridge.{name} is not a function")))
    }

    fn call(&self, name: &str, args: &[JsValue]) -> Result<JsValue, JsValue> {
        let f = self.method(name)?;
        match args {
            [] => f.call0(&self.obj),
            [a] => f.call1(&self.obj, a),
            [a, b] => f.call2(&self.obj, a, b),
            [a, b, c] => f.call3(&self.obj, a, b, c),
            _ => Err(JsValue::from_str("bridge call with too many arguments")),
        }
    }

    /// Fire-and-forget call; failures are logged, never raised.
    fn notify(&self, name: &str, args: &[JsValue]) {
        if let Err(err) = self.call(name, args) {
            log::warn!("bridge.{name} failed: {}", describe(&err));
        }
    }
}

struct JsBackend {
    bridge: Rc<JsBridge>,
}

impl GraphicsBackend for JsBackend {
    type Surface = JsSurface;

    fn create_surface(&mut self, width: u32, height: u32) -> Result<JsSurface, StageError> {
        let id = self
            .bridge
            .call(
                "createSurface",
                &[JsValue::from(width), JsValue::from(height)],
            )
            .map_err(|err| StageError::graphics(describe(&err)))?;
        Ok(JsSurface {
            bridge: Rc::clone(&self.bridge),
            id,
        })
    }
}

struct JsSurface {
    bridge: Rc<JsBridge>,
    id: JsValue,
}

impl RenderSurface for JsSurface {
    fn resize(&mut self, width: u32, height: u32) {
        self.bridge.notify(
            "resizeSurface",
            &[self.id.clone(), JsValue::from(width), JsValue::from(height)],
        );
    }

    fn draw(&mut self, frame: &FrameSnapshot<'_>) {
        match swb::to_value(frame) {
            Ok(value) => self.bridge.notify("drawFrame", &[self.id.clone(), value]),
            Err(err) => log::error!("frame serialization failed: {err}"),
        }
    }

    fn release(&mut self) {
        self.bridge.notify("releaseSurface", &[self.id.clone()]);
    }
}

struct JsAssetSource {
    bridge: Rc<JsBridge>,
}

impl AssetSource for JsAssetSource {
    fn request(&mut self, ticket: AssetTicket) {
        let generation = JsValue::from_f64(ticket.generation.0 as f64);
        self.bridge
            .notify("loadAsset", &[JsValue::from_str(&ticket.url), generation]);
    }
}

struct JsScheduler {
    bridge: Rc<JsBridge>,
}

impl FrameScheduler for JsScheduler {
    fn request_frame(&mut self) -> Result<FrameHandle, StageError> {
        let value = self
            .bridge
            .call("requestFrame", &[])
            .map_err(|err| StageError::scheduler(describe(&err)))?;
        match value.as_f64() {
            Some(h) if h.is_finite() && h >= 0.0 => Ok(FrameHandle(h as u64)),
            _ => Err(StageError::scheduler(format!(
                "requestFrame returned a non-handle: {}",
                describe(&value)
            ))),
        }
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.bridge
            .notify("cancelFrame", &[JsValue::from_f64(handle.0 as f64)]);
    }
}

#[wasm_bindgen]
pub struct VizijAvatarStage {
    host: SceneHost<JsBackend, JsAssetSource, JsScheduler>,
    queue: Rc<RefCell<VecDeque<StageEvent>>>,
    listeners: Vec<Function>,
}

#[wasm_bindgen]
impl VizijAvatarStage {
    /// Create a stage bound to a JS bridge object (see crate docs).
    #[wasm_bindgen(constructor)]
    pub fn new(bridge: JsValue) -> Result<VizijAvatarStage, JsError> {
        console_error_panic_hook::set_once();

        if jsvalue_is_undefined_or_null(&bridge) {
            return Err(JsError::new("bridge is null/undefined"));
        }
        let bridge = Rc::new(JsBridge { obj: bridge });
        let mut host = SceneHost::new(
            JsBackend {
                bridge: Rc::clone(&bridge),
            },
            JsAssetSource {
                bridge: Rc::clone(&bridge),
            },
            JsScheduler { bridge },
        );

        let queue: Rc<RefCell<VecDeque<StageEvent>>> = Rc::default();
        let sink = Rc::clone(&queue);
        host.subscribe(move |event| sink.borrow_mut().push_back(*event));

        Ok(VizijAvatarStage {
            host,
            queue,
            listeners: Vec::new(),
        })
    }

    /// Register `listener({ type, index })` for animation-start / animation-end.
    #[wasm_bindgen(js_name = addListener)]
    pub fn add_listener(&mut self, listener: Function) {
        self.listeners.push(listener);
    }

    /// Full rebuild for `{ assetUrl, width, height }`; undefined/null means defaults.
    #[wasm_bindgen]
    pub fn configure(&mut self, config: JsValue) -> Result<(), JsError> {
        let cfg = parse_config(config)?;
        let result = self.host.configure(cfg).map_err(stage_error);
        self.flush();
        result
    }

    /// Rebuild only when the asset URL changed; otherwise resize in place.
    #[wasm_bindgen(js_name = updateConfig)]
    pub fn update_config(&mut self, config: JsValue) -> Result<(), JsError> {
        let cfg = parse_config(config)?;
        let result = self.host.update_config(cfg).map_err(stage_error);
        self.flush();
        result
    }

    #[wasm_bindgen]
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), JsError> {
        self.host.resize(width, height).map_err(stage_error)
    }

    /// Returns whether the clip started; invalid indices are ignored.
    #[wasm_bindgen]
    pub fn play(&mut self, index: u32) -> bool {
        let started = self.host.play(index as usize);
        self.flush();
        started
    }

    #[wasm_bindgen]
    pub fn stop(&mut self) {
        self.host.stop();
    }

    /// Frame callback entry point. `timestamp_ms` is the rAF timestamp.
    #[wasm_bindgen(js_name = onFrame)]
    pub fn on_frame(&mut self, handle: f64, timestamp_ms: f64) {
        self.host
            .on_frame(FrameHandle(handle as u64), timestamp_ms / 1000.0);
        self.flush();
    }

    /// Deliver a parsed model `{ root, clips: [{ name, duration }] }` for `generation`.
    /// Returns false when the result was stale and dropped.
    #[wasm_bindgen(js_name = assetLoaded)]
    pub fn asset_loaded(&mut self, generation: f64, descriptor: JsValue) -> bool {
        let Some(generation) = parse_generation(generation) else {
            return false;
        };
        let result = swb::from_value::<AssetDescriptor>(descriptor)
            .map(AssetDescriptor::into_loaded)
            .map_err(|e| AssetError::parse(self.current_url(), e.to_string()));
        let applied = self.host.complete_asset(generation, result);
        self.flush();
        applied
    }

    /// Report a failed load for `generation`; the stage shows its fallback.
    #[wasm_bindgen(js_name = assetFailed)]
    pub fn asset_failed(&mut self, generation: f64, message: String) -> bool {
        let Some(generation) = parse_generation(generation) else {
            return false;
        };
        let err = AssetError::fetch(self.current_url(), message);
        self.host.complete_asset(generation, Err(err))
    }

    #[wasm_bindgen]
    pub fn dispose(&mut self) {
        self.host.dispose();
        self.queue.borrow_mut().clear();
    }

    /// Up to five `{ index, label, disabled }` entries for a button bar.
    #[wasm_bindgen]
    pub fn controls(&self) -> Result<JsValue, JsError> {
        swb::to_value(&self.host.controls())
            .map_err(|e| JsError::new(&format!("controls error: {e}")))
    }

    #[wasm_bindgen(js_name = activeIndex)]
    pub fn active_index(&self) -> Option<u32> {
        self.host.active_index().map(|i| i as u32)
    }

    #[wasm_bindgen(js_name = isLive)]
    pub fn is_live(&self) -> bool {
        self.host.is_live()
    }
}

impl VizijAvatarStage {
    fn current_url(&self) -> String {
        self.host
            .config()
            .map(|c| c.asset_url.clone())
            .unwrap_or_default()
    }

    fn flush(&mut self) {
        loop {
            let Some(event) = self.queue.borrow_mut().pop_front() else {
                break;
            };
            let payload = match swb::to_value(&event) {
                Ok(v) => v,
                Err(err) => {
                    log::error!("event serialization failed: {err}");
                    continue;
                }
            };
            for listener in &self.listeners {
                if let Err(err) = listener.call1(&JsValue::UNDEFINED, &payload) {
                    log::warn!("{} listener threw: {}", event.name(), describe(&err));
                }
            }
        }
    }
}

/// Generations are positive integers; anything else (NaN from `undefined`,
/// negatives, fractions) cannot name a request.
fn parse_generation(value: f64) -> Option<Generation> {
    if value.is_finite() && value >= 1.0 && value.fract() == 0.0 {
        Some(Generation(value as u64))
    } else {
        log::warn!("asset result with invalid generation {value} dropped");
        None
    }
}

fn parse_config(config: JsValue) -> Result<StageConfig, JsError> {
    if jsvalue_is_undefined_or_null(&config) {
        return Ok(StageConfig::default());
    }
    swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}

//! Browser host: a `<canvas>` element driven by `requestAnimationFrame`.
//!
//! ```js
//! import init, { startParticleField } from "./particle_field.js";
//!
//! await init();
//! const field = startParticleField("particle-canvas", null);
//! // later, e.g. when the component unmounts:
//! field.stop();
//! ```
//!
//! The canvas backing store is sized to `innerWidth` x `innerHeight`, so one
//! surface unit is one CSS pixel. Fractional viewport sizes are truncated and
//! `devicePixelRatio` is not applied; on high-DPI screens the browser scales
//! the canvas up.
//!
//! Panics are reported through `console.error` and `tracing` events go to the
//! browser console at `info` level and above.

use std::cell::RefCell;
use std::f64::consts::TAU;
use std::io;
use std::rc::{Rc, Weak};

use glam::Vec2;
use tracing::{warn, Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::animator::ParticleField;
use crate::config::FieldConfig;
use crate::scheduler::{FrameHandle, FrameScheduler};
use crate::surface::{Bounds, Rgba, Surface};

/// A [`Surface`] over a canvas 2D context.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or("canvas has no 2d context")?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { canvas, ctx })
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> Bounds {
        Bounds::new(self.canvas.width() as f32, self.canvas.height() as f32)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn clear(&mut self, color: Rgba) {
        let w = self.canvas.width() as f64;
        let h = self.canvas.height() as f64;
        self.ctx.clear_rect(0.0, 0.0, w, h);
        if color.a > 0.0 {
            self.ctx.set_fill_style_str(&color.to_css());
            self.ctx.fill_rect(0.0, 0.0, w, h);
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.ctx.begin_path();
        if let Err(e) = self
            .ctx
            .arc(center.x as f64, center.y as f64, radius as f64, 0.0, TAU)
        {
            warn!("canvas arc failed: {:?}", e);
            return;
        }
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill();
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Rgba, width: f32) {
        self.ctx.begin_path();
        self.ctx.set_stroke_style_str(&color.to_css());
        self.ctx.set_line_width(width as f64);
        self.ctx.move_to(from.x as f64, from.y as f64);
        self.ctx.line_to(to.x as f64, to.y as f64);
        self.ctx.stroke();
    }
}

/// Schedules frames with `requestAnimationFrame`.
pub struct AnimationFrameScheduler {
    window: web_sys::Window,
    callback: Option<Closure<dyn FnMut()>>,
    next_id: u64,
    pending: Option<(FrameHandle, i32)>,
}

impl AnimationFrameScheduler {
    pub fn new(window: web_sys::Window) -> Self {
        Self {
            window,
            callback: None,
            next_id: 0,
            pending: None,
        }
    }

    /// Function the browser calls on each animation frame.
    pub fn set_callback(&mut self, callback: Closure<dyn FnMut()>) {
        self.callback = Some(callback);
    }

    /// Forget the request that just fired.
    fn fired(&mut self) {
        self.pending = None;
    }
}

impl FrameScheduler for AnimationFrameScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        if let Some(callback) = &self.callback {
            match self
                .window
                .request_animation_frame(callback.as_ref().unchecked_ref())
            {
                Ok(id) => self.pending = Some((handle, id)),
                Err(e) => warn!("requestAnimationFrame failed: {:?}", e),
            }
        }
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Some((pending, id)) = self.pending {
            if pending == handle {
                if let Err(e) = self.window.cancel_animation_frame(id) {
                    warn!("cancelAnimationFrame failed: {:?}", e);
                }
                self.pending = None;
            }
        }
    }
}

/// `tracing` output sink for the browser console.
///
/// Each event is formatted into a buffer and handed to the console method
/// matching its level when the writer is dropped.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleMakeWriter;

pub struct ConsoleWriter {
    level: Level,
    buf: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.buf);
        let line = JsValue::from_str(text.trim_end());
        match self.level {
            Level::ERROR => web_sys::console::error_1(&line),
            Level::WARN => web_sys::console::warn_1(&line),
            Level::INFO => web_sys::console::info_1(&line),
            _ => web_sys::console::debug_1(&line),
        }
    }
}

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter {
            level: Level::INFO,
            buf: Vec::new(),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter {
            level: *meta.level(),
            buf: Vec::new(),
        }
    }
}

/// Route panics to `console.error` and `tracing` events to the console.
/// Safe to call more than once.
pub fn init_logging() {
    console_error_panic_hook::set_once();
    // The default timer reads std::time, which panics on this target.
    let _ = tracing_subscriber::fmt()
        .with_writer(ConsoleMakeWriter)
        .with_max_level(Level::INFO)
        .with_ansi(false)
        .without_time()
        .try_init();
}

struct WebState {
    field: ParticleField<CanvasSurface>,
    scheduler: AnimationFrameScheduler,
}

/// A running field on a page. Call `stop()` to cancel the animation and
/// detach the resize listener.
#[wasm_bindgen]
pub struct WebHandle {
    state: Rc<RefCell<WebState>>,
    window: web_sys::Window,
    on_resize: Option<Closure<dyn FnMut()>>,
}

#[wasm_bindgen]
impl WebHandle {
    pub fn stop(&mut self) {
        if let Some(on_resize) = self.on_resize.take() {
            if let Err(e) = self
                .window
                .remove_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())
            {
                warn!("failed to remove resize listener: {:?}", e);
            }
        }
        let mut state = self.state.borrow_mut();
        let WebState { field, scheduler } = &mut *state;
        field.stop(scheduler);
        scheduler.callback = None;
    }

    /// Number of frames rendered so far.
    pub fn frames(&self) -> f64 {
        self.state.borrow().field.frames() as f64
    }
}

impl Drop for WebHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Start a field on the canvas with id `canvas_id`. `config_json` overrides
/// the defaults with any keys it sets.
#[wasm_bindgen(js_name = startParticleField)]
pub fn start_particle_field(canvas_id: &str, config_json: Option<String>) -> Result<WebHandle, JsValue> {
    let config = match config_json {
        Some(json) => FieldConfig::from_json(&json).map_err(to_js)?,
        None => FieldConfig::default(),
    };
    start(canvas_id, config)
}

/// Size the canvas to the viewport, spawn the particles, and start the
/// animation loop.
pub fn start(canvas_id: &str, config: FieldConfig) -> Result<WebHandle, JsValue> {
    init_logging();

    let window = web_sys::window().ok_or("no global window")?;
    let document = window.document().ok_or("window has no document")?;
    let canvas = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| JsValue::from_str(&format!("no element with id `{}`", canvas_id)))?
        .dyn_into::<HtmlCanvasElement>()?;

    let mut surface = CanvasSurface::new(canvas)?;
    let (width, height) = viewport_size(&window)?;
    surface.resize(width, height);

    let field = ParticleField::new(surface, config).map_err(to_js)?;
    let state = Rc::new(RefCell::new(WebState {
        field,
        scheduler: AnimationFrameScheduler::new(window.clone()),
    }));

    let on_frame = {
        let state: Weak<RefCell<WebState>> = Rc::downgrade(&state);
        Closure::wrap(Box::new(move || {
            if let Some(state) = state.upgrade() {
                let mut state = state.borrow_mut();
                let WebState { field, scheduler } = &mut *state;
                scheduler.fired();
                field.frame(scheduler);
            }
        }) as Box<dyn FnMut()>)
    };

    let on_resize = {
        let state: Weak<RefCell<WebState>> = Rc::downgrade(&state);
        let window = window.clone();
        Closure::wrap(Box::new(move || {
            if let (Some(state), Ok((w, h))) = (state.upgrade(), viewport_size(&window)) {
                state.borrow_mut().field.on_resize(w, h);
            }
        }) as Box<dyn FnMut()>)
    };

    {
        let mut guard = state.borrow_mut();
        let WebState { field, scheduler } = &mut *guard;
        scheduler.set_callback(on_frame);
        field.initialize(scheduler).map_err(to_js)?;
    }
    window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;

    Ok(WebHandle {
        state,
        window,
        on_resize: Some(on_resize),
    })
}

/// Viewport size in whole CSS pixels.
fn viewport_size(window: &web_sys::Window) -> Result<(u32, u32), JsValue> {
    let w = window.inner_width()?.as_f64().ok_or("innerWidth is not a number")?;
    let h = window.inner_height()?.as_f64().ok_or("innerHeight is not a number")?;
    Ok((w as u32, h as u32))
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

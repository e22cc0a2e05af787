//! Browser host: canvas surface, text mask, requestAnimationFrame and DOM
//! observers, all via web-sys.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, warn};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::{
    CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, HtmlElement,
    IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, ResizeObserver,
    Window,
};

use crate::color::{BuiltinColors, ColorResolver, Rgb};
use crate::config::{FontSpec, GridConfig};
use crate::error::ColorError;
use crate::engine::{FlickerEngine, GridInstance};
use crate::frame::{FrameHandle, FrameScheduler};
use crate::grid::{Rect, SurfaceGeometry};
use crate::host::{Mount, Observation, ObserverHost, Size};
use crate::mask::{GlyphMask, MaskRasterizer};
use crate::render::DrawSurface;

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
    canvas
        .get_context("2d")
        .ok()
        .flatten()
        .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
}

fn detached_canvas(document: &Document, width: u32, height: u32) -> Option<HtmlCanvasElement> {
    let canvas = document
        .create_element("canvas")
        .ok()?
        .dyn_into::<HtmlCanvasElement>()
        .ok()?;
    canvas.set_width(width);
    canvas.set_height(height);
    Some(canvas)
}

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    physical: (f64, f64),
}

impl CanvasSurface {
    /// `None` when the canvas has no 2D context.
    pub fn acquire(canvas: HtmlCanvasElement) -> Option<Self> {
        let ctx = context_2d(&canvas)?;
        Some(Self {
            canvas,
            ctx,
            physical: (0.0, 0.0),
        })
    }
}

impl DrawSurface for CanvasSurface {
    fn resize(&mut self, geometry: &SurfaceGeometry) {
        let (pw, ph) = (geometry.physical_width(), geometry.physical_height());
        self.canvas.set_width(pw);
        self.canvas.set_height(ph);
        let style = self.canvas.style();
        let _ = style.set_property("width", &format!("{}px", geometry.width));
        let _ = style.set_property("height", &format!("{}px", geometry.height));
        self.physical = (pw as f64, ph as f64);
    }

    fn clear(&mut self) {
        self.ctx.clear_rect(0.0, 0.0, self.physical.0, self.physical.1);
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb, alpha: f64) {
        self.ctx.set_fill_style_str(&color.css_rgba(alpha));
        self.ctx.fill_rect(rect.x, rect.y, rect.w, rect.h);
    }
}

/// Draws the watermark into a detached canvas and reads the pixels back.
pub struct CanvasMaskRasterizer {
    document: Document,
}

impl CanvasMaskRasterizer {
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

impl MaskRasterizer for CanvasMaskRasterizer {
    fn rasterize(
        &mut self,
        text: &str,
        font: FontSpec,
        geometry: &SurfaceGeometry,
    ) -> Option<GlyphMask> {
        let (pw, ph) = (geometry.physical_width(), geometry.physical_height());
        let canvas = detached_canvas(&self.document, pw, ph)?;
        let ctx = context_2d(&canvas)?;
        ctx.scale(geometry.dpr, geometry.dpr).ok()?;
        ctx.set_fill_style_str("white");
        ctx.set_font(&font.css());
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        ctx.fill_text(text, geometry.width / 2.0, geometry.height / 2.0)
            .ok()?;
        let image = ctx.get_image_data(0.0, 0.0, pw as f64, ph as f64).ok()?;
        GlyphMask::from_rgba(pw, ph, &image.data())
    }
}

/// Resolves any colour the browser understands by painting it into a 1x1
/// canvas. An unparseable `fillStyle` assignment is ignored, so painting over
/// two different prior styles gives two different pixels.
pub struct CanvasColorResolver {
    ctx: CanvasRenderingContext2d,
}

impl CanvasColorResolver {
    pub fn new(document: &Document) -> Option<Self> {
        let canvas = detached_canvas(document, 1, 1)?;
        Some(Self {
            ctx: context_2d(&canvas)?,
        })
    }

    fn paint(&self, prior: &str, spec: &str) -> Option<[u8; 4]> {
        self.ctx.clear_rect(0.0, 0.0, 1.0, 1.0);
        self.ctx.set_fill_style_str(prior);
        self.ctx.set_fill_style_str(spec);
        self.ctx.fill_rect(0.0, 0.0, 1.0, 1.0);
        let data = self.ctx.get_image_data(0.0, 0.0, 1.0, 1.0).ok()?.data();
        match data.get(..4)? {
            &[r, g, b, a] => Some([r, g, b, a]),
            _ => None,
        }
    }
}

impl ColorResolver for CanvasColorResolver {
    fn resolve(&self, spec: &str) -> Result<Rgb, ColorError> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(ColorError::Empty);
        }
        match (self.paint("#000000", spec), self.paint("#ffffff", spec)) {
            (Some([_, _, _, 0]), Some(_)) => Err(ColorError::NotDisplayable(spec.to_string())),
            (Some([r, g, b, _]), Some(other)) if other[..3] == [r, g, b] => Ok(Rgb::new(r, g, b)),
            (Some(_), Some(_)) => Err(ColorError::Unrecognized(spec.to_string())),
            _ => BuiltinColors.resolve(spec),
        }
    }
}

/// `requestAnimationFrame` driver. The callback lives in a shared slot so the
/// closure can re-request itself.
pub struct RafScheduler {
    window: Window,
    callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>,
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        let slot = self.callback.borrow();
        let cb = slot.as_ref()?;
        self.window
            .request_animation_frame(cb.as_ref().unchecked_ref())
            .ok()
            .map(FrameHandle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let _ = self.window.cancel_animation_frame(handle.0);
    }
}

struct DomResizeObservation {
    observer: ResizeObserver,
    _cb: Closure<dyn FnMut(js_sys::Array, ResizeObserver)>,
}

impl Observation for DomResizeObservation {
    fn disconnect(&mut self) {
        self.observer.disconnect();
    }
}

struct DomVisibilityObservation {
    observer: IntersectionObserver,
    _cb: Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>,
}

impl Observation for DomVisibilityObservation {
    fn disconnect(&mut self) {
        self.observer.disconnect();
    }
}

pub struct DomObserverHost {
    window: Window,
    container: Element,
    canvas: Element,
}

impl DomObserverHost {
    pub fn new(window: Window, container: Element, canvas: Element) -> Self {
        Self {
            window,
            container,
            canvas,
        }
    }
}

/// Border-box size of `element`. Mount and every resize go through here so a
/// padded container never flips between two boxes.
fn measure_element(window: &Window, element: &Element) -> Size {
    let rect = element.get_bounding_client_rect();
    Size {
        width: rect.width(),
        height: rect.height(),
        dpr: window.device_pixel_ratio(),
    }
}

impl ObserverHost for DomObserverHost {
    fn measure(&self) -> Option<Size> {
        Some(measure_element(&self.window, &self.container))
    }

    fn observe_resize(&mut self, mut cb: Box<dyn FnMut(Size)>) -> Option<Box<dyn Observation>> {
        let window = self.window.clone();
        let container = self.container.clone();
        let closure = Closure::wrap(Box::new(move |entries: js_sys::Array, _: ResizeObserver| {
            if entries.length() > 0 {
                cb(measure_element(&window, &container));
            }
        }) as Box<dyn FnMut(js_sys::Array, ResizeObserver)>);
        let observer = ResizeObserver::new(closure.as_ref().unchecked_ref()).ok()?;
        observer.observe(&self.container);
        Some(Box::new(DomResizeObservation {
            observer,
            _cb: closure,
        }))
    }

    fn observe_visibility(&mut self, mut cb: Box<dyn FnMut(bool)>) -> Option<Box<dyn Observation>> {
        let closure = Closure::wrap(Box::new(
            move |entries: js_sys::Array, _: IntersectionObserver| {
                if let Some(entry) = entries
                    .iter()
                    .last()
                    .and_then(|e| e.dyn_into::<IntersectionObserverEntry>().ok())
                {
                    cb(entry.is_intersecting());
                }
            },
        ) as Box<dyn FnMut(js_sys::Array, IntersectionObserver)>);
        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(0.0));
        let observer =
            IntersectionObserver::new_with_options(closure.as_ref().unchecked_ref(), &init).ok()?;
        observer.observe(&self.canvas);
        Some(Box::new(DomVisibilityObservation {
            observer,
            _cb: closure,
        }))
    }
}

pub type WebEngine = FlickerEngine<CanvasSurface, CanvasMaskRasterizer, RafScheduler, SmallRng>;

/// A flicker grid running on a real canvas. Dropping it releases the frame
/// callback, observers and engine.
pub struct WebMount {
    mount: Mount,
    frame_callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>,
    _engine: Rc<RefCell<WebEngine>>,
}

impl WebMount {
    pub fn teardown(&mut self) {
        self.mount.teardown();
        self.frame_callback.borrow_mut().take();
    }
}

impl Drop for WebMount {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Build and start a flicker grid on `canvas`, sized after `container`.
/// Returns `None` (and draws nothing) when the browser cannot provide what the
/// effect needs.
pub fn mount_canvas(
    container: &HtmlElement,
    canvas: &HtmlCanvasElement,
    config: GridConfig,
) -> Option<WebMount> {
    if let Err(e) = config.validate() {
        warn!("flicker grid disabled: {e}");
        return None;
    }
    let window = web_sys::window()?;
    let document = window.document()?;
    let Some(surface) = CanvasSurface::acquire(canvas.clone()) else {
        warn!("flicker grid disabled: no 2d canvas context");
        return None;
    };

    let frame_callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> =
        Rc::new(RefCell::new(None));
    let scheduler = RafScheduler {
        window: window.clone(),
        callback: frame_callback.clone(),
    };
    let colors: Box<dyn ColorResolver> = match CanvasColorResolver::new(&document) {
        Some(resolver) => Box::new(resolver),
        None => Box::new(BuiltinColors),
    };
    let engine = Rc::new(RefCell::new(FlickerEngine::new(
        config,
        &*colors,
        surface,
        CanvasMaskRasterizer::new(document),
        scheduler,
        SmallRng::from_entropy(),
    )));

    {
        let weak = Rc::downgrade(&engine);
        *frame_callback.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
            if let Some(engine) = weak.upgrade() {
                if let Ok(mut e) = engine.try_borrow_mut() {
                    e.on_frame(ts);
                }
            }
        }) as Box<dyn FnMut(f64)>));
    }

    let instance: Rc<RefCell<dyn GridInstance>> = engine.clone();
    let mut host = DomObserverHost::new(window, container.clone().into(), canvas.clone().into());
    let mount = Mount::new(instance, &mut host);
    debug!("flicker grid mounted");
    Some(WebMount {
        mount,
        frame_callback,
        _engine: engine,
    })
}

// Wasm entry points for the network canvas backdrop. The host page constructs
// one NetworkCanvas for its backdrop element and calls start(); everything
// else (pacing, visibility pausing, debounced resize) happens in here through
// a self-rescheduling requestAnimationFrame chain.

mod color;
mod field;
mod pacing;
mod particle;
mod renderer;
mod utils;

use field::ParticleField;
use renderer::{CanvasSurface, Surface};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{console, Document, HtmlCanvasElement, Window};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen]
pub fn initialize() {
    utils::set_panic_hook();
}

type AnimateClosure = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;
type RafHandle = Rc<Cell<Option<i32>>>;

#[wasm_bindgen]
pub struct NetworkCanvas {
    inner: Option<Inner>,
}

struct Inner {
    window: Window,
    document: Document,
    field: Rc<RefCell<ParticleField>>,
    // Taken when the loop starts; the animate closure owns the surface after that
    surface: Option<CanvasSurface>,
    animate: AnimateClosure,
    raf_id: RafHandle,
    on_resize: Option<Closure<dyn FnMut()>>,
    on_visibility: Option<Closure<dyn FnMut()>>,
}

#[wasm_bindgen]
impl NetworkCanvas {
    // Never throws. When the environment has no window, document, or 2d
    // context the instance comes back permanently disabled and every other
    // method is a no-op; the backdrop is decorative and the page works
    // without it.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement) -> NetworkCanvas {
        let inner = Inner::acquire(canvas);
        if inner.is_none() {
            console::warn_1(&"Network canvas unavailable. Backdrop animation disabled.".into());
        }
        NetworkCanvas { inner }
    }

    // Registers the resize and visibilitychange listeners and kicks off the
    // animation chain. Calling it twice is harmless.
    pub fn start(&mut self) -> Result<(), JsValue> {
        let inner = match self.inner.as_mut() {
            Some(inner) => inner,
            None => return Ok(()),
        };
        let mut surface = match inner.surface.take() {
            Some(surface) => surface,
            None => return Ok(()),
        };

        {
            let field = inner.field.clone();
            let window = inner.window.clone();
            let on_resize = Closure::wrap(Box::new(move || {
                let now = window.performance().map(|p| p.now()).unwrap_or(0.0);
                let (width, height) = viewport_size(&window);
                field.borrow_mut().note_resize(now, width, height);
            }) as Box<dyn FnMut()>);
            inner
                .window
                .add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;
            inner.on_resize = Some(on_resize);
        }

        {
            let field = inner.field.clone();
            let window = inner.window.clone();
            let animate = inner.animate.clone();
            let raf_id = inner.raf_id.clone();
            *inner.animate.borrow_mut() = Some(Closure::wrap(Box::new(move |now: f64| {
                raf_id.set(None);
                if !field.borrow().is_visible() {
                    // Pausing is just not rescheduling; state stays put
                    return;
                }
                schedule_frame(&window, &animate, &raf_id);
                field.borrow_mut().frame(now, &mut surface);
            }) as Box<dyn FnMut(f64)>));
        }

        {
            let field = inner.field.clone();
            let window = inner.window.clone();
            let document = inner.document.clone();
            let animate = inner.animate.clone();
            let raf_id = inner.raf_id.clone();
            let on_visibility = Closure::wrap(Box::new(move || {
                let visible = !document.hidden();
                field.borrow_mut().set_visible(visible);
                if visible {
                    field.borrow_mut().restart_timing();
                    schedule_frame(&window, &animate, &raf_id);
                } else if let Some(id) = raf_id.take() {
                    // Drop the stray frame that was already queued
                    let _ = window.cancel_animation_frame(id);
                }
            }) as Box<dyn FnMut()>);
            inner.document.add_event_listener_with_callback(
                "visibilitychange",
                on_visibility.as_ref().unchecked_ref(),
            )?;
            inner.on_visibility = Some(on_visibility);
        }

        schedule_frame(&inner.window, &inner.animate, &inner.raf_id);
        Ok(())
    }

    // Explicit teardown: cancel the pending frame, unhook the listeners, and
    // drop the particle batch. Terminal; the backdrop is built once per page.
    pub fn stop(&mut self) {
        let inner = match self.inner.as_mut() {
            Some(inner) => inner,
            None => return,
        };
        inner.field.borrow_mut().set_visible(false);
        if let Some(id) = inner.raf_id.take() {
            let _ = inner.window.cancel_animation_frame(id);
        }
        if let Some(closure) = inner.on_resize.take() {
            let _ = inner
                .window
                .remove_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        }
        if let Some(closure) = inner.on_visibility.take() {
            let _ = inner.document.remove_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
        }
        inner.animate.borrow_mut().take();
        inner.field.borrow_mut().clear();
    }
}

impl Inner {
    fn acquire(canvas: HtmlCanvasElement) -> Option<Inner> {
        let window = web_sys::window()?;
        let document = window.document()?;
        let mut surface = CanvasSurface::new(canvas)?;

        let (width, height) = viewport_size(&window);
        surface.resize(width, height);
        let field = ParticleField::new(width, height);

        Some(Inner {
            window,
            document,
            field: Rc::new(RefCell::new(field)),
            surface: Some(surface),
            animate: Rc::new(RefCell::new(None)),
            raf_id: Rc::new(Cell::new(None)),
            on_resize: None,
            on_visibility: None,
        })
    }
}

// Queues the next animation frame, unless one is already pending
fn schedule_frame(window: &Window, animate: &AnimateClosure, raf_id: &RafHandle) {
    if raf_id.get().is_some() {
        return;
    }
    if let Some(callback) = animate.borrow().as_ref() {
        if let Ok(id) = window.request_animation_frame(callback.as_ref().unchecked_ref()) {
            raf_id.set(Some(id));
        }
    }
}

fn viewport_size(window: &Window) -> (u32, u32) {
    let width = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    let height = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    (width as u32, height as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_backdrop_is_a_total_no_op() {
        // The state NetworkCanvas::new falls back to when the environment
        // offers no window, document, or 2d context
        let mut backdrop = NetworkCanvas { inner: None };
        assert!(backdrop.start().is_ok());
        assert!(backdrop.start().is_ok());
        backdrop.stop();
        assert!(backdrop.inner.is_none());
    }
}

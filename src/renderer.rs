// Drawing surface for the network backdrop. The field only needs clearing,
// filled circles, and stroked lines, so those live behind a small trait and
// the canvas 2d context supplies the real implementation.

use crate::color::Color;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

// Site accent cyan, #06b6d4
pub const ACCENT: Color = Color {
    r: 6,
    g: 182,
    b: 212,
};
pub const DOT_ALPHA: f64 = 0.45;
pub const LINE_WIDTH: f64 = 0.8;

pub trait Surface {
    fn resize(&mut self, width: u32, height: u32);
    fn clear(&mut self, width: u32, height: u32);
    fn fill_circle(&mut self, x: f64, y: f64, radius: f64);
    fn stroke_line(&mut self, from: [f64; 2], to: [f64; 2], opacity: f64);
}

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

impl CanvasSurface {
    // Returns None when the canvas cannot supply a 2d context, in which case
    // the whole backdrop stays disabled
    pub fn new(canvas: HtmlCanvasElement) -> Option<CanvasSurface> {
        let context = canvas
            .get_context("2d")
            .ok()??
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(CanvasSurface { canvas, context })
    }
}

impl Surface for CanvasSurface {
    fn resize(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn clear(&mut self, width: u32, height: u32) {
        self.context
            .clear_rect(0.0, 0.0, width as f64, height as f64);
    }

    #[allow(deprecated)]
    fn fill_circle(&mut self, x: f64, y: f64, radius: f64) {
        self.context.begin_path();
        let _ = self
            .context
            .arc(x, y, radius, 0.0, std::f64::consts::PI * 2.0);
        self.context
            .set_fill_style(&JsValue::from_str(&ACCENT.css(DOT_ALPHA)));
        self.context.fill();
    }

    #[allow(deprecated)]
    fn stroke_line(&mut self, from: [f64; 2], to: [f64; 2], opacity: f64) {
        self.context.begin_path();
        self.context
            .set_stroke_style(&JsValue::from_str(&ACCENT.css(opacity)));
        self.context.set_line_width(LINE_WIDTH);
        self.context.move_to(from[0], from[1]);
        self.context.line_to(to[0], to[1]);
        self.context.stroke();
    }
}

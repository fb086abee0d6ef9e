//! Canvas2D surface.
//!
//! Draws the shared frame to an HTML `<canvas>` via
//! `CanvasRenderingContext2d`. World shapes are drawn under the viewport
//! transform set on the context, so line widths scale with zoom exactly as
//! they do in the pick buffer.

use kurbo::{Affine, BezPath, Cap, Join, PathEl, Point, Stroke};
use ld_render::{Rgba, Surface};
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

pub struct Canvas2dSurface<'a> {
    ctx: &'a CanvasRenderingContext2d,
}

impl<'a> Canvas2dSurface<'a> {
    pub fn new(ctx: &'a CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }

    fn set_transform(&self, transform: Affine) {
        let [a, b, c, d, e, f] = transform.as_coeffs();
        if let Err(err) = self.ctx.set_transform(a, b, c, d, e, f) {
            log::warn!("canvas setTransform failed: {err:?}");
        }
    }

    fn trace(&self, path: &BezPath) {
        let ctx = self.ctx;
        ctx.begin_path();
        for el in path.elements() {
            match *el {
                PathEl::MoveTo(p) => ctx.move_to(p.x, p.y),
                PathEl::LineTo(p) => ctx.line_to(p.x, p.y),
                PathEl::QuadTo(c, p) => ctx.quadratic_curve_to(c.x, c.y, p.x, p.y),
                PathEl::CurveTo(c1, c2, p) => ctx.bezier_curve_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y),
                PathEl::ClosePath => ctx.close_path(),
            }
        }
    }
}

/// Canvas `lineCap` keyword. Canvas has one cap for both ends.
pub(crate) fn line_cap(cap: Cap) -> &'static str {
    match cap {
        Cap::Butt => "butt",
        Cap::Round => "round",
        Cap::Square => "square",
    }
}

pub(crate) fn line_join(join: Join) -> &'static str {
    match join {
        Join::Bevel => "bevel",
        Join::Miter => "miter",
        Join::Round => "round",
    }
}

impl Surface for Canvas2dSurface<'_> {
    fn clear(&mut self, width: f64, height: f64, color: Rgba) {
        self.set_transform(Affine::IDENTITY);
        self.ctx.clear_rect(0.0, 0.0, width, height);
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill_rect(0.0, 0.0, width, height);
    }

    fn fill(&mut self, transform: Affine, shape: &BezPath, color: Rgba) {
        self.set_transform(transform);
        self.trace(shape);
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill();
    }

    fn stroke(&mut self, transform: Affine, shape: &BezPath, style: &Stroke, color: Rgba) {
        self.set_transform(transform);
        self.trace(shape);

        let dashes = js_sys::Array::new();
        for &len in style.dash_pattern.iter() {
            dashes.push(&JsValue::from_f64(len));
        }
        if let Err(err) = self.ctx.set_line_dash(&dashes) {
            log::warn!("canvas setLineDash failed: {err:?}");
        }
        self.ctx.set_line_dash_offset(style.dash_offset);
        self.ctx.set_line_width(style.width);
        self.ctx.set_line_cap(line_cap(style.start_cap));
        self.ctx.set_line_join(line_join(style.join));
        self.ctx.set_miter_limit(style.miter_limit);
        self.ctx.set_stroke_style_str(&color.to_css());
        self.ctx.stroke();
    }

    fn text(&mut self, transform: Affine, anchor: Point, text: &str, size: f64, color: Rgba) {
        self.set_transform(transform);
        self.ctx.set_font(&format!("{size}px -apple-system, BlinkMacSystemFont, 'Inter', sans-serif"));
        self.ctx.set_text_align("center");
        self.ctx.set_text_baseline("middle");
        self.ctx.set_fill_style_str(&color.to_css());
        if let Err(err) = self.ctx.fill_text(text, anchor.x, anchor.y) {
            log::warn!("canvas fillText failed: {err:?}");
        }
    }
}

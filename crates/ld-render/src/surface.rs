//! Drawing backends for the visible frame.

use kurbo::{Affine, BezPath, Point, Rect, Stroke};
use peniko::{Color, Fill};
use vello::Scene;

use crate::color::Rgba;

/// A visible drawing target.
///
/// Shapes arrive in world coordinates together with the transform to
/// screen space; the grid is drawn with [`Affine::IDENTITY`].
pub trait Surface {
    fn clear(&mut self, width: f64, height: f64, color: Rgba);
    fn fill(&mut self, transform: Affine, shape: &BezPath, color: Rgba);
    fn stroke(&mut self, transform: Affine, shape: &BezPath, style: &Stroke, color: Rgba);
    /// Draw `text` centered on `anchor`.
    fn text(&mut self, transform: Affine, anchor: Point, text: &str, size: f64, color: Rgba);
}

/// Vello scene builder. The caller owns presentation.
pub struct VelloSurface<'a> {
    scene: &'a mut Scene,
}

impl<'a> VelloSurface<'a> {
    pub fn new(scene: &'a mut Scene) -> Self {
        Self { scene }
    }
}

fn to_color(c: Rgba) -> Color {
    Color::from_rgba8(c.r, c.g, c.b, c.a)
}

impl Surface for VelloSurface<'_> {
    fn clear(&mut self, width: f64, height: f64, color: Rgba) {
        self.scene.reset();
        let bounds = Rect::new(0.0, 0.0, width, height);
        self.scene
            .fill(Fill::NonZero, Affine::IDENTITY, to_color(color), None, &bounds);
    }

    fn fill(&mut self, transform: Affine, shape: &BezPath, color: Rgba) {
        self.scene
            .fill(Fill::NonZero, transform, to_color(color), None, shape);
    }

    fn stroke(&mut self, transform: Affine, shape: &BezPath, style: &Stroke, color: Rgba) {
        self.scene
            .stroke(style, transform, to_color(color), None, shape);
    }

    fn text(&mut self, _transform: Affine, anchor: Point, text: &str, _size: f64, _color: Rgba) {
        // Glyph shaping needs a font context; labels are drawn by hosts
        // with a native text API (see the Canvas2D surface).
        log::trace!("TEXT {:?} at ({}, {})", text, anchor.x, anchor.y);
    }
}

/// Discards all visible output. Drawing a frame into it still rebuilds the
/// pick buffer, for hosts that paint the visible frame elsewhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurface;

impl Surface for NullSurface {
    fn clear(&mut self, _width: f64, _height: f64, _color: Rgba) {}
    fn fill(&mut self, _transform: Affine, _shape: &BezPath, _color: Rgba) {}
    fn stroke(&mut self, _transform: Affine, _shape: &BezPath, _style: &Stroke, _color: Rgba) {}
    fn text(&mut self, _transform: Affine, _anchor: Point, _text: &str, _size: f64, _color: Rgba) {}
}

//! Offscreen identity-color raster for picking.
//!
//! Every pickable entity is painted in its unique identity color, with the
//! same geometry and transform as the visible frame but without
//! antialiasing. Reading the pixel under the cursor and looking its color
//! up in the frame's color table yields the entity id.
//!
//! The background is transparent black (alpha 0), which is never a valid
//! identity pixel, so id 0 is pickable like any other.

use kurbo::{Affine, BezPath, Cap, Join, PathEl, Point, Stroke};
use ld_core::{EntityId, IdentityColor};
use std::collections::HashMap;
use tiny_skia::{FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, Transform};

/// RGBA raster plus the identity colors registered this frame.
///
/// A zero-sized buffer has no pixmap and picks nothing.
#[derive(Debug, Clone)]
pub struct PickBuffer {
    width: u32,
    height: u32,
    pixmap: Option<Pixmap>,
    table: HashMap<IdentityColor, EntityId>,
}

impl PickBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixmap: Pixmap::new(width, height),
            table: HashMap::new(),
        }
    }

    /// Match the visible canvas. Contents are discarded.
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        log::debug!("pick buffer resized to {width}x{height}");
        self.width = width;
        self.height = height;
        self.pixmap = Pixmap::new(width, height);
        self.table.clear();
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Clear the raster and forget every registered color.
    pub fn begin_frame(&mut self) {
        if let Some(pixmap) = &mut self.pixmap {
            pixmap.fill(tiny_skia::Color::TRANSPARENT);
        }
        self.table.clear();
    }

    /// Identity color for `id`, registered in this frame's table.
    /// `None` if the id does not fit the 24-bit encoding.
    pub fn allocate_identity(&mut self, id: EntityId) -> Option<IdentityColor> {
        let color = IdentityColor::from_id(id)?;
        self.table.insert(color, id);
        Some(color)
    }

    /// Number of colors registered since the last [`begin_frame`](Self::begin_frame).
    pub fn registered(&self) -> usize {
        self.table.len()
    }

    /// Fill `shape` (world coordinates) with `identity`.
    pub fn paint_fill(&mut self, identity: IdentityColor, transform: Affine, shape: &BezPath) {
        self.register(identity);
        let Some(path) = to_skia_path(shape) else {
            return;
        };
        if let Some(pixmap) = &mut self.pixmap {
            pixmap.fill_path(
                &path,
                &identity_paint(identity),
                FillRule::Winding,
                to_skia_transform(transform),
                None,
            );
        }
    }

    /// Stroke `shape` with `style`. Width, caps and joins follow `style`;
    /// dash gaps are filled so the whole length of a dashed line stays
    /// pickable.
    pub fn paint_stroke(
        &mut self,
        identity: IdentityColor,
        transform: Affine,
        shape: &BezPath,
        style: &Stroke,
    ) {
        self.register(identity);
        let Some(path) = to_skia_path(shape) else {
            return;
        };
        if let Some(pixmap) = &mut self.pixmap {
            pixmap.stroke_path(
                &path,
                &identity_paint(identity),
                &solid_stroke(style),
                to_skia_transform(transform),
                None,
            );
        }
    }

    fn register(&mut self, identity: IdentityColor) {
        self.table
            .entry(identity)
            .or_insert_with(|| identity.to_id());
    }

    /// The entity painted under `screen`, if any.
    ///
    /// Out-of-bounds positions, the background, and colors not registered
    /// this frame all read as nothing.
    pub fn pick(&self, screen: Point) -> Option<EntityId> {
        let [r, g, b, a] = self.pixel(screen.x, screen.y)?;
        if a == 0 {
            return None;
        }
        self.table.get(&IdentityColor::from_rgb(r, g, b)).copied()
    }

    /// Raw pixel at a screen position.
    pub fn pixel(&self, x: f64, y: f64) -> Option<[u8; 4]> {
        if x.is_nan() || y.is_nan() || x < 0.0 || y < 0.0 {
            return None;
        }
        let (col, row) = (x.floor() as u32, y.floor() as u32);
        if col >= self.width || row >= self.height {
            return None;
        }
        let c = self.pixmap.as_ref()?.pixel(col, row)?;
        Some([c.red(), c.green(), c.blue(), c.alpha()])
    }
}

/// Opaque, aliased paint so every covered pixel decodes to `identity`.
fn identity_paint(identity: IdentityColor) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(identity.r, identity.g, identity.b, 255);
    paint.anti_alias = false;
    paint
}

fn to_skia_transform(t: Affine) -> Transform {
    let [a, b, c, d, e, f] = t.as_coeffs();
    Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
}

/// `None` for paths with no drawable segment.
fn to_skia_path(shape: &BezPath) -> Option<Path> {
    let mut pb = PathBuilder::new();
    for el in shape.elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(c, p) => pb.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(c1, c2, p) => pb.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

fn solid_stroke(style: &Stroke) -> tiny_skia::Stroke {
    tiny_skia::Stroke {
        width: style.width as f32,
        miter_limit: style.miter_limit as f32,
        line_cap: match style.start_cap {
            Cap::Butt => LineCap::Butt,
            Cap::Square => LineCap::Square,
            Cap::Round => LineCap::Round,
        },
        line_join: match style.join {
            Join::Bevel => LineJoin::Bevel,
            Join::Miter => LineJoin::Miter,
            Join::Round => LineJoin::Round,
        },
        dash: None,
    }
}

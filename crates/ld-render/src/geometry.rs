//! Shared entity geometry.
//!
//! The visible painter and the pick buffer both build their shapes here, so
//! a pixel that shows an entity is also a pixel that picks it.

use kurbo::{BezPath, Cap, CubicBez, Join, Line, ParamCurve, Point, Rect, Shape, Stroke, Vec2};
use ld_core::{Direction, Node, ViewportTransform};
use smallvec::SmallVec;

/// Flattening tolerance for curves, in pixels.
pub const TOLERANCE: f64 = 0.1;

pub const CONNECTION_WIDTH: f64 = 2.0;
pub const SELECTED_CONNECTION_WIDTH: f64 = 3.0;
pub const NODE_BORDER_WIDTH: f64 = 1.0;
pub const SELECTED_BORDER_WIDTH: f64 = 2.0;
pub const ARROW_LENGTH: f64 = 12.0;
pub const ARROW_HALF_WIDTH: f64 = 5.0;
pub const DASH_PATTERN: [f64; 2] = [8.0, 4.0];
pub const LABEL_SIZE: f64 = 14.0;

/// How far the connection curve bows sideways, as a fraction of its chord.
const BOW: f64 = 0.15;

/// Stroke style for every outline in a frame: butt caps and miter joins,
/// which is what a Canvas2D context draws by default.
pub fn stroke_style(width: f64) -> Stroke {
    Stroke::new(width).with_caps(Cap::Butt).with_join(Join::Miter)
}

pub fn node_path(node: &Node) -> BezPath {
    node.rect().to_path(TOLERANCE)
}

/// Curve, arrowheads and label anchor of one connection.
#[derive(Debug, Clone)]
pub struct ConnectionGeometry {
    pub curve: CubicBez,
    pub heads: SmallVec<[BezPath; 2]>,
    pub label_anchor: Point,
}

impl ConnectionGeometry {
    pub fn path(&self) -> BezPath {
        let mut path = BezPath::new();
        path.move_to(self.curve.p0);
        path.curve_to(self.curve.p1, self.curve.p2, self.curve.p3);
        path
    }
}

/// Build the connection between two rectangles.
///
/// The curve leaves and enters through the rectangle borders and bows to
/// the left of the direction of travel. A zero-size rectangle is treated
/// as a point, which is how the in-progress connection reaches the cursor.
pub fn connection_geometry(from: Rect, to: Rect, direction: Direction) -> ConnectionGeometry {
    let start = boundary_point(from, to.center());
    let end = boundary_point(to, from.center());
    let chord = end - start;
    let len = chord.hypot();
    let bow = if len > f64::EPSILON {
        Vec2::new(chord.y, -chord.x) * BOW
    } else {
        Vec2::ZERO
    };
    let curve = CubicBez::new(start, start + chord * 0.25 + bow, start + chord * 0.75 + bow, end);

    let mut heads = SmallVec::new();
    if direction.head_at_target()
        && let Some(head) = arrow_head(end, end - curve.p2)
    {
        heads.push(head);
    }
    if direction.head_at_source()
        && let Some(head) = arrow_head(start, start - curve.p1)
    {
        heads.push(head);
    }

    ConnectionGeometry {
        curve,
        heads,
        label_anchor: curve.eval(0.5),
    }
}

/// Where the ray from the rectangle's center towards `toward` leaves the
/// rectangle. A target inside the rectangle is returned unchanged.
pub fn boundary_point(rect: Rect, toward: Point) -> Point {
    let center = rect.center();
    let d = toward - center;
    let (hw, hh) = (rect.width() / 2.0, rect.height() / 2.0);
    if hw <= 0.0 || hh <= 0.0 || d.hypot() < f64::EPSILON {
        return center;
    }
    let tx = if d.x != 0.0 { hw / d.x.abs() } else { f64::INFINITY };
    let ty = if d.y != 0.0 { hh / d.y.abs() } else { f64::INFINITY };
    center + d * tx.min(ty).min(1.0)
}

/// Filled triangle with its tip at `tip`, pointing along `along`.
fn arrow_head(tip: Point, along: Vec2) -> Option<BezPath> {
    let len = along.hypot();
    if len < f64::EPSILON {
        return None;
    }
    let u = along / len;
    let back = tip - u * ARROW_LENGTH;
    let n = Vec2::new(-u.y, u.x) * ARROW_HALF_WIDTH;

    let mut path = BezPath::new();
    path.move_to(tip);
    path.line_to(back + n);
    path.line_to(back - n);
    path.close_path();
    Some(path)
}

/// Screen-space grid lines covering a `width` x `height` canvas.
///
/// The lattice is anchored in world space, so it moves with pan and scales
/// with zoom.
pub fn grid_lines(viewport: &ViewportTransform, width: f64, height: f64, cell: f64) -> Vec<Line> {
    let step = cell * viewport.scale;
    if step <= 0.0 || !step.is_finite() {
        return Vec::new();
    }
    let first = |offset: f64| ((offset / viewport.scale) % cell) * viewport.scale;

    let mut lines = Vec::new();
    let mut x = first(viewport.offset_x);
    while x <= width {
        lines.push(Line::new((x, 0.0), (x, height)));
        x += step;
    }
    let mut y = first(viewport.offset_y);
    while y <= height {
        lines.push(Line::new((0.0, y), (width, y)));
        y += step;
    }
    lines
}

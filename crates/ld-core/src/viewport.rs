//! Screen ↔ world mapping under pan and zoom.
//!
//! `screen = world * scale + offset`, `world = (screen - offset) / scale`.
//! Both the visible surface and the pick buffer paint through
//! [`ViewportTransform::affine`], so the two rasters always agree.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

pub const MIN_SCALE: f64 = 0.5;
pub const MAX_SCALE: f64 = 2.0;

/// Pan offset (screen pixels) and uniform scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportTransform {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewportTransform {
    pub const IDENTITY: Self = Self {
        offset_x: 0.0,
        offset_y: 0.0,
        scale: 1.0,
    };

    pub fn new(offset_x: f64, offset_y: f64, scale: f64) -> Self {
        Self {
            offset_x,
            offset_y,
            scale: scale.clamp(MIN_SCALE, MAX_SCALE),
        }
    }

    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.offset_x, self.offset_y)
    }

    pub fn to_world(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.offset_x) / self.scale,
            (screen.y - self.offset_y) / self.scale,
        )
    }

    pub fn to_screen(&self, world: Point) -> Point {
        Point::new(
            world.x * self.scale + self.offset_x,
            world.y * self.scale + self.offset_y,
        )
    }

    /// Convert a screen-space displacement to world space.
    pub fn delta_to_world(&self, delta: Vec2) -> Vec2 {
        delta / self.scale
    }

    /// Shift the view by a screen-space delta, independent of scale.
    /// Non-finite deltas are ignored.
    pub fn pan(&mut self, delta: Vec2) {
        if !delta.is_finite() {
            log::debug!("pan by non-finite delta {delta:?} ignored");
            return;
        }
        self.offset_x += delta.x;
        self.offset_y += delta.y;
    }

    /// Change scale by `delta_scale`, keeping the world point under `pivot`
    /// fixed on screen. Non-finite input leaves the view unchanged.
    pub fn zoom(&mut self, pivot: Point, delta_scale: f64) {
        if !delta_scale.is_finite() || !pivot.is_finite() {
            log::debug!("zoom by {delta_scale} about {pivot:?} ignored");
            return;
        }
        let new_scale = (self.scale + delta_scale).clamp(MIN_SCALE, MAX_SCALE);
        let ratio = new_scale / self.scale;
        self.offset_x = pivot.x - (pivot.x - self.offset_x) * ratio;
        self.offset_y = pivot.y - (pivot.y - self.offset_y) * ratio;
        self.scale = new_scale;
    }

    pub fn reset(&mut self) {
        *self = Self::IDENTITY;
    }

    /// World → screen as an affine `[scale, 0, 0, scale, offset_x, offset_y]`.
    pub fn affine(&self) -> Affine {
        Affine::new([
            self.scale,
            0.0,
            0.0,
            self.scale,
            self.offset_x,
            self.offset_y,
        ])
    }

    /// Whether the fields satisfy the scale bounds and are finite.
    pub fn is_valid(&self) -> bool {
        self.offset_x.is_finite()
            && self.offset_y.is_finite()
            && (MIN_SCALE..=MAX_SCALE).contains(&self.scale)
    }
}

//! LinkDraw renderer.
//!
//! Turns a [`ld_core::GraphModel`] and viewport into a visible frame on any
//! [`Surface`] plus a matching [`PickBuffer`] used to resolve pointer
//! positions to entity ids.

pub mod color;
pub mod geometry;
pub mod paint;
pub mod pick;
pub mod surface;

pub use color::{Rgba, Theme};
pub use paint::{Frame, GRID_CELL, draw_frame};
pub use pick::PickBuffer;
pub use surface::{NullSurface, Surface, VelloSurface};

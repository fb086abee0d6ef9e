//! Graph + viewport → one visible frame and its pick buffer.
//!
//! Both targets are painted in the same pass from the same geometry, in the
//! same order, so the topmost visible entity under a pixel is also the one
//! the pick buffer reports.

use kurbo::{Affine, BezPath, Stroke};
use ld_core::{Connection, GraphModel, Node, TemporaryConnection, ViewportTransform};

use crate::color::{Rgba, Theme};
use crate::geometry::{self, ConnectionGeometry};
use crate::pick::PickBuffer;
use crate::surface::Surface;

/// Grid spacing in world units.
pub const GRID_CELL: f64 = 25.0;

/// Everything needed to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub graph: &'a GraphModel,
    pub viewport: &'a ViewportTransform,
    pub temporary: Option<&'a TemporaryConnection>,
    pub width: f64,
    pub height: f64,
    pub theme: &'a Theme,
    pub grid_cell: f64,
}

impl<'a> Frame<'a> {
    pub fn new(
        graph: &'a GraphModel,
        viewport: &'a ViewportTransform,
        width: f64,
        height: f64,
        theme: &'a Theme,
    ) -> Self {
        Self {
            graph,
            viewport,
            temporary: None,
            width,
            height,
            theme,
            grid_cell: GRID_CELL,
        }
    }

    pub fn with_temporary(mut self, temporary: Option<&'a TemporaryConnection>) -> Self {
        self.temporary = temporary;
        self
    }

    pub fn with_grid_cell(mut self, cell: f64) -> Self {
        self.grid_cell = cell;
        self
    }
}

/// Paint the visible frame and rebuild the pick buffer.
///
/// Order: background and grid, connections, the in-progress connection,
/// then nodes with their labels. The in-progress connection is visible
/// only and never pickable.
pub fn draw_frame<S: Surface>(surface: &mut S, pick: &mut PickBuffer, frame: &Frame<'_>) {
    let theme = frame.theme;
    surface.clear(frame.width, frame.height, theme.background);
    pick.begin_frame();

    draw_grid(surface, frame);

    let world = frame.viewport.affine();
    for conn in frame.graph.connections() {
        draw_connection(surface, pick, frame, world, conn);
    }
    if let Some(temp) = frame.temporary {
        draw_temporary(surface, frame, world, temp);
    }
    for node in frame.graph.nodes() {
        draw_node(surface, pick, theme, world, node);
    }

    log::trace!(
        "frame {}x{}: {} nodes, {} connections, {} pickable",
        frame.width,
        frame.height,
        frame.graph.node_count(),
        frame.graph.connection_count(),
        pick.registered()
    );
}

fn draw_grid<S: Surface>(surface: &mut S, frame: &Frame<'_>) {
    let lines = geometry::grid_lines(frame.viewport, frame.width, frame.height, frame.grid_cell);
    if lines.is_empty() {
        return;
    }
    let mut path = BezPath::new();
    for line in lines {
        path.move_to(line.p0);
        path.line_to(line.p1);
    }
    surface.stroke(Affine::IDENTITY, &path, &geometry::stroke_style(1.0), frame.theme.grid);
}

fn connection_stroke(width: f64, dashed: bool) -> Stroke {
    let stroke = geometry::stroke_style(width);
    if dashed {
        stroke.with_dashes(0.0, geometry::DASH_PATTERN)
    } else {
        stroke
    }
}

fn paint_connection_shape<S: Surface>(
    surface: &mut S,
    world: Affine,
    geom: &ConnectionGeometry,
    style: &Stroke,
    color: Rgba,
) {
    surface.stroke(world, &geom.path(), style, color);
    for head in &geom.heads {
        surface.fill(world, head, color);
    }
}

fn draw_connection<S: Surface>(
    surface: &mut S,
    pick: &mut PickBuffer,
    frame: &Frame<'_>,
    world: Affine,
    conn: &Connection,
) {
    let Some((from, to)) = frame.graph.endpoints(conn) else {
        log::warn!("connection {} has a missing endpoint, skipped", conn.id);
        return;
    };
    let geom = geometry::connection_geometry(from.rect(), to.rect(), conn.direction);
    let (width, color) = if conn.selected {
        (geometry::SELECTED_CONNECTION_WIDTH, frame.theme.selection)
    } else {
        (geometry::CONNECTION_WIDTH, frame.theme.connection)
    };
    let style = connection_stroke(width, conn.dashed);

    paint_connection_shape(surface, world, &geom, &style, color);
    if !conn.label.is_empty() {
        surface.text(world, geom.label_anchor, &conn.label, geometry::LABEL_SIZE, frame.theme.label);
    }

    if let Some(identity) = pick.allocate_identity(conn.id) {
        pick.paint_stroke(identity, world, &geom.path(), &style);
        for head in &geom.heads {
            pick.paint_fill(identity, world, head);
        }
    }
}

fn draw_temporary<S: Surface>(
    surface: &mut S,
    frame: &Frame<'_>,
    world: Affine,
    temp: &TemporaryConnection,
) {
    let Some(from) = frame.graph.node(temp.from) else {
        return;
    };
    let geom = geometry::connection_geometry(from.rect(), temp.target_rect(), temp.direction);
    let style = connection_stroke(geometry::CONNECTION_WIDTH, temp.dashed);
    paint_connection_shape(surface, world, &geom, &style, frame.theme.preview);
}

fn draw_node<S: Surface>(
    surface: &mut S,
    pick: &mut PickBuffer,
    theme: &Theme,
    world: Affine,
    node: &Node,
) {
    let path = geometry::node_path(node);
    let (border_width, border_color) = if node.selected {
        (geometry::SELECTED_BORDER_WIDTH, theme.selection)
    } else {
        (geometry::NODE_BORDER_WIDTH, theme.node_border)
    };
    let border = geometry::stroke_style(border_width);

    surface.fill(world, &path, Rgba::parse_or(&node.color, theme.node_fallback));
    surface.stroke(world, &path, &border, border_color);
    if !node.label.is_empty() {
        surface.text(world, node.center(), &node.label, geometry::LABEL_SIZE, theme.label);
    }

    if let Some(identity) = pick.allocate_identity(node.id) {
        pick.paint_fill(identity, world, &path);
        pick.paint_stroke(identity, world, &path, &border);
    }
}

//! Integration tests: graph + viewport → draw_frame → pick.
//!
//! The pick buffer must report whatever is visibly on top at a screen
//! position, under any pan and zoom.

use ld_core::{Direction, EntityId, GraphModel, Point, Vec2, ViewportTransform};
use ld_render::{Frame, PickBuffer, Theme, VelloSurface, draw_frame};
use pretty_assertions::assert_eq;
use vello::Scene;

const W: u32 = 400;
const H: u32 = 300;

fn render(graph: &GraphModel, viewport: &ViewportTransform) -> PickBuffer {
    let theme = Theme::light();
    let mut scene = Scene::new();
    let mut pick = PickBuffer::new(W, H);
    let frame = Frame::new(graph, viewport, W as f64, H as f64, &theme);
    draw_frame(&mut VelloSurface::new(&mut scene), &mut pick, &frame);
    pick
}

fn sample() -> GraphModel {
    let mut g = GraphModel::new();
    g.add_node(20.0, 20.0, 50.0, 50.0, "red", "A");
    g.add_node(220.0, 20.0, 50.0, 50.0, "blue", "B");
    g.add_connection(EntityId(1), EntityId(2), Direction::AtoB, true, "");
    g
}

// ─── Identity view ───────────────────────────────────────────────────────

#[test]
fn nodes_and_background() {
    let pick = render(&sample(), &ViewportTransform::IDENTITY);
    assert_eq!(pick.pick(Point::new(45.0, 45.0)), Some(EntityId(1)));
    assert_eq!(pick.pick(Point::new(245.0, 45.0)), Some(EntityId(2)));
    assert_eq!(pick.pick(Point::new(150.0, 250.0)), None);
}

#[test]
fn node_border_is_part_of_the_node() {
    let mut g = sample();
    g.set_selection(Some(EntityId(1)));
    let pick = render(&g, &ViewportTransform::IDENTITY);
    // The 2px selection border straddles the rectangle edge at x = 20.
    assert_eq!(pick.pick(Point::new(19.5, 45.0)), Some(EntityId(1)));
}

#[test]
fn nodes_paint_over_connections() {
    let mut g = GraphModel::new();
    g.add_node(0.0, 0.0, 100.0, 100.0, "red", "");
    g.add_node(300.0, 0.0, 50.0, 50.0, "red", "");
    g.add_node(120.0, 0.0, 120.0, 120.0, "green", "");
    // Passes underneath node 3.
    g.add_connection(EntityId(1), EntityId(2), Direction::None, false, "");

    let pick = render(&g, &ViewportTransform::IDENTITY);
    let conn = g.connection(EntityId(4)).unwrap();
    let (a, b) = g.endpoints(conn).unwrap();
    let geom = ld_render::geometry::connection_geometry(a.rect(), b.rect(), conn.direction);
    assert!(g.node(EntityId(3)).unwrap().rect().contains(geom.label_anchor));
    assert_eq!(pick.pick(geom.label_anchor), Some(EntityId(3)));
}

// ─── Transformed views ───────────────────────────────────────────────────

#[test]
fn picking_follows_pan() {
    let mut vp = ViewportTransform::IDENTITY;
    vp.pan(Vec2::new(100.0, 50.0));
    let pick = render(&sample(), &vp);
    assert_eq!(pick.pick(Point::new(45.0, 45.0)), None);
    assert_eq!(pick.pick(Point::new(145.0, 95.0)), Some(EntityId(1)));
}

#[test]
fn picking_follows_zoom() {
    let mut vp = ViewportTransform::IDENTITY;
    vp.zoom(Point::new(0.0, 0.0), 1.0);
    let pick = render(&sample(), &vp);
    // World (45, 45) → screen (90, 90) at scale 2.
    assert_eq!(pick.pick(Point::new(90.0, 90.0)), Some(EntityId(1)));
    assert_eq!(pick.pick(vp.to_screen(Point::new(60.0, 30.0))), Some(EntityId(1)));
}

#[test]
fn screen_to_world_agrees_with_pick() {
    let mut vp = ViewportTransform::IDENTITY;
    vp.pan(Vec2::new(-13.0, 7.0));
    vp.zoom(Point::new(200.0, 150.0), -0.3);
    let g = sample();
    let pick = render(&g, &vp);

    for node in g.nodes() {
        let screen = vp.to_screen(node.center());
        assert_eq!(pick.pick(screen), Some(node.id), "at {screen:?}");
    }
}

// ─── Connections and removal ─────────────────────────────────────────────

#[test]
fn connection_is_pickable_along_dashed_curve() {
    let g = sample();
    let pick = render(&g, &ViewportTransform::IDENTITY);
    let conn = g.connection(EntityId(3)).unwrap();
    let (a, b) = g.endpoints(conn).unwrap();
    let geom = ld_render::geometry::connection_geometry(a.rect(), b.rect(), conn.direction);
    assert_eq!(pick.pick(geom.label_anchor), Some(EntityId(3)));
}

#[test]
fn deleted_entities_disappear_next_frame() {
    let mut g = sample();
    g.remove_node(EntityId(2));
    let pick = render(&g, &ViewportTransform::IDENTITY);
    assert_eq!(pick.pick(Point::new(245.0, 45.0)), None);
    assert_eq!(pick.registered(), 1);
}

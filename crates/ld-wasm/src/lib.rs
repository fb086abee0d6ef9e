//! WASM bridge for LinkDraw: exposes the diagram editor session to
//! JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. The host forwards DOM
//! pointer, wheel and keyboard events, calls [`DiagramCanvas::render`] when a
//! handler reports a change, and shows its own edit affordance when a
//! double-click returns an edit request.

mod render2d;

use ld_core::{ConnectionEdit, Direction, EntityId, NodeEdit, Point, Selection};
use ld_editor::shortcuts::ShortcutMap;
use ld_editor::{EditorConfig, InputEvent, Modifiers, PointerButton, Session};
use render2d::Canvas2dSurface;
use serde_json::{Value, json};
use time::OffsetDateTime;
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

/// The WASM-facing editor controller.
///
/// Owns one [`Session`] without a Vello scene: every handler applies its
/// event and rebuilds the pick buffer before returning, and the visible
/// frame is painted only by [`render`](Self::render).
#[wasm_bindgen]
pub struct DiagramCanvas {
    session: Session,
}

#[wasm_bindgen]
impl DiagramCanvas {
    /// Create an empty canvas with default settings.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64) -> Self {
        console_error_panic_hook_setup();
        Self {
            session: Session::without_scene(width, height, EditorConfig::default()),
        }
    }

    /// Create an empty canvas with settings from JSON (camelCase keys,
    /// missing keys take defaults).
    pub fn with_config(width: f64, height: f64, config: &str) -> Result<DiagramCanvas, JsValue> {
        console_error_panic_hook_setup();
        let config = EditorConfig::from_json(config).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self {
            session: Session::without_scene(width, height, config),
        })
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    /// `button` is the DOM `MouseEvent.button` value. Returns `true` if the
    /// canvas needs repainting.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_down(
        &mut self,
        x: f64,
        y: f64,
        button: i16,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        let event = InputEvent::PointerDown {
            x,
            y,
            button: PointerButton::from_dom(button),
            modifiers: Modifiers::new(shift, ctrl, alt, meta),
        };
        self.session.handle(&event).redraw
    }

    pub fn handle_pointer_move(
        &mut self,
        x: f64,
        y: f64,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        let modifiers = Modifiers::new(shift, ctrl, alt, meta);
        self.session
            .handle(&InputEvent::pointer_move(x, y, modifiers))
            .redraw
    }

    /// Also call this for releases outside the canvas; coordinates may lie
    /// off-screen.
    pub fn handle_pointer_up(&mut self, x: f64, y: f64) -> bool {
        self.session.handle(&InputEvent::pointer_up(x, y)).redraw
    }

    /// Double-click on empty canvas adds a node. On an entity it returns a
    /// JSON edit request describing it; otherwise an empty string.
    pub fn handle_double_click(&mut self, x: f64, y: f64) -> String {
        let response = self.session.handle(&InputEvent::DoubleClick { x, y });
        match response.edit {
            Some(target) => self.describe(target).to_string(),
            None => String::new(),
        }
    }

    pub fn handle_wheel(&mut self, x: f64, y: f64, delta_y: f64) -> bool {
        self.session
            .handle(&InputEvent::Wheel { x, y, delta_y })
            .redraw
    }

    /// Handle a keyboard event. Returns a JSON string:
    /// `{"changed":bool, "action":"<action_name>"}`
    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> String {
        let action = ShortcutMap::resolve(key, ctrl, shift, alt, meta)
            .map(|a| a.name())
            .unwrap_or("none");
        let modifiers = Modifiers::new(shift, ctrl, alt, meta);
        let changed = self.session.handle(&InputEvent::key(key, modifiers)).redraw;
        json!({ "changed": changed, "action": action }).to_string()
    }

    /// Abort any gesture in progress, e.g. on `pointercancel` or lost
    /// pointer capture.
    pub fn cancel_gesture(&mut self) -> bool {
        self.session.cancel_gesture()
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    pub fn render(&mut self, ctx: &CanvasRenderingContext2d) {
        self.session.render_into(&mut Canvas2dSurface::new(ctx));
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.session.resize(width, height);
    }

    /// Switch between light (`false`) and dark (`true`) palettes.
    pub fn set_theme(&mut self, is_dark: bool) {
        self.session.set_dark_mode(is_dark);
    }

    /// The entity id drawn at a screen position, or -1.
    pub fn element_at(&self, x: f64, y: f64) -> i32 {
        match self.session.element_at(Point::new(x, y)) {
            Some(EntityId(id)) => id as i32,
            None => -1,
        }
    }

    /// The current selection as JSON, or an empty string.
    pub fn get_selection(&self) -> String {
        match self.session.diagram().graph.selection() {
            Some(target) => self.describe(target).to_string(),
            None => String::new(),
        }
    }

    // ─── Editing ─────────────────────────────────────────────────────────

    /// Add a node with its top-left corner at world `(x, y)`. Returns the
    /// new id, or -1 when the id space is exhausted.
    #[allow(clippy::too_many_arguments)]
    pub fn add_node(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: &str,
        label: &str,
    ) -> i32 {
        match self.session.add_node(x, y, width, height, color, label) {
            Some(EntityId(id)) => id as i32,
            None => -1,
        }
    }

    /// Connect two nodes. `direction` is `AtoB`, `BtoA`, `both` or `none`.
    /// Returns the new id, or -1 if either node is missing, both ends are
    /// the same node, or the direction is unknown.
    pub fn add_connection(&mut self, from: u32, to: u32, direction: &str, dashed: bool, label: &str) -> i32 {
        let Some(direction) = Direction::parse(direction) else {
            return -1;
        };
        match self
            .session
            .add_connection(EntityId(from), EntityId(to), direction, dashed, label)
        {
            Some(EntityId(id)) => id as i32,
            None => -1,
        }
    }

    pub fn set_node_label(&mut self, id: u32, label: &str) -> bool {
        self.session.update_node(
            EntityId(id),
            NodeEdit {
                label: Some(label.to_string()),
                ..NodeEdit::default()
            },
        )
    }

    pub fn set_node_color(&mut self, id: u32, color: &str) -> bool {
        self.session.update_node(
            EntityId(id),
            NodeEdit {
                color: Some(color.to_string()),
                ..NodeEdit::default()
            },
        )
    }

    /// Restyle a connection. Returns `false` for an unknown id or direction.
    pub fn set_connection_style(&mut self, id: u32, label: &str, direction: &str, dashed: bool) -> bool {
        let Some(direction) = Direction::parse(direction) else {
            return false;
        };
        self.session.update_connection(
            EntityId(id),
            ConnectionEdit {
                label: Some(label.to_string()),
                direction: Some(direction),
                dashed: Some(dashed),
            },
        )
    }

    /// Select an entity by id, or clear the selection with -1.
    pub fn select(&mut self, id: i32) -> bool {
        let target = u32::try_from(id).ok().map(EntityId);
        self.session.select(target).is_some()
    }

    pub fn delete_selected(&mut self) -> bool {
        self.session
            .handle(&InputEvent::key("Delete", Modifiers::NONE))
            .redraw
    }

    /// Remove every node and connection and reset the view.
    pub fn clear(&mut self) {
        self.session.clear();
    }

    // ─── Snapshots ───────────────────────────────────────────────────────

    /// Serialize the diagram and view, stamped with the current time.
    pub fn export_snapshot(&self) -> Result<String, JsValue> {
        self.session
            .export_json(now())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Replace the diagram from snapshot text. On error the diagram is left
    /// untouched and the message is thrown to JS.
    pub fn import_snapshot(&mut self, text: &str) -> Result<(), JsValue> {
        self.session.import_json(text).map_err(|e| {
            log::warn!("snapshot import rejected: {e}");
            JsValue::from_str(&e.to_string())
        })
    }
}

impl DiagramCanvas {
    fn describe(&self, target: Selection) -> Value {
        let graph = &self.session.diagram().graph;
        match target {
            Selection::Node(id) => match graph.node(id) {
                Some(node) => json!({
                    "kind": "node",
                    "id": id.0,
                    "label": node.label,
                    "color": node.color,
                }),
                None => Value::Null,
            },
            Selection::Connection(id) => match graph.connection(id) {
                Some(conn) => json!({
                    "kind": "connection",
                    "id": id.0,
                    "from": conn.from.0,
                    "to": conn.to.0,
                    "label": conn.label,
                    "direction": conn.direction,
                    "dashed": conn.dashed,
                }),
                None => Value::Null,
            },
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn now() -> OffsetDateTime {
    let nanos = (js_sys::Date::now() * 1_000_000.0) as i128;
    OffsetDateTime::from_unix_timestamp_nanos(nanos).unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

#[cfg(not(target_arch = "wasm32"))]
fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("LinkDraw WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn canvas() -> DiagramCanvas {
        let mut c = DiagramCanvas::new(400.0, 300.0);
        c.add_node(0.0, 0.0, 50.0, 50.0, "red", "A");
        c.add_node(100.0, 100.0, 50.0, 50.0, "blue", "B");
        c
    }

    #[test]
    fn element_at_reports_ids_and_sentinel() {
        let c = canvas();
        assert_eq!(c.element_at(25.0, 25.0), 1);
        assert_eq!(c.element_at(125.0, 125.0), 2);
        assert_eq!(c.element_at(300.0, 20.0), -1);
    }

    #[test]
    fn click_then_selection_json() {
        let mut c = canvas();
        assert!(c.handle_pointer_down(25.0, 25.0, 0, false, false, false, false));
        c.handle_pointer_up(25.0, 25.0);
        let sel: Value = serde_json::from_str(&c.get_selection()).unwrap();
        assert_eq!(sel, json!({ "kind": "node", "id": 1, "label": "A", "color": "red" }));
    }

    #[test]
    fn shift_drag_connects() {
        let mut c = canvas();
        c.handle_pointer_down(25.0, 25.0, 0, false, false, false, false);
        c.handle_pointer_move(120.0, 120.0, true, false, false, false);
        c.handle_pointer_up(120.0, 120.0);
        assert_eq!(c.session.diagram().graph.connection_count(), 1);
    }

    #[test]
    fn double_click_on_connection_describes_it() {
        let mut c = canvas();
        c.add_node(300.0, 100.0, 50.0, 50.0, "gray", "C");
        assert_eq!(c.add_connection(2, 3, "none", true, "link"), 4);
        let graph = &c.session.diagram().graph;
        let (b, cc) = (
            graph.node(EntityId(2)).unwrap().rect(),
            graph.node(EntityId(3)).unwrap().rect(),
        );
        let anchor = ld_render::geometry::connection_geometry(b, cc, Direction::None).label_anchor;

        let request: Value = serde_json::from_str(&c.handle_double_click(anchor.x, anchor.y)).unwrap();
        assert_eq!(
            request,
            json!({
                "kind": "connection",
                "id": 4,
                "from": 2,
                "to": 3,
                "label": "link",
                "direction": "none",
                "dashed": true,
            })
        );
    }

    #[test]
    fn double_click_on_background_adds_node() {
        let mut c = canvas();
        assert_eq!(c.handle_double_click(300.0, 250.0), "");
        assert_eq!(c.element_at(300.0, 250.0), 3);
    }

    #[test]
    fn key_reports_action() {
        let mut c = canvas();
        let out: Value = serde_json::from_str(&c.handle_key("=", true, false, false, false)).unwrap();
        assert_eq!(out, json!({ "changed": true, "action": "zoomIn" }));
        let out: Value = serde_json::from_str(&c.handle_key("q", false, false, false, false)).unwrap();
        assert_eq!(out["action"], "none");
    }

    #[test]
    fn edits_by_id() {
        let mut c = canvas();
        assert!(c.set_node_label(1, "Start"));
        assert!(c.set_node_color(1, "#112233"));
        assert!(!c.set_node_label(42, "x"));
        assert_eq!(c.add_connection(1, 2, "sideways", false, ""), -1);
        assert_eq!(c.add_connection(1, 1, "AtoB", false, ""), -1);
        let id = c.add_connection(1, 2, "AtoB", false, "") as u32;
        assert!(c.set_connection_style(id, "go", "both", true));
        assert!(!c.set_connection_style(id, "go", "up", true));
        let conn = c.session.diagram().graph.connection(EntityId(id)).unwrap();
        assert_eq!((conn.direction, conn.dashed, conn.label.as_str()), (Direction::Both, true, "go"));
    }

    #[test]
    fn select_and_delete() {
        let mut c = canvas();
        assert!(c.select(2));
        assert!(c.delete_selected());
        assert_eq!(c.element_at(125.0, 125.0), -1);
        assert!(!c.select(-1));
        assert_eq!(c.get_selection(), "");
    }

    #[test]
    fn snapshot_round_trip() {
        let mut c = canvas();
        c.handle_wheel(0.0, 0.0, -500.0);
        let text = c.export_snapshot().unwrap();

        let mut other = DiagramCanvas::new(400.0, 300.0);
        other.import_snapshot(&text).unwrap();
        assert_eq!(other.session.diagram().viewport, c.session.diagram().viewport);
        assert_eq!(other.element_at(60.0, 60.0), 1);
        other.clear();
        assert_eq!(other.element_at(60.0, 60.0), -1);
    }
}

//! Gesture state machine for canvas interaction.
//!
//! The controller never touches the diagram. It reads the current graph,
//! viewport and pick result through a [`GestureContext`] and returns
//! [`EditorAction`]s for the session to apply, in order.
//!
//! ## Pointer gestures
//!
//! | Held on move         | Node selected | Effect                    |
//! |----------------------|---------------|---------------------------|
//! | move modifier (⌘)    | yes           | drag the selected node    |
//! | connect modifier (⇧) | yes           | draw a connection from it |
//! | anything else        | any           | pan the view              |
//!
//! Selection always happens on press, so a press-and-drag acts on the
//! entity under the press point.

use kurbo::{Point, Vec2};
use ld_core::{Direction, EntityId, GraphModel, Selection, TemporaryConnection, ViewportTransform};
use smallvec::SmallVec;

use crate::config::EditorConfig;
use crate::input::{InputEvent, Modifiers, PointerButton};
use crate::shortcuts::{ShortcutAction, ShortcutMap};

/// A model or view change requested by a gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    Select(Option<EntityId>),
    /// Raw screen-space delta.
    Pan(Vec2),
    /// World-space delta.
    MoveNode { node: EntityId, delta: Vec2 },
    Connect {
        from: EntityId,
        to: EntityId,
        direction: Direction,
        dashed: bool,
    },
    /// Create a default node centered on a world point.
    AddNodeAt(Point),
    /// Ask the host to open its label/style editor.
    RequestEdit(Selection),
    Zoom { pivot: Point, delta: f64 },
    ResetView,
    DeleteSelected,
}

pub type Actions = SmallVec<[EditorAction; 2]>;

/// Read-only view of the session for one event.
#[derive(Debug, Clone, Copy)]
pub struct GestureContext<'a> {
    pub graph: &'a GraphModel,
    pub viewport: &'a ViewportTransform,
    /// Pick result at the event position (press, release and double-click).
    pub hit: Option<EntityId>,
    /// Center of the drawing surface, for keyboard zoom.
    pub center: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GestureState {
    Idle,
    Panning { last: Point },
    DraggingNode { node: EntityId, last: Point },
    DrawingConnection { preview: TemporaryConnection, last: Point },
}

impl GestureState {
    fn last(&self) -> Option<Point> {
        match *self {
            Self::Idle => None,
            Self::Panning { last }
            | Self::DraggingNode { last, .. }
            | Self::DrawingConnection { last, .. } => Some(last),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InteractionController {
    state: GestureState,
    config: EditorConfig,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl InteractionController {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            state: GestureState::Idle,
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut EditorConfig {
        &mut self.config
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != GestureState::Idle
    }

    /// The in-progress connection, drawn but never pickable.
    pub fn temporary(&self) -> Option<&TemporaryConnection> {
        match &self.state {
            GestureState::DrawingConnection { preview, .. } => Some(preview),
            _ => None,
        }
    }

    /// Drop any gesture in progress. Returns `true` if one was active.
    pub fn cancel(&mut self) -> bool {
        let was_active = self.is_active();
        if was_active {
            log::debug!("gesture cancelled: {:?}", self.state);
        }
        self.state = GestureState::Idle;
        was_active
    }

    /// Interpret one event.
    ///
    /// `None` means the event was ignored and nothing needs redrawing;
    /// `Some` (possibly empty) means it was handled.
    pub fn handle(&mut self, event: &InputEvent, ctx: &GestureContext<'_>) -> Option<Actions> {
        match *event {
            InputEvent::PointerDown {
                x,
                y,
                button: PointerButton::Secondary,
                ..
            }
            | InputEvent::DoubleClick { x, y } => Some(self.add_or_edit(Point::new(x, y), ctx)),

            InputEvent::PointerDown { x, y, .. } => Some(self.press(Point::new(x, y), ctx)),

            InputEvent::PointerMove { x, y, modifiers } => {
                self.drag(Point::new(x, y), modifiers, ctx)
            }

            InputEvent::PointerUp { .. } => self.release(ctx),

            InputEvent::Wheel { x, y, delta_y } => {
                let delta = -delta_y * self.config.wheel_sensitivity;
                Some(SmallVec::from_elem(
                    EditorAction::Zoom {
                        pivot: Point::new(x, y),
                        delta,
                    },
                    1,
                ))
            }

            InputEvent::Key { ref key, modifiers } => self.key(key, modifiers, ctx),
        }
    }

    fn press(&mut self, pos: Point, ctx: &GestureContext<'_>) -> Actions {
        if self.is_active() {
            log::debug!("press while {:?}; previous gesture dropped", self.state);
        }
        self.state = GestureState::Panning { last: pos };
        SmallVec::from_elem(EditorAction::Select(ctx.hit), 1)
    }

    /// Reclassify intent from the modifiers held on this sample.
    fn drag(&mut self, pos: Point, modifiers: Modifiers, ctx: &GestureContext<'_>) -> Option<Actions> {
        let last = self.state.last()?;
        let delta = pos - last;
        let selected = ctx.graph.selected_node().map(|n| n.id);
        let mut out = Actions::new();

        self.state = match selected {
            Some(node) if self.config.move_modifier.held(modifiers) => {
                out.push(EditorAction::MoveNode {
                    node,
                    delta: ctx.viewport.delta_to_world(delta),
                });
                GestureState::DraggingNode { node, last: pos }
            }
            Some(node) if self.config.connect_modifier.held(modifiers) => {
                let cursor = ctx.viewport.to_world(pos);
                let preview = match &self.state {
                    GestureState::DrawingConnection { preview, .. } if preview.from == node => {
                        TemporaryConnection { cursor, ..*preview }
                    }
                    _ => TemporaryConnection {
                        from: node,
                        cursor,
                        direction: self.config.connection_direction,
                        dashed: self.config.connection_dashed,
                    },
                };
                GestureState::DrawingConnection { preview, last: pos }
            }
            _ => {
                out.push(EditorAction::Pan(delta));
                GestureState::Panning { last: pos }
            }
        };
        Some(out)
    }

    fn release(&mut self, ctx: &GestureContext<'_>) -> Option<Actions> {
        let ended = std::mem::replace(&mut self.state, GestureState::Idle);
        let mut out = Actions::new();
        match ended {
            GestureState::Idle => return None,
            GestureState::DrawingConnection { preview, .. } => {
                if let Some(to) = ctx.hit
                    && to != preview.from
                    && ctx.graph.node(to).is_some()
                    && ctx.graph.node(preview.from).is_some()
                {
                    out.push(EditorAction::Connect {
                        from: preview.from,
                        to,
                        direction: preview.direction,
                        dashed: preview.dashed,
                    });
                } else {
                    log::debug!("connection from {} released on {:?}, discarded", preview.from, ctx.hit);
                }
            }
            GestureState::Panning { .. } | GestureState::DraggingNode { .. } => {}
        }
        Some(out)
    }

    fn add_or_edit(&mut self, pos: Point, ctx: &GestureContext<'_>) -> Actions {
        let action = match ctx.hit.and_then(|id| ctx.graph.resolve(id)) {
            Some(target) => EditorAction::RequestEdit(target),
            None => EditorAction::AddNodeAt(ctx.viewport.to_world(pos)),
        };
        SmallVec::from_elem(action, 1)
    }

    fn key(&mut self, key: &str, m: Modifiers, ctx: &GestureContext<'_>) -> Option<Actions> {
        let shortcut = ShortcutMap::resolve(key, m.ctrl, m.shift, m.alt, m.meta)?;
        log::debug!("shortcut {key:?} → {}", shortcut.name());

        let step = self.config.key_zoom_step;
        let action = match shortcut {
            ShortcutAction::Delete => EditorAction::DeleteSelected,
            ShortcutAction::Cancel => {
                if self.temporary().is_some() {
                    self.state = GestureState::Idle;
                    return Some(Actions::new());
                }
                EditorAction::Select(None)
            }
            ShortcutAction::ZoomIn => EditorAction::Zoom {
                pivot: ctx.center,
                delta: step,
            },
            ShortcutAction::ZoomOut => EditorAction::Zoom {
                pivot: ctx.center,
                delta: -step,
            },
            ShortcutAction::ResetView => EditorAction::ResetView,
        };
        Some(SmallVec::from_elem(action, 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CTRL: Modifiers = Modifiers::new(false, true, false, false);
    const SHIFT: Modifiers = Modifiers::new(true, false, false, false);

    fn graph_with_selection(selected: Option<EntityId>) -> GraphModel {
        let mut g = GraphModel::new();
        g.add_node(0.0, 0.0, 50.0, 50.0, "red", "A");
        g.add_node(100.0, 100.0, 50.0, 50.0, "blue", "B");
        g.add_connection(EntityId(1), EntityId(2), Direction::AtoB, false, "");
        g.set_selection(selected);
        g
    }

    fn ctx<'a>(graph: &'a GraphModel, viewport: &'a ViewportTransform, hit: Option<EntityId>) -> GestureContext<'a> {
        GestureContext {
            graph,
            viewport,
            hit,
            center: Point::new(400.0, 300.0),
        }
    }

    fn down(x: f64, y: f64) -> InputEvent {
        InputEvent::pointer_down(x, y, Modifiers::NONE)
    }

    #[test]
    fn press_selects_then_pans() {
        let g = graph_with_selection(None);
        let vp = ViewportTransform::IDENTITY;
        let mut c = InteractionController::default();

        let actions = c.handle(&down(10.0, 10.0), &ctx(&g, &vp, Some(EntityId(1)))).unwrap();
        assert_eq!(actions.as_slice(), &[EditorAction::Select(Some(EntityId(1)))]);
        assert_eq!(c.state(), &GestureState::Panning { last: Point::new(10.0, 10.0) });

        let actions = c
            .handle(&InputEvent::pointer_move(25.0, 5.0, Modifiers::NONE), &ctx(&g, &vp, None))
            .unwrap();
        assert_eq!(actions.as_slice(), &[EditorAction::Pan(Vec2::new(15.0, -5.0))]);
    }

    #[test]
    fn press_on_background_clears_selection() {
        let g = graph_with_selection(Some(EntityId(1)));
        let vp = ViewportTransform::IDENTITY;
        let mut c = InteractionController::default();
        let actions = c.handle(&down(500.0, 500.0), &ctx(&g, &vp, None)).unwrap();
        assert_eq!(actions.as_slice(), &[EditorAction::Select(None)]);
    }

    #[test]
    fn moves_without_press_are_ignored() {
        let g = graph_with_selection(None);
        let vp = ViewportTransform::IDENTITY;
        let mut c = InteractionController::default();
        assert_eq!(
            c.handle(&InputEvent::pointer_move(1.0, 1.0, Modifiers::NONE), &ctx(&g, &vp, None)),
            None
        );
        assert_eq!(c.handle(&InputEvent::pointer_up(1.0, 1.0), &ctx(&g, &vp, None)), None);
    }

    #[test]
    fn ctrl_drag_moves_selected_node_in_world_units() {
        let g = graph_with_selection(Some(EntityId(1)));
        let vp = ViewportTransform::new(0.0, 0.0, 2.0);
        let mut c = InteractionController::default();
        c.handle(&down(10.0, 10.0), &ctx(&g, &vp, Some(EntityId(1))));

        let actions = c
            .handle(&InputEvent::pointer_move(30.0, 16.0, CTRL), &ctx(&g, &vp, None))
            .unwrap();
        assert_eq!(
            actions.as_slice(),
            &[EditorAction::MoveNode {
                node: EntityId(1),
                delta: Vec2::new(10.0, 3.0)
            }]
        );
        assert!(matches!(c.state(), GestureState::DraggingNode { .. }));
    }

    #[test]
    fn ctrl_drag_without_node_selected_pans() {
        let g = graph_with_selection(Some(EntityId(3)));
        let vp = ViewportTransform::IDENTITY;
        let mut c = InteractionController::default();
        c.handle(&down(0.0, 0.0), &ctx(&g, &vp, Some(EntityId(3))));
        let actions = c
            .handle(&InputEvent::pointer_move(4.0, 0.0, CTRL), &ctx(&g, &vp, None))
            .unwrap();
        assert_eq!(actions.as_slice(), &[EditorAction::Pan(Vec2::new(4.0, 0.0))]);
    }

    #[test]
    fn releasing_modifier_mid_drag_switches_to_pan() {
        let g = graph_with_selection(Some(EntityId(1)));
        let vp = ViewportTransform::IDENTITY;
        let mut c = InteractionController::default();
        c.handle(&down(0.0, 0.0), &ctx(&g, &vp, Some(EntityId(1))));
        c.handle(&InputEvent::pointer_move(5.0, 0.0, CTRL), &ctx(&g, &vp, None));
        let actions = c
            .handle(&InputEvent::pointer_move(8.0, 0.0, Modifiers::NONE), &ctx(&g, &vp, None))
            .unwrap();
        assert_eq!(actions.as_slice(), &[EditorAction::Pan(Vec2::new(3.0, 0.0))]);
    }

    #[test]
    fn shift_drag_draws_and_connects() {
        let g = graph_with_selection(Some(EntityId(1)));
        let vp = ViewportTransform::new(10.0, 0.0, 1.0);
        let mut c = InteractionController::default();
        c.handle(&down(35.0, 25.0), &ctx(&g, &vp, Some(EntityId(1))));

        let actions = c
            .handle(&InputEvent::pointer_move(90.0, 80.0, SHIFT), &ctx(&g, &vp, None))
            .unwrap();
        assert!(actions.is_empty());
        let preview = c.temporary().copied().unwrap();
        assert_eq!(preview.from, EntityId(1));
        assert_eq!(preview.cursor, Point::new(80.0, 80.0));
        assert_eq!(preview.direction, Direction::AtoB);

        c.handle(&InputEvent::pointer_move(130.0, 120.0, SHIFT), &ctx(&g, &vp, None));
        assert_eq!(c.temporary().unwrap().cursor, Point::new(120.0, 120.0));

        let actions = c
            .handle(&InputEvent::pointer_up(130.0, 120.0), &ctx(&g, &vp, Some(EntityId(2))))
            .unwrap();
        assert_eq!(
            actions.as_slice(),
            &[EditorAction::Connect {
                from: EntityId(1),
                to: EntityId(2),
                direction: Direction::AtoB,
                dashed: false
            }]
        );
        assert!(c.temporary().is_none());
        assert!(!c.is_active());
    }

    #[test]
    fn connection_release_on_source_background_or_connection_is_discarded() {
        let g = graph_with_selection(Some(EntityId(1)));
        let vp = ViewportTransform::IDENTITY;
        for hit in [Some(EntityId(1)), None, Some(EntityId(3))] {
            let mut c = InteractionController::default();
            c.handle(&down(10.0, 10.0), &ctx(&g, &vp, Some(EntityId(1))));
            c.handle(&InputEvent::pointer_move(60.0, 60.0, SHIFT), &ctx(&g, &vp, None));
            let actions = c.handle(&InputEvent::pointer_up(60.0, 60.0), &ctx(&g, &vp, hit)).unwrap();
            assert!(actions.is_empty(), "hit {hit:?}");
            assert!(c.temporary().is_none());
        }
    }

    #[test]
    fn escape_aborts_connection_then_deselects() {
        let g = graph_with_selection(Some(EntityId(1)));
        let vp = ViewportTransform::IDENTITY;
        let mut c = InteractionController::default();
        c.handle(&down(10.0, 10.0), &ctx(&g, &vp, Some(EntityId(1))));
        c.handle(&InputEvent::pointer_move(60.0, 60.0, SHIFT), &ctx(&g, &vp, None));

        let escape = InputEvent::key("Escape", Modifiers::NONE);
        let actions = c.handle(&escape, &ctx(&g, &vp, None)).unwrap();
        assert!(actions.is_empty());
        assert!(c.temporary().is_none());
        assert!(!c.is_active());

        let actions = c.handle(&escape, &ctx(&g, &vp, None)).unwrap();
        assert_eq!(actions.as_slice(), &[EditorAction::Select(None)]);
    }

    #[test]
    fn double_click_adds_or_edits() {
        let g = graph_with_selection(None);
        let vp = ViewportTransform::new(100.0, 50.0, 2.0);
        let mut c = InteractionController::default();

        let empty = InputEvent::DoubleClick { x: 300.0, y: 250.0 };
        let actions = c.handle(&empty, &ctx(&g, &vp, None)).unwrap();
        assert_eq!(actions.as_slice(), &[EditorAction::AddNodeAt(Point::new(100.0, 100.0))]);

        let actions = c.handle(&empty, &ctx(&g, &vp, Some(EntityId(3)))).unwrap();
        assert_eq!(
            actions.as_slice(),
            &[EditorAction::RequestEdit(Selection::Connection(EntityId(3)))]
        );
    }

    #[test]
    fn secondary_press_behaves_like_double_click() {
        let g = graph_with_selection(None);
        let vp = ViewportTransform::IDENTITY;
        let mut c = InteractionController::default();
        let press = InputEvent::PointerDown {
            x: 20.0,
            y: 20.0,
            button: PointerButton::Secondary,
            modifiers: Modifiers::NONE,
        };
        let actions = c.handle(&press, &ctx(&g, &vp, Some(EntityId(1)))).unwrap();
        assert_eq!(
            actions.as_slice(),
            &[EditorAction::RequestEdit(Selection::Node(EntityId(1)))]
        );
        assert!(!c.is_active());
    }

    #[test]
    fn wheel_zooms_about_cursor() {
        let g = graph_with_selection(None);
        let vp = ViewportTransform::IDENTITY;
        let mut c = InteractionController::default();
        let wheel = InputEvent::Wheel {
            x: 400.0,
            y: 300.0,
            delta_y: -100.0,
        };
        let actions = c.handle(&wheel, &ctx(&g, &vp, None)).unwrap();
        match actions.as_slice() {
            [EditorAction::Zoom { pivot, delta }] => {
                assert_eq!(*pivot, Point::new(400.0, 300.0));
                assert!((delta - 0.1).abs() < 1e-12);
            }
            other => panic!("expected Zoom, got {other:?}"),
        }
    }

    #[test]
    fn keyboard_shortcuts() {
        let g = graph_with_selection(Some(EntityId(2)));
        let vp = ViewportTransform::IDENTITY;
        let mut c = InteractionController::default();
        let cx = ctx(&g, &vp, None);

        let run = |c: &mut InteractionController, key: &str, m: Modifiers| {
            c.handle(&InputEvent::key(key, m), &cx).map(|a| a.into_vec())
        };
        assert_eq!(run(&mut c, "Delete", Modifiers::NONE), Some(vec![EditorAction::DeleteSelected]));
        assert_eq!(
            run(&mut c, "=", CTRL),
            Some(vec![EditorAction::Zoom {
                pivot: Point::new(400.0, 300.0),
                delta: 0.1
            }])
        );
        assert_eq!(
            run(&mut c, "-", CTRL),
            Some(vec![EditorAction::Zoom {
                pivot: Point::new(400.0, 300.0),
                delta: -0.1
            }])
        );
        assert_eq!(run(&mut c, "0", CTRL), Some(vec![EditorAction::ResetView]));
        assert_eq!(run(&mut c, "q", Modifiers::NONE), None);
    }

    #[test]
    fn custom_bindings() {
        let config = EditorConfig {
            move_modifier: crate::config::ModifierKey::Alt,
            connection_direction: Direction::Both,
            connection_dashed: true,
            ..EditorConfig::default()
        };
        let g = graph_with_selection(Some(EntityId(1)));
        let vp = ViewportTransform::IDENTITY;
        let mut c = InteractionController::new(config);
        c.handle(&down(0.0, 0.0), &ctx(&g, &vp, Some(EntityId(1))));

        let alt = Modifiers::new(false, false, true, false);
        let actions = c.handle(&InputEvent::pointer_move(2.0, 0.0, alt), &ctx(&g, &vp, None)).unwrap();
        assert!(matches!(actions.as_slice(), [EditorAction::MoveNode { .. }]));

        c.handle(&InputEvent::pointer_move(4.0, 0.0, SHIFT), &ctx(&g, &vp, None));
        let preview = c.temporary().unwrap();
        assert_eq!((preview.direction, preview.dashed), (Direction::Both, true));
    }

    #[test]
    fn cancel_reports_activity() {
        let g = graph_with_selection(None);
        let vp = ViewportTransform::IDENTITY;
        let mut c = InteractionController::default();
        assert!(!c.cancel());
        c.handle(&down(0.0, 0.0), &ctx(&g, &vp, None));
        assert!(c.cancel());
        assert!(!c.is_active());
    }
}

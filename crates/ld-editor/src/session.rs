//! Editor session: the single owner of diagram, pick buffer, scene and
//! gesture state.
//!
//! Every handled event is applied and redrawn before `handle` returns, so
//! the pick buffer always matches what is on screen when the next event
//! arrives.

use kurbo::Point;
use ld_core::{
    ConnectionEdit, Diagram, Direction, EntityId, NodeEdit, Selection, SnapshotError,
    TemporaryConnection,
};
use ld_render::{Frame, NullSurface, PickBuffer, Surface, Theme, VelloSurface, draw_frame};
use time::OffsetDateTime;
use vello::Scene;

use crate::config::EditorConfig;
use crate::gesture::{EditorAction, GestureContext, InteractionController};
use crate::input::InputEvent;

/// Outcome of one input event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Response {
    /// The frame was redrawn.
    pub redraw: bool,
    /// The user asked to edit this entity's label or style.
    pub edit: Option<Selection>,
}

pub struct Session {
    diagram: Diagram,
    pick: PickBuffer,
    /// `None` when the host paints through [`Session::render_into`].
    scene: Option<Scene>,
    controller: InteractionController,
    theme: Theme,
    width: f64,
    height: f64,
}

fn pixels(len: f64) -> u32 {
    if len.is_finite() && len > 0.0 {
        len.round() as u32
    } else {
        0
    }
}

impl Session {
    /// A session that keeps a Vello scene of the current frame.
    pub fn new(width: f64, height: f64, config: EditorConfig) -> Self {
        Self::build(width, height, config, Some(Scene::new()))
    }

    /// A session without a Vello scene. Each redraw only rebuilds the pick
    /// buffer; the host paints with [`render_into`](Self::render_into).
    pub fn without_scene(width: f64, height: f64, config: EditorConfig) -> Self {
        Self::build(width, height, config, None)
    }

    fn build(width: f64, height: f64, config: EditorConfig, scene: Option<Scene>) -> Self {
        let theme = config.theme();
        let mut session = Self {
            diagram: Diagram::new(),
            pick: PickBuffer::new(pixels(width), pixels(height)),
            scene,
            controller: InteractionController::new(config),
            theme,
            width,
            height,
        };
        session.redraw();
        session
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn config(&self) -> &EditorConfig {
        self.controller.config()
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn temporary(&self) -> Option<&TemporaryConnection> {
        self.controller.temporary()
    }

    /// The Vello scene for the last frame, if this session keeps one. The
    /// host presents it.
    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn pick_buffer(&self) -> &PickBuffer {
        &self.pick
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// The entity drawn at a screen position in the current frame.
    pub fn element_at(&self, screen: Point) -> Option<EntityId> {
        self.pick.pick(screen)
    }

    // ─── Input ───────────────────────────────────────────────────────────

    pub fn handle(&mut self, event: &InputEvent) -> Response {
        let hit = match event {
            InputEvent::PointerDown { .. }
            | InputEvent::PointerUp { .. }
            | InputEvent::DoubleClick { .. } => event.position().and_then(|p| self.pick.pick(p)),
            _ => None,
        };
        let ctx = GestureContext {
            graph: &self.diagram.graph,
            viewport: &self.diagram.viewport,
            hit,
            center: Point::new(self.width / 2.0, self.height / 2.0),
        };
        let Some(actions) = self.controller.handle(event, &ctx) else {
            return Response::default();
        };

        let mut response = Response {
            redraw: true,
            edit: None,
        };
        for action in actions {
            if let Some(target) = self.apply(action) {
                response.edit = Some(target);
            }
        }
        self.redraw();
        response
    }

    /// Apply one action to the diagram. Returns the edit target for
    /// [`EditorAction::RequestEdit`]. Does not redraw.
    pub fn apply(&mut self, action: EditorAction) -> Option<Selection> {
        log::trace!("apply {action:?}");
        let graph = &mut self.diagram.graph;
        let viewport = &mut self.diagram.viewport;
        match action {
            EditorAction::Select(id) => {
                graph.set_selection(id);
            }
            EditorAction::Pan(delta) => viewport.pan(delta),
            EditorAction::MoveNode { node, delta } => {
                graph.move_node(node, delta);
            }
            EditorAction::Connect {
                from,
                to,
                direction,
                dashed,
            } => {
                graph.add_connection(from, to, direction, dashed, "");
            }
            EditorAction::AddNodeAt(center) => {
                let config = self.controller.config();
                let (w, h) = (config.node_width, config.node_height);
                graph.add_node(
                    center.x - w / 2.0,
                    center.y - h / 2.0,
                    w,
                    h,
                    config.node_color.clone(),
                    config.node_label.clone(),
                );
            }
            EditorAction::RequestEdit(target) => return Some(target),
            EditorAction::Zoom { pivot, delta } => viewport.zoom(pivot, delta),
            EditorAction::ResetView => viewport.reset(),
            EditorAction::DeleteSelected => {
                graph.delete_selected();
            }
        }
        None
    }

    /// Drop any gesture in progress (e.g. pointer capture lost).
    pub fn cancel_gesture(&mut self) -> bool {
        let cancelled = self.controller.cancel();
        if cancelled {
            self.redraw();
        }
        cancelled
    }

    // ─── Direct edits from host UI ───────────────────────────────────────

    pub fn add_node(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: &str,
        label: &str,
    ) -> Option<EntityId> {
        let id = self
            .diagram
            .graph
            .add_node(x, y, width, height, color, label)?
            .id;
        self.redraw();
        Some(id)
    }

    pub fn add_connection(
        &mut self,
        from: EntityId,
        to: EntityId,
        direction: Direction,
        dashed: bool,
        label: &str,
    ) -> Option<EntityId> {
        let id = self
            .diagram
            .graph
            .add_connection(from, to, direction, dashed, label)?
            .id;
        self.redraw();
        Some(id)
    }

    pub fn update_node(&mut self, id: EntityId, edit: NodeEdit) -> bool {
        let changed = self.diagram.graph.update_node(id, edit);
        if changed {
            self.redraw();
        }
        changed
    }

    pub fn update_connection(&mut self, id: EntityId, edit: ConnectionEdit) -> bool {
        let changed = self.diagram.graph.update_connection(id, edit);
        if changed {
            self.redraw();
        }
        changed
    }

    pub fn select(&mut self, id: Option<EntityId>) -> Option<Selection> {
        let selection = self.diagram.graph.set_selection(id);
        self.redraw();
        selection
    }

    /// Empty the diagram and reset the view.
    pub fn clear(&mut self) {
        self.controller.cancel();
        self.diagram.clear();
        self.redraw();
    }

    // ─── Snapshots ───────────────────────────────────────────────────────

    pub fn export_json(&self, timestamp: OffsetDateTime) -> Result<String, SnapshotError> {
        self.diagram.export_json(timestamp)
    }

    /// Replace the diagram from snapshot text. On error nothing changes.
    pub fn import_json(&mut self, text: &str) -> Result<(), SnapshotError> {
        self.diagram.import_json(text)?;
        self.controller.cancel();
        self.redraw();
        Ok(())
    }

    // ─── Surface ─────────────────────────────────────────────────────────

    /// Match the canvas size. The pick buffer follows.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.pick.resize(pixels(width), pixels(height));
        self.redraw();
    }

    pub fn set_dark_mode(&mut self, dark: bool) {
        self.controller.config_mut().dark_mode = dark;
        self.theme = self.controller.config().theme();
        self.redraw();
    }

    /// Rebuild the Vello scene, if any, and the pick buffer.
    pub fn redraw(&mut self) {
        match self.scene.take() {
            Some(mut scene) => {
                self.render_into(&mut VelloSurface::new(&mut scene));
                self.scene = Some(scene);
            }
            None => self.render_into(&mut NullSurface),
        }
    }

    /// Draw the current frame on any surface. The pick buffer is rebuilt
    /// in the same pass.
    pub fn render_into<S: Surface>(&mut self, surface: &mut S) {
        let frame = Frame::new(
            &self.diagram.graph,
            &self.diagram.viewport,
            self.width,
            self.height,
            &self.theme,
        )
        .with_temporary(self.controller.temporary())
        .with_grid_cell(self.controller.config().grid_cell);
        draw_frame(surface, &mut self.pick, &frame);
    }
}

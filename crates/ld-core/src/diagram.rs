//! The editable document: graph plus the viewport it is shown through.

use crate::error::SnapshotError;
use crate::graph::GraphModel;
use crate::snapshot::{self, SnapshotDocument};
use crate::viewport::ViewportTransform;
use time::OffsetDateTime;

/// Graph and viewport, replaced together on import and reset together on
/// clear.
#[derive(Debug, Clone, Default)]
pub struct Diagram {
    pub graph: GraphModel,
    pub viewport: ViewportTransform,
}

impl Diagram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty both collections and reset the viewport to identity.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.viewport.reset();
    }

    pub fn export(&self, timestamp: OffsetDateTime) -> SnapshotDocument {
        snapshot::export(&self.graph, &self.viewport, timestamp)
    }

    pub fn export_json(&self, timestamp: OffsetDateTime) -> Result<String, SnapshotError> {
        snapshot::to_json(&self.export(timestamp))
    }

    /// Replace graph and viewport from snapshot text. On error nothing changes.
    pub fn import_json(&mut self, text: &str) -> Result<(), SnapshotError> {
        let loaded = snapshot::import(text);
        self.install(loaded)
    }

    pub fn import_document(&mut self, doc: &SnapshotDocument) -> Result<(), SnapshotError> {
        let loaded = snapshot::restore(doc);
        self.install(loaded)
    }

    fn install(
        &mut self,
        loaded: Result<(GraphModel, ViewportTransform), SnapshotError>,
    ) -> Result<(), SnapshotError> {
        let (mut graph, viewport) = loaded.inspect_err(|err| {
            log::warn!("snapshot import rejected: {err}");
        })?;
        // Keep ids unique for the life of the process across imports.
        graph.reserve_ids_from(self.graph.next_id().get());
        self.graph = graph;
        self.viewport = viewport;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::EntityId;
    use crate::model::Direction;
    use kurbo::{Point, Vec2};
    use time::macros::datetime;

    #[test]
    fn clear_resets_viewport() {
        let mut d = Diagram::new();
        d.graph.add_node(0.0, 0.0, 10.0, 10.0, "red", "");
        d.viewport.pan(Vec2::new(30.0, 40.0));
        d.viewport.zoom(Point::new(0.0, 0.0), 0.5);
        d.clear();
        assert!(d.graph.is_empty());
        assert_eq!(d.viewport, ViewportTransform::IDENTITY);
    }

    #[test]
    fn failed_import_keeps_state() {
        let mut d = Diagram::new();
        let a = d.graph.add_node(0.0, 0.0, 10.0, 10.0, "red", "A").unwrap().id;
        let b = d.graph.add_node(20.0, 0.0, 10.0, 10.0, "red", "B").unwrap().id;
        d.graph.add_connection(a, b, Direction::AtoB, false, "");
        d.viewport.pan(Vec2::new(3.0, 4.0));

        assert!(d.import_json(r#"{ "version": "2.0.0" }"#).is_err());
        assert!(d.import_json("{").is_err());
        assert_eq!(d.graph.node_count(), 2);
        assert_eq!(d.graph.connection_count(), 1);
        assert_eq!(d.viewport.offset(), Vec2::new(3.0, 4.0));
    }

    #[test]
    fn import_replaces_everything() {
        let mut source = Diagram::new();
        source.graph.add_node(1.0, 2.0, 3.0, 4.0, "red", "only");
        source.viewport.zoom(Point::new(100.0, 100.0), 0.25);
        let text = source.export_json(datetime!(2024-01-01 0:00 UTC)).unwrap();

        let mut d = Diagram::new();
        for _ in 0..5 {
            d.graph.add_node(0.0, 0.0, 1.0, 1.0, "blue", "");
        }
        d.import_json(&text).unwrap();
        assert_eq!(d.graph.node_count(), 1);
        assert_eq!(d.graph.node(EntityId(1)).unwrap().label, "only");
        assert_eq!(d.viewport, source.viewport);
        // Counter continues above every id this process has handed out
        assert_eq!(d.graph.next_id(), EntityId(6));
    }
}

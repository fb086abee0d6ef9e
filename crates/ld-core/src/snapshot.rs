//! Versioned snapshot documents: graph + viewport ↔ JSON.
//!
//! Connections are written with endpoint ids only. On import every id is
//! resolved against the document's own node list before anything is
//! returned, so a failed import never yields a partial graph.

use crate::error::SnapshotError;
use crate::graph::GraphModel;
use crate::id::EntityId;
use crate::model::Direction;
use crate::viewport::ViewportTransform;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Format version written by this codec. Import requires an exact match.
pub const SNAPSHOT_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotDocument {
    pub version: String,
    pub timestamp: String,
    pub viewport_transform: ViewportTransform,
    pub nodes: Vec<NodeRecord>,
    pub connections: Vec<ConnectionRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: EntityId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRecord {
    pub id: EntityId,
    pub from_id: EntityId,
    pub to_id: EntityId,
    pub direction: Direction,
    pub dashed: bool,
    pub label: String,
}

// ─── Export ──────────────────────────────────────────────────────────────

/// Capture the graph and viewport. Entities are written in id order.
pub fn export(
    graph: &GraphModel,
    viewport: &ViewportTransform,
    timestamp: OffsetDateTime,
) -> SnapshotDocument {
    let timestamp = timestamp.format(&Rfc3339).unwrap_or_else(|err| {
        log::warn!("snapshot timestamp not representable as RFC 3339: {err}");
        String::new()
    });

    SnapshotDocument {
        version: SNAPSHOT_VERSION.to_string(),
        timestamp,
        viewport_transform: *viewport,
        nodes: graph
            .nodes()
            .map(|n| NodeRecord {
                id: n.id,
                x: n.x,
                y: n.y,
                width: n.width,
                height: n.height,
                color: n.color.clone(),
                label: n.label.clone(),
            })
            .collect(),
        connections: graph
            .connections()
            .map(|c| ConnectionRecord {
                id: c.id,
                from_id: c.from,
                to_id: c.to,
                direction: c.direction,
                dashed: c.dashed,
                label: c.label.clone(),
            })
            .collect(),
    }
}

pub fn to_json(doc: &SnapshotDocument) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string_pretty(doc)?)
}

// ─── Import ──────────────────────────────────────────────────────────────

/// Parse and validate a snapshot.
///
/// The version gate runs before shape validation, so a document from a
/// different format version reports `VersionMismatch` even if its shape
/// changed too.
pub fn import(text: &str) -> Result<(GraphModel, ViewportTransform), SnapshotError> {
    restore(&from_json(text)?)
}

/// Parse a document without building a graph. Checks the version, then
/// the shape.
pub fn from_json(text: &str) -> Result<SnapshotDocument, SnapshotError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let found = value
        .get("version")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| SnapshotError::MalformedDocument("missing \"version\" string".into()))?;
    check_version(found)?;

    Ok(serde_json::from_value(value)?)
}

fn check_version(found: &str) -> Result<(), SnapshotError> {
    if found == SNAPSHOT_VERSION {
        Ok(())
    } else {
        Err(SnapshotError::VersionMismatch {
            expected: SNAPSHOT_VERSION.to_string(),
            found: found.to_string(),
        })
    }
}

/// Rebuild a graph and viewport from an already-parsed document.
pub fn restore(doc: &SnapshotDocument) -> Result<(GraphModel, ViewportTransform), SnapshotError> {
    check_version(&doc.version)?;

    let viewport = doc.viewport_transform;
    if !viewport.is_valid() {
        return Err(SnapshotError::MalformedDocument(format!(
            "viewport scale {} outside supported range",
            viewport.scale
        )));
    }

    let mut seen = HashSet::new();
    let mut claim = |id: EntityId| {
        if !id.is_encodable() {
            return Err(SnapshotError::MalformedDocument(format!(
                "id {id} exceeds the 24-bit id space"
            )));
        }
        if !seen.insert(id) {
            return Err(SnapshotError::MalformedDocument(format!("duplicate id {id}")));
        }
        Ok(())
    };

    let mut graph = GraphModel::new();
    for n in &doc.nodes {
        claim(n.id)?;
        graph.restore_node(
            n.id,
            n.x,
            n.y,
            n.width,
            n.height,
            n.color.clone(),
            n.label.clone(),
        );
    }

    for c in &doc.connections {
        claim(c.id)?;
        for endpoint in [c.from_id, c.to_id] {
            if graph.node(endpoint).is_none() {
                return Err(SnapshotError::DanglingReference {
                    connection: c.id,
                    node: endpoint,
                });
            }
        }
        if c.from_id == c.to_id {
            return Err(SnapshotError::MalformedDocument(format!(
                "connection {} is a self-loop",
                c.id
            )));
        }
        graph.restore_connection(
            c.id,
            c.from_id,
            c.to_id,
            c.direction,
            c.dashed,
            c.label.clone(),
        );
    }

    log::debug!(
        "restored snapshot: {} nodes, {} connections",
        graph.node_count(),
        graph.connection_count()
    );
    Ok((graph, viewport))
}

// ─── Flat files ──────────────────────────────────────────────────────────

pub fn save_to_path(path: impl AsRef<Path>, doc: &SnapshotDocument) -> Result<(), SnapshotError> {
    std::fs::write(path, to_json(doc)?)?;
    Ok(())
}

pub fn load_from_path(
    path: impl AsRef<Path>,
) -> Result<(GraphModel, ViewportTransform), SnapshotError> {
    let text = std::fs::read_to_string(path)?;
    import(&text)
}

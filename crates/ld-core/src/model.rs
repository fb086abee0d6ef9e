//! Diagram entities: rectangular nodes and directional connections.
//!
//! Positions and sizes are world-space. `selected` and `identity` are
//! transient: they are recomputed on load and never written to snapshots.

use crate::id::{EntityId, IdentityColor};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

// ─── Nodes ───────────────────────────────────────────────────────────────

/// A labeled rectangle. `(x, y)` is the top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: EntityId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: String,
    pub label: String,
    pub selected: bool,
    pub identity: IdentityColor,
}

impl Node {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn center(&self) -> Point {
        self.rect().center()
    }
}

/// Label/style edit coming from the host's node edit affordance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeEdit {
    pub label: Option<String>,
    pub color: Option<String>,
}

// ─── Connections ─────────────────────────────────────────────────────────

/// Which ends of a connection carry an arrowhead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    #[serde(rename = "AtoB")]
    AtoB,
    #[serde(rename = "BtoA")]
    BtoA,
    #[serde(rename = "both")]
    Both,
    #[serde(rename = "none")]
    None,
}

impl Direction {
    /// Arrowhead at the `to` end.
    pub fn head_at_target(self) -> bool {
        matches!(self, Self::AtoB | Self::Both)
    }

    /// Arrowhead at the `from` end.
    pub fn head_at_source(self) -> bool {
        matches!(self, Self::BtoA | Self::Both)
    }

    /// Parse the snapshot spelling (`AtoB`, `BtoA`, `both`, `none`).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "AtoB" => Some(Self::AtoB),
            "BtoA" => Some(Self::BtoA),
            "both" => Some(Self::Both),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}

/// A link between two live nodes, referenced by id.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub id: EntityId,
    pub from: EntityId,
    pub to: EntityId,
    pub direction: Direction,
    pub dashed: bool,
    pub label: String,
    pub selected: bool,
    pub identity: IdentityColor,
}

/// Label/style edit coming from the host's connection edit affordance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionEdit {
    pub label: Option<String>,
    pub direction: Option<Direction>,
    pub dashed: Option<bool>,
}

/// A connection being dragged out of `from`; its far end is a zero-size
/// point at the cursor. Never stored in the model and never pickable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemporaryConnection {
    pub from: EntityId,
    pub cursor: Point,
    pub direction: Direction,
    pub dashed: bool,
}

impl TemporaryConnection {
    /// The synthetic target: a zero-size rectangle under the cursor.
    pub fn target_rect(&self) -> Rect {
        Rect::from_points(self.cursor, self.cursor)
    }
}

// ─── Selection ───────────────────────────────────────────────────────────

/// The single selected entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selection {
    Node(EntityId),
    Connection(EntityId),
}

impl Selection {
    pub fn id(self) -> EntityId {
        match self {
            Self::Node(id) | Self::Connection(id) => id,
        }
    }

    pub fn node(self) -> Option<EntityId> {
        match self {
            Self::Node(id) => Some(id),
            Self::Connection(_) => None,
        }
    }
}

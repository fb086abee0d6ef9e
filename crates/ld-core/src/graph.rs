//! The diagram graph: nodes, connections, and the single selection.
//!
//! Nodes are graph vertices and connections are directed edges of a
//! `StableDiGraph`, so removing a node drops every connection that references
//! it in the same operation. Id lookups go through `BTreeMap` indexes, which
//! also gives iteration in creation (id) order.

use crate::id::{EntityId, IdentityColor};
use crate::model::*;
use kurbo::Vec2;
use petgraph::Direction as EdgeSide;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use std::collections::BTreeMap;

/// Owns every live node and connection.
#[derive(Debug, Clone)]
pub struct GraphModel {
    graph: StableDiGraph<Node, Connection>,
    node_index: BTreeMap<EntityId, NodeIndex>,
    connection_index: BTreeMap<EntityId, EdgeIndex>,
    selection: Option<Selection>,
    /// Next id to hand out. Never rewound, so ids are not reused.
    next_id: u32,
}

impl Default for GraphModel {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphModel {
    pub fn new() -> Self {
        Self {
            graph: StableDiGraph::new(),
            node_index: BTreeMap::new(),
            connection_index: BTreeMap::new(),
            selection: None,
            next_id: 1,
        }
    }

    fn allocate(&mut self) -> Option<(EntityId, IdentityColor)> {
        let id = EntityId(self.next_id);
        let Some(identity) = IdentityColor::from_id(id) else {
            log::warn!("entity id space exhausted at {id}");
            return None;
        };
        self.next_id += 1;
        Some((id, identity))
    }

    /// The id the next created entity will receive.
    pub fn next_id(&self) -> EntityId {
        EntityId(self.next_id)
    }

    /// Raise the id counter so it continues above `floor`.
    pub(crate) fn reserve_ids_from(&mut self, floor: u32) {
        self.next_id = self.next_id.max(floor);
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// Append a node with a fresh id. Selection is untouched.
    pub fn add_node(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: impl Into<String>,
        label: impl Into<String>,
    ) -> Option<&Node> {
        let (id, identity) = self.allocate()?;
        let node = Node {
            id,
            x,
            y,
            width,
            height,
            color: color.into(),
            label: label.into(),
            selected: false,
            identity,
        };
        log::debug!("add node {id} at ({x}, {y})");
        let idx = self.graph.add_node(node);
        self.node_index.insert(id, idx);
        Some(&self.graph[idx])
    }

    /// Connect two live nodes. Unresolved endpoints and self-loops are
    /// ignored and yield `None`.
    pub fn add_connection(
        &mut self,
        from: EntityId,
        to: EntityId,
        direction: Direction,
        dashed: bool,
        label: impl Into<String>,
    ) -> Option<&Connection> {
        let (Some(&a), Some(&b)) = (self.node_index.get(&from), self.node_index.get(&to)) else {
            log::debug!("invalid connection endpoint: {from} -> {to}");
            return None;
        };
        if from == to {
            log::debug!("invalid connection endpoint: self-loop on {from}");
            return None;
        }
        let (id, identity) = self.allocate()?;
        let connection = Connection {
            id,
            from,
            to,
            direction,
            dashed,
            label: label.into(),
            selected: false,
            identity,
        };
        log::debug!("add connection {id}: {from} -> {to}");
        let idx = self.graph.add_edge(a, b, connection);
        self.connection_index.insert(id, idx);
        Some(&self.graph[idx])
    }

    /// Remove a node and every connection that references it.
    pub fn remove_node(&mut self, id: EntityId) -> Option<Node> {
        let idx = self.node_index.remove(&id)?;
        let dependents: Vec<EntityId> = self
            .graph
            .edges_directed(idx, EdgeSide::Outgoing)
            .chain(self.graph.edges_directed(idx, EdgeSide::Incoming))
            .map(|edge| edge.weight().id)
            .collect();
        for cid in &dependents {
            self.connection_index.remove(cid);
        }
        if let Some(sel) = self.selection
            && (sel.id() == id || dependents.contains(&sel.id()))
        {
            self.selection = None;
        }
        log::debug!("remove node {id} (cascade: {dependents:?})");
        self.graph.remove_node(idx)
    }

    pub fn remove_connection(&mut self, id: EntityId) -> Option<Connection> {
        let idx = self.connection_index.remove(&id)?;
        if self.selection == Some(Selection::Connection(id)) {
            self.selection = None;
        }
        log::debug!("remove connection {id}");
        self.graph.remove_edge(idx)
    }

    /// Clear the selection, then select `id` if it names a live entity.
    pub fn set_selection(&mut self, id: Option<EntityId>) -> Option<Selection> {
        if let Some(prev) = self.selection.take() {
            self.set_selected_flag(prev, false);
        }
        if let Some(sel) = id.and_then(|id| self.resolve(id)) {
            self.set_selected_flag(sel, true);
            self.selection = Some(sel);
        }
        self.selection
    }

    fn set_selected_flag(&mut self, sel: Selection, value: bool) {
        match sel {
            Selection::Node(id) => {
                if let Some(&idx) = self.node_index.get(&id) {
                    self.graph[idx].selected = value;
                }
            }
            Selection::Connection(id) => {
                if let Some(&idx) = self.connection_index.get(&id) {
                    self.graph[idx].selected = value;
                }
            }
        }
    }

    /// Remove whichever entity is selected. Returns `false` if nothing was.
    pub fn delete_selected(&mut self) -> bool {
        match self.selection {
            Some(Selection::Node(id)) => self.remove_node(id).is_some(),
            Some(Selection::Connection(id)) => self.remove_connection(id).is_some(),
            None => false,
        }
    }

    /// Translate a node by a world-space delta.
    pub fn move_node(&mut self, id: EntityId, delta: Vec2) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.x += delta.x;
                node.y += delta.y;
                true
            }
            None => false,
        }
    }

    pub fn update_node(&mut self, id: EntityId, edit: NodeEdit) -> bool {
        let Some(node) = self.node_mut(id) else {
            return false;
        };
        if let Some(label) = edit.label {
            node.label = label;
        }
        if let Some(color) = edit.color {
            node.color = color;
        }
        true
    }

    pub fn update_connection(&mut self, id: EntityId, edit: ConnectionEdit) -> bool {
        let Some(&idx) = self.connection_index.get(&id) else {
            return false;
        };
        let connection = &mut self.graph[idx];
        if let Some(label) = edit.label {
            connection.label = label;
        }
        if let Some(direction) = edit.direction {
            connection.direction = direction;
        }
        if let Some(dashed) = edit.dashed {
            connection.dashed = dashed;
        }
        true
    }

    /// Drop every node and connection. The id counter keeps running.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.node_index.clear();
        self.connection_index.clear();
        self.selection = None;
    }

    // ─── Restore (snapshot import) ───────────────────────────────────────

    /// Insert a node under a known id. Fails on duplicates or ids beyond
    /// the identity color space.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn restore_node(
        &mut self,
        id: EntityId,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: String,
        label: String,
    ) -> bool {
        let Some(identity) = IdentityColor::from_id(id) else {
            return false;
        };
        if self.contains(id) {
            return false;
        }
        let idx = self.graph.add_node(Node {
            id,
            x,
            y,
            width,
            height,
            color,
            label,
            selected: false,
            identity,
        });
        self.node_index.insert(id, idx);
        self.reserve_ids_from(id.get() + 1);
        true
    }

    /// Insert a connection under a known id. Endpoints must already exist.
    pub(crate) fn restore_connection(
        &mut self,
        id: EntityId,
        from: EntityId,
        to: EntityId,
        direction: Direction,
        dashed: bool,
        label: String,
    ) -> bool {
        let Some(identity) = IdentityColor::from_id(id) else {
            return false;
        };
        if self.contains(id) {
            return false;
        }
        let (Some(&a), Some(&b)) = (self.node_index.get(&from), self.node_index.get(&to)) else {
            return false;
        };
        let idx = self.graph.add_edge(
            a,
            b,
            Connection {
                id,
                from,
                to,
                direction,
                dashed,
                label,
                selected: false,
                identity,
            },
        );
        self.connection_index.insert(id, idx);
        self.reserve_ids_from(id.get() + 1);
        true
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn node(&self, id: EntityId) -> Option<&Node> {
        self.node_index.get(&id).map(|&idx| &self.graph[idx])
    }

    fn node_mut(&mut self, id: EntityId) -> Option<&mut Node> {
        let idx = *self.node_index.get(&id)?;
        Some(&mut self.graph[idx])
    }

    pub fn connection(&self, id: EntityId) -> Option<&Connection> {
        self.connection_index.get(&id).map(|&idx| &self.graph[idx])
    }

    /// Nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.node_index.values().map(|&idx| &self.graph[idx])
    }

    /// Connections in id order.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connection_index.values().map(|&idx| &self.graph[idx])
    }

    /// Every connection that has `node` as either endpoint.
    pub fn connections_of(&self, node: EntityId) -> Vec<&Connection> {
        let Some(&idx) = self.node_index.get(&node) else {
            return Vec::new();
        };
        let mut out: Vec<&Connection> = self
            .graph
            .edges_directed(idx, EdgeSide::Outgoing)
            .chain(self.graph.edges_directed(idx, EdgeSide::Incoming))
            .map(|edge| edge.weight())
            .collect();
        out.sort_by_key(|c| c.id);
        out
    }

    /// Both endpoint nodes of a connection.
    pub fn endpoints(&self, connection: &Connection) -> Option<(&Node, &Node)> {
        Some((self.node(connection.from)?, self.node(connection.to)?))
    }

    pub fn node_count(&self) -> usize {
        self.node_index.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connection_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_index.is_empty()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.node_index.contains_key(&id) || self.connection_index.contains_key(&id)
    }

    /// Classify an id as a live node or connection.
    pub fn resolve(&self, id: EntityId) -> Option<Selection> {
        if self.node_index.contains_key(&id) {
            Some(Selection::Node(id))
        } else if self.connection_index.contains_key(&id) {
            Some(Selection::Connection(id))
        } else {
            None
        }
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn selected_node(&self) -> Option<&Node> {
        self.selection
            .and_then(Selection::node)
            .and_then(|id| self.node(id))
    }
}

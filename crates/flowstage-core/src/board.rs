//! The authoring session facade: one board owns the graph, the connector,
//! the widget registry, and the undo/redo history, and keeps them
//! consistent across every committed mutation.

use crate::connector::{Connector, ConnectorPhase, Placement};
use crate::error::FlowError;
use crate::graph::{Edge, EdgeId, Node, NodeId, WorkflowGraph};
use crate::grid::{snap_to_grid, GRID_CELL};
use crate::history::History;
use crate::registry::{WidgetDefinition, WidgetRegistry};
use kurbo::{Point, Rect};
use serde_json::{Map, Value};

/// Callbacks fired by the board at its commit boundaries. All methods have
/// no-op defaults; implement only what the embedding app cares about.
pub trait BoardObserver {
    /// A placement committed: the placeholder was swapped for `node`.
    /// Fired after the swap and before the history push.
    fn node_created(
        &mut self,
        node: NodeId,
        widget_type: &str,
        template_name: &str,
        rect: Rect,
        source: Option<NodeId>,
    ) {
        let _ = (node, widget_type, template_name, rect, source);
    }

    /// A session with a live placeholder was cancelled.
    fn node_cancelled(&mut self, placeholder: NodeId) {
        let _ = placeholder;
    }
}

/// Horizontal gap left between a neighbor and a node spawned next to it.
const INSERT_GAP: f64 = 2.0 * GRID_CELL;

/// A workflow board being authored.
pub struct Board {
    graph: WorkflowGraph,
    connector: Connector,
    registry: WidgetRegistry,
    history: History,
    observer: Option<Box<dyn BoardObserver>>,
}

impl Board {
    /// Create an empty board over the given registry. The empty graph is
    /// the history baseline, so undoing the first commit returns to it.
    pub fn new(registry: WidgetRegistry) -> Self {
        let mut history = History::new();
        history.reset(Vec::new(), Vec::new());
        Self {
            graph: WorkflowGraph::new(),
            connector: Connector::new(),
            registry,
            history,
            observer: None,
        }
    }

    /// Attach an observer for creation/cancellation callbacks.
    pub fn with_observer(mut self, observer: Box<dyn BoardObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Install a document wholesale and restart history from it. Any
    /// in-flight session is cancelled first.
    pub fn load(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) -> Result<(), FlowError> {
        let mut incoming = WorkflowGraph::new();
        incoming.restore(nodes, edges);
        incoming.validate()?;
        self.cancel();
        self.graph = incoming;
        let (nodes, edges) = self.graph.snapshot();
        self.history.reset(nodes, edges);
        Ok(())
    }

    pub fn graph(&self) -> &WorkflowGraph {
        &self.graph
    }

    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut WidgetRegistry {
        &mut self.registry
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn phase(&self) -> &ConnectorPhase {
        self.connector.phase()
    }

    fn commit(&mut self) {
        // History records committed state only; a placeholder live during a
        // mid-session mutation is transient and must not be resurrectable
        // via undo. Placeholders never carry edges, so edges are kept as-is.
        let (nodes, edges) = self.graph.snapshot();
        let nodes = nodes.into_iter().filter(|n| !n.is_placeholder()).collect();
        self.history.push(nodes, edges);
    }

    fn swallow(result: Result<(), FlowError>) {
        if let Err(err) = result {
            // Driver bug, not a user mistake; diagnostics only.
            log::debug!("ignored connector call: {err}");
        }
    }

    // --- connector gestures ---------------------------------------------

    /// Start a placement drag from an existing node's output handle.
    pub fn begin_from_handle(&mut self, source: NodeId, source_pos: Point, cursor: Point) {
        if !self.graph.contains(source) {
            log::warn!("begin_from_handle from unknown node {source}");
            return;
        }
        Self::swallow(self.connector.begin_from_handle(source, source_pos, cursor));
    }

    /// Follow the pointer during the positioning drag.
    pub fn track_cursor(&mut self, pos: Point) {
        self.connector.track_cursor(pos);
    }

    /// Drop the placement anchor and create the placeholder.
    pub fn place_at(&mut self, anchor: Point) {
        Self::swallow(self.connector.place_at(anchor, &mut self.graph).map(|_| ()));
    }

    /// Resize the placeholder while the sizing drag is in flight.
    pub fn resize_to(&mut self, width: f64, height: f64) {
        Self::swallow(self.connector.resize_to(width, height, &mut self.graph));
    }

    /// Lock in the placeholder's size.
    pub fn confirm_size(&mut self) {
        Self::swallow(self.connector.confirm_size(&self.graph).map(|_| ()));
    }

    /// Widget definitions that fit the confirmed footprint, for the
    /// template picker. Empty outside the `placed` phase.
    pub fn templates_for_placement(&self) -> Vec<&WidgetDefinition> {
        match self.connector.phase() {
            ConnectorPhase::Placed { footprint, .. } => {
                self.registry.templates_fitting_footprint(*footprint)
            }
            _ => Vec::new(),
        }
    }

    /// Commit the placement with the chosen template. On success the
    /// placeholder is gone, the committed node (and its edge, when the
    /// session had a source) exists, and a history entry is recorded.
    ///
    /// [`FlowError::IncompatibleTemplate`] keeps the session at `placed`
    /// so the picker can re-prompt.
    pub fn pick_template(
        &mut self,
        widget_type: &str,
        template_index: usize,
    ) -> Result<NodeId, FlowError> {
        let placement =
            self.connector
                .pick_template(widget_type, template_index, &mut self.graph, &self.registry)?;
        self.registry.mark_used(widget_type);
        self.notify_created(&placement);
        self.commit();
        Ok(placement.node)
    }

    /// Abort the in-flight session, if any.
    pub fn cancel(&mut self) {
        if let Some(placeholder) = self.connector.cancel(&mut self.graph) {
            if let Some(observer) = self.observer.as_mut() {
                observer.node_cancelled(placeholder);
            }
        }
    }

    fn notify_created(&mut self, placement: &Placement) {
        if let Some(observer) = self.observer.as_mut() {
            observer.node_created(
                placement.node,
                &placement.widget_type,
                &placement.template_name,
                placement.rect,
                placement.source,
            );
        }
    }

    // --- committed mutations outside the connector flow -----------------

    /// Rename a node. Records a history entry.
    pub fn rename_node(&mut self, id: NodeId, name: &str) -> bool {
        let Some(node) = self.graph.node_mut(id) else {
            return false;
        };
        node.data
            .insert("name".to_string(), Value::String(name.to_string()));
        self.commit();
        true
    }

    /// Merge configuration values into a node's data. Records a history
    /// entry when anything was merged.
    pub fn configure_node(&mut self, id: NodeId, patch: Map<String, Value>) -> bool {
        let Some(node) = self.graph.node_mut(id) else {
            return false;
        };
        if patch.is_empty() {
            return false;
        }
        for (key, value) in patch {
            node.data.insert(key, value);
        }
        self.commit();
        true
    }

    /// Move a node, snapping the target position to the grid. Records a
    /// history entry.
    pub fn move_node(&mut self, id: NodeId, position: Point) -> bool {
        let Some(node) = self.graph.node_mut(id) else {
            return false;
        };
        node.position = Point::new(
            snap_to_grid(position.x, GRID_CELL),
            snap_to_grid(position.y, GRID_CELL),
        );
        self.commit();
        true
    }

    /// Delete a committed node and its incident edges. Records a history
    /// entry. A session anchored on the node (its source, or the
    /// placeholder itself) is cancelled first so no dangling reference can
    /// form at commit time.
    pub fn delete_node(&mut self, id: NodeId) -> bool {
        if self.session_involves(id) {
            self.cancel();
        }
        if self.graph.remove_node(id).is_none() {
            return false;
        }
        self.commit();
        true
    }

    fn session_involves(&self, id: NodeId) -> bool {
        match *self.connector.phase() {
            ConnectorPhase::Idle => false,
            ConnectorPhase::Positioning { source, .. } => source == id,
            ConnectorPhase::Sizing {
                placeholder, source, ..
            }
            | ConnectorPhase::Placed {
                placeholder, source, ..
            } => placeholder == id || source == Some(id),
        }
    }

    /// Connect two committed nodes explicitly. Records a history entry.
    pub fn connect(&mut self, source: NodeId, target: NodeId) -> Result<EdgeId, FlowError> {
        let edge = self.graph.add_edge(source, target)?;
        self.commit();
        Ok(edge)
    }

    /// Remove an edge. Records a history entry.
    pub fn disconnect(&mut self, edge: EdgeId) -> bool {
        if self.graph.remove_edge(edge).is_none() {
            return false;
        }
        self.commit();
        true
    }

    /// Spawn a default-sized widget node feeding into `anchor` (new → anchor).
    pub fn insert_before(&mut self, anchor: NodeId, widget_type: &str) -> Result<NodeId, FlowError> {
        self.insert_neighbor(anchor, widget_type, true)
    }

    /// Spawn a default-sized widget node fed by `anchor` (anchor → new).
    pub fn insert_after(&mut self, anchor: NodeId, widget_type: &str) -> Result<NodeId, FlowError> {
        self.insert_neighbor(anchor, widget_type, false)
    }

    fn insert_neighbor(
        &mut self,
        anchor: NodeId,
        widget_type: &str,
        before: bool,
    ) -> Result<NodeId, FlowError> {
        let definition = self
            .registry
            .get(widget_type)
            .ok_or_else(|| FlowError::UnknownWidgetType(widget_type.to_string()))?;
        let size = definition.default_size();
        let default_data = definition
            .templates
            .first()
            .map(|t| t.default_data.clone())
            .unwrap_or_default();

        let Some(anchor_node) = self.graph.node(anchor) else {
            return Err(FlowError::DanglingReference { node: anchor });
        };
        let x = if before {
            anchor_node.position.x - size.width - INSERT_GAP
        } else {
            anchor_node.position.x + anchor_node.size.width + INSERT_GAP
        };
        let position = Point::new(snap_to_grid(x, GRID_CELL), snap_to_grid(anchor_node.position.y, GRID_CELL));

        let mut node = Node::widget(widget_type, position, size);
        node.data = default_data;
        let id = self.graph.add_node(node);
        if before {
            self.graph.add_edge(id, anchor)?;
        } else {
            self.graph.add_edge(anchor, id)?;
        }
        self.registry.mark_used(widget_type);
        self.commit();
        Ok(id)
    }

    // --- undo / redo -----------------------------------------------------

    /// Step the graph back one committed snapshot. Restores committed state
    /// only, never a mid-gesture phase; an in-flight session is cancelled
    /// first so the connector cannot hold an id the restore wiped out.
    pub fn undo(&mut self) -> Result<bool, FlowError> {
        if !self.history.can_undo() {
            return Ok(false);
        }
        self.cancel();
        let Some(entry) = self.history.undo() else {
            return Ok(false);
        };
        let entry = entry.clone();
        self.apply_snapshot(entry.nodes, entry.edges)?;
        Ok(true)
    }

    /// Step the graph forward one committed snapshot.
    pub fn redo(&mut self) -> Result<bool, FlowError> {
        if !self.history.can_redo() {
            return Ok(false);
        }
        self.cancel();
        let Some(entry) = self.history.redo() else {
            return Ok(false);
        };
        let entry = entry.clone();
        self.apply_snapshot(entry.nodes, entry.edges)?;
        Ok(true)
    }

    fn apply_snapshot(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) -> Result<(), FlowError> {
        self.graph.restore(nodes, edges);
        // A snapshot with a dangling edge means corrupted state upstream.
        self.graph.validate()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }
}

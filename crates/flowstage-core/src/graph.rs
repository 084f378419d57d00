//! Node/edge data model and the workflow graph container.

use crate::error::FlowError;
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for a node.
pub type NodeId = Uuid;

/// Unique identifier for an edge.
pub type EdgeId = Uuid;

/// What a node on the canvas is.
///
/// A placeholder exists only while a placement gesture is in flight; every
/// committed node carries the widget type it was created from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "widget", rename_all = "snake_case")]
pub enum NodeKind {
    Placeholder,
    Widget(String),
}

impl NodeKind {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, NodeKind::Placeholder)
    }

    /// The widget type for committed nodes, `None` for placeholders.
    pub fn widget_type(&self) -> Option<&str> {
        match self {
            NodeKind::Placeholder => None,
            NodeKind::Widget(t) => Some(t.as_str()),
        }
    }
}

/// A node on the workflow canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_kind: Option<String>,
    pub position: Point,
    pub size: Size,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl Node {
    /// Create a committed widget node.
    pub fn widget(widget_type: impl Into<String>, position: Point, size: Size) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: NodeKind::Widget(widget_type.into()),
            sub_kind: None,
            position,
            size,
            data: Map::new(),
        }
    }

    /// Create a placeholder node anchored at `anchor` with zero size.
    pub fn placeholder(anchor: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: NodeKind::Placeholder,
            sub_kind: None,
            position: anchor,
            size: Size::ZERO,
            data: Map::new(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.kind.is_placeholder()
    }

    /// The node's rectangle in canvas coordinates.
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }
}

/// A directed edge between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
}

/// The workflow graph: all nodes (keyed by id, with insertion order kept
/// for stable iteration) and the edges between them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowGraph {
    nodes: HashMap<NodeId, Node>,
    order: Vec<NodeId>,
    edges: Vec<Edge>,
}

impl WorkflowGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the graph, returning its id.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        if self.nodes.insert(id, node).is_none() {
            self.order.push(id);
        }
        id
    }

    /// Remove a node and every edge incident to it.
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        let node = self.nodes.remove(&id)?;
        self.order.retain(|&n| n != id);
        self.edges.retain(|e| e.source != id && e.target != id);
        Some(node)
    }

    /// Add an edge between two existing nodes.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId) -> Result<EdgeId, FlowError> {
        for endpoint in [source, target] {
            if !self.nodes.contains_key(&endpoint) {
                return Err(FlowError::DanglingReference { node: endpoint });
            }
        }
        let edge = Edge {
            id: Uuid::new_v4(),
            source,
            target,
        };
        self.edges.push(edge);
        Ok(edge.id)
    }

    /// Remove an edge by id.
    pub fn remove_edge(&mut self, id: EdgeId) -> Option<Edge> {
        let pos = self.edges.iter().position(|e| e.id == id)?;
        Some(self.edges.remove(pos))
    }

    /// Get a node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Get a mutable reference to a node by id.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Check whether a node exists.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// All edges.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edges incident to a node.
    pub fn edges_touching(&self, id: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges
            .iter()
            .filter(move |e| e.source == id || e.target == id)
    }

    /// Number of placeholder nodes currently in the graph.
    pub fn placeholder_count(&self) -> usize {
        self.nodes.values().filter(|n| n.is_placeholder()).count()
    }

    /// The current placeholder, if one exists.
    pub fn find_placeholder(&self) -> Option<&Node> {
        self.nodes.values().find(|n| n.is_placeholder())
    }

    /// Check if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Audit every edge for dangling endpoints.
    pub fn validate(&self) -> Result<(), FlowError> {
        for edge in &self.edges {
            for endpoint in [edge.source, edge.target] {
                if !self.nodes.contains_key(&endpoint) {
                    return Err(FlowError::DanglingReference { node: endpoint });
                }
            }
        }
        Ok(())
    }

    /// Copy out the graph content, nodes in insertion order.
    pub fn snapshot(&self) -> (Vec<Node>, Vec<Edge>) {
        let nodes = self.nodes().cloned().collect();
        (nodes, self.edges.clone())
    }

    /// Replace the graph content wholesale.
    pub fn restore(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
        self.nodes.clear();
        self.order.clear();
        for node in nodes {
            self.add_node(node);
        }
        self.edges = edges;
    }

    /// Serialize the graph to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a graph from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_remove_node() {
        let mut graph = WorkflowGraph::new();
        let node = Node::widget("job", Point::new(10.0, 20.0), Size::new(200.0, 120.0));
        let id = graph.add_node(node);

        assert_eq!(graph.len(), 1);
        assert!(graph.node(id).is_some());

        let removed = graph.remove_node(id);
        assert!(removed.is_some());
        assert!(graph.is_empty());
    }

    #[test]
    fn test_remove_node_drops_incident_edges() {
        let mut graph = WorkflowGraph::new();
        let a = graph.add_node(Node::widget("job", Point::ZERO, Size::new(100.0, 60.0)));
        let b = graph.add_node(Node::widget("agent", Point::new(200.0, 0.0), Size::new(100.0, 60.0)));
        graph.add_edge(a, b).unwrap();

        graph.remove_node(b);
        assert!(graph.edges().is_empty());
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_add_edge_rejects_missing_endpoint() {
        let mut graph = WorkflowGraph::new();
        let a = graph.add_node(Node::widget("job", Point::ZERO, Size::new(100.0, 60.0)));
        let ghost = Uuid::new_v4();

        let err = graph.add_edge(a, ghost).unwrap_err();
        assert_eq!(err, FlowError::DanglingReference { node: ghost });
        assert!(graph.edges().is_empty());
    }

    #[test]
    fn test_placeholder_count() {
        let mut graph = WorkflowGraph::new();
        assert_eq!(graph.placeholder_count(), 0);

        let id = graph.add_node(Node::placeholder(Point::new(50.0, 50.0)));
        assert_eq!(graph.placeholder_count(), 1);
        assert_eq!(graph.find_placeholder().map(|n| n.id), Some(id));

        graph.remove_node(id);
        assert_eq!(graph.placeholder_count(), 0);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut graph = WorkflowGraph::new();
        let a = graph.add_node(Node::widget("job", Point::ZERO, Size::new(100.0, 60.0)));
        let b = graph.add_node(Node::widget("note", Point::ZERO, Size::new(100.0, 60.0)));
        let c = graph.add_node(Node::widget("agent", Point::ZERO, Size::new(100.0, 60.0)));

        let ids: Vec<NodeId> = graph.nodes().map(|n| n.id).collect();
        assert_eq!(ids, vec![a, b, c]);

        graph.remove_node(b);
        let ids: Vec<NodeId> = graph.nodes().map(|n| n.id).collect();
        assert_eq!(ids, vec![a, c]);
    }

    #[test]
    fn test_json_round_trip() {
        let mut graph = WorkflowGraph::new();
        let mut node = Node::widget("job", Point::new(50.0, 50.0), Size::new(140.0, 80.0));
        node.data.insert("name".into(), Value::String("build".into()));
        let a = graph.add_node(node);
        let b = graph.add_node(Node::widget("agent", Point::new(300.0, 50.0), Size::new(220.0, 140.0)));
        graph.add_edge(a, b).unwrap();

        let json = graph.to_json().unwrap();
        let restored = WorkflowGraph::from_json(&json).unwrap();

        assert_eq!(restored.len(), 2);
        assert_eq!(restored.edges().len(), 1);
        assert_eq!(
            restored.node(a).unwrap().data.get("name"),
            Some(&Value::String("build".into()))
        );
        assert!(restored.validate().is_ok());
    }

    #[test]
    fn test_validate_detects_dangling_edge() {
        let mut graph = WorkflowGraph::new();
        let a = graph.add_node(Node::widget("job", Point::ZERO, Size::new(100.0, 60.0)));
        let b = graph.add_node(Node::widget("agent", Point::ZERO, Size::new(100.0, 60.0)));
        graph.add_edge(a, b).unwrap();

        // Corrupt the graph through restore with a missing endpoint.
        let (nodes, edges) = graph.snapshot();
        let kept: Vec<Node> = nodes.into_iter().filter(|n| n.id != b).collect();
        graph.restore(kept, edges);

        assert_eq!(
            graph.validate(),
            Err(FlowError::DanglingReference { node: b })
        );
    }
}

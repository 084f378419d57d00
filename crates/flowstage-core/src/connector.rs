//! Connector state machine: turns pointer gestures into a committed node.
//!
//! One session at a time walks `idle → positioning → sizing → placed → idle`
//! (or skips `positioning` when placement starts from an empty-canvas click),
//! with cancellation from any non-idle phase. Invalid transitions never
//! corrupt state; they report [`FlowError::InvalidTransition`] and leave the
//! phase untouched.

use crate::error::FlowError;
use crate::graph::{EdgeId, Node, NodeId, NodeKind, WorkflowGraph};
use crate::grid::{grid_cells_for, Footprint, GRID_CELL};
use crate::registry::WidgetRegistry;
use kurbo::{Point, Rect};

/// The phase of the current authoring session. Exactly one instance exists.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ConnectorPhase {
    /// No authoring in progress.
    #[default]
    Idle,
    /// A drag originated from an existing node's output handle; nothing has
    /// been created yet.
    Positioning {
        source: NodeId,
        source_pos: Point,
        cursor: Point,
    },
    /// A placeholder node exists at `anchor`; dragging defines its size.
    Sizing {
        placeholder: NodeId,
        source: Option<NodeId>,
        anchor: Point,
    },
    /// Size is confirmed; awaiting template selection.
    Placed {
        placeholder: NodeId,
        source: Option<NodeId>,
        anchor: Point,
        footprint: Footprint,
    },
}

impl ConnectorPhase {
    /// Phase name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            ConnectorPhase::Idle => "idle",
            ConnectorPhase::Positioning { .. } => "positioning",
            ConnectorPhase::Sizing { .. } => "sizing",
            ConnectorPhase::Placed { .. } => "placed",
        }
    }
}

/// The outcome of a successful template pick.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub node: NodeId,
    pub edge: Option<EdgeId>,
    pub widget_type: String,
    pub template_name: String,
    pub rect: Rect,
    pub source: Option<NodeId>,
}

/// Drives the placement gesture protocol over a workflow graph.
#[derive(Debug, Clone, Default)]
pub struct Connector {
    phase: ConnectorPhase,
}

impl Connector {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current phase.
    pub fn phase(&self) -> &ConnectorPhase {
        &self.phase
    }

    /// Whether a session is in flight.
    pub fn is_active(&self) -> bool {
        self.phase != ConnectorPhase::Idle
    }

    fn invalid(&self, op: &'static str) -> FlowError {
        FlowError::InvalidTransition {
            op,
            phase: self.phase.name(),
        }
    }

    /// Start a session from an existing node's output handle. Valid only
    /// from `idle`; a second gesture cannot interrupt an in-flight one.
    pub fn begin_from_handle(
        &mut self,
        source: NodeId,
        source_pos: Point,
        cursor: Point,
    ) -> Result<(), FlowError> {
        if self.phase != ConnectorPhase::Idle {
            return Err(self.invalid("begin_from_handle"));
        }
        self.phase = ConnectorPhase::Positioning {
            source,
            source_pos,
            cursor,
        };
        Ok(())
    }

    /// Follow the pointer while positioning. Continuous, not a transition;
    /// silently ignored in any other phase.
    pub fn track_cursor(&mut self, pos: Point) {
        if let ConnectorPhase::Positioning { cursor, .. } = &mut self.phase {
            *cursor = pos;
        }
    }

    /// Drop an anchor and create the placeholder. Valid from `positioning`
    /// (consuming the source) or straight from `idle` (free placement with
    /// no source). Returns the placeholder id.
    pub fn place_at(
        &mut self,
        anchor: Point,
        graph: &mut WorkflowGraph,
    ) -> Result<NodeId, FlowError> {
        let source = match &self.phase {
            ConnectorPhase::Idle => None,
            ConnectorPhase::Positioning { source, .. } => Some(*source),
            _ => return Err(self.invalid("place_at")),
        };
        let placeholder = graph.add_node(Node::placeholder(anchor));
        self.phase = ConnectorPhase::Sizing {
            placeholder,
            source,
            anchor,
        };
        Ok(placeholder)
    }

    /// Update the placeholder's size on pointer move. Continuous while
    /// `sizing`; last write wins. Negative inputs clamp to zero.
    pub fn resize_to(
        &mut self,
        width: f64,
        height: f64,
        graph: &mut WorkflowGraph,
    ) -> Result<(), FlowError> {
        let ConnectorPhase::Sizing { placeholder, .. } = &self.phase else {
            return Err(self.invalid("resize_to"));
        };
        if let Some(node) = graph.node_mut(*placeholder) {
            node.size = kurbo::Size::new(width.max(0.0), height.max(0.0));
        }
        Ok(())
    }

    /// Lock in the current size, quantizing it to a grid footprint.
    pub fn confirm_size(&mut self, graph: &WorkflowGraph) -> Result<Footprint, FlowError> {
        let ConnectorPhase::Sizing {
            placeholder,
            source,
            anchor,
        } = self.phase
        else {
            return Err(self.invalid("confirm_size"));
        };
        let size = graph
            .node(placeholder)
            .map(|n| n.size)
            .unwrap_or_default();
        let footprint = grid_cells_for(size.width, size.height, GRID_CELL);
        self.phase = ConnectorPhase::Placed {
            placeholder,
            source,
            anchor,
            footprint,
        };
        Ok(footprint)
    }

    /// Commit: swap the placeholder for a real node built from the chosen
    /// template, wiring an edge iff the session has a source.
    ///
    /// The footprint is re-validated even though the picker should only have
    /// offered fitting widgets; a stale panel may race a resize. On any
    /// rejection the phase stays `placed` and the graph is untouched.
    pub fn pick_template(
        &mut self,
        widget_type: &str,
        template_index: usize,
        graph: &mut WorkflowGraph,
        registry: &WidgetRegistry,
    ) -> Result<Placement, FlowError> {
        let ConnectorPhase::Placed {
            placeholder,
            source,
            anchor,
            footprint,
        } = self.phase
        else {
            return Err(self.invalid("pick_template"));
        };

        let definition = registry
            .get(widget_type)
            .ok_or_else(|| FlowError::UnknownWidgetType(widget_type.to_string()))?;
        let required = definition.min_footprint();
        if !required.fits_within(footprint) {
            return Err(FlowError::IncompatibleTemplate {
                widget_type: widget_type.to_string(),
                required,
                available: footprint,
            });
        }
        let template = definition.templates.get(template_index).ok_or_else(|| {
            FlowError::UnknownTemplate {
                widget_type: widget_type.to_string(),
                index: template_index,
            }
        })?;
        if let Some(source) = source {
            if !graph.contains(source) {
                return Err(FlowError::DanglingReference { node: source });
            }
        }

        // Template data is deep-copied; committed nodes never alias the
        // registry's definitions.
        let template_name = template.name.clone();
        let data = template.default_data.clone();

        let size = graph
            .remove_node(placeholder)
            .map(|n| n.size)
            .unwrap_or_else(|| definition.default_size());
        let node = Node {
            id: uuid::Uuid::new_v4(),
            kind: NodeKind::Widget(widget_type.to_string()),
            sub_kind: None,
            position: anchor,
            size,
            data,
        };
        let node_id = graph.add_node(node);

        let edge = match source {
            Some(source) => Some(graph.add_edge(source, node_id)?),
            None => None,
        };

        self.phase = ConnectorPhase::Idle;
        Ok(Placement {
            node: node_id,
            edge,
            widget_type: widget_type.to_string(),
            template_name,
            rect: Rect::from_origin_size(anchor, size),
            source,
        })
    }

    /// Abort the session, deleting any placeholder. Idempotent: cancelling
    /// from `idle` does nothing. Returns the removed placeholder's id.
    pub fn cancel(&mut self, graph: &mut WorkflowGraph) -> Option<NodeId> {
        let removed = match self.phase {
            ConnectorPhase::Idle => None,
            ConnectorPhase::Positioning { .. } => None,
            ConnectorPhase::Sizing { placeholder, .. }
            | ConnectorPhase::Placed { placeholder, .. } => {
                graph.remove_node(placeholder).map(|n| n.id)
            }
        };
        self.phase = ConnectorPhase::Idle;
        removed
    }
}

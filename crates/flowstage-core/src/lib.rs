//! Flowstage Core Library
//!
//! Platform-agnostic authoring state for the Flowstage workflow canvas:
//! the node/edge graph, the connector state machine that turns pointer
//! gestures into committed nodes, the grid-based widget sizing registry,
//! and the undo/redo history over committed graph snapshots.

pub mod board;
pub mod connector;
pub mod error;
pub mod graph;
pub mod grid;
pub mod history;
pub mod registry;

pub use board::{Board, BoardObserver};
pub use connector::{Connector, ConnectorPhase, Placement};
pub use error::FlowError;
pub use graph::{Edge, EdgeId, Node, NodeId, NodeKind, WorkflowGraph};
pub use grid::{grid_cells_for, snap_to_grid, Footprint, GRID_CELL, MIN_GRID};
pub use history::{History, HistoryEntry, MAX_HISTORY};
pub use registry::{WidgetDefinition, WidgetRegistry, WidgetTemplate, RECENT_CAPACITY};

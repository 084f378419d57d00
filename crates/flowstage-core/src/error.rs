//! Error taxonomy for the authoring core.

use crate::graph::NodeId;
use crate::grid::Footprint;
use thiserror::Error;

/// Errors produced by the authoring core.
///
/// Only [`FlowError::IncompatibleTemplate`] is expected to reach a user;
/// invalid transitions indicate a driver bug and are swallowed (logged) by
/// the board, and a dangling reference is a fatal consistency violation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlowError {
    /// An operation was attempted from a connector phase that does not
    /// allow it. Policy: no-op, diagnostics only.
    #[error("{op} is not valid while the connector is {phase}")]
    InvalidTransition {
        op: &'static str,
        phase: &'static str,
    },

    /// A template was picked whose minimum footprint exceeds the confirmed
    /// grid size. Recoverable: the phase stays at `placed` and the picker
    /// must re-prompt.
    #[error("widget '{widget_type}' needs a {required} footprint but only {available} is available")]
    IncompatibleTemplate {
        widget_type: String,
        required: Footprint,
        available: Footprint,
    },

    /// Lookup miss in the widget registry. Callers degrade to a fallback
    /// rendering instead of crashing.
    #[error("unknown widget type '{0}'")]
    UnknownWidgetType(String),

    /// A known widget type was picked with a template index it does not have.
    #[error("widget '{widget_type}' has no template at index {index}")]
    UnknownTemplate { widget_type: String, index: usize },

    /// An edge refers to a node that does not exist. Never expected while
    /// the core's invariants hold; fatal if detected during restore.
    #[error("edge references missing node {node}")]
    DanglingReference { node: NodeId },
}

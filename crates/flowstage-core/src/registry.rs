//! Widget sizing registry: which widget types exist, how big they are, and
//! which ones fit a given drop footprint.

use crate::grid::{grid_cells_for, Footprint, GRID_CELL};
use kurbo::Size;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{HashMap, VecDeque};

/// Capacity of the recently-used ring.
pub const RECENT_CAPACITY: usize = 8;

/// A named template supplying the initial `data` for a new node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetTemplate {
    pub name: String,
    #[serde(default)]
    pub default_data: Map<String, Value>,
}

impl WidgetTemplate {
    pub fn new(name: impl Into<String>, default_data: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            default_data,
        }
    }
}

/// Immutable description of a widget type: its size constraints and the
/// templates it can be created from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetDefinition {
    pub widget_type: String,
    pub min_width: f64,
    pub min_height: f64,
    pub default_width: f64,
    pub default_height: f64,
    pub templates: Vec<WidgetTemplate>,
}

impl WidgetDefinition {
    /// The widget's minimum footprint on the grid.
    pub fn min_footprint(&self) -> Footprint {
        grid_cells_for(self.min_width, self.min_height, GRID_CELL)
    }

    /// The size a node of this type gets when created without a sizing drag.
    pub fn default_size(&self) -> Size {
        Size::new(self.default_width, self.default_height)
    }
}

/// Registry of widget definitions plus a bounded recently-used ring.
///
/// Explicitly constructed and injected rather than process-global, so the
/// recently-used side effect is resettable between sessions and tests.
#[derive(Debug, Clone, Default)]
pub struct WidgetRegistry {
    definitions: HashMap<String, WidgetDefinition>,
    order: Vec<String>,
    recent: VecDeque<String>,
}

impl WidgetRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry from a list of definitions.
    pub fn from_definitions(definitions: Vec<WidgetDefinition>) -> Self {
        let mut registry = Self::new();
        for def in definitions {
            registry.register(def);
        }
        registry
    }

    /// The built-in widget set of the workflow canvas.
    pub fn builtin() -> Self {
        use serde_json::json;

        fn obj(value: Value) -> Map<String, Value> {
            value.as_object().cloned().unwrap_or_default()
        }

        Self::from_definitions(vec![
            WidgetDefinition {
                widget_type: "job".into(),
                min_width: 120.0,
                min_height: 80.0,
                default_width: 200.0,
                default_height: 120.0,
                templates: vec![
                    WidgetTemplate::new("Shell Job", obj(json!({"name": "New job", "command": ""}))),
                    WidgetTemplate::new("Manual Step", obj(json!({"name": "Manual step", "manual": true}))),
                ],
            },
            WidgetDefinition {
                widget_type: "agent".into(),
                min_width: 140.0,
                min_height: 100.0,
                default_width: 220.0,
                default_height: 140.0,
                templates: vec![
                    WidgetTemplate::new("Assistant", obj(json!({"name": "Assistant", "prompt": ""}))),
                    WidgetTemplate::new("Researcher", obj(json!({"name": "Researcher", "prompt": ""}))),
                ],
            },
            WidgetDefinition {
                widget_type: "note".into(),
                min_width: 60.0,
                min_height: 60.0,
                default_width: 160.0,
                default_height: 100.0,
                templates: vec![WidgetTemplate::new("Blank Note", obj(json!({"text": ""})))],
            },
        ])
    }

    /// Register (or replace) a definition. Registration order is kept for
    /// stable listing.
    pub fn register(&mut self, definition: WidgetDefinition) {
        let key = definition.widget_type.clone();
        if self.definitions.insert(key.clone(), definition).is_none() {
            self.order.push(key);
        }
    }

    /// Look up a definition. A miss is a soft failure; callers fall back to
    /// default rendering.
    pub fn get(&self, widget_type: &str) -> Option<&WidgetDefinition> {
        self.definitions.get(widget_type)
    }

    /// All definitions, in registration order.
    pub fn definitions(&self) -> impl Iterator<Item = &WidgetDefinition> {
        self.order.iter().filter_map(|k| self.definitions.get(k))
    }

    /// Definitions whose minimum footprint fits inside `footprint`.
    pub fn templates_fitting_footprint(&self, footprint: Footprint) -> Vec<&WidgetDefinition> {
        self.definitions()
            .filter(|def| def.min_footprint().fits_within(footprint))
            .collect()
    }

    /// Definitions whose minimum pixel size fits inside `width` x `height`,
    /// without grid quantization.
    pub fn templates_fitting_pixel_size(&self, width: f64, height: f64) -> Vec<&WidgetDefinition> {
        self.definitions()
            .filter(|def| def.min_width <= width && def.min_height <= height)
            .collect()
    }

    /// Record a widget type as just used. Unknown types are ignored.
    pub fn mark_used(&mut self, widget_type: &str) {
        if !self.definitions.contains_key(widget_type) {
            return;
        }
        self.recent.retain(|t| t != widget_type);
        self.recent.push_front(widget_type.to_string());
        self.recent.truncate(RECENT_CAPACITY);
    }

    /// Recently used definitions, most recent first.
    pub fn recently_used(&self) -> Vec<&WidgetDefinition> {
        self.recent
            .iter()
            .filter_map(|t| self.definitions.get(t))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::MIN_GRID;

    fn plain(widget_type: &str, min_width: f64, min_height: f64) -> WidgetDefinition {
        WidgetDefinition {
            widget_type: widget_type.into(),
            min_width,
            min_height,
            default_width: min_width,
            default_height: min_height,
            templates: vec![WidgetTemplate::new("Default", Map::new())],
        }
    }

    #[test]
    fn test_get_soft_failure() {
        let registry = WidgetRegistry::builtin();
        assert!(registry.get("job").is_some());
        assert!(registry.get("does-not-exist").is_none());
    }

    #[test]
    fn test_fitting_footprint() {
        let registry = WidgetRegistry::from_definitions(vec![
            plain("small", 60.0, 60.0),   // 3x3
            plain("wide", 140.0, 80.0),   // 7x4
            plain("group", 200.0, 160.0), // 10x8
        ]);

        let fits = registry.templates_fitting_footprint(Footprint::new(MIN_GRID, MIN_GRID));
        let types: Vec<&str> = fits.iter().map(|d| d.widget_type.as_str()).collect();
        assert_eq!(types, vec!["small"]);

        let fits = registry.templates_fitting_footprint(Footprint::new(7, 4));
        let types: Vec<&str> = fits.iter().map(|d| d.widget_type.as_str()).collect();
        assert_eq!(types, vec!["small", "wide"]);

        let fits = registry.templates_fitting_footprint(Footprint::new(10, 8));
        assert_eq!(fits.len(), 3);
    }

    #[test]
    fn test_fitting_pixel_size() {
        let registry = WidgetRegistry::from_definitions(vec![
            plain("small", 60.0, 60.0),
            plain("wide", 140.0, 80.0),
        ]);

        let fits = registry.templates_fitting_pixel_size(100.0, 100.0);
        let types: Vec<&str> = fits.iter().map(|d| d.widget_type.as_str()).collect();
        assert_eq!(types, vec!["small"]);

        // No grid floor here: exact pixel comparison.
        let fits = registry.templates_fitting_pixel_size(59.0, 59.0);
        assert!(fits.is_empty());
    }

    #[test]
    fn test_recently_used_dedup_and_order() {
        let mut registry = WidgetRegistry::builtin();
        registry.mark_used("job");
        registry.mark_used("agent");
        registry.mark_used("job");

        let types: Vec<&str> = registry
            .recently_used()
            .iter()
            .map(|d| d.widget_type.as_str())
            .collect();
        assert_eq!(types, vec!["job", "agent"]);
    }

    #[test]
    fn test_recently_used_bounded() {
        let defs: Vec<WidgetDefinition> = (0..12)
            .map(|i| plain(&format!("w{i}"), 60.0, 60.0))
            .collect();
        let mut registry = WidgetRegistry::from_definitions(defs);

        for i in 0..12 {
            registry.mark_used(&format!("w{i}"));
        }

        let recent = registry.recently_used();
        assert_eq!(recent.len(), RECENT_CAPACITY);
        assert_eq!(recent[0].widget_type, "w11");
        assert_eq!(recent[RECENT_CAPACITY - 1].widget_type, "w4");
    }

    #[test]
    fn test_mark_used_unknown_is_noop() {
        let mut registry = WidgetRegistry::builtin();
        registry.mark_used("ghost");
        assert!(registry.recently_used().is_empty());
    }
}

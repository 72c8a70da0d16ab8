use crate::document::Element;

/// Kind string given to nodes whose plugin attribute is absent.
pub const UNKNOWN_PLUGIN: &str = "Unknown";

/// The normalized graph of a workflow, ready for conversion.
/// This is the target structure for any front end.
#[derive(Debug, Clone, Default)]
pub struct WorkflowDefinition {
    pub nodes: Vec<WorkflowNode>,
    pub edges: Vec<WorkflowEdge>,
}

/// A single tool in the workflow.
#[derive(Debug, Clone)]
pub struct WorkflowNode {
    pub id: String,
    /// Plugin identifier the node's kind is classified from.
    pub plugin: String,
    /// The node's `Properties` block. Kind-specific settings live under
    /// `Configuration`; some kinds also read `MetaInfo`.
    pub properties: Element,
    pub annotation: Option<String>,
    /// Name of the macro template this node expands, if it is a macro node.
    pub macro_name: Option<String>,
    /// The element the node was read from, if it came from markup.
    pub source: Option<Element>,
    /// Set on nodes synthesized for edge endpoints nobody declared.
    pub placeholder: bool,
}

impl WorkflowNode {
    pub fn new(id: impl Into<String>, plugin: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            plugin: plugin.into(),
            properties: Element::new("Properties"),
            annotation: None,
            macro_name: None,
            source: None,
            placeholder: false,
        }
    }

    /// A stand-in for an id that an edge references but no node declares.
    pub fn placeholder(id: impl Into<String>) -> Self {
        Self {
            placeholder: true,
            ..Self::new(id, UNKNOWN_PLUGIN)
        }
    }

    pub fn with_configuration(mut self, configuration: Element) -> Self {
        self.properties.children.retain(|c| c.name != "Configuration");
        self.properties.children.push(configuration);
        self
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }

    pub fn with_macro(mut self, macro_name: impl Into<String>) -> Self {
        self.macro_name = Some(macro_name.into());
        self
    }

    /// The `Configuration` block, if the node carries one.
    pub fn configuration(&self) -> Option<&Element> {
        self.properties.child("Configuration")
    }
}

/// A directed connection from one node's output to another node's input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowEdge {
    pub origin: String,
    pub dest: String,
    /// Output anchor on the origin, e.g. `Output`, `True`, `Join`. Conversion
    /// never reads it; it is kept for callers inspecting the graph.
    pub origin_anchor: Option<String>,
    /// Input anchor on the destination, e.g. `Input`, `Left`, `Right`.
    pub dest_anchor: Option<String>,
}

impl WorkflowEdge {
    pub fn new(origin: impl Into<String>, dest: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            dest: dest.into(),
            origin_anchor: None,
            dest_anchor: None,
        }
    }

    pub fn with_dest_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.dest_anchor = Some(anchor.into());
        self
    }
}

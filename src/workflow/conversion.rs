use super::definition::{UNKNOWN_PLUGIN, WorkflowDefinition, WorkflowEdge, WorkflowNode};
use crate::document::Element;
use crate::error::WorkflowConversionError;
use ahash::AHashSet;

/// Root element of a workflow document.
pub const DOCUMENT_ROOT: &str = "AlteryxDocument";

/// A trait for inputs that can be turned into a `WorkflowDefinition`.
///
/// The attribute tree implements it (that is the graph builder), and callers
/// holding workflows in some other shape can implement it for their own
/// types to reuse the converter unchanged.
pub trait IntoWorkflow {
    fn into_workflow(self) -> Result<WorkflowDefinition, WorkflowConversionError>;
}

impl IntoWorkflow for WorkflowDefinition {
    fn into_workflow(self) -> Result<WorkflowDefinition, WorkflowConversionError> {
        Ok(self)
    }
}

impl IntoWorkflow for &Element {
    fn into_workflow(self) -> Result<WorkflowDefinition, WorkflowConversionError> {
        if self.name != DOCUMENT_ROOT {
            return Err(WorkflowConversionError::UnexpectedRoot {
                expected: DOCUMENT_ROOT.to_string(),
                found: self.name.clone(),
            });
        }
        Ok(GraphBuilder::default().build(self))
    }
}

impl IntoWorkflow for Element {
    fn into_workflow(self) -> Result<WorkflowDefinition, WorkflowConversionError> {
        (&self).into_workflow()
    }
}

#[derive(Default)]
struct GraphBuilder {
    nodes: Vec<WorkflowNode>,
    edges: Vec<WorkflowEdge>,
    known_ids: AHashSet<String>,
}

impl GraphBuilder {
    fn build(mut self, document: &Element) -> WorkflowDefinition {
        if let Some(collection) = document.child("Nodes") {
            self.collect_nodes(collection);
        }
        if let Some(collection) = document.child("Connections") {
            for entry in collection.children_named("Connection") {
                self.collect_edge(entry);
            }
        }
        tracing::debug!(
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            "built workflow graph"
        );
        WorkflowDefinition {
            nodes: self.nodes,
            edges: self.edges,
        }
    }

    /// Nodes nested in a container's `ChildNodes` follow the container.
    fn collect_nodes(&mut self, collection: &Element) {
        for entry in collection.children_named("Node") {
            if let Some(node) = read_node(entry) {
                if self.known_ids.insert(node.id.clone()) {
                    self.nodes.push(node);
                } else {
                    tracing::warn!(id = %node.id, "ignoring duplicate node id");
                }
            }
            if let Some(children) = entry.child("ChildNodes") {
                self.collect_nodes(children);
            }
        }
    }

    fn collect_edge(&mut self, entry: &Element) {
        let origin = entry.child("Origin");
        let dest = entry.child("Destination");
        let origin_id = origin.and_then(|e| non_empty(e.attr("ToolID")));
        let dest_id = dest.and_then(|e| non_empty(e.attr("ToolID")));

        let (Some(origin_id), Some(dest_id)) = (origin_id, dest_id) else {
            tracing::debug!("dropping connection without both endpoints");
            return;
        };

        for id in [origin_id, dest_id] {
            if self.known_ids.insert(id.to_string()) {
                tracing::warn!(id, "connection references an undeclared node");
                self.nodes.push(WorkflowNode::placeholder(id));
            }
        }

        self.edges.push(WorkflowEdge {
            origin: origin_id.to_string(),
            dest: dest_id.to_string(),
            origin_anchor: origin.and_then(|e| e.attr("Connection")).map(str::to_string),
            dest_anchor: dest.and_then(|e| e.attr("Connection")).map(str::to_string),
        });
    }
}

fn read_node(entry: &Element) -> Option<WorkflowNode> {
    let id = non_empty(entry.attr("ToolID"))?;
    let plugin = non_empty(entry.attr_at(&["GuiSettings"], "Plugin")).unwrap_or(UNKNOWN_PLUGIN);

    let mut node = WorkflowNode::new(id, plugin);
    if let Some(properties) = entry.child("Properties") {
        node.properties = properties.clone();
    }
    node.annotation = entry
        .text_at(&["Properties", "Annotation", "DefaultAnnotationText"])
        .map(str::to_string);
    node.macro_name = non_empty(entry.attr_at(&["EngineSettings"], "Macro")).map(str::to_string);
    node.source = Some(entry.clone());
    Some(node)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

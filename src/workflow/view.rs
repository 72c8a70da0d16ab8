use super::definition::{WorkflowDefinition, WorkflowNode};
use serde::Serialize;

/// Annotations longer than this are shortened in node labels.
pub const ANNOTATION_DISPLAY_LIMIT: usize = 50;

/// Label given to nodes synthesized for undeclared edge endpoints.
pub const MISSING_NODE_LABEL: &str = "Missing Node";

/// A node as handed to a graph visualization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    /// Pretty JSON of the node's source subtree.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
}

/// Display-oriented view of a workflow: one entry per node and per edge.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphView {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

impl GraphView {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl From<&WorkflowDefinition> for GraphView {
    fn from(workflow: &WorkflowDefinition) -> Self {
        let nodes = workflow
            .nodes
            .iter()
            .map(|node| GraphNode {
                id: node.id.clone(),
                label: node_label(node),
                raw: node
                    .source
                    .as_ref()
                    .and_then(|source| serde_json::to_string_pretty(source).ok()),
            })
            .collect();

        let links = workflow
            .edges
            .iter()
            .map(|edge| GraphLink {
                source: edge.origin.clone(),
                target: edge.dest.clone(),
            })
            .collect();

        GraphView { nodes, links }
    }
}

/// `"{id} - {short plugin} - {annotation or plugin}"`, or the missing-node
/// label for placeholders.
pub fn node_label(node: &WorkflowNode) -> String {
    if node.placeholder {
        return MISSING_NODE_LABEL.to_string();
    }
    let short = node
        .plugin
        .rsplit('.')
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or(&node.plugin);
    let detail = match node.annotation.as_deref() {
        Some(annotation) if !annotation.is_empty() => truncate_annotation(annotation),
        _ => node.plugin.clone(),
    };
    format!("{} - {} - {}", node.id, short, detail)
}

/// Cuts an annotation to the display limit, marking the cut with `...`.
pub fn truncate_annotation(annotation: &str) -> String {
    if annotation.chars().count() > ANNOTATION_DISPLAY_LIMIT {
        let head: String = annotation.chars().take(ANNOTATION_DISPLAY_LIMIT).collect();
        format!("{}...", head)
    } else {
        annotation.to_string()
    }
}

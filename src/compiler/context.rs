use crate::error::BindingError;
use crate::workflow::{WorkflowDefinition, WorkflowEdge};
use ahash::AHashMap;

/// Per-run record of which variable holds each node's output, plus the
/// adjacency indexes translators use to find their inputs.
///
/// The indexes are derived once from the edge set and never change. A
/// binding is written at most once per node.
#[derive(Debug, Clone)]
pub struct BindingContext {
    prefix: String,
    outgoing: AHashMap<String, Vec<String>>,
    incoming: AHashMap<String, Vec<String>>,
    incoming_edges: AHashMap<String, Vec<WorkflowEdge>>,
    bindings: AHashMap<String, String>,
    bound_order: Vec<String>,
}

impl BindingContext {
    pub fn new(workflow: &WorkflowDefinition, prefix: impl Into<String>) -> Self {
        let mut outgoing: AHashMap<String, Vec<String>> = AHashMap::new();
        let mut incoming: AHashMap<String, Vec<String>> = AHashMap::new();
        let mut incoming_edges: AHashMap<String, Vec<WorkflowEdge>> = AHashMap::new();

        for edge in &workflow.edges {
            outgoing
                .entry(edge.origin.clone())
                .or_default()
                .push(edge.dest.clone());
            incoming
                .entry(edge.dest.clone())
                .or_default()
                .push(edge.origin.clone());
            incoming_edges
                .entry(edge.dest.clone())
                .or_default()
                .push(edge.clone());
        }

        Self {
            prefix: prefix.into(),
            outgoing,
            incoming,
            incoming_edges,
            bindings: AHashMap::new(),
            bound_order: Vec::new(),
        }
    }

    /// Destinations of `id`'s outgoing edges, in edge order.
    pub fn outgoing(&self, id: &str) -> &[String] {
        self.outgoing.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Origins of `id`'s incoming edges, in edge order.
    pub fn incoming(&self, id: &str) -> &[String] {
        self.incoming.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The incoming edges themselves, with their anchors.
    pub fn incoming_edges(&self, id: &str) -> &[WorkflowEdge] {
        self.incoming_edges
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The variable a node's output is written to, whether or not it is bound yet.
    pub fn variable_name(&self, id: &str) -> String {
        format!("{}{}", self.prefix, id)
    }

    pub fn binding(&self, id: &str) -> Option<&str> {
        self.bindings.get(id).map(String::as_str)
    }

    /// Returns the sole predecessor's bound variable when `id` has exactly one
    /// incoming edge, and `None` for any other input count (multi-input kinds
    /// resolve their own inputs).
    pub fn resolve_single_input(&self, id: &str) -> Result<Option<&str>, BindingError> {
        match self.incoming(id) {
            [predecessor] => self
                .binding(predecessor)
                .map(Some)
                .ok_or_else(|| BindingError::Unbound {
                    node_id: id.to_string(),
                    predecessor_id: predecessor.clone(),
                }),
            _ => Ok(None),
        }
    }

    /// Records `variable` as `id`'s output. A node can only be bound once.
    pub fn set_binding(&mut self, id: &str, variable: impl Into<String>) -> Result<(), BindingError> {
        if let Some(existing) = self.bindings.get(id) {
            return Err(BindingError::AlreadyBound {
                node_id: id.to_string(),
                existing: existing.clone(),
            });
        }
        let variable = variable.into();
        tracing::debug!(id, variable = %variable, "bound node output");
        self.bindings.insert(id.to_string(), variable);
        self.bound_order.push(id.to_string());
        Ok(())
    }

    /// Bound variable names in the order they were bound.
    pub fn bound_variables(&self) -> impl Iterator<Item = &str> {
        self.bound_order
            .iter()
            .filter_map(|id| self.bindings.get(id).map(String::as_str))
    }

    /// `(node id, variable)` pairs in the order they were bound.
    pub fn bindings(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bound_order
            .iter()
            .filter_map(|id| Some((id.as_str(), self.bindings.get(id)?.as_str())))
    }
}

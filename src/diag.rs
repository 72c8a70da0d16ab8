//! Diagnostics raised while translating a workflow.
//!
//! Nothing in here is fatal. Every anomaly the converter meets (a node it
//! cannot translate, a join it cannot wire up, a cycle the scheduler cannot
//! break) is recorded as a [`Diagnostic`] and the run carries on.

use serde::Serialize;
use std::fmt;

/// A stable diagnostic code such as `W0200`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DiagCode(pub &'static str);

impl fmt::Display for DiagCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Every code the converter can raise. Codes are never reused for a
/// different meaning.
pub mod codes {
    use super::DiagCode;

    /// No translator is registered for the node's kind.
    pub const UNSUPPORTED_KIND: DiagCode = DiagCode("W0100");
    /// A macro node names a template outside the macro catalog.
    pub const UNSUPPORTED_MACRO: DiagCode = DiagCode("W0101");
    /// A configuration field the kind requires is missing or empty.
    pub const MISSING_CONFIGURATION: DiagCode = DiagCode("W0200");
    /// The node has the wrong number of incoming edges for its kind.
    pub const INPUT_CARDINALITY: DiagCode = DiagCode("W0201");
    /// A predecessor finished without binding an output variable.
    pub const UNBOUND_INPUT: DiagCode = DiagCode("W0202");
    /// Nodes the scheduler never reached.
    pub const UNPROCESSED_NODES: DiagCode = DiagCode("W0300");
    /// Traversal stopped because its budget ran out.
    pub const TIMEOUT: DiagCode = DiagCode("W0301");
}

/// The failure taxonomy a diagnostic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagCategory {
    StructuralWarning,
    CycleOrUnreachable,
    UnsupportedKind,
    Timeout,
}

impl fmt::Display for DiagCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagCategory::StructuralWarning => "structural",
            DiagCategory::CycleOrUnreachable => "unprocessed",
            DiagCategory::UnsupportedKind => "unsupported",
            DiagCategory::Timeout => "timeout",
        };
        f.write_str(name)
    }
}

/// A single notice produced during conversion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub code: DiagCode,
    pub category: DiagCategory,
    /// The node the notice is about, if it concerns exactly one.
    pub node_id: Option<String>,
    pub message: String,
    pub hint: Option<String>,
}

impl Diagnostic {
    pub fn new(code: DiagCode, category: DiagCategory, message: impl Into<String>) -> Self {
        Self {
            code,
            category,
            node_id: None,
            message: message.into(),
            hint: None,
        }
    }

    /// Shorthand for a structural warning about one node.
    pub fn structural(code: DiagCode, node_id: &str, message: impl Into<String>) -> Self {
        Self::new(code, DiagCategory::StructuralWarning, message).for_node(node_id)
    }

    pub fn for_node(mut self, node_id: impl Into<String>) -> Self {
        self.node_id = Some(node_id.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.category, self.code, self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, "\n  hint: {}", hint)?;
        }
        Ok(())
    }
}

use thiserror::Error;

/// Errors raised while reading the workflow markup into an attribute tree.
///
/// These are the only failures that stop a conversion; everything past this
/// stage degrades into diagnostics instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    #[error("Malformed XML at byte {position}: {message}")]
    Xml { position: u64, message: String },

    #[error("Closing tag '</{found}>' does not match the open element '<{expected}>'")]
    MismatchedTag { expected: String, found: String },

    #[error("Document ended while '<{0}>' was still open")]
    UnexpectedEof(String),

    #[error("Document contains no root element")]
    Empty,
}

/// Errors that can occur when turning an attribute tree into a `WorkflowDefinition`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkflowConversionError {
    #[error("Expected a '{expected}' root element, but found '{found}'")]
    UnexpectedRoot { expected: String, found: String },
}

/// Errors raised by the binding context when a node reads its input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BindingError {
    #[error("Node '{node_id}' reads from node '{predecessor_id}', which has no bound output")]
    Unbound {
        node_id: String,
        predecessor_id: String,
    },

    #[error("Node '{node_id}' is already bound to '{existing}'")]
    AlreadyBound { node_id: String, existing: String },
}

/// Errors that can occur while loading converter options.
#[derive(Error, Debug)]
pub enum OptionsError {
    #[error("Could not read options file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse options JSON: {0}")]
    Json(#[from] serde_json::Error),
}

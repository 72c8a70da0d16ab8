//! Prelude module for convenient imports
//!
//! Re-exports the types and traits most callers need to convert a workflow.
//!
//! # Example
//!
//! ```rust,no_run
//! use honyaku::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let markup = std::fs::read_to_string("path/to/workflow.yxmd")?;
//! let result = convert_source(&markup, ConverterOptions::default());
//! println!("{}", result.script);
//! # Ok(())
//! # }
//! ```

// Conversion
pub use crate::compiler::kind::{KindClassifier, NodeKind};
pub use crate::compiler::schedule::{Budget, Deadline, StepBudget, Unlimited};
pub use crate::compiler::translators::{NodeTranslator, Translation, TranslationContext};
pub use crate::compiler::{Conversion, Converter, ConverterBuilder, SourceConversion, convert_source};

// Workflow model
pub use crate::document::{Element, parse_document};
pub use crate::workflow::{GraphView, IntoWorkflow, WorkflowDefinition, WorkflowEdge, WorkflowNode};

// Options and diagnostics
pub use crate::diag::{DiagCategory, DiagCode, Diagnostic};
pub use crate::options::{BudgetConfig, ConverterOptions};

// Error types
pub use crate::error::{BindingError, DocumentError, OptionsError, WorkflowConversionError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

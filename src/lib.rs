//! # Honyaku - Workflow to Script Translation Engine
//!
//! **Honyaku** turns visual ETL workflows (Alteryx `.yxmd` documents) into
//! equivalent pandas scripts. It is a small compiler: it builds a dependency
//! graph from the workflow, schedules nodes in dependency order, resolves each
//! node's input variables, and hands every node to a translator for its kind.
//!
//! ## Core Workflow
//!
//! 1.  **Read the Markup**: [`document::parse_document`] turns the XML into an [`document::Element`] tree.
//! 2.  **Build the Graph**: Implement or use the `IntoWorkflow` trait to obtain a `WorkflowDefinition`. The attribute tree already implements it.
//! 3.  **Convert**: Use `Converter::builder` to configure options, budgets, plugin aliases and custom translators, then call `convert`.
//!
//! Nothing past the first step is fatal. Missing configuration, cycles,
//! unsupported kinds and timeouts are reported as [`diag::Diagnostic`]s next
//! to a best-effort script.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use honyaku::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let markup = std::fs::read_to_string("path/to/workflow.yxmd")?;
//!
//!     // Read the document and build the workflow graph.
//!     let document = parse_document(&markup)?;
//!     let workflow = document.into_workflow()?;
//!
//!     // Convert with a step budget instead of the default wall-clock deadline.
//!     let conversion = Converter::builder(workflow)
//!         .with_budget(StepBudget::new(500))
//!         .with_plugin_mapping("MyCompany.CsvReader", NodeKind::Source)
//!         .build()
//!         .convert();
//!
//!     println!("{}", conversion.script);
//!     for diagnostic in &conversion.diagnostics {
//!         eprintln!("{}", diagnostic);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! When only the text matters, [`compiler::convert_source`] does all of the
//! above in one call and folds unreadable input into the returned text.

pub mod compiler;
pub mod diag;
pub mod document;
pub mod error;
pub mod options;
pub mod prelude;
pub mod workflow;

use crate::diag::{DiagCategory, Diagnostic, codes};
use crate::document::parse_document;
use crate::error::BindingError;
use crate::options::ConverterOptions;
use crate::workflow::{GraphView, IntoWorkflow, WorkflowDefinition, WorkflowNode};
use ahash::AHashMap;

pub mod context;
pub mod emitter;
pub mod kind;
pub mod macros;
pub mod schedule;
pub mod translators;

use context::BindingContext;
use emitter::CodeEmitter;
use kind::{KindClassifier, NodeKind};
use schedule::{Budget, Scheduler};
use translators::{NodeTranslator, Translation, TranslationContext, register_default_translators};

/// Everything one conversion run produced.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub script: String,
    /// Per-node diagnostics in scheduling order, then the scheduler's own.
    pub diagnostics: Vec<Diagnostic>,
    /// Node ids in the order they were translated.
    pub order: Vec<String>,
    /// Node ids the scheduler never reached, in declaration order.
    pub unprocessed: Vec<String>,
    pub timed_out: bool,
    /// `(node id, variable)` for every node that bound an output.
    pub bindings: Vec<(String, String)>,
}

impl Conversion {
    pub fn binding(&self, id: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(node, _)| node == id)
            .map(|(_, variable)| variable.as_str())
    }
}

/// Translates one workflow into a script. Each converter runs once; all of
/// its per-run state is dropped when [`Converter::convert`] returns.
pub struct Converter {
    workflow: WorkflowDefinition,
    options: ConverterOptions,
    budget: Box<dyn Budget>,
    classifier: KindClassifier,
    registry: AHashMap<NodeKind, Box<dyn NodeTranslator>>,
}

pub struct ConverterBuilder {
    workflow: WorkflowDefinition,
    options: ConverterOptions,
    budget: Option<Box<dyn Budget>>,
    classifier: KindClassifier,
    registry: AHashMap<NodeKind, Box<dyn NodeTranslator>>,
}

impl ConverterBuilder {
    pub fn new(workflow: WorkflowDefinition) -> Self {
        let mut registry: AHashMap<NodeKind, Box<dyn NodeTranslator>> = AHashMap::new();
        register_default_translators(&mut registry);
        Self {
            workflow,
            options: ConverterOptions::default(),
            budget: None,
            classifier: KindClassifier::new(),
            registry,
        }
    }

    pub fn with_options(mut self, options: ConverterOptions) -> Self {
        self.options = options;
        self
    }

    /// Overrides the budget described by the options.
    pub fn with_budget(mut self, budget: impl Budget + 'static) -> Self {
        self.budget = Some(Box::new(budget));
        self
    }

    /// Classifies `plugin` as `kind`, ahead of the built-in catalog.
    pub fn with_plugin_mapping(mut self, plugin: &str, kind: NodeKind) -> Self {
        self.classifier.alias(plugin, kind);
        self
    }

    /// Registers a translator, replacing any existing one for its kind.
    pub fn with_translator(mut self, translator: Box<dyn NodeTranslator>) -> Self {
        self.registry.insert(translator.kind(), translator);
        self
    }

    pub fn build(self) -> Converter {
        let budget = match self.budget {
            Some(budget) => budget,
            None => self.options.budget.start(),
        };
        Converter {
            workflow: self.workflow,
            options: self.options,
            budget,
            classifier: self.classifier,
            registry: self.registry,
        }
    }
}

impl Converter {
    pub fn builder(workflow: WorkflowDefinition) -> ConverterBuilder {
        ConverterBuilder::new(workflow)
    }

    pub fn convert(self) -> Conversion {
        let Converter {
            workflow,
            options,
            mut budget,
            classifier,
            registry,
        } = self;

        let mut nodes: AHashMap<&str, &WorkflowNode> = AHashMap::with_capacity(workflow.nodes.len());
        for node in &workflow.nodes {
            nodes.entry(node.id.as_str()).or_insert(node);
        }

        let dispatcher = Dispatcher {
            classifier: &classifier,
            registry: &registry,
            options: &options,
        };
        let mut bindings = BindingContext::new(&workflow, options.variable_prefix.as_str());
        let mut emitter = CodeEmitter::new(&options.imports);
        let mut diagnostics = Vec::new();

        let outcome = Scheduler::new(&workflow).run(budget.as_mut(), |id| {
            let Some(node) = nodes.get(id) else {
                return;
            };
            let translation = dispatcher.translate(node, &bindings);
            emitter.node(&translation);
            if let Some(output) = &translation.output {
                if let Err(err) = bindings.set_binding(id, output.as_str()) {
                    tracing::warn!(%err, "ignoring second binding");
                }
            }
            diagnostics.extend(translation.diagnostics);
        });

        emitter.summary(bindings.bound_variables());
        if outcome.timed_out {
            emitter.timeout();
            diagnostics.push(Diagnostic::new(
                codes::TIMEOUT,
                DiagCategory::Timeout,
                format!(
                    "Conversion timed out after {} of {} nodes",
                    outcome.order.len(),
                    workflow.nodes.len()
                ),
            ));
        }
        if !outcome.unprocessed.is_empty() {
            tracing::warn!(unprocessed = ?outcome.unprocessed, "nodes could not be scheduled");
            emitter.unprocessed(&outcome.unprocessed);
            diagnostics.push(
                Diagnostic::new(
                    codes::UNPROCESSED_NODES,
                    DiagCategory::CycleOrUnreachable,
                    format!(
                        "The following nodes could not be processed (cyclic or missing dependencies): {}",
                        outcome.unprocessed.join(", ")
                    ),
                )
                .with_hint("check the workflow for cycles between these nodes"),
            );
        }

        tracing::info!(
            nodes = workflow.nodes.len(),
            edges = workflow.edges.len(),
            translated = outcome.order.len(),
            diagnostics = diagnostics.len(),
            "conversion finished"
        );

        Conversion {
            script: emitter.finish(),
            diagnostics,
            bindings: bindings
                .bindings()
                .map(|(id, variable)| (id.to_string(), variable.to_string()))
                .collect(),
            order: outcome.order,
            unprocessed: outcome.unprocessed,
            timed_out: outcome.timed_out,
        }
    }
}

/// Picks and runs the translator for one node.
struct Dispatcher<'a> {
    classifier: &'a KindClassifier,
    registry: &'a AHashMap<NodeKind, Box<dyn NodeTranslator>>,
    options: &'a ConverterOptions,
}

impl Dispatcher<'_> {
    fn translate(&self, node: &WorkflowNode, bindings: &BindingContext) -> Translation {
        let output = bindings.variable_name(&node.id);
        let mut input_diagnostic = None;
        let input = match bindings.resolve_single_input(&node.id) {
            Ok(Some(variable)) => variable.to_string(),
            Ok(None) => output.clone(),
            Err(err) => {
                tracing::warn!(%err, "reading from an unbound predecessor");
                let nominal = match &err {
                    BindingError::Unbound { predecessor_id, .. } => {
                        bindings.variable_name(predecessor_id)
                    }
                    BindingError::AlreadyBound { .. } => output.clone(),
                };
                input_diagnostic = Some(Diagnostic::structural(
                    codes::UNBOUND_INPUT,
                    &node.id,
                    err.to_string(),
                ));
                nominal
            }
        };

        let ctx = TranslationContext {
            node,
            bindings,
            options: self.options,
            input: &input,
            output: &output,
        };

        let mut translation = match node.macro_name.as_deref() {
            Some(macro_name) => {
                tracing::debug!(id = node.id.as_str(), macro_name, "translating macro node");
                macros::translate_macro(&ctx, macro_name)
            }
            None => {
                let kind = self.classifier.classify(&node.plugin);
                tracing::debug!(id = node.id.as_str(), %kind, "translating node");
                match self.registry.get(&kind) {
                    Some(translator) => translator.translate(&ctx),
                    None => translators::translate_unsupported(&ctx),
                }
            }
        };

        // Multi-input kinds report unbound predecessors themselves.
        if let Some(diagnostic) = input_diagnostic {
            if !translation
                .diagnostics
                .iter()
                .any(|d| d.code == codes::UNBOUND_INPUT)
            {
                translation.diagnostics.insert(0, diagnostic);
            }
        }
        translation
    }
}

/// What [`convert_source`] hands back to a caller holding raw markup.
#[derive(Debug, Clone)]
pub struct SourceConversion {
    /// The generated script, or an explanation of why none was generated.
    pub script: String,
    /// `None` when the markup could not be read as a workflow.
    pub graph: Option<GraphView>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Converts workflow markup end to end. Never fails: unreadable input
/// becomes an explanatory script text instead of an error.
pub fn convert_source(source: &str, options: ConverterOptions) -> SourceConversion {
    let failed = |script: String| SourceConversion {
        script,
        graph: None,
        diagnostics: Vec::new(),
    };

    let document = match parse_document(source) {
        Ok(document) => document,
        Err(err) => {
            tracing::warn!(%err, "could not parse workflow markup");
            return failed(format!("Error parsing workflow: {}", err));
        }
    };
    let workflow = match document.into_workflow() {
        Ok(workflow) => workflow,
        Err(err) => {
            tracing::warn!(%err, "not a workflow document");
            return failed("Invalid workflow document structure.".to_string());
        }
    };

    let graph = GraphView::from(&workflow);
    let conversion = Converter::builder(workflow).with_options(options).build().convert();
    SourceConversion {
        script: conversion.script,
        graph: Some(graph),
        diagnostics: conversion.diagnostics,
    }
}

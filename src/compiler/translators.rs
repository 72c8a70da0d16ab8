use super::context::BindingContext;
use super::kind::NodeKind;
use crate::diag::{DiagCategory, Diagnostic, codes};
use crate::document::Element;
use crate::options::ConverterOptions;
use crate::workflow::WorkflowNode;
use ahash::AHashMap;
use itertools::Itertools;

/// Everything a translator is allowed to read. Translators see no other state.
pub struct TranslationContext<'a> {
    pub node: &'a WorkflowNode,
    pub bindings: &'a BindingContext,
    pub options: &'a ConverterOptions,
    /// Variable the node reads from: its sole predecessor's output, or its own
    /// output name when it has no single input.
    pub input: &'a str,
    /// Variable the node writes to.
    pub output: &'a str,
}

impl TranslationContext<'_> {
    /// The node's `Configuration` block, or an empty element when it has none.
    pub fn config(&self) -> &Element {
        static EMPTY: Element = Element {
            name: String::new(),
            attributes: Vec::new(),
            text: None,
            cdata: None,
            children: Vec::new(),
        };
        self.node.configuration().unwrap_or(&EMPTY)
    }

    fn id(&self) -> &str {
        &self.node.id
    }
}

/// What one node contributes to the script.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Translation {
    pub statements: Vec<String>,
    /// Variable the node's output is bound to, or `None` to leave it unbound.
    pub output: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Translation {
    /// No statements and no binding.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn bound(output: &str) -> Self {
        Self {
            output: Some(output.to_string()),
            ..Self::default()
        }
    }

    pub fn statement(mut self, statement: impl Into<String>) -> Self {
        self.statements.push(statement.into());
        self
    }

    pub fn diagnostic(mut self, diagnostic: Diagnostic) -> Self {
        self.diagnostics.push(diagnostic);
        self
    }

    /// Starts a translation that copies the input into the output.
    fn copy(ctx: &TranslationContext<'_>) -> Self {
        Self::bound(ctx.output).statement(format!("{} = {}.copy()", ctx.output, ctx.input))
    }
}

/// Defines the contract for turning one kind of node into script statements.
pub trait NodeTranslator: Send + Sync {
    fn kind(&self) -> NodeKind;
    fn translate(&self, ctx: &TranslationContext<'_>) -> Translation;
}

/// Defines the built-in translator structs and their registration.
macro_rules! define_translators {
    ( $( ($struct_name:ident, $kind:path, $func:ident) ),* $(,)? ) => {
        $(
            pub struct $struct_name;
            impl NodeTranslator for $struct_name {
                fn kind(&self) -> NodeKind { $kind }
                fn translate(&self, ctx: &TranslationContext<'_>) -> Translation { $func(ctx) }
            }
        )*

        pub(super) fn register_default_translators(
            registry: &mut AHashMap<NodeKind, Box<dyn NodeTranslator>>,
        ) {
            $( registry.insert($kind, Box::new($struct_name)); )*
        }
    };
}

define_translators! {
    (SourceTranslator, NodeKind::Source, translate_source),
    (SinkTranslator, NodeKind::Sink, translate_sink),
    (SelectTranslator, NodeKind::Select, translate_select),
    (FilterTranslator, NodeKind::Filter, translate_filter),
    (FormulaTranslator, NodeKind::Formula, translate_formula),
    (SortTranslator, NodeKind::Sort, translate_sort),
    (UniqueTranslator, NodeKind::Unique, translate_unique),
    (SummarizeTranslator, NodeKind::Summarize, translate_summarize),
    (PatternExtractTranslator, NodeKind::PatternExtract, translate_pattern_extract),
    (RemoteFetchTranslator, NodeKind::RemoteFetch, translate_remote_fetch),
    (UnionTranslator, NodeKind::Union, translate_union),
    (JoinTranslator, NodeKind::Join, translate_join),
    (TextInputTranslator, NodeKind::TextInput, translate_text_input),
    (AutoFieldTranslator, NodeKind::AutoField, translate_auto_field),
}

/// Fallback for kinds with no registered translator: an empty frame.
pub fn translate_unsupported(ctx: &TranslationContext<'_>) -> Translation {
    let message = format!(
        "Unsupported node type for tool {} ({})",
        ctx.id(),
        ctx.node.plugin
    );
    tracing::warn!(id = ctx.id(), plugin = %ctx.node.plugin, "unsupported node kind");
    Translation::bound(ctx.output)
        .statement(format!("{} = pd.DataFrame()", ctx.output))
        .diagnostic(
            Diagnostic::new(codes::UNSUPPORTED_KIND, DiagCategory::UnsupportedKind, message)
                .for_node(ctx.id()),
        )
}

fn missing_configuration(ctx: &TranslationContext<'_>, what: &str) -> Diagnostic {
    tracing::warn!(id = ctx.id(), what, "node is missing configuration");
    Diagnostic::structural(
        codes::MISSING_CONFIGURATION,
        ctx.id(),
        format!("{} node {} has no {} configured", ctx.node.plugin, ctx.id(), what),
    )
}

/// Renders names as a Python list literal.
fn python_list<S: AsRef<str>>(items: &[S]) -> String {
    let items: Vec<&str> = items.iter().map(AsRef::as_ref).collect();
    serde_json::to_string(&items).unwrap_or_else(|_| "[]".to_string())
}

fn translate_source(ctx: &TranslationContext<'_>) -> Translation {
    match ctx.config().text_at(&["File"]) {
        Some(path) => Translation::bound(ctx.output)
            .statement(format!("{} = pd.read_csv(r'{}')", ctx.output, path)),
        None => Translation::empty().diagnostic(missing_configuration(ctx, "file path")),
    }
}

fn translate_sink(ctx: &TranslationContext<'_>) -> Translation {
    let path = ctx
        .config()
        .text_at(&["File"])
        .unwrap_or(ctx.options.default_output_path.as_str());
    Translation::copy(ctx).statement(format!("{}.to_csv(r'{}', index=False)", ctx.output, path))
}

const UNKNOWN_COLUMNS: &str = "*Unknown";

fn translate_select(ctx: &TranslationContext<'_>) -> Translation {
    let fields: Vec<(&str, &str)> = ctx
        .config()
        .path(&["SelectFields"])
        .into_iter()
        .flat_map(|e| e.children_named("SelectField"))
        .filter_map(|f| Some((f.attr("field")?, f.attr("selected").unwrap_or(""))))
        .collect();

    let keep_unspecified = fields
        .iter()
        .any(|(field, selected)| *field == UNKNOWN_COLUMNS && *selected == "True");
    let explicit = |wanted: &str| {
        fields
            .iter()
            .filter(|(field, selected)| *field != UNKNOWN_COLUMNS && *selected == wanted)
            .map(|(field, _)| *field)
            .collect::<Vec<&str>>()
    };

    let translation = Translation::copy(ctx);
    let dropped = explicit("False");
    if keep_unspecified && !dropped.is_empty() {
        return translation.statement(format!(
            "{} = {}.drop(columns={})",
            ctx.output,
            ctx.output,
            python_list(&dropped)
        ));
    }
    let kept = explicit("True");
    if kept.is_empty() {
        translation
    } else {
        translation.statement(format!("{} = {}[{}]", ctx.output, ctx.output, python_list(&kept)))
    }
}

fn translate_filter(ctx: &TranslationContext<'_>) -> Translation {
    let config = ctx.config();
    let condition = config
        .text_at(&["FilterExpression"])
        .or_else(|| config.text_at(&["Expression"]));
    match condition {
        Some(condition) => Translation::bound(ctx.output)
            .statement(format!("{} = {}.query(r'{}')", ctx.output, ctx.input, condition)),
        None => Translation::empty().diagnostic(missing_configuration(ctx, "filter expression")),
    }
}

fn translate_formula(ctx: &TranslationContext<'_>) -> Translation {
    let config = ctx.config();
    let inline = config
        .children_named("FormulaExpression")
        .filter_map(|f| Some((f.attr("newField")?, f.attr("expression")?)));
    let listed = config
        .path(&["FormulaFields"])
        .into_iter()
        .flat_map(|e| e.children_named("FormulaField"))
        .filter_map(|f| Some((f.attr("field")?, f.attr("expression")?)));

    inline
        .chain(listed)
        .filter(|(field, expression)| !field.is_empty() && !expression.is_empty())
        .fold(Translation::copy(ctx), |translation, (field, expression)| {
            translation.statement(format!(
                "{}[\"{}\"] = {}.eval(r'{}')",
                ctx.output, field, ctx.input, expression
            ))
        })
}

fn translate_sort(ctx: &TranslationContext<'_>) -> Translation {
    let config = ctx.config();
    let Some(field) = config.text_at(&["SortField"]) else {
        return Translation::empty().diagnostic(missing_configuration(ctx, "sort field"));
    };
    let ascending = if config.text_at(&["Ascending"]) == Some("True") {
        "True"
    } else {
        "False"
    };
    Translation::bound(ctx.output).statement(format!(
        "{} = {}.sort_values(by=\"{}\", ascending={})",
        ctx.output, ctx.input, field, ascending
    ))
}

fn translate_unique(ctx: &TranslationContext<'_>) -> Translation {
    match ctx.config().text_at(&["UniqueField"]) {
        Some(field) => Translation::bound(ctx.output).statement(format!(
            "{} = {}.drop_duplicates(subset=[\"{}\"])",
            ctx.output, ctx.input, field
        )),
        None => Translation::empty().diagnostic(missing_configuration(ctx, "unique field")),
    }
}

// Each aggregate is assigned back onto the copied frame as a broadcast
// column; rows are not grouped.
fn translate_summarize(ctx: &TranslationContext<'_>) -> Translation {
    let mut translation = Translation::copy(ctx);
    let fields = ctx
        .config()
        .path(&["SummarizeFields"])
        .into_iter()
        .flat_map(|e| e.children_named("SummarizeField"));

    for field in fields {
        let Some(column) = field.attr("field") else {
            continue;
        };
        let name: String = column
            .chars()
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .collect();
        let (prefix, method) = match field.attr("action") {
            Some("Sum") => ("Sum", "sum"),
            Some("Avg") | Some("Average") => ("Avg", "mean"),
            Some("Min") => ("Min", "min"),
            Some("Max") => ("Max", "max"),
            other => {
                tracing::debug!(id = ctx.id(), action = ?other, "skipping unsupported aggregation");
                continue;
            }
        };
        translation = translation.statement(format!(
            "{out}[\"{prefix}_{name}\"] = {out}[\"{column}\"].{method}()",
            out = ctx.output,
        ));
    }
    translation
}

fn translate_pattern_extract(ctx: &TranslationContext<'_>) -> Translation {
    let config = ctx.config();
    let field = config.text_at(&["Field"]);
    let pattern = config
        .attr_at(&["RegExExpression"], "value")
        .filter(|p| !p.trim().is_empty());

    let translation = Translation::copy(ctx);
    match (field, pattern) {
        (Some(field), Some(pattern)) => translation.statement(format!(
            "{}[\"regex_extract\"] = {}[\"{}\"].str.extract(r'{}')",
            ctx.output, ctx.input, field, pattern
        )),
        _ => translation,
    }
}

const DEFAULT_URL_FIELD: &str = "URL";

fn translate_remote_fetch(ctx: &TranslationContext<'_>) -> Translation {
    let url_field = ctx.config().text_at(&["URLField"]).unwrap_or(DEFAULT_URL_FIELD);
    Translation::copy(ctx).statement(format!(
        "{}[\"downloaded_data\"] = {}[\"{}\"].apply(lambda url: requests.get(url).text)",
        ctx.output, ctx.input, url_field
    ))
}

fn unbound_input(ctx: &TranslationContext<'_>, predecessor: &str) -> Diagnostic {
    tracing::warn!(id = ctx.id(), predecessor, "input has no bound output");
    Diagnostic::structural(
        codes::UNBOUND_INPUT,
        ctx.id(),
        format!(
            "{} node {} reads from node {}, which produced no output",
            ctx.node.plugin,
            ctx.id(),
            predecessor
        ),
    )
}

fn translate_union(ctx: &TranslationContext<'_>) -> Translation {
    let mut translation = Translation::empty();
    let mut frames = Vec::new();
    for predecessor in ctx.bindings.incoming(ctx.id()) {
        match ctx.bindings.binding(predecessor) {
            Some(variable) => frames.push(variable),
            None => translation = translation.diagnostic(unbound_input(ctx, predecessor)),
        }
    }

    if frames.len() < 2 {
        tracing::warn!(id = ctx.id(), inputs = frames.len(), "union needs at least two inputs");
        return translation.diagnostic(Diagnostic::structural(
            codes::INPUT_CARDINALITY,
            ctx.id(),
            format!(
                "Union node {} needs at least 2 bound inputs but has {}",
                ctx.id(),
                frames.len()
            ),
        ));
    }

    translation.output = Some(ctx.output.to_string());
    translation.statement(format!(
        "{} = pd.concat([{}], ignore_index=True)",
        ctx.output,
        frames.iter().join(", ")
    ))
}

/// Key field of the `JoinInfo` block for `role`, as text or a `field` attribute.
fn join_field<'a>(config: &'a Element, role: &str) -> Option<&'a str> {
    let info = config
        .children_named("JoinInfo")
        .find(|info| info.attr("connection") == Some(role))?;
    let field = info.child("Field")?;
    field.text().or_else(|| field.attr("field")).filter(|f| !f.is_empty())
}

fn translate_join(ctx: &TranslationContext<'_>) -> Translation {
    let edges = ctx.bindings.incoming_edges(ctx.id());
    if edges.len() != 2 {
        tracing::warn!(id = ctx.id(), inputs = edges.len(), "join needs exactly two inputs");
        return Translation::empty().diagnostic(Diagnostic::structural(
            codes::INPUT_CARDINALITY,
            ctx.id(),
            format!(
                "Join node {} expected 2 incoming connections but got {}",
                ctx.id(),
                edges.len()
            ),
        ));
    }

    let config = ctx.config();
    let (Some(left_field), Some(right_field)) =
        (join_field(config, "Left"), join_field(config, "Right"))
    else {
        return Translation::empty().diagnostic(missing_configuration(ctx, "Left and Right join fields"));
    };

    // Destination anchors name the roles; without them the edge order does.
    let anchored = |role: &str| {
        edges
            .iter()
            .find(|e| e.dest_anchor.as_deref() == Some(role))
            .map(|e| e.origin.as_str())
    };
    let (left_id, right_id) = match (anchored("Left"), anchored("Right")) {
        (Some(left), Some(right)) => (left, right),
        _ => (edges[0].origin.as_str(), edges[1].origin.as_str()),
    };

    let mut translation = Translation::empty();
    let left = ctx.bindings.binding(left_id);
    let right = ctx.bindings.binding(right_id);
    for (id, bound) in [(left_id, left), (right_id, right)] {
        if bound.is_none() {
            translation = translation.diagnostic(unbound_input(ctx, id));
        }
    }
    let (Some(left), Some(right)) = (left, right) else {
        return translation;
    };

    translation.output = Some(ctx.output.to_string());
    translation.statement(format!(
        "{} = pd.merge({}, {}, left_on=\"{}\", right_on=\"{}\", how=\"inner\")",
        ctx.output, left, right, left_field, right_field
    ))
}

fn translate_text_input(ctx: &TranslationContext<'_>) -> Translation {
    let config = ctx.config();
    let fields: Vec<Option<&str>> = config
        .path(&["Fields"])
        .into_iter()
        .flat_map(|e| e.children_named("Field"))
        .map(|f| f.attr("name").filter(|n| !n.is_empty()))
        .collect();
    let records: Vec<&Element> = config
        .path(&["Data"])
        .into_iter()
        .flat_map(|e| e.children_named("r"))
        .collect();

    if let ([Some(name)], [record]) = (fields.as_slice(), records.as_slice()) {
        if let Some(value) = record.child("c").and_then(Element::text) {
            return Translation::bound(ctx.output).statement(format!(
                "{} = pd.DataFrame({{\n    \"{}\": {}\n}})",
                ctx.output,
                name,
                python_list(&[value])
            ));
        }
    }

    let mut columns: Vec<(&str, Vec<&str>)> = fields
        .iter()
        .flatten()
        .map(|name| (*name, Vec::new()))
        .collect();
    for record in &records {
        for (index, cell) in record.children_named("c").enumerate() {
            let Some(Some(name)) = fields.get(index) else {
                continue;
            };
            if let Some((_, values)) = columns.iter_mut().find(|(column, _)| column == name) {
                values.push(cell.text().unwrap_or(""));
            }
        }
    }

    let definitions = columns
        .iter()
        .map(|(name, values)| format!("    \"{}\": {}", name, python_list(values)))
        .join(",\n");
    Translation::bound(ctx.output)
        .statement(format!("{} = pd.DataFrame({{\n{}\n}})", ctx.output, definitions))
}

fn translate_auto_field(ctx: &TranslationContext<'_>) -> Translation {
    let out = ctx.output;
    let mut translation =
        Translation::copy(ctx).statement(format!("{out} = {out}.convert_dtypes()"));

    let fields = ctx
        .node
        .properties
        .path(&["MetaInfo", "RecordInfo"])
        .into_iter()
        .flat_map(|e| e.children_named("Field"));
    for field in fields {
        let (Some(name), Some(field_type)) = (field.attr("name"), field.attr("type")) else {
            continue;
        };
        let statement = match field_type.to_lowercase().as_str() {
            "v_string" => format!("{out}[\"{name}\"] = {out}[\"{name}\"].astype(\"string\")"),
            "bool" | "boolean" => {
                format!("{out}[\"{name}\"] = {out}[\"{name}\"].astype(\"boolean\")")
            }
            "double" => {
                format!("{out}[\"{name}\"] = pd.to_numeric({out}[\"{name}\"], errors='coerce')")
            }
            "int" | "integer" => format!(
                "{out}[\"{name}\"] = pd.to_numeric({out}[\"{name}\"], errors='coerce', downcast='integer')"
            ),
            _ => continue,
        };
        translation = translation.statement(statement);
    }
    translation
}

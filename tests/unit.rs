//! Unit tests for the attribute tree, graph building, classification and
//! the other building blocks of a conversion.
mod common;
use common::*;
use honyaku::compiler::context::BindingContext;
use honyaku::compiler::macros::MacroTemplate;
use honyaku::diag::codes;
use honyaku::prelude::*;
use honyaku::workflow::view::{MISSING_NODE_LABEL, node_label, truncate_annotation};

// --- Attribute tree ---

#[test]
fn test_parse_document_reads_attributes_text_and_cdata() {
    let root = parse_document(
        r#"<Root version="2"><Name>a &amp; b</Name><Blob><![CDATA[x=1]]></Blob><Empty/></Root>"#,
    )
    .expect("Failed to parse");

    assert_eq!(root.name, "Root");
    assert_eq!(root.attr("version"), Some("2"));
    assert_eq!(root.text_at(&["Name"]), Some("a & b"));
    assert_eq!(root.child("Blob").and_then(Element::cdata), Some("x=1"));
    assert!(root.child("Empty").is_some());
    assert_eq!(root.text_at(&["Empty"]), None);
}

#[test]
fn test_parse_document_rejects_unbalanced_markup() {
    assert!(parse_document("<Root><Open></Root>").is_err());
    assert!(parse_document("<Root><Open>").is_err());
    assert_eq!(parse_document("   "), Err(DocumentError::Empty));
}

#[test]
fn test_element_path_helpers() {
    let element = Element::new("Properties").with_child(
        Element::new("Configuration")
            .with_child(Element::new("RegExExpression").with_attr("value", "(\\d+)"))
            .with_child(text_element("Field", "")),
    );

    assert_eq!(
        element.attr_at(&["Configuration", "RegExExpression"], "value"),
        Some("(\\d+)")
    );
    // Empty text reads as absent.
    assert_eq!(element.text_at(&["Configuration", "Field"]), None);
    assert!(element.path(&["Configuration", "Missing"]).is_none());
}

// --- Graph builder ---

#[test]
fn test_graph_builder_extracts_nodes_and_edges() {
    let workflow = parse_document(SAMPLE_WORKFLOW)
        .expect("Failed to parse")
        .into_workflow()
        .expect("Failed to build workflow");

    let ids: Vec<&str> = workflow.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3", "4", "99"]);
    assert_eq!(workflow.edges.len(), 4);

    let input = &workflow.nodes[0];
    assert_eq!(input.plugin, INPUT_PLUGIN);
    assert_eq!(input.annotation.as_deref(), Some("customers.csv"));
    assert_eq!(
        input.configuration().and_then(|c| c.text_at(&["File"])),
        Some("C:\\data\\customers.csv")
    );

    let missing = &workflow.nodes[4];
    assert!(missing.placeholder);
    assert_eq!(missing.plugin, "Unknown");

    assert_eq!(workflow.edges[1].origin_anchor.as_deref(), Some("True"));
    assert_eq!(workflow.edges[1].dest_anchor.as_deref(), Some("Input"));
}

#[test]
fn test_graph_builder_drops_incomplete_entries_and_duplicates() {
    let document = parse_document(
        r#"<AlteryxDocument>
          <Nodes>
            <Node ToolID="1"><GuiSettings Plugin="A.Sort.Sort" /></Node>
            <Node><GuiSettings Plugin="A.Sort.Sort" /></Node>
            <Node ToolID="1"><GuiSettings Plugin="A.Filter.Filter" /></Node>
            <Node ToolID="2" />
          </Nodes>
          <Connections>
            <Connection><Origin ToolID="1" /></Connection>
            <Connection><Origin ToolID="1" /><Destination ToolID="2" /></Connection>
          </Connections>
        </AlteryxDocument>"#,
    )
    .expect("Failed to parse");
    let workflow = document.into_workflow().expect("Failed to build workflow");

    assert_eq!(workflow.nodes.len(), 2);
    assert_eq!(workflow.nodes[0].plugin, "A.Sort.Sort");
    assert_eq!(workflow.nodes[1].plugin, "Unknown");
    assert!(!workflow.nodes[1].placeholder);
    assert_eq!(workflow.edges, vec![WorkflowEdge::new("1", "2")]);
}

#[test]
fn test_graph_builder_synthesizes_one_placeholder_per_missing_id() {
    let document = parse_document(
        r#"<AlteryxDocument>
          <Nodes>
            <Node ToolID="1"><GuiSettings Plugin="A.Sort.Sort" /></Node>
          </Nodes>
          <Connections>
            <Connection><Origin ToolID="1" /><Destination ToolID="9" /></Connection>
            <Connection><Origin ToolID="8" /><Destination ToolID="9" /></Connection>
            <Connection><Origin ToolID="8" /><Destination ToolID="1" /></Connection>
          </Connections>
        </AlteryxDocument>"#,
    )
    .expect("Failed to parse");
    let workflow = document.into_workflow().expect("Failed to build workflow");

    let ids: Vec<&str> = workflow.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "9", "8"]);
    assert!(!workflow.nodes[0].placeholder);
    assert!(workflow.nodes[1..].iter().all(|n| n.placeholder));
    assert_eq!(workflow.edges.len(), 3);

    let view = GraphView::from(&workflow);
    assert_eq!(view.links.len(), 3);
    let labels: Vec<&str> = view.nodes.iter().map(|n| n.label.as_str()).collect();
    assert_eq!(labels, vec!["1 - Sort - A.Sort.Sort", MISSING_NODE_LABEL, MISSING_NODE_LABEL]);
}

#[test]
fn test_graph_builder_reads_nested_container_nodes() {
    let document = parse_document(
        r#"<AlteryxDocument><Nodes>
            <Node ToolID="1">
              <GuiSettings Plugin="AlteryxGuiToolkit.ToolContainer.ToolContainer" />
              <ChildNodes>
                <Node ToolID="2"><GuiSettings Plugin="A.Sort.Sort" /></Node>
              </ChildNodes>
            </Node>
            <Node ToolID="3" />
          </Nodes></AlteryxDocument>"#,
    )
    .expect("Failed to parse");
    let workflow = document.into_workflow().expect("Failed to build workflow");

    let ids: Vec<&str> = workflow.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
}

#[test]
fn test_graph_builder_rejects_foreign_root() {
    let result = Element::new("Workflow").into_workflow();
    assert_eq!(
        result.err(),
        Some(WorkflowConversionError::UnexpectedRoot {
            expected: "AlteryxDocument".to_string(),
            found: "Workflow".to_string(),
        })
    );
}

// --- Graph view ---

#[test]
fn test_graph_view_counts_and_placeholder_label() {
    let workflow = parse_document(SAMPLE_WORKFLOW)
        .expect("Failed to parse")
        .into_workflow()
        .expect("Failed to build workflow");
    let view = GraphView::from(&workflow);

    // Four declared tools, one synthesized for the dangling connection.
    assert_eq!(view.nodes.len(), 5);
    assert_eq!(view.links.len(), 4);
    assert_eq!(view.nodes[4].label, MISSING_NODE_LABEL);
    assert!(view.nodes[4].raw.is_none());
    assert_eq!(view.nodes[0].label, "1 - DbFileInput - customers.csv");
    assert_eq!(view.nodes[1].label, "2 - Filter - AlteryxBasePluginsGui.Filter.Filter");
    assert!(view.nodes[2].label.ends_with("..."));

    let raw = view.nodes[0].raw.as_deref().expect("declared nodes carry raw JSON");
    assert!(raw.contains("\"ToolID\": \"1\""));

    let json = view.to_json().expect("Failed to serialize");
    let value: serde_json::Value = serde_json::from_str(&json).expect("invalid JSON");
    assert_eq!(value["links"][3]["target"], "99");
}

#[test]
fn test_annotation_truncation_counts_characters() {
    let short = "a".repeat(50);
    assert_eq!(truncate_annotation(&short), short);

    let long = "é".repeat(51);
    let truncated = truncate_annotation(&long);
    assert_eq!(truncated.chars().count(), 53);
    assert!(truncated.ends_with("..."));
}

#[test]
fn test_node_label_prefers_annotation() {
    let node = WorkflowNode::new("7", SORT_PLUGIN).with_annotation("by date");
    assert_eq!(node_label(&node), "7 - Sort - by date");
    assert_eq!(node_label(&WorkflowNode::placeholder("8")), "Missing Node");
}

#[test]
fn test_node_label_keeps_full_plugin_when_last_segment_is_empty() {
    let node = WorkflowNode::new("5", "Vendor.");
    assert_eq!(node_label(&node), "5 - Vendor. - Vendor.");
}

// --- Classification ---

#[test]
fn test_classifier_uses_exact_segments() {
    let classifier = KindClassifier::new();
    assert_eq!(classifier.classify(JOIN_PLUGIN), NodeKind::Join);
    assert_eq!(classifier.classify("Join"), NodeKind::Join);
    assert_eq!(classifier.classify(INPUT_PLUGIN), NodeKind::Source);
    assert_eq!(classifier.classify(REGEX_PLUGIN), NodeKind::PatternExtract);
    assert_eq!(classifier.classify(DOWNLOAD_PLUGIN), NodeKind::RemoteFetch);
    // A longer tool name containing a catalog tag is not that tag.
    assert_eq!(
        classifier.classify("AlteryxBasePluginsGui.JoinMultiple.JoinMultiple"),
        NodeKind::Unknown
    );
    assert_eq!(classifier.classify("Unknown"), NodeKind::Unknown);
    assert_eq!(classifier.classify(""), NodeKind::Unknown);
}

#[test]
fn test_classifier_alias_overrides_catalog() {
    let mut classifier = KindClassifier::new();
    classifier.alias("JoinMultiple", NodeKind::Join);
    classifier.alias("Vendor.Tools.Sort", NodeKind::Unique);

    assert_eq!(
        classifier.classify("AlteryxBasePluginsGui.JoinMultiple.JoinMultiple"),
        NodeKind::Join
    );
    assert_eq!(classifier.classify("Vendor.Tools.Sort"), NodeKind::Unique);
    assert_eq!(classifier.classify("Other.Tools.Sort"), NodeKind::Sort);
}

#[test]
fn test_kind_tags_round_trip_through_catalog() {
    for kind in NodeKind::CATALOG {
        assert_eq!(NodeKind::from_tag(kind.tag()), Some(kind));
    }
    assert_eq!(NodeKind::from_tag("join"), None);
}

#[test]
fn test_macro_lookup_ignores_directories() {
    assert_eq!(
        MacroTemplate::lookup("GreatArcs.yxmc"),
        Some(MacroTemplate::GreatArcs)
    );
    assert_eq!(
        MacroTemplate::lookup("C:\\Macros\\GreatArcs.yxmc"),
        Some(MacroTemplate::GreatArcs)
    );
    assert_eq!(MacroTemplate::lookup("GreatArcs2.yxmc"), None);
}

// --- Binding context ---

#[test]
fn test_binding_context_indexes_and_single_input() {
    let workflow = workflow(
        vec![source("1", "a.csv"), source("2", "b.csv"), sink("3", "c.csv")],
        vec![edge("1", "3"), edge("2", "3"), edge("1", "2")],
    );
    let mut context = BindingContext::new(&workflow, "df_");

    assert_eq!(context.outgoing("1"), ["3".to_string(), "2".to_string()]);
    assert_eq!(context.incoming("3"), ["1".to_string(), "2".to_string()]);
    assert!(context.incoming("1").is_empty());
    assert_eq!(context.variable_name("3"), "df_3");

    // Node 2 has exactly one input, which is not bound yet.
    assert_eq!(
        context.resolve_single_input("2"),
        Err(BindingError::Unbound {
            node_id: "2".to_string(),
            predecessor_id: "1".to_string(),
        })
    );
    context.set_binding("1", "df_1").expect("first binding");
    assert_eq!(context.resolve_single_input("2"), Ok(Some("df_1")));
    // Multi-input and source nodes resolve their own inputs.
    assert_eq!(context.resolve_single_input("3"), Ok(None));
    assert_eq!(context.resolve_single_input("1"), Ok(None));
}

#[test]
fn test_binding_is_written_once() {
    let workflow = workflow(vec![source("1", "a.csv")], vec![]);
    let mut context = BindingContext::new(&workflow, "df_");
    context.set_binding("1", "df_1").expect("first binding");

    let err = context.set_binding("1", "other").expect_err("second binding must fail");
    assert!(matches!(err, BindingError::AlreadyBound { .. }));
    assert_eq!(context.binding("1"), Some("df_1"));
    assert_eq!(context.bound_variables().collect::<Vec<_>>(), vec!["df_1"]);
}

// --- Diagnostics, options ---

#[test]
fn test_diagnostic_display() {
    let diagnostic = Diagnostic::structural(codes::INPUT_CARDINALITY, "5", "Join node 5 expected 2")
        .with_hint("connect both inputs");
    assert_eq!(
        diagnostic.to_string(),
        "structural[W0201]: Join node 5 expected 2\n  hint: connect both inputs"
    );
    assert_eq!(diagnostic.node_id.as_deref(), Some("5"));
}

#[test]
fn test_options_defaults_and_partial_json() {
    let defaults = ConverterOptions::default();
    assert_eq!(defaults.budget, BudgetConfig::Deadline { millis: 10_000 });
    assert_eq!(defaults.variable_prefix, "df_tool_");
    assert_eq!(defaults.imports.first().map(String::as_str), Some("import pandas as pd"));

    let options = ConverterOptions::from_json(
        r#"{ "variable_prefix": "frame_", "budget": { "kind": "steps", "max_steps": 3 } }"#,
    )
    .expect("Failed to parse options");
    assert_eq!(options.variable_prefix, "frame_");
    assert_eq!(options.budget, BudgetConfig::Steps { max_steps: 3 });
    assert_eq!(options.default_output_path, "output.csv");

    assert!(matches!(
        ConverterOptions::from_json("{ \"budget\": 5 }"),
        Err(OptionsError::Json(_))
    ));
    assert!(matches!(
        ConverterOptions::from_file("/definitely/not/here.json"),
        Err(OptionsError::Io { .. })
    ));
}
